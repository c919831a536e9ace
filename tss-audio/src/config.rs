//! Frequency conversion configuration.

use core::num::NonZeroU32;

use crate::channel::FrameLayout;
use crate::constants::{
    ANTI_ALIAS_CUTOFF_RATIO, ANTI_ALIAS_GAIN_DB, ANTI_ALIAS_Q, DEFAULT_FREQUENCY,
};
use crate::error::{ConversionError, ConversionResult};

const DEFAULT_RATE: NonZeroU32 = match NonZeroU32::new(DEFAULT_FREQUENCY) {
    Some(rate) => rate,
    None => panic!("default frequency must be non-zero"),
};

/// Parameters of the low-pass inserted before every rate change.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct AntiAliasConfig {
    /// Cutoff as a fraction of the lower rate's Nyquist frequency.
    pub cutoff_ratio: f32,
    /// Filter resonance.
    pub q: f32,
    /// Gain in dB, passed through to the filter.
    pub gain_db: f32,
}

impl Default for AntiAliasConfig {
    fn default() -> Self {
        Self {
            cutoff_ratio: ANTI_ALIAS_CUTOFF_RATIO,
            q: ANTI_ALIAS_Q,
            gain_db: ANTI_ALIAS_GAIN_DB,
        }
    }
}

impl AntiAliasConfig {
    /// Cutoff in Hz for a conversion whose lower rate is `lower_hz`.
    #[must_use]
    pub fn cutoff_hz(&self, lower_hz: u32) -> f32 {
        lower_hz as f32 / 2.0 * self.cutoff_ratio
    }

    /// Reject parameters that would put the cutoff at or above Nyquist.
    pub fn validate(&self) -> ConversionResult<()> {
        if !(self.cutoff_ratio > 0.0 && self.cutoff_ratio < 1.0) {
            return Err(ConversionError::CutoffRatio(self.cutoff_ratio));
        }
        if self.q.is_nan() || self.q <= 0.0 {
            return Err(ConversionError::QFactor(self.q));
        }
        Ok(())
    }
}

/// Configuration for a [`FrequencyConversionChannel`](crate::nodes::FrequencyConversionChannel).
///
/// Rates can still be changed afterwards through
/// [`FrequencyControl`](crate::control::FrequencyControl).
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ConversionConfig {
    /// Rate the source produces samples at.
    pub input_frequency: NonZeroU32,
    /// Rate the consumer expects.
    pub output_frequency: NonZeroU32,
    /// Slots per frame.
    pub layout: FrameLayout,
    /// Anti-aliasing low-pass parameters.
    pub anti_alias: AntiAliasConfig,
    /// Build a real decimation chain when the input rate is higher than the
    /// output rate. When off, downsampling is reported as unsupported and
    /// produces silence.
    pub decimation: bool,
}

impl Default for ConversionConfig {
    fn default() -> Self {
        Self {
            input_frequency: DEFAULT_RATE,
            output_frequency: DEFAULT_RATE,
            layout: FrameLayout::default(),
            anti_alias: AntiAliasConfig::default(),
            decimation: false,
        }
    }
}

impl ConversionConfig {
    /// Config converting `input_hz` to `output_hz` with default settings.
    pub fn new(input_hz: u32, output_hz: u32) -> ConversionResult<Self> {
        Self::default()
            .with_input_frequency(input_hz)?
            .with_output_frequency(output_hz)
    }

    /// Set the input rate.
    pub fn with_input_frequency(mut self, hz: u32) -> ConversionResult<Self> {
        self.input_frequency = NonZeroU32::new(hz).ok_or(ConversionError::ZeroInputFrequency)?;
        Ok(self)
    }

    /// Set the output rate.
    pub fn with_output_frequency(mut self, hz: u32) -> ConversionResult<Self> {
        self.output_frequency =
            NonZeroU32::new(hz).ok_or(ConversionError::ZeroOutputFrequency)?;
        Ok(self)
    }

    /// Set the frame layout.
    pub fn with_layout(mut self, layout: FrameLayout) -> Self {
        self.layout = layout;
        self
    }

    /// Set anti-aliasing parameters.
    pub fn with_anti_alias(mut self, anti_alias: AntiAliasConfig) -> Self {
        self.anti_alias = anti_alias;
        self
    }

    /// Enable or disable the decimation chain.
    pub fn with_decimation(mut self, enabled: bool) -> Self {
        self.decimation = enabled;
        self
    }

    /// Check everything the typed fields cannot.
    pub fn validate(&self) -> ConversionResult<()> {
        self.anti_alias.validate()
    }
}
