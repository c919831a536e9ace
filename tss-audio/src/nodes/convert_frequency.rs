//! Frequency conversion channel.
//!
//! Sits between a consumer and a source running at a different sample rate.
//! Every configuration change rebuilds the internal chain from scratch:
//!
//! | Mode | Chain (downstream ← upstream) |
//! |------|-------------------------------|
//! | `NoConversion` | source |
//! | `UpperSampling` | low-pass ← rate converter ← source |
//! | `DownSampling` | nothing (warns), or rate converter ← low-pass ← source with decimation on |
//!
//! The source is moved from the old chain into the new one, so rebuilding
//! never drops it. Accumulator phase is discarded on every rebuild.

use alloc::boxed::Box;
use alloc::format;
use alloc::vec;
use alloc::vec::Vec;
use core::num::NonZeroU32;

use crate::channel::{AudioChannel, BoxedChannel, Sample};
use crate::config::ConversionConfig;
use crate::control::FrequencyControl;
use crate::diagnostics::{Diagnostics, TracingDiagnostics};
use crate::dsp::{copy_samples, fill_silence};
use crate::error::{ConversionError, ConversionResult};

use super::convert_rate::RateConverter;
use super::filter_biquad::{BiquadFilterChannel, FilterType};

/// Which conversion the current rate pair calls for.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ConversionMode {
    /// Rates are equal; samples pass through.
    NoConversion,
    /// Output rate is higher than input rate.
    UpperSampling,
    /// Output rate is lower than input rate.
    DownSampling,
}

impl ConversionMode {
    /// Pick the mode for a rate pair.
    pub const fn select(input_hz: u32, output_hz: u32) -> Self {
        if input_hz == output_hz {
            ConversionMode::NoConversion
        } else if input_hz < output_hz {
            ConversionMode::UpperSampling
        } else {
            ConversionMode::DownSampling
        }
    }
}

/// Low-pass at the output rate, fed by the converter.
type UpsamplingChain = BiquadFilterChannel<RateConverter<BoxedChannel>>;

/// Converter fed by a low-pass at the input rate.
type DecimatingChain = RateConverter<BiquadFilterChannel<BoxedChannel>>;

enum Chain {
    NoConversion { source: Option<BoxedChannel> },
    UpperSampling { filter: UpsamplingChain },
    /// Unsupported downsampling. The source is parked until the rates change.
    DownSampling { source: Option<BoxedChannel> },
    Decimating { converter: DecimatingChain },
}

impl Chain {
    fn mode(&self) -> ConversionMode {
        match self {
            Chain::NoConversion { .. } => ConversionMode::NoConversion,
            Chain::UpperSampling { .. } => ConversionMode::UpperSampling,
            Chain::DownSampling { .. } | Chain::Decimating { .. } => ConversionMode::DownSampling,
        }
    }

    fn has_source(&self) -> bool {
        match self {
            Chain::NoConversion { source } | Chain::DownSampling { source } => source.is_some(),
            Chain::UpperSampling { filter } => filter
                .channel()
                .is_some_and(|converter| converter.channel().is_some()),
            Chain::Decimating { converter } => converter
                .channel()
                .is_some_and(|filter| filter.channel().is_some()),
        }
    }

    fn take_source(&mut self) -> Option<BoxedChannel> {
        match self {
            Chain::NoConversion { source } | Chain::DownSampling { source } => source.take(),
            Chain::UpperSampling { filter } => filter
                .channel_mut()
                .and_then(|converter| converter.take_channel()),
            Chain::Decimating { converter } => converter
                .channel_mut()
                .and_then(|filter| filter.take_channel()),
        }
    }

    /// The stage whose buffer feeds the conversion channel's output, if the
    /// chain can produce anything.
    fn stage_mut(&mut self) -> Option<&mut (dyn AudioChannel + 'static)> {
        if !self.has_source() {
            return None;
        }
        match self {
            Chain::NoConversion { source: Some(source) } => Some(source.as_mut()),
            Chain::UpperSampling { filter } => Some(filter),
            Chain::Decimating { converter } => Some(converter),
            Chain::NoConversion { source: None } | Chain::DownSampling { .. } => None,
        }
    }
}

/// Channel adapting a source's sample rate to a different output rate.
///
/// Never fails while generating: with no source, no buffer or an unsupported
/// rate pair it fills the requested slots with silence.
///
/// # Example
/// ```ignore
/// let mut fc = FrequencyConversionChannel::new();
/// fc.set_input_frequency(22_050)?;
/// fc.set_output_frequency(44_100)?;
/// fc.set_channel(source);
/// fc.set_buffer_length(1024);
/// fc.generate(1024);
/// let out = fc.buffer();
/// ```
pub struct FrequencyConversionChannel {
    config: ConversionConfig,
    buffer: Vec<Sample>,
    chain: Chain,
    diagnostics: Box<dyn Diagnostics>,
}

impl Default for FrequencyConversionChannel {
    fn default() -> Self {
        Self::new()
    }
}

impl FrequencyConversionChannel {
    /// Create an unbound passthrough channel at 44.1 kHz in and out.
    pub fn new() -> Self {
        FrequencyConversionChannel {
            config: ConversionConfig::default(),
            buffer: Vec::new(),
            chain: Chain::NoConversion { source: None },
            diagnostics: Box::new(TracingDiagnostics),
        }
    }

    /// Create an unbound channel from a validated config.
    pub fn with_config(config: ConversionConfig) -> ConversionResult<Self> {
        Self::with_config_and_diagnostics(config, TracingDiagnostics)
    }

    /// Like [`with_config`](Self::with_config), reporting to `diagnostics`
    /// from the first rebuild on.
    pub fn with_config_and_diagnostics(
        config: ConversionConfig,
        diagnostics: impl Diagnostics + 'static,
    ) -> ConversionResult<Self> {
        config.validate()?;
        let mut channel = Self::new().with_diagnostics(diagnostics);
        channel.config = config;
        channel.reconstruct();
        Ok(channel)
    }

    /// Route warnings to `diagnostics` instead of `tracing`.
    pub fn with_diagnostics(mut self, diagnostics: impl Diagnostics + 'static) -> Self {
        self.diagnostics = Box::new(diagnostics);
        self
    }

    /// Attach the source to convert from, returning the previous one.
    pub fn set_channel<C: AudioChannel + 'static>(&mut self, channel: C) -> Option<BoxedChannel> {
        self.set_boxed_channel(Box::new(channel))
    }

    /// Attach an already boxed source, returning the previous one.
    pub fn set_boxed_channel(&mut self, channel: BoxedChannel) -> Option<BoxedChannel> {
        let previous = self.chain.take_source();
        self.rebuild(Some(channel));
        previous
    }

    /// Detach the source. Output is silent until a new one is attached.
    pub fn take_channel(&mut self) -> Option<BoxedChannel> {
        let source = self.chain.take_source();
        self.rebuild(None);
        source
    }

    /// Current conversion mode.
    pub fn mode(&self) -> ConversionMode {
        self.chain.mode()
    }

    /// Whether `generate` will pull the source, as opposed to emitting silence.
    pub fn has_input(&self) -> bool {
        !self.buffer.is_empty()
            && !matches!(self.chain, Chain::DownSampling { .. })
            && self.chain.has_source()
    }

    /// Current configuration, including the latest rates.
    pub fn config(&self) -> &ConversionConfig {
        &self.config
    }

    /// Rebuild the chain from the current rates, source and buffer length.
    fn reconstruct(&mut self) {
        let source = self.chain.take_source();
        self.rebuild(source);
    }

    fn rebuild(&mut self, source: Option<BoxedChannel>) {
        let previous = self.chain.mode();
        let length = self.buffer.len();
        let input = self.config.input_frequency;
        let output = self.config.output_frequency;
        let mode = ConversionMode::select(input.get(), output.get());

        self.chain = match mode {
            ConversionMode::NoConversion => {
                let mut source = source;
                if let Some(source) = source.as_mut() {
                    if length != 0 {
                        source.set_buffer_length(length);
                    }
                }
                Chain::NoConversion { source }
            }
            ConversionMode::UpperSampling => Chain::UpperSampling {
                filter: upsampling_chain(&self.config, source, length),
            },
            ConversionMode::DownSampling if self.config.decimation => Chain::Decimating {
                converter: decimating_chain(&self.config, source, length),
            },
            ConversionMode::DownSampling => {
                if previous != ConversionMode::DownSampling {
                    self.diagnostics.warn(&format!(
                        "FrequencyConversionChannel: down sampling from {} Hz to {} Hz is not supported",
                        input, output
                    ));
                }
                Chain::DownSampling { source }
            }
        };

        tracing::debug!(
            ?mode,
            input = input.get(),
            output = output.get(),
            length,
            has_source = self.chain.has_source(),
            "rebuilt frequency conversion chain"
        );
    }
}

/// Configure `filter` as the anti-aliasing low-pass below `lower_hz` Nyquist.
fn anti_alias(
    filter: &mut BiquadFilterChannel<impl AudioChannel>,
    config: &ConversionConfig,
    lower_hz: u32,
) {
    let aa = &config.anti_alias;
    let cutoff = aa.cutoff_hz(lower_hz);
    if let Err(e) = filter.set_parameter(FilterType::LowPass, cutoff, aa.q, aa.gain_db) {
        tracing::warn!(error = %e, "anti-alias filter left as passthrough");
    }
}

fn upsampling_chain(
    config: &ConversionConfig,
    source: Option<BoxedChannel>,
    length: usize,
) -> UpsamplingChain {
    let input = config.input_frequency;
    let output = config.output_frequency;

    let mut converter = RateConverter::with_frequencies(input, output, config.layout);
    if let Some(source) = source {
        converter.set_channel(source);
    }

    let mut filter = BiquadFilterChannel::new(output.get(), config.layout);
    anti_alias(&mut filter, config, input.get());
    filter.set_channel(converter);
    if length != 0 {
        filter.set_buffer_length(length);
    }
    filter
}

fn decimating_chain(
    config: &ConversionConfig,
    source: Option<BoxedChannel>,
    length: usize,
) -> DecimatingChain {
    let input = config.input_frequency;
    let output = config.output_frequency;

    let mut filter = BiquadFilterChannel::new(input.get(), config.layout);
    anti_alias(&mut filter, config, output.get());
    if let Some(source) = source {
        filter.set_channel(source);
    }

    let mut converter = RateConverter::with_frequencies(input, output, config.layout);
    converter.set_channel(filter);
    if length != 0 {
        converter.set_buffer_length(length);
    }
    converter
}

impl FrequencyControl for FrequencyConversionChannel {
    type Error = ConversionError;

    fn set_input_frequency(&mut self, hz: u32) -> Result<(), Self::Error> {
        self.config.input_frequency =
            NonZeroU32::new(hz).ok_or(ConversionError::ZeroInputFrequency)?;
        self.reconstruct();
        Ok(())
    }

    fn set_output_frequency(&mut self, hz: u32) -> Result<(), Self::Error> {
        self.config.output_frequency =
            NonZeroU32::new(hz).ok_or(ConversionError::ZeroOutputFrequency)?;
        self.reconstruct();
        Ok(())
    }

    fn input_frequency(&self) -> u32 {
        self.config.input_frequency.get()
    }

    fn output_frequency(&self) -> u32 {
        self.config.output_frequency.get()
    }
}

impl AudioChannel for FrequencyConversionChannel {
    fn set_buffer_length(&mut self, length: usize) {
        self.buffer = vec![0; length];
        self.reconstruct();
    }

    fn buffer(&self) -> &[Sample] {
        &self.buffer
    }

    fn generate(&mut self, length: usize) {
        let length = length.min(self.buffer.len());
        if length == 0 {
            return;
        }

        match self.chain.stage_mut() {
            Some(stage) => {
                stage.generate(length);
                copy_samples(&mut self.buffer, stage.buffer(), length);
            }
            None => {
                tracing::trace!(length, "no input to convert, emitting silence");
                fill_silence(&mut self.buffer, length);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::channel::FrameLayout;
    use crate::testing::{PatternChannel, RecordingDiagnostics};

    fn upsampler(diagnostics: &RecordingDiagnostics) -> FrequencyConversionChannel {
        let mut fc = FrequencyConversionChannel::new().with_diagnostics(diagnostics.clone());
        fc.set_input_frequency(22_050).unwrap();
        fc.set_output_frequency(44_100).unwrap();
        fc
    }

    #[test]
    fn mode_selection() {
        assert_eq!(ConversionMode::select(44_100, 44_100), ConversionMode::NoConversion);
        assert_eq!(ConversionMode::select(22_050, 44_100), ConversionMode::UpperSampling);
        assert_eq!(ConversionMode::select(48_000, 44_100), ConversionMode::DownSampling);
    }

    #[test]
    fn passthrough_copies_source() {
        let mut fc = FrequencyConversionChannel::new();
        fc.set_buffer_length(4);
        fc.set_channel(PatternChannel::new(&[10, 20, 30, 40]));
        assert_eq!(fc.mode(), ConversionMode::NoConversion);
        fc.generate(4);
        assert_eq!(fc.buffer(), &[10, 20, 30, 40]);
    }

    #[test]
    fn passthrough_partial_generate() {
        let mut fc = FrequencyConversionChannel::new();
        fc.set_channel(PatternChannel::ramp(1, 100));
        fc.set_buffer_length(8);
        fc.generate(3);
        assert_eq!(&fc.buffer()[..3], &[1, 2, 3]);
        fc.generate(3);
        assert_eq!(&fc.buffer()[..3], &[4, 5, 6]);
    }

    #[test]
    fn no_source_is_silent() {
        let mut fc = FrequencyConversionChannel::new();
        fc.set_buffer_length(4);
        fc.generate(4);
        assert!(!fc.has_input());
        assert_eq!(fc.buffer(), &[0, 0, 0, 0]);
    }

    #[test]
    fn no_buffer_is_noop() {
        let mut fc = FrequencyConversionChannel::new();
        fc.set_channel(PatternChannel::new(&[1]));
        fc.generate(16);
        assert!(fc.buffer().is_empty());
        assert!(!fc.has_input());
    }

    #[test]
    fn generate_clamps_to_buffer() {
        let mut fc = FrequencyConversionChannel::new();
        fc.set_buffer_length(2);
        fc.set_channel(PatternChannel::new(&[7, 8]));
        fc.generate(100);
        assert_eq!(fc.buffer(), &[7, 8]);
    }

    #[test]
    fn source_sized_to_buffer_length() {
        let source = PatternChannel::new(&[0]);
        let probe = source.probe();
        let mut fc = FrequencyConversionChannel::new();
        fc.set_channel(source);
        assert_eq!(probe.buffer_length(), 0);
        fc.set_buffer_length(64);
        assert_eq!(probe.buffer_length(), 64);

        fc.set_output_frequency(48_000).unwrap();
        fc.set_buffer_length(128);
        assert_eq!(probe.buffer_length(), 128);
    }

    #[test]
    fn upsampling_pulls_source_at_half_rate() {
        let diagnostics = RecordingDiagnostics::default();
        let source = PatternChannel::ramp(0, 64);
        let probe = source.probe();
        let mut fc = upsampler(&diagnostics);
        fc.set_buffer_length(16);
        fc.set_channel(source);
        assert_eq!(fc.mode(), ConversionMode::UpperSampling);
        assert!(fc.has_input());

        for _ in 0..8 {
            fc.generate(16);
        }
        // 64 output frames from 32 input frames of 8 per pull.
        assert_eq!(probe.pulls(), 4);
        assert_eq!(diagnostics.count(), 0);
    }

    #[test]
    fn upsampling_settles_to_source_level() {
        let diagnostics = RecordingDiagnostics::default();
        let mut fc = upsampler(&diagnostics);
        fc.set_channel(PatternChannel::new(&[1_000, -2_000]));
        fc.set_buffer_length(256);
        for _ in 0..8 {
            fc.generate(256);
        }
        for frame in fc.buffer().chunks_exact(2) {
            assert!((frame[0] - 1_000).abs() <= 2, "left {}", frame[0]);
            assert!((frame[1] + 2_000).abs() <= 2, "right {}", frame[1]);
        }
    }

    #[test]
    fn setter_order_does_not_matter() {
        let a_source = PatternChannel::ramp(0, 500);
        let a_probe = a_source.probe();
        let mut a = FrequencyConversionChannel::new();
        a.set_buffer_length(32);
        a.set_channel(a_source);
        a.set_input_frequency(22_050).unwrap();
        a.set_output_frequency(44_100).unwrap();

        let b_source = PatternChannel::ramp(0, 500);
        let b_probe = b_source.probe();
        let mut b = FrequencyConversionChannel::new();
        b.set_output_frequency(44_100).unwrap();
        b.set_input_frequency(22_050).unwrap();
        b.set_channel(b_source);
        b.set_buffer_length(32);

        assert_eq!(a.mode(), b.mode());
        assert_eq!(a.has_input(), b.has_input());
        assert_eq!(a_probe.buffer_length(), b_probe.buffer_length());

        for _ in 0..4 {
            a.generate(32);
            b.generate(32);
            assert_eq!(a.buffer(), b.buffer());
        }
    }

    #[test]
    fn downsampling_warns_once_per_transition() {
        let diagnostics = RecordingDiagnostics::default();
        let source = PatternChannel::new(&[5, 6]);
        let probe = source.probe();
        let mut fc = upsampler(&diagnostics);
        fc.set_buffer_length(4);
        fc.set_channel(source);

        fc.set_input_frequency(88_200).unwrap();
        assert_eq!(fc.mode(), ConversionMode::DownSampling);
        assert_eq!(diagnostics.count(), 1);
        assert!(diagnostics.messages()[0].contains("down sampling"));

        // Further rebuilds while already downsampling stay quiet.
        fc.set_buffer_length(8);
        fc.set_output_frequency(22_050).unwrap();
        fc.set_channel(PatternChannel::new(&[1]));
        assert_eq!(diagnostics.count(), 1);

        fc.generate(8);
        assert!(!fc.has_input());
        assert_eq!(fc.buffer(), &[0; 8]);
        assert_eq!(probe.pulls(), 0);

        fc.set_output_frequency(96_000).unwrap();
        assert_eq!(fc.mode(), ConversionMode::UpperSampling);
        fc.set_output_frequency(8_000).unwrap();
        assert_eq!(diagnostics.count(), 2);
    }

    #[test]
    fn source_survives_mode_changes() {
        let diagnostics = RecordingDiagnostics::default();
        let mut fc = upsampler(&diagnostics);
        fc.set_buffer_length(4);
        fc.set_channel(PatternChannel::new(&[10, 20, 30, 40]));

        fc.set_output_frequency(11_025).unwrap();
        fc.set_output_frequency(22_050).unwrap();
        assert_eq!(fc.mode(), ConversionMode::NoConversion);
        fc.generate(4);
        assert_eq!(fc.buffer(), &[10, 20, 30, 40]);
    }

    #[test]
    fn take_channel_detaches_source() {
        let mut fc = FrequencyConversionChannel::new();
        fc.set_buffer_length(2);
        fc.set_channel(PatternChannel::new(&[3, 4]));
        fc.set_input_frequency(11_025).unwrap();

        assert!(fc.take_channel().is_some());
        assert!(fc.take_channel().is_none());
        fc.generate(2);
        assert_eq!(fc.buffer(), &[0, 0]);
    }

    #[test]
    fn set_channel_returns_previous() {
        let mut fc = FrequencyConversionChannel::new();
        assert!(fc.set_channel(PatternChannel::new(&[1])).is_none());
        assert!(fc.set_channel(PatternChannel::new(&[2])).is_some());
    }

    #[test]
    fn zero_rate_rejected_without_rebuild() {
        let diagnostics = RecordingDiagnostics::default();
        let mut fc = upsampler(&diagnostics);
        assert!(matches!(fc.set_input_frequency(0), Err(ConversionError::ZeroInputFrequency)));
        assert!(matches!(fc.set_output_frequency(0), Err(ConversionError::ZeroOutputFrequency)));
        assert_eq!(fc.input_frequency(), 22_050);
        assert_eq!(fc.output_frequency(), 44_100);
        assert_eq!(fc.mode(), ConversionMode::UpperSampling);
    }

    #[test]
    fn with_config_downsampling_warns() {
        let diagnostics = RecordingDiagnostics::default();
        let config = ConversionConfig::new(48_000, 44_100).unwrap();
        let fc =
            FrequencyConversionChannel::with_config_and_diagnostics(config, diagnostics.clone())
                .unwrap();
        assert_eq!(fc.mode(), ConversionMode::DownSampling);
        assert_eq!(diagnostics.count(), 1);
    }

    #[test]
    fn decimation_chain_converts() {
        let diagnostics = RecordingDiagnostics::default();
        let config = ConversionConfig::new(88_200, 44_100)
            .unwrap()
            .with_decimation(true);
        let mut fc =
            FrequencyConversionChannel::with_config_and_diagnostics(config, diagnostics.clone())
                .unwrap();
        let source = PatternChannel::new(&[500, -500]);
        let probe = source.probe();
        fc.set_channel(source);
        fc.set_buffer_length(128);

        assert_eq!(fc.mode(), ConversionMode::DownSampling);
        assert!(fc.has_input());
        for _ in 0..8 {
            fc.generate(128);
        }
        for frame in fc.buffer().chunks_exact(2) {
            assert!((frame[0] - 500).abs() <= 2, "left {}", frame[0]);
            assert!((frame[1] + 500).abs() <= 2, "right {}", frame[1]);
        }
        // Two input frames per output frame.
        assert!(probe.pulled_slots() >= 2 * 8 * 128 - 128);
        assert_eq!(diagnostics.count(), 0);
    }

    #[test]
    fn mono_layout_upsamples_per_slot() {
        let config = ConversionConfig::new(22_050, 44_100)
            .unwrap()
            .with_layout(FrameLayout::Mono);
        let mut fc = FrequencyConversionChannel::with_config(config).unwrap();
        let source = PatternChannel::new(&[1_000]);
        let probe = source.probe();
        fc.set_channel(source);
        fc.set_buffer_length(16);

        for _ in 0..64 {
            fc.generate(16);
        }
        // One slot per frame: 16 output slots consume 8 input slots.
        assert_eq!(probe.pulls(), 32);
        for &s in fc.buffer() {
            assert!((s - 1_000).abs() <= 2, "settled at {}", s);
        }
    }

    #[test]
    fn invalid_config_rejected() {
        let config = ConversionConfig::default().with_anti_alias(crate::config::AntiAliasConfig {
            cutoff_ratio: 0.0,
            ..Default::default()
        });
        assert!(matches!(
            FrequencyConversionChannel::with_config(config),
            Err(ConversionError::CutoffRatio(_))
        ));
    }
}
