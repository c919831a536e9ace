//! Biquad filter channel, used as the anti-aliasing stage of rate conversion.
//!
//! Each slot of a frame (left/right for stereo) gets its own filter state so
//! the channels of an interleaved stream never bleed into each other.

use alloc::vec;
use alloc::vec::Vec;

use biquad::{Biquad, Coefficients, DirectForm1, ToHertz, Type};

use crate::channel::{AudioChannel, FrameLayout, Sample};
use crate::dsp::{fill_silence, to_sample};
use crate::error::{ConversionError, ConversionResult};

/// Identity coefficients, used until `set_parameter` succeeds.
const PASSTHROUGH: Coefficients<f32> = Coefficients {
    a1: 0.0,
    a2: 0.0,
    b0: 1.0,
    b1: 0.0,
    b2: 0.0,
};

/// Filter response shape.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum FilterType {
    LowPass,
    HighPass,
    BandPass,
    Notch,
    /// Uses the gain.
    PeakingEq,
    /// Uses the gain.
    LowShelf,
    /// Uses the gain.
    HighShelf,
}

impl FilterType {
    fn coefficients(
        self,
        sample_rate: f32,
        cutoff_hz: f32,
        q: f32,
        gain_db: f32,
    ) -> Result<Coefficients<f32>, biquad::Errors> {
        let build = |response| {
            Coefficients::<f32>::from_params(response, sample_rate.hz(), cutoff_hz.hz(), q)
        };
        match self {
            FilterType::LowPass => build(Type::LowPass),
            FilterType::HighPass => build(Type::HighPass),
            FilterType::BandPass => build(Type::BandPass),
            FilterType::Notch => build(Type::Notch),
            FilterType::PeakingEq => build(Type::PeakingEQ(gain_db)),
            FilterType::LowShelf => build(Type::LowShelf(gain_db)),
            FilterType::HighShelf => build(Type::HighShelf(gain_db)),
        }
    }
}

/// Biquad filter over an upstream channel. One upstream, one output.
///
/// # Example
/// ```ignore
/// let mut lpf = BiquadFilterChannel::new(44_100, FrameLayout::Stereo);
/// lpf.set_parameter(FilterType::LowPass, 10_000.0, 0.95, 0.0)?;
/// lpf.set_channel(source);
/// lpf.set_buffer_length(256);
/// lpf.generate(256);
/// ```
pub struct BiquadFilterChannel<C> {
    channel: Option<C>,
    buffer: Vec<Sample>,
    layout: FrameLayout,
    /// Rate of the stream being filtered, in Hz.
    sample_rate: u32,
    configured: bool,
    /// One state per frame slot.
    filters: [DirectForm1<f32>; 2],
}

impl<C: AudioChannel> BiquadFilterChannel<C> {
    /// Create an unbound, passthrough filter for a stream at `sample_rate`.
    pub fn new(sample_rate: u32, layout: FrameLayout) -> Self {
        BiquadFilterChannel {
            channel: None,
            buffer: Vec::new(),
            layout,
            sample_rate,
            configured: false,
            filters: [
                DirectForm1::<f32>::new(PASSTHROUGH),
                DirectForm1::<f32>::new(PASSTHROUGH),
            ],
        }
    }

    /// Configure the response. On error the previous response is kept.
    pub fn set_parameter(
        &mut self,
        filter_type: FilterType,
        cutoff_hz: f32,
        q: f32,
        gain_db: f32,
    ) -> ConversionResult<()> {
        let coefficients = filter_type
            .coefficients(self.sample_rate as f32, cutoff_hz, q, gain_db)
            .map_err(ConversionError::Filter)?;
        self.configured = true;
        self.filters = [
            DirectForm1::<f32>::new(coefficients),
            DirectForm1::<f32>::new(coefficients),
        ];
        Ok(())
    }

    /// Rate of the filtered stream in Hz.
    pub fn sample_rate(&self) -> u32 {
        self.sample_rate
    }

    /// Whether a non-identity response is configured.
    pub fn is_configured(&self) -> bool {
        self.configured
    }

    /// Bind the upstream, returning the one it replaces.
    pub fn set_channel(&mut self, mut channel: C) -> Option<C> {
        if !self.buffer.is_empty() {
            channel.set_buffer_length(self.buffer.len());
        }
        self.channel.replace(channel)
    }

    /// Detach and return the upstream.
    pub fn take_channel(&mut self) -> Option<C> {
        self.channel.take()
    }

    /// The bound upstream, if any.
    pub fn channel(&self) -> Option<&C> {
        self.channel.as_ref()
    }

    /// Mutable access to the bound upstream.
    pub fn channel_mut(&mut self) -> Option<&mut C> {
        self.channel.as_mut()
    }
}

impl<C: AudioChannel> AudioChannel for BiquadFilterChannel<C> {
    fn set_buffer_length(&mut self, length: usize) {
        self.buffer = vec![0; length];
        if let Some(channel) = self.channel.as_mut() {
            channel.set_buffer_length(length);
        }
    }

    fn buffer(&self) -> &[Sample] {
        &self.buffer
    }

    fn generate(&mut self, length: usize) {
        let length = length.min(self.buffer.len());
        let channel = match self.channel.as_mut() {
            Some(c) => c,
            None => {
                fill_silence(&mut self.buffer, length);
                return;
            }
        };

        channel.generate(length);
        let input = channel.buffer();
        let slots = self.layout.slots();
        for (i, out) in self.buffer[..length].iter_mut().enumerate() {
            let x = input.get(i).copied().unwrap_or(0);
            *out = to_sample(self.filters[i % slots].run(x as f32));
        }
    }
}
