//! Audio channels.
//!
//! The conversion chain is built from three channels: a biquad filter, a rate
//! converter and the frequency conversion channel that wires them together.
//! Synthesized sources are available behind the `synth` feature. Each
//! implements the [`AudioChannel`](crate::channel::AudioChannel) trait.

mod convert_frequency;
mod convert_rate;
mod filter_biquad;
#[cfg(feature = "synth")]
mod synth_dc;
#[cfg(feature = "synth")]
mod synth_sine;

pub use convert_frequency::{ConversionMode, FrequencyConversionChannel};
pub use convert_rate::RateConverter;
pub use filter_biquad::{BiquadFilterChannel, FilterType};
#[cfg(feature = "synth")]
pub use synth_dc::SynthDc;
#[cfg(feature = "synth")]
pub use synth_sine::SynthSine;
