//! # tss-audio
//!
//! A `no_std` (with `alloc`) pull-based audio channel framework whose core is
//! sample rate conversion: a channel that sits between a consumer and a
//! source running at a different rate, rebuilding its internal
//! anti-aliasing filter and rate converter whenever the rates, the source or
//! the buffer length change.
//!
//! ## Architecture
//!
//! | Layer | Module | Purpose |
//! |-------|--------|---------|
//! | Trait | [`channel`] / [`control`] | `AudioChannel` and `FrequencyControl` traits |
//! | Config | [`config`] / [`constants`] | Rate pair, frame layout, anti-alias parameters |
//! | Errors | [`error`] / [`diagnostics`] | Setter errors and the injected warning sink |
//! | DSP | [`dsp`] | Silence, copy and rounding helpers |
//! | Nodes | [`nodes`] | Filter, rate converter, conversion channel, sources |
//!
//! ## Quick start
//!
//! ```ignore
//! use tss_audio::channel::AudioChannel;
//! use tss_audio::control::FrequencyControl;
//! use tss_audio::nodes::{FrequencyConversionChannel, SynthSine};
//! use tss_audio::channel::FrameLayout;
//!
//! let mut sine = SynthSine::new(22_050, FrameLayout::Stereo);
//! sine.frequency(440.0);
//! sine.amplitude(0.5);
//!
//! let mut fc = FrequencyConversionChannel::new();
//! fc.set_input_frequency(22_050)?;
//! fc.set_output_frequency(44_100)?;
//! fc.set_channel(sine);
//! fc.set_buffer_length(1024);
//!
//! // Once per hardware buffer:
//! fc.generate(1024);
//! let samples = fc.buffer();
//! ```
//!
//! ## Features
//!
//! | Feature | Default | Enables |
//! |---------|---------|---------|
//! | `synth` | yes | `SynthDc` and `SynthSine` source channels |
//!
//! ## Audio parameters
//!
//! - **Default rate:** 44 100 Hz in and out ([`constants::DEFAULT_FREQUENCY`])
//! - **Sample format:** `i32` slots holding 16-bit amplitudes
//! - **Frames:** interleaved stereo pairs by default, mono optional
//! - **Threading:** single rendering context; reconfiguration must not race
//!   `generate`

#![no_std]

extern crate alloc;

pub mod constants;
pub mod channel;
pub mod control;
pub mod config;
pub mod diagnostics;
pub mod dsp;
pub mod error;
pub mod nodes;

#[cfg(test)]
mod testing;

pub use channel::{AudioChannel, BoxedChannel, FrameLayout, Sample};
pub use config::{AntiAliasConfig, ConversionConfig};
pub use control::FrequencyControl;
pub use diagnostics::{Diagnostics, TracingDiagnostics};
pub use error::{ConversionError, ConversionResult};
