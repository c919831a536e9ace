//! Sine wave oscillator using a phase accumulator.
//!
//! The 32-bit accumulator wraps naturally at 360°, so the phase never drifts
//! no matter how long the oscillator runs.

use alloc::vec;
use alloc::vec::Vec;
use core::f32::consts::TAU;

use crate::channel::{AudioChannel, FrameLayout, Sample};
use crate::constants::FULL_SCALE;

/// Sine wave oscillator. Writes the same value to every slot of a frame.
///
/// # Example
/// ```ignore
/// let mut sine = SynthSine::new(22_050, FrameLayout::Stereo);
/// sine.frequency(440.0);
/// sine.amplitude(0.8);
/// ```
pub struct SynthSine {
    sample_rate: u32,
    layout: FrameLayout,
    /// Phase accumulator (wraps at 32 bits = 360°).
    phase_accumulator: u32,
    /// Phase increment per frame: `freq / sample_rate * 2^32`.
    phase_increment: u32,
    /// Output magnitude, 0.0 to 1.0.
    magnitude: f32,
    buffer: Vec<Sample>,
}

impl SynthSine {
    /// Create a new sine oscillator, initially silent.
    pub fn new(sample_rate: u32, layout: FrameLayout) -> Self {
        SynthSine {
            sample_rate: sample_rate.max(1),
            layout,
            phase_accumulator: 0,
            phase_increment: 0,
            magnitude: 0.0,
            buffer: Vec::new(),
        }
    }

    /// Set the oscillator frequency in Hz.
    pub fn frequency(&mut self, hz: f32) {
        let inc = hz * (4_294_967_296.0 / self.sample_rate as f32);
        self.phase_increment = inc as u32;
    }

    /// Set the output amplitude (0.0 = silent, 1.0 = full scale).
    pub fn amplitude(&mut self, level: f32) {
        self.magnitude = level.clamp(0.0, 1.0);
    }

    /// Set the phase offset in degrees (0–360).
    pub fn phase(&mut self, angle: f32) {
        self.phase_accumulator = (angle * (4_294_967_296.0 / 360.0)) as u32;
    }
}

impl AudioChannel for SynthSine {
    fn set_buffer_length(&mut self, length: usize) {
        self.buffer = vec![0; length];
    }

    fn buffer(&self) -> &[Sample] {
        &self.buffer
    }

    fn generate(&mut self, length: usize) {
        let length = length.min(self.buffer.len());
        let slots = self.layout.slots();
        let scale = self.magnitude * FULL_SCALE;

        for frame in self.buffer[..length].chunks_mut(slots) {
            let radians = self.phase_accumulator as f32 * (TAU / 4_294_967_296.0);
            let value = libm::roundf(libm::sinf(radians) * scale) as Sample;
            frame.fill(value);
            self.phase_accumulator = self.phase_accumulator.wrapping_add(self.phase_increment);
        }
    }
}
