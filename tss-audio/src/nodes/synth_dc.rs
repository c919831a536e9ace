//! DC level source. Fills output with a constant value.

use alloc::vec;
use alloc::vec::Vec;

use crate::channel::{AudioChannel, Sample};
use crate::constants::FULL_SCALE;

/// DC level source. Outputs the same value in every slot.
///
/// # Example
/// ```ignore
/// let mut dc = SynthDc::new();
/// dc.amplitude(0.5);  // 50% positive DC
/// ```
pub struct SynthDc {
    level: Sample,
    buffer: Vec<Sample>,
}

impl Default for SynthDc {
    fn default() -> Self {
        Self::new()
    }
}

impl SynthDc {
    /// Create a new DC source at zero output.
    pub const fn new() -> Self {
        SynthDc {
            level: 0,
            buffer: Vec::new(),
        }
    }

    /// Set DC level (-1.0 to 1.0 of 16-bit full scale).
    pub fn amplitude(&mut self, level: f32) {
        let clamped = level.clamp(-1.0, 1.0);
        self.level = (clamped * FULL_SCALE) as Sample;
    }

    /// Current level as a raw sample value.
    pub fn level(&self) -> Sample {
        self.level
    }
}

impl AudioChannel for SynthDc {
    fn set_buffer_length(&mut self, length: usize) {
        self.buffer = vec![0; length];
    }

    fn buffer(&self) -> &[Sample] {
        &self.buffer
    }

    fn generate(&mut self, length: usize) {
        let length = length.min(self.buffer.len());
        self.buffer[..length].fill(self.level);
    }
}
