//! Slot-level helpers for filling and copying sample buffers.

use crate::channel::Sample;

/// Zero the first `length` slots of `buffer` (clamped to its length).
#[inline]
pub fn fill_silence(buffer: &mut [Sample], length: usize) {
    let length = length.min(buffer.len());
    buffer[..length].fill(0);
}

/// Copy `length` slots from `src` into `dst`.
///
/// Slots that `src` cannot supply are zeroed, so `dst[..length]` is always
/// fully written.
#[inline]
pub fn copy_samples(dst: &mut [Sample], src: &[Sample], length: usize) {
    let length = length.min(dst.len());
    let copied = length.min(src.len());
    dst[..copied].copy_from_slice(&src[..copied]);
    dst[copied..length].fill(0);
}

/// Round a filter output back to an integer sample.
///
/// Out-of-range values saturate.
#[inline(always)]
pub fn to_sample(value: f32) -> Sample {
    libm::roundf(value) as Sample
}
