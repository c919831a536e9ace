/// Default input and output sample rate in Hz.
pub const DEFAULT_FREQUENCY: u32 = 44_100;

/// Anti-aliasing cutoff as a fraction of the lower rate's Nyquist frequency.
pub const ANTI_ALIAS_CUTOFF_RATIO: f32 = 0.95;

/// Resonance (Q) of the anti-aliasing low-pass.
pub const ANTI_ALIAS_Q: f32 = 0.95;

/// Gain handed to the anti-aliasing filter, in dB. Low-pass ignores it.
pub const ANTI_ALIAS_GAIN_DB: f32 = 20.0;

/// Full-scale 16-bit amplitude used by the synthesized sources.
pub const FULL_SCALE: f32 = 32_767.0;
