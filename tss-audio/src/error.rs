use thiserror::Error;

/// Result type used by `tss-audio` configuration setters.
pub type ConversionResult<T> = Result<T, ConversionError>;

/// Configuration errors.
///
/// Audio generation itself never fails: a misconfigured or partially wired
/// chain produces silence. These errors only surface from setters, so a bad
/// value is rejected before it reaches the accumulator loop.
#[derive(Debug, Error)]
pub enum ConversionError {
    #[error("input frequency must be non-zero")]
    ZeroInputFrequency,

    #[error("output frequency must be non-zero")]
    ZeroOutputFrequency,

    #[error("anti-alias cutoff ratio {0} is outside (0, 1)")]
    CutoffRatio(f32),

    #[error("filter Q {0} must be positive")]
    QFactor(f32),

    #[error("filter coefficients rejected: {0:?}")]
    Filter(biquad::Errors),
}
