/// Trait for channels whose input and output sample rates can be changed at
/// runtime.
pub trait FrequencyControl {
    /// Error type for rejected rates.
    type Error;

    /// Set the rate the upstream produces samples at, in Hz.
    fn set_input_frequency(&mut self, hz: u32) -> Result<(), Self::Error>;

    /// Set the rate consumers expect samples at, in Hz.
    fn set_output_frequency(&mut self, hz: u32) -> Result<(), Self::Error>;

    /// Current input rate in Hz.
    fn input_frequency(&self) -> u32;

    /// Current output rate in Hz.
    fn output_frequency(&self) -> u32;
}
