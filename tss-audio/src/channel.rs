use alloc::boxed::Box;

/// A single amplitude slot. Values are nominally 16-bit but stored widened so
/// filter overshoot does not wrap.
pub type Sample = i32;

/// Type-erased upstream channel, as owned by conversion chains.
pub type BoxedChannel = Box<dyn AudioChannel>;

/// Core trait for all pull-based audio channels.
///
/// A channel owns its output buffer and only fills it when asked. Before
/// producing anything it pulls its own upstream, then reads the upstream's
/// buffer in place. Buffer lengths are counted in sample slots, not frames.
pub trait AudioChannel {
    /// Reallocate the output buffer with `length` zeroed slots.
    ///
    /// Channels that own an upstream propagate the same length to it.
    fn set_buffer_length(&mut self, length: usize);

    /// The output buffer. Empty until `set_buffer_length` has been called.
    fn buffer(&self) -> &[Sample];

    /// Fill the first `length` slots of the output buffer.
    ///
    /// `length` is expected to be at most the buffer length; implementations
    /// clamp rather than panic.
    fn generate(&mut self, length: usize);
}

impl<T: AudioChannel + ?Sized> AudioChannel for Box<T> {
    fn set_buffer_length(&mut self, length: usize) {
        (**self).set_buffer_length(length);
    }

    fn buffer(&self) -> &[Sample] {
        (**self).buffer()
    }

    fn generate(&mut self, length: usize) {
        (**self).generate(length);
    }
}

/// How many slots make up one sample frame.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum FrameLayout {
    /// One slot per frame.
    Mono,
    /// Interleaved left/right pair per frame.
    #[default]
    Stereo,
}

impl FrameLayout {
    /// Number of buffer slots per frame.
    #[inline]
    pub const fn slots(self) -> usize {
        match self {
            FrameLayout::Mono => 1,
            FrameLayout::Stereo => 2,
        }
    }
}
