//! Fractional-accumulator rate converter.
//!
//! Converts between two fixed rates with an integer DDA (Bresenham) counter:
//! every output frame credits the counter with the input rate, every input
//! frame consumed debits it with the output rate. Upsampling holds the last
//! consumed frame until the counter allows the next one. Downsampling
//! consumes several frames per output frame and keeps only the last, so an
//! anti-aliasing low-pass has to sit upstream of it.

use alloc::vec;
use alloc::vec::Vec;
use core::num::NonZeroU32;

use crate::channel::{AudioChannel, FrameLayout, Sample};
use crate::constants::DEFAULT_FREQUENCY;
use crate::control::FrequencyControl;
use crate::dsp::{copy_samples, fill_silence};
use crate::error::ConversionError;

/// Rate converter. One upstream, one output.
///
/// Phase state (counter, read offset, held frame) survives across `generate`
/// calls and is reset whenever the buffer length or the upstream changes.
/// Changing a rate only stores it.
pub struct RateConverter<C> {
    channel: Option<C>,
    buffer: Vec<Sample>,
    layout: FrameLayout,
    in_frequency: u32,
    out_frequency: u32,
    /// DDA counter. A frame is consumed while it is non-negative.
    count: i64,
    /// Read offset into the upstream buffer, in slots.
    in_offset: usize,
    /// Whole-frame slots the upstream produced on its last pull.
    in_length: usize,
    /// Last consumed frame.
    held: [Sample; 2],
}

impl<C: AudioChannel> RateConverter<C> {
    /// Create an unbound converter at 44.1 kHz in and out.
    pub fn new(layout: FrameLayout) -> Self {
        RateConverter {
            channel: None,
            buffer: Vec::new(),
            layout,
            in_frequency: DEFAULT_FREQUENCY,
            out_frequency: DEFAULT_FREQUENCY,
            count: 0,
            in_offset: 0,
            in_length: 0,
            held: [0; 2],
        }
    }

    /// Create an unbound converter for a known rate pair.
    pub fn with_frequencies(input: NonZeroU32, output: NonZeroU32, layout: FrameLayout) -> Self {
        let mut converter = Self::new(layout);
        converter.in_frequency = input.get();
        converter.out_frequency = output.get();
        converter
    }

    /// Bind the upstream, returning the one it replaces.
    ///
    /// Resets phase so the new source starts from its first frame.
    pub fn set_channel(&mut self, mut channel: C) -> Option<C> {
        if !self.buffer.is_empty() {
            channel.set_buffer_length(self.buffer.len());
        }
        self.reset_phase();
        self.channel.replace(channel)
    }

    /// Detach and return the upstream.
    pub fn take_channel(&mut self) -> Option<C> {
        self.reset_phase();
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

    /// Slots per frame the converter steps by.
    pub fn layout(&self) -> FrameLayout {
        self.layout
    }

    fn reset_phase(&mut self) {
        self.count = 0;
        self.in_offset = 0;
        self.in_length = 0;
        self.held = [0; 2];
    }

    /// Run the DDA loop over the first `length` slots.
    ///
    /// The upstream is pulled for `length` slots each time the read offset
    /// wraps. A trailing partial frame is silenced.
    fn convert(&mut self, length: usize) {
        let slots = self.layout.slots();
        let frames_end = length - length % slots;
        let in_hz = i64::from(self.in_frequency);
        let out_hz = i64::from(self.out_frequency);

        let channel = match self.channel.as_mut() {
            Some(c) => c,
            None => return,
        };

        for frame in self.buffer[..frames_end].chunks_exact_mut(slots) {
            while self.count >= 0 {
                if self.in_offset == 0 {
                    channel.generate(length);
                    let produced = length.min(channel.buffer().len());
                    self.in_length = produced - produced % slots;
                }
                if self.in_length == 0 {
                    // Upstream gave us no whole frame to read.
                    self.held = [0; 2];
                } else {
                    let start = self.in_offset;
                    self.held[..slots].copy_from_slice(&channel.buffer()[start..start + slots]);
                    self.in_offset += slots;
                    if self.in_offset >= self.in_length {
                        self.in_offset = 0;
                    }
                }
                self.count -= out_hz;
            }
            frame.copy_from_slice(&self.held[..slots]);
            self.count += in_hz;
        }

        fill_silence(&mut self.buffer[frames_end..], length - frames_end);
    }
}

impl<C: AudioChannel> FrequencyControl for RateConverter<C> {
    type Error = ConversionError;

    fn set_input_frequency(&mut self, hz: u32) -> Result<(), Self::Error> {
        if hz == 0 {
            return Err(ConversionError::ZeroInputFrequency);
        }
        self.in_frequency = hz;
        Ok(())
    }

    fn set_output_frequency(&mut self, hz: u32) -> Result<(), Self::Error> {
        if hz == 0 {
            return Err(ConversionError::ZeroOutputFrequency);
        }
        self.out_frequency = hz;
        Ok(())
    }

    fn input_frequency(&self) -> u32 {
        self.in_frequency
    }

    fn output_frequency(&self) -> u32 {
        self.out_frequency
    }
}

impl<C: AudioChannel> AudioChannel for RateConverter<C> {
    fn set_buffer_length(&mut self, length: usize) {
        self.buffer = vec![0; length];
        self.reset_phase();
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
                tracing::trace!(length, "rate converter unbound, emitting silence");
                fill_silence(&mut self.buffer, length);
                return;
            }
        };

        if self.in_frequency == self.out_frequency {
            channel.generate(length);
            copy_samples(&mut self.buffer, channel.buffer(), length);
        } else {
            self.convert(length);
        }
    }
}
