//! Test doubles: a scripted source channel and a recording diagnostics sink.

use alloc::rc::Rc;
use alloc::string::{String, ToString};
use alloc::vec;
use alloc::vec::Vec;
use core::cell::{Cell, RefCell};

use crate::channel::{AudioChannel, Sample};
use crate::diagnostics::Diagnostics;

/// Shared view of what a [`PatternChannel`] has been asked to do.
#[derive(Clone, Default)]
pub struct PatternProbe {
    pulls: Rc<Cell<usize>>,
    buffer_length: Rc<Cell<usize>>,
    pulled_slots: Rc<Cell<usize>>,
}

impl PatternProbe {
    /// Number of `generate` calls.
    pub fn pulls(&self) -> usize {
        self.pulls.get()
    }

    /// Last value passed to `set_buffer_length`.
    pub fn buffer_length(&self) -> usize {
        self.buffer_length.get()
    }

    /// Total slots requested across all pulls.
    pub fn pulled_slots(&self) -> usize {
        self.pulled_slots.get()
    }
}

/// Source that loops a fixed pattern, continuing where the last pull ended.
pub struct PatternChannel {
    pattern: Vec<Sample>,
    position: usize,
    buffer: Vec<Sample>,
    probe: PatternProbe,
}

impl PatternChannel {
    pub fn new(pattern: &[Sample]) -> Self {
        PatternChannel {
            pattern: pattern.to_vec(),
            position: 0,
            buffer: Vec::new(),
            probe: PatternProbe::default(),
        }
    }

    /// Source counting up from `start`, one step per slot.
    pub fn ramp(start: Sample, len: usize) -> Self {
        let pattern: Vec<Sample> = (0..len as Sample).map(|i| start + i).collect();
        Self::new(&pattern)
    }

    pub fn probe(&self) -> PatternProbe {
        self.probe.clone()
    }
}

impl AudioChannel for PatternChannel {
    fn set_buffer_length(&mut self, length: usize) {
        self.buffer = vec![0; length];
        self.probe.buffer_length.set(length);
    }

    fn buffer(&self) -> &[Sample] {
        &self.buffer
    }

    fn generate(&mut self, length: usize) {
        self.probe.pulls.set(self.probe.pulls.get() + 1);
        self.probe.pulled_slots.set(self.probe.pulled_slots.get() + length);
        let length = length.min(self.buffer.len());
        for slot in &mut self.buffer[..length] {
            *slot = self.pattern[self.position];
            self.position = (self.position + 1) % self.pattern.len();
        }
    }
}

/// Diagnostics sink that keeps every message.
#[derive(Clone, Default)]
pub struct RecordingDiagnostics {
    messages: Rc<RefCell<Vec<String>>>,
}

impl RecordingDiagnostics {
    pub fn messages(&self) -> Vec<String> {
        self.messages.borrow().clone()
    }

    pub fn count(&self) -> usize {
        self.messages.borrow().len()
    }
}

impl Diagnostics for RecordingDiagnostics {
    fn warn(&mut self, message: &str) {
        self.messages.borrow_mut().push(message.to_string());
    }
}
