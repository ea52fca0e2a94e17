//! RecordingSink - Captures text delivered to a player

use parking_lot::Mutex;
use skirmish::world::OutputSink;

/// Output sink that appends every delivery to a buffer
#[derive(Debug, Default)]
pub struct RecordingSink {
    text: Mutex<String>,
    deliveries: Mutex<usize>,
}

impl RecordingSink {
    /// Everything delivered so far
    pub fn text(&self) -> String {
        self.text.lock().clone()
    }

    /// Everything delivered since the last call
    pub fn take(&self) -> String {
        std::mem::take(&mut *self.text.lock())
    }

    /// Number of `deliver` calls
    pub fn deliveries(&self) -> usize {
        *self.deliveries.lock()
    }
}

impl OutputSink for RecordingSink {
    fn deliver(&self, text: &str) {
        self.text.lock().push_str(text);
        *self.deliveries.lock() += 1;
    }
}
