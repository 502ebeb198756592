use std::sync::Arc;

use parking_lot::Mutex;

use crate::report::ReportCollector;
use crate::SampleRecord;

/// Keeps every sample in memory. Clones share the same storage, so keep one clone to read the
/// samples back after handing the other to a [crate::Reporter].
#[derive(Debug, Clone, Default)]
pub struct InMemoryCollector {
    samples: Arc<Mutex<Vec<SampleRecord>>>,
}

impl InMemoryCollector {
    pub fn samples(&self) -> Vec<SampleRecord> {
        self.samples.lock().clone()
    }
}

impl ReportCollector for InMemoryCollector {
    fn add_sample(&mut self, record: &SampleRecord) {
        self.samples.lock().push(*record);
    }

    fn finalize(&self) {
        // Nothing to flush, samples stay readable.
    }
}
