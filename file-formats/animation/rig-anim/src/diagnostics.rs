//! Bounded in-memory log capture.
//!
//! [`DiagnosticSink`] is a [`log::Log`] implementation that keeps the most
//! recent records so tools and editors can show them after the fact. It can
//! forward every record to another logger, which is how the command-line
//! front end keeps `env_logger` output on stderr.

use std::collections::VecDeque;
use std::fmt;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Mutex, MutexGuard, OnceLock, PoisonError};

use log::{Level, Log, Metadata, Record, SetLoggerError};

/// Records kept when no capacity is given
pub const DEFAULT_CAPACITY: usize = 200;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DiagnosticRecord {
    pub level: Level,
    pub target: String,
    pub message: String,
}

impl fmt::Display for DiagnosticRecord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{} {}] {}", self.level, self.target, self.message)
    }
}

pub struct DiagnosticSink {
    capacity: usize,
    records: Mutex<VecDeque<DiagnosticRecord>>,
    forward: Option<Box<dyn Log>>,
    capturing: AtomicBool,
}

impl fmt::Debug for DiagnosticSink {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DiagnosticSink")
            .field("capacity", &self.capacity)
            .field("len", &self.len())
            .field("forwarding", &self.forward.is_some())
            .finish()
    }
}

impl DiagnosticSink {
    pub fn new(capacity: usize) -> Self {
        Self {
            capacity,
            records: Mutex::new(VecDeque::with_capacity(capacity)),
            forward: None,
            capturing: AtomicBool::new(true),
        }
    }

    /// Also pass every record on to `logger`
    pub fn with_forward(mut self, logger: Box<dyn Log>) -> Self {
        self.forward = Some(logger);
        self
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    fn lock(&self) -> MutexGuard<'_, VecDeque<DiagnosticRecord>> {
        self.records.lock().unwrap_or_else(PoisonError::into_inner)
    }

    pub fn push(&self, record: DiagnosticRecord) {
        if self.capacity == 0 || !self.capturing.load(Ordering::Relaxed) {
            return;
        }
        let mut records = self.lock();
        while records.len() >= self.capacity {
            records.pop_front();
        }
        records.push_back(record);
    }

    /// Captured records, oldest first
    pub fn records(&self) -> Vec<DiagnosticRecord> {
        self.lock().iter().cloned().collect()
    }

    pub fn len(&self) -> usize {
        self.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.lock().is_empty()
    }

    pub fn clear(&self) {
        self.lock().clear();
    }

    pub fn set_capturing(&self, capturing: bool) {
        self.capturing.store(capturing, Ordering::Relaxed);
    }

    pub fn is_capturing(&self) -> bool {
        self.capturing.load(Ordering::Relaxed)
    }
}

impl Log for DiagnosticSink {
    fn enabled(&self, metadata: &Metadata<'_>) -> bool {
        metadata.level() <= log::max_level()
    }

    fn log(&self, record: &Record<'_>) {
        if !self.enabled(record.metadata()) {
            return;
        }
        self.push(DiagnosticRecord {
            level: record.level(),
            target: record.target().to_string(),
            message: record.args().to_string(),
        });
        if let Some(forward) = &self.forward {
            if forward.enabled(record.metadata()) {
                forward.log(record);
            }
        }
    }

    fn flush(&self) {
        if let Some(forward) = &self.forward {
            forward.flush();
        }
    }
}

static GLOBAL: OnceLock<&'static DiagnosticSink> = OnceLock::new();

/// Install a sink as the process logger.
///
/// The `log` facade accepts one logger per process. Calling `init` again
/// after a [`teardown`] re-enables the installed sink; `forward` and
/// `capacity` of later calls are ignored.
pub fn init(
    forward: Option<Box<dyn Log>>,
    capacity: usize,
) -> Result<&'static DiagnosticSink, SetLoggerError> {
    if let Some(sink) = GLOBAL.get() {
        sink.set_capturing(true);
        return Ok(sink);
    }

    let mut sink = DiagnosticSink::new(capacity);
    if let Some(forward) = forward {
        sink = sink.with_forward(forward);
    }
    let sink: &'static DiagnosticSink = Box::leak(Box::new(sink));
    log::set_logger(sink)?;
    let _ = GLOBAL.set(sink);
    Ok(sink)
}

/// Stop capturing and drop captured records. Forwarding continues.
pub fn teardown() {
    if let Some(sink) = GLOBAL.get() {
        sink.set_capturing(false);
        sink.clear();
        sink.flush();
    }
}

/// Records held by the installed sink, oldest first
pub fn recent() -> Vec<DiagnosticRecord> {
    GLOBAL.get().map(|sink| sink.records()).unwrap_or_default()
}
