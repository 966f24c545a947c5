// ==========================================
// AuditGov - Run control
// ==========================================
// CancellationToken: caller -> run, checked between rows
// ProgressSink: run -> caller, called after every row
// ==========================================

use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::Arc;

/// Shared cancel flag; clones observe the same flag
#[derive(Debug, Clone, Default)]
pub struct CancellationToken {
    cancelled: Arc<AtomicBool>,
}

impl CancellationToken {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cancel(&self) {
        self.cancelled.store(true, Ordering::SeqCst);
    }

    pub fn is_cancelled(&self) -> bool {
        self.cancelled.load(Ordering::SeqCst)
    }
}

// ==========================================
// ProgressSink Trait
// ==========================================
pub trait ProgressSink: Send + Sync {
    /// `processed` data lines read so far, `imported` trips stored so far
    fn on_progress(&self, processed: usize, imported: usize);
}

/// Logs an info line every `interval` rows
#[derive(Debug, Clone, Copy)]
pub struct TracingProgressSink {
    interval: usize,
}

impl TracingProgressSink {
    pub fn new(interval: usize) -> Self {
        Self {
            interval: interval.max(1),
        }
    }
}

impl ProgressSink for TracingProgressSink {
    fn on_progress(&self, processed: usize, imported: usize) {
        if processed % self.interval == 0 {
            tracing::info!(processed, imported, "import progress");
        }
    }
}

/// Latest counts, readable from another thread
#[derive(Debug, Default)]
pub struct CounterProgressSink {
    processed: AtomicUsize,
    imported: AtomicUsize,
}

impl CounterProgressSink {
    pub fn new() -> Self {
        Self::default()
    }

    /// (processed, imported)
    pub fn snapshot(&self) -> (usize, usize) {
        (
            self.processed.load(Ordering::Relaxed),
            self.imported.load(Ordering::Relaxed),
        )
    }
}

impl ProgressSink for CounterProgressSink {
    fn on_progress(&self, processed: usize, imported: usize) {
        self.processed.store(processed, Ordering::Relaxed);
        self.imported.store(imported, Ordering::Relaxed);
    }
}

/// Forwards to several sinks
pub struct FanOutProgressSink {
    sinks: Vec<Arc<dyn ProgressSink>>,
}

impl FanOutProgressSink {
    pub fn new(sinks: Vec<Arc<dyn ProgressSink>>) -> Self {
        Self { sinks }
    }
}

impl ProgressSink for FanOutProgressSink {
    fn on_progress(&self, processed: usize, imported: usize) {
        for sink in &self.sinks {
            sink.on_progress(processed, imported);
        }
    }
}
