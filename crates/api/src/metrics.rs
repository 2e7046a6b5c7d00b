use serde::Serialize;
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, AtomicUsize, Ordering};
use std::time::{Duration, Instant};

use pipeline::BuildStats;

/// Process-wide counters behind relaxed atomics. Handlers record into
/// this; `GET /metrics` serializes a snapshot.
pub struct Metrics {
    // Counters
    total_requests: AtomicUsize,
    successful_requests: AtomicUsize,
    failed_requests: AtomicUsize,
    builds_completed: AtomicUsize,
    questions_answered: AtomicUsize,

    // Timing (in microseconds)
    total_build_time_us: AtomicU64,
    total_query_time_us: AtomicU64,

    // Work volumes
    chunks_processed: AtomicUsize,
    entities_extracted: AtomicUsize,
}

impl Metrics {
    pub fn new() -> Arc<Self> {
        Arc::new(Self {
            total_requests: AtomicUsize::new(0),
            successful_requests: AtomicUsize::new(0),
            failed_requests: AtomicUsize::new(0),
            builds_completed: AtomicUsize::new(0),
            questions_answered: AtomicUsize::new(0),
            total_build_time_us: AtomicU64::new(0),
            total_query_time_us: AtomicU64::new(0),
            chunks_processed: AtomicUsize::new(0),
            entities_extracted: AtomicUsize::new(0),
        })
    }

    pub fn record_request(&self, success: bool) {
        self.total_requests.fetch_add(1, Ordering::Relaxed);
        if success {
            self.successful_requests.fetch_add(1, Ordering::Relaxed);
        } else {
            self.failed_requests.fetch_add(1, Ordering::Relaxed);
        }
    }

    pub fn record_build(&self, duration: Duration, stats: &BuildStats) {
        self.builds_completed.fetch_add(1, Ordering::Relaxed);
        self.total_build_time_us
            .fetch_add(duration.as_micros() as u64, Ordering::Relaxed);
        self.chunks_processed.fetch_add(stats.chunks, Ordering::Relaxed);
        self.entities_extracted
            .fetch_add(stats.entities, Ordering::Relaxed);
    }

    pub fn record_query(&self, duration: Duration) {
        self.questions_answered.fetch_add(1, Ordering::Relaxed);
        self.total_query_time_us
            .fetch_add(duration.as_micros() as u64, Ordering::Relaxed);
    }

    pub fn snapshot(&self) -> MetricsSnapshot {
        MetricsSnapshot {
            total_requests: self.total_requests.load(Ordering::Relaxed),
            successful_requests: self.successful_requests.load(Ordering::Relaxed),
            failed_requests: self.failed_requests.load(Ordering::Relaxed),
            builds_completed: self.builds_completed.load(Ordering::Relaxed),
            questions_answered: self.questions_answered.load(Ordering::Relaxed),
            avg_build_time_ms: Self::avg_ms(&self.total_build_time_us, &self.builds_completed),
            avg_query_time_ms: Self::avg_ms(&self.total_query_time_us, &self.questions_answered),
            chunks_processed: self.chunks_processed.load(Ordering::Relaxed),
            entities_extracted: self.entities_extracted.load(Ordering::Relaxed),
        }
    }

    fn avg_ms(total_us: &AtomicU64, count: &AtomicUsize) -> f64 {
        let total = total_us.load(Ordering::Relaxed) as f64;
        let count = count.load(Ordering::Relaxed) as f64;
        if count > 0.0 { total / count / 1000.0 } else { 0.0 }
    }
}

#[derive(Debug, Serialize)]
pub struct MetricsSnapshot {
    pub total_requests: usize,
    pub successful_requests: usize,
    pub failed_requests: usize,
    pub builds_completed: usize,
    pub questions_answered: usize,
    pub avg_build_time_ms: f64,
    pub avg_query_time_ms: f64,
    pub chunks_processed: usize,
    pub entities_extracted: usize,
}

pub struct TimedOperation {
    start: Instant,
}

impl TimedOperation {
    pub fn start() -> Self {
        Self {
            start: Instant::now(),
        }
    }

    pub fn elapsed(&self) -> Duration {
        self.start.elapsed()
    }
}
