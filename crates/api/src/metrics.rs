use async_trait::async_trait;
use serde::Serialize;
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, AtomicUsize, Ordering};
use std::time::{Duration, Instant};
use summarize::{CompletionError, TextCompletion};

pub struct Metrics {
    // Counters
    total_requests: AtomicUsize,
    successful_requests: AtomicUsize,
    failed_requests: AtomicUsize,

    // Timing (in microseconds)
    total_upload_time_us: AtomicU64,
    total_summary_time_us: AtomicU64,
    total_followup_time_us: AtomicU64,
    total_remote_call_time_us: AtomicU64,

    // Counts
    files_uploaded: AtomicUsize,
    summaries_served: AtomicUsize,
    followups_answered: AtomicUsize,
    remote_calls: AtomicUsize,
    remote_failures: AtomicUsize,
}

impl Metrics {
    pub fn new() -> Arc<Self> {
        Arc::new(Self {
            total_requests: AtomicUsize::new(0),
            successful_requests: AtomicUsize::new(0),
            failed_requests: AtomicUsize::new(0),
            total_upload_time_us: AtomicU64::new(0),
            total_summary_time_us: AtomicU64::new(0),
            total_followup_time_us: AtomicU64::new(0),
            total_remote_call_time_us: AtomicU64::new(0),
            files_uploaded: AtomicUsize::new(0),
            summaries_served: AtomicUsize::new(0),
            followups_answered: AtomicUsize::new(0),
            remote_calls: AtomicUsize::new(0),
            remote_failures: AtomicUsize::new(0),
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

    pub fn record_upload(&self, duration: Duration) {
        self.total_upload_time_us.fetch_add(duration.as_micros() as u64, Ordering::Relaxed);
        self.files_uploaded.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_summary(&self, duration: Duration) {
        self.total_summary_time_us.fetch_add(duration.as_micros() as u64, Ordering::Relaxed);
        self.summaries_served.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_followup(&self, duration: Duration) {
        self.total_followup_time_us.fetch_add(duration.as_micros() as u64, Ordering::Relaxed);
        self.followups_answered.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_remote_call(&self, duration: Duration, success: bool) {
        self.total_remote_call_time_us.fetch_add(duration.as_micros() as u64, Ordering::Relaxed);
        self.remote_calls.fetch_add(1, Ordering::Relaxed);
        if !success {
            self.remote_failures.fetch_add(1, Ordering::Relaxed);
        }
    }

    pub fn snapshot(&self, active_sessions: usize) -> MetricsSnapshot {
        MetricsSnapshot {
            total_requests: self.total_requests.load(Ordering::Relaxed),
            successful_requests: self.successful_requests.load(Ordering::Relaxed),
            failed_requests: self.failed_requests.load(Ordering::Relaxed),
            active_sessions,
            files_uploaded: self.files_uploaded.load(Ordering::Relaxed),
            summaries_served: self.summaries_served.load(Ordering::Relaxed),
            followups_answered: self.followups_answered.load(Ordering::Relaxed),
            remote_calls: self.remote_calls.load(Ordering::Relaxed),
            remote_failures: self.remote_failures.load(Ordering::Relaxed),
            avg_upload_time_ms: self.avg_time_ms(&self.total_upload_time_us, &self.files_uploaded),
            avg_summary_time_ms: self.avg_time_ms(&self.total_summary_time_us, &self.summaries_served),
            avg_followup_time_ms: self.avg_time_ms(&self.total_followup_time_us, &self.followups_answered),
            avg_remote_call_time_ms: self.avg_time_ms(&self.total_remote_call_time_us, &self.remote_calls),
        }
    }

    fn avg_time_ms(&self, total_us: &AtomicU64, count: &AtomicUsize) -> f64 {
        let total = total_us.load(Ordering::Relaxed) as f64;
        let cnt = count.load(Ordering::Relaxed) as f64;
        if cnt > 0.0 {
            total / cnt / 1000.0 // Convert to ms
        } else {
            0.0
        }
    }
}

#[derive(Debug, Serialize)]
pub struct MetricsSnapshot {
    pub total_requests: usize,
    pub successful_requests: usize,
    pub failed_requests: usize,
    pub active_sessions: usize,
    pub files_uploaded: usize,
    pub summaries_served: usize,
    pub followups_answered: usize,
    pub remote_calls: usize,
    pub remote_failures: usize,
    pub avg_upload_time_ms: f64,
    pub avg_summary_time_ms: f64,
    pub avg_followup_time_ms: f64,
    pub avg_remote_call_time_ms: f64,
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

/// Counts and times every call made through the wrapped service.
pub struct MeteredCompletion<C> {
    inner: C,
    metrics: Arc<Metrics>,
}

impl<C: TextCompletion> MeteredCompletion<C> {
    pub fn new(inner: C, metrics: Arc<Metrics>) -> Self {
        Self { inner, metrics }
    }
}

#[async_trait]
impl<C: TextCompletion> TextCompletion for MeteredCompletion<C> {
    async fn complete(&self, prompt: &str) -> Result<String, CompletionError> {
        let timer = TimedOperation::start();
        let result = self.inner.complete(prompt).await;
        self.metrics.record_remote_call(timer.elapsed(), result.is_ok());
        result
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use summarize::testing::RecordingCompletion;

    #[test]
    fn test_request_counters() {
        let metrics = Metrics::new();
        metrics.record_request(true);
        metrics.record_request(true);
        metrics.record_request(false);

        let snapshot = metrics.snapshot(2);
        assert_eq!(snapshot.total_requests, 3);
        assert_eq!(snapshot.successful_requests, 2);
        assert_eq!(snapshot.failed_requests, 1);
        assert_eq!(snapshot.active_sessions, 2);
    }

    #[test]
    fn test_averages() {
        let metrics = Metrics::new();
        assert_eq!(metrics.snapshot(0).avg_summary_time_ms, 0.0);

        metrics.record_summary(Duration::from_millis(10));
        metrics.record_summary(Duration::from_millis(30));

        let snapshot = metrics.snapshot(0);
        assert_eq!(snapshot.summaries_served, 2);
        assert!((snapshot.avg_summary_time_ms - 20.0).abs() < 1e-9);
    }

    #[tokio::test]
    async fn test_metered_completion_counts_calls() {
        let metrics = Metrics::new();
        let stub = RecordingCompletion::failing_first(1, "ok");
        let metered = MeteredCompletion::new(&stub, metrics.clone());

        assert!(metered.complete("a").await.is_err());
        assert_eq!(metered.complete("b").await.unwrap(), "ok");

        let snapshot = metrics.snapshot(0);
        assert_eq!(snapshot.remote_calls, 2);
        assert_eq!(snapshot.remote_failures, 1);
    }
}
