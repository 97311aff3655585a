use metrics::{counter, gauge, histogram};

/// Metrics collector for WebSocket fan-out
#[derive(Clone)]
pub struct Metrics {
    prefix: &'static str,
}

impl Metrics {
    pub fn new() -> Self {
        Self { prefix: "inv_ws" }
    }

    /// Record new connection established
    pub fn connection_established(&self) {
        counter!(format!("{}.connections.established", self.prefix)).increment(1);
        gauge!(format!("{}.connections.active", self.prefix)).increment(1.0);
    }

    /// Record connection closed
    pub fn connection_closed(&self, reason: &str) {
        counter!(format!("{}.connections.closed", self.prefix)).increment(1);
        counter!(format!("{}.connections.closed.{}", self.prefix, reason)).increment(1);
        gauge!(format!("{}.connections.active", self.prefix)).decrement(1.0);
    }

    /// Record an upgrade refused at the connection limit
    pub fn connection_rejected(&self) {
        counter!(format!("{}.connections.rejected", self.prefix)).increment(1);
    }

    /// Record connections removed after a failed send or a closed queue
    pub fn connections_pruned(&self, count: usize) {
        counter!(format!("{}.connections.pruned", self.prefix)).increment(count as u64);
    }

    /// Record broadcast message published
    pub fn broadcast_published(&self, recipient_count: usize) {
        counter!(format!("{}.broadcast.published", self.prefix)).increment(1);
        gauge!(format!("{}.broadcast.recipients", self.prefix)).set(recipient_count as f64);
    }

    /// Record a failed send to one client
    pub fn send_failed(&self, reason: &str) {
        counter!(format!("{}.sends.failed", self.prefix)).increment(1);
        counter!(format!("{}.sends.failed.{}", self.prefix, reason)).increment(1);
    }

    /// Record error occurrence
    pub fn error_occurred(&self, error_type: &str) {
        counter!(format!("{}.errors.total", self.prefix)).increment(1);
        counter!(format!("{}.errors.{}", self.prefix, error_type)).increment(1);
    }

    /// Record fan-out latency
    pub fn broadcast_latency(&self, duration: std::time::Duration) {
        histogram!(format!("{}.broadcast.latency_ms", self.prefix))
            .record(duration.as_millis() as f64);
    }
}

impl Default for Metrics {
    fn default() -> Self {
        Self::new()
    }
}
