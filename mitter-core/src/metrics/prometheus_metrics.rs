//! Prometheus adapter for the business metrics sinks.
//!
//! Metrics are registered with a caller-supplied registry; exposing that
//! registry (for example on a `/metrics` endpoint) is the boundary layer's
//! job.

use prometheus::{IntCounter, IntGauge, Opts, Registry};

use super::{MittMetrics, UserMetrics};

/// Prometheus-backed metrics recorder.
///
/// # Metric Specification
///
/// - `mitter_users_total` (gauge): registered accounts
/// - `mitter_mitts_total` (gauge): stored mitts
/// - `mitter_mitts_likes_total` (gauge): stored likes
/// - `mitter_mitts_feed_viewed` (counter): mitts served through the feed
#[derive(Clone)]
pub struct PrometheusMetrics {
    users_total: IntGauge,
    mitts_total: IntGauge,
    likes_total: IntGauge,
    feed_viewed: IntCounter,
}

impl PrometheusMetrics {
    /// Create and register metrics with the given registry.
    ///
    /// # Errors
    ///
    /// Returns an error if a metric cannot be registered, e.g. because the
    /// registry already holds a metric with the same name.
    pub fn new(registry: &Registry) -> Result<Self, prometheus::Error> {
        let users_total = IntGauge::with_opts(Opts::new(
            "mitter_users_total",
            "Number of registered users",
        ))?;
        let mitts_total =
            IntGauge::with_opts(Opts::new("mitter_mitts_total", "Number of stored mitts"))?;
        let likes_total = IntGauge::with_opts(Opts::new(
            "mitter_mitts_likes_total",
            "Number of likes across all mitts",
        ))?;
        let feed_viewed = IntCounter::with_opts(Opts::new(
            "mitter_mitts_feed_viewed",
            "Number of mitts served through the feed",
        ))?;

        registry.register(Box::new(users_total.clone()))?;
        registry.register(Box::new(mitts_total.clone()))?;
        registry.register(Box::new(likes_total.clone()))?;
        registry.register(Box::new(feed_viewed.clone()))?;

        Ok(Self {
            users_total,
            mitts_total,
            likes_total,
            feed_viewed,
        })
    }
}

impl UserMetrics for PrometheusMetrics {
    fn add_user(&self) {
        self.users_total.inc();
    }

    fn delete_user(&self) {
        self.users_total.dec();
    }
}

impl MittMetrics for PrometheusMetrics {
    fn add_mitt(&self) {
        self.mitts_total.inc();
    }

    fn delete_mitt(&self) {
        self.mitts_total.dec();
    }

    fn add_like(&self) {
        self.likes_total.inc();
    }

    fn delete_like(&self) {
        self.likes_total.dec();
    }

    fn view_in_feed(&self, count: usize) {
        self.feed_viewed.inc_by(count as u64);
    }
}
