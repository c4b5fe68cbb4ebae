//! Business metrics
//!
//! Services report user, mitt and like counts through the [`UserMetrics`]
//! and [`MittMetrics`] sinks. Every update goes through a
//! [`MetricsDispatcher`], which runs it on a detached task: a slow or
//! panicking sink can neither delay nor fail the operation that triggered
//! it, and an update may land after the operation has returned.

mod prometheus_metrics;

pub use prometheus_metrics::PrometheusMetrics;

use std::sync::Arc;

/// Sink for account metrics.
pub trait UserMetrics: Send + Sync + 'static {
    fn add_user(&self);

    fn delete_user(&self);
}

/// Sink for mitt and like metrics.
pub trait MittMetrics: Send + Sync + 'static {
    fn add_mitt(&self);

    fn delete_mitt(&self);

    fn add_like(&self);

    fn delete_like(&self);

    /// Number of mitts served through the global feed.
    fn view_in_feed(&self, count: usize);
}

/// Sink that discards every update.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoopMetrics;

impl UserMetrics for NoopMetrics {
    fn add_user(&self) {}

    fn delete_user(&self) {}
}

impl MittMetrics for NoopMetrics {
    fn add_mitt(&self) {}

    fn delete_mitt(&self) {}

    fn add_like(&self) {}

    fn delete_like(&self) {}

    fn view_in_feed(&self, _count: usize) {}
}

/// Fire-and-forget front for a metrics sink.
///
/// [`dispatch`](Self::dispatch) spawns the update onto the current tokio
/// runtime and drops the join handle. Outside a runtime the update is
/// dropped.
pub struct MetricsDispatcher<M: ?Sized> {
    sink: Arc<M>,
}

impl<M: ?Sized> Clone for MetricsDispatcher<M> {
    fn clone(&self) -> Self {
        Self {
            sink: Arc::clone(&self.sink),
        }
    }
}

impl<M: ?Sized + Send + Sync + 'static> MetricsDispatcher<M> {
    pub fn new(sink: Arc<M>) -> Self {
        Self { sink }
    }

    pub fn dispatch<F>(&self, update: F)
    where
        F: FnOnce(&M) + Send + 'static,
    {
        let sink = Arc::clone(&self.sink);
        match tokio::runtime::Handle::try_current() {
            Ok(handle) => {
                handle.spawn(async move { update(&sink) });
            }
            Err(_) => {
                tracing::debug!("No tokio runtime available, dropping metrics update");
            }
        }
    }
}

impl MetricsDispatcher<dyn UserMetrics> {
    pub fn noop_users() -> Self {
        Self::new(Arc::new(NoopMetrics))
    }
}

impl MetricsDispatcher<dyn MittMetrics> {
    pub fn noop_mitts() -> Self {
        Self::new(Arc::new(NoopMetrics))
    }
}
