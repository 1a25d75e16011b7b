//! SinkHandle - manages a sink with isolated queue and worker task

use std::any::Any;
use std::panic::AssertUnwindSafe;
use std::sync::Arc;

use futures::FutureExt;
use tokio::sync::{mpsc, oneshot};
use tokio::task::JoinHandle;
use tracing::{debug, error, instrument, warn};

use contracts::{ContractError, EventSink, TrackedEvent};

use crate::metrics::SinkMetrics;
use crate::outcome::SinkOutcome;

type Reply = oneshot::Sender<Result<(), ContractError>>;

/// One queued delivery
struct Delivery {
    event: Arc<TrackedEvent>,
    reply: Reply,
}

/// Handle to a running sink worker
pub struct SinkHandle {
    name: String,
    tx: mpsc::Sender<Delivery>,
    metrics: Arc<SinkMetrics>,
    worker_handle: JoinHandle<()>,
}

/// An event handed to a sink worker, or refused at the queue
pub enum Submission {
    Pending {
        sink: String,
        reply: oneshot::Receiver<Result<(), ContractError>>,
        metrics: Arc<SinkMetrics>,
    },
    Refused(SinkOutcome),
}

impl Submission {
    /// Wait for the worker's verdict
    pub async fn outcome(self) -> SinkOutcome {
        match self {
            Submission::Refused(outcome) => outcome,
            Submission::Pending {
                sink,
                reply,
                metrics,
            } => match reply.await {
                Ok(Ok(())) => SinkOutcome::Delivered,
                Ok(Err(e)) => SinkOutcome::Failed {
                    reason: e.to_string(),
                },
                Err(_) => {
                    // Reply dropped: the worker task is gone
                    metrics.inc_failure_count();
                    error!(sink = %sink, "Sink worker stopped before replying");
                    SinkOutcome::Failed {
                        reason: format!("sink '{sink}' worker stopped"),
                    }
                }
            },
        }
    }
}

impl SinkHandle {
    /// Create a new SinkHandle and spawn the worker task
    pub fn spawn<S: EventSink + 'static>(sink: S, queue_capacity: usize) -> Self {
        let name = sink.name().to_string();
        let (tx, rx) = mpsc::channel(queue_capacity.max(1));
        let metrics = Arc::new(SinkMetrics::new());

        let worker_metrics = Arc::clone(&metrics);
        let worker_name = name.clone();

        let worker_handle = tokio::spawn(async move {
            sink_worker(sink, rx, worker_metrics, worker_name).await;
        });

        Self {
            name,
            tx,
            metrics,
            worker_handle,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn metrics(&self) -> &Arc<SinkMetrics> {
        &self.metrics
    }

    /// Queue an event for the sink (non-blocking)
    pub fn submit(&self, event: Arc<TrackedEvent>) -> Submission {
        let (reply_tx, reply_rx) = oneshot::channel();
        let delivery = Delivery {
            event,
            reply: reply_tx,
        };

        match self.tx.try_send(delivery) {
            Ok(()) => {
                self.metrics
                    .set_queue_len(self.tx.max_capacity() - self.tx.capacity());
                Submission::Pending {
                    sink: self.name.clone(),
                    reply: reply_rx,
                    metrics: Arc::clone(&self.metrics),
                }
            }
            Err(mpsc::error::TrySendError::Full(d)) => {
                self.metrics.inc_dropped_count();
                warn!(
                    sink = %self.name,
                    event = %d.event.name,
                    "Queue full, event dropped"
                );
                Submission::Refused(SinkOutcome::Dropped)
            }
            Err(mpsc::error::TrySendError::Closed(d)) => {
                self.metrics.inc_failure_count();
                error!(
                    sink = %self.name,
                    event = %d.event.name,
                    "Sink worker closed unexpectedly"
                );
                Submission::Refused(SinkOutcome::Failed {
                    reason: format!("sink '{}' worker stopped", self.name),
                })
            }
        }
    }

    /// Shutdown the sink worker gracefully
    #[instrument(name = "sink_handle_shutdown", skip(self), fields(sink = %self.name))]
    pub async fn shutdown(self) {
        // Dropping the sender lets the worker drain and exit
        drop(self.tx);
        if let Err(e) = self.worker_handle.await {
            error!(sink = %self.name, error = ?e, "Worker task panicked");
        }
        debug!(sink = %self.name, "SinkHandle shutdown complete");
    }
}

/// Worker task that consumes deliveries and writes to the sink
#[instrument(
    name = "sink_worker_loop",
    skip(sink, rx, metrics),
    fields(sink = %name)
)]
async fn sink_worker<S: EventSink>(
    mut sink: S,
    mut rx: mpsc::Receiver<Delivery>,
    metrics: Arc<SinkMetrics>,
    name: String,
) {
    debug!(sink = %name, "Sink worker started");

    while let Some(Delivery { event, reply }) = rx.recv().await {
        metrics.set_queue_len(rx.len());

        let result = match AssertUnwindSafe(sink.write(&event)).catch_unwind().await {
            Ok(result) => result,
            Err(payload) => Err(ContractError::sink_write(
                &name,
                format!("panicked: {}", panic_message(payload.as_ref())),
            )),
        };
        match &result {
            Ok(()) => metrics.inc_delivered_count(),
            Err(e) => {
                metrics.inc_failure_count();
                error!(
                    sink = %name,
                    event = %event.name,
                    error = %e,
                    "Write failed"
                );
            }
        }
        // Caller may have stopped waiting; nothing to do then
        let _ = reply.send(result);
    }

    if let Err(e) = sink.flush().await {
        error!(sink = %name, error = %e, "Flush failed on shutdown");
    }
    if let Err(e) = sink.close().await {
        error!(sink = %name, error = %e, "Close failed on shutdown");
    }

    debug!(sink = %name, "Sink worker stopped");
}

fn panic_message(payload: &(dyn Any + Send)) -> &str {
    if let Some(message) = payload.downcast_ref::<&str>() {
        message
    } else if let Some(message) = payload.downcast_ref::<String>() {
        message
    } else {
        "unknown panic"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mock::{MockSink, MockSinkConfig};
    use contracts::EventParams;
    use tokio::time::Duration;

    fn event(name: &str) -> Arc<TrackedEvent> {
        Arc::new(TrackedEvent::new(name, EventParams::new()))
    }

    #[tokio::test]
    async fn test_sink_handle_basic() {
        let sink = MockSink::new("test");
        let probe = sink.probe();
        let handle = SinkHandle::spawn(sink, 10);

        for _ in 0..5 {
            let outcome = handle.submit(event("screen_view")).outcome().await;
            assert_eq!(outcome, SinkOutcome::Delivered);
        }

        assert_eq!(handle.metrics().delivered_count(), 5);
        handle.shutdown().await;
        assert_eq!(probe.events().len(), 5);
        assert!(probe.is_closed());
    }

    #[tokio::test]
    async fn test_sink_handle_queue_full() {
        let sink = MockSink::with_config(
            "slow",
            MockSinkConfig {
                delay: Duration::from_millis(100),
                ..Default::default()
            },
        );
        let handle = SinkHandle::spawn(sink, 2);

        let submissions: Vec<_> = (0..10).map(|_| handle.submit(event("deposit"))).collect();
        let mut dropped = 0;
        for submission in submissions {
            if submission.outcome().await == SinkOutcome::Dropped {
                dropped += 1;
            }
        }

        assert!(dropped > 0);
        assert_eq!(handle.metrics().dropped_count(), dropped);
        handle.shutdown().await;
    }

    #[tokio::test]
    async fn test_sink_handle_failure_reported() {
        let handle = SinkHandle::spawn(MockSink::failing("failing"), 10);

        let outcome = handle.submit(event("deposit")).outcome().await;
        assert!(matches!(outcome, SinkOutcome::Failed { ref reason } if reason.contains("mock failure")));
        assert_eq!(handle.metrics().failure_count(), 1);

        // Worker keeps going after a failure
        let outcome = handle.submit(event("deposit")).outcome().await;
        assert!(matches!(outcome, SinkOutcome::Failed { .. }));

        handle.shutdown().await;
    }

    #[tokio::test]
    async fn test_sink_panic_fails_one_event_only() {
        let sink = MockSink::with_config(
            "panicky",
            MockSinkConfig {
                panic_on: Some("deposit".into()),
                ..Default::default()
            },
        );
        let probe = sink.probe();
        let handle = SinkHandle::spawn(sink, 10);

        let outcome = handle.submit(event("deposit")).outcome().await;
        assert!(matches!(outcome, SinkOutcome::Failed { ref reason } if reason.contains("panicked")));
        assert_eq!(handle.metrics().failure_count(), 1);

        // The same worker keeps serving later events
        let outcome = handle.submit(event("screen_view")).outcome().await;
        assert_eq!(outcome, SinkOutcome::Delivered);
        let outcome = handle.submit(event("deposit")).outcome().await;
        assert!(matches!(outcome, SinkOutcome::Failed { .. }));

        handle.shutdown().await;
        assert_eq!(probe.event_names(), vec!["screen_view"]);
        assert_eq!(probe.attempts(), 3);
        assert!(probe.is_closed());
    }
}
