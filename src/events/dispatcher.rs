use async_trait::async_trait;
use std::sync::Arc;
use tokio::sync::mpsc;
use tracing::{debug, warn};
use uuid::Uuid;

use super::types::{EventEnvelope, EventType, TransactionEvent};

/// Notification delivery, owned by the platform's messaging service.
/// Fire-and-forget: the engine never waits on the result.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait NotificationSink: Send + Sync {
    async fn notify(&self, event: &EventEnvelope<TransactionEvent>) -> anyhow::Result<()>;
}

/// Rewards accrual, owned by the platform's loyalty service. Best-effort.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait RewardsSink: Send + Sync {
    async fn earn_points(&self, user_id: Uuid, event: &TransactionEvent) -> anyhow::Result<()>;
}

/// Decouples side effects from the transactional critical path. Events are
/// queued on an unbounded channel once a transaction reaches a terminal
/// state; a worker task drains them and invokes the sinks. Sink failures are
/// logged and never propagate back to the money movement.
#[derive(Clone)]
pub struct SideEffectDispatcher {
    sender: mpsc::UnboundedSender<EventEnvelope<TransactionEvent>>,
}

impl SideEffectDispatcher {
    /// Spawns the worker task. Must be called from within a tokio runtime.
    pub fn spawn(
        notifications: Arc<dyn NotificationSink>,
        rewards: Arc<dyn RewardsSink>,
    ) -> Self {
        let (sender, mut receiver) = mpsc::unbounded_channel::<EventEnvelope<TransactionEvent>>();

        tokio::spawn(async move {
            while let Some(envelope) = receiver.recv().await {
                debug!(
                    event_id = %envelope.event_id,
                    event_type = ?envelope.event_type,
                    transaction = %envelope.payload.transaction_number,
                    "dispatching side effects"
                );

                if let Err(error) = notifications.notify(&envelope).await {
                    warn!(
                        event_id = %envelope.event_id,
                        %error,
                        "notification dispatch failed"
                    );
                }

                // Rewards accrue only on successfully completed transactions.
                if envelope.event_type == EventType::TransactionCompleted {
                    if let Err(error) = rewards
                        .earn_points(envelope.payload.user_id, &envelope.payload)
                        .await
                    {
                        warn!(
                            event_id = %envelope.event_id,
                            %error,
                            "rewards accrual failed"
                        );
                    }
                }
            }
        });

        Self { sender }
    }

    /// Queues an event. Never blocks and never fails the caller; if the
    /// worker is gone the event is dropped with a warning.
    pub fn dispatch(&self, envelope: EventEnvelope<TransactionEvent>) {
        if self.sender.send(envelope).is_err() {
            warn!("side-effect worker is gone; event dropped");
        }
    }
}

/// Default sink that just logs. Used by the demo binary.
#[derive(Debug, Default)]
pub struct LoggingSink;

#[async_trait]
impl NotificationSink for LoggingSink {
    async fn notify(&self, event: &EventEnvelope<TransactionEvent>) -> anyhow::Result<()> {
        tracing::info!(
            transaction = %event.payload.transaction_number,
            event_type = ?event.event_type,
            "notification sent"
        );
        Ok(())
    }
}

#[async_trait]
impl RewardsSink for LoggingSink {
    async fn earn_points(&self, user_id: Uuid, event: &TransactionEvent) -> anyhow::Result<()> {
        tracing::info!(
            %user_id,
            transaction = %event.transaction_number,
            "rewards points accrued"
        );
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::Transaction;
    use anyhow::anyhow;
    use rust_decimal_macros::dec;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::time::Duration;

    struct CountingSink {
        notified: AtomicUsize,
        rewarded: AtomicUsize,
        fail_notify: bool,
    }

    impl CountingSink {
        fn new(fail_notify: bool) -> Self {
            Self {
                notified: AtomicUsize::new(0),
                rewarded: AtomicUsize::new(0),
                fail_notify,
            }
        }
    }

    #[async_trait]
    impl NotificationSink for CountingSink {
        async fn notify(&self, _event: &EventEnvelope<TransactionEvent>) -> anyhow::Result<()> {
            self.notified.fetch_add(1, Ordering::SeqCst);
            if self.fail_notify {
                Err(anyhow!("smtp down"))
            } else {
                Ok(())
            }
        }
    }

    #[async_trait]
    impl RewardsSink for CountingSink {
        async fn earn_points(
            &self,
            _user_id: Uuid,
            _event: &TransactionEvent,
        ) -> anyhow::Result<()> {
            self.rewarded.fetch_add(1, Ordering::SeqCst);
            Ok(())
        }
    }

    fn completed_event() -> EventEnvelope<TransactionEvent> {
        let mut tx = Transaction::deposit("TXN-E", Uuid::new_v4(), dec!(10), "USD");
        tx.complete();
        EventEnvelope::new(
            EventType::TransactionCompleted,
            TransactionEvent::from_transaction(&tx, Uuid::new_v4()),
        )
    }

    #[tokio::test]
    async fn test_dispatch_reaches_both_sinks() {
        let sink = Arc::new(CountingSink::new(false));
        let dispatcher = SideEffectDispatcher::spawn(
            sink.clone() as Arc<dyn NotificationSink>,
            sink.clone() as Arc<dyn RewardsSink>,
        );

        dispatcher.dispatch(completed_event());

        // Give the worker a moment to drain the queue.
        tokio::time::sleep(Duration::from_millis(50)).await;
        assert_eq!(sink.notified.load(Ordering::SeqCst), 1);
        assert_eq!(sink.rewarded.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_notification_failure_does_not_stop_rewards() {
        let sink = Arc::new(CountingSink::new(true));
        let dispatcher = SideEffectDispatcher::spawn(
            sink.clone() as Arc<dyn NotificationSink>,
            sink.clone() as Arc<dyn RewardsSink>,
        );

        dispatcher.dispatch(completed_event());
        dispatcher.dispatch(completed_event());

        tokio::time::sleep(Duration::from_millis(50)).await;
        assert_eq!(sink.notified.load(Ordering::SeqCst), 2);
        assert_eq!(sink.rewarded.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn test_failed_transactions_earn_no_rewards() {
        let sink = Arc::new(CountingSink::new(false));
        let dispatcher = SideEffectDispatcher::spawn(
            sink.clone() as Arc<dyn NotificationSink>,
            sink.clone() as Arc<dyn RewardsSink>,
        );

        let mut tx = Transaction::deposit("TXN-F", Uuid::new_v4(), dec!(10), "USD");
        tx.fail("compliance");
        dispatcher.dispatch(EventEnvelope::new(
            EventType::TransactionFailed,
            TransactionEvent::from_transaction(&tx, Uuid::new_v4()),
        ));

        tokio::time::sleep(Duration::from_millis(50)).await;
        assert_eq!(sink.notified.load(Ordering::SeqCst), 1);
        assert_eq!(sink.rewarded.load(Ordering::SeqCst), 0);
    }
}
