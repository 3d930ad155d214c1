//! Owns a presence provider and walks it through its one-way lifecycle

use super::status::StatusRecord;
use super::traits::{ApplicationId, EventHandlers, PresenceProvider};
use crate::error::PresenceError;

/// Lifecycle of a publisher. Transitions only move forward.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PublisherState {
    Uninitialized,
    Connected,
    Disconnected,
}

/// Drives one provider through connect, publish and disconnect
pub struct PresencePublisher {
    provider: Box<dyn PresenceProvider>,
    state: PublisherState,
    publish_count: usize,
}

impl PresencePublisher {
    pub fn new(provider: Box<dyn PresenceProvider>) -> Self {
        Self {
            provider,
            state: PublisherState::Uninitialized,
            publish_count: 0,
        }
    }

    pub fn state(&self) -> PublisherState {
        self.state
    }

    /// Number of status records handed to the provider
    pub fn publish_count(&self) -> usize {
        self.publish_count
    }

    pub fn provider_name(&self) -> &'static str {
        self.provider.name()
    }

    /// Establish the connection. A failed attempt is final: the publisher moves to
    /// `Disconnected` and cannot be reconnected.
    pub async fn connect(
        &mut self,
        app_id: ApplicationId,
        handlers: EventHandlers,
    ) -> Result<(), PresenceError> {
        if self.state != PublisherState::Uninitialized {
            return Err(PresenceError::InvalidTransition {
                operation: "connect",
                state: self.state,
            });
        }

        tracing::info!("Connecting to {} as application {}", self.provider.name(), app_id);

        match self.provider.connect(app_id, handlers).await {
            Ok(()) => {
                self.state = PublisherState::Connected;
                Ok(())
            }
            Err(e) => {
                self.state = PublisherState::Disconnected;
                Err(e)
            }
        }
    }

    /// Submit `record`, replacing whatever was announced before
    pub async fn publish(&mut self, record: &StatusRecord) -> Result<(), PresenceError> {
        if self.state != PublisherState::Connected {
            return Err(PresenceError::NotConnected { state: self.state });
        }

        if !record.is_complete() {
            tracing::warn!(
                "Publishing a partially filled status, missing: {}",
                record.missing_fields().join(", ")
            );
        }

        tracing::debug!("Publishing status via {}: {:?}", self.provider.name(), record);
        self.publish_count += 1;
        self.provider.publish(record).await
    }

    /// Release the connection. The publisher ends up `Disconnected` even when the
    /// provider reports an error.
    pub async fn disconnect(&mut self) -> Result<(), PresenceError> {
        if self.state != PublisherState::Connected {
            return Err(PresenceError::InvalidTransition {
                operation: "disconnect",
                state: self.state,
            });
        }

        self.state = PublisherState::Disconnected;
        let result = self.provider.disconnect().await;
        tracing::info!("Disconnected from {}", self.provider.name());
        result
    }
}

impl Drop for PresencePublisher {
    fn drop(&mut self) {
        if self.state == PublisherState::Connected {
            tracing::warn!(
                "{} publisher dropped while connected; releasing the handle without a clean disconnect",
                self.provider.name()
            );
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::presence::testing::{Call, RecordingProvider};

    fn app_id() -> ApplicationId {
        ApplicationId::new(1240787761129197669)
    }

    fn record() -> StatusRecord {
        StatusRecord::builder()
            .state("Listening to DM's")
            .details("DM To Get Help")
            .large_image_text("Numbani")
            .party_id("ae488379-351d-4a4f-ad32-2b9b01c91657")
            .join_secret("MTI4NzM0OjFpMmhuZToxMjMxMjM=")
            .build()
    }

    #[tokio::test]
    async fn walks_the_lifecycle_in_order() {
        let (provider, calls) = RecordingProvider::new();
        let mut publisher = PresencePublisher::new(Box::new(provider));
        assert_eq!(publisher.state(), PublisherState::Uninitialized);

        publisher.connect(app_id(), EventHandlers::default()).await.unwrap();
        assert_eq!(publisher.state(), PublisherState::Connected);

        publisher.publish(&record()).await.unwrap();
        publisher.disconnect().await.unwrap();
        assert_eq!(publisher.state(), PublisherState::Disconnected);
        assert_eq!(publisher.publish_count(), 1);

        assert_eq!(
            *calls.lock().unwrap(),
            vec![
                Call::Connect(app_id()),
                Call::Publish(record()),
                Call::Disconnect,
            ]
        );
    }

    #[tokio::test]
    async fn publish_before_connect_is_rejected() {
        let (provider, calls) = RecordingProvider::new();
        let mut publisher = PresencePublisher::new(Box::new(provider));

        let err = publisher.publish(&record()).await.unwrap_err();
        assert!(matches!(
            err,
            PresenceError::NotConnected {
                state: PublisherState::Uninitialized
            }
        ));
        assert!(calls.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn connect_happens_only_once() {
        let (provider, calls) = RecordingProvider::new();
        let mut publisher = PresencePublisher::new(Box::new(provider));

        publisher.connect(app_id(), EventHandlers::default()).await.unwrap();
        let err = publisher
            .connect(app_id(), EventHandlers::default())
            .await
            .unwrap_err();
        assert!(matches!(
            err,
            PresenceError::InvalidTransition {
                operation: "connect",
                ..
            }
        ));
        assert_eq!(calls.lock().unwrap().len(), 1);
    }

    #[tokio::test]
    async fn failed_connect_is_terminal() {
        let (provider, calls) = RecordingProvider::failing_connect();
        let mut publisher = PresencePublisher::new(Box::new(provider));

        assert!(publisher.connect(app_id(), EventHandlers::default()).await.is_err());
        assert_eq!(publisher.state(), PublisherState::Disconnected);

        assert!(publisher.publish(&record()).await.is_err());
        assert!(publisher.disconnect().await.is_err());
        assert_eq!(*calls.lock().unwrap(), vec![Call::Connect(app_id())]);
    }

    #[tokio::test]
    async fn disconnect_happens_only_once() {
        let (provider, calls) = RecordingProvider::new();
        let mut publisher = PresencePublisher::new(Box::new(provider));

        publisher.connect(app_id(), EventHandlers::default()).await.unwrap();
        publisher.disconnect().await.unwrap();

        assert!(publisher.disconnect().await.is_err());
        assert!(publisher.publish(&record()).await.is_err());

        let calls = calls.lock().unwrap();
        assert_eq!(calls.iter().filter(|c| **c == Call::Disconnect).count(), 1);
    }

    #[tokio::test]
    async fn partial_record_is_still_published() {
        let (provider, calls) = RecordingProvider::new();
        let mut publisher = PresencePublisher::new(Box::new(provider));
        let partial = StatusRecord::builder().state("Listening to DM's").build();

        publisher.connect(app_id(), EventHandlers::default()).await.unwrap();
        publisher.publish(&partial).await.unwrap();

        assert!(calls.lock().unwrap().contains(&Call::Publish(partial)));
    }

    #[tokio::test]
    async fn provider_error_on_disconnect_still_moves_to_disconnected() {
        let (provider, _calls) = RecordingProvider::failing_disconnect();
        let mut publisher = PresencePublisher::new(Box::new(provider));

        publisher.connect(app_id(), EventHandlers::default()).await.unwrap();
        assert!(publisher.disconnect().await.is_err());
        assert_eq!(publisher.state(), PublisherState::Disconnected);
    }
}
