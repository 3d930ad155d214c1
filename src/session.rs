//! One presence session: connect, publish, hold, disconnect

use std::future::Future;
use std::io;
use std::time::Duration;

use crate::error::PresenceError;
use crate::presence::{
    ApplicationId, EventHandlers, PresenceProvider, PresencePublisher, StatusRecord,
};

/// What to do between publishing and disconnecting
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Hold {
    /// Disconnect right after publishing
    #[default]
    None,
    For(Duration),
    /// Keep the presence up until Ctrl-C
    UntilInterrupted,
}

/// Outcome of each step. Service failures land here instead of aborting the session.
#[derive(Debug, Default)]
pub struct SessionReport {
    pub connect: Option<Result<(), PresenceError>>,
    pub publish: Option<Result<(), PresenceError>>,
    pub disconnect: Option<Result<(), PresenceError>>,
}

impl SessionReport {
    /// Whether every step that ran succeeded and the status went out
    pub fn is_clean(&self) -> bool {
        let ok = |step: &Option<Result<(), PresenceError>>| matches!(step, Some(Ok(())));
        ok(&self.connect) && ok(&self.publish) && ok(&self.disconnect)
    }

    pub fn errors(&self) -> impl Iterator<Item = &PresenceError> + '_ {
        [&self.connect, &self.publish, &self.disconnect]
            .into_iter()
            .filter_map(|step| step.as_ref().and_then(|r| r.as_ref().err()))
    }
}

/// Run one session against `provider`. Errors from the service are logged and
/// recorded in the report; none of them stops the session early, and the
/// connection is released whenever it was established.
pub async fn run_session(
    provider: Box<dyn PresenceProvider>,
    app_id: ApplicationId,
    handlers: EventHandlers,
    record: &StatusRecord,
    hold: Hold,
) -> SessionReport {
    let mut publisher = PresencePublisher::new(provider);
    let name = publisher.provider_name();
    let mut report = SessionReport::default();

    let connected = publisher.connect(app_id, handlers).await;
    if let Err(e) = &connected {
        tracing::warn!("Could not connect to {}: {}", name, e);
    }
    let is_connected = connected.is_ok();
    report.connect = Some(connected);

    if !is_connected {
        return report;
    }

    let published = publisher.publish(record).await;
    match &published {
        Ok(()) => tracing::info!("Status published via {}", name),
        Err(e) => tracing::warn!("Failed to publish status via {}: {}", name, e),
    }
    report.publish = Some(published);

    wait(hold, tokio::signal::ctrl_c()).await;

    let disconnected = publisher.disconnect().await;
    if let Err(e) = &disconnected {
        tracing::warn!("Error while disconnecting from {}: {}", name, e);
    }
    report.disconnect = Some(disconnected);

    report
}

/// Sleep according to `hold`. An interrupt always ends the hold early so the
/// connection still gets released.
async fn wait(hold: Hold, interrupted: impl Future<Output = io::Result<()>>) {
    match hold {
        Hold::None => {}
        Hold::For(duration) => {
            tracing::info!("Holding presence for {}s", duration.as_secs());
            tokio::select! {
                _ = tokio::time::sleep(duration) => {}
                result = interrupted => match result {
                    Ok(()) => tracing::info!("Interrupted, releasing presence early"),
                    Err(e) => tracing::warn!("Failed to listen for Ctrl-C: {}", e),
                },
            }
        }
        Hold::UntilInterrupted => {
            tracing::info!("Holding presence until interrupted (Ctrl-C)");
            if let Err(e) = interrupted.await {
                tracing::warn!("Failed to listen for Ctrl-C, releasing presence now: {}", e);
            }
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

    fn help_desk_record() -> StatusRecord {
        StatusRecord::builder()
            .state("Listening to DM's")
            .details("DM To Get Help")
            .large_image_text("Numbani")
            .party_id("ae488379-351d-4a4f-ad32-2b9b01c91657")
            .join_secret("MTI4NzM0OjFpMmhuZToxMjMxMjM=")
            .build()
    }

    #[tokio::test]
    async fn publishes_exactly_once_with_literal_values() {
        let (provider, calls) = RecordingProvider::new();
        let report = run_session(
            Box::new(provider),
            app_id(),
            EventHandlers::default(),
            &help_desk_record(),
            Hold::None,
        )
        .await;

        assert!(report.is_clean());
        let calls = calls.lock().unwrap();
        assert_eq!(calls.len(), 3);
        assert_eq!(calls[0], Call::Connect(app_id()));
        assert_eq!(calls[2], Call::Disconnect);

        let published: Vec<_> = calls
            .iter()
            .filter_map(|c| match c {
                Call::Publish(record) => Some(record),
                _ => None,
            })
            .collect();
        assert_eq!(published.len(), 1);
        let record = published[0];
        assert_eq!(record.state(), "Listening to DM's");
        assert_eq!(record.details(), "DM To Get Help");
        assert_eq!(record.large_image_text(), "Numbani");
        assert_eq!(record.party_id(), "ae488379-351d-4a4f-ad32-2b9b01c91657");
        assert_eq!(record.join_secret(), "MTI4NzM0OjFpMmhuZToxMjMxMjM=");
    }

    #[tokio::test]
    async fn connect_failure_is_recorded_not_raised() {
        let (provider, calls) = RecordingProvider::failing_connect();
        let report = run_session(
            Box::new(provider),
            app_id(),
            EventHandlers::default(),
            &help_desk_record(),
            Hold::None,
        )
        .await;

        assert!(!report.is_clean());
        assert!(matches!(
            report.connect,
            Some(Err(PresenceError::Unavailable { .. }))
        ));
        assert!(report.publish.is_none());
        assert!(report.disconnect.is_none());
        assert_eq!(*calls.lock().unwrap(), vec![Call::Connect(app_id())]);
    }

    #[tokio::test]
    async fn publish_failure_still_disconnects() {
        let (provider, calls) = RecordingProvider::failing_publish();
        let report = run_session(
            Box::new(provider),
            app_id(),
            EventHandlers::default(),
            &help_desk_record(),
            Hold::None,
        )
        .await;

        assert!(matches!(report.publish, Some(Err(PresenceError::Rejected { .. }))));
        assert!(matches!(report.disconnect, Some(Ok(()))));
        assert_eq!(report.errors().count(), 1);
        assert_eq!(calls.lock().unwrap().last(), Some(&Call::Disconnect));
    }

    #[tokio::test]
    async fn disconnect_failure_is_recorded() {
        let (provider, _calls) = RecordingProvider::failing_disconnect();
        let report = run_session(
            Box::new(provider),
            app_id(),
            EventHandlers::default(),
            &help_desk_record(),
            Hold::None,
        )
        .await;

        assert!(matches!(report.publish, Some(Ok(()))));
        assert!(matches!(
            report.disconnect,
            Some(Err(PresenceError::Disconnected { .. }))
        ));
    }

    #[tokio::test(start_paused = true)]
    async fn holds_before_disconnecting() {
        let (provider, calls) = RecordingProvider::new();
        let started = tokio::time::Instant::now();

        let report = run_session(
            Box::new(provider),
            app_id(),
            EventHandlers::default(),
            &help_desk_record(),
            Hold::For(Duration::from_secs(60)),
        )
        .await;

        assert!(report.is_clean());
        assert!(started.elapsed() >= Duration::from_secs(60));
        assert_eq!(calls.lock().unwrap().last(), Some(&Call::Disconnect));
    }

    #[tokio::test]
    async fn dry_run_provider_completes_cleanly() {
        let report = run_session(
            Box::new(crate::presence::LogPresence::new()),
            app_id(),
            EventHandlers::logging(),
            &help_desk_record(),
            Hold::None,
        )
        .await;

        assert!(report.is_clean());
    }

    #[tokio::test(start_paused = true)]
    async fn interrupt_cuts_a_timed_hold_short() {
        let started = tokio::time::Instant::now();
        let interrupt = async {
            tokio::time::sleep(Duration::from_secs(2)).await;
            Ok::<(), std::io::Error>(())
        };

        wait(Hold::For(Duration::from_secs(60)), interrupt).await;

        let elapsed = started.elapsed();
        assert!(elapsed >= Duration::from_secs(2));
        assert!(elapsed < Duration::from_secs(60));
    }

    #[tokio::test(start_paused = true)]
    async fn timed_hold_runs_to_completion_without_interrupt() {
        let started = tokio::time::Instant::now();

        wait(Hold::For(Duration::from_secs(60)), std::future::pending()).await;

        assert!(started.elapsed() >= Duration::from_secs(60));
    }
}
