//! Recording fake provider shared by the unit tests

use std::sync::{Arc, Mutex};

use async_trait::async_trait;

use super::status::StatusRecord;
use super::traits::{ApplicationId, EventHandlers, PresenceProvider};
use crate::error::PresenceError;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Call {
    Connect(ApplicationId),
    Publish(StatusRecord),
    Disconnect,
}

pub type CallLog = Arc<Mutex<Vec<Call>>>;

pub struct RecordingProvider {
    calls: CallLog,
    fail_connect: bool,
    fail_publish: bool,
    fail_disconnect: bool,
}

impl RecordingProvider {
    pub fn new() -> (Self, CallLog) {
        Self::with_failures(false, false, false)
    }

    pub fn failing_connect() -> (Self, CallLog) {
        Self::with_failures(true, false, false)
    }

    pub fn failing_publish() -> (Self, CallLog) {
        Self::with_failures(false, true, false)
    }

    pub fn failing_disconnect() -> (Self, CallLog) {
        Self::with_failures(false, false, true)
    }

    fn with_failures(
        fail_connect: bool,
        fail_publish: bool,
        fail_disconnect: bool,
    ) -> (Self, CallLog) {
        let calls = CallLog::default();
        let provider = Self {
            calls: Arc::clone(&calls),
            fail_connect,
            fail_publish,
            fail_disconnect,
        };
        (provider, calls)
    }

    fn record(&self, call: Call) {
        self.calls.lock().unwrap().push(call);
    }
}

#[async_trait]
impl PresenceProvider for RecordingProvider {
    fn name(&self) -> &'static str {
        "Recording"
    }

    async fn connect(
        &mut self,
        app_id: ApplicationId,
        handlers: EventHandlers,
    ) -> Result<(), PresenceError> {
        self.record(Call::Connect(app_id));
        if self.fail_connect {
            return Err(PresenceError::Unavailable {
                provider: "Recording",
                message: "service not running".to_string(),
            });
        }
        handlers.on_ready("tester");
        Ok(())
    }

    async fn publish(&mut self, record: &StatusRecord) -> Result<(), PresenceError> {
        self.record(Call::Publish(record.clone()));
        if self.fail_publish {
            return Err(PresenceError::Rejected {
                provider: "Recording",
                message: "invalid activity".to_string(),
            });
        }
        Ok(())
    }

    async fn disconnect(&mut self) -> Result<(), PresenceError> {
        self.record(Call::Disconnect);
        if self.fail_disconnect {
            return Err(PresenceError::Disconnected {
                provider: "Recording",
                reason: "pipe closed".to_string(),
            });
        }
        Ok(())
    }
}
