use std::fmt;
use std::str::FromStr;

use async_trait::async_trait;

use super::status::StatusRecord;
use crate::error::PresenceError;

/// Numeric application id the presence service attributes the announcement to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ApplicationId(i64);

impl ApplicationId {
    pub fn new(id: i64) -> Self {
        Self(id)
    }

    pub fn get(self) -> i64 {
        self.0
    }
}

impl FromStr for ApplicationId {
    type Err = PresenceError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.trim();
        if trimmed.is_empty() || !trimmed.bytes().all(|b| b.is_ascii_digit()) {
            return Err(PresenceError::InvalidApplicationId(s.to_string()));
        }

        trimmed
            .parse::<i64>()
            .map(Self)
            .map_err(|_| PresenceError::InvalidApplicationId(s.to_string()))
    }
}

impl fmt::Display for ApplicationId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

type Callback = Box<dyn Fn(&str) + Send + Sync>;

/// Callbacks invoked for events coming back from the presence service.
/// Every entry is optional; the default table ignores everything.
#[derive(Default)]
pub struct EventHandlers {
    pub ready: Option<Callback>,
    pub disconnected: Option<Callback>,
    pub errored: Option<Callback>,
    pub join_game: Option<Callback>,
    pub spectate_game: Option<Callback>,
    pub join_request: Option<Callback>,
}

impl EventHandlers {
    /// Handlers that only write each event to the log
    pub fn logging() -> Self {
        Self {
            ready: Some(Box::new(|user: &str| tracing::info!("Presence ready for {}", user))),
            disconnected: Some(Box::new(|reason: &str| {
                tracing::warn!("Presence service disconnected: {}", reason)
            })),
            errored: Some(Box::new(|message: &str| {
                tracing::warn!("Presence service error: {}", message)
            })),
            join_game: Some(Box::new(|_secret: &str| {
                tracing::info!("Received join-game event")
            })),
            spectate_game: Some(Box::new(|_secret: &str| {
                tracing::info!("Received spectate-game event")
            })),
            join_request: Some(Box::new(|user: &str| {
                tracing::info!("{} asked to join", user)
            })),
        }
    }

    pub fn on_ready(&self, user: &str) {
        Self::fire(&self.ready, user);
    }

    pub fn on_disconnected(&self, reason: &str) {
        Self::fire(&self.disconnected, reason);
    }

    pub fn on_errored(&self, message: &str) {
        Self::fire(&self.errored, message);
    }

    pub fn on_join_game(&self, secret: &str) {
        Self::fire(&self.join_game, secret);
    }

    pub fn on_spectate_game(&self, secret: &str) {
        Self::fire(&self.spectate_game, secret);
    }

    pub fn on_join_request(&self, user: &str) {
        Self::fire(&self.join_request, user);
    }

    fn fire(callback: &Option<Callback>, arg: &str) {
        if let Some(callback) = callback {
            callback(arg);
        }
    }
}

impl fmt::Debug for EventHandlers {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EventHandlers")
            .field("ready", &self.ready.is_some())
            .field("disconnected", &self.disconnected.is_some())
            .field("errored", &self.errored.is_some())
            .field("join_game", &self.join_game.is_some())
            .field("spectate_game", &self.spectate_game.is_some())
            .field("join_request", &self.join_request.is_some())
            .finish()
    }
}

/// Trait for presence services (Discord, dry-run logging, test fakes)
#[async_trait]
pub trait PresenceProvider: Send + Sync {
    /// Returns the name of this presence provider (for logging)
    fn name(&self) -> &'static str;

    /// Open the connection to the service
    async fn connect(
        &mut self,
        app_id: ApplicationId,
        handlers: EventHandlers,
    ) -> Result<(), PresenceError>;

    /// Replace the announced status with `record`
    async fn publish(&mut self, record: &StatusRecord) -> Result<(), PresenceError>;

    /// Release the connection
    async fn disconnect(&mut self) -> Result<(), PresenceError>;
}
