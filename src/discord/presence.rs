//! Discord Rich Presence integration using discord-sdk

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use discord_sdk::{
    activity::{events::ActivityEvent, ActivityBuilder, Assets, PartyPrivacy, Secrets},
    wheel::{ActivitySpoke, UserSpoke, UserState, Wheel},
    Discord, Subscriptions,
};
use tokio::sync::broadcast::error::RecvError;
use tokio::task::JoinHandle;

use crate::error::PresenceError;
use crate::presence::{ApplicationId, EventHandlers, PresenceProvider, StatusRecord};

const PROVIDER: &str = "Discord";

/// Timeout for waiting for Discord handshake
const HANDSHAKE_TIMEOUT: Duration = Duration::from_secs(10);

/// Presence provider backed by the local Discord client's IPC channel
#[derive(Default)]
pub struct DiscordPresence {
    discord: Option<Discord>,
    forwarder: Option<JoinHandle<()>>,
}

impl DiscordPresence {
    pub fn new() -> Self {
        Self::default()
    }

    fn connected(&self) -> Result<&Discord, PresenceError> {
        self.discord.as_ref().ok_or_else(|| PresenceError::Disconnected {
            provider: PROVIDER,
            reason: "no active connection".to_string(),
        })
    }

    /// Wait for the first user state change, which Discord sends once the handshake is done
    async fn await_handshake(user_spoke: &mut UserSpoke) -> Result<String, PresenceError> {
        let outcome = tokio::time::timeout(HANDSHAKE_TIMEOUT, async {
            if user_spoke.0.changed().await.is_err() {
                return Err("Discord connection closed".to_string());
            }

            match &*user_spoke.0.borrow() {
                UserState::Connected(user) => Ok(format!(
                    "{}#{}",
                    user.username,
                    user.discriminator.unwrap_or(0)
                )),
                UserState::Disconnected(err) => Err(format!("{:?}", err)),
            }
        })
        .await;

        match outcome {
            Ok(Ok(user)) => Ok(user),
            Ok(Err(reason)) => Err(PresenceError::Disconnected {
                provider: PROVIDER,
                reason,
            }),
            Err(_) => Err(PresenceError::HandshakeTimeout {
                provider: PROVIDER,
                secs: HANDSHAKE_TIMEOUT.as_secs(),
            }),
        }
    }

    /// Route user and activity events from the wheel to the caller's handlers
    async fn forward_events(
        mut user_spoke: UserSpoke,
        mut activity_spoke: ActivitySpoke,
        handlers: Arc<EventHandlers>,
    ) {
        loop {
            tokio::select! {
                changed = user_spoke.0.changed() => {
                    if changed.is_err() {
                        break;
                    }

                    let reason = match &*user_spoke.0.borrow() {
                        UserState::Disconnected(err) => Some(format!("{:?}", err)),
                        UserState::Connected(_) => None,
                    };
                    if let Some(reason) = reason {
                        handlers.on_disconnected(&reason);
                    }
                }
                event = activity_spoke.0.recv() => match event {
                    Ok(ActivityEvent::Join(join)) => handlers.on_join_game(&join.secret),
                    Ok(ActivityEvent::Spectate(spectate)) => {
                        handlers.on_spectate_game(&spectate.secret)
                    }
                    Ok(ActivityEvent::JoinRequest(request)) => {
                        handlers.on_join_request(&request.user.username)
                    }
                    Ok(_) => {}
                    Err(RecvError::Lagged(skipped)) => {
                        tracing::debug!("Dropped {} Discord activity events", skipped);
                    }
                    Err(RecvError::Closed) => break,
                },
            }
        }

        tracing::debug!("Discord event forwarder stopped");
    }
}

/// Map a status record onto a Discord activity. Empty fields are left unset.
fn build_activity(record: &StatusRecord) -> ActivityBuilder {
    let mut activity = ActivityBuilder::new();

    if !record.state().is_empty() {
        activity = activity.state(record.state());
    }
    if !record.details().is_empty() {
        activity = activity.details(record.details());
    }

    match record.large_image_key() {
        Some(key) => {
            let text = Some(record.large_image_text()).filter(|t| !t.is_empty());
            activity = activity.assets(Assets::default().large(key, text));
        }
        None if !record.large_image_text().is_empty() => {
            tracing::debug!("No large image key configured, Discord will not show the caption");
        }
        None => {}
    }

    if !record.party_id().is_empty() {
        activity = activity.party(record.party_id(), None, None, PartyPrivacy::Private);
    }
    if !record.join_secret().is_empty() {
        activity = activity.secrets(Secrets {
            join: Some(record.join_secret().to_string()),
            ..Default::default()
        });
    }

    activity
}

#[async_trait]
impl PresenceProvider for DiscordPresence {
    fn name(&self) -> &'static str {
        PROVIDER
    }

    async fn connect(
        &mut self,
        app_id: ApplicationId,
        handlers: EventHandlers,
    ) -> Result<(), PresenceError> {
        let handlers = Arc::new(handlers);
        let error_handlers = Arc::clone(&handlers);

        let (wheel, handler) = Wheel::new(Box::new(move |err| {
            tracing::warn!("Discord error: {:?}", err);
            error_handlers.on_errored(&format!("{:?}", err));
        }));

        let mut user_spoke = wheel.user();
        let activity_spoke = wheel.activity();

        let discord = Discord::new(app_id.get(), Subscriptions::ACTIVITY, Box::new(handler))
            .map_err(|e| PresenceError::Unavailable {
                provider: PROVIDER,
                message: format!("{:?}", e),
            })?;

        tracing::info!("Discord connecting...");

        let user = Self::await_handshake(&mut user_spoke).await?;
        tracing::info!("Discord Rich Presence connected as {}", user);
        handlers.on_ready(&user);

        self.forwarder = Some(tokio::spawn(Self::forward_events(
            user_spoke,
            activity_spoke,
            handlers,
        )));
        self.discord = Some(discord);

        Ok(())
    }

    async fn publish(&mut self, record: &StatusRecord) -> Result<(), PresenceError> {
        let discord = self.connected()?;

        discord
            .update_activity(build_activity(record))
            .await
            .map_err(|e| PresenceError::Rejected {
                provider: PROVIDER,
                message: format!("{:?}", e),
            })?;

        Ok(())
    }

    async fn disconnect(&mut self) -> Result<(), PresenceError> {
        if let Some(forwarder) = self.forwarder.take() {
            forwarder.abort();
        }

        let discord = self.discord.take().ok_or_else(|| PresenceError::Disconnected {
            provider: PROVIDER,
            reason: "no active connection".to_string(),
        })?;

        discord.disconnect().await;
        tracing::info!("Discord Rich Presence disconnected");
        Ok(())
    }
}

impl Drop for DiscordPresence {
    fn drop(&mut self) {
        if let Some(forwarder) = self.forwarder.take() {
            forwarder.abort();
        }
    }
}
