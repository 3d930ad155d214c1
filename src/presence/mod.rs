mod log;
mod publisher;
mod status;
mod traits;

#[cfg(test)]
pub(crate) mod testing;

pub use log::LogPresence;
pub use publisher::{PresencePublisher, PublisherState};
pub use status::{StatusRecord, StatusRecordBuilder};
pub use traits::{ApplicationId, EventHandlers, PresenceProvider};
