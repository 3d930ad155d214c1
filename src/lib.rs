pub mod cli;
pub mod discord;
pub mod error;
pub mod logging;
pub mod presence;
pub mod session;
pub mod settings;

use anyhow::Context;

use cli::Cli;
use discord::DiscordPresence;
use presence::{EventHandlers, LogPresence, PresenceProvider};
use session::run_session;
use settings::{default_settings_path, Settings};

/// Resolve settings and run one presence session. Only configuration problems are
/// returned as errors; anything the presence service does wrong is logged.
pub async fn run(cli: Cli) -> anyhow::Result<()> {
    let base = match cli.config.as_deref() {
        // --write-config may be creating the file
        Some(path) if cli.write_config && !path.exists() => Settings::default(),
        path => Settings::load(path)?,
    };
    let settings = base.apply(cli.overrides());

    if cli.write_config {
        let path = match cli.config.clone() {
            Some(path) => path,
            None => default_settings_path().context("no config directory on this platform")?,
        };
        settings.save(&path)?;
        tracing::info!("Settings written to {}", path.display());
        return Ok(());
    }

    let app_id = settings.application_id()?;
    let record = settings.status_record();
    let hold = cli.hold(&settings);

    let provider: Box<dyn PresenceProvider> = if cli.dry_run {
        Box::new(LogPresence::new())
    } else {
        Box::new(DiscordPresence::new())
    };

    let report = run_session(provider, app_id, EventHandlers::logging(), &record, hold).await;

    if report.is_clean() {
        tracing::info!("Presence session finished");
    } else {
        let failures = report.errors().map(ToString::to_string).collect::<Vec<_>>();
        tracing::warn!(
            "Presence session finished with {} error(s): {}",
            failures.len(),
            failures.join("; ")
        );
    }

    Ok(())
}
