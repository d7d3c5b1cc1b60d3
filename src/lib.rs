pub mod commands;
pub mod input;
pub mod pipeline;
pub mod settings;

#[cfg(test)]
mod fakes;

use anyhow::Result;
use farm_data::{ConfigPort, JsonProfileStore};
use farm_state::RunState;
use farm_vision::DesktopScreen;
use std::sync::Arc;
use tracing::{error, info};

use pipeline::Pipeline;
use settings::Settings;

pub async fn run() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| {
                "soulfarm=info,farm_vision=info,farm_data=info,farm_capture=info".into()
            }),
        )
        .init();

    let settings = Settings::from_env()?;
    info!("Config: {}", settings.config_path.display());
    info!("Assets: {}", settings.assets_dir.display());

    let store = JsonProfileStore::open(&settings.config_path)?;
    let profile_name = settings
        .profile
        .clone()
        .unwrap_or_else(|| store.current_profile_name());
    let profile = store.load_profile(&profile_name).inspect_err(|_| {
        error!("Available profiles: {}", store.list_profiles().join(", "));
    })?;

    let state = Arc::new(RunState::new());
    let input = input::create_input(settings.dry_run);
    let screen = DesktopScreen::new(&settings.assets_dir);
    let mut pipeline = Pipeline::new(input, Box::new(screen), profile, state.clone());

    // Ctrl-C goes through the same stop path as the hotkey so cleanup still runs
    let interrupt_state = state.clone();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            info!("Interrupt received");
            interrupt_state.stop();
        }
    });

    let summary = tokio::task::spawn_blocking(move || pipeline.run()).await??;
    info!("Session totals: {}", serde_json::to_string(&summary)?);
    Ok(())
}
