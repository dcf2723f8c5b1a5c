mod cli;
mod settings;
mod stats;
mod teas;
mod utils;

pub mod audio;
pub mod db;
pub mod gateway;
pub mod haptics;
pub mod locale;
pub mod timer;

use std::{sync::Arc, time::Duration};

use anyhow::{anyhow, Context, Result};
use audio::AudioEngineHandle;
use clap::Parser;
use cli::{Cli, Command, SettingsArgs, TeaCommand};
use db::Database;
use gateway::TeaLookup;
use haptics::{Haptics, TerminalHaptics};
use locale::Locale;
use settings::SettingsStore;
use timer::{commands::run_brew_session, BrewController, Cues};

struct AppState {
    audio: Arc<AudioEngineHandle>,
    db: Database,
    settings: SettingsStore,
    locale: Locale,
}

impl AppState {
    fn open(cli: &Cli) -> Result<Self> {
        std::fs::create_dir_all(&cli.data_dir).with_context(|| {
            format!("failed to create data directory {}", cli.data_dir.display())
        })?;

        let db = Database::new(cli.data_dir.join("teadiary.sqlite3"))?;
        let settings = SettingsStore::new(cli.data_dir.join("settings.json"))?;
        let locale = match cli.locale {
            Some(locale) => locale,
            None => settings.locale()?,
        };

        Ok(Self {
            audio: Arc::new(AudioEngineHandle::new(settings.chime_enabled()?)),
            db,
            settings,
            locale,
        })
    }

    fn haptics(&self) -> Result<Haptics> {
        Ok(Haptics::new(
            Arc::new(TerminalHaptics),
            self.settings.vibration_enabled()?,
        ))
    }

    fn cues(&self) -> Result<Cues> {
        Ok(Cues::new(self.haptics()?, self.audio.clone()))
    }
}

async fn brew(state: &AppState, tea_id: &str) -> Result<()> {
    let tea = state
        .db
        .get_tea(tea_id)
        .await?
        .ok_or_else(|| anyhow!("Tea {tea_id} not found"))?;

    let controller = BrewController::open(tea, Arc::new(state.db.clone()), state.cues()?).await;
    run_brew_session(controller, state.locale).await?;

    if let Err(err) = state.audio.stop() {
        log::warn!("Failed to stop audio: {err}");
    }
    Ok(())
}

fn apply_settings(state: &AppState, args: SettingsArgs) -> Result<()> {
    if let Some(enabled) = args.vibration {
        state.settings.update_vibration(enabled)?;
        Haptics::new(Arc::new(TerminalHaptics), false).set_enabled(enabled);
    }
    if let Some(enabled) = args.chime {
        state.settings.update_chime(enabled)?;
        state.audio.set_enabled(enabled);
    }
    if let Some(locale) = args.set_locale {
        state.settings.update_locale(locale)?;
    }

    let current = state.settings.snapshot()?;
    println!("{}", serde_json::to_string_pretty(&current)?);
    Ok(())
}

async fn dispatch(state: &AppState, command: Command) -> Result<()> {
    let locale = state.locale;
    match command {
        Command::Tea(TeaCommand::Add(args)) => {
            teas::commands::add_tea(&state.db, args.into(), locale).await?;
        }
        Command::Tea(TeaCommand::List { search }) => {
            teas::commands::list_teas(&state.db, search.as_deref(), locale).await?;
        }
        Command::Tea(TeaCommand::Remove { tea_id, yes }) => {
            let stdin = tokio::io::BufReader::new(tokio::io::stdin());
            teas::commands::remove_tea(&state.db, &tea_id, locale, &state.haptics()?, yes, stdin)
                .await?;
        }
        Command::Brew { tea_id } => brew(state, &tea_id).await?,
        Command::History { limit } => stats::commands::print_history(&state.db, locale, limit).await?,
        Command::Stats => stats::commands::print_stats(&state.db, locale).await?,
        Command::Settings(args) => apply_settings(state, args)?,
    }
    Ok(())
}

pub fn run() {
    // Initialize logging (reads RUST_LOG env var)
    env_logger::Builder::from_default_env()
        .filter_level(log::LevelFilter::Info)
        .init();

    let cli = Cli::parse();

    let result = (|| -> Result<()> {
        let runtime = tokio::runtime::Builder::new_multi_thread()
            .enable_all()
            .build()
            .context("failed to start async runtime")?;

        let state = AppState::open(&cli)?;
        let outcome = runtime.block_on(dispatch(&state, cli.command));
        // A stdin read may still be parked on a blocking thread.
        runtime.shutdown_timeout(Duration::from_millis(200));
        outcome
    })();

    if let Err(err) = result {
        log::error!("{err:#}");
        std::process::exit(1);
    }
}
