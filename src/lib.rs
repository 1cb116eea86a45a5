pub mod batch;
pub mod battle_log;
pub mod data;
pub mod error;
pub mod event;
pub mod formulas;
pub mod model;
pub mod party;
pub mod player;
pub mod pokemon;
pub mod stats;
pub mod strategy;
pub mod timeline;
pub mod types;
pub mod world;

use crate::batch::{run_batch, write_csv};
use crate::data::GameData;
pub use crate::error::{ConfigError, InvariantKind, SimError};
use crate::model::BattleConfig;
pub use crate::world::{BattleOptions, World, DEFAULT_MAX_EVENTS};
use anyhow::Context;
use std::path::{Path, PathBuf};
use tracing::info;

#[derive(Debug, Clone)]
pub struct CliOptions {
    pub config_path: PathBuf,
    /// Game data JSON. The built-in tables are used when absent.
    pub data_path: Option<PathBuf>,
    pub sims: usize,
    pub seed: u64,
    pub output_path: Option<PathBuf>,
    pub csv_path: Option<PathBuf>,
    pub force_log: bool,
    pub max_events: usize,
}

pub fn load_config(path: &Path) -> anyhow::Result<BattleConfig> {
    let raw = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read battle config at {}", path.display()))?;
    let parsed: BattleConfig = serde_json::from_str(&raw)
        .with_context(|| format!("Failed to parse JSON from {}", path.display()))?;
    Ok(parsed)
}

pub fn load_game_data(path: &Path) -> anyhow::Result<GameData> {
    let raw = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read game data at {}", path.display()))?;
    GameData::from_json(&raw)
        .with_context(|| format!("Failed to load game data from {}", path.display()))
}

fn emit(json: String, output_path: Option<&Path>) -> anyhow::Result<()> {
    match output_path {
        Some(path) => {
            std::fs::write(path, json)
                .with_context(|| format!("Failed to write {}", path.display()))?;
            println!("Wrote results to {}", path.display());
        }
        None => println!("{json}"),
    }
    Ok(())
}

pub fn run(opts: CliOptions) -> anyhow::Result<()> {
    if opts.sims == 0 {
        anyhow::bail!("--sims must be > 0");
    }
    let mut config = load_config(&opts.config_path)?;
    if opts.force_log {
        config.has_log = true;
    }
    let data = match &opts.data_path {
        Some(path) => load_game_data(path)?,
        None => GameData::default(),
    };

    if opts.sims == 1 {
        let options = BattleOptions {
            seed: opts.seed,
            max_events: opts.max_events,
        };
        let mut world = World::new(&config, &data, options)?;
        world.battle()?;
        let stats = world.statistics();
        info!(
            duration_s = stats.general_stat.duration,
            tdo = stats.general_stat.tdo,
            result = stats.general_stat.battle_result,
            "battle complete"
        );
        return emit(
            serde_json::to_string_pretty(&stats)?,
            opts.output_path.as_deref(),
        );
    }

    let report = run_batch(&config, &data, opts.sims, opts.seed, opts.max_events)?;
    info!(
        sims = report.sims,
        win_rate = report.win_rate,
        mean_duration_s = report.mean_duration,
        mean_dps = report.mean_dps,
        "batch complete"
    );
    if let Some(csv_path) = &opts.csv_path {
        write_csv(&report.runs, csv_path)?;
        println!("Wrote {} runs to {}", report.runs.len(), csv_path.display());
    }
    emit(
        serde_json::to_string_pretty(&report)?,
        opts.output_path.as_deref(),
    )
}
