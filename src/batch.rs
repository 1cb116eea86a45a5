use crate::data::GameData;
use crate::error::SimError;
use crate::model::BattleConfig;
use crate::stats::BattleStatistics;
use crate::world::{BattleOptions, World};
use rand::rngs::SmallRng;
use rand::{Rng, SeedableRng};
use rayon::prelude::*;
use serde::Serialize;
use std::path::Path;

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RunSummary {
    pub run: usize,
    pub seed: u64,
    pub duration: f64,
    pub battle_result: u8,
    pub tdo: i64,
    pub tdo_percent: f64,
    pub dps: f64,
    pub num_of_deaths: u32,
}

impl RunSummary {
    fn new(run: usize, seed: u64, stats: &BattleStatistics) -> Self {
        let general = &stats.general_stat;
        RunSummary {
            run,
            seed,
            duration: general.duration,
            battle_result: general.battle_result,
            tdo: general.tdo,
            tdo_percent: general.tdo_percent,
            dps: general.dps,
            num_of_deaths: general.num_of_deaths,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BatchReport {
    pub sims: usize,
    pub win_rate: f64,
    pub mean_duration: f64,
    pub mean_tdo: f64,
    pub mean_tdo_percent: f64,
    pub mean_dps: f64,
    pub mean_deaths: f64,
    pub runs: Vec<RunSummary>,
}

/// Seed for run `run`, derived from the batch seed.
pub fn run_seed(seed: u64, run: usize) -> u64 {
    let mut run_rng = SmallRng::seed_from_u64(seed ^ ((run as u64) << 32));
    run_rng.gen()
}

/// Runs `sims` independent battles in parallel. Every run gets its own world
/// and seed, so the report only depends on `seed`.
pub fn run_batch(
    config: &BattleConfig,
    data: &GameData,
    sims: usize,
    seed: u64,
    max_events: usize,
) -> Result<BatchReport, SimError> {
    let runs: Vec<usize> = (0..sims).collect();
    let summaries = runs
        .par_iter()
        .map(|&run| {
            let battle_seed = run_seed(seed, run);
            let mut world = World::new(
                config,
                data,
                BattleOptions {
                    seed: battle_seed,
                    max_events,
                },
            )?;
            world.battle()?;
            Ok(RunSummary::new(run, battle_seed, &world.statistics()))
        })
        .collect::<Result<Vec<_>, SimError>>()?;
    Ok(aggregate(summaries))
}

fn aggregate(runs: Vec<RunSummary>) -> BatchReport {
    let n = runs.len().max(1) as f64;
    let mean = |f: fn(&RunSummary) -> f64| runs.iter().map(f).sum::<f64>() / n;
    BatchReport {
        sims: runs.len(),
        win_rate: mean(|r| f64::from(r.battle_result)),
        mean_duration: mean(|r| r.duration),
        mean_tdo: mean(|r| r.tdo as f64),
        mean_tdo_percent: mean(|r| r.tdo_percent),
        mean_dps: mean(|r| r.dps),
        mean_deaths: mean(|r| f64::from(r.num_of_deaths)),
        runs,
    }
}

pub fn write_csv(runs: &[RunSummary], path: &Path) -> anyhow::Result<()> {
    let mut out = String::from("run,seed,duration,battle_result,tdo,tdo_percent,dps,deaths");
    for run in runs {
        out.push('\n');
        out.push_str(&format!(
            "{},{},{:.3},{},{},{:.4},{:.4},{}",
            run.run,
            run.seed,
            run.duration,
            run.battle_result,
            run.tdo,
            run.tdo_percent,
            run.dps,
            run.num_of_deaths
        ));
    }
    std::fs::write(path, out)?;
    Ok(())
}
