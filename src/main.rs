use pogo_battle_sim::{run, CliOptions, DEFAULT_MAX_EVENTS};
use std::env;
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

fn usage() -> ! {
    eprintln!(
        "Usage: cargo run --release -- --config battle.json [--data gamedata.json] [--sims N] [--seed SEED] \
[--output results.json] [--csv runs.csv] [--log] [--max-events N]"
    );
    std::process::exit(1);
}

fn parse_args() -> anyhow::Result<CliOptions> {
    let mut config_path = PathBuf::from("battle.json");
    let mut data_path = None;
    let mut sims = 1usize;
    let mut seed = 0u64;
    let mut output_path = None;
    let mut csv_path = None;
    let mut force_log = false;
    let mut max_events = DEFAULT_MAX_EVENTS;

    let mut args = env::args().skip(1);
    while let Some(arg) = args.next() {
        match arg.as_str() {
            "--config" => {
                config_path = args.next().map(PathBuf::from).ok_or_else(|| {
                    anyhow::anyhow!("--config requires a path (e.g. --config battle.json)")
                })?;
            }
            "--data" => {
                data_path = Some(args.next().map(PathBuf::from).ok_or_else(|| {
                    anyhow::anyhow!("--data requires a path (e.g. --data gamedata.json)")
                })?);
            }
            "--sims" => {
                let val = args
                    .next()
                    .ok_or_else(|| anyhow::anyhow!("--sims requires a number"))?;
                sims = val.parse()?;
            }
            "--seed" => {
                let val = args
                    .next()
                    .ok_or_else(|| anyhow::anyhow!("--seed requires a number"))?;
                seed = val.parse()?;
            }
            "--output" => {
                output_path = Some(args.next().map(PathBuf::from).ok_or_else(|| {
                    anyhow::anyhow!("--output requires a path (e.g. --output results.json)")
                })?);
            }
            "--csv" => {
                csv_path = Some(args.next().map(PathBuf::from).ok_or_else(|| {
                    anyhow::anyhow!("--csv requires a path (e.g. --csv runs.csv)")
                })?);
            }
            "--log" => force_log = true,
            "--max-events" => {
                let val = args
                    .next()
                    .ok_or_else(|| anyhow::anyhow!("--max-events requires a number"))?;
                max_events = val.parse()?;
            }
            "--help" | "-h" => usage(),
            other => return Err(anyhow::anyhow!("Unknown argument {other}")),
        }
    }

    Ok(CliOptions {
        config_path,
        data_path,
        sims,
        seed,
        output_path,
        csv_path,
        force_log,
        max_events,
    })
}

fn main() -> anyhow::Result<()> {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("pogo_battle_sim=info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();

    let opts = parse_args()?;
    run(opts)
}
