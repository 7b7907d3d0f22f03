use anyhow::Result;

use nba_prop_lines::config::EngineConfig;
use nba_prop_lines::engine::PropEngine;
use nba_prop_lines::logging::init_logging;
use nba_prop_lines::model::{Direction, LineRange};
use nba_prop_lines::synthetic::synthetic_inputs;

const DEFAULT_SEED: u64 = 42;

fn main() -> Result<()> {
    let _ = dotenvy::from_filename(".env.local");
    let _ = dotenvy::from_filename(".env");
    init_logging();

    let seed = parse_u64_arg("--seed").unwrap_or(DEFAULT_SEED);
    let inputs = synthetic_inputs(seed);
    let engine = PropEngine::new(EngineConfig::from_env());

    let center = inputs.selection.season_total(&inputs.player).round() as i32;
    let range = LineRange::new(center - 6, center + 6)?;
    println!("Synthetic seed {seed}, {} games", inputs.games.len());
    for direction in [Direction::Over, Direction::Under] {
        let sweep = engine.sweep(&inputs, range, direction);
        print!("{sweep}");
        if let Some(best) = sweep.best() {
            println!(
                "Best {}: {:.1} at {:.2}%",
                direction,
                best.line,
                best.probability * 100.0
            );
        }
        println!();
    }
    Ok(())
}

fn parse_u64_arg(name: &str) -> Option<u64> {
    let args = std::env::args().skip(1).collect::<Vec<_>>();
    for (idx, arg) in args.iter().enumerate() {
        if let Some(raw) = arg.strip_prefix(&format!("{name}="))
            && let Ok(v) = raw.trim().parse::<u64>()
        {
            return Some(v);
        }
        if arg == name
            && let Some(next) = args.get(idx + 1)
            && let Ok(v) = next.trim().parse::<u64>()
        {
            return Some(v);
        }
    }
    None
}
