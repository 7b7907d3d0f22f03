use std::fs;
use std::path::PathBuf;

use anyhow::{Context, Result, bail};
use serde::Deserialize;

use nba_prop_lines::config::EngineConfig;
use nba_prop_lines::engine::{PropEngine, PropInputs};
use nba_prop_lines::logging::init_logging;
use nba_prop_lines::model::{Direction, LineRange};

const DEFAULT_CASE_PATH: &str = "tests/fixtures/prop_case.json";

/// A saved matchup: inputs plus either one line or a sweep range.
#[derive(Debug, Deserialize)]
struct PropCase {
    inputs: PropInputs,
    direction: Direction,
    #[serde(default)]
    line: Option<f64>,
    #[serde(default)]
    range: Option<LineRange>,
}

fn main() -> Result<()> {
    let _ = dotenvy::from_filename(".env.local");
    let _ = dotenvy::from_filename(".env");
    init_logging();

    let path = std::env::args()
        .nth(1)
        .map(PathBuf::from)
        .unwrap_or_else(|| PathBuf::from(DEFAULT_CASE_PATH));
    let raw = fs::read_to_string(&path)
        .with_context(|| format!("read case file {}", path.display()))?;
    let case: PropCase = serde_json::from_str(&raw)
        .with_context(|| format!("decode case file {}", path.display()))?;

    let engine = PropEngine::new(EngineConfig::from_env());
    println!("Player: {}", case.inputs.player_name);
    if let Some(defender) = &case.inputs.defender_name {
        println!("Defender: {defender}");
    }

    match (case.line, case.range) {
        (Some(line), None) => {
            let result = engine.predict(&case.inputs, line, case.direction);
            print!("{result}");
        }
        (None, Some(range)) => {
            let result = engine.sweep(&case.inputs, range, case.direction);
            print!("{result}");
        }
        (Some(_), Some(_)) => bail!("case file sets both `line` and `range`"),
        (None, None) => bail!("case file needs `line` or `range`"),
    }
    Ok(())
}
