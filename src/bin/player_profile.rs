use std::path::PathBuf;

use anyhow::{Context, Result};

use nba_prop_lines::logging::init_logging;
use nba_prop_lines::payload::PayloadDirSource;
use nba_prop_lines::profile::{DEFAULT_PROFILE_GAMES, build_profile};

fn main() -> Result<()> {
    let _ = dotenvy::from_filename(".env.local");
    let _ = dotenvy::from_filename(".env");
    init_logging();

    let data = parse_string_arg("--data")
        .or_else(|| std::env::var("PROP_DATA_DIR").ok())
        .map(PathBuf::from)
        .context("missing --data <dir>")?;
    let player = parse_string_arg("--player").context("missing --player")?;
    let team = parse_string_arg("--team");
    let games = parse_string_arg("--games")
        .map(|raw| {
            raw.parse::<usize>()
                .with_context(|| format!("invalid --games {raw}"))
        })
        .transpose()?
        .unwrap_or(DEFAULT_PROFILE_GAMES);

    let source = PayloadDirSource::open(&data)?;
    let profile = build_profile(&source, source.identities(), &player, team.as_deref(), games)?;
    print!("{profile}");
    Ok(())
}

fn parse_string_arg(name: &str) -> Option<String> {
    let args = std::env::args().skip(1).collect::<Vec<_>>();
    for (idx, arg) in args.iter().enumerate() {
        if let Some(raw) = arg.strip_prefix(&format!("{name}=")) {
            let trimmed = raw.trim();
            if !trimmed.is_empty() {
                return Some(trimmed.to_string());
            }
        }
        if arg == name
            && let Some(next) = args.get(idx + 1)
            && !next.trim().is_empty()
        {
            return Some(next.trim().to_string());
        }
    }
    None
}
