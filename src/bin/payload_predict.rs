use std::path::PathBuf;

use anyhow::{Context, Result, anyhow, bail};
use chrono::NaiveDate;

use nba_prop_lines::config::EngineConfig;
use nba_prop_lines::engine::PropEngine;
use nba_prop_lines::logging::init_logging;
use nba_prop_lines::model::{Direction, LineRange, SeasonType, StatSelection};
use nba_prop_lines::payload::PayloadDirSource;
use nba_prop_lines::source::{MatchupRequest, gather_inputs, today};

fn main() -> Result<()> {
    let _ = dotenvy::from_filename(".env.local");
    let _ = dotenvy::from_filename(".env");
    init_logging();

    let data = parse_string_arg("--data")
        .or_else(|| std::env::var("PROP_DATA_DIR").ok())
        .map(PathBuf::from)
        .context("missing --data <dir>")?;
    let player = required("--player")?;
    let team = required("--team")?;
    let opponent = required("--opponent")?;
    let selection: StatSelection = required("--stat")?.parse()?;
    let direction: Direction = parse_string_arg("--dir")
        .as_deref()
        .unwrap_or("O")
        .parse()?;
    let as_of = parse_string_arg("--as-of")
        .map(|raw| {
            NaiveDate::parse_from_str(raw.trim(), "%Y-%m-%d")
                .with_context(|| format!("invalid --as-of {raw}"))
        })
        .transpose()?
        .unwrap_or_else(today);
    let season_type = if has_flag("--playoffs") {
        SeasonType::Playoffs
    } else {
        SeasonType::RegularSeason
    };

    let source = PayloadDirSource::open(&data)?;
    let config = EngineConfig::from_env();
    let request = MatchupRequest {
        injury_team: parse_string_arg("--injury-team").unwrap_or_else(|| team.clone()),
        player,
        team,
        opponent,
        selection,
        season_type,
        defender: parse_string_arg("--defender"),
        as_of: Some(as_of),
    };
    let inputs = gather_inputs(&source, source.identities(), &request, &config)?;
    let engine = PropEngine::new(config);

    println!("Player: {} ({})", inputs.player_name, season_type.label());
    println!("As of: {as_of}");
    match &inputs.defender_name {
        Some(name) => println!("Defender: {name}"),
        None => println!("Defender: none"),
    }
    if let Some(h) = &inputs.hustle {
        println!(
            "Hustle: contested {:.1}, deflections {:.1}, box-outs {:.1}",
            h.contested_shots,
            h.deflections,
            h.box_outs()
        );
    }

    match (parse_string_arg("--line"), parse_string_arg("--range")) {
        (Some(line), None) => {
            let line: f64 = line
                .trim()
                .parse()
                .map_err(|_| anyhow!("invalid --line {line}"))?;
            print!("{}", engine.predict(&inputs, line, direction));
        }
        (None, Some(range)) => {
            let range: LineRange = range.parse()?;
            print!("{}", engine.sweep(&inputs, range, direction));
        }
        (Some(_), Some(_)) => bail!("use either --line or --range, not both"),
        (None, None) => bail!("missing --line <X> or --range <MIN:MAX>"),
    }
    Ok(())
}

fn required(name: &str) -> Result<String> {
    parse_string_arg(name).with_context(|| format!("missing {name}"))
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

fn has_flag(name: &str) -> bool {
    std::env::args().skip(1).any(|arg| arg == name)
}
