//! Interactive console frontend for the station controller.
//!
//! Thin menu loop over [`rs_railops::station::Station`]: reads operator
//! choices from stdin, prints the rendered board and outcome messages, and
//! persists the station snapshot on exit. Runs against [`MockLink`] so it
//! works without the physical controller board; point `RAILOPS_CONFIG` at a
//! snapshot file to use an existing station layout.

use std::io::{self, BufRead, Write};
use std::path::PathBuf;

use anyhow::Context;
use log::info;

use rs_railops::dispatch::DispatchOutcome;
use rs_railops::instruction::Instruction;
use rs_railops::link::MockLink;
use rs_railops::logbook::FileActionLog;
use rs_railops::sensors::SensorConfig;
use rs_railops::snapshot::{SensorRecord, StationSnapshot};
use rs_railops::registry::Track;
use rs_railops::station::{CollectionReport, HandleOutcome, Station, HUM_SENSOR, TEMP_SENSOR};

fn main() -> anyhow::Result<()> {
    env_logger::init();

    let config_path: PathBuf = std::env::var_os("RAILOPS_CONFIG")
        .map(PathBuf::from)
        .unwrap_or_else(|| PathBuf::from("station.txt"));

    let snapshot = if config_path.exists() {
        StationSnapshot::load(&config_path)
            .with_context(|| format!("loading {}", config_path.display()))?
    } else {
        info!("no snapshot at {}, starting demo layout", config_path.display());
        demo_snapshot()
    };

    let mut station =
        Station::from_snapshot(&snapshot, MockLink::new()).context("building station")?;
    let mut action_log = FileActionLog::open("logs.txt").context("opening action log")?;

    let stdin = io::stdin();
    let mut lines = stdin.lock().lines();

    print!("Operator name: ");
    io::stdout().flush()?;
    let operator = match lines.next() {
        Some(line) => {
            let name = line?.trim().to_string();
            if name.is_empty() { "operator".to_string() } else { name }
        }
        None => return Ok(()),
    };

    station.sync_lights();
    println!("\n{}", station.render_board());

    loop {
        println!();
        println!("1 - Assign track to train");
        println!("2 - Set track FREE");
        println!("3 - Set track NON-OPERATIONAL");
        println!("4 - Give departure order");
        println!("5 - Collect sensor data");
        println!("0 - Exit");
        print!("Option: ");
        io::stdout().flush()?;

        let Some(choice) = lines.next() else { break };
        let instruction = match choice?.trim() {
            "1" => {
                let (Some(track), Some(train)) = (
                    prompt_id("Track ID: ", &mut lines)?,
                    prompt_id("Train ID: ", &mut lines)?,
                ) else {
                    println!("Invalid id");
                    continue;
                };
                Instruction::AssignTrack { track, train }
            }
            "2" => match prompt_id("Track ID: ", &mut lines)? {
                Some(track) => Instruction::SetFree { track },
                None => {
                    println!("Invalid id");
                    continue;
                }
            },
            "3" => match prompt_id("Track ID: ", &mut lines)? {
                Some(track) => Instruction::SetNonOperational { track },
                None => {
                    println!("Invalid id");
                    continue;
                }
            },
            "4" => match prompt_id("Train ID: ", &mut lines)? {
                Some(train) => Instruction::Departure { train },
                None => {
                    println!("Invalid id");
                    continue;
                }
            },
            "5" => Instruction::CollectReadings,
            "0" => Instruction::Exit,
            _ => Instruction::Invalid,
        };

        match station.handle(&operator, instruction, &mut action_log) {
            HandleOutcome::Exit => break,
            HandleOutcome::Ignored => println!("Unknown option"),
            HandleOutcome::Dispatched(DispatchOutcome::Rejected(reason)) => {
                println!("ERROR: {reason}");
            }
            HandleOutcome::Dispatched(_) => {
                println!("\n{}", station.render_board());
            }
            HandleOutcome::Collected(report) => {
                match report {
                    CollectionReport::Offline => {
                        println!("ERROR: no connection to the controller board");
                    }
                    CollectionReport::NoData => {
                        println!("ERROR: sensor data invalid or unavailable");
                    }
                    CollectionReport::Readings(_) => {}
                }
                println!("\n{}", station.render_board());
            }
        }
    }

    station
        .snapshot()
        .save(&config_path)
        .with_context(|| format!("saving {}", config_path.display()))?;
    info!("station state saved to {}", config_path.display());
    Ok(())
}

fn prompt_id(
    prompt: &str,
    lines: &mut impl Iterator<Item = io::Result<String>>,
) -> anyhow::Result<Option<u32>> {
    print!("{prompt}");
    io::stdout().flush()?;
    match lines.next() {
        Some(line) => Ok(line?.trim().parse().ok()),
        None => Ok(None),
    }
}

/// Two free tracks, two trains, modest sensor buffers.
fn demo_snapshot() -> StationSnapshot {
    let sensor = SensorConfig {
        capacity: 10,
        window: 5,
    };
    StationSnapshot {
        users: Vec::new(),
        sensors: vec![
            SensorRecord {
                name: TEMP_SENSOR.to_string(),
                config: sensor,
            },
            SensorRecord {
                name: HUM_SENSOR.to_string(),
                config: sensor,
            },
        ],
        tracks: vec![Track::free(1), Track::free(2)],
        trains: vec![10, 20],
    }
}
