//! Snapshot persistence: a station shuts down, reloads, and carries on.

use rs_railops::{
    Instruction, MemoryLog, MockLink, SensorConfig, Station, StationSnapshot, TrackState,
};
use rs_railops::snapshot::{SensorRecord, UserRecord, UserRole};
use rs_railops::registry::Track;

fn seeded_snapshot() -> StationSnapshot {
    StationSnapshot {
        users: vec![UserRecord {
            role: UserRole::Operator,
            name: "Marcelo".to_string(),
            username: "marcelo".to_string(),
            password: "ZRUOG".to_string(),
            caesar_key: 5,
        }],
        sensors: vec![
            SensorRecord {
                name: "TEMP".to_string(),
                config: SensorConfig {
                    capacity: 10,
                    window: 5,
                },
            },
            SensorRecord {
                name: "HUM".to_string(),
                config: SensorConfig {
                    capacity: 8,
                    window: 3,
                },
            },
        ],
        tracks: vec![Track::free(1), Track::free(2), Track::free(3)],
        trains: vec![10, 20],
    }
}

#[test]
fn occupancy_survives_save_and_reload() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("station.txt");

    // First session: assign a train, withdraw a track, shut down.
    {
        let mut station = Station::from_snapshot(&seeded_snapshot(), MockLink::new()).unwrap();
        let mut log = MemoryLog::new();
        station.handle("op", Instruction::AssignTrack { track: 2, train: 10 }, &mut log);
        station.handle("op", Instruction::SetNonOperational { track: 3 }, &mut log);
        station.snapshot().save(&path).unwrap();
    }

    // Second session: everything is back, re-linked.
    let snapshot = StationSnapshot::load(&path).unwrap();
    let station = Station::from_snapshot(&snapshot, MockLink::new()).unwrap();

    let reg = station.registry();
    assert_eq!(reg.find_track(1).unwrap().state, TrackState::Free);
    assert_eq!(reg.find_track(2).unwrap().state, TrackState::Busy);
    assert_eq!(reg.find_track(2).unwrap().occupant, Some(10));
    assert_eq!(reg.find_track(3).unwrap().state, TrackState::Inoperative);
    assert_eq!(reg.find_train(10).unwrap().assigned, Some(2));
    assert_eq!(reg.find_train(20).unwrap().assigned, None);

    assert_eq!(station.users().len(), 1);
    assert_eq!(station.users()[0].username, "marcelo");
}

#[test]
fn reloaded_station_resumes_operations() {
    let snapshot = {
        let mut station = Station::from_snapshot(&seeded_snapshot(), MockLink::new()).unwrap();
        let mut log = MemoryLog::new();
        station.handle("op", Instruction::AssignTrack { track: 1, train: 20 }, &mut log);
        station.snapshot()
    };

    let mut station = Station::from_snapshot(&snapshot, MockLink::new()).unwrap();
    let mut log = MemoryLog::new();

    // The restored assignment still blocks the train...
    use rs_railops::{DispatchOutcome, HandleOutcome, RejectReason};
    let outcome = station.handle(
        "op",
        Instruction::AssignTrack { track: 2, train: 20 },
        &mut log,
    );
    assert_eq!(
        outcome,
        HandleOutcome::Dispatched(DispatchOutcome::Rejected(
            RejectReason::TrainAlreadyAssigned { train: 20, track: 1 }
        ))
    );

    // ...and departing it frees the restored track.
    station.handle("op", Instruction::Departure { train: 20 }, &mut log);
    assert_eq!(
        station.registry().find_track(1).unwrap().state,
        TrackState::Free
    );
}

#[test]
fn sync_lights_after_reload_mirrors_restored_states() {
    let snapshot = {
        let mut station = Station::from_snapshot(&seeded_snapshot(), MockLink::new()).unwrap();
        let mut log = MemoryLog::new();
        station.handle("op", Instruction::AssignTrack { track: 2, train: 10 }, &mut log);
        station.handle("op", Instruction::SetNonOperational { track: 3 }, &mut log);
        station.snapshot()
    };

    let mut station = Station::from_snapshot(&snapshot, MockLink::new()).unwrap();
    station.sync_lights();
    assert_eq!(
        station.link().sent_commands(),
        vec!["GE,01", "RE,02", "RB,03"]
    );
}

#[test]
fn sample_history_is_not_persisted() {
    let mut station = Station::from_snapshot(&seeded_snapshot(), MockLink::new()).unwrap();
    station
        .link_mut()
        .queue_response("TEMP&unit:celsius&value:20");
    station.collect_readings();

    let snapshot = station.snapshot();
    let restored = Station::from_snapshot(&snapshot, MockLink::new()).unwrap();
    // Sizing survives, samples do not.
    assert_eq!(
        snapshot.sensor_config("TEMP"),
        Some(SensorConfig {
            capacity: 10,
            window: 5
        })
    );
    assert!(restored.board().sensors().temperature.is_none());
}

#[test]
fn text_round_trip_is_stable() {
    let snapshot = seeded_snapshot();
    let text = snapshot.render();
    let reparsed = StationSnapshot::parse(&text);
    assert_eq!(reparsed, snapshot);
    // A second render of the reparse is byte-identical.
    assert_eq!(reparsed.render(), text);
}
