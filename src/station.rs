//! Station controller: the owner of the whole control loop.
//!
//! [`Station`] ties the registry, the two sensor channels, the board and the
//! link together, applying one operator instruction (registry mutation,
//! command emission, logging, board update) completely before the next is
//! accepted. Everything is single-threaded and synchronous; the station is
//! generic over its [`ControllerLink`] so tests and offline runs use
//! [`MockLink`](crate::link::MockLink).
//!
//! Error posture follows the three-way split in [`crate::dispatch`]:
//! rejections report and change nothing, emergencies are logged and the loop
//! continues, and link trouble degrades to an operator status message;
//! nothing here is fatal to the process.

use core::fmt;

use log::{info, warn};
use thiserror::Error;

use crate::board::{SensorSummary, StationBoard};
use crate::buffer::{BufferError, EnqueueStatus};
use crate::command::OpCode;
use crate::dispatch::{self, DispatchOutcome};
use crate::instruction::Instruction;
use crate::link::ControllerLink;
use crate::logbook::ActionLog;
use crate::registry::{Registry, TrackState};
use crate::sensors::SensorChannel;
use crate::snapshot::{SensorRecord, StationSnapshot, UserRecord};

/// Frame token of the temperature sensor in this deployment.
pub const TEMP_SENSOR: &str = "TEMP";
/// Frame token of the humidity sensor in this deployment.
pub const HUM_SENSOR: &str = "HUM";

/// Errors raised while building a station from its snapshot.
#[derive(Debug, Error)]
pub enum StationError {
    /// The snapshot carries no configuration for a required sensor.
    #[error("snapshot has no configuration for sensor {0}")]
    MissingSensor(String),

    /// A sensor configuration could not be applied.
    #[error("invalid sensor buffer configuration: {0}")]
    Buffer(#[from] BufferError),
}

/// Result of one sensor collection cycle.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum CollectionReport {
    /// The board did not answer the poll (link error, no response, or a
    /// literal `ERROR` reply).
    Offline,
    /// The board answered but neither sensor's segment was usable.
    NoData,
    /// At least one sensor delivered a sample; the summary holds the
    /// refreshed smoothed readings.
    Readings(SensorSummary),
}

/// What one call to [`Station::handle`] did.
#[derive(Clone, Debug, PartialEq)]
pub enum HandleOutcome {
    /// A track operation went through the dispatcher.
    Dispatched(DispatchOutcome),
    /// A sensor collection cycle ran.
    Collected(CollectionReport),
    /// The instruction was `Invalid`; nothing happened.
    Ignored,
    /// The operator asked to leave the control loop.
    Exit,
}

/// The station controller.
///
/// # Example
///
/// ```rust
/// use rs_railops::instruction::Instruction;
/// use rs_railops::link::MockLink;
/// use rs_railops::logbook::MemoryLog;
/// use rs_railops::registry::{Registry, Track, Train};
/// use rs_railops::sensors::{SensorChannel, SensorConfig};
/// use rs_railops::station::Station;
///
/// let mut registry = Registry::new();
/// registry.add_track(Track::free(1));
/// registry.add_train(Train::unassigned(10));
///
/// let cfg = SensorConfig { capacity: 5, window: 3 };
/// let mut station = Station::new(
///     registry,
///     SensorChannel::new("TEMP", cfg).unwrap(),
///     SensorChannel::new("HUM", cfg).unwrap(),
///     MockLink::new(),
/// );
///
/// let mut log = MemoryLog::new();
/// station.handle("op", Instruction::AssignTrack { track: 1, train: 10 }, &mut log);
/// assert_eq!(station.link().sent_commands(), vec!["YE,01"]);
/// ```
#[derive(Debug)]
pub struct Station<L: ControllerLink> {
    registry: Registry,
    temp: SensorChannel,
    hum: SensorChannel,
    users: Vec<UserRecord>,
    board: StationBoard,
    link: L,
}

impl<L: ControllerLink> Station<L>
where
    L::Error: fmt::Debug,
{
    /// Assemble a station from already-built parts.
    pub fn new(registry: Registry, temp: SensorChannel, hum: SensorChannel, link: L) -> Self {
        Self {
            registry,
            temp,
            hum,
            users: Vec::new(),
            board: StationBoard::new(),
            link,
        }
    }

    /// Build a station from a loaded snapshot.
    ///
    /// Requires configurations for both deployed sensors; track/train
    /// occupancy is re-linked by the snapshot. Buffers start empty.
    pub fn from_snapshot(snapshot: &StationSnapshot, link: L) -> Result<Self, StationError> {
        let temp_cfg = snapshot
            .sensor_config(TEMP_SENSOR)
            .ok_or_else(|| StationError::MissingSensor(TEMP_SENSOR.to_string()))?;
        let hum_cfg = snapshot
            .sensor_config(HUM_SENSOR)
            .ok_or_else(|| StationError::MissingSensor(HUM_SENSOR.to_string()))?;

        let mut station = Self::new(
            snapshot.registry(),
            SensorChannel::new(TEMP_SENSOR, temp_cfg)?,
            SensorChannel::new(HUM_SENSOR, hum_cfg)?,
            link,
        );
        station.users = snapshot.users.clone();
        Ok(station)
    }

    /// Apply one operator instruction end to end.
    ///
    /// Applied transitions and emergencies are recorded in the action log
    /// under `actor`; rejections are reported back but never logged. Link
    /// failures while forwarding a light command are non-fatal.
    pub fn handle(
        &mut self,
        actor: &str,
        instruction: Instruction,
        action_log: &mut impl ActionLog,
    ) -> HandleOutcome {
        match instruction {
            Instruction::Exit => HandleOutcome::Exit,
            Instruction::Invalid => HandleOutcome::Ignored,
            Instruction::CollectReadings => {
                let report = self.collect_readings();
                match &report {
                    CollectionReport::Offline => self
                        .board
                        .set_action("ERROR: No connection to controller board (sensors offline)"),
                    CollectionReport::NoData => self
                        .board
                        .set_action("ERROR: Sensor data invalid or unavailable"),
                    CollectionReport::Readings(_) => {}
                }
                HandleOutcome::Collected(report)
            }
            _ => {
                let outcome = dispatch::process(&mut self.registry, &instruction);
                match &outcome {
                    DispatchOutcome::Applied {
                        description,
                        command,
                    } => {
                        if let Some(cmd) = command {
                            self.forward(cmd.as_str());
                        }
                        action_log.record(actor, &instruction.describe());
                        self.board.set_action(description.clone());
                    }
                    DispatchOutcome::Emergency { description } => {
                        action_log.record(actor, description);
                        self.board.set_action(description.clone());
                    }
                    DispatchOutcome::Rejected(_) => {}
                }
                HandleOutcome::Dispatched(outcome)
            }
        }
    }

    /// Poll the sensors once and refresh the smoothed readings.
    ///
    /// Each channel ingests the frame independently: a malformed segment for
    /// one sensor only skips that sensor's sample this cycle.
    pub fn collect_readings(&mut self) -> CollectionReport {
        let frame = match self.link.send(OpCode::PollSensors.as_str()) {
            Ok(Some(frame)) if frame != "ERROR" => frame,
            Ok(_) => return CollectionReport::Offline,
            Err(e) => {
                warn!("sensor poll failed: {e:?}");
                return CollectionReport::Offline;
            }
        };

        let got_temp = self.ingest_channel(Channel::Temp, &frame);
        let got_hum = self.ingest_channel(Channel::Hum, &frame);
        if !got_temp && !got_hum {
            return CollectionReport::NoData;
        }

        let summary = SensorSummary {
            temperature: self.temp.reading(),
            humidity: self.hum.reading(),
        };
        self.board.set_sensors(summary.clone());
        CollectionReport::Readings(summary)
    }

    fn ingest_channel(&mut self, which: Channel, frame: &str) -> bool {
        let channel = match which {
            Channel::Temp => &mut self.temp,
            Channel::Hum => &mut self.hum,
        };
        match channel.ingest(frame) {
            Ok((_, EnqueueStatus::Filled)) => {
                info!("{} sample buffer is now full", channel.token());
                true
            }
            Ok(_) => true,
            Err(e) => {
                warn!("{}: no usable sample this cycle: {e}", channel.token());
                false
            }
        }
    }

    /// Push every track's current state to the board lights.
    ///
    /// Used at startup and after a snapshot reload so the physical lights
    /// match the restored occupancy.
    pub fn sync_lights(&mut self) {
        let commands: Vec<_> = self
            .registry
            .tracks()
            .iter()
            .filter_map(|track| {
                let op = match track.state {
                    TrackState::Busy => OpCode::Red,
                    TrackState::Free => OpCode::Green,
                    TrackState::Inoperative => OpCode::RedBlink,
                    TrackState::Arriving => return None,
                };
                i32::try_from(track.id).ok().and_then(|n| op.encode(n).ok())
            })
            .collect();
        for cmd in commands {
            self.forward(cmd.as_str());
        }
    }

    fn forward(&mut self, command: &str) {
        if let Err(e) = self.link.send(command) {
            warn!("link send of {command} failed: {e:?}");
        }
    }

    /// Snapshot of the current configuration and occupancy.
    pub fn snapshot(&self) -> StationSnapshot {
        StationSnapshot {
            users: self.users.clone(),
            sensors: vec![
                SensorRecord {
                    name: self.temp.token().to_string(),
                    config: self.temp.config(),
                },
                SensorRecord {
                    name: self.hum.token().to_string(),
                    config: self.hum.config(),
                },
            ],
            tracks: self.registry.tracks().to_vec(),
            trains: self.registry.trains().iter().map(|t| t.id).collect(),
        }
    }

    /// Render the operator board for display.
    pub fn render_board(&self) -> String {
        self.board.render(&self.registry)
    }

    /// The track/train registry.
    pub fn registry(&self) -> &Registry {
        &self.registry
    }

    /// The station board state.
    pub fn board(&self) -> &StationBoard {
        &self.board
    }

    /// Persisted user records.
    pub fn users(&self) -> &[UserRecord] {
        &self.users
    }

    /// The controller link.
    pub fn link(&self) -> &L {
        &self.link
    }

    /// Mutable access to the link, for queueing mock responses.
    pub fn link_mut(&mut self) -> &mut L {
        &mut self.link
    }
}

#[derive(Clone, Copy)]
enum Channel {
    Temp,
    Hum,
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::link::MockLink;
    use crate::logbook::MemoryLog;
    use crate::registry::{Track, Train};
    use crate::sensors::SensorConfig;

    fn station() -> Station<MockLink> {
        let mut registry = Registry::new();
        registry.add_track(Track::free(1));
        registry.add_track(Track::free(2));
        registry.add_train(Train::unassigned(10));
        registry.add_train(Train::unassigned(20));

        let cfg = SensorConfig {
            capacity: 5,
            window: 5,
        };
        Station::new(
            registry,
            SensorChannel::new(TEMP_SENSOR, cfg).unwrap(),
            SensorChannel::new(HUM_SENSOR, cfg).unwrap(),
            MockLink::new(),
        )
    }

    // === Instruction handling ===
    #[test]
    fn applied_instruction_sends_command_and_logs() {
        let mut st = station();
        let mut log = MemoryLog::new();

        let outcome = st.handle(
            "marcelo",
            Instruction::AssignTrack { track: 1, train: 10 },
            &mut log,
        );
        assert!(matches!(
            outcome,
            HandleOutcome::Dispatched(DispatchOutcome::Applied { .. })
        ));
        assert_eq!(st.link().sent_commands(), vec!["YE,01"]);
        assert_eq!(log.descriptions(), vec!["ASSIGN_TRACK track=1 train=10"]);
        assert_eq!(st.board().last_action(), "Track 1 assigned to Train 10");
    }

    #[test]
    fn rejected_instruction_is_not_logged_and_sends_nothing() {
        let mut st = station();
        let mut log = MemoryLog::new();

        let outcome = st.handle(
            "marcelo",
            Instruction::SetFree { track: 1 },
            &mut log,
        );
        assert!(matches!(
            outcome,
            HandleOutcome::Dispatched(DispatchOutcome::Rejected(_))
        ));
        assert!(st.link().sent.is_empty());
        assert!(log.entries.is_empty());
        assert_eq!(st.board().last_action(), "System started");
    }

    #[test]
    fn emergency_is_logged_and_board_updated() {
        let mut st = station();
        let mut log = MemoryLog::new();
        st.handle("op", Instruction::AssignTrack { track: 1, train: 10 }, &mut log);
        st.handle("op", Instruction::AssignTrack { track: 2, train: 20 }, &mut log);

        let outcome = st.handle(
            "op",
            Instruction::AssignTrack { track: 1, train: 10 },
            &mut log,
        );
        assert!(matches!(
            outcome,
            HandleOutcome::Dispatched(DispatchOutcome::Emergency { .. })
        ));
        assert_eq!(log.entries.len(), 3);
        assert_eq!(
            log.entries[2].1,
            "EMERGENCY STOP: no free tracks available"
        );
        assert_eq!(
            st.board().last_action(),
            "EMERGENCY STOP: no free tracks available"
        );
    }

    #[test]
    fn exit_and_invalid_do_nothing() {
        let mut st = station();
        let mut log = MemoryLog::new();
        assert_eq!(st.handle("op", Instruction::Exit, &mut log), HandleOutcome::Exit);
        assert_eq!(
            st.handle("op", Instruction::Invalid, &mut log),
            HandleOutcome::Ignored
        );
        assert!(log.entries.is_empty());
        assert!(st.link().sent.is_empty());
    }

    #[test]
    fn link_failure_on_command_is_non_fatal() {
        let mut st = station();
        st.link_mut().connected = false;
        let mut log = MemoryLog::new();

        let outcome = st.handle(
            "op",
            Instruction::AssignTrack { track: 1, train: 10 },
            &mut log,
        );
        // The transition and the log record still happen.
        assert!(matches!(
            outcome,
            HandleOutcome::Dispatched(DispatchOutcome::Applied { .. })
        ));
        assert_eq!(log.entries.len(), 1);
        assert_eq!(
            st.registry().find_track(1).unwrap().state,
            TrackState::Busy
        );
    }

    // === Sensor collection ===
    #[test]
    fn collect_reports_offline_without_response() {
        let mut st = station();
        assert_eq!(st.collect_readings(), CollectionReport::Offline);

        st.link_mut().queue_response("ERROR");
        assert_eq!(st.collect_readings(), CollectionReport::Offline);

        st.link_mut().connected = false;
        assert_eq!(st.collect_readings(), CollectionReport::Offline);
    }

    #[test]
    fn collect_ingests_both_channels() {
        let mut st = station();
        st.link_mut()
            .queue_response("TEMP&unit:celsius&value:21#HUM&unit:percentage&value:60");

        let report = st.collect_readings();
        let CollectionReport::Readings(summary) = report else {
            panic!("expected readings, got {report:?}");
        };
        assert_eq!(summary.temperature.as_ref().unwrap().last, 21);
        assert_eq!(summary.humidity.as_ref().unwrap().last, 60);
        assert_eq!(st.link().sent_commands(), vec!["GTH"]);
    }

    #[test]
    fn channels_fail_independently() {
        let mut st = station();
        st.link_mut()
            .queue_response("TEMP&unit:celsius&value:#HUM&unit:percentage&value:55");

        let report = st.collect_readings();
        let CollectionReport::Readings(summary) = report else {
            panic!("expected readings, got {report:?}");
        };
        assert!(summary.temperature.is_none());
        assert_eq!(summary.humidity.as_ref().unwrap().last, 55);
    }

    #[test]
    fn collect_with_no_usable_segment_reports_no_data() {
        let mut st = station();
        st.link_mut().queue_response("JUNK#MORE&junk");
        assert_eq!(st.collect_readings(), CollectionReport::NoData);
    }

    #[test]
    fn collect_via_handle_updates_board_on_failure() {
        let mut st = station();
        let mut log = MemoryLog::new();
        let outcome = st.handle("op", Instruction::CollectReadings, &mut log);
        assert_eq!(
            outcome,
            HandleOutcome::Collected(CollectionReport::Offline)
        );
        assert!(st.board().last_action().contains("sensors offline"));
        assert!(log.entries.is_empty());
    }

    // === Lights / snapshot ===
    #[test]
    fn sync_lights_emits_one_command_per_track() {
        let mut st = station();
        let mut log = MemoryLog::new();
        st.handle("op", Instruction::AssignTrack { track: 2, train: 10 }, &mut log);
        st.link_mut().sent.clear();

        st.sync_lights();
        assert_eq!(st.link().sent_commands(), vec!["GE,01", "RE,02"]);
    }

    #[test]
    fn snapshot_round_trips_through_from_snapshot() {
        let mut st = station();
        let mut log = MemoryLog::new();
        st.handle("op", Instruction::AssignTrack { track: 1, train: 20 }, &mut log);

        let snap = st.snapshot();
        let restored = Station::from_snapshot(&snap, MockLink::new()).unwrap();

        assert_eq!(
            restored.registry().find_track(1).unwrap().occupant,
            Some(20)
        );
        assert_eq!(restored.registry().find_train(20).unwrap().assigned, Some(1));
        assert_eq!(restored.snapshot(), snap);
    }

    #[test]
    fn from_snapshot_requires_both_sensors() {
        let mut snap = station().snapshot();
        snap.sensors.retain(|s| s.name != HUM_SENSOR);
        let err = Station::from_snapshot(&snap, MockLink::new()).unwrap_err();
        match err {
            StationError::MissingSensor(s) => assert_eq!(s, HUM_SENSOR),
            other => panic!("expected MissingSensor, got {other:?}"),
        }
    }
}
