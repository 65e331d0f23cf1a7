//! Station board: the operator-facing status summary.
//!
//! Mirrors what the physical departure board shows: the last operation, the
//! state of every track and train, and the latest smoothed sensor readings.
//! This module only assembles the text; printing it is the frontend's job.

use crate::registry::{Registry, TrackState};
use crate::sensors::SensorReading;

/// Latest sensor summary shown on the board.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct SensorSummary {
    /// Temperature reading, if any samples have arrived.
    pub temperature: Option<SensorReading>,
    /// Humidity reading, if any samples have arrived.
    pub humidity: Option<SensorReading>,
}

/// Mutable board state, updated by the station after every action.
#[derive(Clone, Debug)]
pub struct StationBoard {
    last_action: String,
    sensors: SensorSummary,
}

impl Default for StationBoard {
    fn default() -> Self {
        Self {
            last_action: "System started".to_string(),
            sensors: SensorSummary::default(),
        }
    }
}

impl StationBoard {
    /// Fresh board showing the startup banner.
    pub fn new() -> Self {
        Self::default()
    }

    /// Record the latest operation line.
    pub fn set_action(&mut self, action: impl Into<String>) {
        self.last_action = action.into();
    }

    /// Latest operation line.
    pub fn last_action(&self) -> &str {
        &self.last_action
    }

    /// Replace the sensor summary.
    pub fn set_sensors(&mut self, sensors: SensorSummary) {
        self.sensors = sensors;
    }

    /// Current sensor summary.
    pub fn sensors(&self) -> &SensorSummary {
        &self.sensors
    }

    /// Render the full board against the current registry.
    pub fn render(&self, registry: &Registry) -> String {
        let mut out = String::new();
        out.push_str("=== STATION BOARD ===\n");
        out.push_str(&format!("Last operation: {}\n", self.last_action));

        out.push_str("\nTracks:\n");
        if registry.tracks().is_empty() {
            out.push_str("  (none configured)\n");
        }
        for track in registry.tracks() {
            let status = match (track.state, track.occupant) {
                (TrackState::Inoperative, _) => "NON-OPERATIONAL".to_string(),
                (TrackState::Free, _) => "FREE".to_string(),
                (TrackState::Arriving, _) => "ARRIVING".to_string(),
                (TrackState::Busy, Some(train)) => format!("OCCUPIED (Train {train})"),
                (TrackState::Busy, None) => "OCCUPIED".to_string(),
            };
            out.push_str(&format!("  Track {:<3} {}\n", track.id, status));
        }

        out.push_str("\nTrains:\n");
        if registry.trains().is_empty() {
            out.push_str("  (none configured)\n");
        }
        for train in registry.trains() {
            let location = match train.assigned {
                Some(track) => format!("On Track {track}"),
                None => "Not assigned".to_string(),
            };
            out.push_str(&format!("  Train {:<5} {}\n", train.id, location));
        }

        out.push_str("\nSensors (moving median):\n");
        out.push_str(&sensor_line("Temperature", self.sensors.temperature.as_ref()));
        out.push_str(&sensor_line("Humidity", self.sensors.humidity.as_ref()));
        out
    }
}

fn sensor_line(label: &str, reading: Option<&SensorReading>) -> String {
    match reading {
        Some(r) => {
            let unit = r.unit.as_deref().unwrap_or("");
            format!(
                "  {label}: {} {unit} (last) | median {} over {} sample(s)\n",
                r.last, r.median, r.window_len
            )
        }
        None => format!("  {label}: no data\n"),
    }
}

// ============================================================================
// Tests
// ============================================================================
