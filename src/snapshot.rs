//! Last-known-state snapshot persistence.
//!
//! The station writes its configuration and occupancy to a line-oriented
//! text file on shutdown and reads it back at startup. Four sections, each
//! with `;`-delimited records in a fixed field order:
//!
//! ```text
//! [USERS]
//! ADMIN;Station Admin;admin;KHOOR;3
//!
//! [SENSORS]
//! TEMP;BUFFER=10;WINDOW=5
//! HUM;BUFFER=10;WINDOW=5
//!
//! [TRACKS]
//! TRACK;1;1;10
//! TRACK;2;0;-1
//!
//! [TRAINS]
//! TRAIN;10
//! ```
//!
//! Reload reconstructs buffer sizing and track/train occupancy exactly,
//! re-linking each train by scanning the loaded tracks' occupants. Sample
//! history is not persisted; buffers restart empty. Malformed records are
//! skipped with a warning rather than failing the whole load, so a station
//! always comes up with whatever configuration survives.

use std::path::Path;

use log::warn;
use thiserror::Error;

use crate::registry::{Registry, Track, TrackState, Train};
use crate::sensors::SensorConfig;

/// Errors produced when loading or saving a snapshot file.
#[derive(Debug, Error)]
pub enum SnapshotError {
    /// Filesystem trouble reading or writing the snapshot.
    #[error(transparent)]
    Io(#[from] std::io::Error),
}

/// Role stored with a user record. No authorization logic lives in this
/// crate; the role is carried through the snapshot untouched.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum UserRole {
    /// Station administrator.
    Admin,
    /// Regular operator.
    Operator,
}

impl UserRole {
    /// Snapshot field text.
    pub const fn as_str(self) -> &'static str {
        match self {
            UserRole::Admin => "ADMIN",
            UserRole::Operator => "OPERATOR",
        }
    }

    /// Parse a snapshot field; anything but `ADMIN` loads as `Operator`.
    pub fn parse(text: &str) -> Self {
        if text == "ADMIN" {
            UserRole::Admin
        } else {
            UserRole::Operator
        }
    }
}

/// One persisted user. The password is stored already encrypted by the
/// external credential tooling; this crate never decodes it.
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct UserRecord {
    /// Admin or operator.
    pub role: UserRole,
    /// Display name.
    pub name: String,
    /// Login name.
    pub username: String,
    /// Encrypted password text.
    pub password: String,
    /// Caesar key the password was encrypted with.
    pub caesar_key: i32,
}

/// One persisted sensor configuration.
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct SensorRecord {
    /// Sensor token (`TEMP`, `HUM`).
    pub name: String,
    /// Buffer sizing.
    pub config: SensorConfig,
}

/// Parsed snapshot of the whole station.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct StationSnapshot {
    /// Persisted users.
    pub users: Vec<UserRecord>,
    /// Persisted sensor configurations.
    pub sensors: Vec<SensorRecord>,
    /// Persisted tracks, occupancy included.
    pub tracks: Vec<Track>,
    /// Persisted train ids.
    pub trains: Vec<u32>,
}

#[derive(Clone, Copy, PartialEq)]
enum Section {
    None,
    Users,
    Sensors,
    Tracks,
    Trains,
}

impl StationSnapshot {
    /// Parse snapshot text.
    ///
    /// Malformed records are skipped with a `warn!`; sensor records with a
    /// zero capacity, zero window, or a window larger than the capacity are
    /// ignored the same way.
    pub fn parse(text: &str) -> Self {
        let mut snapshot = Self::default();
        let mut section = Section::None;

        for line in text.lines() {
            let line = line.trim_end();
            if line.is_empty() {
                continue;
            }
            if line.starts_with('[') {
                section = match line {
                    "[USERS]" => Section::Users,
                    "[SENSORS]" => Section::Sensors,
                    "[TRACKS]" => Section::Tracks,
                    "[TRAINS]" => Section::Trains,
                    other => {
                        warn!("snapshot: unknown section {other}, ignoring");
                        Section::None
                    }
                };
                continue;
            }

            match section {
                Section::Users => snapshot.parse_user(line),
                Section::Sensors => snapshot.parse_sensor(line),
                Section::Tracks => snapshot.parse_track(line),
                Section::Trains => snapshot.parse_train(line),
                Section::None => {}
            }
        }
        snapshot
    }

    fn parse_user(&mut self, line: &str) {
        let fields: Vec<&str> = line.split(';').collect();
        let [role, name, username, password, key] = fields[..] else {
            warn!("snapshot: skipping malformed user record: {line}");
            return;
        };
        let Ok(caesar_key) = key.parse::<i32>() else {
            warn!("snapshot: skipping user {username} with bad caesar key");
            return;
        };
        self.users.push(UserRecord {
            role: UserRole::parse(role),
            name: name.to_string(),
            username: username.to_string(),
            password: password.to_string(),
            caesar_key,
        });
    }

    fn parse_sensor(&mut self, line: &str) {
        let fields: Vec<&str> = line.split(';').collect();
        let [name, buffer, window] = fields[..] else {
            warn!("snapshot: skipping malformed sensor record: {line}");
            return;
        };
        let capacity = buffer.strip_prefix("BUFFER=").and_then(|v| v.parse().ok());
        let window = window.strip_prefix("WINDOW=").and_then(|v| v.parse().ok());
        let (Some(capacity), Some(window)) = (capacity, window) else {
            warn!("snapshot: skipping malformed sensor record: {line}");
            return;
        };
        if capacity == 0 || window == 0 || window > capacity {
            warn!("snapshot: ignoring invalid sizing for sensor {name}");
            return;
        }
        self.sensors.push(SensorRecord {
            name: name.to_string(),
            config: SensorConfig { capacity, window },
        });
    }

    fn parse_track(&mut self, line: &str) {
        let fields: Vec<&str> = line.split(';').collect();
        let ["TRACK", id, state, occupant] = fields[..] else {
            warn!("snapshot: skipping malformed track record: {line}");
            return;
        };
        let (Ok(id), Ok(state), Ok(occupant)) =
            (id.parse::<u32>(), state.parse::<i32>(), occupant.parse::<i64>())
        else {
            warn!("snapshot: skipping malformed track record: {line}");
            return;
        };
        let occupant = u32::try_from(occupant).ok();
        self.tracks.push(Track {
            id,
            state: TrackState::from_code(state),
            occupant,
        });
    }

    fn parse_train(&mut self, line: &str) {
        let fields: Vec<&str> = line.split(';').collect();
        let ["TRAIN", id] = fields[..] else {
            warn!("snapshot: skipping malformed train record: {line}");
            return;
        };
        match id.parse::<u32>() {
            Ok(id) => self.trains.push(id),
            Err(_) => warn!("snapshot: skipping malformed train record: {line}"),
        }
    }

    /// Render the snapshot back to its file format.
    pub fn render(&self) -> String {
        let mut out = String::new();

        out.push_str("[USERS]\n");
        for u in &self.users {
            out.push_str(&format!(
                "{};{};{};{};{}\n",
                u.role.as_str(),
                u.name,
                u.username,
                u.password,
                u.caesar_key
            ));
        }

        out.push_str("\n[SENSORS]\n");
        for s in &self.sensors {
            out.push_str(&format!(
                "{};BUFFER={};WINDOW={}\n",
                s.name, s.config.capacity, s.config.window
            ));
        }

        out.push_str("\n[TRACKS]\n");
        for t in &self.tracks {
            let occupant = t.occupant.map_or(-1, |id| i64::from(id));
            out.push_str(&format!(
                "TRACK;{};{};{}\n",
                t.id,
                t.state.code(),
                occupant
            ));
        }

        out.push_str("\n[TRAINS]\n");
        for id in &self.trains {
            out.push_str(&format!("TRAIN;{id}\n"));
        }

        out
    }

    /// Build the track/train registry, re-linking each train to the track
    /// that names it as occupant.
    pub fn registry(&self) -> Registry {
        let trains = self
            .trains
            .iter()
            .map(|&id| Train {
                id,
                assigned: self
                    .tracks
                    .iter()
                    .find(|t| t.occupant == Some(id))
                    .map(|t| t.id),
            })
            .collect();
        Registry::from_parts(self.tracks.clone(), trains)
    }

    /// Sizing for the named sensor, if the snapshot carries one.
    pub fn sensor_config(&self, name: &str) -> Option<SensorConfig> {
        self.sensors
            .iter()
            .find(|s| s.name == name)
            .map(|s| s.config)
    }

    /// Read and parse a snapshot file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, SnapshotError> {
        Ok(Self::parse(&std::fs::read_to_string(path)?))
    }

    /// Write the snapshot to a file.
    pub fn save(&self, path: impl AsRef<Path>) -> Result<(), SnapshotError> {
        std::fs::write(path, self.render())?;
        Ok(())
    }
}

// ============================================================================
// Tests
// ============================================================================
