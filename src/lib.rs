//! # rs-railops
//!
//! A railway-station controller: median-filtered environment sensors over a
//! serial link, and a track/train occupancy state machine driving the
//! station's light board.
//!
//! ## Features
//!
//! - **Lossy sample history**: fixed-capacity ring buffers that overwrite
//!   their oldest sample when full, keeping a bounded recent history under a
//!   live sensor feed
//! - **Moving-median smoothing**: spike-resistant readings over a configured
//!   window
//! - **Occupancy interlocking**: assignment, release, withdrawal and
//!   departure transitions with mutual-exclusion guarantees and a distinct
//!   emergency signal when no track is free
//! - **Snapshot persistence**: the whole station state reloads from a
//!   line-oriented config file, occupancy re-linked exactly
//!
//! ## Architecture
//!
//! The crate is structured so everything runs and tests without the
//! physical controller board:
//!
//! - `buffer` / `filter` - sample history and median smoothing
//! - `frame` / `command` - the board's inbound and outbound wire formats
//! - `registry` / `instruction` / `dispatch` - the occupancy state machine
//! - `sensors` / `board` - per-sensor channels and the operator board
//! - `link` / `logbook` / `snapshot` - seams to the transport, the action
//!   log and the config file
//! - `station` - the controller that ties everything together
//!
//! ## Example
//!
//! ```rust
//! use rs_railops::instruction::Instruction;
//! use rs_railops::link::MockLink;
//! use rs_railops::logbook::MemoryLog;
//! use rs_railops::registry::{Registry, Track, Train};
//! use rs_railops::sensors::{SensorChannel, SensorConfig};
//! use rs_railops::station::Station;
//!
//! // A two-track station with one known train, driven over a mock link.
//! let mut registry = Registry::new();
//! registry.add_track(Track::free(1));
//! registry.add_track(Track::free(2));
//! registry.add_train(Train::unassigned(5510));
//!
//! let cfg = SensorConfig { capacity: 10, window: 5 };
//! let mut station = Station::new(
//!     registry,
//!     SensorChannel::new("TEMP", cfg).unwrap(),
//!     SensorChannel::new("HUM", cfg).unwrap(),
//!     MockLink::new(),
//! );
//!
//! // Assign the train: track 1 goes busy and the board gets a yellow light.
//! let mut log = MemoryLog::new();
//! station.handle("operator", Instruction::AssignTrack { track: 1, train: 5510 }, &mut log);
//! assert_eq!(station.link().sent_commands(), vec!["YE,01"]);
//! ```

#![warn(missing_docs)]

/// Station board state and rendering.
pub mod board;
/// Fixed-capacity circular sample buffer with overwrite-on-full semantics.
pub mod buffer;
/// Outbound command formatting for the controller board.
pub mod command;
/// Instruction state machine over the track/train registry.
pub mod dispatch;
/// Moving-median smoothing.
pub mod filter;
/// Sensor response frame parsing.
pub mod frame;
/// Operator instruction types.
pub mod instruction;
/// Serial transport seam and its mock.
pub mod link;
/// Append-only action log and per-user reports.
pub mod logbook;
/// Track and train registry.
pub mod registry;
/// Per-sensor ingestion channels.
pub mod sensors;
/// Last-known-state snapshot persistence.
pub mod snapshot;
/// The station controller tying everything together.
pub mod station;

// Re-exports for convenience
pub use board::{SensorSummary, StationBoard};
pub use buffer::{BufferError, EnqueueStatus, SampleBuffer};
pub use command::{format_command, CommandError, CommandString, OpCode};
pub use dispatch::{process, DispatchOutcome, RejectReason};
pub use filter::{median, FilterError};
pub use frame::{extract, FrameError, Measurement};
pub use instruction::Instruction;
pub use link::{ControllerLink, MockLink};
pub use logbook::{ActionLog, FileActionLog, MemoryLog};
pub use registry::{Registry, Track, TrackState, Train};
pub use sensors::{SensorChannel, SensorConfig, SensorReading};
pub use snapshot::{SnapshotError, StationSnapshot, UserRecord, UserRole};
pub use station::{CollectionReport, HandleOutcome, Station, StationError};
