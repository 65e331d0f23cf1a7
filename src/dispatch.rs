//! Instruction state machine over the track/train registry.
//!
//! [`process`] consumes one operator [`Instruction`] against the registry
//! and produces exactly one of three outcome kinds:
//!
//! - [`DispatchOutcome::Applied`]: the transition ran; the registry changed
//!   and a light command may be ready to send.
//! - [`DispatchOutcome::Rejected`]: a validation failure (unknown id, state
//!   conflict); the registry is untouched.
//! - [`DispatchOutcome::Emergency`]: system-wide resource exhaustion: an
//!   assignment was requested and no track in the whole station is free.
//!
//! The three-way split exists because the logging collaborator records only
//! two of them: applied transitions and emergencies. Plain rejections are
//! reported to the operator and forgotten.
//!
//! # Safety invariants enforced here
//!
//! - a track is never double-assigned (`Busy` rejects assignment);
//! - a train never occupies two tracks (`assigned` rejects assignment);
//! - an out-of-service track never receives a train;
//! - assignment with no free track anywhere raises the emergency, checked
//!   before any per-id validation, so an empty registry is an emergency,
//!   not a lookup failure.
//!
//! # Example
//!
//! ```rust
//! use rs_railops::dispatch::{process, DispatchOutcome};
//! use rs_railops::instruction::Instruction;
//! use rs_railops::registry::{Registry, Track, Train};
//!
//! let mut reg = Registry::new();
//! reg.add_track(Track::free(1));
//! reg.add_train(Train::unassigned(20));
//!
//! let outcome = process(&mut reg, &Instruction::AssignTrack { track: 1, train: 20 });
//! match outcome {
//!     DispatchOutcome::Applied { command, .. } => {
//!         assert_eq!(command.unwrap().as_str(), "YE,01");
//!     }
//!     _ => unreachable!(),
//! }
//! ```

use core::fmt;

use crate::command::{CommandString, OpCode};
use crate::instruction::Instruction;
use crate::registry::{Registry, TrackState};

/// Result of dispatching one instruction.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum DispatchOutcome {
    /// The transition ran and the registry was updated.
    Applied {
        /// Operator-facing description ("Track 2 assigned to Train 5510").
        description: String,
        /// Light command to forward to the board. `None` when the track id
        /// cannot be encoded in the two-digit wire field; the transition
        /// stands, nothing is sent.
        command: Option<CommandString>,
    },

    /// Validation failed; nothing changed. Never logged.
    Rejected(RejectReason),

    /// No free track anywhere for an assignment. Always logged; the
    /// control loop continues.
    Emergency {
        /// Operator-facing emergency text.
        description: String,
    },
}

/// Why an instruction was rejected without any state change.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum RejectReason {
    /// No track with this id exists.
    UnknownTrack(u32),
    /// No train with this id exists.
    UnknownTrain(u32),
    /// The track is out of service.
    TrackInoperative(u32),
    /// The track is already occupied.
    TrackBusy {
        /// Requested track.
        track: u32,
        /// Train currently occupying it, when known.
        occupant: Option<u32>,
    },
    /// The train already occupies another track.
    TrainAlreadyAssigned {
        /// Requested train.
        train: u32,
        /// Track it currently occupies.
        track: u32,
    },
    /// The track is already free.
    TrackAlreadyFree(u32),
    /// The track is already out of service.
    TrackAlreadyInoperative(u32),
    /// The train has no track to depart from.
    TrainNotAssigned(u32),
    /// The instruction is not a track operation; the dispatcher never
    /// handles it.
    NotATrackOperation,
}

impl fmt::Display for RejectReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RejectReason::UnknownTrack(id) => write!(f, "Track {id} does not exist"),
            RejectReason::UnknownTrain(id) => write!(f, "Train {id} does not exist"),
            RejectReason::TrackInoperative(id) => {
                write!(f, "Track {id} is NON-OPERATIONAL")
            }
            RejectReason::TrackBusy {
                track,
                occupant: Some(train),
            } => write!(f, "Track {track} is BUSY by Train {train}"),
            RejectReason::TrackBusy {
                track,
                occupant: None,
            } => write!(f, "Track {track} is BUSY"),
            RejectReason::TrainAlreadyAssigned { train, track } => {
                write!(f, "Train {train} is already assigned to Track {track}")
            }
            RejectReason::TrackAlreadyFree(id) => write!(f, "Track {id} is already FREE"),
            RejectReason::TrackAlreadyInoperative(id) => {
                write!(f, "Track {id} is already NON-OPERATIONAL")
            }
            RejectReason::TrainNotAssigned(id) => {
                write!(f, "Train {id} is not assigned to any track")
            }
            RejectReason::NotATrackOperation => write!(f, "Not a track operation"),
        }
    }
}

const EMERGENCY_TEXT: &str = "EMERGENCY STOP: no free tracks available";

/// Apply one instruction to the registry.
///
/// Non-track instructions ([`CollectReadings`](Instruction::CollectReadings),
/// [`Exit`](Instruction::Exit), [`Invalid`](Instruction::Invalid)) are
/// rejected with [`RejectReason::NotATrackOperation`] and never touch state;
/// the station routes them before reaching the dispatcher.
pub fn process(registry: &mut Registry, instruction: &Instruction) -> DispatchOutcome {
    match *instruction {
        Instruction::AssignTrack { track, train } => assign_track(registry, track, train),
        Instruction::SetFree { track } => set_free(registry, track),
        Instruction::SetNonOperational { track } => set_non_operational(registry, track),
        Instruction::Departure { train } => departure(registry, train),
        _ => DispatchOutcome::Rejected(RejectReason::NotATrackOperation),
    }
}

fn assign_track(registry: &mut Registry, track_id: u32, train_id: u32) -> DispatchOutcome {
    // Resource exhaustion outranks per-id validation: with nothing free,
    // the station must raise the emergency even for ids it has never heard
    // of.
    if !registry.has_free_track() {
        return DispatchOutcome::Emergency {
            description: EMERGENCY_TEXT.to_string(),
        };
    }

    let Some(track) = registry.find_track(track_id) else {
        return DispatchOutcome::Rejected(RejectReason::UnknownTrack(track_id));
    };
    let Some(train) = registry.find_train(train_id) else {
        return DispatchOutcome::Rejected(RejectReason::UnknownTrain(train_id));
    };

    match track.state {
        TrackState::Inoperative => {
            return DispatchOutcome::Rejected(RejectReason::TrackInoperative(track_id));
        }
        TrackState::Busy => {
            return DispatchOutcome::Rejected(RejectReason::TrackBusy {
                track: track_id,
                occupant: track.occupant,
            });
        }
        TrackState::Free | TrackState::Arriving => {}
    }

    if let Some(current) = train.assigned {
        return DispatchOutcome::Rejected(RejectReason::TrainAlreadyAssigned {
            train: train_id,
            track: current,
        });
    }

    registry.occupy(track_id, train_id);
    applied(
        format!("Track {track_id} assigned to Train {train_id}"),
        OpCode::Yellow,
        track_id,
    )
}

fn set_free(registry: &mut Registry, track_id: u32) -> DispatchOutcome {
    let Some(track) = registry.find_track(track_id) else {
        return DispatchOutcome::Rejected(RejectReason::UnknownTrack(track_id));
    };
    if track.state == TrackState::Free {
        return DispatchOutcome::Rejected(RejectReason::TrackAlreadyFree(track_id));
    }

    registry.free(track_id);
    applied(
        format!("Track {track_id} set FREE"),
        OpCode::Green,
        track_id,
    )
}

fn set_non_operational(registry: &mut Registry, track_id: u32) -> DispatchOutcome {
    let Some(track) = registry.find_track(track_id) else {
        return DispatchOutcome::Rejected(RejectReason::UnknownTrack(track_id));
    };
    if track.state == TrackState::Inoperative {
        return DispatchOutcome::Rejected(RejectReason::TrackAlreadyInoperative(track_id));
    }

    registry.set_inoperative(track_id);
    applied(
        format!("Track {track_id} set to NON-OPERATIONAL"),
        OpCode::RedBlink,
        track_id,
    )
}

fn departure(registry: &mut Registry, train_id: u32) -> DispatchOutcome {
    let Some(train) = registry.find_train(train_id) else {
        return DispatchOutcome::Rejected(RejectReason::UnknownTrain(train_id));
    };
    let Some(track_id) = train.assigned else {
        return DispatchOutcome::Rejected(RejectReason::TrainNotAssigned(train_id));
    };
    if registry.find_track(track_id).is_none() {
        return DispatchOutcome::Rejected(RejectReason::UnknownTrack(track_id));
    }

    registry.free(track_id);
    applied(
        format!("Departure for Train {train_id}"),
        OpCode::Red,
        track_id,
    )
}

fn applied(description: String, op: OpCode, track_id: u32) -> DispatchOutcome {
    let command = i32::try_from(track_id)
        .ok()
        .and_then(|n| op.encode(n).ok());
    DispatchOutcome::Applied {
        description,
        command,
    }
}

// ============================================================================
// Tests
// ============================================================================
