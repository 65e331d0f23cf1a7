//! Operator instructions.
//!
//! One [`Instruction`] is produced per operator action by the frontend and
//! consumed exactly once by the station. Track operations are dispatched
//! through the state machine in [`crate::dispatch`]; the remaining variants
//! are control-loop concerns handled by [`crate::station`].

use core::fmt;

/// A single operator action.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "snake_case"))]
pub enum Instruction {
    /// Assign a train to a track, lighting it yellow.
    AssignTrack {
        /// Target track.
        track: u32,
        /// Arriving train.
        train: u32,
    },
    /// Release a track back to free, lighting it green.
    SetFree {
        /// Track to release.
        track: u32,
    },
    /// Take a track out of service, lighting it blinking red.
    SetNonOperational {
        /// Track to withdraw.
        track: u32,
    },
    /// Clear a train for departure, freeing its track.
    Departure {
        /// Departing train.
        train: u32,
    },
    /// Poll the sensors and refresh the smoothed readings.
    CollectReadings,
    /// Leave the control loop.
    Exit,
    /// Unrecognized menu input; never mutates anything.
    Invalid,
}

impl Instruction {
    /// True for the four variants the dispatcher's state machine handles.
    pub const fn is_track_operation(&self) -> bool {
        matches!(
            self,
            Instruction::AssignTrack { .. }
                | Instruction::SetFree { .. }
                | Instruction::SetNonOperational { .. }
                | Instruction::Departure { .. }
        )
    }

    /// Stable one-line description used for action-log records.
    pub fn describe(&self) -> String {
        self.to_string()
    }
}

impl fmt::Display for Instruction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Instruction::AssignTrack { track, train } => {
                write!(f, "ASSIGN_TRACK track={track} train={train}")
            }
            Instruction::SetFree { track } => write!(f, "SET_FREE track={track}"),
            Instruction::SetNonOperational { track } => write!(f, "SET_NONOP track={track}"),
            Instruction::Departure { train } => write!(f, "DEPARTURE train={train}"),
            Instruction::CollectReadings => write!(f, "COLLECT_READINGS"),
            Instruction::Exit => write!(f, "EXIT"),
            Instruction::Invalid => write!(f, "UNKNOWN_INSTRUCTION"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn descriptions_are_stable() {
        assert_eq!(
            Instruction::AssignTrack { track: 2, train: 5510 }.describe(),
            "ASSIGN_TRACK track=2 train=5510"
        );
        assert_eq!(Instruction::SetFree { track: 1 }.describe(), "SET_FREE track=1");
        assert_eq!(
            Instruction::SetNonOperational { track: 3 }.describe(),
            "SET_NONOP track=3"
        );
        assert_eq!(
            Instruction::Departure { train: 10 }.describe(),
            "DEPARTURE train=10"
        );
        assert_eq!(Instruction::CollectReadings.describe(), "COLLECT_READINGS");
        assert_eq!(Instruction::Exit.describe(), "EXIT");
        assert_eq!(Instruction::Invalid.describe(), "UNKNOWN_INSTRUCTION");
    }

    #[test]
    fn track_operation_classification() {
        assert!(Instruction::AssignTrack { track: 1, train: 2 }.is_track_operation());
        assert!(Instruction::SetFree { track: 1 }.is_track_operation());
        assert!(Instruction::SetNonOperational { track: 1 }.is_track_operation());
        assert!(Instruction::Departure { train: 2 }.is_track_operation());
        assert!(!Instruction::CollectReadings.is_track_operation());
        assert!(!Instruction::Exit.is_track_operation());
        assert!(!Instruction::Invalid.is_track_operation());
    }
}
