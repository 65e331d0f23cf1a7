//! Outbound command formatting for the controller board.
//!
//! Every light change and sensor poll crosses the serial link as a short
//! ASCII command: either a bare operator code (`GTH`) or a code with a
//! zero-padded two-digit track number (`YE,07`). The board silently drops
//! anything else, so formatting is validated here and a failed format
//! produces no command text at all.
//!
//! # Example
//!
//! ```rust
//! use rs_railops::command::{format_command, OpCode};
//!
//! assert_eq!(format_command(" ye ", 7).unwrap().as_str(), "YE,07");
//! assert_eq!(OpCode::PollSensors.encode(-5).unwrap().as_str(), "GTH");
//! assert!(format_command("GE", 125).is_err());
//! ```

use core::fmt::Write as _;

use thiserror::Error;

/// Maximum command text length (`XX,NN`).
pub const COMMAND_MAX: usize = 8;

/// Fixed-capacity command text sent over the link.
pub type CommandString = heapless::String<COMMAND_MAX>;

/// Errors produced when formatting a command.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum CommandError {
    /// The operator code is not one the board recognizes.
    #[error("unrecognized operator code")]
    UnknownOp,

    /// The track number must fit the two-digit wire field.
    #[error("track number {0} outside 0..=99")]
    TrackOutOfRange(i32),
}

/// Operator codes understood by the controller board.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum OpCode {
    /// `GE`: green light, track released.
    Green,
    /// `YE`: yellow light, track assigned.
    Yellow,
    /// `RE`: red light, track occupied or cleared for departure.
    Red,
    /// `RB`: blinking red, track out of service.
    RedBlink,
    /// `GTH`: poll the temperature/humidity sensors; takes no track number.
    PollSensors,
}

impl OpCode {
    /// Wire text for this code.
    pub const fn as_str(self) -> &'static str {
        match self {
            OpCode::Green => "GE",
            OpCode::Yellow => "YE",
            OpCode::Red => "RE",
            OpCode::RedBlink => "RB",
            OpCode::PollSensors => "GTH",
        }
    }

    /// Whether the wire format carries a track number for this code.
    pub const fn takes_track(self) -> bool {
        !matches!(self, OpCode::PollSensors)
    }

    /// Parse an operator code, trimming surrounding whitespace and
    /// uppercasing first.
    pub fn parse(text: &str) -> Result<Self, CommandError> {
        match text.trim().to_ascii_uppercase().as_str() {
            "GE" => Ok(OpCode::Green),
            "YE" => Ok(OpCode::Yellow),
            "RE" => Ok(OpCode::Red),
            "RB" => Ok(OpCode::RedBlink),
            "GTH" => Ok(OpCode::PollSensors),
            _ => Err(CommandError::UnknownOp),
        }
    }

    /// Build the wire command for this code.
    ///
    /// Track-taking codes require `track` in `0..=99` and format it
    /// zero-padded; [`PollSensors`](Self::PollSensors) ignores the number
    /// entirely, even out of range.
    pub fn encode(self, track: i32) -> Result<CommandString, CommandError> {
        let mut cmd = CommandString::new();
        if self.takes_track() {
            if !(0..=99).contains(&track) {
                return Err(CommandError::TrackOutOfRange(track));
            }
            // Cannot overflow COMMAND_MAX: "XX,NN" is five bytes.
            let _ = write!(cmd, "{},{:02}", self.as_str(), track);
        } else {
            let _ = cmd.push_str(self.as_str());
        }
        Ok(cmd)
    }
}

/// Format a command from free operator text, as entered on a console.
///
/// Trims and uppercases `op` before matching it against the recognized
/// codes, then delegates to [`OpCode::encode`]. On failure no command text
/// is produced.
pub fn format_command(op: &str, track: i32) -> Result<CommandString, CommandError> {
    OpCode::parse(op)?.encode(track)
}

// ============================================================================
// Tests
// ============================================================================
