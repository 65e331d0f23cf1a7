//! Sensor response frame parsing.
//!
//! The controller board answers a `GTH` poll with an ASCII frame of
//! `#`-separated segments, each carrying one labeled measurement:
//!
//! ```text
//! TEMP&unit:celsius&value:20#HUM&unit:percentage&value:80
//! ```
//!
//! [`extract`] pulls out the measurement for one token; segments that do
//! not lead with the requested token are ignored as junk, so an unrelated
//! or garbled segment never poisons the others. A frame missing a token
//! altogether is not fatal to the station; that sensor simply gets no
//! sample for the cycle.
//!
//! # Example
//!
//! ```rust
//! use rs_railops::frame::extract;
//!
//! let frame = "TEMP&unit:celsius&value:0020#HUM&unit:percentage&value:80";
//! let m = extract(frame, "TEMP").unwrap();
//! assert_eq!(m.unit, "celsius");
//! assert_eq!(m.value, 20);
//! ```

use thiserror::Error;

/// Errors produced by [`extract`].
#[derive(Debug, Error, PartialEq, Eq)]
pub enum FrameError {
    /// The requested token is empty, whitespace-only, or contains whitespace.
    #[error("invalid sensor token")]
    InvalidToken,

    /// No segment in the frame leads with the requested token.
    #[error("token not found in frame")]
    TokenNotFound,

    /// The matching segment does not follow `TOKEN&unit:UNIT&value:INT`.
    #[error("malformed frame segment")]
    MalformedSegment,
}

/// One labeled measurement extracted from a frame segment.
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Measurement {
    /// Unit text as reported by the sensor (e.g. `celsius`, `percentage`).
    pub unit: String,
    /// Integer reading.
    pub value: i32,
}

impl Measurement {
    /// Re-serialize as a frame segment for the given token.
    ///
    /// `extract(&m.render_segment(t), t)` reproduces `m`.
    pub fn render_segment(&self, token: &str) -> String {
        format!("{}&unit:{}&value:{}", token, self.unit, self.value)
    }
}

/// Extract the measurement labeled `token` from a response frame.
///
/// The frame is split on `#`; a segment is selected only if the text before
/// its first `&` equals `token` exactly (case-sensitive). The first matching
/// segment decides the outcome: it must carry a non-empty unit behind
/// `&unit:` and an all-digit value behind `&value:` (leading zeros parse as
/// decimal). Whitespace anywhere in the token or the matching segment is
/// rejected.
pub fn extract(frame: &str, token: &str) -> Result<Measurement, FrameError> {
    if token.is_empty() || token.contains(char::is_whitespace) {
        return Err(FrameError::InvalidToken);
    }

    for segment in frame.split('#') {
        let head = segment.split('&').next().unwrap_or("");
        if head != token {
            continue;
        }
        return parse_segment(segment, token);
    }

    Err(FrameError::TokenNotFound)
}

/// Parse the body of a segment already known to lead with `token`.
fn parse_segment(segment: &str, token: &str) -> Result<Measurement, FrameError> {
    if segment.contains(char::is_whitespace) {
        return Err(FrameError::MalformedSegment);
    }

    let rest = &segment[token.len()..];
    let rest = rest
        .strip_prefix("&unit:")
        .ok_or(FrameError::MalformedSegment)?;

    let (unit, rest) = rest
        .split_once('&')
        .ok_or(FrameError::MalformedSegment)?;
    if unit.is_empty() {
        return Err(FrameError::MalformedSegment);
    }

    let digits = rest
        .strip_prefix("value:")
        .ok_or(FrameError::MalformedSegment)?;
    if digits.is_empty() || !digits.bytes().all(|b| b.is_ascii_digit()) {
        return Err(FrameError::MalformedSegment);
    }
    let value: i32 = digits
        .parse()
        .map_err(|_| FrameError::MalformedSegment)?;

    Ok(Measurement {
        unit: unit.to_string(),
        value,
    })
}

// ============================================================================
// Tests
// ============================================================================
