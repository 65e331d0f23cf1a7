//! Serial transport seam to the controller board.
//!
//! The physical link (USB serial to the station's controller board) lives
//! outside this crate. The station only needs one operation: send a command,
//! maybe get a response line back. [`MockLink`] stands in for the board in
//! tests and offline runs.

/// Transport to the external controller board.
///
/// `send` forwards one wire command (see [`crate::command`]) and returns the
/// board's response line when the command solicits one (`GTH`), `None`
/// otherwise. A transport timeout is the implementation's concern and
/// surfaces here as an error or an absent response; the station treats
/// either as "board offline" and carries on.
pub trait ControllerLink {
    /// Transport error type.
    type Error;

    /// Send one command, returning the response line if any.
    fn send(&mut self, command: &str) -> Result<Option<String>, Self::Error>;
}

/// In-memory link standing in for the controller board.
///
/// Records every command sent and serves responses from a FIFO queue.
/// With `connected` cleared, every send fails, simulating a pulled cable.
///
/// # Example
///
/// ```rust
/// use rs_railops::link::{ControllerLink, MockLink};
///
/// let mut link = MockLink::new();
/// link.queue_response("TEMP&unit:celsius&value:20");
///
/// assert_eq!(
///     link.send("GTH").unwrap().as_deref(),
///     Some("TEMP&unit:celsius&value:20")
/// );
/// assert_eq!(link.send("YE,01").unwrap(), None);
/// assert_eq!(link.sent, vec!["GTH", "YE,01"]);
/// ```
#[derive(Debug, Default)]
pub struct MockLink {
    /// Every command sent, in order.
    pub sent: Vec<String>,
    /// Queue of canned response lines, drained front-first.
    pub responses: Vec<String>,
    /// When false, sends fail.
    pub connected: bool,
}

impl MockLink {
    /// A connected mock with no queued responses.
    pub fn new() -> Self {
        Self {
            connected: true,
            ..Self::default()
        }
    }

    /// A mock that fails every send.
    pub fn disconnected() -> Self {
        Self::default()
    }

    /// Queue a response line for the next soliciting command.
    pub fn queue_response(&mut self, line: impl Into<String>) {
        self.responses.push(line.into());
    }

    /// Commands sent so far, as `&str`s for easy assertion.
    pub fn sent_commands(&self) -> Vec<&str> {
        self.sent.iter().map(String::as_str).collect()
    }
}

impl ControllerLink for MockLink {
    type Error = ();

    fn send(&mut self, command: &str) -> Result<Option<String>, Self::Error> {
        if !self.connected {
            return Err(());
        }
        self.sent.push(command.to_string());
        if command == "GTH" && !self.responses.is_empty() {
            Ok(Some(self.responses.remove(0)))
        } else {
            Ok(None)
        }
    }
}
