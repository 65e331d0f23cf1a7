//! Per-sensor ingestion channels.
//!
//! Each deployed sensor (temperature, humidity) owns a [`SensorChannel`]:
//! a token to look for in response frames, a [`SampleBuffer`] of recent
//! readings, and the unit the sensor last reported. Channels are fed the
//! whole frame and fail independently: a garbled `TEMP` segment never
//! stops the `HUM` sample from landing.

use log::debug;

use crate::buffer::{BufferError, EnqueueStatus, SampleBuffer};
use crate::filter::median;
use crate::frame::{self, FrameError};

/// Buffer sizing for one sensor, as loaded from the station snapshot.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct SensorConfig {
    /// Ring capacity in samples.
    pub capacity: usize,
    /// Smoothing window, `1..=capacity`.
    pub window: usize,
}

/// A smoothed reading reported to the station board.
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct SensorReading {
    /// Most recent raw sample.
    pub last: i32,
    /// Median over the current window.
    pub median: i32,
    /// Number of samples the median covered.
    pub window_len: usize,
    /// Unit text last reported by the sensor.
    pub unit: Option<String>,
}

/// One sensor's token, sample history and smoothing state.
#[derive(Clone, Debug)]
pub struct SensorChannel {
    token: String,
    buffer: SampleBuffer,
    unit: Option<String>,
}

impl SensorChannel {
    /// Create a channel for `token` with the given buffer sizing.
    pub fn new(token: impl Into<String>, config: SensorConfig) -> Result<Self, BufferError> {
        Ok(Self {
            token: token.into(),
            buffer: SampleBuffer::new(config.capacity, config.window)?,
            unit: None,
        })
    }

    /// Frame token this channel listens for.
    pub fn token(&self) -> &str {
        &self.token
    }

    /// Current buffer sizing.
    pub fn config(&self) -> SensorConfig {
        SensorConfig {
            capacity: self.buffer.capacity(),
            window: self.buffer.window_size(),
        }
    }

    /// Extract this channel's measurement from a response frame and store it.
    ///
    /// Returns the stored value and the buffer status so the caller can
    /// raise a one-shot "buffer full" notice. A failed extraction leaves the
    /// buffer untouched and only skips this channel's cycle.
    pub fn ingest(&mut self, frame: &str) -> Result<(i32, EnqueueStatus), FrameError> {
        let measurement = frame::extract(frame, &self.token)?;
        let status = self.buffer.enqueue(measurement.value);
        debug!(
            "{}: stored {} {} ({:?})",
            self.token,
            measurement.value,
            measurement.unit,
            status
        );
        self.unit = Some(measurement.unit);
        Ok((measurement.value, status))
    }

    /// Smoothed reading over the current window, or `None` before the first
    /// sample arrives.
    pub fn reading(&self) -> Option<SensorReading> {
        let window = self.buffer.window();
        let med = median(&window).ok()?;
        Some(SensorReading {
            last: self.buffer.last()?,
            median: med,
            window_len: window.len(),
            unit: self.unit.clone(),
        })
    }

    /// Direct access to the sample history.
    pub fn buffer(&self) -> &SampleBuffer {
        &self.buffer
    }

    /// Mutable access to the sample history, for draining.
    pub fn buffer_mut(&mut self) -> &mut SampleBuffer {
        &mut self.buffer
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    fn channel(capacity: usize, window: usize) -> SensorChannel {
        SensorChannel::new("TEMP", SensorConfig { capacity, window }).unwrap()
    }

    #[test]
    fn ingest_stores_value_and_unit() {
        let mut ch = channel(5, 3);
        let (value, status) = ch
            .ingest("TEMP&unit:celsius&value:21#HUM&unit:percent&value:60")
            .unwrap();
        assert_eq!(value, 21);
        assert_eq!(status, EnqueueStatus::Stored);

        let reading = ch.reading().unwrap();
        assert_eq!(reading.last, 21);
        assert_eq!(reading.median, 21);
        assert_eq!(reading.window_len, 1);
        assert_eq!(reading.unit.as_deref(), Some("celsius"));
    }

    #[test]
    fn reading_is_median_over_window() {
        let mut ch = channel(10, 3);
        for v in [10, 50, 20, 40, 30] {
            let frame = format!("TEMP&unit:celsius&value:{v}");
            ch.ingest(&frame).unwrap();
        }
        let reading = ch.reading().unwrap();
        // Window holds the last three samples: 20, 40, 30.
        assert_eq!(reading.last, 30);
        assert_eq!(reading.median, 30);
        assert_eq!(reading.window_len, 3);
    }

    #[test]
    fn no_reading_before_first_sample() {
        let ch = channel(5, 3);
        assert!(ch.reading().is_none());
    }

    #[test]
    fn failed_extraction_leaves_buffer_untouched() {
        let mut ch = channel(5, 3);
        ch.ingest("TEMP&unit:celsius&value:21").unwrap();

        assert!(ch.ingest("HUM&unit:percent&value:60").is_err());
        assert!(ch.ingest("TEMP&unit:celsius&value:").is_err());
        assert_eq!(ch.buffer().occupancy(), 1);
    }

    #[test]
    fn buffer_full_status_surfaces() {
        let mut ch = channel(2, 2);
        ch.ingest("TEMP&unit:c&value:1").unwrap();
        let (_, status) = ch.ingest("TEMP&unit:c&value:2").unwrap();
        assert_eq!(status, EnqueueStatus::Filled);
        let (_, status) = ch.ingest("TEMP&unit:c&value:3").unwrap();
        assert_eq!(status, EnqueueStatus::Overwrote);
    }

    #[test]
    fn drain_through_buffer_mut_empties_history() {
        let mut ch = channel(4, 2);
        ch.ingest("TEMP&unit:c&value:5").unwrap();
        ch.ingest("TEMP&unit:c&value:6").unwrap();
        assert_eq!(ch.buffer_mut().drain_oldest(2).unwrap(), vec![5, 6]);
        assert!(ch.reading().is_none());
    }
}
