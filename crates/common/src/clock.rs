//! Job clock.
//!
//! A batch job captures the wall clock once, when it is submitted. Every
//! output name generated for that job reads the same `{date}` and `{time}`
//! values, no matter how long the job runs.

use std::time::Instant;

use chrono::{DateTime, Local, NaiveDateTime};

/// Wall-clock stamp frozen at job start.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct JobStamp {
    /// `YYYYMMDD`.
    date: String,
    /// `HHMMSS`.
    time: String,
}

impl JobStamp {
    /// Capture the current local time.
    pub fn now() -> Self {
        Self::from_datetime(Local::now())
    }

    /// Build a stamp from a known instant.
    pub fn from_datetime(at: DateTime<Local>) -> Self {
        Self::from_naive(at.naive_local())
    }

    /// Build a stamp from a naive local time (useful in tests).
    pub fn from_naive(at: NaiveDateTime) -> Self {
        Self {
            date: at.format("%Y%m%d").to_string(),
            time: at.format("%H%M%S").to_string(),
        }
    }

    /// Date component, `YYYYMMDD`.
    pub fn date(&self) -> &str {
        &self.date
    }

    /// Time component, `HHMMSS`.
    pub fn time(&self) -> &str {
        &self.time
    }
}

/// Elapsed-time tracker for a running job.
#[derive(Debug, Clone)]
pub struct JobClock {
    started: Instant,
    stamp: JobStamp,
}

impl JobClock {
    /// Start a clock anchored to now.
    pub fn start() -> Self {
        Self {
            started: Instant::now(),
            stamp: JobStamp::now(),
        }
    }

    /// The stamp captured at start.
    pub fn stamp(&self) -> &JobStamp {
        &self.stamp
    }

    /// Seconds elapsed since start.
    pub fn elapsed_secs(&self) -> f64 {
        self.started.elapsed().as_secs_f64()
    }

    /// Milliseconds elapsed since start.
    pub fn elapsed_ms(&self) -> u128 {
        self.started.elapsed().as_millis()
    }
}

#[cfg(test)]
mod tests {
    use chrono::NaiveDate;

    use super::*;

    #[test]
    fn test_stamp_formats() {
        let at = NaiveDate::from_ymd_opt(2024, 3, 7)
            .and_then(|d| d.and_hms_opt(9, 5, 1))
            .unwrap();
        let stamp = JobStamp::from_naive(at);
        assert_eq!(stamp.date(), "20240307");
        assert_eq!(stamp.time(), "090501");
    }

    #[test]
    fn test_clock_keeps_stamp_fixed() {
        let clock = JobClock::start();
        let first = clock.stamp().clone();
        std::thread::sleep(std::time::Duration::from_millis(5));
        assert_eq!(clock.stamp(), &first);
        assert!(clock.elapsed_secs() < 1.0);
    }
}
