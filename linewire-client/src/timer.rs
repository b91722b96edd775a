//! Named interval timing for diagnostics.

use crate::error::TimerError;
use std::collections::HashMap;
use std::time::Duration;
use tokio::time::Instant;

/// A named duration recorded by [`IntervalTimer::measure`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Measurement {
    pub name: String,
    pub duration: Duration,
}

/// Records named points in time and the intervals between them.
///
/// Owned by whoever is timing; there is no process-wide instance.
#[derive(Debug, Default)]
pub struct IntervalTimer {
    marks: HashMap<String, Instant>,
    measures: Vec<Measurement>,
}

impl IntervalTimer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Records the current time under `label`, replacing any earlier mark.
    pub fn mark(&mut self, label: impl Into<String>) {
        self.marks.insert(label.into(), Instant::now());
    }

    /// Records the interval from mark `start` to mark `end` as `name`.
    ///
    /// Re-measuring an existing name replaces it in place. An `end` earlier
    /// than `start` measures as zero.
    pub fn measure(
        &mut self,
        name: impl Into<String>,
        start: &str,
        end: &str,
    ) -> Result<Duration, TimerError> {
        let started = self.mark_of(start)?;
        let ended = self.mark_of(end)?;
        let duration = ended.saturating_duration_since(started);

        let name = name.into();
        match self.measures.iter_mut().find(|m| m.name == name) {
            Some(existing) => existing.duration = duration,
            None => self.measures.push(Measurement { name, duration }),
        }
        Ok(duration)
    }

    /// Returns recorded measurements in the order they were first measured.
    pub fn entries(&self) -> &[Measurement] {
        &self.measures
    }

    /// Forgets all marks and measurements.
    pub fn clear(&mut self) {
        self.marks.clear();
        self.measures.clear();
    }

    fn mark_of(&self, label: &str) -> Result<Instant, TimerError> {
        self.marks
            .get(label)
            .copied()
            .ok_or_else(|| TimerError::LabelNotFound(label.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test(start_paused = true)]
    async fn test_measure_between_marks() {
        let mut timer = IntervalTimer::new();
        timer.mark("connect");
        tokio::time::advance(Duration::from_millis(30)).await;
        timer.mark("info");
        tokio::time::advance(Duration::from_millis(20)).await;
        timer.mark("pong");

        assert_eq!(
            timer.measure("handshake", "connect", "info").unwrap(),
            Duration::from_millis(30)
        );
        assert_eq!(
            timer.measure("rtt", "info", "pong").unwrap(),
            Duration::from_millis(20)
        );

        let names: Vec<&str> = timer.entries().iter().map(|m| m.name.as_str()).collect();
        assert_eq!(names, ["handshake", "rtt"]);
    }

    #[test]
    fn test_missing_label() {
        let mut timer = IntervalTimer::new();
        timer.mark("start");

        assert_eq!(
            timer.measure("total", "start", "end"),
            Err(TimerError::LabelNotFound("end".to_string()))
        );
        assert_eq!(
            timer.measure("total", "begin", "start"),
            Err(TimerError::LabelNotFound("begin".to_string()))
        );
        assert!(timer.entries().is_empty());
    }

    #[tokio::test(start_paused = true)]
    async fn test_remeasure_replaces_in_place() {
        let mut timer = IntervalTimer::new();
        timer.mark("a");
        timer.mark("b");
        timer.measure("first", "a", "b").unwrap();
        timer.measure("second", "a", "b").unwrap();

        tokio::time::advance(Duration::from_millis(5)).await;
        timer.mark("b");
        timer.measure("first", "a", "b").unwrap();

        assert_eq!(timer.entries().len(), 2);
        assert_eq!(timer.entries()[0].name, "first");
        assert_eq!(timer.entries()[0].duration, Duration::from_millis(5));
    }

    #[tokio::test(start_paused = true)]
    async fn test_reversed_marks_measure_zero() {
        let mut timer = IntervalTimer::new();
        timer.mark("early");
        tokio::time::advance(Duration::from_millis(5)).await;
        timer.mark("late");

        assert_eq!(
            timer.measure("backwards", "late", "early").unwrap(),
            Duration::ZERO
        );

        timer.clear();
        assert!(timer.entries().is_empty());
        assert!(timer.measure("gone", "early", "late").is_err());
    }
}
