use serde::{Deserialize, Serialize};
use std::fmt;

use crate::config::EngineConfig;

/// One completed press
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TapInterval {
    pub start: u64,
    pub end: u64,
}

impl TapInterval {
    pub fn new(start: u64, end: u64) -> Self {
        Self { start, end }
    }

    pub fn duration(&self) -> u64 {
        self.end.saturating_sub(self.start)
    }
}

/// Same shape as the serialized form: `{"start":S,"end":E}`
impl fmt::Display for TapInterval {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, r#"{{"start":{},"end":{}}}"#, self.start, self.end)
    }
}

/// Running maxima, kept only when extrema tracking is enabled
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Extrema {
    pub max_duration: u64,
    pub max_gap: u64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DiscardReason {
    /// shorter than the minimum press duration
    TooShort,
    /// release before press, or press before the previous release
    ClockSkew,
}

/// What a press-start / press-end call did to the recorder
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PressOutcome {
    /// duplicate start, release without press, or press in the control strip
    Ignored,
    Started,
    /// first gesture of the session; arms recording and is never stored
    Armed,
    Discarded { duration: u64, reason: DiscardReason },
    Recorded { tap: TapInterval, duration: u64 },
}

/// Owns the tap history and the press state machine
#[derive(Debug, Clone)]
pub struct TapRecorder {
    min_press_duration_ms: u64,
    history: Vec<TapInterval>,
    is_pressing: bool,
    pending_start: Option<u64>,
    has_started: bool,
    extrema: Option<Extrema>,
}

impl TapRecorder {
    pub fn new(config: &EngineConfig) -> Self {
        Self {
            min_press_duration_ms: config.min_press_duration_ms,
            history: Vec::new(),
            is_pressing: false,
            pending_start: None,
            has_started: false,
            extrema: config.track_extrema.then(Extrema::default),
        }
    }

    /// Begin a press at `now`. `in_reserved_area` marks presses that land on the controls.
    pub fn on_press_start(&mut self, now: u64, in_reserved_area: bool) -> PressOutcome {
        if self.is_pressing || in_reserved_area {
            return PressOutcome::Ignored;
        }
        self.is_pressing = true;
        self.pending_start = Some(now);
        PressOutcome::Started
    }

    pub fn on_press_end(&mut self, now: u64) -> PressOutcome {
        if !self.is_pressing {
            return PressOutcome::Ignored;
        }
        self.is_pressing = false;
        let Some(start) = self.pending_start.take() else {
            return PressOutcome::Ignored;
        };

        if !self.has_started {
            self.has_started = true;
            return PressOutcome::Armed;
        }

        if now < start {
            return PressOutcome::Discarded {
                duration: 0,
                reason: DiscardReason::ClockSkew,
            };
        }
        let duration = now - start;
        if duration < self.min_press_duration_ms {
            return PressOutcome::Discarded {
                duration,
                reason: DiscardReason::TooShort,
            };
        }

        let gap = match self.history.last() {
            Some(prev) if start < prev.end => {
                return PressOutcome::Discarded {
                    duration,
                    reason: DiscardReason::ClockSkew,
                };
            }
            Some(prev) => Some(start - prev.end),
            None => None,
        };

        let tap = TapInterval::new(start, now);
        self.history.push(tap);

        if let Some(extrema) = self.extrema.as_mut() {
            extrema.max_duration = extrema.max_duration.max(duration);
            if let Some(gap) = gap {
                extrema.max_gap = extrema.max_gap.max(gap);
            }
        }

        PressOutcome::Recorded { tap, duration }
    }

    pub fn history(&self) -> &[TapInterval] {
        &self.history
    }

    pub fn is_pressing(&self) -> bool {
        self.is_pressing
    }

    pub fn pending_start(&self) -> Option<u64> {
        self.pending_start
    }

    pub fn has_started(&self) -> bool {
        self.has_started
    }

    pub fn extrema(&self) -> Option<Extrema> {
        self.extrema
    }
}
