use itertools::Itertools;

use crate::recorder::TapInterval;
use crate::util::{mean, ms_to_secs_3dp};

/// Between-tap figures, only defined once there are two taps
#[derive(Debug, Clone, PartialEq)]
pub struct GapStats {
    /// `taps[i].start - taps[i - 1].end`, in ms
    pub gaps: Vec<u64>,
    /// seconds, three decimals
    pub average_gap: f64,
    pub total_gap_time: u64,
}

/// Aggregate figures over a tap history
#[derive(Debug, Clone, PartialEq)]
pub struct TapStats {
    pub count: usize,
    /// ms
    pub total_on_time: u64,
    /// seconds, three decimals
    pub average_on_time: f64,
    pub gaps: Option<GapStats>,
}

impl TapStats {
    /// Pressed plus between time, in ms
    pub fn total_time(&self) -> u64 {
        self.total_on_time + self.gaps.as_ref().map_or(0, |g| g.total_gap_time)
    }
}

/// Compute statistics for `history`. `None` means there is nothing to report yet.
pub fn compute_stats(history: &[TapInterval]) -> Option<TapStats> {
    let durations = history
        .iter()
        .map(|tap| tap.duration() as f64)
        .collect::<Vec<f64>>();
    let average_on_time = ms_to_secs_3dp(mean(&durations)?);
    let total_on_time = history.iter().map(TapInterval::duration).sum();

    Some(TapStats {
        count: history.len(),
        total_on_time,
        average_on_time,
        gaps: compute_gaps(history),
    })
}

fn compute_gaps(history: &[TapInterval]) -> Option<GapStats> {
    let gaps = history
        .iter()
        .tuple_windows()
        .map(|(prev, next)| next.start.saturating_sub(prev.end))
        .collect::<Vec<u64>>();

    let as_f64 = gaps.iter().map(|&g| g as f64).collect::<Vec<f64>>();
    let average_gap = ms_to_secs_3dp(mean(&as_f64)?);
    let total_gap_time = gaps.iter().sum();

    Some(GapStats {
        gaps,
        average_gap,
        total_gap_time,
    })
}
