use crate::recorder::TapInterval;

/// Drawing area the plot is normalized into. Y grows downwards.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PlotCanvas {
    pub width: f64,
    /// y of the baseline; shortest durations sit here
    pub floor_y: f64,
    /// how far above the floor the longest duration is drawn
    pub rise: f64,
}

/// Most recent taps plus the bounds used to normalize them
#[derive(Debug, Clone, PartialEq)]
pub struct Window<'a> {
    pub taps: &'a [TapInterval],
    pub min_duration: u64,
    pub max_duration: u64,
    /// start of the first tap in the window
    pub min_start: u64,
    /// start of the last tap in the window
    pub max_start: u64,
}

/// Last `window_size` taps in chronological order. `None` for an empty history.
pub fn compute_window(history: &[TapInterval], window_size: usize) -> Option<Window<'_>> {
    let taps = &history[history.len().saturating_sub(window_size)..];
    let (first, last) = (taps.first()?, taps.last()?);

    let (min_duration, max_duration) = taps
        .iter()
        .map(TapInterval::duration)
        .fold((u64::MAX, u64::MIN), |(lo, hi), d| (lo.min(d), hi.max(d)));

    Some(Window {
        taps,
        min_duration,
        max_duration,
        min_start: first.start,
        max_start: last.start,
    })
}

impl Window<'_> {
    /// Normalized (x, y) per tap: start across the width, longer presses higher
    pub fn plot(&self, canvas: &PlotCanvas) -> Vec<(f64, f64)> {
        self.taps
            .iter()
            .map(|tap| {
                let x = map_range(
                    tap.start as f64,
                    self.min_start as f64,
                    self.max_start as f64,
                    0.0,
                    canvas.width,
                );
                let y = map_range(
                    tap.duration() as f64,
                    self.min_duration as f64,
                    self.max_duration as f64,
                    canvas.floor_y,
                    canvas.floor_y - canvas.rise,
                );
                (x, y)
            })
            .collect()
    }
}

/// Polyline for the trailing plot; a flat baseline until there are two taps
pub fn plot_polyline(
    history: &[TapInterval],
    window_size: usize,
    canvas: &PlotCanvas,
) -> Vec<(f64, f64)> {
    match compute_window(history, window_size) {
        Some(window) if window.taps.len() >= 2 => window.plot(canvas),
        _ => vec![(0.0, canvas.floor_y), (canvas.width, canvas.floor_y)],
    }
}

/// Linear map of `value` from [in_lo, in_hi] onto [out_lo, out_hi]. A collapsed
/// input range maps to `out_lo`.
fn map_range(value: f64, in_lo: f64, in_hi: f64, out_lo: f64, out_hi: f64) -> f64 {
    let span = in_hi - in_lo;
    if span == 0.0 {
        return out_lo;
    }
    out_lo + (value - in_lo) / span * (out_hi - out_lo)
}

#[cfg(test)]
mod tests {
    use super::*;

    const CANVAS: PlotCanvas = PlotCanvas {
        width: 200.0,
        floor_y: 150.0,
        rise: 100.0,
    };

    fn taps(pairs: &[(u64, u64)]) -> Vec<TapInterval> {
        pairs.iter().map(|&(s, e)| TapInterval::new(s, e)).collect()
    }

    #[test]
    fn empty_history_has_no_window() {
        assert_eq!(compute_window(&[], 10), None);
    }

    #[test]
    fn single_tap_window_has_equal_bounds() {
        let history = taps(&[(2000, 2100)]);
        let window = compute_window(&history, 10).unwrap();
        assert_eq!(window.min_duration, 100);
        assert_eq!(window.max_duration, 100);
        assert_eq!(window.min_start, 2000);
        assert_eq!(window.max_start, 2000);
    }

    #[test]
    fn window_keeps_last_entries_in_order() {
        let history = (0..15u64)
            .map(|i| TapInterval::new(i * 100, i * 100 + 10 + i))
            .collect::<Vec<_>>();
        let window = compute_window(&history, 10).unwrap();
        assert_eq!(window.taps.len(), 10);
        assert_eq!(window.taps[0], history[5]);
        assert_eq!(window.taps[9], history[14]);
        assert_eq!(window.min_start, 500);
        assert_eq!(window.max_start, 1400);
        assert_eq!(window.min_duration, 15);
        assert_eq!(window.max_duration, 24);
    }

    #[test]
    fn start_bounds_are_positional() {
        // durations vary independently of position
        let history = taps(&[(0, 90), (100, 120), (300, 340)]);
        let window = compute_window(&history, 10).unwrap();
        assert_eq!(window.min_start, 0);
        assert_eq!(window.max_start, 300);
        assert_eq!(window.min_duration, 20);
        assert_eq!(window.max_duration, 90);
    }

    #[test]
    fn plot_maps_into_canvas() {
        let history = taps(&[(0, 20), (100, 160), (200, 300)]);
        let points = compute_window(&history, 10).unwrap().plot(&CANVAS);
        assert_eq!(points, vec![(0.0, 150.0), (100.0, 100.0), (200.0, 50.0)]);
    }

    #[test]
    fn fewer_than_two_taps_yield_baseline() {
        let baseline = vec![(0.0, 150.0), (200.0, 150.0)];
        assert_eq!(plot_polyline(&[], 10, &CANVAS), baseline);
        assert_eq!(plot_polyline(&taps(&[(0, 50)]), 10, &CANVAS), baseline);
    }

    #[test]
    fn equal_durations_sit_on_the_floor() {
        let history = taps(&[(0, 50), (100, 150)]);
        let points = plot_polyline(&history, 10, &CANVAS);
        assert_eq!(points, vec![(0.0, 150.0), (200.0, 150.0)]);
        assert!(points.iter().all(|(x, y)| x.is_finite() && y.is_finite()));
    }

    #[test]
    fn window_size_one_with_history_plots_baseline() {
        let history = taps(&[(0, 50), (100, 170)]);
        let points = plot_polyline(&history, 1, &CANVAS);
        assert_eq!(points, vec![(0.0, 150.0), (200.0, 150.0)]);
    }
}
