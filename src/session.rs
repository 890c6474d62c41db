use crate::config::{EngineConfig, BACKGROUND_MAX};
use crate::event_log::{EventLog, VISIBLE_LOG_LINES};
use crate::recorder::{DiscardReason, Extrema, PressOutcome, TapInterval, TapRecorder};
use crate::stats::{compute_stats, TapStats};
use crate::util::{format_secs, format_secs_f64};
use crate::window::{plot_polyline, PlotCanvas};

/// Share of the space above the control strip the plot may climb
const PLOT_RISE_SHARE: f64 = 0.5;

/// Size of the drawable area, in terminal cells
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Viewport {
    pub width: u16,
    pub height: u16,
}

impl Default for Viewport {
    fn default() -> Self {
        Self {
            width: 80,
            height: 24,
        }
    }
}

/// Everything the presentation layer needs to draw one frame
#[derive(Debug, Clone, PartialEq)]
pub struct FrameView {
    pub background_level: u8,
    pub is_pressing: bool,
    pub canvas: PlotCanvas,
    /// `None` until the session has been armed
    pub polyline: Option<Vec<(f64, f64)>>,
    /// empty until there are two taps; blank entries separate groups
    pub hud: Vec<String>,
    pub show_start_prompt: bool,
    /// empty unless the log panel is shown
    pub log_lines: Vec<String>,
}

/// Owned state of one measuring session, driven by the input bridge and the frame tick
#[derive(Debug, Clone)]
pub struct Session {
    config: EngineConfig,
    recorder: TapRecorder,
    background_level: u8,
    log: EventLog,
    log_visible: bool,
    viewport: Viewport,
}

impl Session {
    pub fn new(config: EngineConfig) -> Self {
        let config = config.sanitized();
        Self {
            recorder: TapRecorder::new(&config),
            config,
            background_level: 0,
            log: EventLog::new(),
            log_visible: false,
            viewport: Viewport::default(),
        }
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    pub fn resize(&mut self, width: u16, height: u16) {
        self.viewport = Viewport { width, height };
    }

    pub fn viewport(&self) -> Viewport {
        self.viewport
    }

    /// Row where the control strip begins; presses at or below it are ignored
    pub fn control_strip_top(&self) -> u16 {
        let reserved_rows = (self.viewport.height as f64
            * self.config.reserved_ui_height_fraction)
            .round() as u16;
        self.viewport.height.saturating_sub(reserved_rows)
    }

    pub fn in_reserved_area(&self, pointer_y: u16) -> bool {
        pointer_y >= self.control_strip_top()
    }

    /// `pointer_y` is `None` for presses that do not come from the pointer
    pub fn press_start(&mut self, now: u64, pointer_y: Option<u16>) -> PressOutcome {
        let reserved = pointer_y.is_some_and(|y| self.in_reserved_area(y));
        let outcome = self.recorder.on_press_start(now, reserved);
        if reserved {
            tracing::trace!(now, ?pointer_y, "press in control strip ignored");
        }
        outcome
    }

    pub fn press_end(&mut self, now: u64) -> PressOutcome {
        let outcome = self.recorder.on_press_end(now);
        match outcome {
            PressOutcome::Armed => {
                tracing::debug!(now, "session armed");
                self.log.push("session started");
            }
            PressOutcome::Recorded { tap, duration } => {
                tracing::debug!(start = tap.start, end = tap.end, duration, "tap recorded");
                self.log.push_tap(&tap, duration);
            }
            PressOutcome::Discarded {
                duration,
                reason: DiscardReason::TooShort,
            } => {
                tracing::debug!(duration, "press below minimum duration discarded");
            }
            PressOutcome::Discarded {
                reason: DiscardReason::ClockSkew,
                ..
            } => {
                tracing::warn!(now, "press with out-of-order timestamps rejected");
                self.log.push("rejected press with out-of-order timestamps");
            }
            PressOutcome::Ignored | PressOutcome::Started => {}
        }
        outcome
    }

    /// Advance the background animation by one frame
    pub fn tick(&mut self) {
        let step = self.config.background_step;
        self.background_level = if self.recorder.is_pressing() {
            self.background_level.saturating_add(step).min(BACKGROUND_MAX)
        } else {
            self.background_level.saturating_sub(step)
        };
    }

    pub fn background_level(&self) -> u8 {
        self.background_level
    }

    pub fn history(&self) -> &[TapInterval] {
        self.recorder.history()
    }

    pub fn extrema(&self) -> Option<Extrema> {
        self.recorder.extrema()
    }

    pub fn has_started(&self) -> bool {
        self.recorder.has_started()
    }

    pub fn is_pressing(&self) -> bool {
        self.recorder.is_pressing()
    }

    /// Returns whether the panel is now visible. No-op when the panel is disabled.
    pub fn toggle_log(&mut self) -> bool {
        if self.config.log_panel {
            self.log_visible = !self.log_visible;
        }
        self.log_visible
    }

    pub fn note(&mut self, message: impl Into<String>) {
        self.log.push(message);
    }

    pub fn canvas(&self) -> PlotCanvas {
        let floor_y = self.control_strip_top() as f64;
        PlotCanvas {
            width: self.viewport.width as f64,
            floor_y,
            rise: floor_y * PLOT_RISE_SHARE,
        }
    }

    pub fn frame(&self) -> FrameView {
        let canvas = self.canvas();
        let history = self.history();

        let polyline = self
            .has_started()
            .then(|| plot_polyline(history, self.config.window_size, &canvas));

        let hud = match compute_stats(history) {
            Some(stats) if stats.count >= 2 => hud_lines(&stats, self.extrema()),
            _ => Vec::new(),
        };

        let log_lines = if self.log_visible {
            self.log.tail(VISIBLE_LOG_LINES).map(|e| e.line()).collect()
        } else {
            Vec::new()
        };

        FrameView {
            background_level: self.background_level,
            is_pressing: self.is_pressing(),
            canvas,
            polyline,
            hud,
            show_start_prompt: !self.has_started() && !self.is_pressing(),
            log_lines,
        }
    }
}

/// HUD text, grouped as averages, maxima (when tracked) and totals
pub fn hud_lines(stats: &TapStats, extrema: Option<Extrema>) -> Vec<String> {
    let mut lines = vec![
        format!("Taps: {}", stats.count),
        format!(
            "Average on time: {}s",
            format_secs_f64(stats.average_on_time)
        ),
    ];
    if let Some(gaps) = &stats.gaps {
        lines.push(format!(
            "Average between time: {}s",
            format_secs_f64(gaps.average_gap)
        ));
    }

    if let Some(extrema) = extrema {
        lines.push(String::new());
        lines.push(format!("Max tap time: {}s", format_secs(extrema.max_duration)));
        lines.push(format!("Max between time: {}s", format_secs(extrema.max_gap)));
    }

    let total_gap_time = stats.gaps.as_ref().map_or(0, |g| g.total_gap_time);
    lines.push(String::new());
    lines.push(format!("Total on time: {}s", format_secs(stats.total_on_time)));
    lines.push(format!("Total between time: {}s", format_secs(total_gap_time)));
    lines.push(format!("Total time: {}s", format_secs(stats.total_time())));
    lines
}
