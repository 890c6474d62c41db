use std::cell::Cell;
use std::sync::mpsc::{self, Receiver, RecvTimeoutError};
use std::time::{Duration, Instant};

use crossterm::event::{
    self, Event as CtEvent, KeyCode, KeyEvent, KeyEventKind, MouseButton, MouseEvent,
    MouseEventKind,
};

use crate::clock::Clock;

/// Unified event type consumed by the app runner
#[derive(Clone, Debug, PartialEq)]
pub enum TapEvent {
    /// press began; `row` is the pointer row, `None` for keyboard presses
    PressStart { at_ms: u64, row: Option<u16> },
    PressEnd { at_ms: u64 },
    Key(KeyEvent),
    Resize(u16, u16),
    Tick,
    /// the event source is gone; no further input can arrive
    Closed,
}

/// Translate a terminal event into a tap event stamped with `now`.
///
/// Left mouse button down/up are presses. With `keyboard_presses` (terminal reports
/// key releases) the space bar is a press as well. Key repeats are dropped.
pub fn translate(event: CtEvent, now: u64, keyboard_presses: bool) -> Option<TapEvent> {
    match event {
        CtEvent::Mouse(MouseEvent { kind, row, .. }) => match kind {
            MouseEventKind::Down(MouseButton::Left) => Some(TapEvent::PressStart {
                at_ms: now,
                row: Some(row),
            }),
            MouseEventKind::Up(MouseButton::Left) => Some(TapEvent::PressEnd { at_ms: now }),
            _ => None,
        },
        CtEvent::Key(key) if keyboard_presses && key.code == KeyCode::Char(' ') => {
            match key.kind {
                KeyEventKind::Press => Some(TapEvent::PressStart {
                    at_ms: now,
                    row: None,
                }),
                KeyEventKind::Release => Some(TapEvent::PressEnd { at_ms: now }),
                KeyEventKind::Repeat => None,
            }
        }
        CtEvent::Key(key) if key.kind == KeyEventKind::Press => Some(TapEvent::Key(key)),
        CtEvent::Resize(w, h) => Some(TapEvent::Resize(w, h)),
        _ => None,
    }
}

/// Source of terminal events (presses, keys, resize)
pub trait TapEventSource: Send + 'static {
    /// Block for up to `timeout` waiting for an event.
    /// Returns Ok(event) if an event arrives before the timeout, or Err(Timeout) if it expires.
    fn recv_timeout(&self, timeout: Duration) -> Result<TapEvent, RecvTimeoutError>;
}

/// Production event source using crossterm. Events are stamped on the reader thread.
pub struct CrosstermEventSource {
    rx: Receiver<TapEvent>,
}

impl CrosstermEventSource {
    pub fn new<C: Clock + Send + 'static>(clock: C, keyboard_presses: bool) -> Self {
        let (tx, rx) = mpsc::channel();

        std::thread::spawn(move || loop {
            match event::read() {
                Ok(ev) => {
                    let Some(tap_event) = translate(ev, clock.now_ms(), keyboard_presses) else {
                        continue;
                    };
                    if tx.send(tap_event).is_err() {
                        break;
                    }
                }
                Err(e) => {
                    tracing::warn!(error = %e, "terminal event reader stopped");
                    break;
                }
            }
        });

        Self { rx }
    }
}

impl TapEventSource for CrosstermEventSource {
    fn recv_timeout(&self, timeout: Duration) -> Result<TapEvent, RecvTimeoutError> {
        self.rx.recv_timeout(timeout)
    }
}

/// Configurable ticker interface
pub trait Ticker: Send + Sync + 'static {
    fn interval(&self) -> Duration;
}

/// Fixed interval ticker
#[derive(Clone, Copy, Debug)]
pub struct FixedTicker {
    interval: Duration,
}

impl FixedTicker {
    pub fn new(interval: Duration) -> Self {
        Self { interval }
    }
}

impl Ticker for FixedTicker {
    fn interval(&self) -> Duration {
        self.interval
    }
}

/// Test event source for unit tests
pub struct TestEventSource {
    rx: Receiver<TapEvent>,
}

impl TestEventSource {
    pub fn new(rx: Receiver<TapEvent>) -> Self {
        Self { rx }
    }
}

impl TapEventSource for TestEventSource {
    fn recv_timeout(&self, timeout: Duration) -> Result<TapEvent, RecvTimeoutError> {
        self.rx.recv_timeout(timeout)
    }
}

/// Runner that advances the application one event/tick at a time
pub struct Runner<E: TapEventSource, T: Ticker> {
    event_source: E,
    ticker: T,
    next_tick: Cell<Instant>,
}

impl<E: TapEventSource, T: Ticker> Runner<E, T> {
    pub fn new(event_source: E, ticker: T) -> Self {
        let next_tick = Cell::new(Instant::now() + ticker.interval());
        Self {
            event_source,
            ticker,
            next_tick,
        }
    }

    /// Returns Tick once the tick deadline has passed, even while events keep
    /// arriving; otherwise blocks until the deadline for the next event.
    /// Closed once the event source has hung up.
    pub fn step(&self) -> TapEvent {
        let now = Instant::now();
        let deadline = self.next_tick.get();
        if now >= deadline {
            return self.tick(deadline, now);
        }
        match self.event_source.recv_timeout(deadline - now) {
            Ok(ev) => ev,
            Err(RecvTimeoutError::Timeout) => self.tick(deadline, Instant::now()),
            Err(RecvTimeoutError::Disconnected) => TapEvent::Closed,
        }
    }

    fn tick(&self, deadline: Instant, now: Instant) -> TapEvent {
        let interval = self.ticker.interval();
        let next = deadline + interval;
        // after a stall, restart the cadence instead of bursting missed ticks
        self.next_tick
            .set(if next <= now { now + interval } else { next });
        TapEvent::Tick
    }
}
