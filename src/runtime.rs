use std::cell::Cell;
use std::sync::mpsc::{self, Receiver, RecvTimeoutError};
use std::time::{Duration, Instant};

use crossterm::event::{self, Event as CtEvent, KeyEvent, KeyEventKind};
use log::warn;

pub const DEFAULT_TICK_RATE_MS: u64 = 100;

/// Unified event type consumed by the app runner
#[derive(Clone, Debug, PartialEq)]
pub enum AppEvent {
    Key(KeyEvent),
    Resize,
    Tick,
}

/// Source of terminal events (keyboard, resize, etc.)
pub trait AppEventSource: Send + 'static {
    /// Block until an event arrives. Errors once the source is gone.
    fn recv(&self) -> Result<AppEvent, mpsc::RecvError>;

    /// Block for up to `timeout` waiting for an event.
    /// Returns Ok(event) if an event arrives before the timeout, or Err(Timeout) if it expires.
    fn recv_timeout(&self, timeout: Duration) -> Result<AppEvent, RecvTimeoutError>;
}

/// Production event source using crossterm
pub struct CrosstermEventSource {
    rx: Receiver<AppEvent>,
}

impl CrosstermEventSource {
    pub fn new() -> Self {
        let (tx, rx) = mpsc::channel();

        std::thread::spawn(move || loop {
            let evt = match event::read() {
                // windows reports both press and release
                Ok(CtEvent::Key(key)) if key.kind != KeyEventKind::Release => AppEvent::Key(key),
                Ok(CtEvent::Resize(_, _)) => AppEvent::Resize,
                Ok(_) => continue,
                Err(e) => {
                    warn!("terminal event stream closed: {e}");
                    break;
                }
            };

            if tx.send(evt).is_err() {
                break;
            }
        });

        Self { rx }
    }
}

impl Default for CrosstermEventSource {
    fn default() -> Self {
        Self::new()
    }
}

impl AppEventSource for CrosstermEventSource {
    fn recv(&self) -> Result<AppEvent, mpsc::RecvError> {
        self.rx.recv()
    }

    fn recv_timeout(&self, timeout: Duration) -> Result<AppEvent, RecvTimeoutError> {
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

impl Default for FixedTicker {
    fn default() -> Self {
        Self::new(Duration::from_millis(DEFAULT_TICK_RATE_MS))
    }
}

impl Ticker for FixedTicker {
    fn interval(&self) -> Duration {
        self.interval
    }
}

/// Test event source for unit tests
pub struct TestEventSource {
    rx: Receiver<AppEvent>,
}

impl TestEventSource {
    pub fn new(rx: Receiver<AppEvent>) -> Self {
        Self { rx }
    }
}

impl AppEventSource for TestEventSource {
    fn recv(&self) -> Result<AppEvent, mpsc::RecvError> {
        self.rx.recv()
    }

    fn recv_timeout(&self, timeout: Duration) -> Result<AppEvent, RecvTimeoutError> {
        self.rx.recv_timeout(timeout)
    }
}

/// Runner that advances the application one event/tick at a time
pub struct Runner<E: AppEventSource, T: Ticker> {
    event_source: E,
    ticker: T,
    next_tick: Cell<Option<Instant>>,
}

impl<E: AppEventSource, T: Ticker> Runner<E, T> {
    pub fn new(event_source: E, ticker: T) -> Self {
        Self {
            event_source,
            ticker,
            next_tick: Cell::new(None),
        }
    }

    /// Returns the next event.
    ///
    /// While `ticking`, yields `Tick` once per interval even when events keep
    /// arriving in between, and passes events through otherwise. When not
    /// ticking, blocks until a real event arrives, so no ticks are produced.
    /// `None` means the event source has gone away.
    pub fn step(&self, ticking: bool) -> Option<AppEvent> {
        if !ticking {
            self.next_tick.set(None);
            return self.event_source.recv().ok();
        }

        let now = Instant::now();
        let deadline = match self.next_tick.get() {
            Some(deadline) => deadline,
            None => {
                let deadline = now + self.ticker.interval();
                self.next_tick.set(Some(deadline));
                deadline
            }
        };

        if now >= deadline {
            self.schedule_next_tick();
            return Some(AppEvent::Tick);
        }

        match self.event_source.recv_timeout(deadline - now) {
            Ok(ev) => Some(ev),
            Err(RecvTimeoutError::Timeout) => {
                self.schedule_next_tick();
                Some(AppEvent::Tick)
            }
            Err(RecvTimeoutError::Disconnected) => None,
        }
    }

    // measured from now, so a slow frame never causes a burst of catch-up ticks
    fn schedule_next_tick(&self) {
        self.next_tick
            .set(Some(Instant::now() + self.ticker.interval()));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_matches::assert_matches;
    use std::sync::mpsc;

    #[test]
    fn step_returns_tick_on_timeout() {
        let (_tx, rx) = mpsc::channel();
        let es = TestEventSource::new(rx);
        let ticker = FixedTicker::new(Duration::from_millis(1));
        let runner = Runner::new(es, ticker);

        // With no events available, step should yield Tick
        assert_matches!(runner.step(true), Some(AppEvent::Tick));
    }

    #[test]
    fn step_passes_through_events() {
        let (tx, rx) = mpsc::channel();
        tx.send(AppEvent::Resize).unwrap();
        let es = TestEventSource::new(rx);
        let ticker = FixedTicker::new(Duration::from_millis(10));
        let runner = Runner::new(es, ticker);

        assert_matches!(runner.step(true), Some(AppEvent::Resize));
    }

    #[test]
    fn ticks_keep_coming_while_events_stream_in() {
        let (tx, rx) = mpsc::channel();
        let es = TestEventSource::new(rx);
        let runner = Runner::new(es, FixedTicker::new(Duration::from_millis(30)));

        // an event every 5ms is far faster than the tick interval
        std::thread::spawn(move || {
            for _ in 0..60 {
                if tx.send(AppEvent::Resize).is_err() {
                    break;
                }
                std::thread::sleep(Duration::from_millis(5));
            }
        });

        let mut ticks = 0;
        let mut resizes = 0;
        while let Some(ev) = runner.step(true) {
            match ev {
                AppEvent::Tick => ticks += 1,
                AppEvent::Resize => resizes += 1,
                AppEvent::Key(_) => {}
            }
        }

        assert_eq!(resizes, 60);
        assert!(ticks >= 3, "only {ticks} ticks while events were streaming");
    }

    #[test]
    fn overdue_tick_wins_over_queued_event() {
        let (tx, rx) = mpsc::channel();
        let es = TestEventSource::new(rx);
        let runner = Runner::new(es, FixedTicker::new(Duration::from_millis(10)));

        assert_matches!(runner.step(true), Some(AppEvent::Tick));

        std::thread::sleep(Duration::from_millis(20));
        tx.send(AppEvent::Resize).unwrap();

        assert_matches!(runner.step(true), Some(AppEvent::Tick));
        assert_matches!(runner.step(true), Some(AppEvent::Resize));
    }

    #[test]
    fn step_without_ticking_waits_for_event() {
        let (tx, rx) = mpsc::channel();
        let es = TestEventSource::new(rx);
        let runner = Runner::new(es, FixedTicker::new(Duration::from_millis(1)));

        std::thread::spawn(move || {
            std::thread::sleep(Duration::from_millis(20));
            tx.send(AppEvent::Resize).unwrap();
        });

        // no Tick even though several intervals pass
        assert_matches!(runner.step(false), Some(AppEvent::Resize));
    }

    #[test]
    fn step_returns_none_when_disconnected() {
        let (tx, rx) = mpsc::channel::<AppEvent>();
        drop(tx);
        let es = TestEventSource::new(rx);
        let runner = Runner::new(es, FixedTicker::new(Duration::from_millis(1)));

        assert_eq!(runner.step(true), None);
        assert_eq!(runner.step(false), None);
    }

    #[test]
    fn default_ticker_interval() {
        assert_eq!(
            FixedTicker::default().interval(),
            Duration::from_millis(DEFAULT_TICK_RATE_MS)
        );
    }
}
