use std::cell::Cell;
use std::rc::Rc;
use std::time::{Duration, Instant};

/// Monotonic time source, injected so fades can be driven by tests.
pub trait Clock {
    /// Time elapsed since an arbitrary, fixed origin.
    fn now(&self) -> Duration;
}

/// Wall-clock [`Clock`] backed by [`Instant`].
pub struct SystemClock {
    origin: Instant,
}

impl Default for SystemClock {
    fn default() -> Self {
        Self::new()
    }
}

impl SystemClock {
    pub fn new() -> Self {
        Self {
            origin: Instant::now(),
        }
    }
}

impl Clock for SystemClock {
    #[inline]
    fn now(&self) -> Duration {
        self.origin.elapsed()
    }
}

/// Hand-driven [`Clock`]. Clones share the same time.
#[derive(Clone, Default)]
pub struct ManualClock {
    now: Rc<Cell<Duration>>,
}

impl ManualClock {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn advance(&self, by: Duration) {
        self.now.set(self.now.get() + by);
    }

    pub fn advance_ms(&self, ms: u64) {
        self.advance(Duration::from_millis(ms));
    }
}

impl Clock for ManualClock {
    #[inline]
    fn now(&self) -> Duration {
        self.now.get()
    }
}

/// Stopwatch over a [`Clock`] that can be restarted with a head start.
#[derive(Clone, Copy, Debug, Default)]
pub struct Timer {
    started: Duration,
    shift: Duration,
}

impl Timer {
    pub fn started_at(now: Duration) -> Self {
        Self {
            started: now,
            shift: Duration::ZERO,
        }
    }

    /// Restart so that [`Timer::elapsed`] immediately reports `shift`.
    pub fn restart(&mut self, now: Duration, shift: Duration) {
        self.started = now;
        self.shift = shift;
    }

    pub fn elapsed(&self, now: Duration) -> Duration {
        now.saturating_sub(self.started) + self.shift
    }

    pub fn elapsed_secs(&self, now: Duration) -> f32 {
        self.elapsed(now).as_secs_f32()
    }
}

/*====================================================================*/
/*                                Tests                                */
/*====================================================================*/
