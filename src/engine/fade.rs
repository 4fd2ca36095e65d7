//! Per-floor cross-fading.
//!
//! Every floor owns a [`Timer`]. A floor's fade level is how far its timer
//! has run through the fade duration; floors above the first visible floor
//! read the level inverted, so they fade *out* while the others fade *in*.

use std::ops::{Range, RangeInclusive};
use std::time::Duration;

use crate::defs::FLOOR_COUNT;
use crate::engine::timer::Timer;
use crate::world::Position;

/// Default floor fade duration.
pub const DEFAULT_FLOOR_FADING: Duration = Duration::from_millis(500);

/// Camera moves at least this far (tiles) snap every floor in place.
const JUMP_DISTANCE: f32 = 3.0;

#[derive(Clone, Debug)]
pub struct FloorFader {
    timers: [Timer; FLOOR_COUNT],
    duration: Duration,
    last_level: f32,
}

impl Default for FloorFader {
    fn default() -> Self {
        Self::new(DEFAULT_FLOOR_FADING)
    }
}

impl FloorFader {
    pub fn new(duration: Duration) -> Self {
        Self {
            timers: [Timer::default(); FLOOR_COUNT],
            duration,
            last_level: 0.0,
        }
    }

    #[inline]
    pub fn duration(&self) -> Duration {
        self.duration
    }

    pub fn set_duration(&mut self, duration: Duration) {
        self.duration = duration;
    }

    /// Did the camera move far enough that fading would look wrong?
    pub fn is_jump(last: Option<Position>, now: Position) -> bool {
        match last {
            None => true,
            Some(last) => last.z != now.z || last.distance(&now) >= JUMP_DISTANCE,
        }
    }

    /// Fade level of floor `z` in `0.0 ..= 1.0`.
    pub fn level(&self, z: u8, first_visible: u8, now: Duration) -> f32 {
        let Some(timer) = self.timers.get(z as usize) else {
            return 1.0;
        };
        let level = if self.duration.is_zero() {
            1.0
        } else {
            (timer.elapsed_secs(now) / self.duration.as_secs_f32()).clamp(0.0, 1.0)
        };
        if z < first_visible { 1.0 - level } else { level }
    }

    /// Restart timers after the visible floor range was recomputed.
    ///
    /// * `jumped` – every floor of `floors` is shown at once.
    /// * first floor went deeper – the newly hidden floors fade out.
    /// * first floor went shallower – the newly revealed floors fade in.
    pub fn on_range_change(
        &mut self,
        jumped: bool,
        prev_first: u8,
        first: u8,
        floors: RangeInclusive<u8>,
        now: Duration,
    ) {
        if jumped {
            for z in floors {
                self.restart(z, now, self.duration);
            }
        } else if prev_first < first {
            self.resume(prev_first..first, now);
        } else if prev_first > first {
            self.last_level = 0.0;
            self.resume(first..prev_first, now);
        }
    }

    /// Restart `floors` mirrored, so a half-done fade turns around where
    /// it stands instead of jumping.
    fn resume(&mut self, floors: Range<u8>, now: Duration) {
        for z in floors {
            let Some(timer) = self.timers.get(z as usize) else {
                continue;
            };
            let shift = self.duration.saturating_sub(timer.elapsed(now));
            self.restart(z, now, shift);
        }
    }

    fn restart(&mut self, z: u8, now: Duration, shift: Duration) {
        if let Some(timer) = self.timers.get_mut(z as usize) {
            timer.restart(now, shift);
        }
    }

    /// `true` exactly once each time `level` reaches 1.0 after a reveal.
    pub fn take_fade_in_finished(&mut self, level: f32) -> bool {
        if self.last_level != level && level == 1.0 {
            self.last_level = level;
            true
        } else {
            false
        }
    }
}

/*====================================================================*/
/*                                Tests                                */
/*====================================================================*/
