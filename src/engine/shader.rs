//! Map shader switching with a fade-out / fade-in cross-over.
//!
//! ```text
//! NoShader ⇄ Active ──set(fade_out > 0)──▶ FadingOut ──▶ FadingIn ──▶ Active
//! ```

use std::time::Duration;

use tracing::debug;

use crate::engine::timer::Timer;
use crate::renderer::ShaderId;
use crate::world::Position;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ShaderPhase {
    NoShader,
    Active,
    /// Old shader still bound, map opacity going down.
    FadingOut,
    /// New shader bound, map opacity going up.
    FadingIn,
}

#[derive(Clone, Debug, Default)]
pub struct ShaderFader {
    current: Option<ShaderId>,
    next: Option<ShaderId>,
    switch_done: bool,
    timer: Timer,
    fade_in: Duration,
    fade_out: Duration,
    /// Camera position when the shader was set; drives the walk uniform.
    origin: Option<Position>,
}

impl ShaderFader {
    pub fn new(initial: Option<ShaderId>) -> Self {
        Self {
            current: initial,
            switch_done: true,
            ..Self::default()
        }
    }

    #[inline]
    pub fn current(&self) -> Option<ShaderId> {
        self.current
    }

    #[inline]
    pub fn pending(&self) -> Option<ShaderId> {
        self.next
    }

    #[inline]
    pub fn origin(&self) -> Option<Position> {
        self.origin
    }

    /// Queue or apply `shader`. Returns `false` if it is already current.
    ///
    /// With a shader bound and a non-zero `fade_out`, the old one fades
    /// out first; otherwise the swap is immediate.
    pub fn set(
        &mut self,
        shader: Option<ShaderId>,
        fade_in: Duration,
        fade_out: Duration,
        camera: Option<Position>,
        now: Duration,
    ) -> bool {
        if shader == self.current {
            return false;
        }

        if !fade_out.is_zero() && self.current.is_some() {
            self.next = shader;
            self.switch_done = false;
        } else {
            self.current = shader;
            self.next = None;
            self.switch_done = true;
        }
        self.timer.restart(now, Duration::ZERO);
        self.fade_in = fade_in;
        self.fade_out = fade_out;
        if shader.is_some() {
            self.origin = camera;
        }
        debug!(?shader, ?fade_in, ?fade_out, "map shader set");
        true
    }

    /// Advance the cross-over and return the map opacity for this frame.
    pub fn update(&mut self, now: Duration) -> f32 {
        let mut opacity = 1.0;

        if !self.switch_done && !self.fade_out.is_zero() {
            opacity = 1.0 - self.timer.elapsed_secs(now) / self.fade_out.as_secs_f32();
            if opacity < 0.0 {
                self.current = self.next.take();
                self.switch_done = true;
                self.timer.restart(now, Duration::ZERO);
                debug!(shader = ?self.current, "map shader swapped");
            }
        }

        if self.switch_done && self.current.is_some() && !self.fade_in.is_zero() {
            opacity = (self.timer.elapsed_secs(now) / self.fade_in.as_secs_f32()).min(1.0);
        }

        opacity.clamp(0.0, 1.0)
    }

    pub fn phase(&self, now: Duration) -> ShaderPhase {
        if !self.switch_done {
            ShaderPhase::FadingOut
        } else if self.current.is_none() {
            ShaderPhase::NoShader
        } else if self.timer.elapsed(now) < self.fade_in {
            ShaderPhase::FadingIn
        } else {
            ShaderPhase::Active
        }
    }
}

/*====================================================================*/
/*                                Tests                                */
/*====================================================================*/
#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::timer::{Clock, ManualClock};

    const WATER: ShaderId = 1;
    const NIGHT: ShaderId = 2;

    fn ms(v: u64) -> Duration {
        Duration::from_millis(v)
    }

    #[test]
    fn same_shader_is_ignored() {
        let mut s = ShaderFader::new(Some(WATER));
        assert!(!s.set(Some(WATER), ms(100), ms(100), None, ms(0)));
        assert_eq!(s.phase(ms(0)), ShaderPhase::Active);
    }

    #[test]
    fn fade_out_then_fade_in() {
        let clock = ManualClock::new();
        let mut s = ShaderFader::new(Some(WATER));
        assert!(s.set(Some(NIGHT), ms(200), ms(200), None, clock.now()));
        assert_eq!(s.phase(clock.now()), ShaderPhase::FadingOut);
        assert_eq!(s.current(), Some(WATER));

        clock.advance_ms(100);
        assert!((s.update(clock.now()) - 0.5).abs() < 1e-3);

        clock.advance_ms(150);
        // crossed zero: swap, restart for fade-in
        assert_eq!(s.update(clock.now()), 0.0);
        assert_eq!(s.current(), Some(NIGHT));
        assert_eq!(s.pending(), None);
        assert_eq!(s.phase(clock.now()), ShaderPhase::FadingIn);

        clock.advance_ms(100);
        assert!((s.update(clock.now()) - 0.5).abs() < 1e-3);
        clock.advance_ms(500);
        assert_eq!(s.update(clock.now()), 1.0);
        assert_eq!(s.phase(clock.now()), ShaderPhase::Active);
    }

    #[test]
    fn no_fade_out_swaps_immediately() {
        let clock = ManualClock::new();
        let mut s = ShaderFader::new(Some(WATER));
        s.set(Some(NIGHT), ms(0), ms(0), None, clock.now());
        assert_eq!(s.current(), Some(NIGHT));
        assert_eq!(s.update(clock.now()), 1.0);
    }

    #[test]
    fn clearing_the_shader() {
        let clock = ManualClock::new();
        let mut s = ShaderFader::new(None);
        assert_eq!(s.phase(clock.now()), ShaderPhase::NoShader);
        let cam = Position::new(100, 100, 7);
        s.set(Some(WATER), ms(0), ms(0), Some(cam), clock.now());
        assert_eq!(s.origin(), Some(cam));
        assert_eq!(s.phase(clock.now()), ShaderPhase::Active);

        s.set(None, ms(0), ms(0), None, clock.now());
        assert_eq!(s.phase(clock.now()), ShaderPhase::NoShader);
        assert_eq!(s.update(clock.now()), 1.0);
    }
}
