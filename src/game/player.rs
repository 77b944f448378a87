//! Runner State
//!
//! The player stands at a fixed x-position while the world scrolls past.
//! The only vertical motion is a fixed sine-trajectory jump; the only
//! timed state is the post-hit invincibility window.

use std::f32::consts::PI;

use serde::{Deserialize, Serialize};

use crate::core::rect::Rect;
use crate::game::collision::PLAYER_HITBOX;
use crate::game::session::SessionConfig;

/// Animation the rendering layer should be sampling.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum Animation {
    /// Standing on the intro screen
    #[default]
    Idle,
    /// Running loop
    Run,
    /// One-shot jump cycle
    Jump,
}

/// The runner.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Player {
    /// Fixed horizontal position (the world scrolls, the player does not)
    pub x: f32,
    /// Current feet position; equals `ground_y` except mid-jump
    pub y: f32,
    /// Ground line the jump returns to
    pub ground_y: f32,
    /// Visual width
    pub width: f32,
    /// Visual height
    pub height: f32,
    /// Standing on the ground (jump allowed)
    pub on_ground: bool,
    /// Mid-jump flag
    pub jumping: bool,
    /// Jump progress, 0.0 at takeoff to 1.0 at landing
    pub jump_progress: f32,
    /// Remaining invincibility window in ms; 0 means vulnerable
    pub invincible_ms: f32,
    /// Current animation
    pub animation: Animation,
    /// Cosmetic clock the renderer samples for frame selection and the
    /// invincibility blink; advances every frame regardless of state
    pub animation_time_ms: f32,
}

impl Player {
    /// Create a player standing on the ground at the configured x-fraction.
    pub fn new(config: &SessionConfig) -> Self {
        Self {
            x: config.unit_width * config.player_x_fraction,
            y: config.ground_y,
            ground_y: config.ground_y,
            width: config.player_width,
            height: config.player_height,
            on_ground: true,
            jumping: false,
            jump_progress: 0.0,
            invincible_ms: 0.0,
            animation: Animation::Idle,
            animation_time_ms: 0.0,
        }
    }

    /// Is the invincibility window open?
    #[inline]
    pub fn is_invincible(&self) -> bool {
        self.invincible_ms > 0.0
    }

    /// Switch from the intro idle to the running loop.
    pub fn start_running(&mut self) {
        if self.animation == Animation::Idle {
            self.animation = Animation::Run;
        }
    }

    /// Begin a jump if one is not already in progress.
    ///
    /// Returns true if the jump started. A tap mid-air is a no-op.
    pub fn try_jump(&mut self) -> bool {
        if !self.on_ground || self.jumping {
            return false;
        }
        self.jumping = true;
        self.on_ground = false;
        self.jump_progress = 0.0;
        self.animation = Animation::Jump;
        true
    }

    /// Open the invincibility window after a hazard contact.
    pub fn take_hit(&mut self, invincibility_ms: f32) {
        self.invincible_ms = invincibility_ms;
    }

    /// Advance the cosmetic animation clock. Runs every frame, in every
    /// session state, so idle/paused frames still animate.
    pub fn advance_animation(&mut self, delta_ms: f32) {
        self.animation_time_ms += delta_ms;
    }

    /// Advance gameplay timers: jump trajectory and invincibility.
    ///
    /// Only called while the session is running; withholding the delta is
    /// what freezes these timers during the tutorial pause.
    pub fn advance(&mut self, delta_ms: f32, config: &SessionConfig) {
        if self.invincible_ms > 0.0 {
            self.invincible_ms = (self.invincible_ms - delta_ms).max(0.0);
        }

        if self.jumping {
            self.jump_progress += delta_ms / config.jump_duration_ms;
            if self.jump_progress >= 1.0 {
                self.jumping = false;
                self.on_ground = true;
                self.jump_progress = 0.0;
                self.y = self.ground_y;
                if self.animation == Animation::Jump {
                    self.animation = Animation::Run;
                }
            } else {
                // y = ground - sin(progress * PI) * height
                let offset = (self.jump_progress * PI).sin() * config.jump_height;
                self.y = self.ground_y - offset;
            }
        }
    }

    /// Full visual bounds, anchored bottom-center.
    pub fn bounds(&self) -> Rect {
        Rect::from_anchor_bottom(self.x, self.y, self.width, self.height)
    }

    /// Reduced hit-rectangle used by the collision resolver.
    pub fn hitbox(&self) -> Rect {
        PLAYER_HITBOX.shrink(self.bounds())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config() -> SessionConfig {
        SessionConfig::default()
    }

    fn player() -> Player {
        Player::new(&config())
    }

    #[test]
    fn test_spawn_position() {
        let cfg = config();
        let p = player();
        assert_eq!(p.x, cfg.unit_width * cfg.player_x_fraction);
        assert_eq!(p.y, cfg.ground_y);
        assert!(p.on_ground);
    }

    #[test]
    fn test_jump_peaks_at_midpoint() {
        let cfg = config();
        let mut p = player();
        assert!(p.try_jump());

        // Advance to the midpoint of the jump
        p.advance(cfg.jump_duration_ms / 2.0, &cfg);
        let peak_offset = cfg.ground_y - p.y;
        assert!(
            (peak_offset - cfg.jump_height).abs() < 1.0,
            "expected apex near jump_height, got {peak_offset}"
        );

        // Land
        p.advance(cfg.jump_duration_ms, &cfg);
        assert!(p.on_ground);
        assert!(!p.jumping);
        assert_eq!(p.y, cfg.ground_y);
        assert_eq!(p.animation, Animation::Run);
    }

    #[test]
    fn test_midair_tap_is_noop() {
        let cfg = config();
        let mut p = player();
        assert!(p.try_jump());
        p.advance(100.0, &cfg);
        assert!(!p.try_jump(), "second jump mid-air must be rejected");
    }

    #[test]
    fn test_invincibility_counts_down_and_expires() {
        let cfg = config();
        let mut p = player();
        p.take_hit(cfg.invincibility_ms);
        assert!(p.is_invincible());

        p.advance(cfg.invincibility_ms / 2.0, &cfg);
        assert!(p.is_invincible());

        p.advance(cfg.invincibility_ms, &cfg);
        assert!(!p.is_invincible());
        assert_eq!(p.invincible_ms, 0.0);
    }

    #[test]
    fn test_animation_clock_is_independent_of_gameplay() {
        let mut p = player();
        p.advance_animation(16.0);
        p.advance_animation(16.0);
        assert_eq!(p.animation_time_ms, 32.0);
        // Gameplay timers untouched
        assert!(p.on_ground);
        assert!(!p.is_invincible());
    }

    #[test]
    fn test_hitbox_smaller_than_bounds() {
        let p = player();
        let bounds = p.bounds();
        let hitbox = p.hitbox();
        assert!(hitbox.width < bounds.width);
        assert!(hitbox.height < bounds.height);
        // Hitbox stays horizontally centered on the sprite
        let bounds_cx = bounds.x + bounds.width / 2.0;
        let hitbox_cx = hitbox.x + hitbox.width / 2.0;
        assert!((bounds_cx - hitbox_cx).abs() < 0.001);
    }
}
