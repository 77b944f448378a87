//! Finish Sequencing
//!
//! The finish line scrolls toward the stationary player; the tape breaks
//! when its break point reaches the player's x-position (a positional
//! threshold, not a rectangle overlap). Breaking starts the deceleration
//! sequence: speed decays geometrically each frame, snaps to zero at the
//! floor, and the win finalizes after a frame-counted settle delay so the
//! outcome never depends on wall-clock timers.

use tracing::debug;

use crate::game::entity::EntityRegistry;
use crate::game::events::SessionEvent;
use crate::game::player::Player;
use crate::game::session::{GameSession, SessionConfig};

/// Check whether the finish tape breaks over the player this frame.
///
/// On the break: the tape is marked broken (a visual-only signal for the
/// rendering layer), `CrossedFinish` is emitted, and the session starts
/// decelerating. Idempotent once broken.
pub fn check_tape_break(game: &mut GameSession, player: &Player, registry: &mut EntityRegistry) {
    let Some(finish) = registry.finish_mut() else {
        return;
    };
    if finish.broken {
        return;
    }
    // The break point scrolls left; crossing means it reached the player
    if finish.break_x <= player.x {
        finish.broken = true;
        game.is_decelerating = true;
        game.push_event(SessionEvent::CrossedFinish);
        debug!(break_x = finish.break_x, "finish tape broken");
    }
}

/// Advance the deceleration sequence by one frame.
///
/// While speed is above the floor it decays by the configured rate; at the
/// floor it snaps to zero and the settle countdown begins. Returns true on
/// the frame the session should finalize to a win — exactly once, because
/// the caller transitions out of `Running` immediately after.
pub fn advance_deceleration(game: &mut GameSession, config: &SessionConfig) -> bool {
    if let Some(frames) = game.win_delay_frames {
        if frames == 0 {
            return true;
        }
        game.win_delay_frames = Some(frames - 1);
        return false;
    }

    game.current_speed *= config.deceleration_rate;
    if game.current_speed < config.min_speed {
        game.current_speed = 0.0;
        game.win_delay_frames = Some(config.win_settle_frames);
        debug!(settle_frames = config.win_settle_frames, "speed floored, scheduling win");
    }
    false
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::game::entity::{Entity, FinishLine};
    use crate::game::external::VisualHandle;
    use crate::game::session::SessionState;

    fn setup_finish(break_x: f32) -> (GameSession, Player, EntityRegistry, SessionConfig) {
        let config = SessionConfig::default();
        let mut game = GameSession::new(&config);
        game.state = SessionState::Running;
        let player = Player::new(&config);

        let mut registry = EntityRegistry::new();
        registry.insert(Entity::Finish(FinishLine {
            x: break_x,
            width: config.finish_width,
            break_x,
            broken: false,
            visual: VisualHandle::PLACEHOLDER,
        }));

        (game, player, registry, config)
    }

    #[test]
    fn test_tape_breaks_when_break_point_reaches_player() {
        let (mut game, player, mut registry, _config) = setup_finish(0.0);

        check_tape_break(&mut game, &player, &mut registry);

        assert!(game.is_decelerating);
        let (_, finish) = registry.finish().expect("finish missing");
        assert!(finish.broken);
        assert!(game
            .take_events()
            .iter()
            .any(|e| matches!(e, SessionEvent::CrossedFinish)));
    }

    #[test]
    fn test_tape_does_not_break_ahead_of_player() {
        let (mut game, player, mut registry, _config) = setup_finish(2000.0);

        check_tape_break(&mut game, &player, &mut registry);

        assert!(!game.is_decelerating);
        assert!(game.take_events().is_empty());
    }

    #[test]
    fn test_break_is_idempotent() {
        let (mut game, player, mut registry, _config) = setup_finish(0.0);

        check_tape_break(&mut game, &player, &mut registry);
        game.take_events();
        check_tape_break(&mut game, &player, &mut registry);

        assert!(game.take_events().is_empty(), "second check emits nothing");
    }

    #[test]
    fn test_decay_converges_and_finalizes_once() {
        let config = SessionConfig::default();
        let mut game = GameSession::new(&config);
        game.current_speed = 252.63;
        game.is_decelerating = true;

        let mut finalized = 0;
        let mut frames = 0;
        // Generous bound: decay needs ~31 frames, settle adds the rest
        while frames < 200 {
            frames += 1;
            if advance_deceleration(&mut game, &config) {
                finalized += 1;
                break;
            }
            // Speed never increases while decelerating
            assert!(game.current_speed <= 252.63);
        }

        assert_eq!(finalized, 1, "win must fire exactly once");
        assert_eq!(game.current_speed, 0.0);
        assert!(
            frames > config.win_settle_frames as usize,
            "settle delay must elapse before the win"
        );
    }

    #[test]
    fn test_speed_snaps_to_zero_at_floor() {
        let config = SessionConfig::default();
        let mut game = GameSession::new(&config);
        game.current_speed = config.min_speed + 0.5;
        game.is_decelerating = true;

        // One decay step takes speed below the floor
        assert!(!advance_deceleration(&mut game, &config));
        assert_eq!(game.current_speed, 0.0);
        assert_eq!(game.win_delay_frames, Some(config.win_settle_frames));
    }
}
