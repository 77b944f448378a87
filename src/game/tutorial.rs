//! Tutorial Pause Trigger
//!
//! Watches the gap between the player and the designated tutorial enemy
//! and pauses the session exactly once, so the player learns the jump
//! before the first hazard can connect.

use tracing::debug;

use crate::game::entity::{Entity, EntityRegistry};
use crate::game::player::Player;
use crate::game::session::{GameSession, SessionConfig, SessionState};

/// Check the tutorial proximity trigger for this frame.
///
/// Fires when the tutorial enemy is ahead of the player and closer than
/// the pause distance: the session transitions `Running → Paused`, the
/// enemy is halted in place, and `tutorial_triggered` latches so the
/// trigger can never fire again. Returns whether it fired.
pub fn check_tutorial_pause(
    game: &mut GameSession,
    player: &Player,
    registry: &mut EntityRegistry,
    config: &SessionConfig,
) -> bool {
    if game.tutorial_triggered {
        return false;
    }

    let Some(enemy_id) = registry
        .enemies()
        .find(|(_, enemy)| enemy.tutorial)
        .map(|(id, _)| id)
    else {
        return false;
    };

    let distance = match registry.get(enemy_id) {
        Some(Entity::Enemy(enemy)) => enemy.x - player.x,
        _ => return false,
    };

    if distance <= 0.0 || distance >= config.tutorial_pause_distance {
        return false;
    }

    if let Some(Entity::Enemy(enemy)) = registry.get_mut(enemy_id) {
        enemy.stopped = true;
    }
    game.tutorial_triggered = true;
    game.set_state(SessionState::Paused);
    debug!(distance, "tutorial pause triggered");
    true
}

/// Release the tutorial enemy when the pause is dismissed.
pub fn release_tutorial_enemy(registry: &mut EntityRegistry) {
    let id = registry
        .enemies()
        .find(|(_, enemy)| enemy.tutorial)
        .map(|(id, _)| id);
    if let Some(id) = id {
        if let Some(Entity::Enemy(enemy)) = registry.get_mut(id) {
            enemy.stopped = false;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::game::entity::Enemy;
    use crate::game::external::VisualHandle;

    fn setup(enemy_offset: f32) -> (GameSession, Player, EntityRegistry, SessionConfig) {
        let config = SessionConfig::default();
        let mut game = GameSession::new(&config);
        game.state = SessionState::Running;
        let player = Player::new(&config);

        let mut registry = EntityRegistry::new();
        registry.insert(Entity::Enemy(Enemy {
            x: player.x + enemy_offset,
            y: player.y,
            width: config.enemy_width,
            height: config.enemy_height,
            stopped: false,
            tutorial: true,
            visual: VisualHandle::PLACEHOLDER,
        }));

        (game, player, registry, config)
    }

    #[test]
    fn test_fires_inside_pause_distance() {
        let (mut game, player, mut registry, config) = setup(100.0);

        assert!(check_tutorial_pause(&mut game, &player, &mut registry, &config));
        assert!(game.tutorial_triggered);
        assert_eq!(game.state, SessionState::Paused);

        let (_, enemy) = registry.enemies().next().expect("enemy missing");
        assert!(enemy.stopped);
    }

    #[test]
    fn test_does_not_fire_when_too_far() {
        let (mut game, player, mut registry, config) = setup(config_distance() + 50.0);

        assert!(!check_tutorial_pause(&mut game, &player, &mut registry, &config));
        assert!(!game.tutorial_triggered);
        assert_eq!(game.state, SessionState::Running);
    }

    #[test]
    fn test_does_not_fire_once_enemy_is_behind() {
        let (mut game, player, mut registry, config) = setup(-10.0);

        assert!(!check_tutorial_pause(&mut game, &player, &mut registry, &config));
        assert!(!game.tutorial_triggered);
    }

    #[test]
    fn test_fires_at_most_once() {
        let (mut game, player, mut registry, config) = setup(100.0);

        assert!(check_tutorial_pause(&mut game, &player, &mut registry, &config));
        game.state = SessionState::Running;
        release_tutorial_enemy(&mut registry);

        // Enemy crosses the threshold a second time; latch holds
        assert!(!check_tutorial_pause(&mut game, &player, &mut registry, &config));
        assert_eq!(game.state, SessionState::Running);
    }

    #[test]
    fn test_non_tutorial_enemies_are_ignored() {
        let config = SessionConfig::default();
        let mut game = GameSession::new(&config);
        game.state = SessionState::Running;
        let player = Player::new(&config);

        let mut registry = EntityRegistry::new();
        registry.insert(Entity::Enemy(Enemy {
            x: player.x + 50.0,
            y: player.y,
            width: config.enemy_width,
            height: config.enemy_height,
            stopped: false,
            tutorial: false,
            visual: VisualHandle::PLACEHOLDER,
        }));

        assert!(!check_tutorial_pause(&mut game, &player, &mut registry, &config));
    }

    fn config_distance() -> f32 {
        SessionConfig::default().tutorial_pause_distance
    }
}
