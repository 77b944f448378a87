//! Collision Resolution
//!
//! Hitbox derivation plus the per-frame contact sweep. Tie-break rules are
//! part of the contract, not an accident of container order: hazards are
//! scanned enemies-first then obstacles, first match wins, and at most one
//! hazard and one collectible contact are reported per frame. The reward
//! sweep is independent of invincibility.

use serde::{Deserialize, Serialize};

use crate::core::rect::Rect;
use crate::game::entity::{CollectibleKind, EntityId, EntityRegistry};
use crate::game::player::Player;

/// Per-kind reduction applied to visual bounds to produce a hitbox.
///
/// Scales shrink the rectangle (kept horizontally centered, bottom
/// aligned); offsets then shift it by a fraction of the full bounds.
/// Near-misses against sprite padding must read as non-collisions.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct HitboxSpec {
    /// Width fraction kept
    pub scale_x: f32,
    /// Height fraction kept
    pub scale_y: f32,
    /// Horizontal shift as a fraction of full width
    pub offset_x: f32,
    /// Vertical shift as a fraction of full height (negative = up)
    pub offset_y: f32,
}

impl HitboxSpec {
    /// Create a spec.
    pub const fn new(scale_x: f32, scale_y: f32, offset_x: f32, offset_y: f32) -> Self {
        Self { scale_x, scale_y, offset_x, offset_y }
    }

    /// Derive the hitbox from full visual bounds.
    pub fn shrink(&self, bounds: Rect) -> Rect {
        let width = bounds.width * self.scale_x;
        let height = bounds.height * self.scale_y;
        Rect {
            x: bounds.x + (bounds.width - width) / 2.0 + bounds.width * self.offset_x,
            y: bounds.y + (bounds.height - height) + bounds.height * self.offset_y,
            width,
            height,
        }
    }
}

/// Player hitbox: 25% width, 70% height, raised 15%.
pub const PLAYER_HITBOX: HitboxSpec = HitboxSpec::new(0.25, 0.7, 0.0, -0.15);

/// Enemy hitbox: 30% width, 50% height, lowered 20%.
pub const ENEMY_HITBOX: HitboxSpec = HitboxSpec::new(0.3, 0.5, 0.0, 0.2);

/// Identity spec for entities tested on their full bounds.
pub const FULL_BOUNDS: HitboxSpec = HitboxSpec::new(1.0, 1.0, 0.0, 0.0);

/// Kind of hazard that connected.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum HazardKind {
    /// Contact with an enemy
    Enemy,
    /// Contact with an obstacle
    Obstacle,
}

/// A hazard contact found this frame.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct HazardContact {
    /// Registry id of the hazard
    pub id: EntityId,
    /// Which kind connected
    pub kind: HazardKind,
}

/// A reward contact found this frame.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct RewardContact {
    /// Registry id of the collectible
    pub id: EntityId,
    /// Kind of collectible
    pub kind: CollectibleKind,
    /// Points it awards
    pub value: u32,
}

/// Find the single hazard contact for this frame, if any.
///
/// Returns `None` while the player's invincibility window is open.
/// Enemies are checked before obstacles; within each kind, spawn order.
pub fn find_hazard_contact(player: &Player, registry: &EntityRegistry) -> Option<HazardContact> {
    if player.is_invincible() {
        return None;
    }

    let player_box = player.hitbox();

    for (id, enemy) in registry.enemies() {
        let hitbox = ENEMY_HITBOX.shrink(Rect::from_anchor_bottom(
            enemy.x,
            enemy.y,
            enemy.width,
            enemy.height,
        ));
        if player_box.intersects(&hitbox) {
            return Some(HazardContact { id, kind: HazardKind::Enemy });
        }
    }

    for (id, obstacle) in registry.obstacles() {
        let hitbox = Rect::from_anchor_bottom(
            obstacle.x,
            obstacle.y,
            obstacle.width,
            obstacle.height,
        );
        if player_box.intersects(&hitbox) {
            return Some(HazardContact { id, kind: HazardKind::Obstacle });
        }
    }

    None
}

/// Find the single reward contact for this frame, if any.
///
/// Independent of invincibility; first collectible in spawn order wins.
pub fn find_reward_contact(player: &Player, registry: &EntityRegistry) -> Option<RewardContact> {
    let player_box = player.hitbox();

    for (id, collectible) in registry.collectibles() {
        let hitbox = Rect::from_anchor_bottom(
            collectible.x,
            collectible.y,
            collectible.width,
            collectible.height,
        );
        if player_box.intersects(&hitbox) {
            return Some(RewardContact {
                id,
                kind: collectible.kind,
                value: collectible.value,
            });
        }
    }

    None
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::game::entity::{Collectible, Enemy, Entity, Obstacle};
    use crate::game::external::VisualHandle;
    use crate::game::session::SessionConfig;

    fn config() -> SessionConfig {
        SessionConfig::default()
    }

    fn player_at_ground(cfg: &SessionConfig) -> Player {
        Player::new(cfg)
    }

    fn enemy_on_player(cfg: &SessionConfig, player: &Player) -> Entity {
        Entity::Enemy(Enemy {
            x: player.x,
            y: player.y,
            width: cfg.enemy_width,
            height: cfg.enemy_height,
            stopped: false,
            tutorial: false,
            visual: VisualHandle::PLACEHOLDER,
        })
    }

    fn obstacle_on_player(cfg: &SessionConfig, player: &Player) -> Entity {
        Entity::Obstacle(Obstacle {
            x: player.x,
            y: player.y,
            width: cfg.obstacle_width,
            height: cfg.obstacle_height,
            hit: false,
            visual: VisualHandle::PLACEHOLDER,
        })
    }

    fn collectible_on_player(cfg: &SessionConfig, player: &Player) -> Entity {
        Entity::Collectible(Collectible {
            x: player.x,
            y: player.y,
            width: cfg.collectible_width,
            height: cfg.collectible_height,
            kind: CollectibleKind::Dollar,
            value: 1,
            visual: VisualHandle::PLACEHOLDER,
        })
    }

    #[test]
    fn test_hitbox_shrink_centers_and_bottom_aligns() {
        let spec = HitboxSpec::new(0.5, 0.5, 0.0, 0.0);
        let bounds = Rect::new(0.0, 0.0, 100.0, 200.0);
        let hitbox = spec.shrink(bounds);

        assert_eq!(hitbox.width, 50.0);
        assert_eq!(hitbox.height, 100.0);
        assert_eq!(hitbox.x, 25.0);
        assert_eq!(hitbox.bottom(), bounds.bottom());
    }

    #[test]
    fn test_player_offset_raises_hitbox() {
        let bounds = Rect::new(0.0, 0.0, 100.0, 200.0);
        let raised = PLAYER_HITBOX.shrink(bounds);
        let unraised = HitboxSpec::new(0.25, 0.7, 0.0, 0.0).shrink(bounds);
        assert!(raised.y < unraised.y);
    }

    #[test]
    fn test_enemies_checked_before_obstacles() {
        let cfg = config();
        let player = player_at_ground(&cfg);
        let mut registry = EntityRegistry::new();

        // Obstacle spawned first, enemy second; enemy must still win.
        registry.insert(obstacle_on_player(&cfg, &player));
        let enemy_id = registry.insert(enemy_on_player(&cfg, &player));

        let contact = find_hazard_contact(&player, &registry).expect("contact expected");
        assert_eq!(contact.kind, HazardKind::Enemy);
        assert_eq!(contact.id, enemy_id);
    }

    #[test]
    fn test_invincible_player_ignores_hazards() {
        let cfg = config();
        let mut player = player_at_ground(&cfg);
        let mut registry = EntityRegistry::new();
        registry.insert(enemy_on_player(&cfg, &player));

        player.take_hit(cfg.invincibility_ms);
        assert!(find_hazard_contact(&player, &registry).is_none());
    }

    #[test]
    fn test_rewards_independent_of_invincibility() {
        let cfg = config();
        let mut player = player_at_ground(&cfg);
        let mut registry = EntityRegistry::new();
        registry.insert(enemy_on_player(&cfg, &player));
        registry.insert(collectible_on_player(&cfg, &player));

        player.take_hit(cfg.invincibility_ms);

        assert!(find_hazard_contact(&player, &registry).is_none());
        let reward = find_reward_contact(&player, &registry).expect("reward expected");
        assert_eq!(reward.kind, CollectibleKind::Dollar);
        assert_eq!(reward.value, 1);
    }

    #[test]
    fn test_first_collectible_in_spawn_order_wins() {
        let cfg = config();
        let player = player_at_ground(&cfg);
        let mut registry = EntityRegistry::new();
        let first = registry.insert(collectible_on_player(&cfg, &player));
        registry.insert(collectible_on_player(&cfg, &player));

        let reward = find_reward_contact(&player, &registry).expect("reward expected");
        assert_eq!(reward.id, first);
    }

    #[test]
    fn test_near_miss_reads_as_no_contact() {
        let cfg = config();
        let player = player_at_ground(&cfg);
        let mut registry = EntityRegistry::new();

        // Enemy whose full bounds overlap the player's full bounds, but
        // whose reduced hitbox does not reach the player's reduced hitbox.
        let offset = player.width / 2.0 + cfg.enemy_width * 0.25;
        registry.insert(Entity::Enemy(Enemy {
            x: player.x + offset,
            y: player.y,
            width: cfg.enemy_width,
            height: cfg.enemy_height,
            stopped: false,
            tutorial: false,
            visual: VisualHandle::PLACEHOLDER,
        }));

        let enemy_bounds = registry.enemies().next().map(|(_, e)| {
            Rect::from_anchor_bottom(e.x, e.y, e.width, e.height)
        });
        assert!(
            player.bounds().intersects(&enemy_bounds.expect("enemy missing")),
            "test setup: visual bounds should overlap"
        );
        assert!(find_hazard_contact(&player, &registry).is_none());
    }
}
