//! Entity Registry
//!
//! Active collectibles, enemies, obstacles and the (at most one) finish
//! line, stored as a tagged union in an arena with stable ids. Ids are
//! never reused within a session, so removal cannot invalidate anything a
//! later frame still holds. Iteration order is spawn order.

use serde::{Deserialize, Serialize};

use crate::core::rect::Rect;
use crate::game::collision::{HitboxSpec, ENEMY_HITBOX, FULL_BOUNDS};
use crate::game::external::VisualHandle;
use crate::game::session::SessionConfig;

/// Stable entity id: an index into the registry arena, never reused.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct EntityId(pub u32);

/// Kind of collectible, decided by a weighted roll at spawn time.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum CollectibleKind {
    /// Common pickup, fixed value
    Dollar,
    /// Rarer pickup, rolled value
    GiftCard,
}

/// A collectible scrolling toward the player.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Collectible {
    /// Horizontal center
    pub x: f32,
    /// Feet position
    pub y: f32,
    /// Visual width
    pub width: f32,
    /// Visual height
    pub height: f32,
    /// Kind rolled at spawn
    pub kind: CollectibleKind,
    /// Points awarded on consumption
    pub value: u32,
    /// Renderable handle
    pub visual: VisualHandle,
}

/// An enemy closing in on the player.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Enemy {
    /// Horizontal center
    pub x: f32,
    /// Feet position
    pub y: f32,
    /// Visual width
    pub width: f32,
    /// Visual height
    pub height: f32,
    /// Halted by the tutorial pause
    pub stopped: bool,
    /// Designated tutorial enemy (the first one spawned)
    pub tutorial: bool,
    /// Renderable handle
    pub visual: VisualHandle,
}

/// A static obstacle scrolling with the background.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Obstacle {
    /// Horizontal center
    pub x: f32,
    /// Feet position
    pub y: f32,
    /// Visual width
    pub width: f32,
    /// Visual height
    pub height: f32,
    /// Already collided with the player (visual state only)
    pub hit: bool,
    /// Renderable handle
    pub visual: VisualHandle,
}

/// The finish line. Scrolls with the background and carries its own
/// "break point": the tape snaps when that point passes the player,
/// which is a positional threshold rather than a rectangle overlap.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct FinishLine {
    /// Horizontal center of the posts
    pub x: f32,
    /// Total width of the construction
    pub width: f32,
    /// Scrolling x of the tape break point
    pub break_x: f32,
    /// Tape has snapped
    pub broken: bool,
    /// Renderable handle
    pub visual: VisualHandle,
}

/// Tagged union over every entity kind the registry owns.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub enum Entity {
    /// Collectible pickup
    Collectible(Collectible),
    /// Enemy
    Enemy(Enemy),
    /// Obstacle
    Obstacle(Obstacle),
    /// Finish line
    Finish(FinishLine),
}

impl Entity {
    /// Renderable handle of this entity.
    pub fn visual(&self) -> VisualHandle {
        match self {
            Entity::Collectible(c) => c.visual,
            Entity::Enemy(e) => e.visual,
            Entity::Obstacle(o) => o.visual,
            Entity::Finish(f) => f.visual,
        }
    }

    /// Full visual bounds, anchored bottom-center.
    pub fn bounds(&self) -> Rect {
        match self {
            Entity::Collectible(c) => Rect::from_anchor_bottom(c.x, c.y, c.width, c.height),
            Entity::Enemy(e) => Rect::from_anchor_bottom(e.x, e.y, e.width, e.height),
            Entity::Obstacle(o) => Rect::from_anchor_bottom(o.x, o.y, o.width, o.height),
            // Posts stand on the ground; height is irrelevant to any test
            // performed on the finish, so a flat band is enough.
            Entity::Finish(f) => Rect::new(f.x - f.width / 2.0, 0.0, f.width, 0.0),
        }
    }

    /// Hitbox spec for this entity kind.
    fn hitbox_spec(&self) -> HitboxSpec {
        match self {
            Entity::Enemy(_) => ENEMY_HITBOX,
            _ => FULL_BOUNDS,
        }
    }

    /// Reduced hit-rectangle for collision testing.
    pub fn hitbox(&self) -> Rect {
        self.hitbox_spec().shrink(self.bounds())
    }

    /// Right edge used by the off-screen cull.
    fn right_edge(&self) -> f32 {
        self.bounds().right()
    }
}

/// Arena of active entities with stable ids.
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct EntityRegistry {
    slots: Vec<Option<Entity>>,
}

impl EntityRegistry {
    /// Create an empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert an entity, returning its stable id.
    pub fn insert(&mut self, entity: Entity) -> EntityId {
        let id = EntityId(self.slots.len() as u32);
        self.slots.push(Some(entity));
        id
    }

    /// Look up an entity.
    pub fn get(&self, id: EntityId) -> Option<&Entity> {
        self.slots.get(id.0 as usize).and_then(|s| s.as_ref())
    }

    /// Look up an entity mutably.
    pub fn get_mut(&mut self, id: EntityId) -> Option<&mut Entity> {
        self.slots.get_mut(id.0 as usize).and_then(|s| s.as_mut())
    }

    /// Remove an entity, returning it. The slot stays tombstoned so every
    /// other id remains valid.
    pub fn remove(&mut self, id: EntityId) -> Option<Entity> {
        self.slots.get_mut(id.0 as usize).and_then(|s| s.take())
    }

    /// Number of active entities.
    pub fn active_count(&self) -> usize {
        self.slots.iter().filter(|s| s.is_some()).count()
    }

    /// Iterate active entities in spawn order.
    pub fn iter(&self) -> impl Iterator<Item = (EntityId, &Entity)> {
        self.slots
            .iter()
            .enumerate()
            .filter_map(|(i, s)| s.as_ref().map(|e| (EntityId(i as u32), e)))
    }

    /// Iterate active enemies in spawn order.
    pub fn enemies(&self) -> impl Iterator<Item = (EntityId, &Enemy)> {
        self.iter().filter_map(|(id, e)| match e {
            Entity::Enemy(enemy) => Some((id, enemy)),
            _ => None,
        })
    }

    /// Iterate active obstacles in spawn order.
    pub fn obstacles(&self) -> impl Iterator<Item = (EntityId, &Obstacle)> {
        self.iter().filter_map(|(id, e)| match e {
            Entity::Obstacle(obstacle) => Some((id, obstacle)),
            _ => None,
        })
    }

    /// Iterate active collectibles in spawn order.
    pub fn collectibles(&self) -> impl Iterator<Item = (EntityId, &Collectible)> {
        self.iter().filter_map(|(id, e)| match e {
            Entity::Collectible(c) => Some((id, c)),
            _ => None,
        })
    }

    /// The finish line, if spawned and still active.
    pub fn finish(&self) -> Option<(EntityId, &FinishLine)> {
        self.iter().find_map(|(id, e)| match e {
            Entity::Finish(f) => Some((id, f)),
            _ => None,
        })
    }

    /// The finish line, mutably.
    pub fn finish_mut(&mut self) -> Option<&mut FinishLine> {
        self.slots.iter_mut().find_map(|s| match s.as_mut() {
            Some(Entity::Finish(f)) => Some(f),
            _ => None,
        })
    }

    /// Advance every active entity by one frame.
    ///
    /// Collectibles, obstacles and the finish line move left at exactly
    /// `background_speed`; enemies add their own run speed on top so they
    /// close in on the stationary player. The finish line's break point
    /// scrolls with it.
    pub fn advance(&mut self, delta_ms: f32, background_speed: f32, config: &SessionConfig) {
        let dt = delta_ms / 1000.0;
        let background_dx = background_speed * dt;
        let enemy_dx = (background_speed + config.enemy_extra_speed) * dt;

        for slot in &mut self.slots {
            match slot.as_mut() {
                Some(Entity::Collectible(c)) => c.x -= background_dx,
                Some(Entity::Obstacle(o)) => o.x -= background_dx,
                Some(Entity::Enemy(e)) => {
                    if !e.stopped {
                        e.x -= enemy_dx;
                    }
                }
                Some(Entity::Finish(f)) => {
                    f.x -= background_dx;
                    f.break_x -= background_dx;
                }
                None => {}
            }
        }
    }

    /// Remove entities whose right edge has scrolled past the cull line
    /// left of the screen. Returns the removed entities so the session can
    /// detach their visuals. Tombstoning slots in place means removal can
    /// never skip or shift a neighbour.
    pub fn cull(&mut self, config: &SessionConfig) -> Vec<Entity> {
        let cull_line = -config.cull_margin;
        let mut removed = Vec::new();

        for slot in &mut self.slots {
            let gone = match slot.as_ref() {
                Some(entity) => entity.right_edge() < cull_line,
                None => false,
            };
            if gone {
                if let Some(entity) = slot.take() {
                    removed.push(entity);
                }
            }
        }

        removed
    }
}
