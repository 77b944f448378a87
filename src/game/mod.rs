//! Simulation Logic
//!
//! Everything with real state and ordering invariants lives here.
//!
//! ## Module Structure
//!
//! - `session`: state machine + per-frame orchestration
//! - `player`: runner state, sine jump, invincibility window
//! - `entity`: entity arena, movement, off-screen cull
//! - `spawn`: distance-keyed spawn records and the scheduler
//! - `collision`: hitbox derivation and contact resolution
//! - `tutorial`: one-shot proximity pause
//! - `finish`: tape break and deceleration sequencing
//! - `events`: typed session events and the subscriber bus
//! - `external`: collaborator seams (assets, scene, end screen)

pub mod collision;
pub mod entity;
pub mod events;
pub mod external;
pub mod finish;
pub mod player;
pub mod session;
pub mod spawn;
pub mod tutorial;

// Re-export key types
pub use entity::{CollectibleKind, Entity, EntityId, EntityRegistry};
pub use events::{EventBus, EventTopic, SessionEvent, SubscriberId};
pub use player::Player;
pub use session::{GameSession, Session, SessionConfig, SessionState};
pub use spawn::{SpawnKind, SpawnRecord, SpawnTable};
