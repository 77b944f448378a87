//! # Runner Core
//!
//! Deterministic simulation core for a single-session side-scrolling runner.
//!
//! ## Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────┐
//! │                       RUNNER CORE                            │
//! ├─────────────────────────────────────────────────────────────┤
//! │  core/           - Domain-free primitives                    │
//! │  ├── rect.rs     - Axis-aligned rectangle + overlap test     │
//! │  └── rng.rs      - Deterministic Xorshift128+ PRNG           │
//! │                                                              │
//! │  game/           - Simulation logic                          │
//! │  ├── session.rs  - Session state machine + frame orchestration│
//! │  ├── player.rs   - Runner state, sine jump, invincibility    │
//! │  ├── entity.rs   - Entity arena, movement, off-screen cull   │
//! │  ├── spawn.rs    - Distance-keyed spawn records + scheduler  │
//! │  ├── collision.rs- Hitbox derivation + contact resolution    │
//! │  ├── tutorial.rs - One-shot proximity pause trigger          │
//! │  ├── finish.rs   - Tape break + deceleration sequencing      │
//! │  ├── events.rs   - Typed session events + subscriber bus     │
//! │  └── external.rs - Collaborator seams (assets, scene, UI)    │
//! └─────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Frame Contract
//!
//! All simulation runs inside a single `Session::update(delta_ms)` call per
//! external tick. Within a frame the order is fixed and load-bearing:
//! player advance → speed/distance → spawn scan → entity movement →
//! collision resolution → tutorial check → finish sequencing → event
//! dispatch. Nothing blocks, and no failure in an external collaborator
//! (assets, subscribers) can abort a frame.

#![warn(missing_docs)]
#![warn(clippy::all)]
#![deny(unsafe_code)]

pub mod core;
pub mod game;

// Re-export commonly used types
pub use crate::core::rect::Rect;
pub use crate::core::rng::SessionRng;
pub use game::events::{EventBus, EventTopic, SessionEvent, SubscriberId};
pub use game::session::{GameSession, Session, SessionConfig, SessionState};
pub use game::spawn::{SpawnKind, SpawnRecord, SpawnTable};

/// Crate version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Nominal display refresh the frame-counted delays are tuned against (Hz)
pub const NOMINAL_FRAME_RATE: u32 = 60;
