//! Core domain-free primitives.
//!
//! Geometry and randomness used by the simulation. Everything here is
//! self-contained and free of game rules.

pub mod rect;
pub mod rng;

// Re-export core types
pub use rect::Rect;
pub use rng::SessionRng;
