//! External Collaborator Seams
//!
//! The simulation core consumes a handful of services it does not own:
//! an asset/texture provider, a scene attachment point, and the end
//! screen that takes over input once the session reaches a terminal
//! state. Each is a narrow trait with a headless default implementation
//! so the core runs to completion with no rendering stack at all.

use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::warn;

use crate::game::session::SessionState;

/// Logical asset key the core asks the provider to resolve.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum AssetKey {
    /// The runner spritesheet
    Player,
    /// Enemy spritesheet
    Enemy,
    /// Obstacle cone
    Obstacle,
    /// Dollar collectible
    Dollar,
    /// Gift card collectible
    GiftCard,
    /// Finish line posts + tape
    FinishLine,
}

/// Opaque handle to a renderable created by the provider.
///
/// The core never looks inside; it only passes handles to the scene sink
/// on spawn/despawn.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct VisualHandle(pub u32);

impl VisualHandle {
    /// Fallback shape used when an asset cannot be resolved.
    pub const PLACEHOLDER: VisualHandle = VisualHandle(0);
}

/// Asset resolution failures.
///
/// None of these are fatal to the session: the core degrades to
/// [`VisualHandle::PLACEHOLDER`] and keeps simulating.
#[derive(Debug, Error)]
pub enum AssetError {
    /// The provider has no renderable for this key.
    #[error("asset {0:?} is not available")]
    Unavailable(AssetKey),
    /// The provider found the asset but could not decode it.
    #[error("asset {key:?} failed to decode: {reason}")]
    Decode {
        /// Key that failed
        key: AssetKey,
        /// Provider-supplied reason
        reason: String,
    },
}

/// Provider of renderable handles for logical asset keys.
pub trait AssetProvider {
    /// Resolve a key to a renderable handle.
    fn visual(&mut self, key: AssetKey) -> Result<VisualHandle, AssetError>;
}

/// Attachment point for entity visuals as they spawn and despawn.
pub trait SceneSink {
    /// An entity spawned; its visual should enter the scene.
    fn attach(&mut self, handle: VisualHandle);
    /// An entity despawned; its visual should leave the scene.
    fn detach(&mut self, handle: VisualHandle);
}

/// End-of-session screen. Taps in `EndWin`/`EndLose` are routed here
/// rather than back into the state machine.
pub trait EndScreen {
    /// A tap arrived while the session sat in the given terminal state.
    fn handle_tap(&mut self, outcome: SessionState);
}

/// Resolve an asset, degrading to the placeholder on failure.
pub fn resolve_visual(provider: &mut dyn AssetProvider, key: AssetKey) -> VisualHandle {
    match provider.visual(key) {
        Ok(handle) => handle,
        Err(err) => {
            warn!(%err, "asset unavailable, using placeholder shape");
            VisualHandle::PLACEHOLDER
        }
    }
}

/// Headless provider that hands out unique handles without touching any
/// texture pipeline. Used by the demo binary and tests.
#[derive(Debug, Default)]
pub struct HeadlessAssets {
    next: u32,
}

impl AssetProvider for HeadlessAssets {
    fn visual(&mut self, _key: AssetKey) -> Result<VisualHandle, AssetError> {
        self.next += 1;
        Ok(VisualHandle(self.next))
    }
}

/// Scene sink that drops everything.
#[derive(Debug, Default)]
pub struct NullScene;

impl SceneSink for NullScene {
    fn attach(&mut self, _handle: VisualHandle) {}
    fn detach(&mut self, _handle: VisualHandle) {}
}

/// End screen that ignores taps.
#[derive(Debug, Default)]
pub struct NullEndScreen;

impl EndScreen for NullEndScreen {
    fn handle_tap(&mut self, _outcome: SessionState) {}
}

#[cfg(test)]
mod tests {
    use super::*;

    struct FailingAssets;

    impl AssetProvider for FailingAssets {
        fn visual(&mut self, key: AssetKey) -> Result<VisualHandle, AssetError> {
            Err(AssetError::Unavailable(key))
        }
    }

    #[test]
    fn test_resolve_falls_back_to_placeholder() {
        let mut provider = FailingAssets;
        let handle = resolve_visual(&mut provider, AssetKey::Player);
        assert_eq!(handle, VisualHandle::PLACEHOLDER);
    }

    #[test]
    fn test_headless_assets_hand_out_distinct_handles() {
        let mut provider = HeadlessAssets::default();
        let a = resolve_visual(&mut provider, AssetKey::Dollar);
        let b = resolve_visual(&mut provider, AssetKey::Enemy);
        assert_ne!(a, b);
        assert_ne!(a, VisualHandle::PLACEHOLDER);
    }
}
