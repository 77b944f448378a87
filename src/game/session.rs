//! Session State Machine
//!
//! The orchestrator. Owns the `GameSession` value (score, health,
//! distance, speed, flags), receives input taps, and drives the per-frame
//! update order: player advance → speed/distance → spawn scan → entity
//! movement → tape-break check → collision resolution → tutorial check →
//! cull → event dispatch. That order is load-bearing: an entity must be
//! spawned and moved before it can be hit in the frame it first appears.

use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use crate::core::rng::SessionRng;
use crate::game::collision;
use crate::game::entity::{
    Collectible, CollectibleKind, Enemy, Entity, EntityId, EntityRegistry, FinishLine, Obstacle,
};
use crate::game::events::{EventBus, EventTopic, SessionEvent, SubscriberId};
use crate::game::external::{
    resolve_visual, AssetKey, AssetProvider, EndScreen, HeadlessAssets, NullEndScreen, NullScene,
    SceneSink,
};
use crate::game::finish;
use crate::game::player::Player;
use crate::game::spawn::{DueSpawn, SpawnKind, SpawnTable};
use crate::game::tutorial;

/// Session lifecycle state.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SessionState {
    /// Assets loading; input ignored
    Loading,
    /// Waiting for the first tap
    Intro,
    /// Active gameplay
    Running,
    /// Tutorial pause; waiting for a tap
    Paused,
    /// Terminal: the run was won
    EndWin,
    /// Terminal: the run was lost
    EndLose,
}

impl SessionState {
    /// `EndWin` and `EndLose` accept no further transitions.
    #[inline]
    pub fn is_terminal(self) -> bool {
        matches!(self, SessionState::EndWin | SessionState::EndLose)
    }
}

/// Tunables for one session.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct SessionConfig {
    /// Scroll speed while running, px/s
    pub base_speed: f32,
    /// Per-frame speed multiplier once decelerating (< 1)
    pub deceleration_rate: f32,
    /// Speed floor; below it speed snaps to zero
    pub min_speed: f32,
    /// Starting (and maximum) health
    pub max_health: u32,
    /// Invincibility window after a hazard contact, ms
    pub invincibility_ms: f32,
    /// Player-to-enemy gap that triggers the tutorial pause, px
    pub tutorial_pause_distance: f32,
    /// Jump apex height, px
    pub jump_height: f32,
    /// Jump duration, ms
    pub jump_duration_ms: f32,
    /// Fixed reference width: one spawn-distance unit, px
    pub unit_width: f32,
    /// Ground line in reference coordinates, px from the top
    pub ground_y: f32,
    /// Player x as a fraction of the unit width
    pub player_x_fraction: f32,
    /// Player visual width, px
    pub player_width: f32,
    /// Player visual height, px
    pub player_height: f32,
    /// Enemy visual width, px
    pub enemy_width: f32,
    /// Enemy visual height, px
    pub enemy_height: f32,
    /// Obstacle visual width, px
    pub obstacle_width: f32,
    /// Obstacle visual height, px
    pub obstacle_height: f32,
    /// Collectible visual width, px
    pub collectible_width: f32,
    /// Collectible visual height, px
    pub collectible_height: f32,
    /// Finish construction width, px
    pub finish_width: f32,
    /// Extra leftward speed enemies add on top of the background, px/s
    pub enemy_extra_speed: f32,
    /// How far past the left edge an entity may scroll before culling, px
    pub cull_margin: f32,
    /// How far past the right edge entities spawn, px
    pub spawn_margin: f32,
    /// Frames between speed reaching zero and the win finalizing
    pub win_settle_frames: u32,
    /// Probability of a collectible rolling as a dollar, percent
    pub dollar_percent: u32,
    /// Points for a dollar
    pub dollar_value: u32,
    /// Minimum points for a gift card
    pub gift_card_min: u32,
    /// Maximum points for a gift card
    pub gift_card_max: u32,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            base_speed: 252.63,
            deceleration_rate: 0.9,
            min_speed: 10.0,
            max_health: 3,
            invincibility_ms: 1000.0,
            tutorial_pause_distance: 150.0,
            jump_height: 200.0,
            jump_duration_ms: 800.0,
            unit_width: 720.0,
            ground_y: 1000.0,
            player_x_fraction: 0.18,
            player_width: 80.0,
            player_height: 158.0,
            enemy_width: 65.0,
            enemy_height: 151.0,
            obstacle_width: 40.0,
            obstacle_height: 60.0,
            collectible_width: 48.0,
            collectible_height: 48.0,
            finish_width: 240.0,
            enemy_extra_speed: 150.0,
            cull_margin: 100.0,
            spawn_margin: 100.0,
            win_settle_frames: 30,
            dollar_percent: 60,
            dollar_value: 1,
            gift_card_min: 5,
            gift_card_max: 10,
        }
    }
}

/// The mutable session value.
///
/// Owned by [`Session`] and mutated only by it and the component
/// functions it calls synchronously during a frame — no ambient
/// singletons anywhere.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct GameSession {
    /// Current lifecycle state
    pub state: SessionState,
    /// Accumulated score
    pub score: u32,
    /// Remaining health; 0 forces `EndLose`
    pub health: u32,
    /// Travelled distance in px; non-decreasing while running
    pub distance_traveled: f32,
    /// Current scroll speed, px/s
    pub current_speed: f32,
    /// Post-finish deceleration in progress
    pub is_decelerating: bool,
    /// Taps translate into jumps only once the tutorial completed
    pub jumping_enabled: bool,
    /// Latched once the tutorial pause has fired
    pub tutorial_triggered: bool,
    /// Frame-counted settle delay before the win finalizes
    pub win_delay_frames: Option<u32>,
    /// Frames simulated so far
    pub frame: u64,
    /// Events produced this frame, drained at dispatch time
    #[serde(skip)]
    pending_events: Vec<SessionEvent>,
}

impl GameSession {
    /// Fresh session value in `Loading`.
    pub fn new(config: &SessionConfig) -> Self {
        Self {
            state: SessionState::Loading,
            score: 0,
            health: config.max_health,
            distance_traveled: 0.0,
            current_speed: config.base_speed,
            is_decelerating: false,
            jumping_enabled: false,
            tutorial_triggered: false,
            win_delay_frames: None,
            frame: 0,
            pending_events: Vec::new(),
        }
    }

    /// Transition to a new state, emitting `StateChange`.
    ///
    /// A same-state call is a no-op; terminal states are never left.
    pub fn set_state(&mut self, to: SessionState) {
        if self.state == to {
            return;
        }
        debug_assert!(!self.state.is_terminal(), "terminal states accept no transitions");
        let from = self.state;
        self.state = to;
        self.push_event(SessionEvent::StateChange { from, to });
    }

    /// Queue an event for end-of-frame dispatch.
    pub fn push_event(&mut self, event: SessionEvent) {
        self.pending_events.push(event);
    }

    /// Take pending events (consumes them).
    pub fn take_events(&mut self) -> Vec<SessionEvent> {
        std::mem::take(&mut self.pending_events)
    }
}

/// The session orchestrator.
///
/// External surface: [`Session::init`], [`Session::update`],
/// [`Session::handle_tap`], read-only queries, and the event bus.
pub struct Session {
    config: SessionConfig,
    game: GameSession,
    player: Player,
    registry: EntityRegistry,
    table: SpawnTable,
    bus: EventBus,
    rng: SessionRng,
    assets: Box<dyn AssetProvider>,
    scene: Box<dyn SceneSink>,
    end_screen: Box<dyn EndScreen>,
    tutorial_enemy: Option<EntityId>,
}

impl Session {
    /// Create a session with headless collaborators (demo/tests).
    pub fn new(config: SessionConfig, table: SpawnTable, seed: u64) -> Self {
        Self::with_collaborators(
            config,
            table,
            seed,
            Box::new(HeadlessAssets::default()),
            Box::new(NullScene),
            Box::new(NullEndScreen),
        )
    }

    /// Create a session wired to real collaborators.
    pub fn with_collaborators(
        config: SessionConfig,
        table: SpawnTable,
        seed: u64,
        assets: Box<dyn AssetProvider>,
        scene: Box<dyn SceneSink>,
        end_screen: Box<dyn EndScreen>,
    ) -> Self {
        let game = GameSession::new(&config);
        let player = Player::new(&config);
        Self {
            config,
            game,
            player,
            registry: EntityRegistry::new(),
            table,
            bus: EventBus::new(),
            rng: SessionRng::new(seed),
            assets,
            scene,
            end_screen,
            tutorial_enemy: None,
        }
    }

    /// One-time setup. Returns once the session has reached `Intro`.
    pub fn init(&mut self) {
        debug_assert_eq!(self.game.state, SessionState::Loading);
        let player_visual = resolve_visual(self.assets.as_mut(), AssetKey::Player);
        self.scene.attach(player_visual);
        self.game.set_state(SessionState::Intro);
        self.flush_events();
        info!(records = self.table.records().len(), "session ready");
    }

    /// Advance the simulation by one frame.
    pub fn update(&mut self, delta_ms: f32) {
        self.game.frame += 1;

        // The cosmetic animation clock runs in every state; gameplay
        // timers only receive deltas while running, which is what freezes
        // them during the tutorial pause.
        self.player.advance_animation(delta_ms);

        if self.game.state == SessionState::Running {
            self.frame_running(delta_ms);
        }

        self.flush_events();
    }

    /// Deliver one (externally debounced) tap.
    pub fn handle_tap(&mut self) {
        match self.game.state {
            SessionState::Loading => {}
            SessionState::Intro => self.start(),
            SessionState::Paused => self.resume_from_tutorial(),
            SessionState::Running => {
                if self.game.jumping_enabled
                    && !self.game.is_decelerating
                    && self.player.try_jump()
                {
                    self.game.push_event(SessionEvent::Jump);
                }
            }
            SessionState::EndWin | SessionState::EndLose => {
                self.end_screen.handle_tap(self.game.state);
            }
        }
        self.flush_events();
    }

    /// Current state.
    pub fn state(&self) -> SessionState {
        self.game.state
    }

    /// Current score.
    pub fn score(&self) -> u32 {
        self.game.score
    }

    /// Remaining health.
    pub fn health(&self) -> u32 {
        self.game.health
    }

    /// Travelled distance in px.
    pub fn distance_traveled(&self) -> f32 {
        self.game.distance_traveled
    }

    /// The session value (read-only).
    pub fn game(&self) -> &GameSession {
        &self.game
    }

    /// The player (read-only).
    pub fn player(&self) -> &Player {
        &self.player
    }

    /// Active entities (read-only).
    pub fn registry(&self) -> &EntityRegistry {
        &self.registry
    }

    /// Attach an event subscriber.
    pub fn on<F>(&mut self, topic: EventTopic, handler: F) -> SubscriberId
    where
        F: FnMut(&SessionEvent) + 'static,
    {
        self.bus.on(topic, handler)
    }

    /// Detach an event subscriber.
    pub fn off(&mut self, id: SubscriberId) -> bool {
        self.bus.off(id)
    }

    // =========================================================================
    // Frame internals
    // =========================================================================

    fn frame_running(&mut self, delta_ms: f32) {
        // 1. Player physics (jump trajectory, invincibility countdown)
        self.player.advance(delta_ms, &self.config);

        // 2. Speed / distance
        if self.game.is_decelerating {
            if finish::advance_deceleration(&mut self.game, &self.config) {
                self.finalize_win();
                return;
            }
        } else {
            self.game.distance_traveled += self.game.current_speed * delta_ms / 1000.0;
        }

        // 3. Spawn due records
        let due = self
            .table
            .scan(self.game.distance_traveled, self.config.unit_width);
        for spawn in due {
            self.spawn_due(spawn);
        }

        // 4. Move entities (and the finish break point with them)
        self.registry
            .advance(delta_ms, self.game.current_speed, &self.config);

        // 5. Tape break is a positional threshold, not an overlap test
        finish::check_tape_break(&mut self.game, &self.player, &mut self.registry);

        // 6. Contacts
        self.resolve_collisions();
        if self.game.state != SessionState::Running {
            return;
        }

        // 7. Tutorial proximity
        tutorial::check_tutorial_pause(
            &mut self.game,
            &self.player,
            &mut self.registry,
            &self.config,
        );

        // 8. Cull entities that scrolled off the left edge
        for entity in self.registry.cull(&self.config) {
            self.scene.detach(entity.visual());
        }
    }

    fn resolve_collisions(&mut self) {
        // One hazard per frame at most; the sweep itself enforces
        // enemies-before-obstacles and respects invincibility.
        if let Some(contact) = collision::find_hazard_contact(&self.player, &self.registry) {
            self.game.health = self.game.health.saturating_sub(1);
            self.player.take_hit(self.config.invincibility_ms);
            if let Some(Entity::Obstacle(obstacle)) = self.registry.get_mut(contact.id) {
                obstacle.hit = true;
            }
            self.game.push_event(SessionEvent::Hit {
                health: self.game.health,
                entity: contact.kind,
                id: contact.id,
            });
            if self.game.health == 0 {
                self.finalize_lose();
                return;
            }
        }

        // Rewards are independent of invincibility; one per frame.
        if let Some(reward) = collision::find_reward_contact(&self.player, &self.registry) {
            self.game.score += reward.value;
            if let Some(entity) = self.registry.remove(reward.id) {
                self.scene.detach(entity.visual());
            }
            self.game.push_event(SessionEvent::Collect {
                value: reward.value,
                kind: reward.kind,
                total_score: self.game.score,
            });
        }
    }

    fn spawn_due(&mut self, due: DueSpawn) {
        let x = self.config.unit_width + self.config.spawn_margin;
        let y = self.config.ground_y - due.y_offset;

        match due.kind {
            SpawnKind::Collectible => {
                let (kind, value, key) = if self.rng.percent(self.config.dollar_percent) {
                    (CollectibleKind::Dollar, self.config.dollar_value, AssetKey::Dollar)
                } else {
                    let value = self
                        .rng
                        .next_range(self.config.gift_card_min, self.config.gift_card_max);
                    (CollectibleKind::GiftCard, value, AssetKey::GiftCard)
                };
                let visual = resolve_visual(self.assets.as_mut(), key);
                self.scene.attach(visual);
                self.registry.insert(Entity::Collectible(Collectible {
                    x,
                    y,
                    width: self.config.collectible_width,
                    height: self.config.collectible_height,
                    kind,
                    value,
                    visual,
                }));
            }
            SpawnKind::Enemy => {
                // The first enemy of the session teaches the jump
                let tutorial = self.tutorial_enemy.is_none() && !self.game.tutorial_triggered;
                let visual = resolve_visual(self.assets.as_mut(), AssetKey::Enemy);
                self.scene.attach(visual);
                let id = self.registry.insert(Entity::Enemy(Enemy {
                    x,
                    y,
                    width: self.config.enemy_width,
                    height: self.config.enemy_height,
                    stopped: false,
                    tutorial,
                    visual,
                }));
                if tutorial {
                    self.tutorial_enemy = Some(id);
                }
            }
            SpawnKind::Obstacle => {
                let visual = resolve_visual(self.assets.as_mut(), AssetKey::Obstacle);
                self.scene.attach(visual);
                self.registry.insert(Entity::Obstacle(Obstacle {
                    x,
                    y,
                    width: self.config.obstacle_width,
                    height: self.config.obstacle_height,
                    hit: false,
                    visual,
                }));
            }
            SpawnKind::Finish => {
                if self.registry.finish().is_some() {
                    warn!("duplicate finish record ignored");
                    return;
                }
                let visual = resolve_visual(self.assets.as_mut(), AssetKey::FinishLine);
                self.scene.attach(visual);
                self.registry.insert(Entity::Finish(FinishLine {
                    x,
                    width: self.config.finish_width,
                    break_x: x,
                    broken: false,
                    visual,
                }));
            }
        }
    }

    fn start(&mut self) {
        self.player.start_running();
        // Jump input stays disabled until the tutorial teaches it
        self.game.jumping_enabled = false;
        self.game.set_state(SessionState::Running);
        self.game.push_event(SessionEvent::Start);
        info!("run started");
    }

    fn resume_from_tutorial(&mut self) {
        self.game.jumping_enabled = true;
        tutorial::release_tutorial_enemy(&mut self.registry);
        self.game.set_state(SessionState::Running);
        self.game.push_event(SessionEvent::TutorialComplete);
        // The dismissing tap doubles as the first jump
        if self.player.try_jump() {
            self.game.push_event(SessionEvent::Jump);
        }
    }

    fn finalize_win(&mut self) {
        self.game.set_state(SessionState::EndWin);
        self.game.push_event(SessionEvent::Win { score: self.game.score });
        info!(score = self.game.score, "session won");
    }

    fn finalize_lose(&mut self) {
        self.game.set_state(SessionState::EndLose);
        self.game.push_event(SessionEvent::Lose { score: self.game.score });
        info!(score = self.game.score, "session lost");
    }

    fn flush_events(&mut self) {
        for event in self.game.take_events() {
            self.bus.dispatch(&event);
        }
    }
}
