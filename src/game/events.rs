//! Session Events
//!
//! Closed set of event variants emitted by the simulation, plus the
//! in-process subscriber bus that fans them out to UI/audio collaborators.

use std::fmt;
use std::panic::{catch_unwind, AssertUnwindSafe};

use serde::{Deserialize, Serialize};
use tracing::error;

use crate::game::collision::HazardKind;
use crate::game::entity::{CollectibleKind, EntityId};
use crate::game::session::SessionState;

/// Topic a subscriber can attach to.
///
/// One topic per event variant; the mapping is fixed by
/// [`SessionEvent::topic`], so subscriber contracts are checkable at
/// compile time instead of being keyed by strings.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum EventTopic {
    /// Session state transition
    StateChange,
    /// Run started (first tap)
    Start,
    /// Player jumped
    Jump,
    /// Hazard contact consumed a health point
    Hit,
    /// Collectible consumed
    Collect,
    /// Session finalized as a win
    Win,
    /// Session finalized as a loss
    Lose,
    /// Tutorial pause dismissed
    TutorialComplete,
    /// Finish tape broken
    CrossedFinish,
}

/// An event emitted by the simulation during a frame.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub enum SessionEvent {
    /// The session transitioned between states.
    StateChange {
        /// State before the transition
        from: SessionState,
        /// State after the transition
        to: SessionState,
    },
    /// The run started from the intro screen.
    Start,
    /// The player began a jump.
    Jump,
    /// A hazard contact landed.
    Hit {
        /// Health remaining after the hit
        health: u32,
        /// Which kind of hazard connected
        entity: HazardKind,
        /// Registry id of the hazard
        id: EntityId,
    },
    /// A collectible was consumed.
    Collect {
        /// Points awarded
        value: u32,
        /// Kind of collectible
        kind: CollectibleKind,
        /// Score after the award
        total_score: u32,
    },
    /// The session ended in a win.
    Win {
        /// Final score
        score: u32,
    },
    /// The session ended in a loss.
    Lose {
        /// Final score
        score: u32,
    },
    /// The tutorial pause was dismissed.
    TutorialComplete,
    /// The finish tape broke over the player.
    CrossedFinish,
}

impl SessionEvent {
    /// Topic this event is dispatched on.
    pub fn topic(&self) -> EventTopic {
        match self {
            SessionEvent::StateChange { .. } => EventTopic::StateChange,
            SessionEvent::Start => EventTopic::Start,
            SessionEvent::Jump => EventTopic::Jump,
            SessionEvent::Hit { .. } => EventTopic::Hit,
            SessionEvent::Collect { .. } => EventTopic::Collect,
            SessionEvent::Win { .. } => EventTopic::Win,
            SessionEvent::Lose { .. } => EventTopic::Lose,
            SessionEvent::TutorialComplete => EventTopic::TutorialComplete,
            SessionEvent::CrossedFinish => EventTopic::CrossedFinish,
        }
    }
}

/// Handle returned by [`EventBus::on`], used to detach a subscriber.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct SubscriberId(u64);

type Handler = Box<dyn FnMut(&SessionEvent)>;

struct Subscriber {
    id: SubscriberId,
    topic: EventTopic,
    handler: Handler,
}

/// In-process publish/subscribe channel.
///
/// Subscribers attach per topic and receive events synchronously during
/// dispatch. A panicking subscriber is isolated: the panic is caught,
/// logged, and dispatch continues with the remaining subscribers — a
/// faulty audio or UI hook must never abort the frame.
#[derive(Default)]
pub struct EventBus {
    subscribers: Vec<Subscriber>,
    next_id: u64,
}

impl EventBus {
    /// Create an empty bus.
    pub fn new() -> Self {
        Self::default()
    }

    /// Attach a handler to a topic. Returns the id used to detach it.
    pub fn on<F>(&mut self, topic: EventTopic, handler: F) -> SubscriberId
    where
        F: FnMut(&SessionEvent) + 'static,
    {
        let id = SubscriberId(self.next_id);
        self.next_id += 1;
        self.subscribers.push(Subscriber {
            id,
            topic,
            handler: Box::new(handler),
        });
        id
    }

    /// Detach a subscriber. Returns false if the id was already gone.
    pub fn off(&mut self, id: SubscriberId) -> bool {
        let before = self.subscribers.len();
        self.subscribers.retain(|s| s.id != id);
        self.subscribers.len() != before
    }

    /// Number of attached subscribers (all topics).
    pub fn subscriber_count(&self) -> usize {
        self.subscribers.len()
    }

    /// Dispatch one event to every subscriber of its topic, in attach order.
    pub fn dispatch(&mut self, event: &SessionEvent) {
        let topic = event.topic();
        for sub in &mut self.subscribers {
            if sub.topic != topic {
                continue;
            }
            let handler = &mut sub.handler;
            if let Err(payload) = catch_unwind(AssertUnwindSafe(|| handler(event))) {
                let message = payload
                    .downcast_ref::<&str>()
                    .map(|s| (*s).to_owned())
                    .or_else(|| payload.downcast_ref::<String>().cloned())
                    .unwrap_or_else(|| "non-string panic payload".to_owned());
                error!(?topic, subscriber = sub.id.0, %message, "event subscriber panicked");
            }
        }
    }
}

impl fmt::Debug for EventBus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EventBus")
            .field("subscribers", &self.subscribers.len())
            .finish()
    }
}
