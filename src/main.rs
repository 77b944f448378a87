//! Runner Core Demo
//!
//! Drives a complete headless session at a fixed 60 Hz step with scripted
//! taps, logging every event the simulation emits. Pass a path to a JSON
//! spawn table to play a custom level layout.

use std::cell::RefCell;
use std::rc::Rc;

use anyhow::Context;
use tracing::{info, Level};
use tracing_subscriber::FmtSubscriber;

use runner_core::{
    EventTopic, Session, SessionConfig, SessionState, SpawnTable, NOMINAL_FRAME_RATE, VERSION,
};

fn main() -> anyhow::Result<()> {
    // Initialize logging
    let subscriber = FmtSubscriber::builder()
        .with_max_level(Level::INFO)
        .finish();
    tracing::subscriber::set_global_default(subscriber)
        .context("failed to set tracing subscriber")?;

    info!("Runner Core v{}", VERSION);

    let table = match std::env::args().nth(1) {
        Some(path) => {
            let json = std::fs::read_to_string(&path)
                .with_context(|| format!("failed to read spawn table {path}"))?;
            let table =
                SpawnTable::from_json(&json).context("failed to parse spawn table JSON")?;
            info!(records = table.records().len(), %path, "loaded spawn table");
            table
        }
        None => SpawnTable::session_default(),
    };

    demo_session(table);
    Ok(())
}

/// Run one session to its outcome with scripted input.
fn demo_session(table: SpawnTable) {
    info!("=== Starting Demo Session ===");

    let mut session = Session::new(SessionConfig::default(), table, 12345);
    session.init();

    // Log the interesting events as they happen
    let event_count = Rc::new(RefCell::new(0usize));
    for topic in [
        EventTopic::StateChange,
        EventTopic::Start,
        EventTopic::Jump,
        EventTopic::Hit,
        EventTopic::Collect,
        EventTopic::Win,
        EventTopic::Lose,
        EventTopic::TutorialComplete,
        EventTopic::CrossedFinish,
    ] {
        let counter = Rc::clone(&event_count);
        session.on(topic, move |event| {
            *counter.borrow_mut() += 1;
            info!(?event, "event");
        });
    }

    let frame_ms = 1000.0 / NOMINAL_FRAME_RATE as f32;
    let mut frame: u64 = 0;

    // First tap starts the run
    session.handle_tap();

    while !session.state().is_terminal() && frame < 100_000 {
        frame += 1;

        // Scripted input: dismiss the tutorial pause immediately, and once
        // jumping is unlocked attempt a jump every 75 frames (~1.25 s)
        match session.state() {
            SessionState::Paused => session.handle_tap(),
            SessionState::Running if frame % 75 == 0 => session.handle_tap(),
            _ => {}
        }

        session.update(frame_ms);

        if frame % 600 == 0 {
            info!(
                frame,
                state = ?session.state(),
                score = session.score(),
                health = session.health(),
                distance = session.distance_traveled(),
                entities = session.registry().active_count(),
                "progress"
            );
        }
    }

    info!("=== Session Results ===");
    info!(
        outcome = ?session.state(),
        score = session.score(),
        health = session.health(),
        distance = session.distance_traveled(),
        frames = frame,
        events = *event_count.borrow(),
        "final"
    );
}
