//! Spawn Scheduling
//!
//! An ordered table of spawn records keyed by travelled distance. One
//! distance unit equals a fixed reference width — not the live screen
//! width — so spacing is identical on every device. Each frame the
//! scheduler scans every unspawned record; it never stops at the first
//! unmet one, because a large frame delta can make several records due at
//! once (that is also what lets grouped records spawn together as a
//! vertical formation).

use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::warn;

/// What a spawn record instantiates.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SpawnKind {
    /// A collectible (kind/value rolled at spawn time)
    Collectible,
    /// An enemy
    Enemy,
    /// An obstacle
    Obstacle,
    /// The finish line (at most one per session)
    Finish,
}

/// One entry of the spawn table.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct SpawnRecord {
    /// What to create
    pub kind: SpawnKind,
    /// Travelled distance at which it becomes due, in screen-width units
    pub distance: f32,
    /// Vertical offset above the ground line, in pixels
    pub y_offset: f32,
    /// Flips false → true exactly once
    pub spawned: bool,
}

impl SpawnRecord {
    /// Create an unspawned record.
    pub const fn new(kind: SpawnKind, distance: f32, y_offset: f32) -> Self {
        Self { kind, distance, y_offset, spawned: false }
    }
}

/// Validation failure for a single loaded record.
#[derive(Debug, Error)]
pub enum SpawnRecordError {
    /// Record has no kind field.
    #[error("record {index} is missing its kind")]
    MissingKind {
        /// Position in the loaded table
        index: usize,
    },
    /// Record has no distance field.
    #[error("record {index} is missing its distance")]
    MissingDistance {
        /// Position in the loaded table
        index: usize,
    },
    /// Distance is NaN, infinite, or negative.
    #[error("record {index} has invalid distance {value}")]
    InvalidDistance {
        /// Position in the loaded table
        index: usize,
        /// The offending value
        value: f32,
    },
}

/// Lenient wire form of a record: every field optional so that one
/// malformed entry cannot poison the whole table.
#[derive(Debug, Deserialize)]
struct RawSpawnRecord {
    kind: Option<SpawnKind>,
    distance: Option<f32>,
    #[serde(default)]
    y_offset: f32,
}

impl RawSpawnRecord {
    fn validate(self, index: usize) -> Result<SpawnRecord, SpawnRecordError> {
        let kind = self.kind.ok_or(SpawnRecordError::MissingKind { index })?;
        let distance = self
            .distance
            .ok_or(SpawnRecordError::MissingDistance { index })?;
        if !distance.is_finite() || distance < 0.0 {
            return Err(SpawnRecordError::InvalidDistance { index, value: distance });
        }
        Ok(SpawnRecord::new(kind, distance, self.y_offset))
    }
}

/// A spawn that became due this frame.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct DueSpawn {
    /// What to instantiate
    pub kind: SpawnKind,
    /// Vertical offset above the ground line
    pub y_offset: f32,
}

/// The ordered spawn table for one session.
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct SpawnTable {
    records: Vec<SpawnRecord>,
}

impl SpawnTable {
    /// Build a table, sorting records by ascending distance. The sort is
    /// stable, so records sharing a distance keep their given order.
    pub fn new(mut records: Vec<SpawnRecord>) -> Self {
        records.sort_by(|a, b| a.distance.total_cmp(&b.distance));
        Self { records }
    }

    /// Parse a table from JSON, skipping malformed records.
    ///
    /// A record missing required fields (or carrying a non-finite or
    /// negative distance) is logged and dropped; the remaining records
    /// still form a valid table. Only a syntactically broken document is
    /// an error.
    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        let raw: Vec<RawSpawnRecord> = serde_json::from_str(json)?;
        let mut records = Vec::with_capacity(raw.len());
        for (index, entry) in raw.into_iter().enumerate() {
            match entry.validate(index) {
                Ok(record) => records.push(record),
                Err(err) => warn!(%err, "skipping malformed spawn record"),
            }
        }
        Ok(Self::new(records))
    }

    /// Records in iteration order.
    pub fn records(&self) -> &[SpawnRecord] {
        &self.records
    }

    /// Number of records not yet spawned.
    pub fn remaining(&self) -> usize {
        self.records.iter().filter(|r| !r.spawned).count()
    }

    /// Scan the whole table and mark every record whose threshold the
    /// travelled distance has reached. `threshold = distance * unit - unit`,
    /// so a record at distance 1.0 is due immediately: the first unit of
    /// travel is the approach from the off-screen spawn position.
    pub fn scan(&mut self, distance_traveled: f32, unit_width: f32) -> Vec<DueSpawn> {
        let mut due = Vec::new();
        for record in &mut self.records {
            if record.spawned {
                continue;
            }
            let threshold = record.distance * unit_width - unit_width;
            if distance_traveled >= threshold {
                record.spawned = true;
                due.push(DueSpawn { kind: record.kind, y_offset: record.y_offset });
            }
        }
        due
    }

    /// The built-in session table.
    ///
    /// Collectible distances and y-offsets reproduce the shipped level
    /// layout (grouped arcs at 4–4.8, 7.8–8.6, 11–11.4, 13.2–13.6 and
    /// 15.4–16.2); enemies, obstacles and the finish are interleaved
    /// between the groups, tutorial enemy first.
    pub fn session_default() -> Self {
        use SpawnKind::{Collectible, Enemy, Finish, Obstacle};

        let mut records = vec![
            SpawnRecord::new(Collectible, 1.0, 0.0),
            SpawnRecord::new(Collectible, 2.0, 0.0),
            // Arc of five
            SpawnRecord::new(Collectible, 4.0, 50.0),
            SpawnRecord::new(Collectible, 4.2, 150.0),
            SpawnRecord::new(Collectible, 4.4, 250.0),
            SpawnRecord::new(Collectible, 4.6, 150.0),
            SpawnRecord::new(Collectible, 4.8, 50.0),
            SpawnRecord::new(Collectible, 6.4, 0.0),
            SpawnRecord::new(Collectible, 7.6, 0.0),
            // Arc of five
            SpawnRecord::new(Collectible, 7.8, 100.0),
            SpawnRecord::new(Collectible, 8.0, 200.0),
            SpawnRecord::new(Collectible, 8.2, 280.0),
            SpawnRecord::new(Collectible, 8.4, 200.0),
            SpawnRecord::new(Collectible, 8.6, 100.0),
            SpawnRecord::new(Collectible, 9.6, 0.0),
            SpawnRecord::new(Collectible, 10.6, 0.0),
            // Arc of three
            SpawnRecord::new(Collectible, 11.0, 80.0),
            SpawnRecord::new(Collectible, 11.2, 180.0),
            SpawnRecord::new(Collectible, 11.4, 80.0),
            SpawnRecord::new(Collectible, 13.0, 0.0),
            // Arc of three
            SpawnRecord::new(Collectible, 13.2, 100.0),
            SpawnRecord::new(Collectible, 13.4, 200.0),
            SpawnRecord::new(Collectible, 13.6, 100.0),
            SpawnRecord::new(Collectible, 14.5, 0.0),
            // Arc of five
            SpawnRecord::new(Collectible, 15.4, 80.0),
            SpawnRecord::new(Collectible, 15.6, 180.0),
            SpawnRecord::new(Collectible, 15.8, 260.0),
            SpawnRecord::new(Collectible, 16.0, 180.0),
            SpawnRecord::new(Collectible, 16.2, 80.0),
        ];

        records.extend([
            // Tutorial enemy leads
            SpawnRecord::new(Enemy, 2.6, 0.0),
            SpawnRecord::new(Enemy, 5.6, 0.0),
            SpawnRecord::new(Enemy, 9.2, 0.0),
            SpawnRecord::new(Enemy, 12.4, 0.0),
            SpawnRecord::new(Enemy, 15.0, 0.0),
            SpawnRecord::new(Obstacle, 3.4, 0.0),
            SpawnRecord::new(Obstacle, 6.9, 0.0),
            SpawnRecord::new(Obstacle, 10.0, 0.0),
            SpawnRecord::new(Obstacle, 13.9, 0.0),
            SpawnRecord::new(Finish, 17.5, 0.0),
        ]);

        Self::new(records)
    }
}
