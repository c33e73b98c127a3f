//! Whole-session snapshots and their checksummed text envelope.
//!
//! A snapshot is a deep copy of the session, catalog included. Restoring one
//! validates everything up front; a rejected snapshot never touches the live
//! session.
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use std::collections::HashSet;
use std::fmt::Write as _;
use thiserror::Error;

use crate::constants::{MAX_ACTION_POINTS, MAX_PETS_PER_PLAYER, MAX_PLAYERS, SNAPSHOT_VERSION};
use crate::player::Player;
use crate::session::{GameSession, SessionState};

#[derive(Debug, Error)]
pub enum SnapshotError {
    #[error("snapshot version {found} does not match supported version {expected}")]
    VersionMismatch { found: u32, expected: u32 },
    #[error("snapshot is corrupt: {0}")]
    Corrupt(String),
    #[error("failed to encode snapshot: {0}")]
    Encode(#[source] serde_json::Error),
}

impl SnapshotError {
    fn corrupt(reason: impl Into<String>) -> Self {
        Self::Corrupt(reason.into())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionSnapshot {
    pub version: u32,
    pub catalog_fingerprint: u64,
    pub state: SessionState,
}

#[derive(Debug, Serialize, Deserialize)]
struct Envelope {
    checksum: String,
    payload: String,
}

impl GameSession {
    /// Deep copy of the whole session.
    #[must_use]
    pub fn capture_snapshot(&self) -> SessionSnapshot {
        let state = self.state();
        SessionSnapshot {
            version: SNAPSHOT_VERSION,
            catalog_fingerprint: state.catalog.fingerprint(),
            state,
        }
    }

    /// Rebuild a session from a snapshot.
    ///
    /// # Errors
    ///
    /// Returns [`SnapshotError::VersionMismatch`] for another format version
    /// and [`SnapshotError::Corrupt`] when the contents are inconsistent.
    pub fn from_snapshot(snapshot: SessionSnapshot) -> Result<Self, SnapshotError> {
        let active_index = validate(&snapshot)?;
        Ok(Self::from_parts(snapshot.state, active_index))
    }

    /// Replace this session with a snapshot. On error the session is unchanged.
    ///
    /// # Errors
    ///
    /// See [`GameSession::from_snapshot`].
    pub fn resume(&mut self, snapshot: SessionSnapshot) -> Result<(), SnapshotError> {
        let restored = Self::from_snapshot(snapshot).inspect_err(|err| {
            log::warn!("rejected snapshot: {err}");
        })?;
        *self = restored;
        log::info!(
            "resumed session on day {} of {}",
            self.current_day(),
            self.number_of_days()
        );
        Ok(())
    }
}

/// Check a snapshot and return the index of its active player.
fn validate(snapshot: &SessionSnapshot) -> Result<usize, SnapshotError> {
    if snapshot.version != SNAPSHOT_VERSION {
        return Err(SnapshotError::VersionMismatch {
            found: snapshot.version,
            expected: SNAPSHOT_VERSION,
        });
    }
    let state = &snapshot.state;
    if !state.catalog.is_consistent() {
        return Err(SnapshotError::corrupt("catalog entries do not match their keys"));
    }
    state
        .catalog
        .validate()
        .map_err(|err| SnapshotError::corrupt(err.to_string()))?;
    if state.catalog.fingerprint() != snapshot.catalog_fingerprint {
        return Err(SnapshotError::corrupt("catalog fingerprint mismatch"));
    }
    if state.players.is_empty() || state.players.len() > MAX_PLAYERS {
        return Err(SnapshotError::corrupt(format!(
            "player count {} out of range",
            state.players.len()
        )));
    }
    if state.number_of_days == 0 || !(1..=state.number_of_days).contains(&state.current_day) {
        return Err(SnapshotError::corrupt(format!(
            "day {} outside 1..={}",
            state.current_day, state.number_of_days
        )));
    }
    if state.income_per_turn < 0 {
        return Err(SnapshotError::corrupt("negative income"));
    }

    let mut ids = HashSet::new();
    let mut pet_ids = HashSet::new();
    for player in &state.players {
        if !ids.insert(player.id) {
            return Err(SnapshotError::corrupt(format!(
                "duplicate player id {}",
                player.id
            )));
        }
        validate_player(state, player)?;
        for pet in &player.pets {
            if !pet_ids.insert(pet.id) {
                return Err(SnapshotError::corrupt(format!("duplicate pet id {}", pet.id)));
            }
        }
    }

    let active_index = state
        .players
        .iter()
        .position(|player| player.id == state.active_player)
        .ok_or_else(|| {
            SnapshotError::corrupt(format!("active player {} not found", state.active_player))
        })?;
    if state.active_pet_index >= state.players[active_index].pets.len() {
        return Err(SnapshotError::corrupt("active pet index out of range"));
    }
    Ok(active_index)
}

fn validate_player(state: &SessionState, player: &Player) -> Result<(), SnapshotError> {
    if player.pets.is_empty() || player.pets.len() > MAX_PETS_PER_PLAYER {
        return Err(SnapshotError::corrupt(format!(
            "{} owns {} pets",
            player.name,
            player.pets.len()
        )));
    }
    for pet in &player.pets {
        if !pet.stats.in_bounds() || pet.action_points > MAX_ACTION_POINTS {
            return Err(SnapshotError::corrupt(format!(
                "pet '{}' has out-of-range stats",
                pet.name
            )));
        }
        if state.catalog.species(&pet.species.name) != Some(&pet.species) {
            return Err(SnapshotError::corrupt(format!(
                "pet '{}' has unknown species '{}'",
                pet.name, pet.species.name
            )));
        }
    }
    if !player.inventory.is_well_formed() {
        return Err(SnapshotError::corrupt(format!(
            "{} has empty inventory entries",
            player.name
        )));
    }
    for food in player.inventory.food_names() {
        if state.catalog.food(food).is_none() {
            return Err(SnapshotError::corrupt(format!("unknown food '{food}'")));
        }
    }
    for toy in player.inventory.toys() {
        if state.catalog.toy(toy.name()) != Some(&toy.kind) {
            return Err(SnapshotError::corrupt(format!(
                "toy '{}' does not match the catalog",
                toy.name()
            )));
        }
        if toy.remaining_uses > toy.kind.durability {
            return Err(SnapshotError::corrupt(format!(
                "toy '{}' has {} uses left of {}",
                toy.name(),
                toy.remaining_uses,
                toy.kind.durability
            )));
        }
    }
    Ok(())
}

fn checksum(payload: &str) -> String {
    Sha256::digest(payload.as_bytes())
        .iter()
        .fold(String::with_capacity(64), |mut hex, byte| {
            let _ = write!(hex, "{byte:02x}");
            hex
        })
}

/// Serialize a snapshot into a checksummed JSON envelope.
///
/// # Errors
///
/// Returns [`SnapshotError::Encode`] if serialization fails.
pub fn encode(snapshot: &SessionSnapshot) -> Result<String, SnapshotError> {
    let payload = serde_json::to_string(snapshot).map_err(SnapshotError::Encode)?;
    let envelope = Envelope {
        checksum: checksum(&payload),
        payload,
    };
    serde_json::to_string_pretty(&envelope).map_err(SnapshotError::Encode)
}

/// Parse a checksummed envelope back into a snapshot.
///
/// The version is read before the rest of the payload so that snapshots from
/// another format surface as [`SnapshotError::VersionMismatch`].
///
/// # Errors
///
/// Returns [`SnapshotError::Corrupt`] for malformed text or a checksum
/// mismatch, and [`SnapshotError::VersionMismatch`] for another version.
pub fn decode(text: &str) -> Result<SessionSnapshot, SnapshotError> {
    let envelope: Envelope = serde_json::from_str(text)
        .map_err(|err| SnapshotError::corrupt(format!("unreadable envelope: {err}")))?;
    if checksum(&envelope.payload) != envelope.checksum {
        return Err(SnapshotError::corrupt("checksum mismatch"));
    }
    let value: serde_json::Value = serde_json::from_str(&envelope.payload)
        .map_err(|err| SnapshotError::corrupt(format!("unreadable payload: {err}")))?;
    let found = value
        .get("version")
        .and_then(serde_json::Value::as_u64)
        .ok_or_else(|| SnapshotError::corrupt("missing version"))?;
    if found != u64::from(SNAPSHOT_VERSION) {
        return Err(SnapshotError::VersionMismatch {
            found: u32::try_from(found).unwrap_or(u32::MAX),
            expected: SNAPSHOT_VERSION,
        });
    }
    serde_json::from_value(value)
        .map_err(|err| SnapshotError::corrupt(format!("invalid payload: {err}")))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::Catalog;
    use crate::session::{PetSetup, PlayerSetup, SessionConfig};

    fn session() -> GameSession {
        let setups = vec![
            PlayerSetup::new("Alice", vec![PetSetup::new("Tom", "Cat")]),
            PlayerSetup::new("Bob", vec![PetSetup::new("Rex", "Dog")]),
        ];
        GameSession::initialise(
            Catalog::load_from_static(),
            &setups,
            &SessionConfig::default().with_seed(11),
        )
        .unwrap()
    }

    #[test]
    fn envelope_roundtrip_keeps_snapshot() {
        let mut session = session();
        session.buy_food("Kibble").unwrap();
        session.end_turn().unwrap();
        let snapshot = session.capture_snapshot();
        let text = encode(&snapshot).unwrap();
        assert_eq!(decode(&text).unwrap(), snapshot);
    }

    #[test]
    fn tampered_payload_fails_checksum() {
        let text = encode(&session().capture_snapshot()).unwrap();
        let mut envelope: Envelope = serde_json::from_str(&text).unwrap();
        envelope.payload = envelope.payload.replace("\"money\":100", "\"money\":9999");
        let tampered = serde_json::to_string(&envelope).unwrap();
        assert!(matches!(decode(&tampered), Err(SnapshotError::Corrupt(_))));
        assert!(matches!(decode("not json"), Err(SnapshotError::Corrupt(_))));
    }

    #[test]
    fn future_versions_are_refused() {
        let mut snapshot = session().capture_snapshot();
        snapshot.version = SNAPSHOT_VERSION + 1;
        let text = encode(&snapshot).unwrap();
        assert!(matches!(
            decode(&text),
            Err(SnapshotError::VersionMismatch { found, .. }) if found == SNAPSHOT_VERSION + 1
        ));
        assert!(matches!(
            GameSession::from_snapshot(snapshot),
            Err(SnapshotError::VersionMismatch { .. })
        ));
    }

    #[test]
    fn inconsistent_snapshots_are_corrupt() {
        let base = session().capture_snapshot();

        let mut missing_player = base.clone();
        missing_player.state.active_player = 99;
        assert!(matches!(
            GameSession::from_snapshot(missing_player),
            Err(SnapshotError::Corrupt(_))
        ));

        let mut edited_catalog = base.clone();
        edited_catalog.state.catalog = Catalog::default();
        assert!(matches!(
            GameSession::from_snapshot(edited_catalog),
            Err(SnapshotError::Corrupt(_))
        ));

        let mut late = base.clone();
        late.state.current_day = late.state.number_of_days + 1;
        assert!(matches!(
            GameSession::from_snapshot(late),
            Err(SnapshotError::Corrupt(_))
        ));

        let mut wild = base;
        wild.state.players[0].pets[0].stats.hunger = 250;
        assert!(matches!(
            GameSession::from_snapshot(wild),
            Err(SnapshotError::Corrupt(_))
        ));
    }
}
