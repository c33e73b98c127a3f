//! Standings for round overviews and the final summary.
use serde::{Deserialize, Serialize};
use std::cmp::Reverse;

use crate::player::Player;

/// One player's totals at a point in time.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StandingEntry {
    pub player_id: u32,
    pub name: String,
    pub score: i64,
    pub money: i64,
    pub pets_alive: usize,
}

/// Scores of every player, in turn order.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Standings {
    pub entries: Vec<StandingEntry>,
}

/// A standings entry with its position. Tied scores share a rank.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RankedEntry {
    pub rank: usize,
    #[serde(flatten)]
    pub entry: StandingEntry,
}

impl Standings {
    #[must_use]
    pub fn from_players(players: &[Player]) -> Self {
        let entries = players
            .iter()
            .map(|player| StandingEntry {
                player_id: player.id,
                name: player.name.clone(),
                score: player.score,
                money: player.money,
                pets_alive: player.pets.iter().filter(|pet| pet.alive).count(),
            })
            .collect();
        Self { entries }
    }

    #[must_use]
    pub fn score_of(&self, player_id: u32) -> Option<i64> {
        self.entries
            .iter()
            .find(|entry| entry.player_id == player_id)
            .map(|entry| entry.score)
    }

    /// Score change since `previous`, for players present in both.
    #[must_use]
    pub fn delta_since(&self, previous: &Self, player_id: u32) -> Option<i64> {
        Some(self.score_of(player_id)? - previous.score_of(player_id)?)
    }

    /// Highest score first; ties keep turn order and share a rank.
    #[must_use]
    pub fn ranked(&self) -> Vec<RankedEntry> {
        let mut sorted: Vec<&StandingEntry> = self.entries.iter().collect();
        sorted.sort_by_key(|entry| Reverse(entry.score));

        let mut ranked: Vec<RankedEntry> = Vec::with_capacity(sorted.len());
        for (position, entry) in sorted.into_iter().enumerate() {
            let rank = match ranked.last() {
                Some(prev) if prev.entry.score == entry.score => prev.rank,
                _ => position + 1,
            };
            ranked.push(RankedEntry {
                rank,
                entry: entry.clone(),
            });
        }
        ranked
    }

    /// Every player sharing the top score.
    #[must_use]
    pub fn winners(&self) -> Vec<&StandingEntry> {
        let Some(best) = self.entries.iter().map(|entry| entry.score).max() else {
            return Vec::new();
        };
        self.entries
            .iter()
            .filter(|entry| entry.score == best)
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn entry(player_id: u32, score: i64) -> StandingEntry {
        StandingEntry {
            player_id,
            name: format!("P{player_id}"),
            score,
            money: 0,
            pets_alive: 1,
        }
    }

    #[test]
    fn ties_share_rank() {
        let standings = Standings {
            entries: vec![entry(1, 10), entry(2, 30), entry(3, 10), entry(4, 5)],
        };
        let ranks: Vec<(u32, usize)> = standings
            .ranked()
            .iter()
            .map(|ranked| (ranked.entry.player_id, ranked.rank))
            .collect();
        assert_eq!(ranks, vec![(2, 1), (1, 2), (3, 2), (4, 4)]);
        assert_eq!(standings.winners().len(), 1);
    }

    #[test]
    fn deltas_compare_matching_players() {
        let before = Standings {
            entries: vec![entry(1, 4)],
        };
        let after = Standings {
            entries: vec![entry(1, 19), entry(2, 3)],
        };
        assert_eq!(after.delta_since(&before, 1), Some(15));
        assert_eq!(after.delta_since(&before, 2), None);
        assert!(Standings::default().winners().is_empty());
    }
}
