//! Match, score and round data structures for 2v2 padel games.

use crate::models::config::CourtId;
use crate::models::player::PlayerId;
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use uuid::Uuid;

/// Unique identifier for a match.
pub type MatchId = Uuid;

/// Unique identifier for a round.
pub type RoundId = Uuid;

/// One side of a match.
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Side {
    One,
    Two,
}

/// Points scored by each side.
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq, Serialize, Deserialize)]
pub struct MatchScore {
    pub team1_points: i32,
    pub team2_points: i32,
}

impl MatchScore {
    pub fn new(team1_points: i32, team2_points: i32) -> Self {
        Self {
            team1_points,
            team2_points,
        }
    }

    pub fn total(&self) -> i32 {
        self.team1_points + self.team2_points
    }

    /// The winning side, or None for a draw.
    pub fn winner(&self) -> Option<Side> {
        match self.team1_points.cmp(&self.team2_points) {
            Ordering::Greater => Some(Side::One),
            Ordering::Less => Some(Side::Two),
            Ordering::Equal => None,
        }
    }
}

/// A single 2v2 match on one court.
#[derive(Clone, Debug, Eq, PartialEq, Serialize, Deserialize)]
pub struct Match {
    pub id: MatchId,
    pub court_id: CourtId,
    pub team1: [PlayerId; 2],
    pub team2: [PlayerId; 2],
    /// None until the match is played.
    #[serde(default)]
    pub score: Option<MatchScore>,
}

impl Match {
    pub fn new(id: MatchId, court_id: CourtId, team1: [PlayerId; 2], team2: [PlayerId; 2]) -> Self {
        Self {
            id,
            court_id,
            team1,
            team2,
            score: None,
        }
    }

    /// All four players, team 1 first.
    pub fn players(&self) -> [PlayerId; 4] {
        [self.team1[0], self.team1[1], self.team2[0], self.team2[1]]
    }

    pub fn contains(&self, player_id: PlayerId) -> bool {
        self.players().contains(&player_id)
    }
}

/// One round: matches played simultaneously plus the players sitting out.
#[derive(Clone, Debug, Eq, PartialEq, Serialize, Deserialize)]
pub struct Round {
    pub id: RoundId,
    /// 1-based, contiguous.
    pub round_number: usize,
    pub matches: Vec<Match>,
    pub sit_outs: Vec<PlayerId>,
}

impl Round {
    /// Everyone on a court this round.
    pub fn participants(&self) -> Vec<PlayerId> {
        self.matches.iter().flat_map(|m| m.players()).collect()
    }

    pub fn is_fully_scored(&self) -> bool {
        self.matches.iter().all(|m| m.score.is_some())
    }
}
