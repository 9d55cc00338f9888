//! Player, Team and Club data structures.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Unique identifier for a player (used in matches and lookups).
pub type PlayerId = Uuid;

/// Unique identifier for a fixed team.
pub type TeamId = Uuid;

/// Unique identifier for a club.
pub type ClubId = Uuid;

/// Group label used by the mixed formats (partners always come from different groups).
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq, Serialize, Deserialize)]
pub enum Group {
    A,
    B,
}

/// A player in the tournament.
#[derive(Clone, Debug, Eq, PartialEq, Serialize, Deserialize)]
pub struct Player {
    pub id: PlayerId,
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub group: Option<Group>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub club_id: Option<ClubId>,
    /// Unavailable players keep their history but are left out of new rounds.
    #[serde(default)]
    pub unavailable: bool,
}

impl Player {
    /// Create a new available player with the given name.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            id: Uuid::new_v4(),
            name: name.into(),
            group: None,
            club_id: None,
            unavailable: false,
        }
    }

    pub fn with_group(mut self, group: Group) -> Self {
        self.group = Some(group);
        self
    }

    pub fn with_club(mut self, club_id: ClubId) -> Self {
        self.club_id = Some(club_id);
        self
    }

    pub fn is_available(&self) -> bool {
        !self.unavailable
    }
}

/// A fixed partnership that plays every match together.
#[derive(Clone, Debug, Eq, PartialEq, Serialize, Deserialize)]
pub struct Team {
    pub id: TeamId,
    pub player1_id: PlayerId,
    pub player2_id: PlayerId,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
}

impl Team {
    pub fn new(player1_id: PlayerId, player2_id: PlayerId) -> Self {
        Self {
            id: Uuid::new_v4(),
            player1_id,
            player2_id,
            name: None,
        }
    }

    pub fn named(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    pub fn player_ids(&self) -> [PlayerId; 2] {
        [self.player1_id, self.player2_id]
    }

    pub fn contains(&self, player_id: PlayerId) -> bool {
        self.player1_id == player_id || self.player2_id == player_id
    }

    /// True when the match side consists of exactly this team's two players, in any order.
    pub fn is_side(&self, side: &[PlayerId; 2]) -> bool {
        self.contains(side[0]) && self.contains(side[1]) && side[0] != side[1]
    }
}

/// A club: players of the same club partner each other and face other clubs.
#[derive(Clone, Debug, Eq, PartialEq, Serialize, Deserialize)]
pub struct Club {
    pub id: ClubId,
    pub name: String,
}

impl Club {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            id: Uuid::new_v4(),
            name: name.into(),
        }
    }
}
