//! Courts, tournament formats and the tournament configuration.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use uuid::Uuid;

/// Unique identifier for a court.
pub type CourtId = Uuid;

/// A court: an interchangeable slot within a round.
#[derive(Clone, Debug, Eq, PartialEq, Serialize, Deserialize)]
pub struct Court {
    pub id: CourtId,
    pub name: String,
    #[serde(default)]
    pub unavailable: bool,
    /// King of the Court: explicit rank bonus, overriding the position-based default.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub bonus: Option<i32>,
}

impl Court {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            id: Uuid::new_v4(),
            name: name.into(),
            unavailable: false,
            bonus: None,
        }
    }

    /// `count` available courts named "Court 1", "Court 2", ...
    pub fn numbered(count: usize) -> Vec<Court> {
        (1..=count).map(|i| Court::new(format!("Court {i}"))).collect()
    }
}

/// Every supported tournament format.
#[derive(Clone, Copy, Debug, Eq, Hash, Ord, PartialEq, PartialOrd, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum TournamentFormat {
    Americano,
    MixedAmericano,
    Mexicano,
    Mixicano,
    TeamAmericano,
    TeamMexicano,
    KingOfTheCourt,
    ClubRanked,
    ClubAmericano,
    ClubMexicano,
    ClubTeamAmericano,
    ClubTeamMexicano,
}

impl TournamentFormat {
    pub const ALL: [TournamentFormat; 12] = [
        TournamentFormat::Americano,
        TournamentFormat::MixedAmericano,
        TournamentFormat::Mexicano,
        TournamentFormat::Mixicano,
        TournamentFormat::TeamAmericano,
        TournamentFormat::TeamMexicano,
        TournamentFormat::KingOfTheCourt,
        TournamentFormat::ClubRanked,
        TournamentFormat::ClubAmericano,
        TournamentFormat::ClubMexicano,
        TournamentFormat::ClubTeamAmericano,
        TournamentFormat::ClubTeamMexicano,
    ];

    /// Kebab-case name, as used in serialized configs and on the command line.
    pub fn as_str(self) -> &'static str {
        match self {
            TournamentFormat::Americano => "americano",
            TournamentFormat::MixedAmericano => "mixed-americano",
            TournamentFormat::Mexicano => "mexicano",
            TournamentFormat::Mixicano => "mixicano",
            TournamentFormat::TeamAmericano => "team-americano",
            TournamentFormat::TeamMexicano => "team-mexicano",
            TournamentFormat::KingOfTheCourt => "king-of-the-court",
            TournamentFormat::ClubRanked => "club-ranked",
            TournamentFormat::ClubAmericano => "club-americano",
            TournamentFormat::ClubMexicano => "club-mexicano",
            TournamentFormat::ClubTeamAmericano => "club-team-americano",
            TournamentFormat::ClubTeamMexicano => "club-team-mexicano",
        }
    }

    /// Formats that need every player assigned to group A or B.
    pub fn uses_groups(self) -> bool {
        matches!(self, TournamentFormat::MixedAmericano | TournamentFormat::Mixicano)
    }

    /// Formats that need every player assigned to a club.
    pub fn uses_clubs(self) -> bool {
        matches!(
            self,
            TournamentFormat::ClubRanked
                | TournamentFormat::ClubAmericano
                | TournamentFormat::ClubMexicano
                | TournamentFormat::ClubTeamAmericano
                | TournamentFormat::ClubTeamMexicano
        )
    }
}

impl fmt::Display for TournamentFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for TournamentFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.trim().to_ascii_lowercase();
        TournamentFormat::ALL
            .into_iter()
            .find(|f| f.as_str() == wanted)
            .ok_or_else(|| format!("Unknown tournament format: {}", s))
    }
}

/// How teams of two facing clubs are matched within a fixture.
#[derive(Clone, Copy, Debug, Default, Eq, Hash, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MatchMode {
    /// Shuffle each club's teams before matching slot by slot.
    #[default]
    Random,
    /// Order each club's teams by accumulated points.
    Standings,
    /// Keep each club's teams in creation order.
    Slots,
}

impl FromStr for MatchMode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "random" => Ok(MatchMode::Random),
            "standings" => Ok(MatchMode::Standings),
            "slots" => Ok(MatchMode::Slots),
            other => Err(format!("Unknown match mode: {}", other)),
        }
    }
}

/// Tournament configuration chosen at setup.
#[derive(Clone, Debug, Eq, PartialEq, Serialize, Deserialize)]
pub struct TournamentConfig {
    pub format: TournamentFormat,
    pub points_per_match: i32,
    /// Ordered courts; for King of the Court the first available court is the king court.
    pub courts: Vec<Court>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_rounds: Option<usize>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub match_mode: Option<MatchMode>,
}

impl TournamentConfig {
    pub fn new(format: TournamentFormat, points_per_match: i32, courts: Vec<Court>) -> Self {
        Self {
            format,
            points_per_match,
            courts,
            max_rounds: None,
            match_mode: None,
        }
    }

    pub fn with_max_rounds(mut self, max_rounds: usize) -> Self {
        self.max_rounds = Some(max_rounds);
        self
    }

    pub fn with_match_mode(mut self, mode: MatchMode) -> Self {
        self.match_mode = Some(mode);
        self
    }

    /// Courts not marked unavailable, in configured order.
    pub fn available_courts(&self) -> Vec<&Court> {
        self.courts.iter().filter(|c| !c.unavailable).collect()
    }
}
