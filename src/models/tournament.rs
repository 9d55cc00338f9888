//! Tournament aggregate, TournamentPhase and TournamentError.

use crate::models::config::{TournamentConfig, TournamentFormat};
use crate::models::game::{MatchId, MatchScore, Round};
use crate::models::player::{Club, Player, PlayerId, Team};
use crate::models::standings::StandingsEntry;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use uuid::Uuid;

/// Errors that can occur during tournament operations.
#[derive(Clone, Debug, Eq, PartialEq)]
pub enum TournamentError {
    /// No strategy is registered for this format.
    UnknownFormat(TournamentFormat),
    /// Tournament is not in a phase that allows this action.
    InvalidState,
    /// Player not found in the roster.
    PlayerNotFound(PlayerId),
    /// Match not found in any round.
    MatchNotFound(MatchId),
    /// A player with this name already exists (names are unique, case-insensitive).
    DuplicatePlayerName,
    /// Player names must not be blank.
    EmptyPlayerName,
    /// The score was rejected by the format's score validation.
    InvalidScore(String),
}

impl std::fmt::Display for TournamentError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            TournamentError::UnknownFormat(format) => write!(f, "Unknown tournament format: {}", format),
            TournamentError::InvalidState => write!(f, "Invalid state for this action"),
            TournamentError::PlayerNotFound(_) => write!(f, "Player not found"),
            TournamentError::MatchNotFound(_) => write!(f, "Match not found"),
            TournamentError::DuplicatePlayerName => write!(f, "A player with this name already exists"),
            TournamentError::EmptyPlayerName => write!(f, "Player name cannot be empty"),
            TournamentError::InvalidScore(reason) => write!(f, "{}", reason),
        }
    }
}

impl std::error::Error for TournamentError {}

/// Unique identifier for a tournament.
pub type TournamentId = Uuid;

/// Lifecycle phase of the tournament.
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum TournamentPhase {
    /// Editing roster and configuration; no rounds yet.
    #[default]
    Setup,
    InProgress,
    Completed,
}

/// Full tournament: configuration, roster and the rounds generated so far.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Tournament {
    pub id: TournamentId,
    pub name: String,
    pub config: TournamentConfig,
    pub phase: TournamentPhase,
    pub players: Vec<Player>,
    #[serde(default)]
    pub teams: Vec<Team>,
    #[serde(default)]
    pub clubs: Vec<Club>,
    #[serde(default)]
    pub rounds: Vec<Round>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Tournament {
    /// Create a new tournament in Setup with no players.
    pub fn new(name: impl Into<String>, config: TournamentConfig) -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::new_v4(),
            name: name.into(),
            config,
            phase: TournamentPhase::Setup,
            players: Vec::new(),
            teams: Vec::new(),
            clubs: Vec::new(),
            rounds: Vec::new(),
            created_at: now,
            updated_at: now,
        }
    }

    /// Create a tournament with an initial roster. Still in Setup until rounds are appended.
    pub fn with_players(name: impl Into<String>, config: TournamentConfig, players: Vec<Player>) -> Self {
        Self {
            players,
            ..Self::new(name, config)
        }
    }

    /// Add a player (only valid in Setup). Names must be unique (case-insensitive).
    pub fn add_player(&mut self, name: impl Into<String>) -> Result<PlayerId, TournamentError> {
        if self.phase != TournamentPhase::Setup {
            return Err(TournamentError::InvalidState);
        }
        let name = name.into();
        let name_trimmed = name.trim();
        if name_trimmed.is_empty() {
            return Err(TournamentError::EmptyPlayerName);
        }
        let is_duplicate = self
            .players
            .iter()
            .any(|p| p.name.eq_ignore_ascii_case(name_trimmed));
        if is_duplicate {
            return Err(TournamentError::DuplicatePlayerName);
        }
        let player = Player::new(name_trimmed);
        let id = player.id;
        self.players.push(player);
        self.touch();
        Ok(id)
    }

    /// Remove a player by id (only valid in Setup). Teams containing the player go with them.
    pub fn remove_player(&mut self, player_id: PlayerId) -> Result<(), TournamentError> {
        if self.phase != TournamentPhase::Setup {
            return Err(TournamentError::InvalidState);
        }
        let idx = self
            .players
            .iter()
            .position(|p| p.id == player_id)
            .ok_or(TournamentError::PlayerNotFound(player_id))?;
        self.players.remove(idx);
        self.teams.retain(|t| !t.contains(player_id));
        self.touch();
        Ok(())
    }

    /// Mark a player (un)available. Allowed in any phase; history is kept.
    pub fn set_player_unavailable(&mut self, player_id: PlayerId, unavailable: bool) -> Result<(), TournamentError> {
        let p = self
            .players
            .iter_mut()
            .find(|p| p.id == player_id)
            .ok_or(TournamentError::PlayerNotFound(player_id))?;
        p.unavailable = unavailable;
        self.touch();
        Ok(())
    }

    pub fn player(&self, id: PlayerId) -> Option<&Player> {
        self.players.iter().find(|p| p.id == id)
    }

    /// Display name of a player, "?" when unknown.
    pub fn player_name(&self, id: PlayerId) -> &str {
        self.player(id).map(|p| p.name.as_str()).unwrap_or("?")
    }

    /// Team display name: explicit name or "<name1> & <name2>".
    pub fn team_name(&self, team: &Team) -> String {
        match &team.name {
            Some(name) => name.clone(),
            None => format!("{} & {}", self.player_name(team.player1_id), self.player_name(team.player2_id)),
        }
    }

    pub fn unavailable_player_ids(&self) -> HashSet<PlayerId> {
        self.players.iter().filter(|p| p.unavailable).map(|p| p.id).collect()
    }

    /// Available players, in roster order.
    pub fn active_players(&self) -> Vec<Player> {
        self.players.iter().filter(|p| p.is_available()).cloned().collect()
    }

    /// Teams whose two players are both available.
    pub fn active_teams(&self) -> Vec<&Team> {
        let unavailable = self.unavailable_player_ids();
        self.teams
            .iter()
            .filter(|t| !unavailable.contains(&t.player1_id) && !unavailable.contains(&t.player2_id))
            .collect()
    }

    /// Record a match score after checking it against the format's score rules.
    pub fn set_score(&mut self, match_id: MatchId, score: MatchScore) -> Result<(), TournamentError> {
        if let Some(reason) = self.config.format.strategy().validate_score(&score, &self.config) {
            return Err(TournamentError::InvalidScore(reason));
        }
        let m = self
            .rounds
            .iter_mut()
            .flat_map(|r| r.matches.iter_mut())
            .find(|m| m.id == match_id)
            .ok_or(TournamentError::MatchNotFound(match_id))?;
        m.score = Some(score);
        self.touch();
        Ok(())
    }

    /// Append generated rounds; the first append starts the tournament.
    pub fn append_rounds(&mut self, rounds: Vec<Round>) -> Result<(), TournamentError> {
        if self.phase == TournamentPhase::Completed {
            return Err(TournamentError::InvalidState);
        }
        if rounds.is_empty() {
            return Ok(());
        }
        self.rounds.extend(rounds);
        self.phase = TournamentPhase::InProgress;
        self.touch();
        Ok(())
    }

    /// Finish the tournament (only valid while in progress).
    pub fn complete(&mut self) -> Result<(), TournamentError> {
        if self.phase != TournamentPhase::InProgress {
            return Err(TournamentError::InvalidState);
        }
        self.phase = TournamentPhase::Completed;
        self.touch();
        Ok(())
    }

    /// Current standings according to the tournament's format.
    pub fn standings(&self) -> Vec<StandingsEntry> {
        self.config.format.strategy().calculate_standings(self)
    }

    fn touch(&mut self) {
        self.updated_at = Utc::now();
    }
}
