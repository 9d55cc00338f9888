//! The per-format strategy interface, its options/result types and the registry.

use crate::logic::{
    Americano, ClubAmericano, ClubMexicano, ClubRanked, ClubTeamAmericano, ClubTeamMexicano,
    KingOfTheCourt, Mexicano, MixedAmericano, Mixicano, TeamAmericano, TeamMexicano,
};
use crate::logic::validation::common_validate_score;
use crate::models::{
    Competitor, MatchScore, Player, PlayerId, Round, StandingsEntry, Tournament, TournamentConfig,
    TournamentError, TournamentFormat,
};
use rand::RngCore;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::time::Duration;

/// Generated rounds plus non-blocking advisories. Empty `rounds` with a
/// warning means a generation precondition was not met.
#[derive(Clone, Debug, Default, Eq, PartialEq, Serialize, Deserialize)]
pub struct ScheduleResult {
    pub rounds: Vec<Round>,
    pub warnings: Vec<String>,
}

impl ScheduleResult {
    /// No rounds, one explanatory warning.
    pub fn not_ready(warning: impl Into<String>) -> Self {
        let warning = warning.into();
        log::warn!("Schedule not generated: {}", warning);
        Self {
            rounds: Vec::new(),
            warnings: vec![warning],
        }
    }
}

/// Optional inputs to schedule generation.
#[derive(Clone, Copy, Debug, Default)]
pub struct ScheduleOptions<'a> {
    /// Needed by formats that read teams or clubs.
    pub tournament: Option<&'a Tournament>,
    /// Players to leave out of the generated rounds.
    pub exclude_player_ids: &'a [PlayerId],
    /// Reserved; generation is bounded by attempt budgets.
    pub time_budget: Option<Duration>,
}

impl<'a> ScheduleOptions<'a> {
    pub fn for_tournament(tournament: &'a Tournament) -> Self {
        Self {
            tournament: Some(tournament),
            ..Self::default()
        }
    }

    pub fn excluding(mut self, ids: &'a [PlayerId]) -> Self {
        self.exclude_player_ids = ids;
        self
    }
}

/// One implementation per tournament format.
pub trait TournamentStrategy: Send + Sync {
    fn format(&self) -> TournamentFormat;

    /// Dynamic formats produce one round at a time from the results so far.
    fn is_dynamic(&self) -> bool;

    /// Fixed-partner formats rank teams rather than players.
    fn has_fixed_partners(&self) -> bool {
        false
    }

    fn validate_setup(&self, players: &[Player], config: &TournamentConfig) -> Vec<String>;

    fn validate_warnings(&self, _players: &[Player], _config: &TournamentConfig) -> Vec<String> {
        Vec::new()
    }

    fn validate_score(&self, score: &MatchScore, config: &TournamentConfig) -> Option<String> {
        common_validate_score(score, config)
    }

    /// Round 1 for dynamic formats, the full schedule otherwise.
    fn generate_schedule(
        &self,
        players: &[Player],
        config: &TournamentConfig,
        options: &ScheduleOptions<'_>,
        rng: &mut dyn RngCore,
    ) -> ScheduleResult;

    /// `count` more rounds continuing `existing_rounds`.
    fn generate_additional_rounds(
        &self,
        players: &[Player],
        config: &TournamentConfig,
        existing_rounds: &[Round],
        count: usize,
        options: &ScheduleOptions<'_>,
        rng: &mut dyn RngCore,
    ) -> ScheduleResult;

    fn calculate_standings(&self, tournament: &Tournament) -> Vec<StandingsEntry>;

    fn get_competitors(&self, tournament: &Tournament) -> Vec<Competitor>;
}

impl TournamentFormat {
    /// The built-in strategy for this format.
    pub fn strategy(self) -> &'static dyn TournamentStrategy {
        match self {
            TournamentFormat::Americano => &Americano,
            TournamentFormat::MixedAmericano => &MixedAmericano,
            TournamentFormat::Mexicano => &Mexicano,
            TournamentFormat::Mixicano => &Mixicano,
            TournamentFormat::TeamAmericano => &TeamAmericano,
            TournamentFormat::TeamMexicano => &TeamMexicano,
            TournamentFormat::KingOfTheCourt => &KingOfTheCourt,
            TournamentFormat::ClubRanked => &ClubRanked,
            TournamentFormat::ClubAmericano => &ClubAmericano,
            TournamentFormat::ClubMexicano => &ClubMexicano,
            TournamentFormat::ClubTeamAmericano => &ClubTeamAmericano,
            TournamentFormat::ClubTeamMexicano => &ClubTeamMexicano,
        }
    }
}

/// Strategies looked up by format at runtime.
pub struct StrategyRegistry {
    strategies: HashMap<TournamentFormat, Box<dyn TournamentStrategy>>,
}

impl StrategyRegistry {
    /// An empty registry.
    pub fn new() -> Self {
        Self {
            strategies: HashMap::new(),
        }
    }

    /// Register (or replace) the strategy for `format`.
    pub fn register(&mut self, format: TournamentFormat, strategy: Box<dyn TournamentStrategy>) {
        self.strategies.insert(format, strategy);
    }

    /// Fails when nothing was registered for `format`.
    pub fn get(&self, format: TournamentFormat) -> Result<&dyn TournamentStrategy, TournamentError> {
        self.strategies
            .get(&format)
            .map(|s| s.as_ref())
            .ok_or(TournamentError::UnknownFormat(format))
    }

    /// Registered formats in declaration order.
    pub fn formats(&self) -> Vec<TournamentFormat> {
        let mut formats: Vec<TournamentFormat> = self.strategies.keys().copied().collect();
        formats.sort();
        formats
    }
}

impl Default for StrategyRegistry {
    /// Every built-in format.
    fn default() -> Self {
        let mut registry = Self::new();
        registry.register(TournamentFormat::Americano, Box::new(Americano));
        registry.register(TournamentFormat::MixedAmericano, Box::new(MixedAmericano));
        registry.register(TournamentFormat::Mexicano, Box::new(Mexicano));
        registry.register(TournamentFormat::Mixicano, Box::new(Mixicano));
        registry.register(TournamentFormat::TeamAmericano, Box::new(TeamAmericano));
        registry.register(TournamentFormat::TeamMexicano, Box::new(TeamMexicano));
        registry.register(TournamentFormat::KingOfTheCourt, Box::new(KingOfTheCourt));
        registry.register(TournamentFormat::ClubRanked, Box::new(ClubRanked));
        registry.register(TournamentFormat::ClubAmericano, Box::new(ClubAmericano));
        registry.register(TournamentFormat::ClubMexicano, Box::new(ClubMexicano));
        registry.register(TournamentFormat::ClubTeamAmericano, Box::new(ClubTeamAmericano));
        registry.register(TournamentFormat::ClubTeamMexicano, Box::new(ClubTeamMexicano));
        registry
    }
}
