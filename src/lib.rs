//! Padel tournament planner: schedules and standings for Americano, Mexicano,
//! King of the Court, team and club formats.

pub mod logic;
pub mod models;
pub mod strategy;

pub use logic::{
    calculate_club_standings, calculate_individual_standings, calculate_roster_standings,
    calculate_team_standings, round_robin, ScheduleStats,
};
pub use models::{
    Club, ClubId, ClubStandingsEntry, Competitor, Court, CourtId, Group, Match, MatchMode, MatchScore,
    Player, PlayerId, Round, StandingsEntry, Team, TeamId, Tournament, TournamentConfig,
    TournamentError, TournamentFormat, TournamentPhase,
};
pub use strategy::{ScheduleOptions, ScheduleResult, StrategyRegistry, TournamentStrategy};
