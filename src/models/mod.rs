//! Data structures for the padel planner: players, courts, matches, rounds, standings.

mod config;
mod game;
mod player;
mod standings;
mod tournament;

pub use config::{Court, CourtId, MatchMode, TournamentConfig, TournamentFormat};
pub use game::{Match, MatchId, MatchScore, Round, RoundId, Side};
pub use player::{Club, ClubId, Group, Player, PlayerId, Team, TeamId};
pub use standings::{ClubStandingsEntry, Competitor, StandingsEntry};
pub use tournament::{Tournament, TournamentError, TournamentId, TournamentPhase};
