//! Scheduling and standings logic: fairness primitives, one module per format family.

mod americano;
mod analysis;
mod club;
mod club_mexicano;
pub mod fixtures;
mod king_of_the_court;
mod mexicano;
pub mod partition;
pub mod shared;
pub mod standings;
mod team;
pub mod validation;

pub use americano::{Americano, MixedAmericano};
pub use analysis::ScheduleStats;
pub use club::{club_fixtures, club_teams, match_fixture_pairs, ClubAmericano, ClubFixture, ClubRanked, ClubTeamAmericano, ClubTeamMexicano};
pub use club_mexicano::ClubMexicano;
pub use fixtures::{default_club_rounds, round_robin};
pub use king_of_the_court::{court_bonuses, king_of_the_court_standings, KingOfTheCourt};
pub use mexicano::{Mexicano, Mixicano};
pub use shared::{partner_key, select_sit_outs, team_key, SchedulingState, SitOutSelection};
pub use standings::{
    calculate_club_standings, calculate_competitor_standings, calculate_individual_standings,
    calculate_roster_standings, calculate_team_standings,
};
pub use team::{TeamAmericano, TeamMexicano};
