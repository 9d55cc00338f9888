//! Competitor and standings views.

use crate::models::player::{ClubId, PlayerId};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// The unit ranked in standings: one player, or one fixed team.
#[derive(Clone, Debug, Eq, PartialEq, Serialize, Deserialize)]
pub struct Competitor {
    /// Player id for individual formats, team id for team formats.
    pub id: Uuid,
    pub name: String,
    pub player_ids: Vec<PlayerId>,
}

/// One row of the standings table.
#[derive(Clone, Debug, Default, Eq, PartialEq, Serialize, Deserialize)]
pub struct StandingsEntry {
    /// Competitor id (a player or a team).
    pub player_id: Uuid,
    pub player_name: String,
    pub total_points: i32,
    pub matches_played: u32,
    pub matches_won: u32,
    pub matches_lost: u32,
    pub matches_draw: u32,
    pub point_diff: i32,
    /// 1-based; tied entries share a rank.
    pub rank: usize,
}

/// Aggregated points per club.
#[derive(Clone, Debug, Eq, PartialEq, Serialize, Deserialize)]
pub struct ClubStandingsEntry {
    pub club_id: ClubId,
    pub club_name: String,
    pub total_points: i32,
    pub member_count: usize,
    pub rank: usize,
}
