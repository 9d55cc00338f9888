//! Fairness summary of a generated schedule.

use crate::logic::shared::SchedulingState;
use crate::models::{CourtId, Player, Round};
use serde::Serialize;
use std::collections::BTreeSet;

/// Spread of games, sit-outs, partners, opponents and courts over a schedule.
#[derive(Clone, Debug, Default, Eq, PartialEq, Serialize)]
pub struct ScheduleStats {
    pub rounds: usize,
    pub games_min: u32,
    pub games_max: u32,
    pub sit_outs_min: u32,
    pub sit_outs_max: u32,
    /// Partnerships beyond the first, summed over all pairs.
    pub partner_repeats: u32,
    /// Over pairs that faced each other at least once.
    pub opponent_min: u32,
    pub opponent_max: u32,
    /// Largest per-player gap between their most and least used court.
    pub court_spread: u32,
}

impl ScheduleStats {
    pub fn analyze(players: &[Player], rounds: &[Round]) -> Self {
        let state = SchedulingState::seed_from_rounds(rounds, players);

        let games: Vec<u32> = players.iter().map(|p| state.games(p.id)).collect();
        let sit_outs: Vec<u32> = players
            .iter()
            .map(|p| rounds.iter().filter(|r| r.sit_outs.contains(&p.id)).count() as u32)
            .collect();
        let partner_repeats = state.partner_counts.values().map(|&n| n.saturating_sub(1)).sum();
        let opponents: Vec<u32> = state.opponent_counts.values().copied().filter(|&n| n > 0).collect();

        let courts: BTreeSet<CourtId> = rounds
            .iter()
            .flat_map(|r| r.matches.iter().map(|m| m.court_id))
            .collect();
        let court_spread = players
            .iter()
            .map(|p| {
                let uses: Vec<u32> = courts
                    .iter()
                    .map(|&c| state.court_counts.get(&(p.id, c)).copied().unwrap_or(0))
                    .collect();
                spread(&uses)
            })
            .max()
            .unwrap_or(0);

        ScheduleStats {
            rounds: rounds.len(),
            games_min: games.iter().copied().min().unwrap_or(0),
            games_max: games.iter().copied().max().unwrap_or(0),
            sit_outs_min: sit_outs.iter().copied().min().unwrap_or(0),
            sit_outs_max: sit_outs.iter().copied().max().unwrap_or(0),
            partner_repeats,
            opponent_min: opponents.iter().copied().min().unwrap_or(0),
            opponent_max: opponents.iter().copied().max().unwrap_or(0),
            court_spread,
        }
    }

    pub fn games_spread(&self) -> u32 {
        self.games_max - self.games_min
    }

    pub fn sit_out_spread(&self) -> u32 {
        self.sit_outs_max - self.sit_outs_min
    }

    pub fn opponent_spread(&self) -> u32 {
        self.opponent_max - self.opponent_min
    }
}

fn spread(values: &[u32]) -> u32 {
    match (values.iter().min(), values.iter().max()) {
        (Some(lo), Some(hi)) => hi - lo,
        _ => 0,
    }
}
