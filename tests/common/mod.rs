//! Shared builders for the integration tests.
#![allow(dead_code)]

use padel_planner::{
    Club, Court, Group, MatchScore, Player, PlayerId, Round, Team, Tournament, TournamentConfig,
    TournamentFormat,
};
use rand::rngs::StdRng;
use rand::SeedableRng;
use std::collections::HashSet;

pub fn rng(seed: u64) -> StdRng {
    StdRng::seed_from_u64(seed)
}

pub fn players(n: usize) -> Vec<Player> {
    (0..n).map(|i| Player::new(format!("P{i}"))).collect()
}

/// `a` players in group A followed by `b` players in group B.
pub fn grouped_players(a: usize, b: usize) -> Vec<Player> {
    (0..a)
        .map(|i| Player::new(format!("A{i}")).with_group(Group::A))
        .chain((0..b).map(|i| Player::new(format!("B{i}")).with_group(Group::B)))
        .collect()
}

pub fn config(format: TournamentFormat, courts: usize, points: i32) -> TournamentConfig {
    TournamentConfig::new(format, points, Court::numbered(courts))
}

pub fn tournament_with_players(format: TournamentFormat, n: usize, courts: usize) -> Tournament {
    Tournament::with_players("Test", config(format, courts, 24), players(n))
}

/// `n` players paired into teams in roster order.
pub fn team_tournament(format: TournamentFormat, n: usize, courts: usize) -> Tournament {
    let mut t = tournament_with_players(format, n, courts);
    t.teams = t
        .players
        .chunks_exact(2)
        .map(|pair| Team::new(pair[0].id, pair[1].id))
        .collect();
    t
}

/// `clubs` clubs of `per_club` players each; consecutive members form teams.
pub fn club_tournament(format: TournamentFormat, clubs: usize, per_club: usize, courts: usize) -> Tournament {
    let club_list: Vec<Club> = (0..clubs).map(|i| Club::new(format!("Club {i}"))).collect();
    let mut roster = Vec::new();
    let mut teams = Vec::new();
    for club in &club_list {
        let members: Vec<Player> = (0..per_club)
            .map(|i| Player::new(format!("{} P{i}", club.name)).with_club(club.id))
            .collect();
        teams.extend(members.chunks_exact(2).map(|pair| Team::new(pair[0].id, pair[1].id)));
        roster.extend(members);
    }
    let mut t = Tournament::with_players("Clubs", config(format, courts, 24), roster);
    t.clubs = club_list;
    t.teams = teams;
    t
}

pub fn ids(players: &[Player]) -> Vec<PlayerId> {
    players.iter().map(|p| p.id).collect()
}

/// Sit-outs and match participants are disjoint and together cover `active` exactly once.
pub fn assert_round_covers(round: &Round, active: &[PlayerId]) {
    let mut seen: Vec<PlayerId> = round.participants();
    seen.extend(round.sit_outs.iter().copied());
    let unique: HashSet<PlayerId> = seen.iter().copied().collect();
    assert_eq!(unique.len(), seen.len(), "round {} lists a player twice", round.round_number);
    let expected: HashSet<PlayerId> = active.iter().copied().collect();
    assert_eq!(unique, expected, "round {} does not cover the active players", round.round_number);
}

/// Score every match of `round` in the tournament with `score`.
pub fn score_round(t: &mut Tournament, round_index: usize, score: MatchScore) {
    let match_ids: Vec<_> = t.rounds[round_index].matches.iter().map(|m| m.id).collect();
    for id in match_ids {
        t.set_score(id, score).unwrap();
    }
}
