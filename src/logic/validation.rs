//! Setup, warning and score validation. Problems are plain-language strings
//! meant for direct display, never errors.

use crate::models::{ClubId, Group, MatchScore, Player, TournamentConfig};
use std::collections::HashMap;

/// Rules shared by the individual formats.
pub fn common_validate_setup(players: &[Player], config: &TournamentConfig) -> Vec<String> {
    let mut errors = Vec::new();
    if players.len() < 4 {
        errors.push("At least 4 players are required".to_string());
    }
    let courts = config.available_courts().len();
    if courts == 0 {
        errors.push("At least 1 court is required".to_string());
    }
    if config.points_per_match < 1 {
        errors.push("Points per match must be at least 1".to_string());
    }
    let max_courts = players.len() / 4;
    if players.len() >= 4 && courts > max_courts {
        errors.push(format!(
            "Too many courts: {} players need at most {} court(s)",
            players.len(),
            max_courts
        ));
    }
    errors
}

/// Both sides must be non-negative and add up to the configured points per match.
pub fn common_validate_score(score: &MatchScore, config: &TournamentConfig) -> Option<String> {
    if score.total() != config.points_per_match {
        return Some(format!("Total points must equal {}", config.points_per_match));
    }
    if score.team1_points < 0 || score.team2_points < 0 {
        return Some("Points cannot be negative".to_string());
    }
    None
}

fn count_groups(players: &[Player]) -> (usize, usize, usize) {
    let a = players.iter().filter(|p| p.group == Some(Group::A)).count();
    let b = players.iter().filter(|p| p.group == Some(Group::B)).count();
    (a, b, players.len() - a - b)
}

/// Rules for the cross-group formats. `equal_groups` additionally requires
/// both groups to have the same size.
pub fn group_validate_setup(players: &[Player], config: &TournamentConfig, equal_groups: bool) -> Vec<String> {
    let mut errors = Vec::new();
    if players.len() < 4 {
        errors.push("At least 4 players are required".to_string());
    }
    let courts = config.available_courts().len();
    if courts == 0 {
        errors.push("At least 1 court is required".to_string());
    }
    if config.points_per_match < 1 {
        errors.push("Points per match must be at least 1".to_string());
    }

    let (a, b, unassigned) = count_groups(players);
    if unassigned > 0 {
        errors.push(format!("{} player(s) have no group assigned", unassigned));
    }
    if a < 2 {
        errors.push("Group A needs at least 2 players".to_string());
    }
    if b < 2 {
        errors.push("Group B needs at least 2 players".to_string());
    }
    if equal_groups && a != b && unassigned == 0 {
        errors.push(format!("Groups must be equal size (Group A: {}, Group B: {})", a, b));
    }
    let max_courts = a.min(b) / 2;
    if a >= 2 && b >= 2 && courts > max_courts {
        errors.push(format!(
            "Too many courts: need at most {} court(s) for {}+{} players",
            max_courts, a, b
        ));
    }
    errors
}

/// Advisory for unequal groups in the mixed formats.
pub fn group_validate_warnings(players: &[Player]) -> Vec<String> {
    let (a, b, _) = count_groups(players);
    if a >= 2 && b >= 2 && a != b {
        vec![format!("Groups are unequal ({} vs {}), so there is less variety in matchups", a, b)]
    } else {
        Vec::new()
    }
}

/// Rules for the fixed-team formats; `format_name` appears in the parity message.
pub fn team_validate_setup(players: &[Player], config: &TournamentConfig, format_name: &str) -> Vec<String> {
    let mut errors = Vec::new();
    if players.len() < 4 {
        errors.push("At least 4 players are required".to_string());
    }
    if players.len() % 2 != 0 {
        errors.push(format!("{} requires an even number of players", format_name));
    }
    let courts = config.available_courts().len();
    if courts == 0 {
        errors.push("At least 1 court is required".to_string());
    }
    if config.points_per_match < 1 {
        errors.push("Points per match must be at least 1".to_string());
    }
    let teams = players.len() / 2;
    let max_courts = teams / 2;
    if teams >= 2 && courts > max_courts {
        errors.push(format!("Too many courts: {} teams need at most {} court(s)", teams, max_courts));
    }
    errors
}

pub const KING_OF_THE_COURT_MIN_PLAYERS: usize = 8;
pub const KING_OF_THE_COURT_MIN_COURTS: usize = 2;
pub const KING_OF_THE_COURT_MIN_POINTS: i32 = 12;

pub fn king_of_the_court_validate_setup(players: &[Player], config: &TournamentConfig) -> Vec<String> {
    let mut errors = common_validate_setup(players, config);
    if players.len() < KING_OF_THE_COURT_MIN_PLAYERS {
        errors.push(format!(
            "King of the Court requires at least {} players",
            KING_OF_THE_COURT_MIN_PLAYERS
        ));
    }
    if config.available_courts().len() < KING_OF_THE_COURT_MIN_COURTS {
        errors.push(format!(
            "King of the Court requires at least {} courts",
            KING_OF_THE_COURT_MIN_COURTS
        ));
    }
    if config.points_per_match < KING_OF_THE_COURT_MIN_POINTS {
        errors.push(format!(
            "King of the Court requires at least {} points per match",
            KING_OF_THE_COURT_MIN_POINTS
        ));
    }
    errors
}

/// Warns when more than a quarter of the players sit out each round.
pub fn king_of_the_court_validate_warnings(players: &[Player], config: &TournamentConfig) -> Vec<String> {
    let n = players.len();
    if n < KING_OF_THE_COURT_MIN_PLAYERS {
        return Vec::new();
    }
    let courts = config.available_courts().len().min(n / 4);
    let sit_outs = n - courts * 4;
    if sit_outs * 4 <= n {
        return Vec::new();
    }
    let pct = (sit_outs as f64 * 100.0 / n as f64).round() as usize;
    vec![format!(
        "{} of {} players ({}%) will sit out each round; consider adding a court",
        sit_outs, n, pct
    )]
}

fn club_sizes(players: &[Player]) -> (Vec<(ClubId, usize)>, usize) {
    let mut order: Vec<ClubId> = Vec::new();
    let mut counts: HashMap<ClubId, usize> = HashMap::new();
    let mut unassigned = 0;
    for p in players {
        match p.club_id {
            Some(club) => {
                let c = counts.entry(club).or_insert(0);
                if *c == 0 {
                    order.push(club);
                }
                *c += 1;
            }
            None => unassigned += 1,
        }
    }
    let sizes = order.into_iter().map(|c| (c, counts[&c])).collect();
    (sizes, unassigned)
}

pub fn club_validate_setup(players: &[Player], config: &TournamentConfig) -> Vec<String> {
    let mut errors = Vec::new();
    if config.available_courts().is_empty() {
        errors.push("At least 1 court is required".to_string());
    }
    if config.points_per_match < 1 {
        errors.push("Points per match must be at least 1".to_string());
    }
    let (sizes, unassigned) = club_sizes(players);
    if sizes.len() < 2 {
        errors.push("At least 2 clubs are required".to_string());
    }
    if unassigned > 0 {
        errors.push(format!("{} player(s) not assigned to a club", unassigned));
    }
    if sizes.iter().any(|&(_, n)| n < 4) {
        errors.push("Each club needs at least 4 players (2 pairs)".to_string());
    }
    if sizes.iter().any(|&(_, n)| n % 2 != 0) {
        errors.push("Each club needs an even number of players".to_string());
    }
    errors
}

/// Warns when clubs field different numbers of pairs.
pub fn club_validate_warnings(players: &[Player]) -> Vec<String> {
    let (sizes, _) = club_sizes(players);
    let first = match sizes.first() {
        Some(&(_, n)) => n,
        None => return Vec::new(),
    };
    if sizes.iter().all(|&(_, n)| n == first) {
        return Vec::new();
    }
    let pairs: Vec<String> = sizes.iter().map(|&(_, n)| (n / 2).to_string()).collect();
    vec![format!(
        "Clubs have different sizes ({} pairs); the larger club gets extra sit-out compensation points, which may affect club standings",
        pairs.join(" vs ")
    )]
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{Court, TournamentFormat};

    fn config(courts: usize, points: i32) -> TournamentConfig {
        TournamentConfig::new(TournamentFormat::KingOfTheCourt, points, Court::numbered(courts))
    }

    fn players(n: usize) -> Vec<Player> {
        (0..n).map(|i| Player::new(format!("P{i}"))).collect()
    }

    #[test]
    fn king_of_the_court_sit_out_warning() {
        assert!(king_of_the_court_validate_warnings(&players(9), &config(2, 21)).is_empty());
        let warnings = king_of_the_court_validate_warnings(&players(12), &config(2, 21));
        assert_eq!(warnings.len(), 1);
        assert!(warnings[0].contains("4 of 12 players"));
        assert!(warnings[0].contains("33%"));
        assert!(king_of_the_court_validate_warnings(&players(6), &config(1, 21)).is_empty());
    }

    #[test]
    fn score_must_match_points_per_match() {
        let cfg = config(2, 24);
        assert_eq!(common_validate_score(&MatchScore::new(12, 12), &cfg), None);
        let msg = common_validate_score(&MatchScore::new(10, 10), &cfg);
        assert_eq!(msg.as_deref(), Some("Total points must equal 24"));
        let msg = common_validate_score(&MatchScore::new(-1, 25), &cfg);
        assert_eq!(msg.as_deref(), Some("Points cannot be negative"));
    }
}
