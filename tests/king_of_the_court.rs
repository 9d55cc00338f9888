//! Integration tests for King of the Court promotion and bonuses.

mod common;

use common::{assert_round_covers, config, ids, players, rng, tournament_with_players};
use padel_planner::logic::KingOfTheCourt;
use padel_planner::{
    CourtId, Match, MatchScore, PlayerId, Round, ScheduleOptions, Tournament, TournamentFormat,
    TournamentStrategy,
};
use std::collections::HashSet;
use uuid::Uuid;

fn next_round(t: &mut Tournament, seed: u64) {
    let result = KingOfTheCourt.generate_additional_rounds(
        &t.players,
        &t.config,
        &t.rounds,
        1,
        &ScheduleOptions::for_tournament(t),
        &mut rng(seed),
    );
    assert_eq!(result.rounds.len(), 1);
    t.append_rounds(result.rounds).unwrap();
}

fn set_of(sides: &[[PlayerId; 2]]) -> HashSet<PlayerId> {
    sides.iter().flatten().copied().collect()
}

fn played(court: CourtId, team1: [PlayerId; 2], team2: [PlayerId; 2], score: MatchScore) -> Match {
    let mut m = Match::new(Uuid::new_v4(), court, team1, team2);
    m.score = Some(score);
    m
}

fn on_court(round: &Round, court: CourtId) -> HashSet<PlayerId> {
    round
        .matches
        .iter()
        .find(|m| m.court_id == court)
        .map(|m| set_of(&[m.team1, m.team2]))
        .unwrap_or_default()
}

#[test]
fn winners_climb_and_losers_drop() {
    let mut t = tournament_with_players(TournamentFormat::KingOfTheCourt, 8, 2);
    assert!(KingOfTheCourt.validate_setup(&t.players, &t.config).is_empty());
    let first = KingOfTheCourt.generate_schedule(&t.players, &t.config, &ScheduleOptions::for_tournament(&t), &mut rng(1));
    assert!(KingOfTheCourt.is_dynamic());
    assert_eq!(first.rounds.len(), 1);
    t.append_rounds(first.rounds).unwrap();

    let king = t.rounds[0].matches[0].clone();
    let lower = t.rounds[0].matches[1].clone();
    assert_eq!(king.court_id, t.config.courts[0].id);
    t.set_score(king.id, MatchScore::new(18, 6)).unwrap();
    t.set_score(lower.id, MatchScore::new(18, 6)).unwrap();

    next_round(&mut t, 2);
    let round = &t.rounds[1];
    assert_round_covers(round, &ids(&t.players));
    let top = round.matches.iter().find(|m| m.court_id == t.config.courts[0].id).expect("king court match");
    let bottom = round.matches.iter().find(|m| m.court_id == t.config.courts[1].id).expect("lower court match");
    assert_eq!(set_of(&[top.team1, top.team2]), set_of(&[king.team1, lower.team1]));
    assert_eq!(set_of(&[bottom.team1, bottom.team2]), set_of(&[king.team2, lower.team2]));
    // The two former kings are split across the net.
    for side in [top.team1, top.team2] {
        assert_eq!(side.iter().filter(|id| king.team1.contains(id)).count(), 1);
    }
}

#[test]
fn king_court_bonus_counts_in_standings() {
    let mut t = tournament_with_players(TournamentFormat::KingOfTheCourt, 8, 2);
    let first = KingOfTheCourt.generate_schedule(&t.players, &t.config, &ScheduleOptions::for_tournament(&t), &mut rng(3));
    t.append_rounds(first.rounds).unwrap();
    let king = t.rounds[0].matches[0].clone();
    let lower = t.rounds[0].matches[1].clone();
    t.set_score(king.id, MatchScore::new(18, 6)).unwrap();
    t.set_score(lower.id, MatchScore::new(18, 6)).unwrap();

    let standings = t.standings();
    let points_of = |id: PlayerId| standings.iter().find(|s| s.player_id == id).map(|s| s.total_points);
    assert_eq!(points_of(king.team1[0]), Some(19));
    assert_eq!(points_of(king.team2[0]), Some(7));
    assert_eq!(points_of(lower.team1[0]), Some(18));
    assert_eq!(points_of(lower.team2[0]), Some(6));
    assert!(king.team1.contains(&standings[0].player_id));
}

#[test]
fn unscored_courts_keep_their_players() {
    let mut t = tournament_with_players(TournamentFormat::KingOfTheCourt, 8, 2);
    let first = KingOfTheCourt.generate_schedule(&t.players, &t.config, &ScheduleOptions::for_tournament(&t), &mut rng(4));
    t.append_rounds(first.rounds).unwrap();
    let king = t.rounds[0].matches[0].clone();

    next_round(&mut t, 5);
    let top = t.rounds[1]
        .matches
        .iter()
        .find(|m| m.court_id == t.config.courts[0].id)
        .expect("king court match");
    assert_eq!(set_of(&[top.team1, top.team2]), set_of(&[king.team1, king.team2]));
}

#[test]
fn spare_players_rotate_through_sit_outs() {
    let mut t = tournament_with_players(TournamentFormat::KingOfTheCourt, 9, 2);
    let first = KingOfTheCourt.generate_schedule(&t.players, &t.config, &ScheduleOptions::for_tournament(&t), &mut rng(6));
    assert_eq!(first.warnings, vec!["1 player(s) will sit out each round".to_string()]);
    t.append_rounds(first.rounds).unwrap();
    for seed in 7..11 {
        let match_ids: Vec<_> = t.rounds.last().map(|r| r.matches.iter().map(|m| m.id).collect()).unwrap_or_default();
        for id in match_ids {
            t.set_score(id, MatchScore::new(15, 9)).unwrap();
        }
        next_round(&mut t, seed);
    }

    let mut sat: HashSet<PlayerId> = HashSet::new();
    for round in &t.rounds {
        assert_eq!(round.matches.len(), 2);
        assert_eq!(round.sit_outs.len(), 1);
        assert_round_covers(round, &ids(&t.players));
        assert!(sat.insert(round.sit_outs[0]), "a player sat out twice in five rounds");
    }
}

#[test]
fn validation_enforces_ladder_minimums() {
    let errors = KingOfTheCourt.validate_setup(&players(6), &config(TournamentFormat::KingOfTheCourt, 1, 10));
    assert!(errors.contains(&"King of the Court requires at least 8 players".to_string()));
    assert!(errors.contains(&"King of the Court requires at least 2 courts".to_string()));
    assert!(errors.contains(&"King of the Court requires at least 12 points per match".to_string()));

    let warnings = KingOfTheCourt.validate_warnings(&players(11), &config(TournamentFormat::KingOfTheCourt, 2, 21));
    assert_eq!(
        warnings,
        vec!["3 of 11 players (27%) will sit out each round; consider adding a court".to_string()]
    );
    assert!(KingOfTheCourt.validate_warnings(&players(9), &config(TournamentFormat::KingOfTheCourt, 2, 21)).is_empty());
}

#[test]
fn half_scored_ladder_regroups_by_standings() {
    let mut t = tournament_with_players(TournamentFormat::KingOfTheCourt, 8, 2);
    let first = KingOfTheCourt.generate_schedule(&t.players, &t.config, &ScheduleOptions::for_tournament(&t), &mut rng(12));
    t.append_rounds(first.rounds).unwrap();
    let king = t.rounds[0].matches[0].clone();
    let lower = t.rounds[0].matches[1].clone();
    // Only the king court reports; the lower court keeps its four and the
    // king losers drop onto it, so the ladder is rebuilt from standings.
    t.set_score(king.id, MatchScore::new(18, 6)).unwrap();

    next_round(&mut t, 13);
    let round = &t.rounds[1];
    assert_eq!(round.matches.len(), 2);
    assert_round_covers(round, &ids(&t.players));
    assert_eq!(on_court(round, t.config.courts[0].id), set_of(&[king.team1, king.team2]));
    assert_eq!(on_court(round, t.config.courts[1].id), set_of(&[lower.team1, lower.team2]));
    let top = &round.matches[0];
    for side in [top.team1, top.team2] {
        assert_eq!(side.iter().filter(|id| king.team1.contains(id)).count(), 1);
    }
}

#[test]
fn returning_sit_outs_fill_from_the_bottom_worst_first() {
    let mut t = tournament_with_players(TournamentFormat::KingOfTheCourt, 10, 2);
    let p = ids(&t.players);
    let (c0, c1) = (t.config.courts[0].id, t.config.courts[1].id);
    let round1 = Round {
        id: Uuid::new_v4(),
        round_number: 1,
        matches: vec![
            played(c0, [p[0], p[1]], [p[2], p[3]], MatchScore::new(18, 6)),
            played(c1, [p[4], p[5]], [p[6], p[7]], MatchScore::new(18, 6)),
        ],
        sit_outs: vec![p[8], p[9]],
    };
    t.append_rounds(vec![round1]).unwrap();

    next_round(&mut t, 14);
    let round = &t.rounds[1];
    assert_round_covers(round, &ids(&t.players));
    assert_eq!(round.sit_outs.len(), 2);
    assert!(!round.sit_outs.contains(&p[8]) && !round.sit_outs.contains(&p[9]));

    let sitting: HashSet<PlayerId> = round.sit_outs.iter().copied().collect();
    let mut king: HashSet<PlayerId> = [p[0], p[1], p[4], p[5]].into_iter().filter(|id| !sitting.contains(id)).collect();
    let mut bottom: HashSet<PlayerId> = [p[2], p[3], p[6], p[7]].into_iter().filter(|id| !sitting.contains(id)).collect();
    // P9 trails P8 on name, so it is placed first.
    for id in [p[9], p[8]] {
        if bottom.len() < 4 {
            bottom.insert(id);
        } else {
            king.insert(id);
        }
    }
    assert_eq!(on_court(round, c0), king);
    assert_eq!(on_court(round, c1), bottom);
}

#[test]
fn players_from_a_closed_court_are_placed_by_standings() {
    let mut t = tournament_with_players(TournamentFormat::KingOfTheCourt, 8, 3);
    let p = ids(&t.players);
    let courts: Vec<CourtId> = t.config.courts.iter().map(|c| c.id).collect();
    let round1 = Round {
        id: Uuid::new_v4(),
        round_number: 1,
        matches: vec![
            played(courts[0], [p[0], p[1]], [p[2], p[3]], MatchScore::new(18, 6)),
            played(courts[1], [p[4], p[5]], [p[6], p[7]], MatchScore::new(16, 8)),
        ],
        sit_outs: vec![],
    };
    t.append_rounds(vec![round1]).unwrap();
    t.config.courts[1].unavailable = true;

    next_round(&mut t, 15);
    let round = &t.rounds[1];
    assert_round_covers(round, &ids(&t.players));
    assert_eq!(round.matches.len(), 2);
    // King winners 19 and court 2 winners 16 share the king court;
    // king losers 7 and court 2 losers 8 move to the last open court.
    let top = &round.matches[0];
    assert_eq!(top.court_id, courts[0]);
    assert_eq!((top.team1, top.team2), ([p[0], p[5]], [p[1], p[4]]));
    let last = &round.matches[1];
    assert_eq!(last.court_id, courts[2]);
    assert_eq!((last.team1, last.team2), ([p[6], p[3]], [p[7], p[2]]));
}
