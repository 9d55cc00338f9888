//! Integration tests for the club formats and club standings.

mod common;

use common::{assert_round_covers, club_tournament, config, ids, players, rng};
use padel_planner::logic::{ClubAmericano, ClubMexicano, ClubRanked, ClubTeamAmericano, ClubTeamMexicano};
use padel_planner::{
    calculate_club_standings, ClubId, MatchMode, MatchScore, Player, PlayerId, ScheduleOptions,
    Tournament, TournamentFormat, TournamentStrategy,
};
use std::collections::HashSet;

fn club_of(t: &Tournament, id: PlayerId) -> Option<ClubId> {
    t.player(id).and_then(|p| p.club_id)
}

#[test]
fn club_ranked_rotates_the_bye_club() {
    let t = club_tournament(TournamentFormat::ClubRanked, 3, 4, 2);
    assert!(ClubRanked.validate_setup(&t.players, &t.config).is_empty());
    let result = ClubRanked.generate_schedule(&t.players, &t.config, &ScheduleOptions::for_tournament(&t), &mut rng(1));

    assert!(!ClubRanked.is_dynamic());
    assert!(ClubRanked.has_fixed_partners());
    assert_eq!(result.rounds.len(), 3);
    let mut bye_clubs = HashSet::new();
    for round in &result.rounds {
        assert_round_covers(round, &ids(&t.players));
        assert_eq!(round.matches.len(), 2);
        assert_eq!(round.sit_outs.len(), 4);
        let sitting: HashSet<_> = round.sit_outs.iter().map(|&id| club_of(&t, id)).collect();
        assert_eq!(sitting.len(), 1);
        bye_clubs.extend(sitting);
        for m in &round.matches {
            assert_eq!(club_of(&t, m.team1[0]), club_of(&t, m.team1[1]));
            assert_eq!(club_of(&t, m.team2[0]), club_of(&t, m.team2[1]));
            assert_ne!(club_of(&t, m.team1[0]), club_of(&t, m.team2[0]));
        }
    }
    assert_eq!(bye_clubs.len(), 3);
}

#[test]
fn club_ranked_matches_slot_against_slot() {
    let t = club_tournament(TournamentFormat::ClubRanked, 2, 4, 2);
    let result = ClubRanked.generate_schedule(&t.players, &t.config, &ScheduleOptions::for_tournament(&t), &mut rng(2));
    assert_eq!(result.rounds.len(), 1);
    let round = &result.rounds[0];
    assert_eq!(round.matches[0].team1, t.teams[0].player_ids());
    assert_eq!(round.matches[0].team2, t.teams[2].player_ids());
    assert_eq!(round.matches[1].team1, t.teams[1].player_ids());
    assert_eq!(round.matches[1].team2, t.teams[3].player_ids());
    assert_eq!(round.matches[0].court_id, t.config.courts[0].id);
}

#[test]
fn surplus_teams_sit_out_when_courts_run_short() {
    let t = club_tournament(TournamentFormat::ClubTeamAmericano, 2, 6, 2);
    let result = ClubTeamAmericano.generate_schedule(&t.players, &t.config, &ScheduleOptions::for_tournament(&t), &mut rng(3));
    let round = &result.rounds[0];
    assert_eq!(round.matches.len(), 2);
    assert_eq!(round.sit_outs.len(), 4);
    assert_round_covers(round, &ids(&t.players));
}

#[test]
fn club_team_americano_honors_match_mode() {
    let mut t = club_tournament(TournamentFormat::ClubTeamAmericano, 2, 4, 2);
    t.config = t.config.clone().with_match_mode(MatchMode::Slots);
    let a = ClubTeamAmericano.generate_schedule(&t.players, &t.config, &ScheduleOptions::for_tournament(&t), &mut rng(4));
    let b = ClubRanked.generate_schedule(&t.players, &t.config, &ScheduleOptions::for_tournament(&t), &mut rng(4));
    assert_eq!(a, b);
}

#[test]
fn club_americano_is_one_round_at_a_time() {
    let mut t = club_tournament(TournamentFormat::ClubAmericano, 4, 4, 4);
    let first = ClubAmericano.generate_schedule(&t.players, &t.config, &ScheduleOptions::for_tournament(&t), &mut rng(5));
    assert!(ClubAmericano.is_dynamic());
    assert_eq!(first.rounds.len(), 1);
    assert_eq!(first.rounds[0].matches.len(), 4);
    t.append_rounds(first.rounds).unwrap();

    let more = ClubAmericano.generate_additional_rounds(
        &t.players,
        &t.config,
        &t.rounds,
        2,
        &ScheduleOptions::for_tournament(&t),
        &mut rng(6),
    );
    assert_eq!(more.rounds.len(), 2);
    assert_eq!(more.rounds[0].round_number, 2);
    // Round 2 uses the second fixture set: new club pairings.
    let clubs_met = |m: &padel_planner::Match| {
        let mut pair = [club_of(&t, m.team1[0]), club_of(&t, m.team2[0])];
        pair.sort();
        pair
    };
    let first_pairs: HashSet<_> = t.rounds[0].matches.iter().map(clubs_met).collect();
    assert!(more.rounds[0].matches.iter().all(|m| !first_pairs.contains(&clubs_met(m))));
}

#[test]
fn club_team_mexicano_puts_leaders_together() {
    let mut t = club_tournament(TournamentFormat::ClubTeamMexicano, 2, 4, 2);
    let first = ClubTeamMexicano.generate_schedule(&t.players, &t.config, &ScheduleOptions::for_tournament(&t), &mut rng(7));
    t.append_rounds(first.rounds).unwrap();
    let m0 = t.rounds[0].matches[0].clone();
    let m1 = t.rounds[0].matches[1].clone();
    // m0: home wins big; m1: away wins narrowly.
    t.set_score(m0.id, MatchScore::new(20, 4)).unwrap();
    t.set_score(m1.id, MatchScore::new(10, 14)).unwrap();

    let more = ClubTeamMexicano.generate_additional_rounds(
        &t.players,
        &t.config,
        &t.rounds,
        1,
        &ScheduleOptions::for_tournament(&t),
        &mut rng(8),
    );
    let round = &more.rounds[0];
    let top = &round.matches[0];
    let sides: HashSet<[PlayerId; 2]> = [top.team1, top.team2].into_iter().collect();
    assert!(sides.contains(&m0.team1));
    assert!(sides.contains(&m1.team2));
}

#[test]
fn club_dynamic_formats_need_clubs() {
    let mut t = club_tournament(TournamentFormat::ClubTeamMexicano, 2, 4, 2);
    t.clubs.truncate(1);
    let result = ClubTeamMexicano.generate_schedule(&t.players, &t.config, &ScheduleOptions::for_tournament(&t), &mut rng(9));
    assert!(result.rounds.is_empty());
    assert_eq!(result.warnings, vec!["Not enough clubs or teams configured".to_string()]);

    let result = ClubMexicano.generate_schedule(&t.players, &t.config, &ScheduleOptions::for_tournament(&t), &mut rng(9));
    assert_eq!(result.warnings, vec!["Not enough clubs configured".to_string()]);
}

#[test]
fn club_mexicano_reforms_partners_inside_each_club() {
    let mut t = club_tournament(TournamentFormat::ClubMexicano, 2, 4, 2);
    t.teams.clear();
    let first = ClubMexicano.generate_schedule(&t.players, &t.config, &ScheduleOptions::for_tournament(&t), &mut rng(10));
    assert!(!ClubMexicano.has_fixed_partners());
    assert_eq!(first.rounds.len(), 1);
    t.append_rounds(first.rounds).unwrap();
    let match_ids: Vec<_> = t.rounds[0].matches.iter().map(|m| m.id).collect();
    t.set_score(match_ids[0], MatchScore::new(16, 8)).unwrap();
    t.set_score(match_ids[1], MatchScore::new(13, 11)).unwrap();

    let more = ClubMexicano.generate_additional_rounds(
        &t.players,
        &t.config,
        &t.rounds,
        1,
        &ScheduleOptions::for_tournament(&t),
        &mut rng(11),
    );
    t.append_rounds(more.rounds).unwrap();

    let partners = |round: usize| -> HashSet<[PlayerId; 2]> {
        t.rounds[round]
            .matches
            .iter()
            .flat_map(|m| [m.team1, m.team2])
            .map(|mut side| {
                side.sort();
                side
            })
            .collect()
    };
    assert!(partners(0).is_disjoint(&partners(1)));
    for round in &t.rounds {
        assert_round_covers(round, &ids(&t.players));
        for m in &round.matches {
            assert_eq!(club_of(&t, m.team1[0]), club_of(&t, m.team1[1]));
            assert_ne!(club_of(&t, m.team1[0]), club_of(&t, m.team2[0]));
        }
    }
    assert_eq!(t.standings().len(), 8);
}

#[test]
fn club_standings_sum_team_points_with_compensation() {
    let mut t = club_tournament(TournamentFormat::ClubRanked, 3, 4, 2);
    let result = ClubRanked.generate_schedule(&t.players, &t.config, &ScheduleOptions::for_tournament(&t), &mut rng(12));
    t.append_rounds(result.rounds).unwrap();
    score_first_round(&mut t);

    let first = &t.rounds[0];
    let home = club_of(&t, first.matches[0].team1[0]).expect("home club");
    let away = club_of(&t, first.matches[0].team2[0]).expect("away club");
    let bye = club_of(&t, first.sit_outs[0]).expect("bye club");

    let clubs = calculate_club_standings(&t, &t.standings());
    assert_eq!(clubs.len(), 3);
    let summary: Vec<(ClubId, i32, usize)> = clubs.iter().map(|c| (c.club_id, c.total_points, c.rank)).collect();
    // 48 points over four scored teams: each bye team is credited 12.
    assert_eq!(summary, vec![(home, 30, 1), (bye, 24, 2), (away, 18, 3)]);
    assert!(clubs.iter().all(|c| c.member_count == 4));
}

fn score_first_round(t: &mut Tournament) {
    let match_ids: Vec<_> = t.rounds[0].matches.iter().map(|m| m.id).collect();
    for id in match_ids {
        t.set_score(id, MatchScore::new(15, 9)).unwrap();
    }
}

#[test]
fn club_validation_reports_roster_problems() {
    let t = club_tournament(TournamentFormat::ClubRanked, 2, 4, 2);
    let mut roster: Vec<Player> = t.players.clone();
    roster.truncate(7);
    roster.push(Player::new("Loner"));
    let errors = ClubRanked.validate_setup(&roster, &t.config);
    assert!(errors.contains(&"1 player(s) not assigned to a club".to_string()));
    assert!(errors.contains(&"Each club needs an even number of players".to_string()));

    let errors = ClubRanked.validate_setup(&players(8), &config(TournamentFormat::ClubRanked, 2, 24));
    assert!(errors.contains(&"At least 2 clubs are required".to_string()));

    let uneven = club_tournament(TournamentFormat::ClubRanked, 2, 4, 2);
    let mut roster = uneven.players.clone();
    let extra_club = roster[0].club_id.expect("club member");
    roster.push(Player::new("X1").with_club(extra_club));
    roster.push(Player::new("X2").with_club(extra_club));
    let warnings = ClubRanked.validate_warnings(&roster, &uneven.config);
    assert_eq!(warnings.len(), 1);
    assert!(warnings[0].starts_with("Clubs have different sizes (3 vs 2 pairs)"));
}
