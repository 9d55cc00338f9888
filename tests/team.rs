//! Integration tests for the fixed-team formats.

mod common;

use common::{assert_round_covers, ids, rng, score_round, team_tournament};
use padel_planner::logic::{TeamAmericano, TeamMexicano};
use padel_planner::{MatchScore, ScheduleOptions, TournamentFormat, TournamentStrategy};
use std::collections::HashMap;

#[test]
fn team_americano_meets_every_team_once() {
    let t = team_tournament(TournamentFormat::TeamAmericano, 8, 2);
    let result = TeamAmericano.generate_schedule(&t.players, &t.config, &ScheduleOptions::for_tournament(&t), &mut rng(1));

    assert!(TeamAmericano.has_fixed_partners());
    assert!(result.warnings.is_empty());
    assert_eq!(result.rounds.len(), 3);
    let mut meetings: HashMap<(usize, usize), u32> = HashMap::new();
    let team_of = |side: &[padel_planner::PlayerId; 2]| t.teams.iter().position(|team| team.is_side(side));
    for round in &result.rounds {
        assert_round_covers(round, &ids(&t.players));
        for m in &round.matches {
            let a = team_of(&m.team1).expect("side is a configured team");
            let b = team_of(&m.team2).expect("side is a configured team");
            *meetings.entry((a.min(b), a.max(b))).or_insert(0) += 1;
        }
    }
    assert_eq!(meetings.len(), 6);
    assert!(meetings.values().all(|&n| n == 1));
}

#[test]
fn team_americano_rotates_sitting_teams() {
    let t = team_tournament(TournamentFormat::TeamAmericano, 10, 2);
    let result = TeamAmericano.generate_schedule(&t.players, &t.config, &ScheduleOptions::for_tournament(&t), &mut rng(2));

    assert_eq!(result.warnings, vec!["1 team(s) will sit out each round".to_string()]);
    // ceil(4 * 5 / 4) rounds
    assert_eq!(result.rounds.len(), 5);
    let mut sat_out: HashMap<_, u32> = HashMap::new();
    for round in &result.rounds {
        assert_round_covers(round, &ids(&t.players));
        assert_eq!(round.sit_outs.len(), 2);
        let team = t.teams.iter().find(|team| team.contains(round.sit_outs[0])).expect("sitting team");
        assert!(team.contains(round.sit_outs[1]));
        *sat_out.entry(team.id).or_insert(0) += 1;
    }
    assert_eq!(sat_out.len(), 5);
}

#[test]
fn team_americano_needs_teams() {
    let mut t = team_tournament(TournamentFormat::TeamAmericano, 8, 2);
    t.teams.clear();
    let result = TeamAmericano.generate_schedule(&t.players, &t.config, &ScheduleOptions::for_tournament(&t), &mut rng(3));
    assert!(result.rounds.is_empty());
    assert_eq!(result.warnings, vec!["No teams configured".to_string()]);

    let errors = TeamAmericano.validate_setup(&t.players[..7], &t.config);
    assert!(errors.contains(&"Team Americano requires an even number of players".to_string()));
}

#[test]
fn team_standings_credit_each_team_once() {
    let mut t = team_tournament(TournamentFormat::TeamAmericano, 4, 1);
    t.teams[0] = t.teams[0].clone().named("Smash Bros");
    let result = TeamAmericano.generate_schedule(&t.players, &t.config, &ScheduleOptions::for_tournament(&t), &mut rng(4));
    t.append_rounds(result.rounds).unwrap();
    let m = t.rounds[0].matches[0].clone();
    t.set_score(m.id, MatchScore::new(15, 9)).unwrap();

    let standings = t.standings();
    assert_eq!(standings.len(), 2);
    let winner = t.teams.iter().find(|team| team.is_side(&m.team1)).expect("winning team");
    assert_eq!(standings[0].player_id, winner.id);
    assert_eq!(standings[0].total_points, 15);
    assert_eq!(standings[0].matches_played, 1);
    assert_eq!(standings[0].point_diff, 6);
    assert_eq!(standings[0].rank, 1);
    assert_eq!(standings[1].total_points, 9);
    assert_eq!(standings[1].point_diff, -6);
    assert_eq!(standings[1].rank, 2);
    assert_eq!(standings[0].player_name, t.team_name(winner));
    assert!(standings.iter().any(|s| s.player_name == "Smash Bros"));
}

#[test]
fn team_mexicano_pairs_first_with_second() {
    let mut t = team_tournament(TournamentFormat::TeamMexicano, 8, 2);
    let first = TeamMexicano.generate_schedule(&t.players, &t.config, &ScheduleOptions::for_tournament(&t), &mut rng(5));
    assert!(TeamMexicano.is_dynamic());
    assert_eq!(first.rounds.len(), 1);
    t.append_rounds(first.rounds).unwrap();

    let king = t.rounds[0].matches[0].clone();
    let lower = t.rounds[0].matches[1].clone();
    t.set_score(king.id, MatchScore::new(20, 4)).unwrap();
    t.set_score(lower.id, MatchScore::new(14, 10)).unwrap();

    let more = TeamMexicano.generate_additional_rounds(
        &t.players,
        &t.config,
        &t.rounds,
        1,
        &ScheduleOptions::for_tournament(&t),
        &mut rng(6),
    );
    assert_eq!(more.rounds.len(), 1);
    let round = &more.rounds[0];
    assert_eq!(round.round_number, 2);
    assert_eq!(round.matches[0].team1, king.team1);
    assert_eq!(round.matches[0].team2, lower.team1);
    assert_eq!(round.matches[1].team1, lower.team2);
    assert_eq!(round.matches[1].team2, king.team2);
}

#[test]
fn team_mexicano_drops_teams_with_excluded_players() {
    let mut t = team_tournament(TournamentFormat::TeamMexicano, 8, 2);
    let first = TeamMexicano.generate_schedule(&t.players, &t.config, &ScheduleOptions::for_tournament(&t), &mut rng(7));
    t.append_rounds(first.rounds).unwrap();
    score_round(&mut t, 0, MatchScore::new(12, 12));

    let excluded = [t.players[0].id];
    let options = ScheduleOptions::for_tournament(&t).excluding(&excluded);
    let more = TeamMexicano.generate_additional_rounds(&t.players, &t.config, &t.rounds, 1, &options, &mut rng(8));
    let round = &more.rounds[0];
    assert!(round.participants().iter().all(|&id| id != t.players[0].id && id != t.players[1].id));
    // Three teams left: one plays, one match only.
    assert_eq!(round.matches.len(), 1);
    assert_eq!(round.sit_outs.len(), 2);
}
