//! Standings: points aggregation, sit-out compensation and ranking.

use crate::models::{
    ClubId, ClubStandingsEntry, Competitor, CourtId, Player, PlayerId, Round, StandingsEntry, Team,
    Tournament,
};
use std::cmp::Ordering;
use std::collections::{HashMap, HashSet};

#[derive(Default)]
struct Tally {
    total_points: i32,
    matches_played: u32,
    matches_won: u32,
    matches_lost: u32,
    matches_draw: u32,
    points_for: i32,
    points_against: i32,
}

impl Tally {
    fn add_result(&mut self, own: i32, other: i32, bonus: i32) {
        self.total_points += own + bonus;
        self.points_for += own;
        self.points_against += other;
        self.matches_played += 1;
        match own.cmp(&other) {
            Ordering::Greater => self.matches_won += 1,
            Ordering::Less => self.matches_lost += 1,
            Ordering::Equal => self.matches_draw += 1,
        }
    }
}

/// Aggregate standings for `competitors` over `rounds`.
///
/// `map_side` returns the indices (into `competitors`) credited with a match side.
/// Competitors with a player sitting out a round that has at least one scored
/// match receive the rounded average points per scored competitor slot, once per
/// round, without a match played.
pub fn calculate_competitor_standings<F>(
    rounds: &[Round],
    competitors: &[Competitor],
    map_side: F,
) -> Vec<StandingsEntry>
where
    F: Fn(&[PlayerId; 2]) -> Vec<usize>,
{
    calculate_standings_with_bonus(rounds, competitors, map_side, &HashMap::new())
}

/// Like [`calculate_competitor_standings`], additionally crediting every
/// scored competitor with the bonus of the court it played on. Sit-out
/// compensation uses raw points only.
pub fn calculate_standings_with_bonus<F>(
    rounds: &[Round],
    competitors: &[Competitor],
    map_side: F,
    court_bonus: &HashMap<CourtId, i32>,
) -> Vec<StandingsEntry>
where
    F: Fn(&[PlayerId; 2]) -> Vec<usize>,
{
    aggregate(rounds, competitors, map_side, court_bonus, CompensationSlots::Credited)
}

/// What the sit-out compensation divides a round's points by.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum CompensationSlots {
    /// Competitor slots actually credited with a scored side.
    Credited,
    /// Four player slots per scored match, credited or not.
    EveryPlayer,
}

fn aggregate<F>(
    rounds: &[Round],
    competitors: &[Competitor],
    map_side: F,
    court_bonus: &HashMap<CourtId, i32>,
    slots: CompensationSlots,
) -> Vec<StandingsEntry>
where
    F: Fn(&[PlayerId; 2]) -> Vec<usize>,
{
    let mut tallies: Vec<Tally> = competitors.iter().map(|_| Tally::default()).collect();

    for round in rounds {
        let mut round_points = 0;
        let mut slots_scored = 0usize;
        for m in &round.matches {
            let Some(score) = m.score else { continue };
            let bonus = court_bonus.get(&m.court_id).copied().unwrap_or(0);
            let side1 = map_side(&m.team1);
            let side2 = map_side(&m.team2);
            for &i in &side1 {
                tallies[i].add_result(score.team1_points, score.team2_points, bonus);
            }
            for &i in &side2 {
                tallies[i].add_result(score.team2_points, score.team1_points, bonus);
            }
            round_points += score.total();
            slots_scored += match slots {
                CompensationSlots::Credited => side1.len() + side2.len(),
                CompensationSlots::EveryPlayer => m.players().len(),
            };
        }

        if slots_scored == 0 || round.sit_outs.is_empty() {
            continue;
        }
        let compensation = (round_points as f64 / slots_scored as f64).round() as i32;
        let sitting: HashSet<PlayerId> = round.sit_outs.iter().copied().collect();
        for (i, c) in competitors.iter().enumerate() {
            if c.player_ids.iter().any(|pid| sitting.contains(pid)) {
                tallies[i].total_points += compensation;
            }
        }
    }

    let mut entries: Vec<StandingsEntry> = competitors
        .iter()
        .zip(tallies)
        .map(|(c, t)| StandingsEntry {
            player_id: c.id,
            player_name: c.name.clone(),
            total_points: t.total_points,
            matches_played: t.matches_played,
            matches_won: t.matches_won,
            matches_lost: t.matches_lost,
            matches_draw: t.matches_draw,
            point_diff: t.points_for - t.points_against,
            rank: 0,
        })
        .collect();
    sort_and_rank(&mut entries);
    entries
}

/// Sort by points, point difference, wins (all descending) then name, and
/// assign shared ranks to entries with equal points, difference and wins.
pub fn sort_and_rank(entries: &mut [StandingsEntry]) {
    entries.sort_by(|a, b| {
        b.total_points
            .cmp(&a.total_points)
            .then(b.point_diff.cmp(&a.point_diff))
            .then(b.matches_won.cmp(&a.matches_won))
            .then_with(|| a.player_name.cmp(&b.player_name))
    });
    for i in 0..entries.len() {
        entries[i].rank = if i > 0 && same_standing(&entries[i - 1], &entries[i]) {
            entries[i - 1].rank
        } else {
            i + 1
        };
    }
}

fn same_standing(a: &StandingsEntry, b: &StandingsEntry) -> bool {
    a.total_points == b.total_points && a.point_diff == b.point_diff && a.matches_won == b.matches_won
}

/// One competitor per player.
pub fn player_competitors(players: &[Player]) -> Vec<Competitor> {
    players
        .iter()
        .map(|p| Competitor {
            id: p.id,
            name: p.name.clone(),
            player_ids: vec![p.id],
        })
        .collect()
}

/// One competitor per available player.
pub fn individual_competitors(tournament: &Tournament) -> Vec<Competitor> {
    player_competitors(&tournament.active_players())
}

/// Per-player standings over `rounds`: each player on a side is credited with that side's score.
pub fn standings_for_players(players: &[Player], rounds: &[Round]) -> Vec<StandingsEntry> {
    let competitors = player_competitors(players);
    let index: HashMap<PlayerId, usize> = competitors.iter().enumerate().map(|(i, c)| (c.id, i)).collect();
    calculate_competitor_standings(rounds, &competitors, |side| {
        side.iter().filter_map(|pid| index.get(pid).copied()).collect()
    })
}

/// Per-player standings for the available players of a tournament.
pub fn calculate_individual_standings(tournament: &Tournament) -> Vec<StandingsEntry> {
    standings_for_players(&tournament.active_players(), &tournament.rounds)
}

/// Per-player standings over every registered player, unavailable ones
/// included. Sit-out compensation averages over four slots per scored match.
pub fn calculate_roster_standings(tournament: &Tournament) -> Vec<StandingsEntry> {
    let competitors = player_competitors(&tournament.players);
    let index: HashMap<PlayerId, usize> = competitors.iter().enumerate().map(|(i, c)| (c.id, i)).collect();
    aggregate(
        &tournament.rounds,
        &competitors,
        |side| side.iter().filter_map(|pid| index.get(pid).copied()).collect(),
        &HashMap::new(),
        CompensationSlots::EveryPlayer,
    )
}

/// One competitor per team; with `available_only`, teams with an unavailable player are left out.
pub fn team_competitors(tournament: &Tournament, available_only: bool) -> Vec<Competitor> {
    let teams: Vec<&Team> = if available_only {
        tournament.active_teams()
    } else {
        tournament.teams.iter().collect()
    };
    teams
        .into_iter()
        .map(|t| Competitor {
            id: t.id,
            name: tournament.team_name(t),
            player_ids: t.player_ids().to_vec(),
        })
        .collect()
}

/// Per-team standings: a side is credited to the team formed by exactly its two players.
pub fn calculate_team_standings(tournament: &Tournament, competitors: &[Competitor]) -> Vec<StandingsEntry> {
    let teams: Vec<&Team> = tournament.teams.iter().collect();
    let index: HashMap<uuid::Uuid, usize> = competitors.iter().enumerate().map(|(i, c)| (c.id, i)).collect();
    calculate_competitor_standings(&tournament.rounds, competitors, |side| {
        teams
            .iter()
            .find(|t| t.is_side(side))
            .and_then(|t| index.get(&t.id).copied())
            .into_iter()
            .collect()
    })
}

/// Sum standings points per club. A team belongs to the club of its first
/// player; clubs with no scored competitor still appear with zero points.
pub fn calculate_club_standings(tournament: &Tournament, standings: &[StandingsEntry]) -> Vec<ClubStandingsEntry> {
    let player_club: HashMap<PlayerId, ClubId> = tournament
        .players
        .iter()
        .filter_map(|p| p.club_id.map(|c| (p.id, c)))
        .collect();
    let competitor_club = |id: uuid::Uuid| -> Option<ClubId> {
        player_club.get(&id).copied().or_else(|| {
            tournament
                .teams
                .iter()
                .find(|t| t.id == id)
                .and_then(|t| player_club.get(&t.player1_id).copied())
        })
    };

    let mut totals: HashMap<ClubId, i32> = HashMap::new();
    for entry in standings {
        if let Some(club) = competitor_club(entry.player_id) {
            *totals.entry(club).or_insert(0) += entry.total_points;
        }
    }

    let mut entries: Vec<ClubStandingsEntry> = tournament
        .clubs
        .iter()
        .map(|club| ClubStandingsEntry {
            club_id: club.id,
            club_name: club.name.clone(),
            total_points: totals.get(&club.id).copied().unwrap_or(0),
            member_count: tournament.players.iter().filter(|p| p.club_id == Some(club.id)).count(),
            rank: 0,
        })
        .collect();
    entries.sort_by(|a, b| b.total_points.cmp(&a.total_points).then_with(|| a.club_name.cmp(&b.club_name)));
    for i in 0..entries.len() {
        entries[i].rank = if i > 0 && entries[i - 1].total_points == entries[i].total_points {
            entries[i - 1].rank
        } else {
            i + 1
        };
    }
    entries
}
