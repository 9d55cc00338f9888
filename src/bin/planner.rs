//! Command-line planner: reads a roster CSV, generates a schedule and prints it as JSON.
//! Run with: cargo run --bin planner -- roster.csv   (or pipe the CSV on stdin)
//! Settings come from env: PLANNER_FORMAT, PLANNER_COURTS, PLANNER_POINTS,
//! PLANNER_ROUNDS, PLANNER_MATCH_MODE, PLANNER_SEED. RUST_LOG controls logging.

use padel_planner::{
    Club, ClubId, Court, Group, MatchMode, Player, ScheduleOptions, ScheduleStats, Team, Tournament,
    TournamentConfig, TournamentFormat,
};
use rand::rngs::StdRng;
use rand::SeedableRng;
use serde::Deserialize;
use std::collections::HashMap;
use std::error::Error;
use std::fs::File;
use std::io;

/// One roster line: `name` plus optional `group` (A/B) and `club` columns.
#[derive(Debug, Deserialize)]
struct RosterRow {
    name: String,
    #[serde(default)]
    group: Option<Group>,
    #[serde(default)]
    club: Option<String>,
}

fn default_points() -> i32 {
    21
}

/// Parse a setting looked up by `key`; missing or malformed values yield `None`.
fn setting<T, F>(lookup: &F, key: &str) -> Option<T>
where
    T: std::str::FromStr,
    F: Fn(&str) -> Option<String>,
{
    lookup(key).and_then(|v| v.trim().parse().ok())
}

/// Tournament settings from `PLANNER_*` variables. An unknown format is an
/// error; other unparsable values fall back to their defaults.
fn planner_config<F>(lookup: F, player_count: usize) -> Result<TournamentConfig, Box<dyn Error>>
where
    F: Fn(&str) -> Option<String>,
{
    let format: TournamentFormat = lookup("PLANNER_FORMAT")
        .map(|f| f.parse())
        .transpose()?
        .unwrap_or(TournamentFormat::Americano);
    let courts: usize = setting(&lookup, "PLANNER_COURTS").unwrap_or((player_count / 4).max(1));
    let points: i32 = setting(&lookup, "PLANNER_POINTS").unwrap_or_else(default_points);
    let mut config = TournamentConfig::new(format, points, Court::numbered(courts));
    if let Some(rounds) = setting::<usize, _>(&lookup, "PLANNER_ROUNDS") {
        config = config.with_max_rounds(rounds);
    }
    if let Some(mode) = setting::<MatchMode, _>(&lookup, "PLANNER_MATCH_MODE") {
        config = config.with_match_mode(mode);
    }
    Ok(config)
}

fn parse_roster<R: io::Read>(reader: R) -> Result<Vec<RosterRow>, csv::Error> {
    csv::ReaderBuilder::new()
        .trim(csv::Trim::All)
        .from_reader(reader)
        .deserialize()
        .collect()
}

fn read_roster(path: Option<&str>) -> Result<Vec<RosterRow>, Box<dyn Error>> {
    let rows = match path {
        Some(path) => parse_roster(File::open(path)?)?,
        None => parse_roster(io::stdin())?,
    };
    Ok(rows)
}

/// Players and clubs from the roster; clubs are created in order of first appearance.
fn build_roster(rows: Vec<RosterRow>) -> (Vec<Player>, Vec<Club>) {
    let mut clubs: Vec<Club> = Vec::new();
    let mut club_ids: HashMap<String, ClubId> = HashMap::new();
    let mut players = Vec::with_capacity(rows.len());
    for row in rows {
        let mut player = Player::new(row.name);
        if let Some(group) = row.group {
            player = player.with_group(group);
        }
        if let Some(club_name) = row.club.filter(|c| !c.is_empty()) {
            let id = *club_ids.entry(club_name.clone()).or_insert_with(|| {
                let club = Club::new(club_name);
                let id = club.id;
                clubs.push(club);
                id
            });
            player = player.with_club(id);
        }
        players.push(player);
    }
    (players, clubs)
}

/// Roster columns filled in for a format that has no use for them.
fn unused_columns(format: TournamentFormat, players: &[Player]) -> Vec<&'static str> {
    let mut unused = Vec::new();
    if !format.uses_groups() && players.iter().any(|p| p.group.is_some()) {
        unused.push("group");
    }
    if !format.uses_clubs() && players.iter().any(|p| p.club_id.is_some()) {
        unused.push("club");
    }
    unused
}

/// Consecutive players form a team; club formats pair consecutive members of the same club.
fn build_teams(players: &[Player], clubs: &[Club], by_club: bool) -> Vec<Team> {
    let buckets: Vec<Vec<&Player>> = if by_club {
        clubs
            .iter()
            .map(|c| players.iter().filter(|p| p.club_id == Some(c.id)).collect())
            .collect()
    } else {
        vec![players.iter().collect()]
    };
    buckets
        .iter()
        .flat_map(|bucket| {
            bucket
                .chunks_exact(2)
                .map(|pair| Team::new(pair[0].id, pair[1].id))
                .collect::<Vec<_>>()
        })
        .collect()
}

fn main() -> Result<(), Box<dyn Error>> {
    env_logger::init_from_env(env_logger::Env::new().default_filter_or("info"));

    let path = std::env::args().nth(1);
    let (players, clubs) = build_roster(read_roster(path.as_deref())?);

    let env = |key: &str| std::env::var(key).ok();
    let config = planner_config(env, players.len())?;
    let format = config.format;
    let courts = config.courts.len();
    let points = config.points_per_match;
    let mut rng = match setting::<u64, _>(&env, "PLANNER_SEED") {
        Some(seed) => StdRng::seed_from_u64(seed),
        None => StdRng::from_entropy(),
    };

    log::info!(
        "Planning {} for {} players on {} court(s), {} points per match",
        format,
        players.len(),
        courts,
        points
    );

    let strategy = format.strategy();
    let errors = strategy.validate_setup(&players, &config);
    if !errors.is_empty() {
        for e in &errors {
            log::error!("{}", e);
        }
        return Err(errors.join("; ").into());
    }
    for w in strategy.validate_warnings(&players, &config) {
        log::warn!("{}", w);
    }
    for column in unused_columns(format, &players) {
        log::warn!("Ignoring the {} column: {} does not use it", column, format);
    }

    let mut tournament = Tournament::with_players(format!("{} tournament", format), config, players);
    tournament.clubs = clubs;
    if strategy.has_fixed_partners() {
        tournament.teams = build_teams(&tournament.players, &tournament.clubs, format.uses_clubs());
    }

    let result = strategy.generate_schedule(
        &tournament.players,
        &tournament.config,
        &ScheduleOptions::for_tournament(&tournament),
        &mut rng,
    );
    for w in &result.warnings {
        log::warn!("{}", w);
    }
    let stats = ScheduleStats::analyze(&tournament.active_players(), &result.rounds);
    log::info!(
        "Generated {} round(s); games {}..{}, partner repeats {}",
        stats.rounds,
        stats.games_min,
        stats.games_max,
        stats.partner_repeats
    );

    let warnings = result.warnings.clone();
    tournament.append_rounds(result.rounds)?;
    let output = serde_json::json!({
        "tournament": tournament,
        "warnings": warnings,
        "stats": stats,
    });
    println!("{}", serde_json::to_string_pretty(&output)?);
    Ok(())
}
