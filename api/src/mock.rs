//! Seeded in-process feed for offline use and tests.
//!
//! Four hand-written fixtures are always present, followed by twenty
//! generated matches (`mock-100`..`mock-119`) drawn from a seeded RNG on the
//! first fetch. Later fetches play the generated matches forward by the
//! whole minutes the clock has moved: minutes only go up, goals are only
//! added, and a match only moves from upcoming to live to finished.

use crate::client::{ApiResult, DataSource};
use crate::filter::parse_instant;
use crate::{
    Country, EventKind, League, Match, MatchEvent, MatchStatus, Odds, Score, Side, StatPair, Statistics,
    StatusCode, Team,
};
use async_trait::async_trait;
use chrono::{DateTime, Duration, SecondsFormat, Utc};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use std::sync::Mutex;

const GENERATED_MATCHES: usize = 20;
const GENERATED_ID_BASE: usize = 100;
const GOAL_CHANCE_PER_MINUTE: f64 = 0.015;
/// Upper bound on minutes played per fetch; nothing stays live longer.
const MAX_MINUTES_PER_FETCH: i64 = 120;

type Clock = Box<dyn Fn() -> DateTime<Utc> + Send + Sync>;

struct Feed {
    rng: StdRng,
    generated: Vec<Match>,
    /// Instant the generated matches were last played up to.
    played_to: Option<DateTime<Utc>>,
}

pub struct MockSource {
    feed: Mutex<Feed>,
    clock: Clock,
}

impl std::fmt::Debug for MockSource {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MockSource").finish_non_exhaustive()
    }
}

impl MockSource {
    pub fn new(seed: u64) -> Self {
        Self::with_clock(seed, Utc::now)
    }

    /// Pin "now" so kickoff times are reproducible.
    pub fn with_clock(seed: u64, clock: impl Fn() -> DateTime<Utc> + Send + Sync + 'static) -> Self {
        Self {
            feed: Mutex::new(Feed {
                rng: StdRng::seed_from_u64(seed),
                generated: Vec::with_capacity(GENERATED_MATCHES),
                played_to: None,
            }),
            clock: Box::new(clock),
        }
    }

    fn snapshot(&self) -> Vec<Match> {
        let now = (self.clock)();

        // A poisoned lock only means an earlier fetch panicked mid-draw; the feed is still usable.
        let mut feed = self.feed.lock().unwrap_or_else(|poisoned| poisoned.into_inner());
        let Feed { rng, generated, played_to } = &mut *feed;

        match *played_to {
            None => {
                let leagues = leagues();
                for i in 0..GENERATED_MATCHES {
                    let league = &leagues[rng.random_range(0..leagues.len())];
                    generated.push(generate_match(rng, i, league, now));
                }
                *played_to = Some(now);
            }
            Some(at) => {
                let minutes = (now - at).num_minutes();
                if minutes > 0 {
                    for m in generated.iter_mut() {
                        advance_match(rng, m, minutes, now);
                    }
                    // Leftover seconds carry over to the next fetch.
                    *played_to = Some(at + Duration::minutes(minutes));
                }
            }
        }

        let mut matches = fixtures(now);
        matches.extend(generated.iter().cloned());
        matches
    }
}

#[async_trait]
impl DataSource for MockSource {
    async fn fetch_matches(&self) -> ApiResult<Vec<Match>> {
        Ok(self.snapshot())
    }

    async fn fetch_match_by_id(&self, id: &str) -> ApiResult<Option<Match>> {
        Ok(self.snapshot().into_iter().find(|m| m.id == id))
    }

    async fn fetch_leagues(&self) -> ApiResult<Vec<League>> {
        Ok(leagues())
    }

    async fn fetch_countries(&self) -> ApiResult<Vec<Country>> {
        Ok(Country::group_leagues(&leagues()))
    }
}

// ---------------------------------------------------------------------------
// Static catalog
// ---------------------------------------------------------------------------

pub fn leagues() -> Vec<League> {
    [
        ("1", "Premier League", "England"),
        ("2", "La Liga", "Spain"),
        ("3", "Bundesliga", "Germany"),
        ("4", "Serie A", "Italy"),
        ("5", "Ligue 1", "France"),
        ("6", "Chinese Super League", "China"),
    ]
    .into_iter()
    .map(|(id, name, country)| League {
        id: id.to_owned(),
        name: name.to_owned(),
        logo: None,
        country_name: country.to_owned(),
        country_flag: None,
    })
    .collect()
}

fn iso(at: DateTime<Utc>) -> String {
    at.to_rfc3339_opts(SecondsFormat::Millis, true)
}

fn team(id: &str, name: &str, short: &str) -> Team {
    Team {
        id: id.to_owned(),
        name: name.to_owned(),
        logo: None,
        short_name: Some(short.to_owned()),
    }
}

fn event(id: &str, kind: EventKind, minute: u16, side: Side, player_id: &str, player: &str) -> MatchEvent {
    MatchEvent {
        id: id.to_owned(),
        kind,
        minute,
        team: side,
        player_id: player_id.to_owned(),
        player_name: player.to_owned(),
        assist_player_id: None,
        assist_player_name: None,
    }
}

fn pair(home: u16, away: u16) -> StatPair {
    StatPair { home, away }
}

fn base_match(id: &str, league: &League, home: Team, away: Team, start: DateTime<Utc>, code: StatusCode) -> Match {
    Match {
        id: id.to_owned(),
        league_id: league.id.clone(),
        league_name: league.name.clone(),
        league_logo: league.logo.clone(),
        country_name: league.country_name.clone(),
        country_flag: league.country_flag.clone(),
        home_team: home,
        away_team: away,
        start_time: iso(start),
        status: MatchStatus::new(code),
        ..Default::default()
    }
}

fn fixtures(now: DateTime<Utc>) -> Vec<Match> {
    let leagues = leagues();
    let league = |id: &str| {
        leagues
            .iter()
            .find(|l| l.id == id)
            .cloned()
            .unwrap_or_default()
    };

    let mut live = base_match(
        "1",
        &league("1"),
        team("101", "Manchester United", "MUN"),
        team("102", "Liverpool", "LIV"),
        now - Duration::minutes(45),
        StatusCode::FirstHalf,
    );
    live.current_minute = Some(35);
    live.score = Some(Score { home: 1, away: 0 });
    live.half_time_score = Some(Score { home: 0, away: 0 });
    live.events = Some(vec![
        event("1001", EventKind::Goal, 23, Side::Home, "1001", "Rashford"),
        event("1002", EventKind::YellowCard, 15, Side::Away, "2001", "Van Dijk"),
    ]);
    live.odds = Some(Odds { home: 2.5, draw: 3.4, away: 2.7 });
    live.statistics = Some(Statistics {
        possession: pair(45, 55),
        shots: pair(6, 8),
        shots_on_target: pair(3, 2),
        corners: pair(3, 5),
        fouls: pair(5, 7),
        yellow_cards: pair(0, 1),
        red_cards: pair(0, 0),
    });

    let mut upcoming = base_match(
        "2",
        &league("1"),
        team("103", "Chelsea", "CHE"),
        team("104", "Arsenal", "ARS"),
        now + Duration::hours(1),
        StatusCode::NotStarted,
    );
    upcoming.odds = Some(Odds { home: 2.2, draw: 3.1, away: 3.2 });

    let mut finished = base_match(
        "3",
        &league("2"),
        team("201", "Barcelona", "BAR"),
        team("202", "Real Madrid", "RMA"),
        now - Duration::hours(3),
        StatusCode::Finished,
    );
    finished.score = Some(Score { home: 2, away: 2 });
    finished.half_time_score = Some(Score { home: 1, away: 0 });
    finished.events = Some(vec![
        event("2001", EventKind::Goal, 23, Side::Home, "3001", "Lewandowski"),
        event("2002", EventKind::Goal, 56, Side::Away, "4001", "Benzema"),
        event("2003", EventKind::Goal, 65, Side::Home, "3001", "Lewandowski"),
        event("2004", EventKind::Goal, 89, Side::Away, "4002", "Vinicius"),
    ]);
    finished.statistics = Some(Statistics {
        possession: pair(58, 42),
        shots: pair(12, 10),
        shots_on_target: pair(6, 4),
        corners: pair(7, 4),
        fouls: pair(9, 12),
        yellow_cards: pair(2, 3),
        red_cards: pair(0, 0),
    });

    let mut second_half = base_match(
        "4",
        &league("6"),
        team("601", "Shanghai Port", "SHH"),
        team("602", "Beijing Guoan", "BJG"),
        now - Duration::minutes(30),
        StatusCode::SecondHalf,
    );
    second_half.current_minute = Some(65);
    second_half.score = Some(Score { home: 1, away: 1 });
    second_half.half_time_score = Some(Score { home: 0, away: 1 });
    second_half.events = Some(vec![
        event("6001", EventKind::Goal, 35, Side::Away, "6001", "Zhang Yuning"),
        event("6002", EventKind::Goal, 50, Side::Home, "6002", "Wu Lei"),
    ]);
    second_half.statistics = Some(Statistics {
        possession: pair(55, 45),
        shots: pair(10, 6),
        shots_on_target: pair(5, 3),
        corners: pair(6, 2),
        fouls: pair(8, 10),
        yellow_cards: pair(1, 2),
        red_cards: pair(0, 0),
    });

    vec![live, upcoming, finished, second_half]
}

// ---------------------------------------------------------------------------
// Generated matches
// ---------------------------------------------------------------------------

fn generate_match<R: Rng + ?Sized>(rng: &mut R, i: usize, league: &League, now: DateTime<Utc>) -> Match {
    let n = i + 1;
    let home = team(&format!("{i}01"), &format!("Home {n}"), &format!("H{n}"));
    let away = team(&format!("{i}02"), &format!("Away {n}"), &format!("A{n}"));
    let id = format!("mock-{}", i + GENERATED_ID_BASE);

    let is_live = rng.random_bool(0.3);
    let is_finished = !is_live && rng.random_bool(0.5);

    let mut m = if is_live {
        let code = if rng.random_bool(0.5) {
            StatusCode::FirstHalf
        } else {
            StatusCode::SecondHalf
        };
        let start = now - Duration::seconds(rng.random_range(0..3600));
        let mut m = base_match(&id, league, home, away, start, code);
        m.current_minute = Some(match code {
            StatusCode::FirstHalf => rng.random_range(1..=45),
            _ => rng.random_range(46..=90),
        });
        let score = Score {
            home: rng.random_range(0..3),
            away: rng.random_range(0..3),
        };
        m.score = Some(score);
        m.half_time_score = Some(match code {
            StatusCode::FirstHalf => Score::default(),
            _ => Score {
                home: rng.random_range(0..=score.home),
                away: rng.random_range(0..=score.away),
            },
        });
        m
    } else if is_finished {
        let start = now - Duration::seconds(rng.random_range(2 * 3600..12 * 3600));
        let mut m = base_match(&id, league, home, away, start, StatusCode::Finished);
        let score = Score {
            home: rng.random_range(0..4),
            away: rng.random_range(0..4),
        };
        m.score = Some(score);
        m.half_time_score = Some(Score {
            home: rng.random_range(0..=score.home),
            away: rng.random_range(0..=score.away),
        });
        m
    } else {
        let start = now + Duration::seconds(rng.random_range(0..24 * 3600));
        base_match(&id, league, home, away, start, StatusCode::NotStarted)
    };

    m.odds = Some(Odds {
        home: 2.0 + rng.random::<f64>(),
        draw: 3.0 + rng.random::<f64>(),
        away: 2.0 + rng.random::<f64>(),
    });
    m
}

/// Play `minutes` of the match. An upcoming match kicks off once its start
/// time has passed; a finished one never changes.
fn advance_match<R: Rng + ?Sized>(rng: &mut R, m: &mut Match, minutes: i64, now: DateTime<Utc>) {
    let mut minutes = minutes.min(MAX_MINUTES_PER_FETCH);

    if m.status.known() == Some(StatusCode::NotStarted) {
        let Some(kickoff) = parse_instant(&m.start_time) else {
            return;
        };
        let played = (now - kickoff.with_timezone(&Utc)).num_minutes();
        if played < 0 {
            return;
        }
        m.status = MatchStatus::new(StatusCode::FirstHalf);
        m.current_minute = Some(1);
        m.score = Some(Score::default());
        m.half_time_score = Some(Score::default());
        minutes = minutes.min(played);
    }

    for _ in 0..minutes {
        if !m.is_live() {
            break;
        }
        play_minute(rng, m);
    }
}

fn play_minute<R: Rng + ?Sized>(rng: &mut R, m: &mut Match) {
    let minute = m.current_minute.unwrap_or(0).saturating_add(1);
    let mut score = m.score.unwrap_or_default();
    if rng.random_bool(GOAL_CHANCE_PER_MINUTE) {
        score.home = score.home.saturating_add(1);
    }
    if rng.random_bool(GOAL_CHANCE_PER_MINUTE) {
        score.away = score.away.saturating_add(1);
    }
    m.score = Some(score);

    match m.status.known() {
        Some(StatusCode::FirstHalf) if minute > 45 => {
            m.status = MatchStatus::new(StatusCode::SecondHalf);
            m.half_time_score = Some(score);
            m.current_minute = Some(46);
        }
        Some(StatusCode::SecondHalf) if minute > 90 => {
            m.status = MatchStatus::new(StatusCode::Finished);
            m.current_minute = None;
        }
        _ => m.current_minute = Some(minute),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{Phase, categorize, search};
    use chrono::TimeZone;
    use std::sync::atomic::{AtomicI64, Ordering};

    fn start() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2026, 10, 17, 15, 0, 0).unwrap()
    }

    fn pinned(seed: u64) -> MockSource {
        MockSource::with_clock(seed, start)
    }

    /// Each read of the clock is `step_minutes` later than the one before.
    fn ticking(seed: u64, step_minutes: i64) -> MockSource {
        let reads = AtomicI64::new(0);
        MockSource::with_clock(seed, move || {
            start() + Duration::minutes(step_minutes * reads.fetch_add(1, Ordering::SeqCst))
        })
    }

    fn progress(m: &Match) -> u8 {
        match m.phase() {
            Phase::Upcoming => 0,
            Phase::Live => 1,
            Phase::Finished => 2,
            Phase::Other => panic!("mock never emits {:?}", m.status),
        }
    }

    #[tokio::test]
    async fn same_seed_same_snapshots() {
        let a = pinned(7);
        let b = pinned(7);
        for _ in 0..3 {
            assert_eq!(a.fetch_matches().await.unwrap(), b.fetch_matches().await.unwrap());
        }
    }

    #[tokio::test]
    async fn ids_are_stable_across_fetches() {
        let source = pinned(1);
        let first: Vec<String> = source.fetch_matches().await.unwrap().into_iter().map(|m| m.id).collect();
        let second: Vec<String> = source.fetch_matches().await.unwrap().into_iter().map(|m| m.id).collect();
        assert_eq!(first, second);
        assert_eq!(first.len(), 4 + GENERATED_MATCHES);
        assert_eq!(first[4], "mock-100");
        assert_eq!(first.last().map(String::as_str), Some("mock-119"));
    }

    #[tokio::test]
    async fn frozen_clock_keeps_the_snapshot() {
        let source = pinned(9);
        let first = source.fetch_matches().await.unwrap();
        for _ in 0..5 {
            assert_eq!(source.fetch_matches().await.unwrap(), first);
        }
    }

    #[tokio::test]
    async fn generated_matches_only_move_forward() {
        let source = ticking(42, 7);
        let first = source.fetch_matches().await.unwrap();
        let mut previous = first.clone();
        let mut changed = false;

        for _ in 0..40 {
            let next = source.fetch_matches().await.unwrap();
            assert_eq!(next.len(), previous.len());
            for (before, after) in previous.iter().zip(&next) {
                assert_eq!(before.id, after.id);
                assert!(progress(before) <= progress(after), "{} went backwards", before.id);
                if let Some(goals) = before.total_goals() {
                    assert!(after.total_goals() >= Some(goals), "{} lost goals", before.id);
                }
                if let (Some(a), Some(b)) = (before.current_minute, after.current_minute) {
                    assert!(a <= b, "{} clock ran backwards", before.id);
                }
                changed |= before != after;
            }
            previous = next;
        }

        assert!(changed, "280 minutes of play changed nothing");
        for (before, after) in first.iter().zip(&previous).skip(4) {
            if before.is_live() {
                assert_eq!(after.phase(), Phase::Finished, "{} is still playing", after.id);
                assert!(after.current_minute.is_none());
            }
        }
    }

    #[tokio::test]
    async fn seconds_carry_over_between_fetches() {
        let early_first_half =
            |m: &Match| m.status.known() == Some(StatusCode::FirstHalf) && m.current_minute <= Some(40);

        for seed in 0..50 {
            let reads = AtomicI64::new(0);
            let source = MockSource::with_clock(seed, move || {
                start() + Duration::seconds(30 * reads.fetch_add(1, Ordering::SeqCst))
            });
            let first = source.fetch_matches().await.unwrap();
            let Some(m) = first.iter().skip(4).find(|m| early_first_half(m)) else {
                continue;
            };

            let mut last = first.clone();
            for _ in 0..4 {
                last = source.fetch_matches().await.unwrap();
            }
            let after = last.iter().find(|x| x.id == m.id).expect("ids are stable");
            // Four half-minute steps add up to two minutes of play.
            assert_eq!(after.current_minute, m.current_minute.map(|minute| minute + 2));
            return;
        }
        panic!("no seed produced an early first-half match");
    }

    #[tokio::test]
    async fn generated_matches_are_consistent() {
        let source = pinned(42);
        for m in source.fetch_matches().await.unwrap() {
            let league = leagues().into_iter().find(|l| l.id == m.league_id).expect("known league");
            assert_eq!(league.name, m.league_name);
            assert_eq!(league.country_name, m.country_name);
            assert!(crate::filter::parse_instant(&m.start_time).is_some(), "{}", m.start_time);

            match m.phase() {
                Phase::Live => {
                    assert!(m.current_minute.is_some());
                    assert!(m.score.is_some());
                }
                Phase::Upcoming => {
                    assert!(m.score.is_none());
                    assert!(m.current_minute.is_none());
                }
                Phase::Finished => assert!(m.score.is_some()),
                Phase::Other => panic!("mock never emits {:?}", m.status),
            }
            if let (Some(ft), Some(ht)) = (m.score, m.half_time_score) {
                assert!(ht.home <= ft.home && ht.away <= ft.away, "{}", m.id);
            }
        }
    }

    #[tokio::test]
    async fn fixtures_cover_every_bucket() {
        let source = pinned(3);
        let out = categorize(source.fetch_matches().await.unwrap());
        assert!(out.live.iter().any(|m| m.id == "1"));
        assert!(out.live.iter().any(|m| m.id == "4"));
        assert!(out.upcoming.iter().any(|m| m.id == "2"));
        assert!(out.finished.iter().any(|m| m.id == "3"));

        let hits = search(&source.fetch_matches().await.unwrap(), "bar mad");
        assert_eq!(hits.len(), 1);
        assert_eq!(hits[0].id, "3");
    }

    #[tokio::test]
    async fn lookup_by_id() {
        let source = pinned(5);
        let found = source.fetch_match_by_id("3").await.unwrap();
        assert_eq!(found.map(|m| m.away_team.name), Some("Real Madrid".to_string()));
        assert!(source.fetch_match_by_id("999").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn countries_embed_their_leagues() {
        let source = pinned(0);
        let countries = source.fetch_countries().await.unwrap();
        assert_eq!(countries.len(), 6);
        assert!(countries.iter().all(|c| c.leagues.len() == 1));
        assert_eq!(source.fetch_leagues().await.unwrap().len(), 6);
    }
}
