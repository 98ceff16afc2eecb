//! Narrowing predicates over a match snapshot.
//!
//! Every pass is an AND with the passes before it, and an empty selection
//! set means "no constraint". The favorites store is consulted at most once
//! per call, and only when the favorites-only flag is set.

use crate::store::FavoritesStore;
use crate::{Match, Phase};
use chrono::{DateTime, FixedOffset, NaiveDate, NaiveDateTime};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeSet, HashSet};

/// Quick phase flags. Each one is an independent narrowing pass, so two or
/// more at once always leaves nothing: phases are disjoint.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum QuickFilter {
    Live,
    Upcoming,
    Finished,
}

impl QuickFilter {
    pub const ALL: [QuickFilter; 3] = [QuickFilter::Live, QuickFilter::Upcoming, QuickFilter::Finished];

    pub fn phase(&self) -> Phase {
        match self {
            QuickFilter::Live => Phase::Live,
            QuickFilter::Upcoming => Phase::Upcoming,
            QuickFilter::Finished => Phase::Finished,
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            QuickFilter::Live => "Live only",
            QuickFilter::Upcoming => "Upcoming only",
            QuickFilter::Finished => "Finished only",
        }
    }

    fn accepts(&self, m: &Match) -> bool {
        m.phase() == self.phase()
    }
}

/// Inclusive kickoff window. Bounds stay as text until the filter runs.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DateRange {
    pub start: String,
    pub end: String,
}

impl DateRange {
    pub fn new(start: impl Into<String>, end: impl Into<String>) -> Self {
        Self {
            start: start.into(),
            end: end.into(),
        }
    }

    /// False whenever any of the three instants fails to parse.
    pub fn contains(&self, start_time: &str) -> bool {
        match (parse_instant(&self.start), parse_instant(&self.end), parse_instant(start_time)) {
            (Some(start), Some(end), Some(at)) => start <= at && at <= end,
            _ => false,
        }
    }
}

/// RFC 3339 first. Values without an offset read as UTC, and a bare date
/// reads as the start of that day in UTC.
pub fn parse_instant(s: &str) -> Option<DateTime<FixedOffset>> {
    let s = s.trim();
    if let Ok(at) = DateTime::parse_from_rfc3339(s) {
        return Some(at);
    }
    if let Ok(at) = NaiveDateTime::parse_from_str(s, "%Y-%m-%dT%H:%M:%S%.f") {
        return Some(at.and_utc().fixed_offset());
    }
    NaiveDate::parse_from_str(s, "%Y-%m-%d")
        .ok()
        .and_then(|day| day.and_hms_opt(0, 0, 0))
        .map(|at| at.and_utc().fixed_offset())
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct MatchFilter {
    /// League ids, OR within.
    pub leagues: BTreeSet<String>,
    /// Country names, OR within.
    pub countries: BTreeSet<String>,
    /// Raw status codes, OR within.
    pub statuses: BTreeSet<u8>,
    pub date_range: Option<DateRange>,
    pub favorites_only: bool,
    pub quick: BTreeSet<QuickFilter>,
}

impl MatchFilter {
    pub fn favorites() -> Self {
        Self {
            favorites_only: true,
            ..Self::default()
        }
    }

    pub fn is_active(&self) -> bool {
        !self.leagues.is_empty()
            || !self.countries.is_empty()
            || !self.statuses.is_empty()
            || self.date_range.is_some()
            || self.favorites_only
            || !self.quick.is_empty()
    }

    pub fn clear(&mut self) {
        *self = Self::default();
    }

    pub fn toggle_league(&mut self, league_id: &str) {
        toggle(&mut self.leagues, league_id.to_string());
    }

    pub fn toggle_country(&mut self, country_name: &str) {
        toggle(&mut self.countries, country_name.to_string());
    }

    pub fn toggle_status(&mut self, code: u8) {
        toggle(&mut self.statuses, code);
    }

    pub fn toggle_quick(&mut self, flag: QuickFilter) {
        toggle(&mut self.quick, flag);
    }

    pub fn toggle_favorites_only(&mut self) {
        self.favorites_only = !self.favorites_only;
    }
}

fn toggle<T: Ord>(set: &mut BTreeSet<T>, value: T) {
    if !set.remove(&value) {
        set.insert(value);
    }
}

/// Apply `filter` to `matches`, preserving input order.
pub fn apply_filter(
    mut matches: Vec<Match>,
    filter: &MatchFilter,
    favorites: &dyn FavoritesStore,
) -> Vec<Match> {
    if !filter.leagues.is_empty() {
        matches.retain(|m| filter.leagues.contains(&m.league_id));
    }

    if !filter.countries.is_empty() {
        matches.retain(|m| filter.countries.contains(&m.country_name));
    }

    if !filter.statuses.is_empty() {
        matches.retain(|m| filter.statuses.contains(&m.status.code));
    }

    if let Some(range) = &filter.date_range {
        matches.retain(|m| range.contains(&m.start_time));
    }

    if filter.favorites_only {
        let favorite_ids: HashSet<String> = favorites.list();
        matches.retain(|m| favorite_ids.contains(&m.id));
    }

    // BTreeSet iterates in declaration order: live, upcoming, finished.
    for flag in &filter.quick {
        matches.retain(|m| flag.accepts(m));
    }

    matches
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::{JsonStore, MemoryStore};
    use crate::{MatchStatus, StatusCode};
    use std::sync::atomic::{AtomicUsize, Ordering};

    fn fixture(id: &str, league: &str, country: &str, code: StatusCode, start: &str) -> Match {
        Match {
            id: id.into(),
            league_id: league.into(),
            league_name: format!("League {league}"),
            country_name: country.into(),
            start_time: start.into(),
            status: MatchStatus::new(code),
            ..Default::default()
        }
    }

    fn snapshot() -> Vec<Match> {
        vec![
            fixture("1", "1", "England", StatusCode::FirstHalf, "2026-10-17T14:15:00Z"),
            fixture("2", "1", "England", StatusCode::NotStarted, "2026-10-17T16:00:00Z"),
            fixture("3", "2", "Spain", StatusCode::Finished, "2026-10-17T12:00:00Z"),
            fixture("4", "6", "China", StatusCode::SecondHalf, "2026-10-17T14:30:00Z"),
            fixture("5", "3", "Germany", StatusCode::Canceled, "2026-10-17T13:00:00Z"),
            fixture("6", "2", "Spain", StatusCode::HalfTime, "not a date"),
        ]
    }

    fn ids(matches: &[Match]) -> Vec<&str> {
        matches.iter().map(|m| m.id.as_str()).collect()
    }

    fn no_favorites() -> JsonStore<MemoryStore> {
        JsonStore::new(MemoryStore::default())
    }

    /// Counts reads so tests can check when the store is consulted.
    #[derive(Default)]
    struct CountingFavorites {
        ids: HashSet<String>,
        reads: AtomicUsize,
    }

    impl FavoritesStore for CountingFavorites {
        fn list(&self) -> HashSet<String> {
            self.reads.fetch_add(1, Ordering::SeqCst);
            self.ids.clone()
        }
        fn add(&self, _id: &str) {}
        fn remove(&self, _id: &str) {}
    }

    #[test]
    fn empty_filter_is_identity() {
        let out = apply_filter(snapshot(), &MatchFilter::default(), &no_favorites());
        assert_eq!(out, snapshot());
    }

    #[test]
    fn league_filter_keeps_only_selected_league() {
        let matches = vec![
            fixture("a", "1", "England", StatusCode::NotStarted, "2026-10-17T16:00:00Z"),
            fixture("b", "2", "Spain", StatusCode::NotStarted, "2026-10-17T16:00:00Z"),
        ];
        let mut filter = MatchFilter::default();
        filter.toggle_league("1");
        let out = apply_filter(matches, &filter, &no_favorites());
        assert_eq!(ids(&out), vec!["a"]);
    }

    #[test]
    fn selections_are_or_within_and_across() {
        let mut filter = MatchFilter::default();
        filter.toggle_country("England");
        filter.toggle_country("Spain");
        let out = apply_filter(snapshot(), &filter, &no_favorites());
        assert_eq!(ids(&out), vec!["1", "2", "3", "6"]);

        filter.toggle_status(4);
        filter.toggle_status(0);
        let out = apply_filter(snapshot(), &filter, &no_favorites());
        assert_eq!(ids(&out), vec!["2", "3"]);
    }

    #[test]
    fn status_filter_uses_raw_codes() {
        let mut filter = MatchFilter::default();
        filter.toggle_status(StatusCode::Canceled as u8);
        let out = apply_filter(snapshot(), &filter, &no_favorites());
        assert_eq!(ids(&out), vec!["5"]);
    }

    #[test]
    fn date_range_is_inclusive() {
        let filter = MatchFilter {
            date_range: Some(DateRange::new("2026-10-17T14:15:00Z", "2026-10-17T16:00:00Z")),
            ..Default::default()
        };
        let out = apply_filter(snapshot(), &filter, &no_favorites());
        assert_eq!(ids(&out), vec!["1", "2", "4"]);
    }

    #[test]
    fn date_range_compares_instants_across_offsets() {
        let filter = MatchFilter {
            date_range: Some(DateRange::new("2026-10-17T22:00:00+08:00", "2026-10-17T22:30:00+08:00")),
            ..Default::default()
        };
        let out = apply_filter(snapshot(), &filter, &no_favorites());
        assert_eq!(ids(&out), vec!["1", "4"]);
    }

    #[test]
    fn malformed_dates_fail_closed() {
        let bad_bound = MatchFilter {
            date_range: Some(DateRange::new("yesterday", "2026-10-18T00:00:00Z")),
            ..Default::default()
        };
        assert!(apply_filter(snapshot(), &bad_bound, &no_favorites()).is_empty());

        let wide = MatchFilter {
            date_range: Some(DateRange::new("2000-01-01T00:00:00Z", "2100-01-01T00:00:00Z")),
            ..Default::default()
        };
        let out = apply_filter(snapshot(), &wide, &no_favorites());
        assert!(!ids(&out).contains(&"6"), "unparseable kickoff must be excluded");
        assert_eq!(out.len(), 5);
    }

    #[test]
    fn date_only_bounds_cover_the_day() {
        let matches = vec![
            fixture("a", "1", "England", StatusCode::NotStarted, "2026-10-17T15:00:00Z"),
            fixture("b", "1", "England", StatusCode::NotStarted, "2026-10-18T00:00:01Z"),
        ];
        let filter = MatchFilter {
            date_range: Some(DateRange::new("2026-10-17", "2026-10-18")),
            ..Default::default()
        };
        let out = apply_filter(matches, &filter, &no_favorites());
        assert_eq!(ids(&out), vec!["a"]);
    }

    #[test]
    fn kickoff_without_offset_reads_as_utc() {
        let matches = vec![
            fixture("a", "1", "England", StatusCode::NotStarted, "2026-10-17T15:00:00"),
            fixture("b", "1", "England", StatusCode::NotStarted, "2026-10-17T18:30:00.250"),
        ];
        let filter = MatchFilter {
            date_range: Some(DateRange::new("2026-10-17T14:00:00Z", "2026-10-17T16:00:00+00:00")),
            ..Default::default()
        };
        let out = apply_filter(matches, &filter, &no_favorites());
        assert_eq!(ids(&out), vec!["a"]);
    }

    #[test]
    fn parses_iso_forms() {
        let expected = parse_instant("2026-10-17T00:00:00Z");
        assert!(expected.is_some());
        assert_eq!(parse_instant("2026-10-17"), expected);
        assert_eq!(parse_instant(" 2026-10-17T00:00:00 "), expected);
        assert_eq!(parse_instant("2026-10-17T02:00:00+02:00"), expected);
        assert!(parse_instant("17/10/2026").is_none());
        assert!(parse_instant("2026-10-17T25:00:00").is_none());
    }

    #[test]
    fn favorites_only_reads_the_store_once() {
        let favorites = CountingFavorites {
            ids: ["3", "4", "missing"].iter().map(|s| s.to_string()).collect(),
            ..Default::default()
        };
        let out = apply_filter(snapshot(), &MatchFilter::favorites(), &favorites);
        assert_eq!(ids(&out), vec!["3", "4"]);
        assert_eq!(favorites.reads.load(Ordering::SeqCst), 1);

        apply_filter(snapshot(), &MatchFilter::default(), &favorites);
        assert_eq!(favorites.reads.load(Ordering::SeqCst), 1, "store untouched without the flag");
    }

    #[test]
    fn quick_flags_narrow_by_phase() {
        let mut filter = MatchFilter::default();
        filter.toggle_quick(QuickFilter::Live);
        let out = apply_filter(snapshot(), &filter, &no_favorites());
        assert_eq!(ids(&out), vec!["1", "4", "6"]);

        filter.clear();
        filter.toggle_quick(QuickFilter::Upcoming);
        assert_eq!(ids(&apply_filter(snapshot(), &filter, &no_favorites())), vec!["2"]);

        filter.clear();
        filter.toggle_quick(QuickFilter::Finished);
        assert_eq!(ids(&apply_filter(snapshot(), &filter, &no_favorites())), vec!["3"]);
    }

    #[test]
    fn combined_quick_flags_collapse_to_empty() {
        let mut filter = MatchFilter::default();
        filter.toggle_quick(QuickFilter::Live);
        filter.toggle_quick(QuickFilter::Finished);
        assert!(apply_filter(snapshot(), &filter, &no_favorites()).is_empty());

        for a in QuickFilter::ALL {
            for b in QuickFilter::ALL {
                if a == b {
                    continue;
                }
                let filter = MatchFilter {
                    quick: [a, b].into_iter().collect(),
                    ..Default::default()
                };
                assert!(apply_filter(snapshot(), &filter, &no_favorites()).is_empty(), "{a:?}+{b:?}");
            }
        }
    }

    #[test]
    fn toggles_and_activity() {
        let mut filter = MatchFilter::default();
        assert!(!filter.is_active());
        filter.toggle_league("1");
        assert!(filter.is_active());
        filter.toggle_league("1");
        assert!(!filter.is_active());
        filter.toggle_favorites_only();
        assert!(filter.is_active());
        filter.clear();
        assert_eq!(filter, MatchFilter::default());
    }
}
