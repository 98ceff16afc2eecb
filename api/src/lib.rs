pub mod categorize;
pub mod client;
pub mod filter;
pub mod mock;
pub mod search;
pub mod sort;
pub mod store;

use serde::{Deserialize, Serialize};

pub use categorize::{Categorized, categorize};
pub use filter::{DateRange, MatchFilter, QuickFilter, apply_filter, parse_instant};
pub use search::search;
pub use sort::{SortDirection, SortField, SortOption, sort_matches};
pub use store::{FavoritesStore, SettingsStore, UserSettings};

// ---------------------------------------------------------------------------
// Domain types: the shape delivered by the feed, camelCase on the wire
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Match {
    pub id: String,
    pub league_id: String,
    pub league_name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub league_logo: Option<String>,
    pub country_name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub country_flag: Option<String>,
    pub home_team: Team,
    pub away_team: Team,
    /// Kickoff time as delivered (ISO 8601). Parsed lazily where compared.
    pub start_time: String,
    pub status: MatchStatus,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub current_minute: Option<u16>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub score: Option<Score>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub half_time_score: Option<Score>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub events: Option<Vec<MatchEvent>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub odds: Option<Odds>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub statistics: Option<Statistics>,
}

impl Match {
    pub fn phase(&self) -> Phase {
        self.status.phase()
    }

    pub fn is_live(&self) -> bool {
        self.phase() == Phase::Live
    }

    /// Events ordered by minute. Stable, so same-minute events keep feed order.
    pub fn sorted_events(&self) -> Vec<&MatchEvent> {
        let mut events: Vec<&MatchEvent> = self.events.iter().flatten().collect();
        events.sort_by_key(|e| e.minute);
        events
    }

    /// Sum of both sides' goals, if a score is known.
    pub fn total_goals(&self) -> Option<u16> {
        self.score.map(|s| s.home.saturating_add(s.away))
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Team {
    pub id: String,
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub logo: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub short_name: Option<String>,
}

impl Team {
    pub fn display_short(&self) -> &str {
        self.short_name.as_deref().unwrap_or(&self.name)
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Score {
    pub home: u16,
    pub away: u16,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Odds {
    pub home: f64,
    pub draw: f64,
    pub away: f64,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct StatPair {
    pub home: u16,
    pub away: u16,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Statistics {
    pub possession: StatPair,
    pub shots: StatPair,
    pub shots_on_target: StatPair,
    pub corners: StatPair,
    pub fouls: StatPair,
    pub yellow_cards: StatPair,
    pub red_cards: StatPair,
}

impl Statistics {
    /// Labelled rows in display order.
    pub fn rows(&self) -> [(&'static str, StatPair); 7] {
        [
            ("Possession %", self.possession),
            ("Shots", self.shots),
            ("Shots on target", self.shots_on_target),
            ("Corners", self.corners),
            ("Fouls", self.fouls),
            ("Yellow cards", self.yellow_cards),
            ("Red cards", self.red_cards),
        ]
    }
}

// ---------------------------------------------------------------------------
// Status and classification
// ---------------------------------------------------------------------------

/// Status as delivered: the raw code plus the feed's human description.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct MatchStatus {
    pub code: u8,
    pub description: String,
}

impl MatchStatus {
    pub fn new(code: StatusCode) -> Self {
        Self {
            code: code as u8,
            description: code.description().to_string(),
        }
    }

    pub fn known(&self) -> Option<StatusCode> {
        StatusCode::from_code(self.code)
    }

    pub fn phase(&self) -> Phase {
        Phase::of_code(self.code)
    }
}

/// The closed status code space.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[repr(u8)]
pub enum StatusCode {
    NotStarted = 0,
    FirstHalf = 1,
    HalfTime = 2,
    SecondHalf = 3,
    Finished = 4,
    Postponed = 5,
    Canceled = 6,
    Interrupted = 7,
    Suspended = 8,
    ExtraTime = 9,
    PenaltyShootout = 10,
}

impl StatusCode {
    pub const ALL: [StatusCode; 11] = [
        StatusCode::NotStarted,
        StatusCode::FirstHalf,
        StatusCode::HalfTime,
        StatusCode::SecondHalf,
        StatusCode::Finished,
        StatusCode::Postponed,
        StatusCode::Canceled,
        StatusCode::Interrupted,
        StatusCode::Suspended,
        StatusCode::ExtraTime,
        StatusCode::PenaltyShootout,
    ];

    pub fn from_code(code: u8) -> Option<Self> {
        Self::ALL.get(usize::from(code)).copied()
    }

    pub fn description(&self) -> &'static str {
        match self {
            StatusCode::NotStarted => "Not started",
            StatusCode::FirstHalf => "First half",
            StatusCode::HalfTime => "Half time",
            StatusCode::SecondHalf => "Second half",
            StatusCode::Finished => "Finished",
            StatusCode::Postponed => "Postponed",
            StatusCode::Canceled => "Canceled",
            StatusCode::Interrupted => "Interrupted",
            StatusCode::Suspended => "Suspended",
            StatusCode::ExtraTime => "Extra time",
            StatusCode::PenaltyShootout => "Penalties",
        }
    }

    pub fn abbrev(&self) -> &'static str {
        match self {
            StatusCode::NotStarted => "NS",
            StatusCode::FirstHalf => "1H",
            StatusCode::HalfTime => "HT",
            StatusCode::SecondHalf => "2H",
            StatusCode::Finished => "FT",
            StatusCode::Postponed => "PPD",
            StatusCode::Canceled => "CAN",
            StatusCode::Interrupted => "INT",
            StatusCode::Suspended => "SUS",
            StatusCode::ExtraTime => "ET",
            StatusCode::PenaltyShootout => "PEN",
        }
    }
}

/// Which grouped view a match belongs to. `Other` covers postponed,
/// canceled, interrupted, suspended and unknown codes; it has no bucket.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Phase {
    Live,
    Upcoming,
    Finished,
    Other,
}

impl Phase {
    pub const LIVE_CODES: [u8; 5] = [1, 2, 3, 9, 10];
    pub const UPCOMING_CODE: u8 = 0;
    pub const FINISHED_CODE: u8 = 4;

    pub fn of_code(code: u8) -> Self {
        if Self::LIVE_CODES.contains(&code) {
            Phase::Live
        } else if code == Self::UPCOMING_CODE {
            Phase::Upcoming
        } else if code == Self::FINISHED_CODE {
            Phase::Finished
        } else {
            Phase::Other
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            Phase::Live => "Live",
            Phase::Upcoming => "Upcoming",
            Phase::Finished => "Finished",
            Phase::Other => "Other",
        }
    }
}

// ---------------------------------------------------------------------------
// Match events
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MatchEvent {
    pub id: String,
    #[serde(rename = "type")]
    pub kind: EventKind,
    pub minute: u16,
    pub team: Side,
    pub player_id: String,
    pub player_name: String,
    /// Assisting player for goals, player coming on for substitutions.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub assist_player_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub assist_player_name: Option<String>,
}

impl MatchEvent {
    pub fn describe(&self) -> String {
        match (self.kind, self.assist_player_name.as_deref()) {
            (EventKind::Goal, Some(assist)) => format!("{} goal (assist: {assist})", self.player_name),
            (EventKind::Goal, None) => format!("{} goal", self.player_name),
            (EventKind::YellowCard, _) => format!("{} yellow card", self.player_name),
            (EventKind::RedCard, _) => format!("{} red card", self.player_name),
            (EventKind::Substitution, Some(on)) => format!("{} off, {on} on", self.player_name),
            (EventKind::Substitution, None) => format!("{} substituted", self.player_name),
            (EventKind::Penalty, _) => format!("{} penalty", self.player_name),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum EventKind {
    Goal,
    YellowCard,
    RedCard,
    Substitution,
    Penalty,
}

impl EventKind {
    pub fn glyph(&self) -> &'static str {
        match self {
            EventKind::Goal => "⚽",
            EventKind::YellowCard => "🟨",
            EventKind::RedCard => "🟥",
            EventKind::Substitution => "⇄",
            EventKind::Penalty => "P",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Side {
    Home,
    Away,
}

// ---------------------------------------------------------------------------
// Leagues and countries
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct League {
    pub id: String,
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub logo: Option<String>,
    pub country_name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub country_flag: Option<String>,
}

/// Countries are keyed by name; each owns the leagues played in it.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Country {
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub flag: Option<String>,
    #[serde(default)]
    pub leagues: Vec<League>,
}

impl Country {
    /// Group leagues by country name, keeping first-seen order of countries.
    pub fn group_leagues(leagues: &[League]) -> Vec<Country> {
        let mut countries: Vec<Country> = Vec::new();
        for league in leagues {
            match countries.iter_mut().find(|c| c.name == league.country_name) {
                Some(country) => country.leagues.push(league.clone()),
                None => countries.push(Country {
                    name: league.country_name.clone(),
                    flag: league.country_flag.clone(),
                    leagues: vec![league.clone()],
                }),
            }
        }
        countries
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn event(id: &str, minute: u16) -> MatchEvent {
        MatchEvent {
            id: id.into(),
            kind: EventKind::Goal,
            minute,
            team: Side::Home,
            player_id: format!("p{id}"),
            player_name: format!("Player {id}"),
            assist_player_id: None,
            assist_player_name: None,
        }
    }

    #[test]
    fn phase_follows_status_code() {
        for code in Phase::LIVE_CODES {
            assert_eq!(Phase::of_code(code), Phase::Live, "code {code}");
        }
        assert_eq!(Phase::of_code(0), Phase::Upcoming);
        assert_eq!(Phase::of_code(4), Phase::Finished);
        for code in [5, 6, 7, 8, 11, 200] {
            assert_eq!(Phase::of_code(code), Phase::Other, "code {code}");
        }
    }

    #[test]
    fn half_time_counts_as_live() {
        assert_eq!(MatchStatus::new(StatusCode::HalfTime).phase(), Phase::Live);
    }

    #[test]
    fn status_code_lookup_is_closed() {
        assert_eq!(StatusCode::from_code(10), Some(StatusCode::PenaltyShootout));
        assert_eq!(StatusCode::from_code(11), None);
        for (i, code) in StatusCode::ALL.iter().enumerate() {
            assert_eq!(*code as usize, i);
        }
    }

    #[test]
    fn total_goals_saturates() {
        let mut m = Match::default();
        assert_eq!(m.total_goals(), None);
        m.score = Some(Score { home: 2, away: 1 });
        assert_eq!(m.total_goals(), Some(3));
        m.score = Some(Score { home: 40000, away: 40000 });
        assert_eq!(m.total_goals(), Some(u16::MAX));
    }

    #[test]
    fn events_sort_by_minute_keeping_ties_in_feed_order() {
        let m = Match {
            events: Some(vec![event("a", 23), event("b", 15), event("c", 23), event("d", 94)]),
            ..Default::default()
        };
        let ids: Vec<&str> = m.sorted_events().iter().map(|e| e.id.as_str()).collect();
        assert_eq!(ids, vec!["b", "a", "c", "d"]);
    }

    #[test]
    fn missing_optionals_are_tolerated() {
        let m = Match::default();
        assert!(m.sorted_events().is_empty());
        assert_eq!(m.total_goals(), None);
        assert_eq!(m.home_team.display_short(), "");
    }

    #[test]
    fn match_deserializes_from_camel_case_feed() {
        let json = r#"{
            "id": "1",
            "leagueId": "1",
            "leagueName": "Premier League",
            "countryName": "England",
            "homeTeam": {"id": "101", "name": "Manchester United", "shortName": "MUN"},
            "awayTeam": {"id": "102", "name": "Liverpool"},
            "startTime": "2026-10-17T15:00:00Z",
            "status": {"code": 1, "description": "First half"},
            "currentMinute": 35,
            "score": {"home": 1, "away": 0},
            "events": [{
                "id": "1001", "type": "yellowCard", "minute": 15, "team": "away",
                "playerId": "2001", "playerName": "Van Dijk"
            }]
        }"#;
        let m: Match = serde_json::from_str(json).expect("feed match should parse");
        assert_eq!(m.home_team.display_short(), "MUN");
        assert_eq!(m.away_team.display_short(), "Liverpool");
        assert_eq!(m.current_minute, Some(35));
        assert!(m.is_live());
        assert!(m.odds.is_none());
        let events = m.events.as_ref().map(Vec::len);
        assert_eq!(events, Some(1));
        assert_eq!(m.sorted_events()[0].kind, EventKind::YellowCard);
        assert_eq!(m.sorted_events()[0].team, Side::Away);
    }

    #[test]
    fn substitution_describes_both_players() {
        let mut e = event("s", 70);
        e.kind = EventKind::Substitution;
        e.assist_player_name = Some("Bench".into());
        assert_eq!(e.describe(), "Player s off, Bench on");
    }

    #[test]
    fn leagues_group_into_countries() {
        let league = |id: &str, country: &str| League {
            id: id.into(),
            name: format!("League {id}"),
            country_name: country.into(),
            ..Default::default()
        };
        let countries = Country::group_leagues(&[
            league("1", "England"),
            league("2", "Spain"),
            league("3", "England"),
        ]);
        assert_eq!(countries.len(), 2);
        assert_eq!(countries[0].name, "England");
        assert_eq!(countries[0].leagues.len(), 2);
        assert_eq!(countries[1].leagues[0].id, "2");
    }
}
