use crate::Match;
use crate::filter::parse_instant;
use std::cmp::Ordering;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum SortField {
    #[default]
    StartTime,
    LeagueName,
    CountryName,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum SortDirection {
    #[default]
    Asc,
    Desc,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SortOption {
    pub field: SortField,
    pub direction: SortDirection,
}

impl SortOption {
    pub const CYCLE: [SortOption; 6] = [
        SortOption::new(SortField::StartTime, SortDirection::Asc),
        SortOption::new(SortField::StartTime, SortDirection::Desc),
        SortOption::new(SortField::LeagueName, SortDirection::Asc),
        SortOption::new(SortField::LeagueName, SortDirection::Desc),
        SortOption::new(SortField::CountryName, SortDirection::Asc),
        SortOption::new(SortField::CountryName, SortDirection::Desc),
    ];

    pub const fn new(field: SortField, direction: SortDirection) -> Self {
        Self { field, direction }
    }

    /// Next option in the cycle; `None` (feed order) sits between the last and first.
    pub fn cycle(current: Option<SortOption>) -> Option<SortOption> {
        match current {
            None => Some(Self::CYCLE[0]),
            Some(option) => {
                let idx = Self::CYCLE.iter().position(|o| *o == option)?;
                Self::CYCLE.get(idx + 1).copied()
            }
        }
    }

    pub fn label(&self) -> String {
        let field = match self.field {
            SortField::StartTime => "kickoff",
            SortField::LeagueName => "league",
            SortField::CountryName => "country",
        };
        let arrow = match self.direction {
            SortDirection::Asc => "↑",
            SortDirection::Desc => "↓",
        };
        format!("{field} {arrow}")
    }
}

/// Stable sort. Unparseable kickoff times go last in either direction.
pub fn sort_matches(matches: &mut [Match], option: SortOption) {
    let directed = |ord: Ordering| match option.direction {
        SortDirection::Asc => ord,
        SortDirection::Desc => ord.reverse(),
    };

    match option.field {
        SortField::StartTime => matches.sort_by(|a, b| {
            match (parse_instant(&a.start_time), parse_instant(&b.start_time)) {
                (Some(x), Some(y)) => directed(x.cmp(&y)),
                (Some(_), None) => Ordering::Less,
                (None, Some(_)) => Ordering::Greater,
                (None, None) => Ordering::Equal,
            }
        }),
        SortField::LeagueName => matches.sort_by(|a, b| directed(a.league_name.cmp(&b.league_name))),
        SortField::CountryName => matches.sort_by(|a, b| directed(a.country_name.cmp(&b.country_name))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn fixture(id: &str, start: &str, league: &str) -> Match {
        Match {
            id: id.into(),
            start_time: start.into(),
            league_name: league.into(),
            country_name: league.into(),
            ..Default::default()
        }
    }

    fn ids(matches: &[Match]) -> Vec<&str> {
        matches.iter().map(|m| m.id.as_str()).collect()
    }

    fn snapshot() -> Vec<Match> {
        vec![
            fixture("a", "2026-10-17T16:00:00Z", "Serie A"),
            fixture("b", "garbage", "Bundesliga"),
            fixture("c", "2026-10-17T14:00:00+01:00", "Serie A"),
            fixture("d", "2026-10-17T12:00:00Z", "Bundesliga"),
        ]
    }

    #[test]
    fn kickoff_sort_puts_unparseable_last_both_ways() {
        let mut matches = snapshot();
        sort_matches(&mut matches, SortOption::new(SortField::StartTime, SortDirection::Asc));
        assert_eq!(ids(&matches), vec!["d", "c", "a", "b"]);

        sort_matches(&mut matches, SortOption::new(SortField::StartTime, SortDirection::Desc));
        assert_eq!(ids(&matches), vec!["a", "c", "d", "b"]);
    }

    #[test]
    fn name_sort_is_stable() {
        let mut matches = snapshot();
        sort_matches(&mut matches, SortOption::new(SortField::LeagueName, SortDirection::Asc));
        assert_eq!(ids(&matches), vec!["b", "d", "a", "c"]);

        let mut matches = snapshot();
        sort_matches(&mut matches, SortOption::new(SortField::CountryName, SortDirection::Desc));
        assert_eq!(ids(&matches), vec!["a", "c", "b", "d"]);
    }

    #[test]
    fn cycle_wraps_through_feed_order() {
        let mut current = None;
        let mut seen = Vec::new();
        for _ in 0..=SortOption::CYCLE.len() {
            current = SortOption::cycle(current);
            seen.push(current);
        }
        assert_eq!(seen.first().copied().flatten(), Some(SortOption::CYCLE[0]));
        assert_eq!(seen.last().copied().flatten(), None);
    }
}
