use crate::Match;

/// Case-insensitive, multi-term search over team, league and country names.
///
/// A blank query yields nothing. Otherwise every whitespace-separated term
/// must occur as a raw substring of the match's lowercased haystack; terms
/// are not anchored to word boundaries.
pub fn search(matches: &[Match], query: &str) -> Vec<Match> {
    let terms: Vec<String> = query.split_whitespace().map(str::to_lowercase).collect();
    if terms.is_empty() {
        return Vec::new();
    }

    matches
        .iter()
        .filter(|m| {
            let text = haystack(m);
            terms.iter().all(|term| text.contains(term.as_str()))
        })
        .cloned()
        .collect()
}

fn haystack(m: &Match) -> String {
    [
        m.home_team.name.as_str(),
        m.away_team.name.as_str(),
        m.league_name.as_str(),
        m.country_name.as_str(),
    ]
    .join(" ")
    .to_lowercase()
}
