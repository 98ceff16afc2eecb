use chrono::Local;
use livescore_api::{Match, Phase, StatusCode, parse_instant};

/// Short status column: minute for live play, kickoff time for upcoming,
/// the status abbreviation otherwise.
pub fn status_label(m: &Match) -> String {
    let known = m.status.known();
    match (m.phase(), known) {
        (Phase::Live, Some(StatusCode::HalfTime)) => "HT".to_string(),
        (Phase::Live, Some(StatusCode::PenaltyShootout)) => "PEN".to_string(),
        (Phase::Live, _) => match m.current_minute {
            Some(minute) => format!("{minute}'"),
            None => known.map(|c| c.abbrev()).unwrap_or("LIVE").to_string(),
        },
        (Phase::Upcoming, _) => kickoff_time(&m.start_time),
        (_, Some(code)) => code.abbrev().to_string(),
        (_, None) => format!("#{}", m.status.code),
    }
}

/// Local `HH:MM`, or the raw text when it is not a timestamp.
pub fn kickoff_time(start_time: &str) -> String {
    parse_instant(start_time)
        .map(|t| t.with_timezone(&Local).format("%H:%M").to_string())
        .unwrap_or_else(|| start_time.to_string())
}

/// `2 - 1`, `2 - 1 (HT 1 - 0)` with half-time shown, or `vs` before kickoff.
pub fn score_text(m: &Match, show_half_time: bool) -> String {
    let Some(score) = m.score else {
        return "vs".to_string();
    };
    match m.half_time_score {
        Some(ht) if show_half_time => {
            format!("{} - {} (HT {} - {})", score.home, score.away, ht.home, ht.away)
        }
        _ => format!("{} - {}", score.home, score.away),
    }
}

/// One list row. Compact rows drop the league and use short team names.
pub fn match_line(m: &Match, compact: bool, favorite: bool, show_half_time: bool) -> String {
    let star = if favorite { "★" } else { " " };
    let status = status_label(m);
    let score = score_text(m, show_half_time && !compact);
    if compact {
        format!(
            "{star} {status:>5} {} {score} {}",
            m.home_team.display_short(),
            m.away_team.display_short()
        )
    } else {
        format!(
            "{star} {status:>5}  {} {score} {}  · {}, {}",
            m.home_team.name, m.away_team.name, m.league_name, m.country_name
        )
    }
}
