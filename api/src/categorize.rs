use crate::{Match, Phase};

/// A stable partition of a snapshot into the three grouped views.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Categorized {
    pub live: Vec<Match>,
    pub upcoming: Vec<Match>,
    pub finished: Vec<Match>,
}

impl Categorized {
    pub fn len(&self) -> usize {
        self.live.len() + self.upcoming.len() + self.finished.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Non-empty sections in display order.
    pub fn sections(&self) -> impl Iterator<Item = (Phase, &[Match])> {
        [
            (Phase::Live, self.live.as_slice()),
            (Phase::Upcoming, self.upcoming.as_slice()),
            (Phase::Finished, self.finished.as_slice()),
        ]
        .into_iter()
        .filter(|(_, matches)| !matches.is_empty())
    }

    /// Matches in display order, flattened across sections.
    pub fn iter(&self) -> impl Iterator<Item = &Match> {
        self.live.iter().chain(&self.upcoming).chain(&self.finished)
    }

    pub fn get(&self, index: usize) -> Option<&Match> {
        self.iter().nth(index)
    }
}

/// Partition by status phase. Postponed, canceled, interrupted, suspended
/// and unknown codes land in no bucket.
pub fn categorize(matches: Vec<Match>) -> Categorized {
    let mut out = Categorized::default();
    for m in matches {
        match m.phase() {
            Phase::Live => out.live.push(m),
            Phase::Upcoming => out.upcoming.push(m),
            Phase::Finished => out.finished.push(m),
            Phase::Other => {}
        }
    }
    out
}
