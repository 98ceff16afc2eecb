use crate::app::MenuItem;
use livescore_api::{
    Categorized, Country, League, Match, MatchFilter, QuickFilter, SortOption, StatusCode,
    UserSettings, categorize, search, sort_matches,
};
use std::collections::{HashMap, HashSet};

// ---------------------------------------------------------------------------
// Grouped match lists (Matches and Favorites tabs)
// ---------------------------------------------------------------------------

#[derive(Debug, Default)]
pub struct MatchListState {
    /// Last snapshot in feed order; `grouped` is derived from it.
    pub snapshot: Vec<Match>,
    pub grouped: Categorized,
    pub filter: MatchFilter,
    pub sort: Option<SortOption>,
    /// Index into the flattened Live, Upcoming, Finished order.
    pub selected: usize,
    pub loaded: bool,
}

impl MatchListState {
    pub fn with_filter(filter: MatchFilter) -> Self {
        Self { filter, ..Self::default() }
    }

    /// Replace the snapshot wholesale. Selection follows the previously
    /// selected match when it is still present.
    pub fn load(&mut self, matches: Vec<Match>) {
        let previous = self.selected_match().map(|m| m.id.clone());
        self.snapshot = matches;
        self.loaded = true;
        self.regroup();
        if let Some(id) = previous
            && let Some(idx) = self.grouped.iter().position(|m| m.id == id)
        {
            self.selected = idx;
        }
    }

    pub fn cycle_sort(&mut self) {
        self.sort = SortOption::cycle(self.sort);
        self.regroup();
    }

    fn regroup(&mut self) {
        let mut matches = self.snapshot.clone();
        if let Some(option) = self.sort {
            sort_matches(&mut matches, option);
        }
        self.grouped = categorize(matches);
        self.selected = self.selected.min(self.grouped.len().saturating_sub(1));
    }

    pub fn select_next(&mut self) {
        if self.selected + 1 < self.grouped.len() {
            self.selected += 1;
        }
    }

    pub fn select_prev(&mut self) {
        self.selected = self.selected.saturating_sub(1);
    }

    pub fn selected_match(&self) -> Option<&Match> {
        self.grouped.get(self.selected)
    }

    /// Matches fetched but not shown in any bucket (postponed, canceled...).
    pub fn hidden_count(&self) -> usize {
        self.snapshot.len() - self.grouped.len()
    }
}

// ---------------------------------------------------------------------------
// Filter panel
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FilterEntry {
    Quick(QuickFilter),
    FavoritesOnly,
    Status(StatusCode),
    Country(String),
    League { id: String, name: String },
}

impl FilterEntry {
    /// Panel rows: quick flags, favorites, every status, then the catalog.
    pub fn all(catalog: &CatalogState) -> Vec<FilterEntry> {
        let mut entries: Vec<FilterEntry> = QuickFilter::ALL.into_iter().map(FilterEntry::Quick).collect();
        entries.push(FilterEntry::FavoritesOnly);
        entries.extend(StatusCode::ALL.into_iter().map(FilterEntry::Status));
        entries.extend(catalog.countries.iter().map(|c| FilterEntry::Country(c.name.clone())));
        entries.extend(catalog.countries.iter().flat_map(|c| &c.leagues).map(|l| FilterEntry::League {
            id: l.id.clone(),
            name: l.name.clone(),
        }));
        entries
    }

    pub fn label(&self) -> String {
        match self {
            FilterEntry::Quick(flag) => flag.label().to_string(),
            FilterEntry::FavoritesOnly => "Favorites only".to_string(),
            FilterEntry::Status(code) => format!("Status: {}", code.description()),
            FilterEntry::Country(name) => format!("Country: {name}"),
            FilterEntry::League { name, .. } => format!("League: {name}"),
        }
    }

    pub fn is_on(&self, filter: &MatchFilter) -> bool {
        match self {
            FilterEntry::Quick(flag) => filter.quick.contains(flag),
            FilterEntry::FavoritesOnly => filter.favorites_only,
            FilterEntry::Status(code) => filter.statuses.contains(&(*code as u8)),
            FilterEntry::Country(name) => filter.countries.contains(name),
            FilterEntry::League { id, .. } => filter.leagues.contains(id),
        }
    }

    pub fn toggle(&self, filter: &mut MatchFilter) {
        match self {
            FilterEntry::Quick(flag) => filter.toggle_quick(*flag),
            FilterEntry::FavoritesOnly => filter.toggle_favorites_only(),
            FilterEntry::Status(code) => filter.toggle_status(*code as u8),
            FilterEntry::Country(name) => filter.toggle_country(name),
            FilterEntry::League { id, .. } => filter.toggle_league(id),
        }
    }
}

#[derive(Debug, Default)]
pub struct FilterPanelState {
    pub open: bool,
    pub cursor: usize,
}

impl FilterPanelState {
    pub fn move_down(&mut self, entry_count: usize) {
        if self.cursor + 1 < entry_count {
            self.cursor += 1;
        }
    }

    pub fn move_up(&mut self) {
        self.cursor = self.cursor.saturating_sub(1);
    }
}

// ---------------------------------------------------------------------------
// Search
// ---------------------------------------------------------------------------

#[derive(Debug, Default)]
pub struct SearchState {
    pub query: String,
    pub composing: bool,
    /// Unfiltered feed the query runs against.
    pub snapshot: Vec<Match>,
    pub results: Vec<Match>,
    pub selected: usize,
    /// Set once a query has been submitted.
    pub searched: bool,
}

impl SearchState {
    pub fn set_snapshot(&mut self, matches: Vec<Match>) {
        self.snapshot = matches;
        if self.searched {
            self.run();
        }
    }

    pub fn submit(&mut self) {
        self.composing = false;
        self.searched = true;
        self.run();
    }

    fn run(&mut self) {
        self.results = search(&self.snapshot, &self.query);
        self.selected = self.selected.min(self.results.len().saturating_sub(1));
    }

    pub fn select_next(&mut self) {
        if self.selected + 1 < self.results.len() {
            self.selected += 1;
        }
    }

    pub fn select_prev(&mut self) {
        self.selected = self.selected.saturating_sub(1);
    }

    pub fn selected_match(&self) -> Option<&Match> {
        self.results.get(self.selected)
    }
}

// ---------------------------------------------------------------------------
// Match detail
// ---------------------------------------------------------------------------

#[derive(Debug, Default)]
pub enum DetailLookup {
    #[default]
    Idle,
    Loading,
    Found(Box<Match>),
    NotFound,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum DetailTab {
    #[default]
    Events,
    Stats,
    Odds,
}

impl DetailTab {
    pub fn label(&self) -> &'static str {
        match self {
            DetailTab::Events => "Events",
            DetailTab::Stats => "Stats",
            DetailTab::Odds => "Odds",
        }
    }

    /// Odds is skipped when the user hides odds.
    pub fn next(self, show_odds: bool) -> Self {
        match self {
            DetailTab::Events => DetailTab::Stats,
            DetailTab::Stats if show_odds => DetailTab::Odds,
            DetailTab::Stats | DetailTab::Odds => DetailTab::Events,
        }
    }
}

#[derive(Debug, Default)]
pub struct DetailState {
    pub id: Option<String>,
    pub lookup: DetailLookup,
    pub tab: DetailTab,
    pub is_favorite: bool,
    pub scroll_offset: u16,
}

impl DetailState {
    pub fn open(&mut self, id: String, is_favorite: bool) {
        if self.id.as_deref() != Some(id.as_str()) {
            self.tab = DetailTab::Events;
            self.scroll_offset = 0;
            self.lookup = DetailLookup::Loading;
        }
        self.id = Some(id);
        self.is_favorite = is_favorite;
    }

    /// Ignores lookups for a match that is no longer open.
    pub fn resolve(&mut self, id: &str, found: Option<Match>) {
        if self.id.as_deref() != Some(id) {
            return;
        }
        self.lookup = match found {
            Some(m) => DetailLookup::Found(Box::new(m)),
            None => DetailLookup::NotFound,
        };
    }

    pub fn current(&self) -> Option<&Match> {
        match &self.lookup {
            DetailLookup::Found(m) => Some(m.as_ref()),
            _ => None,
        }
    }
}

// ---------------------------------------------------------------------------
// Leagues catalog
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum CatalogFocus {
    #[default]
    Countries,
    Leagues,
}

#[derive(Debug, Default)]
pub struct CatalogState {
    pub leagues: Vec<League>,
    pub countries: Vec<Country>,
    pub focus: CatalogFocus,
    pub selected_country: usize,
    pub selected_league: usize,
}

impl CatalogState {
    pub fn load(&mut self, leagues: Vec<League>, mut countries: Vec<Country>) {
        countries.sort_by(|a, b| a.name.cmp(&b.name));
        self.leagues = leagues;
        self.countries = countries;
        self.selected_country = self.selected_country.min(self.countries.len().saturating_sub(1));
        self.selected_league = 0;
    }

    pub fn country(&self) -> Option<&Country> {
        self.countries.get(self.selected_country)
    }

    pub fn league(&self) -> Option<&League> {
        self.country()?.leagues.get(self.selected_league)
    }

    pub fn switch_focus(&mut self) {
        self.focus = match self.focus {
            CatalogFocus::Countries => CatalogFocus::Leagues,
            CatalogFocus::Leagues => CatalogFocus::Countries,
        };
    }

    pub fn move_down(&mut self) {
        match self.focus {
            CatalogFocus::Countries => {
                if self.selected_country + 1 < self.countries.len() {
                    self.selected_country += 1;
                    self.selected_league = 0;
                }
            }
            CatalogFocus::Leagues => {
                let count = self.country().map(|c| c.leagues.len()).unwrap_or(0);
                if self.selected_league + 1 < count {
                    self.selected_league += 1;
                }
            }
        }
    }

    pub fn move_up(&mut self) {
        match self.focus {
            CatalogFocus::Countries => {
                if self.selected_country > 0 {
                    self.selected_country -= 1;
                    self.selected_league = 0;
                }
            }
            CatalogFocus::Leagues => self.selected_league = self.selected_league.saturating_sub(1),
        }
    }
}

// ---------------------------------------------------------------------------
// Settings view
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SettingsField {
    DarkMode,
    CompactMode,
    ShowOdds,
    ShowHalfTimeScore,
    RefreshInterval,
    SoundAlerts,
}

impl SettingsField {
    pub const ALL: [SettingsField; 6] = [
        SettingsField::DarkMode,
        SettingsField::CompactMode,
        SettingsField::ShowOdds,
        SettingsField::ShowHalfTimeScore,
        SettingsField::RefreshInterval,
        SettingsField::SoundAlerts,
    ];

    pub fn label(&self) -> &'static str {
        match self {
            SettingsField::DarkMode => "Dark mode",
            SettingsField::CompactMode => "Compact mode",
            SettingsField::ShowOdds => "Show odds",
            SettingsField::ShowHalfTimeScore => "Show half-time score",
            SettingsField::RefreshInterval => "Auto refresh",
            SettingsField::SoundAlerts => "Sound alerts",
        }
    }

    pub fn value(&self, settings: &UserSettings) -> String {
        let flag = |on: bool| String::from(if on { "on" } else { "off" });
        match self {
            SettingsField::DarkMode => flag(settings.dark_mode),
            SettingsField::CompactMode => flag(settings.compact_mode),
            SettingsField::ShowOdds => flag(settings.show_odds),
            SettingsField::ShowHalfTimeScore => flag(settings.show_half_time_score),
            SettingsField::RefreshInterval => format!("{}s", settings.auto_refresh_interval),
            SettingsField::SoundAlerts => flag(settings.sound_alerts),
        }
    }

    /// Flip a boolean field. The interval only moves by stepping.
    pub fn toggle(&self, settings: &mut UserSettings) {
        match self {
            SettingsField::DarkMode => settings.dark_mode = !settings.dark_mode,
            SettingsField::CompactMode => settings.compact_mode = !settings.compact_mode,
            SettingsField::ShowOdds => settings.show_odds = !settings.show_odds,
            SettingsField::ShowHalfTimeScore => {
                settings.show_half_time_score = !settings.show_half_time_score
            }
            SettingsField::RefreshInterval => settings.step_refresh_up(),
            SettingsField::SoundAlerts => settings.sound_alerts = !settings.sound_alerts,
        }
    }
}

// ---------------------------------------------------------------------------
// Goal alerts
// ---------------------------------------------------------------------------

/// Remembers goal totals per match between refreshes.
#[derive(Debug, Default)]
pub struct GoalTracker {
    totals: HashMap<String, u16>,
}

impl GoalTracker {
    /// True when any already-seen match scored since it was last observed.
    pub fn observe<'a>(&mut self, matches: impl IntoIterator<Item = &'a Match>) -> bool {
        let mut scored = false;
        for m in matches {
            let Some(total) = m.total_goals() else {
                continue;
            };
            if let Some(previous) = self.totals.insert(m.id.clone(), total)
                && total > previous
            {
                scored = true;
            }
        }
        scored
    }
}

// ---------------------------------------------------------------------------
// Root app state
// ---------------------------------------------------------------------------

#[derive(Debug)]
pub struct AppState {
    pub active_tab: MenuItem,
    pub previous_tab: MenuItem,
    pub show_logs: bool,
    pub last_error: Option<String>,
    pub user: UserSettings,
    pub favorite_ids: HashSet<String>,
    pub matches: MatchListState,
    pub favorites: MatchListState,
    pub filter_panel: FilterPanelState,
    pub search: SearchState,
    pub detail: DetailState,
    pub catalog: CatalogState,
    pub settings_cursor: usize,
    pub goals: GoalTracker,
}

impl AppState {
    pub fn new(user: UserSettings, favorite_ids: HashSet<String>) -> Self {
        Self {
            active_tab: MenuItem::default(),
            previous_tab: MenuItem::default(),
            show_logs: false,
            last_error: None,
            user,
            favorite_ids,
            matches: MatchListState::default(),
            favorites: MatchListState::with_filter(MatchFilter::favorites()),
            filter_panel: FilterPanelState::default(),
            search: SearchState::default(),
            detail: DetailState::default(),
            catalog: CatalogState::default(),
            settings_cursor: 0,
            goals: GoalTracker::default(),
        }
    }

    pub fn filter_entries(&self) -> Vec<FilterEntry> {
        FilterEntry::all(&self.catalog)
    }
}
