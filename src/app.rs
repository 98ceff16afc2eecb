use crate::state::app_settings::AppSettings;
use crate::state::app_state::{AppState, CatalogFocus, DetailTab, SettingsField};
use crate::state::messages::NetworkRequest;
use livescore_api::{Country, FavoritesStore, League, Match, MatchFilter, SettingsStore};
use std::sync::Arc;
use std::time::Duration;

#[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
pub enum MenuItem {
    #[default]
    Matches,
    Favorites,
    Search,
    Leagues,
    Settings,
    MatchDetail,
    Help,
}

pub struct App {
    pub settings: AppSettings,
    pub state: AppState,
    favorites: Arc<dyn FavoritesStore>,
    user_store: Arc<dyn SettingsStore>,
}

impl App {
    pub fn new(
        settings: AppSettings,
        favorites: Arc<dyn FavoritesStore>,
        user_store: Arc<dyn SettingsStore>,
    ) -> Self {
        let state = AppState::new(user_store.get(), favorites.list());
        Self { settings, state, favorites, user_store }
    }

    // -----------------------------------------------------------------------
    // Network response handlers, called from main_ui_loop
    // -----------------------------------------------------------------------

    /// Returns true when a goal alert should sound.
    pub fn on_matches_loaded(&mut self, view: MenuItem, matches: Vec<Match>) -> bool {
        self.state.last_error = None;
        let scored = match view {
            MenuItem::Matches | MenuItem::Favorites => self.state.goals.observe(&matches),
            _ => false,
        };
        match view {
            MenuItem::Matches => self.state.matches.load(matches),
            MenuItem::Favorites => self.state.favorites.load(matches),
            MenuItem::Search => self.state.search.set_snapshot(matches),
            _ => {}
        }
        scored && self.state.user.sound_alerts
    }

    pub fn on_match_loaded(&mut self, id: String, found: Option<Match>) -> bool {
        self.state.last_error = None;
        let scored = found.as_ref().is_some_and(|m| self.state.goals.observe([m]));
        self.state.detail.resolve(&id, found);
        scored && self.state.user.sound_alerts
    }

    pub fn on_catalog_loaded(&mut self, leagues: Vec<League>, countries: Vec<Country>) {
        self.state.catalog.load(leagues, countries);
        let entries = self.state.filter_entries().len();
        self.state.filter_panel.cursor = self.state.filter_panel.cursor.min(entries.saturating_sub(1));
    }

    pub fn on_error(&mut self, message: String) {
        self.state.last_error = Some(message);
    }

    // -----------------------------------------------------------------------
    // Tab management and refresh
    // -----------------------------------------------------------------------

    pub fn update_tab(&mut self, next: MenuItem) {
        if self.state.active_tab == next {
            return;
        }
        self.state.previous_tab = self.state.active_tab;
        self.state.active_tab = next;
        if next != MenuItem::Search {
            self.state.search.composing = false;
        }
    }

    pub fn exit_help(&mut self) {
        if self.state.active_tab == MenuItem::Help {
            self.state.active_tab = self.state.previous_tab;
        }
    }

    /// Leave the detail view for the list it was opened from.
    pub fn close_detail(&mut self) {
        let back = match self.state.previous_tab {
            MenuItem::MatchDetail | MenuItem::Help => MenuItem::Matches,
            tab => tab,
        };
        self.update_tab(back);
    }

    /// What the active view needs fetched to be current.
    pub fn refresh_request(&self) -> Option<NetworkRequest> {
        match self.state.active_tab {
            MenuItem::Matches => Some(NetworkRequest::LoadMatches {
                view: MenuItem::Matches,
                filter: self.state.matches.filter.clone(),
            }),
            MenuItem::Favorites => Some(NetworkRequest::LoadMatches {
                view: MenuItem::Favorites,
                filter: self.state.favorites.filter.clone(),
            }),
            MenuItem::Search => Some(NetworkRequest::LoadMatches {
                view: MenuItem::Search,
                filter: MatchFilter::default(),
            }),
            MenuItem::Leagues => Some(NetworkRequest::LoadCatalog),
            MenuItem::MatchDetail => {
                self.state.detail.id.clone().map(|id| NetworkRequest::LoadMatch { id })
            }
            MenuItem::Settings | MenuItem::Help => None,
        }
    }

    /// Auto-refresh period of the active view, `None` for views that never refresh.
    pub fn refresh_period(&self) -> Option<Duration> {
        match self.state.active_tab {
            MenuItem::Matches | MenuItem::Favorites => Some(self.state.user.refresh_interval()),
            MenuItem::MatchDetail if self.state.detail.id.is_some() => Some(self.settings.detail_refresh),
            _ => None,
        }
    }

    pub fn toggle_show_logs(&mut self) {
        self.state.show_logs = !self.state.show_logs;
    }

    pub fn toggle_full_screen(&mut self) {
        self.settings.full_screen = !self.settings.full_screen;
    }

    // -----------------------------------------------------------------------
    // Lists and detail
    // -----------------------------------------------------------------------

    pub fn select_next(&mut self) {
        match self.state.active_tab {
            MenuItem::Matches => self.state.matches.select_next(),
            MenuItem::Favorites => self.state.favorites.select_next(),
            MenuItem::Search => self.state.search.select_next(),
            _ => {}
        }
    }

    pub fn select_prev(&mut self) {
        match self.state.active_tab {
            MenuItem::Matches => self.state.matches.select_prev(),
            MenuItem::Favorites => self.state.favorites.select_prev(),
            MenuItem::Search => self.state.search.select_prev(),
            _ => {}
        }
    }

    pub fn cycle_sort(&mut self) {
        match self.state.active_tab {
            MenuItem::Matches => self.state.matches.cycle_sort(),
            MenuItem::Favorites => self.state.favorites.cycle_sort(),
            _ => {}
        }
    }

    fn selected_match_id(&self) -> Option<String> {
        let selected = match self.state.active_tab {
            MenuItem::Matches => self.state.matches.selected_match(),
            MenuItem::Favorites => self.state.favorites.selected_match(),
            MenuItem::Search => self.state.search.selected_match(),
            MenuItem::MatchDetail => return self.state.detail.id.clone(),
            _ => None,
        };
        selected.map(|m| m.id.clone())
    }

    /// Open the selected match in the detail view and return its lookup.
    pub fn open_selected_match(&mut self) -> Option<NetworkRequest> {
        if self.state.active_tab == MenuItem::MatchDetail {
            return None;
        }
        let id = self.selected_match_id()?;
        let is_favorite = self.state.favorite_ids.contains(&id);
        self.state.detail.open(id.clone(), is_favorite);
        self.update_tab(MenuItem::MatchDetail);
        Some(NetworkRequest::LoadMatch { id })
    }

    /// Toggle the selected (or open) match in the favorites store.
    /// Returns whether the favorites view needs reloading.
    pub fn toggle_favorite(&mut self) -> bool {
        let Some(id) = self.selected_match_id() else {
            return false;
        };
        let now_favorite = self.favorites.toggle(&id);
        self.state.favorite_ids = self.favorites.list();
        if self.state.detail.id.as_deref() == Some(id.as_str()) {
            self.state.detail.is_favorite = now_favorite;
        }
        self.state.active_tab == MenuItem::Favorites || self.state.matches.filter.favorites_only
    }

    pub fn next_detail_tab(&mut self) {
        self.state.detail.tab = self.state.detail.tab.next(self.state.user.show_odds);
        self.state.detail.scroll_offset = 0;
    }

    pub fn detail_scroll_down(&mut self) {
        self.state.detail.scroll_offset = self.state.detail.scroll_offset.saturating_add(1);
    }

    pub fn detail_scroll_up(&mut self) {
        self.state.detail.scroll_offset = self.state.detail.scroll_offset.saturating_sub(1);
    }

    // -----------------------------------------------------------------------
    // Filter panel (Matches tab)
    // -----------------------------------------------------------------------

    pub fn toggle_filter_panel(&mut self) {
        self.state.filter_panel.open = !self.state.filter_panel.open;
    }

    pub fn filter_cursor_down(&mut self) {
        let count = self.state.filter_entries().len();
        self.state.filter_panel.move_down(count);
    }

    pub fn filter_cursor_up(&mut self) {
        self.state.filter_panel.move_up();
    }

    /// Toggle the entry under the cursor; true when the filter changed.
    pub fn toggle_filter_entry(&mut self) -> bool {
        let entries = self.state.filter_entries();
        let Some(entry) = entries.get(self.state.filter_panel.cursor) else {
            return false;
        };
        entry.toggle(&mut self.state.matches.filter);
        true
    }

    pub fn clear_filter(&mut self) -> bool {
        if !self.state.matches.filter.is_active() {
            return false;
        }
        self.state.matches.filter.clear();
        true
    }

    // -----------------------------------------------------------------------
    // Search input
    // -----------------------------------------------------------------------

    pub fn start_search_input(&mut self) {
        self.state.search.composing = true;
    }

    pub fn search_push(&mut self, c: char) {
        self.state.search.query.push(c);
    }

    pub fn search_pop(&mut self) {
        self.state.search.query.pop();
    }

    pub fn submit_search(&mut self) {
        self.state.search.submit();
    }

    pub fn cancel_search_input(&mut self) {
        self.state.search.composing = false;
    }

    // -----------------------------------------------------------------------
    // Leagues catalog
    // -----------------------------------------------------------------------

    pub fn catalog_down(&mut self) {
        self.state.catalog.move_down();
    }

    pub fn catalog_up(&mut self) {
        self.state.catalog.move_up();
    }

    pub fn catalog_switch_focus(&mut self) {
        self.state.catalog.switch_focus();
    }

    /// Enter on a league narrows Matches to it; on a country, to the country.
    pub fn catalog_select(&mut self) -> bool {
        let catalog = &self.state.catalog;
        let mut filter = MatchFilter::default();
        match catalog.focus {
            CatalogFocus::Countries => match catalog.country() {
                Some(country) => filter.toggle_country(&country.name),
                None => return false,
            },
            CatalogFocus::Leagues => match catalog.league() {
                Some(league) => filter.toggle_league(&league.id),
                None => return false,
            },
        }
        self.state.matches.filter = filter;
        self.state.matches.selected = 0;
        self.update_tab(MenuItem::Matches);
        true
    }

    // -----------------------------------------------------------------------
    // Settings
    // -----------------------------------------------------------------------

    pub fn settings_cursor_down(&mut self) {
        if self.state.settings_cursor + 1 < SettingsField::ALL.len() {
            self.state.settings_cursor += 1;
        }
    }

    pub fn settings_cursor_up(&mut self) {
        self.state.settings_cursor = self.state.settings_cursor.saturating_sub(1);
    }

    fn settings_field(&self) -> SettingsField {
        SettingsField::ALL[self.state.settings_cursor.min(SettingsField::ALL.len() - 1)]
    }

    pub fn settings_toggle(&mut self) {
        self.settings_field().toggle(&mut self.state.user);
        self.persist_user_settings();
    }

    pub fn settings_step(&mut self, up: bool) {
        if self.settings_field() != SettingsField::RefreshInterval {
            return;
        }
        if up {
            self.state.user.step_refresh_up();
        } else {
            self.state.user.step_refresh_down();
        }
        self.persist_user_settings();
    }

    fn persist_user_settings(&mut self) {
        self.user_store.save(&self.state.user);
        if !self.state.user.show_odds && self.state.detail.tab == DetailTab::Odds {
            self.state.detail.tab = DetailTab::Events;
        }
    }
}
