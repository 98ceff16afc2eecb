use crate::app::MenuItem;
use crate::state::network::LoadingState;
use crossterm::event::KeyEvent;
use livescore_api::{Country, League, Match, MatchFilter};

#[derive(Debug, Clone)]
pub enum NetworkRequest {
    /// Fetch a filtered snapshot on behalf of a list view.
    LoadMatches { view: MenuItem, filter: MatchFilter },
    LoadMatch { id: String },
    LoadCatalog,
}

#[derive(Debug)]
pub enum NetworkResponse {
    LoadingStateChanged { loading_state: LoadingState },
    /// Full replacement of the view's snapshot.
    MatchesLoaded { view: MenuItem, matches: Vec<Match> },
    MatchLoaded { id: String, found: Option<Match> },
    CatalogLoaded { leagues: Vec<League>, countries: Vec<Country> },
    Error { message: String },
}

#[derive(Debug, Clone)]
pub enum UiEvent {
    KeyPressed(KeyEvent),
    Resize,
    AppStarted,
    RefreshDue(MenuItem),
}
