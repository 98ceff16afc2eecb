use crate::app::{App, MenuItem};
use crate::state::messages::NetworkRequest;
use crossterm::event::KeyCode::Char;
use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
use std::sync::Arc;
use tokio::sync::{Mutex, mpsc};

pub async fn handle_key_bindings(
    key_event: KeyEvent,
    app: &Arc<Mutex<App>>,
    network_requests: &mpsc::Sender<NetworkRequest>,
) {
    let mut guard = app.lock().await;
    let mut reload = false;
    let mut request = None;

    // Typing a search query captures every printable key.
    if guard.state.active_tab == MenuItem::Search && guard.state.search.composing {
        match (key_event.code, key_event.modifiers) {
            (Char('c'), KeyModifiers::CONTROL) => quit(),
            (KeyCode::Esc, _) => guard.cancel_search_input(),
            (KeyCode::Enter, _) => guard.submit_search(),
            (KeyCode::Backspace, _) => guard.search_pop(),
            (Char(c), _) => guard.search_push(c),
            _ => {}
        }
        return;
    }

    match (guard.state.active_tab, key_event.code, key_event.modifiers) {
        // Quit
        (_, Char('q'), _) | (_, Char('c'), KeyModifiers::CONTROL) => quit(),

        // Tab switching
        (_, Char('1'), _) => switch_tab(&mut guard, MenuItem::Matches, &mut reload),
        (_, Char('2'), _) => switch_tab(&mut guard, MenuItem::Favorites, &mut reload),
        (_, Char('3'), _) => switch_tab(&mut guard, MenuItem::Search, &mut reload),
        (_, Char('4'), _) => switch_tab(&mut guard, MenuItem::Leagues, &mut reload),
        (_, Char('5'), _) => switch_tab(&mut guard, MenuItem::Settings, &mut reload),
        (_, Char('?'), _) => guard.update_tab(MenuItem::Help),
        (MenuItem::Help, KeyCode::Esc, _) => guard.exit_help(),

        // Filter panel, Matches only
        (MenuItem::Matches, Char('/'), _) => guard.toggle_filter_panel(),
        (MenuItem::Matches, Char('c'), _) => reload = guard.clear_filter(),
        (MenuItem::Matches, Char(' '), _) if guard.state.filter_panel.open => {
            reload = guard.toggle_filter_entry();
        }
        (MenuItem::Matches, Char('j') | KeyCode::Down, _) if guard.state.filter_panel.open => {
            guard.filter_cursor_down();
        }
        (MenuItem::Matches, Char('k') | KeyCode::Up, _) if guard.state.filter_panel.open => {
            guard.filter_cursor_up();
        }
        (MenuItem::Matches, KeyCode::Esc, _) if guard.state.filter_panel.open => {
            guard.toggle_filter_panel();
        }

        // Lists
        (MenuItem::Matches | MenuItem::Favorites | MenuItem::Search, Char('j') | KeyCode::Down, _) => {
            guard.select_next();
        }
        (MenuItem::Matches | MenuItem::Favorites | MenuItem::Search, Char('k') | KeyCode::Up, _) => {
            guard.select_prev();
        }
        (MenuItem::Matches | MenuItem::Favorites, Char('s'), _) => guard.cycle_sort(),
        (MenuItem::Matches | MenuItem::Favorites | MenuItem::Search | MenuItem::MatchDetail, Char('*'), _) => {
            reload = guard.toggle_favorite();
        }
        (MenuItem::Matches | MenuItem::Favorites | MenuItem::Search, KeyCode::Enter, _) => {
            request = guard.open_selected_match();
        }

        // Search
        (MenuItem::Search, Char('/') | Char('i'), _) => guard.start_search_input(),

        // Leagues
        (MenuItem::Leagues, Char('j') | KeyCode::Down, _) => guard.catalog_down(),
        (MenuItem::Leagues, Char('k') | KeyCode::Up, _) => guard.catalog_up(),
        (MenuItem::Leagues, KeyCode::Tab | Char('h') | Char('l') | KeyCode::Left | KeyCode::Right, _) => {
            guard.catalog_switch_focus();
        }
        (MenuItem::Leagues, KeyCode::Enter, _) => reload = guard.catalog_select(),

        // Match detail
        (MenuItem::MatchDetail, KeyCode::Tab, _) => guard.next_detail_tab(),
        (MenuItem::MatchDetail, Char('j') | KeyCode::Down, _) => guard.detail_scroll_down(),
        (MenuItem::MatchDetail, Char('k') | KeyCode::Up, _) => guard.detail_scroll_up(),
        (MenuItem::MatchDetail, KeyCode::Esc, _) => switch_back(&mut guard, &mut reload),
        (MenuItem::MatchDetail, Char('r'), _) => reload = true,

        // Settings
        (MenuItem::Settings, Char('j') | KeyCode::Down, _) => guard.settings_cursor_down(),
        (MenuItem::Settings, Char('k') | KeyCode::Up, _) => guard.settings_cursor_up(),
        (MenuItem::Settings, Char(' ') | KeyCode::Enter, _) => guard.settings_toggle(),
        (MenuItem::Settings, Char('l') | KeyCode::Right, _) => guard.settings_step(true),
        (MenuItem::Settings, Char('h') | KeyCode::Left, _) => guard.settings_step(false),

        // Global
        (MenuItem::Matches | MenuItem::Favorites | MenuItem::Leagues, Char('r'), _) => reload = true,
        (_, Char('f'), _) => guard.toggle_full_screen(),
        (_, Char('"'), _) => guard.toggle_show_logs(),

        _ => {}
    }

    if reload {
        request = request.or_else(|| guard.refresh_request());
    }
    drop(guard);

    if let Some(request) = request {
        let _ = network_requests.send(request).await;
    }
}

fn switch_tab(app: &mut App, next: MenuItem, reload: &mut bool) {
    *reload = app.state.active_tab != next;
    app.update_tab(next);
}

fn switch_back(app: &mut App, reload: &mut bool) {
    app.close_detail();
    *reload = true;
}

fn quit() {
    crate::cleanup_terminal();
    std::process::exit(0);
}
