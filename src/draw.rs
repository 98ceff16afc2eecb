use log::error;
use tui::backend::Backend;
use tui::layout::{Alignment, Constraint, Layout, Rect};
use tui::style::{Color, Modifier, Style};
use tui::text::{Line, Span};
use tui::widgets::{Block, BorderType, Borders, Paragraph, Tabs};
use tui::{Frame, Terminal};
use tui_logger::TuiLoggerWidget;

use crate::app::{App, MenuItem};
use crate::components::match_row::{kickoff_time, match_line, score_text};
use crate::state::app_state::{CatalogFocus, DetailLookup, DetailTab, MatchListState, SettingsField};
use crate::state::network::{ERROR_CHAR, LoadingState};
use crate::ui::layout::LayoutAreas;
use livescore_api::{Categorized, Match, Phase, Side, UserSettings};

static TABS: &[&str; 5] = &["Matches", "Favorites", "Search", "Leagues", "Settings"];

const HELP_TEXT: &str = "\
Global
  1-5        switch tab          ?        help (Esc to close)
  f          full screen         \"        log pane
  q, Ctrl-c  quit

Matches / Favorites
  j/k, ↓/↑   move                Enter    match detail
  s          cycle sort          *        toggle favorite
  /          filter panel (Matches): j/k move, Space toggle, c clear

Search
  / or i     type query          Enter    run search / open match
  Esc        stop typing

Leagues
  Tab        countries / leagues Enter    show matches

Match detail
  Tab        events/stats/odds   *        toggle favorite
  j/k        scroll              Esc      back

Settings
  j/k        move                Space    toggle   ←/→  refresh interval";

#[derive(Debug, Clone, Copy)]
struct Palette {
    bg: Color,
    fg: Color,
    dim: Color,
    accent: Color,
    live: Color,
    upcoming: Color,
    finished: Color,
}

impl Palette {
    fn from_settings(user: &UserSettings) -> Self {
        if user.dark_mode {
            Self {
                bg: Color::Black,
                fg: Color::White,
                dim: Color::DarkGray,
                accent: Color::Yellow,
                live: Color::LightGreen,
                upcoming: Color::LightBlue,
                finished: Color::Gray,
            }
        } else {
            Self {
                bg: Color::Reset,
                fg: Color::Reset,
                dim: Color::Gray,
                accent: Color::Blue,
                live: Color::Green,
                upcoming: Color::Cyan,
                finished: Color::DarkGray,
            }
        }
    }

    fn phase(&self, phase: Phase) -> Color {
        match phase {
            Phase::Live => self.live,
            Phase::Upcoming => self.upcoming,
            Phase::Finished | Phase::Other => self.finished,
        }
    }
}

pub fn draw<B>(terminal: &mut Terminal<B>, app: &mut App, loading: LoadingState)
where
    B: Backend,
{
    let current_size = terminal.size().unwrap_or_default();
    if current_size.width <= 10 || current_size.height <= 10 {
        return;
    }

    let mut layout = LayoutAreas::new(current_size);
    let palette = Palette::from_settings(&app.state.user);

    let result = terminal.draw(|f| {
        f.render_widget(Block::default().style(Style::default().bg(palette.bg).fg(palette.fg)), f.area());
        layout.update(f.area(), app.settings.full_screen, app.state.show_logs);

        if !app.settings.full_screen {
            draw_tabs(f, layout.tab_bar, app, palette);
        }

        match app.state.active_tab {
            MenuItem::Matches => draw_match_list(f, layout.main, app, MenuItem::Matches, palette),
            MenuItem::Favorites => draw_match_list(f, layout.main, app, MenuItem::Favorites, palette),
            MenuItem::Search => draw_search(f, layout.main, app, palette),
            MenuItem::Leagues => draw_leagues(f, layout.main, app, palette),
            MenuItem::Settings => draw_settings(f, layout.main, app, palette),
            MenuItem::MatchDetail => draw_match_detail(f, layout.main, app, palette),
            MenuItem::Help => draw_help(f, layout.main, palette),
        }

        if let Some(logs) = layout.logs {
            draw_logs(f, logs, palette);
        }

        draw_loading_spinner(f, f.area(), app, loading);
    });

    if let Err(e) = result {
        error!("failed to draw frame: {e}");
    }
}

pub fn default_border<'a>(color: Color) -> Block<'a> {
    Block::default()
        .borders(Borders::ALL)
        .border_type(BorderType::Rounded)
        .border_style(Style::default().fg(color))
}

fn tab_index(tab: MenuItem) -> Option<usize> {
    match tab {
        MenuItem::Matches => Some(0),
        MenuItem::Favorites => Some(1),
        MenuItem::Search => Some(2),
        MenuItem::Leagues => Some(3),
        MenuItem::Settings => Some(4),
        MenuItem::MatchDetail | MenuItem::Help => None,
    }
}

fn draw_tabs(f: &mut Frame, tab_bar: [Rect; 2], app: &App, palette: Palette) {
    let style = Style::default().fg(palette.fg);
    let border_type = BorderType::Rounded;

    // Detail and help keep the tab they were opened from highlighted.
    let selected = tab_index(app.state.active_tab)
        .or_else(|| tab_index(app.state.previous_tab))
        .unwrap_or(0);

    let titles: Vec<Line> = TABS.iter().map(|t| Line::from(*t)).collect();
    let tabs = Tabs::new(titles)
        .block(
            Block::default()
                .borders(Borders::LEFT | Borders::BOTTOM | Borders::TOP)
                .border_type(border_type),
        )
        .highlight_style(Style::default().fg(palette.accent).add_modifier(Modifier::UNDERLINED))
        .select(selected)
        .style(style);
    f.render_widget(tabs, tab_bar[0]);

    let help = Paragraph::new("Help: ? ")
        .alignment(Alignment::Right)
        .block(
            Block::default()
                .borders(Borders::RIGHT | Borders::BOTTOM | Borders::TOP)
                .border_type(border_type),
        )
        .style(style);
    f.render_widget(help, tab_bar[1]);
}

// ---------------------------------------------------------------------------
// Grouped lists
// ---------------------------------------------------------------------------

/// Scroll offset that keeps `line` inside a viewport of `height` rows.
fn scroll_to(line: usize, height: u16) -> u16 {
    let offset = line.saturating_sub(usize::from(height.saturating_sub(1)));
    u16::try_from(offset).unwrap_or(u16::MAX)
}

fn grouped_lines(grouped: &Categorized, selected: usize, app: &App, palette: Palette) -> (Vec<Line<'static>>, usize) {
    let user = &app.state.user;
    let mut lines = Vec::new();
    let mut selected_line = 0;
    let mut index = 0;

    for (phase, matches) in grouped.sections() {
        if !lines.is_empty() {
            lines.push(Line::from(""));
        }
        lines.push(Line::from(Span::styled(
            format!("{} ({})", phase.label(), matches.len()),
            Style::default().fg(palette.phase(phase)).add_modifier(Modifier::BOLD),
        )));
        for m in matches {
            let favorite = app.state.favorite_ids.contains(&m.id);
            let text = match_line(m, user.compact_mode, favorite, user.show_half_time_score);
            let mut style = Style::default().fg(palette.fg);
            if index == selected {
                style = style.add_modifier(Modifier::REVERSED);
                selected_line = lines.len();
            }
            lines.push(Line::from(Span::styled(text, style)));
            index += 1;
        }
    }
    (lines, selected_line)
}

fn draw_match_list(f: &mut Frame, area: Rect, app: &App, view: MenuItem, palette: Palette) {
    let (list, title) = match view {
        MenuItem::Favorites => (&app.state.favorites, " Favorites "),
        _ => (&app.state.matches, " Matches "),
    };
    let block = default_border(palette.fg).title(title);
    let inner = block.inner(area);
    f.render_widget(block, area);

    let [header, legend, content] =
        Layout::vertical([Constraint::Length(1), Constraint::Length(1), Constraint::Fill(1)]).areas(inner);

    f.render_widget(Paragraph::new(list_header(app, list, view, palette)), header);
    let keys = match view {
        MenuItem::Favorites => "Keys: j/k=move  Enter=detail  s=sort  *=unfavorite",
        _ => "Keys: j/k=move  Enter=detail  s=sort  *=favorite  /=filters  c=clear",
    };
    f.render_widget(Paragraph::new(keys).style(Style::default().fg(palette.dim)), legend);

    let mut list_area = content;
    if view == MenuItem::Matches && app.state.filter_panel.open {
        let [left, right] =
            Layout::horizontal([Constraint::Percentage(62), Constraint::Percentage(38)]).areas(content);
        list_area = left;
        draw_filter_panel(f, right, app, palette);
    }

    if !list.loaded {
        draw_message(f, list_area, "Loading matches...", palette);
        return;
    }
    if list.grouped.is_empty() {
        let msg = match view {
            MenuItem::Favorites => "No favorites yet. Press * on a match to add it.",
            _ if list.filter.is_active() => "No matches for the current filters. Press c to clear.",
            _ => "No matches right now.",
        };
        draw_message(f, list_area, msg, palette);
        return;
    }

    let (lines, selected_line) = grouped_lines(&list.grouped, list.selected, app, palette);
    f.render_widget(
        Paragraph::new(lines).scroll((scroll_to(selected_line, list_area.height), 0)),
        list_area,
    );
}

fn list_header(app: &App, list: &MatchListState, view: MenuItem, palette: Palette) -> Line<'static> {
    if let Some(err) = app.state.last_error.as_deref() {
        return Line::from(Span::styled(format!("Fetch failed: {err}"), Style::default().fg(Color::Red)));
    }

    let grouped = &list.grouped;
    let mut spans = vec![
        Span::styled(format!("{} live", grouped.live.len()), Style::default().fg(palette.live)),
        Span::raw("  "),
        Span::styled(format!("{} upcoming", grouped.upcoming.len()), Style::default().fg(palette.upcoming)),
        Span::raw("  "),
        Span::styled(format!("{} finished", grouped.finished.len()), Style::default().fg(palette.finished)),
    ];
    if list.hidden_count() > 0 {
        spans.push(Span::styled(
            format!("  ({} postponed/other)", list.hidden_count()),
            Style::default().fg(palette.dim),
        ));
    }
    let sort = list.sort.map(|s| s.label()).unwrap_or_else(|| "feed order".to_string());
    spans.push(Span::styled(format!("  | sort: {sort}"), Style::default().fg(palette.dim)));
    if view == MenuItem::Matches && list.filter.is_active() {
        spans.push(Span::styled("  | filtered", Style::default().fg(palette.accent)));
    }
    Line::from(spans)
}

fn draw_filter_panel(f: &mut Frame, area: Rect, app: &App, palette: Palette) {
    let block = default_border(palette.accent).title(" Filters ");
    let inner = block.inner(area);
    f.render_widget(block, area);

    let filter = &app.state.matches.filter;
    let cursor = app.state.filter_panel.cursor;
    let lines: Vec<Line> = app
        .state
        .filter_entries()
        .iter()
        .enumerate()
        .map(|(idx, entry)| {
            let mark = if entry.is_on(filter) { "[x]" } else { "[ ]" };
            let mut style = Style::default().fg(palette.fg);
            if idx == cursor {
                style = style.add_modifier(Modifier::REVERSED);
            }
            Line::from(Span::styled(format!("{mark} {}", entry.label()), style))
        })
        .collect();

    f.render_widget(Paragraph::new(lines).scroll((scroll_to(cursor, inner.height), 0)), inner);
}

// ---------------------------------------------------------------------------
// Search
// ---------------------------------------------------------------------------

fn draw_search(f: &mut Frame, area: Rect, app: &App, palette: Palette) {
    let block = default_border(palette.fg).title(" Search ");
    let inner = block.inner(area);
    f.render_widget(block, area);

    let [input_area, results_area] =
        Layout::vertical([Constraint::Length(3), Constraint::Fill(1)]).areas(inner);

    let search = &app.state.search;
    let (text, style, mode) = if search.composing {
        (format!("> {}_", search.query), Style::default().fg(palette.accent), " typing ")
    } else if search.query.is_empty() {
        (
            "Press / to search teams, leagues or countries".to_string(),
            Style::default().fg(palette.dim),
            " idle ",
        )
    } else {
        (format!("> {}", search.query), Style::default().fg(palette.fg), " idle ")
    };
    let input_block = default_border(palette.dim).title(mode);
    let input_inner = input_block.inner(input_area);
    f.render_widget(input_block, input_area);
    f.render_widget(Paragraph::new(text).style(style), input_inner);

    if !search.searched {
        return;
    }
    if search.results.is_empty() {
        let msg = format!("No matches for \"{}\"", search.query.trim());
        draw_message(f, results_area, &msg, palette);
        return;
    }

    let user = &app.state.user;
    let lines: Vec<Line> = search
        .results
        .iter()
        .enumerate()
        .map(|(idx, m)| {
            let favorite = app.state.favorite_ids.contains(&m.id);
            let mut style = Style::default().fg(palette.phase(m.phase()));
            if idx == search.selected {
                style = style.add_modifier(Modifier::REVERSED);
            }
            Line::from(Span::styled(
                match_line(m, user.compact_mode, favorite, user.show_half_time_score),
                style,
            ))
        })
        .collect();
    f.render_widget(
        Paragraph::new(lines).scroll((scroll_to(search.selected, results_area.height), 0)),
        results_area,
    );
}

// ---------------------------------------------------------------------------
// Leagues
// ---------------------------------------------------------------------------

fn draw_leagues(f: &mut Frame, area: Rect, app: &App, palette: Palette) {
    let catalog = &app.state.catalog;
    if catalog.countries.is_empty() {
        let block = default_border(palette.fg).title(" Leagues ");
        let inner = block.inner(area);
        f.render_widget(block, area);
        draw_message(f, inner, "Loading leagues...", palette);
        return;
    }

    let [left, right] =
        Layout::horizontal([Constraint::Percentage(40), Constraint::Percentage(60)]).areas(area);

    let focus_color = |focus: CatalogFocus| if catalog.focus == focus { palette.accent } else { palette.dim };
    let row_style = |selected: bool, focused: bool| {
        let style = Style::default().fg(palette.fg);
        match (selected, focused) {
            (true, true) => style.add_modifier(Modifier::REVERSED),
            (true, false) => style.add_modifier(Modifier::BOLD),
            _ => style,
        }
    };

    let countries_block = default_border(focus_color(CatalogFocus::Countries)).title(" Countries ");
    let countries_inner = countries_block.inner(left);
    f.render_widget(countries_block, left);
    let countries: Vec<Line> = catalog
        .countries
        .iter()
        .enumerate()
        .map(|(idx, c)| {
            let flag = c.flag.as_deref().unwrap_or("");
            Line::from(Span::styled(
                format!("{flag} {} ({})", c.name, c.leagues.len()).trim_start().to_string(),
                row_style(idx == catalog.selected_country, catalog.focus == CatalogFocus::Countries),
            ))
        })
        .collect();
    f.render_widget(
        Paragraph::new(countries).scroll((scroll_to(catalog.selected_country, countries_inner.height), 0)),
        countries_inner,
    );

    let leagues_block = default_border(focus_color(CatalogFocus::Leagues)).title(" Leagues ");
    let leagues_inner = leagues_block.inner(right);
    f.render_widget(leagues_block, right);
    let mut leagues: Vec<Line> = catalog
        .country()
        .map(|c| c.leagues.as_slice())
        .unwrap_or_default()
        .iter()
        .enumerate()
        .map(|(idx, l)| {
            Line::from(Span::styled(
                l.name.clone(),
                row_style(idx == catalog.selected_league, catalog.focus == CatalogFocus::Leagues),
            ))
        })
        .collect();
    leagues.push(Line::from(""));
    leagues.push(Line::from(Span::styled(
        "Tab=switch pane  Enter=show matches",
        Style::default().fg(palette.dim),
    )));
    f.render_widget(Paragraph::new(leagues), leagues_inner);
}

// ---------------------------------------------------------------------------
// Settings
// ---------------------------------------------------------------------------

fn draw_settings(f: &mut Frame, area: Rect, app: &App, palette: Palette) {
    let block = default_border(palette.fg).title(" Settings ");
    let inner = block.inner(area);
    f.render_widget(block, area);

    let mut lines: Vec<Line> = SettingsField::ALL
        .iter()
        .enumerate()
        .map(|(idx, field)| {
            let mut style = Style::default().fg(palette.fg);
            if idx == app.state.settings_cursor {
                style = style.add_modifier(Modifier::REVERSED);
            }
            Line::from(Span::styled(
                format!("{:<24}{}", field.label(), field.value(&app.state.user)),
                style,
            ))
        })
        .collect();
    lines.push(Line::from(""));
    lines.push(Line::from(Span::styled(
        "Keys: j/k=move  Space/Enter=toggle  ←/→=refresh interval (15-120s)",
        Style::default().fg(palette.dim),
    )));
    f.render_widget(Paragraph::new(lines), inner);
}

// ---------------------------------------------------------------------------
// Match detail
// ---------------------------------------------------------------------------

fn draw_match_detail(f: &mut Frame, area: Rect, app: &App, palette: Palette) {
    let block = default_border(palette.fg).title(" Match Detail ");
    let inner = block.inner(area);
    f.render_widget(block, area);

    let detail = &app.state.detail;
    let m = match &detail.lookup {
        DetailLookup::Idle => {
            draw_message(f, inner, "Select a match and press Enter", palette);
            return;
        }
        DetailLookup::Loading => {
            draw_message(f, inner, "Loading match...", palette);
            return;
        }
        DetailLookup::NotFound => {
            draw_message(f, inner, "Match not found", palette);
            return;
        }
        DetailLookup::Found(m) => m.as_ref(),
    };

    let [header, tabs, content] =
        Layout::vertical([Constraint::Length(5), Constraint::Length(1), Constraint::Fill(1)]).areas(inner);

    draw_detail_header(f, header, app, m, palette);

    let user = &app.state.user;
    let mut spans = Vec::new();
    for tab in [DetailTab::Events, DetailTab::Stats, DetailTab::Odds] {
        if tab == DetailTab::Odds && !user.show_odds {
            continue;
        }
        let mut style = Style::default().fg(palette.dim);
        if tab == detail.tab {
            style = Style::default().fg(palette.accent).add_modifier(Modifier::UNDERLINED);
        }
        spans.push(Span::styled(format!(" {} ", tab.label()), style));
    }
    spans.push(Span::styled("  (Tab to switch, j/k scroll, * favorite)", Style::default().fg(palette.dim)));
    f.render_widget(Paragraph::new(Line::from(spans)), tabs);

    let lines = match detail.tab {
        DetailTab::Events => event_lines(m, palette),
        DetailTab::Stats => stat_lines(m),
        DetailTab::Odds => odds_lines(m),
    };
    f.render_widget(Paragraph::new(lines).scroll((detail.scroll_offset, 0)), content);
}

fn draw_detail_header(f: &mut Frame, area: Rect, app: &App, m: &Match, palette: Palette) {
    let star = if app.state.detail.is_favorite { "★ " } else { "" };
    let minute = match (m.is_live(), m.current_minute) {
        (true, Some(minute)) => format!(" {minute}'"),
        _ => String::new(),
    };
    let mut lines = vec![
        Line::from(Span::styled(
            format!("{star}{} · {}", m.league_name, m.country_name),
            Style::default().fg(palette.dim),
        )),
        Line::from(Span::styled(
            format!("{}  {}  {}", m.home_team.name, score_text(m, false), m.away_team.name),
            Style::default().fg(palette.fg).add_modifier(Modifier::BOLD),
        )),
        Line::from(Span::styled(
            format!("{}{minute}", m.status.description),
            Style::default().fg(palette.phase(m.phase())),
        )),
    ];
    if app.state.user.show_half_time_score
        && let Some(ht) = m.half_time_score
    {
        lines.push(Line::from(format!("Half time: {} - {}", ht.home, ht.away)));
    }
    if m.phase() == Phase::Upcoming {
        lines.push(Line::from(format!("Kickoff {}", kickoff_time(&m.start_time))));
    }
    f.render_widget(Paragraph::new(lines).alignment(Alignment::Center), area);
}

fn event_lines(m: &Match, palette: Palette) -> Vec<Line<'static>> {
    let events = m.sorted_events();
    if events.is_empty() {
        return vec![Line::from(Span::styled("No events yet", Style::default().fg(palette.dim)))];
    }
    events
        .into_iter()
        .map(|e| {
            let team = match e.team {
                Side::Home => m.home_team.display_short(),
                Side::Away => m.away_team.display_short(),
            };
            Line::from(format!("{:>3}' {} {:<4} {}", e.minute, e.kind.glyph(), team, e.describe()))
        })
        .collect()
}

fn stat_lines(m: &Match) -> Vec<Line<'static>> {
    let Some(stats) = m.statistics.as_ref() else {
        return vec![Line::from("No statistics available")];
    };
    let mut lines = vec![Line::from(format!(
        "{:>6}  {:^18}  {:<6}",
        m.home_team.display_short(),
        "",
        m.away_team.display_short()
    ))];
    lines.extend(
        stats
            .rows()
            .into_iter()
            .map(|(label, pair)| Line::from(format!("{:>6}  {label:^18}  {:<6}", pair.home, pair.away))),
    );
    lines
}

fn odds_lines(m: &Match) -> Vec<Line<'static>> {
    match m.odds {
        Some(odds) => vec![
            Line::from(format!("1  {:<20} {:.2}", m.home_team.name, odds.home)),
            Line::from(format!("X  {:<20} {:.2}", "Draw", odds.draw)),
            Line::from(format!("2  {:<20} {:.2}", m.away_team.name, odds.away)),
        ],
        None => vec![Line::from("No odds available")],
    }
}

// ---------------------------------------------------------------------------
// Help, logs and spinner
// ---------------------------------------------------------------------------

fn draw_help(f: &mut Frame, area: Rect, palette: Palette) {
    let block = default_border(palette.dim).title(" Help ");
    let inner = block.inner(area);
    f.render_widget(block, area);
    f.render_widget(Paragraph::new(HELP_TEXT).style(Style::default().fg(palette.fg)), inner);
}

fn draw_logs(f: &mut Frame, area: Rect, palette: Palette) {
    let logs = TuiLoggerWidget::default()
        .block(default_border(palette.dim).title(" Logs "))
        .style_error(Style::default().fg(Color::Red))
        .style_warn(Style::default().fg(Color::Yellow))
        .style_info(Style::default().fg(palette.fg))
        .style_debug(Style::default().fg(palette.dim))
        .output_target(false)
        .output_file(false)
        .output_line(false);
    f.render_widget(logs, area);
}

fn draw_message(f: &mut Frame, area: Rect, msg: &str, palette: Palette) {
    f.render_widget(
        Paragraph::new(msg.to_string())
            .style(Style::default().fg(palette.dim))
            .alignment(Alignment::Center),
        area,
    );
}

fn draw_loading_spinner(f: &mut Frame, area: Rect, app: &App, loading: LoadingState) {
    if !loading.is_loading && loading.spinner_char != ERROR_CHAR {
        return;
    }
    let style = match loading.spinner_char {
        ERROR_CHAR => Style::default().fg(Color::Red),
        _ => Style::default().fg(Color::White),
    };
    let spinner = Paragraph::new(loading.spinner_char.to_string())
        .alignment(Alignment::Right)
        .style(style);
    let area = if app.settings.full_screen {
        Rect::new(area.width.saturating_sub(3), area.height.saturating_sub(2), 1, 1)
    } else {
        Rect::new(area.width.saturating_sub(11), 1, 1, 1)
    };
    f.render_widget(spinner, area);
}
