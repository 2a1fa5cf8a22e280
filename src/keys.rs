use crate::app::{App, MenuItem};
use crate::state::app_state::{InputMode, scroll_down, scroll_up};
use crate::state::messages::NetworkRequest;
use crossterm::event::KeyCode::Char;
use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
use handball_api::Resource;
use handball_api::filter::{ListQuery, filter};
use std::sync::Arc;
use tokio::sync::{Mutex, mpsc};

pub async fn handle_key_bindings(
    key_event: KeyEvent,
    app: &Arc<Mutex<App>>,
    network_requests: &mpsc::Sender<NetworkRequest>,
) {
    let mut guard = app.lock().await;

    if let (Char('c'), KeyModifiers::CONTROL) = (key_event.code, key_event.modifiers) {
        crate::cleanup_terminal();
        std::process::exit(0);
    }

    let request = match guard.state.input_mode {
        InputMode::Form => handle_form_keys(&mut guard, key_event),
        InputMode::Search => {
            handle_search_keys(&mut guard, key_event);
            None
        }
        InputMode::Normal => handle_normal_keys(&mut guard, key_event),
    };

    drop(guard);
    if let Some(request) = request {
        let _ = network_requests.send(request).await;
    }
}

fn handle_form_keys(app: &mut App, key_event: KeyEvent) -> Option<NetworkRequest> {
    let options = app.state.form_options.clone();
    match key_event.code {
        KeyCode::Esc => {
            app.close_editor();
            None
        }
        KeyCode::Enter => app.submit_editor(),
        code => {
            let editor = app.state.editor.as_mut().filter(|e| !e.loading)?;
            match code {
                KeyCode::Down | KeyCode::Tab => editor.focus_next(),
                KeyCode::Up | KeyCode::BackTab => editor.focus_prev(),
                KeyCode::Right => editor.cycle(&options, true),
                KeyCode::Left => editor.cycle(&options, false),
                KeyCode::Backspace => editor.backspace(),
                Char(c) => editor.type_char(c),
                _ => {}
            }
            None
        }
    }
}

fn handle_search_keys(app: &mut App, key_event: KeyEvent) {
    match key_event.code {
        KeyCode::Esc => {
            if let Some(search) = app.state.search_text_mut() {
                search.clear();
            }
            app.state.input_mode = InputMode::Normal;
        }
        KeyCode::Enter => app.state.input_mode = InputMode::Normal,
        KeyCode::Backspace => {
            if let Some(search) = app.state.search_text_mut() {
                search.pop();
            }
        }
        Char(c) => {
            if let Some(search) = app.state.search_text_mut() {
                search.push(c);
            }
        }
        _ => {}
    }
    // Any change to the search text invalidates the current row positions.
    app.state.admin.selected = 0;
    app.state.news.selected = 0;
    app.state.rosters.players_scroll = 0;
}

fn handle_normal_keys(app: &mut App, key_event: KeyEvent) -> Option<NetworkRequest> {
    // A pending delete consumes the next key: `y` confirms, anything else cancels.
    if app.state.admin.pending_delete.is_some() {
        return match key_event.code {
            Char('y') => app.confirm_delete(),
            _ => {
                app.state.admin.pending_delete = None;
                None
            }
        };
    }

    let state = &mut app.state;
    match (state.active_tab, key_event.code) {
        (_, Char('q')) => {
            crate::cleanup_terminal();
            std::process::exit(0);
        }

        // Tab switching
        (_, Char('1')) => app.update_tab(MenuItem::Dashboard),
        (_, Char('2')) => app.update_tab(MenuItem::Fixtures),
        (_, Char('3')) => app.update_tab(MenuItem::Rankings),
        (_, Char('4')) => app.update_tab(MenuItem::Teams),
        (_, Char('5')) => app.update_tab(MenuItem::Players),
        (_, Char('6')) => app.update_tab(MenuItem::News),
        (_, Char('7')) => app.update_tab(MenuItem::Admin),
        (_, Char('?')) => app.update_tab(MenuItem::Help),
        (MenuItem::Help, KeyCode::Esc) => {
            app.exit_help();
            None
        }
        (_, Char('r')) => app.load_request(),

        // Fixtures
        (MenuItem::Fixtures, Char('s')) => {
            cycle_facet(&mut state.fixtures.query, Resource::Games, 0);
            state.fixtures.scroll_offset = 0;
            None
        }
        (MenuItem::Fixtures, Char('j') | KeyCode::Down) => {
            let rows = state.fixtures.remote.data.as_ref().map_or(0, |f| f.games.len() * 2);
            scroll_down(&mut state.fixtures.scroll_offset, rows);
            None
        }
        (MenuItem::Fixtures, Char('k') | KeyCode::Up) => {
            scroll_up(&mut state.fixtures.scroll_offset);
            None
        }

        // Rankings
        (MenuItem::Rankings, Char('l') | KeyCode::Right) => {
            state.rankings.next_league();
            None
        }
        (MenuItem::Rankings, Char('h') | KeyCode::Left) => {
            state.rankings.prev_league();
            None
        }
        (MenuItem::Rankings, Char('j') | KeyCode::Down) => {
            let rows = state.rankings.remote.data.as_ref().map_or(0, |s| s.rankings.len());
            scroll_down(&mut state.rankings.scroll_offset, rows);
            None
        }
        (MenuItem::Rankings, Char('k') | KeyCode::Up) => {
            scroll_up(&mut state.rankings.scroll_offset);
            None
        }

        // Teams
        (MenuItem::Teams, Char('j') | KeyCode::Down) => {
            let rows = state.rosters.remote.data.as_ref().map_or(0, |r| r.teams.len() * 2);
            scroll_down(&mut state.rosters.teams_scroll, rows);
            None
        }
        (MenuItem::Teams, Char('k') | KeyCode::Up) => {
            scroll_up(&mut state.rosters.teams_scroll);
            None
        }

        // Players
        (MenuItem::Players, Char('/')) => {
            state.input_mode = InputMode::Search;
            None
        }
        (MenuItem::Players, Char('p')) => {
            cycle_facet(&mut state.rosters.player_query, Resource::Players, 0);
            state.rosters.players_scroll = 0;
            None
        }
        (MenuItem::Players, Char('j') | KeyCode::Down) => {
            let rows = state.rosters.remote.data.as_ref().map_or(0, |r| r.players.len() * 2);
            scroll_down(&mut state.rosters.players_scroll, rows);
            None
        }
        (MenuItem::Players, Char('k') | KeyCode::Up) => {
            scroll_up(&mut state.rosters.players_scroll);
            None
        }

        // News
        (MenuItem::News, Char('/')) => {
            state.input_mode = InputMode::Search;
            None
        }
        (MenuItem::News, Char('c')) => {
            cycle_facet(&mut state.news.query, Resource::News, 0);
            state.news.selected = 0;
            None
        }
        (MenuItem::News, Char('j') | KeyCode::Down) => {
            let len = state.news.remote.data.as_deref().map_or(0, |news| filter(news, &state.news.query).len());
            if state.news.selected + 1 < len {
                state.news.selected += 1;
            }
            None
        }
        (MenuItem::News, Char('k') | KeyCode::Up) => {
            state.news.selected = state.news.selected.saturating_sub(1);
            None
        }
        (MenuItem::News, KeyCode::Enter) => {
            state.news.show_detail = !state.news.show_detail;
            None
        }
        (MenuItem::News, KeyCode::Esc) => {
            state.news.show_detail = false;
            None
        }

        // Admin
        (MenuItem::Admin, Char('l') | KeyCode::Right | KeyCode::Tab) => Some(app.admin_switch_resource(true)),
        (MenuItem::Admin, Char('h') | KeyCode::Left | KeyCode::BackTab) => {
            Some(app.admin_switch_resource(false))
        }
        (MenuItem::Admin, Char('j') | KeyCode::Down) => {
            state.admin.select_next();
            None
        }
        (MenuItem::Admin, Char('k') | KeyCode::Up) => {
            state.admin.select_prev();
            None
        }
        (MenuItem::Admin, Char('/')) => {
            state.input_mode = InputMode::Search;
            None
        }
        (MenuItem::Admin, Char('f')) => {
            state.admin.cycle_facet(0);
            None
        }
        (MenuItem::Admin, Char('g')) => {
            state.admin.cycle_facet(1);
            None
        }
        (MenuItem::Admin, Char('x')) => {
            state.admin.clear_filters();
            None
        }
        (MenuItem::Admin, Char('n')) => app.open_editor(false),
        (MenuItem::Admin, Char('e') | KeyCode::Enter) => app.open_editor(true),
        (MenuItem::Admin, Char('d')) => {
            app.request_delete();
            None
        }

        // Global
        (_, Char('z')) => {
            app.toggle_full_screen();
            None
        }
        (_, Char('"')) => {
            app.toggle_show_logs();
            None
        }

        _ => None,
    }
}

fn cycle_facet(query: &mut ListQuery, resource: Resource, index: usize) {
    if let Some(facet) = resource.facets().get(index) {
        let next = facet.cycle(query.facet_value(facet.key));
        query.set_facet(facet.key, next);
    }
}
