use std::collections::HashMap;

use log::error;
use tui::backend::Backend;
use tui::layout::{Alignment, Constraint, Direction, Layout, Rect};
use tui::style::{Color, Modifier, Style};
use tui::text::{Line, Span};
use tui::widgets::{Bar, BarChart, BarGroup, Block, BorderType, Borders, Clear, Paragraph, Tabs, Wrap};
use tui::{Frame, Terminal};
use tui_logger::{TuiLoggerLevelOutput, TuiLoggerWidget};

use crate::app::{App, MenuItem};
use crate::state::app_state::{AppState, InputMode, max_scroll};
use crate::state::editor::EditorState;
use crate::state::network::{ERROR_CHAR, LoadingState};
use crate::ui::layout::LayoutAreas;
use handball_api::filter::{ListView, filter};
use handball_api::form::FormPhase;
use handball_api::grouping::{Grouped, index_by_id};
use handball_api::stats::{format_goal_difference, format_win_rate, points_chart, standings};
use handball_api::{Game, GameStatus, Resource, Team, parse_api_date};

pub fn draw<B>(terminal: &mut Terminal<B>, app: &mut App, loading: LoadingState)
where
    B: Backend,
{
    let current_size = terminal.size().unwrap_or_default();
    if current_size.width <= 10 || current_size.height <= 10 {
        return;
    }

    let mut layout = LayoutAreas::new(current_size);

    let result = terminal.draw(|f| {
        layout.update(f.area(), app.settings.full_screen, app.state.show_logs);

        if !app.settings.full_screen {
            draw_tabs(f, layout.tab_bar, app);
        }

        let state = &app.state;
        match state.active_tab {
            MenuItem::Dashboard => draw_dashboard(f, layout.main, state),
            MenuItem::Fixtures => draw_fixtures(f, layout.main, state),
            MenuItem::Rankings => draw_rankings(f, layout.main, state),
            MenuItem::Teams => draw_teams(f, layout.main, state),
            MenuItem::Players => draw_players(f, layout.main, state),
            MenuItem::News => draw_news(f, layout.main, state),
            MenuItem::Admin => draw_admin(f, layout.main, state),
            MenuItem::Help => draw_help(f, layout.main),
        }

        if let Some(editor) = state.editor.as_ref() {
            draw_editor(f, layout.main, editor, state);
        }

        if let Some(logs) = layout.logs {
            draw_logs(f, logs);
        }

        let area = f.area();
        draw_loading_spinner(f, area, app, loading);
    });
    if result.is_err() {
        error!("failed to draw frame");
    }
}

pub fn default_border<'a>(color: Color) -> Block<'a> {
    Block::default()
        .borders(Borders::ALL)
        .border_type(BorderType::Rounded)
        .border_style(Style::default().fg(color))
}

fn draw_tabs(f: &mut Frame, tab_bar: [Rect; 2], app: &App) {
    let style = Style::default().fg(Color::White);
    let border_type = BorderType::Rounded;

    let tab_index = MenuItem::TABS
        .iter()
        .position(|t| *t == app.state.active_tab)
        .unwrap_or(0);

    let titles: Vec<Line> = MenuItem::TABS
        .iter()
        .enumerate()
        .map(|(i, t)| Line::from(format!("{} {}", i + 1, t.title())))
        .collect();
    let tabs = Tabs::new(titles)
        .block(
            Block::default()
                .borders(Borders::LEFT | Borders::BOTTOM | Borders::TOP)
                .border_type(border_type),
        )
        .highlight_style(Style::default().add_modifier(Modifier::UNDERLINED))
        .select(tab_index)
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
// Shared helpers
// ---------------------------------------------------------------------------

fn dim() -> Style {
    Style::default().fg(Color::DarkGray)
}

/// Bordered pane; returns the inner area.
fn pane(f: &mut Frame, area: Rect, title: &str) -> Rect {
    let block = default_border(Color::White).title(format!(" {title} "));
    let inner = block.inner(area);
    f.render_widget(block, area);
    inner
}

fn draw_message(f: &mut Frame, area: Rect, msg: &str, style: Style) {
    f.render_widget(
        Paragraph::new(msg.to_owned())
            .style(style)
            .alignment(Alignment::Center)
            .wrap(Wrap { trim: true }),
        area,
    );
}

/// Placeholder text for a view without data: the load error, or a loading note.
fn draw_unloaded(f: &mut Frame, area: Rect, error: Option<&str>, what: &str) {
    match error {
        Some(err) => draw_message(f, area, &format!("Could not load {what}.\n{err}"), Style::default().fg(Color::Red)),
        None => draw_message(f, area, &format!("Loading {what}..."), dim()),
    }
}

fn error_line(error: Option<&str>) -> Option<Line<'static>> {
    error.map(|err| Line::from(Span::styled(format!("! {err}"), Style::default().fg(Color::Red))))
}

fn key_legend(text: &str) -> Line<'static> {
    Line::from(Span::styled(text.to_owned(), dim()))
}

fn format_date(raw: Option<&str>) -> String {
    match raw {
        Some(raw) => parse_api_date(raw)
            .map(|d| d.format("%Y-%m-%d %H:%M").to_string())
            .unwrap_or_else(|| raw.to_owned()),
        None => "TBD".to_owned(),
    }
}

fn team_name<'a>(teams: &HashMap<u64, &'a Team>, id: Option<u64>) -> &'a str {
    id.and_then(|id| teams.get(&id))
        .map(|t| t.name.as_str())
        .unwrap_or("TBD")
}

fn status_style(status: GameStatus) -> Style {
    match status {
        GameStatus::Live => Style::default().fg(Color::Green).add_modifier(Modifier::BOLD),
        GameStatus::Completed => Style::default().fg(Color::White),
        GameStatus::Scheduled => Style::default().fg(Color::Cyan),
        GameStatus::Postponed | GameStatus::Cancelled => dim(),
    }
}

fn game_line(game: &Game, teams: &HashMap<u64, &Team>, indent: usize) -> Line<'static> {
    let score = match (game.home_score, game.away_score) {
        (Some(h), Some(a)) => format!("{h:>2} - {a:<2}"),
        _ => "  vs   ".to_owned(),
    };
    let mut spans = vec![
        Span::raw(" ".repeat(indent)),
        Span::styled(format!("{:<16} ", format_date(game.match_date.as_deref())), dim()),
        Span::raw(format!(
            "{:>18} {score} {:<18} ",
            team_name(teams, game.home_team_id),
            team_name(teams, game.away_team_id)
        )),
        Span::styled(format!("{:<10}", game.status.label()), status_style(game.status)),
    ];
    if let Some(outcome) = game.outcome() {
        spans.push(Span::styled(format!(" {}", outcome.label()), Style::default().fg(Color::Yellow)));
    }
    if let Some(venue) = game.venue.as_deref() {
        spans.push(Span::styled(format!("  @ {venue}"), dim()));
    }
    if let Some(referee) = game.referee.as_ref() {
        spans.push(Span::styled(format!("  ref {}", referee.name), dim()));
    }
    Line::from(spans)
}

/// Flatten a tournament → league → records tree into indented lines.
fn grouped_lines<T>(tree: &Grouped<T>, mut row: impl FnMut(&T) -> Line<'static>) -> Vec<Line<'static>> {
    let mut lines = Vec::new();
    for (tournament, leagues) in tree {
        lines.push(Line::from(Span::styled(
            tournament.clone(),
            Style::default().fg(Color::Yellow).add_modifier(Modifier::BOLD),
        )));
        for (league, items) in leagues {
            lines.push(Line::from(Span::styled(format!("  {league}"), Style::default().fg(Color::Cyan))));
            lines.extend(items.iter().map(&mut row));
        }
        lines.push(Line::from(""));
    }
    lines
}

fn visible_range(selected: usize, total: usize, visible: usize) -> (usize, usize) {
    if total == 0 {
        return (0, 0);
    }
    if total <= visible {
        return (0, total);
    }

    let mut start = selected.saturating_sub(visible / 2);
    if start + visible > total {
        start = total - visible;
    }
    (start, start + visible)
}

// ---------------------------------------------------------------------------
// Viewer tabs
// ---------------------------------------------------------------------------

fn draw_dashboard(f: &mut Frame, area: Rect, state: &AppState) {
    let inner = pane(f, area, "Dashboard");
    let Some(dashboard) = state.dashboard.data.as_ref() else {
        draw_unloaded(f, inner, state.dashboard.error.as_deref(), "dashboard");
        return;
    };

    let s = &dashboard.stats;
    let label = Style::default().fg(Color::Gray);
    let value = Style::default().fg(Color::White).add_modifier(Modifier::BOLD);
    let stat = |name: &str, n: String| vec![Span::styled(format!("{name:>16} "), label), Span::styled(format!("{n:<8}"), value)];

    let mut lines: Vec<Line> = Vec::new();
    lines.extend(error_line(state.dashboard.error.as_deref()));
    lines.push(Line::from([stat("Tournaments", s.tournaments.to_string()), stat("Leagues", s.leagues.to_string())].concat()));
    lines.push(Line::from([stat("Teams", s.teams.to_string()), stat("Players", s.players.to_string())].concat()));
    lines.push(Line::from([stat("Games", s.games.to_string()), stat("Live now", s.live_games.to_string())].concat()));
    lines.push(Line::from(
        [stat("Upcoming", s.upcoming_games.to_string()), stat("Completed", s.completed_games.to_string())].concat(),
    ));
    lines.push(Line::from(
        [stat("Active referees", s.active_referees.to_string()), stat("Goals scored", s.total_goals.to_string())].concat(),
    ));
    lines.push(Line::from(""));

    let teams = index_by_id(&dashboard.teams);
    lines.push(Line::from(Span::styled("Live", Style::default().fg(Color::Green).add_modifier(Modifier::BOLD))));
    if dashboard.live_games.is_empty() {
        lines.push(Line::from(Span::styled("  No games in progress", dim())));
    }
    lines.extend(dashboard.live_games.iter().map(|g| game_line(g, &teams, 2)));
    lines.push(Line::from(""));

    lines.push(Line::from(Span::styled("Recent results", Style::default().add_modifier(Modifier::BOLD))));
    if dashboard.recent_results.is_empty() {
        lines.push(Line::from(Span::styled("  No completed games yet", dim())));
    }
    lines.extend(dashboard.recent_results.iter().map(|g| game_line(g, &teams, 2)));

    f.render_widget(Paragraph::new(lines), inner);
}

fn draw_fixtures(f: &mut Frame, area: Rect, state: &AppState) {
    let inner = pane(f, area, "Fixtures");
    let fixtures_state = &state.fixtures;
    let Some(fixtures) = fixtures_state.remote.data.as_ref() else {
        draw_unloaded(f, inner, fixtures_state.remote.error.as_deref(), "fixtures");
        return;
    };

    let [header, content] = Layout::vertical([Constraint::Length(2), Constraint::Fill(1)]).areas(inner);
    let mut head = vec![
        Line::from(AppState::facet_label(&fixtures_state.query, Resource::Games)),
        key_legend("s=status  j/k=scroll  r=reload"),
    ];
    if let Some(err) = error_line(fixtures_state.remote.error.as_deref()) {
        head[1] = err;
    }
    f.render_widget(Paragraph::new(head), header);

    let games = match ListView::build(&fixtures.games, &fixtures_state.query) {
        ListView::NoData => return draw_message(f, content, "No fixtures scheduled yet.", dim()),
        ListView::NoMatches => return draw_message(f, content, "No fixtures match this filter.", dim()),
        ListView::Rows(rows) => rows.into_iter().cloned().collect::<Vec<Game>>(),
    };
    let teams = index_by_id(&fixtures.teams);
    let tree = fixtures.grouped(&games);
    let lines = grouped_lines(&tree, |g| game_line(g, &teams, 4));
    let last = max_scroll(lines.len());
    f.render_widget(Paragraph::new(lines).scroll((fixtures_state.scroll_offset.min(last), 0)), content);
}

fn draw_rankings(f: &mut Frame, area: Rect, state: &AppState) {
    let inner = pane(f, area, "Rankings");
    let rankings_state = &state.rankings;
    let Some(data) = rankings_state.remote.data.as_ref() else {
        draw_unloaded(f, inner, rankings_state.remote.error.as_deref(), "rankings");
        return;
    };

    let [header, content] = Layout::vertical([Constraint::Length(2), Constraint::Fill(1)]).areas(inner);
    let selected = rankings_state.selected_league();
    let league_label = selected.map_or("All leagues".to_owned(), |l| l.name.clone());
    f.render_widget(
        Paragraph::new(vec![
            Line::from(vec![
                Span::raw("League: "),
                Span::styled(format!("◀ {league_label} ▶"), Style::default().fg(Color::Yellow)),
            ]),
            error_line(rankings_state.remote.error.as_deref())
                .unwrap_or_else(|| key_legend("h/l=league  j/k=scroll  r=reload")),
        ]),
        header,
    );

    let rows = data.for_league(selected.map(|l| l.id));
    if rows.is_empty() {
        draw_message(f, content, "No rankings recorded for this league.", dim());
        return;
    }

    let (table_area, chart_area) = if content.width >= 100 {
        let [left, right] = Layout::horizontal([Constraint::Percentage(62), Constraint::Percentage(38)]).areas(content);
        (left, Some(right))
    } else {
        (content, None)
    };

    let teams = index_by_id(&data.teams);
    let mut lines = vec![Line::from(Span::styled(
        format!(
            "{:>3}  {:<20} {:>3} {:>3} {:>3} {:>3} {:>4} {:>4} {:>5} {:>4} {:>7}",
            "#", "Team", "P", "W", "D", "L", "GF", "GA", "GD", "Pts", "Win%"
        ),
        Style::default().add_modifier(Modifier::BOLD),
    ))];
    for (pos, r) in standings(&rows).into_iter().enumerate() {
        lines.push(Line::from(format!(
            "{:>3}  {:<20} {:>3} {:>3} {:>3} {:>3} {:>4} {:>4} {:>5} {:>4} {:>7}",
            pos + 1,
            team_name(&teams, r.team_id),
            r.played,
            r.wins,
            r.draws,
            r.losses,
            r.goals_for,
            r.goals_against,
            format_goal_difference(r.goal_difference()),
            r.points,
            format_win_rate(r.win_rate()),
        )));
    }
    let last = max_scroll(lines.len());
    f.render_widget(Paragraph::new(lines).scroll((rankings_state.scroll_offset.min(last), 0)), table_area);

    if let Some(chart_area) = chart_area {
        draw_points_chart(f, chart_area, points_chart(&rows, &data.teams));
    }
}

fn draw_points_chart(f: &mut Frame, area: Rect, data: Vec<(String, u64)>) {
    let bars: Vec<Bar> = data
        .into_iter()
        .map(|(label, points)| {
            Bar::default()
                .label(Line::from(label))
                .value(points)
                .text_value(points.to_string())
                .style(Style::default().fg(Color::Cyan))
        })
        .collect();
    let chart = BarChart::default()
        .block(default_border(Color::DarkGray).title(" Points "))
        .data(BarGroup::default().bars(&bars))
        .direction(Direction::Horizontal)
        .bar_width(1)
        .bar_gap(0);
    f.render_widget(chart, area);
}

fn draw_teams(f: &mut Frame, area: Rect, state: &AppState) {
    let inner = pane(f, area, "Teams");
    let rosters_state = &state.rosters;
    let Some(rosters) = rosters_state.remote.data.as_ref() else {
        draw_unloaded(f, inner, rosters_state.remote.error.as_deref(), "teams");
        return;
    };
    if rosters.teams.is_empty() {
        draw_message(f, inner, "No teams registered yet.", dim());
        return;
    }

    let mut lines: Vec<Line> = error_line(rosters_state.remote.error.as_deref()).into_iter().collect();
    let squad_sizes: HashMap<u64, usize> = rosters.players.iter().filter_map(|p| p.team_id).fold(HashMap::new(), |mut acc, id| {
        *acc.entry(id).or_default() += 1;
        acc
    });
    lines.extend(grouped_lines(&rosters.teams_grouped(), |t| {
        let mut spans = vec![Span::raw(format!("    {:<24}", t.name))];
        if let Some(coach) = t.coach.as_deref() {
            spans.push(Span::styled(format!(" coach {coach}"), dim()));
        }
        if let Some(city) = t.city.as_deref() {
            spans.push(Span::styled(format!("  {city}"), dim()));
        }
        spans.push(Span::raw(format!("  {} players", squad_sizes.get(&t.id).copied().unwrap_or(0))));
        Line::from(spans)
    }));
    let last = max_scroll(lines.len());
    f.render_widget(Paragraph::new(lines).scroll((rosters_state.teams_scroll.min(last), 0)), inner);
}

fn search_line(search: &str, active: bool) -> Line<'static> {
    let cursor = if active { "_" } else { "" };
    Line::from(vec![
        Span::raw("Search: "),
        Span::styled(format!("{search}{cursor}"), Style::default().fg(if active { Color::Yellow } else { Color::White })),
    ])
}

fn draw_players(f: &mut Frame, area: Rect, state: &AppState) {
    let inner = pane(f, area, "Players");
    let rosters_state = &state.rosters;
    let Some(rosters) = rosters_state.remote.data.as_ref() else {
        draw_unloaded(f, inner, rosters_state.remote.error.as_deref(), "players");
        return;
    };

    let [header, content] = Layout::vertical([Constraint::Length(3), Constraint::Fill(1)]).areas(inner);
    let query = &rosters_state.player_query;
    f.render_widget(
        Paragraph::new(vec![
            search_line(&query.search, state.input_mode == InputMode::Search),
            Line::from(AppState::facet_label(query, Resource::Players)),
            error_line(rosters_state.remote.error.as_deref())
                .unwrap_or_else(|| key_legend("/=search  p=position  j/k=scroll")),
        ]),
        header,
    );

    let players = match ListView::build(&rosters.players, query) {
        ListView::NoData => return draw_message(f, content, "No players registered yet.", dim()),
        ListView::NoMatches => return draw_message(f, content, "No players match your search.", dim()),
        ListView::Rows(rows) => rows.into_iter().cloned().collect::<Vec<_>>(),
    };
    let tree = rosters.players_grouped(&players);
    let teams = index_by_id(&rosters.teams);
    let lines = grouped_lines(&tree, |p| {
        let jersey = p.jersey_number.map_or("  ".to_owned(), |n| format!("{n:>2}"));
        Line::from(vec![
            Span::styled(format!("    {jersey} "), dim()),
            Span::raw(format!("{:<22} {:<14} {:<16}", p.name, p.position, team_name(&teams, p.team_id))),
            Span::styled(format!("{:>3}G", p.goals), Style::default().fg(Color::Yellow)),
            Span::raw(format!(" {:>3}A {:>3}MP", p.assists, p.matches_played)),
        ])
    });
    let last = max_scroll(lines.len());
    f.render_widget(Paragraph::new(lines).scroll((rosters_state.players_scroll.min(last), 0)), content);
}

fn draw_news(f: &mut Frame, area: Rect, state: &AppState) {
    let inner = pane(f, area, "News");
    let news_state = &state.news;
    let Some(news) = news_state.remote.data.as_deref() else {
        draw_unloaded(f, inner, news_state.remote.error.as_deref(), "news");
        return;
    };

    let [header, content] = Layout::vertical([Constraint::Length(3), Constraint::Fill(1)]).areas(inner);
    f.render_widget(
        Paragraph::new(vec![
            search_line(&news_state.query.search, state.input_mode == InputMode::Search),
            Line::from(AppState::facet_label(&news_state.query, Resource::News)),
            error_line(news_state.remote.error.as_deref())
                .unwrap_or_else(|| key_legend("/=search  c=category  j/k=select  Enter=read")),
        ]),
        header,
    );

    let rows = match ListView::build(news, &news_state.query) {
        ListView::NoData => return draw_message(f, content, "No news published yet.", dim()),
        ListView::NoMatches => return draw_message(f, content, "No articles match this filter.", dim()),
        ListView::Rows(rows) => rows,
    };
    let selected = news_state.selected.min(rows.len().saturating_sub(1));

    if news_state.show_detail
        && let Some(article) = rows.get(selected)
    {
        let mut lines = vec![
            Line::from(Span::styled(article.title.clone(), Style::default().add_modifier(Modifier::BOLD))),
            Line::from(Span::styled(
                format!(
                    "{} · {} · {}",
                    article.category,
                    article.author.as_deref().unwrap_or("staff"),
                    format_date(article.published_at.as_deref())
                ),
                dim(),
            )),
            Line::from(""),
        ];
        lines.extend(article.content.lines().map(|l| Line::from(l.to_owned())));
        f.render_widget(Paragraph::new(lines).wrap(Wrap { trim: false }), content);
        return;
    }

    let (start, end) = visible_range(selected, rows.len(), content.height as usize);
    let lines: Vec<Line> = rows[start..end]
        .iter()
        .enumerate()
        .map(|(i, n)| {
            let style = if start + i == selected {
                Style::default().fg(Color::Black).bg(Color::Yellow)
            } else {
                Style::default()
            };
            Line::from(Span::styled(
                format!("{:<16} {:<10} {:<10} {}", format_date(n.published_at.as_deref()), n.category, n.status, n.title),
                style,
            ))
        })
        .collect();
    f.render_widget(Paragraph::new(lines), content);
}

// ---------------------------------------------------------------------------
// Admin tab
// ---------------------------------------------------------------------------

fn draw_admin(f: &mut Frame, area: Rect, state: &AppState) {
    let admin = &state.admin;
    let inner = pane(f, area, &format!("Admin · {}", admin.resource.label()));

    let [header, content, footer] =
        Layout::vertical([Constraint::Length(3), Constraint::Fill(1), Constraint::Length(2)]).areas(inner);

    let resources: Vec<Span> = Resource::ALL
        .iter()
        .map(|r| {
            if *r == admin.resource {
                Span::styled(format!(" {} ", r.label()), Style::default().fg(Color::Black).bg(Color::Yellow))
            } else {
                Span::styled(format!(" {} ", r.label()), dim())
            }
        })
        .collect();
    let facets = if admin.resource.facets().is_empty() {
        "No filters for this collection".to_owned()
    } else {
        AppState::facet_label(&admin.query, admin.resource)
    };
    f.render_widget(
        Paragraph::new(vec![
            Line::from(resources),
            search_line(&admin.query.search, state.input_mode == InputMode::Search),
            Line::from(facets),
        ]),
        header,
    );

    match admin.remote.data.as_deref() {
        None => draw_unloaded(f, content, admin.remote.error.as_deref(), admin.resource.label()),
        Some([]) => draw_message(f, content, &format!("No {} yet.", admin.resource.label().to_lowercase()), dim()),
        Some(records) => {
            let rows = filter(records, &admin.query);
            if rows.is_empty() {
                draw_message(f, content, "Nothing matches the current search and filters.", dim());
            } else {
                let (start, end) = visible_range(admin.selected, rows.len(), content.height as usize);
                let lines: Vec<Line> = rows[start..end]
                    .iter()
                    .enumerate()
                    .map(|(i, record)| {
                        let style = if start + i == admin.selected {
                            Style::default().fg(Color::Black).bg(Color::Yellow)
                        } else {
                            Style::default()
                        };
                        Line::from(Span::styled(format!("{:>5}  {}", record.id(), record.summary()), style))
                    })
                    .collect();
                f.render_widget(Paragraph::new(lines), content);
            }
        }
    }

    let status = if let Some(id) = admin.pending_delete {
        Line::from(Span::styled(
            format!("Delete {} #{id}? Press y to confirm, any other key to cancel.", admin.resource.noun()),
            Style::default().fg(Color::Red).add_modifier(Modifier::BOLD),
        ))
    } else if let Some(err) = error_line(admin.remote.error.as_deref()) {
        err
    } else if let Some(notice) = admin.notice.as_deref() {
        Line::from(Span::styled(notice.to_owned(), Style::default().fg(Color::Green)))
    } else {
        Line::from("")
    };
    let legend = if admin.resource.is_editable() {
        "h/l=collection  j/k=select  /=search  f/g=filters  x=clear  n=new  e=edit  d=delete"
    } else {
        "h/l=collection  j/k=select  /=search  f/g=filters  x=clear  d=delete"
    };
    f.render_widget(Paragraph::new(vec![status, key_legend(legend)]), footer);
}

fn centered(area: Rect, width: u16, height: u16) -> Rect {
    let width = width.min(area.width);
    let height = height.min(area.height);
    Rect::new(
        area.x + (area.width - width) / 2,
        area.y + (area.height - height) / 2,
        width,
        height,
    )
}

fn draw_editor(f: &mut Frame, area: Rect, editor: &EditorState, state: &AppState) {
    let form = &editor.form;
    let fields = form.fields();
    let height = u16::try_from(fields.len()).unwrap_or(u16::MAX).saturating_mul(2).saturating_add(6);
    let popup = centered(area, 72, height);
    f.render_widget(Clear, popup);
    let block = default_border(Color::Yellow).title(editor.title());
    let inner = block.inner(popup);
    f.render_widget(block, popup);

    let mut lines = Vec::with_capacity(fields.len() * 2 + 4);
    for (idx, field) in fields.iter().enumerate() {
        let focused = idx == editor.focus;
        let marker = if focused { ">" } else { " " };
        let required = if field.required { "*" } else { "" };
        let value = editor.display_value(field, &state.form_options);
        let value_style = if focused {
            Style::default().fg(Color::Yellow).add_modifier(Modifier::BOLD)
        } else {
            Style::default()
        };
        lines.push(Line::from(vec![
            Span::raw(format!("{marker} {:<16}", format!("{}{required}", field.label))),
            Span::styled(value, value_style),
        ]));
        match form.errors().get(field.key) {
            Some(message) => lines.push(Line::from(Span::styled(
                format!("    {message}"),
                Style::default().fg(Color::Red),
            ))),
            None => lines.push(Line::from("")),
        }
    }

    if let Some(preview) = form.preview() {
        lines.push(Line::from(Span::styled(
            format!(
                "Points {}  Goal difference {}  Win rate {}",
                preview.points,
                format_goal_difference(preview.goal_difference),
                format_win_rate(preview.win_rate)
            ),
            Style::default().fg(Color::Cyan),
        )));
    }
    match (form.phase(), form.submit_error()) {
        _ if editor.loading => lines.push(Line::from(Span::styled("Loading latest copy...", dim()))),
        (FormPhase::Submitting, _) => lines.push(Line::from(Span::styled("Saving...", dim()))),
        (_, Some(err)) => lines.push(Line::from(Span::styled(err.to_owned(), Style::default().fg(Color::Red)))),
        _ => {}
    }
    lines.push(key_legend("↑/↓=field  ←/→=choose  Enter=save  Esc=cancel"));

    f.render_widget(Paragraph::new(lines), inner);
}

// ---------------------------------------------------------------------------
// Help, logs, spinner
// ---------------------------------------------------------------------------

fn draw_help(f: &mut Frame, area: Rect) {
    let inner = pane(f, area, "Help");
    let rows = [
        ("1-7", "switch tab"),
        ("?", "this help (Esc to leave)"),
        ("r", "reload the current tab"),
        ("j/k ↑/↓", "scroll or select"),
        ("h/l ←/→", "change league (Rankings) or collection (Admin)"),
        ("/", "search (Players, News, Admin)"),
        ("s p c", "cycle status, position or category filter"),
        ("f g x", "Admin: first filter, second filter, clear"),
        ("n e d y", "Admin: new, edit, delete, confirm delete"),
        ("Enter", "read article / submit form"),
        ("Esc", "cancel search or form"),
        ("\"", "toggle log pane"),
        ("z", "toggle full screen"),
        ("q Ctrl-c", "quit"),
    ];
    let lines: Vec<Line> = rows
        .iter()
        .map(|(key, what)| {
            Line::from(vec![
                Span::styled(format!("{key:>10}  "), Style::default().fg(Color::Yellow)),
                Span::raw(*what),
            ])
        })
        .collect();
    f.render_widget(Paragraph::new(lines), inner);
}

fn draw_logs(f: &mut Frame, area: Rect) {
    let widget = TuiLoggerWidget::default()
        .block(default_border(Color::DarkGray).title(" Logs "))
        .output_separator(' ')
        .output_timestamp(Some("%H:%M:%S".to_string()))
        .output_level(Some(TuiLoggerLevelOutput::Abbreviated))
        .output_target(false)
        .output_file(false)
        .output_line(false)
        .style_error(Style::default().fg(Color::Red))
        .style_warn(Style::default().fg(Color::Yellow));
    f.render_widget(widget, area);
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

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn visible_range_keeps_selection_in_view() {
        assert_eq!(visible_range(0, 0, 10), (0, 0));
        assert_eq!(visible_range(3, 5, 10), (0, 5));
        assert_eq!(visible_range(50, 100, 10), (45, 55));
        assert_eq!(visible_range(99, 100, 10), (90, 100));
    }

    #[test]
    fn dates_render_in_one_format() {
        assert_eq!(format_date(Some("2024-03-01")), "2024-03-01 00:00");
        assert_eq!(format_date(Some("2024-03-01T18:30:00Z")), "2024-03-01 18:30");
        assert_eq!(format_date(Some("someday")), "someday");
        assert_eq!(format_date(None), "TBD");
    }
}
