use tui::backend::Backend;
use tui::layout::{Alignment, Constraint, Layout, Rect};
use tui::style::{Color, Modifier, Style};
use tui::text::{Line, Span};
use tui::widgets::{Block, BorderType, Borders, Paragraph, Row, Table, TableState, Tabs, Wrap};
use tui::{Frame, Terminal};
use tui_logger::TuiLoggerWidget;

use crate::app::{App, MenuItem};
use crate::state::app_state::Loadable;
use crate::state::i18n::{Text, format_datetime, format_decimal, format_time, tr};
use crate::state::match_stream::StreamMode;
use crate::state::network::{ERROR_CHAR, LoadingState};
use crate::state::tournament_form::PLAYERS_PER_COURT;
use crate::ui::layout::LayoutAreas;
use scorebook_api::{MatchRow, MatchStatus, SetScore, Side};

const TABS: [(MenuItem, Text); 6] = [
    (MenuItem::Matches, Text::TabMatches),
    (MenuItem::Match, Text::TabMatch),
    (MenuItem::Leaderboard, Text::TabLeaderboard),
    (MenuItem::Players, Text::TabPlayers),
    (MenuItem::Tournaments, Text::TabTournaments),
    (MenuItem::Settings, Text::TabSettings),
];

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
        layout.update(f.area(), app.settings.user.full_screen, app.state.show_logs);

        if !app.settings.user.full_screen {
            draw_tabs(f, layout.tab_bar, app);
        }

        match app.state.active_tab {
            MenuItem::Matches => draw_matches(f, layout.main, app),
            MenuItem::Match => draw_match_detail(f, layout.main, app),
            MenuItem::Leaderboard => draw_leaderboard(f, layout.main, app),
            MenuItem::Players => draw_players(f, layout.main, app),
            MenuItem::Tournaments => draw_tournaments(f, layout.main, app),
            MenuItem::Settings => draw_settings(f, layout.main, app),
            MenuItem::Help => draw_help(f, layout.main, app),
        }

        if let Some(logs) = layout.logs {
            draw_logs(f, logs);
        }
        draw_status_line(f, layout.status, app);
        draw_loading_spinner(f, f.area(), app, loading);
    });
    if let Err(e) = result {
        log::error!("draw failed: {e}");
    }
}

pub fn default_border<'a>(color: Color) -> Block<'a> {
    Block::default()
        .borders(Borders::ALL)
        .border_type(BorderType::Rounded)
        .border_style(Style::default().fg(color))
}

fn locale(app: &App) -> &str {
    &app.state.locale.locale
}

fn draw_tabs(f: &mut Frame, tab_bar: [Rect; 2], app: &App) {
    let style = Style::default().fg(Color::White);
    let border_type = BorderType::Rounded;

    let tab_index = TABS
        .iter()
        .position(|(item, _)| *item == app.state.active_tab)
        .unwrap_or(0);

    let titles: Vec<Line> = TABS
        .iter()
        .enumerate()
        .map(|(i, (_, text))| Line::from(format!("{} {}", i + 1, tr(locale(app), *text))))
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

    let help = Paragraph::new(format!("{}: ? ", tr(locale(app), Text::TabHelp)))
        .alignment(Alignment::Right)
        .block(
            Block::default()
                .borders(Borders::RIGHT | Borders::BOTTOM | Borders::TOP)
                .border_type(border_type),
        )
        .style(style);
    f.render_widget(help, tab_bar[1]);
}

/// Renders the loading or failure placeholder, or hands back the data.
fn loaded<'a, T>(f: &mut Frame, area: Rect, app: &App, value: &'a Loadable<T>) -> Option<&'a T> {
    let (msg, color) = match value {
        Loadable::Ready(data) => return Some(data),
        Loadable::Idle | Loadable::Pending => (tr(locale(app), Text::Loading).to_string(), Color::DarkGray),
        Loadable::Failed(err) => (
            format!(
                "{}: {err}\n{}",
                tr(locale(app), Text::FailedToLoad),
                tr(locale(app), Text::PressRetry)
            ),
            Color::Red,
        ),
    };
    f.render_widget(
        Paragraph::new(msg)
            .style(Style::default().fg(color))
            .alignment(Alignment::Center)
            .wrap(Wrap { trim: true }),
        area,
    );
    None
}

fn draw_empty(f: &mut Frame, area: Rect, msg: &str) {
    f.render_widget(
        Paragraph::new(msg)
            .style(Style::default().fg(Color::DarkGray))
            .alignment(Alignment::Center),
        area,
    );
}

fn score_label(row: &MatchRow) -> String {
    match (row.sets_won(Side::A), row.sets_won(Side::B)) {
        (Some(a), Some(b)) => format!("{a}-{b}"),
        (Some(a), None) => format!("{a}-0"),
        (None, Some(b)) => format!("0-{b}"),
        (None, None) => "-".to_string(),
    }
}

fn status_style(status: MatchStatus) -> Style {
    match status {
        MatchStatus::InProgress => Style::default().fg(Color::Green).add_modifier(Modifier::BOLD),
        MatchStatus::Final => Style::default().fg(Color::Gray),
        MatchStatus::Scheduled => Style::default().fg(Color::Yellow),
    }
}

fn draw_matches(f: &mut Frame, area: Rect, app: &App) {
    let sport_label = match &app.state.directory.sport_filter {
        Some(id) => app.state.directory.sport_name(id).to_string(),
        None => tr(locale(app), Text::AllSports).to_string(),
    };
    let block = default_border(Color::White)
        .title(format!(" {} | {sport_label} ", tr(locale(app), Text::TabMatches)));
    let inner = block.inner(area);
    f.render_widget(block, area);

    let [legend, content] =
        Layout::vertical([Constraint::Length(1), Constraint::Fill(1)]).areas(inner);
    f.render_widget(
        Paragraph::new("Keys: j/k=move  Enter=open  s=sport  R=refresh")
            .style(Style::default().fg(Color::DarkGray)),
        legend,
    );

    let Some(rows) = loaded(f, content, app, &app.state.matches.rows) else {
        return;
    };
    if rows.is_empty() {
        draw_empty(f, content, tr(locale(app), Text::NoMatches));
        return;
    }

    let tz = app.state.locale.tz();
    let dir = &app.state.directory;
    let table_rows: Vec<Row> = rows
        .iter()
        .map(|m| {
            let when = m
                .played_at
                .map(|t| format_datetime(t, locale(app), tz))
                .unwrap_or_default();
            let mut kind = dir.sport_name(&m.sport_id).to_string();
            if m.is_friendly {
                kind.push_str(&format!(" ({})", tr(locale(app), Text::Friendly)));
            }
            Row::new(vec![
                when,
                kind,
                dir.side_label(m.players_on(Side::A)),
                score_label(m),
                dir.side_label(m.players_on(Side::B)),
                m.location.clone().unwrap_or_default(),
            ])
        })
        .collect();

    let table = Table::new(
        table_rows,
        [
            Constraint::Length(18),
            Constraint::Length(16),
            Constraint::Fill(2),
            Constraint::Length(5),
            Constraint::Fill(2),
            Constraint::Fill(1),
        ],
    )
    .header(
        Row::new(vec!["When", "Sport", "Side A", "", "Side B", "Where"])
            .style(Style::default().fg(Color::Gray).add_modifier(Modifier::BOLD)),
    )
    .row_highlight_style(Style::default().fg(Color::Black).bg(Color::Cyan));

    let mut table_state = TableState::default().with_selected(Some(app.state.matches.selected));
    f.render_stateful_widget(table, content, &mut table_state);
}

fn draw_match_detail(f: &mut Frame, area: Rect, app: &App) {
    let block = default_border(Color::White).title(format!(" {} ", tr(locale(app), Text::TabMatch)));
    let inner = block.inner(area);
    f.render_widget(block, area);

    let state = &app.state.match_detail;
    if state.match_id.is_none() {
        draw_empty(f, inner, tr(locale(app), Text::NoSelection));
        return;
    }

    let [header, sets_area, feeds] = Layout::vertical([
        Constraint::Length(4),
        Constraint::Length(6),
        Constraint::Fill(1),
    ])
    .areas(inner);

    let Some(detail) = loaded(f, header, app, &state.detail) else {
        return;
    };
    let dir = &app.state.directory;
    let tz = app.state.locale.tz();

    let (stream_label, stream_color) = match state.stream_mode {
        StreamMode::Live if detail.is_live() => (tr(locale(app), Text::Live), Color::Green),
        StreamMode::Live => (tr(locale(app), Text::Live), Color::Gray),
        StreamMode::Polling => (tr(locale(app), Text::Polling), Color::Yellow),
        StreamMode::Idle => ("-", Color::DarkGray),
    };
    let when = detail
        .played_at
        .map(|t| format_datetime(t, locale(app), tz))
        .unwrap_or_default();
    let mut header_lines = vec![
        Line::from(vec![
            Span::styled(detail.status.label(), status_style(detail.status)),
            Span::raw("  "),
            Span::raw(dir.sport_name(&detail.sport_id).to_string()),
            Span::raw("  "),
            Span::raw(when),
            Span::raw("  "),
            Span::styled(format!("[{stream_label}]"), Style::default().fg(stream_color)),
        ]),
        Line::from(format!("A: {}", dir.side_label(detail.players_on(Side::A)))),
        Line::from(format!("B: {}", dir.side_label(detail.players_on(Side::B)))),
    ];
    if let Some(location) = &detail.location {
        header_lines.push(Line::from(Span::styled(location.clone(), Style::default().fg(Color::DarkGray))));
    }
    f.render_widget(Paragraph::new(header_lines), header);

    let sets_block = default_border(Color::DarkGray).title(format!(" {} ", tr(locale(app), Text::Sets)));
    let sets_inner = sets_block.inner(sets_area);
    f.render_widget(sets_block, sets_area);
    if detail.sets.is_empty() {
        draw_empty(f, sets_inner, "-");
    } else {
        let widths: Vec<Constraint> = std::iter::once(Constraint::Length(3))
            .chain(detail.sets.iter().map(|_| Constraint::Length(4)))
            .collect();
        let table = Table::new(
            vec![set_row(Side::A, &detail.sets), set_row(Side::B, &detail.sets)],
            widths,
        );
        f.render_widget(table, sets_inner);
    }

    let [chat_area, comments_area] =
        Layout::horizontal([Constraint::Percentage(55), Constraint::Percentage(45)]).areas(feeds);

    let chat_block = default_border(Color::DarkGray).title(format!(" {} (c) ", tr(locale(app), Text::Chat)));
    let chat_inner = chat_block.inner(chat_area);
    f.render_widget(chat_block, chat_area);
    let chat_lines: Vec<Line> = state
        .chat
        .iter()
        .map(|m| {
            let time = m.created_at.map(|t| format_time(t, locale(app), tz)).unwrap_or_default();
            Line::from(vec![
                Span::styled(format!("[{time}] {}: ", m.username), Style::default().fg(Color::Gray)),
                Span::raw(m.body.clone()),
            ])
        })
        .collect();
    let visible = chat_inner.height as usize;
    let start = chat_lines.len().saturating_sub(visible);
    f.render_widget(Paragraph::new(chat_lines[start..].to_vec()), chat_inner);

    let comments_block = default_border(Color::DarkGray)
        .title(format!(" {} (m add, x delete) ", tr(locale(app), Text::Comments)));
    let comments_inner = comments_block.inner(comments_area);
    f.render_widget(comments_block, comments_area);
    let comment_lines: Vec<Line> = state
        .comments
        .iter()
        .enumerate()
        .map(|(i, c)| {
            let marker = if i == state.selected_comment { ">" } else { " " };
            Line::from(format!("{marker} {}: {}", c.username, c.content))
        })
        .collect();
    f.render_widget(Paragraph::new(comment_lines).wrap(Wrap { trim: true }), comments_inner);
}

fn set_row(side: Side, sets: &[SetScore]) -> Row<'static> {
    let mut cells = vec![side.as_str().to_string()];
    cells.extend(sets.iter().map(|s| match side {
        Side::A => s.a.to_string(),
        Side::B => s.b.to_string(),
    }));
    Row::new(cells)
}

fn draw_leaderboard(f: &mut Frame, area: Rect, app: &App) {
    let sport = app
        .state
        .directory
        .focused_sport()
        .map(|id| app.state.directory.sport_name(&id).to_string())
        .unwrap_or_default();
    let block = default_border(Color::White)
        .title(format!(" {} | {sport} ", tr(locale(app), Text::TabLeaderboard)));
    let inner = block.inner(area);
    f.render_widget(block, area);

    let Some(board) = loaded(f, inner, app, &app.state.leaderboard.board) else {
        return;
    };
    if board.entries.is_empty() {
        draw_empty(f, inner, tr(locale(app), Text::NoPlayers));
        return;
    }

    let rows: Vec<Row> = board
        .entries
        .iter()
        .skip(app.state.leaderboard.scroll)
        .map(|e| {
            Row::new(vec![
                e.rank.to_string(),
                e.player_name.clone(),
                e.rating.map(|r| format_decimal(r, 1, locale(app))).unwrap_or_else(|| "-".into()),
                e.sets_won.to_string(),
                e.sets_lost.to_string(),
                e.matches_played.to_string(),
            ])
        })
        .collect();
    let header = Row::new(vec![
        "#",
        "",
        tr(locale(app), Text::Rating),
        tr(locale(app), Text::Won),
        tr(locale(app), Text::Lost),
        tr(locale(app), Text::Played),
    ])
    .style(Style::default().fg(Color::Gray).add_modifier(Modifier::BOLD));
    let table = Table::new(
        rows,
        [
            Constraint::Length(4),
            Constraint::Fill(1),
            Constraint::Length(14),
            Constraint::Length(9),
            Constraint::Length(9),
            Constraint::Length(9),
        ],
    )
    .header(header);
    f.render_widget(table, inner);
}

fn draw_players(f: &mut Frame, area: Rect, app: &App) {
    let query = &app.state.players.query;
    let title = if query.is_empty() {
        format!(" {} ", tr(locale(app), Text::TabPlayers))
    } else {
        format!(" {} | /{query} ", tr(locale(app), Text::TabPlayers))
    };
    let block = default_border(Color::White).title(title);
    let inner = block.inner(area);
    f.render_widget(block, area);

    let Some(page) = loaded(f, inner, app, &app.state.players.page) else {
        return;
    };
    if page.players.is_empty() {
        draw_empty(f, inner, tr(locale(app), Text::NoPlayers));
        return;
    }

    let rows: Vec<Row> = page
        .players
        .iter()
        .map(|p| {
            let club = p
                .club_id
                .as_deref()
                .and_then(|id| app.state.directory.club_name(id))
                .unwrap_or("")
                .to_string();
            let badges = p
                .badges
                .iter()
                .map(|b| b.icon.clone().unwrap_or_else(|| b.name.clone()))
                .collect::<Vec<_>>()
                .join(" ");
            Row::new(vec![p.name.clone(), club, badges])
        })
        .collect();
    let table = Table::new(rows, [Constraint::Fill(2), Constraint::Fill(1), Constraint::Fill(2)])
        .header(Row::new(vec!["Name", "Club", "Badges"]).style(Style::default().fg(Color::Gray)))
        .row_highlight_style(Style::default().fg(Color::Black).bg(Color::Cyan));
    let mut table_state = TableState::default().with_selected(Some(app.state.players.selected));
    f.render_stateful_widget(table, inner, &mut table_state);
}

fn draw_tournaments(f: &mut Frame, area: Rect, app: &App) {
    if app.state.tournaments.form.is_some() {
        draw_tournament_form(f, area, app);
        return;
    }

    let block = default_border(Color::White).title(format!(
        " {} | n={} ",
        tr(locale(app), Text::TabTournaments),
        tr(locale(app), Text::NewTournament)
    ));
    let inner = block.inner(area);
    f.render_widget(block, area);

    let (list_area, schedule_area) = match app.state.tournaments.schedule {
        Some(_) => {
            let [left, right] =
                Layout::horizontal([Constraint::Percentage(35), Constraint::Percentage(65)]).areas(inner);
            (left, Some(right))
        }
        None => (inner, None),
    };

    if let Some(list) = loaded(f, list_area, app, &app.state.tournaments.list) {
        if list.is_empty() {
            draw_empty(f, list_area, tr(locale(app), Text::NoTournaments));
        } else {
            let lines: Vec<Line> = list
                .iter()
                .enumerate()
                .map(|(i, t)| {
                    let marker = if i == app.state.tournaments.selected { ">" } else { " " };
                    Line::from(format!(
                        "{marker} {}  ({})",
                        t.name,
                        app.state.directory.sport_name(&t.sport_id)
                    ))
                })
                .collect();
            f.render_widget(Paragraph::new(lines), list_area);
        }
    }

    if let (Some(area), Some(schedule)) = (schedule_area, app.state.tournaments.schedule.as_ref()) {
        let block = default_border(Color::Green).title(format!(" {} ", schedule.tournament.name));
        let inner = block.inner(area);
        f.render_widget(block, area);

        let dir = &app.state.directory;
        let mut lines = Vec::new();
        for (round, matches) in schedule.rounds() {
            lines.push(Line::from(Span::styled(
                format!("{} {round}", tr(locale(app), Text::Round)),
                Style::default().add_modifier(Modifier::BOLD),
            )));
            for m in matches {
                lines.push(Line::from(format!(
                    "  {} {}: {}  vs  {}",
                    tr(locale(app), Text::Court),
                    m.court,
                    dir.side_label(m.players_on(Side::A)),
                    dir.side_label(m.players_on(Side::B))
                )));
            }
        }
        f.render_widget(Paragraph::new(lines), inner);
    }
}

fn draw_tournament_form(f: &mut Frame, area: Rect, app: &App) {
    let Some(form) = app.state.tournaments.form.as_ref() else {
        return;
    };
    let block = default_border(Color::Yellow).title(format!(" {} ", tr(locale(app), Text::NewTournament)));
    let inner = block.inner(area);
    f.render_widget(block, area);

    let [fields, roster] =
        Layout::horizontal([Constraint::Percentage(45), Constraint::Percentage(55)]).areas(inner);

    let sport = form
        .sport_id
        .as_deref()
        .map(|id| app.state.directory.sport_name(id))
        .unwrap_or("-");
    let mut lines = vec![
        Line::from(format!("Name:    {}", if form.name.is_empty() { "(i to edit)" } else { form.name.as_str() })),
        Line::from(format!("Sport:   {sport}")),
        Line::from(format!("Courts:  {}  (+/-)", form.court_count)),
        Line::from(format!(
            "Players: {} selected, {} needed per court",
            form.selected_players.len(),
            PLAYERS_PER_COURT
        )),
        Line::from(""),
        Line::from(Span::styled(
            "space=toggle player  Enter=create  Esc=cancel",
            Style::default().fg(Color::DarkGray),
        )),
    ];
    if form.submitting {
        lines.push(Line::from(Span::styled(
            tr(locale(app), Text::Loading),
            Style::default().fg(Color::Yellow),
        )));
    }
    if let Some(err) = &form.error {
        lines.push(Line::from(Span::styled(err.clone(), Style::default().fg(Color::Red))));
    }
    f.render_widget(Paragraph::new(lines).wrap(Wrap { trim: true }), fields);

    let players = &app.state.directory.players;
    if players.is_empty() {
        draw_empty(f, roster, tr(locale(app), Text::NoPlayers));
        return;
    }
    let visible = roster.height.max(1) as usize;
    let start = form.cursor.saturating_sub(visible.saturating_sub(1));
    let roster_lines: Vec<Line> = players
        .iter()
        .enumerate()
        .skip(start)
        .take(visible)
        .map(|(i, p)| {
            let check = if form.is_selected(&p.id) { "[x]" } else { "[ ]" };
            let style = if i == form.cursor {
                Style::default().fg(Color::Black).bg(Color::Cyan)
            } else {
                Style::default()
            };
            Line::from(Span::styled(format!("{check} {}", p.name), style))
        })
        .collect();
    f.render_widget(Paragraph::new(roster_lines), roster);
}

fn draw_settings(f: &mut Frame, area: Rect, app: &App) {
    let block = default_border(Color::White).title(format!(" {} ", tr(locale(app), Text::TabSettings)));
    let inner = block.inner(area);
    f.render_widget(block, area);

    let resolved = &app.state.locale;
    let user = &app.settings.user;
    let label = Style::default().fg(Color::Gray);
    let lines = vec![
        Line::from(vec![
            Span::styled(format!("{:<14}", tr(locale(app), Text::Locale)), label),
            Span::raw(format!("{} ({})", resolved.locale, resolved.locale_source.label())),
        ]),
        Line::from(vec![
            Span::styled(format!("{:<14}", tr(locale(app), Text::Timezone)), label),
            Span::raw(format!("{} ({})", resolved.timezone, resolved.timezone_source.label())),
        ]),
        Line::from(vec![
            Span::styled(format!("{:<14}", "Preference"), label),
            Span::raw(format!(
                "locale={}  timezone={}",
                user.locale.as_deref().unwrap_or("auto"),
                user.timezone.as_deref().unwrap_or("auto")
            )),
        ]),
        Line::from(vec![
            Span::styled(format!("{:<14}", "Account"), label),
            Span::raw(match (&user.username, &user.token) {
                (Some(name), Some(_)) => format!("{name} (logged in)"),
                _ => "not logged in".to_string(),
            }),
        ]),
        Line::from(vec![
            Span::styled(format!("{:<14}", "Server"), label),
            Span::raw(app.settings.api_url.clone()),
        ]),
        Line::from(vec![
            Span::styled(format!("{:<14}", "File"), label),
            Span::raw(app.settings.path.display().to_string()),
        ]),
        Line::from(""),
        Line::from(Span::styled(
            "l=cycle locale  t=set timezone (empty for automatic)",
            Style::default().fg(Color::DarkGray),
        )),
    ];
    f.render_widget(Paragraph::new(lines), inner);
}

fn draw_help(f: &mut Frame, area: Rect, app: &App) {
    let block = default_border(Color::DarkGray).title(format!(" {} ", tr(locale(app), Text::TabHelp)));
    let inner = block.inner(area);
    f.render_widget(block, area);

    let text = "\
1-6        switch tab          ?/Esc   help / back
j/k        move selection      R       retry / refresh
f          full screen         \"       toggle logs
q          quit

Matches      Enter open match, s cycle sport
Match        c chat, m comment, x delete own comment, e record sets, Esc close
Leaderboard  s cycle sport
Players      / search, a add player
Tournaments  n new Americano; in the form: i name, space pick player, +/- courts, Enter create
Settings     l cycle locale, t set timezone";
    f.render_widget(Paragraph::new(text), inner);
}

fn draw_logs(f: &mut Frame, area: Rect) {
    let widget = TuiLoggerWidget::default()
        .block(default_border(Color::DarkGray).title(" Logs "))
        .style_error(Style::default().fg(Color::Red))
        .style_warn(Style::default().fg(Color::Yellow))
        .style_info(Style::default().fg(Color::Gray))
        .style_debug(Style::default().fg(Color::DarkGray));
    f.render_widget(widget, area);
}

fn draw_status_line(f: &mut Frame, area: Rect, app: &App) {
    let line = if let Some(input) = &app.state.input {
        Line::from(vec![
            Span::styled(format!("{}: ", input.mode.prompt()), Style::default().fg(Color::Yellow)),
            Span::raw(format!("{}_", input.buffer)),
        ])
    } else if let Some(err) = &app.state.last_error {
        Line::from(Span::styled(err.clone(), Style::default().fg(Color::Red)))
    } else if let Some(notice) = &app.state.notice {
        Line::from(Span::styled(notice.clone(), Style::default().fg(Color::Green)))
    } else {
        Line::from(Span::styled(
            format!("{} | {}", app.state.locale.locale, app.state.locale.timezone),
            Style::default().fg(Color::DarkGray),
        ))
    };
    f.render_widget(Paragraph::new(line), area);
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
    let area = if app.settings.user.full_screen {
        Rect::new(area.width.saturating_sub(3), area.height.saturating_sub(2), 1, 1)
    } else {
        Rect::new(area.width.saturating_sub(11), 1, 1, 1)
    };
    f.render_widget(spinner, area);
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::BTreeMap;

    #[test]
    fn score_label_reads_summary() {
        let mut row = MatchRow::default();
        assert_eq!(score_label(&row), "-");
        row.summary = Some(BTreeMap::from([(Side::A, 2), (Side::B, 1)]));
        assert_eq!(score_label(&row), "2-1");
        row.summary = Some(BTreeMap::from([(Side::B, 2)]));
        assert_eq!(score_label(&row), "0-2");
    }
}
