//! Ratatui renderers for the screen view model.

use ratatui::{
    layout::{Alignment, Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Clear, Paragraph, Row, Table, TableState, Tabs, Wrap},
    Frame,
};

use moviedeck_core::{
    browser::{ModalView, MovieItem, PaginatorView, PanelView, RowAction},
    PageKind, ScreenView, ViewMode,
};

const CARD_COLUMNS: usize = 4;
const CARD_ROWS: usize = 3;

#[derive(Debug, Clone)]
pub struct Theme {
    pub primary_fg: Color,
    pub accent: Color,
    pub muted: Color,
    pub selection_bg: Color,
    pub favorite: Color,
    pub danger: Color,
    pub warning: Color,
}

impl Default for Theme {
    fn default() -> Self {
        Self {
            primary_fg: Color::White,
            accent: Color::Cyan,
            muted: Color::DarkGray,
            selection_bg: Color::DarkGray,
            favorite: Color::Magenta,
            danger: Color::Red,
            warning: Color::Yellow,
        }
    }
}

/// Search input as seen by the header.
pub struct SearchBar<'a> {
    pub input: &'a str,
    pub editing: bool,
}

/// Draw a full frame for `view`.
pub fn draw_screen(
    frame: &mut Frame,
    theme: &Theme,
    view: &ScreenView,
    search: SearchBar<'_>,
    status: &str,
    alert: Option<&str>,
) {
    let area = frame.size();
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3),
            Constraint::Min(6),
            Constraint::Length(3),
            Constraint::Length(4),
        ])
        .split(area);

    render_header(frame, chunks[0], theme, view, &search);

    match &view.panel {
        PanelView::Loading => render_loading(frame, chunks[1], theme),
        PanelView::LoadFailed { message } => {
            render_load_failed(frame, chunks[1], theme, message)
        }
        PanelView::Movies { mode, items } => {
            render_movie_list(frame, chunks[1], theme, items, *mode)
        }
        PanelView::SearchNotFound { keyword } => {
            render_search_not_found(frame, chunks[1], theme, keyword)
        }
        PanelView::NoFavorites => render_no_favorites(frame, chunks[1], theme),
    }

    render_paginator(frame, chunks[2], theme, view.paginator.as_ref());
    render_status(frame, chunks[3], theme, view.kind, status);

    if let Some(modal) = &view.modal {
        render_movie_modal(frame, theme, modal);
    }
    if let Some(message) = alert {
        render_alert(frame, theme, message);
    }
}

fn render_header(
    frame: &mut Frame,
    area: Rect,
    theme: &Theme,
    view: &ScreenView,
    search: &SearchBar<'_>,
) {
    let columns = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Length(30), Constraint::Min(10)])
        .split(area);

    let selected = match view.kind {
        PageKind::Browse => 0,
        PageKind::Favorites => 1,
    };
    let tabs = Tabs::new(vec![
        PageKind::Browse.to_string(),
        PageKind::Favorites.to_string(),
    ])
    .select(selected)
    .block(Block::default().borders(Borders::ALL).title("moviedeck"))
    .highlight_style(
        Style::default()
            .fg(theme.accent)
            .add_modifier(Modifier::BOLD),
    );
    frame.render_widget(tabs, columns[0]);

    if !view.show_search_bar {
        return;
    }

    let block = Block::default().borders(Borders::ALL).title("Search");
    let text = if search.editing {
        Line::from(vec![
            Span::styled("/ ", Style::default().fg(theme.accent)),
            Span::raw(search.input.to_string()),
        ])
    } else if let Some(keyword) = &view.keyword {
        Line::from(vec![
            Span::styled("keyword: ", Style::default().fg(theme.muted)),
            Span::raw(keyword.clone()),
        ])
    } else {
        Line::from(Span::styled(
            "press / to search titles",
            Style::default().fg(theme.muted),
        ))
    };
    frame.render_widget(Paragraph::new(text).block(block), columns[1]);

    if search.editing {
        let input_width = search.input.chars().count() as u16;
        let x = (columns[1].x + 3 + input_width)
            .min(columns[1].x + columns[1].width.saturating_sub(2));
        frame.set_cursor(x, columns[1].y + 1);
    }
}

/// Render one page of movies in card or list layout.
pub fn render_movie_list(
    frame: &mut Frame,
    area: Rect,
    theme: &Theme,
    items: &[MovieItem],
    mode: ViewMode,
) {
    match mode {
        ViewMode::Card => render_card_grid(frame, area, theme, items),
        ViewMode::List => render_list_table(frame, area, theme, items),
    }
}

fn render_card_grid(frame: &mut Frame, area: Rect, theme: &Theme, items: &[MovieItem]) {
    let block = Block::default()
        .borders(Borders::ALL)
        .title(format!("{} view", ViewMode::Card.label()));
    let inner = block.inner(area);
    frame.render_widget(block, area);

    let rows = Layout::default()
        .direction(Direction::Vertical)
        .constraints(vec![Constraint::Ratio(1, CARD_ROWS as u32); CARD_ROWS])
        .split(inner);

    for (row_index, chunk) in items.chunks(CARD_COLUMNS).enumerate() {
        let Some(row_area) = rows.get(row_index) else {
            break;
        };
        let cells = Layout::default()
            .direction(Direction::Horizontal)
            .constraints(vec![
                Constraint::Ratio(1, CARD_COLUMNS as u32);
                CARD_COLUMNS
            ])
            .split(*row_area);
        for (item, cell) in chunk.iter().zip(cells.iter()) {
            render_card(frame, *cell, theme, item);
        }
    }
}

fn render_card(frame: &mut Frame, area: Rect, theme: &Theme, item: &MovieItem) {
    let border_style = if item.selected {
        Style::default()
            .fg(theme.accent)
            .add_modifier(Modifier::BOLD)
    } else {
        Style::default().fg(theme.muted)
    };
    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(border_style)
        .title(Span::styled(
            item.movie.title.clone(),
            Style::default()
                .fg(theme.primary_fg)
                .add_modifier(Modifier::BOLD),
        ));

    let mut lines = vec![Line::from(Span::styled(
        item.poster_url.clone(),
        Style::default().fg(theme.muted),
    ))];
    if let Some(year) = item.movie.release_year() {
        lines.push(Line::from(year.to_string()));
    }
    lines.push(action_line(theme, item.action));

    let paragraph = Paragraph::new(lines).block(block).wrap(Wrap { trim: true });
    frame.render_widget(paragraph, area);
}

fn render_list_table(frame: &mut Frame, area: Rect, theme: &Theme, items: &[MovieItem]) {
    let header = Row::new(vec!["Poster", "Title", ""]).style(
        Style::default()
            .fg(theme.accent)
            .add_modifier(Modifier::BOLD),
    );
    let rows: Vec<Row> = items
        .iter()
        .map(|item| {
            Row::new(vec![
                Line::from(Span::styled(
                    item.poster_url.clone(),
                    Style::default().fg(theme.muted),
                )),
                Line::from(item.movie.title.clone()),
                action_line(theme, item.action),
            ])
        })
        .collect();

    let table = Table::new(
        rows,
        [
            Constraint::Percentage(40),
            Constraint::Percentage(40),
            Constraint::Percentage(20),
        ],
    )
    .header(header)
    .block(
        Block::default()
            .borders(Borders::ALL)
            .title(format!("{} view", ViewMode::List.label())),
    )
    .highlight_style(Style::default().bg(theme.selection_bg))
    .highlight_symbol("▶ ");

    let mut state = TableState::default();
    if let Some(selected) = items.iter().position(|item| item.selected) {
        state.select(Some(selected));
    }
    frame.render_stateful_widget(table, area, &mut state);
}

fn action_line(theme: &Theme, action: RowAction) -> Line<'static> {
    let (label, color) = match action {
        RowAction::AddFavorite => ("[+]", theme.accent),
        RowAction::Favorited => ("[♥]", theme.favorite),
        RowAction::RemoveFavorite => ("[x]", theme.danger),
    };
    Line::from(vec![
        Span::styled("[More] ", Style::default().fg(theme.primary_fg)),
        Span::styled(label, Style::default().fg(color).add_modifier(Modifier::BOLD)),
    ])
}

/// Page links with the current one highlighted. Renders an empty bar when
/// the paginator is cleared.
pub fn render_paginator(
    frame: &mut Frame,
    area: Rect,
    theme: &Theme,
    paginator: Option<&PaginatorView>,
) {
    let block = Block::default().borders(Borders::ALL).title("Pages");
    let spans: Vec<Span> = paginator
        .map(|paginator| {
            paginator
                .links()
                .into_iter()
                .map(|link| {
                    let label = format!(" {} ", link.number);
                    if link.active {
                        Span::styled(
                            label,
                            Style::default()
                                .fg(Color::Black)
                                .bg(theme.accent)
                                .add_modifier(Modifier::BOLD),
                        )
                    } else {
                        Span::styled(label, Style::default().fg(theme.primary_fg))
                    }
                })
                .collect()
        })
        .unwrap_or_default();
    frame.render_widget(Paragraph::new(Line::from(spans)).block(block), area);
}

/// Detail overlay for a single movie.
pub fn render_movie_modal(frame: &mut Frame, theme: &Theme, modal: &ModalView) {
    let frame_area = frame.size();
    let width = 70.min(frame_area.width.saturating_sub(4)).max(20);
    let height = 14.min(frame_area.height.saturating_sub(2)).max(6);
    let area = centered_rect(width, height, frame_area);
    frame.render_widget(Clear, area);

    let lines = vec![
        Line::from(Span::styled(
            modal.poster_url.clone(),
            Style::default().fg(theme.muted),
        )),
        Line::from(modal.release_line.clone()),
        Line::from(""),
        Line::from(modal.description.clone()),
        Line::from(""),
        Line::from(Span::styled(
            "Esc close",
            Style::default().fg(theme.muted),
        )),
    ];
    let paragraph = Paragraph::new(lines)
        .block(
            Block::default()
                .borders(Borders::ALL)
                .border_style(Style::default().fg(theme.accent))
                .title(modal.title.clone()),
        )
        .wrap(Wrap { trim: true });
    frame.render_widget(paragraph, area);
}

/// Panel content when a keyword matched nothing.
pub fn render_search_not_found(frame: &mut Frame, area: Rect, theme: &Theme, keyword: &str) {
    let line = Line::from(vec![
        Span::raw("Unable to find any movies related to the keyword ' "),
        Span::styled(
            keyword.to_string(),
            Style::default()
                .fg(theme.warning)
                .add_modifier(Modifier::ITALIC),
        ),
        Span::raw(" '."),
    ]);
    let paragraph = Paragraph::new(line)
        .block(Block::default().borders(Borders::ALL))
        .wrap(Wrap { trim: true });
    frame.render_widget(paragraph, area);
}

/// Empty state of the favorites screen.
pub fn render_no_favorites(frame: &mut Frame, area: Rect, theme: &Theme) {
    let lines = vec![
        Line::from("You don't have any favorite movie."),
        Line::from(vec![
            Span::raw("Check the "),
            Span::styled("movie list", Style::default().fg(theme.accent)),
            Span::raw(" (Tab) and add some favorite movies!"),
        ]),
    ];
    let paragraph = Paragraph::new(lines)
        .block(Block::default().borders(Borders::ALL))
        .alignment(Alignment::Center);
    frame.render_widget(paragraph, area);
}

fn render_loading(frame: &mut Frame, area: Rect, theme: &Theme) {
    let paragraph = Paragraph::new(Line::from(Span::styled(
        "Loading movies…",
        Style::default().fg(theme.muted),
    )))
    .block(Block::default().borders(Borders::ALL))
    .alignment(Alignment::Center);
    frame.render_widget(paragraph, area);
}

fn render_load_failed(frame: &mut Frame, area: Rect, theme: &Theme, message: &str) {
    let lines = vec![
        Line::from(Span::styled(
            "Unable to load movies.",
            Style::default()
                .fg(theme.danger)
                .add_modifier(Modifier::BOLD),
        )),
        Line::from(Span::styled(
            message.to_string(),
            Style::default().fg(theme.muted),
        )),
        Line::from("Press Ctrl-r to retry."),
    ];
    let paragraph = Paragraph::new(lines)
        .block(Block::default().borders(Borders::ALL))
        .alignment(Alignment::Center)
        .wrap(Wrap { trim: true });
    frame.render_widget(paragraph, area);
}

/// Blocking alert box; the app swallows input until it is dismissed.
pub fn render_alert(frame: &mut Frame, theme: &Theme, message: &str) {
    let frame_area = frame.size();
    let width = (message.chars().count() as u16 + 6)
        .min(frame_area.width.saturating_sub(4))
        .max(24);
    let area = centered_rect(width, 5, frame_area);
    frame.render_widget(Clear, area);

    let paragraph = Paragraph::new(vec![
        Line::from(message.to_string()),
        Line::from(Span::styled(
            "Enter OK",
            Style::default().add_modifier(Modifier::BOLD),
        )),
    ])
    .block(
        Block::default()
            .borders(Borders::ALL)
            .border_style(Style::default().fg(theme.warning))
            .title("Alert"),
    )
    .alignment(Alignment::Center)
    .wrap(Wrap { trim: true });
    frame.render_widget(paragraph, area);
}

fn render_status(frame: &mut Frame, area: Rect, theme: &Theme, kind: PageKind, status: &str) {
    let action_hint = match kind {
        PageKind::Browse => "a add",
        PageKind::Favorites => "x remove",
    };
    let help = format!(
        "Tab screen  j/k move  h/l page  Enter more  {action_hint}  c/t card/list  / search  q quit"
    );
    let paragraph = Paragraph::new(vec![
        Line::from(status.to_string()),
        Line::from(Span::styled(help, Style::default().fg(theme.muted))),
    ])
    .block(Block::default().borders(Borders::ALL).title("Status"))
    .wrap(Wrap { trim: true });
    frame.render_widget(paragraph, area);
}

fn centered_rect(width: u16, height: u16, area: Rect) -> Rect {
    let width = width.min(area.width);
    let height = height.min(area.height);
    let x = area.x + (area.width.saturating_sub(width)) / 2;
    let y = area.y + (area.height.saturating_sub(height)) / 2;
    Rect::new(x, y, width, height)
}

#[cfg(test)]
mod tests {
    use super::*;
    use moviedeck_core::Movie;
    use ratatui::{backend::TestBackend, buffer::Buffer, Terminal};

    fn item(id: u64, action: RowAction, selected: bool) -> MovieItem {
        MovieItem {
            movie: Movie {
                id,
                title: format!("Film {id}"),
                image: format!("{id}.jpg"),
                release_date: "2001-09-01".to_string(),
                description: "Plot".to_string(),
            },
            poster_url: format!("http://h/posters/{id}.jpg"),
            action,
            selected,
        }
    }

    fn buffer_text(buffer: &Buffer) -> String {
        buffer.content.iter().map(|cell| cell.symbol()).collect()
    }

    fn screen(panel: PanelView, paginator: Option<PaginatorView>) -> ScreenView {
        ScreenView {
            kind: PageKind::Browse,
            panel,
            paginator,
            show_search_bar: true,
            keyword: None,
            modal: None,
        }
    }

    fn draw(view: &ScreenView, alert: Option<&str>) -> String {
        let backend = TestBackend::new(120, 40);
        let mut terminal = Terminal::new(backend).unwrap();
        let theme = Theme::default();
        terminal
            .draw(|frame| {
                draw_screen(
                    frame,
                    &theme,
                    view,
                    SearchBar {
                        input: "",
                        editing: false,
                    },
                    "Ready",
                    alert,
                )
            })
            .unwrap();
        buffer_text(terminal.backend().buffer())
    }

    #[test]
    fn list_view_shows_titles_and_page_links() {
        let view = screen(
            PanelView::Movies {
                mode: ViewMode::List,
                items: vec![
                    item(1, RowAction::AddFavorite, true),
                    item(2, RowAction::Favorited, false),
                ],
            },
            Some(PaginatorView {
                pages: 3,
                current: 2,
            }),
        );
        let text = draw(&view, None);
        assert!(text.contains("Film 1"));
        assert!(text.contains("Film 2"));
        assert!(text.contains("List view"));
        assert!(text.contains(" 3 "));
    }

    #[test]
    fn card_view_shows_each_movie() {
        let items = (1..=5)
            .map(|id| item(id, RowAction::RemoveFavorite, id == 1))
            .collect();
        let view = screen(
            PanelView::Movies {
                mode: ViewMode::Card,
                items,
            },
            None,
        );
        let text = draw(&view, None);
        assert!(text.contains("Card view"));
        for id in 1..=5 {
            assert!(text.contains(&format!("Film {id}")));
        }
    }

    #[test]
    fn not_found_message_includes_keyword() {
        let view = screen(
            PanelView::SearchNotFound {
                keyword: "zzz".to_string(),
            },
            None,
        );
        let text = draw(&view, None);
        assert!(text.contains("Unable to find any movies related to the keyword"));
        assert!(text.contains("zzz"));
    }

    #[test]
    fn load_failure_hints_at_retry() {
        let view = screen(
            PanelView::LoadFailed {
                message: "connection refused".to_string(),
            },
            None,
        );
        let text = draw(&view, None);
        assert!(text.contains("Unable to load movies."));
        assert!(text.contains("connection refused"));
        assert!(text.contains("Ctrl-r"));
        assert!(!text.contains("Loading movies"));
    }

    #[test]
    fn alert_overlays_the_screen() {
        let view = screen(PanelView::NoFavorites, None);
        let text = draw(&view, Some("Already there"));
        assert!(text.contains("favorite movie"));
        assert!(text.contains("Already there"));
    }

    #[test]
    fn centered_rect_stays_inside_area() {
        let area = Rect::new(0, 0, 10, 4);
        let rect = centered_rect(20, 2, area);
        assert_eq!(rect, Rect::new(0, 1, 10, 2));
    }
}
