use crate::app::{App, DetailData, DetailView, Screen};
use ratatui::{
    layout::{Alignment, Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span, Text},
    widgets::{Block, Borders, Clear, List, ListItem, ListState, Paragraph, Tabs, Wrap},
    Frame,
};
use rickdex_core::catalog::PageAccumulator;
use rickdex_core::models::{
    season_from_code, Character, CharacterStatus, EntityKind, Episode, FavoriteDetails, FavoriteEntry, Location,
};

const FAVORITE_MARK: &str = "♥ ";
const NO_MARK: &str = "  ";

/// Season label and color for an episode code like `S03E07`
pub fn season_label(code: &str) -> (String, Color) {
    match season_from_code(code) {
        Some(1) => ("Season 1".to_string(), Color::Green),
        Some(2) => ("Season 2".to_string(), Color::Yellow),
        Some(3) => ("Season 3".to_string(), Color::LightRed),
        Some(4) => ("Season 4".to_string(), Color::Red),
        Some(5) => ("Season 5".to_string(), Color::Magenta),
        Some(6) => ("Season 6".to_string(), Color::Blue),
        Some(7) => ("Season 7".to_string(), Color::LightMagenta),
        _ => ("Unknown season".to_string(), Color::Gray),
    }
}

fn status_color(status: CharacterStatus) -> Color {
    match status {
        CharacterStatus::Alive => Color::Green,
        CharacterStatus::Dead => Color::Red,
        CharacterStatus::Unknown => Color::Gray,
    }
}

fn mark(is_favorite: bool) -> Span<'static> {
    if is_favorite {
        Span::styled(FAVORITE_MARK, Style::default().fg(Color::Red))
    } else {
        Span::raw(NO_MARK)
    }
}

fn dim(text: String) -> Span<'static> {
    Span::styled(text, Style::default().fg(Color::DarkGray))
}

/// Render the header with title, screen tabs and key hints
pub fn render_header(frame: &mut Frame, app: &App, area: Rect) {
    let titles: Vec<Line> = Screen::ALL
        .iter()
        .enumerate()
        .map(|(i, screen)| {
            let mut spans = vec![Span::raw(format!("{} {}", i + 1, screen.title()))];
            if *screen == Screen::Favorites {
                if let Some(badge) = app.favorites_badge() {
                    spans.push(Span::styled(
                        format!(" ({})", badge),
                        Style::default().fg(Color::Red).add_modifier(Modifier::BOLD),
                    ));
                }
            }
            Line::from(spans)
        })
        .collect();

    let selected = Screen::ALL.iter().position(|s| *s == app.screen).unwrap_or(0);
    let tabs = Tabs::new(titles)
        .block(
            Block::default()
                .borders(Borders::ALL)
                .title(Span::styled(
                    " Rick & Morty ",
                    Style::default().fg(Color::Cyan).add_modifier(Modifier::BOLD),
                ))
                .title(
                    ratatui::widgets::block::Title::from(dim(format!(
                        " [{}:Help] [{}:Quit] ",
                        app.keys.help, app.keys.quit
                    )))
                    .alignment(Alignment::Right),
                ),
        )
        .select(selected)
        .highlight_style(Style::default().fg(Color::Yellow).add_modifier(Modifier::BOLD))
        .divider(" | ");

    frame.render_widget(tabs, area);
}

/// Render the status bar: last message, or what is going on
pub fn render_status_bar(frame: &mut Frame, app: &App, area: Rect) {
    let status_text = if let Some(message) = &app.status_message {
        format!(" {} ", message)
    } else if app.is_busy() {
        " Loading... ".to_string()
    } else if !app.favorites.is_loaded() {
        " Restoring favorites... ".to_string()
    } else {
        format!(" {} favorites ", app.favorites.total_count())
    };

    let status_bar = Paragraph::new(status_text)
        .style(Style::default().bg(Color::DarkGray).fg(Color::White))
        .alignment(Alignment::Center);

    frame.render_widget(status_bar, area);
}

fn favorite_row(entry: &FavoriteEntry) -> ListItem<'static> {
    let kind_label = match entry.kind() {
        EntityKind::Character => "[character]",
        EntityKind::Episode => "[episode]  ",
        EntityKind::Location => "[location] ",
    };
    let mut spans = vec![
        mark(true),
        dim(format!("{} ", kind_label)),
        Span::styled(entry.name.clone(), Style::default().add_modifier(Modifier::BOLD)),
    ];
    if let FavoriteDetails::Episode { episode: Some(code), .. } = &entry.details {
        let (label, color) = season_label(code);
        spans.push(Span::styled(format!("  {}", label), Style::default().fg(color)));
    }
    let subtitle = entry.subtitle();
    if !subtitle.is_empty() {
        spans.push(dim(format!("  {}", subtitle)));
    }
    spans.push(dim(format!("  added {}", entry.added_at.format("%Y-%m-%d %H:%M"))));
    ListItem::new(Line::from(spans))
}

/// Render the favorites screen: filter tabs with counts and the entries
pub fn render_favorites(frame: &mut Frame, app: &App, area: Rect) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Length(1), Constraint::Min(0)])
        .split(area);

    let store = &app.favorites;
    let loaded = store.is_loaded();
    let count = |n: usize| if loaded { n.to_string() } else { "…".to_string() };
    let filters = [
        format!("All ({})", count(store.total_count())),
        format!("Characters ({})", count(store.count(EntityKind::Character))),
        format!("Episodes ({})", count(store.count(EntityKind::Episode))),
        format!("Locations ({})", count(store.count(EntityKind::Location))),
    ];
    let selected = match app.favorites_filter {
        None => 0,
        Some(EntityKind::Character) => 1,
        Some(EntityKind::Episode) => 2,
        Some(EntityKind::Location) => 3,
    };
    let tabs = Tabs::new(filters.to_vec())
        .select(selected)
        .highlight_style(Style::default().fg(Color::Yellow).add_modifier(Modifier::BOLD))
        .divider(" ");
    frame.render_widget(tabs, chunks[0]);

    let block = Block::default().borders(Borders::ALL).title(" Favorites ");

    if !loaded {
        let loading = Paragraph::new("Loading favorites...")
            .block(block)
            .alignment(Alignment::Center)
            .style(Style::default().fg(Color::DarkGray));
        frame.render_widget(loading, chunks[1]);
        return;
    }

    let entries = app.visible_favorites();
    if entries.is_empty() {
        let hint = match app.favorites_filter {
            None => "No favorites yet.".to_string(),
            Some(kind) => format!("No favorite {} yet.", kind.plural()),
        };
        let empty_message = Paragraph::new(vec![
            Line::from(hint),
            Line::from(""),
            Line::from(format!(
                "Browse with 2-4 and press '{}' on anything you like.",
                app.keys.toggle_favorite
            )),
        ])
        .block(block)
        .alignment(Alignment::Center)
        .style(Style::default().fg(Color::DarkGray));
        frame.render_widget(empty_message, chunks[1]);
        return;
    }

    let items: Vec<ListItem> = entries.iter().map(|entry| favorite_row(entry)).collect();
    let mut state = ListState::default();
    state.select(Some(app.favorites_selected));

    let list = List::new(items)
        .block(block.title_bottom(dim(format!(
            " [←/→:Filter] [{}:Open] [{}:Remove] [{}:Clear all] ",
            app.keys.open, app.keys.toggle_favorite, app.keys.clear_all
        ))))
        .highlight_style(Style::default().bg(Color::Blue).fg(Color::White));
    frame.render_stateful_widget(list, chunks[1], &mut state);
}

fn character_row(app: &App, c: &Character) -> ListItem<'static> {
    ListItem::new(Line::from(vec![
        mark(app.favorites.is_character_favorite(c.id)),
        Span::styled(c.name.clone(), Style::default().add_modifier(Modifier::BOLD)),
        Span::raw("  "),
        Span::styled(c.status.to_string(), Style::default().fg(status_color(c.status))),
        dim(format!(" · {} · {}", c.species, c.location.name)),
    ]))
}

fn episode_row(app: &App, e: &Episode) -> ListItem<'static> {
    let (season, color) = season_label(&e.episode);
    ListItem::new(Line::from(vec![
        mark(app.favorites.is_episode_favorite(e.id)),
        Span::styled(format!("{} ", e.episode), Style::default().fg(color)),
        Span::styled(e.name.clone(), Style::default().add_modifier(Modifier::BOLD)),
        dim(format!("  {} · {}", season, e.air_date)),
    ]))
}

fn location_row(app: &App, l: &Location) -> ListItem<'static> {
    ListItem::new(Line::from(vec![
        mark(app.favorites.is_location_favorite(l.id)),
        Span::styled(l.name.clone(), Style::default().add_modifier(Modifier::BOLD)),
        dim(format!("  {} · {}", l.location_type, l.dimension)),
    ]))
}

/// "page X of Y" footer for a listing
fn progress_text<T>(pages: &PageAccumulator<T>) -> String {
    if let Some(error) = pages.error() {
        return format!(" Error: {} ", error);
    }
    if !pages.has_started() {
        return if pages.is_loading() { " Loading... ".to_string() } else { String::new() };
    }
    let mut text = format!(
        " page {} of {} · {} of {} ",
        pages.current_page(),
        pages.total_pages(),
        pages.items().len(),
        pages.total_count()
    );
    if pages.is_loading() {
        text.push_str("· loading more... ");
    } else if !pages.has_more() {
        text.push_str("· everything loaded ");
    }
    text
}

/// Render the list screen for characters, episodes or locations
pub fn render_catalog_list(frame: &mut Frame, app: &App, area: Rect) {
    let (title, query, items, selected, progress, empty) = match app.screen {
        Screen::Characters => (
            "Characters",
            &app.characters.query,
            app.characters.items().iter().map(|c| character_row(app, c)).collect::<Vec<_>>(),
            app.characters.selected,
            progress_text(&app.characters.pages),
            app.characters.pages.has_started() && app.characters.items().is_empty(),
        ),
        Screen::Episodes => (
            "Episodes",
            &app.episodes.query,
            app.episodes.items().iter().map(|e| episode_row(app, e)).collect(),
            app.episodes.selected,
            progress_text(&app.episodes.pages),
            app.episodes.pages.has_started() && app.episodes.items().is_empty(),
        ),
        Screen::Locations => (
            "Locations",
            &app.locations.query,
            app.locations.items().iter().map(|l| location_row(app, l)).collect(),
            app.locations.selected,
            progress_text(&app.locations.pages),
            app.locations.pages.has_started() && app.locations.items().is_empty(),
        ),
        Screen::Favorites => return,
    };

    let title = if query.is_empty() {
        format!(" {} ", title)
    } else {
        format!(" {} matching \"{}\" ", title, query)
    };
    let block = Block::default()
        .borders(Borders::ALL)
        .title(title)
        .title_bottom(dim(progress));

    if empty {
        let message = Paragraph::new(format!(
            "Nothing found. Press '{}' to change the name filter.",
            app.keys.search
        ))
        .block(block)
        .alignment(Alignment::Center)
        .style(Style::default().fg(Color::DarkGray));
        frame.render_widget(message, area);
        return;
    }

    let mut state = ListState::default();
    if !items.is_empty() {
        state.select(Some(selected));
    }
    let list = List::new(items)
        .block(block)
        .highlight_style(Style::default().bg(Color::Blue).fg(Color::White));
    frame.render_stateful_widget(list, area, &mut state);
}

fn field(label: &str, value: String) -> Line<'static> {
    Line::from(vec![
        Span::styled(format!("{:<10}", label), Style::default().fg(Color::Yellow)),
        Span::raw(value),
    ])
}

fn detail_lines(app: &App, data: &DetailData) -> Vec<Line<'static>> {
    match data {
        DetailData::Character(d) => {
            let c = &d.character;
            let mut lines = vec![
                Line::from(vec![
                    mark(app.favorites.is_character_favorite(c.id)),
                    Span::styled(c.name.clone(), Style::default().fg(Color::Cyan).add_modifier(Modifier::BOLD)),
                ]),
                Line::from(vec![
                    Span::styled(format!("{:<10}", "Status"), Style::default().fg(Color::Yellow)),
                    Span::styled(c.status.to_string(), Style::default().fg(status_color(c.status))),
                ]),
                field("Species", c.species.clone()),
            ];
            if !c.subtype.is_empty() {
                lines.push(field("Type", c.subtype.clone()));
            }
            lines.push(field("Gender", c.gender.to_string()));
            lines.push(field("Origin", c.origin.name.clone()));
            lines.push(field("Location", c.location.name.clone()));
            lines.push(field("Created", c.created.format("%Y-%m-%d").to_string()));
            lines
        }
        DetailData::Episode(d) => {
            let e = &d.episode;
            let (season, color) = season_label(&e.episode);
            vec![
                Line::from(vec![
                    mark(app.favorites.is_episode_favorite(e.id)),
                    Span::styled(e.name.clone(), Style::default().fg(Color::Cyan).add_modifier(Modifier::BOLD)),
                ]),
                field("Code", e.episode.clone()),
                Line::from(vec![
                    Span::styled(format!("{:<10}", "Season"), Style::default().fg(Color::Yellow)),
                    Span::styled(season, Style::default().fg(color)),
                ]),
                field("Air date", e.air_date.clone()),
                field("Cast", e.characters.len().to_string()),
            ]
        }
        DetailData::Location(d) => {
            let l = &d.location;
            vec![
                Line::from(vec![
                    mark(app.favorites.is_location_favorite(l.id)),
                    Span::styled(l.name.clone(), Style::default().fg(Color::Cyan).add_modifier(Modifier::BOLD)),
                ]),
                field("Type", l.location_type.clone()),
                field("Dimension", l.dimension.clone()),
                field("Residents", l.residents.len().to_string()),
            ]
        }
    }
}

/// Render a detail view: entity fields on top, related lists below
pub fn render_detail(frame: &mut Frame, app: &App, view: &DetailView, area: Rect) {
    let title = format!(" {} #{} ", view.target.kind, view.target.id);
    let block = Block::default()
        .borders(Borders::ALL)
        .title(title)
        .title_bottom(dim(format!(
            " [{}:Back] [{}:Related] [{}:Open] [{}:Favorite] ",
            app.keys.back, app.keys.next_tab, app.keys.open, app.keys.toggle_favorite
        )));

    let data = match (&view.data, &view.error) {
        (Some(data), _) => data,
        (None, Some(error)) => {
            let message = Paragraph::new(vec![
                Line::from(Span::styled(error.clone(), Style::default().fg(Color::Red))),
                Line::from(""),
                Line::from(format!("Press '{}' to go back.", app.keys.back)),
            ])
            .block(block)
            .alignment(Alignment::Center)
            .wrap(Wrap { trim: true });
            frame.render_widget(message, area);
            return;
        }
        (None, None) => {
            let loading = Paragraph::new("Loading...")
                .block(block)
                .alignment(Alignment::Center)
                .style(Style::default().fg(Color::DarkGray));
            frame.render_widget(loading, area);
            return;
        }
    };

    let inner = block.inner(area);
    frame.render_widget(block, area);

    let lines = detail_lines(app, data);
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(lines.len() as u16 + 1),
            Constraint::Length(1),
            Constraint::Min(0),
        ])
        .split(inner);

    frame.render_widget(Paragraph::new(lines), chunks[0]);

    let titles: Vec<String> = data
        .related_titles()
        .iter()
        .enumerate()
        .map(|(tab, title)| format!("{} ({})", title, data.related(tab).len()))
        .collect();
    let tabs = Tabs::new(titles)
        .select(view.related_tab)
        .highlight_style(Style::default().fg(Color::Yellow).add_modifier(Modifier::BOLD));
    frame.render_widget(tabs, chunks[1]);

    let related = view.related();
    if related.is_empty() {
        frame.render_widget(
            Paragraph::new("Nothing here.").style(Style::default().fg(Color::DarkGray)),
            chunks[2],
        );
        return;
    }

    let items: Vec<ListItem> = related
        .into_iter()
        .map(|item| {
            let is_favorite = app.favorites.is_favorite(item.target.kind, item.target.id);
            ListItem::new(Line::from(vec![
                mark(is_favorite),
                Span::styled(item.name, Style::default().add_modifier(Modifier::BOLD)),
                dim(format!("  {}", item.subtitle)),
            ]))
        })
        .collect();
    let mut state = ListState::default();
    state.select(Some(view.selected));
    let list = List::new(items).highlight_style(Style::default().bg(Color::Blue).fg(Color::White));
    frame.render_stateful_widget(list, chunks[2], &mut state);
}

/// Render the name filter overlay
pub fn render_search_overlay(frame: &mut Frame, app: &App, area: Rect) {
    let popup_width = 50.min(area.width);
    let popup_height = 3.min(area.height);
    let x = (area.width.saturating_sub(popup_width)) / 2;
    let y = (area.height.saturating_sub(popup_height)) / 2;
    let popup_area = Rect::new(x, y, popup_width, popup_height);

    let input = Paragraph::new(Text::from(format!("/ {}", app.search_buffer)))
        .style(Style::default().fg(Color::White))
        .block(
            Block::default()
                .borders(Borders::ALL)
                .title(format!(" Filter {} by name ", app.screen.title().to_lowercase()))
                .title_bottom(dim(" [Enter:Apply] [Esc:Cancel] ".to_string())),
        );

    frame.render_widget(Clear, popup_area);
    frame.render_widget(input, popup_area);
}

pub fn render_clear_confirmation(frame: &mut Frame, app: &App, area: Rect) {
    let popup_width = 60.min(area.width);
    let popup_height = 5.min(area.height);

    let x = (area.width.saturating_sub(popup_width)) / 2;
    let y = (area.height.saturating_sub(popup_height)) / 2;

    let popup_area = Rect::new(x, y, popup_width, popup_height);

    let text = format!(
        "Remove all {} favorites? This cannot be undone. (y/n)",
        app.favorites.total_count()
    );
    let paragraph = Paragraph::new(text)
        .block(
            Block::default()
                .title("Confirm Clear")
                .borders(Borders::ALL)
                .style(Style::default().fg(Color::Yellow)),
        )
        .style(Style::default().fg(Color::White))
        .alignment(Alignment::Center)
        .wrap(Wrap { trim: true });

    frame.render_widget(Clear, popup_area); // This clears the area behind the popup
    frame.render_widget(paragraph, popup_area);
}

pub fn render_help_screen(frame: &mut Frame, app: &App, size: Rect) {
    let keys = &app.keys;
    let heading = |text: &'static str| {
        Line::from(Span::styled(text, Style::default().fg(Color::Yellow).add_modifier(Modifier::BOLD)))
    };
    let entry = |key: String, text: &str| Line::from(format!("{:<13}{}", key, text));

    let help_text = vec![
        Line::from(""),
        heading("Navigation"),
        entry("1-4".to_string(), "Favorites / Characters / Episodes / Locations"),
        entry(keys.next_tab.to_string(), "Next screen, or next related list in a detail"),
        entry("↑/↓".to_string(), "Move selection"),
        entry("Home/End".to_string(), "First / last row"),
        entry(keys.open.to_string(), "Open detail"),
        entry(keys.back.to_string(), "Back"),
        Line::from(""),
        heading("Lists"),
        entry(keys.load_more.to_string(), "Load more"),
        entry(keys.search.to_string(), "Filter by name"),
        entry(keys.toggle_favorite.to_string(), "Toggle favorite"),
        entry(keys.open_image.to_string(), "Open character image in the browser"),
        Line::from(""),
        heading("Favorites"),
        entry("←/→".to_string(), "Switch filter tab"),
        entry(keys.toggle_favorite.to_string(), "Remove selected"),
        entry(keys.clear_all.to_string(), "Clear all favorites"),
        Line::from(""),
        heading("Interface"),
        entry(keys.help.to_string(), "Show this help"),
        entry(keys.quit.to_string(), "Quit application"),
        Line::from(""),
        Line::from(Span::styled(
            format!("Press '{}' or 'Esc' to close", keys.help),
            Style::default().fg(Color::DarkGray),
        )),
    ];

    let popup_width = 70.min(size.width);
    let popup_height = (help_text.len() as u16 + 2).min(size.height);
    let x = (size.width.saturating_sub(popup_width)) / 2;
    let y = (size.height.saturating_sub(popup_height)) / 2;
    let popup_area = Rect::new(x, y, popup_width, popup_height);

    let block = Block::default()
        .title(" Help - Keyboard Shortcuts ")
        .borders(Borders::ALL)
        .style(Style::default().bg(Color::Black));

    frame.render_widget(Clear, popup_area);
    frame.render_widget(block, popup_area);

    let inner = Rect {
        x: popup_area.x + 1,
        y: popup_area.y + 1,
        width: popup_area.width.saturating_sub(2),
        height: popup_area.height.saturating_sub(2),
    };

    let paragraph = Paragraph::new(help_text)
        .wrap(Wrap { trim: true })
        .style(Style::default().fg(Color::White));

    frame.render_widget(paragraph, inner);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::app::testing::{settle, test_app};
    use ratatui::{backend::TestBackend, Terminal};

    fn screen_text(terminal: &Terminal<TestBackend>) -> String {
        let buffer = terminal.backend().buffer();
        let mut text = String::new();
        for y in 0..buffer.area.height {
            for x in 0..buffer.area.width {
                text.push_str(buffer.get(x, y).symbol());
            }
            text.push('\n');
        }
        text
    }

    #[test]
    fn test_season_label() {
        assert_eq!(season_label("S01E01").0, "Season 1");
        assert_eq!(season_label("S07E10").0, "Season 7");
        assert_eq!(season_label("S08E01").0, "Unknown season");
        assert_eq!(season_label("bogus").0, "Unknown season");
    }

    #[test]
    fn test_render_favorites_empty_state() {
        let (_rt, app) = test_app();
        let mut terminal = Terminal::new(TestBackend::new(100, 20)).unwrap();
        terminal.draw(|f| crate::ui::render(f, &app)).unwrap();

        let text = screen_text(&terminal);
        assert!(text.contains("No favorites yet."));
        assert!(text.contains("All (0)"));
    }

    #[test]
    fn test_render_list_and_badge() {
        let (_rt, mut app) = test_app();
        app.select_screen(Screen::Episodes);
        settle(&mut app);
        app.toggle_favorite_selected();

        let mut terminal = Terminal::new(TestBackend::new(120, 20)).unwrap();
        terminal.draw(|f| crate::ui::render(f, &app)).unwrap();

        let text = screen_text(&terminal);
        assert!(text.contains("Pilot"));
        assert!(text.contains("Favorites (1)"));
        assert!(text.contains("everything loaded"));
    }

    #[test]
    fn test_overlays_fit_tiny_terminal() {
        let (_rt, mut app) = test_app();
        let mut terminal = Terminal::new(TestBackend::new(40, 2)).unwrap();

        app.select_screen(Screen::Characters);
        settle(&mut app);
        app.open_search();
        assert!(app.search_open);
        terminal.draw(|f| crate::ui::render(f, &app)).unwrap();
        app.close_search();

        app.toggle_favorite_selected();
        app.select_screen(Screen::Favorites);
        app.request_clear_all();
        assert!(app.confirming_clear);
        terminal.draw(|f| crate::ui::render(f, &app)).unwrap();

        app.cancel_clear_all();
        app.open_help();
        terminal.draw(|f| crate::ui::render(f, &app)).unwrap();
    }
}
