use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
use ratatui::layout::{Alignment, Constraint, Direction, Layout, Rect};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, Borders, Clear, List, ListItem, Paragraph, Wrap};
use std::sync::Arc;
use tokio::sync::mpsc;
use tracing::{debug, error, warn};

use crate::api::{Character, PageSource};
use crate::config::Config;
use crate::gallery::{
    episode_label, execute_plan, format_episode_ranges, status_label, FetchOutcome, FetchPlan,
    GalleryResult, GalleryView, LoadState, PageMarker, PaginationController,
};
use crate::tui::{events::Event, keys::{Action, KeyMap}, styles::Theme, Frame};

const SPINNER: [&str; 8] = ["⠋", "⠙", "⠹", "⠸", "⠼", "⠴", "⠦", "⠧"];

/// Where keystrokes go
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InputMode {
    Browse,
    Search,
}

/// Gallery screen state
pub struct App {
    /// Whether the application should quit
    pub should_quit: bool,

    /// Key mappings for the application
    pub key_map: KeyMap,

    /// Current theme for styling
    pub theme: Theme,

    /// Help overlay visible
    pub show_help: bool,

    controller: PaginationController<Character>,
    source: Arc<dyn PageSource<Character>>,

    /// Load completions come back through here
    event_sender: mpsc::UnboundedSender<Event>,

    mode: InputMode,
    search_input: String,
    tick: usize,
}

impl App {
    pub fn new(
        config: &Config,
        source: Arc<dyn PageSource<Character>>,
        event_sender: mpsc::UnboundedSender<Event>,
    ) -> Self {
        Self {
            should_quit: false,
            key_map: KeyMap::default(),
            theme: Theme::default(),
            show_help: false,
            controller: PaginationController::new(config.page_size, config.initial_pages),
            source,
            event_sender,
            mode: InputMode::Browse,
            search_input: String::new(),
            tick: 0,
        }
    }

    pub fn controller(&self) -> &PaginationController<Character> {
        &self.controller
    }

    pub fn mode(&self) -> InputMode {
        self.mode
    }

    /// Begin the initial load
    pub fn start(&mut self) {
        let plan = self.controller.start();
        self.dispatch(plan);
    }

    /// Run `plan` on a background task; the result arrives as [`Event::Loaded`]
    fn dispatch(&self, plan: Option<FetchPlan>) {
        let Some(plan) = plan else {
            return;
        };
        debug!("dispatching {}", plan);

        let source = Arc::clone(&self.source);
        let sender = self.event_sender.clone();
        tokio::spawn(async move {
            let result = execute_plan(source.as_ref(), plan).await;
            if sender.send(Event::Loaded(result)).is_err() {
                warn!("gallery closed before {} finished", plan);
            }
        });
    }

    /// Handle incoming events; returns whether to quit
    pub fn handle_event(&mut self, event: Event) -> bool {
        match event {
            Event::Key(key) => self.handle_key_event(key),
            Event::Resize(width, height) => debug!("resized to {}x{}", width, height),
            Event::Tick => self.tick = self.tick.wrapping_add(1),
            Event::Loaded(result) => self.on_loaded(result),
        }
        self.should_quit
    }

    fn on_loaded(&mut self, result: GalleryResult<FetchOutcome<Character>>) {
        match self.controller.complete(result) {
            Ok(plan) => self.dispatch(plan),
            // Kept in the controller's view; the next page command retries
            Err(e) if e.is_fetch_failure() => warn!("load failed: {}", e),
            Err(e) => error!("load rejected: {}", e),
        }
    }

    fn handle_key_event(&mut self, key: KeyEvent) {
        if self.mode == InputMode::Search {
            self.handle_search_key(key);
            return;
        }

        let Some(action) = self.key_map.action(&key) else {
            return;
        };

        let plan = match action {
            Action::Quit => {
                self.should_quit = true;
                None
            }
            Action::ToggleHelp => {
                self.show_help = !self.show_help;
                None
            }
            Action::PreviousPage => self.controller.previous_page(),
            Action::NextPage => self.controller.next_page(),
            Action::FirstPage => self.controller.first_page(),
            Action::LastPage => self.controller.last_page(),
            Action::EditSearch => {
                self.mode = InputMode::Search;
                self.search_input = self.controller.filter().search.clone();
                None
            }
            Action::CycleStatus => {
                let status = self.controller.filter().status.cycle_next();
                self.controller.set_status(status)
            }
            Action::CycleGender => {
                let gender = self.controller.filter().gender.cycle_next();
                self.controller.set_gender(gender)
            }
            Action::ClearFilters => {
                self.search_input.clear();
                self.controller.clear_filters()
            }
        };

        self.dispatch(plan);
    }

    fn handle_search_key(&mut self, key: KeyEvent) {
        if key.modifiers.contains(KeyModifiers::CONTROL) {
            if key.code == KeyCode::Char('c') {
                self.should_quit = true;
            }
            return;
        }

        match key.code {
            KeyCode::Char(c) => self.search_input.push(c),
            KeyCode::Backspace => {
                self.search_input.pop();
            }
            KeyCode::Enter => {
                self.mode = InputMode::Browse;
                let plan = self.controller.search(self.search_input.clone());
                self.dispatch(plan);
            }
            KeyCode::Esc => {
                self.mode = InputMode::Browse;
                self.search_input = self.controller.filter().search.clone();
            }
            _ => {}
        }
    }

    /// Render the application UI
    pub fn render(&self, frame: &mut Frame) {
        let view = self.controller.snapshot();
        let area = frame.size();
        frame.render_widget(Block::default().style(self.theme.base_style()), area);

        let chunks = Layout::default()
            .direction(Direction::Vertical)
            .constraints([
                Constraint::Length(4), // Title and filters
                Constraint::Min(3),    // Characters
                Constraint::Length(3), // Page bar
                Constraint::Length(1), // Status bar
            ])
            .split(area);

        self.render_header(frame, chunks[0], &view);
        self.render_characters(frame, chunks[1], &view);
        self.render_page_bar(frame, chunks[2], &view);
        self.render_status_bar(frame, chunks[3], &view);

        if self.show_help {
            self.render_help_overlay(frame);
        }
    }

    fn render_header(&self, frame: &mut Frame, area: Rect, view: &GalleryView<Character>) {
        let search = if self.mode() == InputMode::Search {
            Span::styled(format!("{}▏", self.search_input), self.theme.accent_style())
        } else if view.filter.search.is_empty() {
            Span::styled("press / to search", self.theme.placeholder_style())
        } else {
            Span::styled(view.filter.search.clone(), self.theme.text_style())
        };

        let lines = vec![
            Line::from(Span::styled(
                "Explore the quirky characters of Rick and Morty!",
                self.theme.dim_style(),
            )),
            Line::from(vec![
                Span::styled("Search: ", self.theme.dim_style()),
                search,
                Span::styled("   Status: ", self.theme.dim_style()),
                Span::styled(view.filter.status.to_string(), self.theme.text_style()),
                Span::styled("   Gender: ", self.theme.dim_style()),
                Span::styled(view.filter.gender.to_string(), self.theme.text_style()),
            ]),
        ];

        let border = if self.mode == InputMode::Search {
            self.theme.focused_border_style()
        } else {
            self.theme.border_style()
        };
        let block = Block::default()
            .borders(Borders::ALL)
            .border_style(border)
            .title(Span::styled(" Meet Our Characters ", self.theme.title_style()));

        frame.render_widget(Paragraph::new(lines).block(block), area);
    }

    fn render_characters(&self, frame: &mut Frame, area: Rect, view: &GalleryView<Character>) {
        let first = (view.current_page - 1) * self.controller.page_size() + 1;
        let title = if view.visible_items.is_empty() {
            " Characters ".to_string()
        } else {
            format!(
                " Characters {}-{} of {} ",
                first,
                first + view.visible_items.len() - 1,
                view.filtered_count
            )
        };
        let block = Block::default()
            .borders(Borders::ALL)
            .border_style(self.theme.border_style())
            .title(title);

        if view.visible_items.is_empty() {
            let message = if view.is_loading {
                "Loading characters…"
            } else if view.last_error.is_some() {
                "Could not load characters."
            } else {
                "No characters match the current filters."
            };
            let paragraph = Paragraph::new(message)
                .style(self.theme.placeholder_style())
                .alignment(Alignment::Center)
                .block(block);
            frame.render_widget(paragraph, area);
            return;
        }

        let items: Vec<ListItem> = view
            .visible_items
            .iter()
            .map(|c| self.character_item(c))
            .collect();
        frame.render_widget(List::new(items).block(block), area);
    }

    fn character_item(&self, character: &Character) -> ListItem<'static> {
        let lines = vec![
            Line::from(vec![
                Span::styled(character.name.clone(), self.theme.title_style()),
                Span::raw("  "),
                Span::styled(character.species.clone(), self.theme.species_style()),
            ]),
            Line::from(vec![
                Span::styled(
                    status_label(&character.status),
                    self.theme.status_style(&character.status),
                ),
                Span::styled(format!(" · {}", character.gender), self.theme.text_style()),
                Span::styled(
                    format!(" · {} · from {}", character.location.name, character.origin.name),
                    self.theme.dim_style(),
                ),
            ]),
            Line::from(Span::styled(
                format!(
                    "{}: {}",
                    episode_label(character.episode.len()),
                    format_episode_ranges(&character.episode)
                ),
                self.theme.dim_style(),
            )),
            Line::from(""),
        ];
        ListItem::new(lines)
    }

    fn render_page_bar(&self, frame: &mut Frame, area: Rect, view: &GalleryView<Character>) {
        let has_previous = view.current_page > 1;
        let has_next = view.current_page < view.total_pages;

        let mut spans = vec![Span::styled(
            "‹ Previous   ",
            if has_previous { self.theme.page_style() } else { self.theme.disabled_style() },
        )];
        for marker in &view.visible_page_markers {
            let style = match marker {
                PageMarker::Page(page) if *page == view.current_page => {
                    self.theme.current_page_style()
                }
                PageMarker::Page(_) => self.theme.page_style(),
                PageMarker::Ellipsis => self.theme.dim_style(),
            };
            spans.push(Span::styled(format!(" {} ", marker), style));
        }
        spans.push(Span::styled(
            "   Next ›",
            if has_next { self.theme.page_style() } else { self.theme.disabled_style() },
        ));

        let paragraph = Paragraph::new(Line::from(spans))
            .alignment(Alignment::Center)
            .block(Block::default().borders(Borders::TOP).border_style(self.theme.border_style()));
        frame.render_widget(paragraph, area);
    }

    fn render_status_bar(&self, frame: &mut Frame, area: Rect, view: &GalleryView<Character>) {
        let (text, style) = match (self.controller.load_state(), &view.last_error) {
            (LoadState::Loading { plan }, _) => (
                format!(" {} Loading {}…", SPINNER[self.tick % SPINNER.len()], plan),
                self.theme.status_bar_style(),
            ),
            (LoadState::Idle, Some(error)) => (
                format!(" {} · page again to retry", error),
                self.theme.error_bar_style(),
            ),
            (LoadState::Idle, None) => (
                format!(
                    " Page {} of {} · {} matching · {} buffered · {} · ? for help",
                    view.current_page,
                    view.total_pages,
                    view.filtered_count,
                    view.buffered_count,
                    if view.exhausted { "all loaded" } else { "more upstream" }
                ),
                self.theme.status_bar_style(),
            ),
        };

        frame.render_widget(Paragraph::new(text).style(style), area);
    }

    fn render_help_overlay(&self, frame: &mut Frame) {
        let help_area = centered_rect(50, 60, frame.size());

        let help_block = Block::default()
            .borders(Borders::ALL)
            .title("Help")
            .style(self.theme.help_style());

        let help_paragraph = Paragraph::new(self.key_map.help_text())
            .block(help_block)
            .wrap(Wrap { trim: false })
            .style(self.theme.text_style());

        frame.render_widget(Clear, help_area);
        frame.render_widget(help_paragraph, help_area);
    }
}

/// Create a centered rectangle with given percentage of the screen
fn centered_rect(percent_x: u16, percent_y: u16, r: Rect) -> Rect {
    let popup_layout = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Percentage((100 - percent_y) / 2),
            Constraint::Percentage(percent_y),
            Constraint::Percentage((100 - percent_y) / 2),
        ])
        .split(r);

    Layout::default()
        .direction(Direction::Horizontal)
        .constraints([
            Constraint::Percentage((100 - percent_x) / 2),
            Constraint::Percentage(percent_x),
            Constraint::Percentage((100 - percent_x) / 2),
        ])
        .split(popup_layout[1])[1]
}
