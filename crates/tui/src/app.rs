use std::{io, thread, time::Duration};

use anyhow::{Context, Result};
use crossterm::{
    event::{self, Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use ratatui::{backend::CrosstermBackend, Frame, Terminal};
use tokio::{spawn, sync::mpsc};
use tracing::{debug, error, info};

use moviedeck_core::{
    browser::{AddOutcome, PageRequest, RemoveOutcome, SearchOutcome},
    ApiError, AppConfig, FavoritesStore, Movie, MovieBrowser, MovieClient, PageKind, ViewMode,
};

use crate::view::{self, SearchBar, Theme};

const TICK_RATE: Duration = Duration::from_millis(250);
const MAX_KEYWORD_LEN: usize = 64;
const DUPLICATE_FAVORITE_ALERT: &str = "This movie is already in your favorites.";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Mode {
    Browse,
    Search,
}

enum AppEvent {
    Input(Event),
    Tick,
    CatalogLoaded(Result<Vec<Movie>, ApiError>),
    MovieLoaded {
        screen: PageKind,
        result: Result<Movie, ApiError>,
    },
}

/// Terminal front end: owns both screens and wires input to them.
pub struct MovieDeckApp {
    client: MovieClient,
    browse: MovieBrowser,
    favorites: MovieBrowser,
    screen: PageKind,
    mode: Mode,
    search_input: String,
    alert: Option<String>,
    status: String,
    pending_catalog: bool,
    should_quit: bool,
    event_tx: Option<mpsc::Sender<AppEvent>>,
    theme: Theme,
}

impl MovieDeckApp {
    pub fn new(config: &AppConfig, client: MovieClient, store: FavoritesStore) -> Result<Self> {
        let poster_base = client.base_url().to_string();
        let browse = MovieBrowser::new(
            PageKind::Browse,
            store.clone(),
            config.view_mode,
            poster_base.clone(),
        )?;
        let favorites =
            MovieBrowser::new(PageKind::Favorites, store, config.view_mode, poster_base)?;
        Ok(Self {
            client,
            browse,
            favorites,
            screen: config.start_screen,
            mode: Mode::Browse,
            search_input: String::new(),
            alert: None,
            status: "Ready".to_string(),
            pending_catalog: false,
            should_quit: false,
            event_tx: None,
            theme: Theme::default(),
        })
    }

    pub async fn run(&mut self) -> Result<()> {
        let mut stdout = io::stdout();
        enable_raw_mode().context("failed to enter raw mode")?;
        execute!(stdout, EnterAlternateScreen).context("failed to enter alternate screen")?;
        let backend = CrosstermBackend::new(stdout);
        let mut terminal = Terminal::new(backend).context("failed to create terminal")?;
        terminal.hide_cursor()?;
        terminal.clear()?;

        let (event_tx, mut event_rx) = mpsc::channel::<AppEvent>(128);
        spawn_input_thread(event_tx.clone());
        self.event_tx = Some(event_tx);

        let result = self.event_loop(&mut terminal, &mut event_rx).await;

        restore_terminal(&mut terminal)?;
        self.event_tx = None;
        result
    }

    async fn event_loop(
        &mut self,
        terminal: &mut Terminal<CrosstermBackend<io::Stdout>>,
        event_rx: &mut mpsc::Receiver<AppEvent>,
    ) -> Result<()> {
        self.show_page_content(1);

        loop {
            terminal.draw(|frame| self.draw(frame))?;
            if self.should_quit {
                break;
            }

            let maybe_event = event_rx.recv().await;
            if !self.process_app_event(maybe_event) {
                break;
            }
            if self.should_quit {
                break;
            }
        }
        Ok(())
    }

    fn active(&self) -> &MovieBrowser {
        self.screen_state(self.screen)
    }

    fn active_mut(&mut self) -> &mut MovieBrowser {
        self.screen_state_mut(self.screen)
    }

    fn screen_state(&self, kind: PageKind) -> &MovieBrowser {
        match kind {
            PageKind::Browse => &self.browse,
            PageKind::Favorites => &self.favorites,
        }
    }

    fn screen_state_mut(&mut self, kind: PageKind) -> &mut MovieBrowser {
        match kind {
            PageKind::Browse => &mut self.browse,
            PageKind::Favorites => &mut self.favorites,
        }
    }

    fn set_status(&mut self, message: impl Into<String>) {
        self.status = message.into();
    }

    fn process_app_event(&mut self, maybe_event: Option<AppEvent>) -> bool {
        match maybe_event {
            Some(AppEvent::Input(event)) => {
                if let Err(err) = self.handle_input(event) {
                    error!(?err, "input handling failed");
                    self.set_status(format!("Error: {err}"));
                }
                true
            }
            Some(AppEvent::Tick) => true,
            Some(AppEvent::CatalogLoaded(result)) => {
                self.pending_catalog = false;
                match result {
                    Ok(movies) => {
                        let count = movies.len();
                        self.browse.set_catalog(movies);
                        self.set_status(format!("Loaded {count} movies"));
                    }
                    Err(err) => {
                        error!(%err, "failed to fetch movie list");
                        self.browse.set_catalog_error(err.to_string());
                        self.set_status(format!("Failed to load movies: {err}"));
                    }
                }
                true
            }
            Some(AppEvent::MovieLoaded { screen, result }) => {
                match result {
                    Ok(movie) => {
                        debug!(id = movie.id, "movie detail loaded");
                        self.screen_state_mut(screen).show_detail(movie);
                    }
                    Err(err) => {
                        error!(%err, "failed to fetch movie detail");
                        self.set_status(format!("Failed to load movie: {err}"));
                    }
                }
                true
            }
            None => false,
        }
    }

    fn show_page_content(&mut self, page: usize) {
        if self.active_mut().show_page_content(page) == PageRequest::FetchCatalog {
            self.fetch_catalog();
        }
    }

    fn fetch_catalog(&mut self) {
        if self.pending_catalog {
            return;
        }
        let Some(tx) = self.event_tx.clone() else {
            debug!("event loop not running; catalog fetch skipped");
            return;
        };
        self.pending_catalog = true;
        self.set_status("Loading movies…");
        let client = self.client.clone();
        spawn(async move {
            let result = client.fetch_movies().await;
            let _ = tx.send(AppEvent::CatalogLoaded(result)).await;
        });
    }

    fn show_movie_modal(&mut self, id: u64) {
        let Some(tx) = self.event_tx.clone() else {
            debug!(id, "event loop not running; detail fetch skipped");
            return;
        };
        let screen = self.screen;
        let client = self.client.clone();
        spawn(async move {
            let result = client.fetch_movie(id).await;
            let _ = tx.send(AppEvent::MovieLoaded { screen, result }).await;
        });
    }

    fn show_search_result(&mut self, keyword: &str) {
        match self.active_mut().show_search_result(keyword) {
            SearchOutcome::Cleared => {
                self.set_status("Search cleared");
                self.show_page_content(1);
            }
            SearchOutcome::NotFound => {
                self.set_status(format!("No movies match '{keyword}'"));
            }
            SearchOutcome::Found(count) => {
                self.set_status(format!("{count} movies match '{keyword}'"));
            }
        }
    }

    fn switch_view_mode(&mut self, mode: ViewMode) {
        if self.active_mut().switch_view_mode(mode) {
            self.set_status(format!("{} view", mode.label()));
        }
    }

    fn switch_screen(&mut self, kind: PageKind) {
        if self.screen == kind {
            return;
        }
        self.screen = kind;
        self.mode = Mode::Browse;
        self.search_input.clear();
        if let Err(err) = self.active_mut().reload_favorites() {
            error!(?err, "failed to read favorites");
            self.set_status(format!("Failed to read favorites: {err}"));
        } else {
            self.set_status(format!("{kind}"));
        }
        let page = self.active().current_page();
        self.show_page_content(page);
    }

    fn reload(&mut self) -> Result<()> {
        self.search_input.clear();
        if self.active_mut().reload()? == PageRequest::FetchCatalog {
            self.fetch_catalog();
        } else {
            self.set_status("Favorites reloaded");
        }
        Ok(())
    }

    fn go_to_page(&mut self, page: usize) {
        if self.active_mut().go_to_page(page) {
            self.set_status(format!("Page {page}"));
        }
    }

    fn add_selected_to_favorite(&mut self) -> Result<()> {
        let Some(id) = self.active().selected_movie().map(|movie| movie.id) else {
            return Ok(());
        };
        match self.browse.add_to_favorite(id)? {
            AddOutcome::Added { title } => {
                self.set_status(format!("Added {title} to favorites"));
            }
            AddOutcome::AlreadyFavorite => {
                self.alert = Some(DUPLICATE_FAVORITE_ALERT.to_string());
            }
            AddOutcome::UnknownMovie => {
                self.set_status(format!("Movie {id} is not in the list"));
            }
        }
        Ok(())
    }

    fn remove_selected_from_favorite(&mut self) -> Result<()> {
        let Some(id) = self.active().selected_movie().map(|movie| movie.id) else {
            return Ok(());
        };
        match self.favorites.remove_from_favorite(id)? {
            RemoveOutcome::Removed { title, remaining } if remaining == 0 => {
                self.set_status(format!("Removed {title}; no favorites left"));
            }
            RemoveOutcome::Removed { title, .. } => {
                self.set_status(format!("Removed {title} from favorites"));
            }
            RemoveOutcome::NotFavorite | RemoveOutcome::NothingToRemove => {}
        }
        Ok(())
    }

    fn handle_input(&mut self, event: Event) -> Result<()> {
        let Event::Key(key) = event else {
            return Ok(());
        };
        if key.kind != KeyEventKind::Press {
            return Ok(());
        }
        if key.modifiers == KeyModifiers::CONTROL && key.code == KeyCode::Char('c') {
            self.should_quit = true;
            return Ok(());
        }

        if self.alert.is_some() {
            if matches!(key.code, KeyCode::Enter | KeyCode::Esc | KeyCode::Char(' ')) {
                self.alert = None;
            }
            return Ok(());
        }

        if self.active().detail().is_some() {
            match key.code {
                KeyCode::Esc | KeyCode::Enter | KeyCode::Backspace => {
                    self.active_mut().close_detail()
                }
                KeyCode::Char('q') => self.should_quit = true,
                _ => {}
            }
            return Ok(());
        }

        match self.mode {
            Mode::Search => self.handle_search_key(key),
            Mode::Browse => self.handle_browse_key(key),
        }
    }

    fn handle_search_key(&mut self, key: KeyEvent) -> Result<()> {
        match key.code {
            KeyCode::Esc => {
                self.mode = Mode::Browse;
                self.search_input.clear();
                self.set_status("Search cancelled");
            }
            KeyCode::Enter => {
                self.mode = Mode::Browse;
                let keyword = self.search_input.trim().to_lowercase();
                self.search_input.clear();
                self.show_search_result(&keyword);
            }
            KeyCode::Backspace => {
                self.search_input.pop();
            }
            KeyCode::Char(ch) => {
                if (key.modifiers.is_empty() || key.modifiers == KeyModifiers::SHIFT)
                    && self.search_input.chars().count() < MAX_KEYWORD_LEN
                {
                    self.search_input.push(ch);
                }
            }
            _ => {}
        }
        Ok(())
    }

    fn handle_browse_key(&mut self, key: KeyEvent) -> Result<()> {
        match key.code {
            KeyCode::Char('q') if key.modifiers.is_empty() => self.should_quit = true,
            KeyCode::Char('r') if key.modifiers.contains(KeyModifiers::CONTROL) => {
                self.reload()?;
            }
            KeyCode::Tab | KeyCode::BackTab => self.switch_screen(self.screen.toggle()),
            KeyCode::Char('j') | KeyCode::Down => self.active_mut().move_selection(1),
            KeyCode::Char('k') | KeyCode::Up => self.active_mut().move_selection(-1),
            KeyCode::Char('l') | KeyCode::Right | KeyCode::PageDown => {
                let page = self.active().current_page() + 1;
                self.go_to_page(page);
            }
            KeyCode::Char('h') | KeyCode::Left | KeyCode::PageUp => {
                let page = self.active().current_page().saturating_sub(1);
                self.go_to_page(page);
            }
            KeyCode::Char('g') | KeyCode::Home => self.go_to_page(1),
            KeyCode::Char('G') | KeyCode::End => {
                let last = self.active().page_amount();
                self.go_to_page(last);
            }
            KeyCode::Char(ch @ '1'..='9') => {
                let page = ch.to_digit(10).unwrap_or(1) as usize;
                self.go_to_page(page);
            }
            KeyCode::Char('/') => {
                if self.active().view().show_search_bar {
                    self.mode = Mode::Search;
                    self.search_input = self
                        .active()
                        .search()
                        .keyword()
                        .unwrap_or_default()
                        .to_string();
                }
            }
            KeyCode::Char('c') => self.switch_view_mode(ViewMode::Card),
            KeyCode::Char('t') => self.switch_view_mode(ViewMode::List),
            KeyCode::Enter => {
                if let Some(id) = self.active().selected_movie().map(|movie| movie.id) {
                    self.show_movie_modal(id);
                }
            }
            KeyCode::Char('a') if self.screen == PageKind::Browse => {
                self.add_selected_to_favorite()?;
            }
            KeyCode::Char('x') | KeyCode::Delete if self.screen == PageKind::Favorites => {
                self.remove_selected_from_favorite()?;
            }
            _ => {}
        }
        Ok(())
    }

    fn draw(&self, frame: &mut Frame) {
        let screen_view = self.active().view();
        view::draw_screen(
            frame,
            &self.theme,
            &screen_view,
            SearchBar {
                input: &self.search_input,
                editing: self.mode == Mode::Search,
            },
            &self.status,
            self.alert.as_deref(),
        );
    }
}

fn restore_terminal(terminal: &mut Terminal<CrosstermBackend<io::Stdout>>) -> Result<()> {
    disable_raw_mode().context("failed to disable raw mode")?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen)
        .context("failed to leave alternate screen")?;
    terminal.show_cursor()?;
    info!("terminal restored");
    Ok(())
}

fn spawn_input_thread(sender: mpsc::Sender<AppEvent>) {
    thread::spawn(move || loop {
        match event::poll(TICK_RATE) {
            Ok(true) => match event::read() {
                Ok(evt) => {
                    if sender.blocking_send(AppEvent::Input(evt)).is_err() {
                        break;
                    }
                }
                Err(_) => break,
            },
            Ok(false) => {
                if sender.blocking_send(AppEvent::Tick).is_err() {
                    break;
                }
            }
            Err(_) => break,
        }
    });
}

#[cfg(test)]
mod tests {
    use super::*;
    use moviedeck_core::{
        browser::PanelView, favorites::FAVORITES_KEY, LocalStorage,
    };
    use tempfile::{tempdir, TempDir};

    fn movie(id: u64, title: &str) -> Movie {
        Movie {
            id,
            title: title.to_string(),
            image: format!("{id}.jpg"),
            release_date: "2010-07-16".to_string(),
            description: String::new(),
        }
    }

    fn app(dir: &TempDir, start_screen: PageKind) -> Result<MovieDeckApp> {
        let config = AppConfig {
            api_base_url: "http://127.0.0.1:9".to_string(),
            storage_path: dir.path().join("storage.json"),
            start_screen,
            ..AppConfig::default()
        };
        let store = FavoritesStore::new(LocalStorage::open(&config.storage_path)?);
        let client = MovieClient::new(&config)?;
        MovieDeckApp::new(&config, client, store)
    }

    fn press(app: &mut MovieDeckApp, code: KeyCode) -> Result<()> {
        app.handle_input(Event::Key(KeyEvent::new(code, KeyModifiers::NONE)))
    }

    fn type_text(app: &mut MovieDeckApp, text: &str) -> Result<()> {
        for ch in text.chars() {
            press(app, KeyCode::Char(ch))?;
        }
        Ok(())
    }

    #[test]
    fn duplicate_add_raises_blocking_alert() -> Result<()> {
        let dir = tempdir()?;
        let mut app = app(&dir, PageKind::Browse)?;
        app.browse
            .set_catalog(vec![movie(1, "Inception"), movie(2, "Up")]);

        press(&mut app, KeyCode::Char('a'))?;
        assert!(app.alert.is_none());
        press(&mut app, KeyCode::Char('a'))?;
        assert_eq!(app.alert.as_deref(), Some(DUPLICATE_FAVORITE_ALERT));

        // Input is swallowed until the alert is dismissed.
        press(&mut app, KeyCode::Char('j'))?;
        assert_eq!(app.browse.selection(), 0);
        press(&mut app, KeyCode::Enter)?;
        assert!(app.alert.is_none());
        assert_eq!(app.browse.favorites().len(), 1);
        Ok(())
    }

    #[test]
    fn removing_last_favorite_shows_empty_state() -> Result<()> {
        let dir = tempdir()?;
        let mut app = app(&dir, PageKind::Browse)?;
        app.browse.set_catalog(vec![movie(1, "Inception")]);
        press(&mut app, KeyCode::Char('a'))?;

        press(&mut app, KeyCode::Tab)?;
        assert_eq!(app.screen, PageKind::Favorites);
        assert_eq!(app.favorites.favorites().len(), 1);

        press(&mut app, KeyCode::Char('x'))?;
        assert_eq!(app.active().view().panel, PanelView::NoFavorites);
        let storage = LocalStorage::open(dir.path().join("storage.json"))?;
        assert_eq!(storage.get_item(FAVORITES_KEY).as_deref(), Some("[]"));
        Ok(())
    }

    #[test]
    fn search_bar_submits_trimmed_keyword() -> Result<()> {
        let dir = tempdir()?;
        let mut app = app(&dir, PageKind::Browse)?;
        app.browse.set_catalog(vec![
            movie(1, "Toy Story"),
            movie(2, "Up"),
            movie(3, "Toy Story 3"),
        ]);

        press(&mut app, KeyCode::Char('/'))?;
        assert_eq!(app.mode, Mode::Search);
        type_text(&mut app, "  TOY ")?;
        press(&mut app, KeyCode::Enter)?;
        assert_eq!(app.mode, Mode::Browse);
        assert_eq!(app.browse.search().keyword(), Some("toy"));
        assert_eq!(app.browse.current_movies().len(), 2);

        press(&mut app, KeyCode::Char('/'))?;
        for _ in 0..3 {
            press(&mut app, KeyCode::Backspace)?;
        }
        press(&mut app, KeyCode::Enter)?;
        assert!(!app.browse.is_search_mode());
        assert_eq!(app.browse.current_movies().len(), 3);
        Ok(())
    }

    #[test]
    fn view_mode_keys_switch_layout() -> Result<()> {
        let dir = tempdir()?;
        let mut app = app(&dir, PageKind::Browse)?;
        app.browse.set_catalog(vec![movie(1, "Up")]);

        press(&mut app, KeyCode::Char('t'))?;
        assert_eq!(app.browse.view_mode(), ViewMode::List);
        assert_eq!(app.status, "List view");
        app.set_status("unchanged");
        press(&mut app, KeyCode::Char('t'))?;
        assert_eq!(app.status, "unchanged");
        Ok(())
    }

    #[test]
    fn page_keys_stay_in_range() -> Result<()> {
        let dir = tempdir()?;
        let mut app = app(&dir, PageKind::Browse)?;
        app.browse
            .set_catalog((0..25).map(|id| movie(id, &format!("Movie {id}"))).collect());

        press(&mut app, KeyCode::Right)?;
        assert_eq!(app.browse.current_page(), 2);
        press(&mut app, KeyCode::Char('G'))?;
        assert_eq!(app.browse.current_page(), 3);
        press(&mut app, KeyCode::Right)?;
        assert_eq!(app.browse.current_page(), 3);
        press(&mut app, KeyCode::Char('1'))?;
        assert_eq!(app.browse.current_page(), 1);
        press(&mut app, KeyCode::Left)?;
        assert_eq!(app.browse.current_page(), 1);
        Ok(())
    }

    #[test]
    fn failed_catalog_fetch_is_reported_in_status() -> Result<()> {
        let dir = tempdir()?;
        let mut app = app(&dir, PageKind::Browse)?;
        app.pending_catalog = true;
        let err = ApiError::Status {
            url: "http://127.0.0.1:9/api/movies/".to_string(),
            status: reqwest_status(),
        };
        assert!(app.process_app_event(Some(AppEvent::CatalogLoaded(Err(err)))));
        assert!(!app.pending_catalog);
        assert!(app.status.starts_with("Failed to load movies"));
        assert!(matches!(
            app.active().view().panel,
            PanelView::LoadFailed { ref message } if message.contains("HTTP 500")
        ));
        Ok(())
    }

    fn reqwest_status() -> moviedeck_core::api::StatusCode {
        moviedeck_core::api::StatusCode::INTERNAL_SERVER_ERROR
    }
}
