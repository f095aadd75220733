use std::collections::HashSet;

use anyhow::Result;
use tracing::{debug, info, warn};

use crate::{
    favorites::FavoritesStore,
    models::{Movie, PageKind, ViewMode},
};

/// Fixed page size for both screens.
pub const MOVIES_PER_PAGE: usize = 12;

/// Whether the panel shows the primary list or a search subset.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum SearchState {
    /// No search active; the primary list is shown.
    #[default]
    Browsing,
    /// A keyword was submitted. `matches` may be empty.
    Searching {
        /// Trimmed, lower-cased keyword.
        keyword: String,
        /// Primary-list movies whose title contains the keyword.
        matches: Vec<Movie>,
    },
}

impl SearchState {
    /// Active keyword, if searching.
    pub fn keyword(&self) -> Option<&str> {
        match self {
            SearchState::Browsing => None,
            SearchState::Searching { keyword, .. } => Some(keyword),
        }
    }
}

/// What the caller must do after [`MovieBrowser::show_page_content`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PageRequest {
    /// State is ready; render it.
    Render,
    /// The movie list has not been fetched yet.
    FetchCatalog,
}

/// Result of submitting a search keyword.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SearchOutcome {
    /// Empty keyword: search mode left.
    Cleared,
    /// No title matched.
    NotFound,
    /// Number of matching movies.
    Found(usize),
}

/// Result of an add-to-favorites request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AddOutcome {
    /// Movie appended and persisted.
    Added {
        /// Title of the added movie.
        title: String,
    },
    /// The id is already in favorites; nothing changed.
    AlreadyFavorite,
    /// The id is not in the movie list.
    UnknownMovie,
}

/// Result of a remove-from-favorites request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RemoveOutcome {
    /// Movie removed and the list persisted.
    Removed {
        /// Title of the removed movie.
        title: String,
        /// Favorites left afterwards.
        remaining: usize,
    },
    /// The id was not a favorite.
    NotFavorite,
    /// Favorites were already empty.
    NothingToRemove,
}

/// State and operations of one screen.
///
/// Holds the movie list, the favorites, the search state and the view state
/// (page, layout, row cursor, open detail). Front ends derive what to draw
/// from [`MovieBrowser::view`].
pub struct MovieBrowser {
    kind: PageKind,
    movies: Vec<Movie>,
    catalog_loaded: bool,
    catalog_error: Option<String>,
    favorites: Vec<Movie>,
    search: SearchState,
    current_page: usize,
    view_mode: ViewMode,
    selection: usize,
    detail: Option<Movie>,
    store: FavoritesStore,
    poster_base: String,
}

impl MovieBrowser {
    /// Create a screen and read the stored favorites.
    pub fn new(
        kind: PageKind,
        store: FavoritesStore,
        view_mode: ViewMode,
        poster_base: impl Into<String>,
    ) -> Result<Self> {
        let favorites = store.load()?;
        debug!(?kind, favorites = favorites.len(), "screen initialised");
        Ok(Self {
            kind,
            movies: Vec::new(),
            catalog_loaded: false,
            catalog_error: None,
            favorites,
            search: SearchState::Browsing,
            current_page: 1,
            view_mode,
            selection: 0,
            detail: None,
            store,
            poster_base: poster_base.into(),
        })
    }

    /// Which screen this is.
    pub fn kind(&self) -> PageKind {
        self.kind
    }

    /// Current layout.
    pub fn view_mode(&self) -> ViewMode {
        self.view_mode
    }

    /// 1-based page number.
    pub fn current_page(&self) -> usize {
        self.current_page
    }

    /// Current search state.
    pub fn search(&self) -> &SearchState {
        &self.search
    }

    /// Movies fetched from the API.
    pub fn movies(&self) -> &[Movie] {
        &self.movies
    }

    /// Favorites in insertion order.
    pub fn favorites(&self) -> &[Movie] {
        &self.favorites
    }

    /// Whether the movie list has been fetched.
    pub fn catalog_loaded(&self) -> bool {
        self.catalog_loaded
    }

    /// Why the last movie list fetch failed, until a new fetch starts.
    pub fn catalog_error(&self) -> Option<&str> {
        self.catalog_error.as_deref()
    }

    /// Row cursor within the current page.
    pub fn selection(&self) -> usize {
        self.selection
    }

    /// Movie shown in the detail modal.
    pub fn detail(&self) -> Option<&Movie> {
        self.detail.as_ref()
    }

    /// API host used to build poster URLs.
    pub fn poster_base(&self) -> &str {
        &self.poster_base
    }

    /// The list this screen pages through outside of search.
    pub fn primary(&self) -> &[Movie] {
        match self.kind {
            PageKind::Browse => &self.movies,
            PageKind::Favorites => &self.favorites,
        }
    }

    fn active_list(&self) -> &[Movie] {
        match &self.search {
            SearchState::Browsing => self.primary(),
            SearchState::Searching { matches, .. } => matches,
        }
    }

    /// True while a search keyword is applied.
    pub fn is_search_mode(&self) -> bool {
        matches!(self.search, SearchState::Searching { .. })
    }

    /// Number of pages over the active list.
    pub fn page_amount(&self) -> usize {
        self.active_list().len().div_ceil(MOVIES_PER_PAGE)
    }

    /// Slice of the active list shown on `page`. Out of range pages are empty.
    pub fn movies_by_page(&self, page: usize) -> &[Movie] {
        let data = self.active_list();
        if page == 0 {
            return &[];
        }
        let start = (page - 1) * MOVIES_PER_PAGE;
        if start >= data.len() {
            return &[];
        }
        let end = (start + MOVIES_PER_PAGE).min(data.len());
        &data[start..end]
    }

    /// Movies on the current page.
    pub fn current_movies(&self) -> &[Movie] {
        self.movies_by_page(self.current_page)
    }

    /// Whether the browse screen still has to fetch its movie list.
    pub fn needs_catalog(&self) -> bool {
        self.kind == PageKind::Browse && !self.catalog_loaded
    }

    /// Show `page`, asking for a fetch first if the movie list is missing.
    pub fn show_page_content(&mut self, page: usize) -> PageRequest {
        self.current_page = page.max(1);
        if self.needs_catalog() {
            self.catalog_error = None;
            return PageRequest::FetchCatalog;
        }
        self.clamp_page();
        PageRequest::Render
    }

    /// Install a freshly fetched movie list.
    pub fn set_catalog(&mut self, movies: Vec<Movie>) {
        info!(count = movies.len(), "movie list loaded");
        self.movies = movies;
        self.catalog_loaded = true;
        self.catalog_error = None;
        if let SearchState::Searching { keyword, .. } = &self.search {
            let keyword = keyword.clone();
            let matches = self.filter_primary(&keyword);
            self.search = SearchState::Searching { keyword, matches };
        }
        self.clamp_page();
    }

    /// Record a failed movie list fetch. The list stays unloaded.
    pub fn set_catalog_error(&mut self, message: impl Into<String>) {
        self.catalog_error = Some(message.into());
    }

    /// Forget cached data so the next render reloads it.
    ///
    /// The browse screen drops its movie list; the favorites screen re-reads
    /// storage immediately.
    pub fn reload(&mut self) -> Result<PageRequest> {
        self.search = SearchState::Browsing;
        self.current_page = 1;
        self.selection = 0;
        match self.kind {
            PageKind::Browse => {
                self.favorites = self.store.reload()?;
                self.movies.clear();
                self.catalog_loaded = false;
                self.catalog_error = None;
                Ok(PageRequest::FetchCatalog)
            }
            PageKind::Favorites => {
                self.reload_favorites()?;
                Ok(PageRequest::Render)
            }
        }
    }

    /// Re-read favorites from storage, as a page load would.
    ///
    /// On the favorites screen this also resets search and paging.
    pub fn reload_favorites(&mut self) -> Result<()> {
        self.favorites = self.store.reload()?;
        if self.kind == PageKind::Favorites {
            self.search = SearchState::Browsing;
            self.current_page = 1;
            self.selection = 0;
        }
        self.clamp_page();
        Ok(())
    }

    /// Change layout. Returns `false` when `mode` is already active.
    pub fn switch_view_mode(&mut self, mode: ViewMode) -> bool {
        if self.view_mode == mode {
            return false;
        }
        self.view_mode = mode;
        debug!(?mode, page = self.current_page, "view mode switched");
        true
    }

    /// Filter the primary list by title. An empty keyword leaves search mode.
    pub fn show_search_result(&mut self, keyword: &str) -> SearchOutcome {
        let keyword = keyword.trim().to_lowercase();
        self.current_page = 1;
        self.selection = 0;

        if keyword.is_empty() {
            self.search = SearchState::Browsing;
            return SearchOutcome::Cleared;
        }

        let matches = self.filter_primary(&keyword);
        let count = matches.len();
        debug!(%keyword, count, "search applied");
        self.search = SearchState::Searching { keyword, matches };
        if count == 0 {
            SearchOutcome::NotFound
        } else {
            SearchOutcome::Found(count)
        }
    }

    fn filter_primary(&self, keyword: &str) -> Vec<Movie> {
        self.primary()
            .iter()
            .filter(|movie| movie.title_matches(keyword))
            .cloned()
            .collect()
    }

    /// Whether `id` is a favorite.
    pub fn is_favorite(&self, id: u64) -> bool {
        self.favorites.iter().any(|movie| movie.id == id)
    }

    /// Ids of all favorites.
    pub fn favorite_ids(&self) -> HashSet<u64> {
        self.favorites.iter().map(|movie| movie.id).collect()
    }

    /// Append the movie with `id` to favorites and persist.
    pub fn add_to_favorite(&mut self, id: u64) -> Result<AddOutcome> {
        if self.is_favorite(id) {
            info!(id, "movie already in favorites");
            return Ok(AddOutcome::AlreadyFavorite);
        }
        let Some(movie) = self.movies.iter().find(|movie| movie.id == id).cloned() else {
            warn!(id, "add requested for unknown movie");
            return Ok(AddOutcome::UnknownMovie);
        };

        let title = movie.title.clone();
        self.favorites.push(movie);
        if let Err(err) = self.store.save(&self.favorites) {
            self.favorites.pop();
            return Err(err);
        }
        Ok(AddOutcome::Added { title })
    }

    /// Remove `id` from favorites (and from the search matches on the
    /// favorites screen), persist, and step back a page if the current one
    /// disappeared.
    pub fn remove_from_favorite(&mut self, id: u64) -> Result<RemoveOutcome> {
        if self.favorites.is_empty() {
            return Ok(RemoveOutcome::NothingToRemove);
        }
        let Some(index) = self.favorites.iter().position(|movie| movie.id == id) else {
            return Ok(RemoveOutcome::NotFavorite);
        };

        let mut next = self.favorites.clone();
        let removed = next.remove(index);
        self.store.save(&next)?;
        self.favorites = next;

        if self.kind == PageKind::Favorites {
            if let SearchState::Searching { matches, .. } = &mut self.search {
                matches.retain(|movie| movie.id != id);
            }
        }

        if self.page_amount() < self.current_page {
            self.current_page = self.current_page.saturating_sub(1).max(1);
        }
        self.clamp_selection();
        info!(id, remaining = self.favorites.len(), "favorite removed");
        Ok(RemoveOutcome::Removed {
            title: removed.title,
            remaining: self.favorites.len(),
        })
    }

    /// Jump to `page`. Returns `false` if it does not exist.
    pub fn go_to_page(&mut self, page: usize) -> bool {
        if page == 0 || page > self.page_amount() {
            return false;
        }
        self.current_page = page;
        self.selection = 0;
        true
    }

    /// Advance one page if possible.
    pub fn next_page(&mut self) -> bool {
        self.go_to_page(self.current_page + 1)
    }

    /// Go back one page if possible.
    pub fn previous_page(&mut self) -> bool {
        self.go_to_page(self.current_page.saturating_sub(1))
    }

    /// Move the row cursor by `delta`, clamped to the current page.
    pub fn move_selection(&mut self, delta: isize) {
        let len = self.current_movies().len();
        if len == 0 {
            self.selection = 0;
            return;
        }
        let target = self.selection as isize + delta;
        self.selection = target.clamp(0, len as isize - 1) as usize;
    }

    /// Movie under the row cursor.
    pub fn selected_movie(&self) -> Option<&Movie> {
        self.current_movies().get(self.selection)
    }

    /// Open the detail modal for `movie`.
    pub fn show_detail(&mut self, movie: Movie) {
        self.detail = Some(movie);
    }

    /// Close the detail modal.
    pub fn close_detail(&mut self) {
        self.detail = None;
    }

    fn clamp_page(&mut self) {
        let amount = self.page_amount();
        if amount == 0 {
            self.current_page = 1;
        } else if self.current_page > amount {
            self.current_page = amount;
        }
        self.clamp_selection();
    }

    fn clamp_selection(&mut self) {
        let len = self.current_movies().len();
        if len == 0 {
            self.selection = 0;
        } else if self.selection >= len {
            self.selection = len - 1;
        }
    }
}
