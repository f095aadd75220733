use std::collections::HashSet;

use crate::models::{Movie, PageKind, ViewMode};

use super::model::{MovieBrowser, SearchState};

/// Everything a front end needs to draw one screen.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScreenView {
    /// Screen being shown.
    pub kind: PageKind,
    /// Main panel content.
    pub panel: PanelView,
    /// Page links; `None` when the paginator is cleared.
    pub paginator: Option<PaginatorView>,
    /// Whether the search bar is offered.
    pub show_search_bar: bool,
    /// Active keyword, shown in the search bar.
    pub keyword: Option<String>,
    /// Detail modal, when open.
    pub modal: Option<ModalView>,
}

/// Main panel states.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PanelView {
    /// The movie list is being fetched.
    Loading,
    /// The movie list fetch failed and no request is running.
    LoadFailed {
        /// Error reported by the client.
        message: String,
    },
    /// A page of movies in the given layout.
    Movies {
        /// Card grid or list table.
        mode: ViewMode,
        /// Rows in display order.
        items: Vec<MovieItem>,
    },
    /// A search matched nothing.
    SearchNotFound {
        /// The submitted keyword.
        keyword: String,
    },
    /// The favorites screen has nothing to show.
    NoFavorites,
}

/// Action button attached to a row.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RowAction {
    /// Browse screen, not yet a favorite.
    AddFavorite,
    /// Browse screen, already a favorite.
    Favorited,
    /// Favorites screen.
    RemoveFavorite,
}

/// One rendered movie.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MovieItem {
    /// Source record.
    pub movie: Movie,
    /// Absolute poster URL.
    pub poster_url: String,
    /// Row action.
    pub action: RowAction,
    /// Row cursor is on this item.
    pub selected: bool,
}

/// Paginator state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PaginatorView {
    /// Number of page links.
    pub pages: usize,
    /// Active page.
    pub current: usize,
}

/// A single page link.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageLink {
    /// 1-based page number.
    pub number: usize,
    /// Marked as the current page.
    pub active: bool,
}

impl PaginatorView {
    /// Links `1..=pages` with the current one marked active.
    pub fn links(&self) -> Vec<PageLink> {
        (1..=self.pages)
            .map(|number| PageLink {
                number,
                active: number == self.current,
            })
            .collect()
    }
}

/// Detail modal slots.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ModalView {
    /// Movie title.
    pub title: String,
    /// Absolute poster URL.
    pub poster_url: String,
    /// `Release date: ...` line.
    pub release_line: String,
    /// Plot summary.
    pub description: String,
}

impl ModalView {
    fn from_movie(movie: &Movie, poster_base: &str) -> Self {
        Self {
            title: movie.title.clone(),
            poster_url: movie.poster_url(poster_base),
            release_line: movie.release_line(),
            description: movie.description.clone(),
        }
    }
}

fn row_action(kind: PageKind, favorites: &HashSet<u64>, id: u64) -> RowAction {
    match kind {
        PageKind::Favorites => RowAction::RemoveFavorite,
        PageKind::Browse if favorites.contains(&id) => RowAction::Favorited,
        PageKind::Browse => RowAction::AddFavorite,
    }
}

impl MovieBrowser {
    /// Derive the view model for the current state.
    pub fn view(&self) -> ScreenView {
        let kind = self.kind();
        let modal = self
            .detail()
            .map(|movie| ModalView::from_movie(movie, self.poster_base()));
        let keyword = self.search().keyword().map(str::to_string);

        if kind == PageKind::Favorites && self.favorites().is_empty() {
            return ScreenView {
                kind,
                panel: PanelView::NoFavorites,
                paginator: None,
                show_search_bar: false,
                keyword: None,
                modal,
            };
        }

        if self.needs_catalog() {
            let panel = match self.catalog_error() {
                Some(message) => PanelView::LoadFailed {
                    message: message.to_string(),
                },
                None => PanelView::Loading,
            };
            return ScreenView {
                kind,
                panel,
                paginator: None,
                show_search_bar: true,
                keyword,
                modal,
            };
        }

        if let SearchState::Searching { keyword, matches } = self.search() {
            if matches.is_empty() {
                return ScreenView {
                    kind,
                    panel: PanelView::SearchNotFound {
                        keyword: keyword.clone(),
                    },
                    paginator: None,
                    show_search_bar: true,
                    keyword: Some(keyword.clone()),
                    modal,
                };
            }
        }

        let favorites = self.favorite_ids();
        let items = self
            .current_movies()
            .iter()
            .enumerate()
            .map(|(index, movie)| MovieItem {
                movie: movie.clone(),
                poster_url: movie.poster_url(self.poster_base()),
                action: row_action(kind, &favorites, movie.id),
                selected: index == self.selection(),
            })
            .collect();

        ScreenView {
            kind,
            panel: PanelView::Movies {
                mode: self.view_mode(),
                items,
            },
            paginator: Some(PaginatorView {
                pages: self.page_amount(),
                current: self.current_page(),
            }),
            show_search_bar: true,
            keyword,
            modal,
        }
    }
}
