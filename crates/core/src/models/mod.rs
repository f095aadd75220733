//! Shared domain models.

use std::fmt;

use chrono::{Datelike, NaiveDate};
use serde::{Deserialize, Serialize};

/// A movie record as served by the movie API.
///
/// The field layout mirrors the API payload so the same structure is used
/// for persisted favorites.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Movie {
    /// Stable identifier used by the API.
    pub id: u64,
    /// Display title.
    pub title: String,
    /// Poster file name, relative to the poster endpoint.
    #[serde(default)]
    pub image: String,
    /// Release date as sent by the API (usually `YYYY-MM-DD`).
    #[serde(default)]
    pub release_date: String,
    /// Plot summary.
    #[serde(default)]
    pub description: String,
}

impl Movie {
    /// Absolute poster URL for the given API base.
    pub fn poster_url(&self, base_url: &str) -> String {
        format!("{}/posters/{}", base_url.trim_end_matches('/'), self.image)
    }

    /// The release line shown in the detail modal.
    pub fn release_line(&self) -> String {
        format!("Release date: {}", self.release_date)
    }

    /// Parsed release date, when the API sent an ISO date.
    pub fn released_on(&self) -> Option<NaiveDate> {
        let raw = self.release_date.trim();
        let date_part = raw.get(..10).unwrap_or(raw);
        NaiveDate::parse_from_str(date_part, "%Y-%m-%d").ok()
    }

    /// Release year, if the date could be parsed.
    pub fn release_year(&self) -> Option<i32> {
        self.released_on().map(|date| date.year())
    }

    /// Case-insensitive substring match on the trimmed title.
    ///
    /// `needle` is expected to be lower-cased already.
    pub fn title_matches(&self, needle: &str) -> bool {
        self.title.trim().to_lowercase().contains(needle)
    }
}

/// Layout used to render the movie collection.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ViewMode {
    /// Grid of cards.
    #[default]
    Card,
    /// Table with one row per movie.
    List,
}

impl ViewMode {
    /// Human readable label.
    pub fn label(self) -> &'static str {
        match self {
            ViewMode::Card => "Card",
            ViewMode::List => "List",
        }
    }
}

/// The two screens of the application.
///
/// Both share every operation and differ in which list is primary and which
/// row action is offered.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PageKind {
    /// All movies from the API; rows offer "add to favorites".
    #[default]
    Browse,
    /// Locally stored favorites; rows offer "remove from favorites".
    Favorites,
}

impl PageKind {
    /// The other screen.
    pub fn toggle(self) -> Self {
        match self {
            PageKind::Browse => PageKind::Favorites,
            PageKind::Favorites => PageKind::Browse,
        }
    }
}

impl fmt::Display for PageKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PageKind::Browse => write!(f, "Movies"),
            PageKind::Favorites => write!(f, "Favorites"),
        }
    }
}
