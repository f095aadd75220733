#![warn(clippy::all, missing_docs)]

//! Core domain logic for the moviedeck terminal browser.
//!
//! This crate hosts the movie models, configuration handling, the HTTP
//! client for the movie API, local storage persistence for favorites, and
//! the page model that the terminal UI renders from.

pub mod api;
pub mod browser;
pub mod config;
pub mod favorites;
pub mod models;
pub mod storage;

pub use api::{ApiError, MovieClient};
pub use browser::{MovieBrowser, ScreenView, MOVIES_PER_PAGE};
pub use config::AppConfig;
pub use favorites::FavoritesStore;
pub use models::{Movie, PageKind, ViewMode};
pub use storage::LocalStorage;
