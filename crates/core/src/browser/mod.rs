//! Page model, controller operations and the derived view model.

mod model;
/// Declarative view model rendered by front ends.
pub mod view;

pub use model::{
    AddOutcome, MovieBrowser, PageRequest, RemoveOutcome, SearchOutcome, SearchState,
    MOVIES_PER_PAGE,
};
pub use view::{ModalView, MovieItem, PageLink, PaginatorView, PanelView, RowAction, ScreenView};
