pub mod app_state;
pub mod browse;
pub mod modes;

pub use app_state::App;
pub use browse::{BrowseState, PendingLoad, StatusLevel, StatusMessage};
pub use modes::AppMode;
