pub mod browse;
pub mod common;

pub use browse::{handle_browse_key, handle_search_key};
pub use common::{handle_help_key, handle_info_key};
