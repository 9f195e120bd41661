mod browse;
mod loading;

pub use browse::render_browse;
pub use loading::render_loading;
