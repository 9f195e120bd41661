mod app;
mod controller;
mod logic;
mod state;
mod view;

pub use state::App;
