//! Ratatui front-end: a main menu for picking a store, a session screen with
//! the operation menu and a record table, plus modal prompts and the voter
//! entry form.

mod app;
mod forms;
mod helpers;
mod screens;
mod terminal;

pub use app::App;
pub use terminal::run_app;
