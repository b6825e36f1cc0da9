pub mod api;
pub mod config;
pub mod postal;
pub mod setup;
pub mod state;
