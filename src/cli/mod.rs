//! Command handlers and terminal rendering

pub mod alloc;
pub mod clean;
pub mod export;
pub mod goals;
pub mod import;
pub mod setup;
pub mod summary;
pub mod ui;
