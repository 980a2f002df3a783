pub mod api;
pub mod console;
pub mod core;
pub mod models;
pub mod stores;
