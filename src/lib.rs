pub mod api;
pub mod clipboard;
pub mod commands;
pub mod controller;
pub mod export;
pub mod models;
pub mod notifier;
pub mod timed;
pub mod ui;
pub mod utils;
