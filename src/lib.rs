pub mod config;
pub mod discover;
pub mod error;
pub mod process;
