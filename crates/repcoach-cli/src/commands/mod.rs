pub mod config;
pub mod workout;
