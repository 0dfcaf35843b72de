pub mod api;
pub mod config;
pub mod leaderboard;
pub mod membership;
pub mod schedule;
pub mod state;
pub mod store;
pub mod template;
pub mod tracker;
pub mod types;
