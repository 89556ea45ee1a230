pub mod classifier;
pub mod config;
pub mod dispatch;
pub mod github;
pub mod humanize;
pub mod model;
pub mod telegram;
