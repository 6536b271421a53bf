pub mod add;
pub mod auth_cmd;
pub mod common;
pub mod completions;
pub mod config;
pub mod delete;
pub mod download;
pub mod edit;
pub mod export;
pub mod list;
pub mod pin;
pub mod profile;
pub mod requests;
pub mod share;
pub mod show;
pub mod trash;
pub mod watch;
