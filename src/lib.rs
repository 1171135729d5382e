pub mod admin;
pub mod app;
pub mod auth;
pub mod bootstrap;
pub mod config;
pub mod dates;
pub mod db;
pub mod entries;
pub mod error;
pub mod export;
pub mod extract;
pub mod locale;
pub mod seed;
pub mod state;
