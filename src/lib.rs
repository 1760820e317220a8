pub mod api;
pub mod auth;
pub mod autosave;
pub mod chat;
pub mod cli;
pub mod config;
pub mod error;
pub mod models;
pub mod otp;
pub mod push;
pub mod ui;
pub mod week;
