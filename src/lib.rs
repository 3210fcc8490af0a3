// src/lib.rs
pub mod api;
pub mod brevo;
pub mod campaign;
pub mod config;
pub mod models;
pub mod server;
pub mod store;
pub mod tracker;
