pub mod auth;
pub mod config;
pub mod errors;
pub mod pagination;
pub mod remote;

pub mod database;
pub mod server;
pub mod services;
