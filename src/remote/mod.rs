pub mod config_service_api;

pub use config_service_api::*;
