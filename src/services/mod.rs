pub mod remote_config_service;
pub mod server_config_service;

pub use remote_config_service::*;
pub use server_config_service::*;
