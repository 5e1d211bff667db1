pub mod server_configs;

pub use server_configs::*;
