pub mod config;
pub mod error;
pub mod modality;
pub mod server;
