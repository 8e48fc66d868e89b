pub mod catalog;
pub mod config;
pub mod economy;
pub mod engine;
pub mod error;
pub mod format;
pub mod gate;
pub mod parser;
pub mod sampler;
pub mod store;
pub mod user;
