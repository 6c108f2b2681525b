pub mod cli;
pub mod client;
pub mod load_config;
pub mod oauth;

pub use cli::{run, Cli};
