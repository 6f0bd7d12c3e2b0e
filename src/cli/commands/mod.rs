//! CLI command implementations

pub mod acquire;
pub mod completions;
pub mod config;
pub mod env;
pub mod path;

pub use acquire::execute as acquire;
pub use completions::execute as completions;
pub use config::execute as config;
pub use env::execute as env;
pub use path::execute as path;
