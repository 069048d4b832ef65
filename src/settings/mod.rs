//! File + environment configuration. `settings/dev.toml` documents every key.

mod cli;
pub use clap::Parser;
pub use cli::*;

mod settings;
pub use settings::*;
