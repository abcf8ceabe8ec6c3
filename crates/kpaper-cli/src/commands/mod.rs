//! Command implementations for kpaper-cli

pub mod build;
pub mod config;
pub mod embed;
pub mod generate;
pub mod index;
pub mod resolve;

pub use build::run_build;
pub use config::run_config_show;
pub use embed::run_embed;
pub use generate::run_generate;
pub use index::run_index;
pub use resolve::{ResolveOptions, run_resolve};
