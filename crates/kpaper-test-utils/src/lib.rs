//! Shared test utilities for the kpaper-deliver workspace.
//!
//! This crate provides fixtures for plugin project layouts so the manifest,
//! registry and CLI test suites do not each hand-roll them. It is a
//! dev-dependency only and never published.
//!
//! # Modules
//!
//! - [`project`]: [`TestProject`] builder for a plugin project on disk

pub mod project;

pub use project::TestProject;
