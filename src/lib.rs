pub mod analyzer;
pub mod bake;
pub mod boundary;
pub mod cli;
pub mod config;
pub mod domain;
pub mod error;
pub mod generator;
pub mod git;
pub mod store;
pub mod ui;
pub mod version;
pub mod webhook;

pub use error::{ReleaserError, Result};
