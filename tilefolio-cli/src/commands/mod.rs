//! CLI command implementations.
//!
//! - [`basemaps`] - list the built-in imagery sources
//! - [`plan`] - preview a grid without downloading anything
//! - [`export`] - render a grid to a multi-page PDF

pub mod basemaps;
pub mod common;
pub mod export;
pub mod plan;
