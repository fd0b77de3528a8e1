//! Tile providers.
//!
//! A provider is a [`BasemapSource`] (URL template plus zoom limits) and an
//! [`AsyncHttpClient`] that fetches tile bodies from it. The built-in sources
//! live in the [`Basemap`] registry; arbitrary XYZ templates go through
//! [`BasemapSource::custom`].

mod basemap;
mod http;
mod types;

pub use basemap::{Basemap, BasemapSource};
pub use http::{AsyncHttpClient, AsyncReqwestClient, DEFAULT_TIMEOUT_SECS, DEFAULT_USER_AGENT};
pub use types::ProviderError;

#[cfg(test)]
pub use http::tests::MockAsyncHttpClient;
