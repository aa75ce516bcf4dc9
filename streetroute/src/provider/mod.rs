//! Street-level imagery provider abstraction
//!
//! An [`ImageryProvider`] turns a [`ViewRequest`] into a resource locator and
//! fetches the bytes behind it through an injected [`AsyncHttpClient`].
//!
//! ```ignore
//! use streetroute::provider::{AsyncReqwestClient, StreetViewProvider};
//!
//! let http_client = AsyncReqwestClient::with_timeout(30)?;
//! let provider = StreetViewProvider::new(http_client);
//! ```

mod http;
mod streetview;
mod types;

pub use http::{redact_locator, AsyncHttpClient, AsyncReqwestClient, DEFAULT_TIMEOUT_SECS};
pub use streetview::{StreetViewProvider, STREETVIEW_BASE_URL};
pub use types::{
    ImageSize, ImageryProvider, ProviderError, ViewRenderOptions, ViewRequest,
};

#[cfg(test)]
pub use http::tests::MockAsyncHttpClient;
