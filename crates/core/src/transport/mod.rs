//! HTTP transport seam.
//!
//! Everything that talks to a backend goes through [`Transport`], so the
//! dispatcher and session manager can be driven by a scripted fake.

mod http;
#[cfg(test)]
pub(crate) mod fake;

use std::future::Future;
use std::pin::Pin;
use std::time::Duration;

use serde_json::Value;

pub use http::HttpTransport;

use crate::error::Result;

/// Boxed future returned by transport and strategy methods.
pub type BoxFut<'a, T> = Pin<Box<dyn Future<Output = T> + Send + 'a>>;

/// JSON-over-HTTP client.
///
/// Implementations return the decoded body of a 2xx reply (`Null` when the
/// body is empty). Non-2xx replies are mapped through
/// [`crate::error::translate_status`].
pub trait Transport: Send + Sync {
	fn get<'a>(&'a self, url: &'a str, timeout: Duration) -> BoxFut<'a, Result<Value>>;

	fn post<'a>(&'a self, url: &'a str, body: &'a Value, timeout: Duration) -> BoxFut<'a, Result<Value>>;
}
