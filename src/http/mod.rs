//! HTTP exchange with the backend under test

pub mod response;
pub mod transport;

#[cfg(test)]
pub(crate) mod scripted;

pub use response::{Body, StepResult};
pub use transport::{resolve_url, HttpTransport, Request, Transport};

use crate::common::Result;

/// Perform one exchange and classify it
///
/// `Ok` only for 2xx responses. Connection failures and non-2xx statuses
/// come back as distinct error variants.
pub async fn call(transport: &dyn Transport, request: &Request) -> Result<StepResult> {
    transport.exchange(request).await?.into_success()
}
