mod error;
mod http;
mod types;

use std::future::Future;
use std::pin::Pin;

pub use error::BackendError;
pub use http::HttpEchoBackend;
pub use types::{EchoRequest, EchoResponse, EchoSatelliteState};

pub type BackendFuture<'a> =
    Pin<Box<dyn Future<Output = Result<EchoResponse, BackendError>> + Send + 'a>>;

/// Whatever turns a pulse batch into simulated echoes.
pub trait EchoBackend: Send + Sync {
    fn simulate(&self, request: EchoRequest) -> BackendFuture<'_>;
}
