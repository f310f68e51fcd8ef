pub mod errors;
pub mod http;
pub mod protocol;
pub mod response;
pub mod signing;
pub mod timestamp;

pub use errors::{TransportError, TransportResult};
pub use http::{ApiTransport, HttpRequest, HttpResponse, ReqwestTransport};
pub use protocol::{build_flat_request, build_request, Wire};
pub use signing::SigV4Signer;
