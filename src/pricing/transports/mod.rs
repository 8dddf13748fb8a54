pub mod curl;
pub mod http_client;

pub use curl::CurlTransport;
pub use http_client::{ReqwestTransport, USER_AGENT};
