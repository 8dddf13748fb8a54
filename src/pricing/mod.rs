mod models;
pub mod providers;
mod registry;
mod service;
pub mod transport;
pub mod transports;

pub use models::{AssetDescriptor, PriceQuote, ProviderKind};
pub use providers::{CoinGeckoResolver, GoldPriceResolver};
pub use registry::{AssetRegistry, RegistryError};
pub use service::PriceSuffixService;
pub use transport::{Fetcher, HttpResponse, HttpTransport, TransportError, TransportRequest};
pub use transports::{CurlTransport, ReqwestTransport};
