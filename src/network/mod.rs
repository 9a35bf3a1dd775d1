// Network layer: configuration, envelope decoding, the REST client and
// report downloads.
pub mod api_client;
pub mod config;
pub mod envelope;
pub mod reports;

// Re-export commonly used items
pub use api_client::{ApiClient, Body, FetchTransport, HttpRequest, HttpResponse, Method, RequestOptions, Transport};
pub use config::{current_config, init_api_config_js, ApiConfig};
