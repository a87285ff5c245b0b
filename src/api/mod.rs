pub mod http;
pub mod scrub;
pub mod traits;
pub(crate) mod types;

pub use http::HttpApiClient;
pub use traits::{ApprovalPayload, PlatformSource, Publisher, ValidationRequest, ValidationService};

use reqwest::Client;
use std::time::Duration;

pub fn build_api_client(timeout_secs: u64) -> Client {
    Client::builder()
        .timeout(Duration::from_secs(timeout_secs))
        .connect_timeout(Duration::from_secs(10))
        .pool_max_idle_per_host(4)
        .pool_idle_timeout(Duration::from_secs(90))
        .build()
        .unwrap_or_else(|_| Client::new())
}
