//! Weather fetching: provider client, response cache and the retrying fetcher

pub mod cache;
pub mod client;
pub mod credentials;
pub mod fetcher;

pub use cache::ResponseCache;
pub use client::{CaiyunClient, WeatherSource};
pub use credentials::{CredentialSelector, FixedSelector, RandomSelector, RoundRobinSelector};
pub use fetcher::Fetcher;
