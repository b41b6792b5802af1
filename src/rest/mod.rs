//! SteamBots REST API client.
//!
//! Every endpoint goes through one generic call: build the URL from the base
//! URL, path and query string, send the API key as the `Key` header, attach
//! a JSON body when present, and treat anything but `200` as an
//! [`ApiError`](crate::error::ApiError).

mod api;
mod client;
pub mod endpoints;
mod request;
mod traits;

pub(crate) use client::base_http_client;
pub use client::{API_KEY_HEADER, SteamBotsRestClient, SteamBotsRestClientBuilder};
pub use request::{ApiRequest, QueryParams};
pub use traits::SteamBotsApi;
