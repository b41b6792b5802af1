//! API key handling for the SteamBots API.
//!
//! The same key authenticates both surfaces: REST calls send it as the
//! `Key` header, the event stream sends it as the `key` query parameter.

mod credentials;

pub use credentials::{
    API_KEY_ENV_VAR, Credentials, CredentialsProvider, EnvCredentials, StaticCredentials,
};
