//! Worker lifecycle and fetch interception tools.

pub mod clients;
pub mod fetch;
pub mod install;
pub mod status;

pub use clients::{SwCloseClientParams, close_client_impl};
pub use fetch::{SwFetchParams, fetch_impl};
pub use install::{SwInstallParams, install_impl};
pub use status::status_impl;
