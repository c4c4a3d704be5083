pub mod dashboard;
pub mod machine;
pub mod resources;
pub mod wire;

#[cfg(feature = "api")]
pub mod auth;
#[cfg(feature = "api")]
pub mod client;
#[cfg(feature = "api")]
pub mod endpoints;
#[cfg(feature = "api")]
pub mod error;
#[cfg(feature = "api")]
pub mod lookup;
#[cfg(feature = "api")]
pub mod session;
