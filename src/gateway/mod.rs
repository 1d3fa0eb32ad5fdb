//! Client construction and the LensGateway implementation

mod builder;
mod client;

pub use builder::{
    DEFAULT_API_BASE_URL, DEFAULT_APP_NAMESPACE, DEFAULT_PROXY_BASE_URL, LocalLens,
    LocalLensBuilder,
};
pub use client::{LensClient, SUMMARY_MODEL};
