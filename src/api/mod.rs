//! HTTP collaborator layer: the configured client, response normalization
//! and one typed module per endpoint family.
//!
//! All paths are relative to [`crate::config::ClientConfig::api_base_url`].

pub mod client;
pub mod dto;
pub mod history;
pub mod images;
pub mod items;

#[cfg(test)]
pub(crate) mod fake;

pub use client::ApiClient;
pub use dto::ListPage;
pub use history::HistoryApi;
pub use images::ImageResolver;
pub use items::ItemsApi;
