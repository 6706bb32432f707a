// BuildBidz client core: marketplace model, REST client and client-side rules.

pub mod access;
pub mod api;
pub mod config;
pub mod db;
pub mod error;
pub mod export;
pub mod format;
pub mod lifecycle;
pub mod model;
pub mod poll;
pub mod subscription;
pub mod upload;

pub use api::ApiClient;
pub use error::ApiError;
