//! Content delivery for live preview.
//!
//! This crate is the query collaborator of the preview core:
//! - [`ContentQuery`] describes a delivery request (type, language,
//!   collection, pagination, depth and system field filters)
//! - [`DeliveryClient`] runs queries; [`HttpDeliveryClient`] does so against
//!   the delivery REST API
//! - the wire layer maps delivery JSON into [`ContentEntity`] arenas
//! - [`PageLoader`] fetches the landing page, video courses and navigation
//!
//! [`ContentEntity`]: livepreview_model::ContentEntity

pub mod client;
pub mod config;
pub mod error;
pub mod pages;
pub mod query;
pub mod wire;

pub use client::{DeliveryClient, HttpDeliveryClient, ItemsPage, Pagination};
pub use config::DeliveryConfig;
pub use error::{DeliveryError, DeliveryResult};
pub use pages::{MenuLink, PageLoader, menu_links};
pub use query::{ContentQuery, Filter};
pub use wire::DeliveryResponse;
