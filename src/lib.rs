//! uno-pinterest
//!
//! An unofficial Rust SDK for the Pinterest v5 ad account endpoints: ad
//! accounts, analytics, campaigns, ad groups and ads.
//!
//! Responses are kept schema-loose. Single resources come back as a
//! [`Model`] (a bag of JSON attributes). List endpoints come back as a
//! [`Collection`], which holds one page plus the bookmark for the next.
//!
//! # Quick Start
//!
//! ```ignore
//! use uno_pinterest::{Client, ListParams};
//!
//! let client = Client::new()?; // reads PINTEREST_ACCESS_TOKEN from env
//! let mut page = client.ad_accounts().campaigns("549755885175", ListParams::default()).await?;
//! loop {
//!     for campaign in &page {
//!         println!("{:?}", campaign.get_str("name"));
//!     }
//!     if !page.has_more() {
//!         break;
//!     }
//!     page = page.fetch_next().await?;
//! }
//! ```

pub mod client;
pub mod config;
pub mod error;
pub mod middleware;
pub mod oauth;
pub mod requester;
pub mod types;

pub mod ad_accounts;

// Re-export key types at crate root for ergonomic imports.
pub use ad_accounts::{AdAccountService, AnalyticsParams, Granularity, ListParams};
pub use client::Client;
pub use error::Error;
pub use requester::{Context, QueryParams, Requester};
pub use types::*;
