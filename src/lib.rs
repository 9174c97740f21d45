//! `radiograb` - Internet-radio stream resolver
//!
//! # Features
//!
//! - **Extractors**: fmplapla.com station pages and the Planet Radio
//!   network (live stations and listen-again episodes)
//! - **Relay**: records fmplapla websocket audio frames to any async sink
//! - **Typed failures**: missing stations, missing episodes, and
//!   geo-restricted tokens are distinct error variants
//!
//! # Example
//!
//! ```rust,no_run
//! use radiograb::{extractor, FetchClient};
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let client = FetchClient::new()?;
//!     let descriptor = extractor::resolve(&client, "https://fmplapla.com/fmnishitokyo").await?;
//!     println!("{} ({:?})", descriptor.title, descriptor.protocol);
//!     Ok(())
//! }
//! ```

pub mod descriptor;
pub mod error;
pub mod extractor;
pub mod http_client;
pub mod nextdata;
pub mod rank;
pub mod relay;
pub mod token;

pub use descriptor::{FormatVariant, LiveStatus, MediaDescriptor, Protocol, Thumbnail};
pub use error::ExtractError;
pub use extractor::Extractor;
pub use http_client::FetchClient;
pub use rank::{RankPolicy, Ranking, VariantFacts};

/// Version of radiograb
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
