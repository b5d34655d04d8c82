//! Shared types for certvault.
//!
//! Identifiers ([`ApiKey`], [`ServerId`]) and the item vocabulary
//! ([`ItemKind`], [`RenewalInfo`], [`ResultItem`], [`ItemStat`]) used by the
//! configuration loader, the distribution backend and the HTTP layer.

pub mod ids;
pub mod types;

pub use ids::{ApiKey, ServerId, DEFAULT_SERVER_ID};
pub use types::{ItemKind, ItemStat, RenewalInfo, ResultItem, UnsupportedItemKind};
