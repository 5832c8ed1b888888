//! Render cache for compiled MDX documents.
//!
//! Entries are keyed by a caller-supplied [`IdentityKey`] and bounded by an
//! LRU policy. Behaviour is controlled via `mdx-guard.toml`:
//!
//! ```toml
//! [cache]
//! enabled = true
//! capacity = 512
//! ```

mod config;
mod keys;
mod lock;
mod store;

pub use config::CacheConfig;
pub use keys::IdentityKey;
pub use store::RenderCache;
