//! # RSC Client
//!
//! The client half of the server-component protocol: turns a decoded tree
//! into a presentable one by loading the module behind every boundary
//! reference.
//!
//! ## Architecture
//!
//! ```text
//! document ──► BootstrapSlot ──► rsc_wire::decode ──► Resolver ──► presentable tree
//!                                                        │
//!                                              ModuleCache ──► ModuleLoader
//! ```
//!
//! Module loads are memoized per path for the life of the cache, so two
//! references to the same module share one load and one implementation.

pub mod bootstrap;
pub mod cache;
pub mod loader;
pub mod resolver;

pub use bootstrap::{extract_payload, hydrate, BootstrapError, BootstrapResult, BootstrapSlot};
pub use cache::ModuleCache;
pub use loader::{ModuleLoadError, ModuleLoadResult, ModuleLoader, ModuleRegistry};
pub use resolver::{ResolveError, ResolveResult, Resolver};
