//! # RSC Core
//!
//! The element tree shared by both peers of the server-component protocol.
//!
//! ## Data Flow
//!
//! ```text
//! root ──► Evaluator ──► serializable tree ──► encode ──► text
//!                                                          │
//! presentable tree ◄── Resolver ◄── serializable tree ◄── decode
//! ```
//!
//! ## Key Concepts
//!
//! - **Element**: a tree node whose [`ElementKind`] is a fragment, an intrinsic
//!   tag, a composite (a [`Component`] plus props) or a boundary reference
//! - **Client boundary**: a composite carrying the [`BOUNDARY_PROP`] marker;
//!   the server stops there and emits a reference instead
//! - **Key**: optional identity, synthesized for siblings by [`identity`]

pub mod component;
pub mod element;
pub mod error;
pub mod identity;

pub use component::{Component, ComponentResult, Render, RenderFuture};
pub use element::{Element, ElementKind, Key, Node, Props, BOUNDARY_PROP, CHILDREN_PROP};
pub use error::{ComponentError, StructuralError};
pub use identity::{assign_sibling_keys, synthesize_key};
