//! # carnet-core
//!
//! Core types, traits, and pure codecs for the carnet memo store.
//!
//! This crate provides the domain model, the resource-name scheme, the
//! frontmatter codec, and the filter expression parser that the other
//! carnet crates build on. It performs no I/O.

pub mod defaults;
pub mod error;
pub mod filter;
pub mod frontmatter;
pub mod models;
pub mod names;
pub mod traits;

// Re-export commonly used types at crate root
pub use error::{Error, Result};
pub use filter::MemoFilter;
pub use frontmatter::{Decoded, MemoMetadata};
pub use models::*;
pub use names::{
    attachment_name, comment_name, memo_name, parse_attachment_name, parse_memo_name,
    parse_reaction_name, parse_shortcut_name, parse_user_name, reaction_name, shortcut_name,
    user_name,
};
pub use traits::*;
