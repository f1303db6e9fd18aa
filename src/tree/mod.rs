//! Directory tree inventory
//!
//! Walks a root directory depth-first and turns it into a manifest of
//! canonical paths, content digests, and sizes.

pub mod builder;
pub mod hasher;
pub mod path;
pub mod walker;
