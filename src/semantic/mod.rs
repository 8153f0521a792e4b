//! Semantic model shared by the analyzer
//!
//! - [`types`]: the [`types::Type`] value and the promotion lattice
//! - [`symbols`]: scoped variables plus function and struct registries
//! - [`format`]: `printf`/`scanf` conversion specifiers

pub mod format;
pub mod symbols;
pub mod types;
