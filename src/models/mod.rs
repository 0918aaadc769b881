//! Domain models for Larder.
//!
//! # Core Concepts
//!
//! ## Aggregate root
//!
//! - [`Recipe`]: the root entity. It exclusively owns its [`Instruction`]
//!   and [`Ingredient`] rows; both collections are rebuilt from the draft
//!   text blocks on every save and die with the recipe.
//!
//! ## Child records
//!
//! - [`Instruction`]: ordered steps with dense zero-based positions.
//! - [`Ingredient`]: unique by name within a recipe, displayed in name
//!   order.
//!
//! Child ids are regenerated on every save; nothing may rely on them
//! surviving an edit.
//!
//! ## Shared labels
//!
//! - [`Category`]: many-to-many with recipes, owned by none of them, kept
//!   around when orphaned.
//!
//! ## Edit boundary
//!
//! - [`RecipeDraft`]: the staged form snapshot (scalar fields plus two
//!   free-text blocks), applied atomically on save.

mod category;
mod recipe;

pub use category::*;
pub use recipe::*;
