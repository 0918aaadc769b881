use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::category::Category;

/// A stored recipe.
///
/// Recipes are the aggregate root of the data model: each one exclusively
/// owns its [`Instruction`] and [`Ingredient`] rows, which are rebuilt
/// from the draft text blocks on every save and deleted with the recipe.
/// Categories are shared labels and are only linked, never owned.
///
/// # Lifecycle
/// A recipe row is created on the first save of a draft and mutated in
/// place on later saves: `id` and `created_at` are stable, `updated_at`
/// moves. Children are NOT stable across saves; see [`RecipeDraft`].
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Recipe {
    pub id: Uuid,
    pub name: String,
    /// Opaque image reference (a path or a URL). Larder never loads it;
    /// resolution and caching belong to the client.
    pub image: Option<String>,
    /// Where the recipe came from: a cookbook, a person, a URL.
    pub source: Option<String>,
    /// Free-text duration label, e.g. "20 min" or "overnight". Never parsed.
    pub prep_time: Option<String>,
    /// Free-text duration label. Never parsed.
    pub cook_time: Option<String>,
    pub comments: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Lean projection of a recipe for list views.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RecipeSummary {
    pub id: Uuid,
    pub name: String,
    pub image: Option<String>,
    pub prep_time: Option<String>,
    pub cook_time: Option<String>,
    pub updated_at: DateTime<Utc>,
}

impl From<Recipe> for RecipeSummary {
    fn from(r: Recipe) -> Self {
        Self {
            id: r.id,
            name: r.name,
            image: r.image,
            prep_time: r.prep_time,
            cook_time: r.cook_time,
            updated_at: r.updated_at,
        }
    }
}

/// A single preparation step.
///
/// Positions are zero-based, unique per recipe, and dense (`0..n-1`)
/// after every save: the draft text is re-parsed in textual order, so
/// prior positions never survive an edit.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Instruction {
    /// Fresh on every save; never reference an instruction by id across edits.
    pub id: Uuid,
    pub recipe_id: Uuid,
    pub position: i64,
    pub text: String,
}

/// A single ingredient line.
///
/// Names are unique within a recipe, and display order is lexicographic
/// by name rather than the order the lines were typed.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Ingredient {
    /// Fresh on every save, like [`Instruction::id`].
    pub id: Uuid,
    pub recipe_id: Uuid,
    pub name: String,
    /// Free-text secondary field from a `name: quantity` line.
    pub quantity: Option<String>,
}

/// A recipe together with its sorted children, used for detail responses.
///
/// Instructions come ordered by position, ingredients and categories by
/// name. The recipe fields are flattened into the JSON response.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RecipeDetail {
    #[serde(flatten)]
    pub recipe: Recipe,
    pub instructions: Vec<Instruction>,
    pub ingredients: Vec<Ingredient>,
    pub categories: Vec<Category>,
}

/// An editor-session snapshot: everything the edit form holds, staged in
/// memory and applied in one transaction on save.
///
/// The two text blocks carry one entry per line and are re-parsed on
/// every save (see [`crate::text`]); the stored child collections are
/// fully replaced by the parsed result. A draft is a complete snapshot,
/// not a partial update: saving it overwrites every editable field.
///
/// Two editor sessions on the same recipe are not coordinated: the last
/// save wins, silently. Acceptable for a single-user local box.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RecipeDraft {
    pub name: String,
    pub image: Option<String>,
    pub source: Option<String>,
    pub prep_time: Option<String>,
    pub cook_time: Option<String>,
    pub comments: Option<String>,
    /// Category names; missing ones are created. Order is irrelevant.
    #[serde(default)]
    pub categories: Vec<String>,
    /// One step per line.
    #[serde(default)]
    pub instructions: String,
    /// One `name` or `name: quantity` per line.
    #[serde(default)]
    pub ingredients: String,
}
