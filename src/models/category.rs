use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// A reusable label shared across recipes ("Dessert", "Weeknight", ...).
///
/// Categories are many-to-many with recipes and owned by no one: deleting
/// a recipe leaves its categories behind, and a category no recipe
/// references is still a valid label. Deleting a category detaches it
/// from every recipe that carries it.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Category {
    pub id: Uuid,
    pub name: String,
    pub created_at: DateTime<Utc>,
}
