mod schema;

use std::path::PathBuf;
use std::sync::{Arc, Mutex};

use anyhow::Result;
use chrono::Utc;
use rusqlite::Connection;
use thiserror::Error;
use uuid::Uuid;

use crate::models::*;
use crate::text::{self, ParsedIngredient, ParsedInstruction};

/// Errors surfaced by store operations.
///
/// Validation failures are refusals: they happen before any row is touched,
/// so the stored recipe is exactly what it was. Everything else is the
/// persistence layer reporting a real fault.
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("validation failed: {field} must not be empty")]
    Validation { field: &'static str },

    #[error("persistence error: {0}")]
    Persistence(#[from] rusqlite::Error),
}

pub struct Database {
    conn: Arc<Mutex<Connection>>,
}

impl Database {
    pub fn open(path: PathBuf) -> Result<Self> {
        let parent = path
            .parent()
            .ok_or_else(|| anyhow::anyhow!("Database path has no parent directory"))?;
        std::fs::create_dir_all(parent)?;
        let conn = Connection::open(&path)?;
        conn.pragma_update(None, "journal_mode", "WAL")?;
        conn.pragma_update(None, "foreign_keys", "ON")?;
        Ok(Self {
            conn: Arc::new(Mutex::new(conn)),
        })
    }

    pub fn open_default() -> Result<Self> {
        let dirs = directories::ProjectDirs::from("", "", "larder")
            .ok_or_else(|| anyhow::anyhow!("Could not determine data directory"))?;
        let db_path = dirs.data_dir().join("larder.db");
        Self::open(db_path)
    }

    pub fn open_memory() -> Result<Self> {
        let conn = Connection::open_in_memory()?;
        conn.pragma_update(None, "foreign_keys", "ON")?;
        Ok(Self {
            conn: Arc::new(Mutex::new(conn)),
        })
    }

    pub fn migrate(&self) -> Result<()> {
        let conn = self.conn.lock().expect("database lock poisoned");
        schema::run_migrations(&conn)
    }

    // ============================================================
    // Recipe operations
    // ============================================================

    pub fn get_all_recipes(&self) -> Result<Vec<Recipe>, StoreError> {
        let conn = self.conn.lock().expect("database lock poisoned");
        let mut stmt = conn.prepare(
            "SELECT id, name, image, source, prep_time, cook_time, comments, created_at, updated_at
             FROM recipes ORDER BY name",
        )?;

        let recipes = stmt
            .query_map([], |row| {
                Ok(Recipe {
                    id: parse_uuid(row.get::<_, String>(0)?),
                    name: row.get(1)?,
                    image: row.get(2)?,
                    source: row.get(3)?,
                    prep_time: row.get(4)?,
                    cook_time: row.get(5)?,
                    comments: row.get(6)?,
                    created_at: parse_datetime(row.get::<_, String>(7)?),
                    updated_at: parse_datetime(row.get::<_, String>(8)?),
                })
            })?
            .collect::<Result<Vec<_>, _>>()?;

        Ok(recipes)
    }

    /// Case-insensitive substring search over names, comments and sources.
    pub fn search_recipes(&self, query: &str, limit: Option<u32>) -> Result<Vec<Recipe>, StoreError> {
        let limit = limit.unwrap_or(10);
        let pattern = format!("%{}%", query);

        let conn = self.conn.lock().expect("database lock poisoned");
        let mut stmt = conn.prepare(
            "SELECT id, name, image, source, prep_time, cook_time, comments, created_at, updated_at
             FROM recipes
             WHERE name LIKE ?1 OR comments LIKE ?1 OR source LIKE ?1
             ORDER BY name LIMIT ?2",
        )?;

        let recipes = stmt
            .query_map((&pattern, limit), |row| {
                Ok(Recipe {
                    id: parse_uuid(row.get::<_, String>(0)?),
                    name: row.get(1)?,
                    image: row.get(2)?,
                    source: row.get(3)?,
                    prep_time: row.get(4)?,
                    cook_time: row.get(5)?,
                    comments: row.get(6)?,
                    created_at: parse_datetime(row.get::<_, String>(7)?),
                    updated_at: parse_datetime(row.get::<_, String>(8)?),
                })
            })?
            .collect::<Result<Vec<_>, _>>()?;

        Ok(recipes)
    }

    pub fn get_recipe(&self, id: Uuid) -> Result<Option<Recipe>, StoreError> {
        let conn = self.conn.lock().expect("database lock poisoned");
        let mut stmt = conn.prepare(
            "SELECT id, name, image, source, prep_time, cook_time, comments, created_at, updated_at
             FROM recipes WHERE id = ?",
        )?;

        let mut rows = stmt.query([id.to_string()])?;
        if let Some(row) = rows.next()? {
            Ok(Some(Recipe {
                id: parse_uuid(row.get::<_, String>(0)?),
                name: row.get(1)?,
                image: row.get(2)?,
                source: row.get(3)?,
                prep_time: row.get(4)?,
                cook_time: row.get(5)?,
                comments: row.get(6)?,
                created_at: parse_datetime(row.get::<_, String>(7)?),
                updated_at: parse_datetime(row.get::<_, String>(8)?),
            }))
        } else {
            Ok(None)
        }
    }

    /// A recipe with all of its child collections attached. `None` if the
    /// recipe itself does not exist.
    pub fn get_recipe_detail(&self, id: Uuid) -> Result<Option<RecipeDetail>, StoreError> {
        let recipe = match self.get_recipe(id)? {
            Some(recipe) => recipe,
            None => return Ok(None),
        };

        let instructions = self.get_instructions(id)?;
        let ingredients = self.get_ingredients(id)?;
        let categories = self.get_recipe_categories(id)?;

        Ok(Some(RecipeDetail {
            recipe,
            instructions,
            ingredients,
            categories,
        }))
    }

    /// The stored recipe rendered back into editable form: scalar fields
    /// verbatim, child collections as the text blocks the parser accepts.
    pub fn get_recipe_draft(&self, id: Uuid) -> Result<Option<RecipeDraft>, StoreError> {
        let Some(detail) = self.get_recipe_detail(id)? else {
            return Ok(None);
        };

        Ok(Some(RecipeDraft {
            name: detail.recipe.name,
            image: detail.recipe.image,
            source: detail.recipe.source,
            prep_time: detail.recipe.prep_time,
            cook_time: detail.recipe.cook_time,
            comments: detail.recipe.comments,
            categories: detail.categories.into_iter().map(|c| c.name).collect(),
            instructions: text::render_instructions(&detail.instructions),
            ingredients: text::render_ingredients(&detail.ingredients),
        }))
    }

    /// Persist a new recipe from an editor draft.
    ///
    /// The draft's name must be non-empty after trimming; a blank name is
    /// rejected before anything is written. The instruction and ingredient
    /// blocks are parsed and stored, and the category names are linked,
    /// all in one transaction with the root row.
    pub fn create_recipe(&self, draft: RecipeDraft) -> Result<RecipeDetail, StoreError> {
        let name = draft.name.trim().to_string();
        if name.is_empty() {
            return Err(StoreError::Validation { field: "name" });
        }

        let steps = text::parse_instructions(&draft.instructions);
        let items = text::parse_ingredients(&draft.ingredients);

        let id = Uuid::new_v4();
        let now = Utc::now();

        let mut conn = self.conn.lock().expect("database lock poisoned");
        let tx = conn.transaction()?;

        tx.execute(
            "INSERT INTO recipes (id, name, image, source, prep_time, cook_time, comments, created_at, updated_at)
             VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?)",
            (
                id.to_string(),
                &name,
                &draft.image,
                &draft.source,
                &draft.prep_time,
                &draft.cook_time,
                &draft.comments,
                now.to_rfc3339(),
                now.to_rfc3339(),
            ),
        )?;

        let instructions = replace_instructions(&tx, id, &steps)?;
        let mut ingredients = replace_ingredients(&tx, id, &items)?;
        let mut categories = set_categories(&tx, id, &draft.categories)?;
        tx.commit()?;

        ingredients.sort_by(|a, b| a.name.cmp(&b.name));
        categories.sort_by(|a, b| a.name.cmp(&b.name));

        Ok(RecipeDetail {
            recipe: Recipe {
                id,
                name,
                image: draft.image,
                source: draft.source,
                prep_time: draft.prep_time,
                cook_time: draft.cook_time,
                comments: draft.comments,
                created_at: now,
                updated_at: now,
            },
            instructions,
            ingredients,
            categories,
        })
    }

    /// Overwrite a stored recipe with an editor draft.
    ///
    /// The draft is a complete snapshot, not a patch: scalar fields are
    /// rewritten and every child collection is replaced wholesale by
    /// whatever the draft's text blocks parse into. An empty block empties
    /// the collection. The whole save is one transaction, so a failure
    /// leaves the previous version intact.
    pub fn update_recipe(
        &self,
        id: Uuid,
        draft: RecipeDraft,
    ) -> Result<Option<RecipeDetail>, StoreError> {
        let Some(existing) = self.get_recipe(id)? else {
            return Ok(None);
        };

        let name = draft.name.trim().to_string();
        if name.is_empty() {
            return Err(StoreError::Validation { field: "name" });
        }

        let steps = text::parse_instructions(&draft.instructions);
        let items = text::parse_ingredients(&draft.ingredients);
        let now = Utc::now();

        let mut conn = self.conn.lock().expect("database lock poisoned");
        let tx = conn.transaction()?;

        tx.execute(
            "UPDATE recipes SET name = ?, image = ?, source = ?, prep_time = ?, cook_time = ?, comments = ?, updated_at = ?
             WHERE id = ?",
            (
                &name,
                &draft.image,
                &draft.source,
                &draft.prep_time,
                &draft.cook_time,
                &draft.comments,
                now.to_rfc3339(),
                id.to_string(),
            ),
        )?;

        let instructions = replace_instructions(&tx, id, &steps)?;
        let mut ingredients = replace_ingredients(&tx, id, &items)?;
        let mut categories = set_categories(&tx, id, &draft.categories)?;
        tx.commit()?;

        ingredients.sort_by(|a, b| a.name.cmp(&b.name));
        categories.sort_by(|a, b| a.name.cmp(&b.name));

        Ok(Some(RecipeDetail {
            recipe: Recipe {
                id,
                name,
                image: draft.image,
                source: draft.source,
                prep_time: draft.prep_time,
                cook_time: draft.cook_time,
                comments: draft.comments,
                created_at: existing.created_at,
                updated_at: now,
            },
            instructions,
            ingredients,
            categories,
        }))
    }

    /// Deleting a recipe takes its instructions, ingredients and category
    /// links with it. The categories themselves stay.
    pub fn delete_recipe(&self, id: Uuid) -> Result<bool, StoreError> {
        let conn = self.conn.lock().expect("database lock poisoned");
        let rows = conn.execute("DELETE FROM recipes WHERE id = ?", [id.to_string()])?;
        Ok(rows > 0)
    }

    // ============================================================
    // Instruction and ingredient operations
    // ============================================================

    pub fn get_instructions(&self, recipe_id: Uuid) -> Result<Vec<Instruction>, StoreError> {
        let conn = self.conn.lock().expect("database lock poisoned");
        let mut stmt = conn.prepare(
            "SELECT id, recipe_id, position, text
             FROM instructions WHERE recipe_id = ? ORDER BY position",
        )?;

        let instructions = stmt
            .query_map([recipe_id.to_string()], |row| {
                Ok(Instruction {
                    id: parse_uuid(row.get::<_, String>(0)?),
                    recipe_id: parse_uuid(row.get::<_, String>(1)?),
                    position: row.get(2)?,
                    text: row.get(3)?,
                })
            })?
            .collect::<Result<Vec<_>, _>>()?;

        Ok(instructions)
    }

    pub fn get_ingredients(&self, recipe_id: Uuid) -> Result<Vec<Ingredient>, StoreError> {
        let conn = self.conn.lock().expect("database lock poisoned");
        let mut stmt = conn.prepare(
            "SELECT id, recipe_id, name, quantity
             FROM ingredients WHERE recipe_id = ? ORDER BY name",
        )?;

        let ingredients = stmt
            .query_map([recipe_id.to_string()], |row| {
                Ok(Ingredient {
                    id: parse_uuid(row.get::<_, String>(0)?),
                    recipe_id: parse_uuid(row.get::<_, String>(1)?),
                    name: row.get(2)?,
                    quantity: row.get(3)?,
                })
            })?
            .collect::<Result<Vec<_>, _>>()?;

        Ok(ingredients)
    }

    /// Replace a recipe's entire instruction list with a freshly parsed
    /// one. `None` if the recipe does not exist. The save path does this
    /// as part of its own transaction; this standalone form reconciles a
    /// single collection and bumps the recipe's modification time.
    pub fn update_instructions(
        &self,
        recipe_id: Uuid,
        steps: &[ParsedInstruction],
    ) -> Result<Option<Vec<Instruction>>, StoreError> {
        if self.get_recipe(recipe_id)?.is_none() {
            return Ok(None);
        }

        let mut conn = self.conn.lock().expect("database lock poisoned");
        let tx = conn.transaction()?;
        tx.execute(
            "UPDATE recipes SET updated_at = ? WHERE id = ?",
            (Utc::now().to_rfc3339(), recipe_id.to_string()),
        )?;
        let instructions = replace_instructions(&tx, recipe_id, steps)?;
        tx.commit()?;

        Ok(Some(instructions))
    }

    /// Replace a recipe's entire ingredient list with a freshly parsed
    /// one. `None` if the recipe does not exist. Returned rows are in
    /// display order, by name.
    pub fn update_ingredients(
        &self,
        recipe_id: Uuid,
        items: &[ParsedIngredient],
    ) -> Result<Option<Vec<Ingredient>>, StoreError> {
        if self.get_recipe(recipe_id)?.is_none() {
            return Ok(None);
        }

        let mut conn = self.conn.lock().expect("database lock poisoned");
        let tx = conn.transaction()?;
        tx.execute(
            "UPDATE recipes SET updated_at = ? WHERE id = ?",
            (Utc::now().to_rfc3339(), recipe_id.to_string()),
        )?;
        let mut ingredients = replace_ingredients(&tx, recipe_id, items)?;
        tx.commit()?;

        ingredients.sort_by(|a, b| a.name.cmp(&b.name));
        Ok(Some(ingredients))
    }

    // ============================================================
    // Category operations
    // ============================================================

    pub fn get_all_categories(&self) -> Result<Vec<Category>, StoreError> {
        let conn = self.conn.lock().expect("database lock poisoned");
        let mut stmt = conn.prepare("SELECT id, name, created_at FROM categories ORDER BY name")?;

        let categories = stmt
            .query_map([], |row| {
                Ok(Category {
                    id: parse_uuid(row.get::<_, String>(0)?),
                    name: row.get(1)?,
                    created_at: parse_datetime(row.get::<_, String>(2)?),
                })
            })?
            .collect::<Result<Vec<_>, _>>()?;

        Ok(categories)
    }

    pub fn get_category(&self, id: Uuid) -> Result<Option<Category>, StoreError> {
        let conn = self.conn.lock().expect("database lock poisoned");
        let mut stmt = conn.prepare("SELECT id, name, created_at FROM categories WHERE id = ?")?;

        let mut rows = stmt.query([id.to_string()])?;
        if let Some(row) = rows.next()? {
            Ok(Some(Category {
                id: parse_uuid(row.get::<_, String>(0)?),
                name: row.get(1)?,
                created_at: parse_datetime(row.get::<_, String>(2)?),
            }))
        } else {
            Ok(None)
        }
    }

    pub fn get_recipe_categories(&self, recipe_id: Uuid) -> Result<Vec<Category>, StoreError> {
        let conn = self.conn.lock().expect("database lock poisoned");
        let mut stmt = conn.prepare(
            "SELECT c.id, c.name, c.created_at
             FROM categories c
             JOIN recipe_categories rc ON rc.category_id = c.id
             WHERE rc.recipe_id = ? ORDER BY c.name",
        )?;

        let categories = stmt
            .query_map([recipe_id.to_string()], |row| {
                Ok(Category {
                    id: parse_uuid(row.get::<_, String>(0)?),
                    name: row.get(1)?,
                    created_at: parse_datetime(row.get::<_, String>(2)?),
                })
            })?
            .collect::<Result<Vec<_>, _>>()?;

        Ok(categories)
    }

    pub fn get_recipes_by_category(&self, category_id: Uuid) -> Result<Vec<Recipe>, StoreError> {
        let conn = self.conn.lock().expect("database lock poisoned");
        let mut stmt = conn.prepare(
            "SELECT r.id, r.name, r.image, r.source, r.prep_time, r.cook_time, r.comments, r.created_at, r.updated_at
             FROM recipes r
             JOIN recipe_categories rc ON rc.recipe_id = r.id
             WHERE rc.category_id = ? ORDER BY r.name",
        )?;

        let recipes = stmt
            .query_map([category_id.to_string()], |row| {
                Ok(Recipe {
                    id: parse_uuid(row.get::<_, String>(0)?),
                    name: row.get(1)?,
                    image: row.get(2)?,
                    source: row.get(3)?,
                    prep_time: row.get(4)?,
                    cook_time: row.get(5)?,
                    comments: row.get(6)?,
                    created_at: parse_datetime(row.get::<_, String>(7)?),
                    updated_at: parse_datetime(row.get::<_, String>(8)?),
                })
            })?
            .collect::<Result<Vec<_>, _>>()?;

        Ok(recipes)
    }

    /// Deleting a category detaches it from every recipe; the recipes
    /// themselves are untouched.
    pub fn delete_category(&self, id: Uuid) -> Result<bool, StoreError> {
        let conn = self.conn.lock().expect("database lock poisoned");
        let rows = conn.execute("DELETE FROM categories WHERE id = ?", [id.to_string()])?;
        Ok(rows > 0)
    }
}

impl Clone for Database {
    fn clone(&self) -> Self {
        Self {
            conn: self.conn.clone(),
        }
    }
}

/// Full replace of a recipe's instruction rows from a parsed block. Runs
/// inside the caller's transaction; rows come back in position order.
fn replace_instructions(
    conn: &Connection,
    recipe_id: Uuid,
    steps: &[ParsedInstruction],
) -> Result<Vec<Instruction>, StoreError> {
    conn.execute(
        "DELETE FROM instructions WHERE recipe_id = ?",
        [recipe_id.to_string()],
    )?;

    let mut rows = Vec::with_capacity(steps.len());
    for step in steps {
        let instruction = Instruction {
            id: Uuid::new_v4(),
            recipe_id,
            position: step.position,
            text: step.text.clone(),
        };
        conn.execute(
            "INSERT INTO instructions (id, recipe_id, position, text) VALUES (?, ?, ?, ?)",
            (
                instruction.id.to_string(),
                recipe_id.to_string(),
                instruction.position,
                &instruction.text,
            ),
        )?;
        rows.push(instruction);
    }

    Ok(rows)
}

/// Full replace of a recipe's ingredient rows from a parsed block. Runs
/// inside the caller's transaction; rows come back in parse order, so
/// callers that care about display order sort by name afterwards.
fn replace_ingredients(
    conn: &Connection,
    recipe_id: Uuid,
    items: &[ParsedIngredient],
) -> Result<Vec<Ingredient>, StoreError> {
    conn.execute(
        "DELETE FROM ingredients WHERE recipe_id = ?",
        [recipe_id.to_string()],
    )?;

    let mut rows = Vec::with_capacity(items.len());
    for item in items {
        let ingredient = Ingredient {
            id: Uuid::new_v4(),
            recipe_id,
            name: item.name.clone(),
            quantity: item.quantity.clone(),
        };
        conn.execute(
            "INSERT INTO ingredients (id, recipe_id, name, quantity) VALUES (?, ?, ?, ?)",
            (
                ingredient.id.to_string(),
                recipe_id.to_string(),
                &ingredient.name,
                &ingredient.quantity,
            ),
        )?;
        rows.push(ingredient);
    }

    Ok(rows)
}

/// Re-link a recipe's categories: drop the old join rows, find or create
/// a category for each distinct trimmed name, link them. Categories left
/// without recipes are kept; they are shared labels, not owned children.
fn set_categories(
    conn: &Connection,
    recipe_id: Uuid,
    names: &[String],
) -> Result<Vec<Category>, StoreError> {
    conn.execute(
        "DELETE FROM recipe_categories WHERE recipe_id = ?",
        [recipe_id.to_string()],
    )?;

    let mut linked: Vec<Category> = Vec::new();
    for raw in names {
        let name = raw.trim();
        if name.is_empty() || linked.iter().any(|c| c.name == name) {
            continue;
        }
        let category = find_or_create_category(conn, name)?;
        conn.execute(
            "INSERT INTO recipe_categories (recipe_id, category_id) VALUES (?, ?)",
            (recipe_id.to_string(), category.id.to_string()),
        )?;
        linked.push(category);
    }

    Ok(linked)
}

fn find_or_create_category(conn: &Connection, name: &str) -> Result<Category, StoreError> {
    let mut stmt = conn.prepare("SELECT id, name, created_at FROM categories WHERE name = ?")?;
    let mut rows = stmt.query([name])?;
    if let Some(row) = rows.next()? {
        return Ok(Category {
            id: parse_uuid(row.get::<_, String>(0)?),
            name: row.get(1)?,
            created_at: parse_datetime(row.get::<_, String>(2)?),
        });
    }

    let id = Uuid::new_v4();
    let now = Utc::now();
    conn.execute(
        "INSERT INTO categories (id, name, created_at) VALUES (?, ?, ?)",
        (id.to_string(), name, now.to_rfc3339()),
    )?;

    Ok(Category {
        id,
        name: name.to_string(),
        created_at: now,
    })
}

fn parse_uuid(s: String) -> Uuid {
    Uuid::parse_str(&s).unwrap_or_else(|_| Uuid::nil())
}

fn parse_datetime(s: String) -> chrono::DateTime<Utc> {
    chrono::DateTime::parse_from_rfc3339(&s)
        .map(|dt| dt.with_timezone(&Utc))
        .unwrap_or_else(|_| Utc::now())
}
