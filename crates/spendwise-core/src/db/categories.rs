//! Category arena operations and system-category seeding

use rusqlite::{params, OptionalExtension, Row};
use tracing::info;

use super::Database;
use crate::error::Result;
use crate::models::Category;

const CATEGORY_COLUMNS: &str =
    "id, name, description, icon, color, is_system_category, parent_category_id";

impl Database {
    /// Seed the system categories (idempotent)
    ///
    /// Ids are fixed because the categorizer maps keyword groups to them;
    /// see `categorize::suggest_category`.
    pub fn seed_categories(&self) -> Result<()> {
        let conn = self.conn()?;

        let categories: [(i64, &str, &str, &str); 9] = [
            (1, "Food & Dining", "🍽️", "#f59e0b"),
            (2, "Transportation", "🚗", "#ef4444"),
            (3, "Shopping", "🛍️", "#14b8a6"),
            (4, "Entertainment", "🎬", "#f97316"),
            (5, "Bills & Utilities", "💡", "#8b5cf6"),
            (6, "Healthcare", "🏥", "#ec4899"),
            (7, "Travel", "✈️", "#06b6d4"),
            (8, "Education", "🎓", "#6366f1"),
            (9, "Uncategorized", "📁", "#9ca3af"),
        ];

        let mut seeded = 0;
        for (id, name, icon, color) in &categories {
            let exists = conn
                .query_row("SELECT 1 FROM categories WHERE id = ?", params![id], |_| {
                    Ok(())
                })
                .optional()?
                .is_some();

            if !exists {
                conn.execute(
                    r#"
                    INSERT INTO categories (id, name, icon, color, is_system_category)
                    VALUES (?, ?, ?, ?, 1)
                    "#,
                    params![id, name, icon, color],
                )?;
                seeded += 1;
            }
        }

        if seeded > 0 {
            info!(count = seeded, "Seeded system categories");
        }
        Ok(())
    }

    /// List all categories ordered by id
    pub fn list_categories(&self) -> Result<Vec<Category>> {
        let conn = self.conn()?;
        let mut stmt = conn.prepare(&format!(
            "SELECT {} FROM categories ORDER BY id",
            CATEGORY_COLUMNS
        ))?;

        let categories = stmt
            .query_map([], Self::row_to_category)?
            .collect::<std::result::Result<Vec<_>, _>>()?;

        Ok(categories)
    }

    /// Get a category by id
    pub fn get_category(&self, id: i64) -> Result<Option<Category>> {
        let conn = self.conn()?;
        let category = conn
            .query_row(
                &format!("SELECT {} FROM categories WHERE id = ?", CATEGORY_COLUMNS),
                params![id],
                Self::row_to_category,
            )
            .optional()?;
        Ok(category)
    }

    /// Create a custom category, returning the new id
    ///
    /// The caller is responsible for checking that `parent_category_id`
    /// refers to an existing category.
    pub fn create_category(
        &self,
        name: &str,
        description: Option<&str>,
        icon: Option<&str>,
        color: Option<&str>,
        parent_category_id: Option<i64>,
    ) -> Result<i64> {
        let conn = self.conn()?;
        conn.execute(
            r#"
            INSERT INTO categories (name, description, icon, color, parent_category_id)
            VALUES (?, ?, ?, ?, ?)
            "#,
            params![name, description, icon, color, parent_category_id],
        )?;
        Ok(conn.last_insert_rowid())
    }

    /// Count all categories
    pub fn count_categories(&self) -> Result<i64> {
        let conn = self.conn()?;
        let count: i64 = conn.query_row("SELECT COUNT(*) FROM categories", [], |row| row.get(0))?;
        Ok(count)
    }

    fn row_to_category(row: &Row) -> rusqlite::Result<Category> {
        let is_system: i64 = row.get(5)?;

        Ok(Category {
            id: row.get(0)?,
            name: row.get(1)?,
            description: row.get(2)?,
            icon: row.get(3)?,
            color: row.get(4)?,
            is_system_category: is_system != 0,
            parent_category_id: row.get(6)?,
        })
    }
}
