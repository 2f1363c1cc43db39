//! Savings goal CRUD

use rusqlite::{params, OptionalExtension, Row};

use super::Database;
use crate::error::Result;
use crate::models::{Goal, GoalPriority, GoalUpdate, Money, NewGoal};

const GOAL_COLUMNS: &str = "id, user_id, title, description, target_cents, current_cents, \
                            target_date, category, priority, is_completed";

impl Database {
    /// Insert a goal, returning the new id
    pub fn insert_goal(&self, user_id: i64, new: &NewGoal) -> Result<i64> {
        let conn = self.conn()?;
        conn.execute(
            r#"
            INSERT INTO goals (
                user_id, title, description, target_cents, current_cents,
                target_date, category, priority
            )
            VALUES (?, ?, ?, ?, ?, ?, ?, ?)
            "#,
            params![
                user_id,
                new.title,
                new.description,
                new.target_amount.cents(),
                new.current_amount.cents(),
                new.target_date.map(|d| d.to_string()),
                new.category,
                new.priority.as_str(),
            ],
        )?;
        Ok(conn.last_insert_rowid())
    }

    /// Get a single goal scoped to its owner
    pub fn get_goal(&self, id: i64, user_id: i64) -> Result<Option<Goal>> {
        let conn = self.conn()?;
        let goal = conn
            .query_row(
                &format!(
                    "SELECT {} FROM goals WHERE id = ? AND user_id = ?",
                    GOAL_COLUMNS
                ),
                params![id, user_id],
                Self::row_to_goal,
            )
            .optional()?;
        Ok(goal)
    }

    /// List a user's goals, oldest first
    pub fn list_goals(&self, user_id: i64) -> Result<Vec<Goal>> {
        let conn = self.conn()?;
        let mut stmt = conn.prepare(&format!(
            "SELECT {} FROM goals WHERE user_id = ? ORDER BY id",
            GOAL_COLUMNS
        ))?;

        let goals = stmt
            .query_map(params![user_id], Self::row_to_goal)?
            .collect::<std::result::Result<Vec<_>, _>>()?;

        Ok(goals)
    }

    /// Apply a partial update to a goal; only provided fields change
    ///
    /// Returns false when no row matched.
    pub fn update_goal(&self, id: i64, user_id: i64, update: &GoalUpdate) -> Result<bool> {
        let conn = self.conn()?;

        let mut updates = Vec::new();
        let mut values: Vec<Box<dyn rusqlite::ToSql>> = Vec::new();

        if let Some(ref title) = update.title {
            updates.push("title = ?");
            values.push(Box::new(title.clone()));
        }
        if let Some(ref description) = update.description {
            updates.push("description = ?");
            values.push(Box::new(description.clone()));
        }
        if let Some(target_amount) = update.target_amount {
            updates.push("target_cents = ?");
            values.push(Box::new(target_amount.cents()));
        }
        if let Some(current_amount) = update.current_amount {
            updates.push("current_cents = ?");
            values.push(Box::new(current_amount.cents()));
        }
        if let Some(target_date) = update.target_date {
            updates.push("target_date = ?");
            values.push(Box::new(target_date.map(|d| d.to_string())));
        }
        if let Some(ref category) = update.category {
            updates.push("category = ?");
            values.push(Box::new(category.clone()));
        }
        if let Some(priority) = update.priority {
            updates.push("priority = ?");
            values.push(Box::new(priority.as_str()));
        }
        if let Some(is_completed) = update.is_completed {
            updates.push("is_completed = ?");
            values.push(Box::new(is_completed));
        }

        if updates.is_empty() {
            return Ok(self.get_goal(id, user_id)?.is_some());
        }

        updates.push("updated_at = CURRENT_TIMESTAMP");
        values.push(Box::new(id));
        values.push(Box::new(user_id));

        let sql = format!(
            "UPDATE goals SET {} WHERE id = ? AND user_id = ?",
            updates.join(", ")
        );
        let params_refs: Vec<&dyn rusqlite::ToSql> = values.iter().map(|p| p.as_ref()).collect();
        let affected = conn.execute(&sql, params_refs.as_slice())?;

        Ok(affected > 0)
    }

    /// Delete a goal scoped to its owner; returns false when absent
    pub fn delete_goal(&self, id: i64, user_id: i64) -> Result<bool> {
        let conn = self.conn()?;
        let affected = conn.execute(
            "DELETE FROM goals WHERE id = ? AND user_id = ?",
            params![id, user_id],
        )?;
        Ok(affected > 0)
    }

    /// Count all goals across users
    pub fn count_goals(&self) -> Result<i64> {
        let conn = self.conn()?;
        let count: i64 = conn.query_row("SELECT COUNT(*) FROM goals", [], |row| row.get(0))?;
        Ok(count)
    }

    fn row_to_goal(row: &Row) -> rusqlite::Result<Goal> {
        let target_cents: i64 = row.get(4)?;
        let current_cents: i64 = row.get(5)?;
        let target_date_str: Option<String> = row.get(6)?;
        let priority_str: String = row.get(8)?;
        let is_completed: i64 = row.get(9)?;

        // Progress is derived on read so it can never drift from the amounts
        let progress_percentage = if target_cents > 0 {
            ((current_cents as f64 / target_cents as f64) * 1000.0).round() / 10.0
        } else {
            0.0
        };

        Ok(Goal {
            id: row.get(0)?,
            user_id: row.get(1)?,
            title: row.get(2)?,
            description: row.get(3)?,
            target_amount: Money::from_cents(target_cents),
            current_amount: Money::from_cents(current_cents),
            progress_percentage,
            target_date: target_date_str
                .and_then(|s| chrono::NaiveDate::parse_from_str(&s, "%Y-%m-%d").ok()),
            category: row.get(7)?,
            priority: priority_str.parse::<GoalPriority>().unwrap_or_default(),
            is_completed: is_completed != 0,
        })
    }
}
