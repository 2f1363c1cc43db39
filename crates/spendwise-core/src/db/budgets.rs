//! Budget CRUD

use rusqlite::{params, OptionalExtension, Row};

use super::Database;
use crate::error::Result;
use crate::models::{Budget, BudgetPeriod, BudgetUpdate, Category, Money, NewBudget};

const BUDGET_COLUMNS: &str = "b.id, b.user_id, b.name, b.amount_cents, b.period, \
     b.start_date, b.end_date, b.is_active, b.alert_threshold, b.category_id, \
     c.id, c.name, c.description, c.icon, c.color, c.is_system_category, c.parent_category_id";

impl Database {
    /// Insert a budget, returning the new id
    pub fn insert_budget(&self, user_id: i64, new: &NewBudget) -> Result<i64> {
        let conn = self.conn()?;
        conn.execute(
            r#"
            INSERT INTO budgets (
                user_id, name, amount_cents, period, start_date, end_date,
                category_id, alert_threshold
            )
            VALUES (?, ?, ?, ?, ?, ?, ?, ?)
            "#,
            params![
                user_id,
                new.name,
                new.amount.cents(),
                new.period.as_str(),
                new.start_date.to_string(),
                new.end_date.map(|d| d.to_string()),
                new.category_id,
                new.alert_threshold,
            ],
        )?;
        Ok(conn.last_insert_rowid())
    }

    /// Get a single budget scoped to its owner
    pub fn get_budget(&self, id: i64, user_id: i64) -> Result<Option<Budget>> {
        let conn = self.conn()?;
        let budget = conn
            .query_row(
                &format!(
                    "SELECT {} FROM budgets b
                     LEFT JOIN categories c ON b.category_id = c.id
                     WHERE b.id = ? AND b.user_id = ?",
                    BUDGET_COLUMNS
                ),
                params![id, user_id],
                Self::row_to_budget,
            )
            .optional()?;
        Ok(budget)
    }

    /// List a user's budgets, oldest first
    pub fn list_budgets(&self, user_id: i64) -> Result<Vec<Budget>> {
        let conn = self.conn()?;
        let mut stmt = conn.prepare(&format!(
            "SELECT {} FROM budgets b
             LEFT JOIN categories c ON b.category_id = c.id
             WHERE b.user_id = ?
             ORDER BY b.id",
            BUDGET_COLUMNS
        ))?;

        let budgets = stmt
            .query_map(params![user_id], Self::row_to_budget)?
            .collect::<std::result::Result<Vec<_>, _>>()?;

        Ok(budgets)
    }

    /// Apply a partial update to a budget; only provided fields change
    ///
    /// Returns false when no row matched.
    pub fn update_budget(&self, id: i64, user_id: i64, update: &BudgetUpdate) -> Result<bool> {
        let conn = self.conn()?;

        let mut updates = Vec::new();
        let mut values: Vec<Box<dyn rusqlite::ToSql>> = Vec::new();

        if let Some(ref name) = update.name {
            updates.push("name = ?");
            values.push(Box::new(name.clone()));
        }
        if let Some(amount) = update.amount {
            updates.push("amount_cents = ?");
            values.push(Box::new(amount.cents()));
        }
        if let Some(period) = update.period {
            updates.push("period = ?");
            values.push(Box::new(period.as_str()));
        }
        if let Some(start_date) = update.start_date {
            updates.push("start_date = ?");
            values.push(Box::new(start_date.to_string()));
        }
        if let Some(end_date) = update.end_date {
            updates.push("end_date = ?");
            values.push(Box::new(end_date.map(|d| d.to_string())));
        }
        if let Some(category_id) = update.category_id {
            updates.push("category_id = ?");
            values.push(Box::new(category_id));
        }
        if let Some(is_active) = update.is_active {
            updates.push("is_active = ?");
            values.push(Box::new(is_active));
        }
        if let Some(alert_threshold) = update.alert_threshold {
            updates.push("alert_threshold = ?");
            values.push(Box::new(alert_threshold));
        }

        if updates.is_empty() {
            return Ok(self.get_budget(id, user_id)?.is_some());
        }

        updates.push("updated_at = CURRENT_TIMESTAMP");
        values.push(Box::new(id));
        values.push(Box::new(user_id));

        let sql = format!(
            "UPDATE budgets SET {} WHERE id = ? AND user_id = ?",
            updates.join(", ")
        );
        let params_refs: Vec<&dyn rusqlite::ToSql> = values.iter().map(|p| p.as_ref()).collect();
        let affected = conn.execute(&sql, params_refs.as_slice())?;

        Ok(affected > 0)
    }

    /// Delete a budget scoped to its owner; returns false when absent
    pub fn delete_budget(&self, id: i64, user_id: i64) -> Result<bool> {
        let conn = self.conn()?;
        let affected = conn.execute(
            "DELETE FROM budgets WHERE id = ? AND user_id = ?",
            params![id, user_id],
        )?;
        Ok(affected > 0)
    }

    /// Count all budgets across users
    pub fn count_budgets(&self) -> Result<i64> {
        let conn = self.conn()?;
        let count: i64 = conn.query_row("SELECT COUNT(*) FROM budgets", [], |row| row.get(0))?;
        Ok(count)
    }

    fn row_to_budget(row: &Row) -> rusqlite::Result<Budget> {
        let amount_cents: i64 = row.get(3)?;
        let period_str: String = row.get(4)?;
        let start_str: String = row.get(5)?;
        let end_str: Option<String> = row.get(6)?;
        let is_active: i64 = row.get(7)?;

        let category = match row.get::<_, Option<i64>>(10)? {
            Some(category_id) => {
                let is_system: i64 = row.get(15)?;
                Some(Category {
                    id: category_id,
                    name: row.get(11)?,
                    description: row.get(12)?,
                    icon: row.get(13)?,
                    color: row.get(14)?,
                    is_system_category: is_system != 0,
                    parent_category_id: row.get(16)?,
                })
            }
            None => None,
        };

        Ok(Budget {
            id: row.get(0)?,
            user_id: row.get(1)?,
            name: row.get(2)?,
            amount: Money::from_cents(amount_cents),
            period: period_str.parse::<BudgetPeriod>().unwrap_or_default(),
            start_date: chrono::NaiveDate::parse_from_str(&start_str, "%Y-%m-%d")
                .unwrap_or_default(),
            end_date: end_str
                .and_then(|s| chrono::NaiveDate::parse_from_str(&s, "%Y-%m-%d").ok()),
            is_active: is_active != 0,
            alert_threshold: row.get(8)?,
            category,
            category_id: row.get(9)?,
        })
    }
}
