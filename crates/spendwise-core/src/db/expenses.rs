//! Expense CRUD, filtered queries, and period summaries

use chrono::NaiveDate;
use rusqlite::{params, OptionalExtension, Row};

use super::{parse_datetime, Database, ExpenseFilter};
use crate::error::Result;
use crate::models::{Category, Expense, ExpenseUpdate, Money, NewExpense};

/// Expense columns plus the joined category row. Queries using this list
/// must join `categories c` and alias `expenses` as `e`.
const EXPENSE_COLUMNS: &str = "e.id, e.user_id, e.amount_cents, e.currency, e.description, \
     e.category_id, e.subcategory_id, e.transaction_date, e.payment_method, e.vendor_name, \
     e.location, e.tags, e.notes, e.is_ai_categorized, e.confidence_score, \
     e.created_at, e.updated_at, \
     c.id, c.name, c.description, c.icon, c.color, c.is_system_category, c.parent_category_id";

impl Database {
    /// Insert an expense, returning the new id
    pub fn insert_expense(&self, user_id: i64, new: &NewExpense) -> Result<i64> {
        let conn = self.conn()?;
        let tags_json = serde_json::to_string(&new.tags)?;

        conn.execute(
            r#"
            INSERT INTO expenses (
                user_id, amount_cents, currency, description, category_id, subcategory_id,
                transaction_date, payment_method, vendor_name, location, tags, notes,
                is_ai_categorized, confidence_score
            )
            VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)
            "#,
            params![
                user_id,
                new.amount.cents(),
                new.currency.as_deref().unwrap_or("USD"),
                new.description,
                new.category_id,
                new.subcategory_id,
                new.transaction_date.to_string(),
                new.payment_method,
                new.vendor_name,
                new.location,
                tags_json,
                new.notes,
                new.is_ai_categorized,
                new.confidence_score,
            ],
        )?;

        Ok(conn.last_insert_rowid())
    }

    /// Get a single expense scoped to its owner
    pub fn get_expense(&self, id: i64, user_id: i64) -> Result<Option<Expense>> {
        let conn = self.conn()?;
        let expense = conn
            .query_row(
                &format!(
                    "SELECT {} FROM expenses e
                     LEFT JOIN categories c ON e.category_id = c.id
                     WHERE e.id = ? AND e.user_id = ?",
                    EXPENSE_COLUMNS
                ),
                params![id, user_id],
                Self::row_to_expense,
            )
            .optional()?;
        Ok(expense)
    }

    /// List expenses matching a filter, newest first (id breaks date ties)
    pub fn list_expenses(
        &self,
        filter: ExpenseFilter,
        limit: i64,
        offset: i64,
    ) -> Result<Vec<Expense>> {
        let conn = self.conn()?;
        let result = filter.build();

        let query = format!(
            "SELECT {} FROM expenses e
             LEFT JOIN categories c ON e.category_id = c.id
             {}
             ORDER BY e.transaction_date DESC, e.id DESC
             LIMIT ? OFFSET ?",
            EXPENSE_COLUMNS, result.where_clause
        );

        let mut query_params = result.into_params();
        query_params.push(Box::new(limit));
        query_params.push(Box::new(offset));
        let params_refs: Vec<&dyn rusqlite::ToSql> =
            query_params.iter().map(|p| p.as_ref()).collect();

        let mut stmt = conn.prepare(&query)?;
        let expenses = stmt
            .query_map(params_refs.as_slice(), Self::row_to_expense)?
            .collect::<std::result::Result<Vec<_>, _>>()?;

        Ok(expenses)
    }

    /// Count expenses matching a filter
    pub fn count_expenses(&self, filter: ExpenseFilter) -> Result<i64> {
        let conn = self.conn()?;
        let result = filter.build();

        let count: i64 = conn.query_row(
            &result.build_count_query(),
            result.params_refs().as_slice(),
            |row| row.get(0),
        )?;
        Ok(count)
    }

    /// Sum expense amounts for a user within an optional date range
    ///
    /// Ignores category and search filters on purpose: the summary total
    /// reflects overall spending for the period, not the filtered page.
    pub fn sum_expenses(
        &self,
        user_id: i64,
        start_date: Option<NaiveDate>,
        end_date: Option<NaiveDate>,
    ) -> Result<Money> {
        let conn = self.conn()?;
        let result = ExpenseFilter::new(user_id)
            .date_range(start_date, end_date)
            .build();

        let query = format!(
            "SELECT COALESCE(SUM(amount_cents), 0) FROM expenses e {}",
            result.where_clause
        );

        let cents: i64 = conn.query_row(&query, result.params_refs().as_slice(), |row| row.get(0))?;
        Ok(Money::from_cents(cents))
    }

    /// Apply a partial update to an expense; only provided fields change
    ///
    /// Returns false when no row matched (absent, or owned by another
    /// user). Setting `category_id` also clears `is_ai_categorized`: a
    /// caller-supplied category overrides the categorizer's claim, even
    /// when it is an explicit null.
    pub fn update_expense(&self, id: i64, user_id: i64, update: &ExpenseUpdate) -> Result<bool> {
        let conn = self.conn()?;

        let mut updates = Vec::new();
        let mut values: Vec<Box<dyn rusqlite::ToSql>> = Vec::new();

        if let Some(amount) = update.amount {
            updates.push("amount_cents = ?");
            values.push(Box::new(amount.cents()));
        }
        if let Some(ref currency) = update.currency {
            updates.push("currency = ?");
            values.push(Box::new(currency.clone()));
        }
        if let Some(ref description) = update.description {
            updates.push("description = ?");
            values.push(Box::new(description.clone()));
        }
        if let Some(category_id) = update.category_id {
            updates.push("category_id = ?");
            values.push(Box::new(category_id));
            updates.push("is_ai_categorized = 0");
        }
        if let Some(subcategory_id) = update.subcategory_id {
            updates.push("subcategory_id = ?");
            values.push(Box::new(subcategory_id));
        }
        if let Some(date) = update.transaction_date {
            updates.push("transaction_date = ?");
            values.push(Box::new(date.to_string()));
        }
        if let Some(ref payment_method) = update.payment_method {
            updates.push("payment_method = ?");
            values.push(Box::new(payment_method.clone()));
        }
        if let Some(ref vendor_name) = update.vendor_name {
            updates.push("vendor_name = ?");
            values.push(Box::new(vendor_name.clone()));
        }
        if let Some(ref location) = update.location {
            updates.push("location = ?");
            values.push(Box::new(location.clone()));
        }
        if let Some(ref tags) = update.tags {
            updates.push("tags = ?");
            values.push(Box::new(serde_json::to_string(tags)?));
        }
        if let Some(ref notes) = update.notes {
            updates.push("notes = ?");
            values.push(Box::new(notes.clone()));
        }

        if updates.is_empty() {
            // Nothing to change; still report whether the row exists
            return Ok(self.get_expense(id, user_id)?.is_some());
        }

        updates.push("updated_at = CURRENT_TIMESTAMP");
        values.push(Box::new(id));
        values.push(Box::new(user_id));

        let sql = format!(
            "UPDATE expenses SET {} WHERE id = ? AND user_id = ?",
            updates.join(", ")
        );
        let params_refs: Vec<&dyn rusqlite::ToSql> = values.iter().map(|p| p.as_ref()).collect();
        let affected = conn.execute(&sql, params_refs.as_slice())?;

        Ok(affected > 0)
    }

    /// Hard-delete an expense scoped to its owner; returns false when absent
    pub fn delete_expense(&self, id: i64, user_id: i64) -> Result<bool> {
        let conn = self.conn()?;
        let affected = conn.execute(
            "DELETE FROM expenses WHERE id = ? AND user_id = ?",
            params![id, user_id],
        )?;
        Ok(affected > 0)
    }

    /// Count all expenses across users
    pub fn count_all_expenses(&self) -> Result<i64> {
        let conn = self.conn()?;
        let count: i64 = conn.query_row("SELECT COUNT(*) FROM expenses", [], |row| row.get(0))?;
        Ok(count)
    }

    fn row_to_expense(row: &Row) -> rusqlite::Result<Expense> {
        let amount_cents: i64 = row.get(2)?;
        let date_str: String = row.get(7)?;
        let tags_json: Option<String> = row.get(11)?;
        let is_ai: i64 = row.get(13)?;
        let created_at_str: String = row.get(15)?;
        let updated_at_str: String = row.get(16)?;

        // Joined category columns are all NULL when no category is set
        let category = match row.get::<_, Option<i64>>(17)? {
            Some(category_id) => {
                let is_system: i64 = row.get(22)?;
                Some(Category {
                    id: category_id,
                    name: row.get(18)?,
                    description: row.get(19)?,
                    icon: row.get(20)?,
                    color: row.get(21)?,
                    is_system_category: is_system != 0,
                    parent_category_id: row.get(23)?,
                })
            }
            None => None,
        };

        let tags: Vec<String> = tags_json
            .as_deref()
            .map(|s| serde_json::from_str(s).unwrap_or_default())
            .unwrap_or_default();

        Ok(Expense {
            id: row.get(0)?,
            user_id: row.get(1)?,
            amount: Money::from_cents(amount_cents),
            currency: row.get(3)?,
            description: row.get(4)?,
            category,
            category_id: row.get(5)?,
            subcategory_id: row.get(6)?,
            transaction_date: NaiveDate::parse_from_str(&date_str, "%Y-%m-%d").unwrap_or_default(),
            payment_method: row.get(8)?,
            vendor_name: row.get(9)?,
            location: row.get(10)?,
            tags,
            notes: row.get(12)?,
            is_ai_categorized: is_ai != 0,
            confidence_score: row.get(14)?,
            created_at: parse_datetime(&created_at_str),
            updated_at: parse_datetime(&updated_at_str),
        })
    }
}
