//! Expense filter builder for constructing dynamic SQL queries
//!
//! The list endpoint and its pagination count must agree on which rows
//! match, so both are built from the same filter. Conditions combine
//! with AND; the user scope is always present.

use chrono::NaiveDate;

/// Builder for expense query filters
///
/// The lifetime `'query` represents how long the search string must
/// remain valid.
#[derive(Debug, Clone)]
pub struct ExpenseFilter<'query> {
    pub user_id: i64,
    /// Inclusive lower bound on transaction_date
    pub start_date: Option<NaiveDate>,
    /// Inclusive upper bound on transaction_date
    pub end_date: Option<NaiveDate>,
    /// Exact category match
    pub category_id: Option<i64>,
    /// Substring match on description or vendor name
    pub search: Option<&'query str>,
}

/// Result of building a filter - contains SQL components and parameters
pub struct FilterResult {
    /// WHERE clause including the "WHERE" keyword
    pub where_clause: String,
    /// Parameters for the query (boxed for rusqlite compatibility)
    pub params: Vec<Box<dyn rusqlite::ToSql>>,
}

impl<'query> ExpenseFilter<'query> {
    /// Create a filter scoped to a user
    pub fn new(user_id: i64) -> Self {
        Self {
            user_id,
            start_date: None,
            end_date: None,
            category_id: None,
            search: None,
        }
    }

    /// Set the inclusive date range (either bound may be open)
    pub fn date_range(mut self, start: Option<NaiveDate>, end: Option<NaiveDate>) -> Self {
        self.start_date = start;
        self.end_date = end;
        self
    }

    /// Set category filter
    pub fn category_id(mut self, category_id: Option<i64>) -> Self {
        self.category_id = category_id;
        self
    }

    /// Set search query
    pub fn search(mut self, query: Option<&'query str>) -> Self {
        self.search = query;
        self
    }

    /// Build the WHERE clause and its parameters
    pub fn build(self) -> FilterResult {
        let mut conditions = vec!["e.user_id = ?".to_string()];
        let mut params: Vec<Box<dyn rusqlite::ToSql>> = vec![Box::new(self.user_id)];

        if let Some(start) = self.start_date {
            conditions.push("e.transaction_date >= ?".to_string());
            params.push(Box::new(start.to_string()));
        }

        if let Some(end) = self.end_date {
            conditions.push("e.transaction_date <= ?".to_string());
            params.push(Box::new(end.to_string()));
        }

        if let Some(category_id) = self.category_id {
            conditions.push("e.category_id = ?".to_string());
            params.push(Box::new(category_id));
        }

        if let Some(query) = self.search {
            if !query.trim().is_empty() {
                // A NULL vendor_name never matches, which is what we want
                conditions.push("(e.description LIKE ? OR e.vendor_name LIKE ?)".to_string());
                let pattern = format!("%{}%", query.trim());
                params.push(Box::new(pattern.clone()));
                params.push(Box::new(pattern));
            }
        }

        FilterResult {
            where_clause: format!("WHERE {}", conditions.join(" AND ")),
            params,
        }
    }
}

impl FilterResult {
    /// Build a COUNT query over the same filter
    pub fn build_count_query(&self) -> String {
        format!("SELECT COUNT(*) FROM expenses e {}", self.where_clause)
    }

    /// Get parameter references for query execution
    pub fn params_refs(&self) -> Vec<&dyn rusqlite::ToSql> {
        self.params.iter().map(|p| p.as_ref()).collect()
    }

    /// Consume the result, returning the boxed parameters
    /// (callers append LIMIT/OFFSET values before executing)
    pub fn into_params(self) -> Vec<Box<dyn rusqlite::ToSql>> {
        self.params
    }
}
