//! User account operations

use rusqlite::{params, OptionalExtension, Row};

use super::{parse_datetime, Database};
use crate::error::Result;
use crate::models::User;

const USER_COLUMNS: &str = "id, email, password_hash, first_name, last_name, phone, \
                            currency, timezone, is_active, email_verified, created_at";

impl Database {
    /// Create a user account, returning the new id
    ///
    /// The password must already be hashed; this layer never sees
    /// plaintext credentials.
    pub fn create_user(
        &self,
        email: &str,
        password_hash: &str,
        first_name: &str,
        last_name: &str,
        phone: Option<&str>,
    ) -> Result<i64> {
        let conn = self.conn()?;
        conn.execute(
            r#"
            INSERT INTO users (email, password_hash, first_name, last_name, phone)
            VALUES (?, ?, ?, ?, ?)
            "#,
            params![email, password_hash, first_name, last_name, phone],
        )?;
        Ok(conn.last_insert_rowid())
    }

    /// Get a user by id
    pub fn get_user(&self, id: i64) -> Result<Option<User>> {
        let conn = self.conn()?;
        let user = conn
            .query_row(
                &format!("SELECT {} FROM users WHERE id = ?", USER_COLUMNS),
                params![id],
                Self::row_to_user,
            )
            .optional()?;
        Ok(user)
    }

    /// Get a user by email (exact match)
    pub fn get_user_by_email(&self, email: &str) -> Result<Option<User>> {
        let conn = self.conn()?;
        let user = conn
            .query_row(
                &format!("SELECT {} FROM users WHERE email = ?", USER_COLUMNS),
                params![email],
                Self::row_to_user,
            )
            .optional()?;
        Ok(user)
    }

    /// Count all users
    pub fn count_users(&self) -> Result<i64> {
        let conn = self.conn()?;
        let count: i64 = conn.query_row("SELECT COUNT(*) FROM users", [], |row| row.get(0))?;
        Ok(count)
    }

    fn row_to_user(row: &Row) -> rusqlite::Result<User> {
        let is_active: i64 = row.get(8)?;
        let email_verified: i64 = row.get(9)?;
        let created_at_str: String = row.get(10)?;

        Ok(User {
            id: row.get(0)?,
            email: row.get(1)?,
            password_hash: row.get(2)?,
            first_name: row.get(3)?,
            last_name: row.get(4)?,
            phone: row.get(5)?,
            currency: row.get(6)?,
            timezone: row.get(7)?,
            is_active: is_active != 0,
            email_verified: email_verified != 0,
            created_at: parse_datetime(&created_at_str),
        })
    }
}
