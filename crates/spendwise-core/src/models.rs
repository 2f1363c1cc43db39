//! Domain models for SpendWise

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

/// A monetary amount stored as integer cents
///
/// Amounts cross the wire as decimal numbers in major units (`12.34`) but
/// are stored and summed as cents, so totals never drift.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Default)]
pub struct Money(i64);

impl Money {
    pub const ZERO: Money = Money(0);

    pub fn from_cents(cents: i64) -> Self {
        Money(cents)
    }

    /// Convert from major units, rounding to the nearest cent
    pub fn from_major(value: f64) -> Self {
        Money((value * 100.0).round() as i64)
    }

    pub fn cents(&self) -> i64 {
        self.0
    }

    pub fn to_major(&self) -> f64 {
        self.0 as f64 / 100.0
    }

    pub fn is_zero(&self) -> bool {
        self.0 == 0
    }
}

impl std::ops::Add for Money {
    type Output = Money;

    fn add(self, rhs: Money) -> Money {
        Money(self.0 + rhs.0)
    }
}

impl std::iter::Sum for Money {
    fn sum<I: Iterator<Item = Money>>(iter: I) -> Money {
        iter.fold(Money::ZERO, |acc, m| acc + m)
    }
}

impl std::fmt::Display for Money {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let sign = if self.0 < 0 { "-" } else { "" };
        let abs = self.0.unsigned_abs();
        write!(f, "{}{}.{:02}", sign, abs / 100, abs % 100)
    }
}

impl Serialize for Money {
    fn serialize<S>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        serializer.serialize_f64(self.to_major())
    }
}

impl<'de> Deserialize<'de> for Money {
    fn deserialize<D>(deserializer: D) -> std::result::Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        struct MoneyVisitor;

        impl serde::de::Visitor<'_> for MoneyVisitor {
            type Value = Money;

            fn expecting(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
                f.write_str("a monetary amount as a decimal number")
            }

            fn visit_f64<E: serde::de::Error>(self, v: f64) -> std::result::Result<Money, E> {
                Ok(Money::from_major(v))
            }

            fn visit_i64<E: serde::de::Error>(self, v: i64) -> std::result::Result<Money, E> {
                v.checked_mul(100)
                    .map(Money)
                    .ok_or_else(|| E::custom("amount out of range"))
            }

            fn visit_u64<E: serde::de::Error>(self, v: u64) -> std::result::Result<Money, E> {
                i64::try_from(v)
                    .ok()
                    .and_then(|v| v.checked_mul(100))
                    .map(Money)
                    .ok_or_else(|| E::custom("amount out of range"))
            }
        }

        deserializer.deserialize_any(MoneyVisitor)
    }
}

/// A registered user
///
/// Credential and account-state columns never leave the server; only the
/// profile fields serialize.
#[derive(Debug, Clone, Serialize)]
pub struct User {
    pub id: i64,
    pub email: String,
    #[serde(skip_serializing)]
    pub password_hash: String,
    pub first_name: String,
    pub last_name: String,
    pub phone: Option<String>,
    /// ISO 4217 currency code, e.g. "USD"
    pub currency: String,
    pub timezone: String,
    #[serde(skip_serializing)]
    pub is_active: bool,
    #[serde(skip_serializing)]
    pub email_verified: bool,
    pub created_at: DateTime<Utc>,
}

/// An expense category
///
/// Categories form a flat arena with optional parent links; system
/// categories are seeded with fixed ids the categorizer relies on.
#[derive(Debug, Clone, Serialize)]
pub struct Category {
    pub id: i64,
    pub name: String,
    pub description: Option<String>,
    pub icon: Option<String>,
    pub color: Option<String>,
    pub is_system_category: bool,
    pub parent_category_id: Option<i64>,
}

/// A recorded expense
#[derive(Debug, Clone, Serialize)]
pub struct Expense {
    pub id: i64,
    #[serde(skip_serializing)]
    pub user_id: i64,
    pub amount: Money,
    pub currency: String,
    pub description: String,
    /// Joined category row; the raw id only appears nested here
    pub category: Option<Category>,
    #[serde(skip_serializing)]
    pub category_id: Option<i64>,
    #[serde(skip_serializing)]
    pub subcategory_id: Option<i64>,
    pub transaction_date: NaiveDate,
    pub payment_method: Option<String>,
    pub vendor_name: Option<String>,
    pub location: Option<String>,
    pub tags: Vec<String>,
    pub notes: Option<String>,
    /// True when the category came from the categorizer, not the user
    pub is_ai_categorized: bool,
    pub confidence_score: Option<f64>,
    pub created_at: DateTime<Utc>,
    #[serde(skip_serializing)]
    pub updated_at: DateTime<Utc>,
}

/// A new expense to be inserted
#[derive(Debug, Clone, Default)]
pub struct NewExpense {
    pub amount: Money,
    pub currency: Option<String>,
    pub description: String,
    pub category_id: Option<i64>,
    pub subcategory_id: Option<i64>,
    pub transaction_date: NaiveDate,
    pub payment_method: Option<String>,
    pub vendor_name: Option<String>,
    pub location: Option<String>,
    pub tags: Vec<String>,
    pub notes: Option<String>,
    pub is_ai_categorized: bool,
    pub confidence_score: Option<f64>,
}

/// Partial update for an expense
///
/// `None` leaves a field unchanged. For nullable columns the inner option
/// distinguishes setting a value from clearing it: `Some(None)` writes NULL.
#[derive(Debug, Clone, Default)]
pub struct ExpenseUpdate {
    pub amount: Option<Money>,
    pub currency: Option<String>,
    pub description: Option<String>,
    pub category_id: Option<Option<i64>>,
    pub subcategory_id: Option<Option<i64>>,
    pub transaction_date: Option<NaiveDate>,
    pub payment_method: Option<Option<String>>,
    pub vendor_name: Option<Option<String>>,
    pub location: Option<Option<String>>,
    pub tags: Option<Vec<String>>,
    pub notes: Option<Option<String>>,
}

/// Budget recurrence period
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum BudgetPeriod {
    Weekly,
    #[default]
    Monthly,
    Yearly,
}

impl BudgetPeriod {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Weekly => "weekly",
            Self::Monthly => "monthly",
            Self::Yearly => "yearly",
        }
    }
}

impl std::str::FromStr for BudgetPeriod {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "weekly" => Ok(Self::Weekly),
            "monthly" => Ok(Self::Monthly),
            "yearly" => Ok(Self::Yearly),
            _ => Err(format!("Unknown budget period: {}", s)),
        }
    }
}

impl std::fmt::Display for BudgetPeriod {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// A spending budget
#[derive(Debug, Clone, Serialize)]
pub struct Budget {
    pub id: i64,
    #[serde(skip_serializing)]
    pub user_id: i64,
    pub name: String,
    pub amount: Money,
    pub period: BudgetPeriod,
    pub start_date: NaiveDate,
    pub end_date: Option<NaiveDate>,
    pub is_active: bool,
    /// Fraction of the budget (0.0-1.0) at which alerts should fire
    pub alert_threshold: f64,
    pub category: Option<Category>,
    #[serde(skip_serializing)]
    pub category_id: Option<i64>,
}

/// A new budget to be inserted
#[derive(Debug, Clone)]
pub struct NewBudget {
    pub name: String,
    pub amount: Money,
    pub period: BudgetPeriod,
    pub start_date: NaiveDate,
    pub end_date: Option<NaiveDate>,
    pub category_id: Option<i64>,
    pub alert_threshold: f64,
}

/// Partial update for a budget
#[derive(Debug, Clone, Default)]
pub struct BudgetUpdate {
    pub name: Option<String>,
    pub amount: Option<Money>,
    pub period: Option<BudgetPeriod>,
    pub start_date: Option<NaiveDate>,
    pub end_date: Option<Option<NaiveDate>>,
    pub category_id: Option<Option<i64>>,
    pub is_active: Option<bool>,
    pub alert_threshold: Option<f64>,
}

/// Savings goal priority
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum GoalPriority {
    Low,
    #[default]
    Medium,
    High,
}

impl GoalPriority {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Low => "low",
            Self::Medium => "medium",
            Self::High => "high",
        }
    }
}

impl std::str::FromStr for GoalPriority {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "low" => Ok(Self::Low),
            "medium" => Ok(Self::Medium),
            "high" => Ok(Self::High),
            _ => Err(format!("Unknown priority: {}", s)),
        }
    }
}

impl std::fmt::Display for GoalPriority {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// A savings goal
#[derive(Debug, Clone, Serialize)]
pub struct Goal {
    pub id: i64,
    #[serde(skip_serializing)]
    pub user_id: i64,
    pub title: String,
    pub description: Option<String>,
    pub target_amount: Money,
    pub current_amount: Money,
    /// Derived: current/target as a percentage, rounded to one decimal.
    /// 0.0 when the target is zero or negative.
    pub progress_percentage: f64,
    pub target_date: Option<NaiveDate>,
    /// Free-text label, not a Category reference
    pub category: Option<String>,
    pub priority: GoalPriority,
    pub is_completed: bool,
}

/// A new goal to be inserted
#[derive(Debug, Clone)]
pub struct NewGoal {
    pub title: String,
    pub description: Option<String>,
    pub target_amount: Money,
    pub current_amount: Money,
    pub target_date: Option<NaiveDate>,
    pub category: Option<String>,
    pub priority: GoalPriority,
}

/// Partial update for a goal
#[derive(Debug, Clone, Default)]
pub struct GoalUpdate {
    pub title: Option<String>,
    pub description: Option<Option<String>>,
    pub target_amount: Option<Money>,
    pub current_amount: Option<Money>,
    pub target_date: Option<Option<NaiveDate>>,
    pub category: Option<Option<String>>,
    pub priority: Option<GoalPriority>,
    pub is_completed: Option<bool>,
}

/// Category suggestion produced by the keyword categorizer
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct CategorySuggestion {
    pub category_id: i64,
    pub confidence: f64,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_money_from_major_rounds_to_cents() {
        assert_eq!(Money::from_major(12.34).cents(), 1234);
        assert_eq!(Money::from_major(19.99).cents(), 1999);
        assert_eq!(Money::from_major(0.005).cents(), 1);
        assert_eq!(Money::from_major(-4.50).cents(), -450);
    }

    #[test]
    fn test_money_display() {
        assert_eq!(Money::from_cents(1234).to_string(), "12.34");
        assert_eq!(Money::from_cents(5).to_string(), "0.05");
        assert_eq!(Money::from_cents(-450).to_string(), "-4.50");
        assert_eq!(Money::ZERO.to_string(), "0.00");
    }

    #[test]
    fn test_money_serializes_as_major_units() {
        let json = serde_json::to_string(&Money::from_cents(1234)).unwrap();
        assert_eq!(json, "12.34");

        let json = serde_json::to_string(&Money::ZERO).unwrap();
        assert_eq!(json, "0.0");
    }

    #[test]
    fn test_money_deserializes_from_float_and_int() {
        let m: Money = serde_json::from_str("12.34").unwrap();
        assert_eq!(m.cents(), 1234);

        let m: Money = serde_json::from_str("12").unwrap();
        assert_eq!(m.cents(), 1200);

        let m: Money = serde_json::from_str("-3.5").unwrap();
        assert_eq!(m.cents(), -350);
    }

    #[test]
    fn test_money_sum() {
        let total: Money = [150, 250, 99].into_iter().map(Money::from_cents).sum();
        assert_eq!(total.cents(), 499);
    }

    #[test]
    fn test_budget_period_round_trip() {
        for period in [
            BudgetPeriod::Weekly,
            BudgetPeriod::Monthly,
            BudgetPeriod::Yearly,
        ] {
            let parsed: BudgetPeriod = period.as_str().parse().unwrap();
            assert_eq!(parsed, period);
        }
        assert!("daily".parse::<BudgetPeriod>().is_err());
    }

    #[test]
    fn test_goal_priority_round_trip() {
        for priority in [GoalPriority::Low, GoalPriority::Medium, GoalPriority::High] {
            let parsed: GoalPriority = priority.as_str().parse().unwrap();
            assert_eq!(parsed, priority);
        }
        assert!("urgent".parse::<GoalPriority>().is_err());
        assert_eq!(GoalPriority::default(), GoalPriority::Medium);
    }

    #[test]
    fn test_user_serialization_hides_credentials() {
        let user = User {
            id: 1,
            email: "test@example.com".to_string(),
            password_hash: "secret-hash".to_string(),
            first_name: "Test".to_string(),
            last_name: "User".to_string(),
            phone: None,
            currency: "USD".to_string(),
            timezone: "UTC".to_string(),
            is_active: true,
            email_verified: false,
            created_at: Utc::now(),
        };

        let json = serde_json::to_value(&user).unwrap();
        assert_eq!(json["email"], "test@example.com");
        assert!(json.get("password_hash").is_none());
        assert!(json.get("is_active").is_none());
    }
}
