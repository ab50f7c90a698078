use std::fmt;
use std::str::FromStr;

use chrono::{NaiveDate, NaiveDateTime};
use rusqlite::types::{FromSql, FromSqlError, FromSqlResult, ToSql, ToSqlOutput, ValueRef};
use serde::{Deserialize, Serialize};

/// Storage format for transaction timestamps (minute precision).
pub const DATETIME_FORMAT: &str = "%Y-%m-%dT%H:%M";

#[derive(Debug, Clone, Copy, PartialEq, Eq, clap::ValueEnum)]
pub enum Kind {
    Income,
    Expense,
}

impl Kind {
    pub fn as_str(self) -> &'static str {
        match self {
            Kind::Income => "income",
            Kind::Expense => "expense",
        }
    }
}

impl fmt::Display for Kind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Kind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "income" => Ok(Kind::Income),
            "expense" => Ok(Kind::Expense),
            other => Err(format!("unknown kind: {other}")),
        }
    }
}

impl ToSql for Kind {
    fn to_sql(&self) -> rusqlite::Result<ToSqlOutput<'_>> {
        Ok(self.as_str().into())
    }
}

impl FromSql for Kind {
    fn column_result(value: ValueRef<'_>) -> FromSqlResult<Self> {
        value
            .as_str()?
            .parse()
            .map_err(|_| FromSqlError::InvalidType)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Currency {
    #[default]
    Ars,
    Usd,
}

impl Currency {
    pub fn as_str(self) -> &'static str {
        match self {
            Currency::Ars => "ARS",
            Currency::Usd => "USD",
        }
    }
}

impl ToSql for Currency {
    fn to_sql(&self) -> rusqlite::Result<ToSqlOutput<'_>> {
        Ok(self.as_str().into())
    }
}

impl FromSql for Currency {
    // A missing currency means pesos.
    fn column_result(value: ValueRef<'_>) -> FromSqlResult<Self> {
        match value {
            ValueRef::Null => Ok(Currency::Ars),
            other => match other.as_str()? {
                "ARS" | "" => Ok(Currency::Ars),
                "USD" => Ok(Currency::Usd),
                _ => Err(FromSqlError::InvalidType),
            },
        }
    }
}

/// Which space(s) a summary covers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, clap::ValueEnum)]
pub enum ViewMode {
    #[default]
    Personal,
    Shared,
    Combined,
}

impl ViewMode {
    pub fn label(self) -> &'static str {
        match self {
            ViewMode::Personal => "My Wallet",
            ViewMode::Shared => "Shared",
            ViewMode::Combined => "Total",
        }
    }

    /// Cycle order used by the dashboard's Tab key.
    pub fn next(self) -> Self {
        match self {
            ViewMode::Personal => ViewMode::Shared,
            ViewMode::Shared => ViewMode::Combined,
            ViewMode::Combined => ViewMode::Personal,
        }
    }
}

/// How much of an installment purchase is credited to the savings goal it funds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "snake_case")]
pub enum GoalAccrual {
    /// Only the first installment's share.
    #[default]
    FirstInstallment,
    /// The whole purchase amount.
    FullTotal,
}

impl GoalAccrual {
    pub fn as_str(self) -> &'static str {
        match self {
            GoalAccrual::FirstInstallment => "first-installment",
            GoalAccrual::FullTotal => "full-total",
        }
    }
}

#[derive(Debug, Clone)]
pub struct Transaction {
    pub id: i64,
    pub description: String,
    pub amount: f64,
    pub kind: Kind,
    pub currency: Currency,
    pub occurred_at: NaiveDateTime,
    pub owner_user_id: Option<i64>,
    pub category_id: Option<i64>,
    pub payment_method_id: Option<i64>,
    pub space_id: i64,
    pub savings_goal_id: Option<i64>,
}

/// Insert payload for the transactions table.
#[derive(Debug, Clone, PartialEq)]
pub struct NewTransaction {
    pub description: String,
    pub amount: f64,
    pub kind: Kind,
    pub currency: Currency,
    pub occurred_at: NaiveDateTime,
    pub owner_user_id: i64,
    pub category_id: Option<i64>,
    pub payment_method_id: Option<i64>,
    pub space_id: i64,
    pub savings_goal_id: Option<i64>,
}

#[derive(Debug, Clone)]
pub struct Space {
    pub id: i64,
    pub name: String,
    pub invite_code: Option<String>,
    pub usd_balance: f64,
}

#[derive(Debug, Clone)]
pub struct Category {
    pub id: i64,
    pub name: String,
    pub kind: Kind,
    pub space_id: i64,
}

#[derive(Debug, Clone)]
pub struct PaymentMethod {
    pub id: i64,
    pub name: String,
    pub is_credit: bool,
    pub space_id: i64,
}

#[derive(Debug, Clone)]
pub struct SavingsGoal {
    pub id: i64,
    pub name: String,
    pub target_amount: f64,
    pub current_amount: f64,
    pub deadline: NaiveDate,
    pub space_id: i64,
}

#[derive(Debug, Clone)]
pub struct Profile {
    pub user_id: i64,
    pub display_name: String,
    pub personal_space_id: Option<i64>,
    pub shared_space_id: Option<i64>,
}

#[derive(Debug, Clone)]
pub struct User {
    pub id: i64,
    pub email: String,
    pub display_name: String,
}
