//! The ledger model: loading a user's transactions, scoping them to a view,
//! a bounded month cursor, and the monthly aggregation behind every summary.

use chrono::{Datelike, NaiveDate, NaiveDateTime};
use rusqlite::Connection;

use crate::error::{EconomiaError, Result};
use crate::models::{Currency, Kind, Profile, Transaction, ViewMode, DATETIME_FORMAT};

/// Bucket name for expenses without a category.
pub const UNCATEGORIZED_LABEL: &str = "Other";

pub const MONTH_NAMES: &[&str] = &[
    "January", "February", "March", "April", "May", "June", "July", "August", "September",
    "October", "November", "December",
];

/// A transaction joined with the display names the views need.
#[derive(Debug, Clone)]
pub struct LedgerEntry {
    pub txn: Transaction,
    pub category: Option<String>,
    pub author: Option<String>,
    pub payment_method: Option<String>,
}

impl LedgerEntry {
    /// Pesos, or no currency at all.
    pub fn is_ars(&self) -> bool {
        self.txn.currency == Currency::Ars
    }
}

// ---------------------------------------------------------------------------
// Loading
// ---------------------------------------------------------------------------

/// Load the newest `limit` transactions across the profile's personal and
/// shared spaces, newest first.
pub fn load_ledger(conn: &Connection, profile: &Profile, limit: usize) -> Result<Vec<LedgerEntry>> {
    let spaces: Vec<i64> = profile
        .personal_space_id
        .into_iter()
        .chain(profile.shared_space_id)
        .collect();
    if spaces.is_empty() {
        return Ok(Vec::new());
    }

    let sql = "SELECT t.id, t.description, t.amount, t.kind, t.currency, t.occurred_at, \
               t.owner_user_id, t.category_id, t.payment_method_id, t.space_id, t.savings_goal_id, \
               c.name, p.display_name, m.name \
               FROM transactions t \
               LEFT JOIN categories c ON t.category_id = c.id \
               LEFT JOIN profiles p ON t.owner_user_id = p.user_id \
               LEFT JOIN payment_methods m ON t.payment_method_id = m.id \
               WHERE t.space_id IN (?1, ?2) \
               ORDER BY t.occurred_at DESC, t.id DESC LIMIT ?3";
    let mut stmt = conn.prepare(sql)?;
    let rows = stmt
        .query_map(
            rusqlite::params![spaces[0], spaces.get(1).copied().unwrap_or(spaces[0]), limit as i64],
            |row| {
                let raw_date: String = row.get(5)?;
                let occurred_at = NaiveDateTime::parse_from_str(&raw_date, DATETIME_FORMAT)
                    .map_err(|e| {
                        rusqlite::Error::FromSqlConversionFailure(
                            5,
                            rusqlite::types::Type::Text,
                            Box::new(e),
                        )
                    })?;
                Ok(LedgerEntry {
                    txn: Transaction {
                        id: row.get(0)?,
                        description: row.get(1)?,
                        amount: row.get(2)?,
                        kind: row.get(3)?,
                        currency: row.get(4)?,
                        occurred_at,
                        owner_user_id: row.get(6)?,
                        category_id: row.get(7)?,
                        payment_method_id: row.get(8)?,
                        space_id: row.get(9)?,
                        savings_goal_id: row.get(10)?,
                    },
                    category: row.get(11)?,
                    author: row.get(12)?,
                    payment_method: row.get(13)?,
                })
            },
        )?
        .collect::<std::result::Result<Vec<_>, _>>()?;
    tracing::debug!(count = rows.len(), limit, "ledger loaded");
    Ok(rows)
}

// ---------------------------------------------------------------------------
// View scoping
// ---------------------------------------------------------------------------

/// The space a view is restricted to, or `None` for the combined view.
pub fn view_space(view: ViewMode, profile: &Profile) -> Result<Option<i64>> {
    match view {
        ViewMode::Personal => profile
            .personal_space_id
            .map(Some)
            .ok_or(EconomiaError::NotSignedIn),
        ViewMode::Shared => profile
            .shared_space_id
            .map(Some)
            .ok_or(EconomiaError::NoSharedSpace),
        ViewMode::Combined => Ok(None),
    }
}

/// The single space new rows go to for a view. The combined view cannot be written to.
pub fn target_space(view: ViewMode, profile: &Profile) -> Result<i64> {
    view_space(view, profile)?.ok_or(EconomiaError::CombinedViewReadOnly)
}

/// Rows visible in a view. The ledger only ever holds the user's own spaces,
/// so the combined view keeps everything.
pub fn scope<'a>(
    ledger: &'a [LedgerEntry],
    view: ViewMode,
    profile: &Profile,
) -> Result<Vec<&'a LedgerEntry>> {
    let space = view_space(view, profile)?;
    Ok(ledger
        .iter()
        .filter(|e| space.map_or(true, |id| e.txn.space_id == id))
        .collect())
}

// ---------------------------------------------------------------------------
// Month cursor
// ---------------------------------------------------------------------------

/// A (year, month) cursor that can move freely into the past but never past
/// the current calendar month.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub struct MonthCursor {
    year: i32,
    month: u32, // 1-12
}

impl MonthCursor {
    pub fn current(today: NaiveDate) -> Self {
        Self {
            year: today.year(),
            month: today.month(),
        }
    }

    /// Parse `YYYY-MM`. Months after `today`'s are rejected.
    pub fn parse(value: &str, today: NaiveDate) -> Result<Self> {
        let invalid = || EconomiaError::InvalidMonth(format!("{value} (expected YYYY-MM)"));
        let (y, m) = value.trim().split_once('-').ok_or_else(invalid)?;
        let year: i32 = y.parse().map_err(|_| invalid())?;
        let month: u32 = m.parse().map_err(|_| invalid())?;
        if !(1..=12).contains(&month) {
            return Err(invalid());
        }
        let cursor = Self { year, month };
        if cursor > Self::current(today) {
            return Err(EconomiaError::InvalidMonth(format!("{value} is in the future")));
        }
        Ok(cursor)
    }

    pub fn prev(&mut self) {
        if self.month == 1 {
            self.month = 12;
            self.year -= 1;
        } else {
            self.month -= 1;
        }
    }

    /// Move forward one month. Returns false (and stays put) when that would
    /// pass the current month.
    pub fn next(&mut self, today: NaiveDate) -> bool {
        let mut candidate = *self;
        if candidate.month == 12 {
            candidate.month = 1;
            candidate.year += 1;
        } else {
            candidate.month += 1;
        }
        if candidate > Self::current(today) {
            return false;
        }
        *self = candidate;
        true
    }

    pub fn is_current(&self, today: NaiveDate) -> bool {
        *self == Self::current(today)
    }

    pub fn contains(&self, at: NaiveDateTime) -> bool {
        at.year() == self.year && at.month() == self.month
    }

    pub fn month_name(&self) -> &'static str {
        MONTH_NAMES[(self.month - 1) as usize]
    }

    pub fn label(&self) -> String {
        format!("{} {}", self.month_name(), self.year)
    }

    /// `YYYY-MM`, the form `parse` accepts.
    pub fn key(&self) -> String {
        format!("{:04}-{:02}", self.year, self.month)
    }
}

// ---------------------------------------------------------------------------
// Aggregation
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Summary {
    /// All-time ARS balance of the view.
    pub balance: f64,
    pub month_income: f64,
    pub month_expenses: f64,
}

impl Summary {
    pub fn month_net(&self) -> f64 {
        self.month_income - self.month_expenses
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct CategoryTotal {
    pub name: String,
    pub total: f64,
}

fn ars_total<'a>(entries: impl Iterator<Item = &'a &'a LedgerEntry>, kind: Kind) -> f64 {
    entries
        .filter(|e| e.txn.kind == kind && e.is_ars())
        .map(|e| e.txn.amount)
        .sum()
}

pub fn summarize(scoped: &[&LedgerEntry], cursor: &MonthCursor) -> Summary {
    let income = ars_total(scoped.iter(), Kind::Income);
    let expenses = ars_total(scoped.iter(), Kind::Expense);
    let in_month = || scoped.iter().filter(|e| cursor.contains(e.txn.occurred_at));
    Summary {
        balance: income - expenses,
        month_income: ars_total(in_month(), Kind::Income),
        month_expenses: ars_total(in_month(), Kind::Expense),
    }
}

/// Scoped rows that fall in the cursor month, in ledger order.
pub fn month_entries<'a>(scoped: &[&'a LedgerEntry], cursor: &MonthCursor) -> Vec<&'a LedgerEntry> {
    scoped
        .iter()
        .copied()
        .filter(|e| cursor.contains(e.txn.occurred_at))
        .collect()
}

/// ARS expenses of a month grouped by category name, largest first. Ties keep
/// the order in which categories were first seen. Empty when there is nothing
/// to chart.
pub fn category_breakdown(month: &[&LedgerEntry]) -> Vec<CategoryTotal> {
    let mut buckets: Vec<CategoryTotal> = Vec::new();
    for entry in month
        .iter()
        .filter(|e| e.txn.kind == Kind::Expense && e.is_ars())
    {
        let name = entry.category.as_deref().unwrap_or(UNCATEGORIZED_LABEL);
        match buckets.iter_mut().find(|b| b.name == name) {
            Some(bucket) => bucket.total += entry.txn.amount,
            None => buckets.push(CategoryTotal {
                name: name.to_string(),
                total: entry.txn.amount,
            }),
        }
    }
    buckets.sort_by(|a, b| b.total.total_cmp(&a.total));
    buckets
}
