//! Immutable view state shared by the plain summary and the dashboard.
//!
//! A [`LedgerSource`] is loaded once per command. Every change of view or month
//! produces a fresh [`DashboardSnapshot`] from it; nothing renders from
//! mutable state.

use chrono::NaiveDate;
use rusqlite::Connection;

use crate::error::{EconomiaError, Result};
use crate::ledger::{
    category_breakdown, load_ledger, month_entries, scope, summarize, CategoryTotal, LedgerEntry,
    MonthCursor, Summary,
};
use crate::models::{Profile, ViewMode};
use crate::spaces::{get_space, shared_space_info, SharedSpaceInfo};

/// Everything loaded from the store for one signed-in user.
pub struct LedgerSource {
    pub profile: Profile,
    pub ledger: Vec<LedgerEntry>,
    pub personal_usd: f64,
    pub shared_usd: f64,
    pub shared: Option<SharedSpaceInfo>,
}

impl LedgerSource {
    pub fn load(conn: &Connection, profile: Profile, limit: usize) -> Result<Self> {
        let ledger = load_ledger(conn, &profile, limit)?;
        let usd_of = |space: Option<i64>| -> Result<f64> {
            match space {
                Some(id) => Ok(get_space(conn, id)?.usd_balance),
                None => Ok(0.0),
            }
        };
        let personal_usd = usd_of(profile.personal_space_id)?;
        let shared_usd = usd_of(profile.shared_space_id)?;
        let shared = match profile.shared_space_id {
            Some(id) => Some(shared_space_info(conn, id)?),
            None => None,
        };
        Ok(Self {
            profile,
            ledger,
            personal_usd,
            shared_usd,
            shared,
        })
    }

    pub fn usd_balance(&self, view: ViewMode) -> f64 {
        match view {
            ViewMode::Personal => self.personal_usd,
            ViewMode::Shared => self.shared_usd,
            ViewMode::Combined => self.personal_usd + self.shared_usd,
        }
    }

    pub fn snapshot(&self, view: ViewMode, cursor: MonthCursor, today: NaiveDate) -> Result<DashboardSnapshot> {
        let scoped = scope(&self.ledger, view, &self.profile)?;
        let month = month_entries(&scoped, &cursor);
        Ok(DashboardSnapshot {
            view,
            cursor,
            is_current_month: cursor.is_current(today),
            user_name: self.profile.display_name.clone(),
            summary: summarize(&scoped, &cursor),
            breakdown: category_breakdown(&month),
            register: month.into_iter().cloned().collect(),
            usd_balance: self.usd_balance(view),
            shared: self.shared.clone(),
        })
    }

    /// Like [`snapshot`](Self::snapshot), but a shared view without a shared
    /// space falls back to the personal view and reports why.
    pub fn snapshot_or_personal(
        &self,
        view: ViewMode,
        cursor: MonthCursor,
        today: NaiveDate,
    ) -> Result<(DashboardSnapshot, Option<EconomiaError>)> {
        match self.snapshot(view, cursor, today) {
            Err(EconomiaError::NoSharedSpace) => Ok((
                self.snapshot(ViewMode::Personal, cursor, today)?,
                Some(EconomiaError::NoSharedSpace),
            )),
            other => other.map(|s| (s, None)),
        }
    }
}

#[derive(Debug, Clone)]
pub struct DashboardSnapshot {
    pub view: ViewMode,
    pub cursor: MonthCursor,
    pub is_current_month: bool,
    pub user_name: String,
    pub summary: Summary,
    pub breakdown: Vec<CategoryTotal>,
    /// The month's rows in this view, newest first.
    pub register: Vec<LedgerEntry>,
    pub usd_balance: f64,
    pub shared: Option<SharedSpaceInfo>,
}

impl DashboardSnapshot {
    /// Share of the month's expenses per category, as whole percentages.
    pub fn breakdown_shares(&self) -> Vec<(String, f64, u64)> {
        let total = self.summary.month_expenses;
        self.breakdown
            .iter()
            .map(|b| {
                let pct = if total > 0.0 { (b.total / total * 100.0).round() as u64 } else { 0 };
                (b.name.clone(), b.total, pct)
            })
            .collect()
    }

    pub fn first_name(&self) -> &str {
        self.user_name.split_whitespace().next().unwrap_or("")
    }
}
