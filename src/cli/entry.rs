use chrono::{NaiveDate, NaiveDateTime};
use colored::Colorize;

use crate::catalog::{add_category, find_category, resolve_payment_method};
use crate::entry::{delete_transaction, record_entry, EntryRequest};
use crate::error::{EconomiaError, Result};
use crate::fmt::ars;
use crate::goals::find_goal;
use crate::ledger::{target_space, MonthCursor};
use crate::models::{Kind, ViewMode, DATETIME_FORMAT};

/// Parse `YYYY-MM-DDTHH:MM`, or a bare date at midnight.
pub(crate) fn parse_occurred_at(value: &str) -> Result<NaiveDateTime> {
    let value = value.trim();
    if let Ok(at) = NaiveDateTime::parse_from_str(value, DATETIME_FORMAT) {
        return Ok(at);
    }
    NaiveDate::parse_from_str(value, "%Y-%m-%d")
        .ok()
        .and_then(|d| d.and_hms_opt(0, 0, 0))
        .ok_or_else(|| {
            EconomiaError::Validation(format!(
                "Invalid date: {value} (expected YYYY-MM-DD or YYYY-MM-DDTHH:MM)"
            ))
        })
}

#[allow(clippy::too_many_arguments)]
pub fn add(
    kind: Kind,
    amount: f64,
    description: &str,
    category: &str,
    new_category: bool,
    method: Option<&str>,
    installments: u32,
    goal: Option<&str>,
    date: Option<&str>,
    view: ViewMode,
) -> Result<()> {
    let (settings, conn, profile) = super::open_session()?;
    let space_id = target_space(view, &profile)?;

    let category = match find_category(&conn, space_id, category, kind) {
        Ok(c) => c,
        Err(EconomiaError::UnknownCategory(_)) if new_category => {
            let created = add_category(&conn, space_id, category, kind)?;
            println!("Created {kind} category {}", created.name.bold());
            created
        }
        Err(e) => return Err(e),
    };
    let payment_method = resolve_payment_method(&conn, space_id, method)?;
    let goal = goal.map(|name| find_goal(&conn, space_id, name)).transpose()?;
    let occurred_at = match date {
        Some(d) => parse_occurred_at(d)?,
        None => chrono::Local::now().naive_local(),
    };

    let req = EntryRequest {
        kind,
        amount,
        description: description.to_string(),
        occurred_at,
        category_id: category.id,
        payment_method,
        installments,
        goal_id: goal.as_ref().map(|g| g.id),
    };
    let outcome = record_entry(&conn, &req, profile.user_id, space_id, settings.goal_accrual)?;

    let label = match kind {
        Kind::Income => "income".green(),
        Kind::Expense => "expense".red(),
    };
    let ids: Vec<String> = outcome.ids.iter().map(|id| id.to_string()).collect();
    println!(
        "Recorded {label} of {} in {} ({}), ID {}",
        ars(amount),
        view.label(),
        category.name,
        ids.join(", ")
    );
    if outcome.rows.len() > 1 {
        let first = &outcome.rows[0];
        let last = &outcome.rows[outcome.rows.len() - 1];
        println!(
            "Split into {} installments of {}, last one in {}",
            outcome.rows.len(),
            ars(first.amount),
            MonthCursor::current(last.occurred_at.date()).label()
        );
    }
    if let Some(goal) = goal {
        println!("Added {} to savings goal {}", ars(outcome.goal_credit), goal.name.bold());
    }
    Ok(())
}

pub fn delete(id: i64) -> Result<()> {
    let (_settings, conn, profile) = super::open_session()?;
    let spaces: Vec<i64> = profile
        .personal_space_id
        .into_iter()
        .chain(profile.shared_space_id)
        .collect();
    delete_transaction(&conn, id, &spaces)?;
    println!("Deleted transaction {id}");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_occurred_at() {
        let at = parse_occurred_at("2025-03-09T18:45").unwrap();
        assert_eq!(at.format(DATETIME_FORMAT).to_string(), "2025-03-09T18:45");
        let midnight = parse_occurred_at("2025-03-09").unwrap();
        assert_eq!(midnight.format(DATETIME_FORMAT).to_string(), "2025-03-09T00:00");
        assert!(parse_occurred_at("09/03/2025").is_err());
    }
}
