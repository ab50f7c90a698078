use chrono::{Datelike, NaiveDate};
use rusqlite::{Connection, OptionalExtension};

use crate::error::{EconomiaError, Result};
use crate::models::SavingsGoal;

const DEADLINE_FORMAT: &str = "%Y-%m-%d";

fn row_to_goal(row: &rusqlite::Row) -> rusqlite::Result<SavingsGoal> {
    let raw: String = row.get(4)?;
    let deadline = NaiveDate::parse_from_str(&raw, DEADLINE_FORMAT).map_err(|e| {
        rusqlite::Error::FromSqlConversionFailure(4, rusqlite::types::Type::Text, Box::new(e))
    })?;
    Ok(SavingsGoal {
        id: row.get(0)?,
        name: row.get(1)?,
        target_amount: row.get(2)?,
        current_amount: row.get(3)?,
        deadline,
        space_id: row.get(5)?,
    })
}

/// Parse a `YYYY-MM` deadline into the first day of that month.
pub fn parse_deadline(value: &str) -> Result<NaiveDate> {
    NaiveDate::parse_from_str(&format!("{}-01", value.trim()), DEADLINE_FORMAT)
        .map_err(|_| EconomiaError::InvalidMonth(format!("{value} (expected YYYY-MM)")))
}

pub fn create_goal(
    conn: &Connection,
    space_id: i64,
    name: &str,
    target: f64,
    starting: f64,
    deadline: &str,
    today: NaiveDate,
) -> Result<SavingsGoal> {
    let name = name.trim();
    if name.is_empty() {
        return Err(EconomiaError::Validation("Goal name cannot be empty".to_string()));
    }
    if !target.is_finite() || target <= 0.0 {
        return Err(EconomiaError::InvalidAmount(format!("target {target}")));
    }
    if !starting.is_finite() || starting < 0.0 {
        return Err(EconomiaError::InvalidAmount(format!("starting amount {starting}")));
    }
    let deadline = parse_deadline(deadline)?;
    if deadline < today.with_day(1).unwrap_or(today) {
        return Err(EconomiaError::InvalidMonth(format!(
            "{} is already over",
            deadline.format("%Y-%m")
        )));
    }

    conn.execute(
        "INSERT INTO savings_goals (name, target_amount, current_amount, deadline, space_id) \
         VALUES (?1, ?2, ?3, ?4, ?5)",
        rusqlite::params![name, target, starting, deadline.format(DEADLINE_FORMAT).to_string(), space_id],
    )?;
    let id = conn.last_insert_rowid();
    tracing::info!(space_id, goal_id = id, "savings goal created");
    Ok(SavingsGoal {
        id,
        name: name.to_string(),
        target_amount: target,
        current_amount: starting,
        deadline,
        space_id,
    })
}

/// Goals of a space, nearest deadline first.
pub fn list_goals(conn: &Connection, space_id: i64) -> Result<Vec<SavingsGoal>> {
    let mut stmt = conn.prepare(
        "SELECT id, name, target_amount, current_amount, deadline, space_id \
         FROM savings_goals WHERE space_id = ?1 ORDER BY deadline, id",
    )?;
    let goals = stmt
        .query_map([space_id], row_to_goal)?
        .collect::<std::result::Result<Vec<_>, _>>()?;
    Ok(goals)
}

pub fn get_goal(conn: &Connection, goal_id: i64, space_id: i64) -> Result<SavingsGoal> {
    conn.query_row(
        "SELECT id, name, target_amount, current_amount, deadline, space_id \
         FROM savings_goals WHERE id = ?1 AND space_id = ?2",
        [goal_id, space_id],
        row_to_goal,
    )
    .optional()?
    .ok_or_else(|| EconomiaError::UnknownGoal(goal_id.to_string()))
}

/// Find a goal by name (case-insensitive) inside a space.
pub fn find_goal(conn: &Connection, space_id: i64, name: &str) -> Result<SavingsGoal> {
    conn.query_row(
        "SELECT id, name, target_amount, current_amount, deadline, space_id \
         FROM savings_goals WHERE space_id = ?1 AND name = ?2 COLLATE NOCASE",
        rusqlite::params![space_id, name.trim()],
        row_to_goal,
    )
    .optional()?
    .ok_or_else(|| EconomiaError::UnknownGoal(name.trim().to_string()))
}

pub fn rename_goal(conn: &Connection, goal: &SavingsGoal, name: &str) -> Result<()> {
    let name = name.trim();
    if name.is_empty() {
        return Err(EconomiaError::Validation("Goal name cannot be empty".to_string()));
    }
    conn.execute(
        "UPDATE savings_goals SET name = ?1 WHERE id = ?2",
        rusqlite::params![name, goal.id],
    )?;
    Ok(())
}

/// Take money out of a goal. Returns the new current amount.
pub fn withdraw_from_goal(conn: &Connection, goal: &SavingsGoal, amount: f64) -> Result<f64> {
    if !amount.is_finite() || amount <= 0.0 {
        return Err(EconomiaError::InvalidAmount(format!("{amount}")));
    }
    if amount > goal.current_amount {
        return Err(EconomiaError::InvalidAmount(format!(
            "{amount} exceeds the {} saved in {}",
            goal.current_amount, goal.name
        )));
    }
    let remaining = goal.current_amount - amount;
    conn.execute(
        "UPDATE savings_goals SET current_amount = ?1 WHERE id = ?2",
        rusqlite::params![remaining, goal.id],
    )?;
    tracing::info!(goal_id = goal.id, amount, "withdrawn from goal");
    Ok(remaining)
}

pub fn delete_goal(conn: &Connection, goal: &SavingsGoal) -> Result<()> {
    conn.execute("DELETE FROM savings_goals WHERE id = ?1", [goal.id])?;
    tracing::info!(goal_id = goal.id, "savings goal deleted");
    Ok(())
}

/// Progress towards the target as a whole percentage, capped at 100.
pub fn progress_percent(goal: &SavingsGoal) -> u32 {
    if goal.target_amount <= 0.0 {
        return 100;
    }
    let pct = (goal.current_amount / goal.target_amount * 100.0).round();
    pct.clamp(0.0, 100.0) as u32
}

/// Whole months left until the deadline month, never less than one.
pub fn months_left(goal: &SavingsGoal, today: NaiveDate) -> i32 {
    let months = (goal.deadline.year() - today.year()) * 12 - today.month() as i32
        + goal.deadline.month() as i32;
    months.max(1)
}

/// How much to put aside each month to reach the target on time.
pub fn suggested_monthly(goal: &SavingsGoal, today: NaiveDate) -> f64 {
    let remaining = goal.target_amount - goal.current_amount;
    if remaining <= 0.0 {
        return 0.0;
    }
    remaining / f64::from(months_left(goal, today))
}
