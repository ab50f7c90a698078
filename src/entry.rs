use chrono::{Datelike, Days, NaiveDate, NaiveDateTime};
use rusqlite::{Connection, OptionalExtension};

use crate::error::{EconomiaError, Result};
use crate::models::{Currency, GoalAccrual, Kind, NewTransaction, PaymentMethod, DATETIME_FORMAT};

/// Installment plans offered for credit purchases.
pub const INSTALLMENT_PLANS: &[u32] = &[1, 3, 6, 9, 12, 18, 24];

/// Advance `at` by `months` calendar months. When the day does not exist in
/// the target month the surplus days roll into the following month
/// (31 Jan + 1 month = 3 Mar), keeping the time of day.
pub fn add_months_rollover(at: NaiveDateTime, months: u32) -> Option<NaiveDateTime> {
    let total = at.month0() + months;
    let year = at.year().checked_add(i32::try_from(total / 12).ok()?)?;
    let first = NaiveDate::from_ymd_opt(year, total % 12 + 1, 1)?;
    let date = first.checked_add_days(Days::new(u64::from(at.day() - 1)))?;
    Some(date.and_time(at.time()))
}

/// Split a purchase of `total` into `count` equal rows, one per month starting
/// at `at`. A single installment keeps the description and amount untouched.
pub fn expand_installments(
    description: &str,
    total: f64,
    count: u32,
    at: NaiveDateTime,
) -> Result<Vec<(String, f64, NaiveDateTime)>> {
    if count == 0 {
        return Err(EconomiaError::Validation("Installment count must be at least 1".to_string()));
    }
    if count == 1 {
        return Ok(vec![(description.to_string(), total, at)]);
    }
    let share = total / f64::from(count);
    (0..count)
        .map(|i| {
            let date = add_months_rollover(at, i)
                .ok_or_else(|| EconomiaError::Validation(format!("Date out of range: {at}")))?;
            Ok((
                format!("{description} (Installment {}/{count})", i + 1),
                share,
                date,
            ))
        })
        .collect()
}

/// Everything the entry form collects for one income or expense.
#[derive(Debug, Clone)]
pub struct EntryRequest {
    pub kind: Kind,
    pub amount: f64,
    pub description: String,
    pub occurred_at: NaiveDateTime,
    pub category_id: i64,
    pub payment_method: PaymentMethod,
    pub installments: u32,
    pub goal_id: Option<i64>,
}

/// Validate an entry and turn it into the rows to insert.
pub fn plan_entry(req: &EntryRequest, owner_user_id: i64, space_id: i64) -> Result<Vec<NewTransaction>> {
    if !req.amount.is_finite() || req.amount <= 0.0 {
        return Err(EconomiaError::InvalidAmount(format!(
            "{} (must be greater than zero)",
            req.amount
        )));
    }
    let description = req.description.trim();
    if description.is_empty() {
        return Err(EconomiaError::Validation("Description cannot be empty".to_string()));
    }
    if req.installments > 1 {
        if req.kind != Kind::Expense || !req.payment_method.is_credit {
            return Err(EconomiaError::Validation(
                "Installments are only available for expenses paid with a credit method".to_string(),
            ));
        }
        if !INSTALLMENT_PLANS.contains(&req.installments) {
            return Err(EconomiaError::Validation(format!(
                "Unsupported installment plan: {} (choose one of {:?})",
                req.installments, INSTALLMENT_PLANS
            )));
        }
    }
    if req.goal_id.is_some() && req.kind != Kind::Expense {
        return Err(EconomiaError::Validation(
            "Only expenses can fund a savings goal".to_string(),
        ));
    }

    let rows = expand_installments(description, req.amount, req.installments.max(1), req.occurred_at)?;
    Ok(rows
        .into_iter()
        .map(|(description, amount, occurred_at)| NewTransaction {
            description,
            amount,
            kind: req.kind,
            currency: Currency::Ars,
            occurred_at,
            owner_user_id,
            category_id: Some(req.category_id),
            payment_method_id: Some(req.payment_method.id),
            space_id,
            savings_goal_id: req.goal_id,
        })
        .collect())
}

/// How much a planned entry adds to the goal it funds.
pub fn goal_contribution(rows: &[NewTransaction], policy: GoalAccrual) -> f64 {
    match policy {
        GoalAccrual::FirstInstallment => rows.first().map_or(0.0, |r| r.amount),
        GoalAccrual::FullTotal => rows.iter().map(|r| r.amount).sum(),
    }
}

/// Insert rows as one batch. Either all of them land or none do.
pub fn insert_transactions(conn: &Connection, rows: &[NewTransaction]) -> Result<Vec<i64>> {
    let tx = conn.unchecked_transaction()?;
    let ids = insert_rows(&tx, rows)?;
    tx.commit()?;
    Ok(ids)
}

fn insert_rows(conn: &Connection, rows: &[NewTransaction]) -> Result<Vec<i64>> {
    let mut stmt = conn.prepare(
        "INSERT INTO transactions (description, amount, kind, currency, occurred_at, owner_user_id, \
         category_id, payment_method_id, space_id, savings_goal_id) \
         VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10)",
    )?;
    let mut ids = Vec::with_capacity(rows.len());
    for row in rows {
        stmt.execute(rusqlite::params![
            row.description,
            row.amount,
            row.kind,
            row.currency,
            row.occurred_at.format(DATETIME_FORMAT).to_string(),
            row.owner_user_id,
            row.category_id,
            row.payment_method_id,
            row.space_id,
            row.savings_goal_id,
        ])?;
        ids.push(conn.last_insert_rowid());
    }
    Ok(ids)
}

pub struct EntryOutcome {
    pub rows: Vec<NewTransaction>,
    pub ids: Vec<i64>,
    pub goal_credit: f64,
}

/// Record an income or expense: expand installments, insert the batch and
/// credit the funded goal according to `policy`.
pub fn record_entry(
    conn: &Connection,
    req: &EntryRequest,
    owner_user_id: i64,
    space_id: i64,
    policy: GoalAccrual,
) -> Result<EntryOutcome> {
    let rows = plan_entry(req, owner_user_id, space_id)?;
    let tx = conn.unchecked_transaction()?;

    let goal_credit = match req.goal_id {
        Some(goal_id) => {
            let credit = goal_contribution(&rows, policy);
            let updated = tx.execute(
                "UPDATE savings_goals SET current_amount = current_amount + ?1 \
                 WHERE id = ?2 AND space_id = ?3",
                rusqlite::params![credit, goal_id, space_id],
            )?;
            if updated == 0 {
                return Err(EconomiaError::UnknownGoal(goal_id.to_string()));
            }
            credit
        }
        None => 0.0,
    };
    let ids = insert_rows(&tx, &rows)?;
    tx.commit()?;

    tracing::info!(space_id, rows = ids.len(), goal_credit, "entry recorded");
    Ok(EntryOutcome {
        rows,
        ids,
        goal_credit,
    })
}

/// Delete a transaction, provided it belongs to one of `spaces`.
pub fn delete_transaction(conn: &Connection, id: i64, spaces: &[i64]) -> Result<()> {
    let space: Option<i64> = conn
        .query_row("SELECT space_id FROM transactions WHERE id = ?1", [id], |r| r.get(0))
        .optional()?;
    match space {
        Some(space) if spaces.contains(&space) => {
            conn.execute("DELETE FROM transactions WHERE id = ?1", [id])?;
            tracing::info!(id, space_id = space, "transaction deleted");
            Ok(())
        }
        _ => Err(EconomiaError::Other(format!("No transaction with ID {id}"))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::{find_category, resolve_payment_method};
    use crate::db::test_db;
    use crate::goals::{create_goal, get_goal};
    use crate::spaces::tests::onboarded_user;

    fn at(y: i32, m: u32, d: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(y, m, d)
            .unwrap()
            .and_hms_opt(9, 15, 0)
            .unwrap()
    }

    fn method(is_credit: bool) -> PaymentMethod {
        PaymentMethod {
            id: 1,
            name: if is_credit { "Credit Card" } else { "Cash" }.to_string(),
            is_credit,
            space_id: 1,
        }
    }

    fn request(amount: f64, installments: u32, credit: bool) -> EntryRequest {
        EntryRequest {
            kind: Kind::Expense,
            amount,
            description: "Sneakers".to_string(),
            occurred_at: at(2025, 11, 10),
            category_id: 1,
            payment_method: method(credit),
            installments,
            goal_id: None,
        }
    }

    #[test]
    fn test_add_months_rollover() {
        assert_eq!(add_months_rollover(at(2025, 1, 15), 1), Some(at(2025, 2, 15)));
        assert_eq!(add_months_rollover(at(2025, 11, 15), 3), Some(at(2026, 2, 15)));
        // Missing days spill over instead of clamping.
        assert_eq!(add_months_rollover(at(2025, 1, 31), 1), Some(at(2025, 3, 3)));
        assert_eq!(add_months_rollover(at(2024, 1, 31), 1), Some(at(2024, 3, 2)));
        assert_eq!(add_months_rollover(at(2025, 5, 31), 0), Some(at(2025, 5, 31)));
    }

    #[test]
    fn test_three_installments_example() {
        let rows = expand_installments("TV", 1200.0, 3, at(2025, 11, 10)).unwrap();
        assert_eq!(rows.len(), 3);
        assert!(rows.iter().all(|(_, amount, _)| *amount == 400.0));
        let months: Vec<(i32, u32)> = rows.iter().map(|(_, _, d)| (d.year(), d.month())).collect();
        assert_eq!(months, vec![(2025, 11), (2025, 12), (2026, 1)]);
        assert_eq!(rows[0].0, "TV (Installment 1/3)");
        assert_eq!(rows[2].0, "TV (Installment 3/3)");
    }

    #[test]
    fn test_installments_sum_to_total() {
        for &n in INSTALLMENT_PLANS {
            let rows = expand_installments("x", 1000.0, n, at(2025, 3, 28)).unwrap();
            let sum: f64 = rows.iter().map(|(_, a, _)| a).sum();
            assert!((sum - 1000.0).abs() < 1e-6, "n={n} sum={sum}");
            for (i, (_, _, d)) in rows.iter().enumerate() {
                let expected = at(2025, 3, 28).month0() + i as u32;
                assert_eq!(d.month0(), expected % 12);
                assert_eq!(d.year(), 2025 + (expected / 12) as i32);
            }
        }
    }

    #[test]
    fn test_single_installment_keeps_description() {
        let rows = expand_installments("Bread", 50.0, 1, at(2025, 3, 1)).unwrap();
        assert_eq!(rows, vec![("Bread".to_string(), 50.0, at(2025, 3, 1))]);
        assert!(expand_installments("Bread", 50.0, 0, at(2025, 3, 1)).is_err());
    }

    #[test]
    fn test_plan_entry_validation() {
        assert!(plan_entry(&request(0.0, 1, false), 1, 1).is_err());
        assert!(plan_entry(&request(-5.0, 1, false), 1, 1).is_err());

        let mut blank = request(10.0, 1, false);
        blank.description = "   ".to_string();
        assert!(plan_entry(&blank, 1, 1).is_err());

        // Installments need a credit method, an expense, and a supported plan.
        assert!(plan_entry(&request(100.0, 3, false), 1, 1).is_err());
        assert!(plan_entry(&request(100.0, 5, true), 1, 1).is_err());
        let mut income = request(100.0, 3, true);
        income.kind = Kind::Income;
        assert!(plan_entry(&income, 1, 1).is_err());

        let mut funded_income = request(100.0, 1, false);
        funded_income.kind = Kind::Income;
        funded_income.goal_id = Some(1);
        assert!(plan_entry(&funded_income, 1, 1).is_err());

        let rows = plan_entry(&request(100.0, 3, true), 7, 42).unwrap();
        assert_eq!(rows.len(), 3);
        assert!(rows.iter().all(|r| r.space_id == 42 && r.owner_user_id == 7));
        assert!(rows.iter().all(|r| r.currency == Currency::Ars));
    }

    #[test]
    fn test_goal_contribution_policies() {
        let rows = plan_entry(&request(1200.0, 3, true), 1, 1).unwrap();
        assert_eq!(goal_contribution(&rows, GoalAccrual::FirstInstallment), 400.0);
        assert_eq!(goal_contribution(&rows, GoalAccrual::FullTotal), 1200.0);
        assert_eq!(goal_contribution(&[], GoalAccrual::FirstInstallment), 0.0);
    }

    #[test]
    fn test_record_entry_with_goal_and_installments() {
        let (_dir, conn) = test_db();
        let profile = onboarded_user(&conn, "ana@example.com", "Ana");
        let space = profile.personal_space_id.unwrap();
        let today = NaiveDate::from_ymd_opt(2025, 11, 1).unwrap();
        let goal = create_goal(&conn, space, "Holidays", 10000.0, 0.0, "2026-06", today).unwrap();

        let req = EntryRequest {
            kind: Kind::Expense,
            amount: 1200.0,
            description: "Flights".to_string(),
            occurred_at: at(2025, 11, 10),
            category_id: find_category(&conn, space, "Supermarket", Kind::Expense).unwrap().id,
            payment_method: resolve_payment_method(&conn, space, Some("Credit Card")).unwrap(),
            installments: 3,
            goal_id: Some(goal.id),
        };
        let outcome =
            record_entry(&conn, &req, profile.user_id, space, GoalAccrual::FirstInstallment).unwrap();
        assert_eq!(outcome.ids.len(), 3);
        assert_eq!(outcome.goal_credit, 400.0);
        assert_eq!(get_goal(&conn, goal.id, space).unwrap().current_amount, 400.0);

        let stored: i64 = conn
            .query_row(
                "SELECT count(*) FROM transactions WHERE savings_goal_id = ?1",
                [goal.id],
                |r| r.get(0),
            )
            .unwrap();
        assert_eq!(stored, 3);
    }

    #[test]
    fn test_record_entry_unknown_goal_writes_nothing() {
        let (_dir, conn) = test_db();
        let profile = onboarded_user(&conn, "ana@example.com", "Ana");
        let space = profile.personal_space_id.unwrap();
        let mut req = request(100.0, 1, false);
        req.category_id = find_category(&conn, space, "Supermarket", Kind::Expense).unwrap().id;
        req.payment_method = resolve_payment_method(&conn, space, None).unwrap();
        req.goal_id = Some(9999);
        let err = record_entry(&conn, &req, profile.user_id, space, GoalAccrual::FullTotal)
            .err()
            .unwrap();
        assert!(matches!(err, EconomiaError::UnknownGoal(_)));
        let count: i64 = conn
            .query_row("SELECT count(*) FROM transactions", [], |r| r.get(0))
            .unwrap();
        assert_eq!(count, 0);
    }

    #[test]
    fn test_delete_transaction_only_in_own_spaces() {
        let (_dir, conn) = test_db();
        let ana = onboarded_user(&conn, "ana@example.com", "Ana");
        let leo = onboarded_user(&conn, "leo@example.com", "Leo");
        let space = ana.personal_space_id.unwrap();
        let mut req = request(100.0, 1, false);
        req.category_id = find_category(&conn, space, "Supermarket", Kind::Expense).unwrap().id;
        req.payment_method = resolve_payment_method(&conn, space, None).unwrap();
        let outcome = record_entry(&conn, &req, ana.user_id, space, GoalAccrual::default()).unwrap();
        let id = outcome.ids[0];

        assert!(delete_transaction(&conn, id, &[leo.personal_space_id.unwrap()]).is_err());
        delete_transaction(&conn, id, &[space]).unwrap();
        assert!(delete_transaction(&conn, id, &[space]).is_err());
    }
}
