use chrono::NaiveDateTime;
use rusqlite::Connection;

use crate::entry::insert_transactions;
use crate::error::{EconomiaError, Result};
use crate::fmt::{ars, usd};
use crate::models::{Currency, Kind, NewTransaction, Profile, ViewMode};
use crate::spaces::get_space;

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum UsdMovement {
    /// Dollars bought with pesos at `rate` pesos per dollar.
    Bought { rate: f64 },
    /// Dollars that arrived without spending pesos (savings, gifts).
    Deposit,
    Withdrawal,
}

/// Rows a USD movement of `amount` dollars produces.
pub fn plan_usd_movement(
    movement: UsdMovement,
    amount: f64,
    at: NaiveDateTime,
    owner_user_id: i64,
    space_id: i64,
) -> Result<Vec<NewTransaction>> {
    if !amount.is_finite() || amount <= 0.0 {
        return Err(EconomiaError::InvalidAmount(format!("{amount} (must be greater than zero)")));
    }
    let row = |description: String, amount: f64, kind: Kind, currency: Currency| NewTransaction {
        description,
        amount,
        kind,
        currency,
        occurred_at: at,
        owner_user_id,
        category_id: None,
        payment_method_id: None,
        space_id,
        savings_goal_id: None,
    };

    match movement {
        UsdMovement::Bought { rate } => {
            let pesos = amount * rate;
            if !rate.is_finite() || rate <= 0.0 || !pesos.is_finite() {
                return Err(EconomiaError::InvalidAmount(format!("exchange rate {rate}")));
            }
            Ok(vec![
                row(
                    format!("USD purchase ({})", usd_plain(amount)),
                    pesos,
                    Kind::Expense,
                    Currency::Ars,
                ),
                row(
                    format!("Purchase (rate: {})", ars(rate)),
                    amount,
                    Kind::Income,
                    Currency::Usd,
                ),
            ])
        }
        UsdMovement::Deposit => Ok(vec![row(
            "USD deposit".to_string(),
            amount,
            Kind::Income,
            Currency::Usd,
        )]),
        UsdMovement::Withdrawal => Ok(vec![row(
            "USD withdrawal".to_string(),
            amount,
            Kind::Expense,
            Currency::Usd,
        )]),
    }
}

// "U$S 100" for whole amounts, "U$S 12.50" otherwise.
fn usd_plain(amount: f64) -> String {
    if amount.fract() == 0.0 {
        format!("U$S {amount:.0}")
    } else {
        usd(amount)
    }
}

/// Record a USD movement as one batch. The store keeps the space's USD balance.
pub fn record_usd_movement(
    conn: &Connection,
    movement: UsdMovement,
    amount: f64,
    at: NaiveDateTime,
    owner_user_id: i64,
    space_id: i64,
) -> Result<Vec<i64>> {
    let rows = plan_usd_movement(movement, amount, at, owner_user_id, space_id)?;
    let ids = insert_transactions(conn, &rows)?;
    tracing::info!(space_id, ?movement, amount, "usd movement recorded");
    Ok(ids)
}

/// USD balance shown for a view: one space's balance, or both for combined.
pub fn usd_balance_for_view(conn: &Connection, view: ViewMode, profile: &Profile) -> Result<f64> {
    let balance = |space: Option<i64>| -> Result<f64> {
        match space {
            Some(id) => Ok(get_space(conn, id)?.usd_balance),
            None => Ok(0.0),
        }
    };
    match view {
        ViewMode::Personal => balance(profile.personal_space_id),
        ViewMode::Shared => match profile.shared_space_id {
            Some(id) => balance(Some(id)),
            None => Err(EconomiaError::NoSharedSpace),
        },
        ViewMode::Combined => {
            Ok(balance(profile.personal_space_id)? + balance(profile.shared_space_id)?)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::test_db;
    use crate::entry::delete_transaction;
    use crate::spaces::{create_shared_space, tests::onboarded_user};
    use chrono::NaiveDate;

    fn now() -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2025, 4, 2)
            .unwrap()
            .and_hms_opt(18, 0, 0)
            .unwrap()
    }

    #[test]
    fn test_purchase_example() {
        let rows = plan_usd_movement(UsdMovement::Bought { rate: 1000.0 }, 100.0, now(), 1, 5).unwrap();
        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0].kind, Kind::Expense);
        assert_eq!(rows[0].currency, Currency::Ars);
        assert_eq!(rows[0].amount, 100000.0);
        assert_eq!(rows[0].description, "USD purchase (U$S 100)");
        assert_eq!(rows[1].kind, Kind::Income);
        assert_eq!(rows[1].currency, Currency::Usd);
        assert_eq!(rows[1].amount, 100.0);
        assert_eq!(rows[1].description, "Purchase (rate: $ 1.000)");
    }

    #[test]
    fn test_invalid_amounts_rejected() {
        assert!(plan_usd_movement(UsdMovement::Deposit, 0.0, now(), 1, 5).is_err());
        assert!(plan_usd_movement(UsdMovement::Withdrawal, -3.0, now(), 1, 5).is_err());
        assert!(plan_usd_movement(UsdMovement::Bought { rate: 0.0 }, 10.0, now(), 1, 5).is_err());
        assert!(plan_usd_movement(UsdMovement::Bought { rate: f64::NAN }, 10.0, now(), 1, 5).is_err());
        assert!(plan_usd_movement(UsdMovement::Bought { rate: f64::MAX }, 10.0, now(), 1, 5).is_err());
    }

    #[test]
    fn test_balance_follows_movements() {
        let (_dir, conn) = test_db();
        let profile = onboarded_user(&conn, "ana@example.com", "Ana");
        let space = profile.personal_space_id.unwrap();

        record_usd_movement(&conn, UsdMovement::Bought { rate: 1000.0 }, 100.0, now(), profile.user_id, space)
            .unwrap();
        record_usd_movement(&conn, UsdMovement::Deposit, 50.0, now(), profile.user_id, space).unwrap();
        let ids =
            record_usd_movement(&conn, UsdMovement::Withdrawal, 30.0, now(), profile.user_id, space)
                .unwrap();
        assert_eq!(usd_balance_for_view(&conn, ViewMode::Personal, &profile).unwrap(), 120.0);

        delete_transaction(&conn, ids[0], &[space]).unwrap();
        assert_eq!(usd_balance_for_view(&conn, ViewMode::Personal, &profile).unwrap(), 150.0);
    }

    #[test]
    fn test_combined_balance_sums_spaces() {
        let (_dir, conn) = test_db();
        let ana = onboarded_user(&conn, "ana@example.com", "Ana");
        assert!(matches!(
            usd_balance_for_view(&conn, ViewMode::Shared, &ana),
            Err(EconomiaError::NoSharedSpace)
        ));

        let (shared, _) = create_shared_space(&conn, ana.user_id, "Home").unwrap();
        let ana = crate::spaces::get_profile(&conn, ana.user_id).unwrap().unwrap();
        let personal = ana.personal_space_id.unwrap();
        record_usd_movement(&conn, UsdMovement::Deposit, 40.0, now(), ana.user_id, personal).unwrap();
        record_usd_movement(&conn, UsdMovement::Deposit, 60.0, now(), ana.user_id, shared).unwrap();

        assert_eq!(usd_balance_for_view(&conn, ViewMode::Shared, &ana).unwrap(), 60.0);
        assert_eq!(usd_balance_for_view(&conn, ViewMode::Combined, &ana).unwrap(), 100.0);
    }
}
