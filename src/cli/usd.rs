use colored::Colorize;

use crate::error::Result;
use crate::fmt::{ars, usd};
use crate::ledger::target_space;
use crate::models::ViewMode;
use crate::usd::{record_usd_movement, usd_balance_for_view, UsdMovement};

pub fn record(movement: UsdMovement, amount: f64, view: ViewMode) -> Result<()> {
    let (_settings, conn, profile) = super::open_session()?;
    let space_id = target_space(view, &profile)?;
    let now = chrono::Local::now().naive_local();
    record_usd_movement(&conn, movement, amount, now, profile.user_id, space_id)?;

    match movement {
        UsdMovement::Bought { rate } => println!(
            "Bought {} for {} at {} per dollar",
            usd(amount),
            ars(amount * rate),
            ars(rate)
        ),
        UsdMovement::Deposit => println!("Deposited {}", usd(amount)),
        UsdMovement::Withdrawal => println!("Withdrew {}", usd(amount)),
    }
    let balance = usd_balance_for_view(&conn, view, &profile)?;
    println!("Dollar balance ({}): {}", view.label(), usd(balance).bold());
    Ok(())
}

pub fn balance(view: ViewMode) -> Result<()> {
    let (_settings, conn, profile) = super::open_session()?;
    let balance = usd_balance_for_view(&conn, view, &profile)?;
    println!("Dollar balance ({}): {}", view.label(), usd(balance).bold());
    Ok(())
}
