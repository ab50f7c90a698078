use crate::error::{EconomiaError, Result};
use crate::settings::{load_settings, save_settings};

pub fn run(
    goal_accrual: Option<crate::models::GoalAccrual>,
    ledger_limit: Option<usize>,
) -> Result<()> {
    let mut settings = load_settings();
    let changed = goal_accrual.is_some() || ledger_limit.is_some();

    if let Some(policy) = goal_accrual {
        settings.goal_accrual = policy;
    }
    if let Some(limit) = ledger_limit {
        if limit == 0 {
            return Err(EconomiaError::Validation(
                "Ledger limit must be at least 1".to_string(),
            ));
        }
        settings.ledger_limit = limit;
    }
    if changed {
        save_settings(&settings)?;
        println!("Settings updated.");
    }

    println!("Data dir:      {}", settings.data_dir);
    println!("Goal accrual:  {}", settings.goal_accrual.as_str());
    println!("Ledger limit:  {}", settings.ledger_limit);
    Ok(())
}
