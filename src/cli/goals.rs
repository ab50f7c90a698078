use colored::Colorize;
use comfy_table::{Cell, Table};

use crate::error::Result;
use crate::fmt::ars;
use crate::goals::{
    create_goal, delete_goal, find_goal, list_goals, progress_percent, rename_goal,
    suggested_monthly, withdraw_from_goal,
};
use crate::ledger::target_space;
use crate::models::ViewMode;

pub fn list(view: ViewMode) -> Result<()> {
    let (_settings, conn, profile) = super::open_session()?;
    let space_id = target_space(view, &profile)?;
    let goals = list_goals(&conn, space_id)?;
    if goals.is_empty() {
        println!("No savings goals yet. Create one with `economia goals add`.");
        return Ok(());
    }
    let today = super::today();

    let mut table = Table::new();
    table.set_header(vec!["Goal", "Saved", "Target", "Progress", "Deadline", "Per month"]);
    for goal in &goals {
        let pct = progress_percent(goal);
        let progress = if pct >= 100 {
            format!("{pct}%").green().bold().to_string()
        } else {
            format!("{pct}%")
        };
        table.add_row(vec![
            Cell::new(&goal.name),
            Cell::new(ars(goal.current_amount)),
            Cell::new(ars(goal.target_amount)),
            Cell::new(progress),
            Cell::new(goal.deadline.format("%Y-%m")),
            Cell::new(ars(suggested_monthly(goal, today))),
        ]);
    }
    println!("Savings Goals ({})\n{table}", view.label());
    Ok(())
}

pub fn add(name: &str, target: f64, deadline: &str, starting: f64, view: ViewMode) -> Result<()> {
    let (_settings, conn, profile) = super::open_session()?;
    let space_id = target_space(view, &profile)?;
    let today = super::today();
    let goal = create_goal(&conn, space_id, name, target, starting, deadline, today)?;
    println!(
        "Created goal {}: {} by {} ({} per month)",
        goal.name.bold(),
        ars(goal.target_amount),
        goal.deadline.format("%Y-%m"),
        ars(suggested_monthly(&goal, today))
    );
    Ok(())
}

pub fn rename(name: &str, new_name: &str, view: ViewMode) -> Result<()> {
    let (_settings, conn, profile) = super::open_session()?;
    let space_id = target_space(view, &profile)?;
    let goal = find_goal(&conn, space_id, name)?;
    rename_goal(&conn, &goal, new_name)?;
    println!("Renamed {} to {}", goal.name, new_name.trim());
    Ok(())
}

pub fn withdraw(name: &str, amount: f64, view: ViewMode) -> Result<()> {
    let (_settings, conn, profile) = super::open_session()?;
    let space_id = target_space(view, &profile)?;
    let goal = find_goal(&conn, space_id, name)?;
    let remaining = withdraw_from_goal(&conn, &goal, amount)?;
    println!("Withdrew {} from {} ({} left)", ars(amount), goal.name, ars(remaining));
    println!(
        "{}",
        "If you spend it, record it as income with `economia add income` so your balance stays right."
            .dimmed()
    );
    Ok(())
}

pub fn delete(name: &str, view: ViewMode) -> Result<()> {
    let (_settings, conn, profile) = super::open_session()?;
    let space_id = target_space(view, &profile)?;
    let goal = find_goal(&conn, space_id, name)?;
    delete_goal(&conn, &goal)?;
    println!("Deleted goal {}", goal.name);
    Ok(())
}
