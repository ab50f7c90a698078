use colored::Colorize;
use comfy_table::{Cell, Table};

use crate::error::Result;
use crate::fmt::{ars, usd};
use crate::ledger::{LedgerEntry, MonthCursor};
use crate::models::{Currency, Kind, ViewMode};
use crate::snapshot::{DashboardSnapshot, LedgerSource};

/// Signed amount as shown in registers: `+$ 3.000`, `-U$S 40.00`.
pub(crate) fn signed_amount(entry: &LedgerEntry) -> String {
    let text = match entry.txn.currency {
        Currency::Ars => ars(entry.txn.amount),
        Currency::Usd => usd(entry.txn.amount),
    };
    match entry.txn.kind {
        Kind::Income => format!("+{text}"),
        Kind::Expense => format!("-{text}"),
    }
}

pub fn run(view: ViewMode, month: Option<String>) -> Result<()> {
    let (settings, conn, profile) = super::open_session()?;
    let today = super::today();
    let cursor = match month {
        Some(m) => MonthCursor::parse(&m, today)?,
        None => MonthCursor::current(today),
    };
    let source = LedgerSource::load(&conn, profile, settings.ledger_limit)?;
    let snapshot = source.snapshot(view, cursor, today)?;
    print_snapshot(&snapshot);
    Ok(())
}

pub fn print_snapshot(snap: &DashboardSnapshot) {
    let title = match (&snap.shared, snap.view) {
        (Some(shared), ViewMode::Shared) => format!("{} ({})", shared.name, shared.members),
        _ => snap.view.label().to_string(),
    };
    println!("{} {} {}", title.bold(), "·".dimmed(), snap.cursor.label());

    let mut totals = Table::new();
    totals.set_header(vec!["", "Amount"]);
    let balance = if snap.summary.balance >= 0.0 {
        ars(snap.summary.balance).green().to_string()
    } else {
        ars(snap.summary.balance).red().to_string()
    };
    totals.add_row(vec![Cell::new("Balance".bold()), Cell::new(balance)]);
    totals.add_row(vec![
        Cell::new("Income this month"),
        Cell::new(ars(snap.summary.month_income).green().to_string()),
    ]);
    totals.add_row(vec![
        Cell::new("Expenses this month"),
        Cell::new(ars(snap.summary.month_expenses).red().to_string()),
    ]);
    totals.add_row(vec![Cell::new("Net this month"), Cell::new(ars(snap.summary.month_net()))]);
    totals.add_row(vec![Cell::new("Dollars"), Cell::new(usd(snap.usd_balance))]);
    println!("{totals}");

    let shares = snap.breakdown_shares();
    if !shares.is_empty() {
        let mut table = Table::new();
        table.set_header(vec!["Category", "Amount", "%"]);
        for (name, total, pct) in &shares {
            table.add_row(vec![Cell::new(name), Cell::new(ars(*total)), Cell::new(format!("{pct}%"))]);
        }
        println!("\nExpenses by Category\n{table}");
    }

    if snap.register.is_empty() {
        println!("\nNo transactions in {}.", snap.cursor.label());
        return;
    }
    let mut table = Table::new();
    table.set_header(vec!["ID", "Date", "Description", "Category", "Method", "By", "Amount"]);
    for entry in &snap.register {
        let amount = signed_amount(entry);
        let amount = match entry.txn.kind {
            Kind::Income => amount.green().to_string(),
            Kind::Expense => amount.red().to_string(),
        };
        table.add_row(vec![
            Cell::new(entry.txn.id),
            Cell::new(entry.txn.occurred_at.format("%d/%m %H:%M")),
            Cell::new(&entry.txn.description),
            Cell::new(entry.category.as_deref().unwrap_or("")),
            Cell::new(entry.payment_method.as_deref().unwrap_or("")),
            Cell::new(entry.author.as_deref().unwrap_or("")),
            Cell::new(amount),
        ]);
    }
    println!("\nTransactions\n{table}");
}
