use std::io::Write;
use std::path::PathBuf;

use crate::error::Result;
use crate::ledger::{LedgerEntry, MonthCursor};
use crate::models::{ViewMode, DATETIME_FORMAT};
use crate::snapshot::LedgerSource;

const HEADER: &[&str] = &[
    "id",
    "date",
    "description",
    "category",
    "payment_method",
    "author",
    "kind",
    "currency",
    "amount",
];

/// Write register rows as CSV with a header line.
pub(crate) fn write_register<W: Write>(out: W, rows: &[LedgerEntry]) -> Result<()> {
    let mut wtr = csv::Writer::from_writer(out);
    wtr.write_record(HEADER)?;
    for entry in rows {
        let t = &entry.txn;
        wtr.write_record([
            t.id.to_string(),
            t.occurred_at.format(DATETIME_FORMAT).to_string(),
            t.description.clone(),
            entry.category.clone().unwrap_or_default(),
            entry.payment_method.clone().unwrap_or_default(),
            entry.author.clone().unwrap_or_default(),
            t.kind.to_string(),
            t.currency.as_str().to_string(),
            format!("{:.2}", t.amount),
        ])?;
    }
    wtr.flush()?;
    Ok(())
}

fn view_slug(view: ViewMode) -> &'static str {
    match view {
        ViewMode::Personal => "personal",
        ViewMode::Shared => "shared",
        ViewMode::Combined => "combined",
    }
}

pub fn run(view: ViewMode, month: Option<String>, output: Option<String>) -> Result<()> {
    let (settings, conn, profile) = super::open_session()?;
    let today = super::today();
    let cursor = match month {
        Some(m) => MonthCursor::parse(&m, today)?,
        None => MonthCursor::current(today),
    };
    let source = LedgerSource::load(&conn, profile, settings.ledger_limit)?;
    let snapshot = source.snapshot(view, cursor, today)?;

    let path = match output {
        Some(p) => PathBuf::from(p),
        None => PathBuf::from(&settings.data_dir)
            .join("exports")
            .join(format!("{}-{}.csv", view_slug(view), cursor.key())),
    };
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }
    let file = std::fs::File::create(&path)?;
    write_register(file, &snapshot.register)?;
    tracing::info!(path = %path.display(), rows = snapshot.register.len(), "register exported");

    println!(
        "Wrote {} ({} transactions, {})",
        path.display(),
        snapshot.register.len(),
        cursor.label()
    );
    Ok(())
}
