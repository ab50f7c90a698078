use rusqlite::{Connection, OptionalExtension};

use crate::error::{EconomiaError, Result};
use crate::models::{Category, Kind, PaymentMethod};

pub fn list_categories(conn: &Connection, space_id: i64, kind: Option<Kind>) -> Result<Vec<Category>> {
    let mut stmt = conn.prepare(
        "SELECT id, name, kind, space_id FROM categories \
         WHERE space_id = ?1 AND (?2 IS NULL OR kind = ?2) ORDER BY kind DESC, id",
    )?;
    let rows = stmt
        .query_map(rusqlite::params![space_id, kind], |row| {
            Ok(Category {
                id: row.get(0)?,
                name: row.get(1)?,
                kind: row.get(2)?,
                space_id: row.get(3)?,
            })
        })?
        .collect::<std::result::Result<Vec<_>, _>>()?;
    Ok(rows)
}

/// Look up a category of the given kind by name (case-insensitive) inside a space.
pub fn find_category(conn: &Connection, space_id: i64, name: &str, kind: Kind) -> Result<Category> {
    conn.query_row(
        "SELECT id, name, kind, space_id FROM categories \
         WHERE space_id = ?1 AND kind = ?2 AND name = ?3 COLLATE NOCASE",
        rusqlite::params![space_id, kind, name.trim()],
        |row| {
            Ok(Category {
                id: row.get(0)?,
                name: row.get(1)?,
                kind: row.get(2)?,
                space_id: row.get(3)?,
            })
        },
    )
    .optional()?
    .ok_or_else(|| EconomiaError::UnknownCategory(format!("{} ({kind})", name.trim())))
}

pub fn add_category(conn: &Connection, space_id: i64, name: &str, kind: Kind) -> Result<Category> {
    let name = name.trim();
    if name.is_empty() {
        return Err(EconomiaError::Validation("Category name cannot be empty".to_string()));
    }
    conn.execute(
        "INSERT INTO categories (name, kind, space_id) VALUES (?1, ?2, ?3)",
        rusqlite::params![name, kind, space_id],
    )?;
    let id = conn.last_insert_rowid();
    tracing::debug!(space_id, category_id = id, "category added");
    Ok(Category {
        id,
        name: name.to_string(),
        kind,
        space_id,
    })
}

pub fn list_payment_methods(conn: &Connection, space_id: i64) -> Result<Vec<PaymentMethod>> {
    let mut stmt = conn.prepare(
        "SELECT id, name, is_credit, space_id FROM payment_methods WHERE space_id = ?1 ORDER BY id",
    )?;
    let rows = stmt
        .query_map([space_id], |row| {
            Ok(PaymentMethod {
                id: row.get(0)?,
                name: row.get(1)?,
                is_credit: row.get(2)?,
                space_id: row.get(3)?,
            })
        })?
        .collect::<std::result::Result<Vec<_>, _>>()?;
    Ok(rows)
}

/// Resolve a payment method by name, or the space's first method when no name is given.
pub fn resolve_payment_method(
    conn: &Connection,
    space_id: i64,
    name: Option<&str>,
) -> Result<PaymentMethod> {
    let methods = list_payment_methods(conn, space_id)?;
    match name {
        Some(name) => methods
            .into_iter()
            .find(|m| m.name.eq_ignore_ascii_case(name.trim()))
            .ok_or_else(|| EconomiaError::UnknownPaymentMethod(name.to_string())),
        None => methods
            .into_iter()
            .next()
            .ok_or_else(|| EconomiaError::UnknownPaymentMethod("(none configured)".to_string())),
    }
}

pub fn add_payment_method(
    conn: &Connection,
    space_id: i64,
    name: &str,
    is_credit: bool,
) -> Result<PaymentMethod> {
    let name = name.trim();
    if name.is_empty() {
        return Err(EconomiaError::Validation("Payment method name cannot be empty".to_string()));
    }
    conn.execute(
        "INSERT INTO payment_methods (name, is_credit, space_id) VALUES (?1, ?2, ?3)",
        rusqlite::params![name, is_credit, space_id],
    )?;
    Ok(PaymentMethod {
        id: conn.last_insert_rowid(),
        name: name.to_string(),
        is_credit,
        space_id,
    })
}
