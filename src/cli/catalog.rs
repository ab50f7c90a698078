use comfy_table::{Cell, Table};

use crate::catalog::{add_category, add_payment_method, list_categories, list_payment_methods};
use crate::error::Result;
use crate::ledger::target_space;
use crate::models::{Kind, ViewMode};

pub fn list_categories_cmd(view: ViewMode, kind: Option<Kind>) -> Result<()> {
    let (_settings, conn, profile) = super::open_session()?;
    let space_id = target_space(view, &profile)?;
    let categories = list_categories(&conn, space_id, kind)?;

    let mut table = Table::new();
    table.set_header(vec!["ID", "Name", "Kind"]);
    for c in &categories {
        table.add_row(vec![Cell::new(c.id), Cell::new(&c.name), Cell::new(c.kind)]);
    }
    println!("Categories ({})\n{table}", view.label());
    Ok(())
}

pub fn add_category_cmd(name: &str, kind: Kind, view: ViewMode) -> Result<()> {
    let (_settings, conn, profile) = super::open_session()?;
    let space_id = target_space(view, &profile)?;
    let category = add_category(&conn, space_id, name, kind)?;
    println!("Added {kind} category: {}", category.name);
    Ok(())
}

pub fn list_methods_cmd(view: ViewMode) -> Result<()> {
    let (_settings, conn, profile) = super::open_session()?;
    let space_id = target_space(view, &profile)?;
    let methods = list_payment_methods(&conn, space_id)?;

    let mut table = Table::new();
    table.set_header(vec!["ID", "Name", "Credit"]);
    for m in &methods {
        table.add_row(vec![
            Cell::new(m.id),
            Cell::new(&m.name),
            Cell::new(if m.is_credit { "yes" } else { "" }),
        ]);
    }
    println!("Payment Methods ({})\n{table}", view.label());
    Ok(())
}

pub fn add_method_cmd(name: &str, credit: bool, view: ViewMode) -> Result<()> {
    let (_settings, conn, profile) = super::open_session()?;
    let space_id = target_space(view, &profile)?;
    let method = add_payment_method(&conn, space_id, name, credit)?;
    if method.is_credit {
        println!("Added payment method: {} (credit, installments allowed)", method.name);
    } else {
        println!("Added payment method: {}", method.name);
    }
    Ok(())
}
