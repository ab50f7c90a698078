use rusqlite::Connection;

use crate::auth::get_user;
use crate::db::get_connection;
use crate::error::Result;
use crate::fmt::format_bytes;
use crate::settings::load_settings;

fn count(conn: &Connection, table: &str) -> Result<i64> {
    Ok(conn.query_row(&format!("SELECT count(*) FROM {table}"), [], |r| r.get(0))?)
}

pub fn run() -> Result<()> {
    let settings = load_settings();
    let db_path = settings.db_path();

    println!("Data dir:   {}", settings.data_dir);
    println!("Database:   {}", db_path.display());

    if !db_path.exists() {
        println!();
        println!("Database not found. Run `economia init` to set up.");
        return Ok(());
    }

    let size = std::fs::metadata(&db_path)?.len();
    println!("DB size:    {}", format_bytes(size));

    let conn = get_connection(&db_path)?;
    let user = match &settings.session {
        Some(session) => match get_user(&conn, session.user_id) {
            Ok(user) => format!("{} <{}>", user.display_name, user.email),
            Err(_) => format!("{} (account no longer exists)", session.email),
        },
        None => "(not signed in)".to_string(),
    };
    println!("User:       {user}");
    println!("Accrual:    {}", settings.goal_accrual.as_str());

    println!();
    println!("Users:         {}", count(&conn, "users")?);
    println!("Spaces:        {}", count(&conn, "spaces")?);
    println!("Transactions:  {}", count(&conn, "transactions")?);
    println!("Goals:         {}", count(&conn, "savings_goals")?);
    Ok(())
}
