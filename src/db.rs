use std::path::Path;

use rusqlite::Connection;

use crate::error::Result;

pub const DB_FILE: &str = "economia.db";

pub const SCHEMA: &str = "
CREATE TABLE IF NOT EXISTS users (
    id INTEGER PRIMARY KEY,
    email TEXT NOT NULL UNIQUE COLLATE NOCASE,
    display_name TEXT NOT NULL,
    password_hash TEXT NOT NULL,
    created_at TEXT DEFAULT (datetime('now'))
);

CREATE TABLE IF NOT EXISTS password_resets (
    token_hash TEXT PRIMARY KEY,
    user_id INTEGER NOT NULL,
    expires_at TEXT NOT NULL,
    FOREIGN KEY (user_id) REFERENCES users(id) ON DELETE CASCADE
);

CREATE TABLE IF NOT EXISTS spaces (
    id INTEGER PRIMARY KEY,
    name TEXT NOT NULL,
    invite_code TEXT UNIQUE,
    usd_balance REAL NOT NULL DEFAULT 0,
    created_at TEXT DEFAULT (datetime('now'))
);

CREATE TABLE IF NOT EXISTS profiles (
    user_id INTEGER PRIMARY KEY,
    display_name TEXT NOT NULL,
    personal_space_id INTEGER,
    shared_space_id INTEGER,
    FOREIGN KEY (user_id) REFERENCES users(id) ON DELETE CASCADE,
    FOREIGN KEY (personal_space_id) REFERENCES spaces(id) ON DELETE SET NULL,
    FOREIGN KEY (shared_space_id) REFERENCES spaces(id) ON DELETE SET NULL
);

CREATE TABLE IF NOT EXISTS categories (
    id INTEGER PRIMARY KEY,
    name TEXT NOT NULL,
    kind TEXT NOT NULL CHECK (kind IN ('income', 'expense')),
    space_id INTEGER NOT NULL,
    FOREIGN KEY (space_id) REFERENCES spaces(id) ON DELETE CASCADE
);

CREATE TABLE IF NOT EXISTS payment_methods (
    id INTEGER PRIMARY KEY,
    name TEXT NOT NULL,
    is_credit INTEGER NOT NULL DEFAULT 0,
    space_id INTEGER NOT NULL,
    FOREIGN KEY (space_id) REFERENCES spaces(id) ON DELETE CASCADE
);

CREATE TABLE IF NOT EXISTS savings_goals (
    id INTEGER PRIMARY KEY,
    name TEXT NOT NULL,
    target_amount REAL NOT NULL,
    current_amount REAL NOT NULL DEFAULT 0,
    deadline TEXT NOT NULL,
    space_id INTEGER NOT NULL,
    FOREIGN KEY (space_id) REFERENCES spaces(id) ON DELETE CASCADE
);

CREATE TABLE IF NOT EXISTS transactions (
    id INTEGER PRIMARY KEY,
    description TEXT NOT NULL,
    amount REAL NOT NULL CHECK (amount > 0),
    kind TEXT NOT NULL CHECK (kind IN ('income', 'expense')),
    currency TEXT DEFAULT 'ARS',
    occurred_at TEXT NOT NULL,
    owner_user_id INTEGER,
    category_id INTEGER,
    payment_method_id INTEGER,
    space_id INTEGER NOT NULL,
    savings_goal_id INTEGER,
    created_at TEXT DEFAULT (datetime('now')),
    FOREIGN KEY (owner_user_id) REFERENCES users(id) ON DELETE SET NULL,
    FOREIGN KEY (category_id) REFERENCES categories(id) ON DELETE SET NULL,
    FOREIGN KEY (payment_method_id) REFERENCES payment_methods(id) ON DELETE SET NULL,
    FOREIGN KEY (space_id) REFERENCES spaces(id) ON DELETE CASCADE,
    FOREIGN KEY (savings_goal_id) REFERENCES savings_goals(id) ON DELETE SET NULL
);

CREATE INDEX IF NOT EXISTS idx_transactions_space_date ON transactions (space_id, occurred_at);

CREATE TRIGGER IF NOT EXISTS usd_balance_on_insert
AFTER INSERT ON transactions WHEN NEW.currency = 'USD'
BEGIN
    UPDATE spaces
    SET usd_balance = usd_balance + CASE WHEN NEW.kind = 'income' THEN NEW.amount ELSE -NEW.amount END
    WHERE id = NEW.space_id;
END;

CREATE TRIGGER IF NOT EXISTS usd_balance_on_delete
AFTER DELETE ON transactions WHEN OLD.currency = 'USD'
BEGIN
    UPDATE spaces
    SET usd_balance = usd_balance - CASE WHEN OLD.kind = 'income' THEN OLD.amount ELSE -OLD.amount END
    WHERE id = OLD.space_id;
END;
";

// (name, kind)
pub const PERSONAL_CATEGORIES: &[(&str, &str)] = &[
    ("Salary / Fees", "income"),
    ("Sales", "income"),
    ("Supermarket", "expense"),
    ("Utilities (Power/Gas/Internet)", "expense"),
    ("Rent / HOA Fees", "expense"),
    ("Transport / Car", "expense"),
    ("Dining Out / Food", "expense"),
    ("Subscriptions", "expense"),
    ("Health / Pharmacy", "expense"),
];

pub const SHARED_CATEGORIES: &[(&str, &str)] = &[
    ("Common Fund", "income"),
    ("Gifts", "income"),
    ("Supermarket", "expense"),
    ("Rent/HOA Fees", "expense"),
    ("Utilities (Power/Gas/Internet)", "expense"),
    ("Outings/Dinners", "expense"),
    ("Delivery", "expense"),
    ("Car/Transport", "expense"),
    ("Pets", "expense"),
    ("Pharmacy/Health", "expense"),
    ("Miscellaneous", "expense"),
];

// (name, is_credit)
pub const DEFAULT_PAYMENT_METHODS: &[(&str, bool)] = &[
    ("Cash", false),
    ("Bank Transfer", false),
    ("Debit Card", false),
    ("Credit Card", true),
];

pub fn get_connection(db_path: &Path) -> Result<Connection> {
    let conn = Connection::open(db_path)?;
    conn.execute_batch("PRAGMA journal_mode=WAL; PRAGMA foreign_keys=ON;")?;
    Ok(conn)
}

pub fn init_db(conn: &Connection) -> Result<()> {
    conn.execute_batch(SCHEMA)?;
    Ok(())
}

/// Seed a freshly created space with its starter categories and payment methods.
pub fn seed_space(conn: &Connection, space_id: i64, categories: &[(&str, &str)]) -> Result<()> {
    let mut cat_stmt =
        conn.prepare("INSERT INTO categories (name, kind, space_id) VALUES (?1, ?2, ?3)")?;
    for (name, kind) in categories {
        cat_stmt.execute(rusqlite::params![name, kind, space_id])?;
    }
    let mut method_stmt = conn
        .prepare("INSERT INTO payment_methods (name, is_credit, space_id) VALUES (?1, ?2, ?3)")?;
    for (name, is_credit) in DEFAULT_PAYMENT_METHODS {
        method_stmt.execute(rusqlite::params![name, is_credit, space_id])?;
    }
    Ok(())
}

#[cfg(test)]
pub(crate) fn test_db() -> (tempfile::TempDir, Connection) {
    let dir = tempfile::tempdir().unwrap();
    let conn = get_connection(&dir.path().join("test.db")).unwrap();
    init_db(&conn).unwrap();
    (dir, conn)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn space(conn: &Connection) -> i64 {
        conn.execute("INSERT INTO spaces (name) VALUES ('Test')", []).unwrap();
        conn.last_insert_rowid()
    }

    fn usd_balance(conn: &Connection, space_id: i64) -> f64 {
        conn.query_row("SELECT usd_balance FROM spaces WHERE id = ?1", [space_id], |r| r.get(0))
            .unwrap()
    }

    #[test]
    fn test_init_db_creates_tables() {
        let (_dir, conn) = test_db();
        let tables: Vec<String> = conn
            .prepare("SELECT name FROM sqlite_master WHERE type='table' AND name NOT LIKE 'sqlite_%'")
            .unwrap()
            .query_map([], |row| row.get(0))
            .unwrap()
            .collect::<std::result::Result<Vec<_>, _>>()
            .unwrap();
        for expected in &[
            "users",
            "password_resets",
            "spaces",
            "profiles",
            "categories",
            "payment_methods",
            "savings_goals",
            "transactions",
        ] {
            assert!(tables.contains(&expected.to_string()), "missing table: {expected}");
        }
    }

    #[test]
    fn test_init_db_is_idempotent() {
        let (_dir, conn) = test_db();
        init_db(&conn).unwrap();
    }

    #[test]
    fn test_seed_space_marks_only_credit_card_as_credit() {
        let (_dir, conn) = test_db();
        let id = space(&conn);
        seed_space(&conn, id, PERSONAL_CATEGORIES).unwrap();
        let credit: Vec<String> = conn
            .prepare("SELECT name FROM payment_methods WHERE space_id = ?1 AND is_credit = 1")
            .unwrap()
            .query_map([id], |r| r.get(0))
            .unwrap()
            .collect::<std::result::Result<Vec<_>, _>>()
            .unwrap();
        assert_eq!(credit, vec!["Credit Card".to_string()]);
        let cats: i64 = conn
            .query_row("SELECT count(*) FROM categories WHERE space_id = ?1", [id], |r| r.get(0))
            .unwrap();
        assert_eq!(cats as usize, PERSONAL_CATEGORIES.len());
    }

    #[test]
    fn test_usd_triggers_track_balance() {
        let (_dir, conn) = test_db();
        let id = space(&conn);
        conn.execute(
            "INSERT INTO transactions (description, amount, kind, currency, occurred_at, space_id) \
             VALUES ('in', 150.0, 'income', 'USD', '2025-01-10T10:00', ?1)",
            [id],
        )
        .unwrap();
        conn.execute(
            "INSERT INTO transactions (description, amount, kind, currency, occurred_at, space_id) \
             VALUES ('out', 40.0, 'expense', 'USD', '2025-01-11T10:00', ?1)",
            [id],
        )
        .unwrap();
        let out_id = conn.last_insert_rowid();
        conn.execute(
            "INSERT INTO transactions (description, amount, kind, currency, occurred_at, space_id) \
             VALUES ('pesos', 9999.0, 'income', 'ARS', '2025-01-11T10:00', ?1)",
            [id],
        )
        .unwrap();
        assert_eq!(usd_balance(&conn, id), 110.0);

        conn.execute("DELETE FROM transactions WHERE id = ?1", [out_id]).unwrap();
        assert_eq!(usd_balance(&conn, id), 150.0);
    }

    #[test]
    fn test_amount_must_be_positive() {
        let (_dir, conn) = test_db();
        let id = space(&conn);
        let result = conn.execute(
            "INSERT INTO transactions (description, amount, kind, occurred_at, space_id) \
             VALUES ('bad', -5.0, 'expense', '2025-01-10T10:00', ?1)",
            [id],
        );
        assert!(result.is_err());
    }
}
