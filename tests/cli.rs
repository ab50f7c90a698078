use std::path::Path;

use assert_cmd::Command;
use predicates::prelude::*;
use tempfile::TempDir;

fn economia(home: &Path) -> Command {
    let mut cmd = Command::cargo_bin("economia").unwrap();
    cmd.env("HOME", home).env("NO_COLOR", "1").env_remove("RUST_LOG");
    cmd
}

/// A fresh home with an initialized database and a signed-in user.
fn signed_in_home() -> TempDir {
    let home = tempfile::tempdir().unwrap();
    let data = home.path().join("data");
    economia(home.path())
        .args(["init", "--data-dir", data.to_str().unwrap()])
        .assert()
        .success()
        .stdout(predicate::str::contains("Initialized economia"));
    economia(home.path())
        .args(["signup", "--email", "ana@example.com", "--name", "Ana"])
        .write_stdin("secret1\n")
        .assert()
        .success()
        .stdout(predicate::str::contains("Welcome, Ana."));
    home
}

#[test]
fn test_help_lists_commands() {
    let home = tempfile::tempdir().unwrap();
    economia(home.path())
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("summary"))
        .stdout(predicate::str::contains("pair"))
        .stdout(predicate::str::contains("usd"));
}

#[test]
fn test_status_before_init() {
    let home = tempfile::tempdir().unwrap();
    economia(home.path())
        .arg("status")
        .assert()
        .success()
        .stdout(predicate::str::contains("Database not found"));
}

#[test]
fn test_summary_requires_sign_in() {
    let home = tempfile::tempdir().unwrap();
    let data = home.path().join("data");
    economia(home.path())
        .args(["init", "--data-dir", data.to_str().unwrap()])
        .assert()
        .success();
    economia(home.path())
        .arg("summary")
        .assert()
        .failure()
        .code(1)
        .stderr(predicate::str::contains("Not signed in"));
}

#[test]
fn test_login_with_wrong_password_fails() {
    let home = signed_in_home();
    economia(home.path()).arg("logout").assert().success();
    economia(home.path())
        .args(["login", "--email", "ana@example.com"])
        .write_stdin("wrong-password\n")
        .assert()
        .failure()
        .stderr(predicate::str::contains("Invalid email or password"));
    economia(home.path())
        .args(["login", "--email", "ANA@example.com"])
        .write_stdin("secret1\n")
        .assert()
        .success()
        .stdout(predicate::str::contains("Signed in as Ana"));
}

#[test]
fn test_entries_show_up_in_summary() {
    let home = signed_in_home();
    economia(home.path())
        .args(["add", "income", "3000", "Salary", "--category", "Salary / Fees"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Recorded income of $ 3.000"));
    economia(home.path())
        .args(["add", "expense", "1000", "Groceries", "--category", "supermarket"])
        .assert()
        .success();
    economia(home.path())
        .args([
            "add",
            "expense",
            "500",
            "Bus card",
            "--category",
            "Commute",
            "--new-category",
        ])
        .assert()
        .success()
        .stdout(predicate::str::contains("Created expense category Commute"));

    economia(home.path())
        .arg("summary")
        .assert()
        .success()
        .stdout(predicate::str::contains("My Wallet"))
        .stdout(predicate::str::contains("$ 1.500"))
        .stdout(predicate::str::contains("Supermarket"))
        .stdout(predicate::str::contains("67%"))
        .stdout(predicate::str::contains("Groceries"));
}

#[test]
fn test_installments_need_credit_method() {
    let home = signed_in_home();
    economia(home.path())
        .args([
            "add",
            "expense",
            "1200",
            "Sneakers",
            "--category",
            "Supermarket",
            "--installments",
            "3",
        ])
        .assert()
        .failure()
        .stderr(predicate::str::contains("credit"));

    economia(home.path())
        .args([
            "add",
            "expense",
            "1200",
            "Sneakers",
            "--category",
            "Supermarket",
            "--method",
            "Credit Card",
            "--installments",
            "3",
        ])
        .assert()
        .success()
        .stdout(predicate::str::contains("Split into 3 installments of $ 400"));

    economia(home.path())
        .arg("summary")
        .assert()
        .success()
        .stdout(predicate::str::contains("Sneakers (Installment 1/3)"))
        .stdout(predicate::str::contains("Sneakers (Installment 2/3)").not());
}

#[test]
fn test_combined_view_rejects_writes() {
    let home = signed_in_home();
    economia(home.path())
        .args(["add", "expense", "10", "Coffee", "--category", "Supermarket", "--view", "combined"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("read-only"));
}

#[test]
fn test_usd_purchase_updates_both_currencies() {
    let home = signed_in_home();
    economia(home.path())
        .args(["usd", "buy", "100", "--rate", "1000"])
        .assert()
        .success()
        .stdout(predicate::str::contains("U$S 100.00"));
    economia(home.path())
        .args(["usd", "balance"])
        .assert()
        .success()
        .stdout(predicate::str::contains("U$S 100.00"));
    economia(home.path())
        .arg("summary")
        .assert()
        .success()
        .stdout(predicate::str::contains("-$ 100.000"))
        .stdout(predicate::str::contains("USD purchase (U$S 100)"));
}

#[test]
fn test_shared_space_flow() {
    let home = signed_in_home();
    economia(home.path())
        .args(["summary", "--view", "shared"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("economia pair create"));

    economia(home.path())
        .args(["pair", "create", "Our Home"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Invite code:"));
    economia(home.path())
        .args(["pair", "info"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Our Home"))
        .stdout(predicate::str::contains("Ana"));
    economia(home.path())
        .args(["add", "expense", "800", "Dog food", "--category", "Pets", "--view", "shared"])
        .assert()
        .success();
    economia(home.path())
        .args(["summary", "--view", "combined"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Dog food"));

    economia(home.path())
        .args(["pair", "delete", "--confirm", "nope"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("did not match"));
    economia(home.path())
        .args(["pair", "delete", "--confirm", "DELETE"])
        .assert()
        .success();
    economia(home.path())
        .args(["pair", "info"])
        .assert()
        .failure();
}

#[test]
fn test_goals_lifecycle() {
    let home = signed_in_home();
    economia(home.path())
        .args(["goals", "add", "Trip", "--target", "9000", "--deadline", "2099-12"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Created goal Trip"));
    economia(home.path())
        .args([
            "add",
            "expense",
            "3000",
            "Savings",
            "--category",
            "Supermarket",
            "--goal",
            "trip",
        ])
        .assert()
        .success()
        .stdout(predicate::str::contains("Added $ 3.000 to savings goal Trip"));
    economia(home.path())
        .args(["goals", "list"])
        .assert()
        .success()
        .stdout(predicate::str::contains("33%"));
    economia(home.path())
        .args(["goals", "withdraw", "Trip", "5000"])
        .assert()
        .failure();
    economia(home.path())
        .args(["goals", "withdraw", "Trip", "1000"])
        .assert()
        .success()
        .stdout(predicate::str::contains("$ 2.000 left"));
    economia(home.path())
        .args(["goals", "delete", "Trip"])
        .assert()
        .success();
}

#[test]
fn test_export_writes_csv() {
    let home = signed_in_home();
    economia(home.path())
        .args(["add", "expense", "250", "Pharmacy run", "--category", "Health / Pharmacy"])
        .assert()
        .success();
    let out = home.path().join("march.csv");
    economia(home.path())
        .args(["export", "--output", out.to_str().unwrap()])
        .assert()
        .success()
        .stdout(predicate::str::contains("1 transactions"));
    let csv = std::fs::read_to_string(&out).unwrap();
    assert!(csv.starts_with("id,date,description"));
    assert!(csv.contains("Pharmacy run,Health / Pharmacy"));
}

#[test]
fn test_config_updates_goal_accrual() {
    let home = tempfile::tempdir().unwrap();
    economia(home.path())
        .args(["config", "--goal-accrual", "full-total", "--ledger-limit", "50"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Goal accrual:  full-total"))
        .stdout(predicate::str::contains("Ledger limit:  50"));
    economia(home.path())
        .arg("config")
        .assert()
        .success()
        .stdout(predicate::str::contains("full-total"));
}

#[test]
fn test_delete_account_requires_goodbye() {
    let home = signed_in_home();
    economia(home.path())
        .args(["delete-account", "--confirm", "bye"])
        .assert()
        .failure();
    economia(home.path())
        .args(["delete-account", "--confirm", "GOODBYE"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Account deleted"));
    economia(home.path())
        .arg("summary")
        .assert()
        .failure()
        .stderr(predicate::str::contains("Not signed in"));
    economia(home.path())
        .args(["login", "--email", "ana@example.com"])
        .write_stdin("secret1\n")
        .assert()
        .failure();
}

#[test]
fn test_completions() {
    let home = tempfile::tempdir().unwrap();
    economia(home.path())
        .args(["completions", "bash"])
        .assert()
        .success()
        .stdout(predicate::str::contains("economia"));
}
