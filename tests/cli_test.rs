mod common;

use anyhow::Result;
use bankbook::cli::Session;
use bankbook::domain::{AccountId, FixedClock, SequentialIds};
use bankbook::io::Snapshot;
use bankbook::storage::{MemoryStorage, Storage};
use common::fixed_time;
use tempfile::TempDir;

/// Run a scripted session and return everything it printed.
async fn run_script(storage: &MemoryStorage, script: &str) -> Result<String> {
    let ids = SequentialIds::new();
    let clock = FixedClock(fixed_time());
    let mut output = Vec::new();
    Session::new(storage, &ids, &clock, script.as_bytes(), &mut output)
        .run()
        .await?;
    Ok(String::from_utf8(output)?)
}

#[tokio::test]
async fn test_menu_walkthrough() -> Result<()> {
    let storage = MemoryStorage::new();
    let script = "\
1
Alice
1
Bob
2
ACC000001
1
100
3
40
ACC000002
2
1000
4
5
7
3
4
6
";
    let out = run_script(&storage, script).await?;

    assert!(out.contains("Account ID: ACC000001"));
    assert!(out.contains("Account ID: ACC000002"));
    assert!(out.contains("Account ACC000001 selected"));
    assert!(out.contains("Deposited 100.00"));
    assert!(out.contains("Transferred 40.00 to ACC000002"));
    assert!(out.contains(
        "Error: Insufficient funds in account ACC000001: balance 60.00, required 1000.00"
    ));
    assert!(out.contains("Current balance: 60.00"));
    assert!(out.contains("2024-06-01 09:00:00 | DEPOSIT | 100.00 | Deposit of 100.00"));
    assert!(out.contains("| TRANSFER_OUT | 40.00 | Transfer of 40.00 to ACC000002"));
    assert!(out.contains("ID: ACC000001 | Owner: Alice | Balance: 60.00"));
    assert!(out.contains("ID: ACC000002 | Owner: Bob | Balance: 40.00"));
    assert!(out.contains("Ledger OK: 2 account(s), 3 transaction(s)"));
    assert!(out.trim_end().ends_with("Goodbye!"));

    let bob = storage.load(&AccountId::new("ACC000002")).await?;
    assert_eq!(bob.balance(), 4000);
    Ok(())
}

#[tokio::test]
async fn test_bad_input_is_reported_and_session_continues() -> Result<()> {
    let storage = MemoryStorage::new();
    let script = "\
9
1

2
ACC000404
1
Carol
2
ACC000001
1
abc
1
-5
2
10.999
3
5
ACC000001
3
5
ACC000777
5
8
7
6
";
    let out = run_script(&storage, script).await?;

    assert!(out.contains("Invalid choice, try again."));
    assert!(out.contains("Error: Owner name must not be empty"));
    assert!(out.contains("Error: Account not found: ACC000404"));
    assert!(out.contains("Error: 'abc' is not a valid amount"));
    assert!(out.contains("Error: Invalid amount -5.00: must be greater than zero"));
    assert!(out.contains("Error: '10.999' has more than two decimal places"));
    assert!(out.contains("Error: Cannot transfer from account ACC000001 to itself"));
    assert!(out.contains("Error: Account not found: ACC000777"));
    assert!(out.contains("Transaction history is empty"));
    assert!(out.contains("Returning to main menu..."));
    assert!(out.contains("Goodbye!"));

    let carol = storage.load(&AccountId::new("ACC000001")).await?;
    assert_eq!(carol.balance(), 0);
    assert!(carol.transactions().is_empty());
    Ok(())
}

#[tokio::test]
async fn test_end_of_input_ends_session() -> Result<()> {
    let storage = MemoryStorage::new();
    let out = run_script(&storage, "1\nAlice\n2\nACC000001\n").await?;
    assert!(out.contains("--- Account ACC000001 ---"));
    assert!(!out.contains("Goodbye!"));

    let empty = run_script(&MemoryStorage::new(), "").await?;
    assert!(empty.contains("--- Main menu ---"));
    Ok(())
}

#[tokio::test]
async fn test_exports_write_files() -> Result<()> {
    let temp = TempDir::new()?;
    let csv_path = temp.path().join("statement.csv");
    let json_path = temp.path().join("snapshot.json");
    let script = format!(
        "1\nAlice\n2\nACC000001\n1\n12.50\n6\n{}\n7\n5\n{}\n6\n",
        csv_path.display(),
        json_path.display()
    );

    let storage = MemoryStorage::new();
    let out = run_script(&storage, &script).await?;
    assert!(out.contains("Exported 1 transaction(s) to"));
    assert!(out.contains("Exported 1 account(s) to"));

    let csv = std::fs::read_to_string(&csv_path)?;
    let lines: Vec<_> = csv.lines().collect();
    assert_eq!(lines.len(), 2);
    assert_eq!(lines[0], "id,timestamp,kind,amount,counterparty,message");
    assert!(lines[1].starts_with("TX-ACC000001-000001,2024-06-01T09:00:00+00:00,DEPOSIT,12.50,,"));

    let snapshot: Snapshot = serde_json::from_str(&std::fs::read_to_string(&json_path)?)?;
    assert_eq!(snapshot.accounts.len(), 1);
    assert_eq!(snapshot.accounts[0].balance(), 1250);
    assert_eq!(snapshot.exported_at, fixed_time());
    Ok(())
}

#[tokio::test]
async fn test_export_to_unwritable_path_is_reported() -> Result<()> {
    let temp = TempDir::new()?;
    let bad_path = temp.path().join("missing-dir").join("out.json");
    let script = format!("5\n{}\n6\n", bad_path.display());

    let out = run_script(&MemoryStorage::new(), &script).await?;
    assert!(out.contains("Error: Failed to create"));
    assert!(out.contains("Goodbye!"));
    Ok(())
}
