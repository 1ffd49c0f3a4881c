use assert_cmd::cargo_bin;
use assert_cmd::prelude::*;
use predicates::prelude::*;
use std::process::Command;

mod common;

#[test]
fn test_large_ledger() {
    let dir = tempfile::tempdir().unwrap();
    let ledger = dir.path().join("large_ledger.csv");
    // Each payer covers a third of the rows, so everyone ends up even.
    common::generate_ledger(&ledger, 30_000).expect("Failed to generate ledger");

    let mut cmd = Command::new(cargo_bin!("teamtab"));
    cmd.arg("report")
        .arg(&ledger)
        .arg("--roster")
        .arg(common::ROSTER)
        .env("RUST_LOG", "warn");

    cmd.assert()
        .success()
        .stdout(predicate::str::contains("1,Alice Doe,0.00"))
        .stdout(predicate::str::ends_with("payer_id,receiver_id,from,to,amount\n"));
}
