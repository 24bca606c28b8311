mod common;

use assert_cmd::Command;
use predicates::{prelude::*, str::contains};

use common::{CUSTOMERS_CSV, ORDERS_CSV, TestWorkspace};

fn csvquery() -> Command {
    Command::cargo_bin("csvquery").expect("binary exists")
}

#[test]
fn query_writes_csv_to_stdout() {
    let ws = TestWorkspace::new();
    let orders = ws.write("orders.csv", ORDERS_CSV);
    csvquery()
        .args([
            "query",
            "-q",
            "SELECT id, discount FROM orders ORDER BY id DESC",
            orders.to_str().unwrap(),
        ])
        .assert()
        .success()
        .stdout("id,discount\n3,10\n2,\n1,5\n");
}

#[test]
fn query_writes_output_file() {
    let ws = TestWorkspace::new();
    let orders = ws.write("orders.csv", ORDERS_CSV);
    let customers = ws.write("customers.csv", CUSTOMERS_CSV);
    let output = ws.path().join("out.csv");
    csvquery()
        .args([
            "query",
            "-q",
            "SELECT c.city, o.amount FROM orders o JOIN customers c USING (customer) ORDER BY o.amount",
            "-o",
            output.to_str().unwrap(),
            orders.to_str().unwrap(),
            customers.to_str().unwrap(),
        ])
        .assert()
        .success();
    let written = std::fs::read_to_string(&output).expect("read output");
    assert_eq!(written, "city,amount\nBerlin,13.37\nRome,42\nParis,1200.5\n");
}

#[test]
fn tab_separated_inputs_are_detected_by_extension() {
    let ws = TestWorkspace::new();
    let data = ws.write("scores.tsv", "name\tscore\nann\t1e3\nbo\t2\n");
    csvquery()
        .args([
            "query",
            "-q",
            "SELECT name, score FROM scores ORDER BY score",
            data.to_str().unwrap(),
        ])
        .assert()
        .success()
        .stdout("name,score\nbo,2\nann,1000\n");
}

#[test]
fn query_errors_exit_non_zero_with_engine_message() {
    let ws = TestWorkspace::new();
    let orders = ws.write("orders.csv", ORDERS_CSV);
    csvquery()
        .args([
            "query",
            "-q",
            "SELECT * FROM nowhere",
            orders.to_str().unwrap(),
        ])
        .assert()
        .failure()
        .stderr(contains("no such table: nowhere"));
}

#[test]
fn strict_rows_flag_fails_the_load() {
    let ws = TestWorkspace::new();
    let customers = ws.write("customers.csv", CUSTOMERS_CSV);
    csvquery()
        .args([
            "query",
            "--strict-rows",
            "-q",
            "SELECT 1",
            customers.to_str().unwrap(),
        ])
        .assert()
        .failure()
        .stderr(contains("different number of columns"));
}

#[test]
fn console_reports_tables_and_runs_queries() {
    let ws = TestWorkspace::new();
    let orders = ws.write("orders.csv", ORDERS_CSV);
    csvquery()
        .args(["console", orders.to_str().unwrap()])
        .write_stdin("SELECT COUNT(*) AS n FROM orders\nSELECT * FROM missing\nSELECT 2 AS two\n\n")
        .assert()
        .success()
        .stdout(contains("loaded into table 'orders'"))
        .stdout(contains("SQL Interactive Console"))
        .stdout(contains("n\n3\n"))
        .stdout(contains("two\n2\n"))
        .stderr(contains("no such table: missing"));
}

#[test]
fn console_stops_at_eof_marker() {
    let ws = TestWorkspace::new();
    let orders = ws.write("orders.csv", ORDERS_CSV);
    csvquery()
        .args(["console", orders.to_str().unwrap()])
        .write_stdin("EOF\nSELECT 5 AS five\n")
        .assert()
        .success()
        .stdout(contains("five").not());
}

#[test]
fn probe_prints_inferred_schema_as_json() {
    let ws = TestWorkspace::new();
    let orders = ws.write("orders.csv", ORDERS_CSV);
    let customers = ws.write("customers.csv", CUSTOMERS_CSV);
    let output = csvquery()
        .args([
            "probe",
            "--generic-table-names",
            orders.to_str().unwrap(),
            customers.to_str().unwrap(),
        ])
        .output()
        .expect("run probe");
    assert!(output.status.success());
    let report: serde_json::Value = serde_json::from_slice(&output.stdout).expect("json");
    assert_eq!(report[0]["table"]["name"], "csv");
    assert_eq!(report[1]["table"]["name"], "csv2");
    let types: Vec<_> = report[0]["table"]["columns"]
        .as_array()
        .expect("columns")
        .iter()
        .map(|c| c["datatype"].as_str().unwrap().to_string())
        .collect();
    assert_eq!(types, ["Integer", "Text", "Float", "Integer"]);
    assert_eq!(report[1]["table"]["columns"][2]["name"], "city2");
}

#[test]
fn unknown_input_encoding_is_rejected() {
    let ws = TestWorkspace::new();
    let orders = ws.write("orders.csv", ORDERS_CSV);
    csvquery()
        .args([
            "probe",
            "--input-encoding",
            "klingon",
            orders.to_str().unwrap(),
        ])
        .assert()
        .failure()
        .stderr(contains("Unknown encoding 'klingon'"));
}
