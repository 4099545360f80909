use std::path::PathBuf;
use std::sync::Arc;

use bomcheck_recon::{
    reconcile, records_from_json, run, run_json, DuplicatePolicy, FieldMapping, KeySlot, KeySpec,
    ReconConfig, ReconError, ReconInput, ReconOptions, Record, RowStatus, Side,
};
use serde_json::{json, Value};

fn fixtures_dir() -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("tests/fixtures")
}

fn load_json(name: &str) -> Value {
    let path = fixtures_dir().join(name);
    let data = std::fs::read_to_string(&path)
        .unwrap_or_else(|e| panic!("cannot read {}: {e}", path.display()));
    serde_json::from_str(&data).unwrap()
}

fn scenario_config() -> ReconConfig {
    let toml = std::fs::read_to_string(fixtures_dir().join("scenario.recon.toml")).unwrap();
    ReconConfig::from_toml(&toml).unwrap()
}

fn scenario_input(left: Value, right: Value) -> ReconInput {
    ReconInput {
        left: records_from_json(Side::Left, &left).unwrap(),
        right: records_from_json(Side::Right, &right).unwrap(),
    }
}

// -------------------------------------------------------------------------
// Reference scenarios
// -------------------------------------------------------------------------

#[test]
fn scenario_a_single_match() {
    let input = scenario_input(
        json!([{"Kit": "1", "Pos": "A", "Item": "X", "Desc": "foo"}]),
        json!([{"KitItem": "1", "Position": "A", "ItemNo": "X", "Name": "foo"}]),
    );
    let report = run(&scenario_config(), &input).unwrap();

    assert_eq!(report.rows.len(), 1);
    let row = &report.rows[0];
    assert!(row.matched);
    assert_eq!(row.status, RowStatus::Matched);
    assert!(row.diff_fields.is_empty());
    assert!(row.left.is_some() && row.right.is_some());
}

#[test]
fn scenario_b_mismatch_flags_both_fields() {
    let input = scenario_input(
        json!([{"Kit": "1", "Pos": "A", "Item": "X", "Desc": "foo"}]),
        json!([{"KitItem": "1", "Position": "A", "ItemNo": "X", "Name": "bar"}]),
    );
    let report = run(&scenario_config(), &input).unwrap();

    assert_eq!(report.rows.len(), 1);
    let row = &report.rows[0];
    assert!(!row.matched);
    assert_eq!(row.status, RowStatus::Mismatched);
    let fields: Vec<&str> = row.diff_fields.iter().map(String::as_str).collect();
    assert_eq!(fields, vec!["Desc", "Name"]);
    assert_eq!(row.field_diffs.len(), 1);
    assert_eq!(row.field_diffs[0].left_value, "foo");
    assert_eq!(row.field_diffs[0].right_value, "bar");
}

#[test]
fn scenario_c_blank_left_row_excluded() {
    let input = scenario_input(
        json!([
            {"Kit": "", "Pos": "A", "Item": "", "Desc": "section"},
            {"Kit": "1", "Pos": "A", "Item": "X", "Desc": "foo"}
        ]),
        json!([{"KitItem": "1", "Position": "A", "ItemNo": "X", "Name": "foo"}]),
    );
    let report = run(&scenario_config(), &input).unwrap();

    assert_eq!(report.rows.len(), 1);
    assert!(report.rows[0].matched);
    assert_eq!(report.summary.left_excluded, 1);
}

#[test]
fn scenario_d_unmatched_right_record() {
    let input = scenario_input(
        json!([{"Kit": "1", "Pos": "A", "Item": "X", "Desc": "foo"}]),
        json!([
            {"KitItem": "1", "Position": "A", "ItemNo": "X", "Name": "foo"},
            {"KitItem": "2", "Position": "B", "ItemNo": "Y", "Name": "stray"}
        ]),
    );
    let report = run(&scenario_config(), &input).unwrap();

    assert_eq!(report.rows.len(), 2);
    let stray = &report.rows[1];
    assert_eq!(stray.status, RowStatus::RightOnly);
    assert!(stray.left.is_none());
    assert!(!stray.matched);
    assert!(stray.diff_fields.is_empty());
    assert_eq!(report.summary.right_only, 1);
}

#[test]
fn dedup_last_wins_keeps_latest_value() {
    let input = scenario_input(
        json!([
            {"Kit": "a", "Item": "", "AltItem": "", "Desc": "1"},
            {"Kit": "A", "Desc": "2"}
        ]),
        json!([]),
    );
    let report = run(&scenario_config(), &input).unwrap();

    assert_eq!(report.rows.len(), 1);
    assert_eq!(report.rows[0].left.as_ref().unwrap().text("Desc"), "2");
    assert_eq!(report.summary.left_duplicates_dropped, 1);
    assert_eq!(report.duplicates.len(), 1);
    assert_eq!(report.duplicates[0].side, Side::Left);
}

// -------------------------------------------------------------------------
// Built-in NPD vs BOM layout
// -------------------------------------------------------------------------

#[test]
fn npd_bom_fixture() {
    let report = run_json(
        &ReconConfig::npd_bom(),
        &load_json("npd.json"),
        &load_json("bom.json"),
    )
    .unwrap();

    assert_eq!(report.meta.config_name, "NPD vs BOM");
    assert_eq!(report.meta.engine_version, env!("CARGO_PKG_VERSION"));
    assert!(!report.meta.run_at.is_empty());

    let keys: Vec<&str> = report.rows.iter().map(|r| r.key.as_str()).collect();
    assert_eq!(
        keys,
        vec![
            "kit-100|10|h2m-001",
            "kit-100|20|h2m-002",
            "kit-100|30|h2m-003",
            "kit-200|10|h2m-010",
            "kit-300|10|h2m-099",
        ]
    );

    let statuses: Vec<RowStatus> = report.rows.iter().map(|r| r.status).collect();
    assert_eq!(
        statuses,
        vec![
            RowStatus::Matched,
            RowStatus::Mismatched,
            RowStatus::Matched,
            RowStatus::LeftOnly,
            RowStatus::RightOnly,
        ]
    );

    // Fallback item column and the qty difference
    let washer = &report.rows[1];
    assert!(washer.is_diff_field("Kit Qty"));
    assert!(washer.is_diff_field("Quantity"));
    assert_eq!(washer.diff_fields.len(), 2);

    // The later nut record won and sits at the first nut's position
    let nut = report.rows[2].left.as_ref().unwrap();
    assert_eq!(nut.text("Description"), "Nut M8 nylock");

    let s = &report.summary;
    assert_eq!(s.left_records, 6);
    assert_eq!(s.right_records, 4);
    assert_eq!(s.left_excluded, 1);
    assert_eq!(s.left_duplicates_dropped, 1);
    assert_eq!(s.right_duplicates_dropped, 0);
    assert_eq!(s.total_rows, 5);
    assert_eq!(s.problems(), 3);
}

#[test]
fn report_serializes_to_json() {
    let report = run_json(
        &ReconConfig::npd_bom(),
        &load_json("npd.json"),
        &load_json("bom.json"),
    )
    .unwrap();
    let value = serde_json::to_value(&report).unwrap();

    assert_eq!(value["meta"]["left_label"], "NPD");
    assert_eq!(value["summary"]["mismatched"], 1);
    assert_eq!(value["rows"][1]["status"], "mismatched");
    assert_eq!(value["rows"][3]["right"], Value::Null);
    assert_eq!(value["rows"][0]["left"]["Kit Qty"], json!(4));
}

#[test]
fn json_input_keeps_column_order() {
    let report = run_json(
        &ReconConfig::npd_bom(),
        &json!([{"Kit #": "K", "Item #": "I", "Description": "d", "Alpha": "a"}]),
        &json!([]),
    )
    .unwrap();

    let left = report.rows[0].left.as_ref().unwrap();
    assert_eq!(
        left.columns().collect::<Vec<_>>(),
        vec!["Kit #", "Item #", "Description", "Alpha"]
    );

    let text = serde_json::to_string(&report.rows[0]).unwrap();
    let kit = text.find("\"Kit #\"").unwrap();
    let alpha = text.find("\"Alpha\"").unwrap();
    assert!(kit < alpha, "{text}");
}

// -------------------------------------------------------------------------
// Right-side duplicate policies
// -------------------------------------------------------------------------

fn duplicate_right() -> (Vec<Record>, Vec<Record>) {
    let left = records_from_json(
        Side::Left,
        &json!([{"Kit": "1", "Item": "x", "Desc": "new"}]),
    )
    .unwrap();
    let right = records_from_json(
        Side::Right,
        &json!([
            {"KitItem": "1", "ItemNo": "x", "Name": "old"},
            {"KitItem": "1", "ItemNo": "X", "Name": "new"}
        ]),
    )
    .unwrap();
    (left, right)
}

fn scenario_keys() -> (KeySpec, KeySpec) {
    let config = scenario_config();
    (config.left.key, config.right.key)
}

#[test]
fn right_duplicates_policies() {
    let (left, right) = duplicate_right();
    let (lk, rk) = scenario_keys();
    let mappings = [FieldMapping::new("Desc", "Name")];

    let last = reconcile(&left, &right, &lk, &rk, &mappings, &ReconOptions::default()).unwrap();
    assert_eq!(last.rows.len(), 1);
    assert!(last.rows[0].matched);
    assert_eq!(last.summary.right_duplicates_dropped, 1);

    let carry = ReconOptions {
        right_duplicates: DuplicatePolicy::CarryForward,
        ..ReconOptions::default()
    };
    let carried = reconcile(&left, &right, &lk, &rk, &mappings, &carry).unwrap();
    assert_eq!(carried.rows.len(), 2);
    assert_eq!(carried.rows[1].status, RowStatus::RightOnly);
    assert_eq!(carried.rows[1].right.as_ref().unwrap().text("Name"), "old");
    assert_eq!(carried.summary.right_duplicates_dropped, 0);

    let reject = ReconOptions {
        right_duplicates: DuplicatePolicy::Reject,
        ..ReconOptions::default()
    };
    let err = reconcile(&left, &right, &lk, &rk, &mappings, &reject).unwrap_err();
    assert!(matches!(err, ReconError::DuplicateKeys(ref d) if d.len() == 1));
    assert!(err.to_string().contains("1|"));
}

#[test]
fn duplicates_policy_from_toml() {
    let toml = std::fs::read_to_string(fixtures_dir().join("scenario.recon.toml"))
        .unwrap()
        .replace("duplicates = \"last_wins\"", "duplicates = \"reject\"");
    let config = ReconConfig::from_toml(&toml).unwrap();
    let (left, right) = duplicate_right();
    let err = run(&config, &ReconInput { left, right }).unwrap_err();
    assert!(matches!(err, ReconError::DuplicateKeys(_)));
}

// -------------------------------------------------------------------------
// Errors
// -------------------------------------------------------------------------

#[test]
fn malformed_input_fails_whole_call() {
    let config = scenario_config();
    let err = run_json(
        &config,
        &json!([{"Kit": "1", "Item": "x"}, {"Kit": {"nested": true}}]),
        &json!([]),
    )
    .unwrap_err();
    assert!(err.is_invalid_input());
    assert!(matches!(err, ReconError::InvalidInput { side: Side::Left, index: 1, .. }));

    let err = run_json(&config, &json!({"Kit": "1"}), &json!([])).unwrap_err();
    assert!(matches!(err, ReconError::InvalidSequence { side: Side::Left, .. }));
}

#[test]
fn empty_key_slot_rejected_before_processing() {
    let left_key = KeySpec::new(
        KeySlot::single("Kit"),
        KeySlot::new([" "]),
        KeySlot::single("Item"),
    );
    let (_, rk) = scenario_keys();
    let err = reconcile(&[], &[], &left_key, &rk, &[], &ReconOptions::default()).unwrap_err();
    assert!(err.is_configuration());
}

#[test]
fn empty_inputs_are_not_an_error() {
    let report = run(&scenario_config(), &ReconInput::default()).unwrap();
    assert!(report.rows.is_empty());
    assert!(report.summary.is_clean());
}

// -------------------------------------------------------------------------
// Concurrency
// -------------------------------------------------------------------------

#[test]
fn concurrent_calls_share_inputs() {
    let config = Arc::new(ReconConfig::npd_bom());
    let input = Arc::new(ReconInput {
        left: records_from_json(Side::Left, &load_json("npd.json")).unwrap(),
        right: records_from_json(Side::Right, &load_json("bom.json")).unwrap(),
    });
    let expected = run(&config, &input).unwrap().rows;

    let handles: Vec<_> = (0..8)
        .map(|_| {
            let config = Arc::clone(&config);
            let input = Arc::clone(&input);
            std::thread::spawn(move || run(&config, &input).unwrap().rows)
        })
        .collect();

    for h in handles {
        assert_eq!(h.join().unwrap(), expected);
    }
}
