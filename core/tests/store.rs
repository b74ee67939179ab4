//! SQLite customer table, the feedback log and the other feedback sinks.

use opsrisk_core::{
    data_source::{CustomerRecord, CustomerSource},
    feedback::{FeedbackEntry, FeedbackPayload, FeedbackSink, JsonlFeedbackSink, MemoryFeedbackSink},
    store::PipelineStore,
    synthesis_agent::{synthesize, OverallStatus},
    synthetic::SyntheticPopulation,
};

fn store() -> PipelineStore {
    let store = PipelineStore::in_memory().expect("in-memory store");
    store.migrate().expect("migration");
    store
}

fn entry(run_id: &str, session: Option<&str>) -> FeedbackEntry {
    let decision = synthesize(&Default::default());
    FeedbackEntry::new(
        run_id.into(),
        session.map(str::to_string),
        FeedbackPayload::snapshot(&decision),
    )
}

#[test]
fn migration_is_idempotent() {
    let store = store();
    store.migrate().expect("second migration");
    assert_eq!(store.customer_count().expect("count"), 0);
}

#[test]
fn customers_round_trip_in_insertion_order() {
    let mut store = store();
    let records = SyntheticPopulation::new(3, 25).generate();
    store.insert_customers(&records).expect("insert");

    assert_eq!(store.customer_count().expect("count"), 25);
    let loaded = store.load_customers().expect("load");
    assert_eq!(loaded, records);
}

#[test]
fn store_is_a_customer_source() {
    let store = store();
    store
        .insert_customer(&CustomerRecord {
            customer_id:        "C-1".into(),
            monthly_usage_kwh:  300.0,
            peak_usage_kwh:     330.0,
            avg_outage_hours:   1.5,
            last_bill_amount:   88.0,
            payment_delay_days: 0.0,
            service_tickets:    1.0,
        })
        .expect("insert");

    let source: &dyn CustomerSource = &store;
    assert_eq!(source.describe(), "sqlite(:memory:)");
    let rows = source.load().expect("load");
    assert_eq!(rows.len(), 1);
    assert_eq!(rows[0].customer_id, "C-1");
}

#[test]
fn duplicate_customer_id_is_rejected() {
    let mut store = store();
    let records = SyntheticPopulation::new(3, 2).generate();
    store.insert_customers(&records).expect("insert");
    assert!(store.insert_customer(&records[0]).is_err());
    assert_eq!(store.customer_count().expect("count"), 2);
}

#[test]
fn second_import_leaves_the_table_alone() {
    let mut store = store();
    let first = SyntheticPopulation::new(3, 10).generate();
    assert_eq!(store.insert_customers_if_empty(&first).expect("first import"), 10);

    // Same ids again: a plain insert would hit the unique constraint.
    assert_eq!(store.insert_customers_if_empty(&first).expect("second import"), 0);
    let other = SyntheticPopulation::new(4, 5).generate();
    assert_eq!(store.insert_customers_if_empty(&other).expect("third import"), 0);

    assert_eq!(store.load_customers().expect("load"), first);
}

#[test]
fn feedback_log_only_grows() {
    let store = store();
    store.append_feedback(&entry("run-a", Some("desk"))).expect("append");
    store.append_feedback(&entry("run-b", None)).expect("append");
    store.append(&entry("run-a", Some("desk"))).expect("append via sink");

    assert_eq!(store.feedback_count().expect("count"), 3);

    let run_a = store.feedback_for_run("run-a").expect("read");
    assert_eq!(run_a.len(), 2);
    assert!(run_a.iter().all(|e| e.session_id.as_deref() == Some("desk")));
    assert_eq!(
        run_a[0].feedback.final_decision_snapshot.overall_status,
        OverallStatus::Unknown
    );
    assert_eq!(run_a[0].feedback.human_override, None);

    let recent = store.recent_feedback(1).expect("recent");
    assert_eq!(recent.len(), 1);
    assert_eq!(recent[0].run_id, "run-a");
}

#[test]
fn reopened_memory_store_shares_one_database() {
    let store = store();
    let sink = store.reopen().expect("reopen");
    sink.append(&entry("run-m", None)).expect("append via second connection");
    assert_eq!(store.feedback_count().expect("count"), 1);
    assert_eq!(store.feedback_for_run("run-m").expect("read").len(), 1);

    let other = PipelineStore::open(":memory:").expect("open");
    other.migrate().expect("migrate");
    assert_eq!(other.feedback_count().expect("count"), 0, "separate stores stay separate");
    assert_eq!(other.describe(), "sqlite(:memory:)");
}

#[test]
fn stored_entry_keeps_its_timestamp() {
    let store = store();
    let original = entry("run-t", None);
    store.append_feedback(&original).expect("append");
    let read = store.feedback_for_run("run-t").expect("read");
    assert_eq!(read, vec![original]);
}

#[test]
fn jsonl_sink_appends_one_line_per_entry() {
    let path = std::env::temp_dir()
        .join(format!("opsrisk-feedback-{}", uuid::Uuid::new_v4()))
        .join("feedback.jsonl");
    let sink = JsonlFeedbackSink::new(&path);

    sink.append(&entry("run-1", None)).expect("first");
    sink.append(&entry("run-2", Some("s"))).expect("second");

    let content = std::fs::read_to_string(&path).expect("read back");
    let lines: Vec<&str> = content.lines().collect();
    assert_eq!(lines.len(), 2);
    let second: FeedbackEntry = serde_json::from_str(lines[1]).expect("valid json");
    assert_eq!(second.run_id, "run-2");
    assert_eq!(second.session_id.as_deref(), Some("s"));

    if let Some(dir) = path.parent() {
        let _ = std::fs::remove_dir_all(dir);
    }
}

#[test]
fn memory_sink_clones_share_entries() {
    let sink = MemoryFeedbackSink::new();
    let handle = sink.clone();
    sink.append(&entry("run-1", None)).expect("append");
    assert_eq!(handle.entries().len(), 1);
}
