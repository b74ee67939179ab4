//! opsrisk-runner: headless pipeline runner.
//!
//! Usage:
//!   opsrisk-runner --data customers.csv --query "Who needs attention today?"
//!   opsrisk-runner --synthetic 500 --seed 7 --feedback-log feedback.jsonl
//!   opsrisk-runner --db risk.db --import customers.csv --session ops-desk
//!
//! --import only fills an empty database; a populated one keeps its rows.
//!   opsrisk-runner --data customers.csv --config pipeline.json --json

use anyhow::Result;
use opsrisk_core::{
    agent::{names, AgentOutput},
    config::PipelineConfig,
    data_source::{CsvCustomerSource, CustomerSource},
    engine::{PipelineEngine, RunReport},
    feedback::{FeedbackSink, JsonlFeedbackSink, NullFeedbackSink},
    store::PipelineStore,
    synthetic::SyntheticPopulation,
};
use std::env;

const DEFAULT_QUERY: &str = "Who needs attention today?";

fn main() -> Result<()> {
    env_logger::init();

    let args: Vec<String> = env::args().collect();
    let seed = parse_arg(&args, "--seed", 42u64);
    let synthetic_size = parse_arg(&args, "--synthetic", 500usize);
    let json = args.iter().any(|a| a == "--json");
    let data = flag_value(&args, "--data");
    let db = flag_value(&args, "--db");
    let import = flag_value(&args, "--import");
    let feedback_log = flag_value(&args, "--feedback-log");
    let session = flag_value(&args, "--session");
    let query = flag_value(&args, "--query").unwrap_or(DEFAULT_QUERY);

    let config = match flag_value(&args, "--config") {
        Some(path) => PipelineConfig::load(path)?,
        None => PipelineConfig::default(),
    };

    let (source, feedback): (Box<dyn CustomerSource>, Box<dyn FeedbackSink>) = match (data, db) {
        (Some(path), _) => (Box::new(CsvCustomerSource::new(path)), Box::new(NullFeedbackSink)),
        (None, Some(path)) => {
            let mut store = PipelineStore::open(path)?;
            store.migrate()?;
            // Only an empty database is filled; later runs reuse its rows.
            if let Some(csv) = import {
                let records = CsvCustomerSource::new(csv).load()?;
                let written = store.insert_customers_if_empty(&records)?;
                log::info!("imported {written} of {} customers from {csv}", records.len());
            } else if store.customer_count()? == 0 {
                let records = SyntheticPopulation::new(seed, synthetic_size).generate();
                let written = store.insert_customers_if_empty(&records)?;
                log::info!("seeded {written} synthetic customers (seed={seed})");
            }
            // A second connection records feedback into the same file.
            let sink = store.reopen()?;
            (Box::new(store), Box::new(sink))
        }
        (None, None) => (
            Box::new(SyntheticPopulation::new(seed, synthetic_size)),
            Box::new(NullFeedbackSink),
        ),
    };
    let feedback: Box<dyn FeedbackSink> = match feedback_log {
        Some(path) => Box::new(JsonlFeedbackSink::new(path)),
        None => feedback,
    };

    let engine = PipelineEngine::build(config, source).with_feedback_sink(feedback);
    let report = engine.run(query, session)?;

    if json {
        println!("{}", serde_json::to_string_pretty(&report)?);
    } else {
        print_summary(&report);
    }

    Ok(())
}

fn print_summary(report: &RunReport) {
    let decision = &report.final_decision;

    println!("=== Pipeline run {} ===", report.run_id);
    println!("  query:       {}", report.query);
    println!("  intent:      {:?} / {:?}", report.intent.intent, report.intent.urgency);
    println!();

    println!("── Decision ──────────────────────────────");
    println!("  status:      {}", decision.overall_status.as_str());
    println!("  attention:   {}", decision.attention_required);
    if let Some(drivers) = &decision.primary_driver {
        println!("  drivers:     {}", drivers.join(", "));
    }
    println!("  confidence:  {:.2}", decision.confidence);
    println!("  summary:     {}", decision.summary);
    println!();

    println!("── Evaluators ────────────────────────────");
    for name in [names::OPERATIONS, names::FINANCE, names::CX] {
        if let Some(AgentOutput::Domain(d)) = report.agent_outputs.get(name) {
            println!(
                "  {name:<12} {:?} severity={} high={:.2} near={:.2}",
                d.status,
                d.severity.as_str(),
                d.high_risk_ratio,
                d.near_risk_ratio,
            );
        }
    }
    if let Some(AgentOutput::DataValidation(v)) = report.agent_outputs.get(names::DATA_VALIDATION) {
        println!(
            "  {:<12} trust={} issues={}",
            names::DATA_VALIDATION,
            v.data_trust.as_str(),
            v.issues_detected,
        );
    }
    if let Some(AgentOutput::Evaluation(e)) = report.agent_outputs.get(names::EVALUATION) {
        println!(
            "  {:<12} verdict={:?} confidence={:.2}",
            names::EVALUATION,
            e.verdict,
            e.decision_confidence,
        );
    }
    println!();

    println!("── Top customers today ───────────────────");
    for entry in &report.priority_ranking {
        println!(
            "  {:<10} score={:.3} driver={}",
            entry.customer_id, entry.priority_score, entry.primary_driver,
        );
    }
    println!();

    println!("── Watchlist ─────────────────────────────");
    for entry in &report.watchlist {
        println!(
            "  {:<10} overall={:.3} amplification={}",
            entry.customer_id, entry.overall_risk_score, entry.amplification_score,
        );
    }

    if let Some(summary) = &report.executive_summary {
        println!();
        println!("── Executive summary ─────────────────────");
        println!("  {}", summary.executive_summary);
    }
}

fn flag_value<'a>(args: &'a [String], flag: &str) -> Option<&'a str> {
    args.windows(2)
        .find(|w| w[0] == flag)
        .map(|w| w[1].as_str())
}

fn parse_arg<T: std::str::FromStr + Copy>(args: &[String], flag: &str, default: T) -> T {
    args.windows(2)
        .find(|w| w[0] == flag)
        .and_then(|w| w[1].parse().ok())
        .unwrap_or(default)
}
