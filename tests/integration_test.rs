//! Integration tests for uniqflow.
#![allow(
    clippy::panic,
    clippy::unwrap_used,
    clippy::expect_used,
    clippy::too_many_lines,
    clippy::redundant_closure_for_method_calls
)]

use std::fs;
use std::num::NonZeroUsize;
use tempfile::TempDir;
use test_case::test_case;
use uniqflow::io::{FileSink, Format, create_record_writer, read_records};
use uniqflow::{
    BatchSupplier, DeduplicationConfig, Error, InMemoryQueue, MemorySink, Record, RetentionPolicy,
    UniqueProcessor, UniqflowConfig,
};

/// F0, F1 share `custom_id` 1; F2 has `custom_id` 2.
fn flowfiles() -> Vec<Record> {
    vec![
        Record::with_id("F0")
            .with_attribute("custom_id", "1")
            .with_attribute("custom_value", "123"),
        Record::with_id("F1")
            .with_attribute("custom_id", "1")
            .with_attribute("custom_value", "456"),
        Record::with_id("F2")
            .with_attribute("custom_id", "2")
            .with_attribute("custom_value", "789"),
    ]
}

fn ids(records: &[Record]) -> Vec<&str> {
    records.iter().map(|r| r.id.as_str()).collect()
}

#[test_case(RetentionPolicy::RetainFirst, &["F0", "F2"], "123", &["F1"]; "retain first")]
#[test_case(RetentionPolicy::RetainLast, &["F1", "F2"], "456", &["F0"]; "retain last")]
fn test_end_to_end_custom_id(
    policy: RetentionPolicy,
    success: &[&str],
    first_value: &str,
    removed: &[&str],
) {
    let processor = UniqueProcessor::new(
        DeduplicationConfig::default()
            .with_unique_key("${custom_id}")
            .with_policy(policy)
            .with_bulk_size(0),
    )
    .unwrap();
    let mut queue: InMemoryQueue = flowfiles().into_iter().collect();
    let mut sink = MemorySink::new();

    let summary = processor
        .on_trigger(&mut queue, &mut sink)
        .unwrap()
        .expect("batch should not be empty");

    assert_eq!(ids(&sink.success), success);
    assert_eq!(sink.success[0].attribute("custom_value"), Some(first_value));
    assert_eq!(ids(&sink.removed), removed);
    assert!(sink.failure.is_empty());
    assert_eq!(summary.original, 3);
    assert!(summary.is_consistent());
    assert_eq!(queue.pending(), 0);
}

#[test]
fn test_payload_passes_through_untouched() {
    let processor = UniqueProcessor::new(
        DeduplicationConfig::default().with_unique_key("${custom_id}"),
    )
    .unwrap();
    let mut queue: InMemoryQueue = flowfiles()
        .into_iter()
        .map(|r| r.with_content("body"))
        .collect();
    let mut sink = MemorySink::new();

    processor.on_trigger(&mut queue, &mut sink).unwrap();

    assert!(
        sink.success
            .iter()
            .chain(&sink.removed)
            .all(|r| r.content.as_deref() == Some("body"))
    );
}

#[test]
fn test_composite_key() {
    let processor = UniqueProcessor::new(
        DeduplicationConfig::default().with_unique_key("${region}/${sku}"),
    )
    .unwrap();
    let mut queue: InMemoryQueue = vec![
        Record::with_id("a")
            .with_attribute("region", "eu")
            .with_attribute("sku", "1"),
        Record::with_id("b")
            .with_attribute("region", "us")
            .with_attribute("sku", "1"),
        Record::with_id("c")
            .with_attribute("region", "eu")
            .with_attribute("sku", "1"),
        // Both references missing renders "/", which is not blank.
        Record::with_id("d"),
    ]
    .into_iter()
    .collect();
    let mut sink = MemorySink::new();

    processor.on_trigger(&mut queue, &mut sink).unwrap();

    assert_eq!(ids(&sink.success), vec!["a", "b", "d"]);
    assert_eq!(ids(&sink.removed), vec!["c"]);
}

#[test]
fn test_bulk_size_leaves_remainder_queued() {
    let processor = UniqueProcessor::new(
        DeduplicationConfig::default()
            .with_unique_key("${custom_id}")
            .with_bulk_size(2),
    )
    .unwrap();
    assert_eq!(processor.batch_limit(), NonZeroUsize::new(2));

    let mut queue: InMemoryQueue = flowfiles().into_iter().collect();
    let mut sink = MemorySink::new();

    let first = processor.on_trigger(&mut queue, &mut sink).unwrap().unwrap();
    assert_eq!(first.original, 2);
    assert_eq!(queue.pending(), 1);
    assert_eq!(ids(&sink.success), vec!["F0"]);

    let second = processor.on_trigger(&mut queue, &mut sink).unwrap().unwrap();
    assert_eq!(second.original, 1);
    assert_eq!(ids(&sink.success), vec!["F0", "F2"]);

    assert!(processor.on_trigger(&mut queue, &mut sink).unwrap().is_none());
}

#[test]
fn test_invalid_configuration_is_rejected() {
    for key in ["", "   ", "${custom_id", "${}"] {
        let result = UniqueProcessor::new(DeduplicationConfig::default().with_unique_key(key));
        assert!(
            matches!(result, Err(Error::InvalidInput(_))),
            "expected {key:?} to be rejected"
        );
    }
}

#[test]
fn test_file_round_trip() {
    let dir = TempDir::new().unwrap();
    let input = dir.path().join("input.csv");
    fs::write(
        &input,
        "id,custom_id,custom_value\nF0,1,123\nF1,1,456\nF2,2,789\nF3,,000\n",
    )
    .unwrap();

    let records = read_records(fs::read_to_string(&input).unwrap().as_bytes(), Format::Csv)
        .unwrap();
    assert_eq!(records.len(), 4);

    let success_path = dir.path().join("success.json");
    let failure_path = dir.path().join("failure.yaml");
    let removed_path = dir.path().join("removed.csv");

    let mut sink = FileSink::new(create_record_writer(
        fs::File::create(&success_path).unwrap(),
        Format::Json,
    ))
    .with_failure(create_record_writer(
        fs::File::create(&failure_path).unwrap(),
        Format::Yaml,
    ))
    .with_removed(create_record_writer(
        fs::File::create(&removed_path).unwrap(),
        Format::Csv,
    ));

    let processor = UniqueProcessor::new(
        DeduplicationConfig::default()
            .with_unique_key("${custom_id}")
            .with_retain_first(false),
    )
    .unwrap();
    let mut queue: InMemoryQueue = records.into_iter().collect();
    let run = processor.run_until_drained(&mut queue, &mut sink).unwrap();
    let counts = sink.finish().unwrap();

    assert_eq!(run.batches, 1);
    assert_eq!((run.kept, run.removed, run.errored), (2, 1, 1));
    assert_eq!(
        (counts.success, counts.failure, counts.removed),
        (2, 1, 1)
    );

    let success = read_records(
        fs::read_to_string(&success_path).unwrap().as_bytes(),
        Format::Json,
    )
    .unwrap();
    assert_eq!(ids(&success), vec!["F1", "F2"]);

    let failure = read_records(
        fs::read_to_string(&failure_path).unwrap().as_bytes(),
        Format::Yaml,
    )
    .unwrap();
    assert_eq!(ids(&failure), vec!["F3"]);
    assert_eq!(failure[0].attribute("custom_value"), Some("000"));

    let removed = read_records(
        fs::read_to_string(&removed_path).unwrap().as_bytes(),
        Format::Csv,
    )
    .unwrap();
    assert_eq!(ids(&removed), vec!["F0"]);
}

#[test]
fn test_tab_separated_file_deduplicated_on_id_column() {
    let dir = TempDir::new().unwrap();
    let input = dir.path().join("orders.tsv");
    fs::write(&input, "id\tname\n7\ta\n7\tb\n8\tc\n").unwrap();

    let format = Format::from_path(&input).unwrap();
    assert_eq!(format, Format::Tsv);
    let records = read_records(fs::read_to_string(&input).unwrap().as_bytes(), format).unwrap();

    let processor =
        UniqueProcessor::new(DeduplicationConfig::default().with_unique_key("${id}")).unwrap();
    let mut queue: InMemoryQueue = records.into_iter().collect();
    let mut sink = MemorySink::new();
    let run = processor.run_until_drained(&mut queue, &mut sink).unwrap();

    assert_eq!((run.kept, run.removed, run.errored), (2, 1, 0));
    assert_eq!(ids(&sink.success), vec!["7", "8"]);
    assert_eq!(sink.removed[0].attribute("name"), Some("b"));
}

#[test]
fn test_config_file_drives_processor() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("config.toml");
    fs::write(
        &path,
        "[dedup]\nunique_key = \"${custom_id}\"\nretain_first = false\n",
    )
    .unwrap();

    let config = UniqflowConfig::load_from_file(&path).unwrap();
    let processor = UniqueProcessor::new(config.dedup).unwrap();
    assert_eq!(processor.policy(), RetentionPolicy::RetainLast);

    let mut queue: InMemoryQueue = flowfiles().into_iter().collect();
    let mut sink = MemorySink::new();
    processor.run_until_drained(&mut queue, &mut sink).unwrap();

    assert_eq!(ids(&sink.success), vec!["F1", "F2"]);
}

#[test]
fn test_error_types() {
    let err = Error::InvalidInput("test message".to_string());
    let display = format!("{err}");
    assert!(display.contains("invalid input"));
    assert!(display.contains("test message"));

    let err = Error::OperationFailed {
        operation: "read".to_string(),
        cause: "file not found".to_string(),
    };
    let display = format!("{err}");
    assert!(display.contains("read"));
    assert!(display.contains("file not found"));
}
