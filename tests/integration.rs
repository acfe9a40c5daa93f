//! Integration tests for the stream store.

use proptest::prelude::*;
use serde_json::json;
use streamlog::{Command, EntryId, Fields, ReadRequest, Reply, StreamStore, Watermark};

fn fields(value: serde_json::Value) -> Fields {
    serde_json::from_value(value).unwrap()
}

// --- Realistic Workflow Tests ---

#[test]
fn test_explicit_timestamp_scenario() {
    let store = StreamStore::default();

    let first = store.append("X", fields(json!({"a": "1"})), Some(1000));
    let second = store.append("X", fields(json!({"a": "2"})), Some(1000));

    assert_eq!(first.to_string(), "1000-0");
    assert_eq!(second.to_string(), "1000-1");
    assert_eq!(store.len("X"), 2);

    let range = store.range("X", 1);
    assert_eq!(range.len(), 1);
    assert_eq!(range[0].id, first);
    assert_eq!(range[0].fields["a"], "1");
}

#[test]
fn test_full_cycle_on_single_stream() {
    let store = StreamStore::default();
    assert_eq!(store.len("race"), 0);

    let riders = [
        json!({"rider": "Castilla", "speed": 30.2, "position": 1, "location_id": 1}),
        json!({"rider": "Norem", "speed": 28.8, "position": 3, "location_id": 1}),
        json!({"rider": "Prickett", "speed": 29.7, "position": 2, "location_id": 1}),
    ];
    for rider in &riders {
        store.append("race", fields(rider.clone()), None);
    }
    assert_eq!(store.len("race"), 3);

    let range = store.range("race", 10);
    assert_eq!(range.len(), 3);
    for (entry, rider) in range.iter().zip(&riders) {
        assert_eq!(serde_json::Value::Object(entry.fields.clone()), *rider);
    }

    let requests = vec![ReadRequest::new("race", Watermark::After(range[0].id))];
    let result = store.read(&requests, 10);
    assert_eq!(result.len(), 1);
    assert_eq!(result[0].entries.len(), 2);
    assert_eq!(result[0].entries[0].fields["rider"], "Norem");
    assert_eq!(result[0].entries[1].fields["rider"], "Prickett");
}

#[test]
fn test_multi_stream_read_then_new_entries() {
    let store = StreamStore::default();
    store.append("multi-a", fields(json!({"stream": "A", "value": 1})), None);
    store.append("multi-b", fields(json!({"stream": "B", "value": 1})), None);

    let requests = ReadRequest::pair(&["multi-a", "multi-b"], &["0-0", "0-0"]).unwrap();
    let result = store.read(&requests, 10);
    assert_eq!(result.len(), 2);
    assert_eq!(result[0].stream, "multi-a");
    assert_eq!(result[1].stream, "multi-b");

    let last_a = result[0].entries[0].id;
    let last_b = result[1].entries[0].id;

    store.append("multi-a", fields(json!({"stream": "A", "value": 2})), None);

    let requests = vec![
        ReadRequest::new("multi-a", Watermark::After(last_a)),
        ReadRequest::new("multi-b", Watermark::After(last_b)),
    ];
    let result = store.read(&requests, 10);
    assert_eq!(result.len(), 1);
    assert_eq!(result[0].stream, "multi-a");
    assert_eq!(result[0].entries.len(), 1);
    assert_eq!(result[0].entries[0].fields["value"], 2);
}

#[test]
fn test_latest_after_populating_returns_nothing() {
    let store = StreamStore::default();
    // Same millisecond, more than ten entries: sequence digits grow.
    for i in 0..25 {
        store.append("S", fields(json!({"i": i})), Some(5));
    }

    let requests = vec![ReadRequest::new("S", Watermark::Latest)];
    assert!(store.read(&requests, 100).is_empty());
}

#[test]
fn test_latest_after_backwards_timestamps_returns_nothing() {
    let store = StreamStore::default();
    store.append("S", fields(json!({"n": 1})), Some(2000));
    store.append("S", fields(json!({"n": 2})), Some(1000));

    let requests = ReadRequest::pair(&["S"], &["$"]).unwrap();
    assert!(store.read(&requests, 100).is_empty());
}

#[test]
fn test_latest_on_unknown_stream_returns_nothing() {
    let store = StreamStore::default();
    store.append("other", Fields::new(), None);
    let requests = ReadRequest::pair(&["S", "other"], &["$", "$"]).unwrap();
    assert!(store.read(&requests, 100).is_empty());
}

#[test]
fn test_read_from_zero_returns_everything() {
    let store = StreamStore::default();
    for i in 0..12 {
        store.append("S", fields(json!({"i": i})), None);
    }

    let requests = ReadRequest::pair(&["S"], &["0-0"]).unwrap();
    let result = store.read(&requests, 100);
    assert_eq!(result[0].entries.len(), 12);
    assert_eq!(result[0].entries, store.range("S", 100));
}

#[test]
fn test_ids_order_numerically_across_digit_lengths() {
    let store = StreamStore::default();
    store.append("S", fields(json!({"n": 9})), Some(9));
    store.append("S", fields(json!({"n": 10})), Some(10));

    let requests = vec![ReadRequest::new("S", Watermark::After(EntryId::new(9, 0)))];
    let result = store.read(&requests, 10);
    assert_eq!(result[0].entries.len(), 1);
    assert_eq!(result[0].entries[0].id.to_string(), "10-1");
}

#[test]
fn test_read_count_caps_each_stream() {
    let store = StreamStore::default();
    for _ in 0..5 {
        store.append("a", Fields::new(), None);
        store.append("b", Fields::new(), None);
    }

    let requests = ReadRequest::pair(&["a", "b"], &["0", "0"]).unwrap();
    let result = store.read(&requests, 2);
    assert!(result.iter().all(|r| r.entries.len() == 2));
}

// --- Command Round Trips ---

#[test]
fn test_commands_produce_wire_shapes() {
    let store = StreamStore::default();

    let added = store.execute(Command::append("X", br#"{"a": "1"}"#, Some("1000")).unwrap());
    assert_eq!(serde_json::to_value(&added).unwrap(), json!({"id": "1000-0"}));

    let range = store.execute(Command::range("X", Some("10")).unwrap());
    assert_eq!(
        serde_json::to_value(&range).unwrap(),
        json!([{"id": "1000-0", "fields": {"a": "1"}}])
    );

    let len = store.execute(Command::len("X"));
    assert_eq!(serde_json::to_value(&len).unwrap(), json!({"length": 1}));

    let read = store.execute(Command::read(Some("X 0-0"), None).unwrap());
    assert_eq!(
        serde_json::to_value(&read).unwrap(),
        json!([["X", [{"id": "1000-0", "fields": {"a": "1"}}]]])
    );

    let latest = store.execute(Command::read(Some("X $"), None).unwrap());
    assert_eq!(latest, Reply::Streams(Vec::new()));
    assert_eq!(serde_json::to_value(&latest).unwrap(), json!([]));
}

#[test]
fn test_read_on_unknown_stream_does_not_create_it() {
    let store = StreamStore::default();
    let reply = store.execute(Command::read(Some("ghost 0-0"), None).unwrap());

    assert_eq!(reply, Reply::Streams(Vec::new()));
    assert_eq!(store.execute(Command::len("ghost")), Reply::Length { length: 0 });
    assert!(store.stream_names().is_empty());
}

proptest! {
    #[test]
    fn prop_range_returns_min_of_count_and_length(appends in 0usize..60, count in 0usize..100) {
        let store = StreamStore::default();
        for i in 0..appends {
            store.append("p", fields(json!({"i": i})), None);
        }

        let range = store.range("p", count);
        prop_assert_eq!(range.len(), count.min(appends));
        for (i, entry) in range.iter().enumerate() {
            prop_assert_eq!(&entry.fields["i"], &json!(i));
            prop_assert_eq!(entry.id.seq, i as u64);
        }
    }
}
