use std::collections::BTreeMap;
use std::sync::{Arc, Mutex};

use tickdb::labels::{LabelEvent, LabelKind, LabelListener};
use tickdb::{Config, LabelsConfig, Tickdb, TickdbError, Value};

const HOUR: i64 = 3_600_000;

fn auto_create_config() -> Config {
    Config {
        labels: LabelsConfig {
            auto_create_metrics: true,
            ..LabelsConfig::default()
        },
        ..Config::default()
    }
}

fn tags(pairs: &[(&str, &str)]) -> BTreeMap<String, String> {
    pairs
        .iter()
        .map(|(k, v)| (k.to_string(), v.to_string()))
        .collect()
}

struct RecordingListener {
    events: Mutex<Vec<LabelEvent>>,
}

impl LabelListener for RecordingListener {
    fn on_label_event(&self, event: &LabelEvent) {
        self.events.lock().unwrap().push(event.clone());
    }
}

#[tokio::test]
async fn should_stream_points_across_buckets_in_order() {
    // given: points in the first and third hour, nothing in the second
    let db = Tickdb::open(auto_create_config()).await.unwrap();
    let series = tags(&[("host", "web-1")]);
    for (timestamp, value) in [(2 * HOUR + 7, 30), (10, 10), (20, 20), (2 * HOUR + 9, 40)] {
        db.data_points()
            .add_point("sys.cpu", &series, timestamp, Value::Long(value))
            .await
            .unwrap();
    }

    // when
    let mut iterator = db
        .data_points()
        .query("sys.cpu", &series, 0, 3 * HOUR)
        .await
        .unwrap();
    let mut points = Vec::new();
    while let Some(point) = iterator.next().await.unwrap() {
        points.push((point.timestamp, point.value));
    }

    // then: ascending across buckets, the empty bucket skipped
    assert_eq!(
        points,
        vec![
            (10, Value::Long(10)),
            (20, Value::Long(20)),
            (2 * HOUR + 7, Value::Long(30)),
            (2 * HOUR + 9, Value::Long(40)),
        ]
    );
}

#[tokio::test]
async fn should_respect_the_query_range_within_a_bucket() {
    // given
    let db = Tickdb::open(auto_create_config()).await.unwrap();
    let series = tags(&[("host", "web-1")]);
    for timestamp in [10, 20, 30, 40] {
        db.data_points()
            .add_point("sys.cpu", &series, timestamp, Value::Long(timestamp))
            .await
            .unwrap();
    }

    // when
    let mut iterator = db
        .data_points()
        .query("sys.cpu", &series, 15, 35)
        .await
        .unwrap();
    let mut timestamps = Vec::new();
    while let Some(point) = iterator.next().await.unwrap() {
        timestamps.push(point.timestamp);
    }

    // then
    assert_eq!(timestamps, vec![20, 30]);
}

#[tokio::test]
async fn should_fail_queries_for_unknown_metrics() {
    // given
    let db = Tickdb::open(auto_create_config()).await.unwrap();

    // when
    let result = db
        .data_points()
        .query("never.written", &tags(&[("host", "web-1")]), 0, HOUR)
        .await;

    // then: strict resolution makes this an error, not an empty stream
    assert!(matches!(result, Err(TickdbError::Label(_))));
}

#[tokio::test]
async fn should_keep_series_with_different_tags_apart() {
    // given
    let db = Tickdb::open(auto_create_config()).await.unwrap();
    db.data_points()
        .add_point("sys.cpu", &tags(&[("host", "web-1")]), 10, Value::Long(1))
        .await
        .unwrap();
    db.data_points()
        .add_point("sys.cpu", &tags(&[("host", "web-2")]), 10, Value::Long(2))
        .await
        .unwrap();

    // when
    let mut iterator = db
        .data_points()
        .query("sys.cpu", &tags(&[("host", "web-2")]), 0, HOUR)
        .await
        .unwrap();

    // then
    assert_eq!(
        iterator.next().await.unwrap().map(|p| p.value),
        Some(Value::Long(2))
    );
    assert_eq!(iterator.next().await.unwrap(), None);
}

#[tokio::test]
async fn should_store_double_values() {
    // given
    let db = Tickdb::open(auto_create_config()).await.unwrap();
    let series = tags(&[("host", "web-1")]);
    db.data_points()
        .add_point("sys.load", &series, 10, Value::Double(0.25))
        .await
        .unwrap();

    // when
    let mut iterator = db
        .data_points()
        .query("sys.load", &series, 0, HOUR)
        .await
        .unwrap();

    // then
    assert_eq!(
        iterator.next().await.unwrap().map(|p| p.value),
        Some(Value::Double(0.25))
    );
}

#[tokio::test]
async fn should_notify_listeners_of_created_labels() {
    // given
    let listener = Arc::new(RecordingListener {
        events: Mutex::new(Vec::new()),
    });
    let db = Tickdb::open_with_listeners(
        auto_create_config(),
        vec![Arc::clone(&listener) as Arc<dyn LabelListener>],
    )
    .await
    .unwrap();

    // when: the first write creates the metric, the tag key and the tag
    // value
    db.data_points()
        .add_point("sys.cpu", &tags(&[("host", "web-1")]), 10, Value::Long(1))
        .await
        .unwrap();

    // then
    let events = listener.events.lock().unwrap();
    let mut created: Vec<(String, LabelKind)> = events
        .iter()
        .map(|event| match event {
            LabelEvent::Created { name, kind, .. } => (name.clone(), *kind),
            other => panic!("unexpected event {:?}", other),
        })
        .collect();
    created.sort_by(|a, b| a.0.cmp(&b.0));
    assert_eq!(
        created,
        vec![
            ("host".to_string(), LabelKind::TagKey),
            ("sys.cpu".to_string(), LabelKind::Metric),
            ("web-1".to_string(), LabelKind::TagValue),
        ]
    );
}

#[tokio::test]
async fn should_rename_labels_end_to_end() {
    // given
    let db = Tickdb::open(auto_create_config()).await.unwrap();
    let id = db
        .labels()
        .create_id(LabelKind::Metric, "sys.cpu")
        .await
        .unwrap();

    // when
    db.labels()
        .rename(LabelKind::Metric, "sys.cpu", "sys.cpu.user")
        .await
        .unwrap();

    // then
    assert_eq!(
        db.labels()
            .lookup_id(LabelKind::Metric, "sys.cpu.user")
            .await
            .unwrap(),
        id
    );
    assert!(db
        .labels()
        .lookup_id(LabelKind::Metric, "sys.cpu")
        .await
        .is_err());
}

#[tokio::test]
async fn should_count_written_points() {
    // given
    let db = Tickdb::open(auto_create_config()).await.unwrap();
    let series = tags(&[("host", "web-1")]);

    // when
    for timestamp in [10, 20, 30] {
        db.data_points()
            .add_point("sys.cpu", &series, timestamp, Value::Long(1))
            .await
            .unwrap();
    }

    // then
    assert_eq!(db.metrics().points_written_total.get(), 3);
}
