//! # Concurrent Output Pipeline
//!
//! Many sensors across many groups submit batches concurrently into one
//! filesystem output with a small size limit. Every accepted event must
//! land exactly once, in its group's directory, inside a valid JSON array.

#[cfg(test)]
mod tests {
    use crate::support::{hidden_files, read_published};
    use futures::future::join_all;
    use serde_json::Value;
    use sg_03_events::{Event, EventType, SensorEvent};
    use sg_04_output::{FileSettings, FilesystemSink, OutputRouter, Sink};
    use std::collections::HashMap;
    use std::sync::Arc;
    use std::time::Duration;
    use tempfile::TempDir;
    use uuid::Uuid;

    const GROUPS: usize = 4;
    const SENSORS_PER_GROUP: usize = 3;
    const BATCHES_PER_SENSOR: usize = 10;
    const EVENTS_PER_BATCH: usize = 5;

    fn batch(group: Uuid, sensor: Uuid, start: i64) -> Vec<Event> {
        (0..EVENTS_PER_BATCH as i64)
            .map(|i| Event::Unknown(SensorEvent::new(EventType::Unknown, start + i, sensor, group)))
            .collect()
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn test_concurrent_groups_land_exactly_once() {
        let dir = TempDir::new().unwrap();
        let settings = FileSettings {
            max_size: 2_000,
            ..FileSettings::default()
        };
        let sink: Arc<dyn Sink> = Arc::new(FilesystemSink::new(dir.path(), settings).unwrap());
        let outputs = OutputRouter::new(vec![sink]);

        let groups: Vec<Uuid> = (0..GROUPS).map(|_| Uuid::new_v4()).collect();

        let mut tasks = Vec::new();
        for &group in &groups {
            for _ in 0..SENSORS_PER_GROUP {
                let outputs = outputs.clone();
                let sensor = Uuid::new_v4();
                tasks.push(tokio::spawn(async move {
                    for n in 0..BATCHES_PER_SENSOR {
                        let start = (n * EVENTS_PER_BATCH) as i64;
                        outputs.consume(&batch(group, sensor, start)).unwrap();
                        tokio::task::yield_now().await;
                    }
                    sensor
                }));
            }
        }
        let sensors: Vec<Uuid> = join_all(tasks)
            .await
            .into_iter()
            .map(Result::unwrap)
            .collect();

        assert!(outputs.shutdown(Duration::from_secs(10)).await);

        let per_sensor = BATCHES_PER_SENSOR * EVENTS_PER_BATCH;
        let mut counts: HashMap<String, Vec<i64>> = HashMap::new();

        for group in &groups {
            let group_dir = dir.path().join(group.to_string());
            assert!(hidden_files(&group_dir).is_empty(), "unfinished files in {group}");

            let files = read_published(&group_dir);
            assert!(files.len() > 1, "size limit should have rotated files");

            for event in files.into_iter().flatten() {
                assert_eq!(event["group"], Value::String(group.to_string()));
                let sensor = event["sensor"].as_str().unwrap().to_string();
                counts.entry(sensor).or_default().push(event["time"].as_i64().unwrap());
            }
        }

        assert_eq!(counts.len(), sensors.len());
        for sensor in &sensors {
            let times = &counts[&sensor.to_string()];
            // Per-sensor order survives rotation.
            let expected: Vec<i64> = (0..per_sensor as i64).collect();
            assert_eq!(times, &expected);
        }
    }
}
