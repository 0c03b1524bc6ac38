//! Drain semantics of `poll`.

use crate::support::{config_with_token, consumer, secret, FakeSource, RecordingProcessor};
use secret_watch_bridge::constants::{KUBERNETES_EVENT_ACTION, KUBERNETES_EVENT_TIMESTAMP};
use secret_watch_bridge::{PollError, SecretAction, SecretEvent};
use serde_json::Value;
use std::sync::Arc;
use std::time::Duration;

#[tokio::test]
async fn test_poll_drains_every_watched_event() {
    let source = FakeSource::default();
    let processor = Arc::new(RecordingProcessor::default());
    let consumer = consumer(config_with_token(None), source.clone(), &processor);
    consumer.start().await.unwrap();

    let names = ["a", "b", "c", "d"];
    for name in names {
        assert!(source.emit(SecretAction::Added, secret("default", name)));
        // Keep arrival timestamps in distinct milliseconds
        std::thread::sleep(Duration::from_millis(2));
    }

    assert_eq!(consumer.poll().await.unwrap(), names.len());
    assert!(consumer.buffer().is_empty());

    let received: Vec<_> = processor
        .received()
        .iter()
        .map(|e| e.body.metadata.name.clone().unwrap())
        .collect();
    assert_eq!(received, names);

    // Nothing left for the next poll
    assert_eq!(consumer.poll().await.unwrap(), 0);
}

#[tokio::test]
async fn test_poll_emits_body_action_and_timestamp() {
    let source = FakeSource::default();
    let processor = Arc::new(RecordingProcessor::default());
    let consumer = consumer(config_with_token(None), source, &processor);

    let first = secret("default", "secret1");
    let second = secret("payments", "secret2");
    consumer
        .buffer()
        .insert_at(1_000, SecretEvent::new(SecretAction::Added, first.clone()));
    consumer
        .buffer()
        .insert_at(2_000, SecretEvent::new(SecretAction::Modified, second.clone()));

    assert_eq!(consumer.poll().await.unwrap(), 2);
    assert!(consumer.buffer().is_empty());

    let received = processor.received();
    assert_eq!(received.len(), 2);

    assert_eq!(received[0].body, first);
    assert_eq!(received[0].event_action(), Some(SecretAction::Added));
    assert_eq!(received[0].event_timestamp(), Some(1_000));
    assert_eq!(
        received[0].header(KUBERNETES_EVENT_ACTION),
        Some(&Value::from("ADDED"))
    );

    assert_eq!(received[1].body, second);
    assert_eq!(received[1].event_action(), Some(SecretAction::Modified));
    assert_eq!(
        received[1].header(KUBERNETES_EVENT_TIMESTAMP),
        Some(&Value::from(2_000))
    );
    assert_ne!(received[0].id, received[1].id);
}

#[tokio::test]
async fn test_same_millisecond_events_collapse_to_one() {
    let source = FakeSource::default();
    let processor = Arc::new(RecordingProcessor::default());
    let consumer = consumer(config_with_token(None), source, &processor);

    consumer
        .buffer()
        .insert_at(42, SecretEvent::new(SecretAction::Added, secret("default", "a")));
    consumer
        .buffer()
        .insert_at(42, SecretEvent::new(SecretAction::Deleted, secret("default", "b")));

    assert_eq!(consumer.poll().await.unwrap(), 1);

    let received = processor.received();
    assert_eq!(received.len(), 1);
    assert_eq!(received[0].event_action(), Some(SecretAction::Deleted));
    assert_eq!(received[0].body.metadata.name.as_deref(), Some("b"));
    assert_eq!(received[0].event_timestamp(), Some(42));
}

#[tokio::test]
async fn test_processor_failure_keeps_unreached_entries() {
    let source = FakeSource::default();
    let processor = Arc::new(RecordingProcessor::failing_on_call(3));
    let consumer = consumer(config_with_token(None), source, &processor);

    for key in 1..=5 {
        consumer.buffer().insert_at(
            key,
            SecretEvent::new(SecretAction::Modified, secret("default", &format!("s{key}"))),
        );
    }

    let err = consumer.poll().await.unwrap_err();
    let PollError::Processing { timestamp, .. } = err;
    assert_eq!(timestamp, 3);

    // Entries 1 and 2 were handed off and removed; 3..5 wait for the next poll
    assert_eq!(processor.timestamps(), vec![1, 2]);
    assert_eq!(consumer.buffer().keys(), vec![3, 4, 5]);

    assert_eq!(consumer.poll().await.unwrap(), 3);
    assert_eq!(processor.timestamps(), vec![1, 2, 3, 4, 5]);
    assert!(consumer.buffer().is_empty());
}

#[tokio::test]
async fn test_processor_failure_on_first_entry_removes_nothing() {
    let source = FakeSource::default();
    let processor = Arc::new(RecordingProcessor::failing_on_call(1));
    let consumer = consumer(config_with_token(None), source, &processor);

    consumer
        .buffer()
        .insert_at(10, SecretEvent::new(SecretAction::Added, secret("default", "a")));
    consumer
        .buffer()
        .insert_at(20, SecretEvent::new(SecretAction::Added, secret("default", "b")));

    assert!(consumer.poll().await.is_err());
    assert_eq!(consumer.buffer().keys(), vec![10, 20]);
    assert!(processor.received().is_empty());
}
