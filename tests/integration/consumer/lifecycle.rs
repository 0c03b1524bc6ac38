//! Start/stop behaviour and credential gating.

use crate::support::{
    config_with_token, consumer, secret, FailingSource, FakeSource, RecordingProcessor,
};
use secret_watch_bridge::config::KubernetesConfig;
use secret_watch_bridge::watch::WatchScope;
use secret_watch_bridge::{ConsumerError, SecretAction, SecretEvent};
use std::sync::Arc;

#[tokio::test]
async fn test_start_without_credential_stays_idle() {
    let source = FakeSource::default();
    let processor = Arc::new(RecordingProcessor::default());
    let consumer = consumer(KubernetesConfig::default(), source.clone(), &processor);

    consumer.start().await.unwrap();

    assert!(consumer.is_running());
    assert!(!consumer.is_watching().await);
    assert!(source.scopes().is_empty());
    assert!(!source.emit(SecretAction::Added, secret("default", "ignored")));
    assert_eq!(consumer.poll().await.unwrap(), 0);
    assert!(processor.received().is_empty());
}

#[tokio::test]
async fn test_start_watches_all_namespaces_without_namespace() {
    let source = FakeSource::default();
    let processor = Arc::new(RecordingProcessor::default());
    let consumer = consumer(config_with_token(None), source.clone(), &processor);

    consumer.start().await.unwrap();

    assert!(consumer.is_watching().await);
    assert_eq!(source.scopes(), vec![WatchScope::AllNamespaces]);
}

#[tokio::test]
async fn test_start_watches_configured_namespace() {
    let source = FakeSource::default();
    let processor = Arc::new(RecordingProcessor::default());
    let consumer = consumer(config_with_token(Some("payments")), source.clone(), &processor);

    consumer.start().await.unwrap();

    assert_eq!(
        source.scopes(),
        vec![WatchScope::Namespace("payments".to_string())]
    );
}

#[tokio::test]
async fn test_start_twice_subscribes_once() {
    let source = FakeSource::default();
    let processor = Arc::new(RecordingProcessor::default());
    let consumer = consumer(config_with_token(None), source.clone(), &processor);

    consumer.start().await.unwrap();
    consumer.start().await.unwrap();

    assert_eq!(source.scopes().len(), 1);
}

#[tokio::test]
async fn test_start_surfaces_subscription_failure() {
    let processor = Arc::new(RecordingProcessor::default());
    let consumer = consumer(config_with_token(None), FailingSource, &processor);

    let err = consumer.start().await.unwrap_err();

    assert!(matches!(err, ConsumerError::Watch(_)));
    assert!(err.to_string().contains("secrets is forbidden"));
    assert!(!consumer.is_running());
}

#[tokio::test]
async fn test_stop_clears_buffer_and_closes_watch() {
    let source = FakeSource::default();
    let processor = Arc::new(RecordingProcessor::default());
    let consumer = consumer(config_with_token(None), source.clone(), &processor);
    consumer.start().await.unwrap();

    assert!(source.emit(SecretAction::Added, secret("default", "a")));
    consumer
        .buffer()
        .insert_at(1, SecretEvent::new(SecretAction::Modified, secret("default", "b")));
    assert!(!consumer.buffer().is_empty());

    consumer.stop().await;

    assert!(consumer.buffer().is_empty());
    assert!(!consumer.is_running());
    assert!(!consumer.is_watching().await);
    assert_eq!(source.closed(), 1);
    // Closed subscription no longer delivers
    assert!(!source.emit(SecretAction::Added, secret("default", "late")));
    assert_eq!(consumer.poll().await.unwrap(), 0);

    consumer.stop().await;
    assert_eq!(source.closed(), 1);
}

#[tokio::test]
async fn test_restart_begins_with_empty_buffer() {
    let source = FakeSource::default();
    let processor = Arc::new(RecordingProcessor::default());
    let consumer = consumer(config_with_token(None), source.clone(), &processor);

    consumer.start().await.unwrap();
    consumer.stop().await;

    // Entries that somehow landed while stopped are discarded on the next start
    consumer
        .buffer()
        .insert_at(5, SecretEvent::new(SecretAction::Added, secret("default", "stale")));
    consumer.start().await.unwrap();

    assert!(consumer.buffer().is_empty());
    assert_eq!(source.scopes().len(), 2);
}

#[tokio::test]
async fn test_debug_reports_running_state() {
    let processor = Arc::new(RecordingProcessor::default());
    let consumer = consumer(config_with_token(None), FakeSource::default(), &processor);

    assert!(format!("{consumer:?}").contains("running: false"));
    consumer.start().await.unwrap();
    let rendered = format!("{consumer:?}");
    assert!(rendered.contains("running: true"));
    assert!(rendered.contains("buffered: 0"));
    assert!(!rendered.contains("test-token"));
}

#[tokio::test]
async fn test_dropping_running_consumer_closes_watch() {
    let source = FakeSource::default();
    let processor = Arc::new(RecordingProcessor::default());
    let consumer = consumer(config_with_token(None), source.clone(), &processor);

    consumer.start().await.unwrap();
    drop(consumer);

    assert_eq!(source.closed(), 1);
    assert!(!source.emit(SecretAction::Added, secret("default", "orphan")));
}
