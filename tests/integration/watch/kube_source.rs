//! `KubeSecretSource` streaming, resume and close behaviour.

use super::mock_api::{
    secret_line, status_line, wait_until, MockApiServer, RecordingHandler, WatchReply,
};
use secret_watch_bridge::config::KubernetesConfig;
use secret_watch_bridge::watch::{KubeSecretSource, SecretWatchSource, WatchHandler, WatchScope};
use secret_watch_bridge::SecretAction;
use std::sync::Arc;
use std::time::Duration;

fn source_for(server: &MockApiServer) -> KubeSecretSource {
    KubeSecretSource::from_config(&KubernetesConfig {
        oauth_token: Some("test-token".to_string()),
        namespace: None,
        master_url: Some(server.url()),
    })
}

fn shared(handler: &Arc<RecordingHandler>) -> Arc<dyn WatchHandler> {
    Arc::clone(handler) as Arc<dyn WatchHandler>
}

#[tokio::test]
async fn test_watch_resumes_from_last_resource_version() {
    let server = MockApiServer::start(vec![
        WatchReply::Finish(vec![
            secret_line("ADDED", "db-credentials", "10"),
            secret_line("MODIFIED", "db-credentials", "11"),
        ]),
        WatchReply::Hold(vec![secret_line("DELETED", "api-key", "12")]),
    ])
    .await;
    let handler = Arc::new(RecordingHandler::default());

    let subscription = source_for(&server)
        .watch(WatchScope::AllNamespaces, shared(&handler))
        .await
        .unwrap();
    wait_until(|| handler.events().len() == 3).await;

    assert_eq!(
        handler.events(),
        vec![
            (SecretAction::Added, Some("db-credentials".to_string())),
            (SecretAction::Modified, Some("db-credentials".to_string())),
            (SecretAction::Deleted, Some("api-key".to_string())),
        ]
    );
    let requests = server.requests();
    assert_eq!(requests[0].path, "/api/v1/secrets");
    assert_eq!(requests[0].resource_version.as_deref(), Some("0"));
    assert_eq!(requests[1].resource_version.as_deref(), Some("11"));
    assert_eq!(
        requests[0].authorization.as_deref(),
        Some("Bearer test-token")
    );
    // A normal end is not a close
    assert!(handler.closes().is_empty());

    subscription.close();
    assert_eq!(handler.closes(), vec![None]);
}

#[tokio::test]
async fn test_watch_reports_transport_error_once() {
    let server = MockApiServer::start(vec![WatchReply::Finish(vec![
        secret_line("ADDED", "db-credentials", "3"),
        "not a watch event".to_string(),
    ])])
    .await;
    let handler = Arc::new(RecordingHandler::default());

    let subscription = source_for(&server)
        .watch(WatchScope::AllNamespaces, shared(&handler))
        .await
        .unwrap();
    wait_until(|| !handler.closes().is_empty()).await;

    assert_eq!(handler.events().len(), 1);
    let closes = handler.closes();
    assert_eq!(closes.len(), 1);
    assert!(closes[0].as_deref().is_some_and(|cause| cause.contains("transport")));

    // The binding already reported the close
    subscription.close();
    assert_eq!(handler.closes().len(), 1);
    assert_eq!(server.requests().len(), 1);
}

#[tokio::test]
async fn test_watch_ends_on_expired_resource_version() {
    let server = MockApiServer::start(vec![WatchReply::Hold(vec![status_line(410, "Expired")])]).await;
    let handler = Arc::new(RecordingHandler::default());

    let _subscription = source_for(&server)
        .watch(WatchScope::AllNamespaces, shared(&handler))
        .await
        .unwrap();
    wait_until(|| !handler.closes().is_empty()).await;

    let closes = handler.closes();
    assert!(closes[0].as_deref().is_some_and(|cause| cause.contains("410")));
    assert!(handler.events().is_empty());
    // No resume after expiry
    tokio::time::sleep(Duration::from_millis(50)).await;
    assert_eq!(server.requests().len(), 1);
}

#[tokio::test]
async fn test_watch_keeps_streaming_after_error_status() {
    let server = MockApiServer::start(vec![WatchReply::Hold(vec![
        status_line(500, "InternalError"),
        secret_line("ADDED", "api-key", "4"),
    ])])
    .await;
    let handler = Arc::new(RecordingHandler::default());

    let _subscription = source_for(&server)
        .watch(WatchScope::AllNamespaces, shared(&handler))
        .await
        .unwrap();
    wait_until(|| handler.events().len() == 2).await;

    assert_eq!(
        handler.events(),
        vec![
            (SecretAction::Error, None),
            (SecretAction::Added, Some("api-key".to_string())),
        ]
    );
    assert!(handler.closes().is_empty());
}

#[tokio::test]
async fn test_close_reports_once_for_namespaced_watch() {
    let server = MockApiServer::start(vec![WatchReply::Hold(vec![secret_line(
        "ADDED",
        "tls-cert",
        "5",
    )])])
    .await;
    let mut config = kube::Config::new(server.url().parse().unwrap());
    config.auth_info.token = Some("client-token".to_string().into());
    let client = kube::Client::try_from(config).unwrap();
    let handler = Arc::new(RecordingHandler::default());

    let subscription = KubeSecretSource::with_client(client)
        .watch(WatchScope::Namespace("payments".to_string()), shared(&handler))
        .await
        .unwrap();
    wait_until(|| handler.events().len() == 1).await;

    assert_eq!(
        server.requests()[0].path,
        "/api/v1/namespaces/payments/secrets"
    );

    subscription.close();
    tokio::time::sleep(Duration::from_millis(50)).await;
    assert_eq!(handler.closes(), vec![None]);
    assert_eq!(handler.events().len(), 1);
}
