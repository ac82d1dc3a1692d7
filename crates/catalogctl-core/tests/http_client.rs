//! Integration tests for the HTTP management client using a mock server

use std::time::Duration;

use catalogctl_core::{
    Command, CommandArgs, ConnectionSettings, CoreError, CreateServiceParams, HttpManageClient,
    Invocation, ListServicesRequest, ManageClient, OperationOutput, PollConfig, RemoteErrorKind,
    ServiceIdentity, ServiceType, dispatch,
};
use serde_json::json;
use wiremock::matchers::{body_partial_json, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn client_for(server: &MockServer) -> HttpManageClient {
    let settings =
        ConnectionSettings::resolve(Some(&server.uri()), "default", None, Duration::from_secs(5))
            .unwrap();
    HttpManageClient::new(&settings).unwrap()
}

fn svc() -> ServiceIdentity {
    ServiceIdentity::new("us-west-1", "default", "svcA")
}

fn delete_args(server: &MockServer) -> CommandArgs {
    CommandArgs {
        operation: "delete".to_string(),
        region: Some("us-west-1".to_string()),
        service: Some("svcA".to_string()),
        server_url: Some(server.uri()),
        ..CommandArgs::default()
    }
}

// ============================================================================
// Single calls
// ============================================================================

#[tokio::test]
async fn test_create_service_sends_tagged_request() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/v1/services/create"))
        .and(body_partial_json(json!({
            "service_type": "document-store",
            "replicas": 3,
            "volume_size_gb": 20,
            "service": { "region": "us-west-1", "cluster": "default", "service_name": "svcA" },
            "admin": { "user": "dbadmin" }
        })))
        .respond_with(ResponseTemplate::new(200))
        .expect(1)
        .mount(&server)
        .await;

    let request = CreateServiceParams::new(ServiceType::DocumentStore, svc())
        .with_replicas(3)
        .with_volume_size_gb(20)
        .into_request()
        .unwrap();

    client_for(&server).create_service(&request).await.unwrap();
}

#[tokio::test]
async fn test_check_service_init() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/v1/services/check-init"))
        .and(body_partial_json(json!({ "service_type": "relational-store" })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "initialized": false })))
        .mount(&server)
        .await;

    let request = CreateServiceParams::new(ServiceType::RelationalStore, svc())
        .with_volume_size_gb(10)
        .into_request()
        .unwrap()
        .check_init_request();

    let initialized = client_for(&server)
        .check_service_init(&request)
        .await
        .unwrap();
    assert!(!initialized);
}

#[tokio::test]
async fn test_list_services() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/v1/services/list"))
        .and(body_partial_json(json!({ "prefix": "mongo" })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "services": [
                { "service_name": "mongo1", "service_uuid": "uuid-1", "service_status": "ACTIVE" },
                { "service_name": "mongo2", "service_uuid": "uuid-2", "service_status": "CREATING" }
            ]
        })))
        .mount(&server)
        .await;

    let services = client_for(&server)
        .list_services(&ListServicesRequest {
            region: "us-west-1".to_string(),
            cluster: "default".to_string(),
            prefix: "mongo".to_string(),
        })
        .await
        .unwrap();

    assert_eq!(services.len(), 2);
    assert_eq!(services[1].service_status(), Some("CREATING"));
}

#[tokio::test]
async fn test_get_config_file() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/v1/config-files/get"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "service_uuid": "uuid-1",
            "file_id": "mongod.conf-1",
            "file_name": "mongod.conf",
            "content": "net:\n  port: 27017\n"
        })))
        .mount(&server)
        .await;

    let invocation = Invocation::from_args(&CommandArgs {
        operation: "get-config".to_string(),
        service_uuid: Some("uuid-1".to_string()),
        file_id: Some("mongod.conf-1".to_string()),
        ..delete_args(&server)
    })
    .unwrap();

    let client = HttpManageClient::new(&invocation.connection).unwrap();
    let output = dispatch(&client, &invocation.command, None, None)
        .await
        .unwrap();
    let OperationOutput::ConfigFile(file) = output else {
        panic!("expected config file output");
    };
    assert!(file.content.contains("27017"));
}

// ============================================================================
// Error classification
// ============================================================================

#[tokio::test]
async fn test_status_codes_map_to_error_kinds() {
    let cases = [
        (401, RemoteErrorKind::Auth),
        (403, RemoteErrorKind::Auth),
        (404, RemoteErrorKind::NotFound),
        (400, RemoteErrorKind::Validation),
        (409, RemoteErrorKind::Validation),
        (500, RemoteErrorKind::Network),
        (503, RemoteErrorKind::Network),
    ];

    for (status, kind) in cases {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/v1/services/get"))
            .respond_with(
                ResponseTemplate::new(status).set_body_json(json!({ "error": "nope" })),
            )
            .mount(&server)
            .await;

        let err = client_for(&server)
            .get_service_attributes(&svc())
            .await
            .unwrap_err();
        assert_eq!(err.kind, kind, "status {status}");
        assert!(err.message.contains("nope"));
    }
}

#[tokio::test]
async fn test_malformed_response_is_network_error() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/v1/services/check-init"))
        .respond_with(ResponseTemplate::new(200).set_body_string("not json"))
        .mount(&server)
        .await;

    let request = CreateServiceParams::new(ServiceType::Generic, svc())
        .with_volume_size_gb(1)
        .into_request()
        .unwrap()
        .check_init_request();
    let err = client_for(&server)
        .check_service_init(&request)
        .await
        .unwrap_err();
    assert_eq!(err.kind, RemoteErrorKind::Network);
}

#[tokio::test]
async fn test_unreachable_server_is_network_error() {
    // Nothing listens on the discard port
    let settings = ConnectionSettings::resolve(
        Some("127.0.0.1:9"),
        "default",
        None,
        Duration::from_secs(2),
    )
    .unwrap();
    let client = HttpManageClient::new(&settings).unwrap();

    let err = client.delete_service(&svc()).await.unwrap_err();
    assert_eq!(err.kind, RemoteErrorKind::Network);
}

// ============================================================================
// Workflows end to end
// ============================================================================

#[tokio::test]
async fn test_delete_workflow_enumerates_then_deletes() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/v1/services/members"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "members": [
                { "member_name": "svcA-0", "volume_id": "vol-1", "configs": [
                    { "file_name": "mongod.conf", "file_id": "f1", "file_md5": "abc" }
                ]},
                { "member_name": "svcA-1", "volume_id": "vol-2" }
            ]
        })))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path("/v1/services/delete"))
        .respond_with(ResponseTemplate::new(200))
        .expect(1)
        .mount(&server)
        .await;

    let invocation = Invocation::from_args(&delete_args(&server)).unwrap();
    let client = HttpManageClient::new(&invocation.connection).unwrap();
    let output = dispatch(&client, &invocation.command, None, None)
        .await
        .unwrap();

    let OperationOutput::Deleted(report) = output else {
        panic!("expected deletion report");
    };
    assert_eq!(report.volume_ids, vec!["vol-1", "vol-2"]);

    let requests = server.received_requests().await.unwrap();
    let paths: Vec<&str> = requests.iter().map(|r| r.url.path()).collect();
    assert_eq!(paths, vec!["/v1/services/members", "/v1/services/delete"]);
}

#[tokio::test]
async fn test_delete_failure_keeps_volume_ids() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/v1/services/members"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "members": [ { "volume_id": "vol-1" }, { "volume_id": "vol-2" } ]
        })))
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path("/v1/services/delete"))
        .respond_with(ResponseTemplate::new(500).set_body_string("internal error"))
        .mount(&server)
        .await;

    let invocation = Invocation::from_args(&delete_args(&server)).unwrap();
    let client = HttpManageClient::new(&invocation.connection).unwrap();
    let err = dispatch(&client, &invocation.command, None, None)
        .await
        .unwrap_err();

    assert!(matches!(err, CoreError::DeleteFailed { .. }));
    assert_eq!(
        err.retained_volume_ids(),
        Some(&["vol-1".to_string(), "vol-2".to_string()][..])
    );
}

#[tokio::test]
async fn test_delete_aborts_when_members_unavailable() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/v1/services/members"))
        .respond_with(ResponseTemplate::new(404).set_body_json(json!({ "error": "no svcA" })))
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path("/v1/services/delete"))
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&server)
        .await;

    let invocation = Invocation::from_args(&delete_args(&server)).unwrap();
    let client = HttpManageClient::new(&invocation.connection).unwrap();
    let err = dispatch(&client, &invocation.command, None, None)
        .await
        .unwrap_err();
    assert!(err.is_not_found());
}

#[tokio::test]
async fn test_create_and_wait_until_initialized() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/v1/services/create"))
        .respond_with(ResponseTemplate::new(200))
        .expect(1)
        .mount(&server)
        .await;
    // First check reports still initializing, later checks succeed
    Mock::given(method("POST"))
        .and(path("/v1/services/check-init"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "initialized": false })))
        .up_to_n_times(1)
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path("/v1/services/check-init"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "initialized": true })))
        .mount(&server)
        .await;

    let invocation = Invocation::from_args(&CommandArgs {
        operation: "create".to_string(),
        service_type: Some("document-store".to_string()),
        replicas: 3,
        volume_size_gb: 20,
        ..delete_args(&server)
    })
    .unwrap();
    let Command::Create(_) = &invocation.command else {
        panic!("expected create command");
    };

    let client = HttpManageClient::new(&invocation.connection).unwrap();
    let config = PollConfig::new(Duration::from_millis(10), Duration::from_secs(5)).unwrap();
    let output = dispatch(&client, &invocation.command, Some(&config), None)
        .await
        .unwrap();
    assert!(matches!(
        output,
        OperationOutput::Created {
            initialized: true,
            service_type: ServiceType::DocumentStore,
            ..
        }
    ));
}
