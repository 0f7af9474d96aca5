use consul_registrar::{
    AgentConfig, AgentError, ConsulAgent, Registrar, RegistrarError, RegistryAgent,
    ServiceDescriptor,
};
use httpmock::prelude::*;

fn agent_config(server: &MockServer, token: Option<&str>) -> AgentConfig {
    AgentConfig {
        address: server.address().to_string(),
        token: token.map(str::to_string),
    }
}

fn unused_address() -> String {
    let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
    listener.local_addr().unwrap().to_string()
}

#[tokio::test]
async fn test_register_puts_descriptor_to_agent() {
    let server = MockServer::start_async().await;
    let mock = server
        .mock_async(|when, then| {
            when.method(PUT)
                .path("/v1/agent/service/register")
                .header("content-type", "application/json")
                .json_body_partial(
                    r#"{
                        "Name": "orders-svc",
                        "Tags": ["v1", "prod"],
                        "Address": "127.0.0.1",
                        "Port": 8080,
                        "Check": {
                            "HTTP": "http://127.0.0.1:8080/health",
                            "Interval": "10s",
                            "Timeout": "1s"
                        }
                    }"#,
                );
            then.status(200);
        })
        .await;

    let registrar = Registrar::connect(&agent_config(&server, None)).unwrap();
    let tags = vec!["v1".to_string(), "prod".to_string()];
    let instance = registrar
        .register("orders-svc", &tags, "127.0.0.1", 8080)
        .await
        .expect("registration failed");

    mock.assert_hits_async(1).await;
    assert_eq!(instance.descriptor().port, 8080);
}

#[tokio::test]
async fn test_token_is_sent_on_every_call() {
    let server = MockServer::start_async().await;
    let register = server
        .mock_async(|when, then| {
            when.method(PUT)
                .path("/v1/agent/service/register")
                .header("X-Consul-Token", "secret");
            then.status(200);
        })
        .await;
    let deregister = server
        .mock_async(|when, then| {
            when.method(PUT)
                .path_contains("/v1/agent/service/deregister/")
                .header("X-Consul-Token", "secret");
            then.status(200);
        })
        .await;

    let registrar = Registrar::connect(&agent_config(&server, Some("secret"))).unwrap();
    let instance = registrar
        .register("svc", &[], "127.0.0.1", 8080)
        .await
        .expect("registration failed");
    instance.deregister().await.expect("deregistration failed");

    register.assert_hits_async(1).await;
    deregister.assert_hits_async(1).await;
}

#[tokio::test]
async fn test_deregister_targets_instance_id() {
    let server = MockServer::start_async().await;
    server
        .mock_async(|when, then| {
            when.method(PUT).path("/v1/agent/service/register");
            then.status(200);
        })
        .await;

    let registrar = Registrar::connect(&agent_config(&server, None)).unwrap();
    let instance = registrar
        .register("svc", &[], "127.0.0.1", 8080)
        .await
        .unwrap();

    let deregister = server
        .mock_async(|when, then| {
            when.method(PUT)
                .path(format!("/v1/agent/service/deregister/{}", instance.id()));
            then.status(200);
        })
        .await;

    instance.deregister().await.expect("deregistration failed");
    deregister.assert_hits_async(1).await;
}

#[tokio::test]
async fn test_agent_rejection_carries_status_and_body() {
    let server = MockServer::start_async().await;
    server
        .mock_async(|when, then| {
            when.method(PUT).path("/v1/agent/service/register");
            then.status(403).body("Permission denied");
        })
        .await;

    let agent = ConsulAgent::new(&agent_config(&server, None)).unwrap();
    let descriptor = ServiceDescriptor::new("id".to_string(), "svc", &[], "127.0.0.1", 8080);

    match agent.register_service(&descriptor).await {
        Err(AgentError::Rejected { status, body }) => {
            assert_eq!(status.as_u16(), 403);
            assert_eq!(body, "Permission denied");
        }
        other => panic!("expected a rejection, got {other:?}"),
    }
}

#[tokio::test]
async fn test_failed_deregistration_is_reported() {
    let server = MockServer::start_async().await;
    server
        .mock_async(|when, then| {
            when.method(PUT).path("/v1/agent/service/register");
            then.status(200);
        })
        .await;
    server
        .mock_async(|when, then| {
            when.method(PUT).path_contains("/v1/agent/service/deregister/");
            then.status(500).body("agent is shutting down");
        })
        .await;

    let registrar = Registrar::connect(&agent_config(&server, None)).unwrap();
    let instance = registrar
        .register("svc", &[], "127.0.0.1", 8080)
        .await
        .unwrap();

    let result = instance.deregister().await;
    assert!(matches!(
        result,
        Err(RegistrarError::Deregistration {
            source: AgentError::Rejected { .. },
            ..
        })
    ));
}

#[tokio::test]
async fn test_unreachable_agent_is_a_registration_error() {
    let registrar = Registrar::connect(&AgentConfig {
        address: unused_address(),
        token: None,
    })
    .expect("construction never contacts the agent");

    let result = registrar.register("svc", &[], "127.0.0.1", 8080).await;

    assert!(matches!(
        result,
        Err(RegistrarError::Registration(AgentError::Transport(_)))
    ));
}
