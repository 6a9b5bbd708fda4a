//! End-to-end tests: client → router → mock destinations.

use std::time::Duration;

use rule_router::config::{ConfigError, RuleConfig, ValidationError};
use rule_router::lifecycle::{self, Shutdown, StartupError};

mod common;

fn rule(name: &str, destination: &str) -> RuleConfig {
    RuleConfig {
        name: Some(name.into()),
        destination: Some(destination.into()),
        ..Default::default()
    }
}

#[tokio::test]
async fn test_routes_by_host_and_path() {
    let api = common::start_echo_backend("api").await;
    let web = common::start_echo_backend("web").await;

    let config = common::base_config(
        vec![common::destination("api", api), common::destination("web", web)],
        vec![
            RuleConfig {
                pathname_starts_with: Some("/api/".into()),
                ..rule("api", "api")
            },
            RuleConfig {
                is_default: true,
                ..rule("fallback", "web")
            },
        ],
    );

    let shutdown = Shutdown::new();
    let running = lifecycle::start(config, &shutdown).await.unwrap();
    let base = format!("http://{}", running.local_addr);
    let client = common::client();

    let res = client.get(format!("{}/api/users?page=2", base)).send().await.unwrap();
    assert_eq!(res.status(), 200);
    assert!(res.headers().contains_key("x-request-id"));
    let body = res.text().await.unwrap();
    assert!(body.starts_with("api GET /api/users?page=2 HTTP/1.1"), "body: {}", body);
    // Host header is forwarded as received.
    assert!(body.ends_with(&format!("host={}", running.local_addr)), "body: {}", body);

    let res = client.post(format!("{}/home", base)).body("x").send().await.unwrap();
    assert_eq!(res.status(), 200);
    assert!(res.text().await.unwrap().starts_with("web POST /home"));

    shutdown.trigger();
    tokio::time::timeout(Duration::from_secs(5), running.handle)
        .await
        .expect("server did not stop")
        .unwrap()
        .unwrap();
}

#[tokio::test]
async fn test_unresolved_destination_falls_through() {
    let web = common::start_echo_backend("web").await;

    let config = common::base_config(
        vec![common::destination("web", web)],
        vec![
            RuleConfig {
                pathname_starts_with: Some("/api/".into()),
                ..rule("api", "MISSING")
            },
            RuleConfig {
                is_default: true,
                ..rule("fallback", "web")
            },
        ],
    );

    let shutdown = Shutdown::new();
    let running = lifecycle::start(config, &shutdown).await.unwrap();

    let res = common::client()
        .get(format!("http://{}/api/users", running.local_addr))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), 200);
    assert!(res.text().await.unwrap().starts_with("web GET /api/users"));

    shutdown.trigger();
}

#[tokio::test]
async fn test_no_match_is_404() {
    let api = common::start_echo_backend("api").await;

    let config = common::base_config(
        vec![common::destination("api", api)],
        vec![RuleConfig {
            hostname_ends_with: Some(".internal.example.com".into()),
            ..rule("internal", "api")
        }],
    );

    let shutdown = Shutdown::new();
    let running = lifecycle::start(config, &shutdown).await.unwrap();

    let res = common::client()
        .get(format!("http://{}/", running.local_addr))
        .header("Host", "x.other.com")
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), 404);
    assert_eq!(res.headers()["content-type"], "text/plain");
    assert_eq!(res.text().await.unwrap(), "No matching route found");

    shutdown.trigger();
}

#[tokio::test]
async fn test_dead_destination_is_500() {
    // Bind and drop to get a port nothing listens on.
    let dead = {
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        listener.local_addr().unwrap()
    };

    let config = common::base_config(
        vec![common::destination("dead", dead)],
        vec![RuleConfig {
            is_default: true,
            ..rule("fallback", "dead")
        }],
    );

    let shutdown = Shutdown::new();
    let running = lifecycle::start(config, &shutdown).await.unwrap();

    let res = common::client()
        .get(format!("http://{}/", running.local_addr))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), 500);
    assert_eq!(res.text().await.unwrap(), "Routing error: upstream request failed");

    shutdown.trigger();
}

#[tokio::test]
async fn test_malformed_rule_fails_startup() {
    let config = common::base_config(
        vec![],
        vec![RuleConfig {
            name: Some("orphan".into()),
            pathname: Some("/".into()),
            ..Default::default()
        }],
    );

    let shutdown = Shutdown::new();
    assert!(lifecycle::start(config, &shutdown).await.is_err());
}

#[tokio::test]
async fn test_strict_destinations_rejects_unknown_destination() {
    let web = common::start_echo_backend("web").await;

    let mut config = common::base_config(
        vec![common::destination("web", web)],
        vec![RuleConfig {
            is_default: true,
            ..rule("fallback", "MISSING")
        }],
    );
    config.routing.strict_destinations = true;

    let shutdown = Shutdown::new();
    match lifecycle::start(config, &shutdown).await {
        Err(StartupError::Config(ConfigError::Validation(errors))) => {
            assert_eq!(
                errors,
                vec![ValidationError::UnknownDestination {
                    rule: "fallback".into(),
                    destination: "MISSING".into(),
                }]
            );
        }
        Err(other) => panic!("unexpected error: {}", other),
        Ok(_) => panic!("started with an unknown destination"),
    }
}

#[tokio::test]
async fn test_routes_on_normalized_pathname() {
    let public = common::start_echo_backend("public").await;
    let admin = common::start_echo_backend("admin").await;

    let config = common::base_config(
        vec![common::destination("public", public), common::destination("admin", admin)],
        vec![
            RuleConfig {
                pathname_starts_with: Some("/public/".into()),
                ..rule("public", "public")
            },
            RuleConfig {
                pathname_starts_with: Some("/admin/".into()),
                ..rule("admin", "admin")
            },
        ],
    );

    let shutdown = Shutdown::new();
    let running = lifecycle::start(config, &shutdown).await.unwrap();
    let client = common::client();

    // Raw TCP keeps the dot segments out of reach of client-side normalization.
    for raw_path in ["/public/../admin/x", "/public/%2e%2e/admin/x"] {
        let body = common::raw_get(running.local_addr, raw_path).await;
        // Routed on the resolved path, forwarded with the path as received.
        assert!(body.contains(&format!("admin GET {} HTTP/1.1", raw_path)), "body: {}", body);
    }

    let res = client
        .get(format!("http://{}/public/page", running.local_addr))
        .send()
        .await
        .unwrap();
    assert!(res.text().await.unwrap().starts_with("public GET /public/page"));

    shutdown.trigger();
}
