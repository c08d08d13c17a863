//! End-to-end dispatch tests driving the public factory against an
//! in-process mock session.

use std::sync::Arc;

use async_trait::async_trait;
use serde_json::{Map, Value};
use url::Url;

use keystone_client::{
    AuthError, AuthPlugin, ClientBuilder, DiscoveryError, EndpointFilter, Error, Response,
    Session, SessionError, Token, VersionRegistry,
};

/// Session serving a canned discovery document, recording the URL hit.
#[derive(Debug)]
struct MockSession {
    status: u16,
    body: String,
    requested: std::sync::Mutex<Vec<String>>,
}

impl MockSession {
    fn new(status: u16, body: &str) -> Arc<Self> {
        Arc::new(MockSession {
            status,
            body: body.to_string(),
            requested: std::sync::Mutex::new(Vec::new()),
        })
    }
}

#[async_trait]
impl Session for MockSession {
    async fn get(&self, url: &Url) -> Result<Response, SessionError> {
        self.requested.lock().unwrap().push(url.to_string());
        Ok(Response::new(self.status, self.body.clone().into_bytes()))
    }
}

#[derive(Debug)]
struct StaticTokenPlugin {
    token: String,
}

#[async_trait]
impl AuthPlugin for StaticTokenPlugin {
    async fn get_token(&self) -> Result<Token, AuthError> {
        Ok(Token::new(self.token.clone()))
    }

    async fn get_endpoint(
        &self,
        _session: Option<&dyn Session>,
        filter: &EndpointFilter,
    ) -> Result<String, AuthError> {
        match filter.service_type_ref() {
            Some("identity") | None => Ok("http://keystone.example.org:5000/v3".to_string()),
            other => Err(AuthError::EndpointNotFound {
                service_type: other.map(str::to_string),
            }),
        }
    }

    async fn do_authenticate(
        &self,
        _session: &dyn Session,
        _extra: &Map<String, Value>,
    ) -> Result<(), AuthError> {
        Ok(())
    }
}

const STABLE_V3_DOCUMENT: &str = r#"{
    "versions": {
        "values": [
            {
                "id": "3.1",
                "status": "stable",
                "links": [{"rel": "self", "href": "http://x/v3"}]
            }
        ]
    }
}"#;

fn v3_only_registry() -> VersionRegistry {
    let mut registry = VersionRegistry::new();
    registry.register("3", "keystone_client::v3::Client", keystone_client::v3::construct);
    registry
}

#[tokio::test]
async fn dispatch_round_trip_yields_v3_client_with_canonical_url() {
    let session = MockSession::new(300, STABLE_V3_DOCUMENT);

    let client = ClientBuilder::new("http://keystone.example.org:5000")
        .version((3, 1))
        .session(session.clone())
        .registry(v3_only_registry())
        .build()
        .await
        .expect("negotiation should succeed");

    // The endpoint is rewritten to the canonical self link, not the URL
    // the caller supplied.
    assert_eq!(client.auth_url(), "http://x/v3");
    assert_eq!(client.api_version().major(), 3);

    let concrete = client
        .as_any()
        .downcast_ref::<keystone_client::v3::Client>()
        .expect("expected a v3 client");
    assert_eq!(concrete.config().auth_url(), "http://x/v3");

    // Discovery hit the caller-supplied URL.
    let requested = session.requested.lock().unwrap();
    assert_eq!(requested.len(), 1);
    assert_eq!(requested[0], "http://keystone.example.org:5000/");
}

#[tokio::test]
async fn no_matching_major_is_version_not_available() {
    let session = MockSession::new(
        200,
        r#"{"versions": {"values": [
            {"id": "v9.0", "status": "stable",
             "links": [{"rel": "self", "href": "http://x/v9"}]}
        ]}}"#,
    );

    let err = ClientBuilder::new("http://keystone.example.org:5000")
        .session(session)
        .build()
        .await
        .unwrap_err();

    match err {
        Error::VersionNotAvailable { api_name, requested } => {
            assert_eq!(api_name, "identity");
            assert!(requested.is_none());
        }
        other => panic!("unexpected error: {other:?}"),
    }
}

#[tokio::test]
async fn unstable_servers_require_opt_in() {
    let document = r#"{"versions": {"values": [
        {"id": "v3.15", "status": "experimental",
         "links": [{"rel": "self", "href": "http://x/v3"}]}
    ]}}"#;

    let err = ClientBuilder::new("http://keystone.example.org:5000")
        .session(MockSession::new(200, document))
        .build()
        .await
        .unwrap_err();
    assert!(matches!(err, Error::VersionNotAvailable { .. }));

    let client = ClientBuilder::new("http://keystone.example.org:5000")
        .session(MockSession::new(200, document))
        .unstable(true)
        .build()
        .await
        .expect("unstable opt-in should accept the experimental version");
    assert_eq!(client.auth_url(), "http://x/v3");
}

#[tokio::test]
async fn default_registry_dispatches_legacy_family() {
    let session = MockSession::new(
        300,
        r#"{"versions": {"values": [
            {"id": "v2.0", "status": "stable",
             "links": [{"rel": "self", "href": "http://x/v2.0"}]}
        ]}}"#,
    );

    let client = ClientBuilder::new("http://keystone.example.org:5000")
        .session(session)
        .build()
        .await
        .expect("v2.0 should dispatch through the default registry");

    assert!(client
        .as_any()
        .downcast_ref::<keystone_client::v2::Client>()
        .is_some());
    assert_eq!(client.api_version(), keystone_client::ApiVersion::new(2, 0));
}

#[tokio::test]
async fn missing_self_link_is_a_discovery_failure() {
    let session = MockSession::new(
        200,
        r#"{"versions": {"values": [
            {"id": "3.1", "status": "stable",
             "links": [{"rel": "describedby", "href": "http://docs/"}]}
        ]}}"#,
    );

    let err = ClientBuilder::new("http://keystone.example.org:5000")
        .session(session)
        .build()
        .await
        .unwrap_err();

    assert!(matches!(
        err,
        Error::Discovery(DiscoveryError::MissingSelfLink { .. })
    ));
}

#[tokio::test]
async fn malformed_document_is_a_discovery_failure() {
    let session = MockSession::new(200, "not json at all");

    let err = ClientBuilder::new("http://keystone.example.org:5000")
        .session(session)
        .build()
        .await
        .unwrap_err();

    assert!(matches!(err, Error::Discovery(DiscoveryError::Json(_))));
}

#[tokio::test]
async fn auth_plugin_is_forwarded_to_the_dispatched_client() {
    let session = MockSession::new(300, STABLE_V3_DOCUMENT);
    let plugin = Arc::new(StaticTokenPlugin {
        token: "gAAAAABh".to_string(),
    });

    let client = ClientBuilder::new("http://keystone.example.org:5000")
        .session(session.clone())
        .auth_plugin(plugin.clone())
        .arg("region_name", "RegionOne")
        .build()
        .await
        .unwrap();

    let concrete = client
        .as_any()
        .downcast_ref::<keystone_client::v3::Client>()
        .unwrap();

    let token = concrete.get_token().await.unwrap();
    assert_eq!(token.expose(), "gAAAAABh");

    // Unrecognized extra arguments are forwarded, not rejected.
    assert_eq!(
        concrete
            .config()
            .extra()
            .get("region_name")
            .and_then(Value::as_str),
        Some("RegionOne")
    );

    // The plugin satisfies the full contract.
    plugin
        .do_authenticate(session.as_ref(), &Map::new())
        .await
        .unwrap();
    let endpoint = plugin
        .get_endpoint(
            Some(session.as_ref()),
            &EndpointFilter::new().service_type("identity"),
        )
        .await
        .unwrap();
    assert_eq!(endpoint, "http://keystone.example.org:5000/v3");

    let err = plugin
        .get_endpoint(None, &EndpointFilter::new().service_type("compute"))
        .await
        .unwrap_err();
    assert!(matches!(err, AuthError::EndpointNotFound { .. }));
}

#[tokio::test]
async fn client_without_plugin_cannot_issue_tokens() {
    let session = MockSession::new(300, STABLE_V3_DOCUMENT);

    let client = ClientBuilder::new("http://keystone.example.org:5000")
        .session(session)
        .build()
        .await
        .unwrap();

    let concrete = client
        .as_any()
        .downcast_ref::<keystone_client::v3::Client>()
        .unwrap();
    let err = concrete.get_token().await.unwrap_err();
    assert!(matches!(err, AuthError::AuthenticationFailed(_)));
}
