use std::sync::Arc;

use base64::{Engine, engine::general_purpose::URL_SAFE_NO_PAD};
use podline_auth::{
    AuthError, DiscoveryConfig, IdentityFlow, MemoryNavigator, MemorySessionStorage, Navigator,
    OidcAuthClient, OidcClientConfig, PersistedSession, SessionEvent, SessionStorage,
};
use serde_json::json;
use time::OffsetDateTime;
use url::Url;
use wiremock::matchers::{body_partial_json, body_string_contains, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

const WEB_ID: &str = "https://alice.example/profile/card#me";
const APP_URL: &str = "http://localhost:3000/app";

fn id_token(issuer: &str) -> String {
    let header = URL_SAFE_NO_PAD.encode(br#"{"alg":"ES256","typ":"JWT"}"#);
    let payload = URL_SAFE_NO_PAD.encode(
        json!({ "iss": issuer, "sub": "alice", "webid": WEB_ID, "aud": "client-1" }).to_string(),
    );
    format!("{header}.{payload}.c2lnbmF0dXJl")
}

async fn identity_provider() -> MockServer {
    let server = MockServer::start().await;
    let uri = server.uri();
    Mock::given(method("GET"))
        .and(path("/.well-known/openid-configuration"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "issuer": uri,
            "authorization_endpoint": format!("{uri}/authorize"),
            "token_endpoint": format!("{uri}/token"),
            "registration_endpoint": format!("{uri}/register"),
            "scopes_supported": ["openid", "offline_access", "webid"]
        })))
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path("/register"))
        .and(body_partial_json(json!({ "client_name": "demo" })))
        .respond_with(ResponseTemplate::new(201).set_body_json(json!({ "client_id": "client-1" })))
        .mount(&server)
        .await;
    server
}

fn auth_client(storage: Arc<MemorySessionStorage>) -> Arc<OidcAuthClient> {
    let config = OidcClientConfig {
        discovery: DiscoveryConfig::default().with_allow_http(true),
        ..OidcClientConfig::default()
    };
    Arc::new(OidcAuthClient::new(reqwest::Client::new(), config, storage))
}

fn page(url: &str) -> Arc<MemoryNavigator> {
    Arc::new(MemoryNavigator::new(Url::parse(url).unwrap()))
}

fn query_param(url: &Url, name: &str) -> Option<String> {
    url.query_pairs()
        .find(|(k, _)| k == name)
        .map(|(_, v)| v.into_owned())
}

#[tokio::test]
async fn login_redirect_and_restore_across_runs() {
    let idp = identity_provider().await;
    Mock::given(method("POST"))
        .and(path("/token"))
        .and(body_string_contains("grant_type=authorization_code"))
        .and(body_string_contains("code=code-1"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "access_token": "access-1",
            "token_type": "Bearer",
            "expires_in": 3600,
            "refresh_token": "refresh-1",
            "id_token": id_token(&idp.uri())
        })))
        .expect(1)
        .mount(&idp)
        .await;
    let storage = Arc::new(MemorySessionStorage::new());

    // first run: start the login
    let nav = page(APP_URL);
    let flow = IdentityFlow::new(auth_client(storage.clone()), nav.clone());
    assert!(!flow.restore_session().await.unwrap().is_logged_in());
    assert_eq!(flow.start_login(&idp.uri()).await.unwrap(), None);

    let authorize = nav.current_url();
    assert_eq!(authorize.path(), "/authorize");
    assert_eq!(query_param(&authorize, "client_id").as_deref(), Some("client-1"));
    assert_eq!(query_param(&authorize, "redirect_uri").as_deref(), Some(APP_URL));
    assert_eq!(
        query_param(&authorize, "code_challenge_method").as_deref(),
        Some("S256")
    );
    let state = query_param(&authorize, "state").unwrap();
    assert!(storage.has_pending().await);

    // second run: the provider sent the user back
    let returned = format!("{APP_URL}?code=code-1&state={state}");
    let nav = page(&returned);
    let flow = IdentityFlow::new(auth_client(storage.clone()), nav.clone());
    let mut events = flow.on_restore();
    let session = flow.restore_session().await.unwrap();

    assert!(session.is_logged_in());
    assert_eq!(session.subject_id(), Some(WEB_ID));
    assert_eq!(nav.replaced(), vec![Url::parse(APP_URL).unwrap()]);
    assert_eq!(
        events.try_recv(),
        Some(SessionEvent::Restored {
            url: Url::parse(APP_URL).unwrap(),
            web_id: Some(WEB_ID.into())
        })
    );
    let persisted = storage.load_session().await.unwrap().unwrap();
    assert_eq!(persisted.access_token, "access-1");

    // third run: nothing in the URL, session comes back from storage
    let nav = page(APP_URL);
    let flow = IdentityFlow::new(auth_client(storage.clone()), nav.clone());
    let mut events = flow.on_restore();
    let session = flow.restore_session().await.unwrap();
    assert!(session.is_logged_in());
    assert!(nav.replaced().is_empty());
    assert!(matches!(events.try_recv(), Some(SessionEvent::Restored { .. })));

    flow.logout().await.unwrap();
    assert!(storage.load_session().await.unwrap().is_none());
}

#[tokio::test]
async fn state_mismatch_is_rejected() {
    let idp = identity_provider().await;
    Mock::given(method("POST"))
        .and(path("/token"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "access_token": "x" })))
        .expect(0)
        .mount(&idp)
        .await;
    let storage = Arc::new(MemorySessionStorage::new());

    let nav = page(APP_URL);
    let flow = IdentityFlow::new(auth_client(storage.clone()), nav);
    flow.start_login(&idp.uri()).await.unwrap();

    let nav = page(&format!("{APP_URL}?code=code-1&state=forged"));
    let flow = IdentityFlow::new(auth_client(storage.clone()), nav);
    let err = flow.restore_session().await.unwrap_err();
    assert!(matches!(err, AuthError::StateMismatch));
}

#[tokio::test]
async fn invalid_issuer_surfaces_without_network() {
    let storage = Arc::new(MemorySessionStorage::new());
    let nav = page(APP_URL);
    let flow = IdentityFlow::new(auth_client(storage.clone()), nav.clone());

    let err = flow.start_login("::not-an-issuer::").await.unwrap_err();
    assert!(matches!(err, AuthError::InvalidIssuer(_)));
    assert!(nav.navigated().is_empty());
    assert!(!storage.has_pending().await);
}

fn expired_session(token_endpoint: String) -> PersistedSession {
    PersistedSession {
        issuer: "https://idp.example".into(),
        token_endpoint,
        client_id: "client-1".into(),
        client_secret: None,
        web_id: Some(WEB_ID.into()),
        access_token: "stale".into(),
        refresh_token: Some("refresh-1".into()),
        expires_at: Some(OffsetDateTime::now_utc() - time::Duration::minutes(5)),
    }
}

#[tokio::test]
async fn expired_session_is_refreshed_on_restore() {
    let idp = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/token"))
        .and(body_string_contains("grant_type=refresh_token"))
        .and(body_string_contains("refresh_token=refresh-1"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "access_token": "fresh",
            "expires_in": 600
        })))
        .expect(1)
        .mount(&idp)
        .await;

    let storage = Arc::new(MemorySessionStorage::new());
    storage
        .save_session(&expired_session(format!("{}/token", idp.uri())))
        .await
        .unwrap();

    let flow = IdentityFlow::new(auth_client(storage.clone()), page(APP_URL));
    let session = flow.restore_session().await.unwrap();
    assert!(session.is_logged_in());
    assert_eq!(session.subject_id(), Some(WEB_ID));

    let persisted = storage.load_session().await.unwrap().unwrap();
    assert_eq!(persisted.access_token, "fresh");
    assert_eq!(persisted.refresh_token.as_deref(), Some("refresh-1"));
}

#[tokio::test]
async fn failed_refresh_logs_out() {
    let idp = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/token"))
        .respond_with(ResponseTemplate::new(400).set_body_json(json!({ "error": "invalid_grant" })))
        .mount(&idp)
        .await;

    let storage = Arc::new(MemorySessionStorage::new());
    storage
        .save_session(&expired_session(format!("{}/token", idp.uri())))
        .await
        .unwrap();

    let flow = IdentityFlow::new(auth_client(storage.clone()), page(APP_URL));
    let mut events = flow.on_restore();
    let session = flow.restore_session().await.unwrap();
    assert!(!session.is_logged_in());
    assert!(storage.load_session().await.unwrap().is_none());
    assert_eq!(events.try_recv(), None);
}
