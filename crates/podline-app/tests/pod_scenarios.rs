use std::sync::Arc;

use podline_app::{
    DeleteOutcome, MemoryLog, ProfileError, ProfileResolver, RecordDocuments, RoundTripError,
};
use podline_auth::{Session, SessionInfo};
use podline_core::vocab::{dcterms, foaf, pim, vcard};
use podline_core::{PodFetch, Profile};
use podline_dataset::{Dataset, DatasetStore, Entity, HttpDatasetStore, MemoryDatasetStore};
use serde_json::json;
use url::Url;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

const ALICE: &str = "https://alice.example/profile/card#me";

fn session_for(web_id: &str) -> Session {
    Session::new(
        SessionInfo {
            is_logged_in: true,
            web_id: Some(web_id.to_string()),
            ..SessionInfo::default()
        },
        PodFetch::with_bearer(reqwest::Client::new(), "token"),
    )
}

fn logged_out() -> Session {
    Session::logged_out(reqwest::Client::new())
}

fn alice_profile(storage: Option<&str>, name: (&str, &str)) -> Dataset {
    let mut me = Entity::new(ALICE);
    me.set_string(name.0, name.1);
    if let Some(storage) = storage {
        me.set_iri(pim::STORAGE, storage);
    }
    let mut dataset = Dataset::new();
    dataset.set_entity(me);
    dataset
}

fn url(s: &str) -> Url {
    Url::parse(s).unwrap()
}

#[tokio::test]
async fn alice_scenario_resolves_target_document() {
    let store = Arc::new(MemoryDatasetStore::new());
    store
        .insert(
            &url("https://alice.example/profile/card"),
            alice_profile(Some("https://alice.example/storage/"), (vcard::FN, "Alice")),
        )
        .await;

    let profile = ProfileResolver::new(store.clone())
        .resolve(&session_for(ALICE))
        .await
        .unwrap();
    assert_eq!(profile.display_name.as_deref(), Some("Alice"));
    assert_eq!(
        profile.storage_location,
        Some(url("https://alice.example/storage/"))
    );

    let documents = RecordDocuments::new(store, Arc::new(MemoryLog::new()));
    assert_eq!(
        documents.target_document_url(&profile).unwrap().as_str(),
        "https://alice.example/storage/podline-demo.jsonld"
    );
}

#[tokio::test]
async fn display_name_falls_back_to_foaf_name() {
    let store = Arc::new(MemoryDatasetStore::new());
    store
        .insert(
            &url("https://alice.example/profile/card"),
            alice_profile(None, (foaf::NAME, "Alice A.")),
        )
        .await;

    let profile = ProfileResolver::new(store)
        .resolve(&session_for(ALICE))
        .await
        .unwrap();
    assert_eq!(profile.display_name.as_deref(), Some("Alice A."));
    assert_eq!(profile.storage_location, None);
}

#[tokio::test]
async fn document_without_subject_is_an_empty_profile() {
    let store = Arc::new(MemoryDatasetStore::new());
    store
        .insert(
            &url("https://alice.example/profile/card"),
            alice_profile(Some("https://alice.example/storage/"), (vcard::FN, "Alice")),
        )
        .await;

    let profile = ProfileResolver::new(store)
        .resolve(&session_for("https://alice.example/profile/card#someone-else"))
        .await
        .unwrap();
    assert!(profile.is_empty());
}

#[tokio::test]
async fn logged_out_profile_makes_no_requests() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&server)
        .await;

    let resolver = ProfileResolver::new(Arc::new(HttpDatasetStore::new()));
    let profile = resolver.resolve(&logged_out()).await.unwrap();
    assert_eq!(profile, Profile::default());

    // a subject without credentials is still logged out
    let stale = Session::new(
        SessionInfo {
            is_logged_in: false,
            web_id: Some(format!("{}/profile/card#me", server.uri())),
            ..SessionInfo::default()
        },
        PodFetch::unauthenticated(),
    );
    assert!(resolver.resolve(&stale).await.unwrap().is_empty());
}

#[tokio::test]
async fn profile_over_http_strips_fragment() {
    let server = MockServer::start().await;
    let web_id = format!("{}/profile/card#me", server.uri());
    Mock::given(method("GET"))
        .and(path("/profile/card"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([{
            "@id": web_id,
            "http://www.w3.org/2006/vcard/ns#fn": [{ "@value": "Alice" }],
            "http://www.w3.org/ns/pim/space#storage": [{ "@id": format!("{}/storage/", server.uri()) }]
        }])))
        .expect(1)
        .mount(&server)
        .await;

    let profile = ProfileResolver::new(Arc::new(HttpDatasetStore::new()))
        .resolve(&session_for(&web_id))
        .await
        .unwrap();
    assert_eq!(profile.display_name.as_deref(), Some("Alice"));
    assert_eq!(
        profile.storage_location.unwrap().as_str(),
        format!("{}/storage/", server.uri())
    );
}

#[tokio::test]
async fn profile_subject_matches_in_normalized_form() {
    let server = MockServer::start().await;
    // No path: the document lists the subject as written, without the "/".
    let web_id = format!("{}#me", server.uri());
    Mock::given(method("GET"))
        .and(path("/"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([{
            "@id": web_id,
            "http://www.w3.org/2006/vcard/ns#fn": [{ "@value": "Alice" }]
        }])))
        .expect(1)
        .mount(&server)
        .await;

    let profile = ProfileResolver::new(Arc::new(HttpDatasetStore::new()))
        .resolve(&session_for(&web_id))
        .await
        .unwrap();
    assert_eq!(profile.display_name.as_deref(), Some("Alice"));
}

#[tokio::test]
async fn profile_fetch_failure_is_not_an_empty_profile() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(500))
        .mount(&server)
        .await;

    let err = ProfileResolver::new(Arc::new(HttpDatasetStore::new()))
        .resolve(&session_for(&format!("{}/profile/card#me", server.uri())))
        .await
        .unwrap_err();
    assert!(matches!(err, ProfileError::Fetch(_)));
}

#[tokio::test]
async fn round_trip_returns_the_written_record() {
    let store = Arc::new(MemoryDatasetStore::new());
    let documents = RecordDocuments::new(store.clone(), Arc::new(MemoryLog::new()));
    let session = session_for(ALICE);
    let target = url("https://alice.example/storage/podline-demo.jsonld");

    let report = documents.create_and_store(&session, &target).await.unwrap();
    let records = documents.fetch_and_list(&session, &target).await;

    assert_eq!(records.len(), 1);
    assert_eq!(records[0].identifier, report.record.identifier);
    assert_eq!(records[0].title.as_deref(), Some("some title"));
    assert_eq!(records[0].timestamp, report.record.timestamp);
}

#[tokio::test]
async fn create_is_the_same_with_or_without_a_previous_document() {
    let store = Arc::new(MemoryDatasetStore::new());
    let log = Arc::new(MemoryLog::new());
    let documents = RecordDocuments::new(store.clone(), log.clone());
    let session = session_for(ALICE);

    let fresh = url("https://alice.example/storage/fresh.jsonld");
    let report = documents.create_and_store(&session, &fresh).await.unwrap();
    assert!(matches!(report.delete, DeleteOutcome::NotFound));

    let existing = url("https://alice.example/storage/existing.jsonld");
    let mut old = Dataset::new();
    for id in ["old-1", "old-2"] {
        let mut entity = Entity::new(format!("{existing}#{id}"));
        entity.set_string(dcterms::TITLE, "stale");
        old.set_entity(entity);
    }
    store.insert(&existing, old).await;
    let report = documents.create_and_store(&session, &existing).await.unwrap();
    assert!(matches!(report.delete, DeleteOutcome::Deleted));

    for target in [&fresh, &existing] {
        let records = documents.fetch_and_list(&session, target).await;
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].title.as_deref(), Some("some title"));
    }
    assert!(log.errors().is_empty());
}

#[tokio::test]
async fn failed_delete_does_not_stop_the_write() {
    let server = MockServer::start().await;
    Mock::given(method("DELETE"))
        .respond_with(ResponseTemplate::new(405))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("PUT"))
        .and(path("/storage/podline-demo.jsonld"))
        .respond_with(ResponseTemplate::new(201))
        .expect(1)
        .mount(&server)
        .await;

    let log = Arc::new(MemoryLog::new());
    let documents = RecordDocuments::new(Arc::new(HttpDatasetStore::new()), log.clone());
    let target = url(&format!("{}/storage/podline-demo.jsonld", server.uri()));
    let report = documents
        .create_and_store(&session_for(ALICE), &target)
        .await
        .unwrap();

    assert!(report.delete.is_failed());
    assert_eq!(log.errors().len(), 1);
}

#[tokio::test]
async fn failed_write_is_surfaced() {
    let server = MockServer::start().await;
    Mock::given(method("DELETE"))
        .respond_with(ResponseTemplate::new(404))
        .mount(&server)
        .await;
    Mock::given(method("PUT"))
        .respond_with(ResponseTemplate::new(403))
        .mount(&server)
        .await;

    let documents = RecordDocuments::new(
        Arc::new(HttpDatasetStore::new()),
        Arc::new(MemoryLog::new()),
    );
    let target = url(&format!("{}/storage/podline-demo.jsonld", server.uri()));
    let err = documents
        .create_and_store(&session_for(ALICE), &target)
        .await
        .unwrap_err();
    assert!(matches!(err, RoundTripError::Write(e) if e.is_unauthorized()));
}

#[tokio::test]
async fn missing_document_lists_nothing_and_logs_once() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(404))
        .expect(1)
        .mount(&server)
        .await;

    let log = Arc::new(MemoryLog::new());
    let documents = RecordDocuments::new(Arc::new(HttpDatasetStore::new()), log.clone());
    let target = url(&format!("{}/storage/nothing-here.jsonld", server.uri()));

    let records = documents.fetch_and_list(&session_for(ALICE), &target).await;
    assert!(records.is_empty());
    assert_eq!(log.errors().len(), 1);
    assert!(log.errors()[0].starts_with("error whilst getting"));

    let err = documents
        .try_fetch_and_list(&session_for(ALICE), &target)
        .await
        .unwrap_err();
    assert!(matches!(err, RoundTripError::Read(e) if e.is_not_found()));
}

#[tokio::test]
async fn partial_entities_still_produce_records() {
    let server = MockServer::start().await;
    let doc = format!("{}/storage/podline-demo.jsonld", server.uri());
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([
            {
                "@id": format!("{doc}#full"),
                "http://purl.org/dc/terms/title": [{ "@value": "complete" }],
                "http://purl.org/dc/terms/created": [{
                    "@value": "2024-03-01T10:00:00.5Z",
                    "@type": "http://www.w3.org/2001/XMLSchema#dateTime"
                }]
            },
            { "@id": format!("{doc}#untitled"), "http://purl.org/dc/terms/created": [{
                "@value": "not a date",
                "@type": "http://www.w3.org/2001/XMLSchema#dateTime"
            }] },
            { "@id": format!("{doc}#undated"), "http://purl.org/dc/terms/title": [{ "@value": "no date" }] }
        ])))
        .mount(&server)
        .await;

    let documents = RecordDocuments::new(
        Arc::new(HttpDatasetStore::new()),
        Arc::new(MemoryLog::new()),
    );
    let records = documents
        .fetch_and_list(&session_for(ALICE), &url(&doc))
        .await;

    let ids: Vec<&str> = records.iter().map(|r| r.identifier.as_str()).collect();
    assert_eq!(ids, vec!["full", "untitled", "undated"]);
    assert!(!records[0].is_partial());
    assert_eq!(records[1].title, None);
    assert_eq!(records[1].timestamp, None);
    assert_eq!(records[2].title.as_deref(), Some("no date"));
    assert_eq!(records[2].timestamp, None);
}

#[tokio::test]
async fn logged_out_session_cannot_write_or_read() {
    let store = Arc::new(MemoryDatasetStore::new());
    let log = Arc::new(MemoryLog::new());
    let documents = RecordDocuments::new(store.clone(), log.clone());
    let target = url("https://alice.example/storage/podline-demo.jsonld");

    let err = documents
        .create_and_store(&logged_out(), &target)
        .await
        .unwrap_err();
    assert!(matches!(err, RoundTripError::NotAuthenticated));

    assert!(documents.fetch_and_list(&logged_out(), &target).await.is_empty());
    assert_eq!(log.errors().len(), 1);
    assert_eq!(store.request_count(), 0);
}

#[tokio::test]
async fn lists_container_members() {
    let store = Arc::new(MemoryDatasetStore::new());
    let container = url("https://alice.example/storage/");
    let mut entity = Entity::new(container.as_str());
    entity.set_iri(podline_core::vocab::ldp::CONTAINS, "podline-demo.jsonld");
    let mut dataset = Dataset::new();
    dataset.set_entity(entity);
    store.insert(&container, dataset).await;

    let documents = RecordDocuments::new(store.clone(), Arc::new(MemoryLog::new()));
    let members = documents
        .list_container(&session_for(ALICE), &container)
        .await
        .unwrap();
    assert_eq!(
        members,
        vec![url("https://alice.example/storage/podline-demo.jsonld")]
    );
    assert!(store.backend_name() == "memory");
}
