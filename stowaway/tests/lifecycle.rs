//! Install, activation and side-channel hooks.

mod common;

use common::{MockUpstream, RecordingHost, get};
use http::StatusCode;
use stowaway::backend::{MemoryStorage, Storage, Store};
use stowaway::{
    ClickOutcome, HookError, Manifest, RequestKey, Router, RouterConfig, SkipReason, SyncOutcome,
};
use stowaway_moka::MokaStorage;

fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();
}

#[tokio::test]
async fn install_populates_static_store_with_local_manifest() {
    init_tracing();
    let config = RouterConfig::builder()
        .manifest(Manifest::new(["/", "/static/css/style.css"]))
        .build()
        .unwrap();
    let router = Router::new(MemoryStorage::new(), config);
    let mut upstream = MockUpstream::new()
        .ok("/", "<html>home</html>")
        .ok("/static/css/style.css", "body{}");

    let report = router.install(&mut upstream).await;

    assert!(report.is_complete());
    let store = router.storage().open("foodspots-v1.0.0").await.unwrap();
    let mut keys: Vec<String> = store
        .keys()
        .await
        .unwrap()
        .iter()
        .map(ToString::to_string)
        .collect();
    keys.sort();
    assert_eq!(keys, vec!["GET /", "GET /static/css/style.css"]);
}

#[tokio::test]
async fn installed_assets_are_served_without_network() {
    let config = RouterConfig::builder()
        .manifest(Manifest::new(["/", "/static/js/app.js"]))
        .build()
        .unwrap();
    let router = Router::new(MemoryStorage::new(), config);
    let mut upstream = MockUpstream::new()
        .ok("/", "<html>home</html>")
        .ok("/static/js/app.js", "console.log(1)");
    router.install(&mut upstream).await;
    upstream.set_offline(true);

    let asset = router
        .fetch(&mut upstream, get("/static/js/app.js"))
        .await
        .unwrap();
    let page = router.fetch(&mut upstream, get("/spots/7/")).await.unwrap();

    assert_eq!(asset.snapshot().body().as_ref(), b"console.log(1)");
    assert_eq!(page.snapshot().body().as_ref(), b"<html>home</html>");
}

#[tokio::test]
async fn install_survives_partial_failure() {
    let config = RouterConfig::builder()
        .manifest(Manifest::new([
            "/",
            "/static/icons/icon-512x512.png",
            "https://unpkg.com/leaflet@1.9.4/dist/leaflet.css",
        ]))
        .build()
        .unwrap();
    let router = Router::new(MemoryStorage::new(), config);
    let mut upstream = MockUpstream::new().ok("/", "<html>home</html>");

    let report = router.install(&mut upstream).await;

    assert_eq!(report.store, "foodspots-v1.0.0");
    assert_eq!(report.cached, vec!["/"]);
    assert_eq!(report.failed.len(), 1);
    assert_eq!(report.failed[0].entry, "/static/icons/icon-512x512.png");
    assert_eq!(report.failed[0].reason, SkipReason::Status(StatusCode::NOT_FOUND));
    assert_eq!(upstream.calls(), 2, "external entries are not fetched eagerly");
}

#[tokio::test]
async fn install_offline_still_completes() {
    let router = Router::new(MemoryStorage::new(), RouterConfig::default());
    let mut upstream = MockUpstream::new();
    upstream.set_offline(true);

    let report = router.install(&mut upstream).await;

    assert!(report.cached.is_empty());
    assert_eq!(report.failed.len(), 5);
    assert!(report.failed.iter().all(|f| f.reason == SkipReason::Network));
    assert!(router.storage().contains("foodspots-v1.0.0").await.unwrap());
}

#[tokio::test]
async fn activation_deletes_superseded_stores() {
    let storage = MokaStorage::builder().max_entries(100).build();
    for name in [
        "foodspots-v0.9.0",
        "foodspots-v1.0.0",
        "foodspots-runtime-v0.9.0",
        "foodspots-runtime-v1.0.0",
        "unrelated",
    ] {
        storage.open(name).await.unwrap();
    }
    let router = Router::new(storage, RouterConfig::default());
    let host = RecordingHost::default();

    let report = router.activate(&host).await.unwrap();

    assert_eq!(
        report.deleted,
        vec!["foodspots-v0.9.0", "foodspots-runtime-v0.9.0", "unrelated"]
    );
    assert_eq!(
        router.storage().names().await.unwrap(),
        vec!["foodspots-v1.0.0", "foodspots-runtime-v1.0.0"]
    );
    assert_eq!(host.events(), vec!["claim"]);
}

#[tokio::test]
async fn version_bump_garbage_collects_previous_generation() {
    let storage = MemoryStorage::new();
    let old = Router::new(storage.clone(), RouterConfig::default());
    let mut upstream = MockUpstream::new().ok("/", "<html>v1</html>");
    old.install(&mut upstream).await;

    let config = RouterConfig::builder()
        .version_tags("foodspots-v1.1.0", "foodspots-runtime-v1.1.0")
        .build()
        .unwrap();
    let new = Router::new(storage.clone(), config);
    new.install(&mut upstream).await;
    let report = new.activate(&RecordingHost::default()).await.unwrap();

    assert_eq!(report.deleted, vec!["foodspots-v1.0.0"]);
    assert_eq!(storage.names().await.unwrap(), vec!["foodspots-v1.1.0"]);
    let store = storage.open("foodspots-v1.1.0").await.unwrap();
    assert!(store.has(&RequestKey::get("/".parse().unwrap())));
}

#[tokio::test]
async fn activation_reports_client_failures() {
    let router = Router::new(MemoryStorage::new(), RouterConfig::default());

    let result = router.activate(&RecordingHost::failing()).await;

    assert!(matches!(result, Err(HookError::Clients(_))));
}

#[tokio::test]
async fn favorites_sync_resolves_and_other_tags_are_ignored() {
    let router = Router::new(MemoryStorage::new(), RouterConfig::default());

    assert_eq!(router.on_sync("sync-favorites").await, SyncOutcome::Completed);
    assert_eq!(router.on_sync("sync-reviews").await, SyncOutcome::Ignored);
}

#[tokio::test]
async fn push_shows_notification_with_defaults() {
    let router = Router::new(MemoryStorage::new(), RouterConfig::default());
    let host = RecordingHost::default();

    let notification = router
        .on_push(&host, Some(br#"{"body":"Ramen bar opened"}"#.as_slice()))
        .await
        .unwrap();

    assert_eq!(notification.title, "Food Spots Finder");
    assert_eq!(notification.body, "Ramen bar opened");
    assert_eq!(notification.data, "/");
    assert_eq!(host.events(), vec!["show Food Spots Finder"]);
}

#[tokio::test]
async fn click_focuses_open_client() {
    let router = Router::new(MemoryStorage::new(), RouterConfig::default());
    let host = RecordingHost::with_open(&["/spots/42/"]);
    let notification = router
        .on_push(
            &host,
            Some(br#"{"title":"Taco truck","url":"/spots/42/"}"#.as_slice()),
        )
        .await
        .unwrap();

    let outcome = router
        .on_notification_click(&host, &host, &notification)
        .await
        .unwrap();

    assert_eq!(outcome, ClickOutcome::Focused("/spots/42/".to_owned()));
    assert_eq!(
        host.events(),
        vec!["show Taco truck", "close Taco truck", "focus /spots/42/"]
    );
}

#[tokio::test]
async fn click_opens_window_when_no_client_matches() {
    let router = Router::new(MemoryStorage::new(), RouterConfig::default());
    let host = RecordingHost::default();
    let notification = router.on_push(&host, None).await.unwrap();

    let outcome = router
        .on_notification_click(&host, &host, &notification)
        .await
        .unwrap();

    assert_eq!(outcome, ClickOutcome::Opened("/".to_owned()));
    assert_eq!(host.events().last().unwrap(), "open /");
}

#[tokio::test]
async fn yaml_configuration_drives_the_router() {
    let config = RouterConfig::from_yaml(
        r#"
static_cache: spots-static-v7
runtime_cache: spots-runtime-v7
api_prefix: /v2/
manifest:
  - /
notifications:
  title: Spots
"#,
    )
    .unwrap();
    let router = Router::new(MemoryStorage::new(), config);
    let mut upstream = MockUpstream::new().ok("/", "<html/>").ok("/v2/spots/", "[]");

    router.install(&mut upstream).await;
    router.fetch(&mut upstream, get("/v2/spots/")).await.unwrap();
    router.offload().wait_all().await;

    assert_eq!(
        router.storage().names().await.unwrap(),
        vec!["spots-static-v7", "spots-runtime-v7"]
    );
    let notification = router.on_push(&RecordingHost::default(), None).await.unwrap();
    assert_eq!(notification.title, "Spots");
    assert_eq!(notification.body, "New food spot nearby!");
}
