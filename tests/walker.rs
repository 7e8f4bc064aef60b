use serde_json::json;
use sharesync::{ListingWalker, ResponseCache, SyncConfig};
use std::path::Path;
use wiremock::matchers::{method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn config_for(server: &MockServer, root: &Path) -> SyncConfig {
    SyncConfig {
        api_base: server.uri(),
        public_url: "https://disk.example.com/d/walker-test".to_string(),
        output_dir: root.to_path_buf(),
        cache_dir: root.to_path_buf(),
        ..SyncConfig::default()
    }
}

fn page(name: &str, items: serde_json::Value) -> serde_json::Value {
    json!({ "name": name, "_embedded": { "items": items } })
}

fn file_item(name: &str) -> serde_json::Value {
    json!({
        "name": name,
        "type": "file",
        "path": format!("/{}", name),
        "file": format!("https://files.example.com/{}", name),
        "md5": "deadbeef"
    })
}

fn dir_item(name: &str, remote_path: &str) -> serde_json::Value {
    json!({ "name": name, "type": "dir", "path": remote_path })
}

async fn mount_listing(server: &MockServer, offset: &str, remote_path: &str, body: serde_json::Value) {
    Mock::given(method("GET"))
        .and(path("/"))
        .and(query_param("offset", offset))
        .and(query_param("path", remote_path))
        .respond_with(ResponseTemplate::new(200).set_body_json(body))
        .expect(1)
        .mount(server)
        .await;
}

#[tokio::test]
async fn drains_all_pages_of_a_subdirectory_in_order() {
    let server = MockServer::start().await;
    let tmp = tempfile::tempdir().unwrap();

    mount_listing(
        &server,
        "0",
        "/",
        page(
            "root",
            json!([
                dir_item("big", "/big"),
                // Unrecognized kinds are ignored by the walk.
                json!({ "name": "ghost", "type": "weird", "path": "/ghost" }),
            ]),
        ),
    )
    .await;
    mount_listing(
        &server,
        "0",
        "/big",
        page("big", json!([file_item("f0"), file_item("f1"), file_item("f2")])),
    )
    .await;
    mount_listing(
        &server,
        "3",
        "/big",
        page("big", json!([file_item("f3"), file_item("f4")])),
    )
    .await;
    mount_listing(&server, "5", "/big", page("big", json!([]))).await;

    let config = config_for(&server, tmp.path());
    let mut cache = ResponseCache::load(tmp.path().join("cache.json"));
    let mut walker = ListingWalker::new(&config, &mut cache);

    let (files, count) = walker.list(0, "/", tmp.path()).await;

    assert_eq!(count, 5);
    let names: Vec<&str> = files.iter().map(|f| f.name.as_str()).collect();
    assert_eq!(names, ["f0", "f1", "f2", "f3", "f4"]);
    assert_eq!(walker.skipped_subtrees, 0);

    // Directories were materialized parent-before-child.
    assert!(tmp.path().join("root/big").is_dir());
    assert!(files[0].dest.ends_with("root/big/f0"));
}

#[tokio::test]
async fn failing_subtree_is_skipped_without_losing_siblings() {
    let server = MockServer::start().await;
    let tmp = tempfile::tempdir().unwrap();

    mount_listing(
        &server,
        "0",
        "/",
        page(
            "root",
            json!([file_item("a.txt"), dir_item("bad", "/bad"), dir_item("good", "/good")]),
        ),
    )
    .await;

    Mock::given(method("GET"))
        .and(path("/"))
        .and(query_param("path", "/bad"))
        .respond_with(ResponseTemplate::new(500))
        .mount(&server)
        .await;

    mount_listing(&server, "0", "/good", page("good", json!([file_item("g.txt")]))).await;
    mount_listing(&server, "1", "/good", page("good", json!([]))).await;

    let config = config_for(&server, tmp.path());
    let mut cache = ResponseCache::load(tmp.path().join("cache.json"));
    let mut walker = ListingWalker::new(&config, &mut cache);

    let (files, count) = walker.list(0, "/", tmp.path()).await;

    let names: Vec<&str> = files.iter().map(|f| f.name.as_str()).collect();
    assert_eq!(names, ["a.txt", "g.txt"]);
    assert_eq!(count, 2);
    assert_eq!(walker.skipped_subtrees, 1);
}

#[tokio::test]
async fn identical_requests_hit_the_network_once() {
    let server = MockServer::start().await;
    let tmp = tempfile::tempdir().unwrap();

    // expect(1): the second walk must be served from the cache.
    mount_listing(&server, "0", "/", page("root", json!([file_item("a.txt")]))).await;

    let config = config_for(&server, tmp.path());
    let cache_path = tmp.path().join("cache.json");
    let mut cache = ResponseCache::load(&cache_path);

    let mut walker = ListingWalker::new(&config, &mut cache);
    let (first, _) = walker.list(0, "/", tmp.path()).await;
    let mut walker = ListingWalker::new(&config, &mut cache);
    let (second, _) = walker.list(0, "/", tmp.path()).await;

    assert_eq!(first.len(), 1);
    assert_eq!(second.len(), 1);
    // The mapping was persisted for the next session.
    assert!(cache_path.exists());
}

#[tokio::test]
async fn directory_names_are_whitespace_normalized() {
    let server = MockServer::start().await;
    let tmp = tempfile::tempdir().unwrap();

    mount_listing(
        &server,
        "0",
        "/",
        page("My Shared Folder", json!([file_item("a.txt")])),
    )
    .await;

    let config = config_for(&server, tmp.path());
    let mut cache = ResponseCache::load(tmp.path().join("cache.json"));
    let mut walker = ListingWalker::new(&config, &mut cache);

    let (files, _) = walker.list(0, "/", tmp.path()).await;

    assert!(tmp.path().join("My_Shared_Folder").is_dir());
    assert!(files[0].dest.ends_with("My_Shared_Folder/a.txt"));
}
