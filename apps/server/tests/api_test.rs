use std::net::SocketAddr;
use std::pin::Pin;
use std::time::Duration;

use futures::{Stream, StreamExt};
use serde_json::{json, Value};

use linkstash_server::{api::app_router, build_state, config::Config};

async fn spawn_server() -> (SocketAddr, tempfile::TempDir) {
    let dir = tempfile::tempdir().unwrap();
    let config = Config {
        listen_addr: "127.0.0.1:0".parse().unwrap(),
        db_path: dir.path().join("app.db").to_string_lossy().to_string(),
        cors_allow: vec!["*".to_string()],
        request_timeout: Duration::from_secs(30),
        static_dir: dir.path().to_string_lossy().to_string(),
    };

    let state = build_state(&config).await.unwrap();
    let router = app_router(state, &config);
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, router).await.unwrap();
    });
    (addr, dir)
}

fn api(addr: SocketAddr, path: &str) -> String {
    format!("http://{}/api/v1{}", addr, path)
}

/// Minimal SSE reader over a reqwest byte stream. Skips keep-alive comments.
struct EventStream {
    inner: Pin<Box<dyn Stream<Item = Vec<u8>> + Send>>,
    buf: String,
}

impl EventStream {
    async fn open(addr: SocketAddr, owner: &str) -> Self {
        let url = api(addr, &format!("/events/stream?ownerIdentity={}", owner));
        let response = reqwest::get(&url).await.unwrap();
        assert!(response.status().is_success());
        let inner = response
            .bytes_stream()
            .map(|chunk| chunk.unwrap().to_vec())
            .boxed();
        Self {
            inner,
            buf: String::new(),
        }
    }

    async fn next_event(&mut self) -> (String, Value) {
        loop {
            if let Some(block_end) = self.buf.find("\n\n") {
                let block: String = self.buf.drain(..block_end + 2).collect();
                let mut name = None;
                let mut data = None;
                for line in block.lines() {
                    if let Some(rest) = line.strip_prefix("event:") {
                        name = Some(rest.trim().to_string());
                    } else if let Some(rest) = line.strip_prefix("data:") {
                        data = Some(rest.trim().to_string());
                    }
                }
                match (name, data) {
                    (Some(name), Some(data)) => {
                        return (name, serde_json::from_str(&data).unwrap())
                    }
                    // keep-alive comment block
                    _ => continue,
                }
            }
            let chunk = self.inner.next().await.expect("SSE stream ended");
            self.buf.push_str(std::str::from_utf8(&chunk).unwrap());
        }
    }

    /// Asserts that no event arrives within `window`.
    async fn expect_silence(&mut self, window: Duration) {
        let received = tokio::time::timeout(window, self.next_event()).await;
        assert!(received.is_err(), "unexpected event: {:?}", received);
    }
}

#[tokio::test]
async fn create_list_delete_scoped_to_owner() {
    let (addr, _dir) = spawn_server().await;
    let client = reqwest::Client::new();

    // Create echoes the inputs and assigns id + createdAt.
    let created: Value = client
        .post(api(addr, "/bookmarks"))
        .json(&json!({"ownerIdentity": "a@x.com", "title": "Docs", "url": "http://x"}))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(created["ownerIdentity"], "a@x.com");
    assert_eq!(created["title"], "Docs");
    assert_eq!(created["url"], "http://x");
    assert!(created["id"].as_str().is_some_and(|id| !id.is_empty()));
    assert!(created["createdAt"].is_string());

    // Second record for the same owner, one for another owner.
    let newer: Value = client
        .post(api(addr, "/bookmarks"))
        .json(&json!({"ownerIdentity": "a@x.com", "title": "News", "url": "http://y"}))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    client
        .post(api(addr, "/bookmarks"))
        .json(&json!({"ownerIdentity": "b@x.com", "title": "Other", "url": "http://z"}))
        .send()
        .await
        .unwrap();

    // Listing is owner-scoped, newest first.
    let listed: Vec<Value> = client
        .get(api(addr, "/bookmarks?ownerIdentity=a@x.com"))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(listed.len(), 2);
    assert_eq!(listed[0]["id"], newer["id"]);
    assert_eq!(listed[1]["id"], created["id"]);

    // Listing without an identity is a validation failure.
    let response = client.get(api(addr, "/bookmarks")).send().await.unwrap();
    assert_eq!(response.status(), 400);
    let body: Value = response.json().await.unwrap();
    assert_eq!(body["code"], 400);

    // Deleting with the wrong owner reports not-found and keeps the record.
    let response = client
        .delete(api(addr, &format!("/bookmarks/{}", created["id"].as_str().unwrap())))
        .json(&json!({"ownerIdentity": "b@x.com"}))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), 404);
    let listed: Vec<Value> = client
        .get(api(addr, "/bookmarks?ownerIdentity=a@x.com"))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(listed.len(), 2);

    // Deleting with the right owner succeeds once, then reports not-found.
    let response = client
        .delete(api(addr, &format!("/bookmarks/{}", created["id"].as_str().unwrap())))
        .json(&json!({"ownerIdentity": "a@x.com"}))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), 200);
    let body: Value = response.json().await.unwrap();
    assert_eq!(body["success"], true);

    let response = client
        .delete(api(addr, &format!("/bookmarks/{}", created["id"].as_str().unwrap())))
        .json(&json!({"ownerIdentity": "a@x.com"}))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), 404);
}

#[tokio::test]
async fn push_events_fan_out_per_identity() {
    let (addr, _dir) = spawn_server().await;
    let client = reqwest::Client::new();

    let mut stream_a = EventStream::open(addr, "a@x.com").await;
    let mut stream_b = EventStream::open(addr, "b@x.com").await;

    let created: Value = client
        .post(api(addr, "/bookmarks"))
        .json(&json!({"ownerIdentity": "a@x.com", "title": "Docs", "url": "http://x"}))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();

    // The owner's group receives the identical record.
    let (name, payload) = stream_a.next_event().await;
    assert_eq!(name, "bookmark-created");
    assert_eq!(payload, created);

    // The other identity's group hears nothing.
    stream_b.expect_silence(Duration::from_millis(300)).await;

    // Deletion pushes the bare record id to the owner's group.
    let id = created["id"].as_str().unwrap();
    let response = client
        .delete(api(addr, &format!("/bookmarks/{}", id)))
        .json(&json!({"ownerIdentity": "a@x.com"}))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), 200);

    let (name, payload) = stream_a.next_event().await;
    assert_eq!(name, "bookmark-deleted");
    assert_eq!(payload, json!(id));

    stream_b.expect_silence(Duration::from_millis(300)).await;
}

#[tokio::test]
async fn failed_delete_pushes_nothing() {
    let (addr, _dir) = spawn_server().await;
    let client = reqwest::Client::new();

    let mut stream = EventStream::open(addr, "a@x.com").await;

    let response = client
        .delete(api(addr, "/bookmarks/does-not-exist"))
        .json(&json!({"ownerIdentity": "a@x.com"}))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), 404);

    // A sentinel create proves the failed delete queued no event ahead of it.
    client
        .post(api(addr, "/bookmarks"))
        .json(&json!({"ownerIdentity": "a@x.com", "title": "Docs", "url": "http://x"}))
        .send()
        .await
        .unwrap();

    let (name, _) = stream.next_event().await;
    assert_eq!(name, "bookmark-created");
}
