#![cfg(feature = "api")]
//! PlaylistClient against a local fixture server

use moodtunes::api::PlaylistClient;
use moodtunes::error::ApiError;
use moodtunes::library::Song;
use std::io::Read;
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tiny_http::{Header, Response, Server, StatusCode};

#[derive(Debug, Clone)]
struct Recorded {
    method: String,
    url: String,
    body: String,
}

const PLAYLIST: &str = r#"{
    "_id": "p1",
    "title": "Morning",
    "creatorPubKey": "owner1",
    "songs": [{"videoId": "a1", "title": "Sunrise", "thumbnailUrl": "https://i.ytimg.com/a1.jpg"}]
}"#;

fn json(body: &str) -> Response<std::io::Cursor<Vec<u8>>> {
    Response::from_string(body)
        .with_header("Content-Type: application/json".parse::<Header>().unwrap())
}

fn route(method: &str, url: &str) -> Response<std::io::Cursor<Vec<u8>>> {
    let path = url.split('?').next().unwrap_or(url);
    match (method, path) {
        ("GET", "/playlists/owner1") => json(&format!("[{}]", PLAYLIST)),
        ("GET", "/playlists/single/p1") => json(PLAYLIST),
        ("GET", "/playlists/allSongs/owner1") => json(r#"["a1", "b2"]"#),
        ("POST", "/playlists/p1/add") => json(
            r#"{"_id": "p1", "title": "Morning", "creatorPubKey": "owner1", "songs": [
                {"videoId": "a1", "title": "Sunrise", "thumbnailUrl": ""},
                {"videoId": "c3", "title": "Coffee", "thumbnailUrl": ""}
            ]}"#,
        ),
        ("GET", "/music/youtubeSearch") => {
            if url.contains("nextPageToken=PAGE2") {
                json(r#"{"items": [{"videoId": "s2", "title": "Second", "thumbnailUrl": ""}]}"#)
            } else {
                json(r#"{"items": [{"videoId": "s1", "title": "First", "thumbnailUrl": ""}], "nextPageToken": "PAGE2"}"#)
            }
        }
        ("GET", "/playlists/single/broken") => json("{not json"),
        _ => Response::from_string("not found").with_status_code(StatusCode(404)),
    }
}

fn start_fixture_server() -> (String, Arc<Mutex<Vec<Recorded>>>) {
    let server = Server::http("127.0.0.1:0").unwrap();
    let base = format!("http://{}", server.server_addr());
    let log = Arc::new(Mutex::new(Vec::new()));
    let recorded = log.clone();

    std::thread::spawn(move || {
        for mut request in server.incoming_requests() {
            let mut body = String::new();
            let _ = request.as_reader().read_to_string(&mut body);
            let method = request.method().to_string();
            let url = request.url().to_string();
            let response = route(&method, &url);
            recorded.lock().unwrap().push(Recorded { method, url, body });
            let _ = request.respond(response);
        }
    });

    (base, log)
}

fn client(base: &str) -> PlaylistClient {
    PlaylistClient::new(base, Duration::from_secs(5)).unwrap()
}

#[tokio::test]
async fn test_fetches_playlists_and_song_ids() {
    let (base, _log) = start_fixture_server();
    let client = client(&base);

    let playlists = client.playlists("owner1").await.unwrap();
    assert_eq!(playlists.len(), 1);
    assert_eq!(playlists[0].songs[0].title, "Sunrise");

    let playlist = client.playlist("p1").await.unwrap();
    assert_eq!(playlist.creator_pub_key, "owner1");

    let ids = client.all_song_ids("owner1").await.unwrap();
    assert_eq!(ids, vec!["a1".to_string(), "b2".to_string()]);
}

#[tokio::test]
async fn test_add_song_posts_json_body() {
    let (base, log) = start_fixture_server();
    let client = client(&base);

    let song = Song::new("c3", "Coffee", "https://i.ytimg.com/c3.jpg");
    let updated = client.add_song("p1", &song).await.unwrap();
    assert!(updated.contains("c3"));

    let requests = log.lock().unwrap().clone();
    let post = requests.iter().find(|r| r.method == "POST").unwrap();
    assert_eq!(post.url, "/playlists/p1/add");
    let sent: serde_json::Value = serde_json::from_str(&post.body).unwrap();
    assert_eq!(sent["videoId"], "c3");
    assert_eq!(sent["thumbnailUrl"], "https://i.ytimg.com/c3.jpg");
}

#[tokio::test]
async fn test_search_pager_follows_tokens() {
    let (base, log) = start_fixture_server();
    let client = client(&base);

    let mut pager = client.search_pager("lofi beats");
    let songs = pager.take_pages(5).await.unwrap();
    let ids: Vec<_> = songs.iter().map(|s| s.video_id.as_str()).collect();
    assert_eq!(ids, vec!["s1", "s2"]);
    assert!(!pager.has_more());
    assert!(pager.next_page().await.unwrap().is_none());

    let requests = log.lock().unwrap().clone();
    assert_eq!(requests.len(), 2);
    let first = reqwest::Url::parse(&format!("http://fixture{}", requests[0].url)).unwrap();
    let pairs: Vec<(String, String)> = first.query_pairs().into_owned().collect();
    assert_eq!(
        pairs,
        vec![
            ("q".to_string(), "lofi beats".to_string()),
            ("nextPageToken".to_string(), String::new()),
        ]
    );
}

#[tokio::test]
async fn test_empty_query_makes_no_requests() {
    let (base, log) = start_fixture_server();
    let client = client(&base);

    let mut pager = client.search_pager("");
    assert!(!pager.has_more());
    assert!(pager.next_page().await.unwrap().is_none());
    assert!(log.lock().unwrap().is_empty());

    // Whitespace is still a query
    let songs = client.search_pager("   ").take_pages(1).await.unwrap();
    assert_eq!(songs.len(), 1);
    assert_eq!(log.lock().unwrap().len(), 1);
}

#[tokio::test]
async fn test_error_statuses_and_bad_bodies() {
    let (base, _log) = start_fixture_server();
    let client = client(&base);

    match client.playlist("missing").await {
        Err(ApiError::Status { status, url }) => {
            assert_eq!(status, 404);
            assert!(url.ends_with("/playlists/single/missing"));
        }
        other => panic!("expected status error, got {:?}", other),
    }

    assert!(matches!(
        client.playlist("broken").await,
        Err(ApiError::Decode { .. })
    ));
}
