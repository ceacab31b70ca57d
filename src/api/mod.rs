// Remote playlist/search API client
// Plain request/response over reqwest - no retries, no auth

pub mod search;

pub use search::SearchPager;

use crate::config::ApiConfig;
use crate::error::ApiError;
use crate::library::{Playlist, SearchPage, Song};
use reqwest::{Client, Response, Url};
use serde::de::DeserializeOwned;
use std::time::Duration;
use tracing::debug;

#[derive(Debug, Clone)]
pub struct PlaylistClient {
    http: Client,
    base_url: Url,
}

impl PlaylistClient {
    pub fn new(base_url: &str, timeout: Duration) -> Result<Self, ApiError> {
        let parsed = Url::parse(base_url)
            .map_err(|e| ApiError::BaseUrl(format!("{}: {}", base_url, e)))?;
        if parsed.cannot_be_a_base() {
            return Err(ApiError::BaseUrl(base_url.to_string()));
        }

        let http = Client::builder().timeout(timeout).build()?;
        Ok(Self {
            http,
            base_url: parsed,
        })
    }

    pub fn from_config(config: &ApiConfig) -> Result<Self, ApiError> {
        Self::new(
            &config.base_url,
            Duration::from_secs(config.request_timeout_secs),
        )
    }

    /// All playlists created by `owner_id`
    pub async fn playlists(&self, owner_id: &str) -> Result<Vec<Playlist>, ApiError> {
        self.get_json(self.endpoint(&["playlists", owner_id])).await
    }

    pub async fn playlist(&self, playlist_id: &str) -> Result<Playlist, ApiError> {
        self.get_json(self.endpoint(&["playlists", "single", playlist_id]))
            .await
    }

    /// Video ids of every song across the owner's playlists
    pub async fn all_song_ids(&self, owner_id: &str) -> Result<Vec<String>, ApiError> {
        self.get_json(self.endpoint(&["playlists", "allSongs", owner_id]))
            .await
    }

    /// Append a song; the server answers with the updated playlist
    pub async fn add_song(&self, playlist_id: &str, song: &Song) -> Result<Playlist, ApiError> {
        let url = self.endpoint(&["playlists", playlist_id, "add"]);
        debug!("POST {} ({})", url, song.video_id);
        let response = self.http.post(url.clone()).json(song).send().await?;
        Self::decode(url, response).await
    }

    /// One page of search results; pass an empty token for the first page
    pub async fn search(&self, query: &str, page_token: &str) -> Result<SearchPage, ApiError> {
        let mut url = self.endpoint(&["music", "youtubeSearch"]);
        url.query_pairs_mut()
            .append_pair("q", query)
            .append_pair("nextPageToken", page_token);
        self.get_json(url).await
    }

    pub fn search_pager(&self, query: impl Into<String>) -> SearchPager<'_> {
        SearchPager::new(self, query)
    }

    fn endpoint(&self, segments: &[&str]) -> Url {
        let mut url = self.base_url.clone();
        // new() rejected cannot-be-a-base urls, so this always succeeds
        if let Ok(mut path) = url.path_segments_mut() {
            path.pop_if_empty().extend(segments);
        }
        url
    }

    async fn get_json<T: DeserializeOwned>(&self, url: Url) -> Result<T, ApiError> {
        debug!("GET {}", url);
        let response = self.http.get(url.clone()).send().await?;
        Self::decode(url, response).await
    }

    async fn decode<T: DeserializeOwned>(url: Url, response: Response) -> Result<T, ApiError> {
        let status = response.status();
        if !status.is_success() {
            return Err(ApiError::Status {
                status: status.as_u16(),
                url: url.to_string(),
            });
        }

        let body = response.bytes().await?;
        serde_json::from_slice(&body).map_err(|source| ApiError::Decode {
            url: url.to_string(),
            source,
        })
    }
}
