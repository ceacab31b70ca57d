use serde::{Deserialize, Serialize};

use crate::player::MediaId;

/// A playable song as the remote API describes it
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Song {
    pub video_id: String,
    pub title: String,
    pub thumbnail_url: String,
}

impl Song {
    pub fn new(video_id: impl Into<String>, title: impl Into<String>, thumbnail_url: impl Into<String>) -> Self {
        Self {
            video_id: video_id.into(),
            title: title.into(),
            thumbnail_url: thumbnail_url.into(),
        }
    }

    /// Identifier to hand to the player session
    pub fn media_id(&self) -> MediaId {
        MediaId::new(self.video_id.clone())
    }
}

/// A named list of songs owned by one creator
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Playlist {
    #[serde(rename = "_id")]
    pub id: String,
    pub title: String,
    pub creator_pub_key: String,
    #[serde(default)]
    pub songs: Vec<Song>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_at: Option<String>,
}

impl Playlist {
    pub fn contains(&self, video_id: &str) -> bool {
        self.songs.iter().any(|s| s.video_id == video_id)
    }

    pub fn is_empty(&self) -> bool {
        self.songs.is_empty()
    }

    pub fn len(&self) -> usize {
        self.songs.len()
    }
}

/// Every video id in one playlist, used to mark already-saved search results
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PlaylistSongIds {
    #[serde(rename = "_id")]
    pub id: String,
    pub video_ids: Vec<String>,
}

/// One page of search results
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SearchPage {
    #[serde(default)]
    pub items: Vec<Song>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub next_page_token: Option<String>,
}

impl SearchPage {
    /// Token for the following page; empty tokens count as the end
    pub fn next_token(&self) -> Option<&str> {
        self.next_page_token.as_deref().filter(|token| !token.is_empty())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn playlist() -> Playlist {
        serde_json::from_str(
            r#"{
                "_id": "683d18f57501160e6503c0cd",
                "title": "Rainy days",
                "creatorPubKey": "npub1xyz",
                "songs": [
                    {"videoId": "a1", "title": "First", "thumbnailUrl": "https://i.ytimg.com/a1.jpg"},
                    {"videoId": "b2", "title": "Second", "thumbnailUrl": "https://i.ytimg.com/b2.jpg"}
                ],
                "createdAt": "2025-06-02T10:00:00.000Z"
            }"#,
        )
        .unwrap()
    }

    #[test]
    fn test_decodes_api_shape() {
        let playlist = playlist();
        assert_eq!(playlist.id, "683d18f57501160e6503c0cd");
        assert_eq!(playlist.creator_pub_key, "npub1xyz");
        assert_eq!(playlist.songs[1].video_id, "b2");
        assert_eq!(playlist.songs[0].media_id(), MediaId::new("a1"));
        assert_eq!(playlist.len(), 2);
        assert!(playlist.contains("b2"));
        assert!(!playlist.contains("c3"));

        let value = serde_json::to_value(&playlist.songs[0]).unwrap();
        assert_eq!(value["thumbnailUrl"], "https://i.ytimg.com/a1.jpg");
    }

    #[test]
    fn test_song_ids_shape() {
        let ids: PlaylistSongIds =
            serde_json::from_str(r#"{"_id": "p1", "videoIds": ["a1", "b2"]}"#).unwrap();
        assert_eq!(ids.id, "p1");
        assert_eq!(ids.video_ids, vec!["a1", "b2"]);
    }

    #[test]
    fn test_search_page_token() {
        let page: SearchPage = serde_json::from_str(r#"{"items": [], "nextPageToken": ""}"#).unwrap();
        assert_eq!(page.next_token(), None);

        let page: SearchPage = serde_json::from_str(r#"{"items": [], "nextPageToken": "CAUQAA"}"#).unwrap();
        assert_eq!(page.next_token(), Some("CAUQAA"));
    }
}
