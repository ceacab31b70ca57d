// Playlist and song models shared by the API client and the player
pub mod playlist;

pub use playlist::{Playlist, PlaylistSongIds, SearchPage, Song};
