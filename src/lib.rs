// moodtunes library - playlists, quotes, and an embeddable video player session
// The player session is the core; everything else feeds it or sits next to it

#[cfg(feature = "api")]
pub mod api;       // remote playlist/search API
pub mod config;    // settings and preferences
pub mod error;     // session and API error types
pub mod library;   // song/playlist models
pub mod player;    // embedded player session and widget seam
pub mod quotes;    // quote cards and moods

// Export the stuff other modules actually use
#[cfg(feature = "api")]
pub use api::{PlaylistClient, SearchPager};
pub use config::Config;
pub use error::SessionError;
#[cfg(feature = "api")]
pub use error::ApiError;
pub use library::{Playlist, Song};
pub use player::{Container, MediaId, PlayerSession, PlayerState, ReadySignal, StateChange};
pub use quotes::{Mood, MoodEntry, Quote, QuoteDeck};
