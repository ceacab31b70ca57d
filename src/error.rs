// Error types shared across the library
// Transport calls on the player session never fail, only the ready signal and the API do

use thiserror::Error;

/// Why a player's ready signal settled without the widget becoming usable
#[derive(Error, Debug, Clone, PartialEq)]
pub enum SessionError {
    /// A newer `init_player` call or `destroy()` released the handle first
    #[error("player was superseded before it became ready")]
    Superseded,

    /// The widget never reported ready within the allotted time
    #[error("player not ready after {0}ms")]
    ReadyTimeout(u64),

    /// The factory could not construct the widget
    #[error("widget construction failed: {0}")]
    Widget(String),
}

/// Errors from the remote playlist/search API
#[cfg(feature = "api")]
#[derive(Error, Debug)]
pub enum ApiError {
    #[error("request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("server returned {status} for {url}")]
    Status { status: u16, url: String },

    #[error("could not decode response from {url}: {source}")]
    Decode {
        url: String,
        #[source]
        source: serde_json::Error,
    },

    #[error("invalid base url: {0}")]
    BaseUrl(String),
}
