use super::PlaylistClient;
use crate::error::ApiError;
use crate::library::{SearchPage, Song};

/// Walks search results page by page, following `nextPageToken`
pub struct SearchPager<'a> {
    client: &'a PlaylistClient,
    query: String,
    next_token: Option<String>,
    finished: bool,
}

impl<'a> SearchPager<'a> {
    pub fn new(client: &'a PlaylistClient, query: impl Into<String>) -> Self {
        let query = query.into();
        // Only the empty query is skipped; whitespace is sent as typed
        let finished = query.is_empty();
        Self {
            client,
            query,
            next_token: None,
            finished,
        }
    }

    pub fn has_more(&self) -> bool {
        !self.finished
    }

    /// Fetch the next page, or `None` once the server stopped handing out tokens.
    /// A failed request leaves the cursor where it was.
    pub async fn next_page(&mut self) -> Result<Option<SearchPage>, ApiError> {
        if self.finished {
            return Ok(None);
        }

        let token = self.next_token.clone().unwrap_or_default();
        let page = self.client.search(&self.query, &token).await?;
        match page.next_token() {
            Some(next) => self.next_token = Some(next.to_string()),
            None => self.finished = true,
        }
        Ok(Some(page))
    }

    /// Songs from up to `max_pages` pages
    pub async fn take_pages(&mut self, max_pages: usize) -> Result<Vec<Song>, ApiError> {
        let mut songs = Vec::new();
        for _ in 0..max_pages {
            match self.next_page().await? {
                Some(page) => songs.extend(page.items),
                None => break,
            }
        }
        Ok(songs)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    #[test]
    fn test_only_empty_query_is_skipped() {
        let client = PlaylistClient::new("http://127.0.0.1:9", Duration::from_secs(1)).unwrap();
        assert!(!SearchPager::new(&client, "").has_more());
        assert!(SearchPager::new(&client, "   ").has_more());
        assert!(SearchPager::new(&client, "lofi").has_more());
    }
}
