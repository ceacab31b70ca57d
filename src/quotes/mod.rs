// Quotes and daily moods
// Quote cards are dealt at random; moods are kept one per day

use anyhow::Result;
use chrono::NaiveDate;
use rand::Rng;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

/// A quote as served by the quotes API: text, author, pre-rendered html
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Quote {
    #[serde(rename = "q")]
    pub text: String,
    #[serde(rename = "a")]
    pub author: String,
    #[serde(rename = "h", default)]
    pub html: String,
}

impl fmt::Display for Quote {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "\"{}\"\n— {}", self.text, self.author)
    }
}

/// Deals quotes at random, never the same one twice in a row
#[derive(Debug, Clone, Default)]
pub struct QuoteDeck {
    quotes: Vec<Quote>,
    last: Option<usize>,
}

impl QuoteDeck {
    pub fn new(quotes: Vec<Quote>) -> Self {
        Self { quotes, last: None }
    }

    /// Parse a JSON array of quotes
    pub fn from_json(json: &str) -> Result<Self> {
        let quotes: Vec<Quote> = serde_json::from_str(json)?;
        Ok(Self::new(quotes))
    }

    pub fn len(&self) -> usize {
        self.quotes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.quotes.is_empty()
    }

    pub fn deal(&mut self) -> Option<&Quote> {
        self.deal_with(&mut rand::thread_rng())
    }

    pub fn deal_with<R: Rng>(&mut self, rng: &mut R) -> Option<&Quote> {
        let index = match (self.quotes.len(), self.last) {
            (0, _) => return None,
            (1, _) => 0,
            (len, Some(last)) => {
                // Draw from the other len - 1 slots
                let pick = rng.gen_range(0..len - 1);
                if pick >= last {
                    pick + 1
                } else {
                    pick
                }
            }
            (len, None) => rng.gen_range(0..len),
        };

        self.last = Some(index);
        self.quotes.get(index)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Mood {
    #[serde(rename = "😊")]
    Happy,
    #[serde(rename = "😐")]
    Neutral,
    #[serde(rename = "😢")]
    Sad,
}

impl Mood {
    pub fn emoji(&self) -> &'static str {
        match self {
            Mood::Happy => "😊",
            Mood::Neutral => "😐",
            Mood::Sad => "😢",
        }
    }
}

impl fmt::Display for Mood {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.emoji())
    }
}

impl FromStr for Mood {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_lowercase().as_str() {
            "😊" | "happy" => Ok(Mood::Happy),
            "😐" | "neutral" => Ok(Mood::Neutral),
            "😢" | "sad" => Ok(Mood::Sad),
            other => Err(anyhow::anyhow!("unknown mood '{}'", other)),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MoodEntry {
    pub date: NaiveDate, // YYYY-MM-DD
    pub mood: Mood,
}

/// One mood per calendar day; recording again on the same day overwrites it
#[derive(Debug, Clone, Default)]
pub struct MoodJournal {
    entries: BTreeMap<NaiveDate, Mood>,
}

impl MoodJournal {
    pub fn from_entries(entries: impl IntoIterator<Item = MoodEntry>) -> Self {
        let mut journal = Self::default();
        for entry in entries {
            journal.record(entry.date, entry.mood);
        }
        journal
    }

    pub fn record(&mut self, date: NaiveDate, mood: Mood) -> Option<Mood> {
        self.entries.insert(date, mood)
    }

    pub fn mood_on(&self, date: NaiveDate) -> Option<Mood> {
        self.entries.get(&date).copied()
    }

    /// Entries in date order
    pub fn entries(&self) -> Vec<MoodEntry> {
        self.entries
            .iter()
            .map(|(date, mood)| MoodEntry {
                date: *date,
                mood: *mood,
            })
            .collect()
    }
}
