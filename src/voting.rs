//! Voting carousel over other users' submitted designs.
//!
//! DESIGN
//! ======
//! Entries are replaced wholesale on every rebuild and never patched. The
//! caller's own design is filtered out by id. Navigation is cyclic and inert
//! on an empty carousel.
//!
//! A successful or duplicate vote settles that entry's control until the next
//! rebuild, so it cannot be voted on again without a new listing. Duplicate
//! votes come back from the server as plain errors and are recognised by
//! [`classify_vote_error`] only.

#[cfg(test)]
#[path = "voting_test.rs"]
mod voting_test;

use std::collections::HashMap;

use tracing::{info, warn};

use crate::api::{Bag, BagApi};
use crate::error::{BagError, classify_vote_error};
use crate::session::SessionState;

/// State of the vote button for the entry on display.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum VoteControl {
    #[default]
    Ready,
    /// Shown by the caller while a `vote_current` future is pending. The
    /// carousel never reports it: that future holds `&mut self`, so no
    /// other access (and no second vote) can happen until it resolves.
    Busy,
    Voted,
    AlreadyVoted,
}

impl VoteControl {
    #[must_use]
    pub fn label(self) -> &'static str {
        match self {
            Self::Ready => "Stem",
            Self::Busy => "Bezig...",
            Self::Voted => "Gestemd",
            Self::AlreadyVoted => "Al gestemd",
        }
    }

    #[must_use]
    pub fn enabled(self) -> bool {
        self == Self::Ready
    }
}

/// A vote the server accepted.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct CastVote {
    pub bag_id: String,
    pub bag_name: String,
}

#[derive(Debug, Default)]
pub struct VotingCarousel {
    entries: Vec<Bag>,
    index: usize,
    settled: HashMap<String, VoteControl>,
    open: bool,
    status: Option<String>,
}

impl VotingCarousel {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn entries(&self) -> &[Bag] {
        &self.entries
    }

    #[must_use]
    pub fn index(&self) -> usize {
        self.index
    }

    #[must_use]
    pub fn current(&self) -> Option<&Bag> {
        self.entries.get(self.index)
    }

    #[must_use]
    pub fn is_open(&self) -> bool {
        self.open
    }

    #[must_use]
    pub fn status(&self) -> Option<&str> {
        self.status.as_deref()
    }

    /// Vote button state for the current entry.
    #[must_use]
    pub fn control(&self) -> VoteControl {
        self.current()
            .and_then(|bag| self.settled.get(&bag.id).copied())
            .unwrap_or_default()
    }

    /// Show the voting view with a cleared status line.
    pub fn open(&mut self) {
        self.status = None;
        self.open = true;
    }

    pub fn close(&mut self) {
        self.open = false;
    }

    /// Drop all entries and vote marks; used by session reset.
    pub fn clear(&mut self) {
        *self = Self::default();
    }

    /// Replace entries with every listed design except `own_id`, reset the
    /// index, and forget settled votes. On failure the old entries stay.
    ///
    /// # Errors
    ///
    /// Returns the listing error.
    pub async fn rebuild(&mut self, api: &dyn BagApi, own_id: Option<&str>) -> Result<usize, BagError> {
        let all = api.list_bags().await?;
        let entries: Vec<Bag> = all
            .into_iter()
            .filter(|bag| own_id != Some(bag.id.as_str()))
            .collect();

        self.entries = entries;
        self.index = 0;
        self.settled.clear();
        info!(entries = self.entries.len(), "voting carousel rebuilt");
        Ok(self.entries.len())
    }

    /// Move `delta` entries, wrapping at both ends. No-op when empty.
    pub fn step(&mut self, delta: isize) {
        let len = self.entries.len();
        if len == 0 {
            return;
        }
        let len = isize::try_from(len).unwrap_or(isize::MAX);
        let index = isize::try_from(self.index).unwrap_or(0);
        let next = (index + delta % len).rem_euclid(len);
        self.index = usize::try_from(next).unwrap_or(0);
    }

    /// Cast a vote for the current entry and update the status line.
    ///
    /// # Errors
    ///
    /// - [`BagError::Unauthenticated`] without a token
    /// - [`BagError::MustSubmitFirst`] before the caller's own submission
    /// - [`BagError::DuplicateVote`] when the server already has this vote;
    ///   the entry is marked already-voted, the carousel stays usable
    /// - any other API error; the control is re-enabled
    pub async fn vote_current(&mut self, api: &dyn BagApi, session: &SessionState) -> Result<Option<CastVote>, BagError> {
        let result = self.try_vote(api, session).await;

        match &result {
            Ok(Some(vote)) => self.status = Some(format!("Gestemd op: {}", vote.bag_name)),
            Ok(None) => {}
            Err(err) => {
                warn!(error = %err, "vote failed");
                self.status = Some(err.status_message());
            }
        }
        result
    }

    async fn try_vote(&mut self, api: &dyn BagApi, session: &SessionState) -> Result<Option<CastVote>, BagError> {
        let token = session.vote_token()?;
        let Some(bag) = self.current() else {
            return Ok(None);
        };
        if !self.control().enabled() {
            return Ok(None);
        }
        let bag_id = bag.id.clone();
        let bag_name = bag.display_name().to_owned();

        match api.cast_vote(token, &bag_id).await.map_err(classify_vote_error) {
            Ok(()) => {
                self.settled.insert(bag_id.clone(), VoteControl::Voted);
                info!(%bag_id, "vote cast");
                Ok(Some(CastVote { bag_id, bag_name }))
            }
            Err(BagError::DuplicateVote) => {
                self.settled.insert(bag_id, VoteControl::AlreadyVoted);
                Err(BagError::DuplicateVote)
            }
            Err(err) => Err(err),
        }
    }
}
