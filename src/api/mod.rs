//! Remote bag API: trait seam, wire schema, and the HTTP client.
//!
//! SYSTEM CONTEXT
//! ==============
//! `types` defines the JSON shapes, `http` talks to the real service. The
//! controller only sees [`BagApi`], so tests swap in an in-memory mock.

pub mod http;
pub mod types;

pub use http::HttpBagApi;
pub use types::{Bag, NewBag};

use crate::error::BagError;

/// Remote operations the controller depends on.
#[async_trait::async_trait]
pub trait BagApi: Send + Sync {
    /// `POST /user/guest`: returns the session token.
    ///
    /// # Errors
    ///
    /// Returns [`BagError::MissingToken`] when the response has no token, or a
    /// remote/transport error.
    async fn start_guest_session(&self, email: &str) -> Result<String, BagError>;

    /// `GET /bag`: every submitted design.
    ///
    /// # Errors
    ///
    /// Returns a remote/transport/parse error.
    async fn list_bags(&self) -> Result<Vec<Bag>, BagError>;

    /// `POST /bag`: returns the id of the stored design.
    ///
    /// # Errors
    ///
    /// Returns a remote/transport/parse error.
    async fn submit_bag(&self, token: &str, bag: &NewBag) -> Result<String, BagError>;

    /// `POST /vote/:id`.
    ///
    /// # Errors
    ///
    /// Returns a remote/transport error. Duplicate votes arrive as plain
    /// remote errors; see [`crate::error::classify_vote_error`].
    async fn cast_vote(&self, token: &str, bag_id: &str) -> Result<(), BagError>;
}
