//! Guest identity entry and session start for the auth step.

#[cfg(test)]
#[path = "auth_test.rs"]
mod auth_test;

use tracing::info;

use crate::api::BagApi;
use crate::error::{BagError, GuestInputError};
use crate::session::SessionStore;

pub const GUEST_NAME_MAX_CHARS: usize = 20;
pub const GUEST_EMAIL_MAX_CHARS: usize = 50;

/// Name and email as typed on the auth step, before a session exists.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct IdentityDraft {
    pub name: String,
    pub email: String,
}

impl IdentityDraft {
    /// Both fields filled in and the email has an `@`.
    #[must_use]
    pub fn is_complete(&self) -> bool {
        let email = self.email.trim();
        !self.name.trim().is_empty() && !email.is_empty() && email.contains('@')
    }
}

/// Trimmed, length-clamped identity ready to send.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct GuestIdentity {
    pub name: String,
    pub email: String,
}

impl GuestIdentity {
    /// # Errors
    ///
    /// Returns the first missing or malformed field.
    pub fn parse(name: &str, email: &str) -> Result<Self, GuestInputError> {
        let name = clamp_chars(name.trim(), GUEST_NAME_MAX_CHARS);
        let email = clamp_chars(email.trim(), GUEST_EMAIL_MAX_CHARS);

        if name.is_empty() {
            return Err(GuestInputError::MissingName);
        }
        if email.is_empty() {
            return Err(GuestInputError::MissingEmail);
        }
        if !email.contains('@') {
            return Err(GuestInputError::InvalidEmail);
        }
        Ok(Self { name, email })
    }
}

fn clamp_chars(text: &str, max: usize) -> String {
    text.chars().take(max).collect()
}

/// Validate the identity, open a guest session, and persist token + identity.
///
/// # Errors
///
/// Returns [`BagError::GuestInput`] for bad input (no request is sent), or
/// the API/storage error.
pub async fn start_guest_session(
    api: &dyn BagApi,
    session: &mut SessionStore,
    name: &str,
    email: &str,
) -> Result<GuestIdentity, BagError> {
    let identity = GuestIdentity::parse(name, email)?;
    let token = api.start_guest_session(&identity.email).await?;
    session.set_auth(&token, &identity.name, &identity.email)?;
    info!(user = %identity.name, "guest session started");
    Ok(identity)
}
