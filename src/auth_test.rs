use super::*;
use crate::session::MemoryStore;
use crate::test_support::{ApiCall, MockApi};
use std::sync::Arc;

// =============================================================================
// IdentityDraft
// =============================================================================

#[test]
fn draft_needs_name_and_email_with_at() {
    let mut draft = IdentityDraft::default();
    assert!(!draft.is_complete());
    draft.name = "Sam".into();
    draft.email = "sam.example.test".into();
    assert!(!draft.is_complete());
    draft.email = "sam@example.test".into();
    assert!(draft.is_complete());
    draft.name = "   ".into();
    assert!(!draft.is_complete());
}

// =============================================================================
// GuestIdentity::parse
// =============================================================================

#[test]
fn parse_trims_and_clamps() {
    let long_email = format!("sam@{}.test", "a".repeat(60));
    let id = GuestIdentity::parse("  Samantha Jones The Third  ", &long_email).unwrap();
    assert_eq!(id.name, "Samantha Jones The T");
    assert_eq!(id.email.chars().count(), GUEST_EMAIL_MAX_CHARS);
    assert!(id.email.starts_with("sam@aaa"));
}

#[test]
fn parse_clamps_email_before_checking_at() {
    let at_past_limit = format!("{}@example.test", "a".repeat(GUEST_EMAIL_MAX_CHARS));
    assert_eq!(GuestIdentity::parse("Sam", &at_past_limit), Err(GuestInputError::InvalidEmail));
}

#[test]
fn parse_reports_first_problem() {
    assert_eq!(GuestIdentity::parse(" ", "a@b"), Err(GuestInputError::MissingName));
    assert_eq!(GuestIdentity::parse("Sam", ""), Err(GuestInputError::MissingEmail));
    assert_eq!(GuestIdentity::parse("Sam", "sam"), Err(GuestInputError::InvalidEmail));
}

// =============================================================================
// start_guest_session
// =============================================================================

#[tokio::test]
async fn start_guest_session_persists_token_and_identity() {
    let api = MockApi::new();
    let storage = MemoryStore::new();
    let mut session = SessionStore::load(Arc::new(storage.clone()));

    let identity = start_guest_session(&api, &mut session, " Sam ", "sam@example.test").await.unwrap();

    assert_eq!(identity.name, "Sam");
    assert_eq!(session.token(), Some("token-sam@example.test"));
    assert_eq!(session.state().user_name, "Sam");
    assert_eq!(api.calls(), vec![ApiCall::StartSession { email: "sam@example.test".into() }]);
}

#[tokio::test]
async fn invalid_input_sends_nothing() {
    let api = MockApi::new();
    let mut session = SessionStore::load(Arc::new(MemoryStore::new()));

    let err = start_guest_session(&api, &mut session, "Sam", "no-at-sign").await.unwrap_err();

    assert!(matches!(err, BagError::GuestInput(GuestInputError::InvalidEmail)));
    assert!(api.calls().is_empty());
    assert!(!session.has_token());
}

#[tokio::test]
async fn missing_token_leaves_session_unauthenticated() {
    let api = MockApi::new();
    api.fail_next_session(BagError::MissingToken);
    let mut session = SessionStore::load(Arc::new(MemoryStore::new()));

    let err = start_guest_session(&api, &mut session, "Sam", "sam@example.test").await.unwrap_err();

    assert!(matches!(err, BagError::MissingToken));
    assert!(!session.has_token());
}
