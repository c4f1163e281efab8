//! In-memory collaborators for unit tests.

use std::collections::VecDeque;
use std::sync::{Mutex, MutexGuard, PoisonError};

use crate::api::{Bag, BagApi, NewBag};
use crate::error::BagError;
use crate::renderer::{CameraPosition, RenderError, Renderer};
use crate::session::{KeyValueStore, MemoryStore};

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}

// =============================================================================
// MockApi
// =============================================================================

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum ApiCall {
    StartSession { email: String },
    ListBags,
    SubmitBag { token: String, bag: NewBag },
    CastVote { token: String, bag_id: String },
}

/// Bag service double. Submitted bags are appended to the listing with ids
/// `bag-1`, `bag-2`, ...; queued failures are returned once, in order.
#[derive(Default)]
pub struct MockApi {
    bags: Mutex<Vec<Bag>>,
    calls: Mutex<Vec<ApiCall>>,
    session_failures: Mutex<VecDeque<BagError>>,
    list_failures: Mutex<VecDeque<BagError>>,
    submit_failures: Mutex<VecDeque<BagError>>,
    vote_failures: Mutex<VecDeque<BagError>>,
}

impl MockApi {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_bags(bags: Vec<Bag>) -> Self {
        Self { bags: Mutex::new(bags), ..Self::default() }
    }

    pub fn calls(&self) -> Vec<ApiCall> {
        lock(&self.calls).clone()
    }

    pub fn count(&self, matches: impl Fn(&ApiCall) -> bool) -> usize {
        lock(&self.calls).iter().filter(|call| matches(call)).count()
    }

    pub fn fail_next_session(&self, err: BagError) {
        lock(&self.session_failures).push_back(err);
    }

    pub fn fail_next_list(&self, err: BagError) {
        lock(&self.list_failures).push_back(err);
    }

    pub fn fail_next_submit(&self, err: BagError) {
        lock(&self.submit_failures).push_back(err);
    }

    pub fn fail_next_vote(&self, err: BagError) {
        lock(&self.vote_failures).push_back(err);
    }

    fn record(&self, call: ApiCall) {
        lock(&self.calls).push(call);
    }
}

pub fn bag(id: &str, naam: &str) -> Bag {
    Bag {
        id: id.to_owned(),
        naam: naam.to_owned(),
        smaak: "Paprika".to_owned(),
        kleur: "#ffcc00".to_owned(),
        image: None,
        preview_image: None,
    }
}

#[async_trait::async_trait]
impl BagApi for MockApi {
    async fn start_guest_session(&self, email: &str) -> Result<String, BagError> {
        self.record(ApiCall::StartSession { email: email.to_owned() });
        if let Some(err) = lock(&self.session_failures).pop_front() {
            return Err(err);
        }
        Ok(format!("token-{email}"))
    }

    async fn list_bags(&self) -> Result<Vec<Bag>, BagError> {
        self.record(ApiCall::ListBags);
        if let Some(err) = lock(&self.list_failures).pop_front() {
            return Err(err);
        }
        Ok(lock(&self.bags).clone())
    }

    async fn submit_bag(&self, token: &str, new_bag: &NewBag) -> Result<String, BagError> {
        self.record(ApiCall::SubmitBag { token: token.to_owned(), bag: new_bag.clone() });
        if let Some(err) = lock(&self.submit_failures).pop_front() {
            return Err(err);
        }
        let mut bags = lock(&self.bags);
        let id = format!("bag-{}", bags.len() + 1);
        bags.push(Bag {
            id: id.clone(),
            naam: new_bag.naam.clone(),
            smaak: new_bag.smaak.clone(),
            kleur: new_bag.kleur.clone(),
            image: Some(new_bag.image.clone()).filter(|i| !i.is_empty()),
            preview_image: Some(new_bag.preview_image.clone()).filter(|p| !p.is_empty()),
        });
        Ok(id)
    }

    async fn cast_vote(&self, token: &str, bag_id: &str) -> Result<(), BagError> {
        self.record(ApiCall::CastVote { token: token.to_owned(), bag_id: bag_id.to_owned() });
        if let Some(err) = lock(&self.vote_failures).pop_front() {
            return Err(err);
        }
        Ok(())
    }
}

// =============================================================================
// RecordingRenderer
// =============================================================================

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum RenderCall {
    Color(String),
    Text(String),
    Image(String),
    Viewpoint(CameraPosition),
    Capture,
}

pub struct RecordingRenderer {
    calls: Mutex<Vec<RenderCall>>,
    preview: Mutex<Result<Option<String>, RenderError>>,
}

impl Default for RecordingRenderer {
    fn default() -> Self {
        Self { calls: Mutex::default(), preview: Mutex::new(Ok(Some("data:image/png;base64,PREVIEW".to_owned()))) }
    }
}

impl RecordingRenderer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn failing_capture() -> Self {
        let renderer = Self::default();
        *lock(&renderer.preview) = Err(RenderError::Capture("context lost".to_owned()));
        renderer
    }

    pub fn calls(&self) -> Vec<RenderCall> {
        lock(&self.calls).clone()
    }

    pub fn last_viewpoint(&self) -> Option<CameraPosition> {
        lock(&self.calls).iter().rev().find_map(|call| match call {
            RenderCall::Viewpoint(position) => Some(*position),
            _ => None,
        })
    }

    fn record(&self, call: RenderCall) {
        lock(&self.calls).push(call);
    }
}

impl Renderer for RecordingRenderer {
    fn apply_color(&self, hex: &str) {
        self.record(RenderCall::Color(hex.to_owned()));
    }

    fn apply_text(&self, text: &str) {
        self.record(RenderCall::Text(text.to_owned()));
    }

    fn apply_image(&self, asset_id: &str) {
        self.record(RenderCall::Image(asset_id.to_owned()));
    }

    fn move_viewpoint(&self, position: CameraPosition) {
        self.record(RenderCall::Viewpoint(position));
    }

    fn capture_preview(&self) -> Result<Option<String>, RenderError> {
        self.record(RenderCall::Capture);
        lock(&self.preview).clone()
    }
}

// =============================================================================
// RejectingStore
// =============================================================================

/// Memory store whose writes to one key always fail. Clones share state, so
/// the inner store can be inspected or reopened after a simulated restart.
#[derive(Clone, Debug)]
pub struct RejectingStore {
    pub inner: MemoryStore,
    rejected_key: &'static str,
}

impl RejectingStore {
    pub fn new(rejected_key: &'static str) -> Self {
        Self { inner: MemoryStore::new(), rejected_key }
    }
}

impl KeyValueStore for RejectingStore {
    fn get(&self, key: &str) -> Option<String> {
        self.inner.get(key)
    }

    fn set(&self, key: &str, value: &str) -> Result<(), BagError> {
        if key == self.rejected_key {
            return Err(BagError::Storage(format!("{key}: disk full")));
        }
        self.inner.set(key, value)
    }

    fn remove(&self, key: &str) -> Result<(), BagError> {
        self.inner.remove(key)
    }

    fn clear_all(&self) -> Result<(), BagError> {
        self.inner.clear_all()
    }
}
