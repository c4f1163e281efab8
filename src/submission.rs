//! One-time submission of a finished design.
//!
//! ORDERING
//! ========
//! 1. token check
//! 2. best-effort preview capture (failure sends an empty preview)
//! 3. `POST /bag`
//! 4. session marked submitted and persisted
//! 5. carousel rebuilt without the new id, then opened
//!
//! Step 4 always finishes before step 5 starts because the rebuild filters
//! on the id it records. The pipeline itself does not refuse a second
//! submission; the controller gates that.

#[cfg(test)]
#[path = "submission_test.rs"]
mod submission_test;

use tracing::{info, warn};

use crate::api::{BagApi, NewBag};
use crate::design::Design;
use crate::error::BagError;
use crate::renderer::{CameraPosition, Renderer};
use crate::session::SessionStore;
use crate::voting::VotingCarousel;

/// What a successful submission produced.
#[derive(Debug)]
pub struct SubmitOutcome {
    pub design_id: String,
    pub preview_captured: bool,
    /// `false` when the submitted marker could not be written to storage.
    pub persisted: bool,
    /// Listing error if the carousel could not be rebuilt afterwards.
    pub rebuild_error: Option<BagError>,
}

pub struct SubmissionPipeline<'a> {
    api: &'a dyn BagApi,
    renderer: &'a dyn Renderer,
}

impl<'a> SubmissionPipeline<'a> {
    #[must_use]
    pub fn new(api: &'a dyn BagApi, renderer: &'a dyn Renderer) -> Self {
        Self { api, renderer }
    }

    /// # Errors
    ///
    /// Returns [`BagError::Unauthenticated`] without a token, or the API error
    /// from the submit call. Nothing is recorded locally on failure.
    pub async fn submit(
        &self,
        snapshot: &Design,
        session: &mut SessionStore,
        carousel: &mut VotingCarousel,
    ) -> Result<SubmitOutcome, BagError> {
        let token = session.token().ok_or(BagError::Unauthenticated)?.to_owned();

        let preview = self.capture_preview();
        let preview_captured = preview.is_some();
        let identity = session.state();
        let body = NewBag::from_design(snapshot, preview, &identity.user_name, &identity.user_email);

        let design_id = self.api.submit_bag(&token, &body).await?;
        info!(%design_id, "design submitted");

        let persisted = match session.mark_submitted(&design_id) {
            Ok(()) => true,
            Err(e) => {
                warn!(error = %e, %design_id, "submission marker not persisted");
                false
            }
        };
        self.renderer.move_viewpoint(CameraPosition::Default);

        let rebuild_error = match carousel.rebuild(self.api, Some(&design_id)).await {
            Ok(_) => {
                carousel.open();
                None
            }
            Err(e) => {
                warn!(error = %e, "carousel rebuild after submit failed");
                Some(e)
            }
        };

        Ok(SubmitOutcome { design_id, preview_captured, persisted, rebuild_error })
    }

    fn capture_preview(&self) -> Option<String> {
        match self.renderer.capture_preview() {
            Ok(preview) => preview.filter(|data| !data.is_empty()),
            Err(e) => {
                warn!(error = %e, "preview capture failed; submitting without preview");
                None
            }
        }
    }
}
