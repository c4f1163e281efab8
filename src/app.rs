//! The controller that owns all configurator state.
//!
//! ARCHITECTURE
//! ============
//! `Configurator` is the single writer for the design store, wizard position,
//! session and carousel. Input handlers call its methods; nothing reaches
//! this state through globals. Async actions take `&mut self`, so two actions
//! can never be in flight at once.
//!
//! ERROR HANDLING
//! ==============
//! Actions return `bool` (did it succeed) and leave a status line behind.
//! Errors are logged and converted with [`BagError::status_message`]; none
//! escape, and every failure leaves the controls usable again.

#[cfg(test)]
#[path = "app_test.rs"]
mod app_test;

use std::sync::Arc;

use tracing::{info, warn};

use crate::api::BagApi;
use crate::auth::{self, IdentityDraft};
use crate::config::AppConfig;
use crate::design::{Design, DesignField, DesignRules, DesignStore, preset_color};
use crate::error::BagError;
use crate::renderer::{CameraPosition, Renderer, bind_renderer};
use crate::session::{KeyValueStore, SessionState, SessionStore};
use crate::submission::SubmissionPipeline;
use crate::voting::VotingCarousel;
use crate::wizard::{AuthMode, NavState, StepContext, WizardController, WizardLayout};

pub const SUBMITTED_MESSAGE: &str = "Inzending opgeslagen, je kan nu stemmen";
pub const ALREADY_SUBMITTED_MESSAGE: &str = "Je hebt al een chipszak ingediend";
pub const INCOMPLETE_MESSAGE: &str = "Vul eerst alle stappen in";
/// The server holds the design but this device may not remember it.
pub const UNSAVED_SUBMISSION_MESSAGE: &str = "Inzending opgeslagen, maar kon sessie niet bewaren";

pub struct Configurator {
    design: DesignStore,
    wizard: WizardController,
    session: SessionStore,
    carousel: VotingCarousel,
    identity: IdentityDraft,
    api: Arc<dyn BagApi>,
    renderer: Arc<dyn Renderer>,
    status: Option<String>,
}

fn step_context<'a>(design: &'a DesignStore, session: &SessionStore, identity: &'a IdentityDraft) -> StepContext<'a> {
    StepContext { design: design.design(), has_token: session.has_token(), identity }
}

impl Configurator {
    /// Load the session from `storage` and bind `renderer` to design writes.
    #[must_use]
    pub fn new(
        layout: WizardLayout,
        rules: DesignRules,
        api: Arc<dyn BagApi>,
        renderer: Arc<dyn Renderer>,
        storage: Arc<dyn KeyValueStore>,
    ) -> Self {
        let mut design = DesignStore::new(rules);
        bind_renderer(&mut design, Arc::clone(&renderer));
        Self {
            design,
            wizard: WizardController::new(layout),
            session: SessionStore::load(storage),
            carousel: VotingCarousel::new(),
            identity: IdentityDraft::default(),
            api,
            renderer,
            status: None,
        }
    }

    #[must_use]
    pub fn from_config(
        config: &AppConfig,
        api: Arc<dyn BagApi>,
        renderer: Arc<dyn Renderer>,
        storage: Arc<dyn KeyValueStore>,
    ) -> Self {
        Self::new(config.wizard_layout(), config.design_rules(), api, renderer, storage)
    }

    /// Restore the carousel when a previous run already submitted.
    pub async fn start(&mut self) {
        let design = self.design.design();
        self.renderer.apply_color(&design.color);
        self.renderer.move_viewpoint(self.wizard.current_step().camera());
        if self.session.has_submitted() {
            info!(design_id = ?self.session.my_design_id(), "restoring previous submission");
            self.rebuild_carousel().await;
        }
    }

    // =========================================================================
    // ACCESSORS
    // =========================================================================

    #[must_use]
    pub fn design(&self) -> &Design {
        self.design.design()
    }

    #[must_use]
    pub fn session(&self) -> &SessionState {
        self.session.state()
    }

    #[must_use]
    pub fn carousel(&self) -> &VotingCarousel {
        &self.carousel
    }

    #[must_use]
    pub fn identity(&self) -> &IdentityDraft {
        &self.identity
    }

    #[must_use]
    pub fn status(&self) -> Option<&str> {
        self.status.as_deref()
    }

    #[must_use]
    pub fn nav(&self) -> NavState {
        self.wizard.nav(&step_context(&self.design, &self.session, &self.identity))
    }

    // =========================================================================
    // INPUT
    // =========================================================================

    /// Store a normalized field value and return what was stored.
    pub fn set_field(&mut self, field: DesignField, raw: &str) -> String {
        self.design.set_field(field, raw)
    }

    /// Set a flavor and, for known flavors, its suggested color.
    pub fn apply_flavor_preset(&mut self, flavor: &str) -> String {
        let stored = self.design.set_field(DesignField::Flavor, flavor);
        if let Some(color) = preset_color(&stored) {
            self.design.set_field(DesignField::Color, color);
        }
        stored
    }

    /// Move the camera to the field being edited.
    pub fn focus_field(&self, field: DesignField) {
        let position = match field {
            DesignField::Name => CameraPosition::Name,
            DesignField::Flavor => CameraPosition::Flavor,
            DesignField::Color | DesignField::Image => return,
        };
        self.renderer.move_viewpoint(position);
    }

    pub fn set_identity_name(&mut self, name: &str) {
        self.identity.name = name.to_owned();
    }

    pub fn set_identity_email(&mut self, email: &str) {
        self.identity.email = email.to_owned();
    }

    // =========================================================================
    // NAVIGATION
    // =========================================================================

    pub fn go_next(&mut self) -> bool {
        let moved = self
            .wizard
            .go_next(&step_context(&self.design, &self.session, &self.identity));
        self.after_move(moved)
    }

    pub fn go_back(&mut self) -> bool {
        let moved = self.wizard.go_back();
        self.after_move(moved)
    }

    pub fn go_to(&mut self, position: usize) -> bool {
        let moved = self
            .wizard
            .go_to(position, &step_context(&self.design, &self.session, &self.identity));
        self.after_move(moved)
    }

    fn after_move(&self, moved: bool) -> bool {
        if moved {
            self.renderer.move_viewpoint(self.wizard.current_step().camera());
        }
        moved
    }

    // =========================================================================
    // ACTIONS
    // =========================================================================

    /// Start a guest session with the given identity.
    pub async fn authenticate(&mut self, name: &str, email: &str) -> bool {
        self.status = None;
        self.identity = IdentityDraft { name: name.to_owned(), email: email.to_owned() };
        match auth::start_guest_session(&*self.api, &mut self.session, name, email).await {
            Ok(_) => true,
            Err(e) => self.fail(&e),
        }
    }

    /// Submit the current design once. Inline-auth layouts open the guest
    /// session from the entered identity first.
    pub async fn submit(&mut self) -> bool {
        self.status = None;

        if self.session.has_submitted() {
            self.status = Some(ALREADY_SUBMITTED_MESSAGE.to_owned());
            return false;
        }
        let auto_auth =
            !self.session.has_token() && self.wizard.layout().auth == AuthMode::Inline && self.identity.is_complete();
        let ctx = step_context(&self.design, &self.session, &self.identity);
        if (ctx.has_token || auto_auth) && !self.wizard.content_valid(&ctx) {
            self.status = Some(INCOMPLETE_MESSAGE.to_owned());
            return false;
        }
        if auto_auth {
            let IdentityDraft { name, email } = self.identity.clone();
            if !self.authenticate(&name, &email).await {
                return false;
            }
        }

        let snapshot = self.design.snapshot();
        let pipeline = SubmissionPipeline::new(&*self.api, &*self.renderer);
        match pipeline.submit(&snapshot, &mut self.session, &mut self.carousel).await {
            Ok(outcome) => {
                self.status = Some(match (outcome.persisted, outcome.rebuild_error) {
                    (false, _) => UNSAVED_SUBMISSION_MESSAGE.to_owned(),
                    (true, Some(e)) => e.status_message(),
                    (true, None) => SUBMITTED_MESSAGE.to_owned(),
                });
                true
            }
            Err(e) => self.fail(&e),
        }
    }

    /// Reload the carousel, excluding the caller's own design.
    pub async fn rebuild_carousel(&mut self) -> bool {
        let own_id = self.session.my_design_id().map(str::to_owned);
        match self.carousel.rebuild(&*self.api, own_id.as_deref()).await {
            Ok(_) => true,
            Err(e) => self.fail(&e),
        }
    }

    pub fn step_carousel(&mut self, delta: isize) {
        self.carousel.step(delta);
    }

    /// Vote for the carousel entry on display. The outcome is reported on the
    /// carousel's own status line.
    pub async fn vote(&mut self) -> bool {
        matches!(self.carousel.vote_current(&*self.api, self.session.state()).await, Ok(Some(_)))
    }

    pub fn open_voting(&mut self) {
        self.carousel.open();
    }

    pub fn close_voting(&mut self) {
        self.carousel.close();
    }

    /// Forget the session and return to step 1. The design is kept.
    pub fn reset(&mut self) -> bool {
        self.carousel.clear();
        self.wizard.reset();
        self.identity = IdentityDraft::default();
        self.status = None;
        self.renderer.move_viewpoint(self.wizard.current_step().camera());
        match self.session.reset() {
            Ok(()) => {
                info!("session reset");
                true
            }
            Err(e) => self.fail(&e),
        }
    }

    fn fail(&mut self, err: &BagError) -> bool {
        warn!(error = %err, "action failed");
        self.status = Some(err.status_message());
        false
    }
}
