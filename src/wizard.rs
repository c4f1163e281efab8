//! Step-gated wizard over the design flow.
//!
//! DESIGN
//! ======
//! Steps are ordered and 1-based. Moving forward requires the current step
//! (or, for a jump, every earlier step) to be valid; moving back is always
//! allowed. Validity is computed on demand from a [`StepContext`] so the
//! wizard never caches design or session state.
//!
//! There is no terminal state. The wizard stays navigable after submission;
//! the one-shot submit is gated elsewhere.

#[cfg(test)]
#[path = "wizard_test.rs"]
mod wizard_test;

use crate::auth::IdentityDraft;
use crate::design::Design;
use crate::renderer::CameraPosition;

/// How the first step authenticates the user.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum AuthMode {
    /// Anonymous flow; no auth step.
    None,
    /// Auth step is complete once a session token exists.
    #[default]
    Token,
    /// Auth step is complete once a name and an email address are entered.
    Inline,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Step {
    Auth,
    Name,
    Flavor,
    Finish,
}

impl Step {
    /// Viewpoint the renderer should move to when this step is entered.
    #[must_use]
    pub fn camera(self) -> CameraPosition {
        match self {
            Self::Auth => CameraPosition::Default,
            Self::Name => CameraPosition::Name,
            Self::Flavor => CameraPosition::Flavor,
            Self::Finish => CameraPosition::Finish,
        }
    }
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct WizardLayout {
    pub auth: AuthMode,
    /// Finish step requires an image selection.
    pub image_step: bool,
}

impl WizardLayout {
    #[must_use]
    pub fn steps(&self) -> Vec<Step> {
        let mut steps = Vec::with_capacity(4);
        if self.auth != AuthMode::None {
            steps.push(Step::Auth);
        }
        steps.extend([Step::Name, Step::Flavor, Step::Finish]);
        steps
    }
}

/// Inputs the validity predicates read.
#[derive(Clone, Copy, Debug)]
pub struct StepContext<'a> {
    pub design: &'a Design,
    pub has_token: bool,
    pub identity: &'a IdentityDraft,
}

/// Control state recomputed after every transition or input.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct NavState {
    pub step: Step,
    /// 1-based index of `step`.
    pub position: usize,
    pub step_count: usize,
    pub back_enabled: bool,
    pub next_enabled: bool,
    /// Token present and every content step valid.
    pub submit_allowed: bool,
    pub camera: CameraPosition,
    /// Per step indicator: whether `go_to` would accept that position.
    pub reachable: Vec<bool>,
}

// =============================================================================
// CONTROLLER
// =============================================================================

#[derive(Clone, Debug)]
pub struct WizardController {
    layout: WizardLayout,
    steps: Vec<Step>,
    position: usize,
}

impl WizardController {
    #[must_use]
    pub fn new(layout: WizardLayout) -> Self {
        let steps = layout.steps();
        Self { layout, steps, position: 1 }
    }

    #[must_use]
    pub fn layout(&self) -> WizardLayout {
        self.layout
    }

    #[must_use]
    pub fn position(&self) -> usize {
        self.position
    }

    #[must_use]
    pub fn step_count(&self) -> usize {
        self.steps.len()
    }

    #[must_use]
    pub fn current_step(&self) -> Step {
        self.step_at(self.position)
    }

    /// Step at a 1-based position, clamped into range.
    #[must_use]
    pub fn step_at(&self, position: usize) -> Step {
        self.steps[self.clamp(position) - 1]
    }

    fn clamp(&self, position: usize) -> usize {
        position.clamp(1, self.steps.len())
    }

    #[must_use]
    pub fn is_step_valid(&self, step: Step, ctx: &StepContext<'_>) -> bool {
        match step {
            Step::Auth => match self.layout.auth {
                AuthMode::None => true,
                AuthMode::Token => ctx.has_token,
                AuthMode::Inline => ctx.has_token || ctx.identity.is_complete(),
            },
            Step::Name => ctx.design.has_name(),
            Step::Flavor => ctx.design.has_flavor(),
            Step::Finish => !self.layout.image_step || ctx.design.has_image(),
        }
    }

    /// Name, flavor and finish steps all valid, ignoring authentication.
    #[must_use]
    pub fn content_valid(&self, ctx: &StepContext<'_>) -> bool {
        [Step::Name, Step::Flavor, Step::Finish]
            .into_iter()
            .all(|step| self.is_step_valid(step, ctx))
    }

    /// Token present and [`Self::content_valid`].
    #[must_use]
    pub fn submit_allowed(&self, ctx: &StepContext<'_>) -> bool {
        ctx.has_token && self.content_valid(ctx)
    }

    fn all_valid_before(&self, position: usize, ctx: &StepContext<'_>) -> bool {
        self.steps[..position - 1]
            .iter()
            .all(|step| self.is_step_valid(*step, ctx))
    }

    /// Advance one step if the current step is valid.
    pub fn go_next(&mut self, ctx: &StepContext<'_>) -> bool {
        if self.position >= self.steps.len() || !self.is_step_valid(self.current_step(), ctx) {
            return false;
        }
        self.position += 1;
        true
    }

    /// Retreat one step. Fails only at step 1.
    pub fn go_back(&mut self) -> bool {
        if self.position <= 1 {
            return false;
        }
        self.position -= 1;
        true
    }

    /// Jump to a 1-based position (clamped). Backward jumps always succeed;
    /// forward jumps require every step before the target to be valid.
    pub fn go_to(&mut self, position: usize, ctx: &StepContext<'_>) -> bool {
        let target = self.clamp(position);
        if target == self.position {
            return false;
        }
        if target > self.position && !self.all_valid_before(target, ctx) {
            return false;
        }
        self.position = target;
        true
    }

    pub fn reset(&mut self) {
        self.position = 1;
    }

    #[must_use]
    pub fn nav(&self, ctx: &StepContext<'_>) -> NavState {
        let step = self.current_step();
        let count = self.steps.len();
        let reachable = (1..=count)
            .map(|target| target <= self.position || self.all_valid_before(target, ctx))
            .collect();
        NavState {
            step,
            position: self.position,
            step_count: count,
            back_enabled: self.position > 1,
            next_enabled: self.position < count && self.is_step_valid(step, ctx),
            submit_allowed: self.submit_allowed(ctx),
            camera: step.camera(),
            reachable,
        }
    }
}
