use super::*;

struct Fixture {
    design: Design,
    has_token: bool,
    identity: IdentityDraft,
}

impl Fixture {
    fn new() -> Self {
        Self { design: Design::default(), has_token: false, identity: IdentityDraft::default() }
    }

    fn complete() -> Self {
        let mut f = Self::new();
        f.has_token = true;
        f.design.name = "Crunch".into();
        f.design.flavor = "BBQ".into();
        f.design.image = Some("toppings/bbq.png".into());
        f
    }

    fn ctx(&self) -> StepContext<'_> {
        StepContext { design: &self.design, has_token: self.has_token, identity: &self.identity }
    }
}

fn four_step() -> WizardController {
    WizardController::new(WizardLayout { auth: AuthMode::Token, image_step: false })
}

// =============================================================================
// Layout
// =============================================================================

#[test]
fn layout_step_lists() {
    let token = WizardLayout { auth: AuthMode::Token, image_step: false };
    assert_eq!(token.steps(), vec![Step::Auth, Step::Name, Step::Flavor, Step::Finish]);
    let anonymous = WizardLayout { auth: AuthMode::None, image_step: true };
    assert_eq!(anonymous.steps(), vec![Step::Name, Step::Flavor, Step::Finish]);
}

#[test]
fn starts_at_step_one() {
    let wizard = four_step();
    assert_eq!(wizard.position(), 1);
    assert_eq!(wizard.current_step(), Step::Auth);
    assert_eq!(wizard.step_count(), 4);
}

// =============================================================================
// go_next
// =============================================================================

#[test]
fn go_next_blocked_without_token() {
    let f = Fixture::new();
    let mut wizard = four_step();
    assert!(!wizard.go_next(&f.ctx()));
    assert_eq!(wizard.position(), 1);
}

#[test]
fn go_next_blocked_by_each_invalid_step() {
    let mut f = Fixture::new();
    let mut wizard = four_step();

    f.has_token = true;
    assert!(wizard.go_next(&f.ctx()));
    assert_eq!(wizard.current_step(), Step::Name);

    f.design.name = "   ".into();
    assert!(!wizard.go_next(&f.ctx()));
    f.design.name = "Crunch".into();
    assert!(wizard.go_next(&f.ctx()));

    assert!(!wizard.go_next(&f.ctx()));
    f.design.flavor = "BBQ".into();
    assert!(wizard.go_next(&f.ctx()));
    assert_eq!(wizard.current_step(), Step::Finish);
}

#[test]
fn go_next_never_leaves_range() {
    let f = Fixture::complete();
    let mut wizard = four_step();
    for _ in 0..10 {
        wizard.go_next(&f.ctx());
    }
    assert_eq!(wizard.position(), 4);
    assert!(!wizard.go_next(&f.ctx()));
}

#[test]
fn go_next_never_succeeds_from_an_invalid_step() {
    let layouts = [
        WizardLayout { auth: AuthMode::Token, image_step: true },
        WizardLayout { auth: AuthMode::Inline, image_step: false },
        WizardLayout { auth: AuthMode::None, image_step: true },
    ];
    let f = Fixture::new();
    for layout in layouts {
        let complete = Fixture::complete();
        let mut wizard = WizardController::new(layout);
        for position in 1..=wizard.step_count() {
            wizard.go_to(position, &complete.ctx());
            let step = wizard.current_step();
            let before = wizard.position();
            if !wizard.is_step_valid(step, &f.ctx()) {
                assert!(!wizard.go_next(&f.ctx()), "{layout:?} step {step:?}");
                assert_eq!(wizard.position(), before);
            }
        }
    }
}

// =============================================================================
// go_back / go_to
// =============================================================================

#[test]
fn go_back_always_succeeds_above_one() {
    let f = Fixture::complete();
    let mut wizard = four_step();
    wizard.go_to(4, &f.ctx());
    assert!(wizard.go_back());
    assert!(wizard.go_back());
    assert!(wizard.go_back());
    assert_eq!(wizard.position(), 1);
    assert!(!wizard.go_back());
}

#[test]
fn go_to_flavor_before_name_is_rejected() {
    let mut f = Fixture::new();
    f.has_token = true;
    let mut wizard = four_step();

    assert!(!wizard.go_to(3, &f.ctx()));
    assert!(wizard.position() <= 2);

    assert!(wizard.go_to(2, &f.ctx()));
    assert!(!wizard.go_to(3, &f.ctx()));
    assert_eq!(wizard.position(), 2);
}

#[test]
fn go_to_forward_requires_auth_too() {
    let mut f = Fixture::complete();
    f.has_token = false;
    let mut wizard = four_step();
    assert!(!wizard.go_to(2, &f.ctx()));
    assert_eq!(wizard.position(), 1);
}

#[test]
fn go_to_backward_ignores_validity() {
    let f = Fixture::complete();
    let mut wizard = four_step();
    wizard.go_to(4, &f.ctx());
    let empty = Fixture::new();
    assert!(wizard.go_to(2, &empty.ctx()));
    assert_eq!(wizard.position(), 2);
}

#[test]
fn go_to_clamps_out_of_range_targets() {
    let f = Fixture::complete();
    let mut wizard = four_step();
    assert!(wizard.go_to(99, &f.ctx()));
    assert_eq!(wizard.position(), 4);
    assert!(wizard.go_to(0, &f.ctx()));
    assert_eq!(wizard.position(), 1);
}

// =============================================================================
// Validity variants
// =============================================================================

#[test]
fn inline_auth_accepts_entered_identity() {
    let mut f = Fixture::new();
    let mut wizard = WizardController::new(WizardLayout { auth: AuthMode::Inline, image_step: false });
    f.identity = IdentityDraft { name: "Sam".into(), email: "sam".into() };
    assert!(!wizard.go_next(&f.ctx()));
    f.identity.email = "sam@example.test".into();
    assert!(wizard.go_next(&f.ctx()));
}

#[test]
fn image_step_requires_selection() {
    let mut f = Fixture::complete();
    f.design.image = None;
    let with_image = WizardController::new(WizardLayout { auth: AuthMode::Token, image_step: true });
    let without = four_step();
    assert!(!with_image.is_step_valid(Step::Finish, &f.ctx()));
    assert!(without.is_step_valid(Step::Finish, &f.ctx()));
    assert!(!with_image.submit_allowed(&f.ctx()));
    assert!(without.submit_allowed(&f.ctx()));
}

#[test]
fn submit_requires_token_even_when_content_is_valid() {
    let mut f = Fixture::complete();
    f.has_token = false;
    let wizard = WizardController::new(WizardLayout { auth: AuthMode::Inline, image_step: false });
    f.identity = IdentityDraft { name: "Sam".into(), email: "sam@example.test".into() };
    assert!(!wizard.submit_allowed(&f.ctx()));
}

// =============================================================================
// NavState
// =============================================================================

#[test]
fn nav_state_on_fresh_session() {
    let f = Fixture::new();
    let nav = four_step().nav(&f.ctx());
    assert_eq!(nav.step, Step::Auth);
    assert!(!nav.back_enabled);
    assert!(!nav.next_enabled);
    assert!(!nav.submit_allowed);
    assert_eq!(nav.camera, CameraPosition::Default);
    assert_eq!(nav.reachable, vec![true, false, false, false]);
}

#[test]
fn nav_state_tracks_destination_camera() {
    let f = Fixture::complete();
    let mut wizard = four_step();
    wizard.go_next(&f.ctx());
    assert_eq!(wizard.nav(&f.ctx()).camera, CameraPosition::Name);
    wizard.go_next(&f.ctx());
    assert_eq!(wizard.nav(&f.ctx()).camera, CameraPosition::Flavor);
    wizard.go_next(&f.ctx());
    let nav = wizard.nav(&f.ctx());
    assert_eq!(nav.camera, CameraPosition::Finish);
    assert!(!nav.next_enabled);
    assert!(nav.back_enabled);
    assert!(nav.submit_allowed);
    assert_eq!(nav.reachable, vec![true; 4]);
}

#[test]
fn reset_returns_to_first_step() {
    let f = Fixture::complete();
    let mut wizard = four_step();
    wizard.go_to(3, &f.ctx());
    wizard.reset();
    assert_eq!(wizard.position(), 1);
}
