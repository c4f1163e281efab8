//! Renderer contract consumed by the controller.
//!
//! SYSTEM CONTEXT
//! ==============
//! The 3D preview lives outside this crate. The controller only tells it
//! what changed (color, text, image, viewpoint) and asks it for a preview
//! snapshot at submission time.

#[cfg(test)]
#[path = "renderer_test.rs"]
mod renderer_test;

use std::sync::Arc;

use tracing::info;

use crate::design::{DesignField, DesignStore, FieldChange};

/// Named camera positions the renderer knows how to move to.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum CameraPosition {
    #[default]
    Default,
    Name,
    Flavor,
    Finish,
}

impl CameraPosition {
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Default => "default",
            Self::Name => "name",
            Self::Flavor => "flavor",
            Self::Finish => "finish",
        }
    }
}

#[derive(Debug, Clone, thiserror::Error)]
pub enum RenderError {
    #[error("preview capture failed: {0}")]
    Capture(String),
}

pub trait Renderer: Send + Sync {
    fn apply_color(&self, hex: &str);
    fn apply_text(&self, text: &str);
    /// Empty `asset_id` removes the current image.
    fn apply_image(&self, asset_id: &str);
    fn move_viewpoint(&self, position: CameraPosition);

    /// Encoded preview image, or `None` when nothing could be drawn.
    ///
    /// # Errors
    ///
    /// Returns an error if the renderer failed while capturing.
    fn capture_preview(&self) -> Result<Option<String>, RenderError>;
}

/// Subscribe `renderer` to design writes so each stored field is reflected
/// visually. Flavor has no visual counterpart.
pub fn bind_renderer(store: &mut DesignStore, renderer: Arc<dyn Renderer>) {
    store.subscribe(move |change: &FieldChange| match change.field {
        DesignField::Name => renderer.apply_text(&change.value),
        DesignField::Color => renderer.apply_color(&change.value),
        DesignField::Image => renderer.apply_image(&change.value),
        DesignField::Flavor => {}
    });
}

// =============================================================================
// LOG RENDERER
// =============================================================================

/// Headless renderer that records calls in the log. Used by the CLI.
#[derive(Debug, Default)]
pub struct LogRenderer;

impl Renderer for LogRenderer {
    fn apply_color(&self, hex: &str) {
        info!(%hex, "render color");
    }

    fn apply_text(&self, text: &str) {
        info!(%text, "render text");
    }

    fn apply_image(&self, asset_id: &str) {
        info!(%asset_id, "render image");
    }

    fn move_viewpoint(&self, position: CameraPosition) {
        info!(position = position.as_str(), "move viewpoint");
    }

    fn capture_preview(&self) -> Result<Option<String>, RenderError> {
        Ok(None)
    }
}
