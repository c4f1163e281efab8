//! Chips bag configurator core.
//!
//! A user designs a bag (name, flavor, color, optional image) through a
//! step-gated wizard, submits it once to the bag service, and then votes on
//! other users' designs in a carousel. Rendering, the remote service and
//! durable storage are collaborators behind traits; [`app::Configurator`]
//! owns everything else.

pub mod api;
pub mod app;
pub mod auth;
pub mod config;
pub mod design;
pub mod error;
pub mod renderer;
pub mod session;
pub mod submission;
pub mod voting;
pub mod wizard;

#[cfg(test)]
mod test_support;

pub use app::Configurator;
pub use config::AppConfig;
pub use error::{BagError, ErrorCode};
