//! Configuration store for the bag being designed.
//!
//! DESIGN
//! ======
//! Every write goes through a per-field normalizer. Invalid input is corrected
//! (characters stripped, length clamped, unknown values replaced by the current
//! one) and never rejected. After each write the store synchronously notifies
//! its subscribers; the renderer binding in `renderer` is one of them.
//!
//! The store has no network or storage side effects.

#[cfg(test)]
#[path = "design_test.rs"]
mod design_test;

use tracing::debug;

pub const NAME_MAX_CHARS: usize = 20;
pub const FLAVOR_MAX_CHARS: usize = 20;
pub const DEFAULT_COLOR: &str = "#ffcc00";

/// Asset ids offered on the image step when no catalog is configured.
pub const DEFAULT_IMAGE_CATALOG: &[&str] =
    &["toppings/paprika.png", "toppings/naturel.png", "toppings/bbq.png", "toppings/pickles.png"];

/// Known flavors and the bag color each one suggests.
pub const FLAVOR_PRESETS: &[(&str, &str)] =
    &[("Paprika", "#ffcc00"), ("Naturel", "#f5e6b3"), ("BBQ", "#cc6600"), ("Pickles", "#99cc00")];

/// Suggested color for a known flavor, matched case-insensitively.
#[must_use]
pub fn preset_color(flavor: &str) -> Option<&'static str> {
    let flavor = flavor.trim();
    FLAVOR_PRESETS
        .iter()
        .find(|(name, _)| name.eq_ignore_ascii_case(flavor))
        .map(|(_, color)| *color)
}

// =============================================================================
// DESIGN
// =============================================================================

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum DesignField {
    Name,
    Flavor,
    Color,
    Image,
}

/// Current bag configuration. Cloned into an immutable snapshot on submit.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Design {
    pub name: String,
    pub flavor: String,
    pub color: String,
    pub image: Option<String>,
}

impl Default for Design {
    fn default() -> Self {
        Self { name: String::new(), flavor: String::new(), color: DEFAULT_COLOR.to_owned(), image: None }
    }
}

impl Design {
    #[must_use]
    pub fn has_name(&self) -> bool {
        !self.name.trim().is_empty()
    }

    #[must_use]
    pub fn has_flavor(&self) -> bool {
        !self.flavor.trim().is_empty()
    }

    #[must_use]
    pub fn has_image(&self) -> bool {
        self.image.as_deref().is_some_and(|id| !id.is_empty())
    }
}

/// Normalization options that vary between deployments.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct DesignRules {
    pub uppercase_name: bool,
    pub image_catalog: Vec<String>,
}

impl Default for DesignRules {
    fn default() -> Self {
        Self {
            uppercase_name: false,
            image_catalog: DEFAULT_IMAGE_CATALOG.iter().map(|s| (*s).to_owned()).collect(),
        }
    }
}

// =============================================================================
// NORMALIZERS
// =============================================================================

/// Result of normalizing raw input. `corrected` is set when the stored value
/// differs from what the user typed.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Normalized {
    pub value: String,
    pub corrected: bool,
}

impl Normalized {
    fn from_raw(raw: &str, value: String) -> Self {
        let corrected = value != raw;
        Self { value, corrected }
    }
}

/// Keep ASCII letters, digits and spaces; clamp to [`NAME_MAX_CHARS`].
#[must_use]
pub fn normalize_name(raw: &str, uppercase: bool) -> Normalized {
    let value: String = raw
        .chars()
        .filter(|c| c.is_ascii_alphanumeric() || *c == ' ')
        .take(NAME_MAX_CHARS)
        .map(|c| if uppercase { c.to_ascii_uppercase() } else { c })
        .collect();
    Normalized::from_raw(raw, value)
}

/// Drop control characters; clamp to [`FLAVOR_MAX_CHARS`].
#[must_use]
pub fn normalize_flavor(raw: &str) -> Normalized {
    let value: String = raw
        .chars()
        .filter(|c| !c.is_control())
        .take(FLAVOR_MAX_CHARS)
        .collect();
    Normalized::from_raw(raw, value)
}

/// Reduce input to a `#rgb` or `#rrggbb` token. Anything that cannot be read
/// as one keeps `current`.
#[must_use]
pub fn normalize_color(raw: &str, current: &str) -> Normalized {
    let digits: String = raw
        .trim()
        .chars()
        .filter(char::is_ascii_hexdigit)
        .take(6)
        .map(|c| c.to_ascii_lowercase())
        .collect();
    let value = match digits.len() {
        3 | 6 => format!("#{digits}"),
        _ => current.to_owned(),
    };
    Normalized::from_raw(raw, value)
}

/// Accept only ids from the catalog. Empty input clears the selection;
/// unknown ids keep `current`.
#[must_use]
pub fn normalize_image(raw: &str, catalog: &[String], current: Option<&str>) -> Option<String> {
    let id = raw.trim();
    if id.is_empty() {
        return None;
    }
    if catalog.iter().any(|entry| entry == id) {
        return Some(id.to_owned());
    }
    current.map(str::to_owned)
}

// =============================================================================
// STORE
// =============================================================================

/// Notification sent to subscribers after a validated write.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct FieldChange {
    pub field: DesignField,
    /// Stored value; empty when the image selection was cleared.
    pub value: String,
}

pub type DesignListener = Box<dyn Fn(&FieldChange) + Send + Sync>;

pub struct DesignStore {
    design: Design,
    rules: DesignRules,
    listeners: Vec<DesignListener>,
}

impl DesignStore {
    #[must_use]
    pub fn new(rules: DesignRules) -> Self {
        Self { design: Design::default(), rules, listeners: Vec::new() }
    }

    /// Register a listener invoked after every field write.
    pub fn subscribe<F>(&mut self, listener: F)
    where
        F: Fn(&FieldChange) + Send + Sync + 'static,
    {
        self.listeners.push(Box::new(listener));
    }

    #[must_use]
    pub fn design(&self) -> &Design {
        &self.design
    }

    #[must_use]
    pub fn rules(&self) -> &DesignRules {
        &self.rules
    }

    /// Immutable copy of the current configuration.
    #[must_use]
    pub fn snapshot(&self) -> Design {
        self.design.clone()
    }

    /// Normalize `raw`, store it, notify subscribers, and return what was stored.
    pub fn set_field(&mut self, field: DesignField, raw: &str) -> String {
        let stored = match field {
            DesignField::Name => {
                let n = normalize_name(raw, self.rules.uppercase_name);
                log_correction(field, n.corrected);
                self.design.name = n.value;
                self.design.name.clone()
            }
            DesignField::Flavor => {
                let n = normalize_flavor(raw);
                log_correction(field, n.corrected);
                self.design.flavor = n.value;
                self.design.flavor.clone()
            }
            DesignField::Color => {
                let n = normalize_color(raw, &self.design.color);
                log_correction(field, n.corrected);
                self.design.color = n.value;
                self.design.color.clone()
            }
            DesignField::Image => {
                let image = normalize_image(raw, &self.rules.image_catalog, self.design.image.as_deref());
                log_correction(field, image.as_deref().unwrap_or("") != raw.trim());
                self.design.image = image;
                self.design.image.clone().unwrap_or_default()
            }
        };

        let change = FieldChange { field, value: stored.clone() };
        for listener in &self.listeners {
            listener(&change);
        }
        stored
    }
}

fn log_correction(field: DesignField, corrected: bool) {
    if corrected {
        debug!(?field, "input corrected by normalizer");
    }
}
