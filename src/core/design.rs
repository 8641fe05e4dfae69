//! Generated designs shown on the results page.

use serde::{Deserialize, Serialize};

use super::provider::ImageRef;

pub const DESIGN_DESCRIPTION: &str =
    "A unique minimalist line art design optimized for jewelry engraving";

/// One generated image plus its display metadata.
///
/// Lives only for the current session.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Design {
    pub image_url: String,
    pub name: String,
    pub description: String,
}

impl Design {
    /// Build the design produced by batch slot `slot` (zero based).
    #[must_use]
    pub fn from_slot(slot: usize, image: ImageRef) -> Self {
        Self {
            image_url: image.into_string(),
            name: format!("Custom Design {}", slot + 1),
            description: DESIGN_DESCRIPTION.to_string(),
        }
    }
}
