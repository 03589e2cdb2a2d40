//! Board-scoped labels attachable to tasks.

use super::error::ValidationError;
use super::ids::LabelId;
use serde::{Deserialize, Serialize};

/// Default label colour, matching the classic board green.
pub const DEFAULT_LABEL_COLOR: &str = "#61bd4f";

/// A named, coloured label defined on a board.
///
/// Label names are unique per board; uniqueness is enforced by the
/// [`Board`](super::Board) aggregate that owns the label set.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Label {
    id: LabelId,
    name: String,
    color: String,
}

impl Label {
    /// Creates a label with a trimmed, non-empty name.
    ///
    /// # Errors
    ///
    /// Returns [`ValidationError::EmptyLabelName`] when the name is empty
    /// after trimming.
    pub fn new(name: impl Into<String>, color: Option<String>) -> Result<Self, ValidationError> {
        let trimmed = name.into().trim().to_owned();
        if trimmed.is_empty() {
            return Err(ValidationError::EmptyLabelName);
        }
        Ok(Self {
            id: LabelId::new(),
            name: trimmed,
            color: color.unwrap_or_else(|| DEFAULT_LABEL_COLOR.to_owned()),
        })
    }

    /// Returns the label identifier.
    #[must_use]
    pub const fn id(&self) -> LabelId {
        self.id
    }

    /// Returns the label name.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Returns the label colour.
    #[must_use]
    pub fn color(&self) -> &str {
        &self.color
    }
}
