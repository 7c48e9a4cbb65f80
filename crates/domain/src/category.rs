//! Category entity.

use chrono::{DateTime, Utc};
use common::CategoryId;

use crate::{CategoryLink, DomainError, Entity, EventQueue};

/// A product category, optionally nested under a parent category.
///
/// The entity does not check for parent cycles. A parent is fixed at
/// construction and must already exist, so categories created through
/// [`Category::new`] always form a forest.
#[derive(Debug, Clone)]
pub struct Category {
    id: CategoryId,
    name: String,
    shortcode: String,
    parent_id: Option<CategoryId>,
    created_at: DateTime<Utc>,
    events: EventQueue,
}

impl Category {
    /// Creates a new category under an optional parent.
    pub fn new(
        name: impl Into<String>,
        shortcode: impl Into<String>,
        parent: Option<&Category>,
    ) -> Result<Self, DomainError> {
        let name = name.into();
        let shortcode = shortcode.into();

        if name.trim().is_empty() {
            return Err(DomainError::validation("Name cannot be empty."));
        }
        if shortcode.trim().is_empty() {
            return Err(DomainError::validation("Shortcode cannot be empty."));
        }

        Ok(Self {
            id: CategoryId::new(),
            name,
            shortcode,
            parent_id: parent.map(|p| p.id),
            created_at: Utc::now(),
            events: EventQueue::new(),
        })
    }

    /// Rebuilds a category from persisted state. No validation, no events.
    pub fn restore(
        id: CategoryId,
        name: String,
        shortcode: String,
        parent_id: Option<CategoryId>,
        created_at: DateTime<Utc>,
    ) -> Self {
        Self {
            id,
            name,
            shortcode,
            parent_id,
            created_at,
            events: EventQueue::new(),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn shortcode(&self) -> &str {
        &self.shortcode
    }

    pub fn parent_id(&self) -> Option<CategoryId> {
        self.parent_id
    }

    /// The view of this category stored on its products.
    pub fn link(&self) -> CategoryLink {
        CategoryLink {
            id: self.id,
            name: self.name.clone(),
            shortcode: self.shortcode.clone(),
        }
    }
}

impl Entity for Category {
    type Id = CategoryId;

    fn entity_type() -> &'static str {
        "Category"
    }

    fn id(&self) -> CategoryId {
        self.id
    }

    fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    fn event_queue(&self) -> &EventQueue {
        &self.events
    }

    fn event_queue_mut(&mut self) -> &mut EventQueue {
        &mut self.events
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn root_category_has_no_parent() {
        let category = Category::new("Electronics", "ELEC", None).unwrap();
        assert_eq!(category.name(), "Electronics");
        assert_eq!(category.shortcode(), "ELEC");
        assert_eq!(category.parent_id(), None);
        assert!(category.events().is_empty());
    }

    #[test]
    fn child_category_references_parent() {
        let parent = Category::new("Electronics", "ELEC", None).unwrap();
        let child = Category::new("Phones", "PHON", Some(&parent)).unwrap();
        assert_eq!(child.parent_id(), Some(parent.id()));
    }

    #[test]
    fn empty_name_is_rejected() {
        let err = Category::new("", "ELEC", None).unwrap_err();
        assert_eq!(err, DomainError::Validation("Name cannot be empty.".into()));
    }

    #[test]
    fn empty_shortcode_is_rejected() {
        let err = Category::new("Electronics", " ", None).unwrap_err();
        assert_eq!(err.to_string(), "Shortcode cannot be empty.");
    }
}
