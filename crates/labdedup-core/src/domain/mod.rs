//! Records involved in deduplication
//!
//! Only the attributes that take part in name matching or in cross-record
//! references are modelled here.

mod organization;
mod person;
mod relation;

use std::cmp::Ordering;

use uuid::Uuid;

pub use organization::Organization;
pub use person::Person;
pub use relation::{
    AssociatedStructure, AssociatedStructureHolder, Membership, OrganizationReferences,
    PersonReferences, Project, TeachingActivity,
};

/// Globally unique record identifier (UUID v4).
pub type EntityId = Uuid;

/// A stored record.
pub trait Entity {
    fn id(&self) -> EntityId;

    /// Whether this record points at the record `related` (used by
    /// `Repository::find_by_related_id`).
    fn is_related_to(&self, related: EntityId) -> bool;
}

/// Deterministic display order for the members of a duplicate cluster.
pub trait CanonicalOrder {
    fn canonical_cmp(&self, other: &Self) -> Ordering;
}

/// Case-insensitive text comparison used by the canonical orders.
pub(crate) fn cmp_ignore_case(a: &str, b: &str) -> Ordering {
    a.chars()
        .flat_map(char::to_lowercase)
        .cmp(b.chars().flat_map(char::to_lowercase))
}
