//! Records that point at organizations and persons
//!
//! Every organization-valued field of every record type is listed in the
//! type's [`OrganizationReferences`] implementation, and every person-valued
//! field in its [`PersonReferences`] implementation. The merge engines rely on
//! both inventories being complete.

use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::{Entity, EntityId};

/// Organization-valued fields of a record.
pub trait OrganizationReferences {
    /// Whether any field points at `organization`.
    fn references(&self, organization: EntityId) -> bool;

    /// Point every field holding `from` at `to` instead. Returns the number
    /// of rewritten fields.
    fn reassign(&mut self, from: EntityId, to: EntityId) -> usize;
}

/// Person-valued fields of a record.
pub trait PersonReferences {
    /// Whether any field points at `person`.
    fn references_person(&self, person: EntityId) -> bool;

    /// Point every field holding `from` at `to` instead. Returns the number
    /// of rewritten fields.
    fn reassign_person(&mut self, from: EntityId, to: EntityId) -> usize;
}

fn reassign_field(field: &mut EntityId, from: EntityId, to: EntityId) -> usize {
    if *field == from {
        *field = to;
        1
    } else {
        0
    }
}

fn reassign_optional(field: &mut Option<EntityId>, from: EntityId, to: EntityId) -> usize {
    match field {
        Some(id) => reassign_field(id, from, to),
        None => 0,
    }
}

/// Replace `from` by `to` in a set; `to` may already be present.
fn reassign_set(set: &mut BTreeSet<EntityId>, from: EntityId, to: EntityId) -> usize {
    if set.remove(&from) {
        set.insert(to);
        1
    } else {
        0
    }
}

macro_rules! related_record {
    ($type:ty) => {
        impl Entity for $type {
            fn id(&self) -> EntityId {
                self.id
            }

            fn is_related_to(&self, related: EntityId) -> bool {
                self.references(related) || self.references_person(related)
            }
        }
    };
}

/// Membership of a person in an organization
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Membership {
    pub id: EntityId,
    pub person: EntityId,
    pub organization: EntityId,
    /// Organization hosting `organization` for this membership
    pub super_organization: Option<EntityId>,
}

impl Membership {
    pub fn new(person: EntityId, organization: EntityId) -> Self {
        Self {
            id: Uuid::new_v4(),
            person,
            organization,
            super_organization: None,
        }
    }
}

impl OrganizationReferences for Membership {
    fn references(&self, organization: EntityId) -> bool {
        self.organization == organization || self.super_organization == Some(organization)
    }

    fn reassign(&mut self, from: EntityId, to: EntityId) -> usize {
        reassign_field(&mut self.organization, from, to)
            + reassign_optional(&mut self.super_organization, from, to)
    }
}

impl PersonReferences for Membership {
    fn references_person(&self, person: EntityId) -> bool {
        self.person == person
    }

    fn reassign_person(&mut self, from: EntityId, to: EntityId) -> usize {
        reassign_field(&mut self.person, from, to)
    }
}

related_record!(Membership);

/// A funded research project
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Project {
    pub id: EntityId,
    pub acronym: String,
    pub coordinator: Option<EntityId>,
    pub local_organization: Option<EntityId>,
    pub super_organization: Option<EntityId>,
    /// Legal entity appointed representative
    pub lear_organization: Option<EntityId>,
    pub other_partners: BTreeSet<EntityId>,
    /// Persons taking part in the project
    pub participants: BTreeSet<EntityId>,
}

impl Project {
    pub fn new(acronym: &str) -> Self {
        Self {
            id: Uuid::new_v4(),
            acronym: acronym.to_string(),
            coordinator: None,
            local_organization: None,
            super_organization: None,
            lear_organization: None,
            other_partners: BTreeSet::new(),
            participants: BTreeSet::new(),
        }
    }
}

impl OrganizationReferences for Project {
    fn references(&self, organization: EntityId) -> bool {
        let target = Some(organization);
        self.coordinator == target
            || self.local_organization == target
            || self.super_organization == target
            || self.lear_organization == target
            || self.other_partners.contains(&organization)
    }

    fn reassign(&mut self, from: EntityId, to: EntityId) -> usize {
        reassign_optional(&mut self.coordinator, from, to)
            + reassign_optional(&mut self.local_organization, from, to)
            + reassign_optional(&mut self.super_organization, from, to)
            + reassign_optional(&mut self.lear_organization, from, to)
            + reassign_set(&mut self.other_partners, from, to)
    }
}

impl PersonReferences for Project {
    fn references_person(&self, person: EntityId) -> bool {
        self.participants.contains(&person)
    }

    fn reassign_person(&mut self, from: EntityId, to: EntityId) -> usize {
        reassign_set(&mut self.participants, from, to)
    }
}

related_record!(Project);

/// A structure (company, association, ...) created with the support of an organization
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AssociatedStructure {
    pub id: EntityId,
    pub name: String,
    pub funding_organization: Option<EntityId>,
}

impl AssociatedStructure {
    pub fn new(name: &str) -> Self {
        Self {
            id: Uuid::new_v4(),
            name: name.to_string(),
            funding_organization: None,
        }
    }
}

impl OrganizationReferences for AssociatedStructure {
    fn references(&self, organization: EntityId) -> bool {
        self.funding_organization == Some(organization)
    }

    fn reassign(&mut self, from: EntityId, to: EntityId) -> usize {
        reassign_optional(&mut self.funding_organization, from, to)
    }
}

impl PersonReferences for AssociatedStructure {
    fn references_person(&self, _person: EntityId) -> bool {
        false
    }

    fn reassign_person(&mut self, _from: EntityId, _to: EntityId) -> usize {
        0
    }
}

related_record!(AssociatedStructure);

/// A person holding a role in an associated structure, on behalf of an organization
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AssociatedStructureHolder {
    pub id: EntityId,
    pub person: EntityId,
    pub organization: Option<EntityId>,
    pub super_organization: Option<EntityId>,
}

impl AssociatedStructureHolder {
    pub fn new(person: EntityId) -> Self {
        Self {
            id: Uuid::new_v4(),
            person,
            organization: None,
            super_organization: None,
        }
    }
}

impl OrganizationReferences for AssociatedStructureHolder {
    fn references(&self, organization: EntityId) -> bool {
        self.organization == Some(organization) || self.super_organization == Some(organization)
    }

    fn reassign(&mut self, from: EntityId, to: EntityId) -> usize {
        reassign_optional(&mut self.organization, from, to)
            + reassign_optional(&mut self.super_organization, from, to)
    }
}

impl PersonReferences for AssociatedStructureHolder {
    fn references_person(&self, person: EntityId) -> bool {
        self.person == person
    }

    fn reassign_person(&mut self, from: EntityId, to: EntityId) -> usize {
        reassign_field(&mut self.person, from, to)
    }
}

related_record!(AssociatedStructureHolder);

/// A course taught at a university
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TeachingActivity {
    pub id: EntityId,
    pub title: String,
    pub university: Option<EntityId>,
    /// Person giving the course
    pub lecturer: Option<EntityId>,
}

impl TeachingActivity {
    pub fn new(title: &str) -> Self {
        Self {
            id: Uuid::new_v4(),
            title: title.to_string(),
            university: None,
            lecturer: None,
        }
    }
}

impl OrganizationReferences for TeachingActivity {
    fn references(&self, organization: EntityId) -> bool {
        self.university == Some(organization)
    }

    fn reassign(&mut self, from: EntityId, to: EntityId) -> usize {
        reassign_optional(&mut self.university, from, to)
    }
}

impl PersonReferences for TeachingActivity {
    fn references_person(&self, person: EntityId) -> bool {
        self.lecturer == Some(person)
    }

    fn reassign_person(&mut self, from: EntityId, to: EntityId) -> usize {
        reassign_optional(&mut self.lecturer, from, to)
    }
}

related_record!(TeachingActivity);
