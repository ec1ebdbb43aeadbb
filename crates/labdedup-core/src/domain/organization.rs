use std::cmp::Ordering;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::{cmp_ignore_case, CanonicalOrder, Entity, EntityId};

/// A research organization (laboratory, university, company, ...)
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Organization {
    pub id: EntityId,
    pub acronym: Option<String>,
    pub name: String,
    /// Parent organization, if any
    pub super_organization: Option<EntityId>,
}

impl Organization {
    pub fn new(acronym: Option<&str>, name: &str) -> Self {
        Self {
            id: Uuid::new_v4(),
            acronym: acronym.map(str::to_string),
            name: name.to_string(),
            super_organization: None,
        }
    }

    /// Builder method to attach the organization to a parent
    pub fn with_super_organization(mut self, parent: EntityId) -> Self {
        self.super_organization = Some(parent);
        self
    }

    /// The acronym when it is set and not blank, otherwise the name.
    pub fn acronym_or_name(&self) -> &str {
        self.acronym
            .as_deref()
            .filter(|acronym| !acronym.trim().is_empty())
            .unwrap_or(&self.name)
    }
}

impl Entity for Organization {
    fn id(&self) -> EntityId {
        self.id
    }

    /// Sub-organizations are related to their parent.
    fn is_related_to(&self, related: EntityId) -> bool {
        self.super_organization == Some(related)
    }
}

impl CanonicalOrder for Organization {
    fn canonical_cmp(&self, other: &Self) -> Ordering {
        cmp_ignore_case(self.acronym_or_name(), other.acronym_or_name())
            .then_with(|| cmp_ignore_case(&self.name, &other.name))
            .then_with(|| self.id.cmp(&other.id))
    }
}
