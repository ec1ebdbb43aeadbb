use std::cmp::Ordering;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::{cmp_ignore_case, CanonicalOrder, Entity, EntityId};

/// A person known by first and last name
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Person {
    pub id: EntityId,
    pub first_name: String,
    pub last_name: String,
}

impl Person {
    pub fn new(first_name: &str, last_name: &str) -> Self {
        Self {
            id: Uuid::new_v4(),
            first_name: first_name.to_string(),
            last_name: last_name.to_string(),
        }
    }
}

impl Entity for Person {
    fn id(&self) -> EntityId {
        self.id
    }

    fn is_related_to(&self, _related: EntityId) -> bool {
        false
    }
}

impl CanonicalOrder for Person {
    fn canonical_cmp(&self, other: &Self) -> Ordering {
        cmp_ignore_case(&self.last_name, &other.last_name)
            .then_with(|| cmp_ignore_case(&self.first_name, &other.first_name))
            .then_with(|| self.id.cmp(&other.id))
    }
}
