//! In-memory storage backend
//!
//! Every repository lives behind one `RwLock`, so a committed changeset is
//! visible all at once or not at all.

use std::collections::BTreeMap;
use std::sync::{RwLock, RwLockReadGuard, RwLockWriteGuard};

use crate::domain::{
    AssociatedStructure, AssociatedStructureHolder, Entity, EntityId, Membership, Organization,
    Person, Project, TeachingActivity,
};
use crate::error::StoreError;
use crate::store::{Change, Changeset, Repository, UnitOfWork};

/// Number of records written and deleted since the store was created.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct StoreStats {
    pub writes: usize,
    pub deletions: usize,
}

#[derive(Debug, Clone, Default)]
struct State {
    organizations: BTreeMap<EntityId, Organization>,
    persons: BTreeMap<EntityId, Person>,
    memberships: BTreeMap<EntityId, Membership>,
    projects: BTreeMap<EntityId, Project>,
    structures: BTreeMap<EntityId, AssociatedStructure>,
    holders: BTreeMap<EntityId, AssociatedStructureHolder>,
    teaching_activities: BTreeMap<EntityId, TeachingActivity>,
    stats: StoreStats,
}

impl State {
    /// An organization cannot be removed while sub-organizations point at it.
    fn ensure_no_sub_organizations(&self, id: EntityId) -> Result<(), StoreError> {
        let children = self
            .organizations
            .values()
            .filter(|o| o.is_related_to(id))
            .count();
        if children > 0 {
            return Err(StoreError::StructuralConflict {
                id,
                reason: format!("{} sub-organization(s) still attached", children),
            });
        }
        Ok(())
    }

    fn apply(&mut self, change: Change) -> Result<(), StoreError> {
        match change {
            Change::SaveOrganization(o) => {
                insert(&mut self.organizations, o, &mut self.stats);
            }
            Change::SavePerson(p) => {
                insert(&mut self.persons, p, &mut self.stats);
            }
            Change::SaveMembership(m) => {
                insert(&mut self.memberships, m, &mut self.stats);
            }
            Change::SaveProject(p) => {
                insert(&mut self.projects, p, &mut self.stats);
            }
            Change::SaveStructure(s) => {
                insert(&mut self.structures, s, &mut self.stats);
            }
            Change::SaveHolder(h) => {
                insert(&mut self.holders, h, &mut self.stats);
            }
            Change::SaveTeachingActivity(t) => {
                insert(&mut self.teaching_activities, t, &mut self.stats);
            }
            Change::DeleteOrganization(id) => {
                self.ensure_no_sub_organizations(id)?;
                remove(&mut self.organizations, id, &mut self.stats)?;
            }
            Change::DeletePerson(id) => {
                remove(&mut self.persons, id, &mut self.stats)?;
            }
        }
        Ok(())
    }
}

fn insert<T: Entity + Clone>(
    table: &mut BTreeMap<EntityId, T>,
    entity: T,
    stats: &mut StoreStats,
) -> T {
    table.insert(entity.id(), entity.clone());
    stats.writes += 1;
    entity
}

fn remove<T>(
    table: &mut BTreeMap<EntityId, T>,
    id: EntityId,
    stats: &mut StoreStats,
) -> Result<(), StoreError> {
    table.remove(&id).ok_or(StoreError::NotFound(id))?;
    stats.deletions += 1;
    Ok(())
}

/// Thread-safe in-memory implementation of every repository.
#[derive(Debug, Default)]
pub struct MemoryStore {
    state: RwLock<State>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn stats(&self) -> Result<StoreStats, StoreError> {
        Ok(self.read()?.stats)
    }

    fn read(&self) -> Result<RwLockReadGuard<'_, State>, StoreError> {
        self.state
            .read()
            .map_err(|e| StoreError::Storage(e.to_string()))
    }

    fn write(&self) -> Result<RwLockWriteGuard<'_, State>, StoreError> {
        self.state
            .write()
            .map_err(|e| StoreError::Storage(e.to_string()))
    }
}

macro_rules! memory_repository {
    ($type:ty, $table:ident $(, guard = $guard:ident)?) => {
        impl Repository<$type> for MemoryStore {
            fn find_all(&self) -> Result<Vec<$type>, StoreError> {
                Ok(self.read()?.$table.values().cloned().collect())
            }

            fn find_by_id(&self, id: EntityId) -> Result<Option<$type>, StoreError> {
                Ok(self.read()?.$table.get(&id).cloned())
            }

            fn find_all_by_id(&self, ids: &[EntityId]) -> Result<Vec<$type>, StoreError> {
                let state = self.read()?;
                Ok(ids
                    .iter()
                    .filter_map(|id| state.$table.get(id).cloned())
                    .collect())
            }

            fn find_by_related_id(&self, related: EntityId) -> Result<Vec<$type>, StoreError> {
                Ok(self
                    .read()?
                    .$table
                    .values()
                    .filter(|e| e.is_related_to(related))
                    .cloned()
                    .collect())
            }

            fn save(&self, entity: $type) -> Result<$type, StoreError> {
                let mut guard = self.write()?;
                let state = &mut *guard;
                Ok(insert(&mut state.$table, entity, &mut state.stats))
            }

            fn delete_by_id(&self, id: EntityId) -> Result<(), StoreError> {
                let mut guard = self.write()?;
                let state = &mut *guard;
                $(state.$guard(id)?;)?
                remove(&mut state.$table, id, &mut state.stats)
            }
        }
    };
}

memory_repository!(Organization, organizations, guard = ensure_no_sub_organizations);
memory_repository!(Person, persons);
memory_repository!(Membership, memberships);
memory_repository!(Project, projects);
memory_repository!(AssociatedStructure, structures);
memory_repository!(AssociatedStructureHolder, holders);
memory_repository!(TeachingActivity, teaching_activities);

impl UnitOfWork for MemoryStore {
    fn commit(&self, changeset: Changeset) -> Result<(), StoreError> {
        let mut state = self.write()?;

        // Changes land on a scratch copy that replaces the state only when
        // every change succeeded
        let mut scratch = state.clone();
        let mut failures: Vec<StoreError> = changeset
            .into_iter()
            .filter_map(|change| scratch.apply(change).err())
            .collect();

        match failures.len() {
            0 => {
                *state = scratch;
                Ok(())
            }
            1 => Err(failures.remove(0)),
            _ => Err(StoreError::Aggregate(failures)),
        }
    }
}
