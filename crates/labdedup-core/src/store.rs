use crate::domain::{
    AssociatedStructure, AssociatedStructureHolder, Entity, EntityId, Membership, Organization,
    Person, Project, TeachingActivity,
};
use crate::error::StoreError;

/// Storage collaborator for one record type.
pub trait Repository<T: Entity> {
    /// Every stored record.
    fn find_all(&self) -> Result<Vec<T>, StoreError>;

    /// Get a record by ID.
    fn find_by_id(&self, id: EntityId) -> Result<Option<T>, StoreError>;

    /// Get the records with the given IDs, in request order. Unknown IDs are
    /// skipped, so the result may be shorter than `ids`.
    fn find_all_by_id(&self, ids: &[EntityId]) -> Result<Vec<T>, StoreError>;

    /// Records pointing at `related` (e.g. all memberships of an organization).
    fn find_by_related_id(&self, related: EntityId) -> Result<Vec<T>, StoreError>;

    /// Insert or replace a record.
    fn save(&self, entity: T) -> Result<T, StoreError>;

    /// Delete a record by ID.
    fn delete_by_id(&self, id: EntityId) -> Result<(), StoreError>;
}

/// One write of a changeset.
#[derive(Debug, Clone, PartialEq)]
pub enum Change {
    SaveOrganization(Organization),
    SavePerson(Person),
    SaveMembership(Membership),
    SaveProject(Project),
    SaveStructure(AssociatedStructure),
    SaveHolder(AssociatedStructureHolder),
    SaveTeachingActivity(TeachingActivity),
    DeleteOrganization(EntityId),
    DeletePerson(EntityId),
}

impl Change {
    pub fn is_deletion(&self) -> bool {
        matches!(self, Change::DeleteOrganization(_) | Change::DeletePerson(_))
    }

    /// ID of the record written or deleted.
    pub fn entity_id(&self) -> EntityId {
        match self {
            Change::SaveOrganization(o) => o.id,
            Change::SavePerson(p) => p.id,
            Change::SaveMembership(m) => m.id,
            Change::SaveProject(p) => p.id,
            Change::SaveStructure(s) => s.id,
            Change::SaveHolder(h) => h.id,
            Change::SaveTeachingActivity(t) => t.id,
            Change::DeleteOrganization(id) | Change::DeletePerson(id) => *id,
        }
    }
}

/// Ordered list of changes that must be applied all together or not at all.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Changeset {
    changes: Vec<Change>,
}

impl Changeset {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, change: Change) {
        self.changes.push(change);
    }

    pub fn is_empty(&self) -> bool {
        self.changes.is_empty()
    }

    pub fn len(&self) -> usize {
        self.changes.len()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Change> {
        self.changes.iter()
    }

    /// Number of saves.
    pub fn writes(&self) -> usize {
        self.changes.iter().filter(|c| !c.is_deletion()).count()
    }

    /// Number of deletions.
    pub fn deletions(&self) -> usize {
        self.changes.iter().filter(|c| c.is_deletion()).count()
    }
}

impl IntoIterator for Changeset {
    type Item = Change;
    type IntoIter = std::vec::IntoIter<Change>;

    fn into_iter(self) -> Self::IntoIter {
        self.changes.into_iter()
    }
}

/// Transaction boundary of a storage backend.
pub trait UnitOfWork {
    /// Apply every change in order, or none of them.
    ///
    /// When several changes fail, the error is a [`StoreError::Aggregate`]
    /// holding each failure.
    fn commit(&self, changeset: Changeset) -> Result<(), StoreError>;
}

/// Everything the organization merge engine needs from storage.
pub trait OrganizationStore:
    Repository<Organization>
    + Repository<Membership>
    + Repository<Project>
    + Repository<AssociatedStructure>
    + Repository<AssociatedStructureHolder>
    + Repository<TeachingActivity>
    + UnitOfWork
{
}

impl<S> OrganizationStore for S where
    S: Repository<Organization>
        + Repository<Membership>
        + Repository<Project>
        + Repository<AssociatedStructure>
        + Repository<AssociatedStructureHolder>
        + Repository<TeachingActivity>
        + UnitOfWork
{
}

/// Everything the person merge engine needs from storage.
pub trait PersonStore:
    Repository<Person>
    + Repository<Membership>
    + Repository<Project>
    + Repository<AssociatedStructureHolder>
    + Repository<TeachingActivity>
    + UnitOfWork
{
}

impl<S> PersonStore for S where
    S: Repository<Person>
        + Repository<Membership>
        + Repository<Project>
        + Repository<AssociatedStructureHolder>
        + Repository<TeachingActivity>
        + UnitOfWork
{
}

#[cfg(test)]
mod tests {
    use super::*;
    use uuid::Uuid;

    #[test]
    fn test_changeset_counts() {
        let mut changeset = Changeset::new();
        assert!(changeset.is_empty());

        let organization = Organization::new(Some("IPA"), "Fraunhofer IPA");
        let removed = Uuid::new_v4();
        changeset.push(Change::SaveMembership(Membership::new(
            Uuid::new_v4(),
            organization.id,
        )));
        changeset.push(Change::DeleteOrganization(removed));
        changeset.push(Change::SaveOrganization(organization.clone()));

        assert_eq!(changeset.len(), 3);
        assert_eq!(changeset.writes(), 2);
        assert_eq!(changeset.deletions(), 1);
        let ids: Vec<EntityId> = changeset.iter().map(Change::entity_id).collect();
        assert_eq!(ids[1], removed);
        assert_eq!(ids[2], organization.id);
    }

    #[test]
    fn test_person_deletion_counts_as_deletion() {
        let mut changeset = Changeset::new();
        changeset.push(Change::SavePerson(Person::new("Jean", "Dupont")));
        changeset.push(Change::DeletePerson(Uuid::new_v4()));
        assert_eq!(changeset.writes(), 1);
        assert_eq!(changeset.deletions(), 1);
    }
}
