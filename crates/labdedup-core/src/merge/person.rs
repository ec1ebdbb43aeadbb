//! Person merge
//!
//! Memberships, project participations, structure holdings and taught courses
//! of the absorbed persons move to the surviving person. The survivor also
//! takes any first or last name it lacks.

use super::{
    commit_plan, is_blank, reassign_records, resolve_sources, MergeReport, PersonMergePlan,
    WorkingSet,
};
use crate::domain::{
    AssociatedStructureHolder, EntityId, Membership, Person, PersonReferences, Project,
    TeachingActivity,
};
use crate::error::{MergeError, StoreError};
use crate::store::{Change, Changeset, PersonStore, Repository};

/// Merges persons stored in `S`.
pub struct PersonMerger<'a, S: ?Sized> {
    store: &'a S,
}

impl<'a, S> PersonMerger<'a, S>
where
    S: PersonStore + ?Sized,
{
    pub fn new(store: &'a S) -> Self {
        Self { store }
    }

    /// Merge `sources` into `target` and commit the result.
    ///
    /// Same contract as [`OrganizationMerger::merge`](super::OrganizationMerger::merge).
    pub fn merge(
        &self,
        sources: &[EntityId],
        target: EntityId,
    ) -> Result<MergeReport, MergeError> {
        let plan = self.plan(sources, target)?;
        commit_plan(self.store, plan, "person")
    }

    /// Compute the changes merging `sources` into `target` without applying them.
    pub fn plan(
        &self,
        sources: &[EntityId],
        target: EntityId,
    ) -> Result<PersonMergePlan, MergeError> {
        let mut target_person = Repository::<Person>::find_by_id(self.store, target)?
            .ok_or(MergeError::TargetNotFound(target))?;

        let found: Vec<Person> = resolve_sources(self.store, sources)?;

        let mut changeset = Changeset::new();
        let mut working = WorkingSet::default();
        let mut absorbed = Vec::new();
        let mut rewritten_records = 0;
        let mut target_changed = false;

        for source in found.iter().filter(|p| p.id != target) {
            let filled = fill_missing_names(&mut target_person, source);
            let rewritten = self.reassign(source.id, target, &mut working, &mut changeset)?;

            tracing::debug!(
                "Planning absorption of {} {} ({}) into {}: {} records rewritten",
                source.first_name,
                source.last_name,
                source.id,
                target,
                rewritten
            );

            changeset.push(Change::DeletePerson(source.id));
            absorbed.push(source.id);
            rewritten_records += rewritten;
            target_changed |= rewritten > 0 || filled;
        }

        if target_changed {
            changeset.push(Change::SavePerson(target_person.clone()));
        }

        Ok(PersonMergePlan {
            target: target_person,
            absorbed,
            rewritten_records,
            changeset,
        })
    }

    fn reassign(
        &self,
        source: EntityId,
        target: EntityId,
        working: &mut WorkingSet,
        changeset: &mut Changeset,
    ) -> Result<usize, StoreError> {
        let mut rewritten = 0;
        rewritten += reassign_records(
            self.store,
            &mut working.memberships,
            source,
            target,
            changeset,
            Membership::reassign_person,
            Change::SaveMembership,
        )?;
        rewritten += reassign_records(
            self.store,
            &mut working.projects,
            source,
            target,
            changeset,
            Project::reassign_person,
            Change::SaveProject,
        )?;
        rewritten += reassign_records(
            self.store,
            &mut working.holders,
            source,
            target,
            changeset,
            AssociatedStructureHolder::reassign_person,
            Change::SaveHolder,
        )?;
        rewritten += reassign_records(
            self.store,
            &mut working.teaching_activities,
            source,
            target,
            changeset,
            TeachingActivity::reassign_person,
            Change::SaveTeachingActivity,
        )?;
        Ok(rewritten)
    }
}

fn fill_missing_names(target: &mut Person, source: &Person) -> bool {
    let first = fill_blank(&mut target.first_name, &source.first_name);
    let last = fill_blank(&mut target.last_name, &source.last_name);
    first || last
}

fn fill_blank(field: &mut String, value: &str) -> bool {
    if is_blank(Some(field.as_str())) && !is_blank(Some(value)) {
        *field = value.to_string();
        true
    } else {
        false
    }
}
