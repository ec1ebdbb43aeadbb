//! Organization merge

use super::{
    commit_plan, is_blank, reassign_records, resolve_sources, MergeReport, OrganizationMergePlan,
    WorkingSet,
};
use crate::domain::{
    AssociatedStructure, AssociatedStructureHolder, EntityId, Membership, Organization,
    OrganizationReferences, Project, TeachingActivity,
};
use crate::error::{MergeError, StoreError};
use crate::store::{Change, Changeset, OrganizationStore, Repository};

/// Merges organizations stored in `S`.
pub struct OrganizationMerger<'a, S: ?Sized> {
    store: &'a S,
}

impl<'a, S> OrganizationMerger<'a, S>
where
    S: OrganizationStore + ?Sized,
{
    pub fn new(store: &'a S) -> Self {
        Self { store }
    }

    /// Merge `sources` into `target` and commit the result.
    ///
    /// Fails before any write when the target or a source does not exist. A
    /// source equal to the target is skipped. Nothing is committed when there
    /// is nothing to change.
    pub fn merge(
        &self,
        sources: &[EntityId],
        target: EntityId,
    ) -> Result<MergeReport, MergeError> {
        let plan = self.plan(sources, target)?;
        commit_plan(self.store, plan, "organization")
    }

    /// Compute the changes merging `sources` into `target` without applying them.
    pub fn plan(
        &self,
        sources: &[EntityId],
        target: EntityId,
    ) -> Result<OrganizationMergePlan, MergeError> {
        let mut target_organization = Repository::<Organization>::find_by_id(self.store, target)?
            .ok_or(MergeError::TargetNotFound(target))?;

        let found: Vec<Organization> = resolve_sources(self.store, sources)?;

        let mut changeset = Changeset::new();
        let mut working = WorkingSet::default();
        let mut absorbed = Vec::new();
        let mut rewritten_records = 0;
        let mut target_changed = false;

        for source in found.iter().filter(|o| o.id != target) {
            let rewritten = self.reassign(source.id, target, &mut working, &mut changeset)?;
            let filled = fill_missing_acronym(&mut target_organization, source);

            tracing::debug!(
                "Planning absorption of {} ({}) into {}: {} records rewritten",
                source.acronym_or_name(),
                source.id,
                target,
                rewritten
            );

            changeset.push(Change::DeleteOrganization(source.id));
            absorbed.push(source.id);
            rewritten_records += rewritten;
            target_changed |= rewritten > 0 || filled;
        }

        if target_changed {
            changeset.push(Change::SaveOrganization(target_organization.clone()));
        }

        Ok(OrganizationMergePlan {
            target: target_organization,
            absorbed,
            rewritten_records,
            changeset,
        })
    }

    /// Repoint every record referencing `source` at `target`.
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
            Membership::reassign,
            Change::SaveMembership,
        )?;
        rewritten += reassign_records(
            self.store,
            &mut working.projects,
            source,
            target,
            changeset,
            Project::reassign,
            Change::SaveProject,
        )?;
        rewritten += reassign_records(
            self.store,
            &mut working.structures,
            source,
            target,
            changeset,
            AssociatedStructure::reassign,
            Change::SaveStructure,
        )?;
        rewritten += reassign_records(
            self.store,
            &mut working.holders,
            source,
            target,
            changeset,
            AssociatedStructureHolder::reassign,
            Change::SaveHolder,
        )?;
        rewritten += reassign_records(
            self.store,
            &mut working.teaching_activities,
            source,
            target,
            changeset,
            TeachingActivity::reassign,
            Change::SaveTeachingActivity,
        )?;
        Ok(rewritten)
    }
}

/// The surviving organization inherits the acronym it lacks.
fn fill_missing_acronym(target: &mut Organization, source: &Organization) -> bool {
    if is_blank(target.acronym.as_deref()) && !is_blank(source.acronym.as_deref()) {
        target.acronym = source.acronym.clone();
        true
    } else {
        false
    }
}
