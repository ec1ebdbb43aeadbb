//! Merge of duplicate records
//!
//! A merge is computed as a plan first. The plan holds every write needed to
//! repoint the records referencing the absorbed records, followed by the
//! deletion of each absorbed record. The plan is then committed through the
//! store's [`UnitOfWork`] as a single changeset.
//!
//! [`OrganizationMerger`] and [`PersonMerger`] share this flow and differ in
//! the reference inventory they rewrite.

mod organization;
mod person;

use std::collections::{BTreeMap, BTreeSet};

pub use organization::OrganizationMerger;
pub use person::PersonMerger;

use crate::domain::{
    AssociatedStructure, AssociatedStructureHolder, Entity, EntityId, Membership, Organization,
    Person, Project, TeachingActivity,
};
use crate::error::{MergeError, StoreError};
use crate::store::{Change, Changeset, Repository, UnitOfWork};

/// Outcome of a merge.
#[derive(Debug, Clone, PartialEq)]
pub struct MergeReport {
    pub target: EntityId,
    /// Records removed, in request order
    pub absorbed: Vec<EntityId>,
    /// Number of referencing records rewritten
    pub rewritten_records: usize,
    /// Whether the surviving record was saved
    pub target_saved: bool,
}

/// Every write a merge will perform.
#[derive(Debug, Clone, PartialEq)]
pub struct MergePlan<T> {
    /// The surviving record, with any inherited attributes
    pub target: T,
    pub absorbed: Vec<EntityId>,
    pub rewritten_records: usize,
    pub changeset: Changeset,
}

pub type OrganizationMergePlan = MergePlan<Organization>;
pub type PersonMergePlan = MergePlan<Person>;

impl<T: Entity> MergePlan<T> {
    pub fn is_empty(&self) -> bool {
        self.changeset.is_empty()
    }

    pub fn report(&self) -> MergeReport {
        let target = self.target.id();
        MergeReport {
            target,
            absorbed: self.absorbed.clone(),
            rewritten_records: self.rewritten_records,
            target_saved: self
                .changeset
                .iter()
                .any(|c| !c.is_deletion() && c.entity_id() == target),
        }
    }
}

/// Working copies of the records touched by a plan, keyed by record ID, so a
/// record referencing several sources is rewritten cumulatively.
#[derive(Default)]
struct WorkingSet {
    memberships: BTreeMap<EntityId, Membership>,
    projects: BTreeMap<EntityId, Project>,
    structures: BTreeMap<EntityId, AssociatedStructure>,
    holders: BTreeMap<EntityId, AssociatedStructureHolder>,
    teaching_activities: BTreeMap<EntityId, TeachingActivity>,
}

/// Load the requested sources, ignoring repeated IDs.
///
/// Fails with every missing ID, in request order.
fn resolve_sources<S, T>(store: &S, sources: &[EntityId]) -> Result<Vec<T>, MergeError>
where
    S: Repository<T> + ?Sized,
    T: Entity,
{
    let mut requested: Vec<EntityId> = Vec::with_capacity(sources.len());
    let mut seen = BTreeSet::new();
    for &id in sources {
        if seen.insert(id) {
            requested.push(id);
        }
    }

    let found = store.find_all_by_id(&requested)?;
    if found.len() != requested.len() {
        let found_ids: BTreeSet<EntityId> = found.iter().map(Entity::id).collect();
        let missing = requested
            .into_iter()
            .filter(|id| !found_ids.contains(id))
            .collect();
        return Err(MergeError::SourcesNotFound(missing));
    }
    Ok(found)
}

/// Apply `rewrite` to every stored record related to `source` and queue the
/// records it changed. Returns the number of changed records.
fn reassign_records<S, T>(
    store: &S,
    working: &mut BTreeMap<EntityId, T>,
    source: EntityId,
    target: EntityId,
    changeset: &mut Changeset,
    rewrite: fn(&mut T, EntityId, EntityId) -> usize,
    save: fn(T) -> Change,
) -> Result<usize, StoreError>
where
    S: Repository<T> + ?Sized,
    T: Entity + Clone,
{
    let mut rewritten = 0;
    for stored in store.find_by_related_id(source)? {
        let record = working.entry(stored.id()).or_insert(stored);
        let fields = rewrite(record, source, target);
        if fields > 0 {
            tracing::debug!(
                "Record {} now references {} instead of {} ({} fields)",
                record.id(),
                target,
                source,
                fields
            );
            changeset.push(save(record.clone()));
            rewritten += 1;
        }
    }
    Ok(rewritten)
}

/// Commit a plan unless it is empty.
fn commit_plan<S, T>(store: &S, plan: MergePlan<T>, kind: &str) -> Result<MergeReport, MergeError>
where
    S: UnitOfWork + ?Sized,
    T: Entity,
{
    let report = plan.report();
    if plan.is_empty() {
        tracing::debug!("Nothing to merge into {} {}", kind, report.target);
        return Ok(report);
    }

    store.commit(plan.changeset)?;
    for source in &report.absorbed {
        tracing::info!("Absorbed {} {} into {}", kind, source, report.target);
    }
    tracing::info!(
        "Merged {} {}(s) into {} ({} records rewritten)",
        report.absorbed.len(),
        kind,
        report.target,
        report.rewritten_records
    );
    Ok(report)
}

/// Whether a text attribute is missing.
fn is_blank(value: Option<&str>) -> bool {
    value.map_or(true, |v| v.trim().is_empty())
}
