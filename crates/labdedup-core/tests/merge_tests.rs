//! Organization and person merge integration tests

use labdedup_core::names::PersonNameComparator;
use labdedup_core::{
    find_duplicate_persons, AssociatedStructure, AssociatedStructureHolder, Change, Changeset,
    DedupError, EntityId, MemoryStore, Membership, MergeError, Organization, OrganizationMerger,
    Person, PersonMerger, Project, Repository, StoreError, StoreStats, TeachingActivity,
    UnitOfWork,
};
use uuid::Uuid;

fn organization(store: &MemoryStore, acronym: &str, name: &str) -> Organization {
    store.save(Organization::new(Some(acronym), name)).unwrap()
}

fn find<T>(store: &MemoryStore, id: EntityId) -> Option<T>
where
    MemoryStore: Repository<T>,
    T: labdedup_core::Entity,
{
    Repository::<T>::find_by_id(store, id).unwrap()
}

// === Reassignment ===

#[test]
fn test_merge_repoints_every_reference() {
    let store = MemoryStore::new();
    let a = organization(&store, "IPA", "Fraunhofer IPA");
    let b = organization(&store, "IPA", "Fraunhofer-IPA");
    let person = Uuid::new_v4();

    let membership = store.save(Membership::new(person, b.id)).unwrap();
    let mut project = Project::new("DEEP");
    project.coordinator = Some(b.id);
    let project = store.save(project).unwrap();
    let mut holder = AssociatedStructureHolder::new(person);
    holder.organization = Some(b.id);
    let holder = store.save(holder).unwrap();

    let report = OrganizationMerger::new(&store).merge(&[b.id], a.id).unwrap();
    assert_eq!(report.absorbed, vec![b.id]);
    assert_eq!(report.rewritten_records, 3);
    assert!(report.target_saved);

    assert!(find::<Organization>(&store, b.id).is_none());
    assert!(find::<Organization>(&store, a.id).is_some());
    assert_eq!(
        find::<Membership>(&store, membership.id).unwrap().organization,
        a.id
    );
    assert_eq!(
        find::<Project>(&store, project.id).unwrap().coordinator,
        Some(a.id)
    );
    assert_eq!(
        find::<AssociatedStructureHolder>(&store, holder.id)
            .unwrap()
            .organization,
        Some(a.id)
    );

    let again = OrganizationMerger::new(&store).merge(&[b.id], a.id);
    assert_eq!(again, Err(MergeError::SourcesNotFound(vec![b.id])));
}

#[test]
fn test_merge_covers_the_whole_relation_inventory() {
    let store = MemoryStore::new();
    let a = organization(&store, "UTBM", "Universite de Technologie");
    let b = organization(&store, "UTBM", "Univ. de Technologie");
    let person = Uuid::new_v4();

    let mut membership = Membership::new(person, Uuid::new_v4());
    membership.super_organization = Some(b.id);
    let membership = store.save(membership).unwrap();

    let mut project = Project::new("SMART");
    project.local_organization = Some(b.id);
    project.super_organization = Some(b.id);
    project.lear_organization = Some(b.id);
    project.other_partners.insert(b.id);
    let project = store.save(project).unwrap();

    let mut structure = AssociatedStructure::new("Startup");
    structure.funding_organization = Some(b.id);
    let structure = store.save(structure).unwrap();

    let mut holder = AssociatedStructureHolder::new(person);
    holder.super_organization = Some(b.id);
    let holder = store.save(holder).unwrap();

    let mut activity = TeachingActivity::new("Multi-agent systems");
    activity.university = Some(b.id);
    let activity = store.save(activity).unwrap();

    OrganizationMerger::new(&store).merge(&[b.id], a.id).unwrap();

    assert_eq!(
        find::<Membership>(&store, membership.id).unwrap().super_organization,
        Some(a.id)
    );
    let project = find::<Project>(&store, project.id).unwrap();
    assert_eq!(project.local_organization, Some(a.id));
    assert_eq!(project.super_organization, Some(a.id));
    assert_eq!(project.lear_organization, Some(a.id));
    assert_eq!(project.other_partners.iter().copied().collect::<Vec<_>>(), vec![a.id]);
    assert_eq!(
        find::<AssociatedStructure>(&store, structure.id)
            .unwrap()
            .funding_organization,
        Some(a.id)
    );
    assert_eq!(
        find::<AssociatedStructureHolder>(&store, holder.id)
            .unwrap()
            .super_organization,
        Some(a.id)
    );
    assert_eq!(
        find::<TeachingActivity>(&store, activity.id).unwrap().university,
        Some(a.id)
    );
}

#[test]
fn test_unrelated_records_are_not_written() {
    let store = MemoryStore::new();
    let a = organization(&store, "A", "Alpha");
    let b = organization(&store, "B", "Beta");
    let other = organization(&store, "C", "Gamma");
    store.save(Membership::new(Uuid::new_v4(), other.id)).unwrap();
    store.save(Membership::new(Uuid::new_v4(), b.id)).unwrap();
    let before = store.stats().unwrap();

    OrganizationMerger::new(&store).merge(&[b.id], a.id).unwrap();

    // One membership and the target
    let after = store.stats().unwrap();
    assert_eq!(after.writes - before.writes, 2);
    assert_eq!(after.deletions - before.deletions, 1);
}

// === No-op and not-found ===

#[test]
fn test_self_merge_is_a_no_op() {
    let store = MemoryStore::new();
    let a = organization(&store, "A", "Alpha");
    store.save(Membership::new(Uuid::new_v4(), a.id)).unwrap();
    let before = store.stats().unwrap();

    let report = OrganizationMerger::new(&store).merge(&[a.id], a.id).unwrap();

    assert!(report.absorbed.is_empty());
    assert!(!report.target_saved);
    assert_eq!(store.stats().unwrap(), before);
}

#[test]
fn test_empty_source_list_is_a_no_op() {
    let store = MemoryStore::new();
    let a = organization(&store, "A", "Alpha");
    let before = store.stats().unwrap();

    let report = OrganizationMerger::new(&store).merge(&[], a.id).unwrap();
    assert!(report.absorbed.is_empty());
    assert_eq!(store.stats().unwrap(), before);
}

#[test]
fn test_missing_target() {
    let store = MemoryStore::new();
    let b = organization(&store, "B", "Beta");
    let missing = Uuid::new_v4();
    let before = store.stats().unwrap();

    let result = OrganizationMerger::new(&store).merge(&[b.id], missing);
    assert_eq!(result, Err(MergeError::TargetNotFound(missing)));
    assert_eq!(store.stats().unwrap(), before);
}

#[test]
fn test_missing_sources_are_all_named() {
    let store = MemoryStore::new();
    let a = organization(&store, "A", "Alpha");
    let b = organization(&store, "B", "Beta");
    store.save(Membership::new(Uuid::new_v4(), b.id)).unwrap();
    let first_missing = Uuid::new_v4();
    let second_missing = Uuid::new_v4();
    let before = store.stats().unwrap();

    let result = OrganizationMerger::new(&store).merge(&[first_missing, b.id, second_missing], a.id);
    assert_eq!(
        result,
        Err(MergeError::SourcesNotFound(vec![first_missing, second_missing]))
    );
    assert_eq!(store.stats().unwrap(), before);
    assert!(find::<Organization>(&store, b.id).is_some());
}

// === Atomicity ===

#[test]
fn test_structural_conflict_rolls_back_the_whole_merge() {
    let store = MemoryStore::new();
    let a = organization(&store, "UTBM", "Universite de Technologie");
    let b = organization(&store, "UTBM", "Univ. de Technologie");
    let c = organization(&store, "UTBM", "Universite Technologie");
    store
        .save(Organization::new(Some("CIAD"), "Laboratory").with_super_organization(c.id))
        .unwrap();
    let membership = store.save(Membership::new(Uuid::new_v4(), b.id)).unwrap();
    let before = store.stats().unwrap();

    let result = OrganizationMerger::new(&store).merge(&[b.id, c.id], a.id);
    assert!(matches!(
        result,
        Err(MergeError::Store(StoreError::StructuralConflict { id, .. })) if id == c.id
    ));

    assert_eq!(store.stats().unwrap(), before);
    assert!(find::<Organization>(&store, b.id).is_some());
    assert_eq!(
        find::<Membership>(&store, membership.id).unwrap().organization,
        b.id
    );
}

#[test]
fn test_several_rejected_deletions_are_aggregated() {
    let store = MemoryStore::new();
    let a = organization(&store, "A", "Alpha");
    let mut changeset = Changeset::new();
    let mut expected = Vec::new();
    for name in ["Beta", "Gamma"] {
        let parent = organization(&store, "P", name);
        store
            .save(Organization::new(None, "Child").with_super_organization(parent.id))
            .unwrap();
        changeset.push(Change::DeleteOrganization(parent.id));
        expected.push(parent.id);
    }
    changeset.push(Change::SaveOrganization(a));

    let err = store.commit(changeset).unwrap_err();
    let ids: Vec<EntityId> = err
        .causes()
        .into_iter()
        .map(|cause| match cause {
            StoreError::StructuralConflict { id, .. } => *id,
            other => panic!("unexpected cause {other:?}"),
        })
        .collect();
    assert_eq!(ids, expected);
}

#[test]
fn test_stats_count_commits() {
    let store = MemoryStore::new();
    assert_eq!(store.stats().unwrap(), StoreStats::default());
    let a = organization(&store, "A", "Alpha");
    let b = organization(&store, "B", "Beta");
    store.save(Membership::new(Uuid::new_v4(), b.id)).unwrap();

    OrganizationMerger::new(&store).merge(&[b.id], a.id).unwrap();
    assert_eq!(
        store.stats().unwrap(),
        StoreStats {
            writes: 5,
            deletions: 1
        }
    );
}

// === Person merge ===

fn person(store: &MemoryStore, first_name: &str, last_name: &str) -> Person {
    store.save(Person::new(first_name, last_name)).unwrap()
}

#[test]
fn test_person_merge_repoints_every_reference() {
    let store = MemoryStore::new();
    let stephane = person(&store, "Stephane", "Galland");
    let initial = person(&store, "S.", "Galland");
    let lab = organization(&store, "CIAD", "Laboratory");

    let membership = store.save(Membership::new(initial.id, lab.id)).unwrap();
    let mut project = Project::new("DEEP");
    project.participants.insert(initial.id);
    let project = store.save(project).unwrap();
    let mut holder = AssociatedStructureHolder::new(initial.id);
    holder.organization = Some(lab.id);
    let holder = store.save(holder).unwrap();
    let mut activity = TeachingActivity::new("Multi-agent systems");
    activity.lecturer = Some(initial.id);
    activity.university = Some(lab.id);
    let activity = store.save(activity).unwrap();

    let report = PersonMerger::new(&store)
        .merge(&[initial.id], stephane.id)
        .unwrap();
    assert_eq!(report.absorbed, vec![initial.id]);
    assert_eq!(report.rewritten_records, 4);
    assert!(report.target_saved);

    assert!(find::<Person>(&store, initial.id).is_none());
    let membership = find::<Membership>(&store, membership.id).unwrap();
    assert_eq!(membership.person, stephane.id);
    assert_eq!(membership.organization, lab.id);
    assert!(find::<Project>(&store, project.id)
        .unwrap()
        .participants
        .contains(&stephane.id));
    assert_eq!(
        find::<AssociatedStructureHolder>(&store, holder.id)
            .unwrap()
            .person,
        stephane.id
    );
    let activity = find::<TeachingActivity>(&store, activity.id).unwrap();
    assert_eq!(activity.lecturer, Some(stephane.id));
    assert_eq!(activity.university, Some(lab.id));

    let again = PersonMerger::new(&store).merge(&[initial.id], stephane.id);
    assert_eq!(again, Err(MergeError::SourcesNotFound(vec![initial.id])));
}

#[test]
fn test_person_merge_leaves_organizations_alone() {
    let store = MemoryStore::new();
    let target = person(&store, "Marie", "Curie");
    let source = person(&store, "M.", "Curie");
    let lab = organization(&store, "ICR", "Institut du Radium");
    store.save(Membership::new(source.id, lab.id)).unwrap();

    PersonMerger::new(&store).merge(&[source.id], target.id).unwrap();

    assert_eq!(find::<Organization>(&store, lab.id), Some(lab));
}

#[test]
fn test_person_merge_failures_write_nothing() {
    let store = MemoryStore::new();
    let target = person(&store, "Marie", "Curie");
    let source = person(&store, "M.", "Curie");
    store.save(Membership::new(source.id, Uuid::new_v4())).unwrap();
    let missing = Uuid::new_v4();
    let before = store.stats().unwrap();

    let merger = PersonMerger::new(&store);
    assert_eq!(
        merger.merge(&[source.id], missing),
        Err(MergeError::TargetNotFound(missing))
    );
    assert_eq!(
        merger.merge(&[source.id, missing], target.id),
        Err(MergeError::SourcesNotFound(vec![missing]))
    );
    assert_eq!(store.stats().unwrap(), before);
    assert!(find::<Person>(&store, source.id).is_some());
}

#[test]
fn test_person_self_merge_is_a_no_op() {
    let store = MemoryStore::new();
    let target = person(&store, "Marie", "Curie");
    store.save(Membership::new(target.id, Uuid::new_v4())).unwrap();
    let before = store.stats().unwrap();

    let report = PersonMerger::new(&store)
        .merge(&[target.id], target.id)
        .unwrap();
    assert!(report.absorbed.is_empty());
    assert!(!report.target_saved);
    assert_eq!(store.stats().unwrap(), before);
}

#[test]
fn test_unreferenced_person_is_only_deleted() {
    let store = MemoryStore::new();
    let target = person(&store, "Marie", "Curie");
    let source = person(&store, "M.", "Curie");
    let before = store.stats().unwrap();

    let report = PersonMerger::new(&store)
        .merge(&[source.id], target.id)
        .unwrap();
    assert!(!report.target_saved);
    assert_eq!(
        store.stats().unwrap(),
        StoreStats {
            writes: before.writes,
            deletions: before.deletions + 1
        }
    );
}

#[test]
fn test_merge_each_person_cluster() {
    let store = MemoryStore::new();
    let stephane = person(&store, "Stephane", "Galland");
    let initial = person(&store, "S.", "Galland");
    person(&store, "Sarah", "Connor");
    store.save(Membership::new(initial.id, Uuid::new_v4())).unwrap();
    let comparator = PersonNameComparator::new().with_similarity_level(0.9);

    let clusters =
        find_duplicate_persons(&store, &comparator, |_| Ok::<(), DedupError>(())).unwrap();
    assert_eq!(clusters.len(), 1);
    for cluster in &clusters {
        let sources: Vec<EntityId> = cluster.iter().map(|p| p.id).collect();
        PersonMerger::new(&store)
            .merge(&sources, stephane.id)
            .unwrap();
    }

    let persons: Vec<Person> = store.find_all().unwrap();
    assert_eq!(persons.len(), 2);
    assert!(persons.iter().all(|p| p.id != initial.id));
    let memberships: Vec<Membership> = store.find_by_related_id(stephane.id).unwrap();
    assert_eq!(memberships.len(), 1);
}
