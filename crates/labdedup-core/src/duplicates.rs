//! Duplicate detection over a collection of records
//!
//! Each not-yet-grouped record in turn becomes a reference and absorbs every
//! later, not-yet-grouped record similar to it. Absorbed records never become
//! references themselves, so grouping is single-link and not transitive: a
//! record similar only to an absorbed member is left for a later cluster.
//! The scan is O(n²) comparisons in the worst case.

use std::cmp::Ordering;

use labdedup_names::{OrganizationNameComparator, PersonNameComparator, SimilarityMetric};

use crate::domain::{CanonicalOrder, Organization, Person};
use crate::error::StoreError;
use crate::store::Repository;

/// Pairwise duplicate test used by the clusterer.
pub trait SimilarityCheck<T> {
    fn is_duplicate(&self, reference: &T, candidate: &T) -> bool;
}

impl<M: SimilarityMetric> SimilarityCheck<Person> for PersonNameComparator<M> {
    fn is_duplicate(&self, reference: &Person, candidate: &Person) -> bool {
        self.is_similar(
            &reference.first_name,
            &reference.last_name,
            &candidate.first_name,
            &candidate.last_name,
        )
    }
}

impl<M: SimilarityMetric> SimilarityCheck<Organization> for OrganizationNameComparator<M> {
    fn is_duplicate(&self, reference: &Organization, candidate: &Organization) -> bool {
        self.is_similar(
            reference.acronym.as_deref(),
            Some(&reference.name),
            candidate.acronym.as_deref(),
            Some(&candidate.name),
        )
    }
}

/// Progress of a duplicate scan.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DuplicateProgress {
    /// Zero-based rank of the reference just processed; the collection size
    /// in the final report
    pub index: usize,
    /// Number of records absorbed into clusters so far
    pub duplicate_count: usize,
    /// Size of the scanned collection
    pub total: usize,
}

/// Group similar records, ordering each cluster canonically.
///
/// See [`find_duplicates_by`].
pub fn find_duplicates<T, C, F, E>(
    entities: &[T],
    checker: &C,
    on_progress: F,
) -> Result<Vec<Vec<T>>, E>
where
    T: Clone + CanonicalOrder,
    C: SimilarityCheck<T> + ?Sized,
    F: FnMut(DuplicateProgress) -> Result<(), E>,
{
    find_duplicates_by(entities, checker, T::canonical_cmp, on_progress)
}

/// Group similar records into clusters of at least two members.
///
/// Clusters come in discovery order; members of a cluster are sorted with
/// `order`. `on_progress` is called before the scan, after every reference
/// and after the scan. References are ranked among the records still
/// ungrouped when they are reached, so absorbed records take no rank. An
/// error returned by `on_progress` stops the scan and is returned as is; no
/// partial result is produced.
pub fn find_duplicates_by<T, C, O, F, E>(
    entities: &[T],
    checker: &C,
    mut order: O,
    mut on_progress: F,
) -> Result<Vec<Vec<T>>, E>
where
    T: Clone,
    C: SimilarityCheck<T> + ?Sized,
    O: FnMut(&T, &T) -> Ordering,
    F: FnMut(DuplicateProgress) -> Result<(), E>,
{
    let total = entities.len();
    let mut grouped = vec![false; total];
    let mut clusters: Vec<Vec<T>> = Vec::new();
    let mut duplicate_count = 0;
    let mut rank = 0;

    on_progress(DuplicateProgress {
        index: 0,
        duplicate_count,
        total,
    })?;

    for reference in 0..total {
        if grouped[reference] {
            continue;
        }
        if !grouped[reference + 1..].contains(&false) {
            break;
        }
        grouped[reference] = true;

        let mut members = vec![reference];
        for candidate in (reference + 1)..total {
            if grouped[candidate] {
                continue;
            }
            if checker.is_duplicate(&entities[reference], &entities[candidate]) {
                grouped[candidate] = true;
                members.push(candidate);
                duplicate_count += 1;
            }
        }

        if members.len() > 1 {
            let mut cluster: Vec<T> = members.iter().map(|&i| entities[i].clone()).collect();
            cluster.sort_by(&mut order);
            tracing::debug!(
                "Duplicate cluster {} with {} members",
                clusters.len(),
                cluster.len()
            );
            clusters.push(cluster);
        }

        on_progress(DuplicateProgress {
            index: rank,
            duplicate_count,
            total,
        })?;
        rank += 1;
    }

    on_progress(DuplicateProgress {
        index: total,
        duplicate_count,
        total,
    })?;
    tracing::info!(
        "Found {} duplicate clusters ({} duplicates) among {} records",
        clusters.len(),
        duplicate_count,
        total
    );

    Ok(clusters)
}

/// Scan every stored organization for duplicates.
///
/// Organizations are scanned in canonical order so the result does not depend
/// on the storage order.
pub fn find_duplicate_organizations<S, C, F, E>(
    store: &S,
    checker: &C,
    on_progress: F,
) -> Result<Vec<Vec<Organization>>, E>
where
    S: Repository<Organization> + ?Sized,
    C: SimilarityCheck<Organization> + ?Sized,
    F: FnMut(DuplicateProgress) -> Result<(), E>,
    E: From<StoreError>,
{
    let mut organizations = store.find_all()?;
    organizations.sort_by(Organization::canonical_cmp);
    find_duplicates(&organizations, checker, on_progress)
}

/// Scan every stored person for duplicates, in canonical order.
pub fn find_duplicate_persons<S, C, F, E>(
    store: &S,
    checker: &C,
    on_progress: F,
) -> Result<Vec<Vec<Person>>, E>
where
    S: Repository<Person> + ?Sized,
    C: SimilarityCheck<Person> + ?Sized,
    F: FnMut(DuplicateProgress) -> Result<(), E>,
    E: From<StoreError>,
{
    let mut persons = store.find_all()?;
    persons.sort_by(Person::canonical_cmp);
    find_duplicates(&persons, checker, on_progress)
}
