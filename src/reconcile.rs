// Copyright 2016-2019 Johannes Köster, David Lähnemann.
// Licensed under the GNU GPLv3 license (https://opensource.org/licenses/GPL-3.0)
// This file may not be copied, modified, or distributed
// except according to those terms.

//! Set reconciliation of two normalized catalogues keyed by `(drug, gene, mutation)`.

use std::collections::{HashMap, HashSet};

use crate::catalogue::{CatalogueEntry, EntryKey};

/// Where a reconciled entry comes from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, IntoStaticStr, Display)]
pub enum Provenance {
    #[strum(serialize = "intersection")]
    IntersectionOfBoth,
    #[strum(serialize = "unique_a")]
    UniqueToA,
    #[strum(serialize = "unique_b")]
    UniqueToB,
    #[strum(serialize = "reference_set")]
    ReferenceSet,
}

/// WHO confidence grades, strongest first.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum ConfidenceGrade {
    AssocWithR,
    AssocWithRInterim,
    UncertainSignificance,
    NotAssocWithRInterim,
    NotAssocWithR,
    Other,
}

impl ConfidenceGrade {
    pub fn from_label(label: &str) -> Self {
        let label = label.trim().to_lowercase();
        match label.as_str() {
            "assoc w r" => ConfidenceGrade::AssocWithR,
            "assoc w r - interim" => ConfidenceGrade::AssocWithRInterim,
            "uncertain significance" => ConfidenceGrade::UncertainSignificance,
            "not assoc w r - interim" => ConfidenceGrade::NotAssocWithRInterim,
            "not assoc w r" => ConfidenceGrade::NotAssocWithR,
            _ => ConfidenceGrade::Other,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Hash, new, Getters, CopyGetters)]
pub struct ReconciledEntry {
    #[getset(get = "pub")]
    entry: CatalogueEntry,
    #[getset(get_copy = "pub")]
    provenance: Provenance,
}

impl ReconciledEntry {
    fn grade(&self) -> ConfidenceGrade {
        ConfidenceGrade::from_label(self.entry.confidence())
    }
}

/// Merge entries by key. A later entry only replaces an earlier one with the same key if its
/// confidence grade is strictly stronger. Keys keep their first-seen order.
pub fn merge<I>(entries: I) -> Vec<ReconciledEntry>
where
    I: IntoIterator<Item = ReconciledEntry>,
{
    let mut merged: Vec<ReconciledEntry> = Vec::new();
    let mut index: HashMap<EntryKey, usize> = HashMap::new();
    for entry in entries {
        let key = entry.entry().key();
        match index.get(&key) {
            Some(&i) => {
                if entry.grade() < merged[i].grade() {
                    debug!(
                        "{} {} {}: {} replaces {}",
                        key.drug,
                        key.gene,
                        key.mutation,
                        entry.entry().confidence(),
                        merged[i].entry().confidence()
                    );
                    merged[i] = entry;
                }
            }
            None => {
                index.insert(key, merged.len());
                merged.push(entry);
            }
        }
    }
    merged
}

/// Collapse duplicate keys within one catalogue.
pub fn deduplicate(entries: Vec<CatalogueEntry>, provenance: Provenance) -> Vec<ReconciledEntry> {
    merge(
        entries
            .into_iter()
            .map(|entry| ReconciledEntry::new(entry, provenance)),
    )
}

/// The three disjoint partitions of two catalogues.
#[derive(Debug, Clone, PartialEq, Getters)]
#[getset(get = "pub")]
pub struct Partition {
    intersection: Vec<ReconciledEntry>,
    unique_left: Vec<ReconciledEntry>,
    unique_right: Vec<ReconciledEntry>,
}

/// Partition two catalogues by key. Entries present in both keep the columns of `left`.
pub fn partition(left: Vec<CatalogueEntry>, right: Vec<CatalogueEntry>) -> Partition {
    let left = deduplicate(left, Provenance::UniqueToA);
    let right = deduplicate(right, Provenance::UniqueToB);

    let left_keys: HashSet<EntryKey> = left.iter().map(|entry| entry.entry().key()).collect();
    let right_keys: HashSet<EntryKey> = right.iter().map(|entry| entry.entry().key()).collect();

    let (intersection, unique_left): (Vec<_>, Vec<_>) = left
        .into_iter()
        .partition(|entry| right_keys.contains(&entry.entry().key()));
    let intersection = intersection
        .into_iter()
        .map(|entry| ReconciledEntry::new(entry.entry, Provenance::IntersectionOfBoth))
        .collect();
    let unique_right = right
        .into_iter()
        .filter(|entry| !left_keys.contains(&entry.entry().key()))
        .collect();

    Partition {
        intersection,
        unique_left,
        unique_right,
    }
}

fn reference_entries(reference: &[CatalogueEntry]) -> impl Iterator<Item = ReconciledEntry> + '_ {
    reference
        .iter()
        .map(|entry| ReconciledEntry::new(entry.clone(), Provenance::ReferenceSet))
}

impl Partition {
    /// Intersection and left-unique entries merged with the reference set.
    pub fn merged(&self, reference: &[CatalogueEntry]) -> Vec<ReconciledEntry> {
        merge(
            self.intersection
                .iter()
                .chain(self.unique_left.iter())
                .cloned()
                .chain(reference_entries(reference)),
        )
    }

    /// Like [`Partition::merged`], additionally including the right-unique entries.
    pub fn converged(&self, reference: &[CatalogueEntry]) -> Vec<ReconciledEntry> {
        merge(
            self.intersection
                .iter()
                .chain(self.unique_left.iter())
                .chain(self.unique_right.iter())
                .cloned()
                .chain(reference_entries(reference)),
        )
    }
}
