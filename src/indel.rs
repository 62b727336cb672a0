// Copyright 2016-2019 Johannes Köster, David Lähnemann.
// Licensed under the GNU GPLv3 license (https://opensource.org/licenses/GPL-3.0)
// This file may not be copied, modified, or distributed
// except according to those terms.

//! Resolution of catalogue indels into HGVS.
//!
//! Within repeats, the same indel can be placed at several equivalent offsets. All placements
//! that reconstruct the alternative allele from the reference allele are reported, joined by
//! `|`.

use itertools::Itertools;

use crate::annotation::Strand;
use crate::coords;
use crate::grammar::Indel;
use crate::variant::FailReason;

/// Offsets `k` at which removing `len` bases from `reference` yields `alternative`.
///
/// Offset 0 is the anchor base and never part of the deletion.
pub fn deletion_offsets(reference: &[u8], alternative: &[u8], len: usize) -> Vec<usize> {
    if len == 0 || len >= reference.len() {
        return Vec::new();
    }
    (1..=reference.len() - len)
        .filter(|&k| {
            reference[..k].len() + reference[k + len..].len() == alternative.len()
                && reference[..k] == alternative[..k]
                && reference[k + len..] == alternative[k..]
        })
        .collect()
}

/// Offsets `k` at which inserting `len` bases of `alternative` before `reference[k]` yields
/// `alternative`.
pub fn insertion_offsets(reference: &[u8], alternative: &[u8], len: usize) -> Vec<usize> {
    if len == 0 || reference.len().checked_add(len) != Some(alternative.len()) {
        return Vec::new();
    }
    (1..=reference.len())
        .filter(|&k| reference[..k] == alternative[..k] && reference[k..] == alternative[k + len..])
        .collect()
}

/// HGVS strings for all placements of a catalogue deletion.
pub fn resolve_deletion(indel: &Indel, strand: Strand) -> Result<Vec<String>, FailReason> {
    let (reference, alternative) = (indel.reference().as_bytes(), indel.alternative().as_bytes());
    if alternative.len() > reference.len() || indel.len() != reference.len() - alternative.len() {
        return Err(FailReason::LengthMismatch);
    }
    let offsets = deletion_offsets(reference, alternative, indel.len());
    if offsets.is_empty() {
        return Err(FailReason::InvalidIndel);
    }

    offsets
        .into_iter()
        .map(|k| {
            let (start, end) = coords::deletion_span(strand, indel.pos(), k, indel.len())
                .ok_or(FailReason::InvalidIndel)?;
            Ok(if indel.len() == 1 {
                format!("c.{}del", start)
            } else {
                format!("c.{}_{}del", start, end)
            })
        })
        .collect()
}

/// HGVS strings for all placements of a catalogue insertion. Inserted bases are reported in
/// gene orientation.
pub fn resolve_insertion(indel: &Indel, strand: Strand) -> Result<Vec<String>, FailReason> {
    let (reference, alternative) = (indel.reference().as_bytes(), indel.alternative().as_bytes());
    if reference.len() > alternative.len() || indel.len() != alternative.len() - reference.len() {
        return Err(FailReason::LengthMismatch);
    }
    let offsets = insertion_offsets(reference, alternative, indel.len());
    if offsets.is_empty() {
        return Err(FailReason::InvalidIndel);
    }

    offsets
        .into_iter()
        .map(|k| {
            let (start, end) = coords::insertion_flanks(strand, indel.pos(), k)
                .ok_or(FailReason::InvalidIndel)?;
            let inserted = coords::oriented(strand, &alternative[k..k + indel.len()]);
            Ok(format!("c.{}_{}ins{}", start, end, inserted))
        })
        .collect()
}

/// Join alternative placements into a single notation.
pub fn join_alternatives(hgvs: Vec<String>) -> String {
    hgvs.into_iter().join("|")
}

#[cfg(test)]
mod tests {
    use super::*;

    fn indel(pos: i64, len: usize, reference: &str, alternative: &str) -> Indel {
        Indel::new(
            "gene".to_owned(),
            pos,
            len,
            reference.to_owned(),
            alternative.to_owned(),
        )
    }

    #[test]
    fn test_single_deletion() {
        let del = indel(1296, 1, "ga", "g");
        assert_eq!(
            resolve_deletion(&del, Strand::Forward),
            Ok(vec!["c.1297del".to_owned()])
        );
        assert_eq!(
            resolve_deletion(&del, Strand::Reverse),
            Ok(vec!["c.1295del".to_owned()])
        );
    }

    #[test]
    fn test_ambiguous_deletion_in_repeat() {
        // removing one of the three 'c' yields the same allele
        let del = indel(100, 1, "tccca", "tcca");
        let hgvs = resolve_deletion(&del, Strand::Forward).unwrap();
        assert_eq!(hgvs, vec!["c.101del", "c.102del", "c.103del"]);
        for k in deletion_offsets(b"tccca", b"tcca", 1) {
            let mut reconstructed = b"tccca"[..k].to_vec();
            reconstructed.extend_from_slice(&b"tccca"[k + 1..]);
            assert_eq!(reconstructed, b"tcca");
        }
        assert_eq!(join_alternatives(hgvs), "c.101del|c.102del|c.103del");
    }

    #[test]
    fn test_multi_base_deletion() {
        let del = indel(10, 2, "aggt", "at");
        assert_eq!(
            resolve_deletion(&del, Strand::Forward),
            Ok(vec!["c.11_12del".to_owned()])
        );
        assert_eq!(
            resolve_deletion(&del, Strand::Reverse),
            Ok(vec!["c.8_9del".to_owned()])
        );
    }

    #[test]
    fn test_deletion_failures() {
        assert_eq!(
            resolve_deletion(&indel(10, 3, "ag", "a"), Strand::Forward),
            Err(FailReason::LengthMismatch)
        );
        assert_eq!(
            resolve_deletion(&indel(10, 1, "a", "ag"), Strand::Forward),
            Err(FailReason::LengthMismatch)
        );
        assert_eq!(
            resolve_deletion(&indel(10, 1, "ag", "g"), Strand::Forward),
            Err(FailReason::InvalidIndel)
        );
    }

    #[test]
    fn test_insertion() {
        let ins = indel(10, 1, "ct", "cat");
        assert_eq!(
            resolve_insertion(&ins, Strand::Forward),
            Ok(vec!["c.10_11insA".to_owned()])
        );
        // same chromosome event on a reverse gene: complemented bases, mirrored flanks
        assert_eq!(
            resolve_insertion(&ins, Strand::Reverse),
            Ok(vec!["c.9_10insT".to_owned()])
        );
    }

    #[test]
    fn test_ambiguous_insertion() {
        let ins = indel(192, 1, "gg", "ggg");
        let hgvs = resolve_insertion(&ins, Strand::Forward).unwrap();
        assert_eq!(hgvs, vec!["c.192_193insG", "c.193_194insG"]);
    }

    #[test]
    fn test_insertion_failures() {
        assert_eq!(
            resolve_insertion(&indel(10, 2, "ct", "cat"), Strand::Forward),
            Err(FailReason::LengthMismatch)
        );
        assert_eq!(
            resolve_insertion(&indel(10, 1, "ct", "gat"), Strand::Forward),
            Err(FailReason::InvalidIndel)
        );
    }

    #[test]
    fn test_positions_out_of_range() {
        assert_eq!(
            resolve_deletion(&indel(i64::MAX, 1, "ga", "g"), Strand::Forward),
            Err(FailReason::InvalidIndel)
        );
        assert_eq!(
            resolve_insertion(&indel(i64::MIN, 1, "ct", "cat"), Strand::Reverse),
            Err(FailReason::InvalidIndel)
        );
        assert!(insertion_offsets(b"ct", b"cat", usize::MAX).is_empty());
    }
}
