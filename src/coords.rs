// Copyright 2016-2019 Johannes Köster, David Lähnemann.
// Licensed under the GNU GPLv3 license (https://opensource.org/licenses/GPL-3.0)
// This file may not be copied, modified, or distributed
// except according to those terms.

//! Gene-relative coordinates.
//!
//! Positions are 1-based and signed: negative positions lie upstream of the gene start, and
//! there is no position 0. Upstream means further away from the coding sequence on either
//! strand, so chromosome arithmetic flips sign between strands.

use std::convert::TryFrom;

use bio::alphabets::dna;

use crate::annotation::{GeneRecord, Strand};

/// Move a gene-relative position by `delta`, skipping the non-existent position 0.
///
/// Returns `None` if the result does not fit into an `i64`.
pub fn shift(pos: i64, delta: i64) -> Option<i64> {
    let moved = pos.checked_add(delta)?;
    if pos < 0 && moved >= 0 {
        moved.checked_add(1)
    } else if pos > 0 && moved <= 0 {
        moved.checked_sub(1)
    } else {
        Some(moved)
    }
}

/// 0-based chromosome offset of a gene-relative position.
///
/// Returns `None` if the position falls before the chromosome start or out of range.
pub fn chrom_offset(gene: &GeneRecord, pos: i64) -> Option<u64> {
    if pos == 0 {
        return None;
    }
    let offset = match gene.strand() {
        Strand::Forward => {
            // -1 for 1-based to 0-based, another -1 inside the gene as there is no position 0
            let correction = if pos < 0 { -1 } else { -2 };
            i64::try_from(gene.start())
                .ok()?
                .checked_add(pos)?
                .checked_add(correction)?
        }
        Strand::Reverse => {
            let correction = if pos < 0 { -1 } else { 0 };
            i64::try_from(gene.end())
                .ok()?
                .checked_sub(pos)?
                .checked_add(correction)?
        }
    };
    u64::try_from(offset).ok()
}

/// 1-based chromosome position of a gene-relative position.
pub fn chrom_pos(gene: &GeneRecord, pos: i64) -> Option<u64> {
    chrom_offset(gene, pos)?.checked_add(1)
}

/// Gene-relative span of `len` bases removed at chromosome-orientation offset `k` from the
/// anchor position `pos`, in ascending order.
pub fn deletion_span(strand: Strand, pos: i64, k: usize, len: usize) -> Option<(i64, i64)> {
    let k = i64::try_from(k).ok()?;
    let last = k.checked_add(i64::try_from(len).ok()?)?.checked_sub(1)?;
    Some(match strand {
        Strand::Forward => (shift(pos, k)?, shift(pos, last)?),
        Strand::Reverse => (shift(pos, -last)?, shift(pos, -k)?),
    })
}

/// Gene-relative positions flanking an insertion placed before chromosome-orientation offset
/// `k` from the anchor position `pos`, in ascending order.
pub fn insertion_flanks(strand: Strand, pos: i64, k: usize) -> Option<(i64, i64)> {
    let k = i64::try_from(k).ok()?;
    Some(match strand {
        Strand::Forward => (shift(pos, k - 1)?, shift(pos, k)?),
        Strand::Reverse => (shift(pos, -k)?, shift(pos, -(k - 1))?),
    })
}

/// Bring chromosome-orientation bases into gene orientation (upper case).
pub fn oriented(strand: Strand, seq: &[u8]) -> String {
    let seq = seq.to_ascii_uppercase();
    let seq = match strand {
        Strand::Forward => seq,
        Strand::Reverse => dna::revcomp(&seq),
    };
    String::from_utf8_lossy(&seq).into_owned()
}

/// HGVS coordinate prefix for nucleotide changes in the given gene.
pub fn nucleotide_prefix(gene: &GeneRecord) -> char {
    if gene.kind().is_structural_rna() {
        'n'
    } else {
        'c'
    }
}
