// Copyright 2016-2019 Johannes Köster, David Lähnemann.
// Licensed under the GNU GPLv3 license (https://opensource.org/licenses/GPL-3.0)
// This file may not be copied, modified, or distributed
// except according to those terms.

//! Recovery of catalogue deletions whose reference allele was truncated.

use std::convert::TryFrom;

use crate::annotation::GeneRecord;
use crate::coords;
use crate::grammar::Indel;
use crate::reference;
use crate::variant::FailReason;

/// Rebuild the raw token of a deletion with the reference allele taken from the reference
/// sequence.
///
/// The window starts at the anchor position and covers the deleted bases plus the bases of the
/// alternative allele.
pub fn impute_deletion(
    indel: &Indel,
    gene: &GeneRecord,
    reference: &reference::Buffer,
) -> Result<String, FailReason> {
    let start = coords::chrom_offset(gene, indel.pos()).ok_or(FailReason::ImputationFailed)?;
    let end = indel
        .len()
        .checked_add(indel.alternative().len())
        .and_then(|len| u64::try_from(len).ok())
        .and_then(|len| start.checked_add(len))
        .ok_or(FailReason::ImputationFailed)?;
    let window = reference
        .window(gene.seqid(), start..end)
        .ok_or(FailReason::ImputationFailed)?;

    let corrected = Indel::new(
        indel.gene().to_owned(),
        indel.pos(),
        indel.len(),
        String::from_utf8_lossy(&window).to_ascii_lowercase(),
        indel.alternative().to_owned(),
    );
    debug!(
        "imputed {} as {}",
        indel.raw("del"),
        corrected.raw("del")
    );

    Ok(corrected.raw("del"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::annotation::{GeneKind, Strand};

    fn buffer() -> reference::Buffer {
        let mut buffer = reference::Buffer::default();
        //                    0123456789
        buffer.insert("chr", b"ACGTTGCAAC".to_vec());
        buffer
    }

    fn gene(strand: Strand) -> GeneRecord {
        GeneRecord::new(None, Some("abc"), "chr", 3, 8, strand, GeneKind::Coding)
    }

    #[test]
    fn test_forward_window() {
        // position 2 of a gene starting at chromosome position 3 is offset 3
        let indel = Indel::new("abc".to_owned(), 2, 2, "t".to_owned(), "t".to_owned());
        assert_eq!(
            impute_deletion(&indel, &gene(Strand::Forward), &buffer()),
            Ok("abc_2_del_2_ttg_t".to_owned())
        );
    }

    #[test]
    fn test_reverse_window() {
        // position 1 of a reverse gene ending at chromosome position 8 is offset 7
        let indel = Indel::new("abc".to_owned(), 1, 1, "a".to_owned(), "a".to_owned());
        assert_eq!(
            impute_deletion(&indel, &gene(Strand::Reverse), &buffer()),
            Ok("abc_1_del_1_aa_a".to_owned())
        );
    }

    #[test]
    fn test_window_out_of_bounds() {
        let indel = Indel::new("abc".to_owned(), 5, 4, "a".to_owned(), "a".to_owned());
        assert_eq!(
            impute_deletion(&indel, &gene(Strand::Forward), &buffer()),
            Err(FailReason::ImputationFailed)
        );
        let upstream = Indel::new("abc".to_owned(), -10, 1, "a".to_owned(), "a".to_owned());
        assert_eq!(
            impute_deletion(&upstream, &gene(Strand::Forward), &buffer()),
            Err(FailReason::ImputationFailed)
        );
    }

    #[test]
    fn test_window_out_of_range() {
        let gene = gene(Strand::Forward);
        let indel = Indel::new("abc".to_owned(), 2, usize::MAX, "t".to_owned(), "t".to_owned());
        assert_eq!(
            impute_deletion(&indel, &gene, &buffer()),
            Err(FailReason::ImputationFailed)
        );
        let indel = Indel::new("abc".to_owned(), i64::MAX, 1, "t".to_owned(), "t".to_owned());
        assert_eq!(
            impute_deletion(&indel, &gene, &buffer()),
            Err(FailReason::ImputationFailed)
        );
    }
}
