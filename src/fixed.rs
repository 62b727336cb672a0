// Copyright 2016-2019 Johannes Köster, David Lähnemann.
// Licensed under the GNU GPLv3 license (https://opensource.org/licenses/GPL-3.0)
// This file may not be copied, modified, or distributed
// except according to those terms.

//! Chromosome-anchored short notation as used by the gene database, e.g. `450S>450L` for a
//! protein change or `761154CTTC>C` for a deletion.

use bio::alphabets::dna;

use crate::annotation::{GeneRecord, Strand};
use crate::coords;
use crate::grammar::{IndelOp, Token};
use crate::normalize::{expand_range, CODON_PLACEHOLDER, INDEL_PLACEHOLDER};
use crate::reference;

fn substitution(pos: impl std::fmt::Display, reference: char, alternative: char) -> String {
    format!("{}{}>{}", pos, reference, alternative)
}

fn complement(base: char) -> char {
    dna::complement(base as u8) as char
}

/// Upstream substitutions keep their gene-relative position, with bases on the chromosome strand.
fn upstream(gene: &GeneRecord, pos: i64, reference: char, alternative: char) -> String {
    match gene.strand() {
        Strand::Forward => substitution(pos, reference, alternative),
        Strand::Reverse => substitution(pos, complement(reference), complement(alternative)),
    }
}

/// Convert a classified token into fixed notation. Returns `None` if a gene is required but
/// missing, or the coordinates do not map onto the reference.
pub fn to_fixed(
    token: &Token,
    gene: Option<&GeneRecord>,
    reference: &reference::Buffer,
) -> Option<Vec<String>> {
    let base_at = |gene: &GeneRecord, pos: u64| -> Option<Vec<u8>> {
        reference.window(gene.seqid(), pos.checked_sub(1)?..pos)
    };

    Some(match token {
        Token::Protein(protein) => vec![format!(
            "{}{}>{}{}",
            protein.codon(),
            protein.reference().short(),
            protein.codon(),
            protein.alternative().short()
        )],
        Token::Promoter {
            pos,
            reference,
            alternative,
            ..
        } => vec![upstream(gene?, *pos, *reference, *alternative)],
        Token::Nucleotide {
            pos,
            reference,
            alternative,
            ..
        } => {
            // only upstream changes of coding genes have a fixed form
            let gene = gene?;
            if *pos > 0 || coords::nucleotide_prefix(gene) != 'c' {
                return None;
            }
            vec![upstream(gene, *pos, *reference, *alternative)]
        }
        Token::Coding { .. } | Token::NonCoding { .. } => return None,
        Token::Rna {
            pos,
            reference,
            alternative,
            ..
        } => vec![format!("{}{}>{}", pos, reference, alternative)],
        Token::Deletion(indel) | Token::Insertion(indel) => {
            let pos = coords::chrom_pos(gene?, indel.pos())?;
            vec![format!(
                "{}{}>{}",
                pos,
                indel.reference().to_ascii_uppercase(),
                indel.alternative().to_ascii_uppercase()
            )]
        }
        Token::CodingIndel {
            start,
            end,
            op,
            seq,
            ..
        } => {
            let gene = gene?;
            let end = end.unwrap_or(*start);
            let (first, last) = (coords::chrom_pos(gene, *start)?, coords::chrom_pos(gene, end)?);
            let (lo, hi) = (first.min(last), first.max(last));
            match op {
                IndelOp::Del | IndelOp::Dup => {
                    let anchor = lo.checked_sub(1)?;
                    let window = reference.window(gene.seqid(), anchor.checked_sub(1)?..hi)?;
                    let anchor_base = *window.first()? as char;
                    let window = String::from_utf8_lossy(&window).into_owned();
                    if *op == IndelOp::Del {
                        vec![format!("{}{}>{}", anchor, window, anchor_base)]
                    } else {
                        vec![format!("{}{}>{}", anchor, anchor_base, window)]
                    }
                }
                IndelOp::Ins => {
                    // the lower chromosome flank anchors the insertion
                    let inserted = match gene.strand() {
                        Strand::Forward => seq.clone(),
                        Strand::Reverse => coords::oriented(Strand::Reverse, seq.as_bytes()),
                    };
                    let base = base_at(gene, lo)?;
                    let base = String::from_utf8_lossy(&base).into_owned();
                    vec![format!("{}{}>{}{}", lo, base, base, inserted)]
                }
            }
        }
        Token::Literal { literal, .. } => vec![literal.to_string()],
        Token::CodonRange { start, end, .. } => {
            expand_range(CODON_PLACEHOLDER, *start, *end).ok()?
        }
        Token::IndelRange { start, end, .. } => {
            expand_range(INDEL_PLACEHOLDER, *start, Some(*end)).ok()?
        }
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::annotation::GeneKind;
    use crate::grammar::classify;

    fn buffer() -> reference::Buffer {
        let mut buffer = reference::Buffer::default();
        //                       1234567890
        buffer.insert("chr", b"ACGTTGCAAC".to_vec());
        buffer
    }

    fn gene(strand: Strand) -> GeneRecord {
        GeneRecord::new(None, Some("abc"), "chr", 3, 8, strand, GeneKind::Coding)
    }

    fn fixed(raw: &str, strand: Strand) -> Option<Vec<String>> {
        to_fixed(&classify(raw).unwrap(), Some(&gene(strand)), &buffer())
    }

    #[test]
    fn test_protein_and_snps() {
        assert_eq!(
            fixed("p.Ser450Leu", Strand::Forward),
            Some(vec!["450S>450L".to_owned()])
        );
        assert_eq!(
            fixed("c.-16G>C", Strand::Forward),
            Some(vec!["-16G>C".to_owned()])
        );
        assert_eq!(
            fixed("c.-16G>C", Strand::Reverse),
            Some(vec!["-16C>G".to_owned()])
        );
        assert_eq!(
            fixed("r.514a>c", Strand::Forward),
            Some(vec!["514A>C".to_owned()])
        );
    }

    #[test]
    fn test_nucleotide_snps() {
        assert_eq!(
            fixed("abc_g-3c", Strand::Reverse),
            Some(vec!["-3C>G".to_owned()])
        );
        assert_eq!(fixed("abc_c5t", Strand::Forward), None);
        assert_eq!(fixed("abc_c5t", Strand::Reverse), None);
        assert_eq!(fixed("abc_c.5C>T", Strand::Forward), None);
        assert_eq!(fixed("n.5C>T", Strand::Forward), None);
    }

    #[test]
    fn test_non_ascii_anchor() {
        let mut buffer = reference::Buffer::default();
        buffer.insert("chr", vec![b'A', b'C', 0xC3, 0xA9, b'T', b'G', b'C', b'A']);
        let token = classify("c.2del").unwrap();
        let fixed = to_fixed(&token, Some(&gene(Strand::Forward)), &buffer).unwrap();
        assert!(fixed[0].starts_with("3"));
    }

    #[test]
    fn test_deletions() {
        // gene position 2 is chromosome position 4 (T), anchored by position 3 (G)
        assert_eq!(
            fixed("c.2del", Strand::Forward),
            Some(vec!["3GT>G".to_owned()])
        );
        assert_eq!(
            fixed("c.2_3del", Strand::Forward),
            Some(vec!["3GTT>G".to_owned()])
        );
        // on the reverse strand gene positions 2..3 are chromosome positions 6..7
        assert_eq!(
            fixed("c.2_3del", Strand::Reverse),
            Some(vec!["5TGC>T".to_owned()])
        );
    }

    #[test]
    fn test_insertions() {
        assert_eq!(
            fixed("c.2_3insAC", Strand::Forward),
            Some(vec!["4T>TAC".to_owned()])
        );
        assert_eq!(
            fixed("c.2_3insAC", Strand::Reverse),
            Some(vec!["6G>GGT".to_owned()])
        );
    }

    #[test]
    fn test_placeholders() {
        assert_eq!(
            to_fixed(&classify("any_missense_codon_1_2").unwrap(), None, &buffer()),
            Some(vec![
                "any_missense_codon_1".to_owned(),
                "any_missense_codon_2".to_owned()
            ])
        );
        assert_eq!(
            to_fixed(&classify("frameshift").unwrap(), None, &buffer()),
            Some(vec!["frameshift".to_owned()])
        );
        assert_eq!(to_fixed(&classify("c.2del").unwrap(), None, &buffer()), None);
    }
}
