// Copyright 2016-2019 Johannes Köster, David Lähnemann.
// Licensed under the GNU GPLv3 license (https://opensource.org/licenses/GPL-3.0)
// This file may not be copied, modified, or distributed
// except according to those terms.

//! Normalization of raw catalogue rows into HGVS-style notation.
//!
//! Each row is classified by the grammar, mapped onto its gene and, for indels, resolved against
//! the stated alleles. Deletions whose stated length does not match their alleles are imputed
//! from the reference sequence and normalized once more. Rows that cannot be normalized are
//! tagged with a [`FailReason`] and collected in a [`FailureReport`]; they never abort the batch.

use std::collections::HashMap;
use std::io;
use std::path::Path;

use anyhow::Result;
use itertools::Itertools;
use rayon::prelude::*;

use crate::annotation::{GeneIndex, GeneRecord};
use crate::catalogue::{CatalogueEntry, RawVariantToken};
use crate::config::Config;
use crate::coords;
use crate::grammar::{self, Literal, Token};
use crate::imputation;
use crate::indel;
use crate::reference;
use crate::variant::{FailReason, ParsedVariant, VariantKind};

pub const CODON_PLACEHOLDER: &str = "any_missense_codon";
pub const INDEL_PLACEHOLDER: &str = "any_indel_nucleotide";

/// Longest placeholder range that is expanded.
pub const MAX_RANGE_LEN: u64 = 10_000;

/// Expand a placeholder range into one name per position in `[start, end]`.
pub fn expand_range(prefix: &str, start: u64, end: Option<u64>) -> Result<Vec<String>, FailReason> {
    let end = end.unwrap_or(start);
    if end < start || end - start >= MAX_RANGE_LEN {
        return Err(FailReason::InvalidRange);
    }
    Ok((start..=end)
        .map(|pos| format!("{}_{}", prefix, pos))
        .collect())
}

/// Shared read-only resources of a normalization run.
#[derive(Debug, Clone, Copy, new)]
pub struct Context<'a> {
    genes: &'a GeneIndex,
    reference: &'a reference::Buffer,
}

impl<'a> Context<'a> {
    /// Normalize one catalogue row. Ranges expand to several values, all other notations to
    /// exactly one.
    pub fn normalize(&self, token: &RawVariantToken) -> Vec<ParsedVariant> {
        self.normalize_str(token.variant(), token.gene().as_deref())
    }

    /// Normalize a variant string. `row_gene` is used if the string does not name its gene.
    pub fn normalize_str(&self, raw: &str, row_gene: Option<&str>) -> Vec<ParsedVariant> {
        let token = match grammar::classify(raw) {
            Some(token) => token,
            None => {
                return vec![ParsedVariant::failed(
                    row_gene,
                    None,
                    FailReason::UnrecognizedNotation,
                )]
            }
        };

        let variants = self.compute(&token, row_gene);
        match variants.as_slice() {
            [variant] if variant.fail_reason().map_or(false, FailReason::is_retryable) => {
                vec![self.recover(&token, row_gene)]
            }
            _ => variants,
        }
    }

    fn gene(&self, key: Option<&str>) -> Result<&GeneRecord, FailReason> {
        key.and_then(|key| self.genes.lookup(key))
            .ok_or(FailReason::GeneNotFound)
    }

    fn compute(&self, token: &Token, row_gene: Option<&str>) -> Vec<ParsedVariant> {
        let key = token.gene().or(row_gene);
        let single = |kind: VariantKind, notation: Result<String, FailReason>| match notation {
            Ok(notation) => vec![ParsedVariant::normalized(key, kind, notation)],
            Err(reason) => vec![ParsedVariant::failed(key, Some(kind), reason)],
        };
        let expand = |kind: VariantKind, names: Result<Vec<String>, FailReason>| match names {
            Ok(names) => names
                .into_iter()
                .map(|name| ParsedVariant::normalized(key, kind, name))
                .collect(),
            Err(reason) => vec![ParsedVariant::failed(key, Some(kind), reason)],
        };

        match token {
            Token::Protein(protein) => single(VariantKind::Protein, Ok(protein.hgvs())),
            Token::Nucleotide {
                pos,
                reference,
                alternative,
                ..
            } => match self.gene(key) {
                Ok(gene) => {
                    let prefix = coords::nucleotide_prefix(gene);
                    let kind = if prefix == 'n' {
                        VariantKind::NonCodingNt
                    } else {
                        VariantKind::CodingNt
                    };
                    single(
                        kind,
                        Ok(format!("{}.{}{}>{}", prefix, pos, reference, alternative)),
                    )
                }
                Err(reason) => single(VariantKind::CodingNt, Err(reason)),
            },
            Token::Deletion(del) => single(
                VariantKind::CodingNt,
                self.gene(key)
                    .and_then(|gene| indel::resolve_deletion(del, gene.strand()))
                    .map(indel::join_alternatives),
            ),
            Token::Insertion(ins) => single(
                VariantKind::CodingNt,
                self.gene(key)
                    .and_then(|gene| indel::resolve_insertion(ins, gene.strand()))
                    .map(indel::join_alternatives),
            ),
            Token::Promoter {
                pos,
                reference,
                alternative,
                ..
            } => single(
                VariantKind::CodingNt,
                Ok(format!("c.{}{}>{}", pos, reference, alternative)),
            ),
            Token::Rna {
                pos,
                reference,
                alternative,
                ..
            } => single(
                VariantKind::RnaNt,
                Ok(format!("r.{}{}>{}", pos, reference, alternative)),
            ),
            Token::Literal { literal, .. } => {
                let kind = match literal {
                    Literal::Frameshift => VariantKind::Frameshift,
                    Literal::PrematureStop => VariantKind::PrematureStop,
                    Literal::LargeDeletion => VariantKind::LargeDeletion,
                };
                single(kind, Ok(literal.to_string()))
            }
            Token::CodonRange { start, end, .. } => expand(
                VariantKind::CodonRange,
                expand_range(CODON_PLACEHOLDER, *start, *end),
            ),
            Token::IndelRange { start, end, .. } => expand(
                VariantKind::IndelRange,
                expand_range(INDEL_PLACEHOLDER, *start, Some(*end)),
            ),
            Token::CodingIndel {
                start,
                end,
                op,
                seq,
                ..
            } => {
                let notation = match end {
                    Some(end) if *end < *start => Err(FailReason::InvalidRange),
                    Some(end) => Ok(format!("c.{}_{}{}{}", start, end, op, seq)),
                    None => Ok(format!("c.{}{}{}", start, op, seq)),
                };
                single(VariantKind::CodingNt, notation)
            }
            Token::Coding {
                pos,
                reference,
                alternative,
                ..
            } => single(
                VariantKind::CodingNt,
                Ok(format!("c.{}{}>{}", pos, reference, alternative)),
            ),
            Token::NonCoding {
                pos,
                reference,
                alternative,
                ..
            } => single(
                VariantKind::NonCodingNt,
                Ok(format!("n.{}{}>{}", pos, reference, alternative)),
            ),
        }
    }

    /// Second and last attempt for a row that failed with a length mismatch.
    fn recover(&self, token: &Token, row_gene: Option<&str>) -> ParsedVariant {
        let key = token.gene().or(row_gene);
        let failed = |reason| ParsedVariant::failed(key, Some(VariantKind::CodingNt), reason);

        match token {
            Token::Deletion(del) => {
                let corrected = self
                    .gene(key)
                    .and_then(|gene| imputation::impute_deletion(del, gene, self.reference));
                let corrected = match corrected {
                    Ok(corrected) => corrected,
                    Err(reason) => return failed(reason),
                };
                match grammar::classify(&corrected).map(|token| self.compute(&token, row_gene)) {
                    Some(mut variants) if variants.len() == 1 => {
                        let variant = variants.remove(0);
                        if variant.fail_reason() == Some(FailReason::LengthMismatch) {
                            failed(FailReason::ImputationFailed)
                        } else {
                            variant
                        }
                    }
                    _ => failed(FailReason::ImputationFailed),
                }
            }
            Token::Insertion(_) => failed(FailReason::InsertionNotImputed),
            _ => failed(FailReason::LengthMismatch),
        }
    }

    /// Normalize all rows in parallel. Rows keep their input order.
    pub fn normalize_all(&self, tokens: &[RawVariantToken]) -> Normalization {
        let variants: Vec<Vec<ParsedVariant>> = tokens
            .par_iter()
            .map(|token| self.normalize(token))
            .collect();

        let rows: Vec<NormalizedRow> = tokens
            .iter()
            .cloned()
            .zip(variants)
            .map(|(token, variants)| NormalizedRow { token, variants })
            .collect();

        let failures = FailureReport::new(
            rows.iter()
                .flat_map(|row| {
                    row.variants.iter().filter_map(move |variant| {
                        variant.fail_reason().map(|reason| Failure {
                            row: row.token.row(),
                            variant: row.token.variant().clone(),
                            gene: variant.gene().clone().unwrap_or_default(),
                            drug: row.token.drug().clone(),
                            reason: reason.to_string(),
                        })
                    })
                })
                .collect(),
        );

        let counts: HashMap<VariantKind, usize> = rows
            .iter()
            .flat_map(|row| row.variants.iter())
            .filter(|variant| variant.is_ok())
            .filter_map(|variant| variant.kind())
            .counts();
        for (kind, count) in counts.iter().sorted_by_key(|(kind, _)| kind.to_string()) {
            info!("normalized {} variants of type {}", count, kind);
        }
        for failure in failures.iter() {
            warn!(
                "row {}: could not normalize {} ({}): {}",
                failure.row, failure.variant, failure.drug, failure.reason
            );
        }
        if !failures.is_empty() {
            warn!("{} variants could not be normalized", failures.len());
        }

        Normalization { rows, failures }
    }
}

/// A raw row together with the variants it normalized to.
#[derive(Debug, Clone, PartialEq, Getters)]
#[getset(get = "pub")]
pub struct NormalizedRow {
    token: RawVariantToken,
    variants: Vec<ParsedVariant>,
}

/// A variant that could not be normalized, with its source row for traceability.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Failure {
    pub row: usize,
    pub variant: String,
    pub gene: String,
    pub drug: String,
    pub reason: String,
}

#[derive(Debug, Clone, Default, PartialEq, new)]
pub struct FailureReport {
    failures: Vec<Failure>,
}

impl FailureReport {
    pub fn iter(&self) -> impl Iterator<Item = &Failure> {
        self.failures.iter()
    }

    pub fn len(&self) -> usize {
        self.failures.len()
    }

    pub fn is_empty(&self) -> bool {
        self.failures.is_empty()
    }

    pub fn write<W: io::Write>(&self, writer: W) -> Result<()> {
        let mut writer = csv::WriterBuilder::new().from_writer(writer);
        for failure in &self.failures {
            writer.serialize(failure)?;
        }
        writer.flush()?;
        Ok(())
    }

    pub fn write_to_path<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        self.write(std::fs::File::create(path)?)
    }
}

/// One row of the normalization-phase table: the final columns plus the internal ones.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct NormalizedRecord {
    #[serde(rename = "Drug")]
    pub drug: String,
    #[serde(rename = "Confers")]
    pub confers: String,
    #[serde(rename = "Interaction")]
    pub interaction: String,
    #[serde(rename = "Literature")]
    pub literature: String,
    #[serde(rename = "WHO Confidence")]
    pub confidence: String,
    #[serde(rename = "Gene")]
    pub gene: String,
    #[serde(rename = "Mutation")]
    pub mutation: String,
    #[serde(rename = "variant")]
    pub variant: String,
    #[serde(rename = "gene")]
    pub gene_id: String,
    pub hgvs: String,
    #[serde(rename = "type")]
    pub kind: String,
    pub fail: bool,
    pub fail_reason: String,
}

/// Result of a normalization run.
#[derive(Debug, Clone, PartialEq, Getters)]
#[getset(get = "pub")]
pub struct Normalization {
    rows: Vec<NormalizedRow>,
    failures: FailureReport,
}

impl Normalization {
    /// The normalization-phase table, one record per normalized or failed variant.
    pub fn to_records(&self, config: &Config) -> Vec<NormalizedRecord> {
        self.rows
            .iter()
            .flat_map(|row| {
                row.variants.iter().map(move |variant| {
                    let token = &row.token;
                    let gene = variant.gene().clone().unwrap_or_default();
                    let hgvs = variant.notation().clone().unwrap_or_default();
                    NormalizedRecord {
                        drug: token.drug().clone(),
                        confers: token
                            .confers()
                            .clone()
                            .unwrap_or_else(|| config.confers().clone()),
                        interaction: token.interaction().clone().unwrap_or_default(),
                        literature: token
                            .literature()
                            .clone()
                            .unwrap_or_else(|| config.literature().clone()),
                        confidence: token.confidence().clone(),
                        gene: gene.clone(),
                        mutation: hgvs.clone(),
                        variant: token.variant().clone(),
                        gene_id: gene,
                        hgvs,
                        kind: variant
                            .kind()
                            .map(|kind| kind.to_string())
                            .unwrap_or_default(),
                        fail: !variant.is_ok(),
                        fail_reason: variant
                            .fail_reason()
                            .map(|reason| reason.to_string())
                            .unwrap_or_default(),
                    }
                })
            })
            .collect()
    }

    /// Final catalogue entries of all successfully normalized variants.
    pub fn entries(&self, config: &Config) -> Vec<CatalogueEntry> {
        self.to_records(config)
            .into_iter()
            .filter(|record| !record.fail)
            .map(|record| {
                CatalogueEntry::new(
                    record.drug,
                    record.confers,
                    record.interaction,
                    record.literature,
                    record.confidence,
                    record.gene,
                    record.mutation,
                )
            })
            .collect()
    }

    pub fn write_records<W: io::Write>(&self, writer: W, config: &Config) -> Result<()> {
        let mut writer = csv::WriterBuilder::new().from_writer(writer);
        for record in self.to_records(config) {
            writer.serialize(record)?;
        }
        writer.flush()?;
        Ok(())
    }
}
