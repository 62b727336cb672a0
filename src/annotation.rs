// Copyright 2016-2019 Johannes Köster, David Lähnemann.
// Licensed under the GNU GPLv3 license (https://opensource.org/licenses/GPL-3.0)
// This file may not be copied, modified, or distributed
// except according to those terms.

//! Gene annotation: GFF3 rows and an immutable index from gene name or locus tag to the gene
//! record.

use std::collections::HashMap;
use std::path::Path;
use std::sync::Arc;

use anyhow::Result;

use crate::errors;

/// One tab-separated GFF3 row, in column order.
#[derive(Debug, Clone, Deserialize, PartialEq)]
pub struct AnnotationRow {
    pub seqid: String,
    pub source: String,
    pub feature_type: String,
    pub start: u64,
    pub end: u64,
    pub score: String,
    pub strand: String,
    pub phase: String,
    pub attributes: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Strand {
    Forward,
    Reverse,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Display)]
pub enum GeneKind {
    #[strum(serialize = "coding")]
    Coding,
    #[strum(serialize = "rRNA")]
    RRna,
    #[strum(serialize = "ncRNA")]
    NcRna,
    #[strum(serialize = "tRNA")]
    TRna,
    #[strum(serialize = "pseudogene")]
    Pseudo,
    #[strum(serialize = "other")]
    Other,
}

impl GeneKind {
    /// Derive the kind from the `gene_biotype` attribute if given, else from the feature type.
    fn classify(feature_type: &str, biotype: Option<&str>) -> Self {
        match biotype.unwrap_or(feature_type) {
            "protein_coding" | "CDS" | "gene" => GeneKind::Coding,
            "rRNA" => GeneKind::RRna,
            "ncRNA" | "misc_RNA" | "tmRNA" => GeneKind::NcRna,
            "tRNA" => GeneKind::TRna,
            "pseudogene" | "pseudo" => GeneKind::Pseudo,
            _ => GeneKind::Other,
        }
    }

    /// Whether nucleotide changes in this gene are reported with the non-coding `n.` prefix.
    pub fn is_structural_rna(self) -> bool {
        matches!(self, GeneKind::RRna | GeneKind::NcRna | GeneKind::TRna)
    }
}

#[derive(Debug, Clone, PartialEq, Getters, CopyGetters)]
pub struct GeneRecord {
    #[getset(get = "pub")]
    locus_tag: Option<String>,
    #[getset(get = "pub")]
    name: Option<String>,
    #[getset(get = "pub")]
    seqid: String,
    #[getset(get_copy = "pub")]
    start: u64,
    #[getset(get_copy = "pub")]
    end: u64,
    #[getset(get_copy = "pub")]
    strand: Strand,
    #[getset(get_copy = "pub")]
    kind: GeneKind,
}

impl GeneRecord {
    pub fn new(
        locus_tag: Option<&str>,
        name: Option<&str>,
        seqid: &str,
        start: u64,
        end: u64,
        strand: Strand,
        kind: GeneKind,
    ) -> Self {
        GeneRecord {
            locus_tag: locus_tag.map(str::to_owned),
            name: name.map(str::to_owned),
            seqid: seqid.to_owned(),
            start,
            end,
            strand,
            kind,
        }
    }

    /// Name used in output tables: the gene name if present, else the locus tag.
    pub fn display_name(&self) -> &str {
        self.name
            .as_deref()
            .or_else(|| self.locus_tag.as_deref())
            .unwrap_or_default()
    }

    fn label(&self) -> String {
        format!(
            "{}:{}-{} ({})",
            self.seqid,
            self.start,
            self.end,
            self.display_name()
        )
    }
}

/// Split a GFF3 attribute column into key value pairs.
fn parse_attributes(attributes: &str) -> HashMap<&str, &str> {
    attributes
        .trim_end_matches('\n')
        .split(';')
        .filter_map(|field| {
            let mut kv = field.splitn(2, '=');
            match (kv.next(), kv.next()) {
                (Some(key), Some(value)) if !key.is_empty() => Some((key.trim(), value.trim())),
                _ => None,
            }
        })
        .collect()
}

/// Immutable lookup from gene name or locus tag to the shared gene record.
#[derive(Debug, Default, Clone)]
pub struct GeneIndex {
    genes: HashMap<String, Arc<GeneRecord>>,
    len: usize,
}

impl GeneIndex {
    /// Build the index from annotation rows, keeping rows whose feature type is listed in
    /// `features`.
    pub fn from_rows<I, S>(rows: I, features: &[S]) -> Result<Self>
    where
        I: IntoIterator<Item = AnnotationRow>,
        S: AsRef<str>,
    {
        let mut index = GeneIndex::default();
        for (i, row) in rows.into_iter().enumerate() {
            if !features.iter().any(|f| f.as_ref() == row.feature_type) {
                continue;
            }
            let attributes = parse_attributes(&row.attributes);
            let name = attributes.get("Name").copied();
            let locus_tag = attributes.get("locus_tag").copied();
            if name.is_none() && locus_tag.is_none() {
                Err(errors::Error::MissingGeneIdentifier {
                    row: i + 1,
                    feature_type: row.feature_type.clone(),
                    seqid: row.seqid.clone(),
                    start: row.start,
                    end: row.end,
                })?;
            }
            if row.start > row.end {
                Err(errors::Error::InvalidGeneInterval {
                    row: i + 1,
                    start: row.start,
                    end: row.end,
                })?;
            }
            let strand = match row.strand.as_str() {
                "+" => Strand::Forward,
                "-" => Strand::Reverse,
                value => Err(errors::Error::InvalidStrand {
                    gene: name.or(locus_tag).unwrap_or_default().to_owned(),
                    value: value.to_owned(),
                })?,
            };
            let kind = GeneKind::classify(&row.feature_type, attributes.get("gene_biotype").copied());

            index.insert(GeneRecord::new(
                locus_tag,
                name,
                &row.seqid,
                row.start,
                row.end,
                strand,
                kind,
            ))?;
        }
        debug!("indexed {} genes", index.len);

        Ok(index)
    }

    /// Register a record under its name and its locus tag.
    pub fn insert(&mut self, record: GeneRecord) -> Result<()> {
        let record = Arc::new(record);
        let keys: Vec<String> = record
            .name()
            .iter()
            .chain(record.locus_tag().iter())
            .cloned()
            .collect();
        for key in &keys {
            if let Some(existing) = self.genes.get(key) {
                Err(errors::Error::DuplicateGeneKey {
                    key: key.clone(),
                    first: existing.label(),
                    second: record.label(),
                })?;
            }
        }
        for key in keys {
            self.genes.insert(key, Arc::clone(&record));
        }
        self.len += 1;

        Ok(())
    }

    pub fn lookup(&self, key: &str) -> Option<&GeneRecord> {
        self.genes.get(key).map(|record| record.as_ref())
    }

    /// Number of distinct gene records.
    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }
}

/// Read the rows of a GFF3 file. Comment and directive lines are skipped.
pub fn read_gff<P: AsRef<Path>>(path: P) -> Result<Vec<AnnotationRow>> {
    let mut reader = csv::ReaderBuilder::new()
        .delimiter(b'\t')
        .has_headers(false)
        .comment(Some(b'#'))
        .flexible(true)
        .from_path(&path)?;

    let mut rows = Vec::new();
    for record in reader.records() {
        let record = record?;
        if record.len() < 9 {
            // e.g. embedded FASTA lines after a ##FASTA directive
            continue;
        }
        rows.push(record.deserialize(None)?);
    }
    if rows.is_empty() {
        Err(errors::Error::EmptyAnnotation {
            path: path.as_ref().to_owned(),
        })?;
    }

    Ok(rows)
}

/// Load a gene index from a GFF3 file.
pub fn load_gene_index<P: AsRef<Path>, S: AsRef<str>>(path: P, features: &[S]) -> Result<GeneIndex> {
    let index = GeneIndex::from_rows(read_gff(&path)?, features)?;
    info!(
        "loaded {} genes from {}",
        index.len(),
        path.as_ref().display()
    );
    Ok(index)
}
