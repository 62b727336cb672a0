// Copyright 2016-2019 Johannes Köster, David Lähnemann.
// Licensed under the GNU GPLv3 license (https://opensource.org/licenses/GPL-3.0)
// This file may not be copied, modified, or distributed
// except according to those terms.

//! Catalogue tables: raw rows as delivered by the resistance databases, and normalized entries
//! in the final seven column layout.

use std::collections::HashMap;
use std::io;
use std::path::Path;

use anyhow::Result;
use regex::Regex;

use crate::errors;

lazy_static! {
    static ref RANK_PREFIX_RE: Regex = Regex::new(r"^\s*\d+\)\s*").unwrap();
}

/// Column order of normalized catalogues.
pub const COLUMNS: [&str; 7] = [
    "Drug",
    "Confers",
    "Interaction",
    "Literature",
    "WHO Confidence",
    "Gene",
    "Mutation",
];

const DRUG_CODES: [(&str, &str); 15] = [
    ("RIF", "rifampicin"),
    ("INH", "isoniazid"),
    ("EMB", "ethambutol"),
    ("PZA", "pyrazinamide"),
    ("LEV", "levofloxacin"),
    ("MXF", "moxifloxacin"),
    ("BDQ", "bedaquiline"),
    ("LZD", "linezolid"),
    ("CFZ", "clofazimine"),
    ("DLM", "delamanid"),
    ("AMI", "amikacin"),
    ("STM", "streptomycin"),
    ("ETH", "ethionamide"),
    ("KAN", "kanamycin"),
    ("CAP", "capreomycin"),
];

/// Three-letter drug codes and their full names.
#[derive(Debug, Clone, PartialEq)]
pub struct DrugCodes {
    codes: HashMap<String, String>,
}

impl Default for DrugCodes {
    fn default() -> Self {
        DrugCodes {
            codes: DRUG_CODES
                .iter()
                .map(|(code, name)| (code.to_string(), name.to_string()))
                .collect(),
        }
    }
}

impl DrugCodes {
    /// Add or override codes.
    pub fn extend<'a, I>(&mut self, codes: I)
    where
        I: IntoIterator<Item = (&'a String, &'a String)>,
    {
        for (code, name) in codes {
            self.codes
                .insert(code.trim().to_ascii_uppercase(), name.trim().to_lowercase());
        }
    }

    /// Full lower-case drug name for a code or free-text drug.
    pub fn name(&self, drug: &str) -> String {
        let drug = drug.trim();
        match self.codes.get(&drug.to_ascii_uppercase()) {
            Some(name) => name.clone(),
            None => drug.to_lowercase(),
        }
    }
}

#[derive(Debug, Deserialize)]
struct RawRow {
    #[serde(alias = "Variant", alias = "Mutation", alias = "mutation")]
    variant: String,
    #[serde(alias = "Drug")]
    drug: String,
    #[serde(
        default,
        alias = "WHO Confidence",
        alias = "Confidence",
        alias = "FINAL CONFIDENCE GRADING"
    )]
    confidence: Option<String>,
    #[serde(default, alias = "Gene")]
    gene: Option<String>,
    #[serde(default, alias = "Confers")]
    confers: Option<String>,
    #[serde(default, alias = "Interaction")]
    interaction: Option<String>,
    #[serde(default, alias = "Literature")]
    literature: Option<String>,
}

/// A catalogue row as read, before normalization. `row` is the 1-based data row in the source
/// table.
#[derive(Debug, Clone, PartialEq, Eq, new, Getters, CopyGetters)]
pub struct RawVariantToken {
    #[getset(get_copy = "pub")]
    row: usize,
    #[getset(get = "pub")]
    variant: String,
    #[getset(get = "pub")]
    gene: Option<String>,
    #[getset(get = "pub")]
    drug: String,
    #[getset(get = "pub")]
    confidence: String,
    #[getset(get = "pub")]
    confers: Option<String>,
    #[getset(get = "pub")]
    interaction: Option<String>,
    #[getset(get = "pub")]
    literature: Option<String>,
}

/// Leading variant of a cell like `rpoB_p.Ser450Leu (rpoB_S450L, rpoB_c.1349C>T)`.
pub fn leading_variant(cell: &str) -> &str {
    cell.trim()
        .split(|c: char| c.is_whitespace() || c == '(' || c == ',')
        .next()
        .unwrap_or_default()
}

/// Strip a rank prefix like `1) ` from a confidence grading.
pub fn clean_confidence(confidence: &str) -> String {
    RANK_PREFIX_RE.replace(confidence, "").trim().to_owned()
}

fn non_empty(value: Option<String>) -> Option<String> {
    value
        .map(|value| value.trim().to_owned())
        .filter(|value| !value.is_empty())
}

/// Read raw catalogue rows from any CSV source. Combination gradings are skipped.
pub fn read_raw_from<R: io::Read>(reader: R, drug_codes: &DrugCodes) -> Result<Vec<RawVariantToken>> {
    let mut reader = csv::ReaderBuilder::new().trim(csv::Trim::Headers).from_reader(reader);

    let mut tokens = Vec::new();
    for (i, row) in reader.deserialize().enumerate() {
        let row: RawRow = row?;
        let confidence = clean_confidence(row.confidence.as_deref().unwrap_or_default());
        if confidence.eq_ignore_ascii_case("combo") {
            debug!("skipping combination row {}", i + 1);
            continue;
        }
        tokens.push(RawVariantToken::new(
            i + 1,
            leading_variant(&row.variant).to_owned(),
            non_empty(row.gene),
            drug_codes.name(&row.drug),
            confidence,
            non_empty(row.confers),
            non_empty(row.interaction),
            non_empty(row.literature),
        ));
    }

    Ok(tokens)
}

/// Read a raw catalogue CSV file.
pub fn read_raw<P: AsRef<Path>>(path: P, drug_codes: &DrugCodes) -> Result<Vec<RawVariantToken>> {
    let tokens = read_raw_from(std::fs::File::open(&path)?, drug_codes)?;
    if tokens.is_empty() {
        Err(errors::Error::EmptyCatalogue {
            path: path.as_ref().to_owned(),
        })?;
    }
    info!(
        "read {} catalogue rows from {}",
        tokens.len(),
        path.as_ref().display()
    );
    Ok(tokens)
}

/// A normalized catalogue row.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize, new, Getters)]
#[getset(get = "pub")]
pub struct CatalogueEntry {
    #[serde(rename = "Drug")]
    drug: String,
    #[serde(rename = "Confers", default)]
    confers: String,
    #[serde(rename = "Interaction", default)]
    interaction: String,
    #[serde(rename = "Literature", default)]
    literature: String,
    #[serde(rename = "WHO Confidence", default)]
    confidence: String,
    #[serde(rename = "Gene")]
    gene: String,
    #[serde(rename = "Mutation")]
    mutation: String,
}

/// Reconciliation key of an entry.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct EntryKey {
    pub drug: String,
    pub gene: String,
    pub mutation: String,
}

impl CatalogueEntry {
    pub fn key(&self) -> EntryKey {
        EntryKey {
            drug: self.drug.clone(),
            gene: self.gene.clone(),
            mutation: self.mutation.clone(),
        }
    }
}

/// Read normalized entries from any CSV source. Rows without mutation are skipped.
pub fn read_entries_from<R: io::Read>(reader: R) -> Result<Vec<CatalogueEntry>> {
    let mut reader = csv::ReaderBuilder::new().trim(csv::Trim::All).from_reader(reader);

    let mut entries = Vec::new();
    for (i, entry) in reader.deserialize().enumerate() {
        let entry: CatalogueEntry = entry?;
        if entry.mutation.is_empty() {
            warn!("skipping row {} ({}) without mutation", i + 1, entry.gene);
            continue;
        }
        entries.push(entry);
    }

    Ok(entries)
}

/// Read a normalized catalogue CSV file.
pub fn read_entries<P: AsRef<Path>>(path: P) -> Result<Vec<CatalogueEntry>> {
    let entries = read_entries_from(std::fs::File::open(&path)?)?;
    if entries.is_empty() {
        Err(errors::Error::EmptyCatalogue {
            path: path.as_ref().to_owned(),
        })?;
    }
    Ok(entries)
}

/// Write entries with header, also if there are none.
pub fn write_entries<'a, W, I>(writer: W, entries: I) -> Result<()>
where
    W: io::Write,
    I: IntoIterator<Item = &'a CatalogueEntry>,
{
    let mut writer = csv::WriterBuilder::new()
        .has_headers(false)
        .from_writer(writer);
    writer.write_record(&COLUMNS)?;
    for entry in entries {
        writer.serialize(entry)?;
    }
    writer.flush()?;

    Ok(())
}

pub fn write_entries_to_path<'a, P, I>(path: P, entries: I) -> Result<()>
where
    P: AsRef<Path>,
    I: IntoIterator<Item = &'a CatalogueEntry>,
{
    write_entries(std::fs::File::create(path)?, entries)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_drug_codes() {
        let mut codes = DrugCodes::default();
        assert_eq!(codes.name("RIF"), "rifampicin");
        assert_eq!(codes.name(" inh "), "isoniazid");
        assert_eq!(codes.name("Rifampicin"), "rifampicin");
        let mut extra = HashMap::new();
        extra.insert("pto".to_owned(), "Prothionamide".to_owned());
        codes.extend(&extra);
        assert_eq!(codes.name("PTO"), "prothionamide");
    }

    #[test]
    fn test_cells() {
        assert_eq!(
            leading_variant("rpoB_p.Ser450Leu (rpoB_S450L, rpoB_c.1349C>T)"),
            "rpoB_p.Ser450Leu"
        );
        assert_eq!(leading_variant(" katG_S315T "), "katG_S315T");
        assert_eq!(clean_confidence("1) Assoc w R"), "Assoc w R");
        assert_eq!(clean_confidence("Uncertain significance"), "Uncertain significance");
    }

    #[test]
    fn test_read_raw() {
        let csv = "\
Drug,Variant,WHO Confidence,Gene
RIF,rpoB_S450L (rpoB_Ser450Leu),1) Assoc w R,rpoB
INH,katG_S315T,combo,katG
EMB,embB_M306V,2) Assoc w R - Interim,
";
        let tokens = read_raw_from(csv.as_bytes(), &DrugCodes::default()).unwrap();
        assert_eq!(tokens.len(), 2);
        assert_eq!(tokens[0].variant(), "rpoB_S450L");
        assert_eq!(tokens[0].drug(), "rifampicin");
        assert_eq!(tokens[0].confidence(), "Assoc w R");
        assert_eq!(tokens[1].row(), 3);
        assert_eq!(tokens[1].gene(), &None);
    }

    #[test]
    fn test_entries_round_trip_with_header() {
        let entries = vec![CatalogueEntry::new(
            "rifampicin".to_owned(),
            "resistance".to_owned(),
            "".to_owned(),
            "".to_owned(),
            "Assoc w R".to_owned(),
            "rpoB".to_owned(),
            "p.Ser450Leu".to_owned(),
        )];
        let mut buf = Vec::new();
        write_entries(&mut buf, &entries).unwrap();
        let written = String::from_utf8(buf.clone()).unwrap();
        assert!(written.starts_with("Drug,Confers,Interaction,Literature,WHO Confidence,Gene,Mutation\n"));
        assert_eq!(read_entries_from(buf.as_slice()).unwrap(), entries);

        let mut empty = Vec::new();
        write_entries(&mut empty, &[]).unwrap();
        assert_eq!(empty.iter().filter(|&&b| b == b'\n').count(), 1);
    }

    #[test]
    fn test_rows_without_mutation_are_skipped() {
        let csv = "Drug,Gene,Mutation\nrifampicin,rpoB,\nrifampicin,rpoB,p.Ser450Leu\n";
        let entries = read_entries_from(csv.as_bytes()).unwrap();
        assert_eq!(entries.len(), 1);
        assert_eq!(entries[0].confers(), "");
    }
}
