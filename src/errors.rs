// Copyright 2016-2019 Johannes Köster, David Lähnemann.
// Licensed under the GNU GPLv3 license (https://opensource.org/licenses/GPL-3.0)
// This file may not be copied, modified, or distributed
// except according to those terms.

use std::path::PathBuf;

use thiserror::Error;

#[derive(Error, Debug, PartialEq)]
pub enum Error {
    #[error("annotation row {row} ({feature_type} at {seqid}:{start}-{end}) defines neither a Name nor a locus_tag attribute")]
    MissingGeneIdentifier {
        row: usize,
        feature_type: String,
        seqid: String,
        start: u64,
        end: u64,
    },
    #[error("gene key {key} refers to two distinct annotation records ({first} and {second})")]
    DuplicateGeneKey {
        key: String,
        first: String,
        second: String,
    },
    #[error("invalid strand information '{value}' for gene {gene}, must be '+' or '-'")]
    InvalidStrand { gene: String, value: String },
    #[error("annotation row {row} has start {start} after end {end}")]
    InvalidGeneInterval { row: usize, start: u64, end: u64 },
    #[error("no gene annotation records found in {path}")]
    EmptyAnnotation { path: PathBuf },
    #[error("no reference sequences found in {path}")]
    EmptyReference { path: PathBuf },
    #[error("catalogue {path} does not contain any usable rows")]
    EmptyCatalogue { path: PathBuf },
    #[error("invalid configuration: {msg}")]
    InvalidConfiguration { msg: String },
    #[error("output directory {path} exists but is not a directory")]
    InvalidOutputDirectory { path: PathBuf },
}

pub(crate) fn invalid_configuration(msg: &str) -> Error {
    Error::InvalidConfiguration {
        msg: msg.to_owned(),
    }
}
