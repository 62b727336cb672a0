// Copyright 2016-2019 Johannes Köster, David Lähnemann.
// Licensed under the GNU GPLv3 license (https://opensource.org/licenses/GPL-3.0)
// This file may not be copied, modified, or distributed
// except according to those terms.

use std::collections::HashMap;
use std::ops::Range;
use std::path::Path;
use std::sync::Arc;

use anyhow::Result;
use bio::io::fasta;

use crate::errors;

/// Read-only buffer of reference sequences, keyed by FASTA record id.
#[derive(Debug, Default, Clone)]
pub struct Buffer {
    sequences: HashMap<String, Arc<Vec<u8>>>,
    fallback: Option<String>,
}

impl Buffer {
    pub fn from_path<P: AsRef<Path> + std::fmt::Debug>(path: P) -> Result<Self> {
        let reader = fasta::Reader::from_file(&path)?;
        let mut buffer = Buffer::default();
        for record in reader.records() {
            let record = record?;
            buffer.insert(record.id(), record.seq().to_ascii_uppercase());
        }
        if buffer.sequences.is_empty() {
            Err(errors::Error::EmptyReference {
                path: path.as_ref().to_owned(),
            })?;
        }
        info!(
            "loaded {} reference sequence(s) from {:?}",
            buffer.sequences.len(),
            path
        );

        Ok(buffer)
    }

    pub fn insert(&mut self, chrom: &str, seq: Vec<u8>) {
        self.sequences.insert(chrom.to_owned(), Arc::new(seq));
    }

    /// Sequence to use when a requested chromosome is not present.
    pub fn fallback(mut self, chrom: Option<String>) -> Self {
        self.fallback = chrom;
        self
    }

    /// Return the given chromosome. Unknown names resolve to the configured fallback, or to the
    /// only sequence of a single-record reference.
    pub fn seq(&self, chrom: &str) -> Option<Arc<Vec<u8>>> {
        if let Some(seq) = self.sequences.get(chrom) {
            return Some(Arc::clone(seq));
        }
        if let Some(seq) = self.fallback.as_ref().and_then(|f| self.sequences.get(f)) {
            return Some(Arc::clone(seq));
        }
        if self.sequences.len() == 1 {
            return self.sequences.values().next().map(Arc::clone);
        }
        None
    }

    /// Return the 0-based half-open window of the given chromosome, or `None` if the chromosome
    /// is unknown or the window exceeds its bounds.
    pub fn window(&self, chrom: &str, range: Range<u64>) -> Option<Vec<u8>> {
        let seq = self.seq(chrom)?;
        if range.start > range.end || range.end > seq.len() as u64 {
            return None;
        }
        Some(seq[range.start as usize..range.end as usize].to_vec())
    }

    pub fn len(&self) -> usize {
        self.sequences.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sequences.is_empty()
    }
}
