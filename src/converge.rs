// Copyright 2016-2019 Johannes Köster, David Lähnemann.
// Licensed under the GNU GPLv3 license (https://opensource.org/licenses/GPL-3.0)
// This file may not be copied, modified, or distributed
// except according to those terms.

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::Result;

use crate::catalogue::{self, CatalogueEntry};
use crate::errors;
use crate::reconcile::{self, ReconciledEntry};

/// Sizes of the input catalogues and of all written tables.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, CopyGetters)]
#[getset(get_copy = "pub")]
pub struct Summary {
    left: usize,
    right: usize,
    reference_set: usize,
    intersection: usize,
    unique_left: usize,
    unique_right: usize,
    merged: usize,
    converged: usize,
}

/// Reconciles a left and a right catalogue, merges them with a reference set and writes all
/// resulting tables into `outdir`.
#[derive(Builder)]
#[builder(pattern = "owned")]
pub struct Converger {
    left: PathBuf,
    right: PathBuf,
    reference_set: PathBuf,
    outdir: PathBuf,
    #[builder(default = "\"tbdb\".to_owned()")]
    left_name: String,
    #[builder(default = "\"who\".to_owned()")]
    right_name: String,
    #[builder(default = "\"fohm\".to_owned()")]
    reference_name: String,
}

fn entries(reconciled: &[ReconciledEntry]) -> impl Iterator<Item = &CatalogueEntry> {
    reconciled.iter().map(|entry| entry.entry())
}

impl Converger {
    fn table(&self, name: &str) -> PathBuf {
        self.outdir.join(format!("{}.csv", name))
    }

    fn prepare_outdir(&self) -> Result<()> {
        if self.outdir.exists() && !self.outdir.is_dir() {
            Err(errors::Error::InvalidOutputDirectory {
                path: self.outdir.clone(),
            })?;
        }
        fs::create_dir_all(&self.outdir)?;
        Ok(())
    }

    pub fn converge(&self) -> Result<Summary> {
        let left = catalogue::read_entries(&self.left)?;
        let right = catalogue::read_entries(&self.right)?;
        let reference = catalogue::read_entries(&self.reference_set)?;
        let mut summary = Summary {
            left: left.len(),
            right: right.len(),
            reference_set: reference.len(),
            ..Default::default()
        };

        let partition = reconcile::partition(left, right);
        info!("{} rows in both catalogues", partition.intersection().len());
        info!(
            "{} rows unique to {}",
            partition.unique_left().len(),
            self.left_name
        );
        info!(
            "{} rows unique to {}",
            partition.unique_right().len(),
            self.right_name
        );
        let merged = partition.merged(&reference);
        let converged = partition.converged(&reference);

        self.prepare_outdir()?;
        let tables: [(String, &[ReconciledEntry]); 5] = [
            ("intersection".to_owned(), partition.intersection().as_slice()),
            (
                format!("unique_{}", self.left_name),
                partition.unique_left().as_slice(),
            ),
            (
                format!("unique_{}", self.right_name),
                partition.unique_right().as_slice(),
            ),
            (
                format!("{}_{}", self.reference_name, self.left_name),
                merged.as_slice(),
            ),
            (
                format!(
                    "converged_{}_{}_{}",
                    self.right_name, self.reference_name, self.left_name
                ),
                converged.as_slice(),
            ),
        ];
        for (name, table) in tables.iter() {
            let path = self.table(name);
            catalogue::write_entries_to_path(&path, entries(table))?;
            debug!("wrote {} rows to {}", table.len(), path.display());
        }

        summary.intersection = partition.intersection().len();
        summary.unique_left = partition.unique_left().len();
        summary.unique_right = partition.unique_right().len();
        summary.merged = merged.len();
        summary.converged = converged.len();
        info!(
            "merged catalogue has {} rows, converged catalogue has {} rows",
            summary.merged, summary.converged
        );

        Ok(summary)
    }

    pub fn outdir(&self) -> &Path {
        &self.outdir
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn write(dir: &Path, name: &str, content: &str) -> PathBuf {
        let path = dir.join(name);
        fs::write(&path, content).unwrap();
        path
    }

    #[test]
    fn test_converge() {
        let dir = tempfile::tempdir().unwrap();
        let header = "Drug,Confers,Interaction,Literature,WHO Confidence,Gene,Mutation\n";
        let left = write(
            dir.path(),
            "left.csv",
            &format!(
                "{}rifampicin,resistance,,,Assoc w R,rpoB,p.Ser450Leu\nisoniazid,resistance,,,Assoc w R,katG,p.Ser315Thr\n",
                header
            ),
        );
        let right = write(
            dir.path(),
            "right.csv",
            &format!(
                "{}rifampicin,resistance,,,Assoc w R,rpoB,p.Ser450Leu\nethambutol,resistance,,,Assoc w R,embB,p.Met306Val\n",
                header
            ),
        );
        let reference = write(
            dir.path(),
            "reference.csv",
            &format!("{}rifampicin,resistance,,,,rpoB,p.Leu430Pro\n", header),
        );
        let outdir = dir.path().join("out");

        let summary = ConvergerBuilder::default()
            .left(left)
            .right(right)
            .reference_set(reference)
            .outdir(outdir.clone())
            .build()
            .unwrap()
            .converge()
            .unwrap();

        assert_eq!(summary.intersection(), 1);
        assert_eq!(summary.unique_left(), 1);
        assert_eq!(summary.unique_right(), 1);
        assert_eq!(summary.merged(), 3);
        assert_eq!(summary.converged(), 4);
        for name in &[
            "intersection.csv",
            "unique_tbdb.csv",
            "unique_who.csv",
            "fohm_tbdb.csv",
            "converged_who_fohm_tbdb.csv",
        ] {
            assert!(outdir.join(name).exists(), "{} missing", name);
        }
        let converged = catalogue::read_entries(outdir.join("converged_who_fohm_tbdb.csv")).unwrap();
        assert_eq!(converged[2].mutation(), "p.Met306Val");
    }

    #[test]
    fn test_outdir_is_file() {
        let dir = tempfile::tempdir().unwrap();
        let entries = "Drug,Gene,Mutation\nrifampicin,rpoB,p.Ser450Leu\n";
        let left = write(dir.path(), "left.csv", entries);
        let outdir = write(dir.path(), "out", "");
        let err = ConvergerBuilder::default()
            .left(left.clone())
            .right(left.clone())
            .reference_set(left)
            .outdir(outdir)
            .build()
            .unwrap()
            .converge()
            .unwrap_err();
        assert!(matches!(
            err.downcast_ref::<errors::Error>(),
            Some(errors::Error::InvalidOutputDirectory { .. })
        ));
    }
}
