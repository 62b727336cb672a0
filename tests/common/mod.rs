// Copyright 2016-2019 Johannes Köster, David Lähnemann.
// Licensed under the GNU GPLv3 license (https://opensource.org/licenses/GPL-3.0)
// This file may not be copied, modified, or distributed
// except according to those terms.

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::Result;
use structopt::StructOpt;
use tempfile::TempDir;

use mutcat::cli::{run, Mutcat};

pub(crate) fn resources() -> PathBuf {
    Path::new(file!()).parent().unwrap().parent().unwrap().join("resources")
}

/// A directory with input tables and an `expected/` subdirectory holding every table the run
/// has to produce.
pub(crate) struct Testcase {
    path: PathBuf,
    outdir: TempDir,
}

impl Testcase {
    pub(crate) fn load(name: &str) -> Self {
        let _ = env_logger::builder().is_test(true).try_init();
        Testcase {
            path: resources().join("testcases").join(name),
            outdir: tempfile::tempdir().unwrap(),
        }
    }

    fn input(&self, name: &str) -> String {
        self.path.join(name).to_str().unwrap().to_owned()
    }

    fn output(&self, name: &str) -> String {
        self.outdir.path().join(name).to_str().unwrap().to_owned()
    }

    fn run(&self, args: &[String]) -> Result<()> {
        let opt = Mutcat::from_iter_safe(args)?;
        run(opt)
    }

    pub(crate) fn normalize(&self) -> Result<()> {
        let resources = resources();
        self.run(&[
            "mutcat".to_owned(),
            "normalize".to_owned(),
            "--genes".to_owned(),
            resources.join("genes.gff").to_str().unwrap().to_owned(),
            "--reference".to_owned(),
            resources.join("reference.fa").to_str().unwrap().to_owned(),
            "--config".to_owned(),
            self.input("config.yaml"),
            "--threads".to_owned(),
            "2".to_owned(),
            "--failures".to_owned(),
            self.output("failures.csv"),
            "--output".to_owned(),
            self.output("catalogue.csv"),
            self.input("catalogue.csv"),
        ])
    }

    pub(crate) fn converge(&self) -> Result<()> {
        self.run(&[
            "mutcat".to_owned(),
            "converge".to_owned(),
            "--left".to_owned(),
            self.input("left.csv"),
            "--right".to_owned(),
            self.input("right.csv"),
            "--reference-set".to_owned(),
            self.input("reference.csv"),
            "--outdir".to_owned(),
            self.outdir.path().to_str().unwrap().to_owned(),
        ])
    }

    /// Compare every expected table with the produced one, record by record.
    pub(crate) fn check(&self) {
        let expected_dir = self.path.join("expected");
        for entry in fs::read_dir(&expected_dir).unwrap() {
            let expected = entry.unwrap().path();
            let name = expected.file_name().unwrap();
            let produced = self.outdir.path().join(name);
            assert!(produced.exists(), "missing output table {:?}", name);
            assert_eq!(
                read_table(&produced),
                read_table(&expected),
                "table {:?} differs",
                name
            );
        }
    }
}

fn read_table(path: &Path) -> Vec<Vec<String>> {
    let mut reader = csv::ReaderBuilder::new()
        .has_headers(false)
        .from_path(path)
        .unwrap();
    reader
        .records()
        .map(|record| record.unwrap().iter().map(str::to_owned).collect())
        .collect()
}
