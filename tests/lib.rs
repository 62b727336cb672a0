// Copyright 2016-2019 Johannes Köster, David Lähnemann.
// Licensed under the GNU GPLv3 license (https://opensource.org/licenses/GPL-3.0)
// This file may not be copied, modified, or distributed
// except according to those terms.

use std::fs;

use mutcat::annotation;
use mutcat::catalogue::{self, DrugCodes};
use mutcat::config::Config;
use mutcat::fixed;
use mutcat::grammar;
use mutcat::normalize::Context;
use mutcat::reference;
use mutcat::variant::FailReason;

mod common;

use common::{resources, Testcase};

macro_rules! testcase {
    ($name:ident, $kind:ident) => {
        #[test]
        fn $name() {
            let testcase = Testcase::load(stringify!($name));
            testcase.$kind().unwrap();
            testcase.check();
        }
    };
}

testcase!(normalize01, normalize);
testcase!(converge01, converge);

fn load() -> (annotation::GeneIndex, reference::Buffer) {
    let genes =
        annotation::load_gene_index(resources().join("genes.gff"), &["gene", "pseudogene"]).unwrap();
    let reference = reference::Buffer::from_path(resources().join("reference.fa")).unwrap();
    (genes, reference)
}

#[test]
fn test_gene_index_from_gff() {
    let (genes, _) = load();
    assert_eq!(genes.len(), 3);
    let pnca = genes.lookup("Rv2043c").unwrap();
    assert!(std::ptr::eq(pnca, genes.lookup("pncA").unwrap()));
    assert_eq!(pnca.start(), 5);
    assert_eq!(pnca.end(), 30);
    assert!(genes.lookup("NP_0001").is_none());
}

#[test]
fn test_imputation_is_idempotent() {
    let (genes, reference) = load();
    let context = Context::new(&genes, &reference);

    let imputed = context.normalize_str("pncA_2_del_1_t_t", None);
    assert_eq!(imputed[0].notation().as_deref(), Some("c.1del"));
    let corrected = context.normalize_str("pncA_2_del_1_tt_t", None);
    assert_eq!(imputed, corrected);
}

#[test]
fn test_batch_reports_failures_without_aborting() {
    let (genes, reference) = load();
    let path = resources().join("testcases/normalize01/catalogue.csv");
    let tokens = catalogue::read_raw(&path, &DrugCodes::default()).unwrap();
    assert_eq!(tokens.len(), 11);

    let normalization = Context::new(&genes, &reference).normalize_all(&tokens);
    assert_eq!(normalization.rows().len(), tokens.len());
    assert_eq!(normalization.failures().len(), 1);

    let records = normalization.to_records(&Config::default());
    let failed: Vec<_> = records.iter().filter(|record| record.fail).collect();
    assert_eq!(failed.len(), 1);
    assert_eq!(failed[0].variant, "geneA_weird");
    assert_eq!(
        failed[0].fail_reason,
        FailReason::UnrecognizedNotation.to_string()
    );
}

#[test]
fn test_fixed_notation_on_reference() {
    let (genes, reference) = load();
    let token = grammar::classify("c.5_6del").unwrap();
    // gene positions 5 and 6 of geneA are chromosome positions 15 and 16, anchored at 14
    assert_eq!(
        fixed::to_fixed(&token, genes.lookup("geneA"), &reference),
        Some(vec!["14CTT>C".to_owned()])
    );
}

#[test]
fn test_config_from_file() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("config.yaml");
    fs::write(&path, "left_name: tbdb2\nchromosome: chr1\n").unwrap();
    let config = Config::load(Some(&path)).unwrap();
    assert_eq!(config.left_name(), "tbdb2");
    assert_eq!(config.chromosome().as_deref(), Some("chr1"));
}
