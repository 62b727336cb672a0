// Copyright 2016-2019 Johannes Köster, David Lähnemann.
// Licensed under the GNU GPLv3 license (https://opensource.org/licenses/GPL-3.0)
// This file may not be copied, modified, or distributed
// except according to those terms.

use std::fs::File;
use std::io;
use std::path::{Path, PathBuf};

use anyhow::Result;
use structopt::StructOpt;

use crate::annotation;
use crate::catalogue;
use crate::config::Config;
use crate::converge::ConvergerBuilder;
use crate::errors;
use crate::fixed;
use crate::grammar;
use crate::normalize::Context;
use crate::reference;

#[derive(Debug, StructOpt, Clone)]
#[structopt(
    name = "mutcat",
    about = "Normalize resistance catalogue mutations into HGVS notation and reconcile catalogues."
)]
#[structopt(setting = structopt::clap::AppSettings::ColoredHelp)]
pub struct Mutcat {
    #[structopt(long, global = true, help = "Provide verbose output.")]
    pub verbose: bool,
    #[structopt(subcommand)]
    pub command: Command,
}

#[derive(Debug, StructOpt, Clone)]
pub enum Command {
    #[structopt(
        name = "normalize",
        about = "Normalize the variant notation of a raw catalogue (CSV with at least drug and \
                 variant columns) into a catalogue with HGVS-style mutations."
    )]
    #[structopt(setting = structopt::clap::AppSettings::ColoredHelp)]
    Normalize {
        #[structopt(parse(from_os_str), help = "Raw catalogue CSV file.")]
        catalogue: PathBuf,
        #[structopt(parse(from_os_str), long, help = "GFF3 file with gene annotation.")]
        genes: PathBuf,
        #[structopt(
            parse(from_os_str),
            long,
            help = "FASTA file with the reference genome, used to impute truncated deletions."
        )]
        reference: PathBuf,
        #[structopt(parse(from_os_str), long, help = "YAML configuration file.")]
        config: Option<PathBuf>,
        #[structopt(long, default_value = "1", help = "Number of threads to use.")]
        threads: usize,
        #[structopt(
            parse(from_os_str),
            long,
            help = "CSV file that shall contain all variants that could not be normalized."
        )]
        failures: Option<PathBuf>,
        #[structopt(
            parse(from_os_str),
            long,
            help = "CSV file that shall contain the full normalization table, including the \
                    internal variant, gene, hgvs, type, fail and fail_reason columns."
        )]
        records: Option<PathBuf>,
        #[structopt(
            parse(from_os_str),
            long,
            help = "CSV file that shall contain the normalized catalogue (if omitted, write to STDOUT)."
        )]
        output: Option<PathBuf>,
    },
    #[structopt(
        name = "converge",
        about = "Reconcile two normalized catalogues and merge them with a reference set."
    )]
    #[structopt(setting = structopt::clap::AppSettings::ColoredHelp)]
    Converge {
        #[structopt(parse(from_os_str), long, help = "Left (primary) normalized catalogue.")]
        left: PathBuf,
        #[structopt(parse(from_os_str), long, help = "Right normalized catalogue.")]
        right: PathBuf,
        #[structopt(
            parse(from_os_str),
            long = "reference-set",
            help = "Normalized reference set that is merged into the final catalogues."
        )]
        reference_set: PathBuf,
        #[structopt(parse(from_os_str), long, help = "Directory to write the tables to.")]
        outdir: PathBuf,
        #[structopt(parse(from_os_str), long, help = "YAML configuration file.")]
        config: Option<PathBuf>,
        #[structopt(long = "left-name", help = "Name of the left catalogue in table names.")]
        left_name: Option<String>,
        #[structopt(long = "right-name", help = "Name of the right catalogue in table names.")]
        right_name: Option<String>,
        #[structopt(
            long = "reference-name",
            help = "Name of the reference set in table names."
        )]
        reference_name: Option<String>,
    },
    #[structopt(
        name = "fixed",
        about = "Print the chromosome-anchored notation of the given variants."
    )]
    #[structopt(setting = structopt::clap::AppSettings::ColoredHelp)]
    Fixed {
        #[structopt(help = "Variants to convert.")]
        variants: Vec<String>,
        #[structopt(long, help = "Gene of variants that do not name their gene.")]
        gene: Option<String>,
        #[structopt(parse(from_os_str), long, help = "GFF3 file with gene annotation.")]
        genes: PathBuf,
        #[structopt(parse(from_os_str), long, help = "FASTA file with the reference genome.")]
        reference: PathBuf,
        #[structopt(parse(from_os_str), long, help = "YAML configuration file.")]
        config: Option<PathBuf>,
    },
}

fn load_resources(
    genes: &Path,
    reference: &Path,
    config: &Config,
) -> Result<(annotation::GeneIndex, reference::Buffer)> {
    let genes = annotation::load_gene_index(genes, config.gene_features().as_slice())?;
    let reference = reference::Buffer::from_path(reference)?.fallback(config.chromosome().clone());
    Ok((genes, reference))
}

pub fn run(opt: Mutcat) -> Result<()> {
    match opt.command {
        Command::Normalize {
            ref catalogue,
            ref genes,
            ref reference,
            ref config,
            threads,
            ref failures,
            ref records,
            ref output,
        } => {
            if threads == 0 {
                Err(errors::invalid_configuration("--threads must be at least 1"))?;
            }
            let pool = rayon::ThreadPoolBuilder::new()
                .num_threads(threads)
                .build()?;

            let config = Config::load(config.as_ref())?;
            let (genes, reference) = load_resources(genes, reference, &config)?;
            let tokens = catalogue::read_raw(catalogue, &config.drug_code_table())?;

            let context = Context::new(&genes, &reference);
            let normalization = pool.install(|| context.normalize_all(&tokens));
            let entries = normalization.entries(&config);
            match output {
                Some(path) => catalogue::write_entries_to_path(path, &entries)?,
                None => catalogue::write_entries(io::stdout(), &entries)?,
            }
            if let Some(path) = failures {
                normalization.failures().write_to_path(path)?;
            }
            if let Some(path) = records {
                normalization.write_records(File::create(path)?, &config)?;
            }
            info!(
                "normalized {} rows into {} entries, {} failures",
                tokens.len(),
                entries.len(),
                normalization.failures().len()
            );
        }
        Command::Converge {
            left,
            right,
            reference_set,
            outdir,
            config,
            left_name,
            right_name,
            reference_name,
        } => {
            let mut config = Config::load(config)?;
            config.set_names(left_name, right_name, reference_name)?;

            ConvergerBuilder::default()
                .left(left)
                .right(right)
                .reference_set(reference_set)
                .outdir(outdir)
                .left_name(config.left_name().clone())
                .right_name(config.right_name().clone())
                .reference_name(config.reference_name().clone())
                .build()?
                .converge()?;
        }
        Command::Fixed {
            ref variants,
            ref gene,
            ref genes,
            ref reference,
            ref config,
        } => {
            let config = Config::load(config.as_ref())?;
            let (genes, reference) = load_resources(genes, reference, &config)?;
            for variant in variants {
                let fixed = grammar::classify(variant).and_then(|token| {
                    let gene = token.gene().or_else(|| gene.as_deref());
                    fixed::to_fixed(&token, gene.and_then(|gene| genes.lookup(gene)), &reference)
                });
                match fixed {
                    Some(fixed) => println!("{}\t{}", variant, fixed.join(",")),
                    None => warn!("cannot convert {} into fixed notation", variant),
                }
            }
        }
    }
    Ok(())
}
