// Copyright 2016-2019 Johannes Köster, David Lähnemann.
// Licensed under the GNU GPLv3 license (https://opensource.org/licenses/GPL-3.0)
// This file may not be copied, modified, or distributed
// except according to those terms.

use std::collections::HashMap;
use std::convert::TryFrom;
use std::fs;
use std::path::Path;

use anyhow::Result;

use crate::catalogue::DrugCodes;
use crate::errors;

pub const WHO_CATALOGUE_URL: &str =
    "https://www.who.int/publications/i/item/9789240082410";

/// Run configuration, read from YAML. Every field is optional.
#[derive(Debug, Clone, PartialEq, Deserialize, Getters)]
#[serde(default, deny_unknown_fields)]
#[getset(get = "pub")]
pub struct Config {
    left_name: String,
    right_name: String,
    reference_name: String,
    confers: String,
    literature: String,
    gene_features: Vec<String>,
    drug_codes: HashMap<String, String>,
    chromosome: Option<String>,
}

impl Default for Config {
    fn default() -> Self {
        Config {
            left_name: "tbdb".to_owned(),
            right_name: "who".to_owned(),
            reference_name: "fohm".to_owned(),
            confers: "resistance".to_owned(),
            literature: WHO_CATALOGUE_URL.to_owned(),
            gene_features: vec!["gene".to_owned(), "pseudogene".to_owned()],
            drug_codes: HashMap::new(),
            chromosome: None,
        }
    }
}

impl<'a> TryFrom<&'a str> for Config {
    type Error = serde_yaml::Error;

    fn try_from(yaml: &str) -> Result<Self, Self::Error> {
        serde_yaml::from_str(yaml)
    }
}

impl Config {
    /// Load and validate a YAML config, or fall back to the defaults if no path is given.
    pub fn load<P: AsRef<Path>>(path: Option<P>) -> Result<Self> {
        let config = match path {
            Some(path) => Config::try_from(fs::read_to_string(path)?.as_str())?,
            None => Config::default(),
        };
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        for name in &[&self.left_name, &self.right_name, &self.reference_name] {
            if name.is_empty() || name.contains(std::path::is_separator) {
                Err(errors::invalid_configuration(&format!(
                    "catalogue name '{}' must be non-empty and must not contain a path separator",
                    name
                )))?;
            }
        }
        if self.left_name == self.right_name {
            Err(errors::invalid_configuration(
                "left and right catalogue names must differ",
            ))?;
        }
        if self.gene_features.is_empty() {
            Err(errors::invalid_configuration(
                "at least one gene feature type is required",
            ))?;
        }
        Ok(())
    }

    pub fn set_names(
        &mut self,
        left: Option<String>,
        right: Option<String>,
        reference: Option<String>,
    ) -> Result<()> {
        if let Some(left) = left {
            self.left_name = left;
        }
        if let Some(right) = right {
            self.right_name = right;
        }
        if let Some(reference) = reference {
            self.reference_name = reference;
        }
        self.validate()
    }

    /// Built-in drug codes with the configured ones merged over them.
    pub fn drug_code_table(&self) -> DrugCodes {
        let mut codes = DrugCodes::default();
        codes.extend(&self.drug_codes);
        codes
    }
}
