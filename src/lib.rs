// Copyright 2016-2019 Johannes Köster, David Lähnemann.
// Licensed under the GNU GPLv3 license (https://opensource.org/licenses/GPL-3.0)
// This file may not be copied, modified, or distributed
// except according to those terms.

//! Normalization of bacterial drug resistance catalogue mutations into HGVS-style notation, and
//! reconciliation of normalized catalogues.

#[macro_use]
extern crate log;
#[macro_use]
extern crate lazy_static;
#[macro_use]
extern crate serde_derive;
#[macro_use]
extern crate derive_builder;
#[macro_use]
extern crate derive_new;
#[macro_use]
extern crate getset;
#[macro_use]
extern crate strum_macros;

pub mod annotation;
pub mod catalogue;
pub mod cli;
pub mod config;
pub mod converge;
pub mod coords;
pub mod errors;
pub mod fixed;
pub mod grammar;
pub mod imputation;
pub mod indel;
pub mod normalize;
pub mod reconcile;
pub mod reference;
pub mod variant;
