// Copyright 2016-2019 Johannes Köster, David Lähnemann.
// Licensed under the GNU GPLv3 license (https://opensource.org/licenses/GPL-3.0)
// This file may not be copied, modified, or distributed
// except according to those terms.

use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, EnumIter)]
pub enum AminoAcid {
    Ala,
    Arg,
    Asn,
    Asp,
    Asx,
    Cys,
    Glu,
    Gln,
    Glx,
    Gly,
    His,
    Ile,
    Leu,
    Lys,
    Met,
    Phe,
    Pro,
    Ser,
    Thr,
    Trp,
    Tyr,
    Val,
}

impl AminoAcid {
    pub fn one_letter(self) -> char {
        match self {
            AminoAcid::Ala => 'A',
            AminoAcid::Arg => 'R',
            AminoAcid::Asn => 'N',
            AminoAcid::Asp => 'D',
            AminoAcid::Asx => 'B',
            AminoAcid::Cys => 'C',
            AminoAcid::Glu => 'E',
            AminoAcid::Gln => 'Q',
            AminoAcid::Glx => 'Z',
            AminoAcid::Gly => 'G',
            AminoAcid::His => 'H',
            AminoAcid::Ile => 'I',
            AminoAcid::Leu => 'L',
            AminoAcid::Lys => 'K',
            AminoAcid::Met => 'M',
            AminoAcid::Phe => 'F',
            AminoAcid::Pro => 'P',
            AminoAcid::Ser => 'S',
            AminoAcid::Thr => 'T',
            AminoAcid::Trp => 'W',
            AminoAcid::Tyr => 'Y',
            AminoAcid::Val => 'V',
        }
    }

    pub fn three_letter(self) -> &'static str {
        match self {
            AminoAcid::Ala => "Ala",
            AminoAcid::Arg => "Arg",
            AminoAcid::Asn => "Asn",
            AminoAcid::Asp => "Asp",
            AminoAcid::Asx => "Asx",
            AminoAcid::Cys => "Cys",
            AminoAcid::Glu => "Glu",
            AminoAcid::Gln => "Gln",
            AminoAcid::Glx => "Glx",
            AminoAcid::Gly => "Gly",
            AminoAcid::His => "His",
            AminoAcid::Ile => "Ile",
            AminoAcid::Leu => "Leu",
            AminoAcid::Lys => "Lys",
            AminoAcid::Met => "Met",
            AminoAcid::Phe => "Phe",
            AminoAcid::Pro => "Pro",
            AminoAcid::Ser => "Ser",
            AminoAcid::Thr => "Thr",
            AminoAcid::Trp => "Trp",
            AminoAcid::Tyr => "Tyr",
            AminoAcid::Val => "Val",
        }
    }

    pub fn from_one_letter(code: char) -> Option<Self> {
        use strum::IntoEnumIterator;
        AminoAcid::iter().find(|aa| aa.one_letter() == code)
    }

    pub fn from_three_letter(code: &str) -> Option<Self> {
        use strum::IntoEnumIterator;
        AminoAcid::iter().find(|aa| aa.three_letter() == code)
    }
}

/// A residue as written in the source notation, remembering the code it was written in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Residue {
    OneLetter(AminoAcid),
    ThreeLetter(AminoAcid),
    /// Termination, written as `*` or `!`.
    Stop(char),
}

impl Residue {
    pub(crate) fn parse(code: &str) -> Option<Self> {
        match code {
            "*" | "!" => code.chars().next().map(Residue::Stop),
            _ if code.len() == 1 => code
                .chars()
                .next()
                .and_then(AminoAcid::from_one_letter)
                .map(Residue::OneLetter),
            _ => AminoAcid::from_three_letter(code).map(Residue::ThreeLetter),
        }
    }

    pub fn amino_acid(self) -> Option<AminoAcid> {
        match self {
            Residue::OneLetter(aa) | Residue::ThreeLetter(aa) => Some(aa),
            Residue::Stop(_) => None,
        }
    }

    /// HGVS rendering: three-letter code, or `*` for termination.
    pub fn hgvs(self) -> &'static str {
        self.amino_acid().map_or("*", AminoAcid::three_letter)
    }

    /// One-letter rendering, `*` for termination.
    pub fn short(self) -> char {
        self.amino_acid().map_or('*', AminoAcid::one_letter)
    }
}

impl fmt::Display for Residue {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Residue::OneLetter(aa) => write!(f, "{}", aa.one_letter()),
            Residue::ThreeLetter(aa) => f.write_str(aa.three_letter()),
            Residue::Stop(symbol) => write!(f, "{}", symbol),
        }
    }
}

/// Amino acid substitution at a codon, e.g. `rpoB_Ser450Leu` or `p.Ser450*`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, new, Getters, CopyGetters)]
pub struct ProteinSubstitution {
    #[getset(get = "pub")]
    gene: Option<String>,
    #[getset(get_copy = "pub")]
    reference: Residue,
    #[getset(get_copy = "pub")]
    codon: u64,
    #[getset(get_copy = "pub")]
    alternative: Residue,
}

impl ProteinSubstitution {
    pub fn hgvs(&self) -> String {
        format!(
            "p.{}{}{}",
            self.reference.hgvs(),
            self.codon,
            self.alternative.hgvs()
        )
    }
}

/// Renders the substitution in the notation it was parsed from.
impl fmt::Display for ProteinSubstitution {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match &self.gene {
            Some(gene) => write!(f, "{}_", gene)?,
            None => f.write_str("p.")?,
        }
        write!(f, "{}{}{}", self.reference, self.codon, self.alternative)
    }
}
