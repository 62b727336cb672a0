// Copyright 2016-2019 Johannes Köster, David Lähnemann.
// Licensed under the GNU GPLv3 license (https://opensource.org/licenses/GPL-3.0)
// This file may not be copied, modified, or distributed
// except according to those terms.

//! Catalogue mutation notations.
//!
//! A raw variant string is classified by trying each [`Rule`] in declaration order; the first
//! rule that matches wins. The order matters, since some notations are textual subsets of others.

use std::fmt;

use regex::{Captures, Regex};
use strum::IntoEnumIterator;

pub mod protein;

pub use protein::{AminoAcid, ProteinSubstitution, Residue};

lazy_static! {
    static ref PROTEIN_RE: Regex = Regex::new(
        r"^(?:(?P<gene>\w+)_(?:p\.)?|p\.)(?P<ref>[A-Z][a-z]{2}|[A-Z])(?P<pos>\d+)(?P<alt>[A-Z][a-z]{2}|[A-Z]|\*|!)$"
    )
    .unwrap();
    static ref NUCLEOTIDE_RE: Regex =
        Regex::new(r"^(?P<gene>\w+)_(?P<ref>[acgt])(?P<pos>-?\d+)(?P<alt>[acgt])$").unwrap();
    static ref DELETION_RE: Regex = Regex::new(
        r"^(?P<gene>\w+)_(?P<pos>-?\d+)_del_(?P<len>\d+)_(?P<ref>[acgt]+)_(?P<alt>[acgt]+)$"
    )
    .unwrap();
    static ref INSERTION_RE: Regex = Regex::new(
        r"^(?P<gene>\w+)_(?P<pos>-?\d+)_ins_(?P<len>\d+)_(?P<ref>[acgt]+)_(?P<alt>[acgt]+)$"
    )
    .unwrap();
    static ref PROMOTER_RE: Regex = Regex::new(
        r"^(?:(?P<gene>\w+?)_)?(?:c\.)?(?P<pos>-\d+)(?P<ref>[ACGTacgt])>(?P<alt>[ACGTacgt])$"
    )
    .unwrap();
    static ref RNA_RE: Regex = Regex::new(
        r"^(?:(?P<gene>\w+?)_)?r\.(?P<pos>\d+)(?P<ref>[ACGTUacgtu]+)>(?P<alt>[ACGTUacgtu]+)$"
    )
    .unwrap();
    static ref LITERAL_RE: Regex = Regex::new(
        r"^(?:(?P<gene>\w+?)_)?(?P<literal>frameshift|premature_stop|large_deletion)$"
    )
    .unwrap();
    static ref CODON_RANGE_RE: Regex = Regex::new(
        r"^(?:(?P<gene>\w+?)_)?any_missense_codon_(?P<start>\d+)(?:_(?P<end>\d+))?$"
    )
    .unwrap();
    static ref INDEL_RANGE_RE: Regex = Regex::new(
        r"^(?:(?P<gene>\w+?)_)?any_indel_nucleotide_(?P<start>\d+)_(?P<end>\d+)$"
    )
    .unwrap();
    static ref CODING_INDEL_RE: Regex = Regex::new(
        r"^(?:(?P<gene>\w+?)_)?c\.(?P<start>-?\d+)(?:_(?P<end>-?\d+))?(?P<op>del|ins|dup)(?P<seq>[ACGTacgt]*)$"
    )
    .unwrap();
    static ref CODING_RE: Regex = Regex::new(
        r"^(?:(?P<gene>\w+?)_)?c\.(?P<pos>\d+)(?P<ref>[ACGTacgt])>(?P<alt>[ACGTacgt])$"
    )
    .unwrap();
    static ref NON_CODING_RE: Regex = Regex::new(
        r"^(?:(?P<gene>\w+?)_)?n\.(?P<pos>-?\d+)(?P<ref>[ACGTacgt])>(?P<alt>[ACGTacgt])$"
    )
    .unwrap();
}

/// Deletion or insertion in catalogue shorthand:
/// `GENE_<pos>_<del|ins>_<len>_<ref bases>_<alt bases>`.
///
/// Bases are in chromosome orientation, starting at the gene-relative position `pos`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, new, Getters, CopyGetters)]
pub struct Indel {
    #[getset(get = "pub")]
    gene: String,
    #[getset(get_copy = "pub")]
    pos: i64,
    #[getset(get_copy = "pub")]
    len: usize,
    #[getset(get = "pub")]
    reference: String,
    #[getset(get = "pub")]
    alternative: String,
}

impl Indel {
    /// Render back into catalogue shorthand with the given operation (`del` or `ins`).
    pub fn raw(&self, op: &str) -> String {
        format!(
            "{}_{}_{}_{}_{}_{}",
            self.gene, self.pos, op, self.len, self.reference, self.alternative
        )
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, EnumString, IntoStaticStr, Display)]
pub enum Literal {
    #[strum(serialize = "frameshift")]
    Frameshift,
    #[strum(serialize = "premature_stop")]
    PrematureStop,
    #[strum(serialize = "large_deletion")]
    LargeDeletion,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, EnumString, IntoStaticStr, Display)]
pub enum IndelOp {
    #[strum(serialize = "del")]
    Del,
    #[strum(serialize = "ins")]
    Ins,
    #[strum(serialize = "dup")]
    Dup,
}

/// A classified variant string.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Token {
    Protein(ProteinSubstitution),
    /// Nucleotide substitution at a gene-relative position, e.g. `rpoB_c1349t`.
    Nucleotide {
        gene: String,
        pos: i64,
        reference: char,
        alternative: char,
    },
    Deletion(Indel),
    Insertion(Indel),
    /// Upstream substitution, e.g. `c.-16G>C`.
    Promoter {
        gene: Option<String>,
        pos: i64,
        reference: char,
        alternative: char,
    },
    /// Substitution in a non-coding RNA, e.g. `r.514a>c`.
    Rna {
        gene: Option<String>,
        pos: u64,
        reference: String,
        alternative: String,
    },
    Literal {
        gene: Option<String>,
        literal: Literal,
    },
    CodonRange {
        gene: Option<String>,
        start: u64,
        end: Option<u64>,
    },
    IndelRange {
        gene: Option<String>,
        start: u64,
        end: u64,
    },
    /// Already normalized coding indel, e.g. `c.1296_1298del` or `c.1298_1299insTTC`.
    CodingIndel {
        gene: Option<String>,
        start: i64,
        end: Option<i64>,
        op: IndelOp,
        seq: String,
    },
    /// Coding substitution in HGVS form, e.g. `rpoB_c.1349C>T`.
    Coding {
        gene: Option<String>,
        pos: i64,
        reference: char,
        alternative: char,
    },
    /// Non-coding substitution in HGVS form, e.g. `rrs_n.1401A>G`.
    NonCoding {
        gene: Option<String>,
        pos: i64,
        reference: char,
        alternative: char,
    },
}

impl Token {
    /// Gene named by the token itself, if any.
    pub fn gene(&self) -> Option<&str> {
        match self {
            Token::Protein(protein) => protein.gene().as_deref(),
            Token::Nucleotide { gene, .. } => Some(gene),
            Token::Deletion(indel) | Token::Insertion(indel) => Some(indel.gene()),
            Token::Promoter { gene, .. }
            | Token::Rna { gene, .. }
            | Token::Literal { gene, .. }
            | Token::CodonRange { gene, .. }
            | Token::IndelRange { gene, .. }
            | Token::CodingIndel { gene, .. }
            | Token::Coding { gene, .. }
            | Token::NonCoding { gene, .. } => gene.as_deref(),
        }
    }
}

/// Notation rules in precedence order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, EnumIter, IntoStaticStr)]
pub enum Rule {
    Protein,
    Nucleotide,
    Deletion,
    Insertion,
    Promoter,
    Rna,
    Literal,
    CodonRange,
    IndelRange,
    CodingIndel,
    Coding,
    NonCoding,
}

fn gene(caps: &Captures) -> Option<String> {
    caps.name("gene").map(|m| m.as_str().to_owned())
}

fn base(caps: &Captures, name: &str) -> Option<char> {
    caps[name].chars().next().map(|b| b.to_ascii_uppercase())
}

fn indel(caps: &Captures) -> Option<Indel> {
    Some(Indel::new(
        caps["gene"].to_owned(),
        caps["pos"].parse().ok()?,
        caps["len"].parse().ok()?,
        caps["ref"].to_owned(),
        caps["alt"].to_owned(),
    ))
}

impl Rule {
    fn regex(self) -> &'static Regex {
        match self {
            Rule::Protein => &PROTEIN_RE,
            Rule::Nucleotide => &NUCLEOTIDE_RE,
            Rule::Deletion => &DELETION_RE,
            Rule::Insertion => &INSERTION_RE,
            Rule::Promoter => &PROMOTER_RE,
            Rule::Rna => &RNA_RE,
            Rule::Literal => &LITERAL_RE,
            Rule::CodonRange => &CODON_RANGE_RE,
            Rule::IndelRange => &INDEL_RANGE_RE,
            Rule::CodingIndel => &CODING_INDEL_RE,
            Rule::Coding => &CODING_RE,
            Rule::NonCoding => &NON_CODING_RE,
        }
    }

    /// Try to read the given string with this rule.
    pub fn parse(self, raw: &str) -> Option<Token> {
        let caps = self.regex().captures(raw)?;
        match self {
            Rule::Protein => Some(Token::Protein(ProteinSubstitution::new(
                gene(&caps),
                Residue::parse(&caps["ref"]).filter(|r| r.amino_acid().is_some())?,
                caps["pos"].parse().ok()?,
                Residue::parse(&caps["alt"])?,
            ))),
            Rule::Nucleotide => Some(Token::Nucleotide {
                gene: caps["gene"].to_owned(),
                pos: caps["pos"].parse().ok()?,
                reference: base(&caps, "ref")?,
                alternative: base(&caps, "alt")?,
            }),
            Rule::Deletion => indel(&caps).map(Token::Deletion),
            Rule::Insertion => indel(&caps).map(Token::Insertion),
            Rule::Promoter => Some(Token::Promoter {
                gene: gene(&caps),
                pos: caps["pos"].parse().ok()?,
                reference: base(&caps, "ref")?,
                alternative: base(&caps, "alt")?,
            }),
            Rule::Rna => Some(Token::Rna {
                gene: gene(&caps),
                pos: caps["pos"].parse().ok()?,
                reference: caps["ref"].to_ascii_uppercase(),
                alternative: caps["alt"].to_ascii_uppercase(),
            }),
            Rule::Literal => Some(Token::Literal {
                gene: gene(&caps),
                literal: caps["literal"].parse().ok()?,
            }),
            Rule::CodonRange => Some(Token::CodonRange {
                gene: gene(&caps),
                start: caps["start"].parse().ok()?,
                end: match caps.name("end") {
                    Some(end) => Some(end.as_str().parse().ok()?),
                    None => None,
                },
            }),
            Rule::IndelRange => Some(Token::IndelRange {
                gene: gene(&caps),
                start: caps["start"].parse().ok()?,
                end: caps["end"].parse().ok()?,
            }),
            Rule::CodingIndel => {
                let op: IndelOp = caps["op"].parse().ok()?;
                let end: Option<i64> = match caps.name("end") {
                    Some(end) => Some(end.as_str().parse().ok()?),
                    None => None,
                };
                let seq = caps["seq"].to_ascii_uppercase();
                if op == IndelOp::Ins && (end.is_none() || seq.is_empty()) {
                    // an insertion needs both flanking positions and the inserted bases
                    return None;
                }
                Some(Token::CodingIndel {
                    gene: gene(&caps),
                    start: caps["start"].parse().ok()?,
                    end,
                    op,
                    seq,
                })
            }
            Rule::Coding => Some(Token::Coding {
                gene: gene(&caps),
                pos: caps["pos"].parse().ok()?,
                reference: base(&caps, "ref")?,
                alternative: base(&caps, "alt")?,
            }),
            Rule::NonCoding => Some(Token::NonCoding {
                gene: gene(&caps),
                pos: caps["pos"].parse().ok()?,
                reference: base(&caps, "ref")?,
                alternative: base(&caps, "alt")?,
            }),
        }
    }
}

/// Classify a raw variant string, returning the token of the first matching rule.
pub fn classify(raw: &str) -> Option<Token> {
    Rule::iter().find_map(|rule| rule.parse(raw.trim()))
}

impl fmt::Display for Rule {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        let name: &'static str = self.into();
        f.write_str(name)
    }
}
