// Copyright 2016-2019 Johannes Köster, David Lähnemann.
// Licensed under the GNU GPLv3 license (https://opensource.org/licenses/GPL-3.0)
// This file may not be copied, modified, or distributed
// except according to those terms.

/// Kind of a normalized variant, as written to the `type` column.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, EnumIter, IntoStaticStr, Display)]
pub enum VariantKind {
    #[strum(serialize = "p")]
    Protein,
    #[strum(serialize = "c")]
    CodingNt,
    #[strum(serialize = "n")]
    NonCodingNt,
    #[strum(serialize = "r")]
    RnaNt,
    #[strum(serialize = "frameshift")]
    Frameshift,
    #[strum(serialize = "premature_stop")]
    PrematureStop,
    #[strum(serialize = "codon_range")]
    CodonRange,
    #[strum(serialize = "indel_range")]
    IndelRange,
    #[strum(serialize = "large_deletion")]
    LargeDeletion,
}

/// Why a variant string could not be normalized.
///
/// Only `LengthMismatch` is retried (via deletion imputation); all others are terminal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, EnumIter, IntoStaticStr, Display)]
pub enum FailReason {
    #[strum(serialize = "unrecognized notation")]
    UnrecognizedNotation,
    #[strum(serialize = "length mismatch")]
    LengthMismatch,
    #[strum(serialize = "invalid indel")]
    InvalidIndel,
    #[strum(serialize = "imputation failed")]
    ImputationFailed,
    #[strum(serialize = "insertion not imputed")]
    InsertionNotImputed,
    #[strum(serialize = "gene not found")]
    GeneNotFound,
    #[strum(serialize = "invalid range")]
    InvalidRange,
}

impl FailReason {
    pub fn is_retryable(self) -> bool {
        self == FailReason::LengthMismatch
    }
}

/// Outcome of normalizing one variant string.
///
/// Invariant: `notation` is set iff `fail_reason` is not.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Getters, CopyGetters)]
pub struct ParsedVariant {
    #[getset(get = "pub")]
    gene: Option<String>,
    #[getset(get_copy = "pub")]
    kind: Option<VariantKind>,
    #[getset(get = "pub")]
    notation: Option<String>,
    #[getset(get_copy = "pub")]
    fail_reason: Option<FailReason>,
}

impl ParsedVariant {
    pub fn normalized(gene: Option<&str>, kind: VariantKind, notation: String) -> Self {
        ParsedVariant {
            gene: gene.map(str::to_owned),
            kind: Some(kind),
            notation: Some(notation),
            fail_reason: None,
        }
    }

    pub fn failed(gene: Option<&str>, kind: Option<VariantKind>, reason: FailReason) -> Self {
        ParsedVariant {
            gene: gene.map(str::to_owned),
            kind,
            notation: None,
            fail_reason: Some(reason),
        }
    }

    pub fn is_ok(&self) -> bool {
        self.fail_reason.is_none()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_labels() {
        assert_eq!(FailReason::LengthMismatch.to_string(), "length mismatch");
        assert_eq!(VariantKind::NonCodingNt.to_string(), "n");
        assert!(FailReason::LengthMismatch.is_retryable());
        assert!(!FailReason::InvalidIndel.is_retryable());
    }

    #[test]
    fn test_ok_iff_notation() {
        let ok = ParsedVariant::normalized(Some("rpoB"), VariantKind::Protein, "p.Ser450Leu".to_owned());
        assert!(ok.is_ok() && ok.notation().is_some());
        let failed = ParsedVariant::failed(None, None, FailReason::UnrecognizedNotation);
        assert!(!failed.is_ok() && failed.notation().is_none());
    }
}
