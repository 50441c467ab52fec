//! Column order of metadata types in by-match reports.

use std::cmp::Ordering;

/// Fixed precedence of well-known metadata types. Lower sorts first.
pub const METADATA_PRECEDENCE: &[(&str, u32)] = &[
    ("jurisdictions", 10),
    ("issuingAgencies", 20),
    ("docTypes", 30),
    ("publicationDate", 40),
    ("volumeNumber", 50),
    ("volumes", 60),
    ("docNumber", 70),
    ("cik", 80),
    ("filedAs", 90),
    ("filingType", 100),
    ("filingDate", 110),
    ("celex", 120),
    ("uncluster", 1000),
    ("entityTags", 2000),
];

pub fn precedence(metadata_type: &str) -> Option<u32> {
    METADATA_PRECEDENCE
        .iter()
        .find(|(name, _)| *name == metadata_type)
        .map(|(_, rank)| *rank)
}

/// Listed types by precedence, then unlisted types alphabetically.
pub fn compare_metadata_types(a: &str, b: &str) -> Ordering {
    match (precedence(a), precedence(b)) {
        (Some(x), Some(y)) => x.cmp(&y),
        (Some(_), None) => Ordering::Less,
        (None, Some(_)) => Ordering::Greater,
        (None, None) => a.cmp(b),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unlisted_types_sort_last_alphabetically() {
        let mut types = vec!["zeta", "entityTags", "alpha", "docTypes", "jurisdictions", "uncluster"];
        types.sort_by(|a, b| compare_metadata_types(a, b));
        assert_eq!(
            types,
            vec!["jurisdictions", "docTypes", "uncluster", "entityTags", "alpha", "zeta"]
        );
    }
}
