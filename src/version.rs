//! Ordering of dotted version strings.
//!
//! Versions are compared segment by segment after splitting on `.`. A
//! segment is read as a leading run of digits followed by an optional
//! suffix: the digits are compared numerically (so `08` equals `8`) and ties
//! are broken by comparing the suffixes lexically, where an empty suffix
//! sorts first. A version with fewer segments is padded with `0` segments,
//! which makes `1.0.2.0` equal to `1.0.2` while `3.0.4.10` is greater than
//! `3.0.4.2` and `1.1-0` is greater than `1`.
//!
//! Registered schema versions must additionally be *well formed*, i.e.
//! exactly three numeric segments (`MAJOR.MINOR.PATCH`).

use std::{cmp::Ordering, sync::LazyLock};

use regex::Regex;

static WELL_FORMED: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^\d+\.\d+\.\d+$").expect("static regex"));

/// Returns true for `MAJOR.MINOR.PATCH` strings of plain digits.
pub fn is_well_formed(version: &str) -> bool {
    WELL_FORMED.is_match(version)
}

/// Compares two version strings.
pub fn compare(a: &str, b: &str) -> Ordering {
    let left: Vec<&str> = a.split('.').collect();
    let right: Vec<&str> = b.split('.').collect();

    (0..left.len().max(right.len()))
        .map(|index| {
            let l = left.get(index).copied().unwrap_or("0");
            let r = right.get(index).copied().unwrap_or("0");
            compare_segment(l, r)
        })
        .find(|ordering| ordering.is_ne())
        .unwrap_or(Ordering::Equal)
}

/// Returns the greatest version, or `None` for an empty input.
///
/// When several versions compare equal the one seen last wins, so
/// `["1.0.2.0", "1.0.2"]` yields `"1.0.2"`.
pub fn latest_of<'a, I>(versions: I) -> Option<&'a str>
where
    I: IntoIterator<Item = &'a str>,
{
    versions.into_iter().fold(None, |latest, version| match latest {
        Some(current) if compare(version, current).is_lt() => Some(current),
        _ => Some(version),
    })
}

/// Sorts versions in ascending order, keeping the input order of equal ones.
pub fn sort_versions<S: AsRef<str>>(versions: &mut [S]) {
    versions.sort_by(|a, b| compare(a.as_ref(), b.as_ref()));
}

fn compare_segment(a: &str, b: &str) -> Ordering {
    let (a_digits, a_suffix) = split_segment(a);
    let (b_digits, b_suffix) = split_segment(b);

    compare_digits(a_digits, b_digits).then_with(|| a_suffix.cmp(b_suffix))
}

/// Splits a segment into its leading digits (without leading zeros) and the
/// remaining suffix. Segments that do not start with a digit have no number.
fn split_segment(segment: &str) -> (Option<&str>, &str) {
    let end = segment
        .find(|c: char| !c.is_ascii_digit())
        .unwrap_or(segment.len());

    match end {
        0 => (None, segment),
        _ => (Some(segment[..end].trim_start_matches('0')), &segment[end..]),
    }
}

// Digit strings carry no leading zeros here, so a longer one is larger.
fn compare_digits(a: Option<&str>, b: Option<&str>) -> Ordering {
    match (a, b) {
        (Some(a), Some(b)) => a.len().cmp(&b.len()).then_with(|| a.cmp(b)),
        (None, Some(_)) => Ordering::Less,
        (Some(_), None) => Ordering::Greater,
        (None, None) => Ordering::Equal,
    }
}
