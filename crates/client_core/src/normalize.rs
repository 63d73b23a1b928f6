//! Turns `{Key, Record}` collections into display records and orders them.

use std::cmp::Ordering;

use shared::{
    domain::{KeyedRecord, LedgerEntry},
    protocol::Operation,
};
use unicode_normalization::{char::is_combining_mark, UnicodeNormalization};

pub const GROUP_NAME_FIELD: &str = "groupName";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SortOrder {
    /// Ascending `groupName`, compared the way a locale-aware UI would.
    GroupName,
    /// Ascending `Key` read as a number.
    NumericKey,
}

impl SortOrder {
    pub fn for_operation(operation: Operation) -> Option<Self> {
        match operation {
            Operation::GetAllGroups | Operation::QueryAllUsers => Some(Self::GroupName),
            Operation::PrepareForDelivery => Some(Self::NumericKey),
            _ => None,
        }
    }
}

/// Merges each entry's key into its record, keeping input order.
pub fn merge_keys(entries: Vec<LedgerEntry>) -> Vec<KeyedRecord> {
    entries.into_iter().map(KeyedRecord::from).collect()
}

pub fn normalize(entries: Vec<LedgerEntry>, order: SortOrder) -> Vec<KeyedRecord> {
    let mut records = merge_keys(entries);
    match order {
        SortOrder::GroupName => sort_by_group_name(&mut records),
        SortOrder::NumericKey => sort_by_numeric_key(&mut records),
    }
    records
}

/// Stable. A missing or non-string `groupName` sorts as the empty string.
pub fn sort_by_group_name(records: &mut [KeyedRecord]) {
    records.sort_by(|a, b| {
        locale_compare(
            a.str_field(GROUP_NAME_FIELD).unwrap_or_default(),
            b.str_field(GROUP_NAME_FIELD).unwrap_or_default(),
        )
    });
}

/// Stable. Keys that are not numbers sort after all numeric keys, in input
/// order.
pub fn sort_by_numeric_key(records: &mut [KeyedRecord]) {
    records.sort_by(|a, b| compare_numeric_keys(a.key(), b.key()));
}

pub fn compare_numeric_keys(a: &str, b: &str) -> Ordering {
    match (numeric_key(a), numeric_key(b)) {
        (Some(a), Some(b)) => a.partial_cmp(&b).unwrap_or(Ordering::Equal),
        (Some(_), None) => Ordering::Less,
        (None, Some(_)) => Ordering::Greater,
        (None, None) => Ordering::Equal,
    }
}

/// Reads the leading decimal literal of `key`, the way `parseFloat` does:
/// `"12abc"` is 12, `"Infinity"` is infinite, `"inf"` and `"NaN"` are not
/// numbers.
pub fn numeric_key(key: &str) -> Option<f64> {
    let trimmed = key.trim_start();
    let unsigned = trimmed.strip_prefix(['+', '-']).unwrap_or(trimmed);
    let sign_len = trimmed.len() - unsigned.len();

    let literal_len = if unsigned.starts_with(INFINITY) {
        INFINITY.len()
    } else {
        decimal_prefix_len(unsigned.as_bytes())?
    };
    trimmed[..sign_len + literal_len].parse::<f64>().ok()
}

const INFINITY: &str = "Infinity";

fn decimal_prefix_len(bytes: &[u8]) -> Option<usize> {
    let int_digits = digit_run(bytes);
    let mut end = int_digits;
    let mut frac_digits = 0;
    if bytes.get(end) == Some(&b'.') {
        frac_digits = digit_run(&bytes[end + 1..]);
        end += 1 + frac_digits;
    }
    if int_digits + frac_digits == 0 {
        return None;
    }
    if matches!(bytes.get(end), Some(b'e' | b'E')) {
        let mut exp = end + 1;
        if matches!(bytes.get(exp), Some(b'+' | b'-')) {
            exp += 1;
        }
        let exp_digits = digit_run(&bytes[exp.min(bytes.len())..]);
        if exp_digits > 0 {
            end = exp + exp_digits;
        }
    }
    Some(end)
}

fn digit_run(bytes: &[u8]) -> usize {
    bytes.iter().take_while(|b| b.is_ascii_digit()).count()
}

/// Three-level comparison in the manner of a locale collator. Base letters
/// first, ignoring accents and case (`"Émile"` sorts between `"apple"` and
/// `"Zed"`). Then accents, unaccented first. Then case, lowercase first.
pub fn locale_compare(a: &str, b: &str) -> Ordering {
    folded(a, false)
        .cmp(folded(b, false))
        .then_with(|| folded(a, true).cmp(folded(b, true)))
        .then_with(|| b.nfd().cmp(a.nfd()))
}

fn folded(value: &str, keep_accents: bool) -> impl Iterator<Item = char> + '_ {
    value
        .nfd()
        .filter(move |c| keep_accents || !is_combining_mark(*c))
        .flat_map(char::to_lowercase)
}

#[cfg(test)]
#[path = "tests/normalize_tests.rs"]
mod tests;
