use std::fmt;
use std::path::Path;

/// Time-partitioning granularity inferred from a file name.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Partition {
    Day,
    Month,
    Na,
}

impl Partition {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Day => "DAY",
            Self::Month => "MONTH",
            Self::Na => "NA",
        }
    }
}

/// A date substring recognized inside a file stem.
///
/// `raw_len` is the length of the matched text (separators included) so the
/// token can be cut out of the stem; `digits` holds the separator-free form.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DateToken {
    pub raw_len: usize,
    pub digits: String,
}

impl DateToken {
    fn from_raw(raw: &str) -> Self {
        Self {
            raw_len: raw.len(),
            digits: raw.chars().filter(|c| *c != '-').collect(),
        }
    }

    pub fn partition(&self) -> Partition {
        match self.digits.len() {
            8 => Partition::Day,
            6 => Partition::Month,
            _ => Partition::Na,
        }
    }

    /// The token normalized to day granularity: month-only tokens are padded
    /// with `01` so they compare against `YYYYMMDD` run dates.
    pub fn day_key(&self) -> String {
        if self.digits.len() == 6 {
            format!("{}01", self.digits)
        } else {
            self.digits.clone()
        }
    }
}

/// Match a date token anchored at the start of `text`.
///
/// The four format variants are tried in priority order at the same position;
/// the first that matches wins. No boundary check follows the token, so an
/// 8-digit prefix of a longer digit run still matches.
pub fn match_date_token(text: &str) -> Option<DateToken> {
    let bytes = text.as_bytes();
    let digit = |index: usize| bytes.get(index).is_some_and(u8::is_ascii_digit);
    let hyphen = |index: usize| bytes.get(index) == Some(&b'-');
    let digit_run = |start: usize, count: usize| (0..count).all(|offset| digit(start + offset));

    // YYYY-MM-DD
    if digit_run(0, 4) && hyphen(4) && digit_run(5, 2) && hyphen(7) && digit_run(8, 2) {
        return Some(DateToken::from_raw(&text[..10]));
    }
    // YYYYMMDD
    if digit_run(0, 8) {
        return Some(DateToken::from_raw(&text[..8]));
    }
    // YYYY-MM
    if digit_run(0, 4) && hyphen(4) && digit_run(5, 2) {
        return Some(DateToken::from_raw(&text[..7]));
    }
    // YYYYMM
    if digit_run(0, 6) {
        return Some(DateToken::from_raw(&text[..6]));
    }
    None
}

/// Find the first date token in `text`, scanning left to right.
///
/// Earliest position wins; at the same position the format variants keep
/// their priority order.
pub fn find_date_token(text: &str) -> Option<DateToken> {
    let mut rest = text;
    loop {
        if let Some(token) = match_date_token(rest) {
            return Some(token);
        }
        match rest.chars().next() {
            Some(first) => rest = &rest[first.len_utf8()..],
            None => return None,
        }
    }
}

/// Final path component of an object name with its extension stripped.
pub fn stem(object_name: &str) -> String {
    Path::new(object_name)
        .file_stem()
        .map(|value| value.to_string_lossy().into_owned())
        .unwrap_or_default()
}

/// Remove every date-token occurrence from `text`, scanning left to right.
pub fn strip_date_tokens(text: &str) -> String {
    let mut output = String::with_capacity(text.len());
    let mut rest = text;
    while !rest.is_empty() {
        if let Some(token) = match_date_token(rest) {
            rest = &rest[token.raw_len..];
            continue;
        }
        match rest.chars().next() {
            Some(first) => {
                output.push(first);
                rest = &rest[first.len_utf8()..];
            }
            None => break,
        }
    }
    output
}

/// Fully qualified table identity plus inferred partition scheme.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TableTarget {
    pub table_id: String,
    pub partition: Partition,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NamingError {
    /// The whole stem was date tokens, whitespace, and separators; deriving a
    /// table name from it would produce a malformed `project.dataset.`
    /// identifier.
    EmptyTableName { object_name: String },
}

impl fmt::Display for NamingError {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::EmptyTableName { object_name } => write!(
                formatter,
                "object name {object_name:?} normalizes to an empty table name"
            ),
        }
    }
}

impl std::error::Error for NamingError {}

/// Derive the target table identity and partition scheme for an object name.
///
/// Pure and idempotent: the same name always yields the same target,
/// regardless of invocation context. The short name is the stem with every
/// date token removed, whitespace runs joined with underscores, dangling
/// separators trimmed, and the result lower-cased.
pub fn derive_table_target(
    object_name: &str,
    project: &str,
    dataset: &str,
) -> Result<TableTarget, NamingError> {
    let stem = stem(object_name);
    let partition = find_date_token(&stem)
        .map(|token| token.partition())
        .unwrap_or(Partition::Na);

    let without_dates = strip_date_tokens(&stem);
    let short_name = without_dates
        .split_whitespace()
        .collect::<Vec<_>>()
        .join("_")
        .trim_matches(|c| c == '-' || c == '_')
        .to_lowercase();

    if short_name.is_empty() {
        return Err(NamingError::EmptyTableName {
            object_name: object_name.to_string(),
        });
    }

    Ok(TableTarget {
        table_id: format!("{project}.{dataset}.{short_name}"),
        partition,
    })
}

/// The 8-digit date key used by the scheduled uploader to decide whether an
/// object belongs to the current run. `None` when the stem carries no date
/// token, in which case the object never matches a run date.
pub fn run_date_key(object_name: &str) -> Option<String> {
    find_date_token(&stem(object_name)).map(|token| token.day_key())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn derive(name: &str) -> TableTarget {
        derive_table_target(name, "proj", "ds").expect("derivation should succeed")
    }

    #[test]
    fn embedded_day_token_yields_day_partition() {
        let target = derive("report-2024-03-01.csv");
        assert_eq!(target.table_id, "proj.ds.report");
        assert_eq!(target.partition, Partition::Day);
    }

    #[test]
    fn embedded_month_token_yields_month_partition() {
        let target = derive("monthly_summary_202403.csv");
        assert_eq!(target.table_id, "proj.ds.monthly_summary");
        assert_eq!(target.partition, Partition::Month);
    }

    #[test]
    fn stem_without_token_passes_through_lowercased() {
        let target = derive("Static_Data.csv");
        assert_eq!(target.table_id, "proj.ds.static_data");
        assert_eq!(target.partition, Partition::Na);
    }

    #[test]
    fn leading_day_token_names_the_remainder() {
        let target = derive("2024-03-01 Quarterly Revenue.csv");
        assert_eq!(target.table_id, "proj.ds.quarterly_revenue");
        assert_eq!(target.partition, Partition::Day);
    }

    #[test]
    fn derivation_is_idempotent() {
        let first = derive("2024-03-01 Quarterly Revenue.csv");
        let second = derive("2024-03-01 Quarterly Revenue.csv");
        assert_eq!(first, second);
    }

    #[test]
    fn directory_components_are_ignored() {
        let target = derive("reports/inbound/2024-03-01 revenue.csv");
        assert_eq!(target.table_id, "proj.ds.revenue");
        assert_eq!(target.partition, Partition::Day);
    }

    #[test]
    fn removal_sweep_strips_every_token() {
        let target = derive("2024-03-01 sales 202402.csv");
        assert_eq!(target.table_id, "proj.ds.sales");
        assert_eq!(target.partition, Partition::Day);
    }

    #[test]
    fn all_date_stem_is_rejected() {
        let error = derive_table_target("20240301.csv", "proj", "ds")
            .expect_err("date-only stem should be rejected");
        assert_eq!(
            error,
            NamingError::EmptyTableName {
                object_name: "20240301.csv".to_string()
            }
        );
    }

    #[test]
    fn variant_priority_prefers_full_day_over_month() {
        let token = match_date_token("2024-03-01").expect("token should match");
        assert_eq!(token.raw_len, 10);
        assert_eq!(token.digits, "20240301");
        assert_eq!(token.partition(), Partition::Day);
    }

    #[test]
    fn hyphenated_month_matches_when_day_segment_is_absent() {
        let token = match_date_token("2024-03 report").expect("token should match");
        assert_eq!(token.raw_len, 7);
        assert_eq!(token.digits, "202403");
        assert_eq!(token.partition(), Partition::Month);
    }

    #[test]
    fn eight_digit_prefix_of_longer_run_still_matches() {
        let token = match_date_token("123456789").expect("token should match");
        assert_eq!(token.digits, "12345678");
        assert_eq!(token.partition(), Partition::Day);
    }

    #[test]
    fn anchored_match_rejects_non_date_prefixes() {
        assert!(match_date_token("report-2024").is_none());
        assert!(match_date_token("12345").is_none());
        assert!(match_date_token("").is_none());
    }

    #[test]
    fn search_finds_earliest_token() {
        let token = find_date_token("jan-2024-03 then 2023-01-01").expect("token should match");
        assert_eq!(token.digits, "202403");
    }

    #[test]
    fn run_date_key_pads_month_tokens_to_day() {
        assert_eq!(
            run_date_key("202403_report.csv"),
            Some("20240301".to_string())
        );
        assert_eq!(
            run_date_key("report 2024-03-15.csv"),
            Some("20240315".to_string())
        );
        assert_eq!(run_date_key("static_data.csv"), None);
    }
}
