// Copyright 2026 Phillip Cloud
// Licensed under the Apache License, Version 2.0

use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::fmt;
use time::format_description::well_known::Rfc3339;
use time::macros::format_description;
use time::{Date, OffsetDateTime, Time};

use crate::{FieldValue, Record};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum KeyKind {
    Text,
    Number,
    Date,
}

/// Comparable value extracted from a record by a column accessor. Text keys
/// keep their original case and compare case-insensitively.
#[derive(Debug, Clone, PartialEq)]
pub enum SortKey {
    Text(String),
    Number(f64),
    Date(OffsetDateTime),
}

impl SortKey {
    pub fn text(value: &str) -> Self {
        Self::Text(value.to_owned())
    }

    pub fn display(&self) -> String {
        match self {
            Self::Text(value) => value.clone(),
            Self::Number(value) => value.to_string(),
            Self::Date(value) => format_date(*value),
        }
    }

    pub fn cmp_key(&self, other: &Self) -> Ordering {
        match (self, other) {
            (Self::Text(left), Self::Text(right)) => left
                .chars()
                .flat_map(char::to_lowercase)
                .cmp(right.chars().flat_map(char::to_lowercase)),
            (Self::Number(left), Self::Number(right)) => left.total_cmp(right),
            (Self::Date(left), Self::Date(right)) => left.cmp(right),
            _ => self.rank().cmp(&other.rank()),
        }
    }

    /// Mixed kinds order numbers before dates before text.
    const fn rank(&self) -> u8 {
        match self {
            Self::Number(_) => 0,
            Self::Date(_) => 1,
            Self::Text(_) => 2,
        }
    }
}

#[derive(Clone)]
pub enum Accessor {
    Field { name: String, kind: KeyKind },
    Computed(fn(&Record) -> SortKey),
}

impl fmt::Debug for Accessor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Field { name, kind } => f
                .debug_struct("Field")
                .field("name", name)
                .field("kind", kind)
                .finish(),
            Self::Computed(_) => f.write_str("Computed(..)"),
        }
    }
}

#[derive(Debug, Clone)]
pub struct ColumnSpec {
    pub label: String,
    pub accessor: Accessor,
    pub searchable: bool,
}

impl ColumnSpec {
    pub fn text(label: &str, field: &str) -> Self {
        Self::field(label, field, KeyKind::Text, true)
    }

    pub fn number(label: &str, field: &str) -> Self {
        Self::field(label, field, KeyKind::Number, false)
    }

    pub fn date(label: &str, field: &str) -> Self {
        Self::field(label, field, KeyKind::Date, false)
    }

    pub fn computed(label: &str, accessor: fn(&Record) -> SortKey) -> Self {
        Self {
            label: label.to_owned(),
            accessor: Accessor::Computed(accessor),
            searchable: false,
        }
    }

    pub fn searchable(mut self, searchable: bool) -> Self {
        self.searchable = searchable;
        self
    }

    fn field(label: &str, field: &str, kind: KeyKind, searchable: bool) -> Self {
        Self {
            label: label.to_owned(),
            accessor: Accessor::Field {
                name: field.to_owned(),
                kind,
            },
            searchable,
        }
    }

    pub fn key(&self, record: &Record) -> SortKey {
        match &self.accessor {
            Accessor::Field { name, kind } => key_for_value(record.get(name), *kind),
            Accessor::Computed(accessor) => accessor(record),
        }
    }

    /// Text shown in the table cell for this column.
    pub fn cell_text(&self, record: &Record) -> String {
        match &self.accessor {
            Accessor::Field { name, kind } => match (record.get(name), kind) {
                (None, _) | (Some(FieldValue::Null), _) => String::new(),
                (Some(value), KeyKind::Date) => match key_for_value(Some(value), KeyKind::Date) {
                    SortKey::Date(at) if at != OffsetDateTime::UNIX_EPOCH => format_date(at),
                    _ => value.display(),
                },
                (Some(value), _) => value.display(),
            },
            Accessor::Computed(accessor) => accessor(record).display(),
        }
    }

    /// Raw (not case-folded) text searched when search is scoped to the
    /// searchable columns.
    pub fn search_text(&self, record: &Record) -> String {
        match &self.accessor {
            Accessor::Field { name, .. } => record
                .get(name)
                .map(FieldValue::display)
                .unwrap_or_default(),
            Accessor::Computed(accessor) => accessor(record).display(),
        }
    }
}

/// Missing values key as "" / 0 / the epoch so comparisons never fail.
pub fn key_for_value(value: Option<&FieldValue>, kind: KeyKind) -> SortKey {
    match kind {
        KeyKind::Text => SortKey::text(&value.map(FieldValue::display).unwrap_or_default()),
        KeyKind::Number => SortKey::Number(match value {
            Some(FieldValue::Number(number)) => *number,
            Some(FieldValue::Text(text)) => text.trim().parse().unwrap_or(0.0),
            Some(FieldValue::Bool(flag)) => f64::from(u8::from(*flag)),
            Some(FieldValue::Date(at)) => at.unix_timestamp() as f64,
            Some(FieldValue::Null) | None => 0.0,
        }),
        KeyKind::Date => SortKey::Date(match value {
            Some(FieldValue::Date(at)) => *at,
            Some(FieldValue::Text(text)) => {
                parse_timestamp(text).unwrap_or(OffsetDateTime::UNIX_EPOCH)
            }
            Some(FieldValue::Number(millis)) => from_unix_millis(*millis),
            Some(FieldValue::Bool(_) | FieldValue::Null) | None => OffsetDateTime::UNIX_EPOCH,
        }),
    }
}

/// Accepts RFC 3339 timestamps and bare `YYYY-MM-DD` dates (taken as UTC
/// midnight).
pub fn parse_timestamp(raw: &str) -> Option<OffsetDateTime> {
    let raw = raw.trim();
    if let Ok(at) = OffsetDateTime::parse(raw, &Rfc3339) {
        return Some(at);
    }
    Date::parse(raw, format_description!("[year]-[month]-[day]"))
        .ok()
        .map(|date| date.with_time(Time::MIDNIGHT).assume_utc())
}

fn from_unix_millis(millis: f64) -> OffsetDateTime {
    if !millis.is_finite() {
        return OffsetDateTime::UNIX_EPOCH;
    }
    (millis as i128)
        .checked_mul(1_000_000)
        .and_then(|nanos| OffsetDateTime::from_unix_timestamp_nanos(nanos).ok())
        .unwrap_or(OffsetDateTime::UNIX_EPOCH)
}

fn format_date(at: OffsetDateTime) -> String {
    at.date().to_string()
}

#[cfg(test)]
mod tests {
    use super::{ColumnSpec, KeyKind, SortKey, key_for_value, parse_timestamp};
    use crate::{FieldValue, Record};
    use std::cmp::Ordering;
    use time::macros::datetime;

    #[test]
    fn text_keys_compare_case_insensitively() {
        let left = SortKey::text("alice");
        let right = SortKey::text("Bob");
        assert_eq!(left.cmp_key(&right), Ordering::Less);
        assert_eq!(SortKey::text("CARA").cmp_key(&SortKey::text("cara")), Ordering::Equal);
    }

    #[test]
    fn number_keys_compare_numerically() {
        assert_eq!(
            SortKey::Number(9.0).cmp_key(&SortKey::Number(10.0)),
            Ordering::Less
        );
    }

    #[test]
    fn missing_values_key_as_empty_or_zero() {
        assert_eq!(key_for_value(None, KeyKind::Text), SortKey::Text(String::new()));
        assert_eq!(key_for_value(None, KeyKind::Number), SortKey::Number(0.0));
        assert_eq!(
            key_for_value(Some(&FieldValue::Null), KeyKind::Date),
            SortKey::Date(time::OffsetDateTime::UNIX_EPOCH)
        );
    }

    #[test]
    fn mixed_key_kinds_order_by_kind() {
        let number = SortKey::Number(10.0);
        let text = SortKey::text("10");
        let date = SortKey::Date(time::OffsetDateTime::UNIX_EPOCH);
        assert_eq!(number.cmp_key(&text), Ordering::Less);
        assert_eq!(text.cmp_key(&number), Ordering::Greater);
        assert_eq!(number.cmp_key(&date), Ordering::Less);
        assert_eq!(date.cmp_key(&text), Ordering::Less);
        assert_eq!(
            SortKey::Number(2.0).cmp_key(&SortKey::text("10")),
            Ordering::Less
        );
    }

    #[test]
    fn out_of_range_epoch_millis_fall_back_to_epoch() {
        for millis in [1e33, -1e33, f64::MAX, f64::NAN] {
            assert_eq!(
                key_for_value(Some(&FieldValue::Number(millis)), KeyKind::Date),
                SortKey::Date(time::OffsetDateTime::UNIX_EPOCH),
                "{millis}"
            );
        }
        assert_eq!(
            key_for_value(Some(&FieldValue::Number(86_400_000.0)), KeyKind::Date),
            SortKey::Date(datetime!(1970-01-02 0:00 UTC))
        );
    }

    #[test]
    fn huge_numeric_dates_render_without_panicking() {
        let column = ColumnSpec::date("Placed", "createdAt");
        let record = Record::new("o1").with_field("createdAt", 1e33);
        assert_eq!(column.cell_text(&record), FieldValue::Number(1e33).display());
        assert_eq!(
            column.key(&record),
            SortKey::Date(time::OffsetDateTime::UNIX_EPOCH)
        );
    }

    #[test]
    fn numeric_text_is_accepted_for_number_columns() {
        let value = FieldValue::Text(" 120.50 ".to_owned());
        assert_eq!(
            key_for_value(Some(&value), KeyKind::Number),
            SortKey::Number(120.5)
        );
        let junk = FieldValue::Text("n/a".to_owned());
        assert_eq!(key_for_value(Some(&junk), KeyKind::Number), SortKey::Number(0.0));
    }

    #[test]
    fn parse_timestamp_accepts_rfc3339_and_plain_dates() {
        assert_eq!(
            parse_timestamp("2026-02-19T12:34:56Z"),
            Some(datetime!(2026-02-19 12:34:56 UTC))
        );
        assert_eq!(
            parse_timestamp("2026-02-19"),
            Some(datetime!(2026-02-19 0:00 UTC))
        );
        assert_eq!(parse_timestamp("yesterday"), None);
    }

    #[test]
    fn date_cells_render_calendar_day() {
        let column = ColumnSpec::date("Joined", "createdAt");
        let record = Record::new("u1").with_field("createdAt", "2026-03-01T08:00:00Z");
        assert_eq!(column.cell_text(&record), "2026-03-01");
        assert_eq!(column.cell_text(&Record::new("u2")), "");
    }

    #[test]
    fn computed_columns_use_their_accessor() {
        fn name_length(record: &Record) -> SortKey {
            let len = record
                .get("name")
                .map(|value| value.display().len())
                .unwrap_or_default();
            SortKey::Number(len as f64)
        }

        let column = ColumnSpec::computed("Len", name_length);
        let record = Record::new("u1").with_field("name", "Rose Quartz");
        assert_eq!(column.key(&record), SortKey::Number(11.0));
        assert_eq!(column.cell_text(&record), "11");
    }
}
