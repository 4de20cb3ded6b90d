// Copyright 2026 Phillip Cloud
// Licensed under the Apache License, Version 2.0

use anyhow::{Context, Result};
use crystal_app::{DeleteAck, Record, RecordId, RecordStore, Screen, StoreError};
use std::collections::BTreeSet;
use std::path::PathBuf;
use time::{Date, Duration, Month, OffsetDateTime, Time};

const REFERENCE_YEAR: i32 = 2026;

const FIRST_NAMES: [&str; 16] = [
    "Avery", "Jordan", "Taylor", "Riley", "Morgan", "Casey", "Alex", "Quinn", "Parker", "Drew",
    "Kai", "Elliot", "Robin", "Cameron", "Hayden", "Rowan",
];
const LAST_NAMES: [&str; 18] = [
    "Walker", "Martin", "Hill", "Evans", "Lopez", "Gray", "Ward", "Young", "Diaz", "Reed",
    "Campbell", "Turner", "Flores", "Bennett", "Price", "Morris", "Foster", "Brooks",
];
const EMAIL_DOMAINS: [&str; 5] = [
    "example.com",
    "crystalshop.test",
    "mail.local",
    "gemtrade.io",
    "retail.org",
];
const ROLES: [&str; 3] = ["customer", "wholesale", "admin"];

const CATEGORIES: [(&str, &str); 12] = [
    ("Amethyst", "Purple quartz clusters and points"),
    ("Rose Quartz", "Tumbled stones and carved hearts"),
    ("Clear Quartz", "Generators, towers and raw points"),
    ("Citrine", "Heat-treated and natural citrine"),
    ("Geodes", "Cracked and whole geodes"),
    ("Agate", "Slices, bookends and coasters"),
    ("Obsidian", "Black and rainbow obsidian"),
    ("Tourmaline", "Black tourmaline and watermelon slices"),
    ("Selenite", "Wands, lamps and charging plates"),
    ("Labradorite", "Freeforms and palm stones"),
    ("Fluorite", "Rainbow fluorite towers"),
    ("Jewelry", "Pendants, bracelets and rings"),
];
const ORDER_STATUSES: [&str; 5] = ["pending", "paid", "shipped", "delivered", "cancelled"];

#[derive(Debug, Clone)]
struct DeterministicRng {
    state: u64,
}

impl DeterministicRng {
    fn new(seed: u64) -> Self {
        let mut state = seed ^ 0x9E37_79B9_7F4A_7C15;
        if state == 0 {
            state = 0xA409_3822_299F_31D0;
        }
        Self { state }
    }

    fn next_u64(&mut self) -> u64 {
        self.state = self
            .state
            .wrapping_mul(6_364_136_223_846_793_005)
            .wrapping_add(1_442_695_040_888_963_407);

        let mut x = self.state;
        x ^= x >> 13;
        x ^= x << 7;
        x ^= x >> 17;
        x
    }

    fn int_n(&mut self, n: usize) -> usize {
        if n <= 1 {
            return 0;
        }
        (self.next_u64() % (n as u64)) as usize
    }
}

/// Seeded generator for storefront documents shaped the way the backend
/// returns them (camelCase keys, `_id`, RFC 3339 timestamps as text).
#[derive(Debug, Clone)]
pub struct StoreFaker {
    rng: DeterministicRng,
    next_serial: u64,
}

impl StoreFaker {
    pub fn new(seed: u64) -> Self {
        let normalized = if seed == 0 { 1 } else { seed };
        Self {
            rng: DeterministicRng::new(normalized),
            next_serial: 1,
        }
    }

    pub fn user(&mut self) -> Record {
        let first = self.pick(&FIRST_NAMES);
        let last = self.pick(&LAST_NAMES);
        let domain = self.pick(&EMAIL_DOMAINS);
        let id = self.serial_id("u");
        let joined = self.datetime_in_year(REFERENCE_YEAR - 1);
        Record::new(id.clone())
            .with_field("_id", id)
            .with_field("name", format!("{first} {last}"))
            .with_field(
                "email",
                format!(
                    "{}.{}@{domain}",
                    first.to_ascii_lowercase(),
                    last.to_ascii_lowercase()
                ),
            )
            .with_field(
                "phone",
                format!(
                    "+1 {:03}-{:03}-{:04}",
                    self.int_range(200, 999),
                    self.int_range(200, 999),
                    self.int_range(0, 9_999),
                ),
            )
            .with_field("role", self.pick(&ROLES))
            .with_field("createdAt", rfc3339(joined))
    }

    pub fn category(&mut self) -> Record {
        let (name, description) = CATEGORIES[self.rng.int_n(CATEGORIES.len())];
        self.category_named(name, description)
    }

    pub fn category_named(&mut self, name: &str, description: &str) -> Record {
        let id = self.serial_id("c");
        let created = self.datetime_in_year(REFERENCE_YEAR - 2);
        Record::new(id.clone())
            .with_field("_id", id)
            .with_field("name", name)
            .with_field("description", description)
            .with_field("productCount", self.int_range(0, 120))
            .with_field("createdAt", rfc3339(created))
    }

    pub fn order(&mut self) -> Record {
        let first = self.pick(&FIRST_NAMES);
        let last = self.pick(&LAST_NAMES);
        let id = self.serial_id("o");
        let placed = self.datetime_in_year(REFERENCE_YEAR);
        let cents = self.int_range(1_500, 250_000);
        Record::new(id.clone())
            .with_field("_id", id)
            .with_field("orderNumber", format!("CW-{:05}", self.int_range(1, 99_999)))
            .with_field("customerName", format!("{first} {last}"))
            .with_field(
                "customerEmail",
                format!("{}@example.com", first.to_ascii_lowercase()),
            )
            .with_field("totalAmount", cents as f64 / 100.0)
            .with_field("status", self.pick(&ORDER_STATUSES))
            .with_field("createdAt", rfc3339(placed))
    }

    pub fn records_for(&mut self, screen: Screen, count: usize) -> Vec<Record> {
        match screen {
            Screen::Users => (0..count).map(|_| self.user()).collect(),
            Screen::Categories => {
                let named = CATEGORIES
                    .iter()
                    .take(count)
                    .map(|(name, description)| self.category_named(name, description))
                    .collect::<Vec<_>>();
                let extra = count.saturating_sub(named.len());
                named
                    .into_iter()
                    .chain((0..extra).map(|_| self.category()))
                    .collect()
            }
            Screen::Orders => (0..count).map(|_| self.order()).collect(),
        }
    }

    fn serial_id(&mut self, prefix: &str) -> String {
        let id = format!("{prefix}{}", self.next_serial);
        self.next_serial += 1;
        id
    }

    fn pick<'a>(&mut self, items: &'a [&'a str]) -> &'a str {
        items[self.rng.int_n(items.len())]
    }

    fn int_range(&mut self, min: i64, max: i64) -> i64 {
        if max <= min {
            return min;
        }
        let span = max - min + 1;
        min + (self.rng.next_u64() % (span as u64)) as i64
    }

    fn datetime_in_year(&mut self, year: i32) -> OffsetDateTime {
        let start = midnight_utc(year, Month::January, 1);
        let offset = self.int_range(0, 364 * 86_400);
        start + Duration::seconds(offset)
    }
}

/// Record counts used by `--demo`.
pub fn demo_records(screen: Screen) -> Vec<Record> {
    let mut faker = StoreFaker::new(7);
    let count = match screen {
        Screen::Users => 42,
        Screen::Categories => 12,
        Screen::Orders => 67,
    };
    faker.records_for(screen, count)
}

/// The three-person set used by the sort/search scenarios.
pub fn people() -> Vec<Record> {
    vec![
        Record::new("u1").with_field("name", "Bob").with_field("age", 30_i64),
        Record::new("u2").with_field("name", "alice").with_field("age", 25_i64),
        Record::new("u3").with_field("name", "Cara").with_field("age", 25_i64),
    ]
}

/// In-memory stand-in for one REST collection, with scripted failures.
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    records: Vec<Record>,
    fail_list: Option<StoreError>,
    fail_deletes: BTreeSet<RecordId>,
    reject_deletes: BTreeSet<RecordId>,
    pub list_calls: usize,
    pub delete_calls: Vec<RecordId>,
}

impl MemoryStore {
    pub fn new(records: Vec<Record>) -> Self {
        Self {
            records,
            ..Self::default()
        }
    }

    pub fn demo(screen: Screen) -> Self {
        Self::new(demo_records(screen))
    }

    pub fn records(&self) -> &[Record] {
        &self.records
    }

    pub fn fail_list_with(&mut self, error: StoreError) {
        self.fail_list = Some(error);
    }

    pub fn clear_list_failure(&mut self) {
        self.fail_list = None;
    }

    /// Deletes of `id` fail as if the backend were unreachable.
    pub fn fail_delete_of(&mut self, id: impl Into<RecordId>) {
        self.fail_deletes.insert(id.into());
    }

    /// Deletes of `id` answer `success: false`.
    pub fn reject_delete_of(&mut self, id: impl Into<RecordId>) {
        self.reject_deletes.insert(id.into());
    }
}

impl RecordStore for MemoryStore {
    fn list_records(&mut self) -> Result<Vec<Record>, StoreError> {
        self.list_calls += 1;
        if let Some(error) = &self.fail_list {
            return Err(error.clone());
        }
        Ok(self.records.clone())
    }

    fn delete_record(&mut self, id: &RecordId) -> Result<DeleteAck, StoreError> {
        self.delete_calls.push(id.clone());
        if self.fail_deletes.contains(id) {
            return Err(StoreError::transport("memory://store", "connection reset"));
        }
        if self.reject_deletes.contains(id) {
            return Ok(DeleteAck {
                success: false,
                message: Some(format!("{id} is protected")),
            });
        }
        let before = self.records.len();
        self.records.retain(|record| record.id() != id);
        if self.records.len() == before {
            return Err(StoreError::server(Some(404), format!("{id} not found")));
        }
        Ok(DeleteAck::ok())
    }
}

pub fn temp_config_path() -> Result<(tempfile::TempDir, PathBuf)> {
    let dir = tempfile::tempdir().context("create temp dir")?;
    let path = dir.path().join("config.toml");
    Ok((dir, path))
}

fn rfc3339(at: OffsetDateTime) -> String {
    format!(
        "{:04}-{:02}-{:02}T{:02}:{:02}:{:02}Z",
        at.year(),
        u8::from(at.month()),
        at.day(),
        at.hour(),
        at.minute(),
        at.second()
    )
}

fn midnight_utc(year: i32, month: Month, day: u8) -> OffsetDateTime {
    let date = Date::from_calendar_date(year, month, day).unwrap_or(Date::MIN);
    date.with_time(Time::MIDNIGHT).assume_utc()
}

#[cfg(test)]
mod tests {
    use super::{MemoryStore, StoreFaker, demo_records, people};
    use crystal_app::{RecordId, RecordStore, Screen, StoreError};

    #[test]
    fn new_deterministic_seed() {
        let mut left = StoreFaker::new(42);
        let mut right = StoreFaker::new(42);
        assert_eq!(left.user(), right.user());
        assert_eq!(left.order(), right.order());
    }

    #[test]
    fn generated_ids_are_unique() {
        let mut faker = StoreFaker::new(3);
        let records = faker.records_for(Screen::Orders, 50);
        let mut ids: Vec<&str> = records.iter().map(|record| record.id().as_str()).collect();
        ids.sort_unstable();
        ids.dedup();
        assert_eq!(ids.len(), 50);
    }

    #[test]
    fn categories_prefer_named_catalog() {
        let mut faker = StoreFaker::new(5);
        let records = faker.records_for(Screen::Categories, 3);
        let names: Vec<String> = records
            .iter()
            .filter_map(|record| record.get("name"))
            .map(|value| value.display())
            .collect();
        assert_eq!(names, vec!["Amethyst", "Rose Quartz", "Clear Quartz"]);
    }

    #[test]
    fn demo_records_cover_every_screen() {
        for screen in Screen::ALL {
            assert!(!demo_records(screen).is_empty(), "{}", screen.label());
        }
    }

    #[test]
    fn memory_store_deletes_and_reports_missing() {
        let mut store = MemoryStore::new(people());
        let id = RecordId::from("u2");
        assert!(store.delete_record(&id).expect("first delete").success);
        assert_eq!(store.records().len(), 2);

        let error = store.delete_record(&id).expect_err("second delete");
        assert_eq!(error, StoreError::server(Some(404), "u2 not found"));
        assert_eq!(store.delete_calls.len(), 2);
    }

    #[test]
    fn memory_store_scripted_failures() {
        let mut store = MemoryStore::new(people());
        store.fail_list_with(StoreError::server(Some(503), "maintenance"));
        assert!(store.list_records().is_err());
        store.clear_list_failure();
        assert_eq!(store.list_records().expect("list").len(), 3);

        store.fail_delete_of("u1");
        store.reject_delete_of("u3");
        assert!(store.delete_record(&RecordId::from("u1")).is_err());
        let ack = store
            .delete_record(&RecordId::from("u3"))
            .expect("rejection is an ack");
        assert!(!ack.success);
        assert_eq!(store.records().len(), 3);
    }
}
