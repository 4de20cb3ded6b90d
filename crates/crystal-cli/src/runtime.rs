// Copyright 2026 Phillip Cloud
// Licensed under the Apache License, Version 2.0

use anyhow::{Context, Result};
use crystal_app::{DeleteAck, Record, RecordId, RecordStore, Screen, StoreError};
use crystal_testkit::MemoryStore;
use crystal_tui::{AdminRuntime, InternalEvent};
use std::collections::BTreeMap;
use std::sync::mpsc::Sender;
use std::thread;
use tracing::debug;

/// Talks to the storefront API. Loads and deletes run on worker threads so
/// the console keeps drawing while a request is in flight.
pub struct HttpRuntime {
    client: crystal_api::Client,
}

impl HttpRuntime {
    pub fn new(client: crystal_api::Client) -> Self {
        Self { client }
    }
}

impl AdminRuntime for HttpRuntime {
    fn list_records(&mut self, screen: Screen) -> Result<Vec<Record>, StoreError> {
        self.client.list_records(screen.collection())
    }

    fn delete_record(&mut self, screen: Screen, id: &RecordId) -> Result<DeleteAck, StoreError> {
        self.client.delete_record(screen.collection(), id)
    }

    fn spawn_load(
        &mut self,
        request_id: u64,
        screen: Screen,
        tx: Sender<InternalEvent>,
    ) -> Result<()> {
        let client = self.client.clone();
        thread::Builder::new()
            .name(format!("load-{}", screen.collection()))
            .spawn(move || {
                let result = client.list_records(screen.collection());
                if tx
                    .send(InternalEvent::Loaded {
                        request_id,
                        screen,
                        result,
                    })
                    .is_err()
                {
                    debug!(request_id, "console closed before load finished");
                }
            })
            .context("spawn load worker")?;
        Ok(())
    }

    fn spawn_delete(
        &mut self,
        request_id: u64,
        screen: Screen,
        id: RecordId,
        tx: Sender<InternalEvent>,
    ) -> Result<()> {
        let client = self.client.clone();
        thread::Builder::new()
            .name(format!("delete-{}", screen.collection()))
            .spawn(move || {
                let result = client.delete_record(screen.collection(), &id);
                if tx
                    .send(InternalEvent::Deleted {
                        request_id,
                        screen,
                        id,
                        result,
                    })
                    .is_err()
                {
                    debug!(request_id, "console closed before delete finished");
                }
            })
            .context("spawn delete worker")?;
        Ok(())
    }
}

/// Seeded in-memory collections for `--demo`.
pub struct DemoRuntime {
    stores: BTreeMap<Screen, MemoryStore>,
}

impl Default for DemoRuntime {
    fn default() -> Self {
        let stores = Screen::ALL
            .into_iter()
            .map(|screen| (screen, MemoryStore::demo(screen)))
            .collect();
        Self { stores }
    }
}

impl DemoRuntime {
    fn store(&mut self, screen: Screen) -> &mut MemoryStore {
        self.stores
            .entry(screen)
            .or_insert_with(|| MemoryStore::demo(screen))
    }
}

impl AdminRuntime for DemoRuntime {
    fn list_records(&mut self, screen: Screen) -> Result<Vec<Record>, StoreError> {
        self.store(screen).list_records()
    }

    fn delete_record(&mut self, screen: Screen, id: &RecordId) -> Result<DeleteAck, StoreError> {
        self.store(screen).delete_record(id)
    }
}
