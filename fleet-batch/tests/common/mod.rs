//! Shared capabilities and fixtures for fleet-batch integration tests.

#![allow(dead_code)]

use async_trait::async_trait;
use fleet_batch::{ActionError, BatchAction, ResourceActions, ResourceCollection};
use fleet_core::{FleetError, LifecycleState, ResourceRef};
use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tokio_util::sync::CancellationToken;

pub fn vm(id: &str, state: LifecycleState) -> ResourceRef {
    ResourceRef::new(id, id, state).with_provider("azure")
}

/// Records every call in order and fails the targets it was told to fail.
#[derive(Default)]
pub struct ScriptedActions {
    calls: Mutex<Vec<(BatchAction, String)>>,
    failures: HashMap<String, ActionError>,
    in_flight: AtomicUsize,
    max_in_flight: AtomicUsize,
    delay: Duration,
    trip: Mutex<Option<(String, CancellationToken)>>,
}

impl ScriptedActions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn failing(mut self, name: &str, error: ActionError) -> Self {
        self.failures.insert(name.to_string(), error);
        self
    }

    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = delay;
        self
    }

    /// Cancel `token` once `name` has been handled.
    pub fn cancel_after(&self, name: &str, token: CancellationToken) {
        *self.trip.lock().unwrap() = Some((name.to_string(), token));
    }

    pub fn calls(&self) -> Vec<(BatchAction, String)> {
        self.calls.lock().unwrap().clone()
    }

    pub fn called_names(&self) -> Vec<String> {
        self.calls().into_iter().map(|(_, name)| name).collect()
    }

    pub fn max_in_flight(&self) -> usize {
        self.max_in_flight.load(Ordering::SeqCst)
    }

    async fn handle(&self, action: BatchAction, target: &ResourceRef) -> Result<(), ActionError> {
        let now = self.in_flight.fetch_add(1, Ordering::SeqCst) + 1;
        self.max_in_flight.fetch_max(now, Ordering::SeqCst);

        if !self.delay.is_zero() {
            tokio::time::sleep(self.delay).await;
        }
        self.calls
            .lock()
            .unwrap()
            .push((action, target.name.clone()));

        self.in_flight.fetch_sub(1, Ordering::SeqCst);

        if let Some((name, token)) = self.trip.lock().unwrap().as_ref() {
            if *name == target.name {
                token.cancel();
            }
        }

        match self.failures.get(&target.name) {
            Some(error) => Err(error.clone()),
            None => Ok(()),
        }
    }
}

#[async_trait]
impl ResourceActions for ScriptedActions {
    async fn start(&self, target: &ResourceRef) -> Result<(), ActionError> {
        self.handle(BatchAction::Start, target).await
    }

    async fn stop(&self, target: &ResourceRef) -> Result<(), ActionError> {
        self.handle(BatchAction::Stop, target).await
    }

    async fn delete(&self, target: &ResourceRef) -> Result<(), ActionError> {
        self.handle(BatchAction::Delete, target).await
    }
}

/// Serves a fixed list and counts how often it was fetched.
pub struct CountingCollection {
    resources: Mutex<Vec<ResourceRef>>,
    fetches: AtomicUsize,
    fail: AtomicBool,
}

impl CountingCollection {
    pub fn new(resources: Vec<ResourceRef>) -> Arc<Self> {
        Arc::new(Self {
            resources: Mutex::new(resources),
            fetches: AtomicUsize::new(0),
            fail: AtomicBool::new(false),
        })
    }

    pub fn fetches(&self) -> usize {
        self.fetches.load(Ordering::SeqCst)
    }

    pub fn set_failing(&self, fail: bool) {
        self.fail.store(fail, Ordering::SeqCst);
    }

    pub fn replace(&self, resources: Vec<ResourceRef>) {
        *self.resources.lock().unwrap() = resources;
    }
}

#[async_trait]
impl ResourceCollection for CountingCollection {
    async fn refetch(&self) -> fleet_core::Result<Vec<ResourceRef>> {
        self.fetches.fetch_add(1, Ordering::SeqCst);
        if self.fail.load(Ordering::SeqCst) {
            return Err(FleetError::Provider("service unavailable".to_string()));
        }
        Ok(self.resources.lock().unwrap().clone())
    }
}
