//! Lazily loaded, process-wide model reference.
//!
//! The cache is owned by the composition root and handed to the engine.
//! Callers take one `Arc` snapshot per forecast; [`ModelCache::invalidate`]
//! only drops the cached reference, so in-flight calls finish on the model
//! they captured and the next call loads a fresh one.

use crate::model::{ForecastModel, ModelStore};
use cvd_core::{ForecastError, Result};
use log::info;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, PoisonError, RwLock};

pub struct ModelCache {
    store: Box<dyn ModelStore>,
    current: RwLock<Option<Arc<dyn ForecastModel>>>,
    loads: AtomicU64,
}

impl ModelCache {
    pub fn new(store: Box<dyn ModelStore>) -> Self {
        Self {
            store,
            current: RwLock::new(None),
            loads: AtomicU64::new(0),
        }
    }

    /// The cached model, loading it from the store when empty.
    pub fn get_or_load(&self) -> Result<Arc<dyn ForecastModel>> {
        if let Some(model) = self.peek() {
            return Ok(model);
        }

        let mut slot = self.current.write().unwrap_or_else(PoisonError::into_inner);
        // another caller may have loaded while we waited for the lock
        if let Some(model) = slot.as_ref() {
            return Ok(Arc::clone(model));
        }
        let model = self
            .store
            .load()
            .map_err(|source| ForecastError::ModelLoad { source })?;
        let generation = self.loads.fetch_add(1, Ordering::SeqCst) + 1;
        info!(
            "[CVD] cache: loaded model '{}' (generation {})",
            model.name(),
            generation
        );
        *slot = Some(Arc::clone(&model));
        Ok(model)
    }

    /// The cached model, if one is loaded. Never touches the store.
    pub fn peek(&self) -> Option<Arc<dyn ForecastModel>> {
        self.current
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    /// Drop the cached model; the next `get_or_load` reloads it.
    pub fn invalidate(&self) {
        let previous = self
            .current
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .take();
        match previous {
            Some(model) => info!("[CVD] cache: discarded model '{}'", model.name()),
            None => info!("[CVD] cache: invalidated empty cache"),
        }
    }

    /// How many times the store has been asked for a model.
    pub fn load_count(&self) -> u64 {
        self.loads.load(Ordering::SeqCst)
    }
}
