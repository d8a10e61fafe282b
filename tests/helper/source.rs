//! Manifest source with scripted responses

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use tokio::sync::Semaphore;

use panel_update_check::update::error::FetchError;
use panel_update_check::update::manifest::{Manifest, ManifestSource};

pub struct ScriptedSource {
    response: Mutex<Result<Manifest, FetchError>>,
    fetches: AtomicUsize,
    gate: Mutex<Option<Arc<Semaphore>>>,
}

impl ScriptedSource {
    fn with_response(response: Result<Manifest, FetchError>) -> Arc<Self> {
        Arc::new(Self {
            response: Mutex::new(response),
            fetches: AtomicUsize::new(0),
            gate: Mutex::new(None),
        })
    }

    pub fn version(version: &str) -> Arc<Self> {
        Self::with_response(Ok(Manifest::new(version)))
    }

    pub fn failing(error: FetchError) -> Arc<Self> {
        Self::with_response(Err(error))
    }

    pub fn set_version(&self, version: &str) {
        *self.response.lock().unwrap() = Ok(Manifest::new(version));
    }

    pub fn set_error(&self, error: FetchError) {
        *self.response.lock().unwrap() = Err(error);
    }

    /// Number of fetches started so far
    pub fn fetch_count(&self) -> usize {
        self.fetches.load(Ordering::SeqCst)
    }

    /// Make later fetches wait until a permit is added to the returned gate
    pub fn hold(&self) -> Arc<Semaphore> {
        let gate = Arc::new(Semaphore::new(0));
        *self.gate.lock().unwrap() = Some(gate.clone());
        gate
    }
}

#[async_trait]
impl ManifestSource for ScriptedSource {
    async fn fetch_manifest(&self) -> Result<Manifest, FetchError> {
        self.fetches.fetch_add(1, Ordering::SeqCst);

        let gate = self.gate.lock().unwrap().clone();
        if let Some(gate) = gate {
            gate.acquire().await.unwrap().forget();
        }

        self.response.lock().unwrap().clone()
    }
}
