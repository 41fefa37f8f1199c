use crate::backend::Backend;
use crate::errors::Result;
use once_cell::sync::Lazy;
use std::{
    collections::HashMap,
    future::Future,
    pin::Pin,
    sync::{Arc, RwLock},
};

pub type BoxedBackendFuture = Pin<Box<dyn Future<Output = Result<Box<dyn Backend>>> + Send>>;
pub type BackendConstructor = Arc<dyn Fn() -> BoxedBackendFuture + Send + Sync>;

static BACKEND_REGISTRY: Lazy<RwLock<HashMap<String, BackendConstructor>>> = Lazy::new(|| {
    let mut registry: HashMap<String, BackendConstructor> = HashMap::new();
    registry.insert("cms".to_string(), Arc::new(build_cms_backend));
    registry.insert("memory".to_string(), Arc::new(build_memory_backend));
    RwLock::new(registry)
});

fn build_cms_backend() -> BoxedBackendFuture {
    Box::pin(async {
        crate::backend::cms::CmsBackend::from_config().map(|b| Box::new(b) as Box<dyn Backend>)
    })
}

fn build_memory_backend() -> BoxedBackendFuture {
    Box::pin(async {
        crate::backend::memory::MemoryBackend::from_config()
            .map(|b| Box::new(b) as Box<dyn Backend>)
    })
}

pub fn register_backend_plugin<S: Into<String>>(name: S, constructor: BackendConstructor) {
    let name = name.into();
    let mut registry = BACKEND_REGISTRY
        .write()
        .expect("Backend registry lock poisoned");
    registry.insert(name, constructor);
}

pub fn get_backend_plugin(name: &str) -> Option<BackendConstructor> {
    BACKEND_REGISTRY
        .read()
        .expect("Backend registry lock poisoned")
        .get(name)
        .cloned()
}

pub fn debug_backend_registry() {
    let registry = BACKEND_REGISTRY
        .read()
        .expect("Backend registry lock poisoned");
    if registry.is_empty() {
        tracing::debug!("No backend plugins registered.");
    } else {
        tracing::debug!("Registered backend plugins:");
        for key in registry.keys() {
            tracing::debug!(" - {}", key);
        }
    }
}
