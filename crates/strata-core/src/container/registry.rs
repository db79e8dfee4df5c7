use std::any::{Any, type_name};
use std::collections::HashMap;
use std::fmt;
use std::future::Future;
use std::pin::Pin;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, RwLock};

use tokio::sync::OnceCell;

use crate::container::error::ContainerError;
use crate::container::token::{Service, ServiceKey, Token};
use crate::kernel::error::Result as KernelResult;

type AnyService = Arc<dyn Any + Send + Sync>;
type FactoryFuture = Pin<Box<dyn Future<Output = KernelResult<AnyService>> + Send>>;
type Factory = Box<dyn Fn(Container) -> FactoryFuture + Send + Sync>;

tokio::task_local! {
    // Keys whose factories are running on the current task, outermost first.
    static RESOLUTION_CHAIN: Vec<ServiceKey>;
}

/// One bound token: either an eager instance or a factory whose result is
/// memoized in `instance` on first resolution.
struct Binding {
    type_name: &'static str,
    instance: OnceCell<AnyService>,
    factory: Option<Factory>,
}

impl Binding {
    fn eager<T: Send + Sync + 'static>(value: Arc<T>) -> Self {
        Self {
            type_name: type_name::<T>(),
            instance: OnceCell::new_with(Some(value as AnyService)),
            factory: None,
        }
    }

    fn lazy<T: Send + Sync + 'static>(factory: Factory) -> Self {
        Self {
            type_name: type_name::<T>(),
            instance: OnceCell::new(),
            factory: Some(factory),
        }
    }
}

struct ContainerInner {
    bindings: RwLock<HashMap<ServiceKey, Arc<Binding>>>,
    frozen: AtomicBool,
    strict: bool,
}

/// Keyed singleton store shared by every bundle of a kernel.
///
/// Cloning is cheap and every clone refers to the same bindings. Locks are
/// never held across an `.await` or while user factories run, so factories
/// may resolve other services through the container they receive.
///
/// Concurrent first resolutions of a lazy token wait for the one factory run.
/// A factory that resolves its own token on the same task, directly or
/// through other factories, fails with [`ContainerError::CircularDependency`].
#[derive(Clone)]
pub struct Container {
    inner: Arc<ContainerInner>,
}

impl fmt::Debug for Container {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Container")
            .field("bindings", &self.len())
            .field("frozen", &self.is_frozen())
            .field("strict", &self.inner.strict)
            .finish()
    }
}

impl Default for Container {
    fn default() -> Self {
        Self::new()
    }
}

impl Container {
    /// Create an empty container that allows overwriting until frozen.
    pub fn new() -> Self {
        Self::with_strict(false)
    }

    /// Create an empty container; when `strict` is set, binding a token twice
    /// fails with [`ContainerError::DuplicateToken`].
    pub fn with_strict(strict: bool) -> Self {
        Self {
            inner: Arc::new(ContainerInner {
                bindings: RwLock::new(HashMap::new()),
                frozen: AtomicBool::new(false),
                strict,
            }),
        }
    }

    /// Bind an eagerly constructed singleton.
    pub fn set<T: Send + Sync + 'static>(&self, token: &Token<T>, value: T) -> Result<(), ContainerError> {
        self.set_arc(token, Arc::new(value))
    }

    /// Bind an instance that the caller also keeps a handle to.
    pub fn set_arc<T: Send + Sync + 'static>(&self, token: &Token<T>, value: Arc<T>) -> Result<(), ContainerError> {
        self.bind(token.key(), Binding::eager(value))
    }

    /// Bind a lazily constructed singleton. `factory` runs at most once, on
    /// the first [`get`](Self::get) of `token`.
    pub fn set_factory<T, F, Fut>(&self, token: &Token<T>, factory: F) -> Result<(), ContainerError>
    where
        T: Send + Sync + 'static,
        F: Fn(Container) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = KernelResult<T>> + Send + 'static,
    {
        let erased: Factory = Box::new(move |container| {
            let fut = factory(container);
            Box::pin(async move { fut.await.map(|value| Arc::new(value) as AnyService) })
        });
        self.bind(token.key(), Binding::lazy::<T>(erased))
    }

    /// Resolve the singleton bound to `token`, constructing it on first use.
    pub async fn get<T: Send + Sync + 'static>(&self, token: &Token<T>) -> Result<Arc<T>, ContainerError> {
        let key = token.key();
        let binding = self.binding(key)?;

        let instance = match binding.instance.get() {
            Some(instance) => instance.clone(),
            None => self.construct(key, &binding).await?,
        };

        instance.downcast::<T>().map_err(|_| ContainerError::TypeMismatch {
            token: key.to_string(),
            expected: type_name::<T>(),
            found: binding.type_name,
        })
    }

    /// Bind a [`Service`] under its own token.
    pub fn provide<S: Service>(&self, service: S) -> Result<(), ContainerError> {
        self.set(&S::token(), service)
    }

    /// Bind a shared [`Service`] handle under its own token.
    pub fn provide_arc<S: Service>(&self, service: Arc<S>) -> Result<(), ContainerError> {
        self.set_arc(&S::token(), service)
    }

    /// Resolve a [`Service`] by its own token.
    pub async fn resolve<S: Service>(&self) -> Result<Arc<S>, ContainerError> {
        self.get(&S::token()).await
    }

    /// Whether anything is bound to `token`.
    pub fn contains<T>(&self, token: &Token<T>) -> bool {
        self.read_bindings().contains_key(token.key())
    }

    pub fn len(&self) -> usize {
        self.read_bindings().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Display names of every bound token, sorted.
    pub fn keys(&self) -> Vec<String> {
        let mut keys: Vec<String> = self.read_bindings().keys().map(|k| k.to_string()).collect();
        keys.sort();
        keys
    }

    /// Reject any further binding. Resolution (including lazy construction)
    /// keeps working.
    pub fn freeze(&self) {
        if !self.inner.frozen.swap(true, Ordering::AcqRel) {
            log::debug!("Service container frozen with {} bindings", self.len());
        }
    }

    pub fn is_frozen(&self) -> bool {
        self.inner.frozen.load(Ordering::Acquire)
    }

    pub fn is_strict(&self) -> bool {
        self.inner.strict
    }

    fn bind(&self, key: &ServiceKey, binding: Binding) -> Result<(), ContainerError> {
        if self.is_frozen() {
            return Err(ContainerError::Frozen { token: key.to_string() });
        }

        let mut bindings = self.inner.bindings.write().unwrap_or_else(|e| e.into_inner());
        if self.inner.strict && bindings.contains_key(key) {
            return Err(ContainerError::DuplicateToken { token: key.to_string() });
        }

        log::debug!("Binding {} ({})", key, binding.type_name);
        if bindings.insert(key.clone(), Arc::new(binding)).is_some() {
            log::debug!("Replaced previous binding for {}", key);
        }
        Ok(())
    }

    fn binding(&self, key: &ServiceKey) -> Result<Arc<Binding>, ContainerError> {
        self.read_bindings()
            .get(key)
            .cloned()
            .ok_or_else(|| ContainerError::UnknownToken { token: key.to_string() })
    }

    async fn construct(&self, key: &ServiceKey, binding: &Binding) -> Result<AnyService, ContainerError> {
        let Some(factory) = binding.factory.as_ref() else {
            // Eager bindings are created initialised
            return Err(ContainerError::UnknownToken { token: key.to_string() });
        };

        let mut chain = RESOLUTION_CHAIN.try_with(Clone::clone).unwrap_or_default();
        if chain.contains(key) {
            return Err(ContainerError::CircularDependency { token: key.to_string() });
        }
        chain.push(key.clone());

        let result = RESOLUTION_CHAIN
            .scope(
                chain,
                binding.instance.get_or_try_init(|| {
                    log::debug!("Constructing lazy service {}", key);
                    factory(self.clone())
                }),
            )
            .await
            .cloned();

        result.map_err(|source| match source {
            // Keep the innermost cycle report instead of nesting it per level
            crate::kernel::error::Error::Container(ContainerError::CircularDependency { token }) => {
                ContainerError::CircularDependency { token }
            }
            source => ContainerError::FactoryFailed {
                token: key.to_string(),
                source: Box::new(source),
            },
        })
    }

    fn read_bindings(&self) -> std::sync::RwLockReadGuard<'_, HashMap<ServiceKey, Arc<Binding>>> {
        self.inner.bindings.read().unwrap_or_else(|e| e.into_inner())
    }
}
