//! Interceptors for customizing subresource client behavior during testing

use crate::client::FakeSubresourceClient;
use crate::key::ObjectKey;
use crate::Result;
use kube::api::{PatchParams, PostParams};
use serde_json::Value;
use std::sync::Arc;

/// Interceptor functions for subresource operations
///
/// Return `Ok(Some(value))` to override, `Ok(None)` to continue, or `Err(e)` to inject an error.
/// Interceptors run before the store is locked, so they may call back into the client.
///
/// # Example
/// ```
/// use kube_fake_subresource::interceptor;
///
/// let funcs = interceptor::Funcs::new()
///     .patch(|ctx| {
///         if ctx.key.name == "broken" {
///             return Err(kube_fake_subresource::Error::Internal("injected error".into()));
///         }
///         Ok(None)
///     });
/// ```
#[derive(Default)]
pub struct Funcs {
    /// Intercept Get operations
    pub(crate) get: Option<GetInterceptor>,
    /// Intercept Create operations
    pub(crate) create: Option<CreateInterceptor>,
    /// Intercept Update operations
    pub(crate) update: Option<UpdateInterceptor>,
    /// Intercept Patch operations
    pub(crate) patch: Option<PatchInterceptor>,
}

/// Context passed to Get interceptors
///
/// An override value is copied into the caller's destination in place of the stored state.
pub struct GetContext<'a> {
    pub client: &'a FakeSubresourceClient,
    pub key: &'a ObjectKey,
}

/// Context passed to Create interceptors
///
/// An override value is stored in place of the owner.
pub struct CreateContext<'a> {
    pub client: &'a FakeSubresourceClient,
    pub key: &'a ObjectKey,
    /// The owner object being stored
    pub object: &'a Value,
    /// The subresource payload passed by the caller
    pub subresource: &'a Value,
    pub params: &'a PostParams,
}

/// Context passed to Update interceptors
pub struct UpdateContext<'a> {
    pub client: &'a FakeSubresourceClient,
    pub key: &'a ObjectKey,
    pub object: &'a Value,
    pub params: &'a PostParams,
}

/// Context passed to Patch interceptors
///
/// An override value is used as the patched object.
pub struct PatchContext<'a> {
    pub client: &'a FakeSubresourceClient,
    pub key: &'a ObjectKey,
    /// The owner object before patching
    pub object: &'a Value,
    /// Merge patch bytes produced for this object
    pub patch: &'a [u8],
    pub params: &'a PatchParams,
}

pub type GetInterceptor = Arc<dyn Fn(GetContext) -> Result<Option<Value>> + Send + Sync>;
pub type CreateInterceptor = Arc<dyn Fn(CreateContext) -> Result<Option<Value>> + Send + Sync>;
pub type UpdateInterceptor = Arc<dyn Fn(UpdateContext) -> Result<Option<Value>> + Send + Sync>;
pub type PatchInterceptor = Arc<dyn Fn(PatchContext) -> Result<Option<Value>> + Send + Sync>;

impl Funcs {
    /// Create a new empty set of interceptors
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a Get interceptor
    pub fn get<F>(mut self, f: F) -> Self
    where
        F: Fn(GetContext) -> Result<Option<Value>> + Send + Sync + 'static,
    {
        self.get = Some(Arc::new(f));
        self
    }

    /// Add a Create interceptor
    pub fn create<F>(mut self, f: F) -> Self
    where
        F: Fn(CreateContext) -> Result<Option<Value>> + Send + Sync + 'static,
    {
        self.create = Some(Arc::new(f));
        self
    }

    /// Add an Update interceptor
    pub fn update<F>(mut self, f: F) -> Self
    where
        F: Fn(UpdateContext) -> Result<Option<Value>> + Send + Sync + 'static,
    {
        self.update = Some(Arc::new(f));
        self
    }

    /// Add a Patch interceptor
    pub fn patch<F>(mut self, f: F) -> Self
    where
        F: Fn(PatchContext) -> Result<Option<Value>> + Send + Sync + 'static,
    {
        self.patch = Some(Arc::new(f));
        self
    }
}
