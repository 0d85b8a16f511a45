//! Fake subresource client for in-memory testing

use crate::interceptor;
use crate::key::ObjectKey;
use crate::patch::{merge_patch, PatchData};
use crate::{Error, Result};
use kube::api::{PatchParams, PostParams};
use kube::Resource;
use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::Value;
use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use tracing::{debug, trace};

type ObjectStorage = HashMap<ObjectKey, Value>;

/// Fields that identify the destination's own type and are never copied over it
const TYPE_FIELDS: [&str; 2] = ["apiVersion", "kind"];

/// Fake subresource client for testing
///
/// Stores the full state of each owner object keyed by namespace and name. Clones share
/// the same store.
#[derive(Clone, Default)]
pub struct FakeSubresourceClient {
    /// Owner snapshots by identity
    pub(crate) objects: Arc<Mutex<ObjectStorage>>,
    /// Interceptor functions for customizing behavior
    pub(crate) interceptors: Option<Arc<interceptor::Funcs>>,
}

impl FakeSubresourceClient {
    /// Create a new fake subresource client with an empty store
    pub fn new() -> Self {
        Self::default()
    }

    fn objects(&self) -> MutexGuard<'_, ObjectStorage> {
        // Every mutation is a single insert or clear, so a poisoned map is still consistent.
        self.objects.lock().unwrap_or_else(PoisonError::into_inner)
    }

    pub(crate) fn insert(&self, key: ObjectKey, value: Value) {
        self.objects().insert(key, value);
    }

    /// Remove every stored object
    pub fn reset(&self) {
        let mut objects = self.objects();
        let count = objects.len();
        objects.clear();
        debug!("Reset subresource store ({} objects)", count);
    }

    /// Number of stored objects
    pub fn len(&self) -> usize {
        self.objects().len()
    }

    pub fn is_empty(&self) -> bool {
        self.objects().is_empty()
    }

    /// Whether state is stored for the owner's identity
    pub fn contains<K: Resource>(&self, obj: &K) -> bool {
        self.objects().contains_key(&ObjectKey::from_object(obj))
    }

    /// Copy the stored state of `obj` into `subresource`
    ///
    /// The destination ends up equal to the stored state, except that it keeps its own
    /// `apiVersion` and `kind`. Fields the stored object lacks are reset and fields the
    /// destination type does not know are dropped.
    pub fn get<K, S>(&self, obj: &K, subresource: &mut S) -> Result<()>
    where
        K: Resource,
        S: Serialize + DeserializeOwned,
    {
        let key = ObjectKey::from_object(obj);
        trace!("Getting subresource for: {}", key);

        let intercepted = match self.interceptors.as_ref().and_then(|i| i.get.as_ref()) {
            Some(get_interceptor) => get_interceptor(interceptor::GetContext {
                client: self,
                key: &key,
            })?,
            None => None,
        };

        let stored = match intercepted {
            Some(value) => value,
            None => self
                .objects()
                .get(&key)
                .cloned()
                .ok_or_else(|| Error::NotFound {
                    kind: String::new(),
                    name: key.name.clone(),
                    namespace: key.namespace.clone(),
                })?,
        };

        *subresource = copy_fields(subresource, stored)?;
        Ok(())
    }

    /// Decode the stored state of `obj` into a fresh `S`
    pub fn get_as<K, S>(&self, obj: &K) -> Result<S>
    where
        K: Resource,
        S: Serialize + DeserializeOwned + Default,
    {
        let mut subresource = S::default();
        self.get(obj, &mut subresource)?;
        Ok(subresource)
    }

    /// Store a copy of `obj`
    ///
    /// The owner's full state is what gets stored; `subresource` is only handed to a
    /// create interceptor. Any existing entry is overwritten.
    pub fn create<K, S>(&self, obj: &K, subresource: &S, params: &PostParams) -> Result<()>
    where
        K: Resource + Serialize,
        S: Serialize,
    {
        let key = ObjectKey::from_object(obj);
        trace!("Creating subresource for: {}", key);

        let mut value = serde_json::to_value(obj)?;

        if let Some(create_interceptor) = self.interceptors.as_ref().and_then(|i| i.create.as_ref())
        {
            let subresource = serde_json::to_value(subresource)?;
            let ctx = interceptor::CreateContext {
                client: self,
                key: &key,
                object: &value,
                subresource: &subresource,
                params,
            };
            if let Some(replacement) = create_interceptor(ctx)? {
                value = replacement;
            }
        }

        self.insert(key.clone(), value);

        debug!("Created subresource owner: {}", key);
        Ok(())
    }

    /// Replace the stored copy of `obj` with its current state
    pub fn update<K>(&self, obj: &K, params: &PostParams) -> Result<()>
    where
        K: Resource + Serialize,
    {
        let key = ObjectKey::from_object(obj);
        trace!("Updating subresource for: {}", key);

        let mut value = serde_json::to_value(obj)?;

        if let Some(update_interceptor) = self.interceptors.as_ref().and_then(|i| i.update.as_ref())
        {
            let ctx = interceptor::UpdateContext {
                client: self,
                key: &key,
                object: &value,
                params,
            };
            if let Some(replacement) = update_interceptor(ctx)? {
                value = replacement;
            }
        }

        self.insert(key.clone(), value);

        debug!("Updated subresource owner: {}", key);
        Ok(())
    }

    /// Merge patch `obj` in place and store the result
    ///
    /// Neither `obj` nor the store is touched unless every step succeeds.
    pub fn patch<K, P>(&self, obj: &mut K, patch: &P, params: &PatchParams) -> Result<()>
    where
        K: Resource + Serialize + DeserializeOwned,
        P: PatchData + ?Sized,
    {
        let key = ObjectKey::from_object(obj);
        trace!("Patching subresource for: {}", key);

        let current = serde_json::to_value(&*obj)?;
        let patch_bytes = patch.data(&current)?;

        let intercepted = match self.interceptors.as_ref().and_then(|i| i.patch.as_ref()) {
            Some(patch_interceptor) => patch_interceptor(interceptor::PatchContext {
                client: self,
                key: &key,
                object: &current,
                patch: &patch_bytes,
                params,
            })?,
            None => None,
        };

        let merged = match intercepted {
            Some(value) => value,
            None => merge_patch(&current, &patch_bytes)?,
        };

        let patched: K = serde_json::from_value(merged)?;
        let value = serde_json::to_value(&patched)?;
        let key = ObjectKey::from_object(&patched);

        self.insert(key.clone(), value);
        *obj = patched;

        debug!("Patched subresource owner: {}", key);
        Ok(())
    }
}

/// Rebuild `dest` from `source`, keeping only the destination's own type fields
fn copy_fields<S>(dest: &S, source: Value) -> Result<S>
where
    S: Serialize + DeserializeOwned,
{
    let target = match (serde_json::to_value(dest)?, source) {
        (Value::Object(dest_fields), Value::Object(mut fields)) => {
            for name in TYPE_FIELDS {
                if let Some(value) = dest_fields.get(name) {
                    fields.insert(name.to_string(), value.clone());
                }
            }
            Value::Object(fields)
        }
        (_, source) => source,
    };

    Ok(serde_json::from_value(target)?)
}
