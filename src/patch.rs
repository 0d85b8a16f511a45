//! Merge patch sources and RFC 7396 helpers

use crate::{Error, Result};
use kube::api::Patch;
use serde::Serialize;
use serde_json::{Map, Value};

/// Source of merge patch bytes for an object
///
/// `current` is the JSON form of the object the patch will be applied to.
pub trait PatchData {
    fn data(&self, current: &Value) -> Result<Vec<u8>>;
}

impl PatchData for [u8] {
    fn data(&self, _current: &Value) -> Result<Vec<u8>> {
        Ok(self.to_vec())
    }
}

impl PatchData for Vec<u8> {
    fn data(&self, current: &Value) -> Result<Vec<u8>> {
        self.as_slice().data(current)
    }
}

impl PatchData for str {
    fn data(&self, _current: &Value) -> Result<Vec<u8>> {
        Ok(self.as_bytes().to_vec())
    }
}

impl PatchData for String {
    fn data(&self, current: &Value) -> Result<Vec<u8>> {
        self.as_str().data(current)
    }
}

impl PatchData for Value {
    fn data(&self, _current: &Value) -> Result<Vec<u8>> {
        Ok(serde_json::to_vec(self)?)
    }
}

/// Strategic merge and server-side apply bodies are applied as plain merge patches.
impl<P: Serialize> PatchData for Patch<P> {
    fn data(&self, _current: &Value) -> Result<Vec<u8>> {
        match self {
            Patch::Merge(p) | Patch::Strategic(p) | Patch::Apply(p) => {
                Ok(serde_json::to_vec(p)?)
            }
            _ => Err(Error::InvalidPatch(
                "only merge-style patches can be applied to a subresource".to_string(),
            )),
        }
    }
}

/// Merge patch computed from the difference between an original object and the
/// object being patched
///
/// # Example
///
/// ```
/// use kube_fake_subresource::{FakeSubresourceClient, MergeFrom};
/// use k8s_openapi::api::core::v1::Pod;
/// use kube::api::PatchParams;
///
/// let client = FakeSubresourceClient::new();
/// let mut pod = Pod::default();
/// pod.metadata.name = Some("web".to_string());
///
/// let original = MergeFrom::new(&pod).unwrap();
/// pod.metadata.labels = Some([("app".to_string(), "web".to_string())].into());
///
/// client.patch(&mut pod, &original, &PatchParams::default()).unwrap();
/// ```
#[derive(Debug, Clone)]
pub struct MergeFrom {
    original: Value,
}

impl MergeFrom {
    pub fn new<K: Serialize>(original: &K) -> Result<Self> {
        Ok(Self {
            original: serde_json::to_value(original)?,
        })
    }
}

impl PatchData for MergeFrom {
    fn data(&self, current: &Value) -> Result<Vec<u8>> {
        let patch = create_merge_patch(&self.original, current);
        Ok(serde_json::to_vec(&patch)?)
    }
}

/// Apply RFC 7396 merge patch bytes to a document
pub fn merge_patch(doc: &Value, patch: &[u8]) -> Result<Value> {
    let patch: Value = serde_json::from_slice(patch)?;
    let mut merged = doc.clone();
    json_patch::merge(&mut merged, &patch);
    Ok(merged)
}

/// Produce the merge patch that turns `original` into `modified`
///
/// Removed keys become `null`, nested objects are diffed recursively, and any other
/// changed value is replaced whole.
pub fn create_merge_patch(original: &Value, modified: &Value) -> Value {
    match (original, modified) {
        (Value::Object(orig), Value::Object(modi)) => Value::Object(diff_objects(orig, modi)),
        _ => modified.clone(),
    }
}

fn diff_objects(original: &Map<String, Value>, modified: &Map<String, Value>) -> Map<String, Value> {
    let mut patch = Map::new();

    for key in original.keys() {
        if !modified.contains_key(key) {
            patch.insert(key.clone(), Value::Null);
        }
    }

    for (key, new_value) in modified {
        match original.get(key) {
            Some(old_value) if old_value == new_value => {}
            Some(Value::Object(old)) => {
                if let Value::Object(new) = new_value {
                    let nested = diff_objects(old, new);
                    if !nested.is_empty() {
                        patch.insert(key.clone(), Value::Object(nested));
                    }
                } else {
                    patch.insert(key.clone(), new_value.clone());
                }
            }
            _ => {
                patch.insert(key.clone(), new_value.clone());
            }
        }
    }

    patch
}
