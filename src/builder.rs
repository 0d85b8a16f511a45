//! Builder for constructing fake subresource clients with seeded state

use crate::client::FakeSubresourceClient;
use crate::interceptor;
use crate::key::ObjectKey;
use crate::{Error, Result};
use kube::Resource;
use serde::Serialize;
use serde_json::Value;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::debug;

/// Builder for creating fake subresource clients
///
/// Provides a fluent API for constructing clients with:
/// - Initial objects
/// - YAML fixtures
/// - Interceptors
///
/// # Example
///
/// ```rust
/// use kube_fake_subresource::ClientBuilder;
/// use k8s_openapi::api::apps::v1::Deployment;
///
/// let mut deployment = Deployment::default();
/// deployment.metadata.name = Some("web".to_string());
/// deployment.metadata.namespace = Some("default".to_string());
///
/// let client = ClientBuilder::new()
///     .with_object(deployment.clone())
///     .build()
///     .unwrap();
///
/// assert!(client.contains(&deployment));
/// ```
#[derive(Default)]
pub struct ClientBuilder {
    initial_objects: Vec<Value>,
    /// First seed object that failed to serialize, reported by `build`
    serialization_error: Option<serde_json::Error>,
    fixture_dir: Option<PathBuf>,
    interceptors: Option<interceptor::Funcs>,
}

impl ClientBuilder {
    /// Create a new client builder
    pub fn new() -> Self {
        Self::default()
    }

    /// Add an initial object, stored under its own identity when the client is built
    ///
    /// A serialization failure is kept and returned by `build`.
    pub fn with_object<K>(mut self, obj: K) -> Self
    where
        K: Resource + Serialize,
    {
        match serde_json::to_value(&obj) {
            Ok(value) => self.initial_objects.push(value),
            Err(e) => {
                self.serialization_error.get_or_insert(e);
            }
        }
        self
    }

    /// Add multiple initial objects
    pub fn with_objects<K>(mut self, objects: Vec<K>) -> Self
    where
        K: Resource + Serialize,
    {
        for obj in objects {
            self = self.with_object(obj);
        }
        self
    }

    /// Add initial objects from JSON values
    pub fn with_runtime_objects(mut self, objects: Vec<Value>) -> Self {
        self.initial_objects.extend(objects);
        self
    }

    /// Configure interceptor functions to customize client behavior
    ///
    /// # Example
    ///
    /// ```rust
    /// use kube_fake_subresource::{ClientBuilder, interceptor};
    ///
    /// let client = ClientBuilder::new()
    ///     .with_interceptor_funcs(
    ///         interceptor::Funcs::new().update(|ctx| {
    ///             if ctx.key.name == "trigger-error" {
    ///                 return Err(kube_fake_subresource::Error::Internal("injected error".into()));
    ///             }
    ///             Ok(None)
    ///         })
    ///     )
    ///     .build()
    ///     .unwrap();
    /// ```
    pub fn with_interceptor_funcs(mut self, interceptors: interceptor::Funcs) -> Self {
        self.interceptors = Some(interceptors);
        self
    }

    /// Set the base directory for `load_fixture` calls
    pub fn with_fixture_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.fixture_dir = Some(dir.into());
        self
    }

    /// Load objects from a YAML fixture file
    ///
    /// Supports both single-document and multi-document YAML files (separated by `---`).
    /// The path is relative to the fixture directory when one is set.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or the YAML cannot be parsed.
    pub fn load_fixture(mut self, path: impl AsRef<Path>) -> Result<Self> {
        let fixture_path = match &self.fixture_dir {
            Some(dir) => dir.join(path),
            None => path.as_ref().to_path_buf(),
        };

        let content = std::fs::read_to_string(&fixture_path).map_err(|e| {
            Error::Internal(format!(
                "Failed to read fixture file {:?}: {}",
                fixture_path, e
            ))
        })?;

        use serde::Deserialize;
        for document in serde_yaml::Deserializer::from_str(&content) {
            let mut value = Value::deserialize(document).map_err(|e| {
                Error::Internal(format!("Failed to parse YAML in {:?}: {}", fixture_path, e))
            })?;

            if let Some(metadata) = value.get_mut("metadata").and_then(|m| m.as_object_mut()) {
                metadata
                    .entry("creationTimestamp")
                    .or_insert_with(|| Value::String(chrono::Utc::now().to_rfc3339()));
                metadata
                    .entry("namespace")
                    .or_insert_with(|| Value::String("default".to_string()));
            }

            self.initial_objects.push(value);
        }

        Ok(self)
    }

    /// Load objects from multiple YAML fixture files, in order
    pub fn load_fixtures<P>(mut self, paths: impl IntoIterator<Item = P>) -> Result<Self>
    where
        P: AsRef<Path>,
    {
        for path in paths {
            self = self.load_fixture(path)?;
        }
        Ok(self)
    }

    /// Load objects from a YAML fixture file, panicking on error
    ///
    /// # Panics
    ///
    /// Panics if the fixture file cannot be loaded or parsed.
    pub fn load_fixture_or_panic(self, path: impl AsRef<Path>) -> Self {
        self.load_fixture(path).expect("Failed to load fixture")
    }

    /// Load objects from multiple YAML fixture files, panicking on error
    ///
    /// # Panics
    ///
    /// Panics if any fixture file cannot be loaded or parsed.
    pub fn load_fixtures_or_panic<P>(self, paths: impl IntoIterator<Item = P>) -> Self
    where
        P: AsRef<Path>,
    {
        self.load_fixtures(paths).expect("Failed to load fixtures")
    }

    /// Build the fake subresource client
    ///
    /// # Errors
    ///
    /// Returns an error if an initial object failed to serialize or has no
    /// `metadata.name`.
    pub fn build(self) -> Result<FakeSubresourceClient> {
        if let Some(e) = self.serialization_error {
            return Err(Error::SerializationError(e));
        }

        let client = FakeSubresourceClient {
            interceptors: self.interceptors.map(Arc::new),
            ..FakeSubresourceClient::default()
        };

        for obj in self.initial_objects {
            let key = ObjectKey::from_value(&obj);
            if key.name.is_empty() {
                return Err(Error::InvalidRequest(
                    "initial object is missing metadata.name".to_string(),
                ));
            }
            debug!("Seeding subresource owner: {}", key);
            client.insert(key, obj);
        }

        Ok(client)
    }
}
