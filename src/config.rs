//! Configuration sources exposed to the container as bindings.
//!
//! A [`ConfigRepository`] layers [`ConfigSource`]s in priority order; the
//! [`ConfigServiceProvider`] binds every key it knows as `"{prefix}.{key}"` and
//! shares the repository itself under the prefix.

use std::borrow::Cow;
use std::collections::{BTreeMap, HashMap};
use std::env;
use std::sync::Arc;
use std::time::Duration;

use parking_lot::RwLock;
#[cfg(feature = "config")]
use serde::{Deserialize, Serialize};

use crate::internal::AnyArc;
use crate::services::ServiceProvider;
use crate::{Binding, Container, DiError, DiResult};

/// A configuration value that can be various types
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "config", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "config", serde(untagged))]
pub enum ConfigValue {
    String(String),
    Integer(i64),
    Float(f64),
    Boolean(bool),
    Array(Vec<ConfigValue>),
    Object(HashMap<String, ConfigValue>),
}

impl ConfigValue {
    pub fn as_string(&self) -> DiResult<&str> {
        match self {
            ConfigValue::String(s) => Ok(s),
            _ => Err(DiError::TypeMismatch("config value is not a string")),
        }
    }

    pub fn as_i64(&self) -> DiResult<i64> {
        match self {
            ConfigValue::Integer(i) => Ok(*i),
            _ => Err(DiError::TypeMismatch("config value is not an integer")),
        }
    }

    /// Floats and integers both convert.
    pub fn as_f64(&self) -> DiResult<f64> {
        match self {
            ConfigValue::Float(f) => Ok(*f),
            ConfigValue::Integer(i) => Ok(*i as f64),
            _ => Err(DiError::TypeMismatch("config value is not a number")),
        }
    }

    pub fn as_bool(&self) -> DiResult<bool> {
        match self {
            ConfigValue::Boolean(b) => Ok(*b),
            _ => Err(DiError::TypeMismatch("config value is not a boolean")),
        }
    }

    /// Milliseconds to `Duration`
    pub fn as_duration_ms(&self) -> DiResult<Duration> {
        let ms = self.as_i64()?;
        if ms < 0 {
            return Err(DiError::TypeMismatch("duration cannot be negative"));
        }
        Ok(Duration::from_millis(ms as u64))
    }

    /// Sniffs the most specific type out of a raw string.
    pub fn parse(raw: &str) -> Self {
        if let Ok(int_val) = raw.parse::<i64>() {
            ConfigValue::Integer(int_val)
        } else if let Ok(float_val) = raw.parse::<f64>() {
            ConfigValue::Float(float_val)
        } else if let Ok(bool_val) = raw.parse::<bool>() {
            ConfigValue::Boolean(bool_val)
        } else {
            ConfigValue::String(raw.to_string())
        }
    }
}

impl From<&str> for ConfigValue {
    fn from(value: &str) -> Self {
        ConfigValue::String(value.to_string())
    }
}

impl From<String> for ConfigValue {
    fn from(value: String) -> Self {
        ConfigValue::String(value)
    }
}

impl From<i64> for ConfigValue {
    fn from(value: i64) -> Self {
        ConfigValue::Integer(value)
    }
}

impl From<f64> for ConfigValue {
    fn from(value: f64) -> Self {
        ConfigValue::Float(value)
    }
}

impl From<bool> for ConfigValue {
    fn from(value: bool) -> Self {
        ConfigValue::Boolean(value)
    }
}

/// Trait for configuration sources
pub trait ConfigSource: Send + Sync + std::fmt::Debug {
    fn get(&self, key: &str) -> Option<ConfigValue>;

    /// Every key this source can answer
    fn keys(&self) -> Vec<String>;
}

/// In-memory source, mostly for tests and defaults.
#[derive(Debug, Default, Clone)]
pub struct MapConfigSource {
    values: BTreeMap<String, ConfigValue>,
}

impl MapConfigSource {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(mut self, key: impl Into<String>, value: impl Into<ConfigValue>) -> Self {
        self.values.insert(key.into(), value.into());
        self
    }

    pub fn insert(&mut self, key: impl Into<String>, value: impl Into<ConfigValue>) {
        self.values.insert(key.into(), value.into());
    }
}

impl ConfigSource for MapConfigSource {
    fn get(&self, key: &str) -> Option<ConfigValue> {
        self.values.get(key).cloned()
    }

    fn keys(&self) -> Vec<String> {
        self.values.keys().cloned().collect()
    }
}

/// Environment variable source
///
/// With a prefix `APP`, key `db_url` reads `APP_DB_URL`. Values are sniffed
/// into integers, floats and booleans before falling back to strings.
#[derive(Debug, Default)]
pub struct EnvironmentConfigSource {
    prefix: Option<String>,
}

impl EnvironmentConfigSource {
    pub fn new() -> Self {
        Self { prefix: None }
    }

    pub fn with_prefix(prefix: impl Into<String>) -> Self {
        Self {
            prefix: Some(prefix.into()),
        }
    }
}

impl ConfigSource for EnvironmentConfigSource {
    fn get(&self, key: &str) -> Option<ConfigValue> {
        let env_key = match &self.prefix {
            Some(prefix) => format!("{}_{}", prefix.to_uppercase(), key.to_uppercase()),
            None => key.to_uppercase(),
        };
        env::var(&env_key).ok().map(|value| ConfigValue::parse(&value))
    }

    fn keys(&self) -> Vec<String> {
        env::vars()
            .filter_map(|(key, _)| match &self.prefix {
                Some(prefix) => {
                    let prefix_upper = format!("{}_", prefix.to_uppercase());
                    key.strip_prefix(&prefix_upper).map(str::to_lowercase)
                }
                None => Some(key.to_lowercase()),
            })
            .collect()
    }
}

/// JSON document source
///
/// Nested objects are also reachable through dotted keys: `{"db": {"url": ..}}`
/// answers both `db` and `db.url`.
#[cfg(feature = "config")]
#[derive(Debug)]
pub struct JsonConfigSource {
    file_path: Option<std::path::PathBuf>,
    config: RwLock<Option<HashMap<String, ConfigValue>>>,
}

#[cfg(feature = "config")]
impl JsonConfigSource {
    /// Source backed by a file, read lazily on first access.
    pub fn new(file_path: impl Into<std::path::PathBuf>) -> Self {
        Self {
            file_path: Some(file_path.into()),
            config: RwLock::new(None),
        }
    }

    /// Source parsed from an in-memory document.
    pub fn from_str(document: &str) -> DiResult<Self> {
        let source = Self {
            file_path: None,
            config: RwLock::new(None),
        };
        source.load(document)?;
        Ok(source)
    }

    /// Re-reads the backing file.
    pub fn reload(&self) -> DiResult<()> {
        let Some(path) = &self.file_path else {
            return Ok(());
        };
        let content = std::fs::read_to_string(path).map_err(DiError::custom)?;
        self.load(&content)
    }

    fn load(&self, document: &str) -> DiResult<()> {
        let parsed: HashMap<String, ConfigValue> =
            serde_json::from_str(document).map_err(DiError::custom)?;

        let mut flat = HashMap::new();
        for (key, value) in parsed {
            flatten_into(&mut flat, key, value);
        }
        *self.config.write() = Some(flat);
        Ok(())
    }

    fn ensure_loaded(&self) {
        if self.config.read().is_none() {
            if let Err(err) = self.reload() {
                tracing::warn!(error = %err, "failed to load JSON configuration");
            }
        }
    }
}

#[cfg(feature = "config")]
fn flatten_into(flat: &mut HashMap<String, ConfigValue>, key: String, value: ConfigValue) {
    if let ConfigValue::Object(children) = &value {
        for (child, nested) in children {
            flatten_into(flat, format!("{}.{}", key, child), nested.clone());
        }
    }
    flat.insert(key, value);
}

#[cfg(feature = "config")]
impl ConfigSource for JsonConfigSource {
    fn get(&self, key: &str) -> Option<ConfigValue> {
        self.ensure_loaded();
        self.config.read().as_ref()?.get(key).cloned()
    }

    fn keys(&self) -> Vec<String> {
        self.ensure_loaded();
        self.config
            .read()
            .as_ref()
            .map(|config| config.keys().cloned().collect())
            .unwrap_or_default()
    }
}

/// Layered configuration lookups.
///
/// Sources are consulted in the order they were added; the first that has a
/// key wins. Hits are cached until [`invalidate_cache`](Self::invalidate_cache).
pub struct ConfigRepository {
    sources: Vec<Box<dyn ConfigSource>>,
    cache: RwLock<HashMap<String, ConfigValue>>,
}

impl std::fmt::Debug for ConfigRepository {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ConfigRepository")
            .field("sources", &self.sources)
            .field("cached", &self.cache.read().len())
            .finish()
    }
}

impl ConfigRepository {
    pub fn new() -> Self {
        Self {
            sources: Vec::new(),
            cache: RwLock::new(HashMap::new()),
        }
    }

    /// Adds a source behind every source added before it.
    pub fn add_source(&mut self, source: impl ConfigSource + 'static) {
        self.sources.push(Box::new(source));
    }

    pub fn with_source(mut self, source: impl ConfigSource + 'static) -> Self {
        self.add_source(source);
        self
    }

    pub fn get(&self, key: &str) -> Option<ConfigValue> {
        if let Some(value) = self.cache.read().get(key) {
            return Some(value.clone());
        }

        let value = self.sources.iter().find_map(|source| source.get(key))?;
        self.cache.write().insert(key.to_string(), value.clone());
        Some(value)
    }

    pub fn get_or(&self, key: &str, default: impl Into<ConfigValue>) -> ConfigValue {
        self.get(key).unwrap_or_else(|| default.into())
    }

    fn require(&self, key: &str) -> DiResult<ConfigValue> {
        self.get(key).ok_or_else(|| DiError::NotFound(key.to_string()))
    }

    pub fn get_string(&self, key: &str) -> DiResult<String> {
        self.require(key)?.as_string().map(str::to_string)
    }

    pub fn get_string_or(&self, key: &str, default: &str) -> String {
        self.get_string(key).unwrap_or_else(|_| default.to_string())
    }

    pub fn get_i64(&self, key: &str) -> DiResult<i64> {
        self.require(key)?.as_i64()
    }

    pub fn get_i64_or(&self, key: &str, default: i64) -> i64 {
        self.get_i64(key).unwrap_or(default)
    }

    pub fn get_bool(&self, key: &str) -> DiResult<bool> {
        self.require(key)?.as_bool()
    }

    pub fn get_bool_or(&self, key: &str, default: bool) -> bool {
        self.get_bool(key).unwrap_or(default)
    }

    pub fn get_duration_ms(&self, key: &str) -> DiResult<Duration> {
        self.require(key)?.as_duration_ms()
    }

    pub fn get_duration_ms_or(&self, key: &str, default: Duration) -> Duration {
        self.get_duration_ms(key).unwrap_or(default)
    }

    pub fn invalidate_cache(&self) {
        self.cache.write().clear();
    }

    /// Keys across all sources, sorted and deduplicated
    pub fn all_keys(&self) -> Vec<String> {
        let mut keys: Vec<String> = self.sources.iter().flat_map(|source| source.keys()).collect();
        keys.sort();
        keys.dedup();
        keys
    }
}

impl Default for ConfigRepository {
    fn default() -> Self {
        Self::new().with_source(EnvironmentConfigSource::new())
    }
}

/// Binds a [`ConfigRepository`] into the container.
///
/// On registration every key becomes a `ConfigValue` binding named
/// `"{prefix}.{key}"`, and the repository is bound under `prefix` itself.
///
/// # Examples
///
/// ```
/// use ferrous_container::{ConfigRepository, ConfigServiceProvider, ConfigValue, Container, MapConfigSource, ProviderRef};
///
/// let repository = ConfigRepository::new()
///     .with_source(MapConfigSource::new().with("db.port", 5432i64))
///     .with_source(MapConfigSource::new().with("db.port", 1i64).with("debug", true));
///
/// let container = Container::new();
/// container.add_service_provider(ProviderRef::instance(ConfigServiceProvider::new(repository))).unwrap();
/// assert!(!container.has("config.db.port"));
///
/// container.bootstrap().unwrap();
/// assert_eq!(*container.get::<ConfigValue>("config.db.port").unwrap(), ConfigValue::Integer(5432));
/// assert!(container.get::<ConfigRepository>("config").unwrap().get_bool("debug").unwrap());
/// ```
pub struct ConfigServiceProvider {
    prefix: Cow<'static, str>,
    repository: Arc<ConfigRepository>,
}

impl ConfigServiceProvider {
    pub fn new(repository: ConfigRepository) -> Self {
        Self::with_prefix("config", repository)
    }

    pub fn with_prefix(prefix: impl Into<Cow<'static, str>>, repository: ConfigRepository) -> Self {
        Self {
            prefix: prefix.into(),
            repository: Arc::new(repository),
        }
    }

    pub fn repository(&self) -> &Arc<ConfigRepository> {
        &self.repository
    }
}

impl ServiceProvider for ConfigServiceProvider {
    fn name(&self) -> Cow<'static, str> {
        Cow::Owned(format!("{}[{}]", std::any::type_name::<Self>(), self.prefix))
    }

    fn register(&self, container: &Container) -> DiResult<()> {
        let keys = self.repository.all_keys();
        for key in &keys {
            if let Some(value) = self.repository.get(key) {
                container.add(format!("{}.{}", self.prefix, key), Binding::value(value));
            }
        }
        let repository: AnyArc = self.repository.clone();
        container.share(self.prefix.clone(), Binding::Value(repository));

        tracing::debug!(prefix = %self.prefix, keys = keys.len(), "configuration bound");
        Ok(())
    }
}
