//! Reloadable holder for the active configuration
//!
//! `ConfigStore` is an explicit value owned by whoever needs configuration
//! (a supervisor, a renderer). It is never a process-wide singleton.

use std::sync::{Arc, Mutex, RwLock};

use crate::config::{EnvSource, Schema};
use crate::events::EventManager;
use crate::resolved::{ResolvedConfig, SettingChange};
use crate::resolver::resolve;
use crate::sync::{MutexExt, RwLockExt};
use crate::validation::ValidationErrors;

/// Active configuration plus the schema it is resolved from
///
/// # Example
///
/// ```rust
/// use deploycfg::{ConfigStore, Environment, gitlab};
///
/// let store = ConfigStore::load(gitlab::schema(), &Environment::new()).unwrap();
/// store.watch(gitlab::keys::DB_PORT, |change| {
///     println!("database port is now {:?}", change.new);
/// });
///
/// let env = Environment::new().with("GITLAB_DB_PORT", "6432");
/// let changes = store.reload(&env).unwrap();
/// assert_eq!(changes.len(), 1);
/// assert_eq!(store.current().get_int(gitlab::keys::DB_PORT).unwrap(), 6432);
/// ```
#[derive(Debug)]
pub struct ConfigStore {
    schema: Arc<Schema>,
    current: RwLock<Arc<ResolvedConfig>>,
    /// Serializes reloads so listeners see changes in swap order
    reload_lock: Mutex<()>,
    events: EventManager,
}

impl ConfigStore {
    /// Resolve `schema` against `env` and hold the result
    ///
    /// # Errors
    ///
    /// Returns every validation error if the initial resolution fails.
    pub fn load<E>(schema: impl Into<Arc<Schema>>, env: &E) -> Result<Self, ValidationErrors>
    where
        E: EnvSource + ?Sized,
    {
        let schema = schema.into();
        let config = resolve(&schema, env)?;
        Ok(Self {
            schema,
            current: RwLock::new(Arc::new(config)),
            reload_lock: Mutex::new(()),
            events: EventManager::new(),
        })
    }

    /// Snapshot of the active configuration
    #[must_use]
    pub fn current(&self) -> Arc<ResolvedConfig> {
        Arc::clone(&self.current.read_recovered())
    }

    /// Schema the store resolves against
    #[must_use]
    pub fn schema(&self) -> &Schema {
        &self.schema
    }

    /// Resolve again and replace the active configuration wholesale
    ///
    /// On failure the active configuration is left untouched and no
    /// listener fires. On success listeners are notified once per changed
    /// key, after the new configuration is visible through [`current`].
    ///
    /// Concurrent reloads run one at a time, so the last change a listener
    /// sees always matches [`current`]. Listeners may read the store but
    /// must not call `reload` themselves.
    ///
    /// [`current`]: Self::current
    ///
    /// # Errors
    ///
    /// Returns every validation error of the new resolution.
    pub fn reload<E>(&self, env: &E) -> Result<Vec<SettingChange>, ValidationErrors>
    where
        E: EnvSource + ?Sized,
    {
        let _reload = self.reload_lock.lock_recovered();
        let next = Arc::new(resolve(&self.schema, env)?);

        let previous = {
            let mut guard = self.current.write_recovered();
            std::mem::replace(&mut *guard, Arc::clone(&next))
        };

        let changes = previous.diff(&next);
        if changes.is_empty() {
            log::debug!("Reload produced no changes");
        } else {
            log::info!("Reload changed {} setting(s)", changes.len());
        }

        for change in &changes {
            self.events.notify(change);
        }
        Ok(changes)
    }

    /// Register a listener for every changed key
    pub fn on_change<F>(&self, callback: F)
    where
        F: Fn(&SettingChange) + Send + Sync + 'static,
    {
        self.events.on_change(callback);
    }

    /// Register a listener for one key
    pub fn watch<F>(&self, key: &str, callback: F)
    where
        F: Fn(&SettingChange) + Send + Sync + 'static,
    {
        if self.schema.get(key).is_none() {
            log::warn!("Watching unknown setting {key}");
        }
        self.events.watch(key, callback);
    }

    /// Access the underlying event manager
    #[must_use]
    pub fn events(&self) -> &EventManager {
        &self.events
    }
}
