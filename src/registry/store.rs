//! Agent registry: a durable, cached collection of registered agents.
//!
//! Records live in memory (the fast path) and as one JSON file per agent
//! under the storage directory (the source of truth on cold start). Every
//! mutation writes through to disk before it is acknowledged, and
//! [`AgentRegistry::reload_servers`] is the only operation that replaces the
//! in-memory tier wholesale.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use tokio::sync::RwLock;
use uuid::Uuid;

use super::error::RegistryError;
use super::record::{validate_agent_card, AgentRecord};
use crate::a2a::types::agent_card_url;
use crate::a2a::A2AClient;
use crate::utilities::{slugify, FileHandler, MAX_AGENT_ID_LENGTH};

type Cache = BTreeMap<String, AgentRecord>;

/// Registry of remote agents keyed by slug-derived identifiers.
///
/// The cache lock is held for the whole of every mutation, including the
/// file write, so `get`/`list` never observe a half-applied change.
#[derive(Debug)]
pub struct AgentRegistry {
    files: FileHandler,
    client: A2AClient,
    cache: RwLock<Cache>,
}

impl AgentRegistry {
    /// Create a registry over `storage_dir`.
    ///
    /// Nothing is read until [`AgentRegistry::init`] is called.
    ///
    /// # Arguments
    ///
    /// * `storage_dir` - Directory holding one `<id>.json` file per agent.
    /// * `client` - Client used to fetch agent cards.
    pub fn new(storage_dir: impl Into<PathBuf>, client: A2AClient) -> Self {
        Self {
            files: FileHandler::new(storage_dir),
            client,
            cache: RwLock::new(BTreeMap::new()),
        }
    }

    /// Directory holding the record files.
    pub fn storage_dir(&self) -> &Path {
        self.files.directory()
    }

    /// Ensure the storage directory exists, then load every record from it.
    ///
    /// Safe to call more than once.
    ///
    /// # Errors
    ///
    /// Returns `RegistryError::Storage` if the directory cannot be created.
    pub async fn init(&self) -> Result<usize, RegistryError> {
        self.files
            .ensure_dir()
            .await
            .map_err(|e| RegistryError::storage(self.storage_dir(), e))?;
        Ok(self.reload_servers().await)
    }

    /// Discard the cache and rebuild it from the record files.
    ///
    /// Unreadable or malformed files are skipped and logged. If the directory
    /// cannot be scanned at all, the cache is left empty and 0 is returned.
    pub async fn reload_servers(&self) -> usize {
        let mut cache = self.cache.write().await;
        cache.clear();

        let paths = match self.files.list().await {
            Ok(paths) => paths,
            Err(e) => {
                log::error!(
                    "Cannot scan agent storage {}: {}",
                    self.storage_dir().display(),
                    e
                );
                return 0;
            }
        };

        for path in paths {
            match self.files.load_path::<AgentRecord>(&path).await {
                Ok(record) if is_valid_id(&record.id) => {
                    cache.insert(record.id.clone(), record);
                }
                Ok(record) => {
                    log::warn!(
                        "Skipping {}: invalid record id '{}'",
                        path.display(),
                        record.id
                    );
                }
                Err(e) => {
                    log::warn!("Skipping unreadable record {}: {}", path.display(), e);
                }
            }
        }

        log::info!(
            "Loaded {} agent record(s) from {}",
            cache.len(),
            self.storage_dir().display()
        );
        cache.len()
    }

    /// Register the agent served at `registration_url`.
    ///
    /// Fetches and validates the agent card, derives the identifier and
    /// persists a new record. Registering the same URL again while the
    /// agent's own endpoint is unchanged returns the existing record. The URL
    /// is stored without a trailing `/`, so `https://x/agent/` and
    /// `https://x/agent` are the same registration.
    ///
    /// # Identifier derivation
    ///
    /// A non-blank card `id` is slugged to at most 20 characters and used if
    /// anything survives. Otherwise, or if that id already belongs to a
    /// different registration, a random token is generated. The agent name
    /// never contributes to the identifier. A card that changes its own id
    /// is registered again under the new id.
    pub async fn register(&self, registration_url: &str) -> Result<AgentRecord, RegistryError> {
        let registration_url = normalize_registration_url(registration_url);
        if registration_url.is_empty() {
            return Err(RegistryError::validation("url", "must not be blank"));
        }

        let raw = self
            .client
            .fetch_agent_card(registration_url)
            .await
            .map_err(|source| RegistryError::ManifestFetch {
                url: agent_card_url(registration_url),
                source,
            })?;
        let card = validate_agent_card(raw)?;

        let supplied = match card.id.as_deref() {
            Some(raw_id) if !raw_id.trim().is_empty() => {
                let slug = slugify(raw_id, Some(MAX_AGENT_ID_LENGTH));
                if slug.is_empty() {
                    log::warn!(
                        "Agent card id '{}' has no usable characters; generating an id",
                        raw_id
                    );
                    None
                } else {
                    Some(slug)
                }
            }
            _ => None,
        };

        let mut cache = self.cache.write().await;

        if let Some(candidate) = &supplied {
            if let Some(existing) = self.lookup_locked(&mut cache, candidate).await? {
                if existing.matches(registration_url, &card.url) {
                    log::info!("Agent '{}' is already registered", existing.id);
                    return Ok(existing);
                }
            }
        }
        // Without a supplied id the random token cannot be re-derived, so
        // the URL pair identifies the earlier registration.
        if supplied.is_none() {
            if let Some(existing) = cache
                .values()
                .find(|r| r.matches(registration_url, &card.url))
            {
                log::info!("Agent '{}' is already registered", existing.id);
                return Ok(existing.clone());
            }
        }

        let id = match supplied {
            Some(candidate) if !self.is_taken(&cache, &candidate).await => {
                log::info!("Using agent-supplied id '{}'", candidate);
                candidate
            }
            Some(candidate) => {
                log::warn!(
                    "Id '{}' already belongs to another agent; generating a fresh id",
                    candidate
                );
                self.fresh_id(&cache).await
            }
            None => self.fresh_id(&cache).await,
        };

        let record = AgentRecord::new(id, registration_url, card);
        self.files
            .save(&record.id, &record)
            .await
            .map_err(|e| RegistryError::from_file(self.files.path_for(&record.id), e))?;
        cache.insert(record.id.clone(), record.clone());

        log::info!(
            "Registered agent '{}' as '{}' ({} skill(s))",
            record.agent_card.name,
            record.id,
            record.agent_card.skills.len()
        );
        Ok(record)
    }

    /// Look up a record by id, reading through to disk on a cache miss.
    ///
    /// The input is slugged first, so `"Bella"` finds `bella`.
    pub async fn get(&self, id: &str) -> Result<Option<AgentRecord>, RegistryError> {
        let key = slugify(id, Some(MAX_AGENT_ID_LENGTH));
        if key.is_empty() {
            return Ok(None);
        }
        if let Some(record) = self.cache.read().await.get(&key) {
            return Ok(Some(record.clone()));
        }
        let mut cache = self.cache.write().await;
        self.lookup_locked(&mut cache, &key).await
    }

    /// Snapshot of the cached records, ordered by id.
    ///
    /// Does not rescan the disk; call [`AgentRegistry::reload_servers`] first
    /// for an up-to-date view.
    pub async fn list(&self) -> Vec<AgentRecord> {
        self.cache.read().await.values().cloned().collect()
    }

    /// Number of cached records.
    pub async fn len(&self) -> usize {
        self.cache.read().await.len()
    }

    /// Whether the cache is empty.
    pub async fn is_empty(&self) -> bool {
        self.cache.read().await.is_empty()
    }

    /// Remove a record from disk and cache.
    ///
    /// Returns `false` if the id is known to neither. Presence in only one
    /// tier still counts as a successful removal.
    pub async fn remove(&self, id: &str) -> Result<bool, RegistryError> {
        let key = slugify(id, Some(MAX_AGENT_ID_LENGTH));
        if key.is_empty() {
            return Ok(false);
        }

        let mut cache = self.cache.write().await;
        let on_disk = self
            .files
            .remove(&key)
            .await
            .map_err(|e| RegistryError::storage(self.files.path_for(&key), e))?;
        let in_cache = cache.remove(&key).is_some();

        if !on_disk && !in_cache {
            log::debug!("Nothing to remove for '{}'", key);
            return Ok(false);
        }
        log::info!("Removed agent '{}'", key);
        Ok(true)
    }

    /// Cache lookup with disk fallback; caller holds the write guard.
    async fn lookup_locked(
        &self,
        cache: &mut Cache,
        key: &str,
    ) -> Result<Option<AgentRecord>, RegistryError> {
        if let Some(record) = cache.get(key) {
            return Ok(Some(record.clone()));
        }

        let mut record: AgentRecord = match self.files.load(key).await {
            Ok(Some(record)) => record,
            Ok(None) => return Ok(None),
            Err(e) => return Err(RegistryError::from_file(self.files.path_for(key), e)),
        };

        if record.id != key {
            log::warn!(
                "Data integrity: {} stores id '{}'; serving it as '{}'",
                self.files.path_for(key).display(),
                record.id,
                key
            );
            record.id = key.to_string();
        }

        cache.insert(key.to_string(), record.clone());
        Ok(Some(record))
    }

    async fn is_taken(&self, cache: &Cache, id: &str) -> bool {
        cache.contains_key(id) || self.files.exists(id).await
    }

    /// Random identifier not used in cache or on disk.
    async fn fresh_id(&self, cache: &Cache) -> String {
        loop {
            let mut token = Uuid::new_v4().simple().to_string();
            token.truncate(MAX_AGENT_ID_LENGTH);
            if !self.is_taken(cache, &token).await {
                log::info!("Generated id '{}'", token);
                return token;
            }
        }
    }
}

/// Registration URLs compare without surrounding whitespace or trailing `/`.
fn normalize_registration_url(url: &str) -> &str {
    url.trim().trim_end_matches('/')
}

/// An id is valid if it is its own bounded slug.
fn is_valid_id(id: &str) -> bool {
    !id.is_empty() && slugify(id, Some(MAX_AGENT_ID_LENGTH)) == id
}
