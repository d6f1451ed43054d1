//! Host platform collaborators: state machine, entity registry, exposure
//! policy and filesystem allow-list.

use std::collections::BTreeSet;
use std::path::{Component, Path, PathBuf};

use serde::{Deserialize, Serialize};

/// Live state of one host entity.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct EntityState {
    pub entity_id: String,
    pub name: String,
    pub state: String,
}

pub trait Host: Send + Sync {
    /// Configured location name of the installation.
    fn location_name(&self) -> String;

    /// All current states, in host enumeration order.
    fn states(&self) -> Vec<EntityState>;

    fn state(&self, entity_id: &str) -> Option<EntityState>;

    /// Whether `entity_id` may be shared with the given assistant.
    fn should_expose(&self, assistant: &str, entity_id: &str) -> bool;

    /// Registry aliases for `entity_id`; empty when the entity has none or is
    /// not registered.
    fn entity_aliases(&self, entity_id: &str) -> BTreeSet<String>;

    fn is_allowed_path(&self, path: &Path) -> bool;
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HostEntity {
    pub entity_id: String,
    pub name: String,
    pub state: String,
    #[serde(default)]
    pub aliases: BTreeSet<String>,
    #[serde(default = "HostEntity::default_exposed")]
    pub exposed: bool,
}

impl HostEntity {
    const fn default_exposed() -> bool {
        true
    }
}

/// A fixed host snapshot, loadable from JSON.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct InMemoryHost {
    #[serde(default = "InMemoryHost::default_location_name")]
    pub location_name: String,
    #[serde(default)]
    pub allowlist_external_dirs: Vec<PathBuf>,
    #[serde(default)]
    pub entities: Vec<HostEntity>,
}

impl InMemoryHost {
    fn default_location_name() -> String {
        "Home".to_string()
    }

    pub fn from_json(json: &str) -> anyhow::Result<Self> {
        Ok(serde_json::from_str(json)?)
    }

    pub fn load(path: &Path) -> anyhow::Result<Self> {
        let content = std::fs::read_to_string(path).map_err(|e| {
            anyhow::anyhow!("Failed to read host snapshot {}: {e}", path.display())
        })?;
        Self::from_json(&content)
    }

    #[must_use]
    pub fn with_entity(mut self, entity: HostEntity) -> Self {
        self.entities.push(entity);
        self
    }

    #[must_use]
    pub fn with_allowed_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.allowlist_external_dirs.push(dir.into());
        self
    }

    fn find(&self, entity_id: &str) -> Option<&HostEntity> {
        self.entities.iter().find(|e| e.entity_id == entity_id)
    }
}

impl Host for InMemoryHost {
    fn location_name(&self) -> String {
        self.location_name.clone()
    }

    fn states(&self) -> Vec<EntityState> {
        self.entities
            .iter()
            .map(|e| EntityState {
                entity_id: e.entity_id.clone(),
                name: e.name.clone(),
                state: e.state.clone(),
            })
            .collect()
    }

    fn state(&self, entity_id: &str) -> Option<EntityState> {
        self.find(entity_id).map(|e| EntityState {
            entity_id: e.entity_id.clone(),
            name: e.name.clone(),
            state: e.state.clone(),
        })
    }

    fn should_expose(&self, _assistant: &str, entity_id: &str) -> bool {
        self.find(entity_id).is_some_and(|e| e.exposed)
    }

    fn entity_aliases(&self, entity_id: &str) -> BTreeSet<String> {
        self.find(entity_id)
            .map(|e| e.aliases.clone())
            .unwrap_or_default()
    }

    fn is_allowed_path(&self, path: &Path) -> bool {
        path_within_dirs(path, &self.allowlist_external_dirs)
    }
}

/// Lexically resolve `.` and `..` without touching the filesystem.
fn normalize_lexically(path: &Path) -> PathBuf {
    let mut out = PathBuf::new();
    for component in path.components() {
        match component {
            Component::CurDir => {}
            Component::ParentDir => {
                out.pop();
            }
            other => out.push(other.as_os_str()),
        }
    }
    out
}

fn resolve(path: &Path) -> PathBuf {
    std::fs::canonicalize(path).unwrap_or_else(|_| normalize_lexically(path))
}

/// True when `path` is absolute and, once resolved, lies under one of `dirs`.
#[must_use]
pub fn path_within_dirs(path: &Path, dirs: &[PathBuf]) -> bool {
    if !path.is_absolute() {
        return false;
    }
    let resolved = resolve(path);
    dirs.iter()
        .filter(|dir| dir.is_absolute())
        .any(|dir| resolved.starts_with(resolve(dir)))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn entity(entity_id: &str, exposed: bool) -> HostEntity {
        HostEntity {
            entity_id: entity_id.to_string(),
            name: entity_id.to_string(),
            state: "on".to_string(),
            aliases: BTreeSet::new(),
            exposed,
        }
    }

    #[test]
    fn test_in_memory_host_from_json() {
        let host = InMemoryHost::from_json(
            r#"{
                "location_name": "Cabin",
                "allowlist_external_dirs": ["/media"],
                "entities": [
                    {"entity_id": "light.porch", "name": "Porch", "state": "off",
                     "aliases": ["front light"]},
                    {"entity_id": "lock.door", "name": "Door", "state": "locked", "exposed": false}
                ]
            }"#,
        )
        .unwrap();

        assert_eq!(host.location_name(), "Cabin");
        assert_eq!(host.states().len(), 2);
        assert!(host.should_expose("conversation", "light.porch"));
        assert!(!host.should_expose("conversation", "lock.door"));
        assert!(!host.should_expose("conversation", "sensor.missing"));
        assert!(host.entity_aliases("light.porch").contains("front light"));
        assert!(host.entity_aliases("lock.door").is_empty());
    }

    #[test]
    fn test_path_allow_list() {
        let host = InMemoryHost::default()
            .with_entity(entity("light.a", true))
            .with_allowed_dir("/srv/homevertex-allowed");

        assert!(host.is_allowed_path(Path::new("/srv/homevertex-allowed/cam/snap.jpg")));
        assert!(!host.is_allowed_path(Path::new("/srv/other/snap.jpg")));
        assert!(!host.is_allowed_path(Path::new(
            "/srv/homevertex-allowed/../other/snap.jpg"
        )));
        assert!(!host.is_allowed_path(Path::new("homevertex-allowed/snap.jpg")));
    }

    #[test]
    fn test_normalize_lexically() {
        assert_eq!(
            normalize_lexically(Path::new("/a/./b/../c")),
            PathBuf::from("/a/c")
        );
    }
}
