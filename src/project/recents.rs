//! Recently opened projects
//!
//! Small JSON list under the user config directory. Persistence is
//! best-effort: a missing or corrupt file just means an empty list.

use std::fs;
use std::path::{Path, PathBuf};

use serde::{Serialize, Deserialize};

use crate::history::now_ms;
use super::limits::MAX_RECENT_PROJECTS;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RecentEntry {
    pub name: String,
    pub path: PathBuf,
    /// Last open time, ms since epoch
    pub opened_at: u64,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RecentProjects {
    pub entries: Vec<RecentEntry>,
}

impl RecentProjects {
    /// Record a project at the front of the list, deduplicating by path
    pub fn remember(&mut self, name: &str, path: &Path) {
        self.entries.retain(|e| e.path != path);
        self.entries.insert(0, RecentEntry {
            name: name.to_string(),
            path: path.to_path_buf(),
            opened_at: now_ms(),
        });
        self.entries.truncate(MAX_RECENT_PROJECTS);
    }

    /// Drop an entry, e.g. after the file went missing
    pub fn forget(&mut self, path: &Path) {
        self.entries.retain(|e| e.path != path);
    }

    pub fn load_from(path: &Path) -> RecentProjects {
        let Ok(contents) = fs::read_to_string(path) else {
            return RecentProjects::default();
        };
        let mut recents: RecentProjects =
            serde_json::from_str(&contents).unwrap_or_default();
        recents.entries.truncate(MAX_RECENT_PROJECTS);
        recents
    }

    pub fn save_to(&self, path: &Path) {
        if let Some(parent) = path.parent() {
            let _ = fs::create_dir_all(parent);
        }
        if let Ok(contents) = serde_json::to_string_pretty(self) {
            let _ = fs::write(path, contents);
        }
    }

    /// Load from the default location in the user config directory
    pub fn load() -> RecentProjects {
        Self::load_from(&recents_file_path())
    }

    /// Save to the default location in the user config directory
    pub fn save(&self) {
        self.save_to(&recents_file_path());
    }
}

fn recents_file_path() -> PathBuf {
    dirs::config_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("photostage")
        .join("recent_projects.json")
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn remember_puts_newest_first_and_dedupes() {
        let mut recents = RecentProjects::default();
        recents.remember("One", Path::new("/tmp/one.photostage"));
        recents.remember("Two", Path::new("/tmp/two.photostage"));
        recents.remember("One again", Path::new("/tmp/one.photostage"));

        assert_eq!(recents.entries.len(), 2);
        assert_eq!(recents.entries[0].name, "One again");
        assert_eq!(recents.entries[1].name, "Two");
    }

    #[test]
    fn list_is_capped() {
        let mut recents = RecentProjects::default();
        for i in 0..25 {
            recents.remember(&format!("P{}", i), Path::new(&format!("/tmp/p{}.photostage", i)));
        }
        assert_eq!(recents.entries.len(), MAX_RECENT_PROJECTS);
        assert_eq!(recents.entries[0].name, "P24");
    }

    #[test]
    fn forget_removes_entry() {
        let mut recents = RecentProjects::default();
        recents.remember("One", Path::new("/tmp/one.photostage"));
        recents.remember("Two", Path::new("/tmp/two.photostage"));
        recents.forget(Path::new("/tmp/one.photostage"));
        assert_eq!(recents.entries.len(), 1);
        assert_eq!(recents.entries[0].name, "Two");
    }

    #[test]
    fn round_trip_on_disk() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("recent_projects.json");

        let mut recents = RecentProjects::default();
        recents.remember("Beach Day", Path::new("/photos/beach.photostage"));
        recents.save_to(&path);

        let loaded = RecentProjects::load_from(&path);
        assert_eq!(loaded.entries, recents.entries);
    }

    #[test]
    fn corrupt_file_degrades_to_empty() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("recent_projects.json");
        fs::write(&path, "{not json").unwrap();

        let loaded = RecentProjects::load_from(&path);
        assert!(loaded.entries.is_empty());
    }

    #[test]
    fn missing_file_degrades_to_empty() {
        let dir = TempDir::new().unwrap();
        let loaded = RecentProjects::load_from(&dir.path().join("nope.json"));
        assert!(loaded.entries.is_empty());
    }
}
