// src/fs/mock.rs

use super::FileSystem;
use anyhow::{anyhow, Result};
use std::collections::{HashMap, HashSet};
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

/// Symlink hops followed before a path is treated as dangling.
const MAX_LINK_DEPTH: usize = 8;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MockEntry {
    File(Vec<u8>),
    Dir(Vec<String>), // List of child names
    Symlink(PathBuf),
}

#[derive(Debug, Default)]
struct MockState {
    entries: HashMap<PathBuf, MockEntry>,
    readonly: HashSet<PathBuf>,
}

/// In-memory filesystem for tests.
///
/// Paths are used as given (no normalisation), so tests should stick to
/// absolute paths.
#[derive(Debug, Clone, Default)]
pub struct MockFileSystem {
    state: Arc<Mutex<MockState>>,
}

impl MockFileSystem {
    pub fn new() -> Self {
        let mut state = MockState::default();
        // Ensure root exists
        state.entries.insert(PathBuf::from("."), MockEntry::Dir(Vec::new()));
        state.entries.insert(PathBuf::from("/"), MockEntry::Dir(Vec::new()));

        Self {
            state: Arc::new(Mutex::new(state)),
        }
    }

    fn lock(&self) -> MutexGuard<'_, MockState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    pub fn add_file(&self, path: impl AsRef<Path>, content: impl Into<Vec<u8>>) {
        let mut state = self.lock();
        insert_entry(&mut state.entries, path.as_ref(), MockEntry::File(content.into()));
    }

    pub fn add_dir(&self, path: impl AsRef<Path>) {
        let mut state = self.lock();
        ensure_dir_entry(&mut state.entries, path.as_ref());
    }

    pub fn add_symlink(&self, link: impl AsRef<Path>, original: impl AsRef<Path>) {
        let mut state = self.lock();
        insert_entry(
            &mut state.entries,
            link.as_ref(),
            MockEntry::Symlink(original.as_ref().to_path_buf()),
        );
    }

    /// Mark a directory as not accepting new entries.
    pub fn set_readonly(&self, path: impl AsRef<Path>) {
        self.lock().readonly.insert(path.as_ref().to_path_buf());
    }

    /// Raw entry at `path`, without following symlinks.
    pub fn entry(&self, path: impl AsRef<Path>) -> Option<MockEntry> {
        self.lock().entries.get(path.as_ref()).cloned()
    }

    /// Every path currently present, sorted.
    pub fn paths(&self) -> Vec<PathBuf> {
        let mut paths: Vec<PathBuf> = self.lock().entries.keys().cloned().collect();
        paths.sort();
        paths
    }

    fn resolve(&self, path: &Path) -> Option<MockEntry> {
        let state = self.lock();
        let mut current = path.to_path_buf();
        for _ in 0..=MAX_LINK_DEPTH {
            match state.entries.get(&current)? {
                MockEntry::Symlink(target) => current = target.clone(),
                entry => return Some(entry.clone()),
            }
        }
        None
    }
}

fn parent_of(path: &Path) -> Option<&Path> {
    match path.parent() {
        Some(parent) if parent.as_os_str().is_empty() => Some(Path::new(".")),
        other => other,
    }
}

fn insert_entry(entries: &mut HashMap<PathBuf, MockEntry>, path: &Path, entry: MockEntry) {
    entries.insert(path.to_path_buf(), entry);

    // Ensure parent directories exist implicitly for simplicity in this mock
    if let Some(parent) = parent_of(path) {
        ensure_dir_entry(entries, parent);
        link_child(entries, parent, path);
    }
}

fn ensure_dir_entry(entries: &mut HashMap<PathBuf, MockEntry>, path: &Path) {
    if entries.contains_key(path) {
        return;
    }
    entries.insert(path.to_path_buf(), MockEntry::Dir(Vec::new()));
    if let Some(parent) = parent_of(path) {
        if parent != path {
            // Avoid infinite loop at root
            ensure_dir_entry(entries, parent);
            link_child(entries, parent, path);
        }
    }
}

fn link_child(entries: &mut HashMap<PathBuf, MockEntry>, parent: &Path, path: &Path) {
    if let Some(MockEntry::Dir(children)) = entries.get_mut(parent) {
        if let Some(name) = path.file_name().and_then(|n| n.to_str()) {
            if !children.iter().any(|c| c == name) {
                children.push(name.to_string());
            }
        }
    }
}

fn unlink_child(entries: &mut HashMap<PathBuf, MockEntry>, path: &Path) {
    let (Some(parent), Some(name)) = (parent_of(path), path.file_name().and_then(|n| n.to_str()))
    else {
        return;
    };
    if let Some(MockEntry::Dir(children)) = entries.get_mut(parent) {
        children.retain(|c| c != name);
    }
}

impl FileSystem for MockFileSystem {
    fn read_to_string(&self, path: &Path) -> Result<String> {
        match self.resolve(path) {
            Some(MockEntry::File(content)) => {
                String::from_utf8(content).map_err(|e| anyhow!("Invalid UTF-8: {}", e))
            }
            Some(_) => Err(anyhow!("Is a directory: {:?}", path)),
            None => Err(anyhow!("File not found: {:?}", path)),
        }
    }

    fn write(&self, path: &Path, contents: &[u8]) -> Result<()> {
        self.add_file(path, contents);
        Ok(())
    }

    fn create_dir_all(&self, path: &Path) -> Result<()> {
        match self.entry(path) {
            Some(MockEntry::File(_)) => Err(anyhow!("File exists: {:?}", path)),
            _ => {
                self.add_dir(path);
                Ok(())
            }
        }
    }

    fn exists(&self, path: &Path) -> bool {
        self.resolve(path).is_some()
    }

    fn is_file(&self, path: &Path) -> bool {
        matches!(self.resolve(path), Some(MockEntry::File(_)))
    }

    fn is_dir(&self, path: &Path) -> bool {
        matches!(self.resolve(path), Some(MockEntry::Dir(_)))
    }

    fn is_symlink(&self, path: &Path) -> bool {
        matches!(self.entry(path), Some(MockEntry::Symlink(_)))
    }

    fn is_writable(&self, path: &Path) -> bool {
        self.is_dir(path) && !self.lock().readonly.contains(path)
    }

    fn read_dir(&self, path: &Path) -> Result<Vec<PathBuf>> {
        match self.resolve(path) {
            Some(MockEntry::Dir(children)) => {
                Ok(children.iter().map(|name| path.join(name)).collect())
            }
            _ => Err(anyhow!("Not a directory or not found: {:?}", path)),
        }
    }

    fn remove_file(&self, path: &Path) -> Result<()> {
        let mut state = self.lock();
        let is_dir = match state.entries.get(path) {
            Some(entry) => matches!(entry, MockEntry::Dir(_)),
            None => return Err(anyhow!("File not found: {:?}", path)),
        };
        if is_dir {
            return Err(anyhow!("Is a directory: {:?}", path));
        }
        state.entries.remove(path);
        unlink_child(&mut state.entries, path);
        Ok(())
    }

    fn symlink(&self, original: &Path, link: &Path) -> Result<()> {
        let mut state = self.lock();
        if state.entries.contains_key(link) {
            return Err(anyhow!("File exists: {:?}", link));
        }
        let parent = parent_of(link).ok_or_else(|| anyhow!("No parent: {:?}", link))?;
        if !matches!(state.entries.get(parent), Some(MockEntry::Dir(_))) {
            return Err(anyhow!("Not a directory or not found: {:?}", parent));
        }
        if state.readonly.contains(parent) {
            return Err(anyhow!("Permission denied: {:?}", link));
        }
        insert_entry(
            &mut state.entries,
            link,
            MockEntry::Symlink(original.to_path_buf()),
        );
        Ok(())
    }
}
