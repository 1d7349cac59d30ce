//! Where asset bytes come from.
//!
//! Each platform supplies one [`AssetSource`]; providers only ever see the
//! trait. Readers handed out by `open` are scoped to a single load.

use std::{
    collections::HashMap,
    fs::{self, File},
    io::{BufReader, Cursor, Read},
    path::{Component, Path, PathBuf},
    sync::Arc,
};

use anyhow::{Context, Result};
use corelib::{ResourceError, ResourceResult};

pub trait AssetSource: Send + Sync {
    /// Open the resource called `name` (extension included).
    fn open(&self, name: &str) -> ResourceResult<Box<dyn Read + '_>>;

    /// Short label for log lines.
    fn describe(&self) -> String;

    /// Read the whole resource.
    fn read_all(&self, name: &str) -> ResourceResult<Vec<u8>> {
        let mut reader = self.open(name)?;
        let mut bytes = Vec::new();
        reader
            .read_to_end(&mut bytes)
            .map_err(|e| ResourceError::from_io(name, e))?;
        Ok(bytes)
    }
}

/// Assets laid out in a directory on disk.
#[derive(Clone, Debug)]
pub struct DirSource {
    root: PathBuf,
}

impl DirSource {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Only plain relative names resolve; anything that could leave the root
    /// is reported as missing.
    fn resolve(&self, name: &str) -> ResourceResult<PathBuf> {
        let rel = Path::new(name);
        let plain = !name.is_empty()
            && rel
                .components()
                .all(|c| matches!(c, Component::Normal(_) | Component::CurDir));
        if !plain {
            return Err(ResourceError::NotFound(name.to_owned()));
        }
        Ok(self.root.join(rel))
    }
}

impl AssetSource for DirSource {
    fn open(&self, name: &str) -> ResourceResult<Box<dyn Read + '_>> {
        let path = self.resolve(name)?;
        let file = File::open(&path).map_err(|e| ResourceError::from_io(name, e))?;
        log::trace!("Opened {}", path.display());
        Ok(Box::new(BufReader::new(file)))
    }

    fn describe(&self) -> String {
        format!("dir:{}", self.root.display())
    }
}

/// Assets held in memory, keyed by name with `/` separators.
#[derive(Clone, Debug, Default)]
pub struct BundleSource {
    entries: HashMap<String, Arc<[u8]>>,
}

impl BundleSource {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, name: impl Into<String>, bytes: impl Into<Arc<[u8]>>) {
        self.entries.insert(name.into(), bytes.into());
    }

    /// Chainable [`BundleSource::insert`].
    pub fn with(mut self, name: impl Into<String>, bytes: impl Into<Arc<[u8]>>) -> Self {
        self.insert(name, bytes);
        self
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Eagerly read every file under `root`.
    pub fn from_dir(root: impl AsRef<Path>) -> Result<Self> {
        let root = root.as_ref();
        let mut bundle = Self::new();
        let mut pending = vec![root.to_path_buf()];

        while let Some(dir) = pending.pop() {
            let entries = fs::read_dir(&dir)
                .with_context(|| format!("Failed to list asset dir: {}", dir.display()))?;
            for entry in entries {
                let path = entry
                    .with_context(|| format!("Failed to read entry in {}", dir.display()))?
                    .path();
                if path.is_dir() {
                    pending.push(path);
                    continue;
                }
                let name = bundle_name(root, &path)?;
                let bytes = fs::read(&path)
                    .with_context(|| format!("Failed to read asset: {}", path.display()))?;
                bundle.insert(name, bytes);
            }
        }

        log::info!("Bundled {} assets from {}", bundle.len(), root.display());
        Ok(bundle)
    }
}

fn bundle_name(root: &Path, path: &Path) -> Result<String> {
    let rel = path
        .strip_prefix(root)
        .with_context(|| format!("{} is outside {}", path.display(), root.display()))?;
    let parts: Vec<String> = rel
        .components()
        .map(|c| c.as_os_str().to_string_lossy().into_owned())
        .collect();
    Ok(parts.join("/"))
}

impl AssetSource for BundleSource {
    fn open(&self, name: &str) -> ResourceResult<Box<dyn Read + '_>> {
        let bytes = self
            .entries
            .get(name)
            .ok_or_else(|| ResourceError::NotFound(name.to_owned()))?;
        Ok(Box::new(Cursor::new(&bytes[..])))
    }

    fn describe(&self) -> String {
        format!("bundle:{} entries", self.entries.len())
    }
}
