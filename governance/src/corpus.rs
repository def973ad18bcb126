//! Docs-root discovery: which files belong to which record kind.
//!
//! Missing kind directories are treated as empty. A docs root that exists
//! but is not a directory is an infrastructure error.

use std::collections::BTreeSet;
use std::ffi::OsStr;
use std::path::{Path, PathBuf};
use walkdir::WalkDir;

use crate::config::{GovernanceConfig, LayoutConfig};
use crate::error::{GovernanceError, Result};
use crate::frontmatter::{FrontMatter, extract};
use crate::ids::IdKind;
use crate::schema::RecordKind;

/// Files with this suffix are authoring templates and never validated.
pub const TEMPLATE_SUFFIX: &str = "-TEMPLATE.md";

/// One governance Markdown file and its parsed front matter.
#[derive(Debug, Clone, PartialEq)]
pub struct Document {
    pub path: PathBuf,
    /// Path relative to the docs root, used in reports.
    pub file: String,
    pub front_matter: FrontMatter,
}

impl Document {
    /// File name without `.md`, e.g. `ROAD-001`.
    pub fn stem(&self) -> Option<&str> {
        self.path.file_stem().and_then(OsStr::to_str)
    }
}

#[derive(Debug, Clone)]
pub struct Corpus {
    root: PathBuf,
    layout: LayoutConfig,
}

impl Corpus {
    pub fn new(root: impl Into<PathBuf>, layout: LayoutConfig) -> Self {
        Self {
            root: root.into(),
            layout,
        }
    }

    pub fn from_config(config: &GovernanceConfig) -> Self {
        Self::new(config.docs_root.clone(), config.layout.clone())
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Fails only when the root exists and is not a directory.
    pub fn check_root(&self) -> Result<()> {
        if self.root.exists() && !self.root.is_dir() {
            return Err(GovernanceError::NotADirectory(self.root.clone()));
        }
        Ok(())
    }

    pub fn dir(&self, kind: RecordKind) -> PathBuf {
        let name = match kind {
            RecordKind::Roadmap => &self.layout.roads_dir,
            RecordKind::Adr => &self.layout.adr_dir,
            RecordKind::Change => &self.layout.changes_dir,
            RecordKind::Nfr => &self.layout.nfr_dir,
        };
        self.root.join(name)
    }

    pub fn capabilities_dir(&self) -> PathBuf {
        self.root.join(&self.layout.capabilities_dir)
    }

    pub fn features_dir(&self) -> PathBuf {
        self.root.join(&self.layout.features_dir)
    }

    /// `<PREFIX>*.md` files directly inside the kind's directory, sorted by name.
    pub fn record_files(&self, kind: RecordKind) -> Result<Vec<PathBuf>> {
        self.check_root()?;
        prefixed_markdown(&self.dir(kind), kind.file_prefix())
    }

    /// Read and extract every record file of `kind`.
    pub fn load(&self, kind: RecordKind) -> Result<Vec<Document>> {
        let files = self.record_files(kind)?;
        tracing::debug!(
            kind = kind.display_name(),
            count = files.len(),
            dir = %self.dir(kind).display(),
            "listed record files"
        );
        Ok(files.into_iter().map(|path| self.read(path)).collect())
    }

    /// Read one file. Read failures become per-document parse errors.
    pub fn read(&self, path: PathBuf) -> Document {
        let front_matter = match std::fs::read_to_string(&path) {
            Ok(text) => extract(&text),
            Err(err) => {
                tracing::warn!(path = %path.display(), error = %err, "unreadable record file");
                FrontMatter::unreadable(err.to_string())
            }
        };
        Document {
            file: self.relative(&path),
            path,
            front_matter,
        }
    }

    /// `*.feature` files anywhere below the features directory, sorted.
    pub fn feature_files(&self) -> Result<Vec<PathBuf>> {
        self.check_root()?;
        let dir = self.features_dir();
        if !dir.is_dir() {
            return Ok(Vec::new());
        }

        let mut files = Vec::new();
        for entry in WalkDir::new(&dir)
            .min_depth(1)
            .follow_links(false)
            .sort_by_file_name()
        {
            let entry = entry.map_err(|e| GovernanceError::directory_read(&dir, e))?;
            if entry.file_type().is_file()
                && entry.path().extension().and_then(OsStr::to_str) == Some("feature")
            {
                files.push(entry.into_path());
            }
        }
        Ok(files)
    }

    /// Capability ids declared by `capabilities/CAP-*.md`: the front-matter
    /// `id` when present, else the file stem.
    pub fn capability_ids(&self) -> Result<BTreeSet<String>> {
        self.check_root()?;
        let files = prefixed_markdown(&self.capabilities_dir(), IdKind::Capability.prefix())?;
        let mut ids = BTreeSet::new();
        for path in files {
            let doc = self.read(path);
            let declared = doc
                .front_matter
                .record
                .as_ref()
                .ok()
                .and_then(|record| record.str_at("id"))
                .map(str::to_string);
            if let Some(id) = declared.or_else(|| doc.stem().map(str::to_string)) {
                ids.insert(id);
            }
        }
        Ok(ids)
    }

    /// Display path relative to the docs root.
    pub fn relative(&self, path: &Path) -> String {
        path.strip_prefix(&self.root)
            .unwrap_or(path)
            .to_string_lossy()
            .replace('\\', "/")
    }
}

fn prefixed_markdown(dir: &Path, prefix: &str) -> Result<Vec<PathBuf>> {
    if !dir.is_dir() {
        return Ok(Vec::new());
    }

    let mut files = Vec::new();
    for entry in WalkDir::new(dir)
        .min_depth(1)
        .max_depth(1)
        .follow_links(false)
        .sort_by_file_name()
    {
        let entry = entry.map_err(|e| GovernanceError::directory_read(dir, e))?;
        if !entry.file_type().is_file() {
            continue;
        }
        let Some(name) = entry.file_name().to_str() else {
            continue;
        };
        if name.starts_with(prefix) && name.ends_with(".md") && !name.ends_with(TEMPLATE_SUFFIX) {
            files.push(entry.into_path());
        }
    }
    Ok(files)
}
