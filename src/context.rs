use crate::error::QscaleError;
use crate::Result;
use anyhow::Context;
use std::path::{Path, PathBuf};
use walkdir::WalkDir;

/// Byte-compiled Python caches never go into prompts
const PYCACHE_DIR: &str = "__pycache__";

/// Ordering priority for a file; lower sorts first
///
/// Exact file names win over extensions. Unknown files get 0 and lead the list.
pub fn file_priority(path: &Path) -> u8 {
    let name = path.file_name().and_then(|n| n.to_str()).unwrap_or_default();
    match name {
        "manifest.json" => return 1,
        "__init__.py" => return 2,
        _ => {}
    }

    match path.extension().and_then(|e| e.to_str()) {
        Some("py") => 5,
        Some("yaml") => 8,
        Some("json") => 10,
        _ => 0,
    }
}

/// A file of an integration, read for prompt assembly
#[derive(Debug, Clone)]
pub struct IntegrationFile {
    /// Path relative to the integration directory, `/`-separated
    pub relative_path: String,
    pub content: String,
}

/// A resolved integration inside a Home Assistant core checkout
#[derive(Debug, Clone)]
pub struct IntegrationContext {
    pub core_path: PathBuf,
    pub name: String,
    pub path: PathBuf,
}

impl IntegrationContext {
    /// Resolve `<core>/homeassistant/components/<integration>`
    pub fn resolve(core_path: &Path, integration: &str) -> Result<Self> {
        let core_path = match core_path.canonicalize() {
            Ok(path) if path.is_dir() => path,
            _ => return Err(QscaleError::CorePathMissing(core_path.to_path_buf()).into()),
        };

        let path = core_path
            .join("homeassistant")
            .join("components")
            .join(integration);
        if !path.is_dir() {
            return Err(QscaleError::IntegrationPathMissing(path).into());
        }

        Ok(Self {
            core_path,
            name: integration.to_string(),
            path,
        })
    }

    /// Read the integration's files in prompt order
    pub fn files(&self, max_file_bytes: u64) -> Result<Vec<IntegrationFile>> {
        list_integration_files(&self.path, max_file_bytes)
    }

    /// All integration files rendered as one attachment block
    pub fn bundle(&self, max_file_bytes: u64) -> Result<String> {
        Ok(bundle_files(&self.name, &self.files(max_file_bytes)?))
    }
}

/// List every regular file below `root`, skipping `__pycache__`
///
/// Directory entries are walked in file-name order, then stably sorted by
/// [`file_priority`], so the result is deterministic for a given tree.
pub fn list_integration_files(root: &Path, max_file_bytes: u64) -> Result<Vec<IntegrationFile>> {
    let mut paths = Vec::new();

    let walker = WalkDir::new(root)
        .min_depth(1)
        .sort_by_file_name()
        .into_iter()
        .filter_entry(|e| e.file_name() != PYCACHE_DIR);

    for entry in walker {
        let entry = entry.with_context(|| format!("Failed to walk {}", root.display()))?;
        if !entry.file_type().is_file() {
            continue;
        }
        paths.push(entry.into_path());
    }

    paths.sort_by_key(|path| file_priority(path));

    let mut files = Vec::with_capacity(paths.len());
    let mut skipped_count = 0;

    for path in paths {
        let relative_path = path
            .strip_prefix(root)
            .unwrap_or(&path)
            .components()
            .map(|c| c.as_os_str().to_string_lossy())
            .collect::<Vec<_>>()
            .join("/");

        let size = std::fs::metadata(&path)
            .with_context(|| format!("Failed to stat {}", path.display()))?
            .len();
        if size > max_file_bytes {
            tracing::warn!(file = %relative_path, size, "skipping file above size limit");
            skipped_count += 1;
            continue;
        }

        let content = match std::fs::read_to_string(&path) {
            Ok(content) => content,
            Err(e) if e.kind() == std::io::ErrorKind::InvalidData => {
                tracing::warn!(file = %relative_path, "skipping file that is not UTF-8");
                skipped_count += 1;
                continue;
            }
            Err(e) => {
                return Err(e).with_context(|| format!("Failed to read {}", path.display()));
            }
        };

        files.push(IntegrationFile {
            relative_path,
            content,
        });
    }

    if skipped_count > 0 {
        tracing::info!(skipped = skipped_count, "some integration files were left out");
    }

    Ok(files)
}

/// Render files as prompt attachments
pub fn bundle_files(integration: &str, files: &[IntegrationFile]) -> String {
    let mut out = String::new();
    for file in files {
        out.push_str(&format!(
            "\n\n--- FILE: homeassistant/components/{}/{} ---\n\n",
            integration, file.relative_path
        ));
        out.push_str(&file.content);
        out.push_str("\n--- END FILE ---");
    }
    out.trim().to_string()
}
