//! studio-bridge-batch: Directory-level conversion between editor and content trees
//!
//! This crate provides:
//! - Single document conversion from JSON string to JSON string
//! - Document discovery in a directory
//! - Parallel batch conversion with per-file error collection

use rayon::prelude::*;
use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};
use studio_bridge_core::{
    BridgeOptions, to_content_tree_with_options, to_editor_tree_with_options,
};
use studio_minimark::MinimarkTree;
use studio_tiptap::EditorDoc;

/// Extension of content tree files
pub const CONTENT_EXTENSION: &str = "minimark.json";

/// Extension of editor document files
pub const EDITOR_EXTENSION: &str = "tiptap.json";

/// Errors that can occur during batch operations
#[derive(Debug, thiserror::Error)]
pub enum BatchError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Invalid JSON: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Directory not found: {0}")]
    DirectoryNotFound(PathBuf),
}

/// Result type for batch operations
pub type Result<T> = std::result::Result<T, BatchError>;

/// Conversion direction
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    /// Editor document to content tree
    ToContent,
    /// Content tree to editor document
    ToEditor,
}

impl Direction {
    /// Default extension of the files this direction writes
    pub fn output_extension(&self) -> &'static str {
        match self {
            Direction::ToContent => CONTENT_EXTENSION,
            Direction::ToEditor => EDITOR_EXTENSION,
        }
    }
}

/// Convert one JSON document
///
/// Input must be an editor document for [`Direction::ToContent`] and a
/// content tree for [`Direction::ToEditor`].
pub fn convert_str(
    input: &str,
    direction: Direction,
    options: &BridgeOptions,
    pretty: bool,
) -> Result<String> {
    let output = match direction {
        Direction::ToContent => {
            let doc = EditorDoc::from_json_str(input)?;
            to_content_tree_with_options(&doc, options).to_json_string(pretty)?
        }
        Direction::ToEditor => {
            let tree = MinimarkTree::from_json_str(input)?;
            to_editor_tree_with_options(&tree, options).to_json_string(pretty)?
        }
    };
    Ok(output)
}

/// JSON documents found under a directory
#[derive(Debug, Clone)]
pub struct DocumentSet {
    /// Root directory the files were collected from
    pub root: PathBuf,
    /// Collected `.json` files, sorted
    pub files: Vec<PathBuf>,
}

impl DocumentSet {
    /// Collect every `.json` file in a directory
    pub fn from_directory(path: &Path, recursive: bool) -> Result<Self> {
        if !path.is_dir() {
            return Err(BatchError::DirectoryNotFound(path.to_path_buf()));
        }

        let mut files = collect_json_files(path, recursive)?;
        files.sort();

        Ok(Self {
            root: path.to_path_buf(),
            files,
        })
    }
}

/// Options for batch conversion
#[derive(Debug, Clone)]
pub struct BatchOptions {
    pub direction: Direction,
    /// Output directory for converted files
    pub output_dir: PathBuf,
    /// Extension of written files (None = the direction's default)
    pub output_extension: Option<String>,
    pub bridge: BridgeOptions,
    /// Pretty-print output JSON
    pub pretty: bool,
    /// Number of parallel jobs (None = use all CPUs)
    pub parallel_jobs: Option<usize>,
}

impl Default for BatchOptions {
    fn default() -> Self {
        Self {
            direction: Direction::ToContent,
            output_dir: PathBuf::from("."),
            output_extension: None,
            bridge: BridgeOptions::default(),
            pretty: false,
            parallel_jobs: None,
        }
    }
}

impl BatchOptions {
    fn extension(&self) -> &str {
        self.output_extension
            .as_deref()
            .unwrap_or(self.direction.output_extension())
    }
}

/// Result of a batch conversion
#[derive(Debug)]
pub struct BatchResult {
    /// Number of successfully converted files
    pub success_count: usize,
    /// Files that failed to convert, with their errors
    pub failed_files: Vec<(PathBuf, String)>,
    /// Output files that were created
    pub output_files: Vec<PathBuf>,
}

/// Convert every document in the set
///
/// Files already carrying the output extension are skipped. A failing file
/// never aborts the batch; it is reported in [`BatchResult::failed_files`].
/// When several inputs map to the same output path (`page.json` and
/// `page.tiptap.json`), the first in sorted order is converted and the
/// rest are reported as failed.
pub fn convert_documents(set: &DocumentSet, options: &BatchOptions) -> Result<BatchResult> {
    // Configure thread pool if specified
    if let Some(n) = options.parallel_jobs {
        rayon::ThreadPoolBuilder::new()
            .num_threads(n)
            .build_global()
            .ok();
    }

    fs::create_dir_all(&options.output_dir)?;

    let (jobs, mut failed_files) = plan_outputs(set, options);

    let results: Vec<_> = jobs
        .par_iter()
        .map(|(input, output)| convert_single_file(input, output, options))
        .collect();

    let mut success_count = 0;
    let mut output_files = Vec::new();

    for result in results {
        match result {
            Ok(output_path) => {
                success_count += 1;
                output_files.push(output_path);
            }
            Err((path, error)) => {
                tracing::warn!(file = %path.display(), %error, "conversion failed");
                failed_files.push((path, error));
            }
        }
    }
    failed_files.sort();

    Ok(BatchResult {
        success_count,
        failed_files,
        output_files,
    })
}

/// Pair each input with its output path
///
/// Inputs whose output path is already claimed by an earlier input are
/// returned as failures instead of jobs.
fn plan_outputs(
    set: &DocumentSet,
    options: &BatchOptions,
) -> (Vec<(PathBuf, PathBuf)>, Vec<(PathBuf, String)>) {
    let extension = options.extension();
    let mut claimed: HashMap<PathBuf, &Path> = HashMap::new();
    let mut jobs = Vec::new();
    let mut collisions = Vec::new();

    for input in set
        .files
        .iter()
        .filter(|file| !has_compound_extension(file, extension))
    {
        let relative = input.strip_prefix(&set.root).unwrap_or(input);
        let output = options.output_dir.join(output_path_for(relative, extension));

        if let Some(first) = claimed.get(&output) {
            let error = format!(
                "Output {} is already written from {}",
                output.display(),
                first.display()
            );
            collisions.push((input.clone(), error));
        } else {
            claimed.insert(output.clone(), input);
            jobs.push((input.clone(), output));
        }
    }

    (jobs, collisions)
}

fn convert_single_file(
    input: &Path,
    output_path: &Path,
    options: &BatchOptions,
) -> std::result::Result<PathBuf, (PathBuf, String)> {
    let convert = || -> Result<PathBuf> {
        let content = fs::read_to_string(input)?;
        let converted = convert_str(&content, options.direction, &options.bridge, options.pretty)?;

        if let Some(parent) = output_path.parent() {
            fs::create_dir_all(parent)?;
        }
        fs::write(output_path, converted)?;

        tracing::debug!(input = %input.display(), output = %output_path.display(), "converted");
        Ok(output_path.to_path_buf())
    };

    convert().map_err(|e| (input.to_path_buf(), e.to_string()))
}

/// Output path for an input path: `page.json` and `page.tiptap.json` both
/// become `page.<extension>`
pub fn output_path_for(input: &Path, extension: &str) -> PathBuf {
    let name = input
        .file_name()
        .and_then(|s| s.to_str())
        .unwrap_or_default();
    let stem = name.strip_suffix(".json").unwrap_or(name);
    let stem = [".tiptap", ".minimark"]
        .iter()
        .find_map(|suffix| stem.strip_suffix(suffix))
        .unwrap_or(stem);
    input.with_file_name(format!("{}.{}", stem, extension))
}

fn has_compound_extension(path: &Path, extension: &str) -> bool {
    path.file_name()
        .and_then(|s| s.to_str())
        .is_some_and(|name| name.ends_with(&format!(".{}", extension)))
}

/// Collect all .json files in a directory
fn collect_json_files(dir: &Path, recursive: bool) -> Result<Vec<PathBuf>> {
    let mut files = Vec::new();

    for entry in fs::read_dir(dir)? {
        let entry = entry?;
        let path = entry.path();

        if path.is_file() {
            if let Some(ext) = path.extension()
                && ext.eq_ignore_ascii_case("json")
            {
                files.push(path);
            }
        } else if path.is_dir() && recursive {
            files.extend(collect_json_files(&path, recursive)?);
        }
    }

    Ok(files)
}
