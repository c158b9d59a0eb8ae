use anyhow::{anyhow, Context, Result};
use std::fs;
use std::path::{Path, PathBuf};

// @module: Page file helpers for the command-line workflow

/// Extensions accepted as HTML input
const HTML_EXTENSIONS: [&str; 3] = ["html", "htm", "xhtml"];

// @struct: File operations utility
pub struct FileManager;

impl FileManager {
    // @creates: Directory and parents if needed
    pub fn ensure_dir<P: AsRef<Path>>(path: P) -> Result<()> {
        let path = path.as_ref();
        if !path.as_os_str().is_empty() && !path.exists() {
            fs::create_dir_all(path).with_context(|| format!("Failed to create directory: {:?}", path))?;
        }
        Ok(())
    }

    /// Default output path for a translated page: `<stem>.<language>.html`
    /// next to the input file
    pub fn translated_output_path<P: AsRef<Path>>(input_file: P, target_language: &str) -> PathBuf {
        let input_file = input_file.as_ref();
        let stem = input_file.file_stem().unwrap_or_default().to_string_lossy();
        let dir = input_file.parent().unwrap_or(Path::new(""));
        dir.join(format!("{}.{}.html", stem, target_language))
    }

    /// Whether `path` looks like an HTML page
    pub fn is_html_file<P: AsRef<Path>>(path: P) -> bool {
        path.as_ref()
            .extension()
            .map(|ext| {
                let ext = ext.to_string_lossy();
                HTML_EXTENSIONS.iter().any(|known| ext.eq_ignore_ascii_case(known))
            })
            .unwrap_or(false)
    }

    /// Read a page from disk
    pub fn read_to_string<P: AsRef<Path>>(path: P) -> Result<String> {
        let path = path.as_ref();
        if !path.is_file() {
            return Err(anyhow!("Input file does not exist: {:?}", path));
        }
        fs::read_to_string(path).with_context(|| format!("Failed to read file: {:?}", path))
    }

    /// Write a string to a file, creating the parent directory
    pub fn write_to_file<P: AsRef<Path>>(path: P, content: &str) -> Result<()> {
        if let Some(parent) = path.as_ref().parent() {
            Self::ensure_dir(parent)?;
        }

        fs::write(&path, content).with_context(|| format!("Failed to write to file: {:?}", path.as_ref()))
    }
}
