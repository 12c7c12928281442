//! Content hashing for rendered document caching
//!
//! Rendered documents are content-addressed: `{stem}.{hash8}.{ext}` where
//! hash8 is the first 8 hex chars of SHA-256 over everything that affects
//! the rendering. A file with the same name can be reused as is.

use std::path::{Path, PathBuf};

use sha2::{Digest, Sha256};

use crate::domain::{Direction, DocumentFormat, PageSize};

/// Hash of a render request: DOT text plus conversion parameters.
pub fn render_hash(dot: &str, page: PageSize, direction: Direction, format: DocumentFormat) -> String {
    let mut hasher = Sha256::new();
    hasher.update(dot.as_bytes());
    for part in [page.as_str(), direction.as_str(), format.extension()] {
        hasher.update([0u8]);
        hasher.update(part.as_bytes());
    }
    let result = hasher.finalize();
    hex::encode(&result[..4])
}

/// Output path for a rendered document: `{dir}/{stem}.{hash}.{ext}`.
pub fn document_path(dir: &Path, stem: &str, hash: &str, format: DocumentFormat) -> PathBuf {
    dir.join(format!("{}.{}.{}", stem, hash, format.extension()))
}

/// Split a document filename back into `(stem, hash)`.
///
/// # Examples
/// ```
/// use std::path::Path;
/// use famtree::application::hash::parse_document_filename;
///
/// let result = parse_document_filename(Path::new("ada.a1b2c3d4.pdf"));
/// assert_eq!(result, Some(("ada".to_string(), "a1b2c3d4".to_string())));
///
/// assert_eq!(parse_document_filename(Path::new("ada.pdf")), None);
/// ```
pub fn parse_document_filename(path: &Path) -> Option<(String, String)> {
    let without_ext = path.file_stem()?.to_str()?;
    let last_dot = without_ext.rfind('.')?;
    let hash = &without_ext[last_dot + 1..];

    if hash.len() != 8 || !hash.chars().all(|c| c.is_ascii_hexdigit()) {
        return None;
    }
    let stem = &without_ext[..last_dot];
    if stem.is_empty() {
        return None;
    }

    Some((stem.to_string(), hash.to_lowercase()))
}
