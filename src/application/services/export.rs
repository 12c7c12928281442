//! Export service: subtree building, DOT emission and document rendering
//!
//! Rendered documents are content-addressed (`{stem}.{hash8}.{ext}`), so an
//! unchanged tree is never converted twice. Older renderings of the same
//! stem are removed once a new one has been written.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use itertools::Itertools;
use rayon::prelude::*;
use termtree::Tree;
use tracing::{debug, info, instrument, warn};

use crate::application::family::FamilyData;
use crate::application::hash::{document_path, parse_document_filename, render_hash};
use crate::application::outline::outline;
use crate::application::{ApplicationError, ApplicationResult, IoResultExt};
use crate::config::Settings;
use crate::domain::{build_subtree, dot, Direction, DocumentFormat, MemberId, PageSize, SubTree};
use crate::infrastructure::converter::DocumentConverter;
use crate::infrastructure::traits::FileSystem;
use crate::infrastructure::{InfraError, InfraResult};

/// Parameters of one rendering run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RenderRequest {
    /// Base name of the output files, usually the family file stem
    pub stem: String,
    pub direction: Direction,
    pub page_size: PageSize,
    pub format: DocumentFormat,
    pub output_dir: PathBuf,
}

impl RenderRequest {
    /// Request using the configured defaults.
    pub fn from_settings(stem: impl Into<String>, settings: &Settings) -> Self {
        Self {
            stem: stem.into(),
            direction: settings.direction,
            page_size: settings.page_size,
            format: settings.format,
            output_dir: settings.output_dir.clone(),
        }
    }
}

/// Result of rendering one root.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RenderOutput {
    pub root: MemberId,
    pub path: PathBuf,
    /// True when an existing document was reused
    pub cached: bool,
    pub bytes: usize,
}

/// Family export service.
pub struct ExportService {
    fs: Arc<dyn FileSystem>,
    converter: Arc<dyn DocumentConverter>,
    settings: Arc<Settings>,
}

impl ExportService {
    /// Create a new export service.
    pub fn new(
        fs: Arc<dyn FileSystem>,
        converter: Arc<dyn DocumentConverter>,
        settings: Arc<Settings>,
    ) -> Self {
        Self {
            fs,
            converter,
            settings,
        }
    }

    /// Read and parse a family file.
    #[instrument(level = "debug", skip(self))]
    pub fn load(&self, path: &Path) -> ApplicationResult<FamilyData> {
        let content = self
            .fs
            .read_to_string(path)
            .with_path_context("read family file", path)?;
        let family = FamilyData::parse(&content, path)?;
        debug!(
            "loaded {} members, {} relationships",
            family.members.len(),
            family.relationships.len()
        );
        Ok(family)
    }

    /// The requested root, or the member flagged `isRoot`.
    pub fn resolve_root(
        &self,
        family: &FamilyData,
        requested: Option<MemberId>,
    ) -> ApplicationResult<MemberId> {
        requested
            .or_else(|| family.default_root())
            .ok_or(ApplicationError::NoRootMember)
    }

    /// Descendant subtree of `root`; an unknown root is reported as not found.
    #[instrument(level = "debug", skip(self, family))]
    pub fn subtree(&self, family: &FamilyData, root: MemberId) -> ApplicationResult<SubTree> {
        let subtree = build_subtree(&family.members, &family.relationships, root);
        if subtree.is_empty() {
            return Err(ApplicationError::RootNotFound(root));
        }
        info!(
            "subtree of {}: {} members, {} couples",
            root,
            subtree.nodes.len(),
            subtree.couples.len()
        );
        Ok(subtree)
    }

    /// DOT text of the subtree of `root`.
    pub fn dot(
        &self,
        family: &FamilyData,
        root: MemberId,
        direction: Direction,
    ) -> ApplicationResult<String> {
        let subtree = self.subtree(family, root)?;
        Ok(dot::emit(&subtree, &family.members, direction))
    }

    /// Indented text outline of the subtree of `root`.
    pub fn outline(&self, family: &FamilyData, root: MemberId) -> ApplicationResult<Tree<String>> {
        let subtree = self.subtree(family, root)?;
        Ok(outline(&subtree, &family.members))
    }

    /// Render the subtree of `root` into a document.
    #[instrument(level = "debug", skip(self, family, request), fields(stem = %request.stem))]
    pub fn render(
        &self,
        family: &FamilyData,
        root: MemberId,
        request: &RenderRequest,
    ) -> InfraResult<RenderOutput> {
        let text = self.dot(family, root, request.direction)?;
        let stem = document_stem(&request.stem, root);
        let hash = render_hash(&text, request.page_size, request.direction, request.format);
        let path = document_path(&request.output_dir, &stem, &hash, request.format);

        if self.settings.cache && self.fs.exists(&path) {
            debug!("up to date: {}", path.display());
            return Ok(RenderOutput {
                root,
                path,
                cached: true,
                bytes: 0,
            });
        }

        let bytes = self
            .converter
            .convert(&text, request.page_size, request.direction, request.format)?;

        self.fs
            .ensure_parent(&path)
            .map_err(|e| InfraError::io(format!("create {}", request.output_dir.display()), e))?;
        self.fs
            .write_bytes(&path, &bytes)
            .map_err(|e| InfraError::io(format!("write {}", path.display()), e))?;
        info!("rendered {} ({} bytes)", path.display(), bytes.len());

        self.prune_stale(&request.output_dir, &stem, &path, request.format)?;

        Ok(RenderOutput {
            root,
            path,
            cached: false,
            bytes: bytes.len(),
        })
    }

    /// Render several roots in parallel; the first failure is returned.
    ///
    /// Repeated roots are rendered once.
    pub fn render_many(
        &self,
        family: &FamilyData,
        roots: &[MemberId],
        request: &RenderRequest,
    ) -> InfraResult<Vec<RenderOutput>> {
        let roots: Vec<MemberId> = roots.iter().copied().unique().collect();
        debug!("render_many: {} roots", roots.len());

        let results: Vec<InfraResult<RenderOutput>> = roots
            .par_iter()
            .map(|root| self.render(family, *root, request))
            .collect();

        let mut outputs = Vec::new();
        for result in results {
            outputs.push(result?);
        }
        Ok(outputs)
    }

    /// Remove earlier renderings of `stem` in the same format.
    fn prune_stale(
        &self,
        dir: &Path,
        stem: &str,
        keep: &Path,
        format: DocumentFormat,
    ) -> InfraResult<Vec<PathBuf>> {
        let files = self
            .fs
            .list_files(dir)
            .map_err(|e| InfraError::io(format!("list {}", dir.display()), e))?;

        let mut removed = Vec::new();
        for file in files {
            if file == keep || file.extension().and_then(|e| e.to_str()) != Some(format.extension()) {
                continue;
            }
            match parse_document_filename(&file) {
                Some((file_stem, _)) if file_stem == stem => {
                    if let Err(e) = self.fs.remove_file(&file) {
                        warn!("cannot remove stale {}: {}", file.display(), e);
                        continue;
                    }
                    debug!("removed stale {}", file.display());
                    removed.push(file);
                }
                _ => {}
            }
        }
        Ok(removed)
    }
}

/// Output stem for one root: `{stem}-{root id without hyphens}`.
///
/// Stale pruning is scoped to a stem, so the stem must be unique per root.
pub fn document_stem(stem: &str, root: MemberId) -> String {
    format!("{}-{}", stem, root.simple())
}
