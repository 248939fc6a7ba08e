//! Batch classification of a directory of crops with annotated outputs

use crate::classifier::ColorClassifier;
use crate::pipeline::{Classification, ObjectColorClassifier};
use crate::taxonomy::ColorClass;
use anyhow::{ensure, Context, Result};
use image::{imageops, DynamicImage, GenericImageView};
use std::fs;
use std::path::{Path, PathBuf};
use std::time::{Instant, SystemTime};

/// Counts for one directory run
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct BatchSummary {
    pub processed: usize,
    pub failed: usize,
    pub skipped: usize,
}

/// Classifies every image in a directory and writes diagnostics next to it
pub struct CropAnnotator<'a, C: ColorClassifier> {
    classifier: &'a ObjectColorClassifier<C>,
    max_size: Option<u32>,
}

impl<'a, C: ColorClassifier> CropAnnotator<'a, C> {
    pub fn new(classifier: &'a ObjectColorClassifier<C>, max_size: Option<u32>) -> Self {
        Self {
            classifier,
            max_size,
        }
    }

    /// Output directory for `source_dir`: a sibling named `<dir>_Annotated`
    pub fn result_dir(source_dir: &Path) -> Result<PathBuf> {
        let name = source_dir
            .file_name()
            .with_context(|| format!("{} has no directory name", source_dir.display()))?;
        let parent = source_dir.parent().unwrap_or_else(|| Path::new("."));

        let mut annotated = name.to_os_string();
        annotated.push("_Annotated");
        Ok(parent.join(annotated))
    }

    /// Classify every image file in `source_dir`, oldest first.
    ///
    /// Files that cannot be decoded are skipped, crops that fail to classify
    /// are logged and counted; neither stops the run.
    pub fn annotate_directory(&self, source_dir: &Path) -> Result<BatchSummary> {
        let source_dir = fs::canonicalize(source_dir)
            .with_context(|| format!("Directory {} not found", source_dir.display()))?;
        ensure!(
            source_dir.is_dir(),
            "{} is not a directory",
            source_dir.display()
        );

        let result_dir = Self::result_dir(&source_dir)?;
        fs::create_dir_all(&result_dir)
            .with_context(|| format!("Failed to create {}", result_dir.display()))?;

        let files = files_by_creation_time(&source_dir)?;
        tracing::info!(
            "Annotating {} files from {} into {}",
            files.len(),
            source_dir.display(),
            result_dir.display()
        );

        let mut summary = BatchSummary::default();
        for file in files {
            let crop = match image::open(&file) {
                Ok(crop) => crop,
                Err(e) => {
                    tracing::debug!("Skipping {}: {}", file.display(), e);
                    summary.skipped += 1;
                    continue;
                }
            };
            let crop = resize_to_max(crop, self.max_size);

            let start = Instant::now();
            match self.classifier.classify(crop) {
                Ok(result) => {
                    tracing::info!(
                        "{}: color is {}. Took {}ms",
                        file.display(),
                        result.best(),
                        start.elapsed().as_millis()
                    );
                    match write_outputs(&result_dir, &file, &result) {
                        Ok(()) => summary.processed += 1,
                        Err(e) => {
                            tracing::warn!("{}: {:#}", file.display(), e);
                            summary.failed += 1;
                        }
                    }
                }
                Err(e) => {
                    tracing::warn!("{}: {}", file.display(), e);
                    summary.failed += 1;
                }
            }
        }

        Ok(summary)
    }
}

/// Regular files of `dir`, ordered by creation time (modification time where
/// the platform does not record creation)
pub fn files_by_creation_time(dir: &Path) -> Result<Vec<PathBuf>> {
    let mut files: Vec<(SystemTime, PathBuf)> = Vec::new();
    for entry in fs::read_dir(dir).with_context(|| format!("Failed to read {}", dir.display()))? {
        let entry = entry?;
        let metadata = entry.metadata()?;
        if !metadata.is_file() {
            continue;
        }
        let created = metadata
            .created()
            .or_else(|_| metadata.modified())
            .unwrap_or(SystemTime::UNIX_EPOCH);
        files.push((created, entry.path()));
    }

    files.sort();
    Ok(files.into_iter().map(|(_, path)| path).collect())
}

/// Downscale by the integer factor the larger side overshoots `max_size`.
///
/// Only factors above 1 trigger a resize, so images up to twice the limit
/// are kept as they are.
pub fn resize_to_max(image: DynamicImage, max_size: Option<u32>) -> DynamicImage {
    let Some(max_size) = max_size.filter(|&m| m > 0) else {
        return image;
    };

    let (width, height) = image.dimensions();
    let ratio = (width / max_size).max(height / max_size);
    if ratio <= 1 {
        return image;
    }

    image.resize_exact(
        width / ratio,
        height / ratio,
        imageops::FilterType::Lanczos3,
    )
}

fn write_outputs<T: ColorClass>(
    result_dir: &Path,
    source_file: &Path,
    result: &Classification<T>,
) -> Result<()> {
    let id = annotation_id();
    let class = result.best();
    let file_name = source_file
        .file_name()
        .with_context(|| format!("{} has no file name", source_file.display()))?
        .to_string_lossy();

    let path = |kind: &str| result_dir.join(format!("{}-{}-{}_{}", id, class, kind, file_name));

    result
        .annotated
        .save(path("source"))
        .context("Failed to save annotated source")?;
    result.mask.save(path("mask")).context("Failed to save mask")?;
    result
        .composited
        .save(path("segmented"))
        .context("Failed to save composited crop")?;
    result
        .swatch
        .save(path("swatch"))
        .context("Failed to save swatch")?;

    Ok(())
}

/// Random 8-character identifier shared by the outputs of one crop
pub fn annotation_id() -> String {
    uuid::Uuid::new_v4().simple().to_string()[..8].to_string()
}
