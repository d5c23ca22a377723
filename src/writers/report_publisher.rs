use image::{ImageOutputFormat, RgbaImage};
use rayon::prelude::*;
use std::io::Write;
use std::path::{Path, PathBuf};
use tempfile::NamedTempFile;
use tracing::{debug, info, warn};

use crate::error::{ReportError, Result};
use crate::models::{DrawInstruction, Territory};
use crate::writers::TemplateRenderer;

/// Everything needed to produce one territory image
#[derive(Debug, Clone)]
pub struct RenderJob {
    pub territory: Territory,
    pub template: PathBuf,
    pub instructions: Vec<DrawInstruction>,
    pub output: PathBuf,
}

/// Renders territory images in parallel and publishes them all-or-nothing
pub struct ReportPublisher<'a> {
    renderer: &'a TemplateRenderer,
    max_workers: usize,
}

impl<'a> ReportPublisher<'a> {
    pub fn new(renderer: &'a TemplateRenderer) -> Self {
        Self {
            renderer,
            max_workers: num_cpus::get(),
        }
    }

    pub fn with_max_workers(mut self, max_workers: usize) -> Self {
        self.max_workers = max_workers.max(1);
        self
    }

    pub fn render_all(&self, jobs: &[RenderJob]) -> Result<Vec<RgbaImage>> {
        let pool = rayon::ThreadPoolBuilder::new()
            .num_threads(self.max_workers)
            .build()
            .map_err(|e| ReportError::config(e.to_string()))?;

        pool.install(|| {
            jobs.par_iter()
                .map(|job| {
                    debug!(territory = %job.territory, template = %job.template.display(), "rendering");
                    self.renderer
                        .render_template(&job.template, &job.instructions)
                })
                .collect()
        })
    }

    /// Render every job, then write all outputs. If any render or write fails,
    /// no final file is created.
    pub fn publish(
        &self,
        output_dir: &Path,
        jobs: &[RenderJob],
        csv: Option<(PathBuf, Vec<u8>)>,
    ) -> Result<Vec<PathBuf>> {
        let images = self.render_all(jobs)?;
        let outputs = jobs
            .iter()
            .map(|job| job.output.clone())
            .zip(images)
            .collect();

        publish_outputs(output_dir, outputs, csv)
    }
}

/// Stage every image (and the optional CSV) as a temporary file inside
/// `output_dir`, then move them to their final names once all are written.
/// Renames run one at a time; if one fails, the files already moved in this
/// call are removed again before the error is returned.
pub fn publish_outputs(
    output_dir: &Path,
    images: Vec<(PathBuf, RgbaImage)>,
    csv: Option<(PathBuf, Vec<u8>)>,
) -> Result<Vec<PathBuf>> {
    std::fs::create_dir_all(output_dir)?;

    let mut staged = Vec::with_capacity(images.len() + 1);
    for (path, image) in images {
        let mut tmp = NamedTempFile::new_in(output_dir)?;
        image.write_to(tmp.as_file_mut(), ImageOutputFormat::Png)?;
        staged.push((tmp, path));
    }

    if let Some((path, bytes)) = csv {
        let mut tmp = NamedTempFile::new_in(output_dir)?;
        tmp.write_all(&bytes)?;
        tmp.flush()?;
        staged.push((tmp, path));
    }

    let mut published: Vec<PathBuf> = Vec::with_capacity(staged.len());
    for (tmp, path) in staged {
        if let Err(e) = tmp.persist(&path) {
            for done in &published {
                if let Err(remove) = std::fs::remove_file(done) {
                    warn!(path = %done.display(), error = %remove, "rollback failed");
                }
            }
            return Err(e.into());
        }
        info!(path = %path.display(), "published");
        published.push(path);
    }

    Ok(published)
}
