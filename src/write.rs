//! Site writing: render every page and asset to the output tree.
//!
//! Writing is two passes. The render pass evaluates every page's layout
//! chain in parallel — safe because content, front matter, and contexts are
//! all immutable after generation. The write pass is sequential and in
//! discovery order: create parent directories, write bytes (overwriting
//! unconditionally), record the rendered location, and notify the write
//! observers in registration order. Layouts are never written.
//!
//! A failure on any item is fatal to the whole run; a partially written
//! site is not valid output.

use crate::content::{Content, Site};
use crate::render::{RenderError, TemplateRenderer};
use rayon::prelude::*;
use std::fs;
use std::path::PathBuf;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum WriteError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error(transparent)]
    Render(#[from] RenderError),
    #[error("'{0}' has no output path")]
    MissingOutputPath(String),
}

/// Observes each item after its bytes are persisted.
pub trait WriteObserver: Send + Sync {
    fn notify(&self, content: &Content);
}

#[derive(Debug, Default)]
pub struct WriteReport {
    pub pages_written: usize,
    pub assets_written: usize,
}

pub struct SiteWriter {
    renderer: TemplateRenderer,
    observers: Vec<Box<dyn WriteObserver>>,
}

impl SiteWriter {
    /// The observer list is assembled before the run and never mutated.
    pub fn new(renderer: TemplateRenderer, observers: Vec<Box<dyn WriteObserver>>) -> Self {
        Self {
            renderer,
            observers,
        }
    }

    pub fn renderer(&self) -> &TemplateRenderer {
        &self.renderer
    }

    /// Render and persist the whole site.
    pub fn write(&self, site: &mut Site) -> Result<WriteReport, WriteError> {
        let mut report = WriteReport::default();

        for (name, path, bytes) in self.render_pages(site)? {
            persist(&path, &bytes)?;
            site.set_rendered_location(&name, path);
            self.notify_all(site, &name);
            report.pages_written += 1;
        }

        let assets: Vec<(String, PathBuf, Vec<u8>)> = site
            .assets()
            .iter()
            .map(|asset| {
                let path = output_path_of(asset)?;
                Ok((asset.name.clone(), path, asset.template.source.clone()))
            })
            .collect::<Result<_, WriteError>>()?;
        for (name, path, bytes) in assets {
            persist(&path, &bytes)?;
            site.set_rendered_location(&name, path);
            self.notify_all(site, &name);
            report.assets_written += 1;
        }

        Ok(report)
    }

    /// Render every page without touching the filesystem — the `check`
    /// command's validation pass.
    pub fn render_only(&self, site: &Site) -> Result<usize, WriteError> {
        Ok(self.render_pages(site)?.len())
    }

    /// Parallel render pass; results come back in page order.
    fn render_pages(&self, site: &Site) -> Result<Vec<(String, PathBuf, Vec<u8>)>, WriteError> {
        site.pages()
            .par_iter()
            .map(|page| {
                let path = output_path_of(page)?;
                let markup = self.renderer.render(site, page)?;
                Ok((page.name.clone(), path, markup.into_bytes()))
            })
            .collect()
    }

    fn notify_all(&self, site: &Site, name: &str) {
        if let Some(written) = site.find(name) {
            for observer in &self.observers {
                observer.notify(written);
            }
        }
    }
}

fn output_path_of(content: &Content) -> Result<PathBuf, WriteError> {
    content
        .output_path
        .clone()
        .ok_or_else(|| WriteError::MissingOutputPath(content.name.clone()))
}

fn persist(path: &PathBuf, bytes: &[u8]) -> Result<(), std::io::Error> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)?;
    }
    fs::write(path, bytes)
}
