//! Site generation: directory walking and `Site` construction.
//!
//! The generator runs as a small state machine:
//!
//! ```text
//! Idle → Validating → Walking → Complete
//!              ↘ Invalid (blank layout/output dir — fatal, nothing processed)
//! ```
//!
//! The layout directory is walked to completion before the content
//! directory, so every layout is registered before any page that references
//! one is discovered (lookups are deferred to render time regardless).
//! Within each directory the walk is recursive in sorted filename order,
//! never re-sorted mid-run — that order is the stable tie-break for
//! same-date pages.
//!
//! ## Derived front matter
//!
//! Per discovered file the generator injects:
//! - `date` — the resolved post date, `YYYY-MM-DD`, always set. The date
//!   comes from a `YYYY-MM-DD-` filename prefix when present, else the
//!   file's modification time.
//! - for non-layouts: a default `layout` when the key is absent, and a
//!   `title` derived from the filename (date prefix stripped, separators to
//!   spaces, title-cased) when absent.
//! - for pages: the computed site-relative `url`.
//!
//! ## Observers
//!
//! Every non-layout content passes through the generation observers in
//! registration order; each may return a replacement `Content` (different
//! front matter, different output path, marked unpublished) and the last
//! replacement wins. The observer list is fixed at construction and never
//! mutated mid-run. Drafts are dropped after observers run, unless the
//! config includes them.
//!
//! ## Components
//!
//! After the walk, every file under the components directory (if present)
//! is registered in the component registry under its file stem, forced to
//! template form regardless of extension.

use crate::classify;
use crate::config::{ConfigError, SiteConfig};
use crate::content::{Category, Content, DuplicateLayout, Site, Template};
use crate::front_matter::{self, FrontMatter, ParseError};
use crate::render::ComponentRegistry;
use chrono::NaiveDate;
use serde_json::Value;
use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;
use walkdir::WalkDir;

#[derive(Error, Debug)]
pub enum GenerateError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Config error: {0}")]
    Config(#[from] ConfigError),
    #[error("{path}: {source}")]
    FrontMatter {
        path: PathBuf,
        #[source]
        source: ParseError,
    },
    #[error(transparent)]
    DuplicateLayout(#[from] DuplicateLayout),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GeneratorState {
    Idle,
    Validating,
    Walking,
    Complete,
    Invalid,
}

/// Observes every non-layout content before it is added to the site; may
/// return the same content or a replacement.
pub trait GenerationObserver: Send + Sync {
    fn notify(&self, content: Content) -> Content;
}

/// The generation result: the populated site plus the component registry
/// for on-demand template inclusion.
#[derive(Debug)]
pub struct Generated {
    pub site: Site,
    pub components: ComponentRegistry,
}

pub struct SiteGenerator {
    observers: Vec<Box<dyn GenerationObserver>>,
    state: GeneratorState,
}

impl SiteGenerator {
    /// Observers are assembled before the run and passed in here; the list
    /// is never mutated afterwards.
    pub fn new(observers: Vec<Box<dyn GenerationObserver>>) -> Self {
        Self {
            observers,
            state: GeneratorState::Idle,
        }
    }

    pub fn state(&self) -> GeneratorState {
        self.state
    }

    /// Walk the layout and content trees under `root` and build the site.
    pub fn run(&mut self, root: &Path, config: &SiteConfig) -> Result<Generated, GenerateError> {
        self.state = GeneratorState::Validating;
        if let Err(err) = config.validate() {
            self.state = GeneratorState::Invalid;
            return Err(err.into());
        }

        self.state = GeneratorState::Walking;
        let layout_root = config.layout_path(root);
        let content_root = config.content_path(root);
        let output_root = config.output_path(root);
        let components_root = config.components_path(root);

        let mut site = Site::new();

        // Layouts first, so the full set is registered before any content.
        for path in walk_files(&layout_root, &[]) {
            let layout = build_layout(&path, &layout_root)?;
            site.add(layout)?;
        }

        // Content walk skips the output/layout/components trees in case any
        // of them nest under the content directory.
        let skip = [output_root.clone(), layout_root.clone(), components_root.clone()];
        for path in walk_files(&content_root, &skip) {
            let content = match classify::classify(&path, &layout_root) {
                Category::Page => build_page(&path, &content_root, &output_root, config)?,
                _ => build_asset(&path, &content_root, &output_root)?,
            };

            let mut content = content;
            for observer in &self.observers {
                content = observer.notify(content);
            }

            if content.is_draft() && !config.include_drafts {
                continue;
            }
            site.add(content)?;
        }

        let components = register_components(&components_root)?;

        self.state = GeneratorState::Complete;
        Ok(Generated { site, components })
    }
}

/// Recursive file walk in sorted filename order, skipping hidden entries,
/// `config.toml`, and any path under `skip`.
fn walk_files(dir: &Path, skip: &[PathBuf]) -> Vec<PathBuf> {
    if !dir.is_dir() {
        return Vec::new();
    }
    WalkDir::new(dir)
        .sort_by_file_name()
        .into_iter()
        .filter_entry(|e| {
            let name = e.file_name().to_string_lossy();
            !classify::is_excluded(&name) && !skip.iter().any(|s| e.path() == s.as_path())
        })
        .filter_map(|e| e.ok())
        .filter(|e| e.file_type().is_file())
        .map(|e| e.into_path())
        .collect()
}

fn build_layout(path: &Path, layout_root: &Path) -> Result<Content, GenerateError> {
    let raw = fs::read_to_string(path)?;
    let (meta, body) = front_matter::scan(&raw);
    let front_matter = parse_meta(&meta, path)?;

    let post_date = resolve_post_date(path)?;
    let front_matter = with_date(&front_matter, post_date);

    Ok(Content {
        name: relative_name(path, layout_root),
        post_date,
        front_matter,
        template: Template::new(extension_tag(path), body.into_bytes()),
        category: Category::Layout,
        output_path: None,
        rendered_location: None,
    })
}

fn build_page(
    path: &Path,
    content_root: &Path,
    output_root: &Path,
    config: &SiteConfig,
) -> Result<Content, GenerateError> {
    let raw = fs::read_to_string(path)?;
    let (meta, body) = front_matter::scan(&raw);
    let front_matter = parse_meta(&meta, path)?;

    let post_date = resolve_post_date(path)?;
    let mut front_matter = with_date(&front_matter, post_date);

    // Key presence, not value: an explicit `"layout": null` opts a page out
    // of the default layout entirely.
    if !front_matter.contains("layout") && !config.default_layout.is_empty() {
        front_matter =
            front_matter.with_value("layout", Value::String(config.default_layout.clone()));
    }
    if front_matter.get_str("title").is_none() {
        let derived = title_from_filename(path);
        front_matter = front_matter.with_value("title", Value::String(derived));
    }

    let relative = Path::new(&relative_name(path, content_root)).to_path_buf();
    let title = front_matter.get_str("title").unwrap_or_default().to_string();
    let (output_path, url) = classify::page_output(output_root, &relative, &front_matter, &title);
    let front_matter = front_matter.with_value("url", Value::String(url));

    Ok(Content {
        name: relative.to_string_lossy().to_string(),
        post_date,
        front_matter,
        template: Template::new(extension_tag(path), body.into_bytes()),
        category: Category::Page,
        output_path: Some(output_path),
        rendered_location: None,
    })
}

fn build_asset(
    path: &Path,
    content_root: &Path,
    output_root: &Path,
) -> Result<Content, GenerateError> {
    let source = fs::read(path)?;
    let post_date = resolve_post_date(path)?;
    let relative = relative_name(path, content_root);
    let output_path = classify::asset_output(output_root, Path::new(&relative));

    Ok(Content {
        name: relative,
        post_date,
        front_matter: with_date(&FrontMatter::new(), post_date),
        template: Template::new(extension_tag(path), source),
        category: Category::Asset,
        output_path: Some(output_path),
        rendered_location: None,
    })
}

/// Register every file under the components directory by stem, forced to
/// template form regardless of extension.
fn register_components(components_root: &Path) -> Result<ComponentRegistry, GenerateError> {
    let mut registry = ComponentRegistry::new();
    for path in walk_files(components_root, &[]) {
        let source = fs::read(&path)?;
        let stem = path
            .file_stem()
            .map(|s| s.to_string_lossy().to_string())
            .unwrap_or_default();
        registry.register(stem, Template::new(extension_tag(&path), source));
    }
    Ok(registry)
}

fn parse_meta(meta: &str, path: &Path) -> Result<FrontMatter, GenerateError> {
    FrontMatter::parse(meta).map_err(|source| GenerateError::FrontMatter {
        path: path.to_path_buf(),
        source,
    })
}

fn with_date(front_matter: &FrontMatter, date: NaiveDate) -> FrontMatter {
    front_matter.with_value(
        "date",
        Value::String(date.format("%Y-%m-%d").to_string()),
    )
}

fn relative_name(path: &Path, root: &Path) -> String {
    path.strip_prefix(root)
        .unwrap_or(path)
        .to_string_lossy()
        .replace('\\', "/")
}

fn extension_tag(path: &Path) -> String {
    path.extension()
        .map(|e| e.to_string_lossy().to_lowercase())
        .unwrap_or_default()
}

/// Post date: `YYYY-MM-DD-` filename prefix when present, else mtime.
fn resolve_post_date(path: &Path) -> Result<NaiveDate, std::io::Error> {
    let stem = path
        .file_stem()
        .map(|s| s.to_string_lossy().to_string())
        .unwrap_or_default();
    if let Some(date) = date_from_stem(&stem) {
        return Ok(date);
    }
    let modified = fs::metadata(path)?.modified()?;
    Ok(chrono::DateTime::<chrono::Local>::from(modified).date_naive())
}

fn date_from_stem(stem: &str) -> Option<NaiveDate> {
    // The convention is a full `YYYY-MM-DD-` prefix, dash included.
    if stem.len() < 11 || stem.as_bytes()[10] != b'-' {
        return None;
    }
    NaiveDate::parse_from_str(&stem[..10], "%Y-%m-%d").ok()
}

/// Filename-derived title: date prefix stripped, separators to spaces,
/// each word title-cased. `2018-06-23-hello-world.md` → "Hello World".
fn title_from_filename(path: &Path) -> String {
    let stem = path
        .file_stem()
        .map(|s| s.to_string_lossy().to_string())
        .unwrap_or_default();
    let base = if date_from_stem(&stem).is_some() {
        &stem[11..]
    } else {
        &stem
    };
    base.split(['-', '_'])
        .filter(|w| !w.is_empty())
        .map(title_case)
        .collect::<Vec<_>>()
        .join(" ")
}

fn title_case(word: &str) -> String {
    let mut chars = word.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().collect::<String>() + chars.as_str(),
        None => String::new(),
    }
}
