//! Shared test fixtures: in-memory content builders and a temp-dir site
//! tree with the standard `content/`, `layouts/`, `components/` layout.

use crate::config::SiteConfig;
use crate::content::{Category, Content, Template};
use crate::front_matter::FrontMatter;
use chrono::NaiveDate;
use std::fs;
use std::path::Path;
use tempfile::TempDir;

/// A bare content entry with the given category and front matter JSON.
pub(crate) fn content_with(name: &str, category: Category, meta: &str) -> Content {
    let format = name.rsplit_once('.').map(|(_, e)| e).unwrap_or("").to_string();
    Content {
        name: name.to_string(),
        post_date: NaiveDate::from_ymd_opt(2020, 1, 1).unwrap(),
        front_matter: FrontMatter::parse(meta).unwrap(),
        template: Template::new(format, Vec::new()),
        category,
        output_path: None,
        rendered_location: None,
    }
}

/// A page with a template body; format tag comes from the extension.
pub(crate) fn page_with_body(name: &str, meta: &str, body: &str) -> Content {
    let mut page = content_with(name, Category::Page, meta);
    page.template.source = body.as_bytes().to_vec();
    page
}

/// A temp-dir site tree in the default directory layout.
pub(crate) struct SiteFixture {
    tmp: TempDir,
}

impl SiteFixture {
    pub(crate) fn new() -> Self {
        let tmp = TempDir::new().unwrap();
        fs::create_dir_all(tmp.path().join("content")).unwrap();
        fs::create_dir_all(tmp.path().join("layouts")).unwrap();
        Self { tmp }
    }

    pub(crate) fn root(&self) -> &Path {
        self.tmp.path()
    }

    pub(crate) fn config(&self) -> SiteConfig {
        SiteConfig::default()
    }

    fn write(&self, relative: &str, bytes: &[u8]) {
        let path = self.tmp.path().join(relative);
        fs::create_dir_all(path.parent().unwrap()).unwrap();
        fs::write(path, bytes).unwrap();
    }

    pub(crate) fn layout(&self, name: &str, meta: &str, body: &str) {
        self.write(&format!("layouts/{name}"), format!("{meta}\n{body}").as_bytes());
    }

    pub(crate) fn page(&self, name: &str, meta: &str, body: &str) {
        self.write(&format!("content/{name}"), format!("{meta}\n{body}").as_bytes());
    }

    pub(crate) fn asset(&self, name: &str, bytes: &[u8]) {
        self.write(&format!("content/{name}"), bytes);
    }

    pub(crate) fn component(&self, name: &str, body: &str) {
        self.write(&format!("components/{name}"), body.as_bytes());
    }
}
