//! The in-memory content model: `Content`, `Template`, `Category`, `Site`.
//!
//! Every discovered source file is normalized into a [`Content`] value and
//! accumulated into a [`Site`], partitioned by category. The site is built
//! once during generation and only read during writing; individual entries
//! are never mutated in place — observers that want to change a content item
//! return a replacement instance instead.
//!
//! ## Layout lookup
//!
//! A page references its parent layout by name in front matter
//! (`"layout": "article"`). [`Site::find_layout`] matches that name against
//! each layout's file stem, so `article`, `article.html`, and a layout
//! stored as `article.html` all resolve to the same entry. Layout stems must
//! be unique within a site.

use crate::front_matter::FrontMatter;
use chrono::NaiveDate;
use std::path::PathBuf;
use std::str::Utf8Error;

/// What kind of output (if any) a discovered file produces.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Category {
    /// Copied through byte-for-byte to its mirrored output location.
    Asset,
    /// Wraps other content via the yield placeholder; never written itself.
    Layout,
    /// Rendered through its layout chain to an HTML output path.
    Page,
}

/// A template body tagged with its format (the source file's extension).
///
/// The source is kept as raw bytes so assets survive untouched; parseable
/// content goes through [`Template::source_str`].
#[derive(Debug, Clone, PartialEq)]
pub struct Template {
    pub format: String,
    pub source: Vec<u8>,
}

impl Template {
    pub fn new(format: impl Into<String>, source: impl Into<Vec<u8>>) -> Self {
        Self {
            format: format.into(),
            source: source.into(),
        }
    }

    pub fn source_str(&self) -> Result<&str, Utf8Error> {
        std::str::from_utf8(&self.source)
    }
}

/// One discovered source file, normalized.
#[derive(Debug, Clone, PartialEq)]
pub struct Content {
    /// Logical identifier: path relative to the directory it was found under.
    pub name: String,
    /// From a `YYYY-MM-DD-` filename prefix, else file modification time.
    pub post_date: NaiveDate,
    pub front_matter: FrontMatter,
    pub template: Template,
    pub category: Category,
    /// None iff this is a layout.
    pub output_path: Option<PathBuf>,
    /// Where the rendered bytes landed; set only after a successful write.
    pub rendered_location: Option<PathBuf>,
}

impl Content {
    /// Draft status: front matter `"published": false`. Anything else
    /// (absent, true, non-boolean) counts as published.
    pub fn is_draft(&self) -> bool {
        self.front_matter.get("published").and_then(|v| v.as_bool()) == Some(false)
    }

    /// The layout this content inherits from, if any.
    pub fn layout_name(&self) -> Option<&str> {
        self.front_matter.get_str("layout")
    }

    /// Replacement-style update used by generation observers.
    #[must_use]
    pub fn with_front_matter(&self, front_matter: FrontMatter) -> Content {
        Content {
            front_matter,
            ..self.clone()
        }
    }

    /// Replacement-style update used by generation observers.
    #[must_use]
    pub fn with_output_path(&self, output_path: Option<PathBuf>) -> Content {
        Content {
            output_path,
            ..self.clone()
        }
    }

    /// File stem of `name`, used for layout matching.
    pub fn stem(&self) -> &str {
        let base = self.name.rsplit('/').next().unwrap_or(&self.name);
        base.rsplit_once('.').map_or(base, |(stem, _)| stem)
    }
}

/// The full collection of discovered content, partitioned by category.
#[derive(Debug, Default)]
pub struct Site {
    layouts: Vec<Content>,
    pages: Vec<Content>,
    assets: Vec<Content>,
}

impl Site {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a content entry to its category partition.
    ///
    /// Layout stems must be unique — the stem is what pages reference, so a
    /// duplicate would make lookups ambiguous.
    pub fn add(&mut self, content: Content) -> Result<(), DuplicateLayout> {
        match content.category {
            Category::Layout => {
                if self.find_layout(content.stem()).is_some() {
                    return Err(DuplicateLayout(content.stem().to_string()));
                }
                self.layouts.push(content);
            }
            Category::Page => self.pages.push(content),
            Category::Asset => self.assets.push(content),
        }
        Ok(())
    }

    /// Look up a layout by the name a `layout` front-matter key uses.
    /// An extension on the reference is ignored: `main` and `main.html`
    /// both match a layout file named `main.html`.
    pub fn find_layout(&self, name: &str) -> Option<&Content> {
        let wanted = name.rsplit_once('.').map_or(name, |(stem, _)| stem);
        self.layouts.iter().find(|l| l.stem() == wanted)
    }

    pub fn layouts(&self) -> &[Content] {
        &self.layouts
    }

    /// All pages ordered ascending by post date. The sort is stable, so
    /// same-date pages keep their discovery order.
    pub fn pages(&self) -> Vec<&Content> {
        let mut ordered: Vec<&Content> = self.pages.iter().collect();
        ordered.sort_by_key(|c| c.post_date);
        ordered
    }

    pub fn assets(&self) -> &[Content] {
        &self.assets
    }

    /// Look up any content entry by its logical name.
    pub fn find(&self, name: &str) -> Option<&Content> {
        self.pages
            .iter()
            .chain(self.assets.iter())
            .chain(self.layouts.iter())
            .find(|c| c.name == name)
    }

    /// Record where a page or asset was written. Keyed by name; layouts are
    /// never written so they are never touched here.
    pub fn set_rendered_location(&mut self, name: &str, location: PathBuf) {
        for content in self.pages.iter_mut().chain(self.assets.iter_mut()) {
            if content.name == name {
                content.rendered_location = Some(location);
                return;
            }
        }
    }

    pub fn len(&self) -> usize {
        self.layouts.len() + self.pages.len() + self.assets.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[derive(Debug, thiserror::Error)]
#[error("duplicate layout name: {0}")]
pub struct DuplicateLayout(pub String);

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_helpers::content_with;

    #[test]
    fn draft_detection() {
        let published = content_with("a.md", Category::Page, "{}");
        assert!(!published.is_draft());

        let draft = content_with("b.md", Category::Page, "{\"published\": false}");
        assert!(draft.is_draft());

        let explicit = content_with("c.md", Category::Page, "{\"published\": true}");
        assert!(!explicit.is_draft());
    }

    #[test]
    fn stem_strips_directories_and_extension() {
        let c = content_with("nested/dir/article.html", Category::Layout, "{}");
        assert_eq!(c.stem(), "article");
    }

    #[test]
    fn find_layout_matches_by_stem() {
        let mut site = Site::new();
        site.add(content_with("main.html", Category::Layout, "{}"))
            .unwrap();

        assert!(site.find_layout("main").is_some());
        assert!(site.find_layout("main.html").is_some());
        assert!(site.find_layout("other").is_none());
    }

    #[test]
    fn duplicate_layout_stem_rejected() {
        let mut site = Site::new();
        site.add(content_with("main.html", Category::Layout, "{}"))
            .unwrap();
        let err = site
            .add(content_with("sub/main.md", Category::Layout, "{}"))
            .unwrap_err();
        assert_eq!(err.0, "main");
    }

    #[test]
    fn pages_ordered_by_date_with_stable_ties() {
        let mut site = Site::new();
        let mut first = content_with("2018-06-23-first.md", Category::Page, "{}");
        first.post_date = NaiveDate::from_ymd_opt(2018, 6, 23).unwrap();
        let mut second = content_with("same-day-a.md", Category::Page, "{}");
        second.post_date = NaiveDate::from_ymd_opt(2018, 6, 24).unwrap();
        let mut third = content_with("same-day-b.md", Category::Page, "{}");
        third.post_date = NaiveDate::from_ymd_opt(2018, 6, 24).unwrap();

        // Insert out of order; same-day entries keep insertion order.
        site.add(second.clone()).unwrap();
        site.add(third.clone()).unwrap();
        site.add(first.clone()).unwrap();

        let names: Vec<&str> = site.pages().iter().map(|c| c.name.as_str()).collect();
        assert_eq!(
            names,
            vec!["2018-06-23-first.md", "same-day-a.md", "same-day-b.md"]
        );
    }

    #[test]
    fn with_front_matter_is_replacement_not_mutation() {
        let original = content_with("a.md", Category::Page, "{\"title\": \"old\"}");
        let replaced = original.with_front_matter(
            crate::front_matter::FrontMatter::parse("{\"title\": \"new\"}").unwrap(),
        );
        assert_eq!(original.front_matter.get_str("title"), Some("old"));
        assert_eq!(replaced.front_matter.get_str("title"), Some("new"));
    }

    #[test]
    fn set_rendered_location_targets_by_name() {
        let mut site = Site::new();
        site.add(content_with("a.md", Category::Page, "{}")).unwrap();
        site.set_rendered_location("a.md", PathBuf::from("/out/a/index.html"));
        assert_eq!(
            site.pages()[0].rendered_location,
            Some(PathBuf::from("/out/a/index.html"))
        );
    }
}
