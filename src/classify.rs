//! Content classification and output path computation.
//!
//! Every discovered file gets exactly one [`Category`]:
//!
//! - under the layout directory → `Layout`
//! - parseable extension (`html`, `md`, `markdown`) → `Page`
//! - anything else → `Asset`, copied through to a mirrored location
//!
//! Hidden dotfiles, `config.toml`, and anything under the output directory
//! are excluded from discovery entirely — they are never classified.
//!
//! ## Page output paths
//!
//! An explicit `permalink` front-matter value is used verbatim, rooted at
//! the output directory. Otherwise the page lands at
//! `<output>/<relative source dir>/<title-slug>/index.html`, and the
//! site-relative URL is injected back into front matter under the reserved
//! `url` key so templates can address every page uniformly.

use crate::content::Category;
use crate::front_matter::FrontMatter;
use std::path::{Path, PathBuf};

/// Extensions the pipeline parses for front matter and renders as pages.
pub const PARSEABLE_EXTENSIONS: &[&str] = &["html", "md", "markdown"];

/// Decide what a discovered file is.
pub fn classify(path: &Path, layout_root: &Path) -> Category {
    if path.starts_with(layout_root) {
        return Category::Layout;
    }
    if is_parseable(path) {
        return Category::Page;
    }
    Category::Asset
}

pub fn is_parseable(path: &Path) -> bool {
    path.extension()
        .map(|e| e.to_string_lossy().to_lowercase())
        .is_some_and(|ext| PARSEABLE_EXTENSIONS.contains(&ext.as_str()))
}

/// Files the walker skips outright: hidden entries and the config file.
/// The output directory is excluded separately by path in the generator.
pub fn is_excluded(file_name: &str) -> bool {
    file_name.starts_with('.') || file_name == "config.toml"
}

/// Derive a URL-safe slug from a title: lower-cased, non-alphanumeric runs
/// collapsed to single dashes, leading/trailing dashes stripped.
pub fn slug(title: &str) -> String {
    let mut out = String::with_capacity(title.len());
    let mut prev_dash = false;
    for c in title.chars() {
        if c.is_ascii_alphanumeric() {
            out.push(c.to_ascii_lowercase());
            prev_dash = false;
        } else if !prev_dash && !out.is_empty() {
            out.push('-');
            prev_dash = true;
        }
    }
    out.trim_end_matches('-').to_string()
}

/// Where a page's rendered bytes go, plus the site-relative URL for the
/// reserved `url` front-matter key.
pub fn page_output(
    output_root: &Path,
    relative_source: &Path,
    front_matter: &FrontMatter,
    title: &str,
) -> (PathBuf, String) {
    if let Some(permalink) = front_matter.get_str("permalink") {
        let trimmed = permalink.trim_start_matches('/');
        return (output_root.join(trimmed), format!("/{trimmed}"));
    }

    let slug = slug(title);
    let mut dir = PathBuf::new();
    if let Some(parent) = relative_source.parent()
        && parent != Path::new("")
    {
        dir.push(parent);
    }
    dir.push(&slug);

    let url = format!("/{}/", dir.to_string_lossy().replace('\\', "/"));
    (output_root.join(dir).join("index.html"), url)
}

/// Assets mirror their relative source location under the output directory.
pub fn asset_output(output_root: &Path, relative_source: &Path) -> PathBuf {
    output_root.join(relative_source)
}

#[cfg(test)]
mod tests {
    use super::*;

    // =========================================================================
    // classify() tests
    // =========================================================================

    #[test]
    fn files_under_layout_root_are_layouts() {
        let layout_root = Path::new("/site/layouts");
        assert_eq!(
            classify(Path::new("/site/layouts/main.html"), layout_root),
            Category::Layout
        );
        // Even non-parseable extensions under the layout root.
        assert_eq!(
            classify(Path::new("/site/layouts/odd.tpl"), layout_root),
            Category::Layout
        );
    }

    #[test]
    fn parseable_extensions_are_pages() {
        let layout_root = Path::new("/site/layouts");
        for name in ["post.md", "index.html", "long.markdown", "UPPER.MD"] {
            let path = PathBuf::from("/site/content").join(name);
            assert_eq!(classify(&path, layout_root), Category::Page, "{name}");
        }
    }

    #[test]
    fn everything_else_is_an_asset() {
        let layout_root = Path::new("/site/layouts");
        for name in ["style.css", "logo.png", "robots.txt", "no_extension"] {
            let path = PathBuf::from("/site/content").join(name);
            assert_eq!(classify(&path, layout_root), Category::Asset, "{name}");
        }
    }

    #[test]
    fn hidden_and_config_files_excluded() {
        assert!(is_excluded(".DS_Store"));
        assert!(is_excluded(".hidden"));
        assert!(is_excluded("config.toml"));
        assert!(!is_excluded("visible.md"));
    }

    // =========================================================================
    // slug() tests
    // =========================================================================

    #[test]
    fn slug_lowercases_and_dashes() {
        assert_eq!(slug("Hello World"), "hello-world");
        assert_eq!(slug("My Great Post!"), "my-great-post");
    }

    #[test]
    fn slug_collapses_runs() {
        assert_eq!(slug("a  --  b"), "a-b");
        assert_eq!(slug("foo@#$bar"), "foo-bar");
    }

    #[test]
    fn slug_strips_edges() {
        assert_eq!(slug("  padded  "), "padded");
        assert_eq!(slug("!!!"), "");
    }

    // =========================================================================
    // output path tests
    // =========================================================================

    #[test]
    fn permalink_used_verbatim() {
        let fm = FrontMatter::parse("{\"permalink\": \"about/index.html\"}").unwrap();
        let (path, url) = page_output(Path::new("_site"), Path::new("about.md"), &fm, "About");
        assert_eq!(path, PathBuf::from("_site/about/index.html"));
        assert_eq!(url, "/about/index.html");
    }

    #[test]
    fn permalink_leading_slash_normalized() {
        let fm = FrontMatter::parse("{\"permalink\": \"/feed.xml\"}").unwrap();
        let (path, url) = page_output(Path::new("_site"), Path::new("feed.md"), &fm, "Feed");
        assert_eq!(path, PathBuf::from("_site/feed.xml"));
        assert_eq!(url, "/feed.xml");
    }

    #[test]
    fn slug_path_mirrors_source_directory() {
        let fm = FrontMatter::new();
        let (path, url) = page_output(
            Path::new("_site"),
            Path::new("posts/2018-06-23-hello.md"),
            &fm,
            "Hello World",
        );
        assert_eq!(path, PathBuf::from("_site/posts/hello-world/index.html"));
        assert_eq!(url, "/posts/hello-world/");
    }

    #[test]
    fn slug_path_for_root_level_page() {
        let fm = FrontMatter::new();
        let (path, url) = page_output(Path::new("_site"), Path::new("about.md"), &fm, "About Me");
        assert_eq!(path, PathBuf::from("_site/about-me/index.html"));
        assert_eq!(url, "/about-me/");
    }

    #[test]
    fn asset_output_mirrors_relative_path() {
        assert_eq!(
            asset_output(Path::new("_site"), Path::new("css/style.css")),
            PathBuf::from("_site/css/style.css")
        );
    }
}
