//! # Weft
//!
//! A minimal static site generator with JSON front matter and layout
//! inheritance. Point it at a content tree, get a rendered `_site`
//! directory back.
//!
//! # Architecture: Generate, Then Write
//!
//! Weft processes content in two passes over an immutable in-memory model:
//!
//! ```text
//! 1. Generate   content/ + layouts/  →  Site     (filesystem → model)
//! 2. Write      Site                 →  _site/   (model → rendered files)
//! ```
//!
//! Generation walks the layout directory, then the content directory,
//! normalizing every file into a `Content` entry — front matter scanned and
//! decoded, post date resolved, output path computed — and accumulating the
//! entries into a `Site`. Writing resolves each page's layout chain, folds
//! the chain through the template renderer, and persists the result.
//!
//! The split exists because the two passes have different contracts: the
//! site is mutable only while it is being built, and only read while it is
//! being written. Every `Content`, `FrontMatter`, and `RenderContext` is
//! immutable after construction, which is what makes the parallel render
//! pass in [`write`] safe without locks.
//!
//! # Module Map
//!
//! | Module | Role |
//! |--------|------|
//! | [`front_matter`] | Brace-counting metadata scanner and the ordered deep-merge mapping |
//! | [`classify`] | Asset/Layout/Page classification, slugs, output path computation |
//! | [`content`] | The in-memory model: `Content`, `Template`, `Site` |
//! | [`generate`] | Directory walking, derived front matter, observers, components |
//! | [`layout`] | Layout chain resolution with a bounded-depth cycle guard |
//! | [`render`] | Template evaluation, `RenderContext`, chain folding |
//! | [`format`] | Pluggable per-format markup conversion (markdown built in) |
//! | [`store`] | Key-value data store, frozen read-only during renders |
//! | [`write`] | Parallel render pass, sequential write pass, write observers |
//! | [`config`] | `config.toml` loading and validation |
//! | [`output`] | CLI output formatting |
//!
//! # Design Decisions
//!
//! ## JSON Front Matter, Split by Brace Counting
//!
//! Metadata blocks are JSON objects at the top of the file, found by
//! counting `{`/`}` nesting rather than by parsing. The split needs no JSON
//! parser and cannot be confused by braces later in the body; decoding
//! happens once, on the extracted block only.
//!
//! ## Layout Inheritance as an Explicit Chain
//!
//! A page names its layout, a layout may name its parent, and rendering
//! folds the resulting chain leaf-outward through a `{{ yield }}`
//! placeholder. The chain is resolved fresh per render from the `layout`
//! front-matter keys — there is no registration-time linking, so layouts
//! can be discovered in any order.
//!
//! ## A Restricted Template Language
//!
//! Templates are data, not code: the evaluator understands dotted lookups,
//! `yield`, registered helper calls, named components, and key-value store
//! reads — nothing else. A template has no access to the process or the
//! filesystem, and every scalar it reads is HTML-escaped unless explicitly
//! marked raw.
//!
//! ## Everything Immutable After Construction
//!
//! Observers that want to change a content entry return a replacement;
//! `FrontMatter::with_data` merges into a new mapping; render contexts
//! reject mutation by contract. The payoff is a render pass that
//! parallelizes trivially with rayon.

pub mod classify;
pub mod config;
pub mod content;
pub mod format;
pub mod front_matter;
pub mod generate;
pub mod layout;
pub mod output;
pub mod render;
pub mod store;
pub mod write;

#[cfg(test)]
pub(crate) mod test_helpers;
