//! Template evaluation and layout-chain rendering.
//!
//! Templates are plain text with `{{ ... }}` placeholders, evaluated by a
//! hand-rolled scanner against a [`RenderContext`]. The context is a
//! template's only data source — there is no ambient access to the process,
//! the filesystem, or anything else.
//!
//! ## Placeholder forms
//!
//! | Placeholder | Meaning |
//! |-------------|---------|
//! | `{{ title }}`, `{{ author.name }}` | dotted data lookup, HTML-escaped |
//! | `{{ yield }}` | output of the chain link rendered beneath this one |
//! | `{{ shout() }}` | registered helper, invoked with the context as receiver |
//! | `{{ component "card" }}` | named fragment rendered against this context |
//! | `{{ data "site.hits" }}` | key-value store read, HTML-escaped |
//!
//! ## Chain folding
//!
//! [`TemplateRenderer::render`] resolves the content's layout chain and
//! folds it leaf-outward: each link is evaluated against its own front
//! matter merged with the page's (page keys win), passed through the
//! formatter for its format tag, and handed to the next link as the yield
//! output. [`TemplateRenderer::render_for_feed`] stops one link short of the
//! terminal layout, producing embeddable fragment markup.
//!
//! ## Escape-on-read
//!
//! Every scalar read out of a context passes the HTML escaper. A value of
//! shape `{"$raw": "..."}` is the explicit opt-out for values that are
//! already markup (the injected `date` and `url` keys are plain strings and
//! escape harmlessly).

use crate::content::{Content, Site, Template};
use crate::format::FormatterRegistry;
use crate::layout::{self, LayoutError};
use crate::store::{DataStore, FrozenStore, StoreError};
use serde_json::{Map, Value};
use std::collections::BTreeMap;
use thiserror::Error;

/// Key marking a value as pre-escaped markup, returned verbatim on read.
pub const RAW_MARKER: &str = "$raw";

/// Components may include other components; inclusion nested deeper than
/// this is reported as a cycle.
pub const MAX_COMPONENT_DEPTH: usize = 16;

#[derive(Error, Debug)]
pub enum RenderError {
    #[error(transparent)]
    Layout(#[from] LayoutError),
    #[error("render contexts are read-only; cannot assign or remove keys")]
    ImmutableState,
    #[error("template calls undefined helper '{0}'")]
    UndefinedHelper(String),
    #[error("template yields parent output, but this is the innermost link")]
    InvalidYield,
    #[error(transparent)]
    Store(#[from] StoreError),
    #[error("template references unknown component '{0}'")]
    ComponentNotFound(String),
    #[error("component '{0}' exceeds the inclusion depth limit (cycle?)")]
    ComponentCycle(String),
    #[error("unclosed '{{{{' placeholder in template")]
    UnclosedPlaceholder,
    #[error("template source of '{0}' is not valid UTF-8")]
    NotUtf8(String),
}

/// A template-local helper: runs with the calling context as its receiver,
/// so helper bodies can read sibling data keys naturally.
pub type Helper = Box<dyn Fn(&RenderContext) -> Result<String, RenderError> + Send + Sync>;

/// Named helper functions templates may call as `{{ name() }}`.
#[derive(Default)]
pub struct HelperTable {
    helpers: BTreeMap<String, Helper>,
}

impl HelperTable {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register(&mut self, name: impl Into<String>, helper: Helper) {
        self.helpers.insert(name.into(), helper);
    }

    fn call(&self, name: &str, ctx: &RenderContext) -> Result<String, RenderError> {
        match self.helpers.get(name) {
            Some(helper) => helper(ctx),
            None => Err(RenderError::UndefinedHelper(name.to_string())),
        }
    }
}

/// Reusable template fragments registered by name during generation.
#[derive(Debug, Default)]
pub struct ComponentRegistry {
    components: BTreeMap<String, Template>,
}

impl ComponentRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register(&mut self, name: impl Into<String>, template: Template) {
        self.components.insert(name.into(), template);
    }

    pub fn get(&self, name: &str) -> Option<&Template> {
        self.components.get(name)
    }

    pub fn len(&self) -> usize {
        self.components.len()
    }

    pub fn is_empty(&self) -> bool {
        self.components.is_empty()
    }
}

/// Escape the five HTML-significant characters.
pub fn escape_html(input: &str) -> String {
    let mut out = String::with_capacity(input.len());
    for c in input.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(c),
        }
    }
    out
}

/// What a context field access yields: a child context for nested mappings,
/// escaped (or raw-marked) text for everything else.
pub enum Field<'a> {
    Nested(RenderContext<'a>),
    Text(String),
}

/// Read-only view over one merged data mapping, created per chain link and
/// never reused across links.
#[derive(Clone, Copy)]
pub struct RenderContext<'a> {
    data: &'a Map<String, Value>,
    helpers: &'a HelperTable,
    store: &'a FrozenStore<'a>,
    components: &'a ComponentRegistry,
    parent_output: Option<&'a str>,
}

impl<'a> RenderContext<'a> {
    pub fn new(
        data: &'a Map<String, Value>,
        helpers: &'a HelperTable,
        store: &'a FrozenStore<'a>,
        components: &'a ComponentRegistry,
        parent_output: Option<&'a str>,
    ) -> Self {
        Self {
            data,
            helpers,
            store,
            components,
            parent_output,
        }
    }

    fn child(&self, data: &'a Map<String, Value>) -> RenderContext<'a> {
        RenderContext { data, ..*self }
    }

    /// Access one key. Nested mappings yield a child context; any other
    /// non-null value passes the escaper (unless `$raw`-marked); a missing
    /// or null key yields `None` — never an error.
    pub fn get(&self, key: &str) -> Option<Field<'a>> {
        match self.data.get(key)? {
            Value::Null => None,
            Value::Object(map) => match raw_markup(map) {
                Some(markup) => Some(Field::Text(markup.to_string())),
                None => Some(Field::Nested(self.child(map))),
            },
            scalar => Some(Field::Text(escape_scalar(scalar))),
        }
    }

    /// Dotted-path access, traversing nested contexts segment by segment.
    pub fn lookup(&self, dotted_key: &str) -> Option<Field<'a>> {
        let mut segments = dotted_key.split('.');
        let mut field = self.get(segments.next()?)?;
        for segment in segments {
            field = match field {
                Field::Nested(ctx) => ctx.get(segment)?,
                Field::Text(_) => return None,
            };
        }
        Some(field)
    }

    /// The markup rendered from the link beneath this one in the chain.
    pub fn parent_output(&self) -> Result<&'a str, RenderError> {
        self.parent_output.ok_or(RenderError::InvalidYield)
    }

    pub fn call_helper(&self, name: &str) -> Result<String, RenderError> {
        self.helpers.call(name, self)
    }

    /// Key-value store read; the only store access a render has.
    pub fn data_value(&self, dotted_key: &str) -> Option<&'a Value> {
        self.store.get(dotted_key)
    }

    pub fn component(&self, name: &str) -> Option<&'a Template> {
        self.components.get(name)
    }

    /// Contexts are read-only by contract; assignment always fails.
    pub fn insert(&self, _key: &str, _value: Value) -> Result<(), RenderError> {
        Err(RenderError::ImmutableState)
    }

    /// Contexts are read-only by contract; removal always fails.
    pub fn remove(&self, _key: &str) -> Result<(), RenderError> {
        Err(RenderError::ImmutableState)
    }
}

/// `{"$raw": "..."}` is the pre-escaped marker; anything else is a plain
/// nested mapping.
fn raw_markup(map: &Map<String, Value>) -> Option<&str> {
    if map.len() == 1 {
        map.get(RAW_MARKER).and_then(Value::as_str)
    } else {
        None
    }
}

fn escape_scalar(value: &Value) -> String {
    match value {
        Value::String(s) => escape_html(s),
        other => escape_html(&other.to_string()),
    }
}

/// Evaluate template text against a context, expanding `{{ ... }}`
/// placeholders. Everything outside placeholders is copied through.
pub fn evaluate(source: &str, ctx: &RenderContext) -> Result<String, RenderError> {
    evaluate_at(source, ctx, 0)
}

fn evaluate_at(source: &str, ctx: &RenderContext, depth: usize) -> Result<String, RenderError> {
    let mut out = String::with_capacity(source.len());
    let mut rest = source;

    while let Some(open) = rest.find("{{") {
        out.push_str(&rest[..open]);
        let after_open = &rest[open + 2..];
        let close = after_open
            .find("}}")
            .ok_or(RenderError::UnclosedPlaceholder)?;
        let directive = after_open[..close].trim();
        out.push_str(&expand(directive, ctx, depth)?);
        rest = &after_open[close + 2..];
    }
    out.push_str(rest);
    Ok(out)
}

fn expand(directive: &str, ctx: &RenderContext, depth: usize) -> Result<String, RenderError> {
    if directive == "yield" {
        return Ok(ctx.parent_output()?.to_string());
    }

    if let Some(name) = quoted_argument(directive, "component") {
        if depth >= MAX_COMPONENT_DEPTH {
            return Err(RenderError::ComponentCycle(name));
        }
        let template = ctx
            .component(&name)
            .ok_or_else(|| RenderError::ComponentNotFound(name.clone()))?;
        let source = template
            .source_str()
            .map_err(|_| RenderError::NotUtf8(name.clone()))?;
        // Components render against the caller's context, inserted verbatim.
        return evaluate_at(source, ctx, depth + 1);
    }

    if let Some(key) = quoted_argument(directive, "data") {
        return Ok(match ctx.data_value(&key) {
            Some(value) => escape_scalar(value),
            None => String::new(),
        });
    }

    if let Some(name) = directive.strip_suffix("()") {
        return ctx.call_helper(name.trim());
    }

    // Dotted data lookup. Missing keys and mapping-typed finals render as
    // nothing, matching the null-never-throws access contract.
    Ok(match ctx.lookup(directive) {
        Some(Field::Text(text)) => text,
        Some(Field::Nested(_)) | None => String::new(),
    })
}

/// Parse `keyword "argument"` directives.
fn quoted_argument(directive: &str, keyword: &str) -> Option<String> {
    let rest = directive.strip_prefix(keyword)?.trim();
    let inner = rest.strip_prefix('"')?.strip_suffix('"')?;
    Some(inner.to_string())
}

/// Renders content through its layout chain.
pub struct TemplateRenderer {
    formatters: FormatterRegistry,
    helpers: HelperTable,
    components: ComponentRegistry,
    store: Box<dyn DataStore>,
}

impl TemplateRenderer {
    pub fn new(
        formatters: FormatterRegistry,
        helpers: HelperTable,
        components: ComponentRegistry,
        store: Box<dyn DataStore>,
    ) -> Self {
        Self {
            formatters,
            helpers,
            components,
            store,
        }
    }

    /// Render the full chain: page wrapped by every inherited layout.
    pub fn render(&self, site: &Site, content: &Content) -> Result<String, RenderError> {
        let chain = layout::resolve_chain(site, content)?;
        self.fold_chain(&chain, content)
    }

    /// Render the chain minus the terminal layout — embeddable fragment
    /// markup for feeds. A chain of depth 1 renders as-is.
    pub fn render_for_feed(&self, site: &Site, content: &Content) -> Result<String, RenderError> {
        let mut chain = layout::resolve_chain(site, content)?;
        if chain.len() > 1 {
            chain.pop();
        }
        self.fold_chain(&chain, content)
    }

    /// Walk the chain leaf-outward, folding each link's formatted output
    /// into the next link's yield.
    fn fold_chain(&self, chain: &[&Content], leaf: &Content) -> Result<String, RenderError> {
        let frozen = FrozenStore::new(self.store.as_ref());
        let mut folded: Option<String> = None;

        for (index, link) in chain.iter().enumerate() {
            // Link data underneath, page data on top: content keys win.
            let merged = link.front_matter.with_data(&leaf.front_matter);
            let evaluated = {
                let ctx = RenderContext::new(
                    merged.as_map(),
                    &self.helpers,
                    &frozen,
                    &self.components,
                    folded.as_deref(),
                );
                let source = link
                    .template
                    .source_str()
                    .map_err(|_| RenderError::NotUtf8(link.name.clone()))?;
                evaluate(source, &ctx)?
            };
            let formatted = self.formatters.apply(&link.template.format, &evaluated);

            let terminal = index + 1 == chain.len();
            folded = Some(if terminal {
                formatted
            } else {
                formatted + "\n"
            });
        }

        Ok(folded.unwrap_or_default())
    }
}
