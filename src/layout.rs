//! Layout chain resolution.
//!
//! A page names its parent layout in front matter; that layout may name its
//! own parent, and so on until a layout with no `layout` key terminates the
//! chain. [`resolve_chain`] walks those references and returns the ordered
//! chain, page first.
//!
//! Nothing stops an author from writing `a → b → a`. Rather than loop
//! forever, resolution is bounded at [`MAX_CHAIN_DEPTH`] links and fails
//! with [`LayoutError::Cycle`] when the bound is exceeded.

use crate::content::{Content, Site};
use thiserror::Error;

/// No real site nests layouts anywhere near this deep; hitting the bound
/// means a reference cycle.
pub const MAX_CHAIN_DEPTH: usize = 32;

#[derive(Error, Debug)]
pub enum LayoutError {
    #[error("'{content}' references layout '{layout}', which does not exist")]
    NotFound { content: String, layout: String },
    #[error("layout chain for '{content}' exceeds {depth} links; reference cycle?")]
    Cycle { content: String, depth: usize },
}

/// Build the ordered rendering chain for `content`: itself first, then each
/// referenced layout, ending at the first link without a `layout` key.
pub fn resolve_chain<'s>(site: &'s Site, content: &'s Content) -> Result<Vec<&'s Content>, LayoutError> {
    let mut chain = vec![content];
    let mut current = content;

    while let Some(layout_name) = current.layout_name() {
        if chain.len() >= MAX_CHAIN_DEPTH {
            return Err(LayoutError::Cycle {
                content: content.name.clone(),
                depth: MAX_CHAIN_DEPTH,
            });
        }
        let layout = site
            .find_layout(layout_name)
            .ok_or_else(|| LayoutError::NotFound {
                content: content.name.clone(),
                layout: layout_name.to_string(),
            })?;
        chain.push(layout);
        current = layout;
    }

    Ok(chain)
}
