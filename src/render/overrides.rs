// src/render/overrides.rs
//! Host-supplied rendering capabilities.
//!
//! Embeds, equations, code and callouts are the blocks hosts most often
//! want to render with their own machinery (an iframe sandbox, KaTeX,
//! a syntax highlighter). The host implements whichever methods it cares
//! about; `None` falls back to the built-in rendering.

use super::block_renderer::RenderContext;
use crate::model::{CalloutBlock, CodeBlock, EmbedBlock, EquationBlock};

pub trait BlockOverrides: Send + Sync {
    /// Override for embed blocks.
    fn embed(&self, _block: &EmbedBlock, _ctx: &RenderContext) -> Option<String> {
        None
    }

    /// Override for block-level equations.
    fn equation(&self, _block: &EquationBlock, _ctx: &RenderContext) -> Option<String> {
        None
    }

    /// Override for code blocks.
    fn code(&self, _block: &CodeBlock, _ctx: &RenderContext) -> Option<String> {
        None
    }

    /// Override for callouts. `children` is the post-order rendering of
    /// the callout's child blocks.
    fn callout(
        &self,
        _block: &CalloutBlock,
        _children: &str,
        _ctx: &RenderContext,
    ) -> Option<String> {
        None
    }
}

/// The identity override set: every block renders with the built-ins.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoOverrides;

impl BlockOverrides for NoOverrides {}
