//! Large-document viewer model.
//!
//! The viewer keeps per-line caches (shaping, merged foreground spans,
//! background rects) that are computed lazily and invalidated narrowly,
//! so a render touches only the lines inside the viewport regardless of
//! document size.

pub mod highlight;
pub mod shaping;
pub mod span_layer;
pub mod viewer;

pub use highlight::{Highlighter, HighlighterToken};
pub use shaping::{MonospaceShaper, ShapedLine, TextShaper};
pub use span_layer::{ColorSpan, ColorSpanLayer, LayerChanges};
pub use viewer::{
    BackgroundRect, LayerId, RenderFrame, RenderedLine, SelectionRect, StyledSegment, TextHitInfo,
    TextViewerModel, ViewportSize,
};
