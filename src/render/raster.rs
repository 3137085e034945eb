use crate::foundation::error::{FlowlinesError, FlowlinesResult};

/// Largest raster edge accepted by [`rasterize_svg`].
pub const MAX_RASTER_DIM: u32 = 16_384;

/// Straight-alpha RGBA8 pixels of a rasterized SVG.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RasterImage {
    /// Width in pixels.
    pub width: u32,
    /// Height in pixels.
    pub height: u32,
    /// Row-major RGBA8, not premultiplied.
    pub data: Vec<u8>,
}

/// Parse `svg` and rasterize it at its intrinsic size times `scale`.
///
/// Text is shaped with system fonts.
pub fn rasterize_svg(svg: &str, scale: f32) -> FlowlinesResult<RasterImage> {
    if !scale.is_finite() || scale <= 0.0 {
        return Err(FlowlinesError::render(format!(
            "raster scale must be finite and > 0, got {scale}"
        )));
    }

    let mut opts = usvg::Options::default();
    opts.fontdb_mut().load_system_fonts();
    let tree = usvg::Tree::from_str(svg, &opts)
        .map_err(|e| FlowlinesError::render(format!("parse svg: {e}")))?;

    let to_px = |v: f32| -> FlowlinesResult<u32> {
        let px = (v * scale).ceil();
        if !px.is_finite() || px < 1.0 || px > MAX_RASTER_DIM as f32 {
            return Err(FlowlinesError::render(format!(
                "svg raster size out of range: {px} (max {MAX_RASTER_DIM})"
            )));
        }
        Ok(px as u32)
    };
    let width = to_px(tree.size().width())?;
    let height = to_px(tree.size().height())?;

    let mut pixmap = resvg::tiny_skia::Pixmap::new(width, height)
        .ok_or_else(|| FlowlinesError::render("failed to allocate svg pixmap"))?;
    let xform = resvg::tiny_skia::Transform::from_scale(scale, scale);
    resvg::render(&tree, xform, &mut pixmap.as_mut());

    let mut data = Vec::with_capacity(pixmap.data().len());
    for px in pixmap.pixels() {
        let c = px.demultiply();
        data.extend_from_slice(&[c.red(), c.green(), c.blue(), c.alpha()]);
    }
    tracing::debug!(width, height, "rasterized svg");

    Ok(RasterImage {
        width,
        height,
        data,
    })
}

#[cfg(test)]
#[path = "../../tests/unit/render/raster.rs"]
mod tests;
