use rayon::prelude::*;

use crate::foundation::core::Resolution;
use crate::foundation::error::{FractimeError, FractimeResult};
use crate::render::colormap::inferno;
use crate::seed::mapper::FractalParameters;

/// Viewport and iteration controls for one render.
#[derive(Clone, Copy, Debug)]
pub struct RenderOptions {
    /// Complex-plane center of the viewport.
    pub center: (f32, f32),
    /// Zoom factor; the viewport half-width is `1.5 / zoom`.
    pub zoom: f32,
    /// Iteration budget per pixel.
    pub max_iter: u16,
}

impl Default for RenderOptions {
    fn default() -> Self {
        Self {
            center: (0.0, 0.0),
            zoom: 1.0,
            max_iter: 1000,
        }
    }
}

/// Escape value for a pixel that never left the bailout radius.
///
/// Escaped pixels store `iteration + 1`, so "escaped at iteration 0" (stored
/// as 1) and "never escaped" (stored as 0) are distinct states even though
/// both map to the deepest ramp color.
pub const NEVER_ESCAPED: u16 = 0;

/// A rendered fractal frame plus its generation record.
///
/// Owned by the renderer until handed to the publish step; publishing moves
/// the encoded bytes into the object store.
#[derive(Clone, Debug, PartialEq)]
pub struct RenderedArtifact {
    /// Width in pixels.
    pub width: u32,
    /// Height in pixels.
    pub height: u32,
    /// RGB8 bytes, tightly packed, row-major.
    pub pixels: Vec<u8>,
    /// Per-pixel escape record, row-major. See [`NEVER_ESCAPED`].
    pub escapes: Vec<u16>,
    /// Julia constant the frame was rendered with.
    pub params: FractalParameters,
    /// Iteration budget the frame was rendered with.
    pub max_iter: u16,
}

impl RenderedArtifact {
    /// Encode the frame as PNG bytes.
    pub fn to_png_bytes(&self) -> FractimeResult<Vec<u8>> {
        let img: image::RgbImage =
            image::ImageBuffer::from_raw(self.width, self.height, self.pixels.clone())
                .ok_or_else(|| FractimeError::validation("pixel buffer does not match dimensions"))?;
        let mut out = Vec::new();
        image::DynamicImage::ImageRgb8(img)
            .write_to(&mut std::io::Cursor::new(&mut out), image::ImageFormat::Png)
            .map_err(|e| anyhow::anyhow!("png encode: {e}"))?;
        Ok(out)
    }
}

/// Render a Julia set (`z <- z^2 + c`) over a pixel grid.
///
/// Row-wise escape-time iteration: each row sweeps the real axis linearly at
/// a fixed imaginary value, iterating only still-alive pixels and stopping
/// early once the whole row has escaped. Alive -> escaped is a one-way
/// transition recorded on the first iteration `|z| > 2`.
///
/// All arithmetic is f32, and rows are independent, so the output is
/// byte-identical for identical inputs including across the row-parallel
/// path. Never errors on valid numeric input; a zero dimension or
/// non-positive zoom is a caller contract violation.
pub fn render(
    params: FractalParameters,
    resolution: Resolution,
    options: &RenderOptions,
) -> FractimeResult<RenderedArtifact> {
    let Resolution { width, height } = resolution;
    if width == 0 || height == 0 {
        return Err(FractimeError::validation(format!(
            "resolution must be positive, got {width}x{height}"
        )));
    }
    if !(options.zoom.is_finite() && options.zoom > 0.0) {
        return Err(FractimeError::validation("zoom must be finite and > 0"));
    }
    if options.max_iter == 0 {
        return Err(FractimeError::validation("max_iter must be >= 1"));
    }

    let half_x = 1.5 / options.zoom;
    let half_y = (height as f32 / width as f32) * half_x;
    let xs = linspace(options.center.0 - half_x, options.center.0 + half_x, width);
    let ys = linspace(options.center.1 - half_y, options.center.1 + half_y, height);

    let c_re = params.real as f32;
    let c_im = params.imaginary as f32;
    let max_iter = options.max_iter;

    let rows: Vec<Vec<u16>> = ys
        .par_iter()
        .map(|&y| render_row(&xs, y, c_re, c_im, max_iter))
        .collect();

    let mut escapes = Vec::with_capacity((width as usize) * (height as usize));
    for row in rows {
        escapes.extend_from_slice(&row);
    }

    let mut pixels = Vec::with_capacity(escapes.len() * 3);
    for &e in &escapes {
        let t = if e == NEVER_ESCAPED {
            0.0
        } else {
            f32::from(e - 1) / f32::from(max_iter)
        };
        pixels.extend_from_slice(&inferno(t));
    }

    Ok(RenderedArtifact {
        width,
        height,
        pixels,
        escapes,
        params,
        max_iter,
    })
}

/// Escape-time iteration for one row. See [`NEVER_ESCAPED`] for the record
/// encoding.
pub(crate) fn render_row(xs: &[f32], y: f32, c_re: f32, c_im: f32, max_iter: u16) -> Vec<u16> {
    let w = xs.len();
    let mut z_re: Vec<f32> = xs.to_vec();
    let mut z_im = vec![y; w];
    let mut escapes = vec![NEVER_ESCAPED; w];
    let mut alive = vec![true; w];
    let mut alive_count = w;

    for i in 0..max_iter {
        for px in 0..w {
            if !alive[px] {
                continue;
            }
            let (re, im) = (z_re[px], z_im[px]);
            let next_re = re * re - im * im + c_re;
            let next_im = 2.0 * re * im + c_im;
            z_re[px] = next_re;
            z_im[px] = next_im;
            if next_re * next_re + next_im * next_im > 4.0 {
                escapes[px] = i + 1;
                alive[px] = false;
                alive_count -= 1;
            }
        }
        if alive_count == 0 {
            break;
        }
    }
    escapes
}

/// Endpoint-inclusive linear sweep over `n` samples.
fn linspace(start: f32, stop: f32, n: u32) -> Vec<f32> {
    if n == 1 {
        return vec![start];
    }
    let step = (stop - start) / (n - 1) as f32;
    (0..n).map(|i| start + step * i as f32).collect()
}

#[cfg(test)]
#[path = "../../tests/unit/render/julia.rs"]
mod tests;
