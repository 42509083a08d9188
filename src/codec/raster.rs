//! PNG persistence for monochrome grids.
//!
//! Grids are written as 8-bit grayscale PNG: luma 0 for black, 255 for
//! white. The file is assembled in a temporary sibling and renamed into
//! place, so a failed write never leaves a truncated image behind.

use super::{CodecError, MonochromeGrid};
use image::io::{Limits, Reader as ImageReader};
use image::{DynamicImage, GrayImage, ImageFormat, Luma, Rgb};
use serde::{Deserialize, Serialize};
use std::io::{BufWriter, Write};
use std::path::Path;

const BLACK: Rgb<u8> = Rgb([0, 0, 0]);
const WHITE: Rgb<u8> = Rgb([255, 255, 255]);

/// How pixels other than pure black or pure white are treated on decode.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum DecodePolicy {
    /// Only pure black is `false`; every other colour is `true`.
    #[default]
    Permissive,
    /// Pixels must be pure black or pure white, anything else fails.
    Strict,
}

/// Writes `grid` to `path` as a PNG image.
pub fn encode(grid: &MonochromeGrid, path: impl AsRef<Path>) -> Result<(), CodecError> {
    let path = path.as_ref();
    let width = u32::try_from(grid.width()).map_err(|_| CodecError::DimensionsTooLarge {
        width: grid.width(),
        height: grid.height(),
    })?;
    let height = u32::try_from(grid.height()).map_err(|_| CodecError::DimensionsTooLarge {
        width: grid.width(),
        height: grid.height(),
    })?;

    let image = GrayImage::from_fn(width, height, |x, y| {
        if grid.get(x as usize, y as usize) {
            Luma([255])
        } else {
            Luma([0])
        }
    });

    let dir = match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent,
        _ => Path::new("."),
    };
    let io_err = |source| CodecError::Io {
        path: path.to_path_buf(),
        source,
    };

    let tmp = tempfile::NamedTempFile::new_in(dir).map_err(io_err)?;
    {
        let mut writer = BufWriter::new(tmp.as_file());
        image
            .write_to(&mut writer, ImageFormat::Png)
            .map_err(|source| CodecError::Encode {
                path: path.to_path_buf(),
                source,
            })?;
        writer.flush().map_err(io_err)?;
    }
    tmp.persist(path).map_err(|e| io_err(e.error))?;

    tracing::debug!(
        path = %path.display(),
        width,
        height,
        "Grid encoded"
    );
    Ok(())
}

/// Headroom on top of the pixel buffer for decoder scratch state.
const DECODE_HEADROOM: u64 = 64 * 1024 * 1024;

/// Allocation limits for decoding a `width` x `height` image.
///
/// `image` caps every decode at 512 MiB by default, which is below a
/// single grayscale buffer for the largest presets. The cap is instead
/// sized to the widest pixel layout the decoder may produce (16-bit RGBA).
pub(crate) fn decode_limits(width: u32, height: u32) -> Limits {
    let mut limits = Limits::no_limits();
    limits.max_alloc = Some(
        u64::from(width)
            .saturating_mul(u64::from(height))
            .saturating_mul(8)
            .saturating_add(DECODE_HEADROOM),
    );
    limits
}

/// Reads a persisted image back into a grid.
pub fn decode(path: impl AsRef<Path>, policy: DecodePolicy) -> Result<MonochromeGrid, CodecError> {
    let path = path.as_ref();
    let decode_err = |source| CodecError::Decode {
        path: path.to_path_buf(),
        source,
    };
    let open = || {
        ImageReader::open(path)
            .and_then(|r| r.with_guessed_format())
            .map_err(|source| CodecError::Io {
                path: path.to_path_buf(),
                source,
            })
    };

    let (width, height) = open()?.into_dimensions().map_err(decode_err)?;
    let mut reader = open()?;
    reader.limits(decode_limits(width, height));
    let image = reader.decode().map_err(decode_err)?;

    let cells = match image {
        DynamicImage::ImageLuma8(gray) => {
            collect_cells(gray.as_raw(), width, path, policy, |&l| l == 0, |&l| l == 255)?
        }
        other => {
            let rgb = other.into_rgb8();
            collect_cells(rgb.pixels(), width, path, policy, |p| *p == BLACK, |p| *p == WHITE)?
        }
    };

    let grid = MonochromeGrid::from_cells(cells, width as usize)?;
    tracing::debug!(
        path = %path.display(),
        width = grid.width(),
        height = grid.height(),
        "Grid decoded"
    );
    Ok(grid)
}

/// Maps row-major pixels to cells: black is `false`, anything else `true`.
fn collect_cells<'a, P: 'a>(
    pixels: impl IntoIterator<Item = &'a P>,
    width: u32,
    path: &Path,
    policy: DecodePolicy,
    is_black: impl Fn(&P) -> bool,
    is_white: impl Fn(&P) -> bool,
) -> Result<Vec<bool>, CodecError> {
    let width = width as usize;
    let pixels = pixels.into_iter();
    let mut cells = Vec::with_capacity(pixels.size_hint().0);

    for (index, pixel) in pixels.enumerate() {
        let black = is_black(pixel);
        if policy == DecodePolicy::Strict && !black && !is_white(pixel) {
            return Err(CodecError::NonMonochromePixel {
                path: path.to_path_buf(),
                x: (index % width) as u32,
                y: (index / width) as u32,
            });
        }
        cells.push(!black);
    }

    Ok(cells)
}
