use image::{GrayImage, Luma};

/// Uniform image of the given intensity.
pub fn flat(width: u32, height: u32, value: u8) -> GrayImage {
    GrayImage::from_pixel(width, height, Luma([value]))
}

/// Dark left part, bright from column `edge` onward.
pub fn vertical_step(width: u32, height: u32, edge: u32) -> GrayImage {
    GrayImage::from_fn(width, height, |x, _| Luma([if x >= edge { 255 } else { 0 }]))
}

/// Bright filled disk on a dark background.
pub fn disk(size: u32, radius: f32) -> GrayImage {
    let c = (size as f32 - 1.0) / 2.0;
    GrayImage::from_fn(size, size, |x, y| {
        let dx = x as f32 - c;
        let dy = y as f32 - c;
        Luma([if dx * dx + dy * dy <= radius * radius { 220 } else { 30 }])
    })
}

/// High-contrast checkerboard with square cells.
pub fn checkerboard(width: u32, height: u32, cell: u32) -> GrayImage {
    assert!(cell > 0, "cell size must be positive");
    GrayImage::from_fn(width, height, |x, y| {
        let val = if (x / cell + y / cell) % 2 == 0 { 32 } else { 220 };
        Luma([val])
    })
}

/// Deterministic pseudo-noise over a smooth gradient.
pub fn textured(width: u32, height: u32) -> GrayImage {
    GrayImage::from_fn(width, height, |x, y| {
        let base = (x * 255 / width.max(1)) as i32;
        let hash = (x.wrapping_mul(2_654_435_761) ^ y.wrapping_mul(40_503))
            .wrapping_mul(2_246_822_519);
        let noise = (hash >> 27) as i32 - 16;
        Luma([(base + noise).clamp(0, 255) as u8])
    })
}

/// Vertical step whose bright side brightens from top to bottom, so the
/// edge strength along the boundary column grows with the row.
pub fn graded_step(width: u32, height: u32, edge: u32) -> GrayImage {
    GrayImage::from_fn(width, height, |x, y| {
        Luma([if x >= edge { (100 + 15 * y).min(255) as u8 } else { 0 }])
    })
}
