//! Contrast-limited adaptive histogram equalization.
//!
//! Tiled equalization with a clip limit. Each tile gets its own
//! remapping curve; output pixels blend the curves of the four
//! nearest tiles so tile seams stay invisible. The clip limit caps
//! how steep any curve can get, which keeps sensor noise in flat
//! regions from being stretched to full contrast.

use image::GrayImage;

/// Applies CLAHE over a `grid × grid` tiling of the image.
///
/// `clip_limit` is a multiple of the uniform histogram height; values
/// around 2.0 boost local contrast without posterizing.
pub fn equalize(luma: &GrayImage, clip_limit: f64, grid: u32) -> GrayImage {
    let (width, height) = luma.dimensions();
    if width == 0 || height == 0 {
        return luma.clone();
    }

    let tiles_x = grid.clamp(1, width);
    let tiles_y = grid.clamp(1, height);
    let tile_w = width.div_ceil(tiles_x);
    let tile_h = height.div_ceil(tiles_y);

    let mut luts: Vec<[u8; 256]> = Vec::with_capacity((tiles_x * tiles_y) as usize);
    for ty in 0..tiles_y {
        for tx in 0..tiles_x {
            let x0 = tx * tile_w;
            let y0 = ty * tile_h;
            let x1 = (x0 + tile_w).min(width);
            let y1 = (y0 + tile_h).min(height);
            luts.push(tile_lut(luma, x0, y0, x1, y1, clip_limit));
        }
    }

    let mut out = GrayImage::new(width, height);
    for y in 0..height {
        // Position in tile-center units, clamped at the borders
        let py = ((y as f64 + 0.5) / tile_h as f64 - 0.5).clamp(0.0, (tiles_y - 1) as f64);
        let ty0 = py.floor() as u32;
        let ty1 = (ty0 + 1).min(tiles_y - 1);
        let fy = py - ty0 as f64;

        for x in 0..width {
            let px = ((x as f64 + 0.5) / tile_w as f64 - 0.5).clamp(0.0, (tiles_x - 1) as f64);
            let tx0 = px.floor() as u32;
            let tx1 = (tx0 + 1).min(tiles_x - 1);
            let fx = px - tx0 as f64;

            let v = luma.get_pixel(x, y)[0] as usize;
            let lut = |tx: u32, ty: u32| luts[(ty * tiles_x + tx) as usize][v] as f64;

            let top = lut(tx0, ty0) * (1.0 - fx) + lut(tx1, ty0) * fx;
            let bottom = lut(tx0, ty1) * (1.0 - fx) + lut(tx1, ty1) * fx;
            let blended = top * (1.0 - fy) + bottom * fy;

            out.put_pixel(x, y, image::Luma([blended.round().clamp(0.0, 255.0) as u8]));
        }
    }
    out
}

/// Builds the clipped-equalization lookup table for one tile.
fn tile_lut(luma: &GrayImage, x0: u32, y0: u32, x1: u32, y1: u32, clip_limit: f64) -> [u8; 256] {
    // Degenerate tiles happen when the grid overshoots a small image
    if x0 >= x1 || y0 >= y1 {
        return identity_lut();
    }

    let mut histogram = [0u64; 256];
    for y in y0..y1 {
        for x in x0..x1 {
            histogram[luma.get_pixel(x, y)[0] as usize] += 1;
        }
    }

    let tile_pixels = u64::from(x1 - x0) * u64::from(y1 - y0);

    // Clip each bin at `clip_limit` times the uniform height and
    // hand the excess back to every bin evenly.
    let clip = ((clip_limit * tile_pixels as f64 / 256.0) as u64).max(1);
    let mut excess = 0u64;
    for bin in histogram.iter_mut() {
        if *bin > clip {
            excess += *bin - clip;
            *bin = clip;
        }
    }
    let bonus = excess / 256;
    let remainder = (excess % 256) as usize;
    for (i, bin) in histogram.iter_mut().enumerate() {
        *bin += bonus + u64::from(i < remainder);
    }

    let mut lut = [0u8; 256];
    let mut cumulative = 0u64;
    for (value, bin) in histogram.iter().enumerate() {
        cumulative += *bin;
        lut[value] = ((cumulative * 255) / tile_pixels).min(255) as u8;
    }
    lut
}

fn identity_lut() -> [u8; 256] {
    let mut lut = [0u8; 256];
    for (value, entry) in lut.iter_mut().enumerate() {
        *entry = value as u8;
    }
    lut
}
