//! Focal-point selection for the cover crop.
//!
//! Gradient-energy heuristic: subjects (faces, hair, clothing edges) carry
//! far more local detail than studio backgrounds, so the crop window slides
//! toward the region with the highest edge energy. Best-effort; ties keep
//! the centered window so flat images behave exactly like a center crop.

use image::GrayImage;

/// Proxy edge size for the analysis pass. Offsets scale back up afterwards.
const ANALYSIS_MAX_EDGE: u32 = 96;

/// Top-left corner of a `win_w x win_h` crop window inside the image,
/// biased toward the most detailed region.
pub(crate) fn attention_origin(gray: &GrayImage, win_w: u32, win_h: u32) -> (u32, u32) {
    let (w, h) = gray.dimensions();
    if win_w >= w && win_h >= h {
        return (0, 0);
    }

    let scale = (ANALYSIS_MAX_EDGE as f64 / w.max(h) as f64).min(1.0);
    let aw = ((w as f64 * scale).round() as u32).max(1);
    let ah = ((h as f64 * scale).round() as u32).max(1);
    let proxy = image::imageops::thumbnail(gray, aw, ah);

    let energy = gradient_energy(&proxy);
    let integral = integral_image(&energy, aw as usize, ah as usize);

    let pw = ((win_w as f64 * scale).round() as u32).clamp(1, aw);
    let ph = ((win_h as f64 * scale).round() as u32).clamp(1, ah);

    // Start from the centered window so ties resolve to a center crop.
    let cx = (aw - pw) / 2;
    let cy = (ah - ph) / 2;
    let mut best = (cx, cy);
    let mut best_sum = window_sum(&integral, aw, cx, cy, pw, ph);

    for y in 0..=(ah - ph) {
        for x in 0..=(aw - pw) {
            let sum = window_sum(&integral, aw, x, y, pw, ph);
            if sum > best_sum {
                best_sum = sum;
                best = (x, y);
            }
        }
    }

    let max_x = w - win_w.min(w);
    let max_y = h - win_h.min(h);
    (
        ((best.0 as f64 / scale).round() as u32).min(max_x),
        ((best.1 as f64 / scale).round() as u32).min(max_y),
    )
}

/// Per-pixel |dx| + |dy| against the right and lower neighbours.
fn gradient_energy(gray: &GrayImage) -> Vec<u64> {
    let (w, h) = (gray.width() as usize, gray.height() as usize);
    let px = gray.as_raw();
    let mut energy = vec![0u64; w * h];
    for y in 0..h {
        for x in 0..w {
            let c = px[y * w + x] as i32;
            let right = if x + 1 < w { px[y * w + x + 1] as i32 } else { c };
            let down = if y + 1 < h { px[(y + 1) * w + x] as i32 } else { c };
            energy[y * w + x] = ((c - right).abs() + (c - down).abs()) as u64;
        }
    }
    energy
}

/// (w+1) x (h+1) summed-area table over `energy`.
fn integral_image(energy: &[u64], w: usize, h: usize) -> Vec<u64> {
    let stride = w + 1;
    let mut integral = vec![0u64; stride * (h + 1)];
    for y in 0..h {
        let mut row = 0u64;
        for x in 0..w {
            row += energy[y * w + x];
            integral[(y + 1) * stride + (x + 1)] = integral[y * stride + (x + 1)] + row;
        }
    }
    integral
}

fn window_sum(integral: &[u64], w: u32, x: u32, y: u32, win_w: u32, win_h: u32) -> u64 {
    let stride = (w + 1) as usize;
    let (x0, y0) = (x as usize, y as usize);
    let (x1, y1) = (x0 + win_w as usize, y0 + win_h as usize);
    integral[y1 * stride + x1] + integral[y0 * stride + x0]
        - integral[y0 * stride + x1]
        - integral[y1 * stride + x0]
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::Luma;

    #[test]
    fn flat_image_crops_centered() {
        let gray = GrayImage::from_pixel(200, 100, Luma([128]));
        let (ox, oy) = attention_origin(&gray, 100, 100);
        assert_eq!((ox, oy), (50, 0));
    }

    #[test]
    fn window_covering_whole_image_stays_at_origin() {
        let gray = GrayImage::from_pixel(100, 100, Luma([128]));
        assert_eq!(attention_origin(&gray, 100, 100), (0, 0));
        assert_eq!(attention_origin(&gray, 200, 200), (0, 0));
    }

    #[test]
    fn detail_attracts_the_window() {
        // Flat grey everywhere except a checkerboard strip on the right
        let gray = GrayImage::from_fn(400, 200, |x, y| {
            if x >= 300 && ((x / 16) + (y / 16)) % 2 == 0 {
                Luma([255])
            } else {
                Luma([100])
            }
        });

        let (ox, _) = attention_origin(&gray, 200, 200);
        // Center would be 100; the window must shift decisively right
        assert!(ox > 150, "expected right-shifted origin, got {ox}");
    }

    #[test]
    fn energy_window_sums_are_consistent() {
        let energy = vec![1u64; 16];
        let integral = integral_image(&energy, 4, 4);
        assert_eq!(window_sum(&integral, 4, 0, 0, 4, 4), 16);
        assert_eq!(window_sum(&integral, 4, 1, 1, 2, 2), 4);
    }
}
