/// Separable 5-tap Gaussian blur ([1, 4, 6, 4, 1] / 16) with clamped borders
const KERNEL: [u32; 5] = [1, 4, 6, 4, 1];

/// Smooth a grayscale image; output has the same dimensions
pub fn gaussian_blur_5x5(gray: &[u8], width: usize, height: usize) -> Vec<u8> {
    if width == 0 || height == 0 {
        return Vec::new();
    }

    let mut horizontal = vec![0u16; width * height];
    for y in 0..height {
        let row = &gray[y * width..(y + 1) * width];
        for x in 0..width {
            let mut acc = 0u32;
            for (k, w) in KERNEL.iter().enumerate() {
                let sx = (x as isize + k as isize - 2).clamp(0, width as isize - 1) as usize;
                acc += w * row[sx] as u32;
            }
            // Keep 4 fractional bits for the vertical pass
            horizontal[y * width + x] = acc as u16;
        }
    }

    let mut out = vec![0u8; width * height];
    for y in 0..height {
        for x in 0..width {
            let mut acc = 0u32;
            for (k, w) in KERNEL.iter().enumerate() {
                let sy = (y as isize + k as isize - 2).clamp(0, height as isize - 1) as usize;
                acc += w * horizontal[sy * width + x] as u32;
            }
            out[y * width + x] = ((acc + 128) >> 8).min(255) as u8;
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_flat_image_unchanged() {
        let gray = vec![123u8; 7 * 5];
        assert_eq!(gaussian_blur_5x5(&gray, 7, 5), gray);
    }

    #[test]
    fn test_step_is_smoothed() {
        let width = 10;
        let mut gray = vec![0u8; width];
        for v in gray.iter_mut().skip(5) {
            *v = 160;
        }
        let out = gaussian_blur_5x5(&gray, width, 1);
        assert_eq!(out[0], 0);
        assert_eq!(out[9], 160);
        assert!(out[4] > 0 && out[4] < 80);
        assert!(out[5] > 80 && out[5] < 160);
    }
}
