/// Convert RGB image to grayscale
/// Y = 0.299*R + 0.587*G + 0.114*B
/// Uses fast integer arithmetic: Y = (76*R + 150*G + 29*B) >> 8

/// Coefficients for grayscale conversion: Y = (76*R + 150*G + 29*B) >> 8
const COEF_R: u32 = 76;
const COEF_G: u32 = 150;
const COEF_B: u32 = 29;

#[inline]
fn luminance(r: u8, g: u8, b: u8) -> u8 {
    let lum = (COEF_R * r as u32 + COEF_G * g as u32 + COEF_B * b as u32) >> 8;
    lum.min(255) as u8
}

/// Convert packed RGB bytes to one luminance byte per pixel
pub fn rgb_to_grayscale(rgb: &[u8], width: usize, height: usize) -> Vec<u8> {
    let pixel_count = width * height;
    let mut gray = vec![0u8; pixel_count];
    rgb_to_grayscale_with_buffer(rgb, width, height, &mut gray);
    gray
}

/// Convert RGB to grayscale into a caller-provided buffer
///
/// # Returns
/// Number of pixels written (width * height)
pub fn rgb_to_grayscale_with_buffer(
    rgb: &[u8],
    width: usize,
    height: usize,
    output: &mut [u8],
) -> usize {
    let pixel_count = (width * height).min(output.len()).min(rgb.len() / 3);
    for (out, px) in output[..pixel_count]
        .iter_mut()
        .zip(rgb.chunks_exact(3))
    {
        *out = luminance(px[0], px[1], px[2]);
    }
    pixel_count
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rgb_to_grayscale() {
        // Pure white
        let gray = rgb_to_grayscale(&[255, 255, 255], 1, 1);
        assert!(gray[0] >= 254);

        // Pure black
        let gray = rgb_to_grayscale(&[0, 0, 0], 1, 1);
        assert_eq!(gray[0], 0);

        // Pure red
        let gray = rgb_to_grayscale(&[255, 0, 0], 1, 1);
        assert!(gray[0] > 0 && gray[0] < 255);

        // Green dominates luminance
        let gray = rgb_to_grayscale(&[0, 255, 0], 1, 1);
        assert!(gray[0] > 100);

        // 2x2 image
        let img = vec![255, 0, 0, 0, 255, 0, 0, 0, 255, 255, 255, 255];
        let gray = rgb_to_grayscale(&img, 2, 2);
        assert_eq!(gray.len(), 4);
    }

    #[test]
    fn test_with_buffer_short_output() {
        let img = vec![200u8; 4 * 3];
        let mut out = vec![0u8; 2];
        assert_eq!(rgb_to_grayscale_with_buffer(&img, 2, 2, &mut out), 2);
        assert!(out.iter().all(|&v| v > 190));
    }
}
