//! Integer resampling: box-average downsampling and 16-bit fixed-point bilinear upsampling.
//!
//! Kernels are generic over bytes per pixel and picked from small dispatch
//! tables, so each inner loop has a constant channel count. Results are
//! bit-exact on every platform.

use super::image::DecodedImage;
use super::info::SizeTier;

/// Largest dimension the power-of-two correction may produce.
pub const MAX_UPSAMPLED_DIMENSION: u32 = 4096;

type Kernel = fn(&DecodedImage, &mut [u8], u32, u32);

const DOWN: [Kernel; 4] = [down_avg::<1>, down_avg::<2>, down_avg::<3>, down_avg::<4>];
const UP: [Kernel; 4] = [up_bilinear::<1>, up_bilinear::<2>, up_bilinear::<3>, up_bilinear::<4>];

fn kernel(table: &[Kernel; 4], bytes_per_pixel: usize) -> Kernel {
    match bytes_per_pixel {
        1..=4 => table[bytes_per_pixel - 1],
        other => panic!("cannot resample {other} bytes per pixel"),
    }
}

fn run(table: &[Kernel; 4], src: &DecodedImage, width: u32, height: u32) -> DecodedImage {
    let bpp = src.bytes_per_pixel;
    let kernel = kernel(table, bpp);
    let mut pixels = vec![0u8; width as usize * height as usize * bpp];
    kernel(src, &mut pixels, width, height);
    let mut out = DecodedImage::new(width, height, bpp, pixels);
    out.order = src.order;
    out
}

/// Box-average `src` down to `width` x `height`.
///
/// # Panics
/// When the target does not evenly divide the source, or for unsupported pixel sizes.
pub fn sample_down_avg(src: &DecodedImage, width: u32, height: u32) -> DecodedImage {
    run(&DOWN, src, width, height)
}

/// Bilinearly upsample `src` to `width` x `height` (each at least the source size).
///
/// # Panics
/// When the target is smaller than the source, or for unsupported pixel sizes.
pub fn sample_up_bilinear(src: &DecodedImage, width: u32, height: u32) -> DecodedImage {
    run(&UP, src, width, height)
}

/// Upsample to the next power of two per axis unless the image already is one.
///
/// # Panics
/// When a corrected axis would exceed [`MAX_UPSAMPLED_DIMENSION`].
pub fn upsample_to_power_of_two(src: DecodedImage) -> DecodedImage {
    if src.is_power_of_two() {
        return src;
    }
    let width = src.width.next_power_of_two();
    let height = src.height.next_power_of_two();
    assert!(
        width <= MAX_UPSAMPLED_DIMENSION && height <= MAX_UPSAMPLED_DIMENSION,
        "power-of-two correction of {}x{} exceeds {MAX_UPSAMPLED_DIMENSION}",
        src.width,
        src.height
    );
    log::debug!("Upsampling {}x{} to {width}x{height}", src.width, src.height);
    sample_up_bilinear(&src, width, height)
}

/// Shrink to the requested size tier; images already within it are returned unchanged.
pub fn apply_size_tier(src: DecodedImage, tier: SizeTier) -> DecodedImage {
    let (width, height) = tier.reduce(src.width, src.height);
    if width == src.width && height == src.height {
        return src;
    }
    log::debug!(
        "Downsampling {}x{} to {width}x{height} ({tier:?})",
        src.width,
        src.height
    );
    sample_down_avg(&src, width, height)
}

fn down_avg<const BPP: usize>(src: &DecodedImage, dst: &mut [u8], width: u32, height: u32) {
    let scale_x = (src.width / width) as usize;
    let scale_y = (src.height / height) as usize;
    assert_eq!(
        scale_x * width as usize,
        src.width as usize,
        "{width} does not divide source width {}",
        src.width
    );
    assert_eq!(
        scale_y * height as usize,
        src.height as usize,
        "{height} does not divide source height {}",
        src.height
    );
    let div = (scale_x * scale_y) as u32;
    let dst_pitch = width as usize * BPP;

    for y in 0..height as usize {
        let dst_row = &mut dst[y * dst_pitch..(y + 1) * dst_pitch];
        for x in 0..width as usize {
            let mut acc = [0u32; BPP];
            for sy in y * scale_y..(y + 1) * scale_y {
                let src_row = &src.pixels[sy * src.pitch..];
                for sx in x * scale_x..(x + 1) * scale_x {
                    let px = &src_row[sx * BPP..sx * BPP + BPP];
                    for (a, &c) in acc.iter_mut().zip(px) {
                        *a += c as u32;
                    }
                }
            }
            for (d, a) in dst_row[x * BPP..x * BPP + BPP].iter_mut().zip(acc) {
                *d = (a / div) as u8;
            }
        }
    }
}

fn up_bilinear<const BPP: usize>(src: &DecodedImage, dst: &mut [u8], width: u32, height: u32) {
    assert!(
        width >= src.width && height >= src.height,
        "cannot upsample {}x{} to {width}x{height}",
        src.width,
        src.height
    );
    const ONE: u32 = 1 << 16;
    let step_x = (src.width << 16) / width;
    let step_y = (src.height << 16) / height;
    let last_x = src.width as usize - 1;
    let last_y = src.height as usize - 1;
    let dst_pitch = width as usize * BPP;

    for y in 0..height {
        let sy = y * step_y;
        let fy1 = sy & 0xffff;
        let fy0 = ONE - fy1;
        let y0 = (sy >> 16) as usize;
        let row0 = &src.pixels[y0 * src.pitch..];
        let row1 = &src.pixels[(y0 + 1).min(last_y) * src.pitch..];
        let dst_row = &mut dst[y as usize * dst_pitch..(y as usize + 1) * dst_pitch];

        for x in 0..width {
            let sx = x * step_x;
            let fx1 = sx & 0xffff;
            let fx0 = ONE - fx1;
            let x0 = (sx >> 16) as usize;
            let x1 = (x0 + 1).min(last_x);

            for i in 0..BPP {
                let t0 = (row0[x0 * BPP + i] as u32 * fx0 + row0[x1 * BPP + i] as u32 * fx1) >> 16;
                let t1 = (row1[x0 * BPP + i] as u32 * fx0 + row1[x1 * BPP + i] as u32 * fx1) >> 16;
                dst_row[x as usize * BPP + i] = ((t0 * fy0 + t1 * fy1) >> 16) as u8;
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Deterministic noise so the property tests cover arbitrary content.
    fn noise(len: usize, mut seed: u32) -> Vec<u8> {
        (0..len)
            .map(|_| {
                seed = seed.wrapping_mul(1_664_525).wrapping_add(1_013_904_223);
                (seed >> 24) as u8
            })
            .collect()
    }

    #[test]
    fn downsample_is_truncated_block_mean() {
        // 8x4 luminance+alpha checkerboard of 2x2 cells: every 4x2 block mixes known values
        let mut pixels = Vec::new();
        for y in 0..4u32 {
            for x in 0..8u32 {
                let dark = ((x / 2) + (y / 2)) % 2 == 0;
                pixels.extend_from_slice(if dark { &[10, 255] } else { &[201, 0] });
            }
        }
        let src = DecodedImage::new(8, 4, 2, pixels);
        let dst = sample_down_avg(&src, 2, 2);

        for y in 0..2 {
            for x in 0..2 {
                let mut sum = [0u32; 2];
                for sy in y * 2..y * 2 + 2 {
                    for sx in x * 4..x * 4 + 4 {
                        let p = src.pixel(sx, sy);
                        sum[0] += p[0] as u32;
                        sum[1] += p[1] as u32;
                    }
                }
                assert_eq!(dst.pixel(x, y), &[(sum[0] / 8) as u8, (sum[1] / 8) as u8]);
            }
        }
        // 4 dark (10) + 4 light (201) per block: (40 + 804) / 8 = 105.5 -> 105
        assert_eq!(dst.pixel(0, 0)[0], 105);
        assert_eq!(dst.pixel(0, 0)[1], 127);
    }

    #[test]
    #[should_panic(expected = "does not divide")]
    fn downsample_requires_exact_blocks() {
        let src = DecodedImage::new(5, 4, 1, vec![0; 20]);
        sample_down_avg(&src, 2, 2);
    }

    #[test]
    #[should_panic(expected = "cannot resample")]
    fn unsupported_pixel_size_is_fatal() {
        let src = DecodedImage::new(1, 1, 5, vec![0; 5]);
        sample_up_bilinear(&src, 2, 2);
    }

    #[test]
    fn upsample_stays_within_contributing_pixels() {
        let cases = [
            (3, 5, 1, 4, 8),
            (100, 50, 2, 128, 64),
            (7, 7, 3, 16, 8),
            (5, 3, 4, 8, 4),
        ];
        for (w, h, bpp, dw, dh) in cases {
            let src = DecodedImage::new(w, h, bpp, noise((w * h) as usize * bpp, w * 31 + h));
            let dst = sample_up_bilinear(&src, dw, dh);
            let step_x = (w << 16) / dw;
            let step_y = (h << 16) / dh;

            for y in 0..dh {
                let y0 = (y * step_y) >> 16;
                let y1 = (y0 + 1).min(h - 1);
                for x in 0..dw {
                    let x0 = (x * step_x) >> 16;
                    let x1 = (x0 + 1).min(w - 1);
                    for c in 0..bpp {
                        let n = [
                            src.pixel(x0, y0)[c],
                            src.pixel(x1, y0)[c],
                            src.pixel(x0, y1)[c],
                            src.pixel(x1, y1)[c],
                        ];
                        let v = dst.pixel(x, y)[c];
                        let lo = *n.iter().min().unwrap();
                        let hi = *n.iter().max().unwrap();
                        assert!(
                            lo <= v && v <= hi,
                            "{w}x{h} -> {dw}x{dh} at ({x},{y}) c{c}: {v} not in [{lo},{hi}]"
                        );
                    }
                }
            }
        }
    }

    #[test]
    fn upsample_of_flat_image_is_flat() {
        let src = DecodedImage::new(3, 3, 4, [9, 80, 160, 255].repeat(9));
        let dst = sample_up_bilinear(&src, 4, 4);
        assert!(dst.pixels.chunks(4).all(|p| p == [9, 80, 160, 255]));
    }

    #[test]
    fn power_of_two_correction_rounds_each_axis_up() {
        let cases = [
            (100, 50, 128, 64),
            (64, 33, 64, 64),
            (3, 1, 4, 1),
            (513, 256, 1024, 256),
        ];
        for (w, h, ew, eh) in cases {
            let image = DecodedImage::new(w, h, 1, vec![0; (w * h) as usize]);
            let out = upsample_to_power_of_two(image);
            assert_eq!((out.width, out.height), (ew, eh));
        }
        let pot = DecodedImage::new(16, 8, 1, vec![7; 128]);
        assert_eq!(upsample_to_power_of_two(pot.clone()), pot);
    }

    #[test]
    #[should_panic(expected = "exceeds 4096")]
    fn upsample_ceiling_is_enforced() {
        upsample_to_power_of_two(DecodedImage::new(4097, 1, 1, vec![0; 4097]));
    }

    #[test]
    fn size_tier_shrinks_large_images() {
        let src = DecodedImage::new(512, 64, 1, vec![50; 512 * 64]);
        let small = apply_size_tier(src.clone(), SizeTier::Small);
        assert_eq!((small.width, small.height), (128, 64));
        assert!(small.pixels.iter().all(|&p| p == 50));
        let medium = apply_size_tier(src.clone(), SizeTier::Medium);
        assert_eq!((medium.width, medium.height), (256, 64));
        assert_eq!(apply_size_tier(src.clone(), SizeTier::Full), src);
    }
}
