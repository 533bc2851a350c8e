//! Cube map face layouts.

use renderer::CubeFace;

use super::image::DecodedImage;
use crate::error::{AssetError, AssetResult};

/// Six-file cube maps: suffix appended to the base path, and the face it is uploaded to.
///
/// Content depends on this exact pairing; `-xp` really does feed the negative X face.
pub const CUBE_FILES: [(&str, CubeFace); 6] = [
    ("-xp.png", CubeFace::NegativeX),
    ("-xn.png", CubeFace::PositiveX),
    ("-yn.png", CubeFace::NegativeY),
    ("-yp.png", CubeFace::PositiveY),
    ("-zn.png", CubeFace::NegativeZ),
    ("-zp.png", CubeFace::PositiveZ),
];

/// Vertical cross cells (column, row) in face units, in upload order.
///
/// ```text
///     +Y
/// -X  +Z  +X
///     -Y
///     -Z   (stored upside down)
/// ```
pub const CROSS_CELLS: [(CubeFace, u32, u32); 6] = [
    (CubeFace::NegativeX, 0, 1),
    (CubeFace::PositiveX, 2, 1),
    (CubeFace::NegativeY, 1, 2),
    (CubeFace::PositiveY, 1, 0),
    (CubeFace::NegativeZ, 1, 3),
    (CubeFace::PositiveZ, 1, 1),
];

/// Cut the six faces out of a vertical-cross atlas.
///
/// The -Z cell is rotated by 180 degrees (rows and columns reversed).
pub fn split_vertical_cross(
    name: &str,
    atlas: &DecodedImage,
) -> AssetResult<Vec<(CubeFace, DecodedImage)>> {
    let face_w = atlas.width / 3;
    let face_h = atlas.height / 4;
    if face_w == 0 || face_w * 3 != atlas.width || face_h * 4 != atlas.height || face_w != face_h {
        return Err(AssetError::BadCrossLayout {
            name: name.to_owned(),
            width: atlas.width,
            height: atlas.height,
        });
    }

    let bpp = atlas.bytes_per_pixel;
    let faces = CROSS_CELLS
        .iter()
        .map(|&(face, col, row)| {
            let (ox, oy) = (col * face_w, row * face_h);
            let flip = face == CubeFace::NegativeZ;
            let mut pixels = Vec::with_capacity(face_w as usize * face_h as usize * bpp);
            for y in 0..face_h {
                for x in 0..face_w {
                    let (sx, sy) = if flip {
                        (ox + face_w - 1 - x, oy + face_h - 1 - y)
                    } else {
                        (ox + x, oy + y)
                    };
                    pixels.extend_from_slice(atlas.pixel(sx, sy));
                }
            }
            let mut image = DecodedImage::new(face_w, face_h, bpp, pixels);
            image.order = atlas.order;
            (face, image)
        })
        .collect();
    Ok(faces)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn atlas(face: u32) -> DecodedImage {
        // every pixel stores (x, y) of its atlas position
        let (w, h) = (face * 3, face * 4);
        let mut pixels = Vec::new();
        for y in 0..h {
            for x in 0..w {
                pixels.extend_from_slice(&[x as u8, y as u8]);
            }
        }
        DecodedImage::new(w, h, 2, pixels)
    }

    #[test]
    fn faces_come_from_their_cells() {
        let faces = split_vertical_cross("cross", &atlas(2)).unwrap();
        let order: Vec<CubeFace> = faces.iter().map(|(f, _)| *f).collect();
        assert_eq!(
            order,
            vec![
                CubeFace::NegativeX,
                CubeFace::PositiveX,
                CubeFace::NegativeY,
                CubeFace::PositiveY,
                CubeFace::NegativeZ,
                CubeFace::PositiveZ
            ]
        );

        let (_, pos_x) = &faces[1];
        assert_eq!(pos_x.pixel(0, 0), &[4, 2]);
        assert_eq!(pos_x.pixel(1, 1), &[5, 3]);
    }

    #[test]
    fn negative_z_is_rotated_half_a_turn() {
        let faces = split_vertical_cross("cross", &atlas(2)).unwrap();
        let (_, neg_z) = &faces[4];
        // cell (1, 3) spans x 2..4, y 6..8
        assert_eq!(neg_z.pixel(0, 0), &[3, 7]);
        assert_eq!(neg_z.pixel(1, 0), &[2, 7]);
        assert_eq!(neg_z.pixel(0, 1), &[3, 6]);
        assert_eq!(neg_z.pixel(1, 1), &[2, 6]);
    }

    #[test]
    fn non_cross_atlas_is_rejected() {
        let img = DecodedImage::new(4, 4, 1, vec![0; 16]);
        assert!(matches!(
            split_vertical_cross("square", &img),
            Err(AssetError::BadCrossLayout { width: 4, height: 4, .. })
        ));
    }
}
