use cgmerge::image::resize::fit_within;
use cgmerge::{
    extract_border, parse_name, BackgroundColor, CgError, ImageView, NameInfo, OwnedImage,
};

#[test]
fn image_view_rejects_invalid_dimensions() {
    let data = [[0u8; 4]; 4];

    let err = ImageView::from_slice(&data, 0, 1).err().unwrap();
    assert_eq!(
        err,
        CgError::InvalidDimensions {
            width: 0,
            height: 1,
        }
    );

    let err = ImageView::from_slice(&data, 1, 0).err().unwrap();
    assert_eq!(
        err,
        CgError::InvalidDimensions {
            width: 1,
            height: 0,
        }
    );
}

#[test]
fn image_view_rejects_invalid_stride() {
    let data = [[0u8; 3]; 8];

    let err = ImageView::new(&data, 4, 1, 3).err().unwrap();
    assert_eq!(
        err,
        CgError::InvalidStride {
            width: 4,
            stride: 3,
        }
    );
}

#[test]
fn image_view_rejects_short_buffer() {
    let data = [[0u8; 4]; 5];
    let err = ImageView::from_slice(&data, 3, 2).err().unwrap();
    assert_eq!(err, CgError::BufferTooSmall { needed: 6, got: 5 });
}

#[test]
fn roi_view_shares_backing_rows() {
    let data: Vec<[u8; 4]> = (0..20u8).map(|v| [v, v, v, 255]).collect();
    let view = ImageView::from_slice(&data, 5, 4).unwrap();
    let roi = view.roi(1, 2, 3, 2).unwrap();

    assert_eq!(roi.width(), 3);
    assert_eq!(roi.stride(), 5);
    assert_eq!(roi.get(0, 0), Some(&[11, 11, 11, 255]));
    assert_eq!(roi.row(1).unwrap()[2], [18, 18, 18, 255]);
    assert_eq!(
        view.roi(3, 0, 3, 1).err(),
        Some(CgError::InvalidParams("roi exceeds image bounds"))
    );

    let owned = roi.to_owned_image();
    assert_eq!(owned.width(), 3);
    assert_eq!(owned.data()[3], [16, 16, 16, 255]);
}

#[test]
fn owned_image_requires_exact_length() {
    assert!(OwnedImage::new(vec![[0u8; 4]; 6], 3, 2).is_ok());
    assert_eq!(
        OwnedImage::new(vec![[0u8; 4]; 5], 3, 2).err(),
        Some(CgError::BufferTooSmall { needed: 6, got: 5 })
    );
    assert!(OwnedImage::new(vec![[0u8; 4]; 7], 3, 2).is_err());
}

#[test]
fn rgba_rgb_conversion_drops_and_restores_alpha() {
    let rgba = OwnedImage::new(vec![[1u8, 2, 3, 9], [4, 5, 6, 0]], 2, 1).unwrap();
    let rgb = rgba.to_rgb();
    assert_eq!(rgb.data(), &[[1, 2, 3], [4, 5, 6]]);
    assert_eq!(rgb.to_rgba().data(), &[[1, 2, 3, 255], [4, 5, 6, 255]]);
}

#[test]
fn border_of_opaque_rectangle_is_its_perimeter() {
    for (w, h) in [(2usize, 2usize), (3, 7), (16, 9), (40, 2)] {
        let img = OwnedImage::filled(w, h, [10u8, 20, 30, 255]).unwrap();
        let border = extract_border(img.view());
        assert_eq!(border.len(), 2 * (w + h) - 4, "{w}x{h}");
        assert_eq!(border.colors().len(), border.coords().len());
    }
}

#[test]
fn border_follows_transparent_cutout() {
    // Opaque disc on a transparent canvas: every border pixel must touch
    // transparency, none may sit on the canvas edge.
    let (w, h) = (21usize, 21usize);
    let mut data = vec![[0u8, 0, 0, 0]; w * h];
    for y in 0..h {
        for x in 0..w {
            let (cx, cy) = (x as i64 - 10, y as i64 - 10);
            if cx * cx + cy * cy <= 49 {
                data[y * w + x] = [250, 120, 0, 255];
            }
        }
    }
    let img = OwnedImage::new(data, w, h).unwrap();
    let border = extract_border(img.view());
    assert!(!border.is_empty());
    for &(row, col) in border.coords() {
        assert!(row > 0 && col > 0 && row < h - 1 && col < w - 1);
        let neighbours = [
            img.data()[(row - 1) * w + col],
            img.data()[(row + 1) * w + col],
            img.data()[row * w + col - 1],
            img.data()[row * w + col + 1],
        ];
        assert!(neighbours.iter().any(|px| px[3] == 0));
    }
}

#[test]
fn filename_examples() {
    assert_eq!(
        parse_name("foo差分12"),
        NameInfo {
            group_key: "foo".into(),
            diff_index: Some(12),
            has_diff_word: true,
        }
    );
    assert_eq!(
        parse_name("bar"),
        NameInfo {
            group_key: "bar".into(),
            diff_index: None,
            has_diff_word: false,
        }
    );
    assert_eq!(parse_name(" ev01／差分 ３ ").diff_index, Some(3));
    assert_eq!(parse_name(" ev01／差分 ３ ").group_key, "ev01");
    assert_eq!(parse_name("差分4").group_key, "差分4");
    assert!(parse_name("差分なし").has_diff_word);
    assert_eq!(parse_name("x差分99999999999").diff_index, None);
}

#[test]
fn background_color_strings() {
    let c: BackgroundColor = "#00ff80".parse().unwrap();
    assert_eq!(c.rgb(), [0, 255, 128]);
    assert_eq!("white".parse::<BackgroundColor>(), Ok(BackgroundColor::WHITE));
    assert!(matches!(
        "#xyz".parse::<BackgroundColor>(),
        Err(CgError::InvalidColor { .. })
    ));
}

#[test]
fn large_images_are_downsampled_for_features() {
    let img = OwnedImage::filled(3000, 1500, [1u8, 2, 3]).unwrap();
    let small = fit_within(img.view(), 1200);
    assert_eq!((small.width(), small.height()), (1200, 600));
    assert!(small.data().iter().all(|&px| px == [1, 2, 3]));
}
