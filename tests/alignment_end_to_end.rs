use cgmerge::{AlignMode, AlignParams, Aligner, ImageView, OwnedImage, Rgba8};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

fn gradient_base(width: usize, height: usize) -> OwnedImage<Rgba8> {
    let mut data = Vec::with_capacity(width * height);
    for y in 0..height {
        for x in 0..width {
            data.push([(x * 2) as u8, (y * 3) as u8, (x + y) as u8, 255]);
        }
    }
    OwnedImage::new(data, width, height).unwrap()
}

fn noise_base(width: usize, height: usize, seed: u64) -> OwnedImage<Rgba8> {
    let mut rng = StdRng::seed_from_u64(seed);
    let data = (0..width * height)
        .map(|_| {
            [
                rng.random_range(0..=255),
                rng.random_range(0..=255),
                rng.random_range(0..=255),
                255,
            ]
        })
        .collect();
    OwnedImage::new(data, width, height).unwrap()
}

fn crop(base: &OwnedImage<Rgba8>, x: usize, y: usize, w: usize, h: usize) -> OwnedImage<Rgba8> {
    base.view().roi(x, y, w, h).unwrap().to_owned_image()
}

#[test]
fn smooth_crop_aligns_in_both_modes() {
    let base = gradient_base(100, 80);
    let (dx0, dy0) = (37usize, 21usize);
    let diff = crop(&base, dx0, dy0, 30, 25);

    for mode in [AlignMode::Fast, AlignMode::Precise] {
        let res = Aligner::with_mode(mode).align(base.view(), diff.view());
        assert_eq!((res.dx, res.dy), (dx0 as i64, dy0 as i64), "{mode}");
        assert_eq!(res.distance, 0);
        assert!((res.fit_percent - 100.0).abs() < 1e-9);
        assert_eq!(res.border_pixel_count, 2 * (30 + 25) - 4);
    }
}

#[test]
fn noisy_crop_aligns_exhaustively() {
    let base = noise_base(48, 40, 7);
    for (dx0, dy0) in [(0usize, 0usize), (13, 9), (36, 28)] {
        let diff = crop(&base, dx0, dy0, 12, 12);
        let res = Aligner::with_mode(AlignMode::Precise).align(base.view(), diff.view());
        assert_eq!((res.dx, res.dy), (dx0 as i64, dy0 as i64));
        assert_eq!(res.distance, 0);
        assert_eq!(res.fit_percent, 100.0);
    }
}

#[test]
fn cutout_silhouette_aligns() {
    // Diff keeps an opaque ring of the base and is transparent elsewhere.
    let base = gradient_base(90, 90);
    let (dx0, dy0) = (22usize, 47usize);
    let mut diff = crop(&base, dx0, dy0, 31, 31);
    let w = diff.width();
    for (i, px) in diff.data_mut().iter_mut().enumerate() {
        let (x, y) = ((i % w) as i64 - 15, (i / w) as i64 - 15);
        let r2 = x * x + y * y;
        if !(36..=196).contains(&r2) {
            px[3] = 0;
        }
    }

    let res = Aligner::default().align(base.view(), diff.view());
    assert_eq!((res.dx, res.dy), (dx0 as i64, dy0 as i64));
    assert_eq!(res.distance, 0);
    assert!(res.border_pixel_count > 0);
}

#[test]
fn diff_equal_to_base_size_stays_at_origin() {
    let base = gradient_base(20, 20);
    let res = Aligner::default().align(base.view(), base.view());
    assert_eq!((res.dx, res.dy, res.distance), (0, 0, 0));
}

#[test]
fn strided_base_view_is_supported() {
    let base = gradient_base(60, 40);
    let padded: Vec<Rgba8> = base
        .view()
        .rows()
        .flat_map(|row| row.iter().copied().chain(std::iter::repeat([9, 9, 9, 9]).take(4)))
        .collect();
    let view = ImageView::new(&padded, 60, 40, 64).unwrap();
    let diff = crop(&base, 11, 17, 15, 10);

    let res = Aligner::new(AlignParams::precise())
        .unwrap()
        .align(view, diff.view());
    assert_eq!((res.dx, res.dy), (11, 17));
}

#[test]
fn custom_schedule_still_terminates() {
    let base = gradient_base(80, 80);
    let diff = crop(&base, 5, 60, 10, 10);
    let params = AlignParams {
        init_step: 50,
        step_divisor: 1,
        ext_scale: 5,
    };
    let res = Aligner::new(params).unwrap().align(base.view(), diff.view());
    assert_eq!((res.dx, res.dy), (5, 60));
}
