use super::*;

fn px(frame: &FrameRgba, x: u32, y: u32) -> [u8; 4] {
    let i = ((y * frame.width + x) * 4) as usize;
    [frame.data[i], frame.data[i + 1], frame.data[i + 2], frame.data[i + 3]]
}

#[test]
fn background_and_fill_land_where_expected() {
    let mut scene = Scene::new(20, 10, Rgba8::WHITE);
    scene.push(DrawOp::Fill {
        rect: Rect::new(0.0, 0.0, 10.0, 10.0),
        radius: 0.0,
        color: Rgba8::opaque(255, 0, 0),
    });
    let frame = rasterize(&scene, &mut TextEngine::without_font()).unwrap();
    assert_eq!((frame.width, frame.height), (20, 10));
    assert_eq!(frame.data.len(), 20 * 10 * 4);
    assert_eq!(px(&frame, 4, 5), [255, 0, 0, 255]);
    assert_eq!(px(&frame, 15, 5), [255, 255, 255, 255]);
}

#[test]
fn image_op_samples_the_cropped_region() {
    // Left half green, right half blue; crop keeps only the right half.
    let mut bytes = Vec::new();
    for _y in 0..4 {
        for x in 0..8 {
            bytes.extend_from_slice(if x < 4 { &[0, 255, 0, 255] } else { &[0, 0, 255, 255] });
        }
    }
    let image = ImageHandle::from_premul(8, 4, bytes).unwrap();

    let mut scene = Scene::new(16, 16, Rgba8::WHITE);
    scene.push(DrawOp::Image {
        image,
        src: Rect::new(4.0, 0.0, 8.0, 4.0),
        dst: Rect::new(0.0, 0.0, 16.0, 16.0),
        radius: 0.0,
    });
    let frame = rasterize(&scene, &mut TextEngine::without_font()).unwrap();
    let centre = px(&frame, 8, 8);
    assert!(centre[2] > 200 && centre[1] < 50, "centre pixel {centre:?}");
}

#[test]
fn text_without_font_is_skipped() {
    let mut scene = Scene::new(8, 8, Rgba8::WHITE);
    scene.push(DrawOp::Text {
        text: "Jane".to_string(),
        x: 0.0,
        baseline: 6.0,
        size_px: 8.0,
        color: Rgba8::opaque(0, 0, 0),
    });
    let frame = rasterize(&scene, &mut TextEngine::without_font()).unwrap();
    assert!(frame.data.chunks_exact(4).all(|p| p == [255, 255, 255, 255]));
}

#[test]
fn oversized_surface_is_a_render_error() {
    let scene = Scene::new(70_000, 1, Rgba8::WHITE);
    assert!(matches!(
        rasterize(&scene, &mut TextEngine::without_font()),
        Err(PosterError::Render(_))
    ));
}

#[test]
fn encode_png_round_trips_dimensions() {
    let frame = FrameRgba {
        width: 3,
        height: 2,
        data: vec![128; 3 * 2 * 4],
    };
    let png = encode_png(&frame).unwrap();
    let decoded = image::load_from_memory(&png).unwrap();
    assert_eq!((decoded.width(), decoded.height()), (3, 2));

    let bad = FrameRgba {
        width: 3,
        height: 2,
        data: vec![0; 5],
    };
    assert!(encode_png(&bad).is_err());
}
