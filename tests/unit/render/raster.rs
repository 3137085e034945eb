use super::*;

const SQUARE: &str = r##"<svg xmlns="http://www.w3.org/2000/svg" width="4" height="2" viewBox="0 0 4 2"><rect x="0" y="0" width="2" height="2" fill="#ff0000"/></svg>"##;

#[test]
fn rasterizes_straight_alpha_pixels() {
    let img = rasterize_svg(SQUARE, 1.0).unwrap();
    assert_eq!((img.width, img.height), (4, 2));
    assert_eq!(img.data.len(), 4 * 2 * 4);
    assert_eq!(&img.data[0..4], &[255, 0, 0, 255]);
    assert_eq!(img.data[3 * 4 + 3], 0);
}

#[test]
fn scale_multiplies_the_raster_size() {
    let img = rasterize_svg(SQUARE, 2.5).unwrap();
    assert_eq!((img.width, img.height), (10, 5));
}

#[test]
fn rejects_bad_input() {
    assert!(matches!(
        rasterize_svg("not svg", 1.0),
        Err(FlowlinesError::Render(_))
    ));
    assert!(rasterize_svg(SQUARE, 0.0).is_err());
    assert!(rasterize_svg(SQUARE, 10_000.0).is_err());
}
