use eframe_markup::command::{Command, CommandHistory};
use eframe_markup::document::Document;
use eframe_markup::export;
use eframe_markup::shape::Shape;
use eframe_markup::stroke::{BrushTexture, Stroke};
use eframe_markup::view::ViewTransform;
use egui::{Color32, Pos2, Rect, Vec2};
use image::RgbaImage;

fn ready_document(width: u32, height: u32) -> Document {
    let mut doc = Document::new();
    let bg = RgbaImage::from_pixel(width, height, image::Rgba([200, 200, 200, 255]));
    doc.set_background(bg, Vec2::new(width as f32, height as f32));
    doc
}

fn annotated_document() -> (Document, CommandHistory) {
    let mut doc = ready_document(100, 80);
    let mut history = CommandHistory::new();
    history
        .execute(
            Command::AddStroke {
                stroke: Stroke::new(
                    vec![Pos2::new(10.0, 10.0), Pos2::new(70.0, 60.0)],
                    Color32::RED,
                    6.0,
                    BrushTexture::Solid,
                    false,
                ),
            },
            &mut doc,
        )
        .unwrap();
    history
        .execute(
            Command::AddShape {
                shape: Shape::rect(
                    Pos2::new(20.0, 20.0),
                    Vec2::new(30.0, 20.0),
                    Color32::BLUE,
                    3.0,
                ),
            },
            &mut doc,
        )
        .unwrap();
    (doc, history)
}

#[test]
fn crop_replaces_background_and_empties_annotations() {
    let (mut doc, mut history) = annotated_document();
    assert!(!doc.is_annotation_free());

    export::apply_crop(
        &mut doc,
        &mut history,
        Rect::from_min_size(Pos2::new(10.0, 10.0), Vec2::new(50.0, 40.0)),
    )
    .unwrap();

    // Strokes and shapes never survive a crop, regardless of content.
    assert!(doc.strokes().is_empty());
    assert!(doc.shapes().is_empty());
    assert!(!history.can_undo());
    assert!(!history.can_redo());

    // The surface now has the region's logical size, stored at 2x density.
    assert_eq!(doc.size(), Vec2::new(50.0, 40.0));
    let bg = doc.background().unwrap();
    assert_eq!(bg.image().dimensions(), (100, 80));
}

#[test]
fn crop_bakes_annotations_into_the_new_background() {
    let mut doc = ready_document(100, 80);
    let mut history = CommandHistory::new();
    history
        .execute(
            Command::AddStroke {
                stroke: Stroke::new(
                    vec![Pos2::new(20.0, 30.0), Pos2::new(40.0, 30.0)],
                    Color32::RED,
                    8.0,
                    BrushTexture::Solid,
                    false,
                ),
            },
            &mut doc,
        )
        .unwrap();

    export::apply_crop(
        &mut doc,
        &mut history,
        Rect::from_min_size(Pos2::new(10.0, 10.0), Vec2::new(50.0, 40.0)),
    )
    .unwrap();

    // Canvas point (30, 30) maps to (20, 20) in the region, (40, 40) at 2x.
    let bg = doc.background().unwrap();
    let px = bg.image().get_pixel(40, 40);
    assert_eq!((px[0], px[1], px[2]), (255, 0, 0));
}

#[test]
fn crop_region_is_clamped_to_the_surface() {
    let (mut doc, mut history) = annotated_document();
    export::apply_crop(
        &mut doc,
        &mut history,
        Rect::from_min_size(Pos2::new(80.0, 60.0), Vec2::new(500.0, 500.0)),
    )
    .unwrap();
    assert_eq!(doc.size(), Vec2::new(20.0, 20.0));
}

#[test]
fn degenerate_crop_region_is_rejected() {
    let (mut doc, mut history) = annotated_document();
    let result = export::apply_crop(
        &mut doc,
        &mut history,
        Rect::from_min_size(Pos2::new(200.0, 200.0), Vec2::new(50.0, 50.0)),
    );
    assert!(result.is_err());
    // Nothing was disturbed.
    assert!(!doc.is_annotation_free());
    assert!(history.can_undo());
}

#[test]
fn export_is_2x_and_independent_of_zoom() {
    let (doc, _history) = annotated_document();

    // The view transform is presentation-only; exporting at any zoom level
    // yields the same fixed-density output.
    let mut view = ViewTransform::new();
    view.zoom_about(Pos2::new(30.0, 30.0), 3.0);

    let png = export::export_png(&doc).unwrap();
    let decoded = image::load_from_memory(&png).unwrap().to_rgba8();
    assert_eq!(decoded.dimensions(), (200, 160));
    assert_eq!(view.scale(), 3.0);
}

#[test]
fn export_without_background_is_an_error() {
    let doc = Document::new();
    assert!(export::export_png(&doc).is_err());
}

#[test]
fn export_leaves_the_session_untouched() {
    let (doc, history) = annotated_document();
    let strokes_before = doc.strokes().to_vec();
    let version_before = doc.version();

    export::export_png(&doc).unwrap();

    assert_eq!(doc.strokes(), strokes_before.as_slice());
    assert_eq!(doc.version(), version_before);
    assert!(history.can_undo());
}
