use eframe_markup::command::CommandHistory;
use eframe_markup::document::Document;
use eframe_markup::shape::{Shape, ShapeKind};
use eframe_markup::stroke::BrushTexture;
use eframe_markup::tools::{Tool, ToolAction, ToolSettings, ToolType};
use egui::{Color32, Pos2, Vec2};

fn apply_action(action: Option<ToolAction>, doc: &mut Document, history: &mut CommandHistory) {
    match action {
        Some(ToolAction::Commit(command)) => {
            history.execute(command, doc).unwrap();
        }
        Some(ToolAction::UpdateShape(shape)) => {
            doc.replace_shape(shape);
        }
        _ => {}
    }
}

fn drag(
    tool: &mut ToolType,
    doc: &mut Document,
    history: &mut CommandHistory,
    settings: &ToolSettings,
    path: &[Pos2],
) {
    let (first, rest) = path.split_first().expect("empty drag path");
    let action = tool.on_pointer_down(*first, doc, settings);
    apply_action(action, doc, history);
    for pos in rest {
        let action = tool.on_pointer_move(*pos, doc, settings);
        apply_action(action, doc, history);
    }
    let last = path.last().expect("empty drag path");
    let action = tool.on_pointer_up(*last, doc, settings);
    apply_action(action, doc, history);
}

#[test]
fn sub_threshold_rectangle_drag_is_discarded() {
    let mut doc = Document::new();
    let mut history = CommandHistory::new();
    let settings = ToolSettings::default();
    let mut tool = ToolType::rect();

    // Both deltas are under 5 px: (10,10) -> (12,11).
    drag(
        &mut tool,
        &mut doc,
        &mut history,
        &settings,
        &[Pos2::new(10.0, 10.0), Pos2::new(12.0, 11.0)],
    );

    assert!(doc.shapes().is_empty());
    assert!(!history.can_undo());
}

#[test]
fn one_small_axis_is_enough_to_discard() {
    let mut doc = Document::new();
    let mut history = CommandHistory::new();
    let settings = ToolSettings::default();
    let mut tool = ToolType::rect();

    // Wide but only 3 px tall.
    drag(
        &mut tool,
        &mut doc,
        &mut history,
        &settings,
        &[Pos2::new(10.0, 10.0), Pos2::new(60.0, 13.0)],
    );

    assert!(doc.shapes().is_empty());
}

#[test]
fn rectangle_drag_commits_normalized_bounds() {
    let mut doc = Document::new();
    let mut history = CommandHistory::new();
    let settings = ToolSettings::default();
    let mut tool = ToolType::rect();

    // Drag up-left so the anchor is the max corner.
    drag(
        &mut tool,
        &mut doc,
        &mut history,
        &settings,
        &[Pos2::new(50.0, 40.0), Pos2::new(20.0, 10.0)],
    );

    assert_eq!(doc.shapes().len(), 1);
    let shape = &doc.shapes()[0];
    assert_eq!(shape.position(), Pos2::new(20.0, 10.0));
    match shape.kind() {
        ShapeKind::Rect { size } => assert_eq!(*size, Vec2::new(30.0, 30.0)),
        other => panic!("unexpected kind: {other:?}"),
    }
    assert_eq!(shape.stroke(), settings.color);
    assert_eq!(shape.stroke_width(), settings.brush_size);
    assert!(history.can_undo());
}

#[test]
fn circle_drag_commits_center_and_radius() {
    let mut doc = Document::new();
    let mut history = CommandHistory::new();
    let settings = ToolSettings::default();
    let mut tool = ToolType::circle();

    drag(
        &mut tool,
        &mut doc,
        &mut history,
        &settings,
        &[Pos2::new(10.0, 10.0), Pos2::new(50.0, 30.0)],
    );

    assert_eq!(doc.shapes().len(), 1);
    let shape = &doc.shapes()[0];
    // Center is the drag midpoint, radius half the smaller extent.
    assert_eq!(shape.position(), Pos2::new(30.0, 20.0));
    match shape.kind() {
        ShapeKind::Circle { radius } => assert_eq!(*radius, 10.0),
        other => panic!("unexpected kind: {other:?}"),
    }
}

#[test]
fn draw_tool_commits_every_pointer_sample() {
    let mut doc = Document::new();
    let mut history = CommandHistory::new();
    let settings = ToolSettings { brush_size: 8.0, ..Default::default() };
    let mut tool = ToolType::draw();

    let path = [
        Pos2::new(10.0, 10.0),
        Pos2::new(12.0, 14.0),
        Pos2::new(15.0, 18.0),
        Pos2::new(19.0, 21.0),
    ];
    drag(&mut tool, &mut doc, &mut history, &settings, &path);

    assert_eq!(doc.strokes().len(), 1);
    let stroke = &doc.strokes()[0];
    // Down seeds the first point and each move appends one.
    assert_eq!(stroke.points().len(), path.len());
    assert_eq!(stroke.points()[0], path[0]);
    assert_eq!(stroke.width(), 8.0);
    assert_eq!(stroke.texture(), BrushTexture::Solid);
    assert!(!stroke.is_eraser());
}

#[test]
fn eraser_tool_uses_eraser_size_and_flag() {
    let mut doc = Document::new();
    let mut history = CommandHistory::new();
    let settings = ToolSettings {
        brush_size: 8.0,
        eraser_size: 20.0,
        ..Default::default()
    };
    let mut tool = ToolType::eraser();

    drag(
        &mut tool,
        &mut doc,
        &mut history,
        &settings,
        &[Pos2::new(5.0, 5.0), Pos2::new(25.0, 25.0)],
    );

    assert_eq!(doc.strokes().len(), 1);
    let stroke = &doc.strokes()[0];
    assert!(stroke.is_eraser());
    assert_eq!(stroke.width(), 20.0);
}

#[test]
fn tap_with_draw_tool_still_commits_a_point() {
    let mut doc = Document::new();
    let mut history = CommandHistory::new();
    let settings = ToolSettings::default();
    let mut tool = ToolType::draw();

    drag(&mut tool, &mut doc, &mut history, &settings, &[Pos2::new(30.0, 30.0)]);

    assert_eq!(doc.strokes().len(), 1);
    assert!(!doc.strokes()[0].points().is_empty());
}

#[test]
fn select_tool_moves_shape_and_commits_one_transform() {
    let mut doc = Document::new();
    let mut history = CommandHistory::new();
    let settings = ToolSettings::default();

    let shape = Shape::rect(
        Pos2::new(20.0, 20.0),
        Vec2::new(40.0, 30.0),
        Color32::BLUE,
        2.0,
    );
    let id = shape.id();
    doc.add_shape(shape);

    let mut tool = ToolType::select();
    drag(
        &mut tool,
        &mut doc,
        &mut history,
        &settings,
        &[
            Pos2::new(40.0, 35.0), // inside the body
            Pos2::new(50.0, 40.0),
            Pos2::new(60.0, 45.0),
        ],
    );

    assert_eq!(tool.selected_shape(), Some(id));
    let moved = doc.find_shape(id).unwrap();
    assert_eq!(moved.position(), Pos2::new(40.0, 30.0));

    // Exactly one undoable transform for the whole drag.
    assert!(history.can_undo());
    history.undo(&mut doc).unwrap();
    assert_eq!(doc.find_shape(id).unwrap().position(), Pos2::new(20.0, 20.0));
    assert!(!history.can_undo());
}

#[test]
fn select_on_empty_surface_clears_selection() {
    let mut doc = Document::new();
    let mut history = CommandHistory::new();
    let settings = ToolSettings::default();

    let shape = Shape::rect(
        Pos2::new(20.0, 20.0),
        Vec2::new(30.0, 30.0),
        Color32::BLUE,
        2.0,
    );
    doc.add_shape(shape);

    let mut tool = ToolType::select();
    drag(&mut tool, &mut doc, &mut history, &settings, &[Pos2::new(30.0, 30.0)]);
    assert!(tool.selected_shape().is_some());

    drag(&mut tool, &mut doc, &mut history, &settings, &[Pos2::new(200.0, 200.0)]);
    assert!(tool.selected_shape().is_none());
}

#[test]
fn pan_tool_never_touches_the_model() {
    let mut doc = Document::new();
    let mut history = CommandHistory::new();
    let settings = ToolSettings::default();
    let mut tool = ToolType::pan();

    let before = doc.version();
    drag(
        &mut tool,
        &mut doc,
        &mut history,
        &settings,
        &[Pos2::new(10.0, 10.0), Pos2::new(80.0, 90.0)],
    );

    assert_eq!(doc.version(), before);
    assert!(doc.strokes().is_empty());
    assert!(!history.can_undo());
}

#[test]
fn crop_drag_yields_region_without_model_changes() {
    let doc = Document::new();
    let settings = ToolSettings::default();
    let mut tool = ToolType::crop();

    let down = tool.on_pointer_down(Pos2::new(10.0, 10.0), &doc, &settings);
    assert!(down.is_none());
    tool.on_pointer_move(Pos2::new(40.0, 50.0), &doc, &settings);
    let up = tool.on_pointer_up(Pos2::new(40.0, 50.0), &doc, &settings);

    match up {
        Some(ToolAction::SetCrop(rect)) => {
            assert_eq!(rect.min, Pos2::new(10.0, 10.0));
            assert_eq!(rect.size(), Vec2::new(30.0, 40.0));
        }
        other => panic!("expected SetCrop, got {other:?}"),
    }
    assert!(doc.is_annotation_free());
}

#[test]
fn sub_threshold_crop_drag_is_discarded() {
    let doc = Document::new();
    let settings = ToolSettings::default();
    let mut tool = ToolType::crop();

    tool.on_pointer_down(Pos2::new(10.0, 10.0), &doc, &settings);
    let up = tool.on_pointer_up(Pos2::new(14.0, 13.0), &doc, &settings);
    assert!(up.is_none());
}
