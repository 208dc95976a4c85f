use eframe::egui;
use egui::{Align2, Color32, Pos2, Rect, TextureOptions, Vec2};
use image::RgbaImage;
use log::{info, warn};

use crate::command::{Command, CommandHistory};
use crate::document::Document;
use crate::error::MarkupError;
use crate::export;
use crate::input::{InputEvent, InputHandler, PinchRecognizer};
use crate::loader::{ImageLoader, ImageSource};
use crate::renderer::Renderer;
use crate::shape::Shape;
use crate::stroke::BrushTexture;
use crate::tools::{SelectTool, Tool, ToolAction, ToolSettings, ToolType, new_tool};
use crate::view::{MAX_ZOOM, MIN_ZOOM, ViewTransform, ZOOM_BUTTON_STEP, ZOOM_WHEEL_STEP};

pub type SaveCallback = Box<dyn FnMut(Vec<u8>)>;
pub type CloseCallback = Box<dyn FnMut()>;

const ACCENT: Color32 = Color32::from_rgb(139, 115, 85);
const HANDLE_FILL: Color32 = Color32::from_rgb(30, 120, 255);
const HANDLE_SIZE: f32 = 10.0;

/// Lifecycle of the canvas itself. Pointer input is accepted only in
/// `Ready`; everything before that would corrupt the coordinate math.
enum SessionState {
    Loading,
    Ready,
    Failed(String),
}

struct TextPrompt {
    pos: Pos2,
    buffer: String,
}

/// The markup editing session: one image in, one composited image out.
///
/// The caller supplies the image source and receives the final PNG through
/// the save callback; dismissal fires the close callback instead.
pub struct MarkupApp {
    doc: Document,
    history: CommandHistory,
    renderer: Renderer,
    view: ViewTransform,
    tool: ToolType,
    settings: ToolSettings,

    session: SessionState,
    loader: Option<ImageLoader>,
    pending_background: Option<RgbaImage>,
    pending_stickers: Vec<RgbaImage>,

    input: InputHandler,
    pinch: PinchRecognizer,

    crop_region: Option<Rect>,
    confirm_clear: bool,
    confirm_crop: bool,
    text_prompt: Option<TextPrompt>,

    frame_texture: Option<egui::TextureHandle>,
    rendered_version: Option<u64>,
    frame_dirty: bool,
    last_canvas_rect: Option<Rect>,

    on_save: Option<SaveCallback>,
    on_close: Option<CloseCallback>,
}

impl MarkupApp {
    /// Called once before the first frame. Kicks off the background image
    /// decode and restores persisted tool settings.
    pub fn new(cc: &eframe::CreationContext<'_>, source: ImageSource) -> Self {
        let settings = cc
            .storage
            .and_then(|storage| eframe::get_value(storage, eframe::APP_KEY))
            .unwrap_or_default();

        Self {
            doc: Document::new(),
            history: CommandHistory::new(),
            renderer: Renderer::new(),
            view: ViewTransform::new(),
            tool: ToolType::draw(),
            settings,
            session: SessionState::Loading,
            loader: Some(ImageLoader::spawn(source)),
            pending_background: None,
            pending_stickers: Vec::new(),
            input: InputHandler::new(),
            pinch: PinchRecognizer::new(),
            crop_region: None,
            confirm_clear: false,
            confirm_crop: false,
            text_prompt: None,
            frame_texture: None,
            rendered_version: None,
            frame_dirty: false,
            last_canvas_rect: None,
            on_save: None,
            on_close: None,
        }
    }

    pub fn with_on_save(mut self, f: impl FnMut(Vec<u8>) + 'static) -> Self {
        self.on_save = Some(Box::new(f));
        self
    }

    pub fn with_on_close(mut self, f: impl FnMut() + 'static) -> Self {
        self.on_close = Some(Box::new(f));
        self
    }

    /// Add a decoded image as a sticker overlay. Queued until the background
    /// has loaded, since placement is relative to the canvas size.
    pub fn insert_sticker(&mut self, bytes: &[u8]) -> Result<(), MarkupError> {
        let img = image::load_from_memory(bytes)?.to_rgba8();
        match self.session {
            SessionState::Ready => self.commit_sticker(img),
            _ => self.pending_stickers.push(img),
        }
        Ok(())
    }

    fn commit_sticker(&mut self, img: RgbaImage) {
        let shape = Shape::sticker(self.doc.size(), img);
        self.run_command(Command::AddShape { shape });
        self.tool = ToolType::select();
    }

    fn run_command(&mut self, command: Command) {
        if let Err(err) = self.history.execute(command, &mut self.doc) {
            warn!("command failed: {err}");
        }
    }

    fn handle_action(&mut self, action: Option<ToolAction>) {
        match action {
            None => {}
            Some(ToolAction::Commit(command)) => self.run_command(command),
            Some(ToolAction::UpdateShape(shape)) => {
                self.doc.replace_shape(shape);
            }
            Some(ToolAction::SetCrop(rect)) => {
                let surface = Rect::from_min_size(Pos2::ZERO, self.doc.size());
                let clamped = rect.intersect(surface);
                if clamped.width() >= 1.0 && clamped.height() >= 1.0 {
                    self.crop_region = Some(clamped);
                }
            }
            Some(ToolAction::PromptText(pos)) => {
                self.text_prompt = Some(TextPrompt { pos, buffer: String::new() });
            }
            Some(ToolAction::Pan(delta)) => {
                self.view.pan_by(delta * self.view.scale());
            }
        }
    }

    fn switch_tool(&mut self, name: &str) {
        if self.tool.is_mid_action() {
            return; // finish or abandon the current action first
        }
        let Some(tool) = new_tool(name) else { return };
        if name == "crop" {
            self.crop_region = None;
        }
        let restore = self.tool.cancel();
        self.handle_action(restore);
        self.tool = tool;
    }

    fn undo(&mut self) {
        if let Err(err) = self.history.undo(&mut self.doc) {
            warn!("undo failed: {err}");
        }
        self.drop_stale_selection();
    }

    fn redo(&mut self) {
        if let Err(err) = self.history.redo(&mut self.doc) {
            warn!("redo failed: {err}");
        }
        self.drop_stale_selection();
    }

    fn drop_stale_selection(&mut self) {
        if let Some(id) = self.tool.selected_shape() {
            if self.doc.find_shape(id).is_none() {
                self.tool.clear_selection();
            }
        }
    }

    fn clear_all(&mut self) {
        self.doc.clear_annotations();
        self.history.clear();
        self.tool.clear_selection();
        info!("cleared all annotations");
    }

    fn delete_selected(&mut self) {
        let Some(id) = self.tool.selected_shape() else { return };
        let Some(index) = self.doc.shapes().iter().position(|s| s.id() == id) else {
            return;
        };
        let shape = self.doc.shapes()[index].clone();
        self.run_command(Command::RemoveShape { index, shape });
        self.tool.clear_selection();
    }

    fn apply_crop(&mut self) {
        let Some(region) = self.crop_region.take() else { return };
        match export::apply_crop(&mut self.doc, &mut self.history, region) {
            Ok(()) => {
                self.tool = ToolType::draw();
            }
            Err(err) => warn!("crop failed: {err}"),
        }
    }

    fn cancel_crop(&mut self) {
        self.crop_region = None;
        self.tool = ToolType::draw();
    }

    fn handle_save(&mut self) {
        match export::export_png(&self.doc) {
            Ok(bytes) => {
                if let Some(on_save) = &mut self.on_save {
                    on_save(bytes);
                }
            }
            Err(err) => warn!("export failed: {err}"),
        }
    }

    fn request_close(&mut self, ctx: &egui::Context) {
        if let Some(on_close) = &mut self.on_close {
            on_close();
        }
        ctx.send_viewport_cmd(egui::ViewportCommand::Close);
    }

    fn modal_open(&self) -> bool {
        self.confirm_clear || self.confirm_crop || self.text_prompt.is_some()
    }

    fn zoom_step(&mut self, step: f32) {
        let anchor = self
            .last_canvas_rect
            .map_or(Pos2::ZERO, |rect| (rect.size() / 2.0).to_pos2());
        let target = (self.view.scale() + step).clamp(MIN_ZOOM, MAX_ZOOM);
        self.view.zoom_about(anchor, target);
    }

    // ------------------------------------------------------------------
    // UI

    fn top_panel(&mut self, ctx: &egui::Context) {
        egui::TopBottomPanel::top("header").show(ctx, |ui| {
            ui.horizontal(|ui| {
                if ui.button("✖").clicked() {
                    self.request_close(ctx);
                }
                ui.heading(if self.crop_region.is_some() { "Crop Image" } else { "Draw" });
                ui.with_layout(egui::Layout::right_to_left(egui::Align::Center), |ui| {
                    if self.crop_region.is_some() {
                        if ui.button("Apply").clicked() {
                            self.confirm_crop = true;
                        }
                        if ui.button("Cancel").clicked() {
                            self.cancel_crop();
                        }
                    } else {
                        let ready = matches!(self.session, SessionState::Ready);
                        if ui.add_enabled(ready, egui::Button::new("Save")).clicked() {
                            self.handle_save();
                        }
                    }
                });
            });
        });
    }

    fn toolbar_panel(&mut self, ctx: &egui::Context) {
        egui::TopBottomPanel::bottom("toolbar").show(ctx, |ui| {
            ui.horizontal_wrapped(|ui| {
                for (name, label) in [
                    ("draw", "🖊 Draw"),
                    ("eraser", "⌫ Eraser"),
                    ("rect", "▭ Rect"),
                    ("circle", "○ Circle"),
                    ("text", "🗛 Text"),
                    ("select", "➤ Select"),
                    ("crop", "✂ Crop"),
                    ("pan", "✋ Pan"),
                ] {
                    if ui.selectable_label(self.tool.name() == name, label).clicked() {
                        self.switch_tool(name);
                    }
                }

                ui.separator();

                if ui
                    .add_enabled(self.history.can_undo(), egui::Button::new("⟲ Undo"))
                    .clicked()
                {
                    self.undo();
                }
                if ui
                    .add_enabled(self.history.can_redo(), egui::Button::new("⟳ Redo"))
                    .clicked()
                {
                    self.redo();
                }
            });

            ui.horizontal_wrapped(|ui| {
                ui.label("Color:");
                egui::color_picker::color_edit_button_srgba(
                    ui,
                    &mut self.settings.color,
                    egui::color_picker::Alpha::Opaque,
                );

                let eraser = self.tool.name() == "eraser";
                ui.label(if eraser { "Eraser size:" } else { "Size:" });
                let size = if eraser {
                    &mut self.settings.eraser_size
                } else {
                    &mut self.settings.brush_size
                };
                ui.add(egui::Slider::new(size, 1.0..=50.0));

                if self.tool.name() == "draw" {
                    egui::ComboBox::from_id_salt("brush_texture")
                        .selected_text(self.settings.texture.label())
                        .show_ui(ui, |ui| {
                            for texture in BrushTexture::ALL {
                                ui.selectable_value(
                                    &mut self.settings.texture,
                                    texture,
                                    texture.label(),
                                );
                            }
                        });
                }

                ui.separator();

                if ui.button("＋").on_hover_text("Zoom in").clicked() {
                    self.zoom_step(ZOOM_BUTTON_STEP);
                }
                if ui.button("－").on_hover_text("Zoom out").clicked() {
                    self.zoom_step(-ZOOM_BUTTON_STEP);
                }
                ui.label(format!("{:.0}%", self.view.scale() * 100.0));

                let eye = if self.renderer.show_annotations() { "👁 Hide" } else { "👁 Show" };
                if ui.button(eye).clicked() {
                    let show = !self.renderer.show_annotations();
                    self.renderer.set_show_annotations(show);
                    self.frame_dirty = true;
                }

                ui.separator();

                if self.tool.selected_shape().is_some() && ui.button("Delete Selected").clicked() {
                    self.delete_selected();
                }
                if ui
                    .add_enabled(
                        !self.doc.is_annotation_free(),
                        egui::Button::new("Clear All"),
                    )
                    .clicked()
                {
                    self.confirm_clear = true;
                }
            });
        });
    }

    fn central_panel(&mut self, ctx: &egui::Context) {
        egui::CentralPanel::default().show(ctx, |ui| {
            let failure = match &self.session {
                SessionState::Failed(message) => Some(message.clone()),
                _ => None,
            };
            if let Some(message) = failure {
                ui.centered_and_justified(|ui| {
                    ui.colored_label(
                        Color32::LIGHT_RED,
                        format!("The image could not be loaded.\n{message}"),
                    );
                });
                return;
            }

            if matches!(self.session, SessionState::Loading) {
                if let Some(img) = self.pending_background.take() {
                    let avail = ui.available_size();
                    let fitted = fit_to_container(
                        Vec2::new(img.width() as f32, img.height() as f32),
                        avail,
                    );
                    self.doc.set_background(img, fitted);
                    self.session = SessionState::Ready;
                    let stickers = std::mem::take(&mut self.pending_stickers);
                    for sticker in stickers {
                        self.commit_sticker(sticker);
                    }
                    ctx.request_repaint();
                } else {
                    ui.centered_and_justified(|ui| {
                        ui.spinner();
                    });
                }
                return;
            }

            self.canvas_ui(ui, ctx);
        });
    }

    fn canvas_ui(&mut self, ui: &mut egui::Ui, ctx: &egui::Context) {
        let (response, painter) =
            ui.allocate_painter(ui.available_size(), egui::Sense::click_and_drag());
        let panel_rect = response.rect;
        self.last_canvas_rect = Some(panel_rect);
        self.input.set_canvas_rect(panel_rect);

        // Two-finger gestures pre-empt every tool.
        if let Some(pinch) = self.pinch.process(ctx) {
            let anchor = (pinch.center - panel_rect.min).to_pos2();
            self.view.zoom_about(anchor, self.view.scale() * pinch.factor);
        }
        if self.pinch.is_active() {
            self.input.cancel_drag();
            if self.tool.is_mid_action() {
                let restore = self.tool.cancel();
                self.handle_action(restore);
            }
        }

        // Wheel zoom about the cursor.
        if response.hovered() {
            let scroll = ui.input(|i| i.raw_scroll_delta.y);
            if scroll != 0.0 {
                if let Some(pointer) = ui.input(|i| i.pointer.hover_pos()) {
                    let step = if scroll > 0.0 { ZOOM_WHEEL_STEP } else { -ZOOM_WHEEL_STEP };
                    let anchor = (pointer - panel_rect.min).to_pos2();
                    let target = (self.view.scale() + step).clamp(MIN_ZOOM, MAX_ZOOM);
                    self.view.zoom_about(anchor, target);
                }
            }
        }

        if !self.pinch.is_active() && !self.modal_open() {
            for event in self.input.process_input(ctx) {
                let screen = match event {
                    InputEvent::PointerDown { pos }
                    | InputEvent::PointerMove { pos }
                    | InputEvent::PointerUp { pos } => pos,
                };
                let local = (screen - panel_rect.min).to_pos2();
                let canvas = self.view.screen_to_canvas(local);
                let action = match event {
                    InputEvent::PointerDown { .. } => {
                        self.tool.on_pointer_down(canvas, &self.doc, &self.settings)
                    }
                    InputEvent::PointerMove { .. } => {
                        self.tool.on_pointer_move(canvas, &self.doc, &self.settings)
                    }
                    InputEvent::PointerUp { .. } => {
                        self.tool.on_pointer_up(canvas, &self.doc, &self.settings)
                    }
                };
                self.handle_action(action);
            }
        }

        self.refresh_frame(ctx);

        // Blit the composited frame under the view transform.
        let origin = panel_rect.min + self.view.offset();
        let display_size = self.doc.size() * self.view.scale();
        let image_rect = Rect::from_min_size(origin, display_size);
        if let Some(texture) = &self.frame_texture {
            painter.image(
                texture.id(),
                image_rect,
                Rect::from_min_max(Pos2::new(0.0, 0.0), Pos2::new(1.0, 1.0)),
                Color32::WHITE,
            );
        }

        self.draw_selection_overlay(&painter, panel_rect);
        self.draw_crop_overlay(&painter, panel_rect, image_rect);

        // Keep streaming frames while an action or gesture is live.
        if self.tool.is_mid_action() || self.pinch.is_active() {
            ctx.request_repaint();
        }
    }

    /// Re-rasterize the editing frame when the document or previews changed.
    fn refresh_frame(&mut self, ctx: &egui::Context) {
        self.tool.update_preview(&mut self.renderer);

        let version_changed = self.rendered_version != Some(self.doc.version());
        if !(version_changed || self.renderer.has_preview() || self.frame_dirty) {
            return;
        }

        let frame = self.renderer.render_editing(&self.doc, 1.0);
        let image = egui::ColorImage::from_rgba_unmultiplied(
            [frame.width() as usize, frame.height() as usize],
            frame.as_raw(),
        );
        self.frame_texture = Some(ctx.load_texture("markup_frame", image, TextureOptions::LINEAR));
        self.rendered_version = Some(self.doc.version());
        // One more pass after a preview disappears, so it is not left on
        // screen when nothing else changes the version.
        self.frame_dirty = self.renderer.has_preview();
    }

    fn draw_selection_overlay(&self, painter: &egui::Painter, panel_rect: Rect) {
        let Some(shape) = self.tool.selected_shape().and_then(|id| self.doc.find_shape(id))
        else {
            return;
        };

        let to_screen =
            |pos: Pos2| panel_rect.min + self.view.canvas_to_screen(pos).to_vec2();
        let (corners, rotate_handle) = SelectTool::handle_positions(shape);
        let screen_corners: Vec<Pos2> = corners.iter().map(|c| to_screen(*c)).collect();

        painter.add(egui::Shape::closed_line(
            screen_corners.clone(),
            egui::Stroke::new(1.0, HANDLE_FILL),
        ));

        for corner in &screen_corners {
            let rect = Rect::from_center_size(*corner, Vec2::splat(HANDLE_SIZE));
            painter.rect_filled(rect, 2.0, HANDLE_FILL);
            painter.rect_stroke(rect, 2.0, egui::Stroke::new(1.0, Color32::WHITE));
        }

        let top_center = screen_corners[0] + (screen_corners[1] - screen_corners[0]) / 2.0;
        let rotate_screen = to_screen(rotate_handle);
        painter.line_segment(
            [top_center, rotate_screen],
            egui::Stroke::new(1.0, HANDLE_FILL),
        );
        painter.circle_filled(rotate_screen, HANDLE_SIZE / 2.0, HANDLE_FILL);
        painter.circle_stroke(rotate_screen, HANDLE_SIZE / 2.0, egui::Stroke::new(1.0, Color32::WHITE));
    }

    fn draw_crop_overlay(&self, painter: &egui::Painter, panel_rect: Rect, image_rect: Rect) {
        let Some(region) = self.crop_region.or(self.tool.crop_drag()) else {
            return;
        };

        painter.rect_filled(image_rect, 0.0, Color32::from_black_alpha(128));

        let to_screen =
            |pos: Pos2| panel_rect.min + self.view.canvas_to_screen(pos).to_vec2();
        let min = to_screen(region.min);
        let max = to_screen(region.max);
        let outline = [
            min,
            Pos2::new(max.x, min.y),
            max,
            Pos2::new(min.x, max.y),
            min,
        ];
        painter.extend(egui::Shape::dashed_line(
            &outline,
            egui::Stroke::new(2.0, ACCENT),
            10.0,
            5.0,
        ));
    }

    fn dialogs(&mut self, ctx: &egui::Context) {
        if self.confirm_clear {
            let mut clear = false;
            let mut cancel = false;
            egui::Window::new("Clear all drawings?")
                .collapsible(false)
                .resizable(false)
                .anchor(Align2::CENTER_CENTER, Vec2::ZERO)
                .show(ctx, |ui| {
                    ui.label("Every stroke and shape will be removed.");
                    ui.horizontal(|ui| {
                        if ui.button("Cancel").clicked() {
                            cancel = true;
                        }
                        if ui.button("Clear").clicked() {
                            clear = true;
                        }
                    });
                });
            if clear {
                self.clear_all();
            }
            if clear || cancel {
                self.confirm_clear = false;
            }
        }

        if self.confirm_crop {
            let mut apply = false;
            let mut cancel = false;
            egui::Window::new("Apply crop?")
                .collapsible(false)
                .resizable(false)
                .anchor(Align2::CENTER_CENTER, Vec2::ZERO)
                .show(ctx, |ui| {
                    ui.label("Drawings outside the new frame cannot be kept; all strokes and shapes will be baked in and cleared.");
                    ui.horizontal(|ui| {
                        if ui.button("Cancel").clicked() {
                            cancel = true;
                        }
                        if ui.button("Apply").clicked() {
                            apply = true;
                        }
                    });
                });
            if apply {
                self.apply_crop();
            }
            if apply || cancel {
                self.confirm_crop = false;
            }
        }

        let mut submit = false;
        let mut dismiss = false;
        if let Some(prompt) = &mut self.text_prompt {
            egui::Window::new("Enter text")
                .collapsible(false)
                .resizable(false)
                .anchor(Align2::CENTER_CENTER, Vec2::ZERO)
                .show(ctx, |ui| {
                    let edit = ui.text_edit_singleline(&mut prompt.buffer);
                    edit.request_focus();
                    let has_content = !prompt.buffer.trim().is_empty();
                    ui.horizontal(|ui| {
                        if ui.button("Cancel").clicked() {
                            dismiss = true;
                        }
                        let add = ui.add_enabled(has_content, egui::Button::new("Add"));
                        if add.clicked()
                            || (has_content && ui.input(|i| i.key_pressed(egui::Key::Enter)))
                        {
                            submit = true;
                        }
                    });
                });
        }
        if submit {
            if let Some(prompt) = self.text_prompt.take() {
                let shape =
                    Shape::text(prompt.pos, prompt.buffer.trim(), self.settings.color);
                self.run_command(Command::AddShape { shape });
            }
        } else if dismiss {
            self.text_prompt = None;
        }
    }
}

impl eframe::App for MarkupApp {
    /// Called by the framework to save state before shutdown. Only the tool
    /// settings persist; the document itself belongs to the caller.
    fn save(&mut self, storage: &mut dyn eframe::Storage) {
        eframe::set_value(storage, eframe::APP_KEY, &self.settings);
    }

    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        if let Some(loader) = &self.loader {
            match loader.poll() {
                Some(Ok(img)) => {
                    self.pending_background = Some(img);
                    self.loader = None;
                }
                Some(Err(err)) => {
                    self.session = SessionState::Failed(err.to_string());
                    self.loader = None;
                }
                None => {
                    ctx.request_repaint_after(std::time::Duration::from_millis(50));
                }
            }
        }

        self.top_panel(ctx);
        self.toolbar_panel(ctx);
        self.central_panel(ctx);
        self.dialogs(ctx);
    }
}

/// Scale the image to fit the container while preserving aspect ratio.
fn fit_to_container(image_size: Vec2, container: Vec2) -> Vec2 {
    if image_size.x <= 0.0 || image_size.y <= 0.0 || container.x <= 0.0 || container.y <= 0.0 {
        return image_size;
    }
    let image_aspect = image_size.x / image_size.y;
    let container_aspect = container.x / container.y;
    if image_aspect > container_aspect {
        Vec2::new(container.x, container.x / image_aspect)
    } else {
        Vec2::new(container.y * image_aspect, container.y)
    }
}
