// ============================================================================
// WINDOW FRONT-END
// ============================================================================

use std::error::Error;
use std::sync::mpsc::Receiver;
use std::time::Instant;

use pixels::{Pixels, SurfaceTexture};
use rusttype::{point, Font, PositionedGlyph, Scale};
use winit::dpi::LogicalSize;
use winit::event::{ElementState, Event, WindowEvent};
use winit::event_loop::{ControlFlow, EventLoop};
use winit::keyboard::{Key, NamedKey};
use winit::window::WindowBuilder;

use crate::config::OdometerConfig;
use crate::controller::{DigitRenderer, OdometerController, ScrollStatus};
use crate::error::{OdometerError, Result};
use crate::overlay::{align_overlays, centered_origin, FontGlyphMetrics, OverlayPlacement};
use crate::scheduler::FrameScheduler;
use crate::strip::ReelStrip;

/// Command enum for driving the odometer from another thread
#[derive(Debug, Clone, PartialEq)]
pub enum OdometerCommand {
    NewRound,
    StartScroll,
    Cancel,
    SetValue(f64),
    SetTarget(f64),
}

/// Main odometer window - the primary public interface
#[derive(Debug, Clone)]
pub struct Odometer {
    config: OdometerConfig,
}

impl Odometer {
    pub fn new(config: OdometerConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &OdometerConfig {
        &self.config
    }

    pub fn show(&mut self) -> std::result::Result<(), Box<dyn Error>> {
        self.run_window(None)
    }

    pub fn show_with_commands(
        &mut self,
        receiver: Receiver<OdometerCommand>,
    ) -> std::result::Result<(), Box<dyn Error>> {
        self.run_window(Some(receiver))
    }

    fn run_window(
        &self,
        receiver: Option<Receiver<OdometerCommand>>,
    ) -> std::result::Result<(), Box<dyn Error>> {
        let config = self.config.clone();
        let font = load_font(&config)?;

        let mut rng = rand::rng();
        let mut controller = OdometerController::new(
            config.clone(),
            ReelFaces::new(config.reel_count),
            FrameScheduler::new(),
            &mut rng,
        )?;

        let event_loop = EventLoop::new()?;
        let window = WindowBuilder::new()
            .with_title(&config.title)
            .with_inner_size(LogicalSize::new(
                config.window_width as f64,
                config.window_height as f64,
            ))
            .with_resizable(false)
            .build(&event_loop)?;

        let window = std::sync::Arc::new(window);
        let window_clone = window.clone();
        let size = window.inner_size();
        let mut fb_width = size.width as usize;
        let mut fb_height = size.height as usize;
        let surface_texture = SurfaceTexture::new(size.width, size.height, &window);
        let mut pixels = Pixels::new(size.width, size.height, surface_texture)?;

        let frame_duration = std::time::Duration::from_secs_f64(1.0 / config.max_framerate);
        let mut last_frame = Instant::now();
        let mut last_tick = Instant::now();
        let mut readout = ReadoutCache::default();

        log::info!("Space: new round, A: start scroll, Esc: quit");

        event_loop.run(move |event, window_target| {
            window_target.set_control_flow(ControlFlow::Poll);
            match event {
                Event::WindowEvent { event, .. } => match event {
                    WindowEvent::CloseRequested => {
                        window_target.exit();
                    }
                    WindowEvent::KeyboardInput { event, .. } => {
                        if event.state != ElementState::Pressed || event.repeat {
                            return;
                        }
                        match event.logical_key.as_ref() {
                            Key::Named(NamedKey::Space) => {
                                apply_command(&mut controller, &OdometerCommand::NewRound, &mut rng)
                            }
                            Key::Character("a") | Key::Character("A") => apply_command(
                                &mut controller,
                                &OdometerCommand::StartScroll,
                                &mut rng,
                            ),
                            Key::Named(NamedKey::Escape) => window_target.exit(),
                            _ => {}
                        }
                    }
                    WindowEvent::Resized(new_size) => {
                        fb_width = new_size.width as usize;
                        fb_height = new_size.height as usize;
                        let _ = pixels.resize_buffer(new_size.width, new_size.height);
                        let _ = pixels.resize_surface(new_size.width, new_size.height);
                    }
                    WindowEvent::RedrawRequested => {
                        if let Some(ref receiver) = receiver {
                            while let Ok(command) = receiver.try_recv() {
                                apply_command(&mut controller, &command, &mut rng);
                            }
                        }

                        let dt = last_tick.elapsed().as_secs_f32();
                        last_tick = Instant::now();
                        controller.scheduler_mut().advance(dt);
                        if controller.poll() == ScrollStatus::Completed {
                            log::info!("counter settled at {}", controller.reels());
                        }

                        let text = controller.reels().to_string();
                        let (readout_x, readout_y) = readout_anchor(fb_width, fb_height, &config);
                        readout.refresh(&text, &font, readout_x, readout_y, &config);

                        let scene = build_scene(
                            fb_width,
                            fb_height,
                            controller.renderer(),
                            controller.scheduler(),
                            &readout,
                            &config,
                        );
                        let frame = pixels.frame_mut();
                        let mut canvas = Canvas::new(frame, fb_width, fb_height);
                        scene.render(&mut canvas, &font);
                        if let Err(err) = pixels.render() {
                            log::error!("failed to present frame: {err}");
                            window_target.exit();
                        }
                    }
                    _ => {}
                },
                Event::AboutToWait => {
                    if last_frame.elapsed() >= frame_duration {
                        window_clone.request_redraw();
                        last_frame = Instant::now();
                    }
                }
                _ => {}
            }
        })?;

        Ok(())
    }
}

fn apply_command<R: rand::Rng + ?Sized>(
    controller: &mut OdometerController<ReelFaces, FrameScheduler>,
    command: &OdometerCommand,
    rng: &mut R,
) {
    let outcome = match command {
        OdometerCommand::NewRound => controller.new_round(rng).map(|_| ()),
        OdometerCommand::StartScroll => controller.start_scroll(),
        OdometerCommand::Cancel => {
            controller.cancel();
            Ok(())
        }
        OdometerCommand::SetValue(value) => controller.set_value(*value),
        OdometerCommand::SetTarget(target) => {
            controller.set_target(*target);
            Ok(())
        }
    };
    if let Err(err) = outcome {
        log::warn!("{command:?} ignored: {err}");
    }
}

pub fn load_font(config: &OdometerConfig) -> Result<Font<'static>> {
    let path = config
        .font_path
        .as_ref()
        .ok_or_else(|| OdometerError::FontLoad("no font file configured".to_string()))?;
    let data = std::fs::read(path)
        .map_err(|err| OdometerError::FontLoad(format!("{}: {err}", path.display())))?;
    Font::try_from_vec(data)
        .ok_or_else(|| OdometerError::FontLoad(format!("{}: not a font", path.display())))
}

// ============================================================================
// REEL STATE
// ============================================================================

/// Resting digit of every reel, as last rendered by the controller.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReelFaces {
    digits: Vec<u8>,
}

impl ReelFaces {
    pub fn new(reel_count: usize) -> Self {
        Self {
            digits: vec![0; reel_count],
        }
    }

    pub fn digit(&self, reel: usize) -> u8 {
        self.digits.get(reel).copied().unwrap_or(0)
    }

    pub fn len(&self) -> usize {
        self.digits.len()
    }

    pub fn is_empty(&self) -> bool {
        self.digits.is_empty()
    }
}

impl DigitRenderer for ReelFaces {
    fn render(&mut self, reel: usize, digit: u8) {
        if let Some(face) = self.digits.get_mut(reel) {
            *face = digit;
        }
    }
}

/// Readout text and its overlay boxes, recomputed only when the text changes.
#[derive(Debug, Clone, Default)]
struct ReadoutCache {
    text: String,
    x: i32,
    y: i32,
    overlays: Option<Vec<OverlayPlacement>>,
}

impl ReadoutCache {
    fn refresh(&mut self, text: &str, font: &Font, x: i32, y: i32, config: &OdometerConfig) {
        if self.text == text && self.x == x && self.y == y {
            return;
        }
        let metrics = FontGlyphMetrics::centered(
            font,
            text,
            Scale::uniform(config.readout_font_size),
            x,
            y,
        );
        self.overlays = align_overlays(text, &metrics, config.overlay_count);
        self.text = text.to_string();
        self.x = x;
        self.y = y;
    }
}

// ============================================================================
// LAYOUT
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct Cell {
    x: i32,
    y: i32,
    w: i32,
    h: i32,
}

/// Reel cells left to right, with the decimal separator position if any.
struct ReelLayout {
    cells: Vec<Cell>,
    separator: Option<(i32, i32)>,
}

impl ReelLayout {
    fn new(width: usize, height: usize, config: &OdometerConfig) -> Self {
        let count = config.reel_count as i32;
        let has_separator = config.decimal_digits > 0 && config.decimal_digits < config.reel_count as u32;
        let extra = if has_separator { config.reel_gap } else { 0 };
        let total_width =
            count * config.glyph_width + (count - 1).max(0) * config.reel_gap + extra;
        let left = (width as i32 - total_width) / 2;
        let top = (height as i32 * 2 / 5) - config.glyph_height / 2;
        let split = config.reel_count - config.decimal_digits as usize;

        let mut cells = Vec::with_capacity(config.reel_count);
        let mut separator = None;
        let mut x = left;
        for index in 0..config.reel_count {
            if has_separator && index == split {
                separator = Some((x - config.reel_gap / 2, top + config.glyph_height));
                x += extra;
            }
            cells.push(Cell {
                x,
                y: top,
                w: config.glyph_width,
                h: config.glyph_height,
            });
            x += config.glyph_width + config.reel_gap;
        }
        Self { cells, separator }
    }

    /// Cell of the reel at `position` (0 = least significant).
    fn cell(&self, position: usize) -> Option<Cell> {
        let index = self.cells.len().checked_sub(position + 1)?;
        self.cells.get(index).copied()
    }
}

fn readout_anchor(width: usize, height: usize, config: &OdometerConfig) -> (i32, i32) {
    (
        width as i32 / 2,
        (height as f64 * config.readout_y_factor) as i32,
    )
}

// ============================================================================
// RETAINED MODE ABSTRACTIONS
// ============================================================================

#[derive(Clone, Debug, PartialEq)]
enum DrawCommand {
    Clear((u8, u8, u8)),
    Frame {
        x0: i32,
        y0: i32,
        x1: i32,
        y1: i32,
        thickness: f32,
        color: (u8, u8, u8),
    },
    ReelGlyph {
        digit: u8,
        cell: Cell,
        y_offset: f32,
        font_size: f32,
        color: (u8, u8, u8),
    },
    Text {
        x: i32,
        y: i32,
        text: String,
        font_size: f32,
        color: (u8, u8, u8),
    },
    Dot {
        cx: i32,
        cy: i32,
        radius: i32,
        color: (u8, u8, u8),
    },
}

struct Scene {
    commands: Vec<DrawCommand>,
}

impl Scene {
    fn new() -> Self {
        Self {
            commands: Vec::new(),
        }
    }

    fn add_command(&mut self, command: DrawCommand) {
        self.commands.push(command);
    }

    fn add_frame(
        &mut self,
        (left, top, right, bottom): (i32, i32, i32, i32),
        thickness: f32,
        color: (u8, u8, u8),
    ) {
        for (x0, y0, x1, y1) in [
            (left, top, right, top),
            (left, bottom, right, bottom),
            (left, top, left, bottom),
            (right, top, right, bottom),
        ] {
            self.add_command(DrawCommand::Frame {
                x0,
                y0,
                x1,
                y1,
                thickness,
                color,
            });
        }
    }

    fn render(&self, canvas: &mut Canvas, font: &Font) {
        for command in &self.commands {
            match command {
                DrawCommand::Clear(color) => canvas.clear(*color),
                DrawCommand::Frame {
                    x0,
                    y0,
                    x1,
                    y1,
                    thickness,
                    color,
                } => {
                    draw_thick_line_aa(canvas, *x0, *y0, *x1, *y1, *thickness, *color);
                }
                DrawCommand::ReelGlyph {
                    digit,
                    cell,
                    y_offset,
                    font_size,
                    color,
                } => {
                    draw_reel_glyph(
                        canvas,
                        font,
                        Scale::uniform(*font_size),
                        *digit,
                        *cell,
                        *y_offset,
                        *color,
                    );
                }
                DrawCommand::Text {
                    x,
                    y,
                    text,
                    font_size,
                    color,
                } => {
                    draw_text(canvas, *x, *y, text, font, Scale::uniform(*font_size), *color);
                }
                DrawCommand::Dot {
                    cx,
                    cy,
                    radius,
                    color,
                } => draw_circle(canvas, *cx, *cy, *radius, *color),
            }
        }
    }
}

fn build_scene(
    width: usize,
    height: usize,
    faces: &ReelFaces,
    scheduler: &FrameScheduler,
    readout: &ReadoutCache,
    config: &OdometerConfig,
) -> Scene {
    let mut scene = Scene::new();
    scene.add_command(DrawCommand::Clear(config.background_color.as_tuple()));

    let layout = ReelLayout::new(width, height, config);
    let strip = ReelStrip::new(config.strip_slots);
    let digit_color = config.digit_color.as_tuple();
    let frame_color = config.frame_color.as_tuple();

    for position in 0..faces.len() {
        let Some(cell) = layout.cell(position) else {
            continue;
        };
        let offset = scheduler.offset(position).unwrap_or(0.0);
        for (digit, y_offset) in strip.visible(faces.digit(position), offset) {
            scene.add_command(DrawCommand::ReelGlyph {
                digit,
                cell,
                y_offset,
                font_size: config.digit_font_size,
                color: digit_color,
            });
        }
        scene.add_frame(
            (cell.x, cell.y, cell.x + cell.w, cell.y + cell.h),
            config.reel_frame_thickness,
            frame_color,
        );
    }

    if let Some((cx, cy)) = layout.separator {
        scene.add_command(DrawCommand::Dot {
            cx,
            cy: cy - config.glyph_height / 8,
            radius: (config.reel_gap / 3).max(2),
            color: digit_color,
        });
    }

    scene.add_command(DrawCommand::Text {
        x: readout.x,
        y: readout.y,
        text: readout.text.clone(),
        font_size: config.readout_font_size,
        color: digit_color,
    });
    if let Some(ref overlays) = readout.overlays {
        let pad = config.overlay_padding;
        for overlay in overlays {
            let rect = overlay.rect();
            scene.add_frame(
                (
                    rect.x as i32 - pad,
                    rect.y as i32 - pad,
                    (rect.x + rect.width) as i32 + pad,
                    (rect.y + rect.height) as i32 + pad,
                ),
                config.overlay_thickness,
                config.overlay_color.as_tuple(),
            );
        }
    }

    scene
}

// ============================================================================
// DRAWING PRIMITIVES
// ============================================================================

struct Canvas<'a> {
    frame: &'a mut [u8],
    width: usize,
    height: usize,
}

impl<'a> Canvas<'a> {
    fn new(frame: &'a mut [u8], width: usize, height: usize) -> Self {
        Self {
            frame,
            width,
            height,
        }
    }

    fn clear(&mut self, color: (u8, u8, u8)) {
        for chunk in self.frame.chunks_exact_mut(4) {
            chunk.copy_from_slice(&[color.0, color.1, color.2, 0xff]);
        }
    }

    fn blend(&mut self, x: i32, y: i32, color: (u8, u8, u8), alpha: f32) {
        if x < 0 || y < 0 || x as usize >= self.width || y as usize >= self.height {
            return;
        }
        let idx = (y as usize * self.width + x as usize) * 4;
        let Some(dst) = self.frame.get_mut(idx..idx + 4) else {
            return;
        };
        let a = alpha.clamp(0.0, 1.0);
        let src = [color.0 as f32, color.1 as f32, color.2 as f32];
        for channel in 0..3 {
            dst[channel] = (src[channel] * a + dst[channel] as f32 * (1.0 - a)).round() as u8;
        }
        dst[3] = 0xff;
    }
}

fn draw_thick_line_aa(
    canvas: &mut Canvas,
    x0: i32,
    y0: i32,
    x1: i32,
    y1: i32,
    thickness: f32,
    color: (u8, u8, u8),
) {
    let min_x = x0.min(x1) - thickness.ceil() as i32 - 1;
    let max_x = x0.max(x1) + thickness.ceil() as i32 + 1;
    let min_y = y0.min(y1) - thickness.ceil() as i32 - 1;
    let max_y = y0.max(y1) + thickness.ceil() as i32 + 1;
    let dx = (x1 - x0) as f32;
    let dy = (y1 - y0) as f32;
    let len_sq = (dx * dx + dy * dy).max(f32::EPSILON);
    for y in min_y..=max_y {
        for x in min_x..=max_x {
            let px = (x - x0) as f32;
            let py = (y - y0) as f32;
            let t = ((px * dx + py * dy) / len_sq).clamp(0.0, 1.0);
            let lx = x0 as f32 + t * dx;
            let ly = y0 as f32 + t * dy;
            let dist = ((lx - x as f32).powi(2) + (ly - y as f32).powi(2)).sqrt();
            let aa = (1.0 - (dist - thickness / 2.0).clamp(0.0, 1.0)).clamp(0.0, 1.0);
            if aa > 0.01 {
                canvas.blend(x, y, color, aa);
            }
        }
    }
}

fn draw_circle(canvas: &mut Canvas, cx: i32, cy: i32, radius: i32, color: (u8, u8, u8)) {
    for y in -radius - 1..=radius + 1 {
        for x in -radius - 1..=radius + 1 {
            let dist = ((x * x + y * y) as f64).sqrt();
            let aa = 1.0 - (dist - radius as f64).clamp(0.0, 1.0);
            if aa > 0.0 {
                canvas.blend(cx + x, cy + y, color, aa as f32);
            }
        }
    }
}

fn draw_text(
    canvas: &mut Canvas,
    x: i32,
    y: i32,
    text: &str,
    font: &Font,
    scale: Scale,
    color: (u8, u8, u8),
) {
    let v_metrics = font.v_metrics(scale);
    let glyphs: Vec<PositionedGlyph> = font
        .layout(text, scale, point(0.0, v_metrics.ascent))
        .collect();
    let (origin_x, origin_y) = centered_origin(&glyphs, x, y);
    for glyph in &glyphs {
        if let Some(bb) = glyph.pixel_bounding_box() {
            glyph.draw(|gx, gy, v| {
                canvas.blend(
                    origin_x + bb.min.x + gx as i32,
                    origin_y + bb.min.y + gy as i32,
                    color,
                    v,
                );
            });
        }
    }
}

/// Draws one strip glyph centered in `cell`, shifted down by `y_offset` cell
/// heights and clipped to the cell.
fn draw_reel_glyph(
    canvas: &mut Canvas,
    font: &Font,
    scale: Scale,
    digit: u8,
    cell: Cell,
    y_offset: f32,
    color: (u8, u8, u8),
) {
    let text = char::from(b'0' + digit % 10).to_string();
    let v_metrics = font.v_metrics(scale);
    let glyphs: Vec<PositionedGlyph> = font
        .layout(&text, scale, point(0.0, v_metrics.ascent))
        .collect();
    let shift = (y_offset * cell.h as f32).round() as i32;
    let (origin_x, origin_y) =
        centered_origin(&glyphs, cell.x + cell.w / 2, cell.y + cell.h / 2 + shift);
    let (clip_top, clip_bottom) = (cell.y, cell.y + cell.h);

    for glyph in &glyphs {
        if let Some(bb) = glyph.pixel_bounding_box() {
            glyph.draw(|gx, gy, v| {
                let py = origin_y + bb.min.y + gy as i32;
                if py >= clip_top && py < clip_bottom {
                    canvas.blend(origin_x + bb.min.x + gx as i32, py, color, v);
                }
            });
        }
    }
}
