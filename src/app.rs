use crate::capability::{detect_runtime, CapabilityReport, TerminalEnv};
use crate::config::{Config, RendererMode};
use crate::fallback::{FallbackGrid, StaticRenderer};
use crate::gallery::{collect_items, shuffle_items, ImageItem, ImageLibrary};
use crate::motion::{
    ArrowKey, DeviceClass, EnvelopePreset, FrameOutcome, GalleryOptions, InputEvent, MotionEngine,
};
use crate::profile::{profile_storage_path, GalleryProfile};
use crate::raster::SceneRasterizer;
use crate::render::{make_renderer, Frame};
use crate::terminal::TerminalGuard;
use anyhow::Context;
use crossterm::event::{
    self, Event, KeyCode, KeyEventKind, KeyModifiers, MouseButton, MouseEvent, MouseEventKind,
};
use std::io::{BufWriter, Write};
use std::time::{Duration, Instant};

/// Browser-style wheel delta for one terminal scroll notch.
const WHEEL_NOTCH: f32 = 100.0;

pub fn run(cfg: Config) -> anyhow::Result<()> {
    let profile_path = cfg.profile.clone().or_else(profile_storage_path);
    let profile = GalleryProfile::load(profile_path.as_deref())
        .with_context(|| format!("load profile {:?}", profile_path))?;
    let options = cfg.gallery_options(&profile);
    let preset = cfg.preset(&profile);

    if let Some(path) = cfg.write_profile.as_deref() {
        GalleryProfile::capture(&options)
            .save(path)
            .with_context(|| format!("write profile {}", path.display()))?;
        log::info!("wrote profile to {}", path.display());
        return Ok(());
    }

    let mut items = collect_items(&cfg.images).context("collect images")?;
    if cfg.shuffle {
        shuffle_items(&mut items);
    }
    if items.is_empty() {
        log::warn!("no images supplied; nothing to show");
        return Ok(());
    }

    let env = TerminalEnv::detect();
    let report = detect_runtime(cfg.renderer, &env, cfg.auto_detect, cfg.force_static);
    for note in report.notes() {
        log::info!("capability: {note}");
    }

    if report.animated() {
        run_animated(&cfg, options, preset, items, &report)
    } else {
        run_static(items, &env, &report)
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
enum KeyAction {
    None,
    Quit,
    Input(InputEvent),
    ToggleHud,
    ToggleHelp,
    CyclePreset,
}

fn run_animated(
    cfg: &Config,
    options: GalleryOptions,
    mut preset: EnvelopePreset,
    items: Vec<ImageItem>,
    report: &CapabilityReport,
) -> anyhow::Result<()> {
    let library = ImageLibrary::load(items);
    if library.placeholder_count() > 0 {
        log::warn!(
            "{} of {} images replaced by placeholders",
            library.placeholder_count(),
            library.len()
        );
    }

    let _term = TerminalGuard::new()?;
    let mut out = BufWriter::new(TerminalGuard::stdout());

    let mode = report.renderer;
    let mut renderer = make_renderer(mode);

    let mut last_size = crossterm::terminal::size().context("get terminal size")?;
    let start = Instant::now();
    let mut engine = MotionEngine::new(
        options,
        library.len(),
        DeviceClass::for_width(last_size.0, cfg.compact_below),
        start,
    );

    let mut show_hud = true;
    let mut show_help = false;
    let mut hud_rows = hud_rows_for_size(last_size, show_hud);
    let (w, h) = canvas_size(last_size, hud_rows, mode);
    let mut raster = SceneRasterizer::new(w, h, mode.pixel_aspect());

    let mut last_frame = start;
    let mut fps = FpsCounter::new();
    let mut skipped = 0u64;
    let mut last_draw_ms = 0.0f32;
    let status = report.status_label();

    loop {
        let now = Instant::now();

        // Drain input events (non-blocking).
        while event::poll(Duration::from_millis(0))? {
            match event::read()? {
                Event::Key(k) if k.kind != KeyEventKind::Release => {
                    match handle_key(k.code, k.modifiers) {
                        KeyAction::Quit => return Ok(()),
                        KeyAction::Input(ev) => engine.send(ev),
                        KeyAction::ToggleHud => show_hud = !show_hud,
                        KeyAction::ToggleHelp => show_help = !show_help,
                        KeyAction::CyclePreset => {
                            preset = preset.next();
                            engine.set_envelopes(preset.fade(), preset.blur());
                            log::debug!("envelope preset -> {}", preset.label());
                        }
                        KeyAction::None => {}
                    }
                }
                Event::Mouse(m) => {
                    if let Some(ev) = mouse_input(m) {
                        engine.send(ev);
                    }
                }
                Event::Resize(c, r) => last_size = (c, r),
                _ => {}
            }
        }

        // Size check once per frame (resize events can be missed in some terminals).
        let sz = crossterm::terminal::size()?;
        if sz != last_size {
            last_size = sz;
        }
        engine.set_device_class(DeviceClass::for_width(last_size.0, cfg.compact_below));

        let dt = now.duration_since(last_frame).as_secs_f32();
        last_frame = now;
        if engine.tick(now, dt) == FrameOutcome::Skipped {
            skipped += 1;
        }

        let (term_cols, term_rows) = last_size;
        let hud = if show_hud {
            build_wrapped_hud(
                term_cols as usize,
                &engine,
                library.placeholder_count(),
                preset,
                fps.fps(),
                last_draw_ms,
                skipped,
                renderer.name(),
                &status,
            )
        } else {
            String::new()
        };
        hud_rows = hud_rows_for_text(term_rows, show_hud, &hud);
        let (w, h) = canvas_size(last_size, hud_rows, mode);
        if raster.size() != (w, h) {
            raster.resize(w, h, mode.pixel_aspect());
        }

        let draw_start = Instant::now();
        raster.draw(engine.visuals(), &library);
        last_draw_ms = draw_start.elapsed().as_secs_f32() * 1000.0;

        let frame = Frame {
            term_cols,
            term_rows,
            visual_rows: term_rows.saturating_sub(hud_rows).max(1),
            pixel_width: w,
            pixel_height: h,
            pixels_rgba: raster.pixels(),
            hud: &hud,
            hud_rows,
            overlay: show_help.then(help_popup_text),
            sync_updates: cfg.sync_updates,
        };
        renderer.render(&frame, &mut out)?;
        fps.tick();

        // Frame pacing.
        let target = Duration::from_secs_f32(1.0 / cfg.fps.max(1) as f32);
        let elapsed = now.elapsed();
        if elapsed < target {
            std::thread::sleep(target - elapsed);
        }
    }
}

/// Static grid: redrawn only on input or resize, no frame loop.
fn run_static(
    items: Vec<ImageItem>,
    env: &TerminalEnv,
    report: &CapabilityReport,
) -> anyhow::Result<()> {
    let mut grid = FallbackGrid::new(items);

    if env.cols == 0 || env.rows == 0 || env.term.eq_ignore_ascii_case("dumb") {
        // Not an interactive screen; print the whole list once.
        let mut out = std::io::stdout().lock();
        for line in grid.lines(80, u16::MAX) {
            writeln!(out, "{line}")?;
        }
        return Ok(());
    }

    let _term = TerminalGuard::new()?;
    let mut out = BufWriter::new(TerminalGuard::stdout());
    let mut size = crossterm::terminal::size().context("get terminal size")?;
    let footer = format!("{} | up/down scroll | q quit", report.status_label());
    let mut dirty = true;

    loop {
        if dirty {
            StaticRenderer::render(&grid, size.0, size.1, &footer, &mut out)?;
            dirty = false;
        }
        if !event::poll(Duration::from_millis(250))? {
            continue;
        }
        let columns = FallbackGrid::columns_for(size.0);
        let visible = (size.1.saturating_sub(2) as usize) / 3;
        let delta = match event::read()? {
            Event::Key(k) if k.kind != KeyEventKind::Release => {
                match handle_key(k.code, k.modifiers) {
                    KeyAction::Quit => return Ok(()),
                    KeyAction::Input(InputEvent::Key(ArrowKey::Up | ArrowKey::Left)) => -1,
                    KeyAction::Input(InputEvent::Key(ArrowKey::Down | ArrowKey::Right)) => 1,
                    _ => 0,
                }
            }
            Event::Mouse(m) => match m.kind {
                MouseEventKind::ScrollUp => -1,
                MouseEventKind::ScrollDown => 1,
                _ => 0,
            },
            Event::Resize(c, r) => {
                size = (c, r);
                dirty = true;
                0
            }
            _ => 0,
        };
        if delta != 0 {
            grid.scroll_by(delta, columns, visible);
            dirty = true;
        }
    }
}

fn handle_key(code: KeyCode, mods: KeyModifiers) -> KeyAction {
    if mods.contains(KeyModifiers::CONTROL) && matches!(code, KeyCode::Char('c')) {
        return KeyAction::Quit;
    }

    match code {
        KeyCode::Esc | KeyCode::Char('q') | KeyCode::Char('Q') => KeyAction::Quit,
        KeyCode::Up => KeyAction::Input(InputEvent::Key(ArrowKey::Up)),
        KeyCode::Down => KeyAction::Input(InputEvent::Key(ArrowKey::Down)),
        KeyCode::Left => KeyAction::Input(InputEvent::Key(ArrowKey::Left)),
        KeyCode::Right => KeyAction::Input(InputEvent::Key(ArrowKey::Right)),
        KeyCode::Char('i') | KeyCode::Char('I') => KeyAction::ToggleHud,
        KeyCode::Char('?') | KeyCode::Char('h') | KeyCode::Char('H') | KeyCode::F(1) => {
            KeyAction::ToggleHelp
        }
        KeyCode::Char('p') | KeyCode::Char('P') => KeyAction::CyclePreset,
        _ => KeyAction::None,
    }
}

/// Wheel notches scroll; a held left button acts like a touch drag.
fn mouse_input(m: MouseEvent) -> Option<InputEvent> {
    match m.kind {
        MouseEventKind::ScrollDown => Some(InputEvent::Wheel {
            delta_y: WHEEL_NOTCH,
        }),
        MouseEventKind::ScrollUp => Some(InputEvent::Wheel {
            delta_y: -WHEEL_NOTCH,
        }),
        MouseEventKind::Down(MouseButton::Left) => Some(InputEvent::TouchStart),
        MouseEventKind::Drag(MouseButton::Left) => Some(InputEvent::TouchMove),
        _ => None,
    }
}

fn canvas_size(size: (u16, u16), hud_rows: u16, mode: RendererMode) -> (usize, usize) {
    let (cols, rows) = size;
    let (px_w_mul, px_h_mul) = mode.pixels_per_cell();
    let visual_rows = rows.saturating_sub(hud_rows).max(1);
    (
        (cols as usize).saturating_mul(px_w_mul),
        (visual_rows as usize).saturating_mul(px_h_mul),
    )
}

fn hud_rows_for_size(size: (u16, u16), show_hud: bool) -> u16 {
    if !show_hud {
        return 0;
    }
    let rows = size.1;
    if rows <= 1 {
        return 0;
    }
    (rows - 1).min(3)
}

fn hud_rows_for_text(term_rows: u16, show_hud: bool, hud: &str) -> u16 {
    if !show_hud {
        return 0;
    }
    let max_rows = term_rows.saturating_sub(1);
    let wanted = hud.lines().count() as u16;
    wanted.min(max_rows)
}

#[allow(clippy::too_many_arguments)]
fn build_wrapped_hud(
    cols: usize,
    engine: &MotionEngine,
    placeholders: usize,
    preset: EnvelopePreset,
    fps: f32,
    draw_ms: f32,
    skipped: u64,
    renderer_name: &str,
    status: &str,
) -> String {
    let logical_lines = vec![
        format!(
            concat!(
                "Images: {} ({} placeholder) | Slots: {} ({}) | Depth: {:.1} | ",
                "Advance: {} | Vel: {:>5.2} | Auto: {} | Preset: {}"
            ),
            engine.image_count(),
            placeholders,
            engine.slot_count(),
            engine.device_class().label(),
            engine.depth_range(),
            engine.image_advance(),
            engine.velocity(),
            if engine.autoplay() { "on" } else { "off" },
            preset.label(),
        ),
        format!(
            "FPS: {:>4.1} | draw ms: {:>4.1} | skipped: {} | Renderer: {} | {}",
            fps, draw_ms, skipped, renderer_name, status
        ),
        "Keys: arrows/wheel scroll | drag touch | p preset | i HUD | ?/h/F1 help | q quit"
            .to_string(),
    ];

    wrap_hud_lines(cols, &logical_lines).join("\n")
}

fn wrap_hud_lines(cols: usize, lines: &[String]) -> Vec<String> {
    let width = cols.max(1);
    let mut out = Vec::new();
    for line in lines {
        out.extend(hard_wrap_line(line, width));
    }
    out
}

fn hard_wrap_line(line: &str, width: usize) -> Vec<String> {
    if line.is_empty() {
        return vec![String::new()];
    }

    let mut out = Vec::new();
    let mut cur = String::new();
    let mut cur_len = 0usize;
    for ch in line.chars() {
        cur.push(ch);
        cur_len += 1;
        if cur_len >= width {
            out.push(cur);
            cur = String::new();
            cur_len = 0;
        }
    }
    if !cur.is_empty() {
        out.push(cur);
    }
    out
}

fn help_popup_text() -> &'static str {
    "Depth Gallery Hotkeys\n\
up/left  scroll backward\n\
down/right  scroll forward\n\
mouse wheel  scroll\n\
left drag  gentle forward drift\n\
p  switch envelope preset: tight/wide\n\
i  show/hide HUD\n\
? or h or F1  toggle this help\n\
q or esc  quit\n\
\n\
Autoplay resumes after 3 s without input."
}

struct FpsCounter {
    last: Instant,
    frames: u32,
    fps: f32,
}

impl FpsCounter {
    fn new() -> Self {
        Self {
            last: Instant::now(),
            frames: 0,
            fps: 0.0,
        }
    }

    fn tick(&mut self) {
        self.frames += 1;
        let now = Instant::now();
        let dt = now.duration_since(self.last).as_secs_f32();
        if dt >= 0.5 {
            self.fps = (self.frames as f32) / dt;
            self.frames = 0;
            self.last = now;
        }
    }

    fn fps(&self) -> f32 {
        self.fps
    }
}
