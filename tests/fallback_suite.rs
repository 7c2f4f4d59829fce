use depth_gallery::capability::{detect_runtime, GalleryMode, TerminalEnv, MIN_CANVAS_COLS};
use depth_gallery::config::RendererMode;
use depth_gallery::fallback::{FallbackGrid, StaticRenderer, TITLE};
use depth_gallery::gallery::ImageItem;

fn items(n: usize) -> Vec<ImageItem> {
    (0..n)
        .map(|i| ImageItem::parse(&format!("shots/img-{i:02}.png|Shot {i}")))
        .collect()
}

fn truecolor_env() -> TerminalEnv {
    TerminalEnv {
        term: "xterm-256color".to_string(),
        colorterm: "truecolor".to_string(),
        cols: 120,
        rows: 40,
        ..TerminalEnv::default()
    }
}

// ── Capability detection ────────────────────────────────────────────────────────

#[test]
fn truecolor_terminal_gets_animated_canvas() {
    let report = detect_runtime(RendererMode::HalfBlock, &truecolor_env(), true, false);
    assert_eq!(report.mode, GalleryMode::Animated);
    assert!(report.animated());
    assert_eq!(report.renderer, RendererMode::HalfBlock);
}

#[test]
fn dumb_terminal_falls_back_to_static() {
    let env = TerminalEnv {
        term: "dumb".to_string(),
        ..truecolor_env()
    };
    let report = detect_runtime(RendererMode::HalfBlock, &env, true, false);
    assert_eq!(report.mode, GalleryMode::Static);
    assert!(report.notes().iter().any(|n| n.contains("dumb")));
}

#[test]
fn tiny_or_unsized_terminal_falls_back() {
    let env = TerminalEnv {
        cols: MIN_CANVAS_COLS - 1,
        ..truecolor_env()
    };
    assert!(!detect_runtime(RendererMode::Ascii, &env, true, false).animated());

    let env = TerminalEnv {
        cols: 0,
        rows: 0,
        ..truecolor_env()
    };
    assert!(!detect_runtime(RendererMode::Ascii, &env, true, false).animated());
}

#[test]
fn missing_truecolor_falls_back() {
    let env = TerminalEnv {
        term: "vt100".to_string(),
        colorterm: String::new(),
        ..truecolor_env()
    };
    assert!(!detect_runtime(RendererMode::Braille, &env, true, false).animated());

    let env = TerminalEnv {
        term: "xterm-kitty".to_string(),
        colorterm: String::new(),
        ..truecolor_env()
    };
    assert!(detect_runtime(RendererMode::Braille, &env, true, false).animated());
}

#[test]
fn override_variable_wins_over_detection() {
    let env = TerminalEnv {
        term: "dumb".to_string(),
        canvas_override: Some("on".to_string()),
        ..truecolor_env()
    };
    assert!(detect_runtime(RendererMode::HalfBlock, &env, true, false).animated());

    let env = TerminalEnv {
        canvas_override: Some("0".to_string()),
        ..truecolor_env()
    };
    assert!(!detect_runtime(RendererMode::HalfBlock, &env, true, false).animated());

    let env = TerminalEnv {
        canvas_override: Some("maybe".to_string()),
        ..truecolor_env()
    };
    assert!(detect_runtime(RendererMode::HalfBlock, &env, true, false).animated());
}

#[test]
fn force_static_and_disabled_detection() {
    let report = detect_runtime(RendererMode::HalfBlock, &truecolor_env(), true, true);
    assert_eq!(report.mode, GalleryMode::Static);
    assert_eq!(report.status_label(), "static grid");

    let env = TerminalEnv {
        term: "dumb".to_string(),
        ..truecolor_env()
    };
    let report = detect_runtime(RendererMode::HalfBlock, &env, false, false);
    assert!(report.animated(), "disabled detection trusts the terminal");
}

// ── Grid layout ─────────────────────────────────────────────────────────────

#[test]
fn grid_lists_items_in_order_under_title() {
    let grid = FallbackGrid::new(items(4));
    let lines = grid.lines(80, 40);
    assert_eq!(lines[0], TITLE);

    let text = lines.join("\n");
    let positions = (0..4)
        .map(|i| text.find(&format!("Shot {i}")).expect("item missing"))
        .collect::<Vec<_>>();
    assert!(positions.windows(2).all(|w| w[0] < w[1]), "order changed");
    assert!(text.contains("shots/img-00.png"));
}

#[test]
fn grid_columns_follow_width() {
    assert_eq!(FallbackGrid::columns_for(60), 2);
    assert_eq!(FallbackGrid::columns_for(96), 3);
    let grid = FallbackGrid::new(items(7));
    assert_eq!(grid.grid_rows(2), 4);
    assert_eq!(grid.grid_rows(3), 3);
}

#[test]
fn grid_scroll_clamps_to_content() {
    let mut grid = FallbackGrid::new(items(20));
    grid.scroll_by(-3, 2, 4);
    assert_eq!(grid.scroll_row(), 0);
    grid.scroll_by(100, 2, 4);
    assert_eq!(grid.scroll_row(), 6);
    grid.scroll_by(-2, 2, 4);
    assert_eq!(grid.scroll_row(), 4);

    let text = grid.lines(80, 13).join("\n");
    assert!(text.contains("Shot 8"));
    assert!(!text.contains("Shot 0\n"));
}

#[test]
fn empty_grid_and_zero_viewport() {
    let grid = FallbackGrid::new(Vec::new());
    let lines = grid.lines(40, 10);
    let clipped_title = TITLE.chars().take(39).collect::<String>() + "~";
    assert_eq!(lines, vec![clipped_title, "(no images)".to_string()]);
    assert!(grid.lines(0, 10).is_empty());
}

#[test]
fn grid_lines_fit_the_viewport() {
    let grid = FallbackGrid::new(items(30));
    for (cols, rows) in [(20u16, 5u16), (80, 24), (120, 50)] {
        let lines = grid.lines(cols, rows);
        assert!(lines.len() <= rows as usize);
        assert!(lines.iter().all(|l| l.chars().count() <= cols as usize));
    }
}

#[test]
fn static_renderer_writes_plain_text() {
    let grid = FallbackGrid::new(items(3));
    let mut out = Vec::new();
    StaticRenderer::render(&grid, 80, 20, "q quit", &mut out).unwrap();
    let s = String::from_utf8_lossy(&out);
    assert!(s.contains(TITLE));
    assert!(s.contains("Shot 2"));
    assert!(s.contains("q quit"));
    assert!(!s.contains("38;2;"), "static grid must not emit truecolor");

    let mut out = Vec::new();
    StaticRenderer::render(&grid, 0, 0, "q quit", &mut out).unwrap();
    assert!(out.is_empty());
}
