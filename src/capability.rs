use crate::config::RendererMode;

pub const CANVAS_OVERRIDE_ENV: &str = "DEPTH_GALLERY_CANVAS";

/// Smallest terminal that can host the animated canvas plus one HUD row.
pub const MIN_CANVAS_COLS: u16 = 8;
pub const MIN_CANVAS_ROWS: u16 = 4;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GalleryMode {
    Animated,
    Static,
}

/// Environment snapshot detection decides on.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TerminalEnv {
    pub term: String,
    pub colorterm: String,
    pub term_program: String,
    pub canvas_override: Option<String>,
    pub cols: u16,
    pub rows: u16,
}

impl TerminalEnv {
    pub fn detect() -> Self {
        let var = |k: &str| std::env::var(k).unwrap_or_default();
        let (cols, rows) = crossterm::terminal::size().unwrap_or((0, 0));
        Self {
            term: var("TERM"),
            colorterm: var("COLORTERM"),
            term_program: var("TERM_PROGRAM"),
            canvas_override: std::env::var(CANVAS_OVERRIDE_ENV).ok(),
            cols,
            rows,
        }
    }

    fn truecolor(&self) -> bool {
        let colorterm = self.colorterm.to_ascii_lowercase();
        if colorterm.contains("truecolor") || colorterm.contains("24bit") {
            return true;
        }
        let term = self.term.to_ascii_lowercase();
        if ["kitty", "ghostty", "direct", "wezterm", "alacritty", "foot"]
            .iter()
            .any(|t| term.contains(t))
        {
            return true;
        }
        let program = self.term_program.to_ascii_lowercase();
        ["ghostty", "kitty", "iterm", "wezterm", "vscode"]
            .iter()
            .any(|p| program.contains(p))
    }
}

#[derive(Debug, Clone)]
pub struct CapabilityReport {
    pub auto_detect: bool,
    pub requested_renderer: RendererMode,
    pub renderer: RendererMode,
    pub mode: GalleryMode,
    notes: Vec<String>,
}

impl CapabilityReport {
    pub fn animated(&self) -> bool {
        self.mode == GalleryMode::Animated
    }

    pub fn notes(&self) -> &[String] {
        &self.notes
    }

    pub fn push_note(&mut self, note: impl Into<String>) {
        self.notes.push(note.into());
    }

    fn fall_back(&mut self, reason: impl Into<String>) {
        self.mode = GalleryMode::Static;
        self.notes.push(reason.into());
    }

    pub fn status_label(&self) -> String {
        match self.mode {
            GalleryMode::Animated => format!("canvas ok ren={:?}", self.renderer),
            GalleryMode::Static => "static grid".to_string(),
        }
    }
}

/// Decides once, at startup, whether the animated canvas can run. The result
/// holds for the whole session.
pub fn detect_runtime(
    requested_renderer: RendererMode,
    env: &TerminalEnv,
    auto_detect: bool,
    force_static: bool,
) -> CapabilityReport {
    let mut report = CapabilityReport {
        auto_detect,
        requested_renderer,
        renderer: requested_renderer,
        mode: GalleryMode::Animated,
        notes: Vec::new(),
    };

    if force_static {
        report.fall_back("static grid requested by --static");
        return report;
    }

    match env.canvas_override.as_deref().and_then(parse_switch) {
        Some(true) => {
            report.push_note(format!("canvas forced on by {CANVAS_OVERRIDE_ENV}"));
            return report;
        }
        Some(false) => {
            report.fall_back(format!("canvas forced off by {CANVAS_OVERRIDE_ENV}"));
            return report;
        }
        None => {}
    }

    if !auto_detect {
        report.push_note("capability check disabled by --auto-detect=false");
        return report;
    }

    if env.term.eq_ignore_ascii_case("dumb") {
        report.fall_back("TERM=dumb cannot draw a canvas");
        return report;
    }

    if env.cols < MIN_CANVAS_COLS || env.rows < MIN_CANVAS_ROWS {
        report.fall_back(format!(
            "terminal too small for canvas (need {}x{}, got {}x{})",
            MIN_CANVAS_COLS, MIN_CANVAS_ROWS, env.cols, env.rows
        ));
        return report;
    }

    if !env.truecolor() {
        report.fall_back("no truecolor support detected (set COLORTERM=truecolor to override)");
        return report;
    }

    report.push_note("detection selected animated canvas with no fallback");
    report
}

fn parse_switch(raw: &str) -> Option<bool> {
    match raw.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Some(true),
        "0" | "false" | "no" | "off" => Some(false),
        _ => None,
    }
}
