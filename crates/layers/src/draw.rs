//! Canvas-2D style command lists.
//!
//! Renderers never touch a browser context directly: they emit a [`DrawList`]
//! that the host replays onto its surface, and tests inspect.

use foundation::math::Vec2;

/// Logical (CSS pixel) size and device pixel ratio of a drawing surface.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct SurfaceSize {
    pub width: f64,
    pub height: f64,
    pub pixel_ratio: f64,
}

impl SurfaceSize {
    pub fn new(width: f64, height: f64, pixel_ratio: f64) -> Self {
        Self {
            width,
            height,
            pixel_ratio,
        }
    }

    pub fn css(&self) -> Vec2 {
        Vec2::new(self.width, self.height)
    }

    /// Backing store size in device pixels.
    pub fn device_px(&self) -> (u32, u32) {
        let dpr = if self.pixel_ratio.is_finite() && self.pixel_ratio > 0.0 {
            self.pixel_ratio
        } else {
            1.0
        };
        (
            (self.width * dpr).round().max(0.0) as u32,
            (self.height * dpr).round().max(0.0) as u32,
        )
    }
}

#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum TextAlign {
    Left,
    Center,
    Right,
}

impl TextAlign {
    pub fn as_css(self) -> &'static str {
        match self {
            TextAlign::Left => "left",
            TextAlign::Center => "center",
            TextAlign::Right => "right",
        }
    }
}

#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum TextBaseline {
    Top,
    Middle,
    Bottom,
}

impl TextBaseline {
    pub fn as_css(self) -> &'static str {
        match self {
            TextBaseline::Top => "top",
            TextBaseline::Middle => "middle",
            TextBaseline::Bottom => "bottom",
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum DrawCommand {
    /// Resize the backing store to `width_px x height_px` device pixels.
    Resize {
        width_px: u32,
        height_px: u32,
        pixel_ratio: f64,
    },
    /// Reset to the device-pixel-ratio base transform and clear the surface.
    Clear { pixel_ratio: f64 },
    Save,
    Restore,
    Translate(Vec2),
    Rotate(f64),
    Scale(f64),
    SetFillStyle(String),
    SetStrokeStyle(String),
    SetLineWidth(f64),
    /// An empty pattern means solid lines.
    SetLineDash(Vec<f64>),
    BeginPath,
    MoveTo(Vec2),
    LineTo(Vec2),
    /// Full circle sub-path.
    Circle { center: Vec2, radius: f64 },
    ClosePath,
    Fill,
    Stroke,
    SetFont(String),
    SetTextAlign(TextAlign),
    SetTextBaseline(TextBaseline),
    FillText { text: String, at: Vec2 },
}

#[derive(Debug, Default, Clone, PartialEq)]
pub struct DrawList {
    pub commands: Vec<DrawCommand>,
}

impl DrawList {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, cmd: DrawCommand) {
        self.commands.push(cmd);
    }

    pub fn len(&self) -> usize {
        self.commands.len()
    }

    pub fn is_empty(&self) -> bool {
        self.commands.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &DrawCommand> {
        self.commands.iter()
    }

    /// Appends a path through `points`, skipping non-finite vertices.
    /// Returns the number of vertices emitted.
    pub fn path(&mut self, points: impl IntoIterator<Item = Vec2>, close: bool) -> usize {
        self.push(DrawCommand::BeginPath);
        let mut n = 0;
        for p in points.into_iter().filter(|p| p.is_finite()) {
            self.push(if n == 0 {
                DrawCommand::MoveTo(p)
            } else {
                DrawCommand::LineTo(p)
            });
            n += 1;
        }
        if close && n > 0 {
            self.push(DrawCommand::ClosePath);
        }
        n
    }

    /// Number of commands matching `pred`.
    pub fn count(&self, pred: impl Fn(&DrawCommand) -> bool) -> usize {
        self.commands.iter().filter(|c| pred(c)).count()
    }

    /// Text of every `FillText` in order.
    pub fn texts(&self) -> Vec<&str> {
        self.commands
            .iter()
            .filter_map(|c| match c {
                DrawCommand::FillText { text, .. } => Some(text.as_str()),
                _ => None,
            })
            .collect()
    }
}

/// Tracks the last size a surface was resized to so a backing store is only
/// reallocated when the logical size or pixel ratio actually changes.
#[derive(Debug, Default, Clone)]
pub struct SurfaceState {
    last: Option<SurfaceSize>,
}

impl SurfaceState {
    pub fn new() -> Self {
        Self::default()
    }

    /// Emits `Resize` if `size` differs from the previous call, then `Clear`.
    pub fn begin(&mut self, size: SurfaceSize, out: &mut DrawList) {
        if self.last != Some(size) {
            let (width_px, height_px) = size.device_px();
            out.push(DrawCommand::Resize {
                width_px,
                height_px,
                pixel_ratio: size.pixel_ratio,
            });
            self.last = Some(size);
        }
        out.push(DrawCommand::Clear {
            pixel_ratio: size.pixel_ratio,
        });
    }

    pub fn last(&self) -> Option<SurfaceSize> {
        self.last
    }
}
