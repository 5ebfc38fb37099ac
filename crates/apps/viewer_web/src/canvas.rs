//! Replays layer draw lists onto a `CanvasRenderingContext2d`.

use layers::{DrawCommand, DrawList, SurfaceSize};
use streaming::Surface;
use tracing::warn;
use wasm_bindgen::{JsCast, JsValue};
use web_sys::{CanvasRenderingContext2d, Document, HtmlCanvasElement};

pub struct CanvasSurface {
    canvas: HtmlCanvasElement,
    ctx: CanvasRenderingContext2d,
}

impl CanvasSurface {
    pub fn from_id(document: &Document, id: &str) -> Result<Self, JsValue> {
        let canvas = document
            .get_element_by_id(id)
            .ok_or_else(|| JsValue::from_str(&format!("missing canvas #{id}")))?
            .dyn_into::<HtmlCanvasElement>()?;
        let ctx = canvas
            .get_context("2d")?
            .ok_or_else(|| JsValue::from_str(&format!("no 2d context for #{id}")))?
            .dyn_into::<CanvasRenderingContext2d>()?;
        Ok(Self { canvas, ctx })
    }

    pub fn canvas(&self) -> &HtmlCanvasElement {
        &self.canvas
    }

    fn replay(&self, list: &DrawList) -> Result<(), JsValue> {
        let ctx = &self.ctx;
        for cmd in list.iter() {
            match cmd {
                DrawCommand::Resize {
                    width_px,
                    height_px,
                    ..
                } => {
                    self.canvas.set_width(*width_px);
                    self.canvas.set_height(*height_px);
                }
                DrawCommand::Clear { pixel_ratio } => {
                    ctx.set_transform(1.0, 0.0, 0.0, 1.0, 0.0, 0.0)?;
                    ctx.clear_rect(
                        0.0,
                        0.0,
                        self.canvas.width() as f64,
                        self.canvas.height() as f64,
                    );
                    let pr = if *pixel_ratio > 0.0 { *pixel_ratio } else { 1.0 };
                    ctx.set_transform(pr, 0.0, 0.0, pr, 0.0, 0.0)?;
                }
                DrawCommand::Save => ctx.save(),
                DrawCommand::Restore => ctx.restore(),
                DrawCommand::Translate(v) => ctx.translate(v.x, v.y)?,
                DrawCommand::Rotate(a) => ctx.rotate(*a)?,
                DrawCommand::Scale(s) => ctx.scale(*s, *s)?,
                DrawCommand::SetFillStyle(s) => ctx.set_fill_style_str(s),
                DrawCommand::SetStrokeStyle(s) => ctx.set_stroke_style_str(s),
                DrawCommand::SetLineWidth(w) => ctx.set_line_width(*w),
                DrawCommand::SetLineDash(pattern) => {
                    let arr = js_sys::Array::new();
                    for d in pattern {
                        arr.push(&JsValue::from_f64(*d));
                    }
                    ctx.set_line_dash(&arr)?;
                }
                DrawCommand::BeginPath => ctx.begin_path(),
                DrawCommand::MoveTo(p) => ctx.move_to(p.x, p.y),
                DrawCommand::LineTo(p) => ctx.line_to(p.x, p.y),
                DrawCommand::Circle { center, radius } => {
                    ctx.move_to(center.x + radius, center.y);
                    ctx.arc(center.x, center.y, *radius, 0.0, std::f64::consts::TAU)?;
                }
                DrawCommand::ClosePath => ctx.close_path(),
                DrawCommand::Fill => ctx.fill(),
                DrawCommand::Stroke => ctx.stroke(),
                DrawCommand::SetFont(f) => ctx.set_font(f),
                DrawCommand::SetTextAlign(a) => ctx.set_text_align(a.as_css()),
                DrawCommand::SetTextBaseline(b) => ctx.set_text_baseline(b.as_css()),
                DrawCommand::FillText { text, at } => ctx.fill_text(text, at.x, at.y)?,
            }
        }
        Ok(())
    }
}

impl Surface for CanvasSurface {
    fn size(&self) -> SurfaceSize {
        let dpr = web_sys::window()
            .map(|w| w.device_pixel_ratio())
            .unwrap_or(1.0);
        SurfaceSize::new(
            self.canvas.client_width() as f64,
            self.canvas.client_height() as f64,
            dpr,
        )
    }

    fn submit(&mut self, list: &DrawList) {
        if let Err(err) = self.replay(list) {
            warn!(canvas = %self.canvas.id(), error = ?err, "canvas replay failed");
        }
    }
}
