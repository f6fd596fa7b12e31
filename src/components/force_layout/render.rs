use std::f64::consts::{FRAC_PI_2, PI};

use web_sys::CanvasRenderingContext2d;

use super::surface::{Geometry, Layer, Scene, Shape, Surface};

const BACKGROUND: &str = "#FFFFFF";
const LABEL_FILL: &str = "#333333";

pub fn render(scene: &Scene, width: f64, height: f64, ctx: &CanvasRenderingContext2d) {
	ctx.set_fill_style_str(BACKGROUND);
	ctx.fill_rect(0.0, 0.0, width, height);
	let t = scene.transform();
	ctx.save();
	let _ = ctx.translate(t.x, t.y);
	let _ = ctx.scale(t.k, t.k);
	for layer in [Layer::Edges, Layer::Nodes, Layer::Menu] {
		for (_, shape) in scene.layer(layer) {
			draw_shape(shape, t.k, ctx);
		}
	}
	ctx.restore();
}

fn draw_shape(shape: &Shape, k: f64, ctx: &CanvasRenderingContext2d) {
	let style = &shape.style;
	ctx.set_global_alpha(style.opacity);
	ctx.set_line_width(style.stroke_width);
	ctx.set_stroke_style_str(style.stroke);
	ctx.set_fill_style_str(style.fill);
	ctx.begin_path();

	match &shape.geometry {
		Geometry::Circle { cx, cy, r } => {
			let _ = ctx.arc(*cx, *cy, *r, 0.0, 2.0 * PI);
			ctx.fill();
			ctx.stroke();
			if let Some(label) = &shape.label {
				draw_label(label, cx + r + 3.0 / k, cy + 3.0 / k, k, ctx);
			}
		}
		Geometry::Line { x1, y1, x2, y2 } => {
			ctx.move_to(*x1, *y1);
			ctx.line_to(*x2, *y2);
			ctx.stroke();
		}
		Geometry::Polyline(points) => {
			let mut points = points.iter();
			if let Some(&(x, y)) = points.next() {
				ctx.move_to(x, y);
			}
			for &(x, y) in points {
				ctx.line_to(x, y);
			}
			ctx.stroke();
		}
		Geometry::Slice {
			cx,
			cy,
			inner,
			outer,
			start,
			end,
		} => {
			// Slice angles start at twelve o'clock; canvas angles at three.
			let (a0, a1) = (start - FRAC_PI_2, end - FRAC_PI_2);
			let _ = ctx.arc(*cx, *cy, *outer, a0, a1);
			let _ = ctx.arc_with_anticlockwise(*cx, *cy, *inner, a1, a0, true);
			ctx.close_path();
			ctx.fill();
			ctx.stroke();
			if let Some(label) = &shape.label {
				let (mid, radius) = ((a0 + a1) / 2.0, (inner + outer) / 2.0);
				ctx.set_text_align("center");
				draw_label(label, cx + radius * mid.cos(), cy + radius * mid.sin(), k, ctx);
				ctx.set_text_align("start");
			}
		}
	}
	ctx.set_global_alpha(1.0);
}

fn draw_label(text: &str, x: f64, y: f64, k: f64, ctx: &CanvasRenderingContext2d) {
	ctx.set_fill_style_str(LABEL_FILL);
	ctx.set_font(&format!("{}px sans-serif", 10.0 / k.max(0.1)));
	let _ = ctx.fill_text(text, x, y);
}
