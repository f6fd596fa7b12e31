//! Four-slice radial context menu drawn around a node.

use std::f64::consts::{FRAC_PI_2, TAU};

use super::surface::{Geometry, Layer, Shape, ShapeKey, Style, Surface};

/// Screen-space ring radii; divided by zoom so the menu keeps its size.
pub const INNER_RADIUS: f64 = 30.0;
pub const OUTER_RADIUS: f64 = 60.0;

const ITEM_FILL: &str = "#F5F5F5";
const ITEM_HOVER_FILL: &str = "#4A90E2";
const ITEM_STROKE: &str = "#333333";

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum MenuOption {
	Option1,
	Option2,
	Option3,
	Option4,
}

impl MenuOption {
	/// Clockwise from twelve o'clock.
	pub const ALL: [Self; 4] = [Self::Option1, Self::Option2, Self::Option3, Self::Option4];

	pub fn name(self) -> &'static str {
		match self {
			Self::Option1 => "option1",
			Self::Option2 => "option2",
			Self::Option3 => "option3",
			Self::Option4 => "option4",
		}
	}

	pub fn index(self) -> usize {
		self as usize
	}

	fn angles(self) -> (f64, f64) {
		let start = self.index() as f64 * FRAC_PI_2;
		(start, start + FRAC_PI_2)
	}
}

/// Which slice of a menu centred at `center` the world point lies over.
pub fn hit_test(center: (f64, f64), point: (f64, f64), k: f64) -> Option<MenuOption> {
	let (dx, dy) = (point.0 - center.0, point.1 - center.1);
	let screen_dist = dx.hypot(dy) * k;
	if !(INNER_RADIUS..=OUTER_RADIUS).contains(&screen_dist) {
		return None;
	}
	// Clockwise from twelve o'clock with y pointing down.
	let angle = dx.atan2(-dy).rem_euclid(TAU);
	let slot = ((angle / FRAC_PI_2) as usize).min(MenuOption::ALL.len() - 1);
	Some(MenuOption::ALL[slot])
}

pub fn open(surface: &mut impl Surface, center: (f64, f64), k: f64) {
	for option in MenuOption::ALL {
		let (start, end) = option.angles();
		surface.insert(
			ShapeKey::MenuItem(option.index()),
			Shape {
				layer: Layer::Menu,
				geometry: Geometry::Slice {
					cx: center.0,
					cy: center.1,
					inner: INNER_RADIUS / k,
					outer: OUTER_RADIUS / k,
					start,
					end,
				},
				style: item_style(false, k),
				label: Some(option.name().to_owned()),
			},
		);
	}
}

pub fn highlight(surface: &mut impl Surface, hovered: Option<MenuOption>) {
	let k = surface.transform().k;
	for option in MenuOption::ALL {
		if let Some(shape) = surface.get_mut(ShapeKey::MenuItem(option.index())) {
			shape.style = item_style(hovered == Some(option), k);
		}
	}
}

pub fn close(surface: &mut impl Surface) {
	for key in surface.keys(Layer::Menu) {
		surface.remove(key);
	}
}

fn item_style(hovered: bool, k: f64) -> Style {
	Style {
		fill: if hovered { ITEM_HOVER_FILL } else { ITEM_FILL },
		stroke: ITEM_STROKE,
		stroke_width: 1.0 / k,
		opacity: 0.95,
	}
}
