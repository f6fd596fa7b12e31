//! Pointer handling: hover highlighting, the radial context menu and
//! pan/zoom.
//!
//! Every handler is total. An event that makes no sense in the current mode
//! is ignored rather than reported, so the controller and the surface never
//! drift apart.

use log::debug;

use super::highlight::{Neighborhood, neighbors_of, neighbors_of_edge};
use super::menu::{self, MenuOption};
use super::model::{GraphModel, NodeKey};
use super::pipeline::{EDGE_WIDTH, edge_style, node_style, shape_target};
use super::surface::{Geometry, Layer, ShapeKey, Surface, ViewTransform};

pub const MIN_SCALE: f64 = 0.1;
pub const MAX_SCALE: f64 = 10.0;
/// Radius of the node that owns the open menu.
pub const FOCAL_RADIUS: f64 = 30.0;
/// Extra screen pixels around shapes that still count as a hit.
const HIT_SLOP: f64 = 3.0;

const HIGHLIGHT_FILL: &str = "#FF7F0E";
const HIGHLIGHT_STROKE: &str = "#1F77B4";
const DIM_OPACITY: f64 = 0.15;

/// Pointer input in canvas pixels, passed explicitly to every handler.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum PointerEvent {
	Move { x: f64, y: f64 },
	Down { x: f64, y: f64 },
	Up { x: f64, y: f64 },
	Leave,
	Wheel { x: f64, y: f64, delta_y: f64 },
	/// A pan/zoom recogniser's latest `{translate_x, translate_y, scale}`.
	Gesture(ViewTransform),
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Mode {
	Idle,
	MenuOpen,
}

/// A context-menu choice for the host.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ContextAction {
	pub option: MenuOption,
	pub node_id: String,
}

/// What the host can observe about the pointer state of one view.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct InteractionState {
	pub context_node: Option<NodeKey>,
	pub menu_open: bool,
	pub transform: ViewTransform,
}

#[derive(Clone, Copy, Debug, PartialEq)]
enum Hover {
	Node(NodeKey),
	Edge(usize),
}

#[derive(Clone, Copy, Debug)]
struct PanDrag {
	start_x: f64,
	start_y: f64,
	origin: ViewTransform,
}

#[derive(Default)]
pub struct InteractionController {
	state: InteractionState,
	hover: Option<Hover>,
	pan: Option<PanDrag>,
	menu_center: (f64, f64),
	hovered_item: Option<MenuOption>,
	/// The press that opened the menu has not been released yet.
	opening: bool,
}

impl InteractionController {
	pub fn new() -> Self {
		Self::default()
	}

	#[cfg(test)]
	pub fn state(&self) -> &InteractionState {
		&self.state
	}

	pub fn mode(&self) -> Mode {
		if self.state.menu_open {
			Mode::MenuOpen
		} else {
			Mode::Idle
		}
	}

	#[cfg(test)]
	pub fn hovered_item(&self) -> Option<MenuOption> {
		self.hovered_item
	}

	pub fn handle(
		&mut self,
		event: PointerEvent,
		model: &GraphModel,
		surface: &mut impl Surface,
	) -> Option<ContextAction> {
		match event {
			PointerEvent::Move { x, y } => self.on_move(x, y, model, surface),
			PointerEvent::Down { x, y } => self.on_down(x, y, model, surface),
			PointerEvent::Up { x, y } => return self.on_up(x, y, model, surface),
			PointerEvent::Leave => self.on_leave(model, surface),
			PointerEvent::Wheel { x, y, delta_y } => self.on_wheel(x, y, delta_y, model, surface),
			PointerEvent::Gesture(t) => {
				if self.mode() == Mode::Idle {
					self.apply_transform(t, model, surface);
				}
			}
		}
		None
	}

	/// Drop menu, hover and drag state after the data changed underneath.
	pub fn reset(&mut self, model: &GraphModel, surface: &mut impl Surface) {
		if self.state.menu_open {
			menu::close(surface);
		}
		self.state.menu_open = false;
		self.state.context_node = None;
		self.hovered_item = None;
		self.opening = false;
		self.hover = None;
		self.pan = None;
		self.restyle(model, surface);
	}

	/// Recompute every node and edge style from hover, focus and zoom.
	///
	/// Sizes are divided by the zoom so they stay constant on screen.
	pub fn restyle(&self, model: &GraphModel, surface: &mut impl Surface) {
		let k = surface.transform().k;
		let hood = self.neighborhood(model);

		for (position, node) in model.nodes().iter().enumerate() {
			let Some(shape) = surface.get_mut(ShapeKey::Node(node.key)) else {
				continue;
			};
			let base = if self.state.context_node == Some(node.key) {
				FOCAL_RADIUS
			} else {
				node.r
			};
			if let Geometry::Circle { r, .. } = &mut shape.geometry {
				*r = base / k;
			}
			shape.style = node_style(k);
			if let Some(hood) = &hood {
				if hood.contains_node(position) {
					shape.style.fill = HIGHLIGHT_FILL;
				} else {
					shape.style.opacity = DIM_OPACITY;
				}
			}
		}

		for i in 0..model.edges().len() {
			let Some(shape) = surface.get_mut(ShapeKey::Edge(i)) else {
				continue;
			};
			shape.style = edge_style(k);
			if let Some(hood) = &hood {
				if hood.contains_edge(i) {
					shape.style.stroke = HIGHLIGHT_STROKE;
					shape.style.stroke_width = 2.0 * EDGE_WIDTH / k;
				} else {
					shape.style.opacity = DIM_OPACITY;
				}
			}
		}
	}

	fn neighborhood(&self, model: &GraphModel) -> Option<Neighborhood> {
		match self.hover? {
			Hover::Node(key) => model
				.position_of_key(key)
				.map(|p| neighbors_of(p, model.edges())),
			Hover::Edge(i) => Some(neighbors_of_edge(i, model.edges())),
		}
	}

	fn on_move(&mut self, x: f64, y: f64, model: &GraphModel, surface: &mut impl Surface) {
		let t = surface.transform();
		if self.state.menu_open {
			let item = menu::hit_test(self.menu_center, t.screen_to_world(x, y), t.k);
			if item != self.hovered_item {
				self.hovered_item = item;
				menu::highlight(surface, item);
			}
			return;
		}
		if let Some(pan) = self.pan {
			let next = ViewTransform {
				x: pan.origin.x + (x - pan.start_x),
				y: pan.origin.y + (y - pan.start_y),
				k: pan.origin.k,
			};
			self.apply_transform(next, model, surface);
			return;
		}
		let hover = self.pick(x, y, model, &*surface);
		if hover != self.hover {
			self.hover = hover;
			self.restyle(model, surface);
		}
	}

	fn on_down(&mut self, x: f64, y: f64, model: &GraphModel, surface: &mut impl Surface) {
		if self.state.menu_open {
			return;
		}
		let t = surface.transform();
		match self.pick(x, y, model, &*surface) {
			Some(Hover::Node(key)) => {
				let center = surface
					.get(ShapeKey::Node(key))
					.and_then(|shape| match shape.geometry {
						Geometry::Circle { cx, cy, .. } => Some((cx, cy)),
						_ => None,
					})
					.unwrap_or_else(|| t.screen_to_world(x, y));
				self.hover = None;
				self.pan = None;
				self.state.menu_open = true;
				self.state.context_node = Some(key);
				self.menu_center = center;
				self.hovered_item = None;
				self.opening = true;
				self.restyle(model, surface);
				menu::open(surface, center, t.k);
				debug!("context menu opened for {key:?}");
			}
			_ => {
				self.pan = Some(PanDrag {
					start_x: x,
					start_y: y,
					origin: t,
				});
			}
		}
	}

	fn on_up(
		&mut self,
		x: f64,
		y: f64,
		model: &GraphModel,
		surface: &mut impl Surface,
	) -> Option<ContextAction> {
		if !self.state.menu_open {
			self.pan = None;
			return None;
		}
		let t = surface.transform();
		self.hovered_item = menu::hit_test(self.menu_center, t.screen_to_world(x, y), t.k);
		if std::mem::take(&mut self.opening) && self.hovered_item.is_none() {
			menu::highlight(surface, None);
			return None;
		}

		let action = self.hovered_item.zip(self.state.context_node).and_then(|(option, key)| {
			let node = model.node(model.position_of_key(key)?)?;
			Some(ContextAction {
				option,
				node_id: node.id.clone(),
			})
		});
		self.close_menu(model, surface);
		action
	}

	fn on_leave(&mut self, model: &GraphModel, surface: &mut impl Surface) {
		if self.state.menu_open {
			return;
		}
		self.pan = None;
		if self.hover.take().is_some() {
			self.restyle(model, surface);
		}
	}

	fn on_wheel(
		&mut self,
		x: f64,
		y: f64,
		delta_y: f64,
		model: &GraphModel,
		surface: &mut impl Surface,
	) {
		if self.state.menu_open {
			return;
		}
		let t = surface.transform();
		let factor = if delta_y > 0.0 { 0.9 } else { 1.1 };
		let k = (t.k * factor).clamp(MIN_SCALE, MAX_SCALE);
		let ratio = k / t.k;
		let next = ViewTransform {
			x: x - (x - t.x) * ratio,
			y: y - (y - t.y) * ratio,
			k,
		};
		self.apply_transform(next, model, surface);
	}

	fn apply_transform(
		&mut self,
		mut t: ViewTransform,
		model: &GraphModel,
		surface: &mut impl Surface,
	) {
		if !t.k.is_finite() {
			return;
		}
		t.k = t.k.clamp(MIN_SCALE, MAX_SCALE);
		self.state.transform = t;
		surface.set_transform(t);
		self.restyle(model, surface);
	}

	fn close_menu(&mut self, model: &GraphModel, surface: &mut impl Surface) {
		menu::close(surface);
		self.state.menu_open = false;
		self.state.context_node = None;
		self.hovered_item = None;
		self.opening = false;
		self.restyle(model, surface);
	}

	/// Topmost node under the pointer, else the nearest edge within reach.
	fn pick(&self, x: f64, y: f64, model: &GraphModel, surface: &impl Surface) -> Option<Hover> {
		let t = surface.transform();
		let (wx, wy) = t.screen_to_world(x, y);
		let slop = HIT_SLOP / t.k;

		// Shapes of nodes dropped by the last sync linger until the next draw.
		let node = surface.keys(Layer::Nodes).into_iter().rev().find_map(|key| {
			let ShapeKey::Node(node_key) = key else {
				return None;
			};
			model.position_of_key(node_key)?;
			match surface.get(key)?.geometry {
				Geometry::Circle { cx, cy, r } if (cx - wx).hypot(cy - wy) <= r + slop => {
					Some(node_key)
				}
				_ => None,
			}
		});
		if let Some(key) = node {
			return Some(Hover::Node(key));
		}

		surface
			.keys(Layer::Edges)
			.into_iter()
			.filter_map(|key| {
				let i = shape_target(model, key)?;
				let dist = match &surface.get(key)?.geometry {
					Geometry::Line { x1, y1, x2, y2 } => {
						segment_distance((wx, wy), (*x1, *y1), (*x2, *y2))
					}
					Geometry::Polyline(points) => points
						.windows(2)
						.map(|w| segment_distance((wx, wy), w[0], w[1]))
						.fold(f64::INFINITY, f64::min),
					_ => return None,
				};
				(dist <= slop).then_some((i, dist))
			})
			.min_by(|a, b| a.1.total_cmp(&b.1))
			.map(|(i, _)| Hover::Edge(i))
	}
}

fn segment_distance(p: (f64, f64), a: (f64, f64), b: (f64, f64)) -> f64 {
	let (dx, dy) = (b.0 - a.0, b.1 - a.1);
	let len2 = dx * dx + dy * dy;
	let t = if len2 > 0.0 {
		(((p.0 - a.0) * dx + (p.1 - a.1) * dy) / len2).clamp(0.0, 1.0)
	} else {
		0.0
	};
	(p.0 - (a.0 + t * dx)).hypot(p.1 - (a.1 + t * dy))
}
