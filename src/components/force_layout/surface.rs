//! Retained drawing surface.
//!
//! Shapes are created, restyled and removed by key; the browser painter
//! walks a [`Scene`] once per frame. Keeping shapes keyed per view means two
//! graphs on one page never touch each other's shapes.

use std::collections::BTreeMap;

use super::model::NodeKey;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum ShapeKey {
	Node(NodeKey),
	/// Ordinal of the edge in the current edge list.
	Edge(usize),
	MenuItem(usize),
}

/// Paint order, back to front.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Layer {
	Edges,
	Nodes,
	Menu,
}

#[derive(Clone, Debug, PartialEq)]
pub enum Geometry {
	Circle { cx: f64, cy: f64, r: f64 },
	Line { x1: f64, y1: f64, x2: f64, y2: f64 },
	Polyline(Vec<(f64, f64)>),
	/// Annular sector; angles run clockwise from twelve o'clock.
	Slice {
		cx: f64,
		cy: f64,
		inner: f64,
		outer: f64,
		start: f64,
		end: f64,
	},
}

#[derive(Clone, Debug, PartialEq)]
pub struct Style {
	pub fill: &'static str,
	pub stroke: &'static str,
	pub stroke_width: f64,
	pub opacity: f64,
}

#[derive(Clone, Debug, PartialEq)]
pub struct Shape {
	pub layer: Layer,
	pub geometry: Geometry,
	pub style: Style,
	pub label: Option<String>,
}

/// Uniform pan and zoom applied to the whole drawing group.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ViewTransform {
	pub x: f64,
	pub y: f64,
	pub k: f64,
}

impl Default for ViewTransform {
	fn default() -> Self {
		Self::IDENTITY
	}
}

impl ViewTransform {
	pub const IDENTITY: Self = Self {
		x: 0.0,
		y: 0.0,
		k: 1.0,
	};

	pub fn screen_to_world(&self, sx: f64, sy: f64) -> (f64, f64) {
		((sx - self.x) / self.k, (sy - self.y) / self.k)
	}

	#[cfg(test)]
	pub fn world_to_screen(&self, wx: f64, wy: f64) -> (f64, f64) {
		(wx * self.k + self.x, wy * self.k + self.y)
	}
}

/// What the render pipeline and controller need from a drawing surface.
pub trait Surface {
	fn insert(&mut self, key: ShapeKey, shape: Shape);
	fn get(&self, key: ShapeKey) -> Option<&Shape>;
	fn get_mut(&mut self, key: ShapeKey) -> Option<&mut Shape>;
	fn remove(&mut self, key: ShapeKey) -> Option<Shape>;
	fn keys(&self, layer: Layer) -> Vec<ShapeKey>;
	fn transform(&self) -> ViewTransform;
	fn set_transform(&mut self, transform: ViewTransform);
}

#[derive(Clone, Debug, Default)]
pub struct Scene {
	shapes: BTreeMap<ShapeKey, Shape>,
	transform: ViewTransform,
}

impl Scene {
	pub fn new() -> Self {
		Self::default()
	}

	#[cfg(test)]
	pub fn len(&self) -> usize {
		self.shapes.len()
	}

	#[cfg(test)]
	pub fn is_empty(&self) -> bool {
		self.shapes.is_empty()
	}

	/// Shapes on `layer` in key order.
	pub fn layer(&self, layer: Layer) -> impl Iterator<Item = (&ShapeKey, &Shape)> {
		self.shapes.iter().filter(move |(_, s)| s.layer == layer)
	}
}

impl Surface for Scene {
	fn insert(&mut self, key: ShapeKey, shape: Shape) {
		self.shapes.insert(key, shape);
	}

	fn get(&self, key: ShapeKey) -> Option<&Shape> {
		self.shapes.get(&key)
	}

	fn get_mut(&mut self, key: ShapeKey) -> Option<&mut Shape> {
		self.shapes.get_mut(&key)
	}

	fn remove(&mut self, key: ShapeKey) -> Option<Shape> {
		self.shapes.remove(&key)
	}

	fn keys(&self, layer: Layer) -> Vec<ShapeKey> {
		self.layer(layer).map(|(k, _)| *k).collect()
	}

	fn transform(&self) -> ViewTransform {
		self.transform
	}

	fn set_transform(&mut self, transform: ViewTransform) {
		self.transform = transform;
	}
}
