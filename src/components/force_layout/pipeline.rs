use log::trace;

use super::bundle::EdgeBundler;
use super::model::{GraphModel, Node};
use super::surface::{Geometry, Layer, Shape, ShapeKey, Style, Surface};

pub const NODE_FILL: &str = "#ABABAB";
pub const NODE_STROKE: &str = "#FFFFFF";
pub const EDGE_STROKE: &str = "#000000";
pub const EDGE_WIDTH: f64 = 1.0;
pub const NODE_STROKE_WIDTH: f64 = 1.5;

/// Shape counts touched by one draw.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct DrawStats {
	pub entered: usize,
	pub updated: usize,
	pub exited: usize,
}

/// Joins the model against the shapes already on a surface.
///
/// Nodes join on [`NodeKey`](super::model::NodeKey), edges on their ordinal.
#[derive(Default)]
pub struct RenderPipeline {
	bundler: Option<Box<dyn EdgeBundler>>,
}

impl RenderPipeline {
	pub fn new() -> Self {
		Self::default()
	}

	pub fn bundled(bundler: impl EdgeBundler + 'static) -> Self {
		Self {
			bundler: Some(Box::new(bundler)),
		}
	}

	#[cfg(test)]
	pub fn is_bundled(&self) -> bool {
		self.bundler.is_some()
	}

	pub fn draw(&self, model: &GraphModel, surface: &mut impl Surface) -> DrawStats {
		let mut stats = DrawStats::default();
		let k = surface.transform().k;

		let live: Vec<ShapeKey> = model.nodes().iter().map(node_shape).collect();
		for key in surface.keys(Layer::Nodes) {
			if !live.contains(&key) {
				surface.remove(key);
				stats.exited += 1;
			}
		}
		for node in model.nodes() {
			let key = node_shape(node);
			match surface.get_mut(key) {
				Some(shape) => {
					if let Geometry::Circle { cx, cy, .. } = &mut shape.geometry {
						(*cx, *cy) = (node.x, node.y);
					}
					stats.updated += 1;
				}
				None => {
					surface.insert(key, node_enter(node, k));
					stats.entered += 1;
				}
			}
		}

		let edges = model.edges();
		for key in surface.keys(Layer::Edges) {
			if matches!(key, ShapeKey::Edge(i) if i >= edges.len()) {
				surface.remove(key);
				stats.exited += 1;
			}
		}
		for (i, geometry) in self.edge_geometry(model).into_iter().enumerate() {
			let key = ShapeKey::Edge(i);
			match surface.get_mut(key) {
				Some(shape) => {
					shape.geometry = geometry;
					stats.updated += 1;
				}
				None => {
					surface.insert(
						key,
						Shape {
							layer: Layer::Edges,
							geometry,
							style: edge_style(k),
							label: None,
						},
					);
					stats.entered += 1;
				}
			}
		}

		trace!("draw: {stats:?}");
		stats
	}

	fn edge_geometry(&self, model: &GraphModel) -> Vec<Geometry> {
		let nodes = model.nodes();
		match &self.bundler {
			Some(bundler) => {
				let points: Vec<(f64, f64)> = nodes.iter().map(|n| (n.x, n.y)).collect();
				let ends: Vec<(usize, usize)> =
					model.edges().iter().map(|e| (e.source, e.target)).collect();
				bundler
					.bundle(&points, &ends)
					.into_iter()
					.map(Geometry::Polyline)
					.collect()
			}
			None => model
				.edges()
				.iter()
				.map(|e| Geometry::Line {
					x1: nodes[e.source].x,
					y1: nodes[e.source].y,
					x2: nodes[e.target].x,
					y2: nodes[e.target].y,
				})
				.collect(),
		}
	}
}

pub fn node_shape(node: &Node) -> ShapeKey {
	ShapeKey::Node(node.key)
}

/// Model position of the node or edge behind a shape.
pub fn shape_target(model: &GraphModel, key: ShapeKey) -> Option<usize> {
	match key {
		ShapeKey::Node(node) => model.position_of_key(node),
		ShapeKey::Edge(i) if i < model.edges().len() => Some(i),
		_ => None,
	}
}

pub fn node_style(k: f64) -> Style {
	Style {
		fill: NODE_FILL,
		stroke: NODE_STROKE,
		stroke_width: NODE_STROKE_WIDTH / k,
		opacity: 1.0,
	}
}

pub fn edge_style(k: f64) -> Style {
	Style {
		fill: "none",
		stroke: EDGE_STROKE,
		stroke_width: EDGE_WIDTH / k,
		opacity: 1.0,
	}
}

fn node_enter(node: &Node, k: f64) -> Shape {
	Shape {
		layer: Layer::Nodes,
		geometry: Geometry::Circle {
			cx: node.x,
			cy: node.y,
			r: node.r / k,
		},
		style: node_style(k),
		label: Some(node.id.clone()),
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use crate::components::force_layout::bundle::ForceEdgeBundler;
	use crate::components::force_layout::surface::{Scene, ViewTransform};
	use crate::components::force_layout::types::{GraphData, GraphLink, GraphNode};

	fn data(nodes: &[&str], links: &[(&str, &str)]) -> GraphData {
		GraphData {
			nodes: nodes.iter().map(|id| GraphNode::new(*id)).collect(),
			links: links.iter().map(|(s, t)| GraphLink::new(*s, *t)).collect(),
		}
	}

	fn synced(data: &GraphData) -> GraphModel {
		let mut model = GraphModel::new((100.0, 100.0), 10.0);
		model.reconcile(data).unwrap();
		model
	}

	#[test]
	fn first_draw_enters_everything() {
		let model = synced(&data(&["a", "b", "c"], &[("a", "b"), ("b", "c")]));
		let mut scene = Scene::new();
		let stats = RenderPipeline::new().draw(&model, &mut scene);
		assert_eq!(
			stats,
			DrawStats {
				entered: 5,
				updated: 0,
				exited: 0
			}
		);
		let shape = scene.get(node_shape(&model.nodes()[0])).unwrap();
		assert_eq!(shape.label.as_deref(), Some("a"));
		assert_eq!(shape.style, node_style(1.0));
	}

	#[test]
	fn redraw_updates_positions_and_keeps_style() {
		let mut model = synced(&data(&["a", "b"], &[("a", "b")]));
		let mut scene = Scene::new();
		let pipeline = RenderPipeline::new();
		pipeline.draw(&model, &mut scene);

		let key = node_shape(&model.nodes()[0]);
		scene.get_mut(key).unwrap().style.opacity = 0.2;
		model.nodes_mut()[0].x = 7.0;
		model.nodes_mut()[0].y = 9.0;
		let stats = pipeline.draw(&model, &mut scene);

		assert_eq!(stats.updated, 3);
		let shape = scene.get(key).unwrap();
		assert_eq!(
			shape.geometry,
			Geometry::Circle {
				cx: 7.0,
				cy: 9.0,
				r: 10.0
			}
		);
		assert_eq!(shape.style.opacity, 0.2);
		assert_eq!(
			scene.get(ShapeKey::Edge(0)).unwrap().geometry,
			Geometry::Line {
				x1: 7.0,
				y1: 9.0,
				x2: model.nodes()[1].x,
				y2: model.nodes()[1].y
			}
		);
	}

	#[test]
	fn removed_nodes_and_edges_exit() {
		let mut model = synced(&data(&["a", "b", "c"], &[("a", "b"), ("b", "c")]));
		let mut scene = Scene::new();
		let pipeline = RenderPipeline::new();
		pipeline.draw(&model, &mut scene);
		let b = node_shape(&model.nodes()[1]);

		model.reconcile(&data(&["a", "c"], &[("a", "c")])).unwrap();
		let stats = pipeline.draw(&model, &mut scene);

		assert_eq!(stats.exited, 2);
		assert!(scene.get(b).is_none());
		assert_eq!(scene.keys(Layer::Edges), vec![ShapeKey::Edge(0)]);
		assert_eq!(scene.keys(Layer::Nodes).len(), 2);
	}

	#[test]
	fn entered_sizes_follow_zoom() {
		let model = synced(&data(&["a"], &[]));
		let mut scene = Scene::new();
		scene.set_transform(ViewTransform {
			x: 0.0,
			y: 0.0,
			k: 2.0,
		});
		RenderPipeline::new().draw(&model, &mut scene);
		let shape = scene.get(node_shape(&model.nodes()[0])).unwrap();
		assert!(matches!(shape.geometry, Geometry::Circle { r, .. } if r == 5.0));
		assert_eq!(shape.style.stroke_width, NODE_STROKE_WIDTH / 2.0);
	}

	#[test]
	fn bundled_edges_are_polylines() {
		let model = synced(&data(&["a", "b", "c", "d"], &[("a", "b"), ("c", "d")]));
		let mut scene = Scene::new();
		let pipeline = RenderPipeline::bundled(ForceEdgeBundler::default());
		assert!(pipeline.is_bundled());
		pipeline.draw(&model, &mut scene);
		let Geometry::Polyline(points) = &scene.get(ShapeKey::Edge(0)).unwrap().geometry else {
			panic!("expected a polyline");
		};
		assert!(points.len() > 2);
		assert_eq!(points[0], (model.nodes()[0].x, model.nodes()[0].y));
	}

	#[test]
	fn shapes_map_back_to_model() {
		let model = synced(&data(&["a", "b"], &[("a", "b")]));
		assert_eq!(shape_target(&model, node_shape(&model.nodes()[1])), Some(1));
		assert_eq!(shape_target(&model, ShapeKey::Edge(0)), Some(0));
		assert_eq!(shape_target(&model, ShapeKey::Edge(1)), None);
		assert_eq!(shape_target(&model, ShapeKey::MenuItem(0)), None);
	}
}
