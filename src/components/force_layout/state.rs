use log::debug;

use super::bundle::ForceEdgeBundler;
use super::config::{LayoutConfig, LayoutMode};
use super::error::GraphError;
use super::interaction::{ContextAction, InteractionController, PointerEvent};
use super::layout::LayoutEngine;
use super::model::{GraphModel, SyncReport};
use super::pipeline::RenderPipeline;
use super::surface::Scene;
use super::types::GraphData;

/// Proof that a settle was requested for a particular sync.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct SettleTicket(u64);

/// Everything one graph view owns. Nothing here is shared between views.
pub struct ForceLayoutState {
	pub model: GraphModel,
	pub layout: LayoutEngine,
	pub pipeline: RenderPipeline,
	pub scene: Scene,
	pub interaction: InteractionController,
	pub mode: LayoutMode,
	pub width: f64,
	pub height: f64,
	generation: u64,
}

impl ForceLayoutState {
	pub fn new(config: LayoutConfig, mode: LayoutMode, bundled: bool) -> Result<Self, GraphError> {
		let (width, height) = (config.width, config.height);
		let model = GraphModel::new(config.center(), config.node_radius);
		let layout = LayoutEngine::new(config)?;
		let pipeline = if bundled {
			RenderPipeline::bundled(ForceEdgeBundler::default())
		} else {
			RenderPipeline::new()
		};
		Ok(Self {
			model,
			layout,
			pipeline,
			scene: Scene::new(),
			interaction: InteractionController::new(),
			mode,
			width,
			height,
			generation: 0,
		})
	}

	/// Sync with a new host snapshot and reseed the layout.
	///
	/// Animated views redraw straight away; settled views wait for
	/// [`settle`](Self::settle) so nodes never show mid-flight.
	pub fn on_data_changed(&mut self, data: &GraphData) -> Result<SyncReport, GraphError> {
		let report = self.model.reconcile(data)?;
		self.generation += 1;
		self.layout.seed(&self.model);
		if self.mode == LayoutMode::Animated {
			self.pipeline.draw(&self.model, &mut self.scene);
		}
		self.interaction.reset(&self.model, &mut self.scene);
		Ok(report)
	}

	/// Ticket for the most recent sync.
	pub fn settle_ticket(&self) -> SettleTicket {
		SettleTicket(self.generation)
	}

	/// Run the layout to rest and draw, unless a newer sync superseded `ticket`.
	pub fn settle(&mut self, ticket: SettleTicket) -> Result<bool, GraphError> {
		if ticket.0 != self.generation {
			debug!(
				"dropping stale settle for sync {} (current {})",
				ticket.0, self.generation
			);
			return Ok(false);
		}
		self.layout.settle(&mut self.model)?;
		let drawn = self.pipeline.draw(&self.model, &mut self.scene);
		debug!(
			"settled draw: {} entered, {} updated, {} exited",
			drawn.entered, drawn.updated, drawn.exited
		);
		self.interaction.restyle(&self.model, &mut self.scene);
		Ok(true)
	}

	/// One animation frame: step the solver while it is still warm.
	pub fn tick(&mut self) {
		if self.mode != LayoutMode::Animated || self.layout.is_settled() {
			return;
		}
		self.layout.step(&mut self.model);
		self.pipeline.draw(&self.model, &mut self.scene);
	}

	pub fn handle(&mut self, event: PointerEvent) -> Option<ContextAction> {
		self.interaction.handle(event, &self.model, &mut self.scene)
	}

	pub fn resize(&mut self, width: f64, height: f64) {
		self.width = width;
		self.height = height;
		self.layout.resize(width, height);
		self.model.set_center((width / 2.0, height / 2.0));
	}
}
