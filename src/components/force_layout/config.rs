use super::error::GraphError;

/// How node positions reach the screen.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum LayoutMode {
	/// Step the solver once per animation frame and redraw every step.
	#[default]
	Animated,
	/// Run the solver to rest off-screen, then draw once.
	Settled,
}

/// Per-view layout parameters.
#[derive(Clone, Debug, PartialEq)]
pub struct LayoutConfig {
	pub width: f64,
	pub height: f64,
	/// Pairwise repulsion handed to the solver.
	pub charge: f32,
	/// Edge attraction handed to the solver.
	pub spring: f32,
	pub force_max: f32,
	pub node_speed: f32,
	pub damping: f32,
	/// Solver time step. Constant; alpha limits travel instead.
	pub time_step: f32,
	/// Rest length edges are relaxed toward.
	pub link_distance: f64,
	pub link_strength: f64,
	/// Fraction of the way each node is pulled toward the canvas centre per step.
	pub gravity: f64,
	pub center_strength: f64,
	/// Furthest a node may travel in one step at full alpha.
	pub max_step: f64,
	/// Keep nodes at least the sum of their radii apart.
	pub collide: bool,
	pub alpha_min: f64,
	pub alpha_decay: f64,
	pub node_radius: f64,
}

impl Default for LayoutConfig {
	fn default() -> Self {
		Self {
			width: 1000.0,
			height: 1000.0,
			charge: 150.0,
			spring: 0.05,
			force_max: 100.0,
			node_speed: 3000.0,
			damping: 0.6,
			time_step: 0.02,
			link_distance: 30.0,
			link_strength: 0.5,
			gravity: 0.05,
			center_strength: 1.0,
			max_step: 20.0,
			collide: true,
			alpha_min: 0.001,
			// Reaches alpha_min after 300 steps.
			alpha_decay: 1.0 - 0.001f64.powf(1.0 / 300.0),
			node_radius: 10.0,
		}
	}
}

impl LayoutConfig {
	pub fn center(&self) -> (f64, f64) {
		(self.width / 2.0, self.height / 2.0)
	}

	pub fn validate(&self) -> Result<(), GraphError> {
		if !(self.width > 0.0 && self.height > 0.0) {
			return Err(invalid(format!(
				"canvas must have a positive size, got {}x{}",
				self.width, self.height
			)));
		}
		if !(self.node_radius > 0.0) {
			return Err(invalid(format!(
				"node radius must be positive, got {}",
				self.node_radius
			)));
		}
		if !(self.max_step > 0.0) {
			return Err(invalid(format!(
				"max_step must be positive, got {}",
				self.max_step
			)));
		}
		self.settle_steps().map(|_| ())
	}

	/// Number of steps for alpha to fall from 1 to `alpha_min`.
	pub fn settle_steps(&self) -> Result<usize, GraphError> {
		if !(self.alpha_min > 0.0 && self.alpha_min < 1.0) {
			return Err(invalid(format!(
				"alpha_min must lie in (0, 1), got {}",
				self.alpha_min
			)));
		}
		if !(self.alpha_decay > 0.0 && self.alpha_decay < 1.0) {
			return Err(invalid(format!(
				"alpha_decay must lie in (0, 1), got {}",
				self.alpha_decay
			)));
		}
		let steps = (self.alpha_min.ln() / (1.0 - self.alpha_decay).ln()).ceil();
		if !steps.is_finite() || steps < 1.0 {
			return Err(invalid(format!("settle step count {steps} is not usable")));
		}
		Ok(steps as usize)
	}
}

fn invalid(reason: String) -> GraphError {
	GraphError::InvalidConfig { reason }
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn settle_step_count_is_closed_form() {
		let config = LayoutConfig {
			alpha_min: 0.001,
			alpha_decay: 0.02,
			..LayoutConfig::default()
		};
		assert_eq!(config.settle_steps(), Ok(342));
	}

	#[test]
	fn default_config_is_valid() {
		let config = LayoutConfig::default();
		assert!(config.validate().is_ok());
		let steps = config.settle_steps().unwrap();
		assert!((299..=301).contains(&steps));
	}

	#[test]
	fn rejects_degenerate_decay() {
		for alpha_decay in [0.0, 1.0, 1.5, f64::NAN] {
			let config = LayoutConfig {
				alpha_decay,
				..LayoutConfig::default()
			};
			assert!(matches!(
				config.settle_steps(),
				Err(GraphError::InvalidConfig { .. })
			));
		}
	}

	#[test]
	fn rejects_degenerate_floor() {
		for alpha_min in [0.0, 1.0, 2.0, -0.5] {
			let config = LayoutConfig {
				alpha_min,
				..LayoutConfig::default()
			};
			assert!(config.validate().is_err());
		}
	}

	#[test]
	fn rejects_empty_canvas() {
		let config = LayoutConfig {
			width: 0.0,
			..LayoutConfig::default()
		};
		assert!(config.validate().is_err());
	}

	#[test]
	fn rejects_frozen_step_limit() {
		let config = LayoutConfig {
			max_step: 0.0,
			..LayoutConfig::default()
		};
		assert!(matches!(
			config.validate(),
			Err(GraphError::InvalidConfig { .. })
		));
	}
}
