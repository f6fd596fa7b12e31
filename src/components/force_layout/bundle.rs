//! Edge bundling.
//!
//! A bundler turns straight edges into polylines. [`ForceEdgeBundler`] is a
//! compact force-directed bundler: every edge is subdivided and its interior
//! points are pulled toward the matching points of compatible edges while a
//! spring keeps each polyline taut.

/// Maps node positions and edge endpoints to one polyline per edge.
///
/// Every polyline starts at the source position and ends at the target.
pub trait EdgeBundler {
	fn bundle(&self, nodes: &[(f64, f64)], edges: &[(usize, usize)]) -> Vec<Vec<(f64, f64)>>;
}

type Point = (f64, f64);

#[derive(Clone, Debug, PartialEq)]
pub struct ForceEdgeBundler {
	pub cycles: usize,
	pub iterations: usize,
	pub step: f64,
	pub stiffness: f64,
	pub compatibility: f64,
}

impl Default for ForceEdgeBundler {
	fn default() -> Self {
		Self {
			cycles: 4,
			iterations: 50,
			step: 0.04,
			stiffness: 0.1,
			compatibility: 0.6,
		}
	}
}

impl EdgeBundler for ForceEdgeBundler {
	fn bundle(&self, nodes: &[(f64, f64)], edges: &[(usize, usize)]) -> Vec<Vec<(f64, f64)>> {
		let segments: Vec<(Point, Point)> = edges
			.iter()
			.map(|&(s, t)| (nodes[s], nodes[t]))
			.collect();
		let usable: Vec<bool> = segments.iter().map(|&(a, b)| length(a, b) > 1e-9).collect();

		let mut compatible = vec![Vec::new(); segments.len()];
		for i in 0..segments.len() {
			for j in i + 1..segments.len() {
				if usable[i] && usable[j] && self.score(segments[i], segments[j]) >= self.compatibility {
					compatible[i].push(j);
					compatible[j].push(i);
				}
			}
		}

		let mut lines: Vec<Vec<Point>> = segments.iter().map(|&(a, b)| vec![a, b]).collect();
		let (mut divisions, mut iterations, mut step) = (1, self.iterations, self.step);
		for _ in 0..self.cycles {
			for (line, &ok) in lines.iter_mut().zip(&usable) {
				if ok {
					*line = resample(line, divisions);
				}
			}
			for _ in 0..iterations {
				let forces: Vec<Vec<Point>> = (0..lines.len())
					.map(|e| self.forces(e, &lines, &segments, &compatible[e], usable[e]))
					.collect();
				for (line, force) in lines.iter_mut().zip(forces) {
					for (p, f) in line.iter_mut().zip(force) {
						p.0 += step * f.0;
						p.1 += step * f.1;
					}
				}
			}
			divisions *= 2;
			iterations = (iterations * 2 / 3).max(1);
			step /= 2.0;
		}
		lines
	}
}

impl ForceEdgeBundler {
	fn score(&self, p: (Point, Point), q: (Point, Point)) -> f64 {
		let (lp, lq) = (length(p.0, p.1), length(q.0, q.1));
		let (vp, vq) = (sub(p.1, p.0), sub(q.1, q.0));
		let angle = ((vp.0 * vq.0 + vp.1 * vq.1) / (lp * lq)).abs();
		let avg = (lp + lq) / 2.0;
		let scale = 2.0 / (avg / lp.min(lq) + lp.max(lq) / avg);
		let position = avg / (avg + length(midpoint(p), midpoint(q)));
		angle * scale * position
	}

	fn forces(
		&self,
		e: usize,
		lines: &[Vec<Point>],
		segments: &[(Point, Point)],
		compatible: &[usize],
		usable: bool,
	) -> Vec<Point> {
		let line = &lines[e];
		let mut out = vec![(0.0, 0.0); line.len()];
		if !usable || line.len() < 3 {
			return out;
		}
		let (a, b) = segments[e];
		let kp = self.stiffness / (length(a, b) * (line.len() - 1) as f64);
		for i in 1..line.len() - 1 {
			let p = line[i];
			let mut f = (
				kp * (line[i - 1].0 - p.0 + line[i + 1].0 - p.0),
				kp * (line[i - 1].1 - p.1 + line[i + 1].1 - p.1),
			);
			for &other in compatible {
				let Some(&q) = lines[other].get(i) else {
					continue;
				};
				let d = sub(q, p);
				let dist = d.0.hypot(d.1);
				if dist > 1e-6 {
					f.0 += d.0 / dist;
					f.1 += d.1 / dist;
				}
			}
			out[i] = f;
		}
		out
	}
}

/// Redistribute `line` into `divisions + 1` equal-length segments.
fn resample(line: &[Point], divisions: usize) -> Vec<Point> {
	let total: f64 = line.windows(2).map(|w| length(w[0], w[1])).sum();
	let (first, last) = (line[0], line[line.len() - 1]);
	let seg = total / (divisions + 1) as f64;
	let mut out = vec![first];
	let (mut walked, mut k) = (0.0, 0usize);
	for target in (1..=divisions).map(|i| i as f64 * seg) {
		while k + 1 < line.len() - 1 && walked + length(line[k], line[k + 1]) < target {
			walked += length(line[k], line[k + 1]);
			k += 1;
		}
		let span = length(line[k], line[k + 1]);
		let t = if span > 0.0 { (target - walked) / span } else { 0.0 };
		let d = sub(line[k + 1], line[k]);
		out.push((line[k].0 + d.0 * t, line[k].1 + d.1 * t));
	}
	out.push(last);
	out
}

fn sub(a: Point, b: Point) -> Point {
	(a.0 - b.0, a.1 - b.1)
}

fn length(a: Point, b: Point) -> f64 {
	(b.0 - a.0).hypot(b.1 - a.1)
}

fn midpoint((a, b): (Point, Point)) -> Point {
	((a.0 + b.0) / 2.0, (a.1 + b.1) / 2.0)
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn lone_edge_stays_straight() {
		let nodes = [(0.0, 0.0), (100.0, 0.0)];
		let lines = ForceEdgeBundler::default().bundle(&nodes, &[(0, 1)]);
		let line = &lines[0];
		assert!(line.len() > 2);
		assert_eq!(line[0], (0.0, 0.0));
		assert_eq!(line[line.len() - 1], (100.0, 0.0));
		assert!(line.iter().all(|p| p.1.abs() < 1e-9));
	}

	#[test]
	fn parallel_edges_pull_together() {
		let nodes = [(0.0, 0.0), (100.0, 0.0), (0.0, 10.0), (100.0, 10.0)];
		let lines = ForceEdgeBundler::default().bundle(&nodes, &[(0, 1), (2, 3)]);
		let mid = |line: &Vec<Point>| line[line.len() / 2];
		let gap = mid(&lines[1]).1 - mid(&lines[0]).1;
		assert!(gap < 10.0);
		assert_eq!(lines[1][0], (0.0, 10.0));
	}

	#[test]
	fn perpendicular_edges_are_left_alone() {
		let nodes = [(0.0, 50.0), (100.0, 50.0), (50.0, 0.0), (50.0, 100.0)];
		let lines = ForceEdgeBundler::default().bundle(&nodes, &[(0, 1), (2, 3)]);
		assert!(lines[0].iter().all(|p| (p.1 - 50.0).abs() < 1e-9));
	}

	#[test]
	fn self_loop_is_two_points() {
		let nodes = [(5.0, 5.0)];
		let lines = ForceEdgeBundler::default().bundle(&nodes, &[(0, 0)]);
		assert_eq!(lines, vec![vec![(5.0, 5.0), (5.0, 5.0)]]);
	}

	#[test]
	fn resample_spaces_points_evenly() {
		let line = resample(&[(0.0, 0.0), (30.0, 0.0)], 2);
		assert_eq!(line.len(), 4);
		assert!((line[1].0 - 10.0).abs() < 1e-9 && (line[2].0 - 20.0).abs() < 1e-9);
	}
}
