//! Barnes-Hut quadtree for approximating many-body repulsion.
//!
//! Pairwise repulsion is O(n^2); above a node-count threshold the simulation
//! builds this tree each step and treats distant clusters as a single point
//! mass at their center of mass, which brings the cost down to O(n log n).

/// Max points a leaf holds before it subdivides.
const MAX_LEAF_POINTS: usize = 4;

/// Cells smaller than this stop subdividing and hold all their points.
const MIN_CELL_HALF: f64 = 1.0;

/// A square cell of the quadtree.
///
/// Internal cells keep a running total mass and center of mass so a far-away
/// query can use the aggregate instead of descending further.
pub struct QuadTree {
	cx: f64,
	cy: f64,
	half: f64,
	points: Vec<(usize, f64, f64)>,
	children: Option<Box<[QuadTree; 4]>>,
	mass: f64,
	com_x: f64,
	com_y: f64,
}

impl QuadTree {
	/// Build a tree over `points`, or `None` when there are no points.
	///
	/// The root cell is the padded square hull of all points, so every insert
	/// lands inside the root.
	pub fn build(points: &[(f64, f64)]) -> Option<Self> {
		let first = points.first()?;
		let (mut min_x, mut min_y, mut max_x, mut max_y) = (first.0, first.1, first.0, first.1);
		for &(x, y) in points {
			min_x = min_x.min(x);
			min_y = min_y.min(y);
			max_x = max_x.max(x);
			max_y = max_y.max(y);
		}
		let cx = (min_x + max_x) / 2.0;
		let cy = (min_y + max_y) / 2.0;
		let half = ((max_x - min_x).max(max_y - min_y) / 2.0) + 1.0;

		let mut root = Self::cell(cx, cy, half);
		for (idx, &(x, y)) in points.iter().enumerate() {
			root.insert(idx, x, y);
		}
		Some(root)
	}

	fn cell(cx: f64, cy: f64, half: f64) -> Self {
		Self {
			cx,
			cy,
			half,
			points: Vec::new(),
			children: None,
			mass: 0.0,
			com_x: 0.0,
			com_y: 0.0,
		}
	}

	fn insert(&mut self, idx: usize, x: f64, y: f64) {
		// Running center-of-mass update, unit mass per point.
		self.com_x = (self.com_x * self.mass + x) / (self.mass + 1.0);
		self.com_y = (self.com_y * self.mass + y) / (self.mass + 1.0);
		self.mass += 1.0;

		if let Some(children) = self.children.as_mut() {
			let q = Self::quadrant(self.cx, self.cy, x, y);
			children[q].insert(idx, x, y);
			return;
		}

		self.points.push((idx, x, y));
		if self.points.len() > MAX_LEAF_POINTS && self.half > MIN_CELL_HALF {
			self.subdivide();
		}
	}

	fn subdivide(&mut self) {
		let h = self.half / 2.0;
		let mut children = Box::new([
			Self::cell(self.cx - h, self.cy - h, h),
			Self::cell(self.cx + h, self.cy - h, h),
			Self::cell(self.cx - h, self.cy + h, h),
			Self::cell(self.cx + h, self.cy + h, h),
		]);
		for (idx, x, y) in self.points.drain(..) {
			let q = Self::quadrant(self.cx, self.cy, x, y);
			children[q].insert(idx, x, y);
		}
		self.children = Some(children);
	}

	fn quadrant(cx: f64, cy: f64, x: f64, y: f64) -> usize {
		(x >= cx) as usize + ((y >= cy) as usize) * 2
	}

	/// Accumulated inverse-square pull toward every other point, as seen from
	/// `(x, y)`; the point at arena index `exclude` contributes nothing.
	///
	/// Each unit mass `m` at offset `(dx, dy)` contributes `(dx, dy) * m / l`
	/// where `l = d^2`, boosted to `d` below unit distance so short-range
	/// impulses stay bounded; coincident points contribute nothing. The
	/// caller scales the sum by `charge * alpha`; a negative charge turns the
	/// pull into repulsion. Cells whose angular size `width / distance` is
	/// below `theta` are treated as a single mass at their center of mass.
	pub fn force_at(&self, x: f64, y: f64, exclude: usize, theta: f64) -> (f64, f64) {
		if let Some(children) = self.children.as_ref() {
			let dx = self.com_x - x;
			let dy = self.com_y - y;
			let dist_sq = dx * dx + dy * dy;
			let width = self.half * 2.0;
			if dist_sq > 0.0 && width * width < theta * theta * dist_sq {
				let mut l = dist_sq;
				if l < 1.0 {
					l = l.sqrt();
				}
				return (dx * self.mass / l, dy * self.mass / l);
			}
			let mut acc = (0.0, 0.0);
			for child in children.iter() {
				if child.mass > 0.0 {
					let (fx, fy) = child.force_at(x, y, exclude, theta);
					acc.0 += fx;
					acc.1 += fy;
				}
			}
			acc
		} else {
			let mut acc = (0.0, 0.0);
			for &(idx, px, py) in &self.points {
				if idx == exclude {
					continue;
				}
				let dx = px - x;
				let dy = py - y;
				let mut l = dx * dx + dy * dy;
				if l == 0.0 {
					// A coincident point has no direction to push along.
					continue;
				}
				if l < 1.0 {
					l = l.sqrt();
				}
				acc.0 += dx / l;
				acc.1 += dy / l;
			}
			acc
		}
	}

	/// Total mass (point count) under this cell.
	#[cfg(test)]
	pub fn mass(&self) -> f64 {
		self.mass
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	fn brute_force(points: &[(f64, f64)], x: f64, y: f64, exclude: usize) -> (f64, f64) {
		let mut acc = (0.0, 0.0);
		for (idx, &(px, py)) in points.iter().enumerate() {
			if idx == exclude {
				continue;
			}
			let dx = px - x;
			let dy = py - y;
			let mut l = dx * dx + dy * dy;
			if l == 0.0 {
				continue;
			}
			if l < 1.0 {
				l = l.sqrt();
			}
			acc.0 += dx / l;
			acc.1 += dy / l;
		}
		acc
	}

	fn grid(n: usize, spacing: f64) -> Vec<(f64, f64)> {
		(0..n * n)
			.map(|i| ((i % n) as f64 * spacing, (i / n) as f64 * spacing))
			.collect()
	}

	#[test]
	fn empty_build_is_none() {
		assert!(QuadTree::build(&[]).is_none());
	}

	#[test]
	fn tracks_total_mass() {
		let points = grid(5, 40.0);
		let tree = QuadTree::build(&points).unwrap();
		assert!((tree.mass() - 25.0).abs() < 1e-9);
	}

	#[test]
	fn single_point_excluded_from_itself() {
		let points = [(100.0, 200.0)];
		let tree = QuadTree::build(&points).unwrap();
		let (fx, fy) = tree.force_at(100.0, 200.0, 0, 0.9);
		assert_eq!(fx, 0.0);
		assert_eq!(fy, 0.0);
	}

	#[test]
	fn pair_matches_exact_inverse_square() {
		let points = [(0.0, 0.0), (30.0, 40.0)];
		let tree = QuadTree::build(&points).unwrap();
		let (fx, fy) = tree.force_at(0.0, 0.0, 0, 0.9);
		// d^2 = 2500, contribution (30, 40) / 2500
		assert!((fx - 30.0 / 2500.0).abs() < 1e-12);
		assert!((fy - 40.0 / 2500.0).abs() < 1e-12);
	}

	#[test]
	fn sub_unit_separations_use_square_root_boost() {
		let points = [(0.0, 0.0), (0.3, 0.4)];
		let tree = QuadTree::build(&points).unwrap();
		// d^2 = 0.25 < 1, so l = d = 0.5 and the pull is (dx, dy) / 0.5.
		let (fx, fy) = tree.force_at(0.3, 0.4, 1, 0.9);
		assert!((fx - (-0.3 / 0.5)).abs() < 1e-12);
		assert!((fy - (-0.4 / 0.5)).abs() < 1e-12);
	}

	#[test]
	fn far_query_approximates_brute_force() {
		let points = grid(6, 30.0);
		let tree = QuadTree::build(&points).unwrap();
		// Query well outside the cluster; exclude index outside range so all
		// points contribute.
		let (tx, ty) = tree.force_at(2000.0, -500.0, usize::MAX, 0.9);
		let (bx, by) = brute_force(&points, 2000.0, -500.0, usize::MAX);
		let mag = (bx * bx + by * by).sqrt();
		let err = ((tx - bx).powi(2) + (ty - by).powi(2)).sqrt();
		assert!(err < mag * 0.05, "approximation error {err} vs magnitude {mag}");
	}

	#[test]
	fn zero_theta_is_exact() {
		let points = grid(4, 50.0);
		let tree = QuadTree::build(&points).unwrap();
		// With theta 0 the far-field test never passes, so the tree descends
		// to leaves everywhere and reproduces brute force exactly.
		let (tx, ty) = tree.force_at(60.0, 35.0, 3, 0.0);
		let (bx, by) = brute_force(&points, 60.0, 35.0, 3);
		assert!((tx - bx).abs() < 1e-9);
		assert!((ty - by).abs() < 1e-9);
	}
}
