use smallvec::SmallVec;

/// Bias determines how positions at change boundaries are mapped.
///
/// When mapping a position through a replaced range, bias determines whether
/// the position sticks to the content before or after the replacement.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Bias {
	/// Position stays before insertions at the same location.
	Left,
	/// Position moves after insertions at the same location.
	#[default]
	Right,
}

/// One replaced range of a [`StepMap`], in pre-step coordinates.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MapRange {
	/// Start of the replaced range.
	pub start: usize,
	/// Number of positions removed.
	pub old_size: usize,
	/// Number of positions inserted in their place.
	pub new_size: usize,
}

/// Outcome of mapping a single position.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MapResult {
	/// The mapped position.
	pub pos: usize,
	/// Whether the content on the biased side of the position was removed.
	pub deleted: bool,
}

/// Position map produced by a single step.
///
/// Ranges are sorted by start and do not overlap.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct StepMap {
	ranges: SmallVec<[MapRange; 1]>,
}

impl StepMap {
	/// A map that leaves every position unchanged.
	pub fn empty() -> Self {
		Self::default()
	}

	/// A map replacing `old_size` positions at `start` with `new_size`.
	pub fn replace(start: usize, old_size: usize, new_size: usize) -> Self {
		let mut ranges = SmallVec::new();
		if old_size != 0 || new_size != 0 {
			ranges.push(MapRange {
				start,
				old_size,
				new_size,
			});
		}
		Self { ranges }
	}

	/// Returns the replaced ranges.
	pub fn ranges(&self) -> &[MapRange] {
		&self.ranges
	}

	/// Returns true if this map changes no position.
	pub fn is_empty(&self) -> bool {
		self.ranges.is_empty()
	}

	/// Maps a position, discarding deletion information.
	pub fn map(&self, pos: usize, bias: Bias) -> usize {
		self.map_result(pos, bias).pos
	}

	/// Maps a position and reports whether it was deleted.
	pub fn map_result(&self, pos: usize, bias: Bias) -> MapResult {
		let mut diff: isize = 0;
		for range in &self.ranges {
			if range.start > pos {
				break;
			}
			let end = range.start + range.old_size;
			if pos <= end {
				let side = if range.old_size == 0 {
					bias
				} else if pos == range.start {
					Bias::Left
				} else if pos == end {
					Bias::Right
				} else {
					bias
				};
				let offset = match side {
					Bias::Left => 0,
					Bias::Right => range.new_size as isize,
				};
				let deleted = match bias {
					Bias::Left => pos != range.start,
					Bias::Right => pos != end,
				};
				return MapResult {
					pos: (range.start as isize + diff + offset) as usize,
					deleted,
				};
			}
			diff += range.new_size as isize - range.old_size as isize;
		}
		MapResult {
			pos: (pos as isize + diff) as usize,
			deleted: false,
		}
	}
}

/// Folds a position through a sequence of maps.
///
/// `deleted` becomes true at the first map that deletes the position and
/// stays true for the rest of the fold.
pub fn map_through(maps: &[StepMap], pos: usize, bias: Bias) -> MapResult {
	maps.iter().fold(
		MapResult {
			pos,
			deleted: false,
		},
		|acc, map| {
			let next = map.map_result(acc.pos, bias);
			MapResult {
				pos: next.pos,
				deleted: acc.deleted || next.deleted,
			}
		},
	)
}
