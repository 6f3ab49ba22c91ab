//! Bounded edit-distance check used for "did you mean" suggestions.

/// Check whether the Levenshtein distance between `a` and `b` is at most
/// `max`. Works on characters, not bytes.
///
/// Bails out early when the length difference alone exceeds `max`, and again
/// whenever a whole DP row's minimum exceeds `max` (the distance only grows
/// from there).
pub fn within_edit_distance(a: &str, b: &str, max: usize) -> bool {
	let a: Vec<char> = a.chars().collect();
	let b: Vec<char> = b.chars().collect();
	if a.len().abs_diff(b.len()) > max {
		return false;
	}
	if a.is_empty() {
		return b.len() <= max;
	}
	if b.is_empty() {
		return a.len() <= max;
	}

	let mut previous: Vec<usize> = (0..=b.len()).collect();
	let mut current = vec![0; b.len() + 1];
	for (i, &ca) in a.iter().enumerate() {
		current[0] = i + 1;
		let mut row_min = current[0];
		for (j, &cb) in b.iter().enumerate() {
			let substitute = previous[j] + usize::from(ca != cb);
			let insert = current[j] + 1;
			let delete = previous[j + 1] + 1;
			current[j + 1] = substitute.min(insert).min(delete);
			row_min = row_min.min(current[j + 1]);
		}
		if row_min > max {
			return false;
		}
		std::mem::swap(&mut previous, &mut current);
	}
	previous[b.len()] <= max
}
