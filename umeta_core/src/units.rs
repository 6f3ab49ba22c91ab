//! CSS units accepted by range and number variables.

/// The whitelist of CSS units a `range`/`number` variable may declare.
pub const RANGE_UNITS: &[&str] = &[
	"em", "ex", "cap", "ch", "ic", "rem", "lh", "rlh", "vw", "vh", "vi", "vb", "vmin", "vmax",
	"cm", "mm", "Q", "in", "pt", "pc", "px", "deg", "grad", "rad", "turn", "s", "ms", "Hz",
	"kHz", "dpi", "dpcm", "dppx", "%",
];

/// Check a unit against [`RANGE_UNITS`].
pub fn is_range_unit(unit: &str) -> bool {
	RANGE_UNITS.contains(&unit)
}
