//! Turns a [`Metadata`] record back into a `/* ==UserStyle== */` block.

use std::fmt;

use indexmap::IndexMap;
use serde::Serialize;
use serde_json::ser::PrettyFormatter;
use serde_json::Value;

use crate::metadata::Metadata;
use crate::metadata::Variable;
use crate::metadata::VariableKind;
use crate::metadata::VariableOption;
use crate::scanner::number_value;

/// The variable dialect to emit.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
#[non_exhaustive]
pub enum Format {
	/// `@var` declarations with JSON option maps.
	#[default]
	Stylus,
	/// `@advanced` declarations with brace-list options and heredocs.
	Xstyle,
}

/// Indentation for multi-line option output, as a width in spaces or a
/// literal string. An empty indent collapses JSON option maps to one line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Space {
	Width(usize),
	Text(String),
}

impl Default for Space {
	fn default() -> Self {
		Self::Width(2)
	}
}

impl Space {
	fn indent(&self) -> String {
		match self {
			Self::Width(width) => " ".repeat(*width),
			Self::Text(text) => text.clone(),
		}
	}
}

/// Output of a custom key stringifier: either one declaration line or one
/// line per entry under the same key.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum KeyOutput {
	Single(String),
	Lines(Vec<String>),
}

impl From<String> for KeyOutput {
	fn from(text: String) -> Self {
		Self::Single(text)
	}
}

impl From<&str> for KeyOutput {
	fn from(text: &str) -> Self {
		Self::Single(text.to_string())
	}
}

impl From<Vec<String>> for KeyOutput {
	fn from(lines: Vec<String>) -> Self {
		Self::Lines(lines)
	}
}

/// A custom stringifier for one declaration key.
pub type KeyStringifier = Box<dyn Fn(&Value) -> KeyOutput + Send + Sync>;

/// A custom stringifier for the default-value portion of one variable type.
pub type VarStringifier = Box<dyn Fn(&Variable, Format, &Space) -> String + Send + Sync>;

/// Configures and builds a [`Stringifier`].
pub struct StringifierBuilder {
	align_keys: bool,
	space: Space,
	format: Format,
	stringify_key: IndexMap<String, KeyStringifier>,
	stringify_var: IndexMap<String, VarStringifier>,
}

impl Default for StringifierBuilder {
	fn default() -> Self {
		Self {
			align_keys: false,
			space: Space::default(),
			format: Format::default(),
			stringify_key: IndexMap::new(),
			stringify_var: IndexMap::new(),
		}
	}
}

impl StringifierBuilder {
	/// Pad every key to the longest key's width so the values line up.
	pub fn align_keys(mut self, align: bool) -> Self {
		self.align_keys = align;
		self
	}

	pub fn space(mut self, space: Space) -> Self {
		self.space = space;
		self
	}

	pub fn format(mut self, format: Format) -> Self {
		self.format = format;
		self
	}

	/// Register (or override) the stringifier for a declaration key.
	pub fn stringify_key(
		mut self,
		key: impl Into<String>,
		stringifier: impl Fn(&Value) -> KeyOutput + Send + Sync + 'static,
	) -> Self {
		self.stringify_key.insert(key.into(), Box::new(stringifier));
		self
	}

	/// Register (or override) the default-value stringifier for a variable
	/// type.
	pub fn stringify_var(
		mut self,
		r#type: impl Into<String>,
		stringifier: impl Fn(&Variable, Format, &Space) -> String + Send + Sync + 'static,
	) -> Self {
		self.stringify_var.insert(r#type.into(), Box::new(stringifier));
		self
	}

	pub fn build(self) -> Stringifier {
		Stringifier {
			align_keys: self.align_keys,
			space: self.space,
			format: self.format,
			stringify_key: self.stringify_key,
			stringify_var: self.stringify_var,
		}
	}
}

impl fmt::Debug for StringifierBuilder {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.debug_struct("StringifierBuilder")
			.field("align_keys", &self.align_keys)
			.field("space", &self.space)
			.field("format", &self.format)
			.finish_non_exhaustive()
	}
}

/// A configured metadata stringifier. Reusable across records.
pub struct Stringifier {
	align_keys: bool,
	space: Space,
	format: Format,
	stringify_key: IndexMap<String, KeyStringifier>,
	stringify_var: IndexMap<String, VarStringifier>,
}

impl Default for Stringifier {
	fn default() -> Self {
		StringifierBuilder::default().build()
	}
}

impl fmt::Debug for Stringifier {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.debug_struct("Stringifier")
			.field("align_keys", &self.align_keys)
			.field("space", &self.space)
			.field("format", &self.format)
			.finish_non_exhaustive()
	}
}

impl Stringifier {
	pub fn builder() -> StringifierBuilder {
		StringifierBuilder::default()
	}

	/// Render `metadata` as a complete UserStyle comment block. Fields come
	/// out in record order, followed by one `@var` (or `@advanced`, for
	/// xstyle) line per variable; any `*/` in the body is escaped to keep
	/// the comment intact.
	pub fn stringify(&self, metadata: &Metadata) -> String {
		let var_key = match self.format {
			Format::Stylus => "var",
			Format::Xstyle => "advanced",
		};

		let mut lines: Vec<(String, String)> = Vec::new();
		for (key, value) in &metadata.fields {
			if let Some(stringifier) = self.stringify_key.get(key) {
				match stringifier(value) {
					KeyOutput::Single(text) => lines.push((key.clone(), text)),
					KeyOutput::Lines(texts) => {
						lines.extend(texts.into_iter().map(|text| (key.clone(), text)));
					}
				}
			} else if let Value::Array(items) = value {
				for item in items {
					lines.push((key.clone(), quote_if_needed(item)));
				}
			} else {
				lines.push((key.clone(), quote_if_needed(value)));
			}
		}
		for var in metadata.vars.values() {
			lines.push((var_key.to_string(), self.variable_line(var)));
		}

		let width = if self.align_keys {
			lines.iter().map(|(key, _)| key.chars().count()).max().unwrap_or(0)
		} else {
			0
		};
		let body = lines
			.iter()
			.map(|(key, text)| format!("@{key:<width$} {text}"))
			.collect::<Vec<_>>()
			.join("\n");
		format!("/* ==UserStyle==\n{}\n==/UserStyle== */", escape_comment(&body))
	}

	fn variable_line(&self, var: &Variable) -> String {
		let type_tag = if self.format == Format::Xstyle && var.r#type == VariableKind::Select {
			"dropdown"
		} else {
			var.r#type.as_str()
		};
		let label = json_string(&var.label);
		let default = self.variable_default(var);
		format!("{type_tag} {} {label} {default}", var.name)
	}

	fn variable_default(&self, var: &Variable) -> String {
		if let Some(stringifier) = self.stringify_var.get(var.r#type.as_str()) {
			return stringifier(var, self.format, &self.space);
		}

		if let Some(options) = &var.options {
			return match self.format {
				Format::Stylus => self.stylus_options(var, options),
				Format::Xstyle => {
					xstyle_options(options, var.r#type == VariableKind::Image, &self.space.indent())
				}
			};
		}

		if var.r#type == VariableKind::Text && self.format == Format::Xstyle {
			return json_string(&var.default_str().unwrap_or_default());
		}

		if var.r#type.is_numeric() && has_bounds(var) {
			let mut items = vec![
				var.default.clone().unwrap_or(Value::Null),
				bound_value(var.min),
				bound_value(var.max),
				bound_value(var.step),
			];
			if let Some(units) = &var.units {
				if !units.is_empty() {
					items.push(Value::String(units.clone()));
				}
			}
			return Value::Array(items).to_string();
		}

		render_plain(var.default.as_ref().unwrap_or(&Value::Null))
	}

	fn stylus_options(&self, var: &Variable, options: &[VariableOption]) -> String {
		let default_name = var.default_str();
		let mut map = serde_json::Map::new();
		for option in options {
			let star = if Some(option.name.as_str()) == default_name { "*" } else { "" };
			map.insert(
				format!("{}:{}{star}", option.name, option.label),
				option.value.clone(),
			);
		}
		to_pretty_json(&Value::Object(map), &self.space)
	}
}

fn has_bounds(var: &Variable) -> bool {
	var.min.is_some() || var.max.is_some() || var.step.is_some() || var.units.is_some()
}

fn bound_value(bound: Option<f64>) -> Value {
	bound.map_or(Value::Null, number_value)
}

fn xstyle_options(options: &[VariableOption], single_line: bool, pad: &str) -> String {
	let body = options
		.iter()
		.map(|option| {
			let value = if single_line {
				option.value.to_string()
			} else {
				format!("<<<EOT\n{} EOT;", render_plain(&option.value))
			};
			format!("{pad}{} {} {value}", option.name, json_string(&option.label))
		})
		.collect::<Vec<_>>()
		.join("\n");
	format!("{{\n{body}\n}}")
}

/// Strings survive as-is unless they span lines, in which case they are JSON
/// quoted so the parser can round-trip them. Everything else renders as
/// compact JSON.
fn quote_if_needed(value: &Value) -> String {
	match value {
		Value::String(text) if text.contains('\n') => json_string(text),
		other => render_plain(other),
	}
}

fn render_plain(value: &Value) -> String {
	match value {
		Value::String(text) => text.clone(),
		other => other.to_string(),
	}
}

fn json_string(text: &str) -> String {
	Value::String(text.to_string()).to_string()
}

fn escape_comment(text: &str) -> String {
	text.replace("*/", "*\\/")
}

fn to_pretty_json(value: &Value, space: &Space) -> String {
	let indent = space.indent();
	if indent.is_empty() {
		return value.to_string();
	}
	let formatter = PrettyFormatter::with_indent(indent.as_bytes());
	let mut out = Vec::new();
	let mut serializer = serde_json::Serializer::with_formatter(&mut out, formatter);
	if value.serialize(&mut serializer).is_err() {
		return value.to_string();
	}
	String::from_utf8(out).unwrap_or_else(|_| value.to_string())
}
