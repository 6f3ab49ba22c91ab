use derive_more::Deref;
use derive_more::DerefMut;
use indexmap::IndexMap;
use serde::Deserialize;
use serde::Serialize;
use serde_json::Value;

/// A parsed metadata record: every non-`@var` declaration in source order,
/// plus the registry of user-configurable style variables.
///
/// The record derefs to its `fields` map, so scalar declarations can be read
/// directly: `metadata.get("name")`.
///
/// Ordering rules match the declaration scan: a repeated key overwrites the
/// earlier value in place, and a later `@var` with the same name replaces
/// the earlier descriptor.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, Deref, DerefMut)]
pub struct Metadata {
	/// Scalar (and array-valued) declarations, keyed by declaration key.
	#[deref]
	#[deref_mut]
	#[serde(default)]
	pub fields: IndexMap<String, Value>,
	/// Variable descriptors keyed by variable name.
	#[serde(default, skip_serializing_if = "IndexMap::is_empty")]
	pub vars: IndexMap<String, Variable>,
}

impl Metadata {
	pub fn new() -> Self {
		Self::default()
	}

	/// Convenience accessor for string-valued declarations.
	pub fn get_str(&self, key: &str) -> Option<&str> {
		self.fields.get(key).and_then(Value::as_str)
	}
}

/// The recognized variable kinds, plus `Custom` for user-registered types.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum VariableKind {
	#[default]
	Text,
	Color,
	Checkbox,
	Select,
	Dropdown,
	Image,
	Number,
	Range,
	Custom(String),
}

impl VariableKind {
	pub fn as_str(&self) -> &str {
		match self {
			Self::Text => "text",
			Self::Color => "color",
			Self::Checkbox => "checkbox",
			Self::Select => "select",
			Self::Dropdown => "dropdown",
			Self::Image => "image",
			Self::Number => "number",
			Self::Range => "range",
			Self::Custom(name) => name,
		}
	}

	/// Whether the kind carries numeric bounds (`min`/`max`/`step`).
	pub fn is_numeric(&self) -> bool {
		matches!(self, Self::Number | Self::Range)
	}
}

impl From<&str> for VariableKind {
	fn from(name: &str) -> Self {
		match name {
			"text" => Self::Text,
			"color" => Self::Color,
			"checkbox" => Self::Checkbox,
			"select" => Self::Select,
			"dropdown" => Self::Dropdown,
			"image" => Self::Image,
			"number" => Self::Number,
			"range" => Self::Range,
			other => Self::Custom(other.to_string()),
		}
	}
}

impl From<String> for VariableKind {
	fn from(name: String) -> Self {
		Self::from(name.as_str())
	}
}

impl From<VariableKind> for String {
	fn from(kind: VariableKind) -> Self {
		kind.as_str().to_string()
	}
}

impl std::fmt::Display for VariableKind {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		f.write_str(self.as_str())
	}
}

/// A user-configurable style variable parsed from a `@var` or `@advanced`
/// declaration.
///
/// `default` holds the declared default value; `value` is a slot for the
/// user's chosen value and is always `None` straight out of the parser.
/// `options` is present only for enumerated kinds (select/dropdown/image);
/// `min`/`max`/`step`/`units` only for numeric kinds. A `dropdown`
/// descriptor is normalized to the `select` type tag once parsed.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Variable {
	pub r#type: VariableKind,
	pub name: String,
	pub label: String,
	pub default: Option<Value>,
	pub value: Option<Value>,
	pub options: Option<Vec<VariableOption>>,
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub min: Option<f64>,
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub max: Option<f64>,
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub step: Option<f64>,
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub units: Option<String>,
}

impl Variable {
	pub fn new(r#type: VariableKind, name: impl Into<String>, label: impl Into<String>) -> Self {
		Self {
			r#type,
			name: name.into(),
			label: label.into(),
			..Self::default()
		}
	}

	/// The declared default as a string slice, when it is one.
	pub fn default_str(&self) -> Option<&str> {
		self.default.as_ref().and_then(Value::as_str)
	}

	/// The names of this variable's options, in declaration order.
	pub fn option_names(&self) -> impl Iterator<Item = &str> {
		self.options
			.as_deref()
			.unwrap_or_default()
			.iter()
			.map(|option| option.name.as_str())
	}
}

/// One selectable choice within a select/dropdown/image variable.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct VariableOption {
	pub name: String,
	pub label: String,
	pub value: Value,
}

impl VariableOption {
	pub fn new(
		name: impl Into<String>,
		label: impl Into<String>,
		value: impl Into<Value>,
	) -> Self {
		Self {
			name: name.into(),
			label: label.into(),
			value: value.into(),
		}
	}
}
