//! The metadata block parser.
//!
//! A [`Parser`] scans the source for `@key` declarations and resolves each
//! one with a per-key value parser, then runs the matching validator. Both
//! tables can be extended or overridden through [`ParserBuilder`].

use std::collections::HashSet;
use std::fmt;

use indexmap::IndexMap;
use once_cell::sync::Lazy;
use regex::Regex;
use serde_json::Value;
use tracing::debug;
use tracing::trace;
use url::Url;

use crate::distance::within_edit_distance;
use crate::error::ErrorKind;
use crate::error::MetaResult;
use crate::error::ParseError;
use crate::metadata::Metadata;
use crate::metadata::Variable;
use crate::metadata::VariableKind;
use crate::metadata::VariableOption;
use crate::scanner::is_valid_version;
use crate::scanner::normalize_version;
use crate::scanner::ParseState;
use crate::units::is_range_unit;

/// Declaration keys with builtin handling.
pub const KNOWN_KEYS: &[&str] = &[
	"author",
	"advanced",
	"description",
	"homepageURL",
	"icon",
	"license",
	"name",
	"namespace",
	"preprocessor",
	"supportURL",
	"updateURL",
	"var",
	"version",
];

/// Variable types with builtin handling.
pub const KNOWN_VAR_TYPES: &[&str] = &[
	"text", "color", "checkbox", "select", "dropdown", "image", "number", "range",
];

/// Keys that must be present (and non-empty) by default.
pub const MANDATORY_KEYS: &[&str] = &["name", "namespace", "version"];

static RX_KEY: Lazy<Regex> = Lazy::new(|| Regex::new(r"@(\w+)[^\S\n]*").expect("static pattern"));
static RX_NAMED_OPTION: Lazy<Regex> = Lazy::new(|| Regex::new(r"^(\w+):(.*)").expect("static pattern"));

/// What to do with a declaration key that has no builtin or registered
/// handling.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
#[non_exhaustive]
pub enum UnknownKeyAction {
	/// Skip the declaration entirely.
	#[default]
	Ignore,
	/// Parse the value as a plain string and keep it.
	Assign,
	/// Fail with an `unknownMeta` error, with a "did you mean" suggestion
	/// when a known key is close enough.
	Throw,
}

/// Which declaration key introduced a variable.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DeclarationFlavor {
	/// A `@var` declaration.
	Var,
	/// A `@advanced` declaration.
	Advanced,
}

/// A custom value parser for a declaration key. The cursor sits at the start
/// of the value; the parser consumes it and returns the parsed value.
pub type KeyParser = Box<dyn Fn(&mut ParseState<'_>) -> MetaResult<Value> + Send + Sync>;

/// A custom validator for a parsed declaration value. May rewrite the value
/// to normalize it.
pub type KeyValidator = Box<dyn Fn(&ParseState<'_>, &mut Value) -> MetaResult<()> + Send + Sync>;

/// A custom default-value parser for a variable type.
pub type VarValueParser = Box<dyn Fn(&mut ParseState<'_>) -> MetaResult<Value> + Send + Sync>;

/// A custom validator for a fully parsed variable.
pub type VarValidator = Box<dyn Fn(&ParseState<'_>, &Variable) -> MetaResult<()> + Send + Sync>;

/// The registered value parser for a variable type.
///
/// A type can parse the same way under `@var` and `@advanced`, or switch on
/// the declaration flavor the way the builtin `image` type does.
pub enum VarParser {
	Direct(VarValueParser),
	ByFlavor {
		var: VarValueParser,
		advanced: VarValueParser,
	},
}

impl VarParser {
	pub fn direct(
		parser: impl Fn(&mut ParseState<'_>) -> MetaResult<Value> + Send + Sync + 'static,
	) -> Self {
		Self::Direct(Box::new(parser))
	}

	pub fn by_flavor(
		var: impl Fn(&mut ParseState<'_>) -> MetaResult<Value> + Send + Sync + 'static,
		advanced: impl Fn(&mut ParseState<'_>) -> MetaResult<Value> + Send + Sync + 'static,
	) -> Self {
		Self::ByFlavor {
			var: Box::new(var),
			advanced: Box::new(advanced),
		}
	}

	fn for_flavor(&self, flavor: DeclarationFlavor) -> &VarValueParser {
		match self {
			Self::Direct(parser) => parser,
			Self::ByFlavor { var, advanced } => match flavor {
				DeclarationFlavor::Var => var,
				DeclarationFlavor::Advanced => advanced,
			},
		}
	}
}

impl fmt::Debug for VarParser {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		match self {
			Self::Direct(_) => f.write_str("VarParser::Direct"),
			Self::ByFlavor { .. } => f.write_str("VarParser::ByFlavor"),
		}
	}
}

/// The outcome of a parse: the metadata record plus, in error-collection
/// mode, every recoverable error that was encountered.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ParseResult {
	pub metadata: Metadata,
	pub errors: Vec<ParseError>,
}

/// Configures and builds a [`Parser`].
pub struct ParserBuilder {
	unknown_key: UnknownKeyAction,
	mandatory_keys: Vec<String>,
	allow_errors: bool,
	parse_key: IndexMap<String, KeyParser>,
	validate_key: IndexMap<String, Option<KeyValidator>>,
	parse_var: IndexMap<String, VarParser>,
	validate_var: IndexMap<String, Option<VarValidator>>,
}

impl Default for ParserBuilder {
	fn default() -> Self {
		Self {
			unknown_key: UnknownKeyAction::default(),
			mandatory_keys: MANDATORY_KEYS.iter().map(ToString::to_string).collect(),
			allow_errors: false,
			parse_key: IndexMap::new(),
			validate_key: IndexMap::new(),
			parse_var: IndexMap::new(),
			validate_var: IndexMap::new(),
		}
	}
}

impl ParserBuilder {
	/// How to treat declaration keys without builtin or registered handling.
	pub fn unknown_key(mut self, action: UnknownKeyAction) -> Self {
		self.unknown_key = action;
		self
	}

	/// Replace the default `name`/`namespace`/`version` mandatory set.
	pub fn mandatory_keys(mut self, keys: impl IntoIterator<Item = impl Into<String>>) -> Self {
		self.mandatory_keys = keys.into_iter().map(Into::into).collect();
		self
	}

	/// Collect recoverable errors into [`ParseResult::errors`] instead of
	/// failing on the first one.
	pub fn allow_errors(mut self, allow: bool) -> Self {
		self.allow_errors = allow;
		self
	}

	/// Register (or override) the value parser for a declaration key. The
	/// key becomes known, so it is kept even under
	/// [`UnknownKeyAction::Ignore`].
	pub fn parse_key(
		mut self,
		key: impl Into<String>,
		parser: impl Fn(&mut ParseState<'_>) -> MetaResult<Value> + Send + Sync + 'static,
	) -> Self {
		self.parse_key.insert(key.into(), Box::new(parser));
		self
	}

	/// Register (or override) the validator for a declaration key.
	pub fn validate_key(
		mut self,
		key: impl Into<String>,
		validator: impl Fn(&ParseState<'_>, &mut Value) -> MetaResult<()> + Send + Sync + 'static,
	) -> Self {
		self.validate_key.insert(key.into(), Some(Box::new(validator)));
		self
	}

	/// Disable validation for a declaration key, including the builtin
	/// version and URL checks.
	pub fn skip_key_validation(mut self, key: impl Into<String>) -> Self {
		self.validate_key.insert(key.into(), None);
		self
	}

	/// Register (or override) the default-value parser for a variable type.
	/// The type becomes known, so it no longer raises `unknownVarType`.
	pub fn parse_var(mut self, r#type: impl Into<String>, parser: VarParser) -> Self {
		self.parse_var.insert(r#type.into(), parser);
		self
	}

	/// Register (or override) the validator for a variable type.
	pub fn validate_var(
		mut self,
		r#type: impl Into<String>,
		validator: impl Fn(&ParseState<'_>, &Variable) -> MetaResult<()> + Send + Sync + 'static,
	) -> Self {
		self.validate_var.insert(r#type.into(), Some(Box::new(validator)));
		self
	}

	/// Disable validation for a variable type, including the builtin rules.
	pub fn skip_var_validation(mut self, r#type: impl Into<String>) -> Self {
		self.validate_var.insert(r#type.into(), None);
		self
	}

	pub fn build(self) -> Parser {
		Parser {
			unknown_key: self.unknown_key,
			mandatory_keys: self.mandatory_keys,
			allow_errors: self.allow_errors,
			parse_key: self.parse_key,
			validate_key: self.validate_key,
			parse_var: self.parse_var,
			validate_var: self.validate_var,
		}
	}
}

impl fmt::Debug for ParserBuilder {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.debug_struct("ParserBuilder")
			.field("unknown_key", &self.unknown_key)
			.field("mandatory_keys", &self.mandatory_keys)
			.field("allow_errors", &self.allow_errors)
			.finish_non_exhaustive()
	}
}

/// A configured metadata parser. Reusable across inputs.
pub struct Parser {
	unknown_key: UnknownKeyAction,
	mandatory_keys: Vec<String>,
	allow_errors: bool,
	parse_key: IndexMap<String, KeyParser>,
	validate_key: IndexMap<String, Option<KeyValidator>>,
	parse_var: IndexMap<String, VarParser>,
	validate_var: IndexMap<String, Option<VarValidator>>,
}

impl Default for Parser {
	fn default() -> Self {
		ParserBuilder::default().build()
	}
}

impl fmt::Debug for Parser {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.debug_struct("Parser")
			.field("unknown_key", &self.unknown_key)
			.field("mandatory_keys", &self.mandatory_keys)
			.field("allow_errors", &self.allow_errors)
			.finish_non_exhaustive()
	}
}

impl Parser {
	pub fn builder() -> ParserBuilder {
		ParserBuilder::default()
	}

	/// Parse a metadata block out of `text`.
	///
	/// The scan looks for `@key` tokens anywhere in the text, so the
	/// surrounding `/* ==UserStyle== ... */` comment wrapper is accepted but
	/// not required. Text consumed as a declaration value is never
	/// re-scanned for keys, which keeps `@` signs inside heredocs and
	/// multiline strings inert.
	pub fn parse(&self, text: &str) -> MetaResult<ParseResult> {
		if text.contains('\r') {
			return Err(ParseError::without_index(ErrorKind::InvalidCharacter('\r')));
		}

		let mut state = ParseState::new(text);
		let mut metadata = Metadata::new();
		let mut errors: Vec<ParseError> = Vec::new();
		let mut maybe_uso = false;

		while let Some(caps) = RX_KEY.captures(text.get(state.last_index..).unwrap_or_default()) {
			let (Some(whole), Some(key)) = (caps.get(0), caps.get(1)) else {
				break;
			};
			let search = state.last_index;
			let key_index = search + whole.start();
			state.index = key_index;
			state.key = key.as_str().to_string();
			state.last_index = search + whole.end();
			state.value_index = state.last_index;
			trace!(key = %state.key, index = key_index, "declaration");

			let outcome =
				self.parse_declaration(&mut state, key_index, &mut metadata, &mut maybe_uso);
			if let Err(mut error) = outcome {
				if error.index.is_none()
					&& !matches!(error.kind, ErrorKind::InvalidSelectMultipleDefaults)
				{
					error.index = Some(state.index);
				}
				if self.allow_errors {
					debug!(code = error.code(), "collecting recoverable error");
					errors.push(error);
				} else {
					return Err(error);
				}
			}
		}

		if maybe_uso && !metadata.fields.contains_key("preprocessor") {
			metadata
				.fields
				.insert("preprocessor".to_string(), Value::String("uso".to_string()));
		}

		if let Err(error) = self.check_mandatory(&metadata) {
			if self.allow_errors {
				errors.push(error);
			} else {
				return Err(error);
			}
		}

		Ok(ParseResult { metadata, errors })
	}

	fn check_mandatory(&self, metadata: &Metadata) -> MetaResult<()> {
		let missing: Vec<String> = self
			.mandatory_keys
			.iter()
			.filter(|key| {
				match metadata.fields.get(key.as_str()) {
					None | Some(Value::Null) => true,
					Some(Value::String(value)) => value.is_empty(),
					Some(_) => false,
				}
			})
			.cloned()
			.collect();
		if missing.is_empty() {
			Ok(())
		} else {
			Err(ParseError::without_index(ErrorKind::MissingMandatory(missing)))
		}
	}

	fn parse_declaration(
		&self,
		state: &mut ParseState<'_>,
		key_index: usize,
		metadata: &mut Metadata,
		maybe_uso: &mut bool,
	) -> MetaResult<()> {
		let key = state.key.clone();
		let known = KNOWN_KEYS.contains(&key.as_str()) || self.parse_key.contains_key(&key);
		if !known {
			match self.unknown_key {
				UnknownKeyAction::Ignore => return Ok(()),
				UnknownKeyAction::Assign => {}
				UnknownKeyAction::Throw => {
					return Err(ParseError::new(
						ErrorKind::UnknownMeta {
							suggestion: self.suggest(&key),
							key,
						},
						key_index,
					));
				}
			}
		}

		if let Some(parser) = self.parse_key.get(&key) {
			let mut value = parser(state)?;
			self.validate_field(state, &key, &mut value)?;
			// `var` always goes through the variable registry, never the
			// field map.
			if key != "var" {
				metadata.fields.insert(key, value);
			}
		} else if key == "var" || key == "advanced" {
			let flavor = if key == "advanced" {
				*maybe_uso = true;
				DeclarationFlavor::Advanced
			} else {
				DeclarationFlavor::Var
			};
			self.parse_variable(state, flavor, metadata)?;
		} else {
			let mut value = Value::String(state.parse_string_to_end()?);
			self.validate_field(state, &key, &mut value)?;
			metadata.fields.insert(key, value);
		}
		Ok(())
	}

	fn validate_field(
		&self,
		state: &ParseState<'_>,
		key: &str,
		value: &mut Value,
	) -> MetaResult<()> {
		match self.validate_key.get(key) {
			Some(None) => Ok(()),
			Some(Some(validator)) => validator(state, value),
			None => builtin_validate_field(state, key, value),
		}
	}

	fn parse_variable(
		&self,
		state: &mut ParseState<'_>,
		flavor: DeclarationFlavor,
		metadata: &mut Metadata,
	) -> MetaResult<()> {
		state.var = Some(Variable::default());

		let type_word = state.parse_word()?.to_string();
		let type_index = state.index;
		let known = KNOWN_VAR_TYPES.contains(&type_word.as_str())
			|| self.parse_var.contains_key(&type_word);
		if !known {
			return Err(ParseError::new(ErrorKind::UnknownVarType(type_word), type_index));
		}
		let kind = VariableKind::from(type_word.as_str());
		state.var_mut().r#type = kind.clone();

		let name = state.parse_word()?.to_string();
		state.var_mut().name = name;

		let label = state.parse_string(true)?;
		state.var_mut().label = label;

		state.value_index = state.last_index;
		let default = if let Some(parser) = self.parse_var.get(&type_word) {
			parser.for_flavor(flavor)(state)?
		} else {
			match kind {
				VariableKind::Checkbox => Value::String(state.parse_char()?.to_string()),
				VariableKind::Select => parse_select_value(state)?,
				VariableKind::Image if flavor == DeclarationFlavor::Var => {
					parse_select_value(state)?
				}
				VariableKind::Dropdown | VariableKind::Image => {
					parse_xstyle_value(state, kind == VariableKind::Dropdown)?
				}
				VariableKind::Number | VariableKind::Range => parse_range_value(state)?,
				// text, color
				_ => Value::String(state.parse_string_to_end()?),
			}
		};

		let mut var = state.var.take().unwrap_or_default();
		var.default = Some(default);

		// A descriptor that fails validation is discarded, not recorded.
		match self.validate_var.get(&type_word) {
			Some(None) => {}
			Some(Some(validator)) => validator(state, &var)?,
			None => builtin_validate_variable(&var, Some(state.value_index))?,
		}

		// A dropdown is a select in xstyle clothing.
		if var.r#type == VariableKind::Dropdown {
			var.r#type = VariableKind::Select;
		}
		metadata.vars.insert(var.name.clone(), var);
		Ok(())
	}

	/// Re-validate a variable descriptor detached from any source text,
	/// checking its current value when set and its declared default
	/// otherwise. Registered type validators apply; errors carry no byte
	/// offset.
	pub fn validate_var(&self, var: &Variable) -> MetaResult<()> {
		match self.validate_var.get(var.r#type.as_str()) {
			Some(None) => Ok(()),
			Some(Some(validator)) => {
				let state = ParseState::new("");
				validator(&state, var)
			}
			None => builtin_validate_variable(var, None),
		}
	}

	fn suggest(&self, key: &str) -> Option<String> {
		let max = key.chars().count().checked_ilog2().unwrap_or(0) as usize;
		KNOWN_KEYS
			.iter()
			.copied()
			.chain(self.parse_key.keys().map(String::as_str))
			.find(|candidate| within_edit_distance(key, candidate, max))
			.map(ToString::to_string)
	}
}

fn builtin_validate_field(state: &ParseState<'_>, key: &str, value: &mut Value) -> MetaResult<()> {
	if key == "version" {
		if let Some(version) = value.as_str() {
			if !is_valid_version(version) {
				return Err(ParseError::new(
					ErrorKind::InvalidVersion(version.to_string()),
					state.value_index,
				));
			}
			let normalized = normalize_version(version);
			if normalized.len() != version.len() {
				*value = Value::String(normalized.to_string());
			}
		}
	} else if key.to_ascii_lowercase().ends_with("url") {
		if let Some(raw) = value.as_str() {
			let url = Url::parse(raw).map_err(|error| {
				ParseError::new(
					ErrorKind::InvalidUrl {
						value: raw.to_string(),
						reason: error.to_string(),
					},
					state.value_index,
				)
			})?;
			if !matches!(url.scheme(), "http" | "https") {
				return Err(ParseError::new(
					ErrorKind::InvalidUrlProtocol(format!("{}:", url.scheme())),
					state.value_index,
				));
			}
		}
	}
	Ok(())
}

fn builtin_validate_variable(var: &Variable, index: Option<usize>) -> MetaResult<()> {
	let err = |kind: ErrorKind| match index {
		Some(index) => ParseError::new(kind, index),
		None => ParseError::without_index(kind),
	};
	let null = Value::Null;
	let value = var.value.as_ref().or(var.default.as_ref()).unwrap_or(&null);

	match &var.r#type {
		VariableKind::Checkbox => {
			let valid = match value {
				Value::String(s) => s == "0" || s == "1",
				Value::Number(n) => n.as_f64() == Some(0.0) || n.as_f64() == Some(1.0),
				_ => false,
			};
			if !valid {
				return Err(err(ErrorKind::InvalidCheckboxDefault));
			}
		}
		VariableKind::Select | VariableKind::Dropdown => match value {
			Value::Null => {}
			Value::String(name) => {
				if !var.option_names().any(|candidate| candidate == name) {
					return Err(err(ErrorKind::InvalidSelectDefault(name.clone())));
				}
			}
			other => return Err(err(ErrorKind::InvalidSelectDefault(other.to_string()))),
		},
		VariableKind::Number | VariableKind::Range => {
			let default = match value {
				Value::Null => None,
				Value::Number(n) => n.as_f64(),
				_ => return Err(err(ErrorKind::InvalidRangeDefault)),
			};
			if let Some(default) = default {
				if var.min.is_some_and(|min| default < min) {
					return Err(err(ErrorKind::InvalidRangeMin));
				}
				if var.max.is_some_and(|max| default > max) {
					return Err(err(ErrorKind::InvalidRangeMax));
				}
			}
			if let Some(step) = var.step {
				for bound in [default, var.min, var.max].into_iter().flatten() {
					if !is_multiple_of(bound, step) {
						return Err(err(ErrorKind::InvalidRangeStep));
					}
				}
			}
			if let Some(units) = &var.units {
				if !units.is_empty() && !is_range_unit(units) {
					return Err(err(ErrorKind::InvalidRangeUnits(units.clone())));
				}
			}
		}
		_ => {}
	}
	Ok(())
}

fn parse_select_value(state: &mut ParseState<'_>) -> MetaResult<Value> {
	let pos = state.last_index;
	let json = state.parse_json()?;

	let mut options = Vec::new();
	let mut marked = Vec::new();
	match json {
		Value::Array(items) => {
			for item in items {
				let Value::String(label) = item else {
					return Err(ParseError::new(ErrorKind::InvalidSelectValue, pos));
				};
				let (option, is_default) = create_option(label, None);
				options.push(option);
				marked.push(is_default);
			}
		}
		Value::Object(entries) => {
			for (label, value) in entries {
				let (option, is_default) = create_option(label, Some(value));
				options.push(option);
				marked.push(is_default);
			}
		}
		_ => return Err(ParseError::new(ErrorKind::InvalidSelectValue, pos)),
	}

	if options.is_empty() {
		return Err(ParseError::new(ErrorKind::InvalidSelectEmptyOptions, pos));
	}
	let mut seen: HashSet<&str> = HashSet::new();
	for option in &options {
		if !seen.insert(option.name.as_str()) {
			return Err(ParseError::new(
				ErrorKind::InvalidSelectNameDuplicated(option.name.clone()),
				pos,
			));
		}
	}

	let mut default: Option<String> = None;
	for (option, is_default) in options.iter().zip(&marked) {
		if *is_default {
			if default.is_some() {
				return Err(ParseError::without_index(ErrorKind::InvalidSelectMultipleDefaults));
			}
			default = Some(option.name.clone());
		}
	}
	let default = default
		.or_else(|| options.first().map(|option| option.name.clone()))
		.unwrap_or_default();

	state.var_mut().options = Some(options);
	Ok(Value::String(default))
}

/// Build one select option from its `name:label` key, with a trailing `*`
/// marking the default. A missing name falls back to the label; a missing or
/// falsy value falls back to the name.
fn create_option(label: String, value: Option<Value>) -> (VariableOption, bool) {
	let mut label = label;
	let mut is_default = false;
	if let Some(stripped) = label.strip_suffix('*') {
		is_default = true;
		label = stripped.to_string();
	}
	let (name, label) = match RX_NAMED_OPTION.captures(&label) {
		Some(caps) => (caps[1].to_string(), caps[2].to_string()),
		None => (label.clone(), label),
	};
	let value = match value {
		Some(value) if !is_falsy(&value) => value,
		_ => Value::String(name.clone()),
	};
	(VariableOption { name, label, value }, is_default)
}

fn is_falsy(value: &Value) -> bool {
	match value {
		Value::Null => true,
		Value::Bool(b) => !b,
		Value::Number(n) => n.as_f64() == Some(0.0),
		Value::String(s) => s.is_empty(),
		_ => false,
	}
}

fn parse_xstyle_value(state: &mut ParseState<'_>, is_dropdown: bool) -> MetaResult<Value> {
	let pos = state.last_index;
	if state.peek() != Some('{') {
		return Err(ParseError::new(ErrorKind::MissingChar(vec!['{']), pos));
	}
	state.last_index += 1;

	let mut options = Vec::new();
	loop {
		state.eat_whitespace();
		match state.peek() {
			Some('}') => break,
			None => {
				return Err(ParseError::new(ErrorKind::MissingChar(vec!['}']), state.last_index));
			}
			Some(_) => {}
		}
		let name = state.parse_string_unquoted();
		let label = state.parse_string(false)?;
		let value = if is_dropdown {
			state.parse_eot()?
		} else {
			state.parse_string(false)?
		};
		options.push(VariableOption::new(name, label, value));
	}
	state.last_index += 1;
	state.eat_whitespace();

	if options.is_empty() {
		return Err(ParseError::new(ErrorKind::InvalidSelectEmptyOptions, pos));
	}
	let default = options.first().map(|option| option.name.clone()).unwrap_or_default();
	state.var_mut().options = Some(options);
	Ok(Value::String(default))
}

fn parse_range_value(state: &mut ParseState<'_>) -> MetaResult<Value> {
	let pos = state.last_index;
	let json = state.parse_json()?;
	let Value::Array(items) = json else {
		// A bare number (or anything else, left for validation to reject).
		return Ok(json);
	};

	let mut default = Value::Null;
	let mut slot = 0;
	for item in items {
		match item {
			Value::String(unit) => {
				if state.var_mut().units.is_some() {
					return Err(ParseError::new(ErrorKind::InvalidRangeMultipleUnits, pos));
				}
				state.var_mut().units = Some(unit);
			}
			Value::Number(_) | Value::Null => {
				match slot {
					0 => default = item,
					1 => state.var_mut().min = item.as_f64(),
					2 => state.var_mut().max = item.as_f64(),
					3 => state.var_mut().step = item.as_f64(),
					_ => {
						return Err(ParseError::new(ErrorKind::InvalidRangeTooManyValues, pos));
					}
				}
				slot += 1;
			}
			_ => return Err(ParseError::new(ErrorKind::InvalidRangeValue, pos)),
		}
	}
	Ok(default)
}

/// Check whether `value` divides evenly by `step`, tolerating the float noise
/// a decimal step produces. The tolerance keeps 15 significant digits of the
/// quotient.
pub fn is_multiple_of(value: f64, step: f64) -> bool {
	let quotient = value / step;
	if quotient.fract() == 0.0 {
		return true;
	}
	let magnitude = quotient.abs().log10().floor() as i32;
	let tolerance = 10_f64.powi(magnitude - 14);
	(quotient - quotient.round()).abs() < tolerance
}
