use std::fmt;

use miette::Diagnostic;
use thiserror::Error;

/// The failure cause of a [`ParseError`].
///
/// Each kind maps to a stable machine-readable code string (see
/// [`ErrorKind::code`]) that survives message rewording, so callers can
/// branch on `code()` instead of matching display text.
#[derive(Debug, Clone, PartialEq, Diagnostic, Error)]
#[non_exhaustive]
pub enum ErrorKind {
	#[error("unexpected end of input")]
	#[diagnostic(code(umeta::eof))]
	Eof,

	#[error("missing character: {}", join_quoted(.0.iter()))]
	#[diagnostic(code(umeta::missing_char))]
	MissingChar(Vec<char>),

	#[error("metadata includes invalid character: {0:?}")]
	#[diagnostic(
		code(umeta::invalid_character),
		help("metadata must use line-feed-only newlines")
	)]
	InvalidCharacter(char),

	#[error("invalid word")]
	#[diagnostic(code(umeta::invalid_word))]
	InvalidWord,

	#[error("invalid string")]
	#[diagnostic(code(umeta::invalid_string))]
	InvalidString,

	#[error("invalid number")]
	#[diagnostic(code(umeta::invalid_number))]
	InvalidNumber,

	#[error("missing EOT")]
	#[diagnostic(
		code(umeta::missing_eot),
		help("close the heredoc with `EOT;`")
	)]
	MissingEot,

	#[error("missing value")]
	#[diagnostic(code(umeta::missing_value))]
	MissingValue,

	#[error("unknown literal '{0}'")]
	#[diagnostic(code(umeta::unknown_json_literal))]
	UnknownJsonLiteral(String),

	#[error("{}", unknown_meta_message(.key, .suggestion.as_deref()))]
	#[diagnostic(code(umeta::unknown_meta))]
	UnknownMeta {
		key: String,
		suggestion: Option<String>,
	},

	#[error("missing metadata: {}", join_keys(.0.iter()))]
	#[diagnostic(code(umeta::missing_mandatory))]
	MissingMandatory(Vec<String>),

	#[error("invalid version: {0}")]
	#[diagnostic(code(umeta::invalid_version))]
	InvalidVersion(String),

	#[error("invalid URL: {reason}")]
	#[diagnostic(code(umeta::invalid_url))]
	InvalidUrl { value: String, reason: String },

	#[error("invalid protocol: {0}")]
	#[diagnostic(
		code(umeta::invalid_url_protocol),
		help("only http and https URLs are accepted")
	)]
	InvalidUrlProtocol(String),

	#[error("unknown @var type: {0}")]
	#[diagnostic(code(umeta::unknown_var_type))]
	UnknownVarType(String),

	#[error("value must be 0 or 1")]
	#[diagnostic(code(umeta::invalid_checkbox_default))]
	InvalidCheckboxDefault,

	#[error("option list is empty")]
	#[diagnostic(code(umeta::invalid_select_empty_options))]
	InvalidSelectEmptyOptions,

	#[error("duplicate option name: {0}")]
	#[diagnostic(code(umeta::invalid_select_name_duplicated))]
	InvalidSelectNameDuplicated(String),

	#[error("multiple options are marked as the default")]
	#[diagnostic(code(umeta::invalid_select_multiple_defaults))]
	InvalidSelectMultipleDefaults,

	#[error("select option must be a string")]
	#[diagnostic(code(umeta::invalid_select_value))]
	InvalidSelectValue,

	#[error("value '{0}' does not exist in the option list")]
	#[diagnostic(code(umeta::invalid_select_default))]
	InvalidSelectDefault(String),

	#[error("default must be a number")]
	#[diagnostic(code(umeta::invalid_range_default))]
	InvalidRangeDefault,

	#[error("default must not be less than min")]
	#[diagnostic(code(umeta::invalid_range_min))]
	InvalidRangeMin,

	#[error("default must not be greater than max")]
	#[diagnostic(code(umeta::invalid_range_max))]
	InvalidRangeMax,

	#[error("value is not a multiple of step")]
	#[diagnostic(code(umeta::invalid_range_step))]
	InvalidRangeStep,

	#[error("unknown unit: {0}")]
	#[diagnostic(code(umeta::invalid_range_units))]
	InvalidRangeUnits(String),

	#[error("invalid value in the range array")]
	#[diagnostic(code(umeta::invalid_range_value))]
	InvalidRangeValue,

	#[error("too many values in the range array")]
	#[diagnostic(code(umeta::invalid_range_too_many_values))]
	InvalidRangeTooManyValues,

	#[error("multiple units in the range array")]
	#[diagnostic(code(umeta::invalid_range_multiple_units))]
	InvalidRangeMultipleUnits,

	/// Carrier for errors raised by user-supplied resolvers.
	#[error("{message}")]
	#[diagnostic(code(umeta::custom))]
	Custom { code: String, message: String },
}

impl ErrorKind {
	/// The stable machine-readable code for this kind, matching the codes
	/// produced by the original UserCSS metadata tooling.
	pub fn code(&self) -> &str {
		match self {
			Self::Eof => "EOF",
			Self::MissingChar(_) => "missingChar",
			Self::InvalidCharacter(_) => "invalidCharacter",
			Self::InvalidWord => "invalidWord",
			Self::InvalidString => "invalidString",
			Self::InvalidNumber => "invalidNumber",
			Self::MissingEot => "missingEOT",
			Self::MissingValue => "missingValue",
			Self::UnknownJsonLiteral(_) => "unknownJSONLiteral",
			Self::UnknownMeta { .. } => "unknownMeta",
			Self::MissingMandatory(_) => "missingMandatory",
			Self::InvalidVersion(_) => "invalidVersion",
			Self::InvalidUrl { .. } => "invalidURL",
			Self::InvalidUrlProtocol(_) => "invalidURLProtocol",
			Self::UnknownVarType(_) => "unknownVarType",
			Self::InvalidCheckboxDefault => "invalidCheckboxDefault",
			Self::InvalidSelectEmptyOptions => "invalidSelectEmptyOptions",
			Self::InvalidSelectNameDuplicated(_) => "invalidSelectNameDuplicated",
			Self::InvalidSelectMultipleDefaults => "invalidSelectMultipleDefaults",
			Self::InvalidSelectValue => "invalidSelectValue",
			Self::InvalidSelectDefault(_) => "invalidSelectDefault",
			Self::InvalidRangeDefault => "invalidRangeDefault",
			Self::InvalidRangeMin => "invalidRangeMin",
			Self::InvalidRangeMax => "invalidRangeMax",
			Self::InvalidRangeStep => "invalidRangeStep",
			Self::InvalidRangeUnits(_) => "invalidRangeUnits",
			Self::InvalidRangeValue => "invalidRangeValue",
			Self::InvalidRangeTooManyValues => "invalidRangeTooManyValues",
			Self::InvalidRangeMultipleUnits => "invalidRangeMultipleUnits",
			Self::Custom { code, .. } => code,
		}
	}

	/// The offending token(s), when the kind carries any.
	pub fn args(&self) -> Vec<String> {
		match self {
			Self::MissingChar(chars) => chars.iter().map(ToString::to_string).collect(),
			Self::UnknownJsonLiteral(word) => vec![word.clone()],
			Self::UnknownMeta { key, suggestion } => {
				let mut args = vec![key.clone()];
				args.extend(suggestion.clone());
				args
			}
			Self::MissingMandatory(keys) => keys.clone(),
			Self::InvalidVersion(version) => vec![version.clone()],
			Self::InvalidUrl { value, .. } => vec![value.clone()],
			Self::InvalidUrlProtocol(protocol) => vec![protocol.clone()],
			Self::UnknownVarType(name) => vec![name.clone()],
			Self::InvalidSelectNameDuplicated(name) | Self::InvalidSelectDefault(name) => {
				vec![name.clone()]
			}
			Self::InvalidRangeUnits(unit) => vec![unit.clone()],
			_ => vec![],
		}
	}
}

fn join_quoted<'a>(chars: impl Iterator<Item = &'a char>) -> String {
	chars
		.map(|c| format!("'{c}'"))
		.collect::<Vec<_>>()
		.join(", ")
}

fn join_keys<'a>(keys: impl Iterator<Item = &'a String>) -> String {
	keys.map(|k| format!("@{k}")).collect::<Vec<_>>().join(", ")
}

fn unknown_meta_message(key: &str, suggestion: Option<&str>) -> String {
	match suggestion {
		Some(suggestion) => format!("unknown metadata: @{key}, did you mean @{suggestion}"),
		None => format!("unknown metadata: @{key}"),
	}
}

/// A structured parse or validation failure.
///
/// `index` is a byte offset into the parsed source text pinpointing the
/// failure. It is `None` only for structural pre-checks that have no single
/// offset: the carriage-return check, the aggregated mandatory-key check,
/// and the multiple-default-marker check.
#[derive(Debug, Clone, PartialEq, Error)]
#[error("{kind}")]
pub struct ParseError {
	pub kind: ErrorKind,
	pub index: Option<usize>,
}

impl ParseError {
	pub fn new(kind: ErrorKind, index: usize) -> Self {
		Self {
			kind,
			index: Some(index),
		}
	}

	pub fn without_index(kind: ErrorKind) -> Self {
		Self { kind, index: None }
	}

	/// Stable machine-readable discriminator, e.g. `"invalidWord"`.
	pub fn code(&self) -> &str {
		self.kind.code()
	}

	/// The offending token(s), when present.
	pub fn args(&self) -> Vec<String> {
		self.kind.args()
	}
}

impl Diagnostic for ParseError {
	fn code(&self) -> Option<Box<dyn fmt::Display + '_>> {
		Diagnostic::code(&self.kind)
	}

	fn help(&self) -> Option<Box<dyn fmt::Display + '_>> {
		Diagnostic::help(&self.kind)
	}
}

pub type MetaResult<T> = Result<T, ParseError>;
