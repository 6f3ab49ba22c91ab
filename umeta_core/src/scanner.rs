//! Position-tracked lexical primitives for the metadata sub-language.
//!
//! All scanners operate on a [`ParseState`] cursor and advance it in place:
//! `index` records the start of the last matched span, `last_index` is left
//! one past the consumed span (after the primitive's whitespace skip). All
//! offsets are byte offsets into the source text.

use once_cell::sync::Lazy;
use regex::Regex;
use serde_json::Value;

use crate::error::ErrorKind;
use crate::error::MetaResult;
use crate::error::ParseError;
use crate::metadata::Variable;

static RX_WORD: Lazy<Regex> = Lazy::new(|| Regex::new(r"^[\w-]+").expect("static pattern"));
static RX_BARE_STRING: Lazy<Regex> = Lazy::new(|| Regex::new(r"^\w+").expect("static pattern"));
static RX_NUMBER: Lazy<Regex> =
	Lazy::new(|| Regex::new(r"^-?(\d+(\.\d+)?|\.\d+)([eE]-?\d+)?").expect("static pattern"));
static RX_EOT: Lazy<Regex> = Lazy::new(|| Regex::new(r"(?s)^<<<EOT(.+?)EOT;").expect("static pattern"));
static RX_VERSION: Lazy<Regex> = Lazy::new(|| {
	// Relaxed semver: dot-separated digits (1, 1.2, 1.2.3.4.5), an optional
	// `-prerelease` chunk, and an optional `+build` chunk.
	Regex::new(r"^v?\d+(\.\d+)*(-\w[\w-]*(\.[\w-]+)*)?(\+\w[\w-]*(\.[\w-]+)*)?$")
		.expect("static pattern")
});

/// Transient cursor state for a single parse pass.
///
/// Custom key and variable resolvers receive a `&mut ParseState` and use the
/// scanning methods below to consume their value, leaving the cursor at the
/// start of the next declaration's text.
#[derive(Debug)]
pub struct ParseState<'s> {
	text: &'s str,
	/// Byte offset of the start of the last matched span.
	pub index: usize,
	/// The cursor: one past the last consumed span.
	pub last_index: usize,
	/// Byte offset where the current declaration's value begins.
	pub value_index: usize,
	/// The declaration key currently being parsed (without the `@`).
	pub key: String,
	pub(crate) var: Option<Variable>,
}

impl<'s> ParseState<'s> {
	pub fn new(text: &'s str) -> Self {
		Self {
			text,
			index: 0,
			last_index: 0,
			value_index: 0,
			key: String::new(),
			var: None,
		}
	}

	/// The full source text being parsed.
	pub fn text(&self) -> &'s str {
		self.text
	}

	/// The variable descriptor under construction for the current
	/// `@var`/`@advanced` declaration. Custom variable resolvers can fill in
	/// `options` or numeric bounds here; the returned default value is
	/// stored by the caller.
	pub fn var_mut(&mut self) -> &mut Variable {
		self.var.get_or_insert_with(Variable::default)
	}

	fn byte_at(&self, at: usize) -> Option<u8> {
		self.text.as_bytes().get(at).copied()
	}

	fn bump(&mut self, n: usize) {
		self.last_index += n;
	}

	fn rest(&self) -> &'s str {
		self.text.get(self.last_index..).unwrap_or_default()
	}

	/// Look at the next character without consuming it.
	pub fn peek(&self) -> Option<char> {
		self.rest().chars().next()
	}

	/// Skip any whitespace, including newlines.
	pub fn eat_whitespace(&mut self) {
		let rest = self.rest();
		self.last_index += rest.len() - rest.trim_start().len();
	}

	/// Skip whitespace on the current line only.
	pub fn eat_same_line_whitespace(&mut self) {
		for c in self.rest().chars() {
			if !c.is_whitespace() || c == '\n' {
				break;
			}
			self.last_index += c.len_utf8();
		}
	}

	/// Consume exactly one character.
	pub fn parse_char(&mut self) -> MetaResult<char> {
		let Some(c) = self.rest().chars().next() else {
			return Err(ParseError::new(ErrorKind::Eof, self.last_index));
		};
		self.index = self.last_index;
		self.bump(c.len_utf8());
		self.eat_whitespace();
		Ok(c)
	}

	/// Match `[\w-]+` at the cursor.
	pub fn parse_word(&mut self) -> MetaResult<&'s str> {
		let pos = self.last_index;
		let Some(found) = RX_WORD.find(self.rest()) else {
			return Err(ParseError::new(ErrorKind::InvalidWord, pos));
		};
		let word = &self.text[pos..pos + found.end()];
		self.index = pos;
		self.last_index = pos + found.end();
		self.eat_whitespace();
		Ok(word)
	}

	/// Match a number with optional sign, fraction, and exponent.
	pub fn parse_number(&mut self) -> MetaResult<f64> {
		let pos = self.last_index;
		let Some(found) = RX_NUMBER.find(self.rest()) else {
			return Err(ParseError::new(ErrorKind::InvalidNumber, pos));
		};
		let number: f64 = found
			.as_str()
			.parse()
			.map_err(|_| ParseError::new(ErrorKind::InvalidNumber, pos))?;
		if !number.is_finite() {
			return Err(ParseError::new(ErrorKind::InvalidNumber, pos));
		}
		self.index = pos;
		self.last_index = pos + found.end();
		self.eat_whitespace();
		Ok(number)
	}

	/// Match a quoted (`'`/`"`), backtick-multiline, or bare-word string and
	/// unescape it. Quoted strings follow JSON escape rules for their own
	/// quote character.
	///
	/// With `same_line` the trailing whitespace skip stops at the end of the
	/// line, which keeps a variable's default value on the label's line.
	pub fn parse_string(&mut self, same_line: bool) -> MetaResult<String> {
		let pos = self.last_index;
		let bytes = self.text.as_bytes();
		let value = match bytes.get(pos) {
			Some(&quote @ (b'"' | b'\'' | b'`')) => {
				let allow_newline = quote == b'`';
				let Some(end) = scan_to_quote(bytes, pos + 1, quote, allow_newline) else {
					return Err(ParseError::new(ErrorKind::InvalidString, pos));
				};
				self.last_index = end + 1;
				unquote(&self.text[pos..=end])
			}
			Some(_) => {
				let Some(found) = RX_BARE_STRING.find(self.rest()) else {
					return Err(ParseError::new(ErrorKind::InvalidString, pos));
				};
				self.last_index = pos + found.end();
				unquote(&self.text[pos..pos + found.end()])
			}
			None => return Err(ParseError::new(ErrorKind::InvalidString, pos)),
		};
		self.index = pos;
		if same_line {
			self.eat_same_line_whitespace();
		} else {
			self.eat_whitespace();
		}
		Ok(value)
	}

	/// Read up to the next `"` or end of line, collapsing whitespace runs to
	/// `-`. Never fails; an empty span yields an empty string.
	pub fn parse_string_unquoted(&mut self) -> String {
		let pos = self.last_index;
		let stop = self.rest().find(['"', '\n']).map_or(self.text.len(), |i| pos + i);
		self.index = pos;
		self.last_index = stop;
		self.text[pos..stop].split_whitespace().collect::<Vec<_>>().join("-")
	}

	/// Read to end of line, trim, and unquote.
	pub fn parse_string_to_end(&mut self) -> MetaResult<String> {
		let pos = self.last_index;
		let eol = self.rest().find('\n').map_or(self.text.len(), |i| pos + i);
		let trimmed = self.text[pos..eol].trim();
		if trimmed.is_empty() {
			return Err(ParseError::new(ErrorKind::MissingValue, eol));
		}
		self.index = pos;
		self.last_index = eol;
		Ok(unquote(trimmed))
	}

	/// Capture a `<<<EOT ... EOT;` heredoc verbatim (trimmed).
	pub fn parse_eot(&mut self) -> MetaResult<String> {
		let pos = self.last_index;
		let Some(caps) = RX_EOT.captures(self.rest()) else {
			return Err(ParseError::new(ErrorKind::MissingEot, pos));
		};
		let (Some(whole), Some(inner)) = (caps.get(0), caps.get(1)) else {
			return Err(ParseError::new(ErrorKind::MissingEot, pos));
		};
		let value = unescape_comment(inner.as_str().trim());
		self.index = pos;
		self.last_index = pos + whole.end();
		self.eat_whitespace();
		Ok(value)
	}

	/// Parse a constrained JSON literal: object, array, quoted/backtick
	/// string, number, or `true`/`false`/`null`.
	pub fn parse_json(&mut self) -> MetaResult<Value> {
		let pos = self.last_index;
		let value = self.parse_json_value()?;
		self.index = pos;
		Ok(value)
	}

	fn parse_json_value(&mut self) -> MetaResult<Value> {
		match self.byte_at(self.last_index) {
			Some(b'{') => {
				let mut object = serde_json::Map::new();
				self.bump(1);
				self.eat_whitespace();
				while self.byte_at(self.last_index) != Some(b'}') {
					let key = self.parse_string(false)?;
					if self.byte_at(self.last_index) != Some(b':') {
						return Err(ParseError::new(
							ErrorKind::MissingChar(vec![':']),
							self.last_index,
						));
					}
					self.bump(1);
					self.eat_whitespace();
					let value = self.parse_json_value()?;
					object.insert(key, value);
					if self.byte_at(self.last_index) == Some(b',') {
						self.bump(1);
						self.eat_whitespace();
					} else if self.byte_at(self.last_index) != Some(b'}') {
						return Err(ParseError::new(
							ErrorKind::MissingChar(vec![',', '}']),
							self.last_index,
						));
					}
				}
				self.bump(1);
				self.eat_whitespace();
				Ok(Value::Object(object))
			}
			Some(b'[') => {
				let mut array = Vec::new();
				self.bump(1);
				self.eat_whitespace();
				while self.byte_at(self.last_index) != Some(b']') {
					array.push(self.parse_json_value()?);
					if self.byte_at(self.last_index) == Some(b',') {
						self.bump(1);
						self.eat_whitespace();
					} else if self.byte_at(self.last_index) != Some(b']') {
						return Err(ParseError::new(
							ErrorKind::MissingChar(vec![',', ']']),
							self.last_index,
						));
					}
				}
				self.bump(1);
				self.eat_whitespace();
				Ok(Value::Array(array))
			}
			Some(b'"' | b'\'' | b'`') => Ok(Value::String(self.parse_string(false)?)),
			Some(b) if b == b'-' || b == b'.' || b.is_ascii_digit() => {
				Ok(number_value(self.parse_number()?))
			}
			_ => {
				let word = self.parse_word()?;
				match word {
					"true" => Ok(Value::Bool(true)),
					"false" => Ok(Value::Bool(false)),
					"null" => Ok(Value::Null),
					_ => Err(ParseError::new(
						ErrorKind::UnknownJsonLiteral(word.to_string()),
						self.index,
					)),
				}
			}
		}
	}
}

/// Find the closing quote, honoring `\<quote>` and `\\` escape pairs (a
/// doubled backslash must not hide the quote after it). Returns the byte
/// index of the closing quote.
fn scan_to_quote(bytes: &[u8], mut at: usize, quote: u8, allow_newline: bool) -> Option<usize> {
	while at < bytes.len() {
		let byte = bytes[at];
		if byte == b'\\' && matches!(bytes.get(at + 1), Some(&next) if next == quote || next == b'\\') {
			at += 2;
		} else if byte == quote {
			return Some(at);
		} else if byte == b'\n' && !allow_newline {
			return None;
		} else {
			at += 1;
		}
	}
	None
}

/// Convert a parsed number into a JSON value, preserving integer formatting
/// for integral values in `i64` range.
pub(crate) fn number_value(number: f64) -> Value {
	if number.fract() == 0.0 && number >= i64::MIN as f64 && number <= i64::MAX as f64 {
		Value::from(number as i64)
	} else {
		serde_json::Number::from_f64(number).map_or(Value::Null, Value::Number)
	}
}

/// Strip matching quotes and apply JSON string-escape rules. Unquoted input
/// only gets the comment-terminator unescape (`*\/` → `*/`).
pub fn unquote(s: &str) -> String {
	let bytes = s.as_bytes();
	if s.len() >= 2 {
		let quote = bytes[0];
		if (quote == b'"' || quote == b'\'' || quote == b'`') && bytes[s.len() - 1] == quote {
			return unescape_quoted(&s[1..s.len() - 1], quote as char);
		}
	}
	unescape_comment(s)
}

/// Undo the comment-terminator escape applied by the stringifier.
pub fn unescape_comment(s: &str) -> String {
	s.replace("*\\/", "*/")
}

fn unescape_quoted(inner: &str, quote: char) -> String {
	let chars: Vec<char> = inner.chars().collect();
	let mut out = String::with_capacity(inner.len());
	let mut i = 0;
	while i < chars.len() {
		if chars[i] != '\\' {
			out.push(chars[i]);
			i += 1;
			continue;
		}
		let Some(&next) = chars.get(i + 1) else {
			out.push('\\');
			i += 1;
			continue;
		};
		match next {
			'\\' | '/' => {
				out.push(next);
				i += 2;
			}
			c if c == quote => {
				out.push(quote);
				i += 2;
			}
			'b' => {
				out.push('\u{0008}');
				i += 2;
			}
			'f' => {
				out.push('\u{000c}');
				i += 2;
			}
			'n' => {
				out.push('\n');
				i += 2;
			}
			'r' => {
				out.push('\r');
				i += 2;
			}
			't' => {
				out.push('\t');
				i += 2;
			}
			'u' => match hex4(&chars, i + 2) {
				Some(unit) => {
					i += 6;
					if (0xd800..0xdc00).contains(&unit) {
						// A high surrogate must pair with a following \uDC00-\uDFFF.
						let low = (chars.get(i) == Some(&'\\') && chars.get(i + 1) == Some(&'u'))
							.then(|| hex4(&chars, i + 2))
							.flatten()
							.filter(|low| (0xdc00..0xe000).contains(low));
						if let Some(low) = low {
							let combined = 0x10000
								+ ((u32::from(unit) - 0xd800) << 10)
								+ (u32::from(low) - 0xdc00);
							out.push(char::from_u32(combined).unwrap_or(char::REPLACEMENT_CHARACTER));
							i += 6;
						} else {
							out.push(char::REPLACEMENT_CHARACTER);
						}
					} else {
						out.push(char::from_u32(u32::from(unit)).unwrap_or(char::REPLACEMENT_CHARACTER));
					}
				}
				// Incomplete escape: leave it untouched.
				None => {
					out.push('\\');
					i += 1;
				}
			},
			_ => {
				out.push('\\');
				i += 1;
			}
		}
	}
	out
}

fn hex4(chars: &[char], at: usize) -> Option<u16> {
	let digits = chars.get(at..at + 4)?;
	let mut unit: u16 = 0;
	for c in digits {
		unit = unit.checked_mul(16)?.checked_add(c.to_digit(16)? as u16)?;
	}
	Some(unit)
}

/// Check a version string against the relaxed semver grammar.
pub(crate) fn is_valid_version(version: &str) -> bool {
	RX_VERSION.is_match(version)
}

/// Strip the optional leading `v`/`=` from a version string.
pub(crate) fn normalize_version(version: &str) -> &str {
	version.strip_prefix(['v', '=']).unwrap_or(version)
}
