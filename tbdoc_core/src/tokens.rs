use std::fmt::Display;

use float_cmp::approx_eq;

use crate::Point;
use crate::Position;

/// Tokens found inside a single `{% ... %}` tag.
#[derive(Debug, Clone)]
pub enum Token {
	/// `\n`
	Newline,
	/// `{%`
	TagOpen,
	/// `%}`
	TagClose,
	/// `/%}`
	SelfClose,
	/// `/`
	Slash,
	/// `=`
	Equals,
	/// ` ` | `\t` | `\r`
	Whitespace(u8),
	/// A quoted attribute value with its quote character, e.g. `"orders"`
	String(String, u8),
	/// An identifier, e.g. `datasource` or `delimiter`
	Ident(String),
	/// A numeric attribute value, e.g. `42` or `-1.5`
	Number(f64),
}

impl Eq for Token {}
impl PartialEq for Token {
	fn eq(&self, other: &Self) -> bool {
		match (self, other) {
			(Token::Newline, Token::Newline)
			| (Token::TagOpen, Token::TagOpen)
			| (Token::TagClose, Token::TagClose)
			| (Token::SelfClose, Token::SelfClose)
			| (Token::Slash, Token::Slash)
			| (Token::Equals, Token::Equals) => true,
			(Token::Whitespace(byte), Token::Whitespace(other_byte)) => byte == other_byte,
			(Token::String(value, delimiter), Token::String(other_value, other_delimiter)) => {
				value == other_value && delimiter == other_delimiter
			}
			(Token::Ident(value), Token::Ident(other_value)) => value == other_value,
			(Token::Number(value), Token::Number(other_value)) => {
				approx_eq!(f64, *value, *other_value, ulps = 2)
			}
			_ => false,
		}
	}
}

impl Token {
	/// Whitespace and newlines carry no meaning between tag tokens.
	pub fn is_trivia(&self) -> bool {
		matches!(self, Token::Whitespace(_) | Token::Newline)
	}

	/// Short human readable description used in syntax errors.
	pub fn describe(&self) -> String {
		match self {
			Token::Newline => "a newline".to_string(),
			Token::Whitespace(_) => "whitespace".to_string(),
			Token::String(..) => "a string".to_string(),
			Token::Number(_) => "a number".to_string(),
			Token::Ident(ident) => format!("`{ident}`"),
			other => format!("`{other}`"),
		}
	}
}

impl Display for Token {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		match self {
			Token::Newline => writeln!(f),
			Token::Whitespace(byte) => write!(f, "{}", *byte as char),
			Token::TagOpen => write!(f, "{{%"),
			Token::TagClose => write!(f, "%}}"),
			Token::SelfClose => write!(f, "/%}}"),
			Token::Slash => write!(f, "/"),
			Token::Equals => write!(f, "="),
			Token::String(string, ch) => {
				let ch = *ch as char;
				write!(f, "{ch}{string}{ch}")
			}
			Token::Ident(ident) => write!(f, "{ident}"),
			Token::Number(number) => write!(f, "{number}"),
		}
	}
}

/// A token together with the point where it starts in the document.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SpannedToken {
	pub token: Token,
	pub start: Point,
}

/// All tokens of one tag, from `{%` up to and including its closing `%}` or
/// `/%}`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TokenGroup {
	/// The tokens in source order, including whitespace.
	pub tokens: Vec<SpannedToken>,
	/// The span of the whole tag in the document.
	pub position: Position,
}

impl TokenGroup {
	/// Iterate over the meaningful tokens, skipping whitespace and newlines.
	pub fn significant(&self) -> impl Iterator<Item = &SpannedToken> {
		self.tokens.iter().filter(|spanned| !spanned.token.is_trivia())
	}
}
