use logos::Logos;
use snailquote::unescape;

use crate::Point;
use crate::Position;
use crate::TbdocError;
use crate::TbdocResult;
use crate::tokens::SpannedToken;
use crate::tokens::Token;
use crate::tokens::TokenGroup;

/// Raw tokens produced by logos for flat tokenization of tag source.
#[derive(Logos, Debug, PartialEq)]
enum RawToken {
	#[token("{%")]
	TagOpen,
	#[token("%}")]
	TagClose,
	#[token("/%}")]
	SelfClose,
	#[token("/")]
	Slash,
	#[token("=")]
	Equals,
	#[token("\n")]
	Newline,
	#[regex(r"[ \t\r]")]
	Whitespace,
	#[regex(r"[a-zA-Z_][a-zA-Z0-9_-]*")]
	Ident,
	#[regex(r#""([^"\\]|\\.)*""#)]
	DoubleQuotedString,
	#[regex(r"'[^']*'")]
	SingleQuotedString,
	#[regex(r"-?[0-9]+(\.[0-9]+)?([eE][+-]?[0-9]+)?")]
	Number,
}

/// Where the walker is relative to the tag delimiters.
enum LexerContext {
	/// Before `{%`. Only whitespace is allowed here.
	Outside,
	/// Between `{%` and the closing delimiter.
	Tag,
}

/// A piece of a line that holds tags: either a whole tag or the text
/// between tags.
#[derive(Debug, Clone, PartialEq)]
#[allow(variant_size_differences)]
pub enum TagLineSegment<'a> {
	Tag(TokenGroup),
	Text { text: &'a str, start: Point },
}

/// Walks the logos token stream of one tag and builds its `TokenGroup`.
struct TokenWalker<'a> {
	/// The source text of the tag (possibly spanning several lines).
	source: &'a str,
	/// The collected raw tokens and their byte spans.
	raw_tokens: Vec<(Result<RawToken, ()>, std::ops::Range<usize>)>,
	/// Current index into `raw_tokens`.
	cursor: usize,
	/// The point of the current raw token in the document.
	point: Point,
	/// Where `{%` was found.
	start: Point,
	tokens: Vec<SpannedToken>,
	context: LexerContext,
}

impl<'a> TokenWalker<'a> {
	fn new(source: &'a str, start: Point) -> Self {
		let raw_tokens: Vec<_> = RawToken::lexer(source).spanned().collect();

		Self {
			source,
			raw_tokens,
			cursor: 0,
			point: start,
			start,
			tokens: vec![],
			context: LexerContext::Outside,
		}
	}

	/// Get the text slice for the current raw token.
	fn current_slice(&self) -> &'a str {
		let (_, span) = &self.raw_tokens[self.cursor];
		&self.source[span.clone()]
	}

	fn advance_cursor(&mut self) {
		let slice = self.current_slice();
		self.point.advance_str(slice);
		self.cursor += 1;
	}

	/// Record a token at the current point, then advance the cursor.
	fn push_token(&mut self, token: Token) {
		self.tokens.push(SpannedToken {
			token,
			start: self.point,
		});
		self.advance_cursor();
	}

	fn error(&self, reason: impl Into<String>) -> TbdocError {
		TbdocError::InvalidTagSyntax {
			reason: reason.into(),
			line: self.point.line,
			column: self.point.column,
		}
	}

	/// Strip the quotes from a string token. Double quoted strings may
	/// contain escapes, single quoted strings are taken literally.
	fn process_string(&mut self, delimiter: u8) -> TbdocResult<()> {
		let slice = self.current_slice();
		let inner = &slice[1..slice.len() - 1];

		let value = if delimiter == b'"' && inner.contains('\\') {
			unescape(slice).map_err(|e| self.error(format!("invalid string escape: {e}")))?
		} else {
			inner.to_string()
		};

		self.push_token(Token::String(value, delimiter));
		Ok(())
	}

	fn process_number(&mut self) -> TbdocResult<()> {
		let slice = self.current_slice();
		let value = slice
			.parse::<f64>()
			.map_err(|_| self.error(format!("invalid number `{slice}`")))?;

		self.push_token(Token::Number(value));
		Ok(())
	}

	/// Walk until the first tag is closed. Returns the tag's token group and
	/// the number of source bytes it consumed.
	fn process(mut self) -> TbdocResult<(TokenGroup, usize)> {
		while self.cursor < self.raw_tokens.len() {
			let (result, _) = &self.raw_tokens[self.cursor];

			let Ok(raw) = result else {
				let slice = self.current_slice();
				return Err(self.error(format!("unexpected character `{slice}`")));
			};

			match self.context {
				LexerContext::Outside => {
					match raw {
						RawToken::Whitespace | RawToken::Newline => self.advance_cursor(),
						RawToken::TagOpen => {
							self.start = self.point;
							self.context = LexerContext::Tag;
							self.push_token(Token::TagOpen);
						}
						_ => return Err(self.error("expected `{%`")),
					}
				}
				LexerContext::Tag => {
					match raw {
						RawToken::TagClose | RawToken::SelfClose => {
							let token = if matches!(raw, RawToken::TagClose) {
								Token::TagClose
							} else {
								Token::SelfClose
							};
							let consumed = self.raw_tokens[self.cursor].1.end;
							self.push_token(token);

							let group = TokenGroup {
								tokens: self.tokens,
								position: Position {
									start: self.start,
									end: self.point,
								},
							};
							return Ok((group, consumed));
						}
						RawToken::Slash => self.push_token(Token::Slash),
						RawToken::Equals => self.push_token(Token::Equals),
						RawToken::Newline => self.push_token(Token::Newline),
						RawToken::Whitespace => {
							let byte = self.current_slice().as_bytes()[0];
							self.push_token(Token::Whitespace(byte));
						}
						RawToken::Ident => {
							let ident = self.current_slice().to_string();
							self.push_token(Token::Ident(ident));
						}
						RawToken::DoubleQuotedString => self.process_string(b'"')?,
						RawToken::SingleQuotedString => self.process_string(b'\'')?,
						RawToken::Number => self.process_number()?,
						RawToken::TagOpen => {
							return Err(self.error("unexpected `{%` inside a tag"));
						}
					}
				}
			}
		}

		Err(TbdocError::UnterminatedTag {
			line: self.start.line,
			column: self.start.column,
		})
	}
}

/// Split a line holding tags, which starts at `start` in the document, into
/// its tags and the text around them. A tag may continue over several lines
/// of `source`.
pub fn tokenize_tag_line(source: &str, start: Point) -> TbdocResult<Vec<TagLineSegment<'_>>> {
	let mut segments = Vec::new();
	let mut offset = 0;
	let mut point = start;

	while offset < source.len() {
		let rest = &source[offset..];
		let Some(open) = rest.find("{%") else {
			segments.push(TagLineSegment::Text { text: rest, start: point });
			break;
		};

		if open > 0 {
			let text = &rest[..open];
			segments.push(TagLineSegment::Text { text, start: point });
			point.advance_str(text);
		}

		let (group, consumed) = TokenWalker::new(&rest[open..], point).process()?;
		point.advance_str(&rest[open..open + consumed]);
		offset += open + consumed;
		segments.push(TagLineSegment::Tag(group));
	}

	Ok(segments)
}
