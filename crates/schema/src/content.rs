//! Content expressions: `"paragraph+"`, `"heading paragraph*"`, `"(text | image)*"`.

use std::collections::BTreeSet;

use rustc_hash::FxHashMap as HashMap;

/// Parsed content expression.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ContentExpr {
	/// One node of the named type or group.
	Name(String),
	/// Expressions matched one after another.
	Seq(Vec<ContentExpr>),
	/// Any one of the alternatives.
	Choice(Vec<ContentExpr>),
	/// `min..=max` repetitions (`max = None` is unbounded).
	Repeat {
		expr: Box<ContentExpr>,
		min: usize,
		max: Option<usize>,
	},
}

#[derive(Debug, Clone, PartialEq, Eq)]
enum Token {
	Name(String),
	Open,
	Close,
	Pipe,
	Star,
	Plus,
	Question,
	Range(usize, Option<usize>),
}

fn tokenize(source: &str) -> Result<Vec<Token>, String> {
	let mut tokens = Vec::new();
	let mut chars = source.chars().peekable();
	while let Some(&c) = chars.peek() {
		match c {
			c if c.is_whitespace() => {
				chars.next();
			}
			'(' | ')' | '|' | '*' | '+' | '?' => {
				chars.next();
				tokens.push(match c {
					'(' => Token::Open,
					')' => Token::Close,
					'|' => Token::Pipe,
					'*' => Token::Star,
					'+' => Token::Plus,
					_ => Token::Question,
				});
			}
			'{' => {
				chars.next();
				let mut body = String::new();
				loop {
					match chars.next() {
						Some('}') => break,
						Some(c) => body.push(c),
						None => return Err("unclosed '{'".into()),
					}
				}
				tokens.push(parse_range(&body)?);
			}
			c if c.is_alphanumeric() || c == '_' || c == '-' => {
				let mut name = String::new();
				while let Some(&c) = chars.peek() {
					if !(c.is_alphanumeric() || c == '_' || c == '-') {
						break;
					}
					name.push(c);
					chars.next();
				}
				tokens.push(Token::Name(name));
			}
			other => return Err(format!("unexpected character {other:?}")),
		}
	}
	Ok(tokens)
}

fn parse_range(body: &str) -> Result<Token, String> {
	let number = |s: &str| {
		s.trim()
			.parse::<usize>()
			.map_err(|_| format!("invalid repeat count {:?}", s.trim()))
	};
	match body.split_once(',') {
		None => {
			let n = number(body)?;
			Ok(Token::Range(n, Some(n)))
		}
		Some((min, max)) if max.trim().is_empty() => Ok(Token::Range(number(min)?, None)),
		Some((min, max)) => {
			let (min, max) = (number(min)?, number(max)?);
			if max < min {
				return Err(format!("repeat range {{{min},{max}}} is empty"));
			}
			Ok(Token::Range(min, Some(max)))
		}
	}
}

struct Parser {
	tokens: Vec<Token>,
	pos: usize,
}

impl Parser {
	fn peek(&self) -> Option<&Token> {
		self.tokens.get(self.pos)
	}

	fn choice(&mut self) -> Result<ContentExpr, String> {
		let mut alternatives = vec![self.seq()?];
		while self.peek() == Some(&Token::Pipe) {
			self.pos += 1;
			alternatives.push(self.seq()?);
		}
		Ok(if alternatives.len() == 1 {
			alternatives.remove(0)
		} else {
			ContentExpr::Choice(alternatives)
		})
	}

	fn seq(&mut self) -> Result<ContentExpr, String> {
		let mut items = Vec::new();
		while matches!(self.peek(), Some(Token::Name(_) | Token::Open)) {
			items.push(self.repeat()?);
		}
		match items.len() {
			0 => Err("expected a type name or '('".into()),
			1 => Ok(items.remove(0)),
			_ => Ok(ContentExpr::Seq(items)),
		}
	}

	fn repeat(&mut self) -> Result<ContentExpr, String> {
		let mut expr = self.atom()?;
		loop {
			let (min, max) = match self.peek() {
				Some(Token::Star) => (0, None),
				Some(Token::Plus) => (1, None),
				Some(Token::Question) => (0, Some(1)),
				Some(Token::Range(min, max)) => (*min, *max),
				_ => return Ok(expr),
			};
			self.pos += 1;
			expr = ContentExpr::Repeat {
				expr: Box::new(expr),
				min,
				max,
			};
		}
	}

	fn atom(&mut self) -> Result<ContentExpr, String> {
		match self.tokens.get(self.pos).cloned() {
			Some(Token::Name(name)) => {
				self.pos += 1;
				Ok(ContentExpr::Name(name))
			}
			Some(Token::Open) => {
				self.pos += 1;
				let inner = self.choice()?;
				if self.peek() != Some(&Token::Close) {
					return Err("expected ')'".into());
				}
				self.pos += 1;
				Ok(inner)
			}
			_ => Err("expected a type name or '('".into()),
		}
	}
}

impl ContentExpr {
	/// Parses an expression. An empty or blank source means no content
	/// and yields `Ok(None)`.
	pub fn parse(source: &str) -> Result<Option<Self>, String> {
		let tokens = tokenize(source)?;
		if tokens.is_empty() {
			return Ok(None);
		}
		let mut parser = Parser { tokens, pos: 0 };
		let expr = parser.choice()?;
		if parser.pos != parser.tokens.len() {
			return Err(format!("unexpected token at {}", parser.pos));
		}
		Ok(Some(expr))
	}

	/// Names referenced by the expression, in first-seen order.
	pub fn names(&self) -> Vec<&str> {
		let mut out = Vec::new();
		self.collect_names(&mut out);
		out
	}

	fn collect_names<'a>(&'a self, out: &mut Vec<&'a str>) {
		match self {
			Self::Name(name) => {
				if !out.contains(&name.as_str()) {
					out.push(name);
				}
			}
			Self::Seq(items) | Self::Choice(items) => {
				items.iter().for_each(|i| i.collect_names(out));
			}
			Self::Repeat { expr, .. } => expr.collect_names(out),
		}
	}

	/// Replaces group names with a choice of their member types.
	///
	/// Returns the first name that is neither a type nor a group.
	pub fn expand_groups(
		self,
		is_type: &dyn Fn(&str) -> bool,
		groups: &HashMap<String, Vec<String>>,
	) -> Result<Self, String> {
		Ok(match self {
			Self::Name(name) if is_type(&name) => Self::Name(name),
			Self::Name(name) => match groups.get(&name) {
				Some(members) if members.len() == 1 => Self::Name(members[0].clone()),
				Some(members) => Self::Choice(members.iter().cloned().map(Self::Name).collect()),
				None => return Err(name),
			},
			Self::Seq(items) => Self::Seq(
				items
					.into_iter()
					.map(|i| i.expand_groups(is_type, groups))
					.collect::<Result<_, _>>()?,
			),
			Self::Choice(items) => Self::Choice(
				items
					.into_iter()
					.map(|i| i.expand_groups(is_type, groups))
					.collect::<Result<_, _>>()?,
			),
			Self::Repeat { expr, min, max } => Self::Repeat {
				expr: Box::new(expr.expand_groups(is_type, groups)?),
				min,
				max,
			},
		})
	}

	/// Returns true if the whole sequence of child type names matches.
	pub fn matches(&self, children: &[&str]) -> bool {
		self.ends(children, 0).contains(&children.len())
	}

	/// Positions where a match starting at `start` can end.
	fn ends(&self, children: &[&str], start: usize) -> BTreeSet<usize> {
		match self {
			Self::Name(name) => children
				.get(start)
				.filter(|child| **child == name)
				.map(|_| start + 1)
				.into_iter()
				.collect(),
			Self::Seq(items) => items.iter().fold(BTreeSet::from([start]), |positions, item| {
				positions
					.into_iter()
					.flat_map(|p| item.ends(children, p))
					.collect()
			}),
			Self::Choice(items) => items.iter().flat_map(|i| i.ends(children, start)).collect(),
			Self::Repeat { expr, min, max } => {
				let mut results = BTreeSet::new();
				if *min == 0 {
					results.insert(start);
				}
				// Each round either strictly advances every position or keeps
				// the previous ones, so the frontier empties or settles within
				// `children.len() + 1` rounds whatever the counts.
				let limit = max.unwrap_or(usize::MAX);
				let mut frontier = BTreeSet::from([start]);
				let mut count = 0;
				while count < limit {
					count += 1;
					let next: BTreeSet<usize> = frontier
						.iter()
						.flat_map(|&p| expr.ends(children, p))
						.collect();
					if next.is_empty() {
						break;
					}
					let settled = next == frontier;
					if count >= *min || settled {
						results.extend(next.iter().copied());
					}
					if settled {
						break;
					}
					frontier = next;
				}
				results
			}
		}
	}
}
