//! Permissive S-expression parser for KiCad files.
//!
//! KiCad schematic, board and library-table files share one LISP-like
//! text format: parenthesized lists of whitespace-separated atoms, with
//! double-quoted strings carrying `\"` and `\\` escapes. This parser is
//! deliberately total: structurally incomplete input degrades to a
//! partial tree instead of an error. A stray `)` is skipped where a
//! value is expected, and an unclosed `(` consumes the remaining tokens
//! into a partial list. Callers must not assume a returned tree implies
//! well-formed source; higher layers treat missing structure as "skip".

use std::fmt;

#[derive(Debug, Clone, PartialEq)]
pub enum SExp {
    Atom(String),
    List(Vec<SExp>),
}

impl SExp {
    pub fn as_atom(&self) -> Option<&str> {
        match self {
            SExp::Atom(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_list(&self) -> Option<&[SExp]> {
        match self {
            SExp::List(items) => Some(items),
            _ => None,
        }
    }

    /// Tag of an element: the first child atom of a list.
    pub fn tag(&self) -> Option<&str> {
        self.as_list()
            .and_then(|items| items.first())
            .and_then(|first| first.as_atom())
    }

    /// Find every element tagged `name`, anywhere in the tree.
    ///
    /// Depth-first pre-order: matches come back in document order with a
    /// parent before any matching descendant, and matched elements are
    /// still searched for nested matches.
    pub fn find_elements(&self, name: &str) -> Vec<&SExp> {
        let mut results = Vec::new();
        self.collect_elements(name, &mut results);
        results
    }

    fn collect_elements<'a>(&'a self, name: &str, results: &mut Vec<&'a SExp>) {
        if let SExp::List(items) = self {
            if self.tag() == Some(name) {
                results.push(self);
            }
            for child in items {
                child.collect_elements(name, results);
            }
        }
    }

    /// Value of a `(property "Name" "Value" ...)` child of this element.
    ///
    /// Only immediate children are scanned, matching how KiCad nests
    /// properties directly under the element that owns them.
    pub fn property(&self, name: &str) -> Option<&str> {
        let items = self.as_list()?;
        for item in items {
            if let Some(fields) = item.as_list() {
                if fields.len() >= 3
                    && fields[0].as_atom() == Some("property")
                    && fields[1].as_atom() == Some(name)
                {
                    return fields[2].as_atom();
                }
            }
        }
        None
    }

    /// Value of a `(key value ...)` child of this element, e.g. the
    /// `uri` of a `(lib (name "foo") (uri "bar"))` entry.
    pub fn element_value(&self, key: &str) -> Option<&str> {
        let items = self.as_list()?;
        for item in items {
            if let Some(fields) = item.as_list() {
                if fields.len() >= 2 && fields[0].as_atom() == Some(key) {
                    return fields[1].as_atom();
                }
            }
        }
        None
    }
}

impl fmt::Display for SExp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SExp::Atom(s) => {
                if needs_quoting(s) {
                    write!(f, "\"{}\"", s.replace('\\', "\\\\").replace('"', "\\\""))
                } else {
                    write!(f, "{}", s)
                }
            }
            SExp::List(items) => {
                write!(f, "(")?;
                for (i, item) in items.iter().enumerate() {
                    if i > 0 {
                        write!(f, " ")?;
                    }
                    write!(f, "{}", item)?;
                }
                write!(f, ")")
            }
        }
    }
}

/// Atoms that would not survive an unquoted round trip get quoted.
fn needs_quoting(s: &str) -> bool {
    s.is_empty()
        || s.chars()
            .any(|c| c.is_whitespace() || matches!(c, '(' | ')' | '"' | '\\'))
}

enum Token {
    Open,
    Close,
    Text(String),
}

/// Single left-to-right scan producing the flat token sequence.
///
/// `(` and `)` are always single-character tokens. A `"` opens a quoted
/// token running to the first unescaped `"`; a backslash inside it
/// consumes the following character raw (escapes are resolved later, at
/// parse time). Everything else is an unquoted run terminated by
/// whitespace, a parenthesis or a quote.
fn tokenize(text: &str) -> Vec<Token> {
    let chars: Vec<char> = text.chars().collect();
    let mut tokens = Vec::new();
    let mut i = 0;

    while i < chars.len() {
        match chars[i] {
            ' ' | '\t' | '\n' | '\r' => {
                i += 1;
            }
            '(' => {
                tokens.push(Token::Open);
                i += 1;
            }
            ')' => {
                tokens.push(Token::Close);
                i += 1;
            }
            '"' => {
                let mut j = i + 1;
                while j < chars.len() {
                    if chars[j] == '\\' {
                        j += 2;
                    } else if chars[j] == '"' {
                        break;
                    } else {
                        j += 1;
                    }
                }
                // Keep both quotes in the token; an unterminated string
                // runs to the end of input.
                let end = (j + 1).min(chars.len());
                tokens.push(Token::Text(chars[i..end].iter().collect()));
                i = j + 1;
            }
            _ => {
                let mut j = i;
                while j < chars.len()
                    && !matches!(chars[j], ' ' | '\t' | '\n' | '\r' | '(' | ')' | '"')
                {
                    j += 1;
                }
                tokens.push(Token::Text(chars[i..j].iter().collect()));
                i = j;
            }
        }
    }

    tokens
}

/// Turn a raw text token into an atom value.
///
/// Quoted tokens lose their surrounding quotes and have `\"` and `\\`
/// resolved; any other backslash pair stays verbatim. An unterminated
/// quoted token is kept as-is, opening quote included.
fn resolve_text(raw: &str) -> String {
    if raw.starts_with('"') && raw.ends_with('"') {
        let inner = if raw.len() >= 2 {
            &raw[1..raw.len() - 1]
        } else {
            ""
        };
        unescape(inner)
    } else {
        raw.to_string()
    }
}

fn unescape(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    let mut chars = s.chars();
    while let Some(ch) = chars.next() {
        if ch == '\\' {
            match chars.next() {
                Some('"') => out.push('"'),
                Some('\\') => out.push('\\'),
                Some(other) => {
                    out.push('\\');
                    out.push(other);
                }
                None => out.push('\\'),
            }
        } else {
            out.push(ch);
        }
    }
    out
}

/// Parse S-expression text into a tree. Never fails; see the module
/// docs for how malformed input degrades.
pub fn parse_sexpr(text: &str) -> SExp {
    SExpParser::new(text).parse()
}

/// Nesting depth cap for parsed lists. Real KiCad files nest a few
/// dozen levels at most; opens beyond this are flattened into the
/// deepest open list, keeping tree depth bounded for the tree walks
/// that follow.
const MAX_LIST_DEPTH: usize = 1000;

pub struct SExpParser {
    tokens: Vec<Token>,
    pos: usize,
}

impl SExpParser {
    pub fn new(input: &str) -> Self {
        Self {
            tokens: tokenize(input),
            pos: 0,
        }
    }

    pub fn parse(&mut self) -> SExp {
        self.parse_value()
    }

    fn parse_value(&mut self) -> SExp {
        let token = match self.tokens.get(self.pos) {
            Some(token) => token,
            None => return SExp::List(Vec::new()),
        };

        match token {
            Token::Open => {
                self.pos += 1;
                self.parse_list()
            }
            Token::Close => {
                // Stray close paren where a value was expected: recover
                // with an empty list and move on.
                self.pos += 1;
                SExp::List(Vec::new())
            }
            Token::Text(raw) => {
                let atom = SExp::Atom(resolve_text(raw));
                self.pos += 1;
                atom
            }
        }
    }

    /// Build the list opened by the `(` just consumed.
    ///
    /// Nesting is tracked with an explicit frame stack, one frame per
    /// open list, so input depth never grows the call stack. Frames
    /// past the depth cap are not created; their contents join the
    /// deepest real frame and their parens cancel out.
    fn parse_list(&mut self) -> SExp {
        let mut current = Vec::new();
        let mut parents: Vec<Vec<SExp>> = Vec::new();
        let mut clamped = 0usize;

        loop {
            match self.tokens.get(self.pos) {
                // Input exhausted inside a list: close every open frame
                // with what it has.
                None => {
                    let mut value = SExp::List(current);
                    while let Some(mut parent) = parents.pop() {
                        parent.push(value);
                        value = SExp::List(parent);
                    }
                    return value;
                }
                Some(Token::Open) => {
                    self.pos += 1;
                    if parents.len() + 1 < MAX_LIST_DEPTH {
                        parents.push(std::mem::take(&mut current));
                    } else {
                        clamped += 1;
                    }
                }
                Some(Token::Close) => {
                    self.pos += 1;
                    if clamped > 0 {
                        clamped -= 1;
                        continue;
                    }
                    let value = SExp::List(std::mem::take(&mut current));
                    match parents.pop() {
                        Some(mut parent) => {
                            parent.push(value);
                            current = parent;
                        }
                        None => return value,
                    }
                }
                Some(Token::Text(raw)) => {
                    current.push(SExp::Atom(resolve_text(raw)));
                    self.pos += 1;
                }
            }
        }
    }
}
