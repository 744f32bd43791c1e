// SPDX: CC0-1.0

use core::fmt;
use std::sync::Arc;

/// A slice of the source expression. Diagnostics keep these around so the
/// shell can underline the offending text.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct Span {
    // atomic operations are cheap for this use case
    src: Arc<String>,
    start: usize,
    len: usize,
}

impl Span {
    #[inline]
    pub const fn new(src: Arc<String>, start: usize, len: usize) -> Self {
        Self { src, start, len }
    }

    #[inline]
    pub fn all(src: Arc<String>) -> Self {
        let len = src.len();
        Self::new(src, 0, len)
    }

    /// Zero-width span just past the end of the source, for
    /// end-of-input diagnostics.
    #[inline]
    pub fn end_of(src: Arc<String>) -> Self {
        let start = src.len();
        Self::new(src, start, 0)
    }

    pub fn src(&self) -> Arc<String> {
        Arc::clone(&self.src)
    }

    pub const fn start(&self) -> usize {
        self.start
    }

    pub const fn len(&self) -> usize {
        self.len
    }

    pub const fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn get(&self) -> &str {
        &self.src[self.start..self.start + self.len]
    }

    /// Smallest span covering both `self` and `other`. Both must come from
    /// the same source string.
    pub fn join(&self, other: &Self) -> Self {
        debug_assert!(Arc::ptr_eq(&self.src, &other.src));
        let start = self.start.min(other.start);
        let end = (self.start + self.len).max(other.start + other.len);
        Self::new(Arc::clone(&self.src), start, end - start)
    }
}

impl fmt::Display for Span {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.get())
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum TokTyp {
    Number,
    Ident,
    Plus,
    Minus,
    Star,
    Slash,
    Caret,
    Comma,
    OpenParen,
    CloseParen,
}

impl TokTyp {
    const fn from_symbol(chr: char) -> Option<Self> {
        Some(match chr {
            '+' => Self::Plus,
            '-' => Self::Minus,
            '*' => Self::Star,
            '/' => Self::Slash,
            '^' => Self::Caret,
            ',' => Self::Comma,
            '(' => Self::OpenParen,
            ')' => Self::CloseParen,
            _ => return None,
        })
    }

    pub const fn describe(&self) -> &'static str {
        match self {
            Self::Number => "a number",
            Self::Ident => "an identifier",
            Self::Plus => "'+'",
            Self::Minus => "'-'",
            Self::Star => "'*'",
            Self::Slash => "'/'",
            Self::Caret => "'^'",
            Self::Comma => "','",
            Self::OpenParen => "'('",
            Self::CloseParen => "')'",
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct Tok {
    pub typ: TokTyp,
    pub loc: Span,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum LexErrTyp {
    /// Character that could never be part of the expression language.
    Invalid(char),
    /// Character from a construct the language deliberately leaves out.
    Unsupported(char),
}

impl fmt::Display for LexErrTyp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Invalid(chr) => write!(f, "invalid character {chr:?}"),
            Self::Unsupported(chr) => write!(f, "unsupported character {chr:?}"),
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct LexErr {
    pub typ: LexErrTyp,
    pub loc: Span,
}

impl LexErr {
    pub const fn hint(&self) -> Option<&'static str> {
        let chr = match self.typ {
            LexErrTyp::Invalid(chr) | LexErrTyp::Unsupported(chr) => chr,
        };
        Some(match chr {
            '=' => "expected an expression but found an equation",
            '<' | '>' => "expected an expression but found an inequality",
            '|' => "use the 'abs' function to compute absolute value",
            '\'' | '"' => "string literals are not part of the expression language",
            '_' => "identifiers may only contain letters and digits",
            _ => {
                return None;
            }
        })
    }
}

const fn classify(chr: char) -> LexErrTyp {
    match chr {
        '=' | '<' | '>' | '|' | '[' | ']' | '{' | '}' => LexErrTyp::Unsupported(chr),
        _ => LexErrTyp::Invalid(chr),
    }
}

/// Tokenize the whole source up front. The parser wants lookahead, so
/// unlike a streaming lexer this either yields every token or the first
/// error.
pub fn tokenize(src: &Arc<String>) -> Result<Vec<Tok>, LexErr> {
    let mut toks = Vec::new();
    let mut cur = src.char_indices().peekable();

    while let Some(&(start, chr)) = cur.peek() {
        if chr.is_ascii_whitespace() {
            cur.next();
            continue;
        }

        if let Some(typ) = TokTyp::from_symbol(chr) {
            cur.next();
            toks.push(Tok {
                typ,
                loc: Span::new(Arc::clone(src), start, chr.len_utf8()),
            });
            continue;
        }

        // identifiers start with a letter but may continue with digits
        // (log10, atan2)
        let (typ, pred): (TokTyp, fn(char) -> bool) = if chr.is_ascii_alphabetic() {
            (TokTyp::Ident, |c| c.is_ascii_alphanumeric())
        } else if chr.is_ascii_digit() || chr == '.' {
            (TokTyp::Number, |c| c.is_ascii_digit() || c == '.')
        } else {
            return Err(LexErr {
                typ: classify(chr),
                loc: Span::new(Arc::clone(src), start, chr.len_utf8()),
            });
        };

        let mut len = 0;
        while let Some(&(_, chr)) = cur.peek() {
            if pred(chr) {
                len += chr.len_utf8();
                cur.next();
            } else {
                break;
            }
        }

        // numbers may carry a scientific-notation exponent: e or E, an
        // optional sign, then digits. "2e" and "2e+" are not exponents, so
        // the number ends before the 'e' and lexing continues from there.
        if typ == TokTyp::Number {
            let mut ahead = cur.clone();
            if let Some(&(_, 'e' | 'E')) = ahead.peek() {
                ahead.next();
                let mut exp_len = 1;
                if let Some(&(_, '+' | '-')) = ahead.peek() {
                    ahead.next();
                    exp_len += 1;
                }
                let mut exp_digits = 0;
                while let Some(&(_, chr)) = ahead.peek() {
                    if chr.is_ascii_digit() {
                        ahead.next();
                        exp_digits += 1;
                    } else {
                        break;
                    }
                }
                if exp_digits > 0 {
                    len += exp_len + exp_digits;
                    cur = ahead;
                }
            }
        }

        toks.push(Tok {
            typ,
            loc: Span::new(Arc::clone(src), start, len),
        });
    }

    Ok(toks)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn kinds(src: &str) -> Vec<TokTyp> {
        let src = Arc::new(String::from(src));
        tokenize(&src)
            .unwrap()
            .into_iter()
            .map(|tok| tok.typ)
            .collect()
    }

    #[test]
    fn symbols_and_atoms() {
        use TokTyp::*;
        assert_eq!(
            kinds("2 * (u + v) ^ 3.5 , -cos"),
            vec![
                Number, Star, OpenParen, Ident, Plus, Ident, CloseParen, Caret, Number, Comma,
                Minus, Ident,
            ]
        );
    }

    #[test]
    fn spans_slice_the_source() {
        let src = Arc::new(String::from("sin(u)"));
        let toks = tokenize(&src).unwrap();
        let texts: Vec<&str> = toks.iter().map(|tok| tok.loc.get()).collect();
        assert_eq!(texts, vec!["sin", "(", "u", ")"]);
    }

    #[test]
    fn scientific_notation_is_one_number() {
        let src = Arc::new(String::from("1e5 + 1.5e-3 * 2E+2"));
        let toks = tokenize(&src).unwrap();
        let texts: Vec<&str> = toks.iter().map(|tok| tok.loc.get()).collect();
        assert_eq!(texts, vec!["1e5", "+", "1.5e-3", "*", "2E+2"]);
        assert_eq!(toks[0].typ, TokTyp::Number);
        assert_eq!(toks[2].typ, TokTyp::Number);
        assert_eq!(toks[4].typ, TokTyp::Number);
    }

    #[test]
    fn bare_e_is_not_an_exponent() {
        use TokTyp::*;
        // "2e" is the number 2 followed by the constant e; same for a
        // sign with no digits after it
        assert_eq!(kinds("2e"), vec![Number, Ident]);
        assert_eq!(kinds("2e+"), vec![Number, Ident, Plus]);
        assert_eq!(kinds("2e-x"), vec![Number, Ident, Minus, Ident]);
    }

    #[test]
    fn whitespace_only_is_no_tokens() {
        assert!(kinds("   \t ").is_empty());
    }

    #[test]
    fn underscore_is_invalid() {
        let src = Arc::new(String::from("__import__"));
        let err = tokenize(&src).unwrap_err();
        assert_eq!(err.typ, LexErrTyp::Invalid('_'));
        assert_eq!(err.loc.start(), 0);
    }

    #[test]
    fn quote_is_invalid_with_hint() {
        let src = Arc::new(String::from("f('x')"));
        let err = tokenize(&src).unwrap_err();
        assert_eq!(err.typ, LexErrTyp::Invalid('\''));
        assert!(err.hint().unwrap().contains("string literals"));
    }

    #[test]
    fn equation_is_unsupported() {
        let src = Arc::new(String::from("u = v"));
        let err = tokenize(&src).unwrap_err();
        assert_eq!(err.typ, LexErrTyp::Unsupported('='));
        assert!(err.hint().unwrap().contains("equation"));
    }

    #[test]
    fn join_covers_both_spans() {
        let src = Arc::new(String::from("1 + 23"));
        let toks = tokenize(&src).unwrap();
        let joined = toks[0].loc.join(&toks[2].loc);
        assert_eq!(joined.get(), "1 + 23");
    }
}
