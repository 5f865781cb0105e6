//! ST text front-end: turns source text into structural events.
//!
//! ```text
//! entry    := folder | template
//! folder   := '{' 1 ',' header ',' '[' [entry {',' entry}] ']' '}'
//! template := '{' 0 ',' header '}'
//! header   := '{' STRING ',' INT ',' INT ',' STRING ',' STRING '}'
//! file     := [BOM] entry {',' entry} EOF
//! ```
//!
//! Strings are double-quoted, may span lines, and escape `"` as `""`.
//! Nesting is tracked with a counter rather than recursion, so deep files
//! cannot exhaust the call stack.

use tracing::{debug, instrument};

use crate::domain::builder::StructuralEvent;
use crate::domain::error::ParseError;

const FOLDER_TAG: i64 = 1;
const TEMPLATE_TAG: i64 = 0;

/// Read all structural events from `source`.
///
/// Either the complete event sequence is returned or a `ParseError`;
/// callers never see a partial stream.
#[instrument(level = "debug", skip(source), fields(len = source.len()))]
pub fn read_events(source: &str) -> Result<Vec<StructuralEvent>, ParseError> {
    let mut reader = Reader::new(source);
    let events = reader.run()?;
    debug!("read {} event(s)", events.len());
    Ok(events)
}

#[derive(Debug, Clone, PartialEq, Eq)]
enum Tok {
    LBrace,
    RBrace,
    LBracket,
    RBracket,
    Comma,
    Str(String),
    Int(i64),
    Eof,
}

impl Tok {
    fn describe(&self) -> String {
        match self {
            Tok::LBrace => "'{'".into(),
            Tok::RBrace => "'}'".into(),
            Tok::LBracket => "'['".into(),
            Tok::RBracket => "']'".into(),
            Tok::Comma => "','".into(),
            Tok::Str(_) => "string".into(),
            Tok::Int(n) => format!("number {n}"),
            Tok::Eof => "end of input".into(),
        }
    }
}

#[derive(Debug, Clone)]
struct Token {
    tok: Tok,
    line: usize,
    column: usize,
}

struct Lexer {
    chars: Vec<char>,
    pos: usize,
    line: usize,
    column: usize,
}

impl Lexer {
    fn new(source: &str) -> Self {
        let source = source.strip_prefix('\u{feff}').unwrap_or(source);
        Self {
            chars: source.chars().collect(),
            pos: 0,
            line: 1,
            column: 1,
        }
    }

    fn peek_char(&self) -> Option<char> {
        self.chars.get(self.pos).copied()
    }

    fn bump(&mut self) -> Option<char> {
        let c = self.peek_char()?;
        self.pos += 1;
        if c == '\n' {
            self.line += 1;
            self.column = 1;
        } else {
            self.column += 1;
        }
        Some(c)
    }

    fn next_token(&mut self) -> Result<Token, ParseError> {
        while self.peek_char().is_some_and(char::is_whitespace) {
            self.bump();
        }
        let (line, column) = (self.line, self.column);
        let token = |tok| Token { tok, line, column };

        let Some(c) = self.bump() else {
            return Ok(token(Tok::Eof));
        };
        let tok = match c {
            '{' => Tok::LBrace,
            '}' => Tok::RBrace,
            '[' => Tok::LBracket,
            ']' => Tok::RBracket,
            ',' => Tok::Comma,
            '"' => Tok::Str(self.string(line, column)?),
            c if c == '-' || c.is_ascii_digit() => Tok::Int(self.integer(c, line, column)?),
            other => {
                return Err(ParseError::new(
                    line,
                    column,
                    format!("unexpected character '{other}'"),
                ))
            }
        };
        Ok(token(tok))
    }

    fn string(&mut self, line: usize, column: usize) -> Result<String, ParseError> {
        let mut value = String::new();
        loop {
            match self.bump() {
                Some('"') if self.peek_char() == Some('"') => {
                    self.bump();
                    value.push('"');
                }
                Some('"') => return Ok(value),
                Some(c) => value.push(c),
                None => return Err(ParseError::new(line, column, "unterminated string")),
            }
        }
    }

    fn integer(&mut self, first: char, line: usize, column: usize) -> Result<i64, ParseError> {
        let mut digits = String::from(first);
        while let Some(c) = self.peek_char().filter(char::is_ascii_digit) {
            self.bump();
            digits.push(c);
        }
        digits
            .parse()
            .map_err(|_| ParseError::new(line, column, format!("invalid number '{digits}'")))
    }
}

/// Fields of a `{name, n, n, s, s}` header.
struct Header {
    name: String,
    content: String,
}

#[derive(Debug, Clone, Copy)]
enum State {
    Entry,
    ListStart,
    AfterEntry,
}

struct Reader {
    lexer: Lexer,
    lookahead: Option<Token>,
}

impl Reader {
    fn new(source: &str) -> Self {
        Self {
            lexer: Lexer::new(source),
            lookahead: None,
        }
    }

    fn peek(&mut self) -> Result<&Token, ParseError> {
        let token = match self.lookahead.take() {
            Some(token) => token,
            None => self.lexer.next_token()?,
        };
        Ok(self.lookahead.insert(token))
    }

    fn next(&mut self) -> Result<Token, ParseError> {
        match self.lookahead.take() {
            Some(token) => Ok(token),
            None => self.lexer.next_token(),
        }
    }

    fn expect(&mut self, expected: Tok) -> Result<Token, ParseError> {
        let token = self.next()?;
        if token.tok == expected {
            Ok(token)
        } else {
            Err(unexpected(&token, &expected.describe()))
        }
    }

    fn string(&mut self) -> Result<String, ParseError> {
        let token = self.next()?;
        match token.tok {
            Tok::Str(s) => Ok(s),
            _ => Err(unexpected(&token, "string")),
        }
    }

    fn integer(&mut self) -> Result<(i64, Token), ParseError> {
        let token = self.next()?;
        match token.tok {
            Tok::Int(n) => Ok((n, token)),
            _ => Err(unexpected(&token, "number")),
        }
    }

    fn header(&mut self) -> Result<Header, ParseError> {
        self.expect(Tok::LBrace)?;
        let name = self.string()?;
        self.expect(Tok::Comma)?;
        self.integer()?;
        self.expect(Tok::Comma)?;
        self.integer()?;
        self.expect(Tok::Comma)?;
        self.string()?;
        self.expect(Tok::Comma)?;
        let content = self.string()?;
        self.expect(Tok::RBrace)?;
        Ok(Header { name, content })
    }

    fn run(&mut self) -> Result<Vec<StructuralEvent>, ParseError> {
        let mut events = Vec::new();
        let mut open = 0usize;
        let mut state = State::Entry;

        loop {
            state = match state {
                State::Entry => {
                    self.expect(Tok::LBrace)?;
                    let (tag, tag_token) = self.integer()?;
                    self.expect(Tok::Comma)?;
                    let header = self.header()?;
                    match tag {
                        FOLDER_TAG => {
                            self.expect(Tok::Comma)?;
                            self.expect(Tok::LBracket)?;
                            events.push(StructuralEvent::EnterFolder(header.name));
                            open += 1;
                            State::ListStart
                        }
                        TEMPLATE_TAG => {
                            self.expect(Tok::RBrace)?;
                            events.push(StructuralEvent::Template {
                                name: header.name,
                                content: header.content,
                            });
                            State::AfterEntry
                        }
                        other => {
                            return Err(ParseError::new(
                                tag_token.line,
                                tag_token.column,
                                format!("unknown entry tag {other}"),
                            ))
                        }
                    }
                }
                State::ListStart => {
                    if self.peek()?.tok == Tok::RBracket {
                        self.close_folder(&mut events, &mut open)?;
                        State::AfterEntry
                    } else {
                        State::Entry
                    }
                }
                State::AfterEntry => {
                    let token = self.peek()?.clone();
                    match token.tok {
                        Tok::Comma => {
                            self.next()?;
                            State::Entry
                        }
                        Tok::RBracket if open > 0 => {
                            self.close_folder(&mut events, &mut open)?;
                            State::AfterEntry
                        }
                        Tok::Eof if open == 0 => return Ok(events),
                        _ if open > 0 => return Err(unexpected(&token, "',' or ']'")),
                        _ => return Err(unexpected(&token, "',' or end of input")),
                    }
                }
            };
        }
    }

    fn close_folder(
        &mut self,
        events: &mut Vec<StructuralEvent>,
        open: &mut usize,
    ) -> Result<(), ParseError> {
        self.expect(Tok::RBracket)?;
        self.expect(Tok::RBrace)?;
        events.push(StructuralEvent::ExitFolder);
        *open -= 1;
        Ok(())
    }
}

fn unexpected(token: &Token, expected: &str) -> ParseError {
    ParseError::new(
        token.line,
        token.column,
        format!("expected {expected}, found {}", token.tok.describe()),
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tokens(source: &str) -> Vec<Tok> {
        let mut lexer = Lexer::new(source);
        let mut out = Vec::new();
        loop {
            let token = lexer.next_token().unwrap();
            if token.tok == Tok::Eof {
                return out;
            }
            out.push(token.tok);
        }
    }

    #[test]
    fn given_doubled_quote_when_lexing_then_unescapes() {
        assert_eq!(
            tokens(r#"{"say ""hi""", -1}"#),
            vec![
                Tok::LBrace,
                Tok::Str(r#"say "hi""#.into()),
                Tok::Comma,
                Tok::Int(-1),
                Tok::RBrace
            ]
        );
    }

    #[test]
    fn given_multiline_string_when_lexing_then_tracks_following_line() {
        let mut lexer = Lexer::new("\"a\nb\"\n  ,");
        lexer.next_token().unwrap();
        let comma = lexer.next_token().unwrap();
        assert_eq!((comma.line, comma.column), (3, 3));
    }

    #[test]
    fn given_bom_when_lexing_then_skipped() {
        assert_eq!(tokens("\u{feff}[]"), vec![Tok::LBracket, Tok::RBracket]);
    }
}
