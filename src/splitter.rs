//! Quote-aware splitting of raw input into tokens.
//!
//! The shell needs the same splitting capability twice: once with a space
//! delimiter to break a statement into `[command, arg1, arg2, ...]`, and once
//! with an `=` delimiter to break a single argument token into `[key, value]`.
//! Both are instances of [`Splitter`], configured at session construction.

use thiserror::Error;

/// Errors raised while constructing a [`Splitter`].
///
/// Construction happens once, when the session initializes; a failure here is
/// fatal for the session because no command can ever be parsed without a
/// working tokenizer.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConfigError {
    /// The delimiter is also declared as a quote character.
    #[error("delimiter {0:?} is also declared as a quote character")]
    DelimiterIsQuote(char),
    /// The same quote character was declared more than once.
    #[error("quote character {0:?} declared twice")]
    DuplicateQuote(char),
}

/// A quote was opened but never closed before the end of the input.
///
/// Carries the offending input so the failure can be surfaced verbatim.
#[derive(Debug, Error, PartialEq, Eq)]
#[error("unterminated quote in input: {input}")]
pub struct SplitError {
    /// The input line or token that could not be split.
    pub input: String,
}

/// Splits input on a single delimiter character while honoring quoted spans.
///
/// Rules, in order of application:
/// - the delimiter is a token boundary only outside quotes;
/// - a span between two matching quote characters is literal, quotes dropped;
/// - a quote character preceded by a backslash is unescaped to the plain
///   character (inside a span of that quote, and outside any span);
/// - surrounding unquoted whitespace is trimmed from each token;
/// - unquoted empty tokens are dropped from the leading and trailing edges,
///   interior empties are kept (an empty argument slot is caller-visible).
#[derive(Debug)]
pub struct Splitter {
    delimiter: char,
    quotes: Vec<char>,
}

impl Splitter {
    /// Create a splitter for `delimiter` with the given quote characters.
    pub fn new(delimiter: char, quotes: &[char]) -> Result<Self, ConfigError> {
        if quotes.contains(&delimiter) {
            return Err(ConfigError::DelimiterIsQuote(delimiter));
        }
        for (i, q) in quotes.iter().enumerate() {
            if quotes[..i].contains(q) {
                return Err(ConfigError::DuplicateQuote(*q));
            }
        }
        Ok(Self {
            delimiter,
            quotes: quotes.to_vec(),
        })
    }

    /// Split `input` into tokens.
    ///
    /// Fails with [`SplitError`] when a quote is left unterminated.
    pub fn split(&self, input: &str) -> Result<Vec<String>, SplitError> {
        let fsm = SplitFsm::new(self, input);
        fsm.run()
    }
}

/// A fragment of the token currently being built. Quoted fragments are exempt
/// from whitespace trimming and keep the token alive even when empty.
enum Piece {
    Plain(String),
    Quoted(String),
}

#[derive(Clone, Copy, PartialEq, Eq)]
enum State {
    Plain,
    Quoted(char),
}

struct RawToken {
    text: String,
    quoted: bool,
}

struct SplitFsm<'a> {
    splitter: &'a Splitter,
    input: Vec<char>,
    pos: usize,
    state: State,
    buffer: String,
    pieces: Vec<Piece>,
    tokens: Vec<RawToken>,
}

impl<'a> SplitFsm<'a> {
    fn new(splitter: &'a Splitter, input: &str) -> Self {
        SplitFsm {
            splitter,
            input: input.chars().collect(),
            pos: 0,
            state: State::Plain,
            buffer: String::new(),
            pieces: Vec::new(),
            tokens: Vec::new(),
        }
    }

    fn run(mut self) -> Result<Vec<String>, SplitError> {
        while let Some(ch) = self.read_char() {
            match self.state {
                State::Plain => self.handle_plain(ch),
                State::Quoted(quote) => self.handle_quoted(ch, quote),
            }
        }

        if let State::Quoted(_) = self.state {
            return Err(SplitError {
                input: self.input.into_iter().collect(),
            });
        }

        self.end_token();

        let mut tokens = self.tokens;
        while tokens.first().is_some_and(|t| t.text.is_empty() && !t.quoted) {
            tokens.remove(0);
        }
        while tokens.last().is_some_and(|t| t.text.is_empty() && !t.quoted) {
            tokens.pop();
        }

        Ok(tokens.into_iter().map(|t| t.text).collect())
    }

    fn read_char(&mut self) -> Option<char> {
        let ch = self.input.get(self.pos).copied();
        if ch.is_some() {
            self.pos += 1;
        }
        ch
    }

    fn peek_char(&self) -> Option<char> {
        self.input.get(self.pos).copied()
    }

    fn handle_plain(&mut self, ch: char) {
        if ch == self.splitter.delimiter {
            self.end_token();
        } else if ch == '\\' && self.peek_char().is_some_and(|c| self.splitter.quotes.contains(&c)) {
            // Escaped quote outside a span: literal character, no span opened.
            let quote = self.read_char();
            if let Some(quote) = quote {
                self.buffer.push(quote);
            }
        } else if self.splitter.quotes.contains(&ch) {
            self.flush_plain();
            self.state = State::Quoted(ch);
        } else {
            self.buffer.push(ch);
        }
    }

    fn handle_quoted(&mut self, ch: char, quote: char) {
        if ch == '\\' && self.peek_char() == Some(quote) {
            self.read_char();
            self.buffer.push(quote);
        } else if ch == quote {
            self.pieces.push(Piece::Quoted(std::mem::take(&mut self.buffer)));
            self.state = State::Plain;
        } else {
            self.buffer.push(ch);
        }
    }

    fn flush_plain(&mut self) {
        if !self.buffer.is_empty() {
            self.pieces.push(Piece::Plain(std::mem::take(&mut self.buffer)));
        }
    }

    /// Assemble the collected pieces into one token, trimming unquoted
    /// whitespace at the token edges only.
    fn end_token(&mut self) {
        self.flush_plain();
        let pieces = std::mem::take(&mut self.pieces);
        let quoted = pieces.iter().any(|p| matches!(p, Piece::Quoted(_)));
        let last = pieces.len().saturating_sub(1);

        let mut text = String::new();
        for (i, piece) in pieces.into_iter().enumerate() {
            match piece {
                Piece::Quoted(s) => text.push_str(&s),
                Piece::Plain(s) => {
                    let mut s = s.as_str();
                    if i == 0 {
                        s = s.trim_start();
                    }
                    if i == last {
                        s = s.trim_end();
                    }
                    text.push_str(s);
                }
            }
        }

        self.tokens.push(RawToken { text, quoted });
    }
}
