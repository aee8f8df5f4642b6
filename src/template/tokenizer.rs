use super::error::{fatal, TemplateError};

#[derive(Debug, Clone)]
struct Token {
    text: String,
    line: u32,
}

/// Whitespace separated tokens of a template, with their source lines
///
/// A token starting with `/` comments out the rest of its line. The cursor
/// starts before the first token.
#[derive(Debug, Clone)]
pub struct TemplateTokenizer {
    tokens: Vec<Token>,
    started: bool,
    current: usize,
}

impl TemplateTokenizer {
    pub fn new(text: &str) -> TemplateTokenizer {
        let mut tokens = Vec::new();
        for (index, line) in text.lines().enumerate() {
            for word in line.split_whitespace() {
                if word.starts_with('/') {
                    break;
                }
                tokens.push(Token {
                    text: word.to_owned(),
                    line: index as u32 + 1,
                });
            }
        }
        TemplateTokenizer {
            tokens,
            started: false,
            current: 0,
        }
    }

    fn inc(&mut self) {
        if self.started {
            self.current += 1;
        } else {
            self.started = true;
            self.current = 0;
        }
    }

    fn dec(&mut self) {
        if self.current == 0 {
            self.started = false;
        } else {
            self.current -= 1;
        }
    }

    fn at_eof(&self) -> bool {
        self.started && self.current >= self.tokens.len()
    }

    /// Advances to the next token and returns it
    ///
    /// # Panics
    ///
    /// * No token is left.
    #[allow(clippy::should_implement_trait)]
    pub fn next(&mut self) -> String {
        self.inc();
        match self.tokens.get(self.current) {
            Some(token) => token.text.clone(),
            None => {
                let line = self.tokens.last().map_or(0, |t| t.line);
                fatal(TemplateError::UnexpectedEnd { line })
            }
        }
    }

    /// Consumes the next token if it is `token`
    pub fn want(&mut self, token: &str) -> bool {
        if self.at_eof() {
            return false;
        }
        self.inc();
        match self.tokens.get(self.current) {
            Some(next) if next.text == token => true,
            _ => {
                self.dec();
                false
            }
        }
    }

    /// Whether every token has been consumed
    pub fn want_eof(&self) -> bool {
        if self.started {
            self.current + 1 >= self.tokens.len()
        } else {
            self.tokens.is_empty()
        }
    }

    /// Line of the current token, 0 before the first and past the last
    pub fn line(&self) -> u32 {
        if !self.started {
            return 0;
        }
        self.tokens.get(self.current).map_or(0, |t| t.line)
    }
}
