use {
    crate::{
        error::{Reporter, ScanError},
        literal::LiteralValue,
        token::{SourcePosition, Token, TokenKind},
    },
    maplit::hashmap,
    std::collections::HashMap,
};

trait IsIdentifier {
    fn is_identifier(&self) -> bool;
}

impl IsIdentifier for char {
    fn is_identifier(&self) -> bool {
        self.is_ascii_alphanumeric() || *self == '_'
    }
}

/// Current scanner state for iterating over the source input.
/// Built once per source unit and consumed by `scan_tokens`.
pub struct Scanner<'src> {
    source: &'src str,
    line: usize,
    start: usize,      // byte offset of the lexeme being built
    start_line: usize, // line of the lexeme's first character
    current: usize,    // byte offset of the next unread character
    tokens: Vec<Token<'src>>,
    keywords: HashMap<&'static str, TokenKind>,
}

impl<'src> Scanner<'src> {
    pub fn new(source: &'src str) -> Self {
        Self {
            source,
            line: 1,
            start: 0,
            start_line: 1,
            current: 0,
            tokens: vec![],
            keywords: hashmap! {
                "and" => TokenKind::KwAnd,
                "class" => TokenKind::KwClass,
                "else" => TokenKind::KwElse,
                "false" => TokenKind::KwFalse,
                "for" => TokenKind::KwFor,
                "fun" => TokenKind::KwFun,
                "if" => TokenKind::KwIf,
                "nil" => TokenKind::KwNil,
                "or" => TokenKind::KwOr,
                "print" => TokenKind::KwPrint,
                "return" => TokenKind::KwReturn,
                "super" => TokenKind::KwSuper,
                "this" => TokenKind::KwThis,
                "true" => TokenKind::KwTrue,
                "var" => TokenKind::KwVar,
                "while" => TokenKind::KwWhile,
            },
        }
    }

    /// Scan the whole input in one pass. Malformed lexemes go to the
    /// reporter and scanning resumes; the returned sequence always ends
    /// with a single Eof token.
    pub fn scan_tokens(mut self, reporter: &mut dyn Reporter) -> Vec<Token<'src>> {
        while !self.is_at_end() {
            self.start = self.current;
            self.start_line = self.line;
            self.scan_token(reporter);
        }
        self.start = self.current;
        self.start_line = self.line;
        self.add_token(TokenKind::Eof);
        self.tokens
    }

    fn scan_token(&mut self, reporter: &mut dyn Reporter) {
        let c = self.advance();
        match c {
            '(' => self.add_token(TokenKind::LeftParen),
            ')' => self.add_token(TokenKind::RightParen),
            '{' => self.add_token(TokenKind::LeftBrace),
            '}' => self.add_token(TokenKind::RightBrace),
            ',' => self.add_token(TokenKind::Comma),
            '.' => self.add_token(TokenKind::Dot),
            '-' => self.add_token(TokenKind::Minus),
            '+' => self.add_token(TokenKind::Plus),
            ';' => self.add_token(TokenKind::Semicolon),
            '*' => self.add_token(TokenKind::Star),
            '!' => {
                let kind = if self.matches('=') {
                    TokenKind::BangEqual
                } else {
                    TokenKind::Bang
                };
                self.add_token(kind);
            }
            '=' => {
                let kind = if self.matches('=') {
                    TokenKind::EqualEqual
                } else {
                    TokenKind::Equal
                };
                self.add_token(kind);
            }
            '<' => {
                let kind = if self.matches('=') {
                    TokenKind::LessEqual
                } else {
                    TokenKind::Less
                };
                self.add_token(kind);
            }
            '>' => {
                let kind = if self.matches('=') {
                    TokenKind::GreaterEqual
                } else {
                    TokenKind::Greater
                };
                self.add_token(kind);
            }
            '/' => {
                if self.matches('/') {
                    // A comment goes until the end of the line.
                    while self.peek() != '\n' && !self.is_at_end() {
                        self.advance();
                    }
                } else {
                    self.add_token(TokenKind::Slash);
                }
            }
            '"' => self.string(reporter),
            '0'..='9' => self.number(),
            d if d.is_ascii_alphabetic() || d == '_' => self.identifier(),
            ' ' | '\r' | '\t' => {
                // Ignore whitespace.
            }
            '\n' => {
                self.line += 1;
            }
            _ => {
                reporter.report(ScanError::UnexpectedCharacter {
                    position: self.current_position(),
                });
            }
        }
    }

    fn is_at_end(&self) -> bool {
        self.current >= self.source.len()
    }

    fn advance(&mut self) -> char {
        let c = self.source[self.current..]
            .chars()
            .next()
            .expect("Got past end of input");
        self.current += c.len_utf8();
        c
    }

    /// Return true and advance if the next character is the expected one.
    fn matches(&mut self, expected: char) -> bool {
        if self.is_at_end() {
            return false;
        }
        if self.peek() != expected {
            return false;
        }
        self.current += expected.len_utf8();
        true
    }

    fn peek(&self) -> char {
        self.peek_offset(0)
    }

    fn peek_next(&self) -> char {
        self.peek_offset(1)
    }

    // @internal
    fn peek_offset(&self, offset: usize) -> char {
        self.source[self.current..]
            .chars()
            .nth(offset)
            .unwrap_or('\0')
    }

    fn string(&mut self, reporter: &mut dyn Reporter) {
        while self.peek() != '"' && !self.is_at_end() {
            if self.peek() == '\n' {
                self.line += 1;
            }
            self.advance();
        }
        if self.is_at_end() {
            reporter.report(ScanError::UnterminatedString {
                position: self.current_position(),
            });
            return;
        }
        // The closing ".
        self.advance();

        // The value skips the surrounding quotes. Escapes are not
        // processed; a backslash is an ordinary character.
        let value = &self.source[self.start + 1..self.current - 1];

        self.add_token_with_value(TokenKind::String, LiteralValue::Str(value.into()));
    }

    fn number(&mut self) {
        while self.peek().is_ascii_digit() {
            self.advance();
        }
        // Consume the dot only when a fractional part follows, so `1.`
        // lexes as the number 1 and a separate Dot token.
        if self.peek() == '.' && self.peek_next().is_ascii_digit() {
            self.advance();
            while self.peek().is_ascii_digit() {
                self.advance();
            }
        }
        let value = self
            .lexeme()
            .parse()
            .expect("digit runs always parse as f64");
        self.add_token_with_value(TokenKind::Number, LiteralValue::Num(value));
    }

    fn identifier(&mut self) {
        while self.peek().is_identifier() {
            self.advance();
        }

        // Maximal munch first, one keyword lookup after.
        let lexeme = self.lexeme();
        if self.keywords.contains_key(&lexeme) {
            self.add_token(self.keywords[&lexeme]);
        } else {
            self.add_token(TokenKind::Identifier);
        }
    }

    fn lexeme(&self) -> &'src str {
        &self.source[self.start..self.current]
    }

    /// Position of the lexeme being built, anchored to the line of its
    /// first character. A multi-line string reports where it opened.
    fn token_position(&self) -> SourcePosition {
        SourcePosition {
            line: self.start_line,
            span: self.start..self.current,
        }
    }

    /// Position for error reports: the line where scanning stopped.
    fn current_position(&self) -> SourcePosition {
        SourcePosition {
            line: self.line,
            span: self.start..self.current,
        }
    }

    fn add_token(&mut self, kind: TokenKind) {
        self.tokens
            .push(Token::new(kind, self.lexeme(), None, self.token_position()));
    }

    fn add_token_with_value(&mut self, kind: TokenKind, value: LiteralValue) {
        self.tokens.push(Token::new(
            kind,
            self.lexeme(),
            Some(value),
            self.token_position(),
        ));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::token::TokenKind::*;

    #[derive(Default)]
    struct Collecting {
        errors: Vec<ScanError>,
    }

    impl Reporter for Collecting {
        fn report(&mut self, error: ScanError) {
            self.errors.push(error);
        }
    }

    fn scan(source: &str) -> (Vec<Token<'_>>, Vec<ScanError>) {
        let mut reporter = Collecting::default();
        let tokens = Scanner::new(source).scan_tokens(&mut reporter);
        (tokens, reporter.errors)
    }

    fn kinds(source: &str) -> Vec<TokenKind> {
        let (tokens, errors) = scan(source);
        assert!(errors.is_empty(), "unexpected scan errors: {:?}", errors);
        tokens.into_iter().map(|t| t.kind).collect()
    }

    #[test]
    fn single_char_tokens() {
        assert_eq!(
            kinds("(){},.-+;*"),
            vec![
                LeftParen, RightParen, LeftBrace, RightBrace, Comma, Dot, Minus, Plus, Semicolon,
                Star, Eof
            ]
        );
    }

    #[test]
    fn one_or_two_char_tokens() {
        assert_eq!(
            kinds("! != = == < <= > >="),
            vec![
                Bang, BangEqual, Equal, EqualEqual, Less, LessEqual, Greater, GreaterEqual, Eof
            ]
        );
    }

    #[test]
    fn slash_is_not_a_comment() {
        assert_eq!(kinds("1 / 2"), vec![Number, Slash, Number, Eof]);
    }

    #[test]
    fn comment_runs_to_end_of_line() {
        let (tokens, errors) = scan("// comment\n1");
        assert!(errors.is_empty());
        assert_eq!(tokens.len(), 2);
        assert_eq!(tokens[0].kind, Number);
        assert_eq!(tokens[0].literal_num(), Some(1.0));
        assert_eq!(tokens[0].line(), 2);
    }

    #[test]
    fn comment_at_end_of_input() {
        assert_eq!(kinds("// trailing"), vec![Eof]);
    }

    #[test]
    fn ignores_whitespace() {
        assert_eq!(kinds(" \t\r\n() "), vec![LeftParen, RightParen, Eof]);
    }

    #[test]
    fn empty_input_yields_only_eof() {
        let (tokens, errors) = scan("");
        assert!(errors.is_empty());
        assert_eq!(tokens.len(), 1);
        assert_eq!(tokens[0].kind, Eof);
        assert_eq!(tokens[0].lexeme, "");
        assert_eq!(tokens[0].literal, None);
        assert_eq!(tokens[0].line(), 1);
    }

    #[test]
    fn string_literal_value_is_between_quotes() {
        let (tokens, _) = scan("\"hello\"");
        assert_eq!(tokens[0].kind, String);
        assert_eq!(tokens[0].lexeme, "\"hello\"");
        assert_eq!(tokens[0].literal_str(), Some("hello".to_string()));
    }

    #[test]
    fn string_backslash_is_not_an_escape() {
        let (tokens, _) = scan(r#""a\nb""#);
        assert_eq!(tokens[0].literal_str(), Some(r"a\nb".to_string()));
    }

    #[test]
    fn multiline_string_counts_lines() {
        let (tokens, errors) = scan("\"hello\nworld\"");
        assert!(errors.is_empty());
        assert_eq!(tokens[0].kind, String);
        assert_eq!(tokens[0].literal_str(), Some("hello\nworld".to_string()));
        // The token sits on the line of its opening quote; the embedded
        // newline pushes everything after it to line 2.
        assert_eq!(tokens[0].line(), 1);
        assert_eq!(tokens[1].kind, Eof);
        assert_eq!(tokens[1].line(), 2);
    }

    #[test]
    fn multiline_string_after_leading_lines() {
        let (tokens, errors) = scan("\n\n\"a\nb\" 1");
        assert!(errors.is_empty());
        assert_eq!(tokens[0].kind, String);
        assert_eq!(tokens[0].line(), 3);
        assert_eq!(tokens[1].kind, Number);
        assert_eq!(tokens[1].line(), 4);
    }

    #[test]
    fn unterminated_multiline_string_reports_ending_line() {
        let (_, errors) = scan("\"a\nb");
        assert_eq!(errors.len(), 1);
        assert_eq!(errors[0].line(), 2);
    }

    #[test]
    fn unterminated_string_reports_and_recovers() {
        let (tokens, errors) = scan("\"unterminated");
        assert_eq!(tokens.len(), 1);
        assert_eq!(tokens[0].kind, Eof);
        assert_eq!(errors.len(), 1);
        assert!(matches!(errors[0], ScanError::UnterminatedString { .. }));
        assert_eq!(errors[0].line(), 1);
    }

    #[test]
    fn integer_and_decimal_numbers() {
        let (tokens, _) = scan("123 12.5");
        assert_eq!(tokens[0].literal_num(), Some(123.0));
        assert_eq!(tokens[1].literal_num(), Some(12.5));
    }

    #[test]
    fn trailing_dot_is_a_separate_token() {
        let (tokens, errors) = scan("1.");
        assert!(errors.is_empty());
        assert_eq!(
            tokens.iter().map(|t| t.kind).collect::<Vec<_>>(),
            vec![Number, Dot, Eof]
        );
        assert_eq!(tokens[0].lexeme, "1");
        assert_eq!(tokens[0].literal_num(), Some(1.0));
    }

    #[test]
    fn keywords_are_recognized() {
        assert_eq!(
            kinds("and class else false for fun if nil or print return super this true var while"),
            vec![
                KwAnd, KwClass, KwElse, KwFalse, KwFor, KwFun, KwIf, KwNil, KwOr, KwPrint,
                KwReturn, KwSuper, KwThis, KwTrue, KwVar, KwWhile, Eof
            ]
        );
    }

    #[test]
    fn keyword_prefix_is_an_identifier() {
        // Maximal munch: `orange` must never lex as `or` + `ange`.
        assert_eq!(kinds("orange"), vec![Identifier, Eof]);
        assert_eq!(kinds("for_"), vec![Identifier, Eof]);
        assert_eq!(kinds("classes"), vec![Identifier, Eof]);
    }

    #[test]
    fn underscore_starts_an_identifier() {
        let (tokens, _) = scan("_x x_1");
        assert_eq!(tokens[0].kind, Identifier);
        assert_eq!(tokens[0].lexeme, "_x");
        assert_eq!(tokens[1].kind, Identifier);
        assert_eq!(tokens[1].lexeme, "x_1");
    }

    #[test]
    fn var_declaration_scenario() {
        let (tokens, errors) = scan("var x = 12.5;");
        assert!(errors.is_empty());
        assert_eq!(
            tokens.iter().map(|t| t.kind).collect::<Vec<_>>(),
            vec![KwVar, Identifier, Equal, Number, Semicolon, Eof]
        );
        assert_eq!(tokens[1].lexeme, "x");
        assert_eq!(tokens[3].literal_num(), Some(12.5));
        assert!(tokens.iter().all(|t| t.line() == 1));
    }

    #[test]
    fn unexpected_character_reports_and_continues() {
        let (tokens, errors) = scan("@1");
        assert_eq!(errors.len(), 1);
        assert!(matches!(errors[0], ScanError::UnexpectedCharacter { .. }));
        assert_eq!(errors[0].line(), 1);
        assert_eq!(errors[0].span(), 0..1);
        assert_eq!(
            tokens.iter().map(|t| t.kind).collect::<Vec<_>>(),
            vec![Number, Eof]
        );
    }

    #[test]
    fn every_error_is_reported_in_one_pass() {
        let (tokens, errors) = scan("@\n#");
        assert_eq!(errors.len(), 2);
        assert_eq!(errors[0].line(), 1);
        assert_eq!(errors[1].line(), 2);
        assert_eq!(tokens.last().map(|t| t.kind), Some(Eof));
    }

    #[test]
    fn lines_are_monotonically_non_decreasing() {
        let (tokens, _) = scan("fun f() {\n  print \"hi\";\n}\n");
        let lines: Vec<_> = tokens.iter().map(|t| t.line()).collect();
        assert!(lines.windows(2).all(|w| w[0] <= w[1]));
        assert_eq!(tokens.last().map(|t| t.line()), Some(4));
    }

    #[test]
    fn lexemes_reconstruct_whitespace_free_source() {
        let source = "var(x)=12.5;\"s\"";
        let (tokens, errors) = scan(source);
        assert!(errors.is_empty());
        let joined: std::string::String = tokens.iter().map(|t| t.lexeme).collect();
        assert_eq!(joined, source);
    }

    #[test]
    fn scanning_is_idempotent() {
        let source = "var x = 1; // note\nprint x;";
        assert_eq!(scan(source).0, scan(source).0);
    }

    #[test]
    fn multibyte_text_in_strings_and_comments() {
        let (tokens, errors) = scan("// комментарий\n\"héllo\" + 1");
        assert!(errors.is_empty());
        assert_eq!(
            tokens.iter().map(|t| t.kind).collect::<Vec<_>>(),
            vec![String, Plus, Number, Eof]
        );
        assert_eq!(tokens[0].literal_str(), Some("héllo".to_string()));
    }

    #[test]
    fn token_positions_carry_byte_spans() {
        let (tokens, _) = scan("var x");
        assert_eq!(tokens[0].position.span, 0..3);
        assert_eq!(tokens[1].position.span, 4..5);
        assert_eq!(tokens[2].position.span, 5..5);
    }
}
