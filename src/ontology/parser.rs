//! Parser for the ontology description language.
//!
//! ```text
//! document := "Ontology" id
//!             "concepts" list "individuals" list "relationships" list
//!             "triples" "{" triple* "}" "."
//! list     := "{" ( id ( "," id )* )? "}"
//! triple   := id "=" id "=>" id ";"
//! ```
//!
//! `%` starts a comment running to the end of the line. Identifiers are any
//! run of characters other than whitespace, `{ } , ; %`; the bare words
//! `=`, `=>` and `.` are operators. Keywords only count where the grammar
//! expects them, so an individual may be called `triples`.

use crate::error::OdlError;
use crate::ontology::ast::{Document, Triple};

/// Tokens produced by [`tokenize`].
#[derive(Debug, PartialEq, Clone)]
enum Token {
    Word(String),
    LBrace,
    RBrace,
    Comma,
    Semi,
    Eq,
    Arrow,
    Dot,
}

impl Token {
    fn describe(&self) -> String {
        match self {
            Token::Word(w) => format!("'{}'", w),
            Token::LBrace => "'{'".to_string(),
            Token::RBrace => "'}'".to_string(),
            Token::Comma => "','".to_string(),
            Token::Semi => "';'".to_string(),
            Token::Eq => "'='".to_string(),
            Token::Arrow => "'=>'".to_string(),
            Token::Dot => "'.'".to_string(),
        }
    }
}

/// A token with its 1-based source position.
#[derive(Debug, Clone)]
struct Spanned {
    token: Token,
    line: usize,
    column: usize,
}

fn is_delimiter(c: char) -> bool {
    c.is_whitespace() || matches!(c, '{' | '}' | ',' | ';' | '%')
}

/// Tokenize ontology text into a flat list of positioned tokens.
fn tokenize(text: &str) -> Vec<Spanned> {
    let mut tokens = Vec::new();
    let mut chars = text.chars().peekable();
    let (mut line, mut column) = (1usize, 1usize);

    while let Some(&c) = chars.peek() {
        let (start_line, start_column) = (line, column);
        if c == '\n' {
            chars.next();
            line += 1;
            column = 1;
            continue;
        }
        if c.is_whitespace() {
            chars.next();
            column += 1;
            continue;
        }
        if c == '%' {
            // Comment: skip to end of line, leaving the newline itself
            while let Some(&c) = chars.peek() {
                if c == '\n' {
                    break;
                }
                chars.next();
                column += 1;
            }
            continue;
        }

        let punct = match c {
            '{' => Some(Token::LBrace),
            '}' => Some(Token::RBrace),
            ',' => Some(Token::Comma),
            ';' => Some(Token::Semi),
            _ => None,
        };
        let token = match punct {
            Some(token) => {
                chars.next();
                column += 1;
                token
            }
            None => {
                let mut word = String::new();
                while let Some(&c) = chars.peek() {
                    if is_delimiter(c) {
                        break;
                    }
                    word.push(c);
                    chars.next();
                    column += 1;
                }
                match word.as_str() {
                    "=" => Token::Eq,
                    "=>" => Token::Arrow,
                    "." => Token::Dot,
                    _ => Token::Word(word),
                }
            }
        };
        tokens.push(Spanned {
            token,
            line: start_line,
            column: start_column,
        });
    }

    tokens
}

/// Recursive descent parser over the token list.
struct DocumentParser {
    tokens: Vec<Spanned>,
    pos: usize,
}

impl DocumentParser {
    fn peek(&self) -> Option<&Token> {
        self.tokens.get(self.pos).map(|s| &s.token)
    }

    fn consume(&mut self) -> Option<Spanned> {
        let t = self.tokens.get(self.pos).cloned();
        if t.is_some() {
            self.pos += 1;
        }
        t
    }

    fn error(&self, expected: &str) -> OdlError {
        match self.tokens.get(self.pos) {
            Some(s) => OdlError::Syntax {
                line: s.line,
                column: s.column,
                expected: expected.to_string(),
                found: s.token.describe(),
            },
            None => OdlError::UnexpectedEof {
                expected: expected.to_string(),
            },
        }
    }

    fn expect(&mut self, token: Token) -> Result<(), OdlError> {
        if self.peek() == Some(&token) {
            self.consume();
            Ok(())
        } else {
            Err(self.error(&token.describe()))
        }
    }

    fn keyword(&mut self, keyword: &str) -> Result<(), OdlError> {
        match self.peek() {
            Some(Token::Word(w)) if w == keyword => {
                self.consume();
                Ok(())
            }
            _ => Err(self.error(&format!("'{}'", keyword))),
        }
    }

    fn identifier(&mut self) -> Result<String, OdlError> {
        match self.peek() {
            Some(Token::Word(w)) => {
                let w = w.clone();
                self.pos += 1;
                Ok(w)
            }
            _ => Err(self.error("identifier")),
        }
    }

    /// `{ id, id, ... }`, possibly empty.
    fn list(&mut self) -> Result<Vec<String>, OdlError> {
        self.expect(Token::LBrace)?;
        let mut items = Vec::new();
        if self.peek() == Some(&Token::RBrace) {
            self.consume();
            return Ok(items);
        }
        loop {
            items.push(self.identifier()?);
            match self.peek() {
                Some(Token::Comma) => {
                    self.consume();
                }
                Some(Token::RBrace) => {
                    self.consume();
                    return Ok(items);
                }
                _ => return Err(self.error("',' or '}'")),
            }
        }
    }

    fn triple(&mut self) -> Result<Triple, OdlError> {
        let subject = self.identifier()?;
        self.expect(Token::Eq)?;
        let relation = self.identifier()?;
        self.expect(Token::Arrow)?;
        let object = self.identifier()?;
        self.expect(Token::Semi)?;
        Ok(Triple {
            subject,
            relation,
            object,
        })
    }

    fn document(&mut self) -> Result<Document, OdlError> {
        self.keyword("Ontology")?;
        let name = self.identifier()?;

        self.keyword("concepts")?;
        let concepts = self.list()?;
        self.keyword("individuals")?;
        let individuals = self.list()?;
        self.keyword("relationships")?;
        let relations = self.list()?;

        self.keyword("triples")?;
        self.expect(Token::LBrace)?;
        let mut triples = Vec::new();
        while matches!(self.peek(), Some(Token::Word(_))) {
            triples.push(self.triple()?);
        }
        self.expect(Token::RBrace)?;
        self.expect(Token::Dot)?;

        if self.pos < self.tokens.len() {
            return Err(self.error("end of input"));
        }

        Ok(Document {
            name,
            concepts,
            individuals,
            relations,
            triples,
        })
    }
}

/// Parse ontology description text into a [`Document`].
pub fn parse(text: &str) -> Result<Document, OdlError> {
    DocumentParser {
        tokens: tokenize(text),
        pos: 0,
    }
    .document()
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE: &str = r#"
Ontology Foo

    concepts {
        Resource,
        Task,
        Language
    }

    % Individuals
    individuals {
        Foo,
        FooDevelopment,
        triples
    }

    relationships { }

    triples {
        % Conceptual plan:
        Resource = supports => Foo;
        triples = iof => Library;
        C# = pof => FooCocktail;
    }
.
"#;

    #[test]
    fn test_parse_sample() {
        let doc = parse(SAMPLE).unwrap();
        assert_eq!(doc.name, "Foo");
        assert_eq!(doc.concepts, vec!["Resource", "Task", "Language"]);
        assert_eq!(doc.individuals, vec!["Foo", "FooDevelopment", "triples"]);
        assert!(doc.relations.is_empty());
        assert_eq!(doc.triples.len(), 3);
        assert_eq!(doc.triples[2], Triple::new("C#", "pof", "FooCocktail"));
    }

    #[test]
    fn test_tokenize_operators_and_positions() {
        let tokens = tokenize("a = b => c;\n  x.y .");
        let kinds: Vec<_> = tokens.iter().map(|s| s.token.clone()).collect();
        assert_eq!(
            kinds,
            vec![
                Token::Word("a".into()),
                Token::Eq,
                Token::Word("b".into()),
                Token::Arrow,
                Token::Word("c".into()),
                Token::Semi,
                Token::Word("x.y".into()),
                Token::Dot,
            ]
        );
        assert_eq!((tokens[6].line, tokens[6].column), (2, 3));
    }

    #[test]
    fn test_missing_arrow_is_reported_with_position() {
        let text = "Ontology X concepts {} individuals {} relationships {}\ntriples {\n  a = iof b;\n}\n.";
        let err = parse(text).unwrap_err();
        assert_eq!(
            err,
            OdlError::Syntax {
                line: 3,
                column: 11,
                expected: "'=>'".to_string(),
                found: "'b'".to_string(),
            }
        );
    }

    #[test]
    fn test_trailing_comma_is_rejected() {
        let text = "Ontology X concepts { A, } individuals {} relationships {} triples {} .";
        assert!(matches!(parse(text), Err(OdlError::Syntax { .. })));
    }

    #[test]
    fn test_missing_terminator() {
        let text = "Ontology X concepts {} individuals {} relationships {} triples {}";
        assert_eq!(
            parse(text),
            Err(OdlError::UnexpectedEof {
                expected: "'.'".to_string()
            })
        );
    }
}
