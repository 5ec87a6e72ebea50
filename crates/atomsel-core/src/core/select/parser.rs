//! Recursive descent parser for the selection language.
//!
//! ```text
//! selection  := or_expr EOF
//! or_expr    := and_expr ("or" and_expr)*
//! and_expr   := unary (("and" unary) | juxtaposed)*
//! unary      := "not" unary | spatial | primary
//! spatial    := ("within" | "exwithin") NUMBER "of" unary
//!             | "same" ENTITY "as" unary
//! primary    := "(" or_expr ")" | KEYWORD | FIELD value_list
//! value_list := comparison_op VALUE | item+
//! item       := VALUE | VALUE "to" VALUE | VALUE ":" VALUE
//! ```
//!
//! Juxtaposition is an implicit `and` that only joins two simple predicates
//! (keywords or comparisons).

use super::ast::{CmpOp, Node, NumericItem, NumericTest, SameEntity, Scalar, Test, TextPattern};
use super::error::SelectionError;
use super::keywords::{is_operator_word, is_reserved_name, lookup_field, lookup_keyword};
use super::token::{Token, TokenKind, tokenize};
use crate::core::models::field::{Field, ValueKind};

/// Parses selection text into a syntax tree.
///
/// # Errors
///
/// Returns [`SelectionError::Syntax`] for malformed text and
/// [`SelectionError::InvalidValue`] for literals of the wrong type or bad radii.
pub fn parse(input: &str) -> Result<Node, SelectionError> {
    let tokens = tokenize(input)?;
    Parser::new(input, tokens).parse_selection()
}

struct Parser<'a> {
    input: &'a str,
    tokens: Vec<Token>,
    pos: usize,
}

impl<'a> Parser<'a> {
    fn new(input: &'a str, tokens: Vec<Token>) -> Self {
        Self {
            input,
            tokens,
            pos: 0,
        }
    }

    fn peek(&self) -> &Token {
        // The token stream always ends with Eof, which is never consumed.
        &self.tokens[self.pos.min(self.tokens.len() - 1)]
    }

    fn advance(&mut self) -> Token {
        let token = self.peek().clone();
        if self.pos < self.tokens.len() - 1 {
            self.pos += 1;
        }
        token
    }

    fn error_at(&self, token: &Token, message: impl Into<String>) -> SelectionError {
        SelectionError::syntax(message, token.start, token.text(self.input))
    }

    fn describe(&self, token: &Token) -> String {
        match token.kind {
            TokenKind::Eof => "end of selection".to_string(),
            _ => format!("'{}'", token.text(self.input)),
        }
    }

    fn expect_word(&mut self, word: &str, after: &str) -> Result<(), SelectionError> {
        let token = self.peek().clone();
        if token.is_word(word) {
            self.advance();
            Ok(())
        } else {
            Err(self.error_at(
                &token,
                format!("expected '{word}' after {after}, found {}", self.describe(&token)),
            ))
        }
    }

    fn parse_selection(mut self) -> Result<Node, SelectionError> {
        if matches!(self.peek().kind, TokenKind::Eof) {
            return Err(self.error_at(self.peek(), "empty selection"));
        }
        let node = self.parse_or()?;
        let token = self.peek().clone();
        match token.kind {
            TokenKind::Eof => Ok(node),
            TokenKind::RParen => Err(self.error_at(&token, "unbalanced parentheses: unexpected ')'")),
            _ => Err(self.error_at(&token, format!("unexpected {}", self.describe(&token)))),
        }
    }

    fn parse_or(&mut self) -> Result<Node, SelectionError> {
        let mut left = self.parse_and()?;
        while self.peek().is_word("or") {
            self.advance();
            let right = self.parse_and()?;
            left = Node::Or(Box::new(left), Box::new(right));
        }
        Ok(left)
    }

    fn parse_and(&mut self) -> Result<Node, SelectionError> {
        let mut last_simple = self.is_simple_start(self.peek());
        let mut left = self.parse_unary()?;
        loop {
            let token = self.peek().clone();
            if token.is_word("and") {
                self.advance();
            } else if self.starts_operand(&token) {
                if !last_simple || !self.starts_simple_operand(&token) {
                    return Err(self.error_at(
                        &token,
                        format!(
                            "{} must be joined to the preceding selection with 'and' or 'or'",
                            self.describe(&token)
                        ),
                    ));
                }
            } else {
                break;
            }
            last_simple = self.is_simple_start(self.peek());
            let right = self.parse_unary()?;
            left = Node::And(Box::new(left), Box::new(right));
        }
        Ok(left)
    }

    /// A keyword or a field name starts a simple predicate. A parenthesised
    /// group never does, even around a single keyword.
    fn is_simple_start(&self, token: &Token) -> bool {
        matches!(&token.kind, TokenKind::Word(w) if lookup_keyword(w).is_some() || lookup_field(w).is_some())
    }

    /// Whether `token` could begin another operand of an implicit `and`.
    fn starts_operand(&self, token: &Token) -> bool {
        match &token.kind {
            TokenKind::LParen => true,
            TokenKind::Word(w) => !matches!(w.as_str(), "and" | "or" | "of" | "as" | "to"),
            _ => false,
        }
    }

    /// Unknown words count as simple here so that they are reported as unknown
    /// rather than as an illegal juxtaposition.
    fn starts_simple_operand(&self, token: &Token) -> bool {
        match &token.kind {
            TokenKind::Word(w) => !is_operator_word(w),
            _ => false,
        }
    }

    fn parse_unary(&mut self) -> Result<Node, SelectionError> {
        let token = self.peek().clone();
        match &token.kind {
            TokenKind::Word(w) if w == "not" => {
                self.advance();
                Ok(Node::Not(Box::new(self.parse_unary()?)))
            }
            TokenKind::Word(w) if w == "within" || w == "exwithin" => self.parse_within(),
            TokenKind::Word(w) if w == "same" => self.parse_same(),
            _ => self.parse_primary(),
        }
    }

    fn parse_within(&mut self) -> Result<Node, SelectionError> {
        let keyword = self.advance();
        let keyword_text = keyword.text(self.input).to_string();
        let radius_token = self.peek().clone();

        let radius = match &radius_token.kind {
            TokenKind::Word(w) if !is_operator_word(w) => match w.parse::<f64>() {
                Ok(r) if r.is_finite() && r >= 0.0 => r,
                Ok(_) => {
                    return Err(SelectionError::invalid_value(
                        w,
                        "radius must be a finite, non-negative number",
                        Some(radius_token.start),
                    ));
                }
                Err(_) => {
                    return Err(self.error_at(
                        &radius_token,
                        format!("expected a radius after '{keyword_text}', found '{w}'"),
                    ));
                }
            },
            _ => {
                return Err(self.error_at(
                    &radius_token,
                    format!(
                        "expected a radius after '{keyword_text}', found {}",
                        self.describe(&radius_token)
                    ),
                ));
            }
        };
        self.advance();
        self.expect_word("of", "the radius")?;

        let target = Box::new(self.parse_unary()?);
        Ok(if keyword.is_word("within") {
            Node::Within { radius, target }
        } else {
            Node::Exwithin { radius, target }
        })
    }

    fn parse_same(&mut self) -> Result<Node, SelectionError> {
        self.advance();
        let token = self.peek().clone();
        let entity = match &token.kind {
            TokenKind::Word(w) if w == "residue" => SameEntity::Residue,
            TokenKind::Word(w) => match lookup_field(w) {
                Some(field) => SameEntity::Field(field),
                None => {
                    return Err(self.error_at(
                        &token,
                        format!("expected 'residue' or a field name after 'same', found '{w}'"),
                    ));
                }
            },
            _ => {
                return Err(self.error_at(
                    &token,
                    format!(
                        "expected 'residue' or a field name after 'same', found {}",
                        self.describe(&token)
                    ),
                ));
            }
        };
        self.advance();
        self.expect_word("as", &format!("'same {entity}'"))?;

        let target = Box::new(self.parse_unary()?);
        Ok(Node::SameAs { entity, target })
    }

    fn parse_primary(&mut self) -> Result<Node, SelectionError> {
        let token = self.peek().clone();
        match &token.kind {
            TokenKind::LParen => {
                self.advance();
                let inner = self.parse_or()?;
                let close = self.peek().clone();
                if !matches!(close.kind, TokenKind::RParen) {
                    return Err(self.error_at(
                        &close,
                        format!(
                            "unbalanced parentheses: expected ')', found {}",
                            self.describe(&close)
                        ),
                    ));
                }
                self.advance();
                Ok(inner)
            }
            TokenKind::Word(w) => {
                if let Some(keyword) = lookup_keyword(w) {
                    self.advance();
                    Ok(Node::Keyword(keyword))
                } else if let Some(field) = lookup_field(w) {
                    self.advance();
                    self.parse_value_list(field, &token)
                } else if is_operator_word(w) {
                    Err(self.error_at(&token, format!("expected a selection, found '{w}'")))
                } else {
                    Err(self.error_at(&token, format!("unknown keyword or field '{w}'")))
                }
            }
            TokenKind::Quoted(_) => Err(self.error_at(
                &token,
                "a quoted value cannot be used where a keyword or field is expected",
            )),
            TokenKind::RParen => Err(self.error_at(&token, "unbalanced parentheses: unexpected ')'")),
            _ => Err(self.error_at(
                &token,
                format!("expected a selection, found {}", self.describe(&token)),
            )),
        }
    }

    fn is_value(token: &Token) -> bool {
        match &token.kind {
            TokenKind::Quoted(_) => true,
            TokenKind::Word(w) => !is_operator_word(w) && !is_reserved_name(w),
            _ => false,
        }
    }

    fn expect_value(&mut self, after: &str) -> Result<Token, SelectionError> {
        let token = self.peek().clone();
        if Self::is_value(&token) {
            self.advance();
            Ok(token)
        } else {
            Err(self.error_at(
                &token,
                format!("expected a value after {after}, found {}", self.describe(&token)),
            ))
        }
    }

    fn parse_value_list(&mut self, field: Field, field_token: &Token) -> Result<Node, SelectionError> {
        let field_text = format!("'{}'", field_token.text(self.input));

        if let TokenKind::Op(op) = self.peek().kind {
            let op_token = self.advance();
            if field.kind() == ValueKind::Text && !matches!(op, CmpOp::Eq | CmpOp::Ne) {
                return Err(self.error_at(
                    &op_token,
                    format!("operator '{}' is not allowed for text field {field_text}", op.symbol()),
                ));
            }
            let value = self.expect_value(&format!("'{}'", op.symbol()))?;
            let test = match field.kind() {
                ValueKind::Text => Test::Text {
                    negated: op == CmpOp::Ne,
                    patterns: vec![self.pattern(&value)?],
                },
                _ => Test::Numeric(NumericTest::Compare(op, self.scalar(field, &value)?)),
            };
            return Ok(Node::Comparison { field, test });
        }

        let test = if field.kind() == ValueKind::Text {
            let mut patterns = Vec::new();
            while Self::is_value(self.peek()) {
                let value = self.advance();
                patterns.push(self.pattern(&value)?);
                let next = self.peek().clone();
                if next.is_word("to") || matches!(next.kind, TokenKind::Colon) {
                    return Err(self.error_at(
                        &next,
                        format!("ranges are not allowed for text field {field_text}"),
                    ));
                }
            }
            if patterns.is_empty() {
                return Err(self.missing_value(&field_text));
            }
            Test::Text {
                negated: false,
                patterns,
            }
        } else {
            let mut items = Vec::new();
            while Self::is_value(self.peek()) {
                let low_token = self.advance();
                let low = self.scalar(field, &low_token)?;
                let next = self.peek().clone();
                if next.is_word("to") || matches!(next.kind, TokenKind::Colon) {
                    self.advance();
                    let separator = self.describe(&next);
                    let high_token = self.expect_value(&separator)?;
                    let high = self.scalar(field, &high_token)?;
                    items.push(NumericItem::Range(low, high));
                } else {
                    items.push(NumericItem::Single(low));
                }
            }
            if items.is_empty() {
                return Err(self.missing_value(&field_text));
            }
            Test::Numeric(NumericTest::Members(items))
        };
        Ok(Node::Comparison { field, test })
    }

    fn missing_value(&self, field_text: &str) -> SelectionError {
        let token = self.peek();
        self.error_at(
            token,
            format!("expected a value after {field_text}, found {}", self.describe(token)),
        )
    }

    fn value_text(token: &Token) -> &str {
        match &token.kind {
            TokenKind::Word(w) | TokenKind::Quoted(w) => w,
            _ => "",
        }
    }

    fn pattern(&self, token: &Token) -> Result<TextPattern, SelectionError> {
        match &token.kind {
            TokenKind::Quoted(value) => Ok(TextPattern::Exact(value.clone())),
            _ => {
                let word = Self::value_text(token);
                TextPattern::from_word(word).map_err(|e| {
                    SelectionError::invalid_value(word, e.to_string(), Some(token.start))
                })
            }
        }
    }

    fn scalar(&self, field: Field, token: &Token) -> Result<Scalar, SelectionError> {
        let text = Self::value_text(token).trim();
        let invalid = |message: String| {
            SelectionError::invalid_value(text, message, Some(token.start))
        };
        match field.kind() {
            ValueKind::Integer => match text.parse::<i64>() {
                Ok(v) => Ok(Scalar::Integer(v)),
                Err(_) if text.parse::<f64>().is_ok() => {
                    Err(invalid(format!("field '{field}' expects an integer")))
                }
                Err(_) => Err(invalid(format!("field '{field}' expects a number"))),
            },
            _ => match text.parse::<f64>() {
                Ok(v) if v.is_finite() => Ok(Scalar::Float(v)),
                Ok(_) => Err(invalid(format!("field '{field}' expects a finite number"))),
                Err(_) => Err(invalid(format!("field '{field}' expects a number"))),
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::models::field::{FloatField, IntegerField, TextField};
    use crate::core::select::ast::{Glob, Keyword};

    fn canonical(input: &str) -> String {
        parse(input).unwrap().to_string()
    }

    fn syntax_position(input: &str) -> usize {
        match parse(input) {
            Err(SelectionError::Syntax { position, .. }) => position,
            other => panic!("expected syntax error for {input:?}, got {other:?}"),
        }
    }

    #[test]
    fn parses_keywords_and_text_comparisons() {
        assert_eq!(parse("protein").unwrap(), Node::Keyword(Keyword::Protein));
        assert_eq!(
            parse("name CA CB").unwrap(),
            Node::Comparison {
                field: Field::Text(TextField::Name),
                test: Test::Text {
                    negated: false,
                    patterns: vec![
                        TextPattern::Exact("CA".into()),
                        TextPattern::Exact("CB".into())
                    ],
                },
            }
        );
        assert_eq!(
            parse("name != CA").unwrap(),
            Node::Comparison {
                field: Field::Text(TextField::Name),
                test: Test::Text {
                    negated: true,
                    patterns: vec![TextPattern::Exact("CA".into())],
                },
            }
        );
    }

    #[test]
    fn unquoted_wildcards_compile_to_globs_and_quoted_ones_stay_literal() {
        let Node::Comparison {
            test: Test::Text { patterns, .. },
            ..
        } = parse("name C? \"C*\" H*").unwrap()
        else {
            panic!("expected a text comparison");
        };
        assert_eq!(
            patterns,
            vec![
                TextPattern::Glob(Glob::new("C?").unwrap()),
                TextPattern::Exact("C*".into()),
                TextPattern::Glob(Glob::new("H*").unwrap()),
            ]
        );
        assert!(patterns[0].matches("CB"));
        assert!(!patterns[0].matches("CB1"));
        assert!(!patterns[1].matches("CA"));
        assert!(patterns[2].matches("HB21"));
    }

    #[test]
    fn parses_numeric_ranges_and_sets() {
        assert_eq!(
            parse("resnum 10 to 50").unwrap(),
            Node::Comparison {
                field: Field::Integer(IntegerField::Resnum),
                test: Test::Numeric(NumericTest::Members(vec![NumericItem::Range(
                    Scalar::Integer(10),
                    Scalar::Integer(50)
                )])),
            }
        );
        assert_eq!(canonical("resid 1 3:5 9"), "resnum 1 3 to 5 9");
        assert_eq!(
            parse("beta >= 20").unwrap(),
            Node::Comparison {
                field: Field::Float(FloatField::Beta),
                test: Test::Numeric(NumericTest::Compare(CmpOp::Ge, Scalar::Float(20.0))),
            }
        );
        assert_eq!(canonical("charge < -0.5"), "charge < -0.5");
    }

    #[test]
    fn precedence_is_not_then_and_then_or() {
        assert_eq!(
            canonical("not water and protein or ion"),
            "((not water and protein) or ion)"
        );
        assert_eq!(
            canonical("water or protein and ion"),
            "(water or (protein and ion))"
        );
        assert_eq!(
            canonical("protein and (water or ion)"),
            "(protein and (water or ion))"
        );
    }

    #[test]
    fn juxtaposed_simple_predicates_are_anded() {
        assert_eq!(
            canonical("protein name CA chain A"),
            "((protein and name CA) and chain A)"
        );
    }

    #[test]
    fn bare_within_after_a_predicate_is_a_syntax_error() {
        let err = parse("protein within 5 of water").unwrap_err();
        match err {
            SelectionError::Syntax { position, token, .. } => {
                assert_eq!(position, 8);
                assert_eq!(token, "within");
            }
            other => panic!("unexpected error {other:?}"),
        }
        assert_eq!(
            canonical("protein and within 5 of water"),
            "(protein and within 5 of water)"
        );
    }

    #[test]
    fn juxtaposition_rejects_non_simple_operands_on_either_side() {
        assert_eq!(syntax_position("protein not water"), 8);
        assert_eq!(syntax_position("protein (water)"), 8);
        assert_eq!(syntax_position("within 5 of water protein"), 18);
        assert_eq!(syntax_position("(protein) water"), 10);
        assert_eq!(syntax_position("protein same residue as water"), 8);
    }

    #[test]
    fn spatial_operand_binds_like_not() {
        assert_eq!(
            canonical("within 5 of water and protein"),
            "(within 5 of water and protein)"
        );
        assert_eq!(
            canonical("exwithin 3.5 of (resname LIG or ion)"),
            "exwithin 3.5 of (resname LIG or ion)"
        );
        assert_eq!(
            canonical("same residue as within 4 of ion"),
            "same residue as within 4 of ion"
        );
        assert_eq!(canonical("same chid as name CA"), "same chain as name CA");
    }

    #[test]
    fn canonical_form_normalizes_spelling() {
        assert_eq!(canonical("  resid   10:20 "), canonical("resnum 10 to 20"));
        assert_eq!(canonical("name 'CA'"), canonical("name CA"));
        assert_eq!(canonical("beta > 5.0"), canonical("bfactor>5"));
        assert_eq!(canonical("segname \"MY SEG\""), "segment \"MY SEG\"");
    }

    #[test]
    fn canonical_form_reparses_to_the_same_tree() {
        for input in [
            "protein and within 5 of water",
            "not (name CA CB or resname 'and') and beta <= 3.25",
            "same residue as exwithin 2 of (chain A and resnum -3 to 7)",
            "name C* H?1 \"O5*\" and element != ''",
        ] {
            let tree = parse(input).unwrap();
            assert_eq!(parse(&tree.to_string()).unwrap(), tree, "input {input:?}");
        }
    }

    #[test]
    fn quoted_keywords_are_values() {
        assert_eq!(
            parse("resname 'water'").unwrap(),
            Node::Comparison {
                field: Field::Text(TextField::Resname),
                test: Test::Text {
                    negated: false,
                    patterns: vec![TextPattern::Exact("water".into())],
                },
            }
        );
    }

    #[test]
    fn unknown_words_and_missing_pieces_are_syntax_errors() {
        assert_eq!(syntax_position("protien"), 0);
        assert_eq!(syntax_position("protein and foo"), 12);
        assert_eq!(syntax_position("name"), 4);
        assert_eq!(syntax_position("name and protein"), 5);
        assert_eq!(syntax_position("within of water"), 7);
        assert_eq!(syntax_position("within five of water"), 7);
        assert_eq!(syntax_position("within 5 water"), 9);
        assert_eq!(syntax_position("same atom as water"), 5);
        assert_eq!(syntax_position("same residue water"), 13);
        assert_eq!(syntax_position(""), 0);
        assert_eq!(syntax_position("protein and"), 11);
        assert_eq!(syntax_position("'CA'"), 0);
    }

    #[test]
    fn unbalanced_parentheses_are_syntax_errors() {
        assert_eq!(syntax_position("(protein and water"), 18);
        assert_eq!(syntax_position("protein)"), 7);
        assert_eq!(syntax_position("()"), 1);
    }

    #[test]
    fn operators_are_restricted_by_field_type() {
        assert_eq!(syntax_position("name < CA"), 5);
        assert_eq!(syntax_position("chain A to C"), 8);
    }

    #[test]
    fn wrongly_typed_literals_are_invalid_values() {
        assert!(matches!(
            parse("resnum ten"),
            Err(SelectionError::InvalidValue { position: Some(7), .. })
        ));
        assert!(matches!(
            parse("resnum 1.5"),
            Err(SelectionError::InvalidValue { .. })
        ));
        assert!(matches!(
            parse("beta > high"),
            Err(SelectionError::InvalidValue { .. })
        ));
        assert!(matches!(
            parse("x < inf"),
            Err(SelectionError::InvalidValue { .. })
        ));
    }

    #[test]
    fn negative_or_non_finite_radius_is_an_invalid_value() {
        assert!(matches!(
            parse("within -1 of water"),
            Err(SelectionError::InvalidValue { position: Some(7), .. })
        ));
        assert!(matches!(
            parse("within nan of water"),
            Err(SelectionError::InvalidValue { .. })
        ));
        assert!(parse("within 0 of water").is_ok());
    }
}
