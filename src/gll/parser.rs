//! Grammar parser
//!
//! Consumes [`Token`]s and builds a [`Grammar`]. The parser is an explicit
//! state machine (`START` → `GOT_RULE_NAME` → `IN_RULE` → `START` on `;`)
//! plus a stack of frames, one per open `{ }` group and one for the rule
//! body itself. Every token either advances the machine or is rejected with
//! a [`GrammarError`]; there is no recovery.
//!
//! # Example
//!
//! ```rust
//! use gllgen::gll::{parse_grammar_text, RuleNode};
//!
//! let grammar = parse_grammar_text("Value = \"foo\"?;").unwrap();
//! assert_eq!(
//!     grammar.get("Value"),
//!     Some(&RuleNode::optional(RuleNode::string("foo")))
//! );
//! ```

use super::grammar::{Grammar, RuleNode};
use super::lexer::{LexError, Lexer, Token};
use crate::logging::{log_debug, log_trace};
use std::fmt;
use thiserror::Error;

/// Errors raised while turning grammar source into a [`Grammar`]
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum GrammarError {
    /// The source could not be tokenized
    #[error(transparent)]
    Lex(#[from] LexError),

    /// A rule name was declared twice
    #[error("Duplicate rule: {rule}")]
    DuplicateRule {
        /// Rule name
        rule: String,
    },

    /// Two branches of one alternation carry the same label
    #[error("Duplicate variant {variant} in rule {rule}")]
    DuplicateVariant {
        /// Rule being parsed
        rule: String,
        /// Repeated label
        variant: String,
    },

    /// `:` after something other than a bare name
    #[error("In rule {rule}: `:` must follow a bare name, not a valid label")]
    InvalidLabel {
        /// Rule being parsed
        rule: String,
    },

    /// `:` with nothing before it
    #[error("In rule {rule}: missing label before `:`")]
    MissingLabel {
        /// Rule being parsed
        rule: String,
    },

    /// `label:` with nothing after it
    #[error("In rule {rule}: label `{label}` is not followed by anything")]
    DanglingLabel {
        /// Rule being parsed
        rule: String,
        /// The label
        label: String,
    },

    /// `?`, `*` or `+` with nothing to apply to
    #[error("In rule {rule}: `{quantifier}` has nothing to quantify")]
    NothingToQuantify {
        /// Rule being parsed
        rule: String,
        /// The quantifier token
        quantifier: Token,
    },

    /// `%` or `%%` not preceded by a freshly quantified repetition
    #[error("In rule {rule}: left side of `{operator}` must be a `*` or `+` repetition")]
    SeparatorWithoutRepetition {
        /// Rule being parsed
        rule: String,
        /// `%` or `%%`
        operator: Token,
    },

    /// A second separator for one repetition
    #[error("In rule {rule}: repetition already has a separator")]
    SeparatorAlreadySet {
        /// Rule being parsed
        rule: String,
    },

    /// `%` or `%%` not followed by a string
    #[error("In rule {rule}: right side of `{operator}` must be a string, found `{found}`")]
    SeparatorWithoutString {
        /// Rule being parsed
        rule: String,
        /// `%` or `%%`
        operator: Token,
        /// Token found instead
        found: Token,
    },

    /// `;` while a `{` group is still open
    #[error("In rule {rule}: {depth} unclosed group(s)")]
    UnclosedGroup {
        /// Rule being parsed
        rule: String,
        /// Number of open groups
        depth: usize,
    },

    /// `}` without matching `{`
    #[error("In rule {rule}: `}}` without matching `{{`")]
    UnmatchedClose {
        /// Rule being parsed
        rule: String,
    },

    /// `{}`
    #[error("In rule {rule}: empty group")]
    EmptyGroup {
        /// Rule being parsed
        rule: String,
    },

    /// `|` with an empty clause on one side
    #[error("In rule {rule}: empty alternative")]
    EmptyAlternative {
        /// Rule being parsed
        rule: String,
    },

    /// `Name = ;`
    #[error("Rule {rule} has an empty body")]
    EmptyRule {
        /// Rule being parsed
        rule: String,
    },

    /// A token that is not allowed in the current state
    #[error("Unexpected `{token}` in state {state}{}", rule_suffix(.rule))]
    UnexpectedToken {
        /// Parser state
        state: ParserState,
        /// Offending token
        token: Token,
        /// Rule being parsed, if any
        rule: Option<String>,
    },

    /// Input ended in the middle of a rule
    #[error("Unexpected end of input in rule {rule}")]
    UnexpectedEof {
        /// Rule being parsed
        rule: String,
    },
}

fn rule_suffix(rule: &Option<String>) -> String {
    match rule {
        Some(rule) => format!(" (rule {})", rule),
        None => String::new(),
    }
}

/// States of the grammar parser
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ParserState {
    /// No rule open
    Start,
    /// Rule name seen, waiting for `=`
    GotRuleName,
    /// Accumulating a rule body
    InRule,
}

impl fmt::Display for ParserState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            ParserState::Start => "START",
            ParserState::GotRuleName => "GOT_RULE_NAME",
            ParserState::InRule => "IN_RULE",
        })
    }
}

/// Entry of a frame before post-processing
#[derive(Debug)]
enum Item {
    Node(RuleNode),
    /// `name:` waiting for the item it labels
    Label(String),
    /// `|` between clauses
    Pipe,
}

#[derive(Debug, Default)]
struct Frame {
    items: Vec<Item>,
    /// A `|` opened this frame before any item
    leading_pipe: bool,
}

/// Push parser turning tokens into a [`Grammar`]
#[derive(Debug)]
pub struct GrammarParser {
    state: ParserState,
    grammar: Grammar,
    rule: String,
    frames: Vec<Frame>,
    /// `%` or `%%` waiting for its string
    pending_separator: Option<Token>,
}

impl Default for GrammarParser {
    fn default() -> Self {
        Self::new()
    }
}

impl GrammarParser {
    /// Create a parser in state `START`
    pub fn new() -> Self {
        Self {
            state: ParserState::Start,
            grammar: Grammar::new(),
            rule: String::new(),
            frames: Vec::new(),
            pending_separator: None,
        }
    }

    /// Current state
    pub fn state(&self) -> ParserState {
        self.state
    }

    /// Process one token
    pub fn feed(&mut self, token: Token) -> Result<(), GrammarError> {
        log_trace!("{} <- {:?}", self.state, token);
        match self.state {
            ParserState::Start => match token {
                Token::Name(name) => {
                    if self.grammar.contains(&name) {
                        return Err(GrammarError::DuplicateRule { rule: name });
                    }
                    self.rule = name;
                    self.state = ParserState::GotRuleName;
                    Ok(())
                }
                token => Err(self.unexpected(token)),
            },
            ParserState::GotRuleName => match token {
                Token::Equal => {
                    self.frames.push(Frame::default());
                    self.state = ParserState::InRule;
                    Ok(())
                }
                token => Err(self.unexpected(token)),
            },
            ParserState::InRule => self.feed_body(token),
        }
    }

    /// Finish parsing and return the grammar
    pub fn finish(self) -> Result<Grammar, GrammarError> {
        match self.state {
            ParserState::Start => Ok(self.grammar),
            _ => Err(GrammarError::UnexpectedEof { rule: self.rule }),
        }
    }

    fn unexpected(&self, token: Token) -> GrammarError {
        GrammarError::UnexpectedToken {
            state: self.state,
            token,
            rule: match self.state {
                ParserState::Start => None,
                _ => Some(self.rule.clone()),
            },
        }
    }

    fn top(&mut self) -> &mut Frame {
        // The body frame exists for as long as the state is IN_RULE
        let last = self.frames.len() - 1;
        &mut self.frames[last]
    }

    fn feed_body(&mut self, token: Token) -> Result<(), GrammarError> {
        if let Some(operator) = self.pending_separator.take() {
            return self.apply_separator(operator, token);
        }

        match token {
            Token::Name(name) => self.push_node(RuleNode::SymbolName(name)),
            Token::String(text) => self.push_node(RuleNode::StringLiteral(text)),
            Token::CharacterRange(from, to) => self.push_node(RuleNode::CharacterRange(from, to)),
            Token::LeftBrace => self.frames.push(Frame::default()),
            Token::RightBrace => {
                if self.frames.len() == 1 {
                    return Err(GrammarError::UnmatchedClose {
                        rule: self.rule.clone(),
                    });
                }
                let frame = self.frames.pop().unwrap_or_default();
                let node = self.postprocess(frame)?;
                self.push_node(node);
            }
            Token::Pipe => {
                let top = self.top();
                if top.items.is_empty() && !top.leading_pipe {
                    top.leading_pipe = true;
                } else {
                    top.items.push(Item::Pipe);
                }
            }
            Token::Colon => {
                let rule = self.rule.clone();
                let top = self.top();
                match top.items.pop() {
                    Some(Item::Node(RuleNode::SymbolName(label))) => {
                        top.items.push(Item::Label(label));
                    }
                    None => return Err(GrammarError::MissingLabel { rule }),
                    Some(_) => return Err(GrammarError::InvalidLabel { rule }),
                }
            }
            Token::QuestionMark | Token::Star | Token::Plus => self.quantify(token)?,
            Token::Percent | Token::DoublePercent => {
                let has_separator = match self.top().items.last() {
                    Some(Item::Node(RuleNode::Repeated { separator, .. })) => {
                        Some(separator.is_some())
                    }
                    _ => None,
                };
                match has_separator {
                    Some(false) => self.pending_separator = Some(token),
                    Some(true) => {
                        return Err(GrammarError::SeparatorAlreadySet {
                            rule: self.rule.clone(),
                        })
                    }
                    None => {
                        return Err(GrammarError::SeparatorWithoutRepetition {
                            rule: self.rule.clone(),
                            operator: token,
                        })
                    }
                }
            }
            Token::Semicolon => self.close_rule()?,
            Token::Equal => return Err(self.unexpected(token)),
        }
        Ok(())
    }

    fn push_node(&mut self, node: RuleNode) {
        self.top().items.push(Item::Node(node));
    }

    fn quantify(&mut self, quantifier: Token) -> Result<(), GrammarError> {
        let node = match self.top().items.pop() {
            Some(Item::Node(node)) => node,
            other => {
                if let Some(item) = other {
                    self.top().items.push(item);
                }
                return Err(GrammarError::NothingToQuantify {
                    rule: self.rule.clone(),
                    quantifier,
                });
            }
        };
        let wrapped = match quantifier {
            Token::QuestionMark => RuleNode::optional(node),
            Token::Plus => RuleNode::repeated(true, node),
            _ => RuleNode::repeated(false, node),
        };
        self.push_node(wrapped);
        Ok(())
    }

    fn apply_separator(&mut self, operator: Token, token: Token) -> Result<(), GrammarError> {
        let text = match token {
            Token::String(text) => text,
            found => {
                return Err(GrammarError::SeparatorWithoutString {
                    rule: self.rule.clone(),
                    operator,
                    found,
                })
            }
        };
        if let Some(Item::Node(RuleNode::Repeated {
            separator,
            allow_trailing,
            ..
        })) = self.top().items.last_mut()
        {
            *separator = Some(text);
            *allow_trailing = operator == Token::DoublePercent;
        }
        Ok(())
    }

    fn close_rule(&mut self) -> Result<(), GrammarError> {
        if self.frames.len() > 1 {
            return Err(GrammarError::UnclosedGroup {
                rule: self.rule.clone(),
                depth: self.frames.len() - 1,
            });
        }
        let frame = self.frames.pop().unwrap_or_default();
        // The rule is closed even when it is rejected below
        self.state = ParserState::Start;
        if frame.items.is_empty() && !frame.leading_pipe {
            return Err(GrammarError::EmptyRule {
                rule: self.rule.clone(),
            });
        }
        let body = self.postprocess(frame)?;
        let rule = std::mem::take(&mut self.rule);

        log_debug!("Recorded rule {} = {}", rule, body);
        self.grammar.insert(rule, body);
        Ok(())
    }

    /// Bind labels, then split on `|`
    fn postprocess(&self, frame: Frame) -> Result<RuleNode, GrammarError> {
        if frame.items.is_empty() {
            return Err(if frame.leading_pipe {
                GrammarError::EmptyAlternative {
                    rule: self.rule.clone(),
                }
            } else {
                GrammarError::EmptyGroup {
                    rule: self.rule.clone(),
                }
            });
        }

        let mut clauses: Vec<Vec<RuleNode>> = vec![Vec::new()];
        let mut items = frame.items.into_iter();
        while let Some(item) = items.next() {
            match item {
                Item::Node(node) => push_last(&mut clauses, node),
                Item::Pipe => clauses.push(Vec::new()),
                Item::Label(label) => match items.next() {
                    Some(Item::Node(node)) => {
                        push_last(&mut clauses, RuleNode::labeled(label, node))
                    }
                    _ => {
                        return Err(GrammarError::DanglingLabel {
                            rule: self.rule.clone(),
                            label,
                        })
                    }
                },
            }
        }

        let mut branches = Vec::with_capacity(clauses.len());
        for mut clause in clauses {
            let node = match clause.len() {
                0 => {
                    return Err(GrammarError::EmptyAlternative {
                        rule: self.rule.clone(),
                    })
                }
                1 => clause.pop().unwrap_or(RuleNode::Empty),
                _ => RuleNode::Concatenation(clause),
            };
            branches.push(node);
        }

        if branches.len() == 1 {
            return Ok(branches.pop().unwrap_or(RuleNode::Empty));
        }

        let mut seen: Vec<&str> = Vec::new();
        for label in branches.iter().filter_map(RuleNode::label) {
            if seen.contains(&label) {
                return Err(GrammarError::DuplicateVariant {
                    rule: self.rule.clone(),
                    variant: label.to_string(),
                });
            }
            seen.push(label);
        }
        Ok(RuleNode::Alternation(branches))
    }
}

fn push_last(clauses: &mut [Vec<RuleNode>], node: RuleNode) {
    if let Some(clause) = clauses.last_mut() {
        clause.push(node);
    }
}

/// Parse an already tokenized grammar
pub fn parse_tokens<I>(tokens: I) -> Result<Grammar, GrammarError>
where
    I: IntoIterator<Item = Token>,
{
    let mut parser = GrammarParser::new();
    for token in tokens {
        parser.feed(token)?;
    }
    parser.finish()
}

/// Lex and parse grammar source text
pub fn parse_grammar_text(text: &str) -> Result<Grammar, GrammarError> {
    let mut parser = GrammarParser::new();
    for token in Lexer::new(text) {
        parser.feed(token?)?;
    }
    parser.finish()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn name(s: &str) -> Token {
        Token::Name(s.to_string())
    }

    fn string(s: &str) -> Token {
        Token::String(s.to_string())
    }

    fn grammar(rules: Vec<(&str, RuleNode)>) -> Grammar {
        Grammar::from_rules(rules).unwrap()
    }

    // ========================================================================
    // Token streams
    // ========================================================================

    #[test]
    fn test_bar_prefixed_label() {
        let tokens = vec![
            name("Value"),
            Token::Equal,
            Token::Pipe,
            name("Foo"),
            Token::Colon,
            string("foo"),
            Token::Semicolon,
        ];
        assert_eq!(
            parse_tokens(tokens).unwrap(),
            grammar(vec![(
                "Value",
                RuleNode::labeled("Foo", RuleNode::string("foo"))
            )])
        );
    }

    #[test]
    fn test_option() {
        let tokens = vec![
            name("Value"),
            Token::Equal,
            string("foo"),
            Token::QuestionMark,
            Token::Semicolon,
        ];
        assert_eq!(
            parse_tokens(tokens).unwrap(),
            grammar(vec![("Value", RuleNode::optional(RuleNode::string("foo")))])
        );
    }

    #[test]
    fn test_repeat_with_separator() {
        let tokens = vec![
            name("Value"),
            Token::Equal,
            string("foo"),
            Token::Star,
            Token::Percent,
            string("bar"),
            Token::Semicolon,
        ];
        assert_eq!(
            parse_tokens(tokens).unwrap(),
            grammar(vec![(
                "Value",
                RuleNode::separated(false, RuleNode::string("foo"), "bar", false)
            )])
        );
    }

    #[test]
    fn test_duplicate_rule() {
        let tokens = vec![
            name("Value"),
            Token::Equal,
            string("foo"),
            Token::Semicolon,
            name("Value"),
            Token::Equal,
            string("bar"),
            Token::Semicolon,
        ];
        let err = parse_tokens(tokens).unwrap_err();
        assert_eq!(err.to_string(), "Duplicate rule: Value");
    }

    // ========================================================================
    // Source text
    // ========================================================================

    #[test]
    fn test_trivial_rule() {
        let g = parse_grammar_text("Value = \"foo\";").unwrap();
        assert_eq!(g, grammar(vec![("Value", RuleNode::string("foo"))]));
    }

    #[test]
    fn test_alternation() {
        let g = parse_grammar_text("Value = | \"foo\" | Bar;").unwrap();
        assert_eq!(
            g.get("Value"),
            Some(&RuleNode::Alternation(vec![
                RuleNode::string("foo"),
                RuleNode::symbol("Bar"),
            ]))
        );
    }

    #[test]
    fn test_concatenation_inside_alternation() {
        let g = parse_grammar_text("Value = { \"(\" Foo \")\" | Bar };").unwrap();
        assert_eq!(
            g.get("Value"),
            Some(&RuleNode::Alternation(vec![
                RuleNode::Concatenation(vec![
                    RuleNode::string("("),
                    RuleNode::symbol("Foo"),
                    RuleNode::string(")"),
                ]),
                RuleNode::symbol("Bar"),
            ]))
        );
    }

    #[test]
    fn test_top_level_items_form_a_concatenation() {
        let g = parse_grammar_text("Expr = attrs:OuterAttr* kind:ExprKind;").unwrap();
        assert_eq!(
            g.get("Expr"),
            Some(&RuleNode::Concatenation(vec![
                RuleNode::labeled("attrs", RuleNode::repeated(false, RuleNode::symbol("OuterAttr"))),
                RuleNode::labeled("kind", RuleNode::symbol("ExprKind")),
            ]))
        );
    }

    #[test]
    fn test_option_group() {
        let g = parse_grammar_text("Value = { \"foo\" Bar }?;").unwrap();
        assert_eq!(
            g.get("Value"),
            Some(&RuleNode::optional(RuleNode::Concatenation(vec![
                RuleNode::string("foo"),
                RuleNode::symbol("Bar"),
            ])))
        );
    }

    #[test]
    fn test_trailing_separator() {
        let g = parse_grammar_text("List = Item+ %% \",\";").unwrap();
        assert_eq!(
            g.get("List"),
            Some(&RuleNode::separated(true, RuleNode::symbol("Item"), ",", true))
        );
    }

    #[test]
    fn test_label_on_group() {
        let g = parse_grammar_text("Value = body:{ A B };").unwrap();
        assert_eq!(
            g.get("Value"),
            Some(&RuleNode::labeled(
                "body",
                RuleNode::Concatenation(vec![RuleNode::symbol("A"), RuleNode::symbol("B")])
            ))
        );
    }

    #[test]
    fn test_labeled_repetition() {
        let g = parse_grammar_text("Value = items:Item* % \",\";").unwrap();
        assert_eq!(
            g.get("Value"),
            Some(&RuleNode::labeled(
                "items",
                RuleNode::separated(false, RuleNode::symbol("Item"), ",", false)
            ))
        );
    }

    #[test]
    fn test_named_variants() {
        let src = "Op = |Add: \"+\" |Sub: \"-\";";
        let g = parse_grammar_text(src).unwrap();
        assert_eq!(
            g.get("Op"),
            Some(&RuleNode::Alternation(vec![
                RuleNode::labeled("Add", RuleNode::string("+")),
                RuleNode::labeled("Sub", RuleNode::string("-")),
            ]))
        );
    }

    #[test]
    fn test_multiple_rules_keep_order() {
        let g = parse_grammar_text("B = A; A = \"a\"; C = B;").unwrap();
        assert_eq!(g.rule_names().collect::<Vec<_>>(), vec!["B", "A", "C"]);
    }

    // ========================================================================
    // Errors
    // ========================================================================

    #[test]
    fn test_unterminated_string() {
        let err = parse_grammar_text("A = \"foo;").unwrap_err();
        assert!(matches!(err, GrammarError::Lex(LexError::UnterminatedString { .. })));
    }

    #[test]
    fn test_duplicate_variant() {
        let err = parse_grammar_text("A = |X: \"x\" |X: \"y\";").unwrap_err();
        assert_eq!(
            err,
            GrammarError::DuplicateVariant {
                rule: "A".to_string(),
                variant: "X".to_string()
            }
        );
    }

    #[test]
    fn test_label_errors() {
        let err = parse_grammar_text("A = : B;").unwrap_err();
        assert!(matches!(err, GrammarError::MissingLabel { .. }));

        let err = parse_grammar_text("A = \"x\": B;").unwrap_err();
        assert!(matches!(err, GrammarError::InvalidLabel { .. }));

        let err = parse_grammar_text("A = { x: };").unwrap_err();
        assert!(matches!(err, GrammarError::DanglingLabel { ref label, .. } if label == "x"));
    }

    #[test]
    fn test_nothing_to_quantify() {
        let err = parse_grammar_text("A = *;").unwrap_err();
        assert!(matches!(err, GrammarError::NothingToQuantify { .. }));

        let err = parse_grammar_text("A = x:?;").unwrap_err();
        assert!(matches!(err, GrammarError::NothingToQuantify { .. }));
    }

    #[test]
    fn test_separator_errors() {
        let err = parse_grammar_text("A = B % \",\";").unwrap_err();
        assert!(matches!(err, GrammarError::SeparatorWithoutRepetition { .. }));
        assert!(err.to_string().contains("left side"));

        let err = parse_grammar_text("A = B* % C;").unwrap_err();
        assert!(matches!(err, GrammarError::SeparatorWithoutString { .. }));
        assert!(err.to_string().contains("right side"));

        let err = parse_grammar_text("A = B* % \",\" % \";\";").unwrap_err();
        assert!(matches!(err, GrammarError::SeparatorAlreadySet { .. }));
    }

    #[test]
    fn test_group_errors() {
        let err = parse_grammar_text("A = { B;").unwrap_err();
        assert_eq!(
            err,
            GrammarError::UnclosedGroup {
                rule: "A".to_string(),
                depth: 1
            }
        );

        let err = parse_grammar_text("A = B };").unwrap_err();
        assert!(matches!(err, GrammarError::UnmatchedClose { .. }));

        let err = parse_grammar_text("A = {};").unwrap_err();
        assert!(matches!(err, GrammarError::EmptyGroup { .. }));

        let err = parse_grammar_text("A = { B | | C };").unwrap_err();
        assert!(matches!(err, GrammarError::EmptyAlternative { .. }));

        let err = parse_grammar_text("A = B |;").unwrap_err();
        assert!(matches!(err, GrammarError::EmptyAlternative { .. }));
    }

    #[test]
    fn test_empty_rule() {
        let err = parse_grammar_text("A = ;").unwrap_err();
        assert_eq!(err.to_string(), "Rule A has an empty body");
    }

    #[test]
    fn test_rejected_rule_returns_to_start() {
        let mut parser = GrammarParser::new();
        parser.feed(name("A")).unwrap();
        parser.feed(Token::Equal).unwrap();
        let err = parser.feed(Token::Semicolon).unwrap_err();
        assert!(matches!(err, GrammarError::EmptyRule { .. }));
        assert_eq!(parser.state(), ParserState::Start);

        // A body rejected while closing leaves the parser usable as well
        for token in [name("B"), Token::Equal, name("x"), Token::Colon] {
            parser.feed(token).unwrap();
        }
        let err = parser.feed(Token::Semicolon).unwrap_err();
        assert!(matches!(err, GrammarError::DanglingLabel { .. }));
        assert_eq!(parser.state(), ParserState::Start);

        for token in [name("C"), Token::Equal, string("c"), Token::Semicolon] {
            parser.feed(token).unwrap();
        }
        let g = parser.finish().unwrap();
        assert!(g.contains("C"));
        assert!(!g.contains("A"));
        assert!(!g.contains("B"));
    }

    #[test]
    fn test_unexpected_tokens() {
        let err = parse_grammar_text("= A;").unwrap_err();
        assert!(matches!(
            err,
            GrammarError::UnexpectedToken {
                state: ParserState::Start,
                ..
            }
        ));

        let err = parse_grammar_text("A B;").unwrap_err();
        assert!(matches!(
            err,
            GrammarError::UnexpectedToken {
                state: ParserState::GotRuleName,
                ..
            }
        ));
    }

    #[test]
    fn test_unexpected_eof() {
        let err = parse_grammar_text("A = B").unwrap_err();
        assert_eq!(err, GrammarError::UnexpectedEof { rule: "A".to_string() });

        let err = parse_grammar_text("A").unwrap_err();
        assert!(matches!(err, GrammarError::UnexpectedEof { .. }));
    }

    #[test]
    fn test_display_round_trips() {
        let src = "Call = callee:Path \"(\" args:Expr* %% \",\" \")\" { \"?\" | try:\"!\" }?;";
        let g = parse_grammar_text(src).unwrap();
        let again = parse_grammar_text(&g.to_string()).unwrap();
        assert_eq!(g, again);
    }
}
