//! SLR parse driver.
//!
//! A standard LR shift-reduce loop over a stack of state indices paired
//! with a node stack. Shifting pushes the terminal's token; reducing
//! pops the body's nodes and pushes a nonterminal node over them. The
//! accepted input yields the single remaining node, a concrete parse
//! tree rooted at the start nonterminal.
//!
//! The driver matches each input token by its normalized terminal
//! string ([`Token::terminal`]): the class name for `IDENT`, `NUMBER`
//! and `STRING`, the lexeme for everything else.

use splc_lex::Token;
use thiserror::Error;

use crate::first_follow::FirstFollow;
use crate::grammar::{Grammar, END_MARKER};
use crate::items::Collection;
use crate::table::{Action, TableError, Tables};

/// A fatal syntax error with the offending lookahead.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("Syntax error at '{terminal}' (line {line}, col {column})")]
pub struct ParseError {
    /// The normalized terminal the driver could not act on.
    pub terminal: String,
    pub line: u32,
    pub column: u32,
}

/// A node of the concrete parse tree.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ParseNode {
    /// A shifted terminal, carrying its token.
    Terminal(Token),
    /// A reduced nonterminal with its children in body order.
    Nonterminal {
        symbol: &'static str,
        children: Vec<ParseNode>,
    },
}

impl ParseNode {
    /// The grammar symbol this node represents.
    pub fn symbol(&self) -> &str {
        match self {
            ParseNode::Terminal(token) => token.terminal(),
            ParseNode::Nonterminal { symbol, .. } => symbol,
        }
    }

    /// Number of leaves under this node.
    pub fn leaf_count(&self) -> usize {
        match self {
            ParseNode::Terminal(_) => 1,
            ParseNode::Nonterminal { children, .. } => {
                children.iter().map(ParseNode::leaf_count).sum()
            }
        }
    }
}

/// A ready-to-run SLR parser for one grammar.
pub struct SlrParser {
    grammar: Grammar,
    tables: Tables,
}

impl SlrParser {
    /// Generates the parser for a grammar: item collection, FIRST and
    /// FOLLOW sets, ACTION/GOTO tables.
    pub fn generate(grammar: Grammar) -> Result<Self, TableError> {
        let collection = Collection::build(&grammar);
        let first_follow = FirstFollow::compute(&grammar);
        let tables = Tables::build(&grammar, &collection, &first_follow)?;
        Ok(Self { grammar, tables })
    }

    /// Generates the parser for the fixed SPL grammar.
    ///
    /// The SPL tables are conflict-free, so this cannot fail.
    pub fn spl() -> Self {
        Self::generate(Grammar::spl()).expect("SPL grammar builds without table errors")
    }

    /// Shift–reduce conflicts resolved while building the tables.
    pub fn conflicts(&self) -> usize {
        self.tables.conflicts().len()
    }

    /// Parses a token stream. Returns the concrete parse tree on
    /// accept, or the syntax error at the first dead lookahead.
    pub fn parse(&self, tokens: &[Token]) -> Result<ParseNode, ParseError> {
        let mut states: Vec<usize> = vec![0];
        let mut nodes: Vec<ParseNode> = Vec::new();
        let mut pos = 0;

        loop {
            let (terminal, line, column) = self.lookahead(tokens, pos)?;
            let state = *states.last().expect("state stack never empties");

            let action = self
                .tables
                .action(state, terminal)
                .ok_or_else(|| ParseError {
                    terminal: terminal.to_string(),
                    line,
                    column,
                })?;

            match action {
                Action::Shift(next) => {
                    states.push(next);
                    nodes.push(ParseNode::Terminal(tokens[pos].clone()));
                    pos += 1;
                }
                Action::Reduce { head, alt } => {
                    let body_len = self.grammar.body(head, alt).len();
                    let split = nodes.len() - body_len;
                    let children = nodes.split_off(split);
                    states.truncate(states.len() - body_len);

                    let top = *states.last().expect("state stack never empties");
                    let next = self
                        .tables
                        .goto(top, head)
                        .expect("GOTO defined for every live reduction");
                    states.push(next);
                    nodes.push(ParseNode::Nonterminal {
                        symbol: head,
                        children,
                    });
                }
                Action::Accept => {
                    let root = nodes.pop().expect("accept leaves the start node");
                    return Ok(root);
                }
            }
        }
    }

    /// The normalized lookahead at `pos`, or the end marker past the
    /// last token. A terminal the grammar does not know is a syntax
    /// error at that token.
    fn lookahead(
        &self,
        tokens: &[Token],
        pos: usize,
    ) -> Result<(&'static str, u32, u32), ParseError> {
        match tokens.get(pos) {
            Some(token) => match self.grammar.intern_terminal(token.terminal()) {
                Some(terminal) => Ok((terminal, token.line, token.column)),
                None => Err(ParseError {
                    terminal: token.terminal().to_string(),
                    line: token.line,
                    column: token.column,
                }),
            },
            None => {
                let (line, column) = tokens
                    .last()
                    .map(|t| (t.line, t.column))
                    .unwrap_or((1, 1));
                Ok((END_MARKER, line, column))
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use splc_lex::Lexer;

    fn parse_spl(source: &str) -> Result<ParseNode, ParseError> {
        let tokens = Lexer::tokenize(source).expect("fixture lexes");
        SlrParser::spl().parse(&tokens)
    }

    #[test]
    fn test_minimal_program_accepts() {
        let root = parse_spl("glob { } proc { } func { } main { var { } halt }").unwrap();
        assert_eq!(root.symbol(), "SPL_PROG");
        assert_eq!(root.leaf_count(), 16);
    }

    #[test]
    fn test_assign_and_print_accepts() {
        let root =
            parse_spl("glob { } proc { } func { } main { var { x } x = 42 ; print x }").unwrap();
        assert_eq!(root.symbol(), "SPL_PROG");
    }

    #[test]
    fn test_expressions_accept() {
        let src = "glob { } proc { } func { } main { var { x y } \
                   x = ( 1 plus 2 ) ; y = ( neg x ) ; x = ( ( x mult y ) minus 3 ) ; print x }";
        assert!(parse_spl(src).is_ok());
    }

    #[test]
    fn test_control_flow_accepts() {
        let src = "glob { c } proc { } func { } main { var { } \
                   c = 10 ; \
                   while ( c > 5 ) { print c ; c = ( c minus 1 ) } ; \
                   do { c = ( c plus 1 ) } until ( c > 8 ) ; \
                   if ( c eq 9 ) { print 1 } else { print 0 } }";
        assert!(parse_spl(src).is_ok());
    }

    #[test]
    fn test_procedures_accept() {
        let src = "glob { } proc { show ( a b c ) { local { t } print a } } \
                   func { } main { var { } show ( 1 2 3 ) }";
        assert!(parse_spl(src).is_ok());
    }

    #[test]
    fn test_functions_accept() {
        // the `; return` boundary inside a function body is the hard
        // case for one-token lookahead
        let src = "glob { } proc { } \
                   func { double ( n ) { local { r } r = ( n plus n ) ; return r } } \
                   main { var { x } x = double ( 4 ) ; print x }";
        assert!(parse_spl(src).is_ok());
    }

    #[test]
    fn test_function_with_longer_body_accepts() {
        let src = "glob { } proc { } \
                   func { f ( a b ) { local { t } t = a ; t = ( t plus b ) ; print t ; return t } } \
                   main { var { } halt }";
        assert!(parse_spl(src).is_ok());
    }

    #[test]
    fn test_bare_call_and_assign_call() {
        let src = "glob { } proc { } func { } main { var { x } \
                   tick ( ) ; x = probe ( 1 2 ) ; print x }";
        assert!(parse_spl(src).is_ok());
    }

    #[test]
    fn test_missing_main_rejected() {
        let err = parse_spl("glob { } proc { } func { }").unwrap_err();
        assert_eq!(err.terminal, "$");
    }

    #[test]
    fn test_stray_token_rejected() {
        let err =
            parse_spl("glob { } proc { } func { } main { var { } halt halt }").unwrap_err();
        assert_eq!(err.terminal, "halt");
        assert!(err.to_string().contains("Syntax error at 'halt'"));
    }

    #[test]
    fn test_trailing_semicolon_rejected() {
        let err =
            parse_spl("glob { } proc { } func { } main { var { } halt ; }").unwrap_err();
        assert_eq!(err.terminal, "}");
    }

    #[test]
    fn test_error_carries_position() {
        let err = parse_spl("glob { }\nproc { } func { } main { var { } halt ) }").unwrap_err();
        assert_eq!(err.terminal, ")");
        assert_eq!(err.line, 2);
    }

    #[test]
    fn test_empty_input_rejected() {
        let parser = SlrParser::spl();
        let err = parser.parse(&[]).unwrap_err();
        assert_eq!(err.terminal, "$");
    }

    #[test]
    fn test_parse_tree_structure() {
        let root = parse_spl("glob { x } proc { } func { } main { var { } halt }").unwrap();
        let ParseNode::Nonterminal { symbol, children } = root else {
            panic!("root must be a nonterminal");
        };
        assert_eq!(symbol, "SPL_PROG");
        // glob { VARIABLES } proc { PROCDEFS } func { FUNCDEFS } main { MAINPROG }
        assert_eq!(children.len(), 16);
        assert_eq!(children[2].symbol(), "VARIABLES");
        assert_eq!(children[14].symbol(), "MAINPROG");
    }
}
