//! Recursive-descent AST builder.
//!
//! The builder walks the same token stream the SLR gate already
//! validated and produces the typed tree the later phases consume. It
//! mirrors the grammar one function per nonterminal; a divergence from
//! the grammar is still reported with the offending position, since the
//! builder is the authoritative tree source.

use splc_lex::{Token, TokenKind};
use splc_util::{NodeId, NodeIdGen};
use thiserror::Error;

use crate::ast::{AstNode, NodeKind};

/// A fatal tree-construction error with its source position.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("AST error at line {line}, col {column}: {message}")]
pub struct AstError {
    pub message: String,
    pub line: u32,
    pub column: u32,
}

/// Builds the AST for one compilation.
pub struct AstBuilder<'t> {
    tokens: &'t [Token],
    pos: usize,
    ids: NodeIdGen,
}

impl<'t> AstBuilder<'t> {
    pub fn new(tokens: &'t [Token]) -> Self {
        Self {
            tokens,
            pos: 0,
            ids: NodeIdGen::new(),
        }
    }

    /// Builds the PROGRAM tree from a full token stream.
    pub fn build(tokens: &'t [Token]) -> Result<AstNode, AstError> {
        let mut builder = Self::new(tokens);
        let program = builder.parse_program()?;
        if let Some(extra) = builder.peek() {
            return Err(builder.error_at(extra, "expected end of input"));
        }
        Ok(program)
    }

    // ----- token helpers -----

    fn peek(&self) -> Option<&'t Token> {
        self.tokens.get(self.pos)
    }

    fn peek_kind(&self) -> Option<TokenKind> {
        self.peek().map(|t| t.kind)
    }

    fn peek2_kind(&self) -> Option<TokenKind> {
        self.tokens.get(self.pos + 1).map(|t| t.kind)
    }

    fn advance(&mut self) -> Option<&'t Token> {
        let token = self.tokens.get(self.pos);
        if token.is_some() {
            self.pos += 1;
        }
        token
    }

    fn expect(&mut self, kind: TokenKind, what: &str) -> Result<&'t Token, AstError> {
        match self.peek() {
            Some(token) if token.kind == kind => Ok(self.advance().expect("peeked")),
            Some(token) => Err(self.error_at(token, format!("expected {what}"))),
            None => Err(self.eof_error(format!("expected {what}"))),
        }
    }

    fn error_at(&self, token: &Token, message: impl Into<String>) -> AstError {
        AstError {
            message: message.into(),
            line: token.line,
            column: token.column,
        }
    }

    fn eof_error(&self, message: impl Into<String>) -> AstError {
        let (line, column) = self
            .tokens
            .last()
            .map(|t| (t.line, t.column))
            .unwrap_or((1, 1));
        AstError {
            message: format!("{} but input ended", message.into()),
            line,
            column,
        }
    }

    fn next_id(&mut self) -> NodeId {
        self.ids.next_id()
    }

    fn node(&mut self, kind: NodeKind, children: Vec<AstNode>) -> AstNode {
        AstNode::with_children(self.next_id(), kind, children)
    }

    fn leaf(&mut self, kind: NodeKind, value: impl Into<String>) -> AstNode {
        AstNode::with_value(self.next_id(), kind, value)
    }

    // ----- nonterminals -----

    /// SPL_PROG → glob { VARIABLES } proc { PROCDEFS } func { FUNCDEFS }
    ///            main { MAINPROG }
    fn parse_program(&mut self) -> Result<AstNode, AstError> {
        self.expect(TokenKind::Glob, "'glob'")?;
        self.expect(TokenKind::LBrace, "'{'")?;
        let globals = self.parse_var_list(NodeKind::Globals)?;
        self.expect(TokenKind::RBrace, "'}'")?;

        self.expect(TokenKind::Proc, "'proc'")?;
        self.expect(TokenKind::LBrace, "'{'")?;
        let mut procs = Vec::new();
        while self.peek_kind() == Some(TokenKind::Ident) {
            procs.push(self.parse_pdef()?);
        }
        let procs = self.node(NodeKind::Procs, procs);
        self.expect(TokenKind::RBrace, "'}'")?;

        self.expect(TokenKind::Func, "'func'")?;
        self.expect(TokenKind::LBrace, "'{'")?;
        let mut funcs = Vec::new();
        while self.peek_kind() == Some(TokenKind::Ident) {
            funcs.push(self.parse_fdef()?);
        }
        let funcs = self.node(NodeKind::Funcs, funcs);
        self.expect(TokenKind::RBrace, "'}'")?;

        self.expect(TokenKind::Main, "'main'")?;
        self.expect(TokenKind::LBrace, "'{'")?;
        let main = self.parse_mainprog()?;
        self.expect(TokenKind::RBrace, "'}'")?;

        Ok(self.node(NodeKind::Program, vec![globals, procs, funcs, main]))
    }

    /// A run of identifiers wrapped in the given list kind.
    fn parse_var_list(&mut self, kind: NodeKind) -> Result<AstNode, AstError> {
        let mut vars = Vec::new();
        while self.peek_kind() == Some(TokenKind::Ident) {
            let token = self.advance().expect("peeked");
            vars.push(self.leaf(NodeKind::Var, token.lexeme.clone()));
        }
        Ok(self.node(kind, vars))
    }

    /// PDEF → IDENT ( PARAM ) { BODY }
    fn parse_pdef(&mut self) -> Result<AstNode, AstError> {
        let name = self.expect(TokenKind::Ident, "procedure name")?.lexeme.clone();
        self.expect(TokenKind::LParen, "'('")?;
        let params = self.parse_params()?;
        self.expect(TokenKind::RParen, "')'")?;
        self.expect(TokenKind::LBrace, "'{'")?;
        let body = self.parse_body()?;
        self.expect(TokenKind::RBrace, "'}'")?;

        let mut proc = AstNode::with_value(self.next_id(), NodeKind::Proc, name);
        proc.children = params;
        proc.children.push(body);
        Ok(proc)
    }

    /// FDEF → IDENT ( PARAM ) { BODY ; return ATOM }
    fn parse_fdef(&mut self) -> Result<AstNode, AstError> {
        let name = self.expect(TokenKind::Ident, "function name")?.lexeme.clone();
        self.expect(TokenKind::LParen, "'('")?;
        let params = self.parse_params()?;
        self.expect(TokenKind::RParen, "')'")?;
        self.expect(TokenKind::LBrace, "'{'")?;
        let body = self.parse_body()?;
        self.expect(TokenKind::Semi, "';' before 'return'")?;
        self.expect(TokenKind::Return, "'return'")?;
        let ret = self.parse_atom()?;
        self.expect(TokenKind::RBrace, "'}'")?;

        let mut func = AstNode::with_value(self.next_id(), NodeKind::Func, name);
        func.children = params;
        func.children.push(body);
        func.children.push(ret);
        Ok(func)
    }

    /// PARAM → MAXTHREE (a run of identifiers; arity is enforced by the
    /// grammar gate and re-checked by the type checker)
    fn parse_params(&mut self) -> Result<Vec<AstNode>, AstError> {
        let mut params = Vec::new();
        while self.peek_kind() == Some(TokenKind::Ident) {
            let token = self.advance().expect("peeked");
            params.push(self.leaf(NodeKind::Var, token.lexeme.clone()));
        }
        Ok(params)
    }

    /// BODY → local { MAXTHREE } ALGO
    fn parse_body(&mut self) -> Result<AstNode, AstError> {
        self.expect(TokenKind::Local, "'local'")?;
        self.expect(TokenKind::LBrace, "'{'")?;
        let locals = self.parse_var_list(NodeKind::LocalsBlock)?;
        self.expect(TokenKind::RBrace, "'}'")?;
        let algo = self.parse_algo()?;
        Ok(self.node(NodeKind::Body, vec![locals, algo]))
    }

    /// MAINPROG → var { VARIABLES } ALGO
    fn parse_mainprog(&mut self) -> Result<AstNode, AstError> {
        self.expect(TokenKind::Var, "'var'")?;
        self.expect(TokenKind::LBrace, "'{'")?;
        let vars = self.parse_var_list(NodeKind::Vars)?;
        self.expect(TokenKind::RBrace, "'}'")?;
        let algo = self.parse_algo()?;
        Ok(self.node(NodeKind::Main, vec![vars, algo]))
    }

    /// ALGO → INSTR | INSTR ; ALGO
    ///
    /// A `;` continues the sequence only when the next token can start
    /// an instruction; otherwise it belongs to the enclosing function
    /// definition (`; return ATOM`).
    fn parse_algo(&mut self) -> Result<AstNode, AstError> {
        let mut instrs = vec![self.parse_instr()?];
        while self.peek_kind() == Some(TokenKind::Semi) && starts_instr(self.peek2_kind()) {
            self.advance();
            instrs.push(self.parse_instr()?);
        }
        Ok(self.node(NodeKind::Algo, instrs))
    }

    /// INSTR → halt | print OUTPUT | ASSIGN | IDENT ( INPUT )
    ///       | LOOP | BRANCH
    fn parse_instr(&mut self) -> Result<AstNode, AstError> {
        match self.peek_kind() {
            Some(TokenKind::Halt) => {
                self.advance();
                Ok(AstNode::new(self.next_id(), NodeKind::Halt))
            }
            Some(TokenKind::Print) => self.parse_print(),
            Some(TokenKind::While) => self.parse_while(),
            Some(TokenKind::Do) => self.parse_do_until(),
            Some(TokenKind::If) => self.parse_branch(),
            Some(TokenKind::Ident) => self.parse_assign_or_call(),
            Some(_) => {
                let token = self.peek().expect("peeked");
                Err(self.error_at(token, "expected an instruction"))
            }
            None => Err(self.eof_error("expected an instruction")),
        }
    }

    /// print OUTPUT where OUTPUT → ATOM | STRING
    fn parse_print(&mut self) -> Result<AstNode, AstError> {
        self.expect(TokenKind::Print, "'print'")?;
        let output = match self.peek_kind() {
            Some(TokenKind::Str) => {
                let token = self.advance().expect("peeked");
                self.leaf(NodeKind::Str, token.lexeme.clone())
            }
            _ => self.parse_atom()?,
        };
        Ok(self.node(NodeKind::Print, vec![output]))
    }

    /// while TERM { ALGO }
    fn parse_while(&mut self) -> Result<AstNode, AstError> {
        self.expect(TokenKind::While, "'while'")?;
        let cond = self.parse_term()?;
        self.expect(TokenKind::LBrace, "'{'")?;
        let body = self.parse_algo()?;
        self.expect(TokenKind::RBrace, "'}'")?;
        let while_node = self.node(NodeKind::While, vec![cond, body]);
        Ok(self.node(NodeKind::Loop, vec![while_node]))
    }

    /// do { ALGO } until TERM
    fn parse_do_until(&mut self) -> Result<AstNode, AstError> {
        self.expect(TokenKind::Do, "'do'")?;
        self.expect(TokenKind::LBrace, "'{'")?;
        let body = self.parse_algo()?;
        self.expect(TokenKind::RBrace, "'}'")?;
        self.expect(TokenKind::Until, "'until'")?;
        let cond = self.parse_term()?;
        let do_node = self.node(NodeKind::DoUntil, vec![body, cond]);
        Ok(self.node(NodeKind::Loop, vec![do_node]))
    }

    /// if TERM { ALGO } [ else { ALGO } ]
    fn parse_branch(&mut self) -> Result<AstNode, AstError> {
        self.expect(TokenKind::If, "'if'")?;
        let cond = self.parse_term()?;
        self.expect(TokenKind::LBrace, "'{'")?;
        let then_algo = self.parse_algo()?;
        self.expect(TokenKind::RBrace, "'}'")?;

        let mut children = vec![cond, then_algo];
        if self.peek_kind() == Some(TokenKind::Else) {
            self.advance();
            self.expect(TokenKind::LBrace, "'{'")?;
            children.push(self.parse_algo()?);
            self.expect(TokenKind::RBrace, "'}'")?;
        }
        let if_node = self.node(NodeKind::If, children);
        Ok(self.node(NodeKind::Branch, vec![if_node]))
    }

    /// ASSIGN → IDENT = IDENT ( INPUT ) | IDENT = TERM, or the bare
    /// call INSTR → IDENT ( INPUT ).
    fn parse_assign_or_call(&mut self) -> Result<AstNode, AstError> {
        let name_token = self.expect(TokenKind::Ident, "identifier")?;
        let name = name_token.lexeme.clone();

        match self.peek_kind() {
            Some(TokenKind::LParen) => {
                self.advance();
                let input = self.parse_input()?;
                self.expect(TokenKind::RParen, "')'")?;
                let mut call = AstNode::with_value(self.next_id(), NodeKind::Call, name);
                call.children = vec![input];
                Ok(call)
            }
            Some(TokenKind::Assign) => {
                self.advance();
                let target = self.leaf(NodeKind::Var, name);
                if self.peek_kind() == Some(TokenKind::Ident)
                    && self.peek2_kind() == Some(TokenKind::LParen)
                {
                    let callee = self.advance().expect("peeked").lexeme.clone();
                    self.expect(TokenKind::LParen, "'('")?;
                    let input = self.parse_input()?;
                    self.expect(TokenKind::RParen, "')'")?;
                    let mut call =
                        AstNode::with_value(self.next_id(), NodeKind::AssignCall, callee);
                    call.children = vec![target, input];
                    Ok(call)
                } else {
                    let rhs = self.parse_term()?;
                    Ok(self.node(NodeKind::Assign, vec![target, rhs]))
                }
            }
            _ => match self.peek() {
                Some(token) => Err(self.error_at(token, "expected '(' or '=' after identifier")),
                None => Err(self.eof_error("expected '(' or '=' after identifier")),
            },
        }
    }

    /// INPUT → up to three atoms.
    fn parse_input(&mut self) -> Result<AstNode, AstError> {
        let mut atoms = Vec::new();
        while matches!(
            self.peek_kind(),
            Some(TokenKind::Ident) | Some(TokenKind::Number)
        ) {
            atoms.push(self.parse_atom()?);
        }
        Ok(self.node(NodeKind::Input, atoms))
    }

    /// TERM → ATOM | ( UNOP TERM ) | ( TERM BINOP TERM )
    fn parse_term(&mut self) -> Result<AstNode, AstError> {
        if self.peek_kind() != Some(TokenKind::LParen) {
            return self.parse_atom();
        }
        self.advance();

        let term = match self.peek_kind() {
            Some(TokenKind::Neg) | Some(TokenKind::Not) => {
                let op = self.advance().expect("peeked").lexeme.clone();
                let operand = self.parse_term()?;
                let mut unop = AstNode::with_value(self.next_id(), NodeKind::UnOp, op);
                unop.children = vec![operand];
                unop
            }
            _ => {
                let left = self.parse_term()?;
                let op = self.parse_binop()?;
                let right = self.parse_term()?;
                let mut binop = AstNode::with_value(self.next_id(), NodeKind::BinOp, op);
                binop.children = vec![left, right];
                binop
            }
        };
        self.expect(TokenKind::RParen, "')'")?;
        Ok(term)
    }

    fn parse_binop(&mut self) -> Result<String, AstError> {
        match self.peek_kind() {
            Some(
                TokenKind::Eq
                | TokenKind::Gt
                | TokenKind::Or
                | TokenKind::And
                | TokenKind::Plus
                | TokenKind::Minus
                | TokenKind::Mult
                | TokenKind::Div,
            ) => Ok(self.advance().expect("peeked").lexeme.clone()),
            Some(_) => {
                let token = self.peek().expect("peeked");
                Err(self.error_at(token, "expected a binary operator"))
            }
            None => Err(self.eof_error("expected a binary operator")),
        }
    }

    /// ATOM → IDENT | NUMBER
    fn parse_atom(&mut self) -> Result<AstNode, AstError> {
        match self.peek_kind() {
            Some(TokenKind::Ident) => {
                let token = self.advance().expect("peeked");
                Ok(self.leaf(NodeKind::Var, token.lexeme.clone()))
            }
            Some(TokenKind::Number) => {
                let token = self.advance().expect("peeked");
                Ok(self.leaf(NodeKind::Number, token.lexeme.clone()))
            }
            Some(_) => {
                let token = self.peek().expect("peeked");
                Err(self.error_at(token, "expected a variable or number"))
            }
            None => Err(self.eof_error("expected a variable or number")),
        }
    }
}

/// True if a token of this kind can start an INSTR.
fn starts_instr(kind: Option<TokenKind>) -> bool {
    matches!(
        kind,
        Some(
            TokenKind::Halt
                | TokenKind::Print
                | TokenKind::Ident
                | TokenKind::While
                | TokenKind::Do
                | TokenKind::If
        )
    )
}
