// Formel parser -- builds the syntax tree by precedence descent.
//
// The grammar is layered into nine tiers, lowest binding power at the
// top: tier 8 is the statement sequence, tier 7 assignment, tiers 6..2
// the binary operator families, tier 1 exponentiation, and tier 0 the
// atoms (literals, names, calls, parentheses, unary forms, conditions).
// Each binary tier parses its left operand one tier lower, then folds
// operators of its own level left-associatively.
//
// `;` and a closing `)` surface from tier 0 as the `Stop` sentinel:
// statement lists drop it, operator loops refuse to continue past it,
// and the call handler uses it to detect the end of an argument list.
// Stop never appears in the finished tree.

pub mod ast;

pub use ast::{Ast, Node, NodeId, NodeKind};

use formel_common::{Error, Result, TokenKind};
use formel_lexer::TokenStream;

/// Parse a token stream into a syntax tree.
pub fn parse(stream: TokenStream) -> Result<Ast> {
    Parser::new(stream).parse()
}

/// Outcome of one descent step: a real node, or the sentinel that ends
/// the surrounding construct.
enum Parsed {
    Node(NodeId),
    Stop,
}

/// The Formel parser. Consumes a [`TokenStream`] and owns the [`Ast`]
/// it is building.
pub struct Parser {
    stream: TokenStream,
    ast: Ast,
}

impl Parser {
    /// Create a parser over a token stream.
    pub fn new(stream: TokenStream) -> Self {
        Self {
            stream,
            ast: Ast::new(),
        }
    }

    /// Build the whole tree and return it.
    pub fn parse(mut self) -> Result<Ast> {
        let root = self.tier_8()?;
        self.ast.set_root(root);
        Ok(self.ast)
    }

    /// Tier 8: the statement sequence, up to end of input or a `}`.
    fn tier_8(&mut self) -> Result<NodeId> {
        let head = self.ast.push(NodeKind::Instruction);

        while !self.stream.is_empty() {
            if let Parsed::Node(statement) = self.tier_7()? {
                self.ast.add_child(head, statement);
            }
            if self.stream.next_in(&[TokenKind::RBrace]) {
                break;
            }
        }

        Ok(head)
    }

    /// Tier 7: assignment. The target must be a plain name; anything
    /// else (including a chained `a = b = 1`) is rejected here.
    fn tier_7(&mut self) -> Result<Parsed> {
        let mut head = self.tier_6()?;

        while let Parsed::Node(left) = head {
            if !self.stream.next_in(&[TokenKind::Assign]) {
                break;
            }
            self.stream.cut_next();

            if !matches!(self.ast.kind(left), NodeKind::Name { .. }) {
                return Err(Error::syntax(
                    "левая часть присваивания должна быть именем переменной",
                ));
            }

            let right = self.expect_operand(Self::tier_6)?;
            let assignment = self.ast.push(NodeKind::Assignment);
            self.ast.add_child(assignment, left);
            self.ast.add_child(assignment, right);
            head = Parsed::Node(assignment);
        }

        Ok(head)
    }

    /// Tier 6: logical `И` / `ИЛИ`.
    fn tier_6(&mut self) -> Result<Parsed> {
        self.binary_tier(&[TokenKind::And, TokenKind::Or], true, Self::tier_5)
    }

    /// Tier 5: equality.
    fn tier_5(&mut self) -> Result<Parsed> {
        self.binary_tier(&[TokenKind::EqEq, TokenKind::NotEq], true, Self::tier_4)
    }

    /// Tier 4: ordering comparisons.
    fn tier_4(&mut self) -> Result<Parsed> {
        self.binary_tier(
            &[TokenKind::Gt, TokenKind::Lt, TokenKind::Le, TokenKind::Ge],
            true,
            Self::tier_3,
        )
    }

    /// Tier 3: addition and subtraction.
    fn tier_3(&mut self) -> Result<Parsed> {
        self.binary_tier(&[TokenKind::Plus, TokenKind::Minus], false, Self::tier_2)
    }

    /// Tier 2: multiplication and division.
    fn tier_2(&mut self) -> Result<Parsed> {
        self.binary_tier(&[TokenKind::Star, TokenKind::Slash], false, Self::tier_1)
    }

    /// Tier 1: exponentiation. Folds left like the other tiers, so
    /// `a ** b ** c` reads as `(a ** b) ** c`.
    fn tier_1(&mut self) -> Result<Parsed> {
        self.binary_tier(&[TokenKind::StarStar], false, Self::tier_0)
    }

    /// Shared loop for the binary operator tiers.
    fn binary_tier(
        &mut self,
        operators: &[TokenKind],
        logical: bool,
        next: fn(&mut Self) -> Result<Parsed>,
    ) -> Result<Parsed> {
        let mut head = next(self)?;

        while let Parsed::Node(left) = head {
            if !self.stream.next_in(operators) {
                break;
            }
            let Some(op) = self.stream.cut_next() else {
                break;
            };

            let right = self.expect_operand(next)?;
            let kind = if logical {
                NodeKind::Logical { op }
            } else {
                NodeKind::Binary { op }
            };
            let node = self.ast.push(kind);
            self.ast.add_child(node, left);
            self.ast.add_child(node, right);
            head = Parsed::Node(node);
        }

        Ok(head)
    }

    /// Tier 0: atoms and unary forms.
    fn tier_0(&mut self) -> Result<Parsed> {
        let Some(current) = self.stream.cut_next() else {
            return Err(Error::syntax(
                "неожиданный конец кода, ожидалось выражение",
            ));
        };

        let node = match current.kind {
            TokenKind::Semicolon | TokenKind::RParen => return Ok(Parsed::Stop),

            kind if kind.is_literal() => self.ast.push(NodeKind::Var {
                token: current,
                negated: false,
            }),

            TokenKind::LParen => {
                let inner = self.expect_operand(Self::tier_7)?;
                self.stream.dispose_next(TokenKind::RParen)?;
                let par = self.ast.push(NodeKind::Par);
                self.ast.add_child(par, inner);
                par
            }

            // Unary minus exists only directly before a number literal.
            TokenKind::Minus
                if self
                    .stream
                    .show_next()
                    .is_some_and(|token| token.kind.is_number()) =>
            {
                let Some(number) = self.stream.cut_next() else {
                    return Err(Error::syntax(
                        "неожиданный конец кода, ожидалось число",
                    ));
                };
                let var = self.ast.push(NodeKind::Var {
                    token: number,
                    negated: true,
                });
                let minus = self.ast.push(NodeKind::UnaryMinus);
                self.ast.add_child(minus, var);
                minus
            }

            TokenKind::Name => {
                let name = self.ast.push(NodeKind::Name { token: current });
                if self.stream.next_in(&[TokenKind::LParen]) {
                    self.call_handler(name)?
                } else {
                    name
                }
            }

            TokenKind::Not => {
                let operand = self.expect_operand(Self::tier_1)?;
                let not = self.ast.push(NodeKind::UnaryNot);
                self.ast.add_child(not, operand);
                not
            }

            TokenKind::If => self.condition_handler()?,

            _ => {
                return Err(Error::syntax(format!(
                    "не удалось обработать токен: {} ({:?})",
                    current.figure(),
                    current.kind,
                )));
            }
        };

        Ok(Parsed::Node(node))
    }

    /// Run a tier and insist on a real node: a `Stop` in operand
    /// position means the expression broke off mid-way.
    fn expect_operand(&mut self, tier: fn(&mut Self) -> Result<Parsed>) -> Result<NodeId> {
        match tier(self)? {
            Parsed::Node(id) => Ok(id),
            Parsed::Stop => Err(Error::syntax("выражение оборвано до завершения")),
        }
    }

    /// Collect a call's argument list after the callee name.
    ///
    /// The depth counter tracks parentheses opened at the head of an
    /// argument, so only the matching outer `)` ends the call; a `Stop`
    /// argument means tier 0 already consumed that `)`.
    fn call_handler(&mut self, name: NodeId) -> Result<NodeId> {
        let call = self.ast.push(NodeKind::Call);
        self.ast.add_child(call, name);

        let mut pars = 0usize;
        while !self.stream.is_empty() {
            if self.stream.next_in(&[TokenKind::LParen]) {
                self.stream.dispose_next(TokenKind::LParen)?;
                pars += 1;
            }

            match self.tier_7()? {
                Parsed::Stop => break,
                Parsed::Node(argument) => self.ast.add_child(call, argument),
            }

            if self.stream.next_in(&[TokenKind::RParen]) {
                self.stream.dispose_next(TokenKind::RParen)?;
                if pars == 1 {
                    break;
                }
                pars -= 1;
            }

            if self.stream.next_in(&[TokenKind::Comma]) {
                self.stream.dispose_next(TokenKind::Comma)?;
            }
        }

        Ok(call)
    }

    /// Assemble a whole conditional after its opening `ЕСЛИ`.
    fn condition_handler(&mut self) -> Result<NodeId> {
        let condition = self.ast.push(NodeKind::Condition);

        let head = self.condition_arm(NodeKind::If)?;
        self.ast.add_child(condition, head);

        while self.stream.next_in(&[TokenKind::Elif]) {
            self.stream.dispose_next(TokenKind::Elif)?;
            let arm = self.condition_arm(NodeKind::Elif)?;
            self.ast.add_child(condition, arm);
        }

        if self.stream.next_in(&[TokenKind::Else]) {
            self.stream.dispose_next(TokenKind::Else)?;
            let arm = self.ast.push(NodeKind::Else);
            let scope = self.braced_scope()?;
            self.ast.add_child(arm, scope);
            self.ast.add_child(condition, arm);
        }

        Ok(condition)
    }

    /// One `(predicate) { body }` arm of a conditional.
    fn condition_arm(&mut self, kind: NodeKind) -> Result<NodeId> {
        let arm = self.ast.push(kind);

        self.stream.dispose_next(TokenKind::LParen)?;
        let predicate = self.expect_operand(Self::tier_7)?;
        self.stream.dispose_next(TokenKind::RParen)?;
        self.ast.add_child(arm, predicate);

        let scope = self.braced_scope()?;
        self.ast.add_child(arm, scope);

        Ok(arm)
    }

    /// `{ statements }`, wrapped in a `Scope` node.
    fn braced_scope(&mut self) -> Result<NodeId> {
        self.stream.dispose_next(TokenKind::LBrace)?;
        let body = self.tier_8()?;
        self.stream.dispose_next(TokenKind::RBrace)?;

        let scope = self.ast.push(NodeKind::Scope);
        self.ast.add_child(scope, body);
        Ok(scope)
    }
}
