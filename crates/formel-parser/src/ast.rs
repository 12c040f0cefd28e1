//! The Formel syntax tree.
//!
//! Nodes live in a flat arena owned by [`Ast`]; children, parents, and
//! sibling numbers are plain indices into it. The arena keeps the tree
//! cheap to build during parsing while still letting every consumer
//! walk upward (parent links) or in document order
//! ([`Ast::iter_recursively`]).

use formel_common::Token;

/// Index of a node inside an [`Ast`] arena.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct NodeId(u32);

/// One node of the syntax tree.
#[derive(Debug, Clone, PartialEq)]
pub struct Node {
    pub kind: NodeKind,
    /// The owning node, if any. Only the root has no parent.
    pub parent: Option<NodeId>,
    /// 1-based position among the parent's children.
    pub number: usize,
    /// Children in document order.
    pub children: Vec<NodeId>,
}

/// What a node means. Payload-free variants get their meaning entirely
/// from their children.
#[derive(Debug, Clone, PartialEq)]
pub enum NodeKind {
    /// A sequence of statements. The tree root, and the body of every
    /// braced block.
    Instruction,
    /// A parenthesised sub-expression. Exactly one child.
    Par,
    /// A braced block. Exactly one child, an `Instruction`.
    Scope,
    /// A literal value. `negated` records a `-` sign prefix.
    Var { token: Token, negated: bool },
    /// A variable or function identifier.
    Name { token: Token },
    /// Unary minus over a number literal. The sign itself is stored on
    /// the child `Var`, so this node only delegates.
    UnaryMinus,
    /// Logical negation of its single child.
    UnaryNot,
    /// Arithmetic operator, two children.
    Binary { op: Token },
    /// Comparison or boolean operator, two children, result 0/1.
    Logical { op: Token },
    /// `name = expression`. The left child is always a `Name`.
    Assignment,
    /// A call: first child is the callee `Name`, the rest are arguments
    /// in order.
    Call,
    /// A whole conditional: one `If`, then any `Elif`s, then at most
    /// one `Else`.
    Condition,
    /// `ЕСЛИ (predicate) { body }` -- children: predicate, `Scope`.
    If,
    /// `ИНАЧЕ_ЕСЛИ (predicate) { body }` -- children: predicate, `Scope`.
    Elif,
    /// `ИНАЧЕ { body }` -- one child, the `Scope`.
    Else,
}

/// The arena that owns every node of one parsed script.
#[derive(Debug, Clone, PartialEq)]
pub struct Ast {
    nodes: Vec<Node>,
    root: NodeId,
}

impl Ast {
    /// Create an empty arena. The root must be set by the parser once
    /// the top-level instruction node exists.
    pub(crate) fn new() -> Self {
        Self {
            nodes: Vec::new(),
            root: NodeId(0),
        }
    }

    /// Allocate a new parentless node.
    pub(crate) fn push(&mut self, kind: NodeKind) -> NodeId {
        let id = NodeId(self.nodes.len() as u32);
        self.nodes.push(Node {
            kind,
            parent: None,
            number: 1,
            children: Vec::new(),
        });
        id
    }

    /// Attach `child` to `parent`, maintaining the parent link and the
    /// child's 1-based sibling number.
    pub(crate) fn add_child(&mut self, parent: NodeId, child: NodeId) {
        let number = self.nodes[parent.0 as usize].children.len() + 1;
        self.nodes[parent.0 as usize].children.push(child);
        let node = &mut self.nodes[child.0 as usize];
        node.parent = Some(parent);
        node.number = number;
    }

    pub(crate) fn set_root(&mut self, root: NodeId) {
        self.root = root;
    }

    /// The top-level instruction node.
    pub fn root(&self) -> NodeId {
        self.root
    }

    /// Borrow a node by id.
    pub fn node(&self, id: NodeId) -> &Node {
        &self.nodes[id.0 as usize]
    }

    /// Borrow a node's kind.
    pub fn kind(&self, id: NodeId) -> &NodeKind {
        &self.node(id).kind
    }

    /// A node's children in document order.
    pub fn children(&self, id: NodeId) -> &[NodeId] {
        &self.node(id).children
    }

    /// Total number of nodes in the arena.
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    /// Whether the arena holds no nodes.
    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Pre-order walk over a subtree, yielding `(node, depth)` pairs.
    pub fn iter_recursively(&self, root: NodeId) -> impl Iterator<Item = (NodeId, usize)> + '_ {
        let mut stack = vec![(root, 0)];
        std::iter::from_fn(move || {
            let (id, depth) = stack.pop()?;
            for &child in self.children(id).iter().rev() {
                stack.push((child, depth + 1));
            }
            Some((id, depth))
        })
    }

    /// A short human caption for a node, used in evaluation events.
    pub fn describe(&self, id: NodeId) -> String {
        match self.kind(id) {
            NodeKind::Instruction => "инструкция".to_string(),
            NodeKind::Par => "(…)".to_string(),
            NodeKind::Scope => "{…}".to_string(),
            NodeKind::Var { token, negated } => {
                let sign = if *negated { "-" } else { "" };
                format!("{sign}{}", token.figure())
            }
            NodeKind::Name { token } => format!("Имя({})", token.text),
            NodeKind::UnaryMinus => "-".to_string(),
            NodeKind::UnaryNot => "not".to_string(),
            NodeKind::Binary { op } | NodeKind::Logical { op } => op.figure().to_string(),
            NodeKind::Assignment => "=".to_string(),
            NodeKind::Call => {
                let callee = self
                    .children(id)
                    .first()
                    .map(|&name| self.describe(name))
                    .unwrap_or_default();
                format!("Вызов {callee}")
            }
            NodeKind::Condition => "условие".to_string(),
            NodeKind::If => "if".to_string(),
            NodeKind::Elif => "elif".to_string(),
            NodeKind::Else => "else".to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use formel_common::TokenKind;

    fn token(kind: TokenKind, text: &str) -> Token {
        Token::new(kind, text, 0, text.len() as u32)
    }

    #[test]
    fn add_child_maintains_parent_and_number() {
        let mut ast = Ast::new();
        let root = ast.push(NodeKind::Instruction);
        let first = ast.push(NodeKind::Var {
            token: token(TokenKind::Int, "1"),
            negated: false,
        });
        let second = ast.push(NodeKind::Var {
            token: token(TokenKind::Int, "2"),
            negated: false,
        });
        ast.add_child(root, first);
        ast.add_child(root, second);

        assert_eq!(ast.node(first).parent, Some(root));
        assert_eq!(ast.node(first).number, 1);
        assert_eq!(ast.node(second).parent, Some(root));
        assert_eq!(ast.node(second).number, 2);
        assert_eq!(ast.children(root), &[first, second]);
    }

    #[test]
    fn iter_recursively_is_preorder() {
        let mut ast = Ast::new();
        let root = ast.push(NodeKind::Instruction);
        let par = ast.push(NodeKind::Par);
        let var = ast.push(NodeKind::Var {
            token: token(TokenKind::Int, "5"),
            negated: false,
        });
        let name = ast.push(NodeKind::Name {
            token: token(TokenKind::Name, "x"),
        });
        ast.add_child(root, par);
        ast.add_child(par, var);
        ast.add_child(root, name);

        let order: Vec<_> = ast.iter_recursively(root).collect();
        assert_eq!(order, vec![(root, 0), (par, 1), (var, 2), (name, 1)]);
    }

    #[test]
    fn describe_shows_sign_and_names() {
        let mut ast = Ast::new();
        let var = ast.push(NodeKind::Var {
            token: token(TokenKind::Int, "5"),
            negated: true,
        });
        let name = ast.push(NodeKind::Name {
            token: token(TokenKind::Name, "СУММ"),
        });
        assert_eq!(ast.describe(var), "-5");
        assert_eq!(ast.describe(name), "Имя(СУММ)");
    }
}
