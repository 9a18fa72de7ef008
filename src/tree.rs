use crate::token::{NodeType, Token};

/// An element of the anonymous scaffolding tree built while parsing.
///
/// Produced by [`Concat`](crate::combinator::Combinator::Concat),
/// [`Optional`](crate::combinator::Combinator::Optional) and
/// [`Repeat`](crate::combinator::Combinator::Repeat). Carries no node type
/// unless the rule segment it came from was wrapped in an explicit node
/// label, in which case [`Flattener`](crate::flatten::flatten) turns it
/// into a [`Node`] instead of splicing it away.
#[derive(Debug, Clone)]
pub enum TreeChild {
    Token(Token),
    Inner(InnerTree),
}

#[derive(Debug, Clone)]
pub struct InnerTree {
    pub node_type: Option<NodeType>,
    pub children: Vec<TreeChild>,
}

impl TreeChild {
    /// `Some(InnerTree)` for an `Inner` child, `None` for a bare token.
    /// Callers that already know the combinator producing this child is
    /// a `Concat` (every node's root combinator is) can `.expect()` the
    /// `Some` case unconditionally, since a `Concat` never yields a
    /// `Token` child directly.
    pub fn into_inner(self) -> Option<InnerTree> {
        match self {
            TreeChild::Inner(inner) => Some(inner),
            TreeChild::Token(_) => None,
        }
    }
}

impl InnerTree {
    pub fn anonymous(children: Vec<TreeChild>) -> Self {
        Self {
            node_type: None,
            children,
        }
    }

    pub fn typed(node_type: NodeType, children: Vec<TreeChild>) -> Self {
        Self {
            node_type: Some(node_type),
            children,
        }
    }

    pub fn is_anonymous(&self) -> bool {
        self.node_type.is_none()
    }
}

/// An element of the public, typed syntax tree: a token or a further node.
/// Never an anonymous inner tree — that invariant is what
/// [`flatten`](crate::flatten::flatten) establishes.
#[derive(Debug, Clone)]
pub enum NodeChild {
    Token(Token),
    Node(Node),
}

#[derive(Debug, Clone)]
pub struct Node {
    pub node_type: NodeType,
    pub children: Vec<NodeChild>,
}

impl Node {
    pub fn new(node_type: NodeType, children: Vec<NodeChild>) -> Self {
        Self {
            node_type,
            children,
        }
    }

    /// Depth-first collection of every token spanned by this node, in
    /// input order.
    pub fn tokens(&self) -> Vec<&Token> {
        let mut out = Vec::new();
        self.collect_tokens(&mut out);
        out
    }

    fn collect_tokens<'a>(&'a self, out: &mut Vec<&'a Token>) {
        for child in &self.children {
            match child {
                NodeChild::Token(t) => out.push(t),
                NodeChild::Node(n) => n.collect_tokens(out),
            }
        }
    }

    pub fn to_json(&self) -> serde_json::Value {
        serde_json::json!({
            "type": self.node_type.0,
            "children": self.children.iter().map(|c| match c {
                NodeChild::Token(t) => t.to_json(),
                NodeChild::Node(n) => n.to_json(),
            }).collect::<Vec<_>>(),
        })
    }
}
