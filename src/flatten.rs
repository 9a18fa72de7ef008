use crate::tree::{InnerTree, Node, NodeChild, TreeChild};

/// Collapse an anonymous scaffolding tree into the public typed tree.
///
/// A child `InnerTree` with no type label is spliced: its own children
/// take its place. A labeled child is recursively flattened into a
/// [`Node`]. Tokens pass through unchanged. Splicing repeats until no
/// anonymous layer remains directly under `root` — an anonymous tree
/// whose children are themselves anonymous needs more than one pass,
/// which is what the `loop` below accounts for.
///
/// `root` itself must already carry a type (every node's root combinator
/// is a `Concat` labeled with that node's own type), so this never needs
/// to invent one.
pub fn flatten(root: InnerTree) -> Node {
    let node_type = root
        .node_type
        .expect("flatten called on an anonymous inner tree");

    let mut children = root.children;
    loop {
        let mut needs_more = false;
        let mut spliced = Vec::with_capacity(children.len());

        for child in children {
            match child {
                TreeChild::Token(token) => spliced.push(TreeChild::Token(token)),
                TreeChild::Inner(inner) if inner.is_anonymous() => {
                    needs_more = true;
                    spliced.extend(inner.children);
                }
                TreeChild::Inner(inner) => spliced.push(TreeChild::Inner(inner)),
            }
        }

        children = spliced;
        if !needs_more {
            break;
        }
    }

    let flattened_children = children
        .into_iter()
        .map(|child| match child {
            TreeChild::Token(token) => NodeChild::Token(token),
            TreeChild::Inner(inner) => NodeChild::Node(flatten(inner)),
        })
        .collect();

    Node::new(node_type, flattened_children)
}
