//! Text outline of a subtree for terminal display.

use std::collections::HashMap;

use termtree::Tree;

use crate::domain::{EdgeSource, Member, MemberId, SubTree};

/// Render `subtree` as an indented tree.
///
/// Each couple is listed under the spouse who was reached first, as a
/// `⚭ partner` branch holding the couple's children. Children of a lone
/// parent hang directly off that parent.
pub fn outline(subtree: &SubTree, members: &[Member]) -> Tree<String> {
    let Some(root) = subtree.root() else {
        return Tree::new("(empty)".to_string());
    };
    Outliner::new(subtree, members).member_tree(root)
}

struct Outliner<'a> {
    subtree: &'a SubTree,
    names: HashMap<MemberId, &'a Member>,
    order: HashMap<MemberId, usize>,
    children: HashMap<EdgeSource, Vec<MemberId>>,
}

impl<'a> Outliner<'a> {
    fn new(subtree: &'a SubTree, members: &'a [Member]) -> Self {
        let mut children: HashMap<EdgeSource, Vec<MemberId>> = HashMap::new();
        for edge in &subtree.edges {
            children.entry(edge.parent).or_default().push(edge.child);
        }
        Self {
            subtree,
            names: members.iter().map(|m| (m.id, m)).collect(),
            order: subtree
                .nodes
                .iter()
                .map(|n| (n.member_id, n.visit_order))
                .collect(),
            children,
        }
    }

    fn label(&self, id: MemberId) -> String {
        match self.names.get(&id) {
            Some(member) => match member.life_span() {
                Some(span) => format!("{} ({})", member.display_name(), span),
                None => member.display_name(),
            },
            None => id.to_string(),
        }
    }

    fn member_tree(&self, id: MemberId) -> Tree<String> {
        Tree::new(self.label(id)).with_leaves(self.branches(id))
    }

    /// Couples anchored at `id`, then children of `id` alone.
    fn branches(&self, id: MemberId) -> Vec<Tree<String>> {
        let mut branches = Vec::new();

        for couple in &self.subtree.couples {
            let Some(partner) = couple.partner_of(id) else {
                continue;
            };
            if self.visit_order(partner) < self.visit_order(id) {
                continue;
            }
            let mut leaves: Vec<Tree<String>> = self
                .children_of(EdgeSource::Couple(*couple))
                .iter()
                .map(|&child| self.member_tree(child))
                .collect();
            leaves.extend(self.branches(partner));
            branches.push(Tree::new(format!("⚭ {}", self.label(partner))).with_leaves(leaves));
        }

        for &child in self.children_of(EdgeSource::Member(id)) {
            branches.push(self.member_tree(child));
        }
        branches
    }

    fn children_of(&self, source: EdgeSource) -> &[MemberId] {
        self.children
            .get(&source)
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }

    fn visit_order(&self, id: MemberId) -> usize {
        self.order.get(&id).copied().unwrap_or(usize::MAX)
    }
}
