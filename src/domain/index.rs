//! Adjacency lookups over the flat relationship list.

use std::collections::HashMap;

use tracing::{debug, instrument};

use crate::domain::entities::{MemberId, Relationship};

/// A parent to child link with its sibling ordering key.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ChildLink {
    pub child: MemberId,
    pub order: i32,
}

/// A spousal record as declared, before any normalization.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SpouseEdge {
    pub source: MemberId,
    pub target: MemberId,
}

/// O(1) lookups of children, parents and spouses by member id.
///
/// Referential integrity is not checked: ids that point nowhere simply
/// produce empty lookups.
#[derive(Debug, Default)]
pub struct RelationshipIndex {
    children: HashMap<MemberId, Vec<ChildLink>>,
    parents: HashMap<MemberId, Vec<MemberId>>,
    spouses: HashMap<MemberId, Vec<MemberId>>,
    spouse_edges: Vec<SpouseEdge>,
}

impl RelationshipIndex {
    #[instrument(level = "debug", skip_all, fields(relationships = relationships.len()))]
    pub fn build(relationships: &[Relationship]) -> Self {
        let mut index = Self::default();
        let mut dropped = 0usize;

        for rel in relationships {
            let (source, target) = (rel.source_member_id, rel.target_member_id);
            if rel.kind.is_parental() {
                if source == target {
                    dropped += 1;
                    continue;
                }
                index.add_child(source, target, rel.order);
            } else if rel.kind.is_spousal() {
                index.spouse_edges.push(SpouseEdge { source, target });
                if source == target {
                    continue;
                }
                add_unique(index.spouses.entry(source).or_default(), target);
                add_unique(index.spouses.entry(target).or_default(), source);
            }
        }

        debug!(
            "indexed {} parents, {} spouse edges, dropped {} self links",
            index.children.len(),
            index.spouse_edges.len(),
            dropped
        );
        index
    }

    /// Duplicate parent/child links collapse to one, keeping the smallest order.
    fn add_child(&mut self, parent: MemberId, child: MemberId, order: i32) {
        let links = self.children.entry(parent).or_default();
        match links.iter_mut().find(|l| l.child == child) {
            Some(existing) => existing.order = existing.order.min(order),
            None => links.push(ChildLink { child, order }),
        }
        add_unique(self.parents.entry(child).or_default(), parent);
    }

    pub fn children_of(&self, id: MemberId) -> &[ChildLink] {
        self.children.get(&id).map(Vec::as_slice).unwrap_or(&[])
    }

    pub fn parents_of(&self, id: MemberId) -> &[MemberId] {
        self.parents.get(&id).map(Vec::as_slice).unwrap_or(&[])
    }

    pub fn spouses_of(&self, id: MemberId) -> &[MemberId] {
        self.spouses.get(&id).map(Vec::as_slice).unwrap_or(&[])
    }

    /// Spousal records in input order, self-references included.
    pub fn spouse_edges(&self) -> &[SpouseEdge] {
        &self.spouse_edges
    }

    pub fn is_parent_of(&self, parent: MemberId, child: MemberId) -> bool {
        self.parents_of(child).contains(&parent)
    }

    /// Ordering key of `child` under `parent`, if linked.
    pub fn order_of(&self, parent: MemberId, child: MemberId) -> Option<i32> {
        self.children_of(parent)
            .iter()
            .find(|l| l.child == child)
            .map(|l| l.order)
    }
}

fn add_unique(ids: &mut Vec<MemberId>, id: MemberId) {
    if !ids.contains(&id) {
        ids.push(id);
    }
}
