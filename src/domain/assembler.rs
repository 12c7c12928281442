//! Packages a walk into the public subtree result.

use std::collections::HashMap;

use tracing::{debug, instrument};

use crate::domain::couples::CoupleResolver;
use crate::domain::entities::{Couple, Member, MemberId, Relationship, TreeEdge, TreeNode};
use crate::domain::index::RelationshipIndex;
use crate::domain::walker::{TreeWalker, Walk};

/// Nodes, edges and couples of a family subtree.
///
/// An empty subtree means the requested root was not among the members.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SubTree {
    pub nodes: Vec<TreeNode>,
    pub edges: Vec<TreeEdge>,
    pub couples: Vec<Couple>,
}

impl SubTree {
    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty() && self.edges.is_empty() && self.couples.is_empty()
    }

    pub fn root(&self) -> Option<MemberId> {
        self.nodes.first().map(|n| n.member_id)
    }

    pub fn node(&self, id: MemberId) -> Option<&TreeNode> {
        self.nodes.iter().find(|n| n.member_id == id)
    }

    pub fn generation_of(&self, id: MemberId) -> Option<u32> {
        self.node(id).map(|n| n.generation)
    }

    /// Deepest generation present, `None` when empty.
    pub fn depth(&self) -> Option<u32> {
        self.nodes.iter().map(|n| n.generation).max()
    }
}

pub struct SubtreeAssembler;

impl SubtreeAssembler {
    /// One node per visit, one edge per traversed parent-child pair and the
    /// couples joined during the walk.
    #[instrument(level = "debug", skip_all, fields(visits = walk.visits.len()))]
    pub fn assemble(walk: Walk) -> SubTree {
        let mut grouped: HashMap<MemberId, Couple> = HashMap::new();
        for couple in &walk.couples {
            grouped.entry(couple.first).or_insert(*couple);
            grouped.entry(couple.second).or_insert(*couple);
        }

        let nodes = walk
            .visits
            .iter()
            .enumerate()
            .map(|(visit_order, visit)| TreeNode {
                member_id: visit.member,
                generation: visit.generation,
                visit_order,
                couple: grouped.get(&visit.member).copied(),
            })
            .collect();

        let edges = walk
            .visits
            .iter()
            .filter_map(|visit| {
                visit.via.map(|parent| TreeEdge {
                    parent,
                    child: visit.member,
                })
            })
            .collect();

        SubTree {
            nodes,
            edges,
            couples: walk.couples,
        }
    }
}

/// Build the subtree of `root` from a family's flat records.
///
/// Pure: inputs are not mutated and no state outlives the call, so builds
/// for different roots may run in parallel.
#[instrument(level = "debug", skip(members, relationships), fields(members = members.len(), relationships = relationships.len()))]
pub fn build_subtree(members: &[Member], relationships: &[Relationship], root: MemberId) -> SubTree {
    if !members.iter().any(|m| m.id == root) {
        debug!("root {} not found, returning empty subtree", root);
        return SubTree::default();
    }

    let index = RelationshipIndex::build(relationships);
    let couples = CoupleResolver::resolve(members, &index);
    let walk = TreeWalker::new(&index, &couples, members).walk(root);
    let subtree = SubtreeAssembler::assemble(walk);

    debug!(
        "subtree of {}: {} nodes, {} edges, {} couples",
        root,
        subtree.nodes.len(),
        subtree.edges.len(),
        subtree.couples.len()
    );
    subtree
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::entities::EdgeSource;
    use crate::domain::entities::RelationshipType::*;
    use uuid::Uuid;

    fn id(n: u128) -> MemberId {
        Uuid::from_u128(n)
    }

    fn members(ids: &[u128]) -> Vec<Member> {
        ids.iter().map(|&n| Member::new(id(n), format!("M{n}"), "")).collect()
    }

    #[test]
    fn given_absent_root_when_building_then_empty_triple() {
        let rels = vec![Relationship::new(id(1), id(2), Father)];

        let subtree = build_subtree(&members(&[1, 2]), &rels, id(3));

        assert!(subtree.is_empty());
        assert_eq!(subtree, SubTree::default());
    }

    #[test]
    fn given_lone_root_when_building_then_single_node() {
        let subtree = build_subtree(&members(&[1]), &[], id(1));

        assert_eq!(subtree.nodes.len(), 1);
        assert_eq!(subtree.root(), Some(id(1)));
        assert_eq!(subtree.depth(), Some(0));
        assert!(subtree.edges.is_empty());
    }

    #[test]
    fn given_couple_when_assembling_then_nodes_carry_couple() {
        let rels = vec![
            Relationship::new(id(1), id(2), Wife),
            Relationship::new(id(1), id(3), Mother),
        ];

        let subtree = build_subtree(&members(&[1, 2, 3]), &rels, id(1));

        let couple = Couple::new(id(1), id(2)).unwrap();
        assert_eq!(subtree.node(id(1)).unwrap().couple, Some(couple));
        assert_eq!(subtree.node(id(2)).unwrap().couple, Some(couple));
        assert_eq!(subtree.node(id(3)).unwrap().couple, None);
        assert_eq!(
            subtree.edges,
            vec![TreeEdge {
                parent: EdgeSource::Couple(couple),
                child: id(3)
            }]
        );
    }

    #[test]
    fn given_visits_when_assembling_then_visit_order_is_sequential() {
        let rels = vec![
            Relationship::new(id(1), id(2), Father),
            Relationship::new(id(1), id(3), Father),
            Relationship::new(id(2), id(4), Father),
        ];

        let subtree = build_subtree(&members(&[1, 2, 3, 4]), &rels, id(1));

        let orders: Vec<usize> = subtree.nodes.iter().map(|n| n.visit_order).collect();
        assert_eq!(orders, vec![0, 1, 2, 3]);
        assert_eq!(subtree.depth(), Some(2));
    }
}
