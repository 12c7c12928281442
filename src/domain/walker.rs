//! Cycle-safe breadth-first walk from a root member down through its descendants.

use std::collections::{BTreeSet, HashMap, HashSet, VecDeque};

use tracing::{debug, instrument, trace};

use crate::domain::couples::CoupleSet;
use crate::domain::entities::{Couple, EdgeSource, Member, MemberId};
use crate::domain::index::RelationshipIndex;

/// One visited member, in discovery order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Visit {
    pub member: MemberId,
    pub generation: u32,
    /// Edge that discovered the member; `None` for the root and for spouses.
    pub via: Option<EdgeSource>,
}

/// Result of a walk: visits in BFS order and the couples grouped on the way.
#[derive(Debug, Clone, Default)]
pub struct Walk {
    pub visits: Vec<Visit>,
    /// Couples whose members share a generation, in the order they were joined.
    pub couples: Vec<Couple>,
}

impl Walk {
    pub fn is_empty(&self) -> bool {
        self.visits.is_empty()
    }

    pub fn generation_of(&self, id: MemberId) -> Option<u32> {
        self.visits
            .iter()
            .find(|v| v.member == id)
            .map(|v| v.generation)
    }
}

#[derive(Default)]
struct WalkState {
    generation: HashMap<MemberId, u32>,
    assigned: HashSet<MemberId>,
    joined: HashSet<Couple>,
    walk: Walk,
}

impl WalkState {
    /// Record a member unless it was seen before; first level wins.
    fn visit(&mut self, member: MemberId, generation: u32, via: Option<EdgeSource>) -> bool {
        if self.generation.contains_key(&member) {
            return false;
        }
        self.generation.insert(member, generation);
        self.walk.visits.push(Visit {
            member,
            generation,
            via,
        });
        true
    }

    fn join(&mut self, couple: Couple) {
        if self.joined.insert(couple) {
            self.walk.couples.push(couple);
        }
    }

    fn is_visited(&self, member: MemberId) -> bool {
        self.generation.contains_key(&member)
    }
}

/// Breadth-first traversal over family units.
///
/// A family unit is a member together with every spouse reachable through
/// couples at the same generation. Units are dequeued in BFS order and their
/// children placed one generation below.
pub struct TreeWalker<'a> {
    index: &'a RelationshipIndex,
    couples: &'a CoupleSet,
    known: HashSet<MemberId>,
}

impl<'a> TreeWalker<'a> {
    pub fn new(index: &'a RelationshipIndex, couples: &'a CoupleSet, members: &[Member]) -> Self {
        Self {
            index,
            couples,
            known: members.iter().map(|m| m.id).collect(),
        }
    }

    #[instrument(level = "debug", skip(self))]
    pub fn walk(&self, root: MemberId) -> Walk {
        if !self.known.contains(&root) {
            debug!("root {} is not a known member", root);
            return Walk::default();
        }

        let mut state = WalkState::default();
        let mut queue = VecDeque::new();

        state.visit(root, 0, None);
        if let Some(unit) = self.expand_unit(root, &mut state) {
            queue.push_back(unit);
        }

        while let Some(unit) = queue.pop_front() {
            let generation = state.generation[&unit[0]];
            let batch = self.children_of_unit(&unit, &state);
            trace!(
                "unit {:?} at generation {} has {} new children",
                unit,
                generation,
                batch.len()
            );

            let mut placed = Vec::with_capacity(batch.len());
            for (child, origin) in batch {
                if state.visit(child, generation + 1, Some(origin)) {
                    placed.push(child);
                }
            }
            for child in placed {
                if let Some(next) = self.expand_unit(child, &mut state) {
                    queue.push_back(next);
                }
            }
        }

        debug!(
            "walk visited {} members, joined {} couples",
            state.walk.visits.len(),
            state.walk.couples.len()
        );
        state.walk
    }

    /// Collect `start` and its spouses (transitively) into one unit.
    ///
    /// Returns `None` if `start` already belongs to a unit. Spouses not yet
    /// visited are placed at the same generation as `start`; a spouse already
    /// placed on another generation is left out and the couple is not joined.
    fn expand_unit(&self, start: MemberId, state: &mut WalkState) -> Option<Vec<MemberId>> {
        if !state.assigned.insert(start) {
            return None;
        }
        let generation = state.generation[&start];
        let mut unit = Vec::new();
        let mut pending = VecDeque::from([start]);

        while let Some(member) = pending.pop_front() {
            unit.push(member);
            for couple in self.couples.couples_of(member) {
                if state.joined.contains(couple) {
                    continue;
                }
                let Some(partner) = couple.partner_of(member) else {
                    continue;
                };
                if !self.known.contains(&partner) {
                    continue;
                }
                match state.generation.get(&partner).copied() {
                    None => {
                        state.visit(partner, generation, None);
                    }
                    Some(g) if g == generation => {}
                    Some(g) => {
                        debug!(
                            "not joining {}: generations {} and {} differ",
                            couple, generation, g
                        );
                        continue;
                    }
                }
                state.join(*couple);
                if state.assigned.insert(partner) {
                    pending.push_back(partner);
                }
            }
        }

        Some(unit)
    }

    /// New children of a unit with their edge origin, in sibling order.
    fn children_of_unit(&self, unit: &[MemberId], state: &WalkState) -> Vec<(MemberId, EdgeSource)> {
        let candidates: BTreeSet<MemberId> = unit
            .iter()
            .flat_map(|&m| self.index.children_of(m))
            .map(|link| link.child)
            .filter(|child| self.known.contains(child) && !state.is_visited(*child))
            .collect();

        let origins = self.ranked_origins(unit, state);
        let mut batch: Vec<(usize, i32, MemberId, EdgeSource)> = candidates
            .into_iter()
            .filter_map(|child| {
                let parents: Vec<MemberId> = unit
                    .iter()
                    .copied()
                    .filter(|&p| self.index.is_parent_of(p, child))
                    .collect();
                let origin = self.origin_for(child, &parents, state)?;
                let order = parents
                    .iter()
                    .filter_map(|&p| self.index.order_of(p, child))
                    .min()
                    .unwrap_or_default();
                let rank = origins
                    .iter()
                    .position(|o| *o == origin)
                    .unwrap_or(origins.len());
                Some((rank, order, child, origin))
            })
            .collect();

        batch.sort_by(|a, b| (a.0, a.1, a.2).cmp(&(b.0, b.1, b.2)));
        batch
            .into_iter()
            .map(|(_, _, child, origin)| (child, origin))
            .collect()
    }

    /// Pick the edge origin of a child from its parents inside the unit.
    ///
    /// Prefers a joined couple made of two of its parents, then the first
    /// joined couple of its first parent, then the parent alone.
    fn origin_for(
        &self,
        child: MemberId,
        parents: &[MemberId],
        state: &WalkState,
    ) -> Option<EdgeSource> {
        let first = *parents.first()?;

        for &parent in parents {
            for couple in self.couples.couples_of(parent) {
                if state.joined.contains(couple)
                    && self.index.is_parent_of(couple.first, child)
                    && self.index.is_parent_of(couple.second, child)
                {
                    return Some(EdgeSource::Couple(*couple));
                }
            }
        }

        let origin = self
            .couples
            .couples_of(first)
            .iter()
            .find(|c| state.joined.contains(c))
            .map(|c| EdgeSource::Couple(*c))
            .unwrap_or(EdgeSource::Member(first));
        Some(origin)
    }

    fn ranked_origins(&self, unit: &[MemberId], state: &WalkState) -> Vec<EdgeSource> {
        let mut origins = Vec::new();
        for &member in unit {
            for couple in self.couples.couples_of(member) {
                let origin = EdgeSource::Couple(*couple);
                if state.joined.contains(couple) && !origins.contains(&origin) {
                    origins.push(origin);
                }
            }
            origins.push(EdgeSource::Member(member));
        }
        origins
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::couples::CoupleResolver;
    use crate::domain::entities::Relationship;
    use crate::domain::entities::RelationshipType::*;
    use uuid::Uuid;

    fn id(n: u128) -> MemberId {
        Uuid::from_u128(n)
    }

    fn walk(member_ids: &[u128], rels: &[Relationship], root: u128) -> Walk {
        let members: Vec<Member> = member_ids
            .iter()
            .map(|&n| Member::new(id(n), format!("M{n}"), ""))
            .collect();
        let index = RelationshipIndex::build(rels);
        let couples = CoupleResolver::resolve(&members, &index);
        TreeWalker::new(&index, &couples, &members).walk(id(root))
    }

    #[test]
    fn given_unknown_root_when_walking_then_empty() {
        let result = walk(&[1], &[], 2);
        assert!(result.is_empty());
    }

    #[test]
    fn given_spouse_when_walking_then_same_generation_without_edge() {
        let rels = vec![Relationship::new(id(1), id(2), Husband)];

        let result = walk(&[1, 2], &rels, 1);

        assert_eq!(result.visits.len(), 2);
        assert_eq!(result.visits[1].member, id(2));
        assert_eq!(result.visits[1].generation, 0);
        assert_eq!(result.visits[1].via, None);
        assert_eq!(result.couples, vec![Couple::new(id(1), id(2)).unwrap()]);
    }

    #[test]
    fn given_child_linked_only_to_mother_when_father_is_root_then_found() {
        let rels = vec![
            Relationship::new(id(1), id(2), Husband),
            Relationship::new(id(2), id(3), Mother),
        ];

        let result = walk(&[1, 2, 3], &rels, 1);

        assert_eq!(result.generation_of(id(3)), Some(1));
        let child = result.visits.iter().find(|v| v.member == id(3)).unwrap();
        assert_eq!(
            child.via,
            Some(EdgeSource::Couple(Couple::new(id(1), id(2)).unwrap()))
        );
    }

    #[test]
    fn given_cycle_when_walking_then_terminates_with_single_visit_each() {
        // 1 -> 2 -> 3 -> 1
        let rels = vec![
            Relationship::new(id(1), id(2), Father),
            Relationship::new(id(2), id(3), Father),
            Relationship::new(id(3), id(1), Father),
        ];

        let result = walk(&[1, 2, 3], &rels, 1);

        assert_eq!(result.visits.len(), 3);
        assert_eq!(result.generation_of(id(1)), Some(0));
        assert_eq!(result.generation_of(id(3)), Some(2));
    }

    #[test]
    fn given_parent_not_walked_upward_when_walking_then_ancestors_excluded() {
        let rels = vec![
            Relationship::new(id(9), id(1), Father),
            Relationship::new(id(1), id(2), Father),
        ];

        let result = walk(&[1, 2, 9], &rels, 1);

        assert_eq!(result.generation_of(id(9)), None);
        assert_eq!(result.visits.len(), 2);
    }

    #[test]
    fn given_married_siblings_when_walking_then_couples_share_generation() {
        let rels = vec![
            Relationship::new(id(1), id(2), Father),
            Relationship::new(id(3), id(2), Husband),
            Relationship::new(id(1), id(3), Father),
            Relationship::new(id(3), id(4), Partner),
        ];

        let result = walk(&[1, 2, 3, 4], &rels, 1);

        // 2 and 3 are both children of 1, so their marriage is joined at generation 1
        assert_eq!(result.generation_of(id(2)), Some(1));
        assert_eq!(result.generation_of(id(3)), Some(1));
        assert_eq!(result.generation_of(id(4)), Some(1));
        for couple in &result.couples {
            assert_eq!(
                result.generation_of(couple.first),
                result.generation_of(couple.second)
            );
        }
    }

    #[test]
    fn given_contradictory_spouse_and_child_when_walking_then_spouse_wins() {
        let rels = vec![
            Relationship::new(id(1), id(2), Husband),
            Relationship::new(id(1), id(2), Child),
        ];

        let result = walk(&[1, 2], &rels, 1);

        assert_eq!(result.generation_of(id(2)), Some(0));
        assert!(result.visits.iter().all(|v| v.via.is_none()));
    }
}
