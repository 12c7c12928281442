//! Groups spouses into unordered couples.

use std::collections::{BTreeMap, BTreeSet, HashSet};

use tracing::{debug, instrument, warn};

use crate::domain::entities::{Couple, Member, MemberId};
use crate::domain::index::RelationshipIndex;

/// Every couple of a family, keyed by the normalized pair.
#[derive(Debug, Default, Clone)]
pub struct CoupleSet {
    couples: BTreeSet<Couple>,
    by_member: BTreeMap<MemberId, Vec<Couple>>,
}

impl CoupleSet {
    /// Insert a couple; returns false if the pair was already present.
    pub fn insert(&mut self, couple: Couple) -> bool {
        if !self.couples.insert(couple) {
            return false;
        }
        for id in [couple.first, couple.second] {
            let list = self.by_member.entry(id).or_default();
            list.push(couple);
            list.sort();
        }
        true
    }

    /// Couples containing `id`, in ascending pair order.
    pub fn couples_of(&self, id: MemberId) -> &[Couple] {
        self.by_member.get(&id).map(Vec::as_slice).unwrap_or(&[])
    }

    pub fn iter(&self) -> impl Iterator<Item = &Couple> {
        self.couples.iter()
    }

    pub fn len(&self) -> usize {
        self.couples.len()
    }

    pub fn is_empty(&self) -> bool {
        self.couples.is_empty()
    }
}

pub struct CoupleResolver;

impl CoupleResolver {
    /// Normalize every spousal edge into a couple.
    ///
    /// Self-references and pairs naming an unknown member are dropped.
    /// Husband A->B and Wife B->A collapse into the same couple.
    #[instrument(level = "debug", skip_all)]
    pub fn resolve(members: &[Member], index: &RelationshipIndex) -> CoupleSet {
        let known: HashSet<MemberId> = members.iter().map(|m| m.id).collect();
        let mut set = CoupleSet::default();

        for edge in index.spouse_edges() {
            let Some(couple) = Couple::new(edge.source, edge.target) else {
                warn!("dropping self-referencing spousal relationship of {}", edge.source);
                continue;
            };
            if !known.contains(&couple.first) || !known.contains(&couple.second) {
                debug!("dropping couple with unknown member: {}", couple);
                continue;
            }
            if !set.insert(couple) {
                debug!("duplicate spousal relationship collapsed: {}", couple);
            }
        }

        debug!("resolved {} couples", set.len());
        set
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::entities::Relationship;
    use crate::domain::entities::RelationshipType::*;
    use uuid::Uuid;

    fn id(n: u128) -> MemberId {
        Uuid::from_u128(n)
    }

    fn members(ids: &[u128]) -> Vec<Member> {
        ids.iter().map(|&n| Member::new(id(n), format!("M{n}"), "")).collect()
    }

    #[test]
    fn given_husband_and_wife_records_for_same_pair_when_resolving_then_one_couple() {
        let rels = vec![
            Relationship::new(id(1), id(2), Husband),
            Relationship::new(id(2), id(1), Wife),
        ];
        let index = RelationshipIndex::build(&rels);

        let couples = CoupleResolver::resolve(&members(&[1, 2]), &index);

        assert_eq!(couples.len(), 1);
        assert_eq!(couples.couples_of(id(1)), couples.couples_of(id(2)));
    }

    #[test]
    fn given_remarriage_when_resolving_then_keeps_both_couples() {
        let rels = vec![
            Relationship::new(id(1), id(3), Husband),
            Relationship::new(id(2), id(1), Wife),
        ];
        let index = RelationshipIndex::build(&rels);

        let couples = CoupleResolver::resolve(&members(&[1, 2, 3]), &index);

        assert_eq!(couples.len(), 2);
        let of_one = couples.couples_of(id(1));
        assert_eq!(of_one.len(), 2);
        // ascending pair order
        assert_eq!(of_one[0], Couple::new(id(1), id(2)).unwrap());
        assert_eq!(of_one[1], Couple::new(id(1), id(3)).unwrap());
    }

    #[test]
    fn given_self_spouse_when_resolving_then_dropped() {
        let rels = vec![Relationship::new(id(1), id(1), Partner)];
        let index = RelationshipIndex::build(&rels);

        let couples = CoupleResolver::resolve(&members(&[1]), &index);

        assert!(couples.is_empty());
    }

    #[test]
    fn given_partner_outside_member_set_when_resolving_then_dropped() {
        let rels = vec![Relationship::new(id(1), id(42), Husband)];
        let index = RelationshipIndex::build(&rels);

        let couples = CoupleResolver::resolve(&members(&[1]), &index);

        assert!(couples.is_empty());
        assert!(couples.couples_of(id(1)).is_empty());
    }
}
