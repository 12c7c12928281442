//! Domain entities: members, relationships and the derived tree types

use std::fmt;
use std::str::FromStr;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::domain::error::DomainError;

/// Identity of a family member.
pub type MemberId = Uuid;

/// Gender of a member, used for node styling only.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum Gender {
    #[serde(alias = "Male", alias = "m")]
    Male,
    #[serde(alias = "Female", alias = "f")]
    Female,
    #[default]
    #[serde(alias = "Other", alias = "unknown")]
    Other,
}

/// A person in a family.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Member {
    pub id: MemberId,
    #[serde(default)]
    pub first_name: String,
    #[serde(default)]
    pub last_name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub nickname: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub date_of_birth: Option<NaiveDate>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub date_of_death: Option<NaiveDate>,
    #[serde(default)]
    pub gender: Gender,
    /// Advisory only; the traversal root is always passed explicitly.
    #[serde(default)]
    pub is_root: bool,
    #[serde(default)]
    pub family_id: Uuid,
}

impl Member {
    /// Create a member with just an id and a name.
    pub fn new(id: MemberId, first_name: impl Into<String>, last_name: impl Into<String>) -> Self {
        Self {
            id,
            first_name: first_name.into(),
            last_name: last_name.into(),
            nickname: None,
            date_of_birth: None,
            date_of_death: None,
            gender: Gender::Other,
            is_root: false,
            family_id: Uuid::nil(),
        }
    }

    /// Full display name; falls back to the nickname, then to the id.
    pub fn display_name(&self) -> String {
        let name = [self.first_name.trim(), self.last_name.trim()]
            .iter()
            .filter(|part| !part.is_empty())
            .copied()
            .collect::<Vec<_>>()
            .join(" ");
        if !name.is_empty() {
            return name;
        }
        match &self.nickname {
            Some(nick) if !nick.trim().is_empty() => nick.trim().to_string(),
            _ => self.id.to_string(),
        }
    }

    /// Birth/death line, e.g. `1921-03-04 - 1999-12-01`, `b. 1950-01-02` or `d. 1944-06-06`.
    pub fn life_span(&self) -> Option<String> {
        match (self.date_of_birth, self.date_of_death) {
            (Some(b), Some(d)) => Some(format!("{} - {}", b, d)),
            (Some(b), None) => Some(format!("b. {}", b)),
            (None, Some(d)) => Some(format!("d. {}", d)),
            (None, None) => None,
        }
    }

    pub fn is_deceased(&self) -> bool {
        self.date_of_death.is_some()
    }
}

/// Closed set of relationship kinds.
///
/// Father/Mother/Child from A to B all mean "A is a parent of B".
/// Husband/Wife/Partner are spousal and symmetric regardless of direction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum RelationshipType {
    #[serde(alias = "father")]
    Father,
    #[serde(alias = "mother")]
    Mother,
    #[serde(alias = "child")]
    Child,
    #[serde(alias = "husband")]
    Husband,
    #[serde(alias = "wife")]
    Wife,
    #[serde(alias = "partner")]
    Partner,
    #[serde(alias = "sibling")]
    Sibling,
}

impl RelationshipType {
    pub fn is_parental(self) -> bool {
        matches!(self, Self::Father | Self::Mother | Self::Child)
    }

    pub fn is_spousal(self) -> bool {
        matches!(self, Self::Husband | Self::Wife | Self::Partner)
    }
}

/// A directed, pairwise relationship record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Relationship {
    #[serde(default = "Uuid::new_v4")]
    pub id: Uuid,
    pub source_member_id: MemberId,
    pub target_member_id: MemberId,
    #[serde(rename = "type")]
    pub kind: RelationshipType,
    #[serde(default)]
    pub order: i32,
    #[serde(default)]
    pub family_id: Uuid,
}

impl Relationship {
    pub fn new(source: MemberId, target: MemberId, kind: RelationshipType) -> Self {
        Self {
            id: Uuid::new_v4(),
            source_member_id: source,
            target_member_id: target,
            kind,
            order: 0,
            family_id: Uuid::nil(),
        }
    }

    pub fn with_order(mut self, order: i32) -> Self {
        self.order = order;
        self
    }
}

/// Unordered spousal pair, stored normalized as `first < second`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Couple {
    pub first: MemberId,
    pub second: MemberId,
}

impl Couple {
    /// Normalize a pair; `None` for a self-pair.
    pub fn new(a: MemberId, b: MemberId) -> Option<Self> {
        match a.cmp(&b) {
            std::cmp::Ordering::Less => Some(Self { first: a, second: b }),
            std::cmp::Ordering::Greater => Some(Self { first: b, second: a }),
            std::cmp::Ordering::Equal => None,
        }
    }

    /// The other member of the pair, if `id` belongs to it.
    pub fn partner_of(&self, id: MemberId) -> Option<MemberId> {
        if self.first == id {
            Some(self.second)
        } else if self.second == id {
            Some(self.first)
        } else {
            None
        }
    }

    /// Synthetic id of the invisible layout connector.
    pub fn connector_id(&self) -> String {
        format!("c_{}_{}", self.first.simple(), self.second.simple())
    }
}

impl fmt::Display for Couple {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} + {}", self.first, self.second)
    }
}

/// Where a parent-child edge starts.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EdgeSource {
    Member(MemberId),
    Couple(Couple),
}

/// A member placed in the subtree.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TreeNode {
    pub member_id: MemberId,
    pub generation: u32,
    pub visit_order: usize,
    pub couple: Option<Couple>,
}

/// A parent-child edge of the subtree, for rendering only.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TreeEdge {
    pub parent: EdgeSource,
    pub child: MemberId,
}

/// Layout direction passed through to the rendered graph.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Direction {
    /// Top to bottom
    #[default]
    #[serde(alias = "tb")]
    TB,
    /// Left to right
    #[serde(alias = "lr")]
    LR,
    /// Bottom to top
    #[serde(alias = "bt")]
    BT,
    /// Right to left
    #[serde(alias = "rl")]
    RL,
}

impl Direction {
    pub fn as_str(&self) -> &'static str {
        match self {
            Direction::TB => "TB",
            Direction::LR => "LR",
            Direction::BT => "BT",
            Direction::RL => "RL",
        }
    }
}

impl fmt::Display for Direction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Direction {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_uppercase().as_str() {
            "TB" | "TOP-BOTTOM" => Ok(Direction::TB),
            "LR" | "LEFT-RIGHT" => Ok(Direction::LR),
            "BT" | "BOTTOM-TOP" => Ok(Direction::BT),
            "RL" | "RIGHT-LEFT" => Ok(Direction::RL),
            other => Err(DomainError::InvalidValue {
                field: "direction",
                value: other.to_string(),
            }),
        }
    }
}

/// Paper size requested from the document converter.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PageSize {
    #[serde(alias = "A3")]
    A3,
    #[default]
    #[serde(alias = "A4")]
    A4,
    #[serde(alias = "A5")]
    A5,
    #[serde(alias = "Letter")]
    Letter,
    #[serde(alias = "Legal")]
    Legal,
}

impl PageSize {
    /// Width and height in inches, portrait.
    pub fn inches(&self) -> (f32, f32) {
        match self {
            PageSize::A3 => (11.7, 16.5),
            PageSize::A4 => (8.3, 11.7),
            PageSize::A5 => (5.8, 8.3),
            PageSize::Letter => (8.5, 11.0),
            PageSize::Legal => (8.5, 14.0),
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            PageSize::A3 => "a3",
            PageSize::A4 => "a4",
            PageSize::A5 => "a5",
            PageSize::Letter => "letter",
            PageSize::Legal => "legal",
        }
    }
}

impl fmt::Display for PageSize {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for PageSize {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "a3" => Ok(PageSize::A3),
            "a4" => Ok(PageSize::A4),
            "a5" => Ok(PageSize::A5),
            "letter" => Ok(PageSize::Letter),
            "legal" => Ok(PageSize::Legal),
            other => Err(DomainError::InvalidValue {
                field: "page_size",
                value: other.to_string(),
            }),
        }
    }
}

/// Output format of the rendered document.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DocumentFormat {
    #[default]
    #[serde(alias = "PDF")]
    Pdf,
    #[serde(alias = "PNG")]
    Png,
    #[serde(alias = "SVG")]
    Svg,
}

impl DocumentFormat {
    /// File extension and Graphviz `-T` value.
    pub fn extension(&self) -> &'static str {
        match self {
            DocumentFormat::Pdf => "pdf",
            DocumentFormat::Png => "png",
            DocumentFormat::Svg => "svg",
        }
    }
}

impl fmt::Display for DocumentFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.extension())
    }
}

impl FromStr for DocumentFormat {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "pdf" => Ok(DocumentFormat::Pdf),
            "png" => Ok(DocumentFormat::Png),
            "svg" => Ok(DocumentFormat::Svg),
            other => Err(DomainError::InvalidValue {
                field: "format",
                value: other.to_string(),
            }),
        }
    }
}

/// Parse a member id from user input.
pub fn parse_member_id(s: &str) -> Result<MemberId, DomainError> {
    Uuid::parse_str(s.trim()).map_err(|e| DomainError::InvalidMemberId {
        value: s.to_string(),
        message: e.to_string(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn id(n: u128) -> MemberId {
        Uuid::from_u128(n)
    }

    #[test]
    fn given_reversed_pair_when_creating_couple_then_normalizes_order() {
        let couple = Couple::new(id(2), id(1)).unwrap();
        assert_eq!(couple.first, id(1));
        assert_eq!(couple.second, id(2));
        assert_eq!(Couple::new(id(1), id(2)), Some(couple));
    }

    #[test]
    fn given_self_pair_when_creating_couple_then_none() {
        assert_eq!(Couple::new(id(7), id(7)), None);
    }

    #[test]
    fn given_couple_when_asking_partner_then_returns_other_side() {
        let couple = Couple::new(id(1), id(2)).unwrap();
        assert_eq!(couple.partner_of(id(1)), Some(id(2)));
        assert_eq!(couple.partner_of(id(2)), Some(id(1)));
        assert_eq!(couple.partner_of(id(3)), None);
    }

    #[test]
    fn given_member_without_names_when_display_then_falls_back() {
        let mut member = Member::new(id(5), "", "");
        assert_eq!(member.display_name(), id(5).to_string());
        member.nickname = Some("Bubba".into());
        assert_eq!(member.display_name(), "Bubba");
    }

    #[test]
    fn given_dates_when_life_span_then_formats() {
        let mut member = Member::new(id(1), "Ada", "Byron");
        assert_eq!(member.life_span(), None);
        member.date_of_birth = NaiveDate::from_ymd_opt(1815, 12, 10);
        assert_eq!(member.life_span().as_deref(), Some("b. 1815-12-10"));
        member.date_of_death = NaiveDate::from_ymd_opt(1852, 11, 27);
        assert_eq!(
            member.life_span().as_deref(),
            Some("1815-12-10 - 1852-11-27")
        );
    }

    #[test]
    fn given_direction_text_when_parsing_then_accepts_case_insensitive() {
        assert_eq!("lr".parse::<Direction>().unwrap(), Direction::LR);
        assert_eq!("TB".parse::<Direction>().unwrap(), Direction::TB);
        assert!("diagonal".parse::<Direction>().is_err());
    }
}
