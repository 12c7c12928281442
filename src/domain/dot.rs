//! Graphviz DOT emission for an assembled subtree.
//!
//! The emitter does no layout of its own. Couples are drawn through an
//! invisible connector node that shares a rank with both spouses, and
//! children of a couple hang off that connector.

use std::collections::HashMap;

use tracing::instrument;

use crate::domain::assembler::SubTree;
use crate::domain::entities::{Couple, Direction, EdgeSource, Gender, Member, MemberId};

const INDENT: &str = "    ";

/// Render `subtree` as DOT text.
///
/// Iteration follows node visit order and couple join order only, so equal
/// inputs always produce byte-identical output.
#[instrument(level = "debug", skip_all, fields(nodes = subtree.nodes.len(), direction = %direction))]
pub fn emit(subtree: &SubTree, members: &[Member], direction: Direction) -> String {
    let by_id: HashMap<MemberId, &Member> = members.iter().map(|m| (m.id, m)).collect();
    let mut out = String::new();

    out.push_str("digraph family {\n");
    out.push_str(&format!("{INDENT}rankdir={};\n", direction.as_str()));
    out.push_str(&format!(
        "{INDENT}node [shape=box, style=\"rounded,filled\", fontname=\"Helvetica\", fontsize=10];\n"
    ));
    out.push_str(&format!("{INDENT}edge [arrowhead=none];\n"));

    if !subtree.nodes.is_empty() {
        out.push('\n');
    }
    for node in &subtree.nodes {
        out.push_str(&member_declaration(node.member_id, by_id.get(&node.member_id).copied()));
    }

    for couple in &subtree.couples {
        out.push('\n');
        out.push_str(&couple_declaration(couple));
    }

    if !subtree.edges.is_empty() {
        out.push('\n');
    }
    for edge in &subtree.edges {
        let from = match edge.parent {
            EdgeSource::Member(id) => member_node_id(id),
            EdgeSource::Couple(couple) => couple.connector_id(),
        };
        out.push_str(&format!(
            "{INDENT}\"{}\" -> \"{}\";\n",
            from,
            member_node_id(edge.child)
        ));
    }

    out.push_str("}\n");
    out
}

/// DOT identifier of a member node.
pub fn member_node_id(id: MemberId) -> String {
    format!("m_{}", id.simple())
}

fn member_declaration(id: MemberId, member: Option<&Member>) -> String {
    let Some(member) = member else {
        return format!(
            "{INDENT}\"{}\" [label=\"{}\"];\n",
            member_node_id(id),
            escape_label(&id.to_string())
        );
    };

    let mut label = escape_label(&member.display_name());
    if let Some(span) = member.life_span() {
        label.push_str("\\n");
        label.push_str(&escape_label(&span));
    }
    let style = if member.is_deceased() {
        ", style=\"rounded,filled,dashed\""
    } else {
        ""
    };

    format!(
        "{INDENT}\"{}\" [label=\"{}\", fillcolor=\"{}\"{}];\n",
        member_node_id(id),
        label,
        fill_color(member.gender),
        style
    )
}

fn couple_declaration(couple: &Couple) -> String {
    let connector = couple.connector_id();
    let first = member_node_id(couple.first);
    let second = member_node_id(couple.second);

    let mut out = String::new();
    out.push_str(&format!(
        "{INDENT}\"{connector}\" [shape=point, style=invis, width=0, height=0, label=\"\"];\n"
    ));
    out.push_str(&format!(
        "{INDENT}{{ rank=same; \"{first}\"; \"{connector}\"; \"{second}\"; }}\n"
    ));
    out.push_str(&format!("{INDENT}\"{first}\" -> \"{connector}\";\n"));
    out.push_str(&format!("{INDENT}\"{second}\" -> \"{connector}\";\n"));
    out
}

fn fill_color(gender: Gender) -> &'static str {
    match gender {
        Gender::Male => "#cfe2f3",
        Gender::Female => "#f4cccc",
        Gender::Other => "#eeeeee",
    }
}

/// Escape text for use inside a double-quoted DOT label.
pub fn escape_label(text: &str) -> String {
    let mut escaped = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '\\' => escaped.push_str("\\\\"),
            '"' => escaped.push_str("\\\""),
            '\n' | '\r' => escaped.push(' '),
            other => escaped.push(other),
        }
    }
    escaped
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::assembler::build_subtree;
    use crate::domain::entities::Relationship;
    use crate::domain::entities::RelationshipType::*;
    use chrono::NaiveDate;
    use uuid::Uuid;

    fn id(n: u128) -> MemberId {
        Uuid::from_u128(n)
    }

    #[test]
    fn given_empty_subtree_when_emitting_then_graph_header_only() {
        let text = emit(&SubTree::default(), &[], Direction::LR);

        assert!(text.starts_with("digraph family {\n"));
        assert!(text.contains("rankdir=LR;"));
        assert!(text.ends_with("}\n"));
        assert!(!text.contains("->"));
    }

    #[test]
    fn given_quotes_and_backslashes_when_escaping_then_dot_safe() {
        assert_eq!(escape_label(r#"Joe "Jr" \ Smith"#), r#"Joe \"Jr\" \\ Smith"#);
        assert_eq!(escape_label("a\nb"), "a b");
    }

    #[test]
    fn given_member_with_dates_when_emitting_then_second_label_line() {
        let mut member = Member::new(id(1), "Ada", "Lovelace");
        member.gender = Gender::Female;
        member.date_of_birth = NaiveDate::from_ymd_opt(1815, 12, 10);
        member.date_of_death = NaiveDate::from_ymd_opt(1852, 11, 27);
        let members = vec![member];
        let subtree = build_subtree(&members, &[], id(1));

        let text = emit(&subtree, &members, Direction::TB);

        assert!(text.contains("label=\"Ada Lovelace\\n1815-12-10 - 1852-11-27\""));
        assert!(text.contains("fillcolor=\"#f4cccc\""));
        assert!(text.contains("dashed"));
    }

    #[test]
    fn given_couple_with_child_when_emitting_then_child_hangs_off_connector() {
        let members = vec![
            Member::new(id(1), "A", ""),
            Member::new(id(2), "B", ""),
            Member::new(id(3), "C", ""),
        ];
        let rels = vec![
            Relationship::new(id(1), id(2), Husband),
            Relationship::new(id(2), id(3), Mother),
        ];
        let subtree = build_subtree(&members, &rels, id(1));
        let connector = Couple::new(id(1), id(2)).unwrap().connector_id();

        let text = emit(&subtree, &members, Direction::TB);

        assert!(text.contains(&format!("\"{connector}\" [shape=point, style=invis")));
        assert!(text.contains(&format!(
            "\"{}\" -> \"{}\";",
            member_node_id(id(1)),
            connector
        )));
        assert!(text.contains(&format!(
            "\"{}\" -> \"{}\";",
            member_node_id(id(2)),
            connector
        )));
        assert!(text.contains(&format!(
            "\"{}\" -> \"{}\";",
            connector,
            member_node_id(id(3))
        )));
    }

    #[test]
    fn given_lone_parent_when_emitting_then_edge_from_member() {
        let members = vec![Member::new(id(1), "A", ""), Member::new(id(2), "B", "")];
        let rels = vec![Relationship::new(id(1), id(2), Father)];
        let subtree = build_subtree(&members, &rels, id(1));

        let text = emit(&subtree, &members, Direction::TB);

        assert!(text.contains(&format!(
            "\"{}\" -> \"{}\";",
            member_node_id(id(1)),
            member_node_id(id(2))
        )));
    }
}
