//! Small Cypher AST rendered in one place.
//!
//! The compiler only builds values of these types; all quoting and escaping
//! happens in the `Display` implementations below.

use std::fmt;

/// Node pattern `(var:Label)`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NodePattern {
    pub var: &'static str,
    pub label: Option<String>,
}

impl NodePattern {
    pub fn new(var: &'static str, label: Option<&str>) -> Self {
        Self {
            var,
            label: label.map(str::to_string),
        }
    }
}

/// Relationship pattern `-[var:TYPE]->`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RelPattern {
    pub var: Option<&'static str>,
    pub rel_type: Option<String>,
    /// Inclusive hop bounds for variable-length patterns
    pub hops: Option<(u32, u32)>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Pattern {
    Node(NodePattern),
    /// `(from)-[rel]->(to)`; the node patterns may repeat already bound variables
    Relationship {
        from: NodePattern,
        rel: RelPattern,
        to: NodePattern,
    },
    /// `path = (from)-[rel]->(to)`
    Path {
        path_var: &'static str,
        from: NodePattern,
        rel: RelPattern,
        to: NodePattern,
    },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MatchClause {
    pub optional: bool,
    pub pattern: Pattern,
}

impl MatchClause {
    pub fn required(pattern: Pattern) -> Self {
        Self {
            optional: false,
            pattern,
        }
    }

    pub fn optional(pattern: Pattern) -> Self {
        Self {
            optional: true,
            pattern,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum Literal {
    Str(String),
    Bool(bool),
}

/// Boolean expression used in WHERE clauses
#[derive(Debug, Clone, PartialEq)]
pub enum Predicate {
    /// `var:Label`
    HasLabel { var: &'static str, label: String },
    /// `var.prop = literal`
    Equals {
        var: &'static str,
        prop: String,
        value: Literal,
    },
    /// `var.prop <> literal`
    NotEquals {
        var: &'static str,
        prop: String,
        value: Literal,
    },
    /// `var.prop IS NOT NULL`
    IsNotNull { var: &'static str, prop: String },
    And(Vec<Predicate>),
    Or(Vec<Predicate>),
}

impl Predicate {
    pub fn equals(var: &'static str, prop: &str, value: &str) -> Self {
        Predicate::Equals {
            var,
            prop: prop.to_string(),
            value: Literal::Str(value.to_string()),
        }
    }

    pub fn has_label(var: &'static str, label: &str) -> Self {
        Predicate::HasLabel {
            var,
            label: label.to_string(),
        }
    }

    /// Conjunction that collapses to its single member
    pub fn all(mut predicates: Vec<Predicate>) -> Option<Predicate> {
        match predicates.len() {
            0 => None,
            1 => predicates.pop(),
            _ => Some(Predicate::And(predicates)),
        }
    }

    /// Disjunction that collapses to its single member
    pub fn any(mut predicates: Vec<Predicate>) -> Option<Predicate> {
        match predicates.len() {
            0 => None,
            1 => predicates.pop(),
            _ => Some(Predicate::Or(predicates)),
        }
    }
}

/// Expression in a RETURN projection
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Expr {
    Var(&'static str),
    Null,
    StartNode(&'static str),
    EndNode(&'static str),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ReturnClause {
    /// `RETURN n, r, m` with aliases where the expression is not the column itself
    Triple { n: Expr, r: Expr, m: Expr },
    /// `RETURN count(expr) AS count`
    Count(Expr),
}

impl ReturnClause {
    pub fn triple() -> Self {
        ReturnClause::Triple {
            n: Expr::Var("n"),
            r: Expr::Var("r"),
            m: Expr::Var("m"),
        }
    }

    pub fn node_only() -> Self {
        ReturnClause::Triple {
            n: Expr::Var("n"),
            r: Expr::Null,
            m: Expr::Null,
        }
    }
}

/// `UNWIND relationships(path) AS var`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnwindRelationships {
    pub path_var: &'static str,
    pub var: &'static str,
}

/// One independently matched part of a union
#[derive(Debug, Clone, PartialEq)]
pub struct QueryBranch {
    pub matches: Vec<MatchClause>,
    pub where_clause: Option<Predicate>,
    pub unwind: Option<UnwindRelationships>,
    pub returns: ReturnClause,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UnionKind {
    /// Set union, duplicates removed
    Distinct,
    /// Bag union, needed when branches return equal scalar rows
    All,
}

/// Complete program: branches joined by a union and an optional global LIMIT
#[derive(Debug, Clone, PartialEq)]
pub struct QueryProgram {
    pub branches: Vec<QueryBranch>,
    pub union: UnionKind,
    pub limit: Option<usize>,
}

impl QueryProgram {
    pub fn render(&self) -> String {
        self.to_string()
    }
}

/// Renders a label or relationship type, back-quoting anything that is not
/// a plain identifier
fn write_name(f: &mut fmt::Formatter<'_>, name: &str) -> fmt::Result {
    let mut chars = name.chars();
    let plain = match chars.next() {
        Some(first) => {
            (first.is_ascii_alphabetic() || first == '_')
                && chars.all(|c| c.is_ascii_alphanumeric() || c == '_')
        }
        None => false,
    };

    if plain {
        write!(f, "{}", name)
    } else {
        write!(f, "`{}`", name.replace('`', "``"))
    }
}

impl fmt::Display for Literal {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Literal::Str(value) => {
                let escaped = value.replace('\\', "\\\\").replace('\'', "\\'");
                write!(f, "'{}'", escaped)
            }
            Literal::Bool(value) => write!(f, "{}", value),
        }
    }
}

impl fmt::Display for NodePattern {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}", self.var)?;
        if let Some(label) = &self.label {
            write!(f, ":")?;
            write_name(f, label)?;
        }
        write!(f, ")")
    }
}

impl fmt::Display for RelPattern {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "-[")?;
        if let Some(var) = self.var {
            write!(f, "{}", var)?;
        }
        if let Some(rel_type) = &self.rel_type {
            write!(f, ":")?;
            write_name(f, rel_type)?;
        }
        if let Some((min, max)) = self.hops {
            write!(f, "*{}..{}", min, max)?;
        }
        write!(f, "]->")
    }
}

impl fmt::Display for Pattern {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Pattern::Node(node) => write!(f, "{}", node),
            Pattern::Relationship { from, rel, to } => write!(f, "{}{}{}", from, rel, to),
            Pattern::Path {
                path_var,
                from,
                rel,
                to,
            } => write!(f, "{} = {}{}{}", path_var, from, rel, to),
        }
    }
}

impl fmt::Display for MatchClause {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.optional {
            write!(f, "OPTIONAL ")?;
        }
        write!(f, "MATCH {}", self.pattern)
    }
}

impl fmt::Display for Predicate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Predicate::HasLabel { var, label } => {
                write!(f, "{}:", var)?;
                write_name(f, label)
            }
            Predicate::Equals { var, prop, value } => {
                write!(f, "{}.", var)?;
                write_name(f, prop)?;
                write!(f, " = {}", value)
            }
            Predicate::NotEquals { var, prop, value } => {
                write!(f, "{}.", var)?;
                write_name(f, prop)?;
                write!(f, " <> {}", value)
            }
            Predicate::IsNotNull { var, prop } => {
                write!(f, "{}.", var)?;
                write_name(f, prop)?;
                write!(f, " IS NOT NULL")
            }
            Predicate::And(parts) => write_joined(f, parts, " AND "),
            Predicate::Or(parts) => write_joined(f, parts, " OR "),
        }
    }
}

fn write_joined(f: &mut fmt::Formatter<'_>, parts: &[Predicate], separator: &str) -> fmt::Result {
    for (i, part) in parts.iter().enumerate() {
        if i > 0 {
            write!(f, "{}", separator)?;
        }
        match part {
            Predicate::And(_) | Predicate::Or(_) => write!(f, "({})", part)?,
            _ => write!(f, "{}", part)?,
        }
    }
    Ok(())
}

impl fmt::Display for Expr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Expr::Var(var) => write!(f, "{}", var),
            Expr::Null => write!(f, "null"),
            Expr::StartNode(var) => write!(f, "startNode({})", var),
            Expr::EndNode(var) => write!(f, "endNode({})", var),
        }
    }
}

fn write_column(f: &mut fmt::Formatter<'_>, expr: &Expr, column: &str) -> fmt::Result {
    match expr {
        Expr::Var(var) if *var == column => write!(f, "{}", var),
        other => write!(f, "{} AS {}", other, column),
    }
}

impl fmt::Display for ReturnClause {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ReturnClause::Triple { n, r, m } => {
                write!(f, "RETURN ")?;
                write_column(f, n, "n")?;
                write!(f, ", ")?;
                write_column(f, r, "r")?;
                write!(f, ", ")?;
                write_column(f, m, "m")
            }
            ReturnClause::Count(expr) => write!(f, "RETURN count({}) AS count", expr),
        }
    }
}

impl fmt::Display for QueryBranch {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for clause in &self.matches {
            write!(f, "{} ", clause)?;
        }
        if let Some(predicate) = &self.where_clause {
            write!(f, "WHERE {} ", predicate)?;
        }
        if let Some(unwind) = &self.unwind {
            write!(
                f,
                "UNWIND relationships({}) AS {} ",
                unwind.path_var, unwind.var
            )?;
        }
        write!(f, "{}", self.returns)
    }
}

impl fmt::Display for QueryProgram {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let separator = match self.union {
            UnionKind::Distinct => " UNION ",
            UnionKind::All => " UNION ALL ",
        };

        // LIMIT after a plain UNION would only cap the last branch
        let wrap = self.limit.is_some() && self.branches.len() > 1;
        if wrap {
            write!(f, "CALL {{ ")?;
        }
        for (i, branch) in self.branches.iter().enumerate() {
            if i > 0 {
                write!(f, "{}", separator)?;
            }
            write!(f, "{}", branch)?;
        }
        if wrap {
            write!(f, " }} RETURN n, r, m")?;
        }
        if let Some(limit) = self.limit {
            write!(f, " LIMIT {}", limit)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn simple_branch(label: &str) -> QueryBranch {
        QueryBranch {
            matches: vec![MatchClause::required(Pattern::Node(NodePattern::new(
                "n",
                Some(label),
            )))],
            where_clause: None,
            unwind: None,
            returns: ReturnClause::node_only(),
        }
    }

    #[test]
    fn test_string_literal_escaping() {
        let literal = Literal::Str("it's a \\ test".to_string());
        assert_eq!(literal.to_string(), r"'it\'s a \\ test'");
    }

    #[test]
    fn test_label_backquoted_when_not_identifier() {
        let node = NodePattern::new("n", Some("weird label`x"));
        assert_eq!(node.to_string(), "(n:`weird label``x`)");
    }

    #[test]
    fn test_plain_label_not_quoted() {
        let node = NodePattern::new("n", Some("aws_ec2_instance"));
        assert_eq!(node.to_string(), "(n:aws_ec2_instance)");
    }

    #[test]
    fn test_relationship_pattern_rendering() {
        let pattern = Pattern::Relationship {
            from: NodePattern::new("n", None),
            rel: RelPattern {
                var: Some("r"),
                rel_type: Some("has_vulnerability".to_string()),
                hops: None,
            },
            to: NodePattern::new("m", Some("vulnerability")),
        };
        assert_eq!(
            pattern.to_string(),
            "(n)-[r:has_vulnerability]->(m:vulnerability)"
        );
    }

    #[test]
    fn test_path_pattern_rendering() {
        let pattern = Pattern::Path {
            path_var: "p",
            from: NodePattern::new("src", Some("a")),
            rel: RelPattern {
                var: None,
                rel_type: None,
                hops: Some((1, 10)),
            },
            to: NodePattern::new("dst", None),
        };
        assert_eq!(pattern.to_string(), "p = (src:a)-[*1..10]->(dst)");
    }

    #[test]
    fn test_nested_predicates_are_parenthesized() {
        let predicate = Predicate::And(vec![
            Predicate::Or(vec![
                Predicate::has_label("n", "vulnerability"),
                Predicate::has_label("n", "knownexploitedvulnerability"),
            ]),
            Predicate::equals("n", "severity", "high"),
        ]);
        assert_eq!(
            predicate.to_string(),
            "(n:vulnerability OR n:knownexploitedvulnerability) AND n.severity = 'high'"
        );
    }

    #[test]
    fn test_all_and_any_collapse_single_member() {
        let single = Predicate::all(vec![Predicate::has_label("n", "a")]).unwrap();
        assert_eq!(single.to_string(), "n:a");
        assert!(Predicate::any(vec![]).is_none());
    }

    #[test]
    fn test_count_return_rendering() {
        assert_eq!(
            ReturnClause::Count(Expr::Var("n")).to_string(),
            "RETURN count(n) AS count"
        );
    }

    #[test]
    fn test_single_branch_program_with_limit() {
        let program = QueryProgram {
            branches: vec![simple_branch("a")],
            union: UnionKind::Distinct,
            limit: Some(25),
        };
        assert_eq!(
            program.render(),
            "MATCH (n:a) RETURN n, null AS r, null AS m LIMIT 25"
        );
    }

    #[test]
    fn test_multi_branch_program_wrapped_in_subquery() {
        let program = QueryProgram {
            branches: vec![simple_branch("a"), simple_branch("b")],
            union: UnionKind::Distinct,
            limit: Some(10),
        };
        let rendered = program.render();
        assert!(rendered.starts_with("CALL { MATCH (n:a)"));
        assert!(rendered.contains(" UNION MATCH (n:b)"));
        assert!(rendered.ends_with("} RETURN n, r, m LIMIT 10"));
    }

    #[test]
    fn test_union_all_without_limit_is_not_wrapped() {
        let program = QueryProgram {
            branches: vec![simple_branch("a"), simple_branch("b")],
            union: UnionKind::All,
            limit: None,
        };
        let rendered = program.render();
        assert!(!rendered.contains("CALL"));
        assert!(rendered.contains(" UNION ALL "));
    }
}
