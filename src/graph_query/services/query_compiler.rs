use crate::graph_query::domain::filter_criteria::{KEV_LABEL, VULNERABILITY_LABEL};
use crate::graph_query::domain::query_ast::{
    Expr, MatchClause, NodePattern, Pattern, Predicate, QueryBranch, QueryProgram, RelPattern,
    ReturnClause, UnionKind, UnwindRelationships,
};
use crate::graph_query::domain::{AttributeFilters, FilterCriterion, QueryMode, TypeSelector};
use crate::graph_query::policies::PublicExposure;

/// Hop bound of full-graph path matching
const MAX_PATH_HOPS: u32 = 10;

/// Compiler switches that are not part of the criteria themselves
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CompileOptions {
    /// Union in the internet-exposure branch (data programs only)
    pub show_internet: bool,
}

/// The two vulnerability-bearing node kinds and their attribute names
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum VulnKind {
    Vulnerability,
    KnownExploited,
}

impl VulnKind {
    const ALL: [VulnKind; 2] = [VulnKind::Vulnerability, VulnKind::KnownExploited];

    fn from_label(label: &str) -> Option<Self> {
        if label.eq_ignore_ascii_case(VULNERABILITY_LABEL) {
            Some(VulnKind::Vulnerability)
        } else if label.eq_ignore_ascii_case(KEV_LABEL) {
            Some(VulnKind::KnownExploited)
        } else {
            None
        }
    }

    fn label(self) -> &'static str {
        match self {
            VulnKind::Vulnerability => VULNERABILITY_LABEL,
            VulnKind::KnownExploited => KEV_LABEL,
        }
    }

    fn attribute(self, field: AttributeField) -> &'static str {
        match (self, field) {
            (_, AttributeField::Severity) => "severity",
            (VulnKind::Vulnerability, AttributeField::PackageName) => "pkgname",
            (VulnKind::Vulnerability, AttributeField::CveId) => "vulnerabilityid",
            (VulnKind::KnownExploited, AttributeField::PackageName) => "product",
            (VulnKind::KnownExploited, AttributeField::CveId) => "cve_id",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum AttributeField {
    Severity,
    PackageName,
    CveId,
}

/// What a matched side can carry
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Bearing {
    Concrete(VulnKind),
    /// `any_resource`: the label must be checked at query time
    Ambiguous,
}

fn bearing(selector: &TypeSelector) -> Option<Bearing> {
    match selector {
        TypeSelector::Any => Some(Bearing::Ambiguous),
        TypeSelector::Label(label) => VulnKind::from_label(label).map(Bearing::Concrete),
    }
}

/// Pure compiler from filter criteria to a Cypher program
pub struct QueryCompiler;

impl QueryCompiler {
    /// Compiles without the internet-exposure branch
    pub fn compile(criteria: &[FilterCriterion], limit: usize, count_only: bool) -> String {
        Self::compile_with_options(criteria, limit, count_only, CompileOptions::default())
    }

    pub fn compile_with_options(
        criteria: &[FilterCriterion],
        limit: usize,
        count_only: bool,
        options: CompileOptions,
    ) -> String {
        Self::build_program(criteria, limit, count_only, options).render()
    }

    /// Builds the program AST.
    ///
    /// An empty list or a first criterion without a source type yields the
    /// default broad query. Later criteria without a source type are skipped.
    pub fn build_program(
        criteria: &[FilterCriterion],
        limit: usize,
        count_only: bool,
        options: CompileOptions,
    ) -> QueryProgram {
        let mut branches = match criteria.first() {
            Some(first) if !first.is_blank() => criteria
                .iter()
                .filter(|c| !c.is_blank())
                .flat_map(|c| Self::criterion_branches(c, count_only))
                .collect(),
            _ => vec![Self::default_branch(count_only)],
        };

        if options.show_internet && !count_only {
            branches.push(Self::internet_branch());
        }

        QueryProgram {
            branches,
            union: if count_only {
                UnionKind::All
            } else {
                UnionKind::Distinct
            },
            limit: if count_only { None } else { Some(limit) },
        }
    }

    fn default_branch(count_only: bool) -> QueryBranch {
        let all_nodes = MatchClause::required(Pattern::Node(NodePattern::new("n", None)));
        if count_only {
            return QueryBranch {
                matches: vec![all_nodes],
                where_clause: None,
                unwind: None,
                returns: ReturnClause::Count(Expr::Var("n")),
            };
        }

        QueryBranch {
            matches: vec![
                all_nodes,
                MatchClause::optional(Pattern::Relationship {
                    from: NodePattern::new("n", None),
                    rel: RelPattern {
                        var: Some("r"),
                        rel_type: None,
                        hops: None,
                    },
                    to: NodePattern::new("m", None),
                }),
            ],
            where_clause: None,
            unwind: None,
            returns: ReturnClause::triple(),
        }
    }

    fn criterion_branches(criterion: &FilterCriterion, count_only: bool) -> Vec<QueryBranch> {
        let source = criterion.source_type.clone().unwrap_or(TypeSelector::Any);
        let target = criterion.target_or_any();

        match criterion.mode {
            QueryMode::SingleNodeType => {
                vec![Self::single_node_branch(&source, &criterion.filters, count_only)]
            }
            QueryMode::FullGraph => {
                vec![Self::full_graph_branch(&source, &target, &criterion.filters, count_only)]
            }
            QueryMode::Relationship | QueryMode::Bidirectional => {
                let relationship = criterion.relationship_or_any();
                let rel_type = relationship.rel_type();
                let mut branches = vec![Self::relationship_branch(
                    &source,
                    rel_type,
                    &target,
                    "r",
                    &criterion.filters,
                    count_only,
                )];

                // Count programs never include the reverse branch
                if criterion.mode == QueryMode::Bidirectional && rel_type.is_some() && !count_only
                {
                    branches.push(Self::relationship_branch(
                        &target,
                        rel_type,
                        &source,
                        "r2",
                        &criterion.filters,
                        count_only,
                    ));
                }
                branches
            }
        }
    }

    fn single_node_branch(
        source: &TypeSelector,
        filters: &AttributeFilters,
        count_only: bool,
    ) -> QueryBranch {
        QueryBranch {
            matches: vec![MatchClause::required(Pattern::Node(NodePattern::new(
                "n",
                source.label(),
            )))],
            where_clause: Self::attribute_predicates(filters, &[("n", source)]),
            unwind: None,
            returns: if count_only {
                ReturnClause::Count(Expr::Var("n"))
            } else {
                ReturnClause::node_only()
            },
        }
    }

    fn relationship_branch(
        from: &TypeSelector,
        rel_type: Option<&str>,
        to: &TypeSelector,
        rel_var: &'static str,
        filters: &AttributeFilters,
        count_only: bool,
    ) -> QueryBranch {
        let returns = if count_only {
            ReturnClause::Count(Expr::Var(rel_var))
        } else {
            ReturnClause::Triple {
                n: Expr::Var("n"),
                r: Expr::Var(rel_var),
                m: Expr::Var("m"),
            }
        };

        QueryBranch {
            matches: vec![
                MatchClause::required(Pattern::Node(NodePattern::new("n", from.label()))),
                MatchClause::required(Pattern::Relationship {
                    from: NodePattern::new("n", None),
                    rel: RelPattern {
                        var: Some(rel_var),
                        rel_type: rel_type.map(str::to_string),
                        hops: None,
                    },
                    to: NodePattern::new("m", to.label()),
                }),
            ],
            where_clause: Self::attribute_predicates(filters, &[("n", from), ("m", to)]),
            unwind: None,
            returns,
        }
    }

    fn full_graph_branch(
        source: &TypeSelector,
        target: &TypeSelector,
        filters: &AttributeFilters,
        count_only: bool,
    ) -> QueryBranch {
        let returns = if count_only {
            ReturnClause::Count(Expr::Var("r"))
        } else {
            ReturnClause::Triple {
                n: Expr::StartNode("r"),
                r: Expr::Var("r"),
                m: Expr::EndNode("r"),
            }
        };

        QueryBranch {
            matches: vec![MatchClause::required(Pattern::Path {
                path_var: "p",
                from: NodePattern::new("src", source.label()),
                rel: RelPattern {
                    var: None,
                    rel_type: None,
                    hops: Some((1, MAX_PATH_HOPS)),
                },
                to: NodePattern::new("dst", target.label()),
            })],
            where_clause: Self::attribute_predicates(filters, &[("src", source), ("dst", target)]),
            unwind: Some(UnwindRelationships {
                path_var: "p",
                var: "r",
            }),
            returns,
        }
    }

    fn internet_branch() -> QueryBranch {
        QueryBranch {
            matches: vec![MatchClause::required(Pattern::Node(NodePattern::new(
                "n", None,
            )))],
            where_clause: Some(PublicExposure::any_predicate("n")),
            unwind: None,
            returns: ReturnClause::node_only(),
        }
    }

    /// Conjunction over the set filters, each a disjunction over the sides
    /// that can carry it. Concrete vulnerability sides take precedence over
    /// `any_resource` sides.
    fn attribute_predicates(
        filters: &AttributeFilters,
        sides: &[(&'static str, &TypeSelector)],
    ) -> Option<Predicate> {
        if filters.is_empty() {
            return None;
        }

        let bearing_sides: Vec<(&'static str, Bearing)> = sides
            .iter()
            .filter_map(|(var, selector)| bearing(selector).map(|b| (*var, b)))
            .collect();
        let has_concrete = bearing_sides
            .iter()
            .any(|(_, b)| matches!(b, Bearing::Concrete(_)));
        let scoped: Vec<(&'static str, Bearing)> = bearing_sides
            .into_iter()
            .filter(|(_, b)| !has_concrete || matches!(b, Bearing::Concrete(_)))
            .collect();

        let requested = [
            (AttributeField::Severity, filters.severity.as_deref()),
            (AttributeField::PackageName, filters.package_name.as_deref()),
            (AttributeField::CveId, filters.cve_id.as_deref()),
        ];

        let conjuncts = requested
            .iter()
            .filter_map(|&(field, value)| value.map(|v| (field, v)))
            .filter_map(|(field, value)| {
                let per_side = scoped
                    .iter()
                    .map(|&(var, bearing)| Self::side_predicate(var, bearing, field, value))
                    .collect();
                Predicate::any(per_side)
            })
            .collect();

        Predicate::all(conjuncts)
    }

    fn side_predicate(
        var: &'static str,
        bearing: Bearing,
        field: AttributeField,
        value: &str,
    ) -> Predicate {
        match bearing {
            Bearing::Concrete(kind) => Predicate::equals(var, kind.attribute(field), value),
            Bearing::Ambiguous => {
                let first = VulnKind::ALL[0].attribute(field);
                let shared = VulnKind::ALL.iter().all(|k| k.attribute(field) == first);
                if shared {
                    // (v:vulnerability OR v:knownexploitedvulnerability) AND v.attr = value
                    Predicate::And(vec![
                        Predicate::Or(
                            VulnKind::ALL
                                .iter()
                                .map(|k| Predicate::has_label(var, k.label()))
                                .collect(),
                        ),
                        Predicate::equals(var, first, value),
                    ])
                } else {
                    Predicate::Or(
                        VulnKind::ALL
                            .iter()
                            .map(|k| {
                                Predicate::And(vec![
                                    Predicate::has_label(var, k.label()),
                                    Predicate::equals(var, k.attribute(field), value),
                                ])
                            })
                            .collect(),
                    )
                }
            }
        }
    }
}
