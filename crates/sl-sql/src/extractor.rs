//! Relation extraction from SQL AST

use sqlparser::ast::{ObjectNamePart, Query, Statement, TableFactor, Visit, Visitor};
use std::collections::BTreeSet;
use std::ops::ControlFlow;

/// Walks statements collecting plain table references and CTE names.
///
/// Only `FROM`/`JOIN` table factors without arguments count as references,
/// so table functions such as `range(10)` and the target of a
/// `CREATE ... AS` are not reported.
#[derive(Default)]
struct RelationCollector {
    tables: BTreeSet<String>,
    ctes: BTreeSet<String>,
}

impl Visitor for RelationCollector {
    type Break = ();

    fn pre_visit_query(&mut self, query: &Query) -> ControlFlow<Self::Break> {
        if let Some(with) = &query.with {
            for cte in &with.cte_tables {
                self.ctes.insert(cte.alias.name.value.clone());
            }
        }
        ControlFlow::Continue(())
    }

    fn pre_visit_table_factor(&mut self, factor: &TableFactor) -> ControlFlow<Self::Break> {
        if let TableFactor::Table {
            name, args: None, ..
        } = factor
        {
            if let Some(ObjectNamePart::Identifier(ident)) = name.0.last() {
                self.tables.insert(ident.value.clone());
            }
        }
        ControlFlow::Continue(())
    }
}

fn collect(statements: &[Statement]) -> RelationCollector {
    let mut collector = RelationCollector::default();
    for stmt in statements {
        let _ = stmt.visit(&mut collector);
    }
    collector
}

/// Tables the statements read from, by unqualified name, excluding CTEs.
///
/// `raw.main."orders"` is reported as `orders`.
pub fn referenced_tables(statements: &[Statement]) -> BTreeSet<String> {
    let collector = collect(statements);
    collector
        .tables
        .into_iter()
        .filter(|t| !collector.ctes.contains(t))
        .collect()
}

/// Names bound by `WITH` clauses anywhere in the statements
pub fn defined_ctes(statements: &[Statement]) -> BTreeSet<String> {
    collect(statements).ctes
}

#[cfg(test)]
#[path = "extractor_test.rs"]
mod tests;
