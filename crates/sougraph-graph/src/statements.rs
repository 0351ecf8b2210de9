//! Fixed Cypher statement catalog for the code graph.
//!
//! Composite indexes use prefix matching so the same index serves several
//! lookup shapes, keeping the total index count low.

pub struct IndexStatement {
    pub name: &'static str,
    pub cypher: &'static str,
}

pub const INDEX_STATEMENTS: &[IndexStatement] = &[
    IndexStatement {
        name: "idx_symbol_calls_lookup",
        cypher: "CREATE INDEX idx_symbol_calls_lookup IF NOT EXISTS \
                 FOR (s:Symbol) ON (s.repository_url, s.type, s.fq_name)",
    },
    IndexStatement {
        name: "idx_symbol_type_lookup",
        cypher: "CREATE INDEX idx_symbol_type_lookup IF NOT EXISTS \
                 FOR (s:Symbol) ON (s.repository_url, s.type, s.fq_name, s.file_path)",
    },
    IndexStatement {
        name: "idx_symbol_file_path",
        cypher: "CREATE INDEX idx_symbol_file_path IF NOT EXISTS \
                 FOR (s:Symbol) ON (s.repository_url, s.file_path)",
    },
    IndexStatement {
        name: "idx_symbol_namespace",
        cypher: "CREATE INDEX idx_symbol_namespace IF NOT EXISTS \
                 FOR (s:Symbol) ON (s.namespace)",
    },
    IndexStatement {
        name: "idx_namespace_repo_name",
        cypher: "CREATE INDEX idx_namespace_repo_name IF NOT EXISTS \
                 FOR (n:Namespace) ON (n.repository_url, n.name)",
    },
    IndexStatement {
        name: "idx_file_repo_path",
        cypher: "CREATE INDEX idx_file_repo_path IF NOT EXISTS \
                 FOR (f:File) ON (f.repository_url, f.path)",
    },
    IndexStatement {
        name: "idx_repository_url",
        cypher: "CREATE INDEX idx_repository_url IF NOT EXISTS \
                 FOR (r:Repository) ON (r.url)",
    },
];

pub struct RelationshipQuery {
    pub name: &'static str,
    pub rel_type: &'static str,
    pub cypher: &'static str,
}

/// The five relationship-building queries, batched so each commits in
/// 1000-row chunks. All are `MERGE`-based and parameterized by
/// `$repository_url`.
pub const RELATIONSHIP_QUERIES: &[RelationshipQuery] = &[
    RelationshipQuery {
        name: "DEFINED_IN_NAMESPACE",
        rel_type: "DEFINED_IN_NAMESPACE",
        cypher: "CALL {
            MATCH (m:Symbol {repository_url: $repository_url})
            MATCH (t:Namespace {repository_url: $repository_url})
            WHERE m.namespace = t.name
              AND m.type IN ['TYPE', 'METHOD']
            MERGE (m)-[:DEFINED_IN_NAMESPACE]->(t)
        } IN TRANSACTIONS OF 1000 ROWS",
    },
    RelationshipQuery {
        name: "DEFINED_IN_TYPE",
        rel_type: "DEFINED_IN_TYPE",
        cypher: "CALL {
            MATCH (m:Symbol {repository_url: $repository_url, type: 'METHOD'})
            WHERE m.defined_in_type IS NOT NULL
            WITH apoc.convert.fromJsonList(m.defined_in_type) AS type_names, m
            UNWIND type_names AS type_name
            MATCH (t:Symbol {repository_url: $repository_url, type: 'TYPE',
                             fq_name: type_name, file_path: m.file_path})
            MERGE (m)-[:DEFINED_IN_TYPE]->(t)
        } IN TRANSACTIONS OF 1000 ROWS",
    },
    RelationshipQuery {
        name: "CALLS",
        rel_type: "CALLS",
        cypher: "CALL {
            MATCH (s:Symbol {repository_url: $repository_url, type: 'METHOD'})
            WITH apoc.convert.fromJsonList(s.method_calls) AS method_calls, s
            UNWIND method_calls AS method_call
            MATCH (d:Symbol {repository_url: $repository_url, type: 'METHOD',
                             fq_name: method_call})
            MERGE (s)-[:CALLS]->(d)
        } IN TRANSACTIONS OF 1000 ROWS",
    },
    RelationshipQuery {
        name: "DEFINES_SYMBOL",
        rel_type: "DEFINES_SYMBOL",
        cypher: "CALL {
            MATCH (file:File {repository_url: $repository_url})
            MATCH (symbol:Symbol {repository_url: $repository_url})
            WHERE symbol.file_path = file.path
            MERGE (file)-[:DEFINES_SYMBOL]->(symbol)
        } IN TRANSACTIONS OF 1000 ROWS",
    },
    RelationshipQuery {
        name: "INCLUDES_FILE",
        rel_type: "INCLUDES_FILE",
        cypher: "CALL {
            MATCH (repo:Repository {url: $repository_url})
            MATCH (file:File {repository_url: $repository_url})
            MERGE (repo)-[:INCLUDES_FILE]->(file)
        } IN TRANSACTIONS OF 1000 ROWS",
    },
];

#[cfg(test)]
mod tests {
    use std::collections::HashSet;

    use super::*;

    #[test]
    fn index_statements_are_idempotent_and_uniquely_named() {
        let mut names = HashSet::new();
        for statement in INDEX_STATEMENTS {
            assert!(
                statement.cypher.contains("IF NOT EXISTS"),
                "{} must be idempotent",
                statement.name
            );
            assert!(
                statement.cypher.contains(statement.name),
                "{} must create the index it is named after",
                statement.name
            );
            assert!(names.insert(statement.name), "duplicate {}", statement.name);
        }
        assert_eq!(INDEX_STATEMENTS.len(), 7);
    }

    #[test]
    fn relationship_queries_are_batched_and_parameterized() {
        for query in RELATIONSHIP_QUERIES {
            assert!(
                query.cypher.contains("IN TRANSACTIONS OF 1000 ROWS"),
                "{} must batch its transactions",
                query.name
            );
            assert!(
                query.cypher.contains("$repository_url"),
                "{} must scope to a repository",
                query.name
            );
            assert!(
                query.cypher.contains(&format!("[:{}]", query.rel_type)),
                "{} must merge its relationship type",
                query.name
            );
        }
        assert_eq!(RELATIONSHIP_QUERIES.len(), 5);
    }
}
