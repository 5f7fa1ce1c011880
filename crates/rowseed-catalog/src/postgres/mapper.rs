use rowseed_core::{
    AssociationSpec, BelongsToSpec, ColumnKind, ColumnSpec, TableRef, UniqueIndexSpec, Value,
    classify_sql_type,
};

use super::queries::{RawColumn, RawForeignKey, RawUniqueIndex};

pub fn map_columns(raw: Vec<RawColumn>) -> Vec<ColumnSpec> {
    raw.into_iter()
        .map(|col| {
            let (kind, limit) =
                classify_sql_type(&col.data_type, col.character_max_length, col.enum_labels);
            ColumnSpec {
                name: col.name,
                kind,
                sql_type: col.data_type,
                limit,
                nullable: col.is_nullable,
                has_default: col.has_default || col.is_identity,
                generated: col.is_identity || col.is_generated,
            }
        })
        .collect()
}

/// Single-column foreign keys become belongs-to associations; composite keys are skipped.
pub fn map_foreign_keys(raw: Vec<RawForeignKey>) -> Vec<AssociationSpec> {
    raw.into_iter()
        .filter_map(|fk| match (fk.columns.as_slice(), fk.referenced_columns.as_slice()) {
            ([column], [referenced]) => {
                let target = TableRef::new(Some(&fk.referenced_schema), &fk.referenced_table);
                Some(AssociationSpec::BelongsTo(BelongsToSpec::new(
                    column, target, referenced,
                )))
            }
            _ => {
                tracing::debug!(constraint = %fk.name, "skipping composite foreign key");
                None
            }
        })
        .collect()
}

pub fn map_unique_indexes(raw: Vec<RawUniqueIndex>) -> Vec<UniqueIndexSpec> {
    raw.into_iter()
        .map(|index| UniqueIndexSpec {
            name: index.name,
            columns: index.columns,
        })
        .collect()
}

/// Convert fetched key text into typed values following the key column kind.
pub fn map_key_values(kind: &ColumnKind, raw: Vec<Option<String>>) -> Vec<Value> {
    raw.into_iter()
        .flatten()
        .map(|text| match kind {
            ColumnKind::Integer => text.parse().map(Value::Int).unwrap_or(Value::Text(text)),
            ColumnKind::Uuid => Value::Uuid(text),
            _ => Value::Text(text),
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn composite_foreign_keys_are_skipped() {
        let raw = vec![
            RawForeignKey {
                name: "orders_customer_id_fkey".to_string(),
                columns: vec!["customer_id".to_string()],
                referenced_schema: "app".to_string(),
                referenced_table: "customers".to_string(),
                referenced_columns: vec!["id".to_string()],
            },
            RawForeignKey {
                name: "orders_pair_fkey".to_string(),
                columns: vec!["a".to_string(), "b".to_string()],
                referenced_schema: "app".to_string(),
                referenced_table: "pairs".to_string(),
                referenced_columns: vec!["a".to_string(), "b".to_string()],
            },
        ];

        let mapped = map_foreign_keys(raw);
        assert_eq!(mapped.len(), 1);
        match &mapped[0] {
            AssociationSpec::BelongsTo(spec) => {
                assert_eq!(spec.name, "customer");
                assert_eq!(spec.target.qualified(), "app.customers");
            }
            other => panic!("unexpected association {other:?}"),
        }
    }

    #[test]
    fn integer_keys_are_parsed() {
        let values = map_key_values(
            &ColumnKind::Integer,
            vec![Some("7".to_string()), None, Some("9".to_string())],
        );
        assert_eq!(values, vec![Value::Int(7), Value::Int(9)]);
    }

    #[test]
    fn identity_columns_count_as_generated() {
        let columns = map_columns(vec![RawColumn {
            name: "id".to_string(),
            data_type: "bigint".to_string(),
            is_nullable: false,
            has_default: false,
            is_identity: true,
            is_generated: false,
            character_max_length: None,
            enum_labels: None,
        }]);
        assert!(columns[0].generated);
        assert!(columns[0].has_default);
        assert_eq!(columns[0].limit, Some(8));
    }
}
