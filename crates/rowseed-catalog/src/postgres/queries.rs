use sqlx::PgPool;

use rowseed_core::{Error, Result};

fn db_error(err: sqlx::Error) -> Error {
    Error::Db(err.to_string())
}

#[derive(Debug, sqlx::FromRow)]
pub struct RawColumn {
    pub name: String,
    pub data_type: String,
    pub is_nullable: bool,
    pub has_default: bool,
    pub is_identity: bool,
    pub is_generated: bool,
    pub character_max_length: Option<i32>,
    pub enum_labels: Option<Vec<String>>,
}

pub async fn list_columns(pool: &PgPool, schema: &str, table: &str) -> Result<Vec<RawColumn>> {
    sqlx::query_as::<_, RawColumn>(
        r#"
        select
          a.attname::text as name,
          pg_catalog.format_type(a.atttypid, a.atttypmod) as data_type,
          (not a.attnotnull) as is_nullable,
          (ad.adbin is not null and a.attgenerated = '') as has_default,
          (a.attidentity <> '') as is_identity,
          (a.attgenerated <> '') as is_generated,
          ic.character_maximum_length::int4 as character_max_length,
          case
            when t.typtype = 'e' then array(
              select e.enumlabel::text
              from pg_enum e
              where e.enumtypid = t.oid
              order by e.enumsortorder
            )
            else null
          end as enum_labels
        from pg_attribute a
        join pg_class c on c.oid = a.attrelid
        join pg_namespace n on n.oid = c.relnamespace
        join pg_type t on t.oid = a.atttypid
        left join pg_attrdef ad on ad.adrelid = a.attrelid and ad.adnum = a.attnum
        left join information_schema.columns ic
          on ic.table_schema = n.nspname and ic.table_name = c.relname and ic.column_name = a.attname
        where n.nspname = $1
          and c.relname = $2
          and a.attnum > 0
          and not a.attisdropped
        order by a.attnum
        "#,
    )
    .bind(schema)
    .bind(table)
    .fetch_all(pool)
    .await
    .map_err(db_error)
}

pub async fn get_primary_key(pool: &PgPool, schema: &str, table: &str) -> Result<Vec<String>> {
    let columns = sqlx::query_scalar::<_, Vec<String>>(
        r#"
        select array_agg(att.attname::text order by ord.ordinality)
        from pg_constraint con
        join pg_class rel on rel.oid = con.conrelid
        join pg_namespace nsp on nsp.oid = rel.relnamespace
        join unnest(con.conkey) with ordinality as ord(attnum, ordinality) on true
        join pg_attribute att on att.attrelid = rel.oid and att.attnum = ord.attnum
        where nsp.nspname = $1
          and rel.relname = $2
          and con.contype = 'p'
        group by con.conname
        "#,
    )
    .bind(schema)
    .bind(table)
    .fetch_optional(pool)
    .await
    .map_err(db_error)?;

    Ok(columns.unwrap_or_default())
}

#[derive(Debug, sqlx::FromRow)]
pub struct RawForeignKey {
    pub name: String,
    pub columns: Vec<String>,
    pub referenced_schema: String,
    pub referenced_table: String,
    pub referenced_columns: Vec<String>,
}

pub async fn list_foreign_keys(
    pool: &PgPool,
    schema: &str,
    table: &str,
) -> Result<Vec<RawForeignKey>> {
    sqlx::query_as::<_, RawForeignKey>(
        r#"
        select
          con.conname::text as name,
          array_agg(src_att.attname::text order by k.ordinality) as columns,
          ref_nsp.nspname::text as referenced_schema,
          ref_rel.relname::text as referenced_table,
          array_agg(ref_att.attname::text order by k.ordinality) as referenced_columns
        from pg_constraint con
        join pg_class src_rel on src_rel.oid = con.conrelid
        join pg_namespace src_nsp on src_nsp.oid = src_rel.relnamespace
        join pg_class ref_rel on ref_rel.oid = con.confrelid
        join pg_namespace ref_nsp on ref_nsp.oid = ref_rel.relnamespace
        join unnest(con.conkey, con.confkey) with ordinality as k(attnum, ref_attnum, ordinality) on true
        join pg_attribute src_att on src_att.attrelid = src_rel.oid and src_att.attnum = k.attnum
        join pg_attribute ref_att on ref_att.attrelid = ref_rel.oid and ref_att.attnum = k.ref_attnum
        where src_nsp.nspname = $1
          and src_rel.relname = $2
          and con.contype = 'f'
        group by con.conname, ref_nsp.nspname, ref_rel.relname
        order by con.conname
        "#,
    )
    .bind(schema)
    .bind(table)
    .fetch_all(pool)
    .await
    .map_err(db_error)
}

#[derive(Debug, sqlx::FromRow)]
pub struct RawUniqueIndex {
    pub name: String,
    pub columns: Vec<String>,
}

/// Valid unique indexes other than the primary key; expression indexes are skipped.
pub async fn list_unique_indexes(
    pool: &PgPool,
    schema: &str,
    table: &str,
) -> Result<Vec<RawUniqueIndex>> {
    sqlx::query_as::<_, RawUniqueIndex>(
        r#"
        select
          idx.relname::text as name,
          array_agg(att.attname::text order by ord.ordinality) as columns
        from pg_index i
        join pg_class tbl on tbl.oid = i.indrelid
        join pg_namespace nsp on nsp.oid = tbl.relnamespace
        join pg_class idx on idx.oid = i.indexrelid
        join unnest(i.indkey::int2[]) with ordinality as ord(attnum, ordinality) on true
        join pg_attribute att on att.attrelid = tbl.oid and att.attnum = ord.attnum
        where nsp.nspname = $1
          and tbl.relname = $2
          and i.indisunique
          and not i.indisprimary
          and i.indisvalid
          and i.indexprs is null
        group by idx.relname
        order by idx.relname
        "#,
    )
    .bind(schema)
    .bind(table)
    .fetch_all(pool)
    .await
    .map_err(db_error)
}

/// Fetch non-null values of one column, optionally restricted by a SQL condition.
///
/// `table` and `column` must already be quoted identifiers.
pub async fn list_key_values(
    pool: &PgPool,
    table: &str,
    column: &str,
    filter: Option<&str>,
) -> Result<Vec<Option<String>>> {
    let condition = match filter {
        Some(filter) => format!("{column} is not null and ({filter})"),
        None => format!("{column} is not null"),
    };
    let sql = format!("select {column}::text from {table} where {condition} order by {column}");

    sqlx::query_scalar::<_, Option<String>>(&sql)
        .fetch_all(pool)
        .await
        .map_err(db_error)
}
