//! # MySQL Table Reader
//!
//! Runs `SELECT *` against the configured table and converts each row into
//! a JSON object, choosing the JSON type from the column's SQL type.

use crate::config::DatabaseConfig;
use async_trait::async_trait;
use chrono::{NaiveDate, NaiveDateTime, NaiveTime};
use serde_json::Value;
use shop_core::{Row, ShopError, ShopResult, TableReader};
use sqlx::mysql::{MySqlConnectOptions, MySqlPool, MySqlPoolOptions, MySqlRow};
use sqlx::{Column, Row as _, TypeInfo};
use std::time::Duration;
use tracing::{debug, instrument};

const MAX_IDENTIFIER_LEN: usize = 64;

/// Table names are interpolated into SQL, so only plain identifiers pass
pub fn validate_table_name(name: &str) -> ShopResult<&str> {
    let valid = !name.is_empty()
        && name.len() <= MAX_IDENTIFIER_LEN
        && name.chars().all(|c| c.is_ascii_alphanumeric() || c == '_');

    if valid {
        Ok(name)
    } else {
        Err(ShopError::Configuration(format!(
            "DB_TABLE must be a plain identifier, got {:?}",
            name
        )))
    }
}

/// Process-wide pool reading one table
#[derive(Debug, Clone)]
pub struct MySqlTableReader {
    pool: MySqlPool,
    select_sql: String,
}

impl MySqlTableReader {
    /// Create the reader. The pool connects lazily on the first query, so
    /// this must run inside a tokio runtime but never touches the network.
    pub fn new(config: &DatabaseConfig) -> ShopResult<Self> {
        let table = validate_table_name(&config.table)?;

        let options = MySqlConnectOptions::new()
            .host(&config.host)
            .port(config.port)
            .username(&config.user)
            .password(&config.password)
            .database(&config.database);

        let pool = MySqlPoolOptions::new()
            .max_connections(config.max_connections)
            .acquire_timeout(Duration::from_secs(3))
            .idle_timeout(Duration::from_secs(600))
            .connect_lazy_with(options);

        debug!(
            "Configured MySQL pool for {}:{}/{}",
            config.host, config.port, config.database
        );

        Ok(Self {
            pool,
            select_sql: format!("SELECT * FROM `{}`", table),
        })
    }

    /// Create from environment variables
    pub fn from_env() -> ShopResult<Self> {
        Self::new(&DatabaseConfig::from_env()?)
    }

    /// The query this reader runs
    pub fn select_sql(&self) -> &str {
        &self.select_sql
    }
}

#[async_trait]
impl TableReader for MySqlTableReader {
    #[instrument(skip(self), fields(sql = %self.select_sql))]
    async fn fetch_all(&self) -> ShopResult<Vec<Row>> {
        let rows = sqlx::query(&self.select_sql)
            .fetch_all(&self.pool)
            .await
            .map_err(|e| ShopError::Database(e.to_string()))?;

        debug!("Fetched {} rows", rows.len());

        rows.iter()
            .map(|row| row_to_json(row).map_err(|e| ShopError::Database(e.to_string())))
            .collect()
    }
}

fn row_to_json(row: &MySqlRow) -> Result<Row, sqlx::Error> {
    row.columns()
        .iter()
        .map(|column| {
            let value = column_to_json(row, column.ordinal(), column.type_info().name())?;
            Ok((column.name().to_string(), value))
        })
        .collect()
}

/// JSON shape chosen for a column from its MySQL type name
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ColumnKind {
    Bool,
    Signed,
    Unsigned,
    Float,
    Double,
    Date,
    DateTime,
    Time,
    Json,
    /// VARCHAR, TEXT, CHAR, DECIMAL, ENUM, SET and binary columns
    Text,
}

fn column_kind(type_name: &str) -> ColumnKind {
    match type_name {
        "BOOLEAN" => ColumnKind::Bool,
        "TINYINT" | "SMALLINT" | "MEDIUMINT" | "INT" | "BIGINT" | "YEAR" => ColumnKind::Signed,
        name if name.ends_with(" UNSIGNED") => ColumnKind::Unsigned,
        "FLOAT" => ColumnKind::Float,
        "DOUBLE" => ColumnKind::Double,
        "DATE" => ColumnKind::Date,
        "DATETIME" | "TIMESTAMP" => ColumnKind::DateTime,
        "TIME" => ColumnKind::Time,
        "JSON" => ColumnKind::Json,
        _ => ColumnKind::Text,
    }
}

fn text(bytes: Vec<u8>) -> Value {
    Value::String(String::from_utf8_lossy(&bytes).into_owned())
}

fn json_column(bytes: Vec<u8>) -> Value {
    serde_json::from_slice(&bytes).unwrap_or_else(|_| text(bytes))
}

fn float_value(f: f32) -> Value {
    Value::from(f as f64)
}

fn date_value(d: NaiveDate) -> Value {
    Value::String(d.format("%Y-%m-%d").to_string())
}

fn datetime_value(dt: NaiveDateTime) -> Value {
    Value::String(dt.format("%Y-%m-%dT%H:%M:%S").to_string())
}

fn time_value(t: NaiveTime) -> Value {
    Value::String(t.format("%H:%M:%S").to_string())
}

fn column_to_json(row: &MySqlRow, idx: usize, type_name: &str) -> Result<Value, sqlx::Error> {
    let value = match column_kind(type_name) {
        ColumnKind::Bool => row.try_get_unchecked::<Option<bool>, _>(idx)?.map(Value::from),
        ColumnKind::Signed => row.try_get_unchecked::<Option<i64>, _>(idx)?.map(Value::from),
        ColumnKind::Unsigned => row.try_get_unchecked::<Option<u64>, _>(idx)?.map(Value::from),
        ColumnKind::Float => row.try_get_unchecked::<Option<f32>, _>(idx)?.map(float_value),
        ColumnKind::Double => row.try_get_unchecked::<Option<f64>, _>(idx)?.map(Value::from),
        ColumnKind::Date => row
            .try_get_unchecked::<Option<NaiveDate>, _>(idx)?
            .map(date_value),
        ColumnKind::DateTime => row
            .try_get_unchecked::<Option<NaiveDateTime>, _>(idx)?
            .map(datetime_value),
        ColumnKind::Time => row
            .try_get_unchecked::<Option<NaiveTime>, _>(idx)?
            .map(time_value),
        ColumnKind::Json => row
            .try_get_unchecked::<Option<Vec<u8>>, _>(idx)?
            .map(json_column),
        ColumnKind::Text => row.try_get_unchecked::<Option<Vec<u8>>, _>(idx)?.map(text),
    };

    Ok(value.unwrap_or(Value::Null))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_column_kind_for_mysql_types() {
        assert_eq!(column_kind("BOOLEAN"), ColumnKind::Bool);
        for name in ["TINYINT", "SMALLINT", "MEDIUMINT", "INT", "BIGINT", "YEAR"] {
            assert_eq!(column_kind(name), ColumnKind::Signed, "{}", name);
        }
        assert_eq!(column_kind("INT UNSIGNED"), ColumnKind::Unsigned);
        assert_eq!(column_kind("BIGINT UNSIGNED"), ColumnKind::Unsigned);
        assert_eq!(column_kind("FLOAT"), ColumnKind::Float);
        assert_eq!(column_kind("DOUBLE"), ColumnKind::Double);
        assert_eq!(column_kind("DATE"), ColumnKind::Date);
        assert_eq!(column_kind("DATETIME"), ColumnKind::DateTime);
        assert_eq!(column_kind("TIMESTAMP"), ColumnKind::DateTime);
        assert_eq!(column_kind("TIME"), ColumnKind::Time);
        assert_eq!(column_kind("JSON"), ColumnKind::Json);
        for name in ["VARCHAR", "TEXT", "CHAR", "DECIMAL", "ENUM", "SET", "BLOB", "GEOMETRY"] {
            assert_eq!(column_kind(name), ColumnKind::Text, "{}", name);
        }
    }

    #[test]
    fn test_text_and_decimal_stay_strings() {
        assert_eq!(text(b"12.50".to_vec()), json!("12.50"));
        assert_eq!(text("バラ".as_bytes().to_vec()), json!("バラ"));
        assert_eq!(text(vec![0x66, 0xff, 0x6f]), json!("f\u{fffd}o"));
    }

    #[test]
    fn test_json_column_parses_or_falls_back() {
        assert_eq!(
            json_column(br#"{"color":"red","stems":[1,2]}"#.to_vec()),
            json!({"color": "red", "stems": [1, 2]})
        );
        assert_eq!(json_column(b"not json".to_vec()), json!("not json"));
    }

    #[test]
    fn test_temporal_values_are_iso_strings() {
        let date = NaiveDate::from_ymd_opt(2024, 1, 5).unwrap();
        assert_eq!(date_value(date), json!("2024-01-05"));

        let dt = date.and_hms_opt(9, 30, 0).unwrap();
        assert_eq!(datetime_value(dt), json!("2024-01-05T09:30:00"));

        let t = NaiveTime::from_hms_opt(18, 5, 7).unwrap();
        assert_eq!(time_value(t), json!("18:05:07"));
    }

    #[test]
    fn test_float_values() {
        assert_eq!(float_value(1.5), json!(1.5));
        assert_eq!(float_value(f32::NAN), Value::Null);
    }

    #[test]
    fn test_validate_table_name() {
        assert!(validate_table_name("yoshinaga").is_ok());
        assert!(validate_table_name("flower_stock_2024").is_ok());

        assert!(validate_table_name("").is_err());
        assert!(validate_table_name("users; DROP TABLE users").is_err());
        assert!(validate_table_name("a`b").is_err());
        assert!(validate_table_name(&"x".repeat(65)).is_err());
    }

    #[tokio::test]
    async fn test_reader_builds_lazily() {
        let reader = MySqlTableReader::new(&DatabaseConfig {
            table: "flowers".into(),
            ..Default::default()
        })
        .unwrap();

        assert_eq!(reader.select_sql(), "SELECT * FROM `flowers`");
    }

    #[tokio::test]
    async fn test_reader_rejects_bad_table() {
        let result = MySqlTableReader::new(&DatabaseConfig {
            table: "flowers--".into(),
            ..Default::default()
        });
        assert!(matches!(result, Err(ShopError::Configuration(_))));
    }
}
