//! SeaORM repository implementation
//!
//! Table and column names come from configuration, so statements are built
//! with sea-query identifiers instead of a static entity.

use super::mapper::raw_setting_from_row;
use crate::config::StoreConfig;
use crate::contract::RawSetting;
use crate::domain::repository::SettingsRepository;
use anyhow::Result;
use async_trait::async_trait;
use sea_orm::sea_query::{Alias, ColumnDef, Expr, Query, SimpleExpr, Table};
use sea_orm::{ConnectionTrait, DatabaseConnection};
use std::sync::Arc;

pub struct SeaOrmSettingsRepository {
    db: Arc<DatabaseConnection>,
    table: String,
    key_field: String,
    value_field: String,
}

impl SeaOrmSettingsRepository {
    pub fn new(db: Arc<DatabaseConnection>, config: &StoreConfig) -> Self {
        Self {
            db,
            table: config.table.clone(),
            key_field: config.key_field.clone(),
            value_field: config.value_field.clone(),
        }
    }

    /// Create the settings table with the configured names if it does not exist
    pub async fn create_table_if_missing(&self) -> Result<()> {
        let stmt = Table::create()
            .table(Alias::new(self.table.as_str()))
            .if_not_exists()
            .col(
                ColumnDef::new(Alias::new(self.key_field.as_str()))
                    .string()
                    .not_null()
                    .primary_key(),
            )
            .col(ColumnDef::new(Alias::new(self.value_field.as_str())).text().null())
            .to_owned();

        let backend = self.db.get_database_backend();
        self.db.execute(backend.build(&stmt)).await?;

        tracing::debug!(table = %self.table, "Settings table ensured");
        Ok(())
    }
}

#[async_trait]
impl SettingsRepository for SeaOrmSettingsRepository {
    async fn read_all(&self) -> Result<Vec<RawSetting>> {
        let stmt = Query::select()
            .column(Alias::new(self.key_field.as_str()))
            .column(Alias::new(self.value_field.as_str()))
            .from(Alias::new(self.table.as_str()))
            .to_owned();

        let backend = self.db.get_database_backend();
        let rows = self.db.query_all(backend.build(&stmt)).await?;

        rows.iter()
            .map(|row| {
                raw_setting_from_row(row, &self.key_field, &self.value_field).map_err(Into::into)
            })
            .collect()
    }

    async fn insert(&self, key: &str, value: &str) -> Result<()> {
        let values: [SimpleExpr; 2] = [key.into(), value.into()];
        let stmt = Query::insert()
            .into_table(Alias::new(self.table.as_str()))
            .columns([
                Alias::new(self.key_field.as_str()),
                Alias::new(self.value_field.as_str()),
            ])
            .values(values)?
            .to_owned();

        let backend = self.db.get_database_backend();
        self.db.execute(backend.build(&stmt)).await?;
        Ok(())
    }

    async fn update(&self, key: &str, value: &str) -> Result<u64> {
        let stmt = Query::update()
            .table(Alias::new(self.table.as_str()))
            .value(Alias::new(self.value_field.as_str()), value)
            .and_where(Expr::col(Alias::new(self.key_field.as_str())).eq(key))
            .to_owned();

        let backend = self.db.get_database_backend();
        let result = self.db.execute(backend.build(&stmt)).await?;
        Ok(result.rows_affected())
    }
}
