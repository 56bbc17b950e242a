//! # Tenant Settings Repository
//!
//! One settings row per tenant. Reading before anything was saved returns
//! the defaults without writing them.

use chrono::Utc;
use sea_orm::{
    ActiveValue::NotSet, ConnectionTrait, DatabaseConnection, EntityTrait, IntoActiveModel, Set,
    TransactionTrait,
};
use uuid::Uuid;

use crate::error::RepositoryError;
use crate::models::tenant_settings::{
    ActiveModel as SettingsActiveModel, Entity as TenantSettings, SettingsValues,
};
use crate::tenancy::ScopedConn;

const MAX_THEME_CLASS_LEN: usize = 64;

pub struct TenantSettingsRepository<'a, C = DatabaseConnection> {
    conn: &'a ScopedConn<C>,
}

impl<'a, C> TenantSettingsRepository<'a, C>
where
    C: ConnectionTrait + TransactionTrait,
{
    pub fn new(conn: &'a ScopedConn<C>) -> Self {
        Self { conn }
    }

    pub async fn get_settings(&self) -> Result<SettingsValues, RepositoryError> {
        let settings = self.conn.find_one(TenantSettings::find()).await?;
        Ok(settings
            .as_ref()
            .map(SettingsValues::from)
            .unwrap_or_default())
    }

    pub async fn upsert_settings(
        &self,
        values: SettingsValues,
    ) -> Result<SettingsValues, RepositoryError> {
        validate(&values)?;
        let now = Utc::now();

        let saved = match self.conn.find_one(TenantSettings::find()).await? {
            Some(existing) => {
                let mut settings = existing.into_active_model();
                settings.show_offense_defense_widgets = Set(values.show_offense_defense_widgets);
                settings.show_discipline_widget = Set(values.show_discipline_widget);
                settings.enable_auto_suspensions = Set(values.enable_auto_suspensions);
                settings.min_matches_for_playoffs = Set(values.min_matches_for_playoffs);
                settings.theme_class = Set(values.theme_class);
                settings.updated_at = Set(now.into());
                self.conn.update::<TenantSettings>(settings).await?
            }
            None => {
                let settings = SettingsActiveModel {
                    id: Set(Uuid::new_v4()),
                    tenant_id: NotSet,
                    show_offense_defense_widgets: Set(values.show_offense_defense_widgets),
                    show_discipline_widget: Set(values.show_discipline_widget),
                    enable_auto_suspensions: Set(values.enable_auto_suspensions),
                    min_matches_for_playoffs: Set(values.min_matches_for_playoffs),
                    theme_class: Set(values.theme_class),
                    updated_at: Set(now.into()),
                };
                self.conn.insert::<TenantSettings>(settings).await?
            }
        };

        Ok(SettingsValues::from(&saved))
    }
}

fn validate(values: &SettingsValues) -> Result<(), RepositoryError> {
    if values.min_matches_for_playoffs < 0 {
        return Err(RepositoryError::invalid_field(
            "min_matches_for_playoffs",
            "Minimum matches cannot be negative",
        ));
    }

    let theme = values.theme_class.as_str();
    if theme.is_empty()
        || theme.len() > MAX_THEME_CLASS_LEN
        || !theme
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_')
    {
        return Err(RepositoryError::invalid_field(
            "theme_class",
            "Theme class must be a CSS class name",
        ));
    }
    Ok(())
}
