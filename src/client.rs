//! Client side: code that only sees capability traits.
//!
//! [`Catalog`] is built once from configuration and holds every registry plus
//! the database holder, so callers pass one value around instead of reaching
//! for globals.

use crate::components::{theme_registry, ComponentFactory};
use crate::config::CatalogConfig;
use crate::devices::{device_registry, DeviceFactory};
use crate::error::{InitializationFailure, QueryError};
use crate::query::{dialect_registry, Query, QueryBuilder, QueryBuilderFactory};
use crate::registry::Registry;
use crate::singleton::{Database, DatabaseHolder};
use std::sync::Arc;
use tracing::info;

/// Renders the same login form with whatever theme `factory` belongs to.
pub fn render_login_form(factory: &dyn ComponentFactory) -> String {
    let email = factory.create_text_input("email", "Email");
    let password = factory.create_text_input("password", "Password");
    let submit = factory.create_button("Sign In");
    let cancel = factory.create_button("Cancel");

    [
        "Login Form:".to_string(),
        email.render(),
        password.render(),
        submit.render(),
        cancel.render(),
    ]
    .join("\n")
}

/// The five most recent post ids and titles, in any dialect.
pub fn posts_query(builder: &mut dyn QueryBuilder) -> Result<Query, QueryError> {
    builder
        .table("posts")
        .select(&["id", "title"])
        .limit(5)
        .finalize()
}

pub fn unbox_devices(factory: &dyn DeviceFactory) -> Vec<String> {
    let phone = factory.create_smartphone();
    let tablet = factory.create_tablet();
    vec![phone.switch_on(), phone.ring(), tablet.switch_on()]
}

pub struct Catalog {
    themes: Registry<dyn ComponentFactory>,
    dialects: Registry<dyn QueryBuilderFactory>,
    devices: Registry<dyn DeviceFactory>,
    theme: String,
    dialect: String,
    vendor: String,
    database: DatabaseHolder,
}

impl Catalog {
    pub fn from_config(config: &CatalogConfig) -> Self {
        info!(
            theme = %config.ui.theme,
            dialect = %config.query.dialect,
            vendor = %config.devices.vendor,
            "building catalog"
        );
        Self {
            themes: theme_registry(),
            dialects: dialect_registry(),
            devices: device_registry(),
            theme: config.ui.theme.clone(),
            dialect: config.query.dialect.clone(),
            vendor: config.devices.vendor.clone(),
            database: DatabaseHolder::new(config.database.clone()),
        }
    }

    /// Factory for the configured theme.
    pub fn components(&self) -> Arc<dyn ComponentFactory> {
        self.themes.get(&self.theme)
    }

    /// Fresh builder for the configured dialect.
    pub fn query_builder(&self) -> Box<dyn QueryBuilder> {
        self.dialects.get(&self.dialect).new_builder()
    }

    pub fn devices(&self) -> Arc<dyn DeviceFactory> {
        self.devices.get(&self.vendor)
    }

    /// The catalog's single database handle.
    pub fn database(&self) -> Result<Arc<Database>, InitializationFailure> {
        self.database.instance()
    }

    pub fn themes(&self) -> &Registry<dyn ComponentFactory> {
        &self.themes
    }

    pub fn dialects(&self) -> &Registry<dyn QueryBuilderFactory> {
        &self.dialects
    }

    pub fn vendors(&self) -> &Registry<dyn DeviceFactory> {
        &self.devices
    }
}
