use sea_orm::DatabaseConnection;

use crate::{IdentityHook, PhoneRegion, ResultEngine};

mod departments;
mod identities;
mod profiles;
mod statuses;

pub use profiles::{ProfilePage, ProfileQuery};

/// Run a block inside a DB transaction, committing on success and rolling back on error.
macro_rules! with_tx {
    ($self:expr, |$tx:ident| $body:expr) => {{
        let $tx = $self.database.begin().await?;
        let result = $body;
        match result {
            Ok(value) => {
                $tx.commit().await?;
                Ok(value)
            }
            Err(err) => Err(err),
        }
    }};
}

pub(crate) use with_tx;

#[derive(Debug)]
pub struct Engine {
    database: DatabaseConnection,
    phone_region: PhoneRegion,
    default_status: Option<String>,
    hooks: Vec<IdentityHook>,
}

impl Engine {
    /// Return a builder for `Engine`. Help to build the struct.
    pub fn builder() -> EngineBuilder {
        EngineBuilder::default()
    }

    /// Region used to read phone numbers written without a country prefix.
    pub fn phone_region(&self) -> PhoneRegion {
        self.phone_region
    }
}

/// The builder for `Engine`
#[derive(Default)]
pub struct EngineBuilder {
    database: DatabaseConnection,
    phone_region: PhoneRegion,
    default_status: Option<String>,
    hooks: Option<Vec<IdentityHook>>,
}

impl EngineBuilder {
    /// Pass the required database
    pub fn database(mut self, db: DatabaseConnection) -> EngineBuilder {
        self.database = db;
        self
    }

    pub fn phone_region(mut self, region: PhoneRegion) -> EngineBuilder {
        self.phone_region = region;
        self
    }

    /// Status code assigned to new profiles, when such a status exists.
    pub fn default_status(mut self, code: Option<&str>) -> EngineBuilder {
        self.default_status = code
            .map(str::trim)
            .filter(|c| !c.is_empty())
            .map(ToString::to_string);
        self
    }

    /// Replace the identity lifecycle hooks. Defaults to
    /// [`IdentityHook::defaults`].
    pub fn hooks(mut self, hooks: Vec<IdentityHook>) -> EngineBuilder {
        self.hooks = Some(hooks);
        self
    }

    /// Construct `Engine`
    pub async fn build(self) -> ResultEngine<Engine> {
        let hooks = self.hooks.unwrap_or_else(IdentityHook::defaults);
        tracing::debug!(
            "engine configured: phone region {}, {} identity hooks",
            self.phone_region,
            hooks.len()
        );
        Ok(Engine {
            database: self.database,
            phone_region: self.phone_region,
            default_status: self.default_status,
            hooks,
        })
    }
}
