//! System settings [`Database`] implementations.

use common::operations::{By, Select};
use tracerr::Traced;

use crate::{
    domain::settings,
    infra::{
        database::{self, postgres::Connection, Postgres},
        Database,
    },
};

impl<C> Database<Select<By<Option<settings::Value>, settings::Key>>>
    for Postgres<C>
where
    C: Connection,
{
    type Ok = Option<settings::Value>;
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        Select(by): Select<By<Option<settings::Value>, settings::Key>>,
    ) -> Result<Self::Ok, Self::Err> {
        // Avoid subtle change for SQL.
        let key: settings::Key = by.into_inner();

        const SQL: &str = "\
            SELECT value \
            FROM system_settings \
            WHERE key = $1::VARCHAR \
            LIMIT 1";
        Ok(self
            .query_opt(SQL, &[&key])
            .await
            .map_err(tracerr::wrap!())?
            .map(|row| row.get("value")))
    }
}
