//! [`Tenancy`]-related [`Database`] implementations.

use common::operations::{By, Select};
use tracerr::Traced;

use crate::{
    domain::{room, tenancy, Tenancy},
    infra::{
        database::{self, postgres::Connection, Postgres},
        Database,
    },
    read,
};

impl<C> Database<Select<By<Option<read::tenancy::Active<Tenancy>>, room::Id>>>
    for Postgres<C>
where
    C: Connection,
{
    type Ok = Option<read::tenancy::Active<Tenancy>>;
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        Select(by): Select<By<Option<read::tenancy::Active<Tenancy>>, room::Id>>,
    ) -> Result<Self::Ok, Self::Err> {
        // Avoid subtle change for SQL.
        let room_id: room::Id = by.into_inner();

        const SQL: &str = "\
            SELECT id, room_id, lodger_id, status, created_at \
            FROM tenancies \
            WHERE room_id = $1::UUID \
              AND status = $2::INT2 \
            LIMIT 1";
        Ok(self
            .query_opt(SQL, &[&room_id, &tenancy::Status::Active])
            .await
            .map_err(tracerr::wrap!())?
            .map(|row| {
                read::tenancy::Active(Tenancy {
                    id: row.get("id"),
                    room_id: row.get("room_id"),
                    lodger_id: row.get("lodger_id"),
                    status: row.get("status"),
                    created_at: row.get("created_at"),
                })
            }))
    }
}
