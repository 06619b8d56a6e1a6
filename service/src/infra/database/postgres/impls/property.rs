//! [`Property`]-related [`Database`] implementations.

use common::operations::{By, Select};
use tracerr::Traced;

use crate::{
    domain::{property, Property, Room},
    infra::{
        database::{self, postgres::Connection, Postgres},
        Database,
    },
};

impl<C> Database<Select<By<Vec<Property>, ()>>> for Postgres<C>
where
    C: Connection,
{
    type Ok = Vec<Property>;
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        Select(_): Select<By<Vec<Property>, ()>>,
    ) -> Result<Self::Ok, Self::Err> {
        const SQL: &str = "\
            SELECT id, name, bin_collection_day, created_at \
            FROM properties \
            ORDER BY created_at ASC";
        Ok(self
            .query(SQL, &[])
            .await
            .map_err(tracerr::wrap!())?
            .into_iter()
            .map(|row| Property {
                id: row.get("id"),
                name: row.get("name"),
                bin_collection_day: row.get("bin_collection_day"),
                created_at: row.get("created_at"),
            })
            .collect())
    }
}

impl<C> Database<Select<By<Vec<Room>, property::Id>>> for Postgres<C>
where
    C: Connection,
{
    type Ok = Vec<Room>;
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        Select(by): Select<By<Vec<Room>, property::Id>>,
    ) -> Result<Self::Ok, Self::Err> {
        // Avoid subtle change for SQL.
        let property_id: property::Id = by.into_inner();

        // Room number ordering defines the rotation order.
        const SQL: &str = "\
            SELECT id, property_id, room_number, created_at \
            FROM rooms \
            WHERE property_id = $1::UUID \
            ORDER BY room_number ASC";
        Ok(self
            .query(SQL, &[&property_id])
            .await
            .map_err(tracerr::wrap!())?
            .into_iter()
            .map(|row| Room {
                id: row.get("id"),
                property_id: row.get("property_id"),
                number: row.get("room_number"),
                created_at: row.get("created_at"),
            })
            .collect())
    }
}
