//! Rotation [`Assignment`]-related [`Database`] implementations.

use common::operations::{By, Insert, Select};
use tokio_postgres::Row;
use tracerr::Traced;

use crate::{
    domain::{property, rotation, rotation::Assignment},
    infra::{
        database::{self, postgres::Connection, Postgres},
        Database,
    },
};

impl<C> Database<Select<By<Option<Assignment>, property::Id>>> for Postgres<C>
where
    C: Connection,
{
    type Ok = Option<Assignment>;
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        Select(by): Select<By<Option<Assignment>, property::Id>>,
    ) -> Result<Self::Ok, Self::Err> {
        // Avoid subtle change for SQL.
        let property_id: property::Id = by.into_inner();

        const SQL: &str = "\
            SELECT id, property_id, room_id, lodger_id, \
                   period_start, status, created_at \
            FROM bin_rotations \
            WHERE property_id = $1::UUID \
            ORDER BY period_start DESC \
            LIMIT 1";
        self.query_opt(SQL, &[&property_id])
            .await
            .map_err(tracerr::wrap!())
            .map(|row| row.as_ref().map(assignment))
    }
}

impl<C>
    Database<Select<By<Option<Assignment>, (property::Id, rotation::PeriodStart)>>>
    for Postgres<C>
where
    C: Connection,
{
    type Ok = Option<Assignment>;
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        Select(by): Select<
            By<Option<Assignment>, (property::Id, rotation::PeriodStart)>,
        >,
    ) -> Result<Self::Ok, Self::Err> {
        let (property_id, period_start) = by.into_inner();

        const SQL: &str = "\
            SELECT id, property_id, room_id, lodger_id, \
                   period_start, status, created_at \
            FROM bin_rotations \
            WHERE property_id = $1::UUID \
              AND period_start = $2::TIMESTAMPTZ \
            LIMIT 1";
        self.query_opt(SQL, &[&property_id, &period_start])
            .await
            .map_err(tracerr::wrap!())
            .map(|row| row.as_ref().map(assignment))
    }
}

impl<C> Database<Insert<Assignment>> for Postgres<C>
where
    C: Connection,
{
    type Ok = ();
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        Insert(assignment): Insert<Assignment>,
    ) -> Result<Self::Ok, Self::Err> {
        let Assignment {
            id,
            property_id,
            room_id,
            lodger_id,
            period_start,
            status,
            created_at,
        } = assignment;

        // `DO NOTHING` backstops concurrent engine runs racing on the same
        // period.
        const SQL: &str = "\
            INSERT INTO bin_rotations (\
                id, property_id, room_id, lodger_id, \
                period_start, status, created_at \
            ) VALUES (\
                $1::UUID, $2::UUID, $3::UUID, $4::UUID, \
                $5::TIMESTAMPTZ, $6::INT2, $7::TIMESTAMPTZ \
            ) \
            ON CONFLICT (property_id, period_start) DO NOTHING";
        self.exec(
            SQL,
            &[
                &id,
                &property_id,
                &room_id,
                &lodger_id,
                &period_start,
                &status,
                &created_at,
            ],
        )
        .await
        .map_err(tracerr::wrap!())
        .map(drop)
    }
}

/// Maps the provided [`Row`] into an [`Assignment`].
fn assignment(row: &Row) -> Assignment {
    Assignment {
        id: row.get("id"),
        property_id: row.get("property_id"),
        room_id: row.get("room_id"),
        lodger_id: row.get("lodger_id"),
        period_start: row.get("period_start"),
        status: row.get("status"),
        created_at: row.get("created_at"),
    }
}
