//! Bin duty [`LogEntry`]-related [`Database`] implementations.

use common::operations::{By, Insert, Select, Update};
use tokio_postgres::Row;
use tracerr::Traced;

use crate::{
    domain::{duty, duty::LogEntry},
    infra::{
        database::{self, postgres::Connection, Postgres},
        Database,
    },
    read::duty::{Unreminded, Unresolved},
};

impl<C> Database<Insert<LogEntry>> for Postgres<C>
where
    C: Connection,
{
    type Ok = ();
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        Insert(entry): Insert<LogEntry>,
    ) -> Result<Self::Ok, Self::Err> {
        let LogEntry {
            id,
            property_id,
            room_id,
            lodger_id,
            date,
            status,
            reminder_sent,
            charge_applied,
            charge_id,
            created_at,
        } = entry;

        const SQL: &str = "\
            INSERT INTO bin_duty_log (\
                id, property_id, room_id, lodger_id, \
                duty_date, status, \
                reminder_sent, charge_applied, charge_id, \
                created_at \
            ) VALUES (\
                $1::UUID, $2::UUID, $3::UUID, $4::UUID, \
                $5::TIMESTAMPTZ, $6::INT2, \
                $7::BOOL, $8::BOOL, $9::UUID, \
                $10::TIMESTAMPTZ \
            )";
        self.exec(
            SQL,
            &[
                &id,
                &property_id,
                &room_id,
                &lodger_id,
                &date,
                &status,
                &reminder_sent,
                &charge_applied,
                &charge_id,
                &created_at,
            ],
        )
        .await
        .map_err(tracerr::wrap!())
        .map(drop)
    }
}

impl<C> Database<Update<LogEntry>> for Postgres<C>
where
    C: Connection,
{
    type Ok = ();
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        Update(entry): Update<LogEntry>,
    ) -> Result<Self::Ok, Self::Err> {
        let LogEntry {
            id,
            property_id: _,
            room_id: _,
            lodger_id: _,
            date: _,
            status,
            reminder_sent,
            charge_applied,
            charge_id,
            created_at: _,
        } = entry;

        const SQL: &str = "\
            UPDATE bin_duty_log \
            SET status = $2::INT2, \
                reminder_sent = $3::BOOL, \
                charge_applied = $4::BOOL, \
                charge_id = $5::UUID \
            WHERE id = $1::UUID";
        self.exec(SQL, &[&id, &status, &reminder_sent, &charge_applied, &charge_id])
            .await
            .map_err(tracerr::wrap!())
            .map(drop)
    }
}

impl<C> Database<Select<By<Vec<Unreminded<LogEntry>>, duty::Date>>>
    for Postgres<C>
where
    C: Connection,
{
    type Ok = Vec<Unreminded<LogEntry>>;
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        Select(by): Select<By<Vec<Unreminded<LogEntry>>, duty::Date>>,
    ) -> Result<Self::Ok, Self::Err> {
        // Avoid subtle change for SQL.
        let date: duty::Date = by.into_inner();

        const SQL: &str = "\
            SELECT id, property_id, room_id, lodger_id, \
                   duty_date, status, \
                   reminder_sent, charge_applied, charge_id, \
                   created_at \
            FROM bin_duty_log \
            WHERE duty_date = $1::TIMESTAMPTZ \
              AND status = $2::INT2 \
              AND reminder_sent = FALSE";
        Ok(self
            .query(SQL, &[&date, &duty::Status::Assigned])
            .await
            .map_err(tracerr::wrap!())?
            .iter()
            .map(|row| Unreminded(log_entry(row)))
            .collect())
    }
}

impl<C> Database<Select<By<Vec<Unresolved<LogEntry>>, duty::Date>>>
    for Postgres<C>
where
    C: Connection,
{
    type Ok = Vec<Unresolved<LogEntry>>;
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        Select(by): Select<By<Vec<Unresolved<LogEntry>>, duty::Date>>,
    ) -> Result<Self::Ok, Self::Err> {
        // Avoid subtle change for SQL.
        let date: duty::Date = by.into_inner();

        // Missed entries with an occupant and no applied charge are picked
        // up again, so a failed charge is retried on the next run.
        const SQL: &str = "\
            SELECT id, property_id, room_id, lodger_id, \
                   duty_date, status, \
                   reminder_sent, charge_applied, charge_id, \
                   created_at \
            FROM bin_duty_log \
            WHERE duty_date = $1::TIMESTAMPTZ \
              AND (status = $2::INT2 \
                   OR (status = $3::INT2 \
                       AND lodger_id IS NOT NULL \
                       AND charge_applied = FALSE))";
        Ok(self
            .query(
                SQL,
                &[&date, &duty::Status::Assigned, &duty::Status::Missed],
            )
            .await
            .map_err(tracerr::wrap!())?
            .iter()
            .map(|row| Unresolved(log_entry(row)))
            .collect())
    }
}

/// Maps the provided [`Row`] into a [`LogEntry`].
fn log_entry(row: &Row) -> LogEntry {
    LogEntry {
        id: row.get("id"),
        property_id: row.get("property_id"),
        room_id: row.get("room_id"),
        lodger_id: row.get("lodger_id"),
        date: row.get("duty_date"),
        status: row.get("status"),
        reminder_sent: row.get("reminder_sent"),
        charge_applied: row.get("charge_applied"),
        charge_id: row.get("charge_id"),
        created_at: row.get("created_at"),
    }
}
