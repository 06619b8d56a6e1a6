//! [`Command`] for advancing the bin duty rotation of a [`Property`].

use common::{
    operations::{By, Insert, Select},
    DateTime,
};
use tracerr::Traced;
use tracing as log;

use crate::{
    domain::{duty, property, room, rotation, Property, Room, Tenancy},
    infra::{database, Database},
    read,
    Service,
};

use super::Command;

/// [`Command`] advancing the bin duty rotation of a [`Property`] into its
/// next period.
///
/// Idempotent: re-running it within an already-covered period is a no-op.
#[derive(Clone, Debug)]
pub struct AdvanceRotation {
    /// [`Property`] to advance the rotation of.
    pub property: Property,

    /// Day the rotation engine runs on.
    pub date: DateTime,
}

impl<Db> Command<AdvanceRotation> for Service<Db>
where
    Db: Database<
            Select<By<Vec<Room>, property::Id>>,
            Ok = Vec<Room>,
            Err = Traced<database::Error>,
        > + Database<
            Select<By<Option<rotation::Assignment>, property::Id>>,
            Ok = Option<rotation::Assignment>,
            Err = Traced<database::Error>,
        > + Database<
            Select<
                By<
                    Option<rotation::Assignment>,
                    (property::Id, rotation::PeriodStart),
                >,
            >,
            Ok = Option<rotation::Assignment>,
            Err = Traced<database::Error>,
        > + Database<
            Select<By<Option<read::tenancy::Active<Tenancy>>, room::Id>>,
            Ok = Option<read::tenancy::Active<Tenancy>>,
            Err = Traced<database::Error>,
        > + Database<
            Insert<rotation::Assignment>,
            Ok = (),
            Err = Traced<database::Error>,
        > + Database<Insert<duty::LogEntry>, Ok = (), Err = Traced<database::Error>>,
{
    type Ok = Option<rotation::Assignment>;
    type Err = ExecutionError;

    async fn execute(
        &self,
        cmd: AdvanceRotation,
    ) -> Result<Self::Ok, Self::Err> {
        let AdvanceRotation { property, date } = cmd;

        let rooms = self
            .database()
            .execute(Select(By::<Vec<Room>, _>::new(property.id)))
            .await
            .map_err(tracerr::wrap!())?;
        if rooms.is_empty() {
            log::debug!(
                "`Property(id: {})` has no rooms to rotate bin duty over",
                property.id,
            );
            return Ok(None);
        }

        let prior = self
            .database()
            .execute(Select(By::<Option<rotation::Assignment>, _>::new(
                property.id,
            )))
            .await
            .map_err(tracerr::wrap!())?;

        let period_start = if let Some(p) = &prior {
            let next = p.period_start + rotation::PERIOD;
            // The latest period is still running, nothing is due yet.
            if date.start_of_day().coerce() < next {
                return Ok(None);
            }
            next
        } else {
            rotation::first_period_start(property.bin_collection_day, date)
        };

        // Repeated runs within the same period must not double-assign.
        if self
            .database()
            .execute(Select(By::<Option<rotation::Assignment>, _>::new((
                property.id,
                period_start,
            ))))
            .await
            .map_err(tracerr::wrap!())?
            .is_some()
        {
            return Ok(None);
        }

        let Some(next) = rotation::next_room_index(
            &rooms,
            prior.as_ref().map(|p| p.room_id),
        ) else {
            return Ok(None);
        };
        let room = &rooms[next];

        let lodger_id = self
            .database()
            .execute(Select(
                By::<Option<read::tenancy::Active<Tenancy>>, _>::new(room.id),
            ))
            .await
            .map_err(tracerr::wrap!())?
            .map(|read::tenancy::Active(t)| t.lodger_id);

        let assignment = rotation::Assignment {
            id: rotation::Id::new(),
            property_id: property.id,
            room_id: room.id,
            lodger_id,
            period_start,
            status: rotation::Status::Assigned,
            created_at: DateTime::now().coerce(),
        };
        self.database()
            .execute(Insert(assignment.clone()))
            .await
            .map_err(tracerr::wrap!())
            .map(drop)?;

        self.database()
            .execute(Insert(duty::LogEntry {
                id: duty::Id::new(),
                property_id: property.id,
                room_id: room.id,
                lodger_id,
                date: period_start.coerce(),
                status: duty::Status::Assigned,
                reminder_sent: false,
                charge_applied: false,
                charge_id: None,
                created_at: DateTime::now().coerce(),
            }))
            .await
            .map_err(tracerr::wrap!())
            .map(drop)?;

        Ok(Some(assignment))
    }
}

/// Error of [`AdvanceRotation`] [`Command`] execution.
pub type ExecutionError = Traced<database::Error>;
