//! [`Command`] for resolving bin duties whose day has elapsed.

use common::{
    datetime::DAY,
    operations::{By, Insert, Select, Update},
    DateTime, Money,
};
use rust_decimal::Decimal;
use tracerr::Traced;
use tracing as log;

use crate::{
    domain::{charge, duty, settings, Charge},
    infra::{database, Database},
    read::duty::Unresolved,
    Service,
};

use super::Command;

/// [`Command`] resolving every [`duty::LogEntry`] of the previous day that
/// was never marked completed: the entry transitions to missed, and an
/// occupied room earns its lodger a one-time penalty [`Charge`].
///
/// The `charge_applied` flag on the entry is the authoritative double-charge
/// guard: an entry already flagged is never charged again, and a failed
/// charge leaves the flag unset for the next run to retry.
#[derive(Clone, Copy, Debug)]
pub struct ResolveElapsedDuties {
    /// Day the rotation engine runs on.
    pub date: DateTime,
}

impl<Db> Command<ResolveElapsedDuties> for Service<Db>
where
    Db: Database<
            Select<By<Vec<Unresolved<duty::LogEntry>>, duty::Date>>,
            Ok = Vec<Unresolved<duty::LogEntry>>,
            Err = Traced<database::Error>,
        > + Database<
            Select<By<Option<settings::Value>, settings::Key>>,
            Ok = Option<settings::Value>,
            Err = Traced<database::Error>,
        > + Database<Insert<Charge>, Ok = (), Err = Traced<database::Error>>
        + Database<Update<duty::LogEntry>, Ok = (), Err = Traced<database::Error>>,
{
    type Ok = usize;
    type Err = ExecutionError;

    async fn execute(
        &self,
        cmd: ResolveElapsedDuties,
    ) -> Result<Self::Ok, Self::Err> {
        let ResolveElapsedDuties { date } = cmd;
        let elapsed: duty::Date = (date.start_of_day() - DAY).coerce();

        let entries = self
            .database()
            .execute(Select(By::new(elapsed)))
            .await
            .map_err(tracerr::wrap!())?;
        if entries.is_empty() {
            return Ok(0);
        }

        let fee = self.penalty_fee().await.map_err(tracerr::wrap!())?;

        let mut resolved = 0;
        for Unresolved(mut entry) in entries {
            if entry.status == duty::Status::Assigned {
                entry.status = duty::Status::Missed;
                if let Err(e) =
                    self.database().execute(Update(entry.clone())).await
                {
                    log::warn!(
                        "failed to mark `duty::LogEntry(id: {})` at \
                         `Property(id: {})` as missed: {e}",
                        entry.id,
                        entry.property_id,
                    );
                    continue;
                }
            }

            if let Some(lodger_id) = entry.lodger_id {
                if !entry.charge_applied {
                    let charge = Charge {
                        id: charge::Id::new(),
                        lodger_id,
                        property_id: entry.property_id,
                        kind: charge::Kind::BinDutyMissed,
                        amount: fee,
                        status: charge::Status::Pending,
                        charged_on: DateTime::now().coerce(),
                        description: charge::Description::new(format!(
                            "Missed bin duty on {}",
                            entry.date.to_date_string(),
                        )),
                    };
                    let charge_id = charge.id;

                    // The charge goes in first: a failed insert leaves
                    // `charge_applied` unset, so the next run retries.
                    if let Err(e) =
                        self.database().execute(Insert(charge)).await
                    {
                        log::warn!(
                            "failed to charge `Lodger(id: {lodger_id})` for \
                             missed bin duty at `Property(id: {})`: {e}",
                            entry.property_id,
                        );
                        continue;
                    }

                    entry.charge_applied = true;
                    entry.charge_id = Some(charge_id);
                    if let Err(e) =
                        self.database().execute(Update(entry.clone())).await
                    {
                        log::warn!(
                            "failed to mark `duty::LogEntry(id: {})` as \
                             charged: {e}",
                            entry.id,
                        );
                        continue;
                    }
                }
            }

            resolved += 1;
        }

        Ok(resolved)
    }
}

impl<Db> Service<Db>
where
    Db: Database<
        Select<By<Option<settings::Value>, settings::Key>>,
        Ok = Option<settings::Value>,
        Err = Traced<database::Error>,
    >,
{
    /// Looks up the [`Money`] fee charged for a missed bin duty.
    ///
    /// Falls back to the configured default when the setting is absent or
    /// unparseable.
    async fn penalty_fee(&self) -> Result<Money, Traced<database::Error>> {
        let fallback = self.config().bin_duty_fee;

        let Some(value) = self
            .database()
            .execute(Select(By::new(settings::Key::BIN_DUTY_CHARGE_AMOUNT)))
            .await
            .map_err(tracerr::wrap!())?
        else {
            return Ok(fallback);
        };

        let value: &str = value.as_ref();
        Ok(value
            .parse::<Decimal>()
            .map_or_else(
                |e| {
                    log::debug!(
                        "unparseable `{}` setting: {e}",
                        settings::Key::BIN_DUTY_CHARGE_AMOUNT,
                    );
                    fallback
                },
                |amount| Money {
                    amount,
                    currency: fallback.currency,
                },
            ))
    }
}

/// Error of [`ResolveElapsedDuties`] [`Command`] execution.
pub type ExecutionError = Traced<database::Error>;
