//! [`Command`] for sending due-tomorrow bin duty reminders.

use common::{
    datetime::DAY,
    operations::{By, Insert, Select, Update},
    DateTime,
};
use tracerr::Traced;
use tracing as log;

use crate::{
    domain::{duty, notification, Notification},
    infra::{database, Database},
    read::duty::Unreminded,
    Service,
};

use super::Command;

/// [`Command`] sending one reminder [`Notification`] to every lodger whose
/// bin duty starts tomorrow.
///
/// Every reminded [`duty::LogEntry`] is flagged as such, so a repeated run
/// on the same day sends nothing. Vacant rooms are silently skipped.
#[derive(Clone, Copy, Debug)]
pub struct SendDutyReminders {
    /// Day the rotation engine runs on.
    pub date: DateTime,
}

impl<Db> Command<SendDutyReminders> for Service<Db>
where
    Db: Database<
            Select<By<Vec<Unreminded<duty::LogEntry>>, duty::Date>>,
            Ok = Vec<Unreminded<duty::LogEntry>>,
            Err = Traced<database::Error>,
        > + Database<Insert<Notification>, Ok = (), Err = Traced<database::Error>>
        + Database<Update<duty::LogEntry>, Ok = (), Err = Traced<database::Error>>,
{
    type Ok = usize;
    type Err = ExecutionError;

    async fn execute(
        &self,
        cmd: SendDutyReminders,
    ) -> Result<Self::Ok, Self::Err> {
        let SendDutyReminders { date } = cmd;
        let due: duty::Date = (date.start_of_day() + DAY).coerce();

        let entries = self
            .database()
            .execute(Select(By::new(due)))
            .await
            .map_err(tracerr::wrap!())?;

        let mut sent = 0;
        for Unreminded(mut entry) in entries {
            // Vacant rooms have nobody to notify.
            let Some(recipient_id) = entry.lodger_id else {
                continue;
            };

            let notification = Notification {
                id: notification::Id::new(),
                recipient_id,
                title: notification::Title::new("Bin duty reminder"),
                message: notification::Message::new(format!(
                    "Your bin duty starts on {}. Please put the bins out.",
                    entry.date.to_date_string(),
                )),
                priority: notification::Priority::Normal,
                sent_at: DateTime::now().coerce(),
            };
            if let Err(e) =
                self.database().execute(Insert(notification)).await
            {
                log::warn!(
                    "failed to notify `Lodger(id: {recipient_id})` of bin \
                     duty at `Property(id: {})`: {e}",
                    entry.property_id,
                );
                continue;
            }

            entry.reminder_sent = true;
            if let Err(e) = self.database().execute(Update(entry)).await {
                log::warn!(
                    "failed to mark `duty::LogEntry` as reminded: {e}",
                );
                continue;
            }

            sent += 1;
        }

        Ok(sent)
    }
}

/// Error of [`SendDutyReminders`] [`Command`] execution.
pub type ExecutionError = Traced<database::Error>;
