//! Bin duty rotation engine tests running against an in-memory database.

use std::{
    sync::{Arc, Mutex},
    time::Duration,
};

use common::{
    datetime::{Weekday, DAY},
    operations::{By, Insert, Perform, Select, Update},
    DateTime, Money,
};
use service::{
    command::{AdvanceRotation, ResolveElapsedDuties, SendDutyReminders},
    domain::{
        charge, duty, lodger, property, room, rotation, settings, tenancy,
        Charge, Notification, Property, Room, Tenancy,
    },
    infra::{database, postgres, Database},
    read,
    task::{rotate_bin_duty, RotateBinDuty},
    Command as _, Config, Service,
};
use tracerr::Traced;

/// In-memory [`Database`] mirroring the predicates of the Postgres queries.
#[derive(Clone, Debug, Default)]
struct MockDb(Arc<Mutex<State>>);

#[derive(Debug, Default)]
struct State {
    properties: Vec<Property>,
    rooms: Vec<Room>,
    tenancies: Vec<Tenancy>,
    assignments: Vec<rotation::Assignment>,
    duties: Vec<duty::LogEntry>,
    charges: Vec<Charge>,
    notifications: Vec<Notification>,
    setting: Option<String>,
    fail_charges: bool,
}

impl MockDb {
    fn seed(&self, f: impl FnOnce(&mut State)) {
        f(&mut self.0.lock().unwrap());
    }

    fn state<R>(&self, f: impl FnOnce(&State) -> R) -> R {
        f(&self.0.lock().unwrap())
    }

    fn error() -> Traced<database::Error> {
        tracerr::new!(database::Error::Postgres(postgres::Error::PoolError(
            deadpool_postgres::PoolError::Closed,
        )))
    }
}

impl Database<Select<By<Vec<Property>, ()>>> for MockDb {
    type Ok = Vec<Property>;
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        _: Select<By<Vec<Property>, ()>>,
    ) -> Result<Self::Ok, Self::Err> {
        Ok(self.state(|s| s.properties.clone()))
    }
}

impl Database<Select<By<Vec<Room>, property::Id>>> for MockDb {
    type Ok = Vec<Room>;
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        Select(by): Select<By<Vec<Room>, property::Id>>,
    ) -> Result<Self::Ok, Self::Err> {
        let property_id = by.into_inner();
        Ok(self.state(|s| {
            let mut rooms = s
                .rooms
                .iter()
                .filter(|r| r.property_id == property_id)
                .cloned()
                .collect::<Vec<_>>();
            rooms.sort_by_key(|r| r.number);
            rooms
        }))
    }
}

impl Database<Select<By<Option<rotation::Assignment>, property::Id>>>
    for MockDb
{
    type Ok = Option<rotation::Assignment>;
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        Select(by): Select<By<Option<rotation::Assignment>, property::Id>>,
    ) -> Result<Self::Ok, Self::Err> {
        let property_id = by.into_inner();
        Ok(self.state(|s| {
            s.assignments
                .iter()
                .filter(|a| a.property_id == property_id)
                .max_by_key(|a| a.period_start)
                .cloned()
        }))
    }
}

impl
    Database<
        Select<
            By<Option<rotation::Assignment>, (property::Id, rotation::PeriodStart)>,
        >,
    > for MockDb
{
    type Ok = Option<rotation::Assignment>;
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        Select(by): Select<
            By<Option<rotation::Assignment>, (property::Id, rotation::PeriodStart)>,
        >,
    ) -> Result<Self::Ok, Self::Err> {
        let (property_id, period_start) = by.into_inner();
        Ok(self.state(|s| {
            s.assignments
                .iter()
                .find(|a| {
                    a.property_id == property_id
                        && a.period_start == period_start
                })
                .cloned()
        }))
    }
}

impl Database<Select<By<Option<read::tenancy::Active<Tenancy>>, room::Id>>>
    for MockDb
{
    type Ok = Option<read::tenancy::Active<Tenancy>>;
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        Select(by): Select<By<Option<read::tenancy::Active<Tenancy>>, room::Id>>,
    ) -> Result<Self::Ok, Self::Err> {
        let room_id = by.into_inner();
        Ok(self.state(|s| {
            s.tenancies
                .iter()
                .find(|t| {
                    t.room_id == room_id && t.status == tenancy::Status::Active
                })
                .cloned()
                .map(read::tenancy::Active)
        }))
    }
}

impl Database<Insert<rotation::Assignment>> for MockDb {
    type Ok = ();
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        Insert(assignment): Insert<rotation::Assignment>,
    ) -> Result<Self::Ok, Self::Err> {
        self.seed(|s| {
            let exists = s.assignments.iter().any(|a| {
                a.property_id == assignment.property_id
                    && a.period_start == assignment.period_start
            });
            if !exists {
                s.assignments.push(assignment);
            }
        });
        Ok(())
    }
}

impl Database<Insert<duty::LogEntry>> for MockDb {
    type Ok = ();
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        Insert(entry): Insert<duty::LogEntry>,
    ) -> Result<Self::Ok, Self::Err> {
        self.seed(|s| s.duties.push(entry));
        Ok(())
    }
}

impl Database<Update<duty::LogEntry>> for MockDb {
    type Ok = ();
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        Update(entry): Update<duty::LogEntry>,
    ) -> Result<Self::Ok, Self::Err> {
        self.seed(|s| {
            if let Some(stored) =
                s.duties.iter_mut().find(|e| e.id == entry.id)
            {
                *stored = entry;
            }
        });
        Ok(())
    }
}

impl Database<Select<By<Vec<read::duty::Unreminded<duty::LogEntry>>, duty::Date>>>
    for MockDb
{
    type Ok = Vec<read::duty::Unreminded<duty::LogEntry>>;
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        Select(by): Select<
            By<Vec<read::duty::Unreminded<duty::LogEntry>>, duty::Date>,
        >,
    ) -> Result<Self::Ok, Self::Err> {
        let date = by.into_inner();
        Ok(self.state(|s| {
            s.duties
                .iter()
                .filter(|e| {
                    e.date == date
                        && e.status == duty::Status::Assigned
                        && !e.reminder_sent
                })
                .cloned()
                .map(read::duty::Unreminded)
                .collect()
        }))
    }
}

impl Database<Select<By<Vec<read::duty::Unresolved<duty::LogEntry>>, duty::Date>>>
    for MockDb
{
    type Ok = Vec<read::duty::Unresolved<duty::LogEntry>>;
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        Select(by): Select<
            By<Vec<read::duty::Unresolved<duty::LogEntry>>, duty::Date>,
        >,
    ) -> Result<Self::Ok, Self::Err> {
        let date = by.into_inner();
        Ok(self.state(|s| {
            s.duties
                .iter()
                .filter(|e| {
                    e.date == date
                        && (e.status == duty::Status::Assigned
                            || (e.status == duty::Status::Missed
                                && e.lodger_id.is_some()
                                && !e.charge_applied))
                })
                .cloned()
                .map(read::duty::Unresolved)
                .collect()
        }))
    }
}

impl Database<Insert<Charge>> for MockDb {
    type Ok = ();
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        Insert(charge): Insert<Charge>,
    ) -> Result<Self::Ok, Self::Err> {
        let mut s = self.0.lock().unwrap();
        if s.fail_charges {
            return Err(Self::error());
        }
        s.charges.push(charge);
        Ok(())
    }
}

impl Database<Insert<Notification>> for MockDb {
    type Ok = ();
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        Insert(notification): Insert<Notification>,
    ) -> Result<Self::Ok, Self::Err> {
        self.seed(|s| s.notifications.push(notification));
        Ok(())
    }
}

impl Database<Select<By<Option<settings::Value>, settings::Key>>> for MockDb {
    type Ok = Option<settings::Value>;
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        _: Select<By<Option<settings::Value>, settings::Key>>,
    ) -> Result<Self::Ok, Self::Err> {
        Ok(self.state(|s| s.setting.clone().map(settings::Value::from)))
    }
}

fn config() -> Config {
    Config {
        bin_duty_fee: "10GBP".parse().unwrap(),
        rotate_bin_duty: rotate_bin_duty::Config {
            interval: Duration::from_secs(24 * 60 * 60),
        },
    }
}

fn date(s: &str) -> DateTime {
    DateTime::from_rfc3339(s).unwrap()
}

fn property(collection_day: Option<Weekday>) -> Property {
    Property {
        id: property::Id::new(),
        name: property::Name::new("12 Albert Road").unwrap(),
        bin_collection_day: collection_day.map(Into::into),
        created_at: DateTime::now().coerce(),
    }
}

fn room(property_id: property::Id, number: i32) -> Room {
    Room {
        id: room::Id::new(),
        property_id,
        number: number.into(),
        created_at: DateTime::now().coerce(),
    }
}

fn occupied(room_id: room::Id) -> Tenancy {
    Tenancy {
        id: tenancy::Id::new(),
        room_id,
        lodger_id: lodger::Id::new(),
        status: tenancy::Status::Active,
        created_at: DateTime::now().coerce(),
    }
}

fn log_entry(
    property_id: property::Id,
    room_id: room::Id,
    lodger_id: Option<lodger::Id>,
    date: DateTime,
    status: duty::Status,
) -> duty::LogEntry {
    duty::LogEntry {
        id: duty::Id::new(),
        property_id,
        room_id,
        lodger_id,
        date: date.coerce(),
        status,
        reminder_sent: false,
        charge_applied: false,
        charge_id: None,
        created_at: DateTime::now().coerce(),
    }
}

// 2026-08-24 is a Monday.
const MONDAY: &str = "2026-08-24T00:00:00Z";

#[tokio::test]
async fn assigns_rooms_in_round_robin_order() {
    let db = MockDb::default();
    let prop = property(None);
    let rooms = [
        room(prop.id, 1),
        room(prop.id, 2),
        room(prop.id, 3),
    ];
    db.seed(|s| {
        s.properties.push(prop.clone());
        s.rooms.extend(rooms.iter().cloned());
    });
    let (service, _bg) = Service::new(config(), db.clone());

    let monday = date(MONDAY);
    for week in 0u32..4 {
        let assigned = service
            .execute(AdvanceRotation {
                property: prop.clone(),
                date: monday + rotation::PERIOD * week,
            })
            .await
            .unwrap();
        assert!(assigned.is_some());
    }

    let assignments = db.state(|s| s.assignments.clone());
    assert_eq!(assignments.len(), 4);
    assert_eq!(assignments[0].room_id, rooms[0].id);
    assert_eq!(assignments[1].room_id, rooms[1].id);
    assert_eq!(assignments[2].room_id, rooms[2].id);
    assert_eq!(assignments[3].room_id, rooms[0].id);
    assert_eq!(
        assignments[1].period_start,
        assignments[0].period_start + rotation::PERIOD,
    );
}

#[tokio::test]
async fn repeated_advance_within_period_is_noop() {
    let db = MockDb::default();
    let prop = property(None);
    db.seed(|s| {
        s.properties.push(prop.clone());
        s.rooms.push(room(prop.id, 1));
    });
    let (service, _bg) = Service::new(config(), db.clone());

    let monday = date(MONDAY);
    let first = service
        .execute(AdvanceRotation {
            property: prop.clone(),
            date: monday,
        })
        .await
        .unwrap();
    assert!(first.is_some());

    let second = service
        .execute(AdvanceRotation {
            property: prop.clone(),
            date: monday,
        })
        .await
        .unwrap();
    assert!(second.is_none());

    assert_eq!(db.state(|s| s.assignments.len()), 1);
    assert_eq!(db.state(|s| s.duties.len()), 1);
}

#[tokio::test]
async fn daily_runs_mid_period_assign_nothing_ahead_of_time() {
    let db = MockDb::default();
    let prop = property(None);
    let rooms = [room(prop.id, 1), room(prop.id, 2)];
    db.seed(|s| {
        s.properties.push(prop.clone());
        s.rooms.extend(rooms.iter().cloned());
    });
    let (service, _bg) = Service::new(config(), db.clone());

    let monday = date(MONDAY);
    let first = service
        .execute(AdvanceRotation {
            property: prop.clone(),
            date: monday,
        })
        .await
        .unwrap();
    assert!(first.is_some());

    // The task ticks daily, but the period is weekly.
    for day in 1u32..7 {
        let advanced = service
            .execute(AdvanceRotation {
                property: prop.clone(),
                date: monday + DAY * day,
            })
            .await
            .unwrap();
        assert!(advanced.is_none());
    }

    assert_eq!(db.state(|s| s.assignments.len()), 1);
    assert_eq!(db.state(|s| s.duties.len()), 1);

    let next = service
        .execute(AdvanceRotation {
            property: prop.clone(),
            date: monday + rotation::PERIOD,
        })
        .await
        .unwrap()
        .unwrap();
    assert_eq!(next.room_id, rooms[1].id);
    assert_eq!(db.state(|s| s.assignments.len()), 2);
}

#[tokio::test]
async fn falls_back_to_first_room_when_assigned_room_is_removed() {
    let db = MockDb::default();
    let prop = property(None);
    let rooms = [
        room(prop.id, 1),
        room(prop.id, 2),
        room(prop.id, 3),
    ];
    db.seed(|s| {
        s.properties.push(prop.clone());
        s.rooms.extend(rooms.iter().cloned());
    });
    let (service, _bg) = Service::new(config(), db.clone());

    let monday = date(MONDAY);
    let first = service
        .execute(AdvanceRotation {
            property: prop.clone(),
            date: monday,
        })
        .await
        .unwrap()
        .unwrap();
    assert_eq!(first.room_id, rooms[0].id);

    // The previously assigned room leaves the rotation.
    db.seed(|s| s.rooms.retain(|r| r.id != rooms[0].id));

    let next = service
        .execute(AdvanceRotation {
            property: prop.clone(),
            date: monday + rotation::PERIOD,
        })
        .await
        .unwrap()
        .unwrap();
    assert_eq!(next.room_id, rooms[1].id);
}

#[tokio::test]
async fn first_period_starts_on_collection_day() {
    let db = MockDb::default();
    let prop = property(Some(Weekday::Thursday));
    db.seed(|s| {
        s.properties.push(prop.clone());
        s.rooms.push(room(prop.id, 1));
    });
    let (service, _bg) = Service::new(config(), db.clone());

    let assigned = service
        .execute(AdvanceRotation {
            property: prop.clone(),
            date: date(MONDAY),
        })
        .await
        .unwrap()
        .unwrap();
    assert_eq!(
        assigned.period_start,
        date("2026-08-27T00:00:00Z").coerce(),
    );
}

#[tokio::test]
async fn assignment_picks_up_current_occupant() {
    let db = MockDb::default();
    let prop = property(None);
    let room = room(prop.id, 1);
    let tenancy = occupied(room.id);
    db.seed(|s| {
        s.properties.push(prop.clone());
        s.rooms.push(room.clone());
        s.tenancies.push(tenancy.clone());
    });
    let (service, _bg) = Service::new(config(), db.clone());

    let assigned = service
        .execute(AdvanceRotation {
            property: prop.clone(),
            date: date(MONDAY),
        })
        .await
        .unwrap()
        .unwrap();
    assert_eq!(assigned.lodger_id, Some(tenancy.lodger_id));
}

#[tokio::test]
async fn reminds_tomorrows_occupant_once() {
    let db = MockDb::default();
    let prop = property(None);
    let room = room(prop.id, 1);
    let lodger_id = lodger::Id::new();
    db.seed(|s| {
        s.duties.push(log_entry(
            prop.id,
            room.id,
            Some(lodger_id),
            date("2026-08-25T00:00:00Z"),
            duty::Status::Assigned,
        ));
    });
    let (service, _bg) = Service::new(config(), db.clone());

    let sent = service
        .execute(SendDutyReminders { date: date(MONDAY) })
        .await
        .unwrap();
    assert_eq!(sent, 1);

    let notifications = db.state(|s| s.notifications.clone());
    assert_eq!(notifications.len(), 1);
    assert_eq!(notifications[0].recipient_id, lodger_id);

    // A second run the same day must not send a duplicate.
    let sent = service
        .execute(SendDutyReminders { date: date(MONDAY) })
        .await
        .unwrap();
    assert_eq!(sent, 0);
    assert_eq!(db.state(|s| s.notifications.len()), 1);
}

#[tokio::test]
async fn vacant_room_is_skipped_entirely() {
    let db = MockDb::default();
    let prop = property(None);
    let room = room(prop.id, 1);
    db.seed(|s| {
        // Due tomorrow and elapsed yesterday, both unoccupied.
        s.duties.push(log_entry(
            prop.id,
            room.id,
            None,
            date("2026-08-25T00:00:00Z"),
            duty::Status::Assigned,
        ));
        s.duties.push(log_entry(
            prop.id,
            room.id,
            None,
            date("2026-08-23T00:00:00Z"),
            duty::Status::Assigned,
        ));
    });
    let (service, _bg) = Service::new(config(), db.clone());

    let sent = service
        .execute(SendDutyReminders { date: date(MONDAY) })
        .await
        .unwrap();
    assert_eq!(sent, 0);

    let resolved = service
        .execute(ResolveElapsedDuties { date: date(MONDAY) })
        .await
        .unwrap();
    assert_eq!(resolved, 1);

    let state = db.state(|s| (s.notifications.len(), s.charges.len()));
    assert_eq!(state, (0, 0));

    // The elapsed duty is still marked as missed.
    let elapsed = db.state(|s| s.duties[1].clone());
    assert_eq!(elapsed.status, duty::Status::Missed);
    assert!(!elapsed.charge_applied);
}

#[tokio::test]
async fn missed_duty_charges_occupant_once() {
    let db = MockDb::default();
    let prop = property(None);
    let room = room(prop.id, 1);
    let lodger_id = lodger::Id::new();
    db.seed(|s| {
        s.duties.push(log_entry(
            prop.id,
            room.id,
            Some(lodger_id),
            date("2026-08-23T00:00:00Z"),
            duty::Status::Assigned,
        ));
    });
    let (service, _bg) = Service::new(config(), db.clone());

    let resolved = service
        .execute(ResolveElapsedDuties { date: date(MONDAY) })
        .await
        .unwrap();
    assert_eq!(resolved, 1);

    let charges = db.state(|s| s.charges.clone());
    assert_eq!(charges.len(), 1);
    assert_eq!(charges[0].lodger_id, lodger_id);
    assert_eq!(charges[0].kind, charge::Kind::BinDutyMissed);
    assert_eq!(charges[0].status, charge::Status::Pending);
    assert_eq!(charges[0].amount, "10GBP".parse::<Money>().unwrap());

    let entry = db.state(|s| s.duties[0].clone());
    assert_eq!(entry.status, duty::Status::Missed);
    assert!(entry.charge_applied);
    assert_eq!(entry.charge_id, Some(charges[0].id));

    // A second run must not double charge.
    let resolved = service
        .execute(ResolveElapsedDuties { date: date(MONDAY) })
        .await
        .unwrap();
    assert_eq!(resolved, 0);
    assert_eq!(db.state(|s| s.charges.len()), 1);
}

#[tokio::test]
async fn failed_charge_is_retried_on_next_run() {
    let db = MockDb::default();
    let prop = property(None);
    let room = room(prop.id, 1);
    db.seed(|s| {
        s.duties.push(log_entry(
            prop.id,
            room.id,
            Some(lodger::Id::new()),
            date("2026-08-23T00:00:00Z"),
            duty::Status::Assigned,
        ));
        s.fail_charges = true;
    });
    let (service, _bg) = Service::new(config(), db.clone());

    let resolved = service
        .execute(ResolveElapsedDuties { date: date(MONDAY) })
        .await
        .unwrap();
    assert_eq!(resolved, 0);

    let entry = db.state(|s| s.duties[0].clone());
    assert_eq!(entry.status, duty::Status::Missed);
    assert!(!entry.charge_applied);
    assert_eq!(db.state(|s| s.charges.len()), 0);

    db.seed(|s| s.fail_charges = false);

    let resolved = service
        .execute(ResolveElapsedDuties { date: date(MONDAY) })
        .await
        .unwrap();
    assert_eq!(resolved, 1);

    let entry = db.state(|s| s.duties[0].clone());
    assert!(entry.charge_applied);
    assert_eq!(db.state(|s| s.charges.len()), 1);
}

#[tokio::test]
async fn completed_duty_is_not_charged() {
    let db = MockDb::default();
    let prop = property(None);
    let room = room(prop.id, 1);
    db.seed(|s| {
        s.duties.push(log_entry(
            prop.id,
            room.id,
            Some(lodger::Id::new()),
            date("2026-08-23T00:00:00Z"),
            duty::Status::Completed,
        ));
    });
    let (service, _bg) = Service::new(config(), db.clone());

    let resolved = service
        .execute(ResolveElapsedDuties { date: date(MONDAY) })
        .await
        .unwrap();
    assert_eq!(resolved, 0);

    let entry = db.state(|s| s.duties[0].clone());
    assert_eq!(entry.status, duty::Status::Completed);
    assert_eq!(db.state(|s| s.charges.len()), 0);
}

#[tokio::test]
async fn charge_amount_prefers_stored_setting() {
    let db = MockDb::default();
    let prop = property(None);
    let room = room(prop.id, 1);
    db.seed(|s| {
        s.duties.push(log_entry(
            prop.id,
            room.id,
            Some(lodger::Id::new()),
            date("2026-08-23T00:00:00Z"),
            duty::Status::Assigned,
        ));
        s.setting = Some("7.50".to_owned());
    });
    let (service, _bg) = Service::new(config(), db.clone());

    let resolved = service
        .execute(ResolveElapsedDuties { date: date(MONDAY) })
        .await
        .unwrap();
    assert_eq!(resolved, 1);

    let charges = db.state(|s| s.charges.clone());
    assert_eq!(charges[0].amount, "7.50GBP".parse::<Money>().unwrap());
}

#[tokio::test]
async fn unparseable_charge_setting_falls_back_to_configured_fee() {
    let db = MockDb::default();
    let prop = property(None);
    let room = room(prop.id, 1);
    db.seed(|s| {
        s.duties.push(log_entry(
            prop.id,
            room.id,
            Some(lodger::Id::new()),
            date("2026-08-23T00:00:00Z"),
            duty::Status::Assigned,
        ));
        s.setting = Some("a tenner".to_owned());
    });
    let (service, _bg) = Service::new(config(), db.clone());

    let resolved = service
        .execute(ResolveElapsedDuties { date: date(MONDAY) })
        .await
        .unwrap();
    assert_eq!(resolved, 1);

    let charges = db.state(|s| s.charges.clone());
    assert_eq!(charges[0].amount, "10GBP".parse::<Money>().unwrap());
}

#[tokio::test]
async fn full_pass_advances_reminds_and_resolves() {
    let db = MockDb::default();
    let prop = property(None);
    let room = room(prop.id, 1);
    let tenancy = occupied(room.id);
    db.seed(|s| {
        s.properties.push(prop.clone());
        s.rooms.push(room.clone());
        s.tenancies.push(tenancy.clone());
        // Due tomorrow, and elapsed yesterday without being completed.
        s.duties.push(log_entry(
            prop.id,
            room.id,
            Some(tenancy.lodger_id),
            date("2026-08-25T00:00:00Z"),
            duty::Status::Assigned,
        ));
        s.duties.push(log_entry(
            prop.id,
            room.id,
            Some(tenancy.lodger_id),
            date("2026-08-23T00:00:00Z"),
            duty::Status::Assigned,
        ));
    });
    let (service, _bg) = Service::new(config(), db.clone());

    let task = RotateBinDuty::new(config().rotate_bin_duty, service);
    task.execute(Perform(rotate_bin_duty::Run { date: date(MONDAY) }))
        .await
        .unwrap();

    assert_eq!(db.state(|s| s.assignments.len()), 1);
    assert_eq!(db.state(|s| s.notifications.len()), 1);
    assert_eq!(db.state(|s| s.charges.len()), 1);
}
