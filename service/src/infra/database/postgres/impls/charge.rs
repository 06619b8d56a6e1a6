//! [`Charge`]-related [`Database`] implementations.

use common::operations::Insert;
use tracerr::Traced;

use crate::{
    domain::Charge,
    infra::{
        database::{self, postgres::Connection, Postgres},
        Database,
    },
};

impl<C> Database<Insert<Charge>> for Postgres<C>
where
    C: Connection,
{
    type Ok = ();
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        Insert(charge): Insert<Charge>,
    ) -> Result<Self::Ok, Self::Err> {
        let Charge {
            id,
            lodger_id,
            property_id,
            kind,
            amount,
            status,
            charged_on,
            description,
        } = charge;

        const SQL: &str = "\
            INSERT INTO extra_charges (\
                id, lodger_id, property_id, kind, \
                amount, currency, status, \
                charged_on, description \
            ) VALUES (\
                $1::UUID, $2::UUID, $3::UUID, $4::INT2, \
                $5::NUMERIC, $6::INT2, $7::INT2, \
                $8::TIMESTAMPTZ, $9::VARCHAR \
            )";
        self.exec(
            SQL,
            &[
                &id,
                &lodger_id,
                &property_id,
                &kind,
                &amount.amount,
                &amount.currency,
                &status,
                &charged_on,
                &description,
            ],
        )
        .await
        .map_err(tracerr::wrap!())
        .map(drop)
    }
}
