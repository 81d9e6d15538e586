//! SEPA orders (HKCCS, HKCSE, HKCCM, HKCME, HKDSE, HKDME) and scheduled
//! transfer management (HKCSB, HKCSA, HKCSL)
//!
//! The pain XML is built by the caller; these operations only carry it.

use rust_decimal::Decimal;

use super::FinTsClient;
use crate::connection::ConnectionDetails;
use crate::dialog::FnStep;
use crate::error::Result;
use crate::response::extract::{self, TerminatedTransfer};
use crate::response::{DialogResult, Response};
use crate::segment::Segment;
use crate::segment::builders::{self, PainDocument};

fn order<B>(code: &'static str, build: B) -> FnStep<(), B, fn(&Response, &mut ()) -> Result<()>>
where
    B: Fn(&ConnectionDetails, Option<&str>) -> Result<Segment> + Send + Sync,
{
    fn ignore(_: &Response, _: &mut ()) -> Result<()> {
        Ok(())
    }
    FnStep::new(code, build, ignore as fn(&Response, &mut ()) -> Result<()>)
}

impl FinTsClient {
    /// Single credit transfer
    pub async fn transfer(&mut self, pain: &PainDocument) -> Result<DialogResult> {
        let step = order("HKCCS", |conn: &ConnectionDetails, _: Option<&str>| {
            builders::hkccs(conn, pain)
        });
        self.execute(&step).await
    }

    /// Single direct debit
    pub async fn collect(&mut self, pain: &PainDocument) -> Result<DialogResult> {
        let step = order("HKDSE", |conn: &ConnectionDetails, _: Option<&str>| {
            builders::hkdse(conn, pain)
        });
        self.execute(&step).await
    }

    /// Collective direct debit
    pub async fn collective_collect(&mut self, pain: &PainDocument) -> Result<DialogResult> {
        let step = order("HKDME", |conn: &ConnectionDetails, _: Option<&str>| {
            builders::hkdme(conn, pain)
        });
        self.execute(&step).await
    }

    /// Collective scheduled credit transfer; `total` is the control sum
    pub async fn collective_transfer_terminated(
        &mut self,
        pain: &PainDocument,
        total: Decimal,
    ) -> Result<DialogResult> {
        let step = order("HKCME", move |conn: &ConnectionDetails, _: Option<&str>| {
            builders::hkcme(conn, pain, total)
        });
        self.execute(&step).await
    }

    /// Single scheduled credit transfer; the pain carries the execution date
    pub async fn transfer_terminated(&mut self, pain: &PainDocument) -> Result<DialogResult> {
        let step = order("HKCSE", |conn: &ConnectionDetails, _: Option<&str>| {
            builders::hkcse(conn, pain)
        });
        self.execute(&step).await
    }

    /// Collective credit transfer; `total` is the control sum
    pub async fn collective_transfer(
        &mut self,
        pain: &PainDocument,
        total: Decimal,
    ) -> Result<DialogResult> {
        let step = order("HKCCM", move |conn: &ConnectionDetails, _: Option<&str>| {
            builders::hkccm(conn, pain, total)
        });
        self.execute(&step).await
    }

    /// Scheduled transfers the bank holds for the account, all pages
    pub async fn terminated_transfers(&mut self) -> Result<DialogResult<Vec<TerminatedTransfer>>> {
        let step = FnStep::new(
            "HKCSB",
            |conn: &ConnectionDetails, startpoint: Option<&str>| builders::hkcsb(conn, startpoint),
            |response: &Response, out: &mut Vec<TerminatedTransfer>| {
                out.extend(extract::terminated_transfers(response));
                Ok(())
            },
        )
        .with_pagination();
        self.execute(&step).await
    }

    /// Replace the scheduled transfer `order_id` by `pain`
    pub async fn modify_terminated_transfer(
        &mut self,
        order_id: &str,
        pain: &PainDocument,
    ) -> Result<DialogResult> {
        let step = order("HKCSA", move |conn: &ConnectionDetails, _: Option<&str>| {
            builders::hkcsa(conn, order_id, pain)
        });
        self.execute(&step).await
    }

    /// Delete the scheduled transfer `order_id`
    pub async fn delete_terminated_transfer(
        &mut self,
        order_id: &str,
        pain: &PainDocument,
    ) -> Result<DialogResult> {
        let step = order("HKCSL", move |conn: &ConnectionDetails, _: Option<&str>| {
            builders::hkcsl(conn, order_id, pain)
        });
        self.execute(&step).await
    }
}
