//! Statement retrieval (HKKAZ, HKCAZ)

use chrono::NaiveDate;

use super::FinTsClient;
use crate::connection::ConnectionDetails;
use crate::dialog::FnStep;
use crate::error::Result;
use crate::response::extract;
use crate::response::{DialogResult, Response};
use crate::segment::builders::{self, CamtVersion};
use crate::statement::{CamtDocuments, DecodedStatements, StatementDecoder, SwiftStatements};

impl FinTsClient {
    /// MT940 (booked) and MT942 (pending) statements, all pages
    pub async fn transactions(
        &mut self,
        from: Option<NaiveDate>,
        to: Option<NaiveDate>,
    ) -> Result<DialogResult<SwiftStatements>> {
        let step = FnStep::new(
            "HKKAZ",
            move |conn: &ConnectionDetails, startpoint: Option<&str>| {
                builders::hkkaz(conn, from, to, startpoint)
            },
            |response: &Response, out: &mut SwiftStatements| {
                out.append(extract::swift_payload(response));
                Ok(())
            },
        )
        .with_pagination();
        self.execute(&step).await
    }

    /// [`transactions`](Self::transactions) run through a statement decoder
    pub async fn transactions_decoded<D: StatementDecoder>(
        &mut self,
        decoder: &D,
        from: Option<NaiveDate>,
        to: Option<NaiveDate>,
    ) -> Result<DialogResult<DecodedStatements<D::Record>>> {
        let result = self.transactions(from, to).await?;
        let decoded = match &result.data {
            Some(statements) => statements.decode(decoder)?,
            None => return Ok(result.typed()),
        };
        Ok(result.with_data(decoded))
    }

    /// Booked records of all pages as one flat list; pending (MT942) data
    /// is dropped
    pub async fn transactions_simple<D: StatementDecoder>(
        &mut self,
        decoder: &D,
        from: Option<NaiveDate>,
        to: Option<NaiveDate>,
    ) -> Result<DialogResult<Vec<D::Record>>> {
        let mut result = self.transactions_decoded(decoder, from, to).await?;
        let booked = result.data.take().map(|decoded| decoded.booked);
        Ok(match booked {
            Some(booked) => result.with_data(booked),
            None => result.typed(),
        })
    }

    /// camt.052/053 documents, all pages
    pub async fn transactions_camt(
        &mut self,
        camt: CamtVersion,
        from: Option<NaiveDate>,
        to: Option<NaiveDate>,
    ) -> Result<DialogResult<CamtDocuments>> {
        let step = FnStep::new(
            "HKCAZ",
            move |conn: &ConnectionDetails, startpoint: Option<&str>| {
                builders::hkcaz(conn, camt, from, to, startpoint)
            },
            |response: &Response, out: &mut CamtDocuments| {
                out.extend(extract::camt_documents(response));
                Ok(())
            },
        )
        .with_pagination();
        self.execute(&step).await
    }
}
