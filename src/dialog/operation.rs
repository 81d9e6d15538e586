//! Operation steps driven by the dialog orchestrator
//!
//! An operation only knows how to build its request segment and how to fold
//! one response page into its output. Initialization, SCA, pagination and
//! dialog end are handled once in [`Dialog::run`](super::Dialog::run).

use std::marker::PhantomData;

use crate::connection::ConnectionDetails;
use crate::error::Result;
use crate::response::Response;
use crate::segment::Segment;

pub trait OperationStep: Send + Sync {
    type Output: Default + Send;

    /// Segment id of the request, e.g. `HKKAZ`; also the HKTAN reference
    fn code(&self) -> &'static str;

    /// Follow continuation markers (code 3040) until exhausted
    fn paginated(&self) -> bool {
        false
    }

    /// Request segment for one page, `startpoint` set from the second page on
    fn build(&self, conn: &ConnectionDetails, startpoint: Option<&str>) -> Result<Segment>;

    /// Merge one response page into the output
    fn collect(&self, response: &Response, output: &mut Self::Output) -> Result<()>;
}

/// Operation step made of two closures
pub struct FnStep<O, B, C> {
    code: &'static str,
    paginated: bool,
    build: B,
    collect: C,
    _output: PhantomData<fn() -> O>,
}

impl<O, B, C> FnStep<O, B, C>
where
    O: Default + Send,
    B: Fn(&ConnectionDetails, Option<&str>) -> Result<Segment> + Send + Sync,
    C: Fn(&Response, &mut O) -> Result<()> + Send + Sync,
{
    pub fn new(code: &'static str, build: B, collect: C) -> Self {
        Self {
            code,
            paginated: false,
            build,
            collect,
            _output: PhantomData,
        }
    }

    pub fn with_pagination(mut self) -> Self {
        self.paginated = true;
        self
    }
}

impl<O, B, C> OperationStep for FnStep<O, B, C>
where
    O: Default + Send,
    B: Fn(&ConnectionDetails, Option<&str>) -> Result<Segment> + Send + Sync,
    C: Fn(&Response, &mut O) -> Result<()> + Send + Sync,
{
    type Output = O;

    fn code(&self) -> &'static str {
        self.code
    }

    fn paginated(&self) -> bool {
        self.paginated
    }

    fn build(&self, conn: &ConnectionDetails, startpoint: Option<&str>) -> Result<Segment> {
        (self.build)(conn, startpoint)
    }

    fn collect(&self, response: &Response, output: &mut O) -> Result<()> {
        (self.collect)(response, output)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::segment::builders;

    #[test]
    fn test_fn_step() {
        let step = FnStep::new(
            "HKTAB",
            |_: &ConnectionDetails, _: Option<&str>| Ok(builders::hktab()),
            |resp: &Response, out: &mut Vec<String>| {
                out.extend(crate::response::extract::tan_media(resp));
                Ok(())
            },
        );
        assert_eq!(step.code(), "HKTAB");
        assert!(!step.paginated());

        let seg = step.build(&ConnectionDetails::default(), None).unwrap();
        assert_eq!(seg.name(), "HKTAB");

        let resp = Response::parse(b"HITAB:4:4:3+0+A:1:::::::::::Handy'").unwrap();
        let mut out = Vec::new();
        step.collect(&resp, &mut out).unwrap();
        assert_eq!(out, vec!["Handy"]);
    }

    #[test]
    fn test_paginated_flag() {
        let step = FnStep::new(
            "HKKAZ",
            |conn: &ConnectionDetails, sp: Option<&str>| builders::hkkaz(conn, None, None, sp),
            |_: &Response, _: &mut ()| Ok(()),
        )
        .with_pagination();
        assert!(step.paginated());
    }
}
