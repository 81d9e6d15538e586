//! TAN media and manual TAN handling

use super::FinTsClient;
use crate::connection::ConnectionDetails;
use crate::dialog::FnStep;
use crate::error::Result;
use crate::response::extract;
use crate::response::{DialogResult, Response};
use crate::segment::builders;

impl FinTsClient {
    /// Names of the user's TAN media (HKTAB)
    pub async fn request_tan_medium_names(&mut self) -> Result<DialogResult<Vec<String>>> {
        let step = FnStep::new(
            "HKTAB",
            |_: &ConnectionDetails, _: Option<&str>| Ok(builders::hktab()),
            |response: &Response, out: &mut Vec<String>| {
                out.extend(extract::tan_media(response));
                Ok(())
            },
        );
        self.execute(&step).await
    }

    /// Medium named in HKTAN from now on
    pub fn set_tan_medium(&mut self, medium: impl Into<String>) {
        self.dialog.set_tan_medium(Some(medium.into()));
    }

    /// Answer the pending challenge directly instead of through the prompt
    pub async fn submit_tan(&mut self, tan: &str) -> Result<DialogResult> {
        self.dialog.submit_tan(tan).await
    }

    pub async fn submit_tan_with_medium(&mut self, tan: &str, medium: &str) -> Result<DialogResult> {
        self.dialog.submit_tan_with_medium(tan, Some(medium)).await
    }
}
