//! Blocking HTTP client for the optimizer endpoints.

use std::time::Duration;

use tracing::debug;

use crate::dto::{
    InitRequest, InitResponse, ItemResponse, OrderBatch, PickerSchedulesResponse,
};
use crate::{OptimError, OptimResult};

/// Thin wrapper over `reqwest::blocking` with the endpoint paths baked in.
///
/// The coordination loop is single-threaded and synchronous; a decision is
/// not usable until the response arrives, so blocking calls are the honest
/// model.  A request timeout bounds how long one decision cycle can stall.
pub struct OptimizerClient {
    http: reqwest::blocking::Client,
    base: String,
}

impl OptimizerClient {
    /// `base` is the service root, e.g. `http://localhost:5000`.
    pub fn new(base: impl Into<String>, timeout: Duration) -> OptimResult<Self> {
        let http = reqwest::blocking::Client::builder()
            .timeout(timeout)
            .build()?;
        Ok(Self { http, base: base.into().trim_end_matches('/').to_string() })
    }

    /// One-time setup.  Any `STATUS` other than an OK-ish marker is a
    /// protocol violation.
    pub fn init(&self, request: &InitRequest) -> OptimResult<()> {
        let response: InitResponse = self.post("/init", request)?;
        if response.status.eq_ignore_ascii_case("ok")
            || response.status.eq_ignore_ascii_case("success")
        {
            Ok(())
        } else {
            Err(OptimError::Protocol(format!(
                "init rejected with STATUS {:?}",
                response.status
            )))
        }
    }

    /// Which pending order the calling station should take.
    /// Negative means "none right now".
    pub fn get_order(&self, batch: &OrderBatch) -> OptimResult<i64> {
        self.post("/get_order", batch)
    }

    /// The next pick address for the calling station.
    pub fn get_item(&self, batch: &OrderBatch) -> OptimResult<String> {
        let response: ItemResponse = self.post("/get_item", batch)?;
        Ok(response.item)
    }

    /// Per-picker ordered `(item, bot)` assignments.
    pub fn get_picker_schedules(
        &self,
        batch: &OrderBatch,
    ) -> OptimResult<PickerSchedulesResponse> {
        self.post("/get_picker_schedules", batch)
    }

    fn post<Req, Resp>(&self, path: &str, body: &Req) -> OptimResult<Resp>
    where
        Req: serde::Serialize + ?Sized,
        Resp: serde::de::DeserializeOwned,
    {
        let url = format!("{}{path}", self.base);
        debug!(%url, "optimizer request");
        let response = self.http.post(&url).json(body).send()?;
        if !response.status().is_success() {
            return Err(OptimError::Protocol(format!(
                "{path} returned HTTP {}",
                response.status()
            )));
        }
        Ok(response.json()?)
    }
}
