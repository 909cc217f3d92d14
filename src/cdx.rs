use reqwest::{header, Client, StatusCode};
use serde_json::Value;

use crate::{
    types::{RawSnapshots, SnapshotError},
    utils::{normalize_target, CDX_URL, SNAPSHOT_FIELDS, SNAPSHOT_LIMIT, USER_AGENT},
};

pub struct CdxClient {
    client: Client,
    url: String,
    limit: u32,
}

#[derive(Builder, Debug)]
#[builder(setter(into))]
pub struct CdxOptions {
    #[builder(default = "self.default_url()")]
    url: String,
    #[builder(default = "self.default_client()")]
    client: Client,
    #[builder(default = "SNAPSHOT_LIMIT")]
    limit: u32,
}

impl CdxOptions {
    pub fn default_builder() -> CdxOptionsBuilder {
        CdxOptionsBuilder::default()
    }
}

impl CdxOptionsBuilder {
    fn default_url(&self) -> String {
        CDX_URL.clone()
    }
    fn default_client(&self) -> Client {
        Client::new()
    }
}

impl CdxClient {
    pub fn new(lo: CdxOptions) -> Self {
        CdxClient {
            client: lo.client,
            url: lo.url,
            limit: lo.limit,
        }
    }

    // One independent upstream query per call; nothing is cached or retried.
    pub async fn fetch_snapshots(&self, target: &str) -> Result<RawSnapshots, SnapshotError> {
        let target = target.trim();
        if target.is_empty() {
            return Err(SnapshotError::InvalidInput);
        }

        let clean = normalize_target(target);
        let limit = self.limit.to_string();
        debug!("requesting snapshots for {} from {}", clean, self.url);

        let res = self
            .client
            .get(&self.url)
            .header(header::USER_AGENT, USER_AGENT)
            .query(&[
                ("url", clean.as_str()),
                ("output", "json"),
                ("fl", SNAPSHOT_FIELDS),
                ("limit", limit.as_str()),
            ])
            .send()
            .await?;

        let status = res.status();
        debug!("archive status: {}", status);

        if status != StatusCode::OK {
            return Err(SnapshotError::UpstreamError(status.as_u16()));
        }

        let body = res.text().await?;
        debug!("response length: {} bytes", body.len());

        parse_snapshot_body(&body)
    }
}

fn parse_snapshot_body(body: &str) -> Result<RawSnapshots, SnapshotError> {
    let value: Value = serde_json::from_str(body).map_err(|e| {
        error!("json parse error: {}", e);
        SnapshotError::MalformedResponse
    })?;

    let rows = match value.as_array() {
        Some(rows) => rows,
        None => return Err(SnapshotError::MalformedResponse),
    };

    // header row + at least one data row
    if rows.len() < 2 {
        return Err(SnapshotError::EmptyResult);
    }

    let mut records = Vec::with_capacity(rows.len());
    for row in rows {
        let cells = row.as_array().ok_or(SnapshotError::MalformedResponse)?;
        let cells = cells
            .iter()
            .map(|c| {
                c.as_str()
                    .map(String::from)
                    .ok_or(SnapshotError::MalformedResponse)
            })
            .collect::<Result<Vec<String>, SnapshotError>>()?;
        records.push(cells);
    }

    info!("found {} snapshots", records.len() - 1);
    Ok(records)
}
