//! `TableAdmin` over the Bigtable Admin v2 REST/JSON surface.
//!
//! Each trait call blocks on a private current-thread Tokio runtime and issues
//! one HTTP request. List calls follow `nextPageToken`; `wait_for_consistency`
//! polls `checkConsistency` on a fixed interval.

use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use reqwest::Method;
use serde::Deserialize;
use serde::de::{DeserializeOwned, IgnoredAny};
use serde_json::{Value, json};
use tracing::{debug, trace};
use url::Url;

use super::types::{ModificationWire, Snapshot, Table, TableView};
use super::{
    AdminError, AdminResult, ColumnFamilyModification, ConsistencyToken, TableAdmin,
    cluster_name, instance_name, snapshot_name, table_name, validate_id,
};
use crate::config::ClientOptions;

pub struct RestTableAdmin {
    project: String,
    instance: String,
    options: ClientOptions,
    http: reqwest::Client,
    runtime: tokio::runtime::Runtime,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct ListTablesResponse {
    #[serde(default)]
    tables: Vec<Table>,
    #[serde(default)]
    next_page_token: Option<String>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct ListSnapshotsResponse {
    #[serde(default)]
    snapshots: Vec<Snapshot>,
    #[serde(default)]
    next_page_token: Option<String>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct TokenResponse {
    #[serde(default)]
    consistency_token: String,
}

#[derive(Deserialize)]
struct CheckConsistencyResponse {
    #[serde(default)]
    consistent: bool,
}

impl RestTableAdmin {
    /// Build a client bound to `project`/`instance`. No request is sent here.
    pub fn new(project: &str, instance: &str, options: ClientOptions) -> AdminResult<Self> {
        validate_id("project", project)?;
        validate_id("instance", instance)?;
        let runtime = tokio::runtime::Builder::new_current_thread()
            .enable_all()
            .build()?;
        let mut builder = reqwest::Client::builder()
            .timeout(options.timeout)
            .user_agent(concat!("table-admin/", env!("CARGO_PKG_VERSION")));
        if !options.use_proxy {
            builder = builder.no_proxy();
        }
        let http = builder.build()?;
        debug!(
            endpoint = %options.endpoint,
            project,
            instance,
            "table admin client ready"
        );
        Ok(Self {
            project: project.to_string(),
            instance: instance.to_string(),
            options,
            http,
            runtime,
        })
    }

    fn url(&self, resource: &str) -> AdminResult<Url> {
        self.options
            .endpoint
            .join(&format!("v2/{resource}"))
            .map_err(|e| AdminError::InvalidEndpoint(format!("cannot address '{resource}': {e}")))
    }

    fn table(&self, table_id: &str) -> AdminResult<String> {
        validate_id("table", table_id)?;
        Ok(table_name(&self.project, &self.instance, table_id))
    }

    fn cluster(&self, cluster_id: &str) -> AdminResult<String> {
        validate_id("cluster", cluster_id)?;
        Ok(cluster_name(&self.project, &self.instance, cluster_id))
    }

    fn snapshot(&self, cluster_id: &str, snapshot_id: &str) -> AdminResult<String> {
        validate_id("cluster", cluster_id)?;
        validate_id("snapshot", snapshot_id)?;
        Ok(snapshot_name(
            &self.project,
            &self.instance,
            cluster_id,
            snapshot_id,
        ))
    }

    async fn request<T: DeserializeOwned>(
        &self,
        method: Method,
        resource: &str,
        query: &[(&str, &str)],
        body: Option<Value>,
    ) -> AdminResult<T> {
        let url = self.url(resource)?;
        debug!(%method, %url, "admin request");

        let mut req = self.http.request(method, url);
        if !query.is_empty() {
            req = req.query(query);
        }
        if let Some(token) = &self.options.access_token {
            req = req.bearer_auth(token);
        }
        if let Some(body) = body {
            trace!(%body, "request body");
            req = req.json(&body);
        }

        let resp = req.send().await?;
        let status = resp.status();
        let text = resp.text().await?;
        if !status.is_success() {
            return Err(AdminError::Status {
                status: status.as_u16(),
                message: error_message(&text, status.canonical_reason()),
            });
        }
        let text = if text.trim().is_empty() { "{}" } else { &text };
        Ok(serde_json::from_str(text)?)
    }

    fn call<T: DeserializeOwned>(
        &self,
        method: Method,
        resource: &str,
        query: &[(&str, &str)],
        body: Option<Value>,
    ) -> AdminResult<T> {
        self.runtime
            .block_on(self.request(method, resource, query, body))
    }

    async fn check_consistency_async(
        &self,
        table_id: &str,
        token: &ConsistencyToken,
    ) -> AdminResult<bool> {
        let resp: CheckConsistencyResponse = self
            .request(
                Method::POST,
                &format!("{}:checkConsistency", self.table(table_id)?),
                &[],
                Some(json!({ "consistencyToken": token.as_str() })),
            )
            .await?;
        Ok(resp.consistent)
    }

    async fn wait_for_consistency_async(
        &self,
        table_id: &str,
        token: &ConsistencyToken,
    ) -> AdminResult<bool> {
        let max_polls = self.options.max_polls;
        for attempt in 1..=max_polls {
            if self.check_consistency_async(table_id, token).await? {
                debug!(attempt, "table is consistent");
                return Ok(true);
            }
            if attempt < max_polls {
                tokio::time::sleep(self.options.poll_interval).await;
            }
        }
        debug!(max_polls, "gave up waiting for consistency");
        Ok(false)
    }
}

impl TableAdmin for RestTableAdmin {
    fn project(&self) -> &str {
        &self.project
    }

    fn instance_id(&self) -> &str {
        &self.instance
    }

    fn create_table(&self, table_id: &str, config: &Table) -> AdminResult<Table> {
        validate_id("table", table_id)?;
        let parent = instance_name(&self.project, &self.instance);
        self.call(
            Method::POST,
            &format!("{parent}/tables"),
            &[],
            Some(json!({ "tableId": table_id, "table": config })),
        )
    }

    fn list_tables(&self, view: TableView) -> AdminResult<Vec<Table>> {
        let parent = instance_name(&self.project, &self.instance);
        let resource = format!("{parent}/tables");
        let mut tables = Vec::new();
        let mut page_token = String::new();
        loop {
            let mut query = vec![("view", view.as_str())];
            if !page_token.is_empty() {
                query.push(("pageToken", page_token.as_str()));
            }
            let page: ListTablesResponse = self.call(Method::GET, &resource, &query, None)?;
            tables.extend(page.tables);
            match page.next_page_token.filter(|t| !t.is_empty()) {
                Some(next) => page_token = next,
                None => break,
            }
        }
        Ok(tables)
    }

    fn get_table(&self, table_id: &str, view: TableView) -> AdminResult<Table> {
        self.call(
            Method::GET,
            &self.table(table_id)?,
            &[("view", view.as_str())],
            None,
        )
    }

    fn delete_table(&self, table_id: &str) -> AdminResult<()> {
        let _: IgnoredAny = self.call(Method::DELETE, &self.table(table_id)?, &[], None)?;
        Ok(())
    }

    fn modify_column_families(
        &self,
        table_id: &str,
        modifications: &[ColumnFamilyModification],
    ) -> AdminResult<Table> {
        let wire: Vec<ModificationWire> =
            modifications.iter().map(ModificationWire::from).collect();
        self.call(
            Method::POST,
            &format!("{}:modifyColumnFamilies", self.table(table_id)?),
            &[],
            Some(json!({ "modifications": wire })),
        )
    }

    fn drop_all_rows(&self, table_id: &str) -> AdminResult<()> {
        let _: IgnoredAny = self.call(
            Method::POST,
            &format!("{}:dropRowRange", self.table(table_id)?),
            &[],
            Some(json!({ "deleteAllDataFromTable": true })),
        )?;
        Ok(())
    }

    fn drop_rows_by_prefix(&self, table_id: &str, prefix: &[u8]) -> AdminResult<()> {
        let _: IgnoredAny = self.call(
            Method::POST,
            &format!("{}:dropRowRange", self.table(table_id)?),
            &[],
            Some(json!({ "rowKeyPrefix": STANDARD.encode(prefix) })),
        )?;
        Ok(())
    }

    fn generate_consistency_token(&self, table_id: &str) -> AdminResult<ConsistencyToken> {
        let resp: TokenResponse = self.call(
            Method::POST,
            &format!("{}:generateConsistencyToken", self.table(table_id)?),
            &[],
            Some(json!({})),
        )?;
        Ok(ConsistencyToken::new(resp.consistency_token))
    }

    fn check_consistency(&self, table_id: &str, token: &ConsistencyToken) -> AdminResult<bool> {
        self.runtime
            .block_on(self.check_consistency_async(table_id, token))
    }

    fn wait_for_consistency(
        &self,
        table_id: &str,
        token: &ConsistencyToken,
    ) -> AdminResult<bool> {
        self.runtime
            .block_on(self.wait_for_consistency_async(table_id, token))
    }

    fn get_snapshot(&self, cluster_id: &str, snapshot_id: &str) -> AdminResult<Snapshot> {
        self.call(Method::GET, &self.snapshot(cluster_id, snapshot_id)?, &[], None)
    }

    fn list_snapshots(&self, cluster_id: &str) -> AdminResult<Vec<Snapshot>> {
        let resource = format!("{}/snapshots", self.cluster(cluster_id)?);
        let mut snapshots = Vec::new();
        let mut page_token = String::new();
        loop {
            let query: Vec<(&str, &str)> = if page_token.is_empty() {
                Vec::new()
            } else {
                vec![("pageToken", page_token.as_str())]
            };
            let page: ListSnapshotsResponse = self.call(Method::GET, &resource, &query, None)?;
            snapshots.extend(page.snapshots);
            match page.next_page_token.filter(|t| !t.is_empty()) {
                Some(next) => page_token = next,
                None => break,
            }
        }
        Ok(snapshots)
    }

    fn delete_snapshot(&self, cluster_id: &str, snapshot_id: &str) -> AdminResult<()> {
        let name = self.snapshot(cluster_id, snapshot_id)?;
        let _: IgnoredAny = self.call(Method::DELETE, &name, &[], None)?;
        Ok(())
    }
}

/// Pull `error.message` out of a Google API error body, falling back to the
/// raw body or the HTTP reason phrase.
fn error_message(body: &str, reason: Option<&str>) -> String {
    if let Ok(v) = serde_json::from_str::<Value>(body)
        && let Some(msg) = v
            .get("error")
            .and_then(|e| e.get("message"))
            .and_then(|m| m.as_str())
    {
        return msg.to_string();
    }
    let raw = body.trim();
    if raw.is_empty() {
        reason.unwrap_or("unknown error").to_string()
    } else {
        raw.to_string()
    }
}
