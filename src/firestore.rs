use chrono::{DateTime, SecondsFormat, Utc};
use reqwest::{Client, StatusCode};
use serde::Deserialize;
use serde_json::{json, Map, Value};

use crate::auth::FirebaseAuth;
use crate::error::{Error, Result};

const BASE_URL: &str = "https://firestore.googleapis.com/v1";

#[derive(Clone)]
pub struct FirestoreClient {
    client: Client,
    auth: FirebaseAuth,
    project_id: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Document {
    pub name: String,
    pub fields: Option<Map<String, Value>>,
    pub create_time: Option<String>,
    pub update_time: Option<String>,
}

#[derive(Debug, Deserialize)]
struct RunQueryResponse {
    document: Option<Document>,
}

/// Half-open `[start, end)` bound on a timestamp field.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TimeRange {
    pub start: DateTime<Utc>,
    pub end: Option<DateTime<Utc>>,
}

impl TimeRange {
    pub fn since(start: DateTime<Utc>) -> Self {
        Self { start, end: None }
    }

    pub fn between(start: DateTime<Utc>, end: DateTime<Utc>) -> Self {
        Self {
            start,
            end: Some(end),
        }
    }

    pub fn contains(&self, ts: DateTime<Utc>) -> bool {
        ts >= self.start && self.end.map_or(true, |end| ts < end)
    }
}

impl FirestoreClient {
    pub fn new(auth: FirebaseAuth, project_id: impl Into<String>) -> Self {
        Self {
            client: Client::new(),
            auth,
            project_id: project_id.into(),
        }
    }

    fn documents_base(&self) -> String {
        format!(
            "{}/projects/{}/databases/(default)/documents",
            BASE_URL, self.project_id
        )
    }

    /// Fetch a document, or `None` if it does not exist.
    pub async fn get_document(&self, path: &str) -> Result<Option<Document>> {
        let token = self.auth.get_id_token().await?;
        let url = format!("{}/{}", self.documents_base(), path);

        let resp = self.client.get(&url).bearer_auth(&token).send().await?;

        if resp.status() == StatusCode::NOT_FOUND {
            return Ok(None);
        }
        if !resp.status().is_success() {
            let status = resp.status();
            let body = resp.text().await.unwrap_or_default();
            return Err(Error::Firestore(format!(
                "GET {} failed: {} - {}",
                path, status, body
            )));
        }

        Ok(Some(resp.json().await?))
    }

    pub async fn run_query(
        &self,
        parent_path: &str,
        structured_query: Value,
    ) -> Result<Vec<Document>> {
        let token = self.auth.get_id_token().await?;
        let url = format!("{}/{}:runQuery", self.documents_base(), parent_path);

        let resp = self
            .client
            .post(&url)
            .bearer_auth(&token)
            .json(&json!({ "structuredQuery": structured_query }))
            .send()
            .await?;

        if !resp.status().is_success() {
            let status = resp.status();
            let body = resp.text().await.unwrap_or_default();
            return Err(Error::Firestore(format!(
                "runQuery {} failed: {} - {}",
                parent_path, status, body
            )));
        }

        let results: Vec<RunQueryResponse> = resp.json().await?;
        Ok(results.into_iter().filter_map(|r| r.document).collect())
    }

    /// List every document of a sub-collection under `parent_path`,
    /// optionally restricted to a timestamp range on `field`.
    pub async fn query_collection(
        &self,
        parent_path: &str,
        collection_id: &str,
        range: Option<(&str, TimeRange)>,
    ) -> Result<Vec<Document>> {
        let mut query = json!({ "from": [{ "collectionId": collection_id }] });
        if let Some((field, range)) = range {
            query["where"] = time_range_filter(field, &range);
        }
        self.run_query(parent_path, query).await
    }
}

fn timestamp_value(ts: DateTime<Utc>) -> Value {
    json!({ "timestampValue": ts.to_rfc3339_opts(SecondsFormat::Micros, true) })
}

fn field_filter(field: &str, op: &str, value: Value) -> Value {
    json!({
        "fieldFilter": {
            "field": { "fieldPath": field },
            "op": op,
            "value": value
        }
    })
}

/// Structured-query `where` clause for a [`TimeRange`].
pub fn time_range_filter(field: &str, range: &TimeRange) -> Value {
    let lower = field_filter(field, "GREATER_THAN_OR_EQUAL", timestamp_value(range.start));
    match range.end {
        None => lower,
        Some(end) => json!({
            "compositeFilter": {
                "op": "AND",
                "filters": [lower, field_filter(field, "LESS_THAN", timestamp_value(end))]
            }
        }),
    }
}

/// Parse a Firestore typed value into a serde_json::Value.
pub fn parse_firestore_value(val: &Value) -> Value {
    let Some(obj) = val.as_object() else {
        return val.clone();
    };
    let Some((kind, inner)) = obj.iter().next() else {
        return Value::Null;
    };

    match kind.as_str() {
        // Firestore sends 64-bit integers as strings
        "integerValue" => inner
            .as_str()
            .and_then(|s| s.parse::<i64>().ok())
            .map(Value::from)
            .unwrap_or_else(|| inner.clone()),
        "nullValue" => Value::Null,
        "mapValue" => inner
            .get("fields")
            .map(parse_firestore_fields)
            .unwrap_or_else(|| json!({})),
        "arrayValue" => Value::Array(
            inner
                .get("values")
                .and_then(|v| v.as_array())
                .map(|values| values.iter().map(parse_firestore_value).collect())
                .unwrap_or_default(),
        ),
        "stringValue" | "doubleValue" | "booleanValue" | "timestampValue" | "referenceValue"
        | "geoPointValue" | "bytesValue" => inner.clone(),
        _ => val.clone(),
    }
}

/// Parse Firestore document fields into a flat JSON object.
pub fn parse_firestore_fields(fields: &Value) -> Value {
    match fields.as_object() {
        Some(map) => Value::Object(
            map.iter()
                .map(|(key, val)| (key.clone(), parse_firestore_value(val)))
                .collect(),
        ),
        None => Value::Null,
    }
}

/// Parse a full document into a JSON object with `_id` and parsed fields.
pub fn parse_document(doc: &Document) -> Value {
    let mut result = Map::new();
    if let Some(id) = doc.name.rsplit('/').next() {
        result.insert("_id".to_string(), json!(id));
    }

    if let Some(fields) = &doc.fields {
        for (key, val) in fields {
            result.insert(key.clone(), parse_firestore_value(val));
        }
    }

    Value::Object(result)
}
