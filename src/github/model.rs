use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::HashMap;

#[derive(Serialize, Debug)]
pub struct GraphQlRequest<'a> {
    pub query: &'a str,
}

#[derive(Deserialize, Debug)]
pub struct GraphQlResponse {
    pub data: Option<HashMap<String, Option<Repository>>>,
    #[serde(default)]
    pub errors: Vec<Value>,
}

#[derive(Deserialize, Debug)]
pub struct Repository {
    pub releases: ReleaseConnection,
}

#[derive(Deserialize, Debug)]
pub struct ReleaseConnection {
    #[serde(default)]
    pub nodes: Vec<ReleaseNode>,
}

#[derive(Deserialize, Debug)]
#[serde(rename_all = "camelCase")]
pub struct ReleaseNode {
    pub url: String,
    pub published_at: Option<DateTime<Utc>>,
    pub tag: Option<Tag>,
}

#[derive(Deserialize, Debug)]
pub struct Tag {
    pub name: String,
}
