//! Hosted backend speaking the PostgREST table dialect.

use anyhow::{Context, Result, anyhow, bail};
use async_trait::async_trait;
use reqwest::{RequestBuilder, Response, StatusCode};
use serde::Deserialize;
use serde_json::{Value, json};
use tracing::{debug, instrument};

use super::http_client;
use crate::core::auth::{Session, ensure_allowed};
use crate::core::config::{AppConfig, BackendConfig};
use crate::core::error::AppError;
use crate::core::records::{Repository, Table};

pub struct RestBackend {
    base_url: String,
    anon_key: String,
    session: Session,
}

#[derive(Debug, Deserialize)]
struct TokenUser {
    id: String,
    email: Option<String>,
}

#[derive(Debug, Deserialize)]
struct TokenResponse {
    access_token: String,
    user: TokenUser,
}

fn backend_config(config: &AppConfig) -> Result<&BackendConfig> {
    config
        .backend
        .as_ref()
        .context("No backend configured. Add a `backend` section to the config file")
}

/// Exchanges email and password for a session.
///
/// Emails outside the allowlist are refused before anything is sent.
#[instrument(skip(config, password))]
pub async fn sign_in(config: &AppConfig, email: &str, password: &str) -> Result<Session> {
    ensure_allowed(config, email)?;
    let backend = backend_config(config)?;
    let url = format!(
        "{}/auth/v1/token?grant_type=password",
        backend.url.trim_end_matches('/')
    );

    let response = http_client()?
        .post(&url)
        .header("apikey", &backend.anon_key)
        .json(&json!({ "email": email.trim(), "password": password }))
        .send()
        .await
        .map_err(|e| anyhow!("Request error: {} during sign-in", e))?;

    match response.status() {
        s if s.is_success() => {}
        StatusCode::BAD_REQUEST | StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => {
            return Err(AppError::Unauthorized.into());
        }
        _ => return Err(backend_error(response).await.into()),
    }

    let token: TokenResponse = response
        .json()
        .await
        .context("Failed to parse sign-in response")?;
    debug!("Signed in as user {}", token.user.id);
    Ok(Session {
        access_token: token.access_token,
        email: token.user.email.unwrap_or_else(|| email.trim().to_string()),
        user_id: token.user.id,
    })
}

async fn backend_error(response: Response) -> AppError {
    let status = response.status();
    if status == StatusCode::UNAUTHORIZED || status == StatusCode::FORBIDDEN {
        return AppError::Unauthorized;
    }
    let text = response.text().await.unwrap_or_default();
    let message = serde_json::from_str::<Value>(&text)
        .ok()
        .and_then(|v| {
            v.get("message")
                .or_else(|| v.get("msg"))
                .and_then(Value::as_str)
                .map(str::to_string)
        })
        .unwrap_or(text);
    AppError::Backend {
        status: status.as_u16(),
        message,
    }
}

impl RestBackend {
    pub fn new(config: &AppConfig, session: Session) -> Result<Self> {
        let backend = backend_config(config)?;
        Ok(RestBackend {
            base_url: backend.url.trim_end_matches('/').to_string(),
            anon_key: backend.anon_key.clone(),
            session,
        })
    }

    fn table_url(&self, table: Table) -> String {
        format!("{}/rest/v1/{}", self.base_url, table.as_str())
    }

    fn row_url(&self, table: Table, id: &str) -> Result<reqwest::Url> {
        Ok(reqwest::Url::parse_with_params(
            &self.table_url(table),
            &[("id", format!("eq.{id}"))],
        )?)
    }

    fn authorized(&self, request: RequestBuilder) -> RequestBuilder {
        request
            .header("apikey", &self.anon_key)
            .bearer_auth(&self.session.access_token)
            .header("Prefer", "return=representation")
    }

    async fn send(&self, request: RequestBuilder) -> Result<Vec<Value>> {
        let response = self
            .authorized(request)
            .send()
            .await
            .map_err(|e| anyhow!("Request error: {}", e))?;
        if !response.status().is_success() {
            return Err(backend_error(response).await.into());
        }
        if response.status() == StatusCode::NO_CONTENT {
            return Ok(Vec::new());
        }
        response
            .json()
            .await
            .context("Failed to parse backend response")
    }

    fn single(rows: Vec<Value>, table: Table, id: &str) -> Result<Value> {
        rows.into_iter().next().ok_or_else(|| {
            AppError::NotFound {
                table: table.to_string(),
                id: id.to_string(),
            }
            .into()
        })
    }
}

#[async_trait]
impl Repository for RestBackend {
    #[instrument(skip(self))]
    async fn select(&self, table: Table) -> Result<Vec<Value>> {
        let url = format!("{}?select=*", self.table_url(table));
        let rows = self.send(http_client()?.get(url)).await?;
        debug!("Fetched {} rows from {}", rows.len(), table);
        Ok(rows)
    }

    async fn insert(&self, table: Table, mut row: Value) -> Result<Value> {
        let Some(obj) = row.as_object_mut() else {
            bail!("Rows must be JSON objects");
        };
        if table == Table::Profiles {
            obj.entry("id")
                .or_insert_with(|| Value::String(self.session.user_id.clone()));
        } else {
            obj.insert(
                "user_id".to_string(),
                Value::String(self.session.user_id.clone()),
            );
        }
        let rows = self
            .send(http_client()?.post(self.table_url(table)).json(&row))
            .await?;
        Self::single(rows, table, "new")
    }

    async fn update(&self, table: Table, id: &str, mut row: Value) -> Result<Value> {
        if let Some(obj) = row.as_object_mut() {
            obj.remove("id");
        }
        let rows = self
            .send(http_client()?.patch(self.row_url(table, id)?).json(&row))
            .await?;
        Self::single(rows, table, id)
    }

    async fn delete(&self, table: Table, id: &str) -> Result<()> {
        let rows = self
            .send(http_client()?.delete(self.row_url(table, id)?))
            .await?;
        Self::single(rows, table, id).map(|_| ())
    }
}
