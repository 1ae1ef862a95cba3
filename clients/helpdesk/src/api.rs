//! Typed HTTP client for the ticketing backend
//!
//! Thin wrapper over `reqwest` that maps each endpoint's failure modes onto
//! the client error taxonomy. Authorization failures never surface inline;
//! callers use them to redirect to the login entry point.

use reqwest::{Client, StatusCode};
use serde_json::Value;
use tracing::{error, warn};

use crate::config::BackendConfig;
use crate::error::{FetchError, UpdateError};
use crate::models::{StaffRef, Status, StatusUpdate, Ticket, TicketUpdate};

/// Raw pieces of a login response, interpreted by the session manager
#[derive(Debug)]
pub struct LoginResponseParts {
    pub status: StatusCode,
    /// `Authorization` response header, if present
    pub auth_header: Option<String>,
    /// `Jwt-Token` response header, if present
    pub jwt_header: Option<String>,
    /// Response body, `Null` when absent or not JSON
    pub body: Value,
}

/// Client for the ticketing backend endpoints
#[derive(Clone)]
pub struct ApiClient {
    http: Client,
    base_url: String,
}

impl ApiClient {
    /// Build a client from backend configuration
    pub fn new(config: &BackendConfig) -> Result<Self, reqwest::Error> {
        let http = Client::builder().timeout(config.request_timeout).build()?;
        Ok(Self {
            http,
            base_url: config.base_url.clone(),
        })
    }

    /// `POST /user/login`
    ///
    /// Returns the raw response parts; credential and token interpretation
    /// belongs to the session manager.
    pub async fn login(
        &self,
        username: &str,
        password: &str,
    ) -> Result<LoginResponseParts, reqwest::Error> {
        let url = format!("{}/user/login", self.base_url);
        let response = self
            .http
            .post(&url)
            .json(&serde_json::json!({
                "username": username,
                "password": password,
            }))
            .send()
            .await?;

        let status = response.status();
        let auth_header = header_value(&response, "authorization");
        let jwt_header = header_value(&response, "jwt-token");
        let body = response.json::<Value>().await.unwrap_or(Value::Null);

        Ok(LoginResponseParts {
            status,
            auth_header,
            jwt_header,
            body,
        })
    }

    /// `GET /TicketService/tickets`
    pub async fn fetch_tickets(&self, token: &str) -> Result<Vec<Ticket>, FetchError> {
        let url = format!("{}/TicketService/tickets", self.base_url);
        let response = self.http.get(&url).bearer_auth(token).send().await?;
        parse_sequence(response).await
    }

    /// `GET /MisStaffService/staff`
    pub async fn fetch_staff(&self, token: &str) -> Result<Vec<StaffRef>, FetchError> {
        let url = format!("{}/MisStaffService/staff", self.base_url);
        let response = self.http.get(&url).bearer_auth(token).send().await?;
        parse_sequence(response).await
    }

    /// `PUT /TicketService/ticket/update/{id}`
    pub async fn update_ticket(
        &self,
        token: &str,
        ticket_id: i64,
        update: &TicketUpdate,
    ) -> Result<Ticket, UpdateError> {
        let url = format!("{}/TicketService/ticket/update/{}", self.base_url, ticket_id);
        let response = self
            .http
            .put(&url)
            .bearer_auth(token)
            .json(update)
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(UpdateError::Rejected(rejection_message(response).await));
        }

        Ok(response.json::<Ticket>().await?)
    }

    /// `PUT /TicketService/updateStatus/{id}`
    pub async fn update_status(
        &self,
        token: &str,
        ticket_id: i64,
        status: Status,
    ) -> Result<(), UpdateError> {
        let url = format!("{}/TicketService/updateStatus/{}", self.base_url, ticket_id);
        let response = self
            .http
            .put(&url)
            .bearer_auth(token)
            .json(&StatusUpdate { status })
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(UpdateError::Rejected(rejection_message(response).await));
        }

        Ok(())
    }
}

fn header_value(response: &reqwest::Response, name: &str) -> Option<String> {
    response
        .headers()
        .get(name)
        .and_then(|value| value.to_str().ok())
        .map(str::to_string)
}

/// Pull the backend's `message` field out of an error payload
async fn rejection_message(response: reqwest::Response) -> String {
    let status = response.status();
    let message = response
        .json::<Value>()
        .await
        .ok()
        .and_then(|body| {
            body.get("message")
                .and_then(Value::as_str)
                .map(str::to_string)
        })
        .unwrap_or_else(|| "Failed to update the ticket. Please try again later.".to_string());
    error!("Update rejected with status {}: {}", status, message);
    message
}

/// Decode a response that must be a JSON sequence of `T`
async fn parse_sequence<T: serde::de::DeserializeOwned>(
    response: reqwest::Response,
) -> Result<Vec<T>, FetchError> {
    match response.status() {
        StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => return Err(FetchError::Unauthorized),
        _ => {}
    }
    let response = response.error_for_status()?;

    let payload = response
        .json::<Value>()
        .await
        .map_err(|_| FetchError::MalformedResponse)?;

    if !payload.is_array() {
        warn!("Expected a sequence payload, got: {}", payload);
        return Err(FetchError::MalformedResponse);
    }

    serde_json::from_value(payload).map_err(|e| {
        warn!("Failed to decode sequence payload: {}", e);
        FetchError::MalformedResponse
    })
}
