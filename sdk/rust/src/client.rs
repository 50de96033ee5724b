use reqwest::{Client, StatusCode};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BusinessesRequest {
    pub limit: u32,
    pub offset: u32,
    pub business_id: String,
}

impl BusinessesRequest {
    pub fn for_business(business_id: &str) -> Self {
        Self {
            limit: 500,
            offset: 0,
            business_id: business_id.to_string(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Business {
    pub id: String,
    pub name: String,
    pub hours: Vec<i32>,
    pub updated_at: String, // RFC 3339
    pub created_at: String,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct BusinessesResponse {
    #[serde(default)]
    pub business: Option<Business>,
    #[serde(default)]
    pub err: Option<String>,
}

/// Status code plus decoded envelope of one `/reporting` call.
#[derive(Debug)]
pub struct Reply {
    pub status: StatusCode,
    pub body: BusinessesResponse,
}

impl Reply {
    pub fn is_success(&self) -> bool {
        self.status.is_success()
    }
}

pub struct ReportingClient {
    client: Client,
    base_url: String,
    credentials: Option<(String, String)>,
}

impl ReportingClient {
    pub fn new(base_url: &str) -> Self {
        Self {
            client: Client::new(),
            base_url: base_url.trim_end_matches('/').to_string(),
            credentials: None,
        }
    }

    /// Send HTTP Basic credentials with every reporting call.
    pub fn with_basic_auth(mut self, username: &str, password: &str) -> Self {
        self.credentials = Some((username.to_string(), password.to_string()));
        self
    }

    /// Fetch one business by id.
    pub async fn business(&self, business_id: &str) -> Result<Reply, Box<dyn std::error::Error>> {
        self.reporting(&BusinessesRequest::for_business(business_id)).await
    }

    /// Send a raw reporting request. Non-2xx statuses are returned, not raised.
    pub async fn reporting(&self, req: &BusinessesRequest) -> Result<Reply, Box<dyn std::error::Error>> {
        let mut builder = self.client.post(format!("{}/reporting", self.base_url)).json(req);
        if let Some((user, pass)) = &self.credentials {
            builder = builder.basic_auth(user, Some(pass));
        }

        let resp = builder.send().await?;
        let status = resp.status();
        let text = resp.text().await?;

        let body = serde_json::from_str::<BusinessesResponse>(&text)
            .map_err(|e| format!("service returned status {} with undecodable body {:?}: {}", status, text, e))?;
        Ok(Reply { status, body })
    }

    /// `GET /health`.
    pub async fn health(&self) -> Result<bool, reqwest::Error> {
        let resp = self.client.get(format!("{}/health", self.base_url)).send().await?;
        Ok(resp.status().is_success())
    }
}
