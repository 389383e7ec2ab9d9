//! Blocking HTTP implementation of [`PeopleBackend`].
//!
//! # Responsibility
//! - Build `/api/people` URLs relative to the configured base URL.
//! - Exchange JSON bodies and map HTTP failures into [`NetworkError`].
//!
//! # Invariants
//! - Writes always carry `Content-Type: application/json`.
//! - Request timeouts come from configuration; nothing is retried.

use crate::api::backend::PeopleBackend;
use crate::api::error::{classify_transport_error_kind, ApiResult, NetworkError};
use crate::config::ClientConfig;
use crate::model::person::{PersonId, PersonPayload, PersonRecord};
use log::{debug, warn};
use std::time::{Duration, Instant};
use url::Url;

const USER_AGENT: &str = concat!("people_directory/", env!("CARGO_PKG_VERSION"));

/// HTTP client for the people REST backend.
#[derive(Clone)]
pub struct HttpPeopleBackend {
    agent: ureq::Agent,
    people_url: Url,
}

impl HttpPeopleBackend {
    /// Builds a client from resolved configuration.
    pub fn new(config: &ClientConfig) -> ApiResult<Self> {
        Self::with_timeout(
            &config.base_url,
            Duration::from_millis(config.http_timeout_ms),
        )
    }

    /// Builds a client for `base_url` with one timeout for connect/read/write.
    pub fn with_timeout(base_url: &Url, timeout: Duration) -> ApiResult<Self> {
        let people_url = people_collection_url(base_url)?;
        let agent = ureq::AgentBuilder::new()
            .timeout_connect(timeout)
            .timeout_read(timeout)
            .timeout_write(timeout)
            .user_agent(USER_AGENT)
            .build();
        Ok(Self { agent, people_url })
    }

    /// `<base>/api/people?page=<page>&limit=<limit>`
    pub fn list_url(&self, page: u32, limit: u32) -> Url {
        let mut url = self.people_url.clone();
        url.query_pairs_mut()
            .append_pair("page", &page.to_string())
            .append_pair("limit", &limit.to_string());
        url
    }

    /// `<base>/api/people/<id>`, with the id percent-encoded as one segment.
    pub fn item_url(&self, id: &PersonId) -> ApiResult<Url> {
        let mut url = self.people_url.clone();
        url.path_segments_mut()
            .map_err(|_| NetworkError::InvalidUrl(format!("`{}` cannot be a base", self.people_url)))?
            .push(&id.to_string());
        Ok(url)
    }

    fn send(&self, method: &str, url: &Url, body: Option<String>) -> ApiResult<String> {
        let started_at = Instant::now();
        let request = self
            .agent
            .request(method, url.as_str())
            .set("Accept", "application/json");
        let result = match body {
            Some(body) => request
                .set("Content-Type", "application/json")
                .send_string(&body),
            None => request.call(),
        };

        let response = match result {
            Ok(response) => response,
            Err(ureq::Error::Status(code, response)) => {
                let body = response.into_string().unwrap_or_default();
                debug!(
                    "event=http_request module=api status=error method={} path={} http_status={} duration_ms={}",
                    method,
                    url.path(),
                    code,
                    started_at.elapsed().as_millis()
                );
                return Err(NetworkError::status(code, &body));
            }
            Err(ureq::Error::Transport(transport)) => {
                let message = transport.to_string();
                let kind = classify_transport_error_kind(&format!(
                    "{:?} {}",
                    transport.kind(),
                    message
                ));
                debug!(
                    "event=http_request module=api status=error method={} path={} error_code={} duration_ms={}",
                    method,
                    url.path(),
                    kind,
                    started_at.elapsed().as_millis()
                );
                return Err(NetworkError::Transport { kind, message });
            }
        };

        let status = response.status();
        let text = response
            .into_string()
            .map_err(|err| NetworkError::Decode(err.to_string()))?;
        debug!(
            "event=http_request module=api status=ok method={} path={} http_status={} duration_ms={}",
            method,
            url.path(),
            status,
            started_at.elapsed().as_millis()
        );
        Ok(text)
    }
}

impl PeopleBackend for HttpPeopleBackend {
    fn list_people(&self, page: u32, limit: u32) -> ApiResult<Vec<PersonRecord>> {
        let body = self.send("GET", &self.list_url(page, limit), None)?;
        Ok(serde_json::from_str(&body)?)
    }

    fn create_person(&self, payload: &PersonPayload) -> ApiResult<Option<PersonRecord>> {
        let body = serde_json::to_string(payload)?;
        let response = self.send("POST", &self.people_url, Some(body))?;
        Ok(decode_echoed_record(&response))
    }

    fn update_person(
        &self,
        id: &PersonId,
        payload: &PersonPayload,
    ) -> ApiResult<Option<PersonRecord>> {
        let url = self.item_url(id)?;
        let body = serde_json::to_string(payload)?;
        let response = self.send("PUT", &url, Some(body))?;
        Ok(decode_echoed_record(&response))
    }

    fn delete_person(&self, id: &PersonId) -> ApiResult<()> {
        let url = self.item_url(id)?;
        self.send("DELETE", &url, None)?;
        Ok(())
    }
}

/// Joins `api/people` onto the base path, keeping any base path prefix.
fn people_collection_url(base_url: &Url) -> ApiResult<Url> {
    let mut url = base_url.clone();
    url.set_query(None);
    url.set_fragment(None);
    url.path_segments_mut()
        .map_err(|_| NetworkError::InvalidUrl(format!("`{base_url}` cannot be a base")))?
        .pop_if_empty()
        .extend(["api", "people"]);
    Ok(url)
}

fn decode_echoed_record(body: &str) -> Option<PersonRecord> {
    if body.trim().is_empty() {
        return None;
    }
    match serde_json::from_str(body) {
        Ok(record) => Some(record),
        Err(err) => {
            warn!(
                "event=http_response module=api status=ignored reason=unexpected_body error={}",
                err
            );
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::HttpPeopleBackend;
    use crate::model::person::PersonId;
    use std::time::Duration;
    use url::Url;

    fn backend(base: &str) -> HttpPeopleBackend {
        let url = Url::parse(base).expect("valid base url");
        HttpPeopleBackend::with_timeout(&url, Duration::from_secs(1)).expect("backend")
    }

    #[test]
    fn list_url_appends_collection_and_one_based_page() {
        assert_eq!(
            backend("http://localhost:5000").list_url(1, 10).as_str(),
            "http://localhost:5000/api/people?page=1&limit=10"
        );
    }

    #[test]
    fn base_path_prefix_is_kept_with_or_without_trailing_slash() {
        for base in ["https://example.com/v1", "https://example.com/v1/"] {
            assert_eq!(
                backend(base).list_url(3, 25).as_str(),
                "https://example.com/v1/api/people?page=3&limit=25"
            );
        }
    }

    #[test]
    fn item_url_encodes_the_id_as_one_segment() {
        let backend = backend("http://localhost:5000");
        assert_eq!(
            backend.item_url(&PersonId::Number(7)).unwrap().as_str(),
            "http://localhost:5000/api/people/7"
        );
        assert_eq!(
            backend
                .item_url(&PersonId::Text("a/b c".to_string()))
                .unwrap()
                .as_str(),
            "http://localhost:5000/api/people/a%2Fb%20c"
        );
    }
}
