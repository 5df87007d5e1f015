use anyhow::{anyhow, Context};
use async_trait::async_trait;
use chrono::{DateTime, SecondsFormat, Utc};
use reqwest::{Client, Response, StatusCode, Url};
use reqwest::header::{HeaderMap, HeaderValue};
use serde::{Deserialize, Serialize};
use serde_json::json;
use crate::config::AppwriteConfig;
use crate::domain::{AnnouncementState, ContentPage, ContentRecord, ANNOUNCEMENT_STATE_KEY};
use crate::repo::{ContentStore, StateStore, PAGE_LIMIT};

const PROJECT_HEADER: &str = "x-appwrite-project";
const API_KEY_HEADER: &str = "x-appwrite-key";
const CREATED_AT_ATTRIBUTE: &str = "$createdAt";

/// Talks to the Appwrite Databases REST API: reads the videos collection and keeps
/// the announcement state in a single document of the config collection.
#[derive(Clone, Debug)]
pub struct AppwriteClient {
    http: Client,
    videos_url: Url,
    state_collection_url: Url,
    state_document_url: Url,
}

#[derive(Deserialize)]
struct DocumentList<T> {
    /// Matching documents in the whole collection, regardless of `limit`.
    #[serde(default)]
    total: usize,
    documents: Vec<T>,
}

#[derive(Deserialize)]
struct VideoDocument {
    #[serde(rename = "$id")]
    id: String,
    #[serde(rename = "$createdAt")]
    created_at: DateTime<Utc>,
    #[serde(default)]
    title: Option<String>,
}

impl From<VideoDocument> for ContentRecord {
    fn from(value: VideoDocument) -> Self {
        Self {
            id: value.id,
            title: value.title,
            created_at: value.created_at,
        }
    }
}

#[derive(Deserialize, Serialize)]
struct StateDocument {
    #[serde(rename = "lastMsgId", default)]
    last_msg_id: Option<i32>,
}

#[derive(Deserialize)]
struct ErrorBody {
    message: String,
}

impl AppwriteClient {
    pub fn new(config: &AppwriteConfig) -> anyhow::Result<Self> {
        let mut headers = HeaderMap::new();
        headers.insert(PROJECT_HEADER, HeaderValue::from_str(&config.project_id)
            .context("invalid Appwrite project id")?);
        let mut api_key = HeaderValue::from_str(&config.api_key)
            .context("invalid Appwrite API key")?;
        api_key.set_sensitive(true);
        headers.insert(API_KEY_HEADER, api_key);

        let http = Client::builder()
            .default_headers(headers)
            .build()?;
        let videos_url = collection_url(config, &config.videos_collection)?;
        let state_collection_url = collection_url(config, &config.state_collection)?;
        let state_document_url = Url::parse(&format!("{state_collection_url}/{ANNOUNCEMENT_STATE_KEY}"))?;
        Ok(Self { http, videos_url, state_collection_url, state_document_url })
    }

    fn state_payload(state: &AnnouncementState) -> StateDocument {
        StateDocument {
            last_msg_id: state.last_message_id.map(|id| id.0),
        }
    }
}

#[async_trait]
impl ContentStore for AppwriteClient {
    async fn find_records_since(&self, window_start: DateTime<Utc>) -> anyhow::Result<ContentPage> {
        let queries: Vec<(&str, String)> = list_queries(window_start)
            .into_iter()
            .map(|query| ("queries[]", query))
            .collect();
        let response = self.http.get(self.videos_url.clone())
            .query(&queries)
            .send()
            .await?;
        let list: DocumentList<VideoDocument> = ensure_success(response).await?
            .json()
            .await?;
        let records = list.documents.into_iter().map(Into::into).collect();
        Ok(ContentPage::new(records, list.total))
    }
}

#[async_trait]
impl StateStore for AppwriteClient {
    async fn read(&self) -> anyhow::Result<AnnouncementState> {
        let response = self.http.get(self.state_document_url.clone())
            .send()
            .await?;
        if response.status() == StatusCode::NOT_FOUND {
            log::info!("no announcement state document yet");
            return Ok(AnnouncementState::default())
        }
        let document: StateDocument = ensure_success(response).await?
            .json()
            .await?;
        Ok(document.last_msg_id.into())
    }

    async fn write(&self, state: &AnnouncementState) -> anyhow::Result<()> {
        let data = Self::state_payload(state);
        let response = self.http.patch(self.state_document_url.clone())
            .json(&json!({ "data": data }))
            .send()
            .await?;
        if response.status() != StatusCode::NOT_FOUND {
            ensure_success(response).await?;
            return Ok(())
        }

        log::info!("creating the announcement state document");
        let response = self.http.post(self.state_collection_url.clone())
            .json(&json!({ "documentId": ANNOUNCEMENT_STATE_KEY, "data": data }))
            .send()
            .await?;
        ensure_success(response).await?;
        Ok(())
    }
}

fn collection_url(config: &AppwriteConfig, collection: &str) -> anyhow::Result<Url> {
    let endpoint = config.endpoint.as_str().trim_end_matches('/');
    let url = format!("{endpoint}/databases/{}/collections/{collection}/documents", config.database_id);
    Url::parse(&url).with_context(|| format!("invalid Appwrite collection URL: {url}"))
}

fn list_queries(window_start: DateTime<Utc>) -> [String; 3] {
    let since = window_start.to_rfc3339_opts(SecondsFormat::Millis, true);
    [
        json!({ "method": "greaterThan", "attribute": CREATED_AT_ATTRIBUTE, "values": [since] }),
        json!({ "method": "orderDesc", "attribute": CREATED_AT_ATTRIBUTE }),
        json!({ "method": "limit", "values": [PAGE_LIMIT] }),
    ].map(|query| query.to_string())
}

async fn ensure_success(response: Response) -> anyhow::Result<Response> {
    let status = response.status();
    if status.is_success() {
        return Ok(response)
    }
    let message = response.json::<ErrorBody>().await
        .map(|body| body.message)
        .unwrap_or_else(|_| status.canonical_reason().unwrap_or("unknown error").to_owned());
    Err(anyhow!("Appwrite responded with {status}: {message}"))
}

#[cfg(test)]
mod tests {
    use std::sync::{Arc, Mutex};
    use axum::extract::{RawQuery, State};
    use axum::http::Method;
    use axum::routing::{get, post};
    use chrono::TimeZone;
    use teloxide::types::MessageId;
    use super::*;

    const STATE_DOCUMENTS_PATH: &str = "/v1/databases/db/collections/config/documents";
    const VIDEOS_PATH: &str = "/v1/databases/db/collections/videos/documents";

    type Calls = Arc<Mutex<Vec<(String, String)>>>;

    fn config(endpoint: &str) -> AppwriteConfig {
        AppwriteConfig {
            endpoint: endpoint.parse().expect("invalid endpoint"),
            project_id: "project".to_owned(),
            api_key: "secret".to_owned(),
            database_id: "db".to_owned(),
            videos_collection: "videos".to_owned(),
            state_collection: "config".to_owned(),
        }
    }

    #[test]
    fn test_urls() {
        for endpoint in ["https://cloud.appwrite.io/v1", "https://cloud.appwrite.io/v1/"] {
            let client = AppwriteClient::new(&config(endpoint)).expect("couldn't build the client");
            assert_eq!(client.videos_url.as_str(),
                       "https://cloud.appwrite.io/v1/databases/db/collections/videos/documents");
            assert_eq!(client.state_document_url.as_str(),
                       "https://cloud.appwrite.io/v1/databases/db/collections/config/documents/main");
        }
    }

    #[test]
    fn test_invalid_api_key() {
        let mut config = config("https://cloud.appwrite.io/v1");
        config.api_key = "line\nbreak".to_owned();
        assert!(AppwriteClient::new(&config).is_err());
    }

    #[test]
    fn test_list_queries() {
        let since = Utc.with_ymd_and_hms(2024, 2, 13, 17, 0, 0).unwrap();
        let queries = list_queries(since)
            .map(|query| serde_json::from_str::<serde_json::Value>(&query).expect("query must be valid JSON"));
        assert_eq!(queries, [
            json!({ "method": "greaterThan", "attribute": "$createdAt", "values": ["2024-02-13T17:00:00.000Z"] }),
            json!({ "method": "orderDesc", "attribute": "$createdAt" }),
            json!({ "method": "limit", "values": [100] }),
        ]);
    }

    #[test]
    fn test_video_document() {
        let body = r#"{"total": 1, "documents": [{
            "$id": "65cb1f", "$createdAt": "2024-02-13T17:30:00.000+00:00",
            "$collectionId": "videos", "title": "Night out", "url": "https://cdn/1.mp4"
        }]}"#;
        let list: DocumentList<VideoDocument> = serde_json::from_str(body).expect("invalid document list");
        assert_eq!(list.total, 1);
        let records: Vec<ContentRecord> = list.documents.into_iter().map(Into::into).collect();
        assert_eq!(records, vec![ContentRecord {
            id: "65cb1f".to_owned(),
            title: Some("Night out".to_owned()),
            created_at: Utc.with_ymd_and_hms(2024, 2, 13, 17, 30, 0).unwrap(),
        }]);
    }

    #[test]
    fn test_state_document() {
        let doc: StateDocument = serde_json::from_str(r#"{"$id": "main", "lastMsgId": 42}"#).unwrap();
        assert_eq!(AnnouncementState::from(doc.last_msg_id), AnnouncementState::published(MessageId(42)));

        let doc: StateDocument = serde_json::from_str(r#"{"$id": "main"}"#).unwrap();
        assert_eq!(AnnouncementState::from(doc.last_msg_id), AnnouncementState::default());

        let payload = AppwriteClient::state_payload(&AnnouncementState::published(MessageId(7)));
        assert_eq!(json!({ "data": payload }), json!({ "data": { "lastMsgId": 7 } }));
    }

    async fn serve(router: axum::Router) -> String {
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.expect("couldn't bind a port");
        let addr = listener.local_addr().expect("no local address");
        tokio::spawn(async move { axum::serve(listener, router).await });
        format!("http://{addr}/v1")
    }

    async fn document_not_found(State(calls): State<Calls>, method: Method, body: String) -> (StatusCode, axum::Json<serde_json::Value>) {
        calls.lock().unwrap().push((method.to_string(), body));
        (StatusCode::NOT_FOUND, axum::Json(json!({
            "message": "Document with the requested ID could not be found.",
            "code": 404,
            "type": "document_not_found",
        })))
    }

    async fn document_created(State(calls): State<Calls>, body: String) -> StatusCode {
        calls.lock().unwrap().push(("POST".to_owned(), body));
        StatusCode::CREATED
    }

    async fn unauthorized(State(calls): State<Calls>, method: Method) -> (StatusCode, axum::Json<serde_json::Value>) {
        calls.lock().unwrap().push((method.to_string(), String::new()));
        (StatusCode::UNAUTHORIZED, axum::Json(json!({
            "message": "Invalid API key",
            "code": 401,
            "type": "user_unauthorized",
        })))
    }

    async fn truncated_video_list(State(calls): State<Calls>, headers: HeaderMap, RawQuery(query): RawQuery) -> axum::Json<serde_json::Value> {
        let project = headers.get(PROJECT_HEADER)
            .and_then(|value| value.to_str().ok())
            .unwrap_or_default();
        calls.lock().unwrap().push((format!("GET project={project}"), query.unwrap_or_default()));
        axum::Json(json!({ "total": 150, "documents": [
            { "$id": "b", "$createdAt": "2024-02-13T17:40:00.000+00:00", "title": "Beach" },
            { "$id": "a", "$createdAt": "2024-02-13T17:30:00.000+00:00", "title": null },
        ]}))
    }

    #[tokio::test]
    async fn test_missing_state_document_is_created() {
        let calls = Calls::default();
        let router = axum::Router::new()
            .route(&format!("{STATE_DOCUMENTS_PATH}/main"), get(document_not_found).patch(document_not_found))
            .route(STATE_DOCUMENTS_PATH, post(document_created))
            .with_state(calls.clone());
        let client = AppwriteClient::new(&config(&serve(router).await)).expect("couldn't build the client");

        let state = client.read().await.expect("a missing document must not be an error");
        assert_eq!(state, AnnouncementState::default());

        client.write(&AnnouncementState::published(MessageId(5))).await
            .expect("the document must be created");

        let calls = calls.lock().unwrap();
        let methods: Vec<&str> = calls.iter().map(|(method, _)| method.as_str()).collect();
        assert_eq!(methods, ["GET", "PATCH", "POST"]);
        let created: serde_json::Value = serde_json::from_str(&calls[2].1).expect("invalid request body");
        assert_eq!(created, json!({ "documentId": "main", "data": { "lastMsgId": 5 } }));
    }

    #[tokio::test]
    async fn test_error_responses() {
        let calls = Calls::default();
        let router = axum::Router::new()
            .route(&format!("{STATE_DOCUMENTS_PATH}/main"), get(unauthorized).patch(unauthorized))
            .route(VIDEOS_PATH, get(|| async { (StatusCode::BAD_GATEWAY, "upstream is down") }))
            .with_state(calls.clone());
        let client = AppwriteClient::new(&config(&serve(router).await)).expect("couldn't build the client");

        let err = client.read().await.expect_err("401 must fail the read");
        assert_eq!(err.to_string(), "Appwrite responded with 401 Unauthorized: Invalid API key");

        let err = client.write(&AnnouncementState::published(MessageId(5))).await
            .expect_err("401 must fail the write");
        assert_eq!(err.to_string(), "Appwrite responded with 401 Unauthorized: Invalid API key");

        let err = client.find_records_since(Utc::now()).await.expect_err("502 must fail the query");
        assert_eq!(err.to_string(), "Appwrite responded with 502 Bad Gateway: Bad Gateway");

        let methods: Vec<String> = calls.lock().unwrap().iter().map(|(method, _)| method.clone()).collect();
        assert_eq!(methods, ["GET", "PATCH"], "no document must be created after an error");
    }

    #[tokio::test]
    async fn test_total_comes_from_the_store() {
        let calls = Calls::default();
        let router = axum::Router::new()
            .route(VIDEOS_PATH, get(truncated_video_list))
            .with_state(calls.clone());
        let client = AppwriteClient::new(&config(&serve(router).await)).expect("couldn't build the client");

        let page = client.find_records_since(Utc.with_ymd_and_hms(2024, 2, 13, 17, 0, 0).unwrap()).await
            .expect("couldn't list the videos");
        assert_eq!(page.total, 150);
        assert_eq!(page.records.len(), 2);
        assert_eq!(page.records[0].display_title(), Some("Beach"));

        let calls = calls.lock().unwrap();
        assert_eq!(calls[0].0, "GET project=project");
        assert_eq!(calls[0].1.matches("queries%5B%5D=").count(), 3, "{}", calls[0].1);
    }
}
