use std::collections::BTreeMap;
use std::fmt;
use std::time::Duration;

use async_trait::async_trait;
use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use chrono::{DateTime, Utc};
use hmac::{Hmac, Mac};
use nm_core::keys::{validate_container, validate_key};
use nm_core::{BlobStore, Error, Result};
use quick_xml::events::Event;
use quick_xml::Reader;
use reqwest::header::{HeaderMap, HeaderValue, AUTHORIZATION, CONTENT_LENGTH, CONTENT_TYPE};
use reqwest::{Client, Method, Response, StatusCode};
use sha2::Sha256;
use tracing::debug;
use url::Url;

use crate::connection::AzureCredential;

const API_VERSION: &str = "2021-08-06";

type HmacSha256 = Hmac<Sha256>;

/// Azure Blob Storage over the REST API, authorised by a SAS token or by
/// Shared Key signing.
pub struct AzureBlobStorage {
    client: Client,
    endpoint: Url,
    credential: AzureCredential,
}

impl AzureBlobStorage {
    pub fn new(endpoint: Url, credential: AzureCredential, timeout: Duration) -> Result<Self> {
        let client = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| Error::Config(format!("Failed to build storage HTTP client: {}", e)))?;
        Ok(Self {
            client,
            endpoint,
            credential,
        })
    }

    fn resource_url(&self, path: &str, query: Option<&str>) -> Url {
        let mut url = self.endpoint.clone();
        let base = url.path().trim_end_matches('/').to_string();
        url.set_path(&format!("{}/{}", base, path));
        let query = match (query, &self.credential) {
            (Some(query), AzureCredential::Sas(sas)) => Some(format!("{}&{}", query, sas)),
            (None, AzureCredential::Sas(sas)) => Some(sas.clone()),
            (query, AzureCredential::SharedKey { .. }) => query.map(str::to_string),
        };
        url.set_query(query.as_deref());
        url
    }

    fn container_url(&self, container: &str) -> Url {
        self.resource_url(container, Some("restype=container"))
    }

    fn list_url(&self, container: &str, marker: Option<&str>) -> Url {
        let mut query = String::from("restype=container&comp=list");
        if let Some(marker) = marker {
            query.push_str("&marker=");
            query.extend(url::form_urlencoded::byte_serialize(marker.as_bytes()));
        }
        self.resource_url(container, Some(&query))
    }

    fn blob_url(&self, container: &str, key: &str) -> Url {
        self.resource_url(&format!("{}/{}", container, key), None)
    }

    /// Adds the version and date headers, plus `Authorization` when the
    /// account key signs requests.
    fn sign_headers(
        &self,
        method: &Method,
        url: &Url,
        mut headers: HeaderMap,
        content_length: usize,
        now: DateTime<Utc>,
    ) -> Result<HeaderMap> {
        headers.insert("x-ms-version", HeaderValue::from_static(API_VERSION));
        headers.insert("x-ms-date", header_value(&http_date(now))?);
        if let AzureCredential::SharedKey { account, key } = &self.credential {
            let to_sign = string_to_sign(method, url, &headers, account, content_length);
            let authorization = format!("SharedKey {}:{}", account, sign(key, &to_sign)?);
            headers.insert(AUTHORIZATION, header_value(&authorization)?);
        }
        Ok(headers)
    }

    async fn send(&self, method: Method, url: Url, headers: HeaderMap, body: Vec<u8>, action: &str) -> Result<Response> {
        let headers = self.sign_headers(&method, &url, headers, body.len(), Utc::now())?;
        self.client
            .request(method, url)
            .headers(headers)
            .body(body)
            .send()
            .await
            .map_err(|e| transport(action, e))
    }
}

fn header_value(value: &str) -> Result<HeaderValue> {
    HeaderValue::from_str(value).map_err(|e| Error::Storage(format!("invalid request header: {}", e)))
}

/// RFC 1123 date, always in GMT.
fn http_date(now: DateTime<Utc>) -> String {
    now.format("%a, %d %b %Y %H:%M:%S GMT").to_string()
}

/// The Shared Key string-to-sign for Blob service version 2009-09-19 and later.
fn string_to_sign(method: &Method, url: &Url, headers: &HeaderMap, account: &str, content_length: usize) -> String {
    let header = |name: &str| {
        headers
            .get(name)
            .and_then(|value| value.to_str().ok())
            .unwrap_or_default()
            .trim()
            .to_string()
    };
    // Zero is sent as an empty length.
    let length = if content_length == 0 {
        String::new()
    } else {
        content_length.to_string()
    };
    let fields = [
        method.as_str().to_string(),
        header("content-encoding"),
        header("content-language"),
        length,
        header("content-md5"),
        header("content-type"),
        header("date"),
        header("if-modified-since"),
        header("if-match"),
        header("if-none-match"),
        header("if-unmodified-since"),
        header("range"),
    ];

    let mut canonical: Vec<(&str, String)> = headers
        .iter()
        .filter(|(name, _)| name.as_str().starts_with("x-ms-"))
        .map(|(name, value)| (name.as_str(), value.to_str().unwrap_or_default().trim().to_string()))
        .collect();
    canonical.sort();

    let mut out = fields.join("\n");
    out.push('\n');
    for (name, value) in canonical {
        out.push_str(&format!("{}:{}\n", name, value));
    }
    out.push_str(&canonical_resource(url, account));
    out
}

fn canonical_resource(url: &Url, account: &str) -> String {
    let mut resource = format!("/{}{}", account, url.path());
    let mut params: BTreeMap<String, Vec<String>> = BTreeMap::new();
    for (name, value) in url.query_pairs() {
        params.entry(name.to_lowercase()).or_default().push(value.into_owned());
    }
    for (name, mut values) in params {
        values.sort();
        resource.push_str(&format!("\n{}:{}", name, values.join(",")));
    }
    resource
}

fn sign(key: &[u8], string_to_sign: &str) -> Result<String> {
    let mut mac =
        HmacSha256::new_from_slice(key).map_err(|e| Error::Config(format!("unusable storage account key: {}", e)))?;
    mac.update(string_to_sign.as_bytes());
    Ok(STANDARD.encode(mac.finalize().into_bytes()))
}

/// One page of a List Blobs response: the blob names and the marker of the
/// next page, if any.
fn parse_blob_list(xml: &str) -> Result<(Vec<String>, Option<String>)> {
    let mut reader = Reader::from_str(xml);
    reader.config_mut().trim_text(true);

    let mut names = Vec::new();
    let mut marker = None;
    let mut path: Vec<Vec<u8>> = Vec::new();
    loop {
        match reader.read_event() {
            Ok(Event::Start(e)) => path.push(e.name().as_ref().to_vec()),
            Ok(Event::End(_)) => {
                path.pop();
            }
            Ok(Event::Text(text)) => {
                let text = text
                    .decode()
                    .map_err(|e| Error::Storage(format!("unreadable blob listing: {}", e)))?
                    .into_owned();
                match path.iter().map(Vec::as_slice).collect::<Vec<_>>().as_slice() {
                    [.., b"Blob", b"Name"] => names.push(text),
                    [.., b"NextMarker"] if !text.is_empty() => marker = Some(text),
                    _ => {}
                }
            }
            Ok(Event::Eof) => break,
            Ok(_) => {}
            Err(e) => return Err(Error::Storage(format!("unreadable blob listing: {}", e))),
        }
    }
    Ok((names, marker))
}

async fn failure(action: &str, response: Response) -> Error {
    let status = response.status();
    let body = response.text().await.unwrap_or_default();
    let detail: String = body.chars().take(300).collect();
    Error::Storage(format!("{} failed with HTTP {}: {}", action, status, detail))
}

// Request errors can carry the full URL, SAS included.
fn transport(action: &str, e: reqwest::Error) -> Error {
    Error::Storage(format!("{} failed: {}", action, e.without_url()))
}

#[async_trait]
impl BlobStore for AzureBlobStorage {
    fn name(&self) -> &str {
        "azure"
    }

    async fn ensure_container(&self, container: &str) -> Result<()> {
        validate_container(container)?;
        let action = format!("create container {}", container);
        let mut headers = HeaderMap::new();
        headers.insert(CONTENT_LENGTH, HeaderValue::from_static("0"));
        let response = self
            .send(Method::PUT, self.container_url(container), headers, Vec::new(), &action)
            .await?;

        match response.status() {
            StatusCode::CREATED => {
                debug!(container, "🪣 Created container");
                Ok(())
            }
            StatusCode::CONFLICT => Ok(()),
            _ => Err(failure(&action, response).await),
        }
    }

    async fn put(&self, container: &str, key: &str, bytes: Vec<u8>) -> Result<()> {
        validate_container(container)?;
        validate_key(key)?;
        let action = format!("upload {}/{}", container, key);
        let mut headers = HeaderMap::new();
        headers.insert("x-ms-blob-type", HeaderValue::from_static("BlockBlob"));
        headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json; charset=utf-8"));
        let response = self
            .send(Method::PUT, self.blob_url(container, key), headers, bytes, &action)
            .await?;

        if response.status() == StatusCode::CREATED {
            Ok(())
        } else {
            Err(failure(&action, response).await)
        }
    }

    async fn get(&self, container: &str, key: &str) -> Result<Vec<u8>> {
        validate_container(container)?;
        validate_key(key)?;
        let action = format!("download {}/{}", container, key);
        let response = self
            .send(Method::GET, self.blob_url(container, key), HeaderMap::new(), Vec::new(), &action)
            .await?;

        match response.status() {
            StatusCode::OK => {
                let bytes = response.bytes().await.map_err(|e| transport(&action, e))?;
                Ok(bytes.to_vec())
            }
            StatusCode::NOT_FOUND => Err(Error::BlobNotFound {
                container: container.to_string(),
                key: key.to_string(),
            }),
            _ => Err(failure(&action, response).await),
        }
    }

    async fn list(&self, container: &str) -> Result<Vec<String>> {
        validate_container(container)?;
        let action = format!("list {}", container);
        let mut keys = Vec::new();
        let mut marker: Option<String> = None;
        loop {
            let url = self.list_url(container, marker.as_deref());
            let response = self.send(Method::GET, url, HeaderMap::new(), Vec::new(), &action).await?;
            match response.status() {
                StatusCode::OK => {}
                StatusCode::NOT_FOUND => return Ok(Vec::new()),
                _ => return Err(failure(&action, response).await),
            }

            let body = response.text().await.map_err(|e| transport(&action, e))?;
            let (names, next) = parse_blob_list(&body)?;
            keys.extend(names);
            match next {
                Some(next) => marker = Some(next),
                None => break,
            }
        }
        keys.sort();
        Ok(keys)
    }
}

impl fmt::Debug for AzureBlobStorage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AzureBlobStorage")
            .field("client", &"<reqwest::Client>")
            .field("endpoint", &self.endpoint.as_str())
            .field("credential", &self.credential)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    // base64 of "newsmood-test-account-key"
    const ACCOUNT_KEY: &str = "bmV3c21vb2QtdGVzdC1hY2NvdW50LWtleQ==";

    fn storage(endpoint: &str) -> AzureBlobStorage {
        AzureBlobStorage::new(
            Url::parse(endpoint).unwrap(),
            AzureCredential::Sas("sv=2022-11-02&sig=abc".to_string()),
            Duration::from_secs(5),
        )
        .unwrap()
    }

    fn signing_storage() -> AzureBlobStorage {
        AzureBlobStorage::new(
            Url::parse("https://acct.blob.core.windows.net").unwrap(),
            AzureCredential::SharedKey {
                account: "acct".to_string(),
                key: STANDARD.decode(ACCOUNT_KEY).unwrap(),
            },
            Duration::from_secs(5),
        )
        .unwrap()
    }

    fn fixed_now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2026, 10, 16, 9, 0, 0).unwrap()
    }

    fn authorization(headers: &HeaderMap) -> &str {
        headers.get(AUTHORIZATION).unwrap().to_str().unwrap()
    }

    #[test]
    fn test_container_url() {
        let url = storage("https://acct.blob.core.windows.net/").container_url("articles-data");
        assert_eq!(
            url.as_str(),
            "https://acct.blob.core.windows.net/articles-data?restype=container&sv=2022-11-02&sig=abc"
        );
    }

    #[test]
    fn test_blob_url_keeps_endpoint_path() {
        let url = storage("http://127.0.0.1:10000/devstoreaccount1").blob_url("articles-data", "a1");
        assert_eq!(
            url.as_str(),
            "http://127.0.0.1:10000/devstoreaccount1/articles-data/a1?sv=2022-11-02&sig=abc"
        );
    }

    #[test]
    fn test_shared_key_urls_carry_no_token() {
        let storage = signing_storage();
        assert_eq!(
            storage.blob_url("articles-data", "a1").as_str(),
            "https://acct.blob.core.windows.net/articles-data/a1"
        );
        assert_eq!(
            storage.list_url("articles-data", Some("m 1")).as_str(),
            "https://acct.blob.core.windows.net/articles-data?restype=container&comp=list&marker=m+1"
        );
    }

    #[test]
    fn test_http_date() {
        assert_eq!(http_date(fixed_now()), "Fri, 16 Oct 2026 09:00:00 GMT");
    }

    #[test]
    fn test_signs_blob_upload() {
        let storage = signing_storage();
        let url = storage.blob_url("articles-data", "a1");
        let mut headers = HeaderMap::new();
        headers.insert("x-ms-blob-type", HeaderValue::from_static("BlockBlob"));
        headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json; charset=utf-8"));
        let headers = storage.sign_headers(&Method::PUT, &url, headers, 10, fixed_now()).unwrap();

        assert_eq!(
            string_to_sign(&Method::PUT, &url, &headers, "acct", 10),
            "PUT\n\n\n10\n\napplication/json; charset=utf-8\n\n\n\n\n\n\n\
             x-ms-blob-type:BlockBlob\n\
             x-ms-date:Fri, 16 Oct 2026 09:00:00 GMT\n\
             x-ms-version:2021-08-06\n\
             /acct/articles-data/a1"
        );
        assert_eq!(
            authorization(&headers),
            "SharedKey acct:3cbcwpjFDVE2aUtsHN6z8NxbtP1vqSmjnJkymh8kG20="
        );
    }

    #[test]
    fn test_signs_container_create_with_query() {
        let storage = signing_storage();
        let url = storage.container_url("articles-data");
        let mut headers = HeaderMap::new();
        headers.insert(CONTENT_LENGTH, HeaderValue::from_static("0"));
        let headers = storage.sign_headers(&Method::PUT, &url, headers, 0, fixed_now()).unwrap();

        assert!(string_to_sign(&Method::PUT, &url, &headers, "acct", 0).ends_with("/acct/articles-data\nrestype:container"));
        assert_eq!(
            authorization(&headers),
            "SharedKey acct:nyNOXK4U24gxsCD3b3/QI3GXl5W7kgRK6AF79P+ARIo="
        );
    }

    #[test]
    fn test_signs_listing_with_sorted_query() {
        let storage = signing_storage();
        let url = storage.list_url("articles-data", Some("m1"));
        let headers = storage.sign_headers(&Method::GET, &url, HeaderMap::new(), 0, fixed_now()).unwrap();

        assert!(string_to_sign(&Method::GET, &url, &headers, "acct", 0)
            .ends_with("/acct/articles-data\ncomp:list\nmarker:m1\nrestype:container"));
        assert_eq!(
            authorization(&headers),
            "SharedKey acct:dizPP+k5YY4ALyKaecxGpetnJkWnTAmowYoQYzifz8M="
        );
    }

    #[test]
    fn test_sas_requests_are_not_signed() {
        let storage = storage("https://acct.blob.core.windows.net");
        let url = storage.blob_url("articles-data", "a1");
        let headers = storage.sign_headers(&Method::GET, &url, HeaderMap::new(), 0, fixed_now()).unwrap();
        assert!(headers.get(AUTHORIZATION).is_none());
        assert_eq!(headers.get("x-ms-version").unwrap(), API_VERSION);
    }

    #[test]
    fn test_parse_blob_list() {
        let xml = r#"<?xml version="1.0" encoding="utf-8"?>
<EnumerationResults ServiceEndpoint="https://acct.blob.core.windows.net/" ContainerName="articles-data">
  <Marker>m0</Marker>
  <Blobs>
    <Blob><Name>a1</Name><Properties><Content-Length>10</Content-Length></Properties></Blob>
    <Blob><Name>mock-42</Name><Properties /></Blob>
  </Blobs>
  <NextMarker>m1</NextMarker>
</EnumerationResults>"#;
        let (names, next) = parse_blob_list(xml).unwrap();
        assert_eq!(names, ["a1", "mock-42"]);
        assert_eq!(next.as_deref(), Some("m1"));

        let last = "<EnumerationResults><Blobs /><NextMarker /></EnumerationResults>";
        assert_eq!(parse_blob_list(last).unwrap(), (Vec::new(), None));
    }

    #[test]
    fn test_debug_redacts_credentials() {
        assert!(!format!("{:?}", storage("https://acct.blob.core.windows.net")).contains("sig=abc"));
        let debug = format!("{:?}", signing_storage());
        assert!(debug.contains("acct"));
        assert!(!debug.contains(ACCOUNT_KEY));
    }

    #[tokio::test]
    async fn test_rejects_invalid_key_before_any_request() {
        let storage = storage("http://127.0.0.1:9");
        assert!(matches!(
            storage.put("articles-data", "a/b", vec![]).await,
            Err(Error::InvalidKey(_))
        ));
    }
}
