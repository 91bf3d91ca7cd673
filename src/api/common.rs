//! Common API utilities and shared types
//!
//! This module contains shared utilities used across multiple API endpoints.

use axum::{
    extract::{FromRequest, Request},
    http::header,
    Form, Json,
};
use serde::{de::DeserializeOwned, Deserialize};

use crate::models::{parse_page, PAGE_SIZE};

use super::middleware::ApiError;

/// Largest page size a caller may ask for
pub const MAX_PAGE_SIZE: i64 = 100;

/// Listing query parameters.
///
/// Kept as raw strings so that junk values fall back to defaults instead of
/// rejecting the request.
#[derive(Debug, Default, Deserialize)]
pub struct PageQuery {
    pub page: Option<String>,
    pub page_size: Option<String>,
}

impl PageQuery {
    pub fn page(&self) -> i64 {
        parse_page(self.page.as_deref())
    }

    /// Requested page size, clamped to `1..=MAX_PAGE_SIZE`
    pub fn page_size(&self) -> i64 {
        self.page_size
            .as_deref()
            .and_then(|s| s.parse::<i64>().ok())
            .filter(|size| *size > 0)
            .map(|size| size.min(MAX_PAGE_SIZE))
            .unwrap_or(PAGE_SIZE)
    }
}

/// Parse a numeric path identifier
pub fn parse_id(raw: &str) -> Result<i64, ApiError> {
    raw.parse::<i64>()
        .map_err(|_| ApiError::bad_request(format!("Invalid id: {}", raw)))
}

/// Body extractor accepting either JSON or a urlencoded form.
///
/// JSON is used when the request says `application/json`; anything else is
/// read as a form. Malformed bodies are rejected with 400.
#[derive(Debug)]
pub struct FormOrJson<T>(pub T);

impl<T, S> FromRequest<S> for FormOrJson<T>
where
    T: DeserializeOwned,
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        let is_json = req
            .headers()
            .get(header::CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .is_some_and(|ct| ct.starts_with("application/json"));

        if is_json {
            let Json(value) = Json::<T>::from_request(req, state)
                .await
                .map_err(|e| ApiError::bad_request(e.body_text()))?;
            Ok(FormOrJson(value))
        } else {
            let Form(value) = Form::<T>::from_request(req, state)
                .await
                .map_err(|e| ApiError::bad_request(e.body_text()))?;
            Ok(FormOrJson(value))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::ArticleInput;
    use axum::body::Body;
    use axum::http::{self, StatusCode};

    fn query(page: Option<&str>, page_size: Option<&str>) -> PageQuery {
        PageQuery {
            page: page.map(String::from),
            page_size: page_size.map(String::from),
        }
    }

    #[test]
    fn test_page_query_defaults() {
        let q = PageQuery::default();
        assert_eq!(q.page(), 1);
        assert_eq!(q.page_size(), PAGE_SIZE);
    }

    #[test]
    fn test_page_query_junk_falls_back() {
        let q = query(Some("abc"), Some("-4"));
        assert_eq!(q.page(), 1);
        assert_eq!(q.page_size(), PAGE_SIZE);
    }

    #[test]
    fn test_page_size_is_clamped() {
        assert_eq!(query(None, Some("500")).page_size(), MAX_PAGE_SIZE);
        assert_eq!(query(None, Some("25")).page_size(), 25);
        assert_eq!(query(Some("3"), None).page(), 3);
    }

    #[test]
    fn test_parse_id() {
        assert_eq!(parse_id("42").unwrap(), 42);
        assert_eq!(parse_id("abc").unwrap_err().status(), StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn test_form_or_json_reads_both() {
        let req = http::Request::builder()
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(r#"{"title":"T","content":"C","author":"A"}"#))
            .unwrap();
        let FormOrJson(input) = FormOrJson::<ArticleInput>::from_request(req, &())
            .await
            .unwrap();
        assert_eq!(input, ArticleInput::new("T", "C", "A"));

        let req = http::Request::builder()
            .method("POST")
            .header(header::CONTENT_TYPE, "application/x-www-form-urlencoded")
            .body(Body::from("title=T&content=C"))
            .unwrap();
        let FormOrJson(input) = FormOrJson::<ArticleInput>::from_request(req, &())
            .await
            .unwrap();
        assert_eq!(input, ArticleInput::new("T", "C", ""));
    }

    #[tokio::test]
    async fn test_form_or_json_rejects_malformed_json() {
        let req = http::Request::builder()
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from("{not json"))
            .unwrap();
        let err = FormOrJson::<ArticleInput>::from_request(req, &())
            .await
            .unwrap_err();
        assert_eq!(err.status(), StatusCode::BAD_REQUEST);
    }
}
