use crate::error::HttpError;
use bytes::Bytes;
use http::Request;
use http::header::CONTENT_TYPE;
use http_body::Body;
use http_body_util::BodyExt;
use knotwork_core::ClientRequest;

const FORM_CONTENT_TYPE: &str = "application/x-www-form-urlencoded";

/// Buffers the body and decodes query parameters and form attributes.
pub async fn client_request<B>(request: Request<B>) -> Result<ClientRequest, HttpError>
where
    B: Body<Data = Bytes>,
    B::Error: std::fmt::Display,
{
    let (parts, body) = request.into_parts();
    let body = body
        .collect()
        .await
        .map_err(|e| HttpError::Body(e.to_string()))?
        .to_bytes();

    let params = match parts.uri.query() {
        Some(query) => decode_pairs(query.as_bytes())?,
        None => Vec::new(),
    };
    let form_attributes = if is_form(&parts.headers) {
        decode_pairs(&body)?
    } else {
        Vec::new()
    };

    Ok(ClientRequest {
        method: parts.method,
        path: parts.uri.path().to_string(),
        headers: parts.headers,
        params,
        form_attributes,
        body,
    })
}

fn is_form(headers: &http::HeaderMap) -> bool {
    headers
        .get(CONTENT_TYPE)
        .and_then(|value| value.to_str().ok())
        .is_some_and(|value| value.to_ascii_lowercase().starts_with(FORM_CONTENT_TYPE))
}

fn decode_pairs(input: &[u8]) -> Result<Vec<(String, String)>, HttpError> {
    serde_urlencoded::from_bytes(input).map_err(|e| HttpError::Body(e.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use http::Method;
    use http_body_util::Full;

    #[tokio::test]
    async fn decodes_query_and_form() {
        let request = Request::builder()
            .method(Method::POST)
            .uri("/form.html?lang=en&tag=a&tag=b")
            .header(CONTENT_TYPE, "application/x-www-form-urlencoded; charset=UTF-8")
            .body(Full::new(Bytes::from_static(b"name=Ada+L&city=London")))
            .unwrap();

        let client = client_request(request).await.unwrap();
        assert_eq!(client.method, Method::POST);
        assert_eq!(client.path, "/form.html");
        assert_eq!(
            client.params,
            vec![
                ("lang".to_string(), "en".to_string()),
                ("tag".to_string(), "a".to_string()),
                ("tag".to_string(), "b".to_string()),
            ]
        );
        assert_eq!(client.form_attribute("name"), Some("Ada L"));
        assert_eq!(client.form_attribute("city"), Some("London"));
    }

    #[tokio::test]
    async fn non_form_body_is_kept_raw() {
        let request = Request::builder()
            .method(Method::POST)
            .uri("/api")
            .header(CONTENT_TYPE, "application/json")
            .body(Full::new(Bytes::from_static(b"{\"a\":1}")))
            .unwrap();

        let client = client_request(request).await.unwrap();
        assert!(client.form_attributes.is_empty());
        assert_eq!(client.body, Bytes::from_static(b"{\"a\":1}"));
    }
}
