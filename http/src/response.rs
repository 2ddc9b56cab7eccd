use bytes::Bytes;
use http::{Response, StatusCode};
use http_body_util::Full;
use knotwork_core::ClientResponse;

pub type HttpResponse = Response<Full<Bytes>>;

pub fn into_response(client: ClientResponse) -> HttpResponse {
    let mut response = Response::new(Full::new(client.body));
    *response.status_mut() = client.status;
    *response.headers_mut() = client.headers;
    response
}

/// Bodyless response carrying only a status.
pub fn status_response(status: StatusCode) -> HttpResponse {
    let mut response = Response::new(Full::new(Bytes::new()));
    *response.status_mut() = status;
    response
}
