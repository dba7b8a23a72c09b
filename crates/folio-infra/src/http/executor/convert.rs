//! Shared reqwest plumbing for the concrete executors.

use async_trait::async_trait;
use bytes::Bytes;
use reqwest::multipart::{Form, Part};

use folio_core::ports::{
    EncodedBody, ExecutorError, FormData, FormPart, HttpRequest, HttpResponse, ResponseBody,
};

/// Response body still held by reqwest, read on demand.
pub(crate) struct ReqwestBody(reqwest::Response);

#[async_trait]
impl ResponseBody for ReqwestBody {
    async fn bytes(self: Box<Self>) -> Result<Bytes, ExecutorError> {
        self.0.bytes().await.map_err(map_reqwest_error)
    }
}

/// Translate a prepared request into a reqwest builder.
pub(crate) fn build_request(
    client: &reqwest::Client,
    request: HttpRequest,
) -> Result<reqwest::RequestBuilder, ExecutorError> {
    let HttpRequest {
        method,
        url,
        headers,
        body,
        timeout,
        ..
    } = request;

    let mut builder = client.request(method, url).headers(headers);
    if let Some(timeout) = timeout {
        builder = builder.timeout(timeout);
    }

    let builder = match body {
        EncodedBody::Empty => builder,
        EncodedBody::Bytes(bytes) => builder.body(bytes),
        EncodedBody::Multipart(form) => builder.multipart(to_multipart(form)?),
    };
    Ok(builder)
}

fn to_multipart(form: FormData) -> Result<Form, ExecutorError> {
    let mut multipart = Form::new();
    for part in form.into_parts() {
        multipart = match part {
            FormPart::Text { name, value } => multipart.text(name, value),
            FormPart::File {
                name,
                file_name,
                content_type,
                bytes,
            } => {
                let mut file = Part::bytes(bytes.to_vec()).file_name(file_name);
                if let Some(ct) = content_type {
                    file = file
                        .mime_str(&ct)
                        .map_err(|e| ExecutorError::Transport(Box::new(e)))?;
                }
                multipart.part(name, file)
            }
        };
    }
    Ok(multipart)
}

/// Wrap a reqwest response without reading its body.
pub(crate) fn into_response(response: reqwest::Response) -> HttpResponse {
    let status = response.status();
    let headers = response.headers().clone();
    HttpResponse::new(status, headers, ReqwestBody(response))
}

pub(crate) fn map_reqwest_error(err: reqwest::Error) -> ExecutorError {
    if err.is_timeout() {
        ExecutorError::Timeout(Box::new(err))
    } else if err.is_connect() {
        ExecutorError::Connect(Box::new(err))
    } else if err.is_body() || err.is_decode() {
        ExecutorError::Body(Box::new(err))
    } else {
        ExecutorError::Transport(Box::new(err))
    }
}
