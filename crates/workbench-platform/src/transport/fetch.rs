//! HTTP transport over the browser's `fetch()`.
//!
//! The request goes out through gloo-net; the response body is pulled
//! from its `ReadableStream` one read at a time, so chunks reach the
//! decoder as the network delivers them.

use async_trait::async_trait;
use futures::stream;
use gloo_net::http::Request;
use js_sys::{Reflect, Uint8Array};
use wasm_bindgen::{JsCast, JsValue};
use wasm_bindgen_futures::JsFuture;
use web_sys::{ReadableStream, ReadableStreamDefaultReader};

use workbench_core::ports::{ByteStream, TransportPort, TransportResponse};
use workbench_types::{
    Result, WorkbenchError,
    config::TransportConfig,
    knowledge::RequestContext,
};

pub struct FetchTransport {
    url: String,
}

impl FetchTransport {
    pub fn new(config: &TransportConfig) -> Self {
        Self {
            url: config.stream_url(),
        }
    }

    pub fn url(&self) -> &str {
        &self.url
    }
}

#[async_trait(?Send)]
impl TransportPort for FetchTransport {
    async fn send(&self, context: &RequestContext) -> Result<TransportResponse> {
        log::debug!(
            "POST {} ({} knowledge ref(s))",
            self.url,
            context.knowledge.len()
        );

        let response = Request::post(&self.url)
            .header("Content-Type", "application/json")
            .json(context)
            .map_err(|e| WorkbenchError::Network(e.to_string()))?
            .send()
            .await
            .map_err(|e| WorkbenchError::Network(e.to_string()))?;

        let status = response.status();
        let body = response.body().map(body_stream);
        Ok(TransportResponse::new(status, body))
    }

    fn name(&self) -> &str {
        "fetch"
    }
}

fn js_err(e: JsValue) -> WorkbenchError {
    WorkbenchError::Network(format!("{:?}", e))
}

/// Read `body` piece by piece. Dropping the stream before the body ends
/// cancels the underlying download.
pub fn body_stream(body: ReadableStream) -> ByteStream {
    let reader = BodyReader {
        reader: body.get_reader().unchecked_into(),
        done: false,
    };
    Box::pin(stream::unfold(Some(reader), |reader| async move {
        let mut reader = reader?;
        match read_chunk(&reader.reader).await {
            Ok(Some(bytes)) => Some((Ok(bytes), Some(reader))),
            Ok(None) => {
                reader.done = true;
                None
            }
            Err(e) => Some((Err(e), None)),
        }
    }))
}

struct BodyReader {
    reader: ReadableStreamDefaultReader,
    done: bool,
}

impl Drop for BodyReader {
    fn drop(&mut self) {
        if !self.done {
            log::debug!("Cancelling unread response body");
            let _ = self.reader.cancel();
        }
    }
}

/// One `reader.read()`; `None` once the stream reports `done`.
async fn read_chunk(reader: &ReadableStreamDefaultReader) -> Result<Option<Vec<u8>>> {
    let result = JsFuture::from(reader.read()).await.map_err(js_err)?;

    let done = Reflect::get(&result, &JsValue::from_str("done"))
        .map_err(js_err)?
        .as_bool()
        .unwrap_or(false);
    if done {
        return Ok(None);
    }

    let value = Reflect::get(&result, &JsValue::from_str("value")).map_err(js_err)?;
    if !value.is_instance_of::<Uint8Array>() {
        return Err(WorkbenchError::Protocol(
            "response body yielded a non-byte chunk".to_string(),
        ));
    }
    Ok(Some(Uint8Array::new(&value).to_vec()))
}
