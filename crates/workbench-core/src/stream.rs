//! Stream consumer: turns one transport round trip into text increments.
//!
//! The body is never collected: each transport read is decoded and handed
//! on as soon as it forms complete characters. No retry, timeout or
//! cancellation lives here; callers wrap the future if they need those.

use std::rc::Rc;
use futures::future;
use futures::stream::{self, LocalBoxStream, Stream, StreamExt};
use workbench_types::{Result, WorkbenchError, knowledge::RequestContext};

use crate::decoder::Utf8StreamDecoder;
use crate::ports::{ByteStream, TransportPort, TransportResponse};

/// Clone-cheap handle around a transport
#[derive(Clone)]
pub struct StreamConsumer {
    transport: Rc<dyn TransportPort>,
}

impl StreamConsumer {
    pub fn new(transport: Rc<dyn TransportPort>) -> Self {
        Self { transport }
    }

    pub fn transport_name(&self) -> &str {
        self.transport.name()
    }

    /// Send `context` and feed every decoded piece of the answer to `on_chunk`,
    /// in arrival order. Pieces already delivered stay delivered if the
    /// stream fails later.
    pub async fn stream<F>(&self, context: &RequestContext, mut on_chunk: F) -> Result<()>
    where
        F: FnMut(&str),
    {
        let mut chunks = self.chunks(context);
        while let Some(chunk) = chunks.next().await {
            on_chunk(&chunk?);
        }
        Ok(())
    }

    /// The same increments as [`stream`](Self::stream), as a `Stream`.
    /// Ends after the first error.
    pub fn chunks(&self, context: &RequestContext) -> LocalBoxStream<'static, Result<String>> {
        let transport = self.transport.clone();
        let context = context.clone();

        stream::once(async move {
            let response = transport.send(&context).await?;
            log::debug!("{} responded with HTTP {}", transport.name(), response.status);
            into_body(response)
        })
        .map(|opened| match opened {
            Ok(body) => decode_body(body).boxed_local(),
            Err(e) => stream::once(future::ready(Err(e))).boxed_local(),
        })
        .flatten()
        .boxed_local()
    }
}

fn into_body(response: TransportResponse) -> Result<ByteStream> {
    if !response.is_success() {
        return Err(WorkbenchError::Transport {
            status: response.status,
        });
    }
    response
        .body
        .ok_or_else(|| WorkbenchError::Protocol("Empty response body".to_string()))
}

fn decode_body(body: ByteStream) -> impl Stream<Item = Result<String>> {
    stream::unfold(
        Some((body, Utf8StreamDecoder::new())),
        |state| async move {
            let (mut body, mut decoder) = state?;
            loop {
                match body.next().await {
                    Some(Ok(bytes)) => match decoder.decode(&bytes) {
                        // Only part of a character so far
                        Ok(text) if text.is_empty() => continue,
                        Ok(text) => return Some((Ok(text), Some((body, decoder)))),
                        Err(e) => return Some((Err(e), None)),
                    },
                    Some(Err(e)) => return Some((Err(e), None)),
                    None => {
                        return match decoder.finish() {
                            Ok(()) => None,
                            Err(e) => Some((Err(e), None)),
                        };
                    }
                }
            }
        },
    )
}
