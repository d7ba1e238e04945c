// THEORY:
// The `worker_pipeline` module runs a whole conversion on an isolated worker
// context. The worker shares no memory with its caller: the pixels travel to it
// inside a one-shot `ConversionRequest` message, and exactly one reply travels
// back, either the newline-joined path markup or an error. There are no progress
// or partial messages.
//
// Key architectural principles:
// 1.  **Scoped Resource**: A `WorkerContext` is acquired per conversion and torn
//     down when it is finished, shut down or dropped. `shutdown` and `Drop` both
//     raise the worker's abort flag, which the worker checks every `yield_quantum`
//     pops, so an abandoned worker stops promptly and never posts a result.
//     `shutdown` additionally waits for the worker to exit.
// 2.  **Explicit Unavailability**: The worker runs on the tokio blocking pool. With
//     no runtime available there is nowhere to put it, and acquisition fails with
//     `ConvertError::WorkerUnavailable`. There is no silent fallback to the
//     cooperative strategy.
// 3.  **Same Algorithm**: The worker drives the same `ScanDriver` as every other
//     strategy, so its markup is byte-identical to theirs.

use serde::{Deserialize, Serialize};
use tokio::sync::oneshot;
use tracing::debug;

use crate::cancel::CancellationToken;
use crate::core_modules::pixel::Color;
use crate::core_modules::pixel_buffer::PixelBuffer;
use crate::error::{ConvertError, ConvertResult};
use crate::pipeline::{ConversionOutcome, ConverterConfig, Vectorizer};

/// The one message sent to a worker.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ConversionRequest {
    pub width: u32,
    pub height: u32,
    /// Row-major RGBA8 pixels, `width * height * 4` bytes.
    pub image_data: Vec<u8>,
    /// Optional seed-color override. Accepted for compatibility but not consulted:
    /// every seed uses its own sampled color.
    #[serde(default)]
    pub color: Option<[u8; 3]>,
}

impl ConversionRequest {
    pub fn new(width: u32, height: u32, image_data: Vec<u8>) -> Self {
        Self {
            width,
            height,
            image_data,
            color: None,
        }
    }

    pub fn with_color(mut self, color: Color) -> Self {
        self.color = Some(color.into());
        self
    }

    pub fn from_rgba_image(image: image::RgbaImage) -> Self {
        let (width, height) = image.dimensions();
        Self::new(width, height, image.into_raw())
    }

    /// Validates the request and borrows its pixels.
    pub fn pixel_buffer(&self) -> ConvertResult<PixelBuffer<'_>> {
        PixelBuffer::new(&self.image_data, self.width, self.height)
    }
}

type WorkerReply = ConvertResult<String>;

/// A single-use worker that converts one request.
pub struct WorkerContext {
    request_tx: Option<oneshot::Sender<ConversionRequest>>,
    reply_rx: Option<oneshot::Receiver<WorkerReply>>,
    handle: Option<tokio::task::JoinHandle<()>>,
    abort: CancellationToken,
}

impl WorkerContext {
    /// Spawns a worker on the current tokio runtime's blocking pool.
    pub fn acquire(config: ConverterConfig) -> ConvertResult<Self> {
        let runtime = tokio::runtime::Handle::try_current()
            .map_err(|err| ConvertError::worker_unavailable(err.to_string()))?;

        let (request_tx, request_rx) = oneshot::channel::<ConversionRequest>();
        let (reply_tx, reply_rx) = oneshot::channel::<WorkerReply>();
        let abort = CancellationToken::new();
        let worker_abort = abort.clone();

        let handle = runtime.spawn_blocking(move || {
            let Ok(request) = request_rx.blocking_recv() else {
                debug!("worker dismissed before a request arrived");
                return;
            };
            match run_request(&config, &request, &worker_abort) {
                Some(reply) => {
                    let _ = reply_tx.send(reply);
                }
                None => debug!("worker aborted"),
            }
        });

        Ok(Self {
            request_tx: Some(request_tx),
            reply_rx: Some(reply_rx),
            handle: Some(handle),
            abort,
        })
    }

    /// Hands the request to the worker. A context accepts exactly one request.
    pub fn submit(&mut self, request: ConversionRequest) -> ConvertResult<()> {
        let request_tx = self
            .request_tx
            .take()
            .ok_or_else(|| ConvertError::worker_failed("a request was already submitted"))?;
        request_tx
            .send(request)
            .map_err(|_| ConvertError::worker_failed("worker exited before receiving the request"))
    }

    /// Waits for the reply and for the worker to exit.
    pub async fn finish(mut self) -> ConvertResult<String> {
        let reply = self.next_reply().await;
        self.settle(reply).await
    }

    /// Raises the abort flag and waits for the worker to exit. Any result it
    /// was computing is discarded.
    pub async fn shutdown(mut self) -> ConvertResult<()> {
        self.abort.cancel();
        self.request_tx.take();
        self.reply_rx.take();
        self.join().await
    }

    /// Waits for the worker's one reply. `None` means it exited without one.
    /// Safe to drop mid-await; the reply channel stays with the context.
    pub(crate) async fn next_reply(&mut self) -> Option<WorkerReply> {
        // Dropping an unused request sender lets an idle worker exit.
        self.request_tx.take();
        let reply_rx = self.reply_rx.as_mut()?;
        let reply = reply_rx.await.ok();
        self.reply_rx = None;
        reply
    }

    /// Joins the worker and resolves `reply` into the conversion result.
    pub(crate) async fn settle(&mut self, reply: Option<WorkerReply>) -> ConvertResult<String> {
        let joined = self.join().await;
        match (reply, joined) {
            (Some(reply), _) => reply,
            (None, Err(err)) => Err(err),
            (None, Ok(())) => Err(ConvertError::worker_failed("worker exited without replying")),
        }
    }

    async fn join(&mut self) -> ConvertResult<()> {
        match self.handle.take() {
            Some(handle) => handle
                .await
                .map_err(|join_err| ConvertError::worker_failed(join_err.to_string())),
            None => Ok(()),
        }
    }
}

impl Drop for WorkerContext {
    fn drop(&mut self) {
        // No-op when the worker already finished.
        self.abort.cancel();
    }
}

/// Runs inside the worker. `None` means the worker was told to stop.
fn run_request(
    config: &ConverterConfig,
    request: &ConversionRequest,
    abort: &CancellationToken,
) -> Option<WorkerReply> {
    let buffer = match request.pixel_buffer() {
        Ok(buffer) => buffer,
        Err(err) => return Some(Err(err)),
    };

    let vectorizer = Vectorizer::new(config.clone());
    match vectorizer.convert_until(buffer, || abort.is_cancelled()) {
        ConversionOutcome::Completed(results) => {
            debug!(regions = results.len(), "worker finished");
            Some(Ok(results.to_markup(&vectorizer.emitter())))
        }
        ConversionOutcome::Cancelled => None,
    }
}
