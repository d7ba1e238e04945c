// THEORY:
// The `pipeline` module is the top-level API of the vectorizer. It wraps the scan,
// the flood fill and the path emitter behind a single `Vectorizer` and decides
// *where* the one sequential algorithm runs:
//
// 1.  **Synchronous** (`convert`): straight through on the caller's thread.
// 2.  **Cooperative** (`convert_cooperative`): on the caller's task, yielding back
//     to the async scheduler after every `yield_quantum` stack pops and checking
//     the caller's `CancellationToken` at each yield point.
// 3.  **Offloaded** (`convert_offloaded`): on a dedicated worker context reached
//     only through one-shot messages (see `worker_pipeline`).
//
// All three drive the same `ScanDriver` steps in the same order, so they produce
// byte-identical output for the same image. Yielding and offloading only change
// responsiveness and thread placement.

use tracing::{debug, info, warn};

use crate::cancel::CancellationToken;
use crate::core_modules::flood_fill::DEFAULT_SIMILARITY_THRESHOLD;
use crate::core_modules::path_emitter::{DEFAULT_STROKE_WIDTH, PathEmitter};
use crate::core_modules::pixel::Distance;
use crate::core_modules::pixel_buffer::PixelBuffer;
use crate::core_modules::region::ResultSet;
use crate::core_modules::scan_driver::{PopCounter, ScanDriver};
use crate::error::ConvertResult;
use crate::worker_pipeline::{ConversionRequest, WorkerContext};

/// Stack pops between cooperative yields.
pub const DEFAULT_YIELD_QUANTUM: usize = 30;

/// Configuration for the Vectorizer, allowing for tunable behavior.
#[derive(Debug, Clone)]
pub struct ConverterConfig {
    /// A pixel joins a region when its summed absolute RGB difference to the seed
    /// color is below this value. `1` means exact match; 0 is treated as 1.
    pub similarity_threshold: Distance,
    /// The `stroke-width` written on every path.
    pub stroke_width: u32,
    /// How many fill-stack pops happen between cooperative yields and cancellation
    /// checks. Values below 1 are treated as 1.
    pub yield_quantum: usize,
}

impl Default for ConverterConfig {
    fn default() -> Self {
        Self {
            similarity_threshold: DEFAULT_SIMILARITY_THRESHOLD,
            stroke_width: DEFAULT_STROKE_WIDTH,
            yield_quantum: DEFAULT_YIELD_QUANTUM,
        }
    }
}

/// Where a conversion runs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ExecutionStrategy {
    #[default]
    Cooperative,
    Offloaded,
}

/// The result of a conversion that may be cancelled.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConversionOutcome<T> {
    Completed(T),
    Cancelled,
}

impl<T> ConversionOutcome<T> {
    pub fn is_cancelled(&self) -> bool {
        matches!(self, ConversionOutcome::Cancelled)
    }

    pub fn completed(self) -> Option<T> {
        match self {
            ConversionOutcome::Completed(value) => Some(value),
            ConversionOutcome::Cancelled => None,
        }
    }

    pub fn map<U>(self, f: impl FnOnce(T) -> U) -> ConversionOutcome<U> {
        match self {
            ConversionOutcome::Completed(value) => ConversionOutcome::Completed(f(value)),
            ConversionOutcome::Cancelled => ConversionOutcome::Cancelled,
        }
    }
}

/// The main, top-level struct for the vectorizer.
#[derive(Debug, Clone, Default)]
pub struct Vectorizer {
    config: ConverterConfig,
}

impl Vectorizer {
    pub fn new(config: ConverterConfig) -> Self {
        Self { config }
    }

    pub fn emitter(&self) -> PathEmitter {
        PathEmitter::new(self.config.stroke_width)
    }

    /// Converts on the current thread without yielding.
    #[tracing::instrument(skip_all, fields(width = buffer.width(), height = buffer.height()))]
    pub fn convert(&self, buffer: PixelBuffer<'_>) -> ResultSet {
        let results = ScanDriver::new(buffer, self.config.similarity_threshold).run();
        info!(regions = results.len(), "conversion complete");
        results
    }

    /// Converts on the current thread, checking `should_stop` every
    /// `yield_quantum` pops. Used by the offloaded worker to honor teardown.
    pub fn convert_until(
        &self,
        buffer: PixelBuffer<'_>,
        should_stop: impl FnMut() -> bool,
    ) -> ConversionOutcome<ResultSet> {
        match ScanDriver::new(buffer, self.config.similarity_threshold)
            .run_until(self.config.yield_quantum, should_stop)
        {
            Some(results) => ConversionOutcome::Completed(results),
            None => ConversionOutcome::Cancelled,
        }
    }

    /// Converts on the caller's task, yielding to the scheduler every
    /// `yield_quantum` pops and stopping early if `cancel` fires.
    #[tracing::instrument(skip_all, fields(width = buffer.width(), height = buffer.height()))]
    pub async fn convert_cooperative(
        &self,
        buffer: PixelBuffer<'_>,
        cancel: &CancellationToken,
    ) -> ConversionOutcome<ResultSet> {
        if cancel.is_cancelled() {
            info!("conversion cancelled before start");
            return ConversionOutcome::Cancelled;
        }

        let mut driver = ScanDriver::new(buffer, self.config.similarity_threshold);
        let mut counter = PopCounter::new(self.config.yield_quantum);

        while driver.advance(&mut counter) {
            tokio::task::yield_now().await;
            if cancel.is_cancelled() {
                info!(pops = counter.pops(), "conversion cancelled");
                return ConversionOutcome::Cancelled;
            }
        }

        let results = driver.finish();
        info!(regions = results.len(), pops = counter.pops(), "conversion complete");
        ConversionOutcome::Completed(results)
    }

    /// Converts on a dedicated worker and returns the newline-joined path markup.
    /// Cancelling `cancel` tears the worker down and discards its work; the call
    /// returns only after the worker has exited.
    #[tracing::instrument(skip_all, fields(width = request.width, height = request.height))]
    pub async fn convert_offloaded(
        &self,
        request: ConversionRequest,
        cancel: &CancellationToken,
    ) -> ConvertResult<ConversionOutcome<String>> {
        request.pixel_buffer()?;

        if cancel.is_cancelled() {
            info!("offloaded conversion cancelled before start");
            return Ok(ConversionOutcome::Cancelled);
        }

        let mut worker = WorkerContext::acquire(self.config.clone())?;
        worker.submit(request)?;

        // Cancellation wins whenever both branches are ready.
        let received = tokio::select! {
            biased;
            _ = cancel.cancelled() => None,
            reply = worker.next_reply() => Some(reply),
        };

        let Some(reply) = received else {
            worker.shutdown().await?;
            info!("offloaded conversion cancelled");
            return Ok(ConversionOutcome::Cancelled);
        };

        let markup = worker.settle(reply).await?;
        debug!(bytes = markup.len(), "worker replied");
        Ok(ConversionOutcome::Completed(markup))
    }

    /// Runs `request` with the chosen strategy and returns the path markup.
    pub async fn convert_request(
        &self,
        strategy: ExecutionStrategy,
        request: ConversionRequest,
        cancel: &CancellationToken,
    ) -> ConvertResult<ConversionOutcome<String>> {
        if let Some(color) = request.color {
            warn!(?color, "seed color override is accepted but not used");
        }

        match strategy {
            ExecutionStrategy::Cooperative => {
                let buffer = request.pixel_buffer()?;
                let emitter = self.emitter();
                Ok(self
                    .convert_cooperative(buffer, cancel)
                    .await
                    .map(|results| results.to_markup(&emitter)))
            }
            ExecutionStrategy::Offloaded => self.convert_offloaded(request, cancel).await,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core_modules::pixel::Color;
    use crate::error::ConvertError;

    fn checkerboard(size: u32) -> Vec<u8> {
        let mut data = Vec::with_capacity((size * size * 4) as usize);
        for y in 0..size {
            for x in 0..size {
                let shade = if (x / 2 + y / 3) % 2 == 0 { 40 } else { 220 };
                data.extend_from_slice(&[shade, shade / 2, 255 - shade, 255]);
            }
        }
        data
    }

    #[test]
    fn default_config_matches_reference_constants() {
        let config = ConverterConfig::default();
        assert_eq!(config.similarity_threshold, 1);
        assert_eq!(config.stroke_width, 2);
        assert_eq!(config.yield_quantum, 30);
    }

    #[tokio::test]
    async fn cooperative_matches_synchronous() {
        let data = checkerboard(24);
        let buffer = PixelBuffer::new(&data, 24, 24).expect("valid buffer");
        let vectorizer = Vectorizer::default();

        let sync = vectorizer.convert(buffer);
        let cooperative = vectorizer
            .convert_cooperative(buffer, &CancellationToken::new())
            .await
            .completed()
            .expect("not cancelled");
        assert_eq!(sync, cooperative);
    }

    #[tokio::test]
    async fn cooperative_stops_at_a_yield_point() {
        let data = [9, 9, 9, 255].repeat(100 * 100);
        let buffer = PixelBuffer::new(&data, 100, 100).expect("valid buffer");
        let cancel = CancellationToken::new();
        let vectorizer = Vectorizer::default();

        let canceller = cancel.clone();
        let (outcome, ()) = tokio::join!(vectorizer.convert_cooperative(buffer, &cancel), async move {
            canceller.cancel();
        });
        assert!(outcome.is_cancelled());
    }

    #[tokio::test]
    async fn pre_cancelled_token_does_no_work() {
        let data = [1, 2, 3, 255].repeat(4);
        let buffer = PixelBuffer::new(&data, 2, 2).expect("valid buffer");
        let cancel = CancellationToken::new();
        cancel.cancel();
        let outcome = Vectorizer::default().convert_cooperative(buffer, &cancel).await;
        assert_eq!(outcome, ConversionOutcome::Cancelled);
    }

    #[tokio::test]
    async fn pre_cancelled_token_cancels_every_strategy() {
        let vectorizer = Vectorizer::default();
        let cancel = CancellationToken::new();
        cancel.cancel();

        for strategy in [ExecutionStrategy::Cooperative, ExecutionStrategy::Offloaded] {
            for _ in 0..200 {
                let outcome = vectorizer
                    .convert_request(strategy, ConversionRequest::new(1, 1, vec![1, 2, 3, 255]), &cancel)
                    .await
                    .expect("valid request");
                assert_eq!(outcome, ConversionOutcome::Cancelled, "{strategy:?}");
            }
        }
    }

    #[tokio::test]
    async fn strategies_agree_on_markup() {
        let data = checkerboard(16);
        let vectorizer = Vectorizer::default();
        let cancel = CancellationToken::new();

        let cooperative = vectorizer
            .convert_request(
                ExecutionStrategy::Cooperative,
                ConversionRequest::new(16, 16, data.clone()),
                &cancel,
            )
            .await
            .expect("valid request");
        let offloaded = vectorizer
            .convert_request(
                ExecutionStrategy::Offloaded,
                ConversionRequest::new(16, 16, data).with_color(Color::new(0, 0, 0)),
                &cancel,
            )
            .await
            .expect("valid request");

        assert_eq!(cooperative, offloaded);
        assert!(matches!(cooperative, ConversionOutcome::Completed(ref m) if !m.is_empty()));
    }

    #[tokio::test]
    async fn malformed_request_fails_before_scanning() {
        let vectorizer = Vectorizer::default();
        let cancel = CancellationToken::new();
        for strategy in [ExecutionStrategy::Cooperative, ExecutionStrategy::Offloaded] {
            let err = vectorizer
                .convert_request(strategy, ConversionRequest::new(2, 2, vec![0; 15]), &cancel)
                .await
                .expect_err("length mismatch");
            assert!(matches!(err, ConvertError::BufferLengthMismatch { expected: 16, actual: 15 }));
        }
    }

    #[test]
    fn offloaded_without_a_runtime_is_an_explicit_failure() {
        let vectorizer = Vectorizer::default();
        let request = ConversionRequest::new(1, 1, vec![1, 2, 3, 255]);
        let cancel = CancellationToken::new();

        // A plain executor provides no tokio runtime to host the worker.
        let result = futures::executor::block_on(vectorizer.convert_offloaded(request, &cancel));
        assert!(matches!(result, Err(ConvertError::WorkerUnavailable(_))));
    }
}
