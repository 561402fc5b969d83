//! Bounded enricher
//!
//! Fan-out/fan-in over a fixed number of slots. A job takes a semaphore permit
//! before it is spawned and gives it back as soon as its work finishes, so no
//! more than `concurrency` jobs are ever in flight no matter how many are
//! submitted. Completions arrive on a channel in any order and are put back
//! into submission order before returning.
//!
//! Failures are per job: a failing job only affects its own result.

use super::cancel::CancelToken;
use super::model::ResourceRecord;
use crate::error::EnrichmentError;
use std::future::Future;
use std::sync::Arc;
use tokio::sync::{mpsc, Semaphore};

/// One record waiting for exactly one detail call
#[derive(Debug, Clone)]
pub struct EnrichmentJob {
    pub id: usize,
    /// Identifier passed to the detail call
    pub key: String,
    pub record: ResourceRecord,
}

/// Outcome of one job, carrying the job's identity
#[derive(Debug, Clone)]
pub struct EnrichmentResult {
    pub id: usize,
    pub key: String,
    pub outcome: Result<ResourceRecord, EnrichmentError>,
}

impl EnrichmentResult {
    pub fn is_ok(&self) -> bool {
        self.outcome.is_ok()
    }
}

pub struct BoundedEnricher {
    concurrency: usize,
    cancel: CancelToken,
}

impl BoundedEnricher {
    /// Create an enricher running at most `concurrency` jobs at once (minimum 1)
    pub fn new(concurrency: usize) -> Self {
        Self {
            concurrency: concurrency.max(1),
            cancel: CancelToken::new(),
        }
    }

    pub fn with_cancel(mut self, cancel: CancelToken) -> Self {
        self.cancel = cancel;
        self
    }

    pub fn concurrency(&self) -> usize {
        self.concurrency
    }

    /// Run `work` for every job and wait for all of them.
    ///
    /// Returns exactly one result per job, in submission order. Jobs not yet
    /// started when the cancel token fires are reported as cancelled.
    pub async fn enrich<F, Fut>(&self, jobs: Vec<EnrichmentJob>, work: F) -> Vec<EnrichmentResult>
    where
        F: Fn(EnrichmentJob) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = Result<ResourceRecord, EnrichmentError>> + Send + 'static,
    {
        let total = jobs.len();
        let semaphore = Arc::new(Semaphore::new(self.concurrency));
        let work = Arc::new(work);
        let (tx, mut rx) = mpsc::channel::<(usize, EnrichmentResult)>(total.max(1));

        let mut identities: Vec<(usize, String)> = Vec::with_capacity(total);
        let mut slots: Vec<Option<EnrichmentResult>> = (0..total).map(|_| None).collect();

        tracing::debug!("enriching {} records with {} slots", total, self.concurrency);

        for (slot, job) in jobs.into_iter().enumerate() {
            identities.push((job.id, job.key.clone()));

            let permit = if self.cancel.is_cancelled() {
                None
            } else {
                semaphore.clone().acquire_owned().await.ok()
            };

            // Re-check after waiting for a slot: cancellation may have happened meanwhile
            let Some(permit) = permit.filter(|_| !self.cancel.is_cancelled()) else {
                slots[slot] = Some(EnrichmentResult {
                    id: job.id,
                    key: job.key.clone(),
                    outcome: Err(EnrichmentError::Cancelled { key: job.key }),
                });
                continue;
            };

            let tx = tx.clone();
            let work = Arc::clone(&work);

            tokio::spawn(async move {
                let id = job.id;
                let key = job.key.clone();
                tracing::debug!("enrichment job {} ({}) started", id, key);

                let outcome = work(job).await;
                drop(permit);

                if let Err(err) = &outcome {
                    tracing::warn!("enrichment job {} failed: {}", id, err);
                }
                let _ = tx.send((slot, EnrichmentResult { id, key, outcome })).await;
            });
        }

        // The channel closes once every spawned job has reported or died
        drop(tx);
        while let Some((slot, result)) = rx.recv().await {
            slots[slot] = Some(result);
        }

        slots
            .into_iter()
            .zip(identities)
            .map(|(result, (id, key))| {
                result.unwrap_or_else(|| EnrichmentResult {
                    id,
                    key: key.clone(),
                    outcome: Err(EnrichmentError::Panicked { key }),
                })
            })
            .collect()
    }
}
