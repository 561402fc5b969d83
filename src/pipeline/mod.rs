//! Export pipeline
//!
//! One resource kind flows through the stages in order:
//!
//! - [`pager`] - collects every page of the listing
//! - [`crate::resource::mapper`] - raw items to records, dropping excluded ones
//! - [`enrich`] - one bounded-concurrency detail call per record, when the kind has one
//! - [`render`] - per-record Terraform blocks from the kind's template
//! - [`canonical`] - parse and re-emit in canonical layout
//!
//! [`PipelineContext`] owns everything the stages share for one invocation.

pub mod cancel;
pub mod canonical;
pub mod enrich;
pub mod helpers;
pub mod model;
pub mod pager;
pub mod render;

use crate::config::PipelineSettings;
use crate::error::{EnrichmentError, ExportError};
use crate::provider::Provider;
use crate::resource::{self, map_collection, map_record, ResourceDef};
use cancel::CancelToken;
use canonical::Canonicalizer;
use enrich::{BoundedEnricher, EnrichmentJob};
use model::ResourceCollection;
use render::{RenderContext, TemplateRenderer};
use serde::Serialize;
use std::collections::BTreeMap;
use std::sync::Arc;

/// Where resources are read from. Exposed to templates as `scope`.
#[derive(Debug, Clone, Serialize)]
pub struct Scope {
    pub project: String,
    pub region: String,
    pub zone: String,
    /// Per-command parameters such as `managed_zone`
    #[serde(flatten)]
    pub params: BTreeMap<String, String>,
}

impl Scope {
    pub fn new(project: &str, region: &str, zone: &str) -> Self {
        Self {
            project: project.to_string(),
            region: region.to_string(),
            zone: zone.to_string(),
            params: BTreeMap::new(),
        }
    }

    pub fn with_param(mut self, name: &str, value: &str) -> Self {
        self.params.insert(name.to_string(), value.to_string());
        self
    }

    /// Value for a path placeholder
    pub fn lookup(&self, name: &str) -> Option<String> {
        match name {
            "project" => Some(self.project.clone()),
            "region" => Some(self.region.clone()),
            "zone" => Some(self.zone.clone()),
            other => self.params.get(other).cloned(),
        }
    }
}

/// A record that was left out of the output
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EnrichmentFailure {
    pub key: String,
    pub message: String,
}

/// Outcome of exporting one resource kind
#[derive(Debug, Clone, Default)]
pub struct ExportReport {
    pub kind: String,
    /// Items returned by the listing
    pub fetched: usize,
    /// Items dropped by exclusion rules
    pub excluded: usize,
    pub rendered: usize,
    pub skipped_empty: usize,
    pub failures: Vec<EnrichmentFailure>,
    /// Canonical configuration text
    pub text: String,
    /// `terraform import` commands, one per rendered record
    pub imports: Vec<String>,
}

impl ExportReport {
    pub fn has_failures(&self) -> bool {
        !self.failures.is_empty()
    }
}

/// Per-invocation state shared by every stage
pub struct PipelineContext<P: Provider + 'static> {
    provider: Arc<P>,
    scope: Scope,
    settings: PipelineSettings,
    renderer: TemplateRenderer,
    canonicalizer: Canonicalizer,
    cancel: CancelToken,
}

impl<P: Provider + 'static> PipelineContext<P> {
    /// Build the context, registering and validating every shipped template
    pub fn new(provider: Arc<P>, scope: Scope, settings: PipelineSettings) -> Result<Self, ExportError> {
        let mut renderer = TemplateRenderer::default();
        for def in resource::all_resources() {
            renderer.register(def.template_spec()?)?;
        }

        Ok(Self {
            provider,
            scope,
            settings,
            renderer,
            canonicalizer: Canonicalizer::new(),
            cancel: CancelToken::new(),
        })
    }

    /// Token that stops the pipeline at the next page or job boundary
    pub fn cancel_token(&self) -> CancelToken {
        self.cancel.clone()
    }

    pub fn scope(&self) -> &Scope {
        &self.scope
    }

    /// Run the whole pipeline for one kind
    pub async fn export(&self, def: &ResourceDef) -> Result<ExportReport, ExportError> {
        let request = def.list_request(&self.scope, self.settings.page_size)?;
        let items = pager::PageIterator::new(self.provider.as_ref(), &request)
            .with_cancel(self.cancel.clone())
            .fetch_all()
            .await?;

        let mut report = ExportReport {
            kind: def.key.clone(),
            fetched: items.len(),
            ..Default::default()
        };

        let mapped = map_collection(def, &items);
        report.excluded = mapped.excluded;
        report.failures.extend(
            mapped
                .failures
                .into_iter()
                .map(|(key, message)| EnrichmentFailure { key, message }),
        );

        let collection = match &def.detail {
            Some(_) => self.enrich(def, mapped.collection, &mut report).await?,
            None => mapped.collection,
        };

        let rendered = self.renderer.render(&RenderContext {
            collection: &collection,
            template: &def.key,
            scope: &self.scope,
        })?;
        report.rendered = rendered.rendered;
        report.skipped_empty = rendered.skipped_empty;
        report.imports = rendered.imports;

        report.text = if rendered.text.is_empty() {
            String::new()
        } else {
            self.canonicalizer.canonicalize(&rendered.text)?
        };

        tracing::info!(
            "{}: fetched {}, excluded {}, rendered {}, skipped {}, failed {}",
            report.kind,
            report.fetched,
            report.excluded,
            report.rendered,
            report.skipped_empty,
            report.failures.len()
        );
        Ok(report)
    }

    /// Run the kind's detail call for every record. Failed records are dropped
    /// from the collection and listed in the report.
    async fn enrich(
        &self,
        def: &ResourceDef,
        collection: ResourceCollection,
        report: &mut ExportReport,
    ) -> Result<ResourceCollection, ExportError> {
        let Some(detail) = def.detail.clone() else {
            return Ok(collection);
        };

        let jobs: Vec<EnrichmentJob> = collection
            .into_iter()
            .enumerate()
            .map(|(id, record)| EnrichmentJob {
                id,
                key: record.key(&def.id_field),
                record,
            })
            .collect();

        let provider = Arc::clone(&self.provider);
        let scope = self.scope.clone();
        let results = BoundedEnricher::new(self.settings.concurrency)
            .with_cancel(self.cancel.clone())
            .enrich(jobs, move |job| {
                let provider = Arc::clone(&provider);
                let request = detail.describe_request(&scope, &job.key);
                let fields = detail.fields.clone();

                async move {
                    let request = request.map_err(|message| EnrichmentError::Mapping {
                        key: job.key.clone(),
                        message,
                    })?;
                    let raw = provider
                        .describe(&request)
                        .await
                        .map_err(|source| EnrichmentError::Provider {
                            key: job.key.clone(),
                            source,
                        })?;
                    let details = map_record(&raw, &fields).map_err(|message| {
                        EnrichmentError::Mapping {
                            key: job.key.clone(),
                            message,
                        }
                    })?;

                    let mut record = job.record;
                    record.merge(details);
                    Ok::<_, EnrichmentError>(record)
                }
            })
            .await;

        if self.cancel.is_cancelled() {
            return Err(ExportError::Cancelled(def.key.clone()));
        }

        let mut enriched = ResourceCollection::new();
        for result in results {
            match result.outcome {
                Ok(record) => enriched.push(record),
                Err(err) => {
                    tracing::warn!("{}: leaving out {}: {}", def.key, result.key, err);
                    report.failures.push(EnrichmentFailure {
                        key: result.key,
                        message: err.to_string(),
                    });
                }
            }
        }
        Ok(enriched)
    }
}
