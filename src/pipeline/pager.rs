//! Page iterator
//!
//! Drives continuation-token pagination to completion. Any call failure is
//! fatal and discards what was collected so far; a token seen twice is
//! reported as [`ExportError::StalePagination`] instead of looping forever.

use super::cancel::CancelToken;
use crate::error::ExportError;
use crate::provider::{ListRequest, Provider};
use serde_json::Value;
use std::collections::HashSet;

pub struct PageIterator<'a, P: Provider + ?Sized> {
    provider: &'a P,
    request: &'a ListRequest,
    cancel: CancelToken,
}

impl<'a, P: Provider + ?Sized> PageIterator<'a, P> {
    pub fn new(provider: &'a P, request: &'a ListRequest) -> Self {
        Self {
            provider,
            request,
            cancel: CancelToken::new(),
        }
    }

    pub fn with_cancel(mut self, cancel: CancelToken) -> Self {
        self.cancel = cancel;
        self
    }

    /// Fetch every page, returning items in page-then-within-page order
    pub async fn fetch_all(&self) -> Result<Vec<Value>, ExportError> {
        let kind = &self.request.kind;
        let mut all_items = Vec::new();
        let mut seen_tokens: HashSet<String> = HashSet::new();
        let mut page_token: Option<String> = None;
        let mut page = 0usize;

        loop {
            if self.cancel.is_cancelled() {
                return Err(ExportError::Cancelled(kind.clone()));
            }

            page += 1;
            let result = self
                .provider
                .list(self.request, page_token.as_deref())
                .await
                .map_err(|source| ExportError::Fetch {
                    kind: kind.clone(),
                    source,
                })?;

            tracing::debug!(
                "{}: page {} returned {} items (more: {})",
                kind,
                page,
                result.items.len(),
                result.next_token.is_some()
            );
            all_items.extend(result.items);

            let Some(token) = result.next_token.filter(|t| !t.is_empty()) else {
                break;
            };

            if !seen_tokens.insert(token.clone()) {
                tracing::error!("{}: provider repeated continuation token on page {}", kind, page);
                return Err(ExportError::StalePagination {
                    kind: kind.clone(),
                    token,
                    page,
                });
            }
            page_token = Some(token);
        }

        tracing::info!("{}: fetched {} items in {} pages", kind, all_items.len(), page);
        Ok(all_items)
    }
}
