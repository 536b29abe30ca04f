//! Lazy iteration over paginated list responses.
//!
//! A [`Pager`] starts from the first page already fetched and pulls further
//! pages on demand by copying each page's continuation token into the request.
//! The pager is single-consumer; advance it from one task at a time.

use std::collections::HashSet;
use std::sync::Arc;

use futures::future::BoxFuture;
use futures::Stream;
use tracing::debug;

use crate::error::{ClientError, Result};
use crate::proto::{
    ListApplicablePoliciesRequest, ListApplicablePoliciesResponse, ListPoliciesRequest,
    ListPoliciesResponse, Policy,
};

/// A list request that accepts a continuation token.
pub trait PagedRequest: Clone + Send + Sync + 'static {
    fn page_token(&self) -> &str;
    fn set_page_token(&mut self, token: String);
}

/// One page of a list response.
pub trait PagedResponse: Clone + Send + Sync + 'static {
    type Item: Clone + Send + 'static;

    fn items(&self) -> &[Self::Item];
    /// Empty when there are no more pages.
    fn next_page_token(&self) -> &str;
    /// This page without its first `skip` items.
    fn tail(&self, skip: usize) -> Self;
}

/// Re-issues the list RPC for a given request.
pub type PageFetcher<Req, Resp> = Arc<dyn Fn(Req) -> BoxFuture<'static, Result<Resp>> + Send + Sync>;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum State {
    /// More items may be available.
    Active,
    /// Last page consumed, or a fetch failed.
    Exhausted,
}

/// Restartable, forward-only iterator over all items of a list RPC.
pub struct Pager<Req: PagedRequest, Resp: PagedResponse> {
    method: &'static str,
    original: Req,
    request: Req,
    fetch: PageFetcher<Req, Resp>,
    page: Resp,
    position: usize,
    page_taken: bool,
    seen_tokens: HashSet<String>,
    state: State,
}

impl<Req: PagedRequest, Resp: PagedResponse> Pager<Req, Resp> {
    /// Build a pager from the request that produced `first_page`.
    pub fn new(
        method: &'static str,
        request: Req,
        first_page: Resp,
        fetch: PageFetcher<Req, Resp>,
    ) -> Self {
        Self {
            method,
            original: request.clone(),
            request,
            fetch,
            page: first_page,
            position: 0,
            page_taken: false,
            seen_tokens: HashSet::new(),
            state: State::Active,
        }
    }

    /// Issue `request` and wrap the first page.
    pub async fn start(
        method: &'static str,
        request: Req,
        fetch: PageFetcher<Req, Resp>,
    ) -> Result<Self> {
        let first_page = (fetch)(request.clone()).await?;
        Ok(Self::new(method, request, first_page, fetch))
    }

    /// The page items are currently drawn from.
    pub fn current_page(&self) -> &Resp {
        &self.page
    }

    /// The request that produced the current page.
    pub fn current_request(&self) -> &Req {
        &self.request
    }

    pub fn is_exhausted(&self) -> bool {
        self.state == State::Exhausted
    }

    /// Next item, fetching a new page when the current one runs out.
    ///
    /// A fetch error is returned here, and the pager yields nothing afterwards.
    pub async fn next(&mut self) -> Result<Option<Resp::Item>> {
        loop {
            if self.state == State::Exhausted {
                return Ok(None);
            }
            if let Some(item) = self.page.items().get(self.position) {
                self.position += 1;
                self.page_taken = true;
                return Ok(Some(item.clone()));
            }
            if !self.advance().await? {
                return Ok(None);
            }
        }
    }

    /// Next page of items not yet handed out by `next` or `next_page`.
    ///
    /// After a partial `next`, this returns the rest of the current page
    /// before fetching another one.
    pub async fn next_page(&mut self) -> Result<Option<Resp>> {
        if self.state == State::Exhausted {
            return Ok(None);
        }
        let len = self.page.items().len();
        if !self.page_taken || self.position < len {
            let rest = if self.position == 0 {
                self.page.clone()
            } else {
                self.page.tail(self.position)
            };
            self.page_taken = true;
            self.position = len;
            return Ok(Some(rest));
        }
        if self.advance().await? {
            self.page_taken = true;
            self.position = self.page.items().len();
            Ok(Some(self.page.clone()))
        } else {
            Ok(None)
        }
    }

    /// Start over from the first page by re-issuing the original request.
    pub async fn restart(&mut self) -> Result<()> {
        debug!(method = self.method, "Restarting pager");
        let first_page = (self.fetch)(self.original.clone()).await?;
        self.request = self.original.clone();
        self.page = first_page;
        self.position = 0;
        self.page_taken = false;
        self.seen_tokens.clear();
        self.state = State::Active;
        Ok(())
    }

    /// Drain every remaining item.
    pub async fn collect_all(mut self) -> Result<Vec<Resp::Item>> {
        let mut items = Vec::new();
        while let Some(item) = self.next().await? {
            items.push(item);
        }
        Ok(items)
    }

    /// Adapt into a `Stream` of items. The stream ends after the first error.
    pub fn into_stream(self) -> impl Stream<Item = Result<Resp::Item>> {
        futures::stream::unfold(self, |mut pager| async move {
            match pager.next().await {
                Ok(Some(item)) => Some((Ok(item), pager)),
                Ok(None) => None,
                Err(e) => Some((Err(e), pager)),
            }
        })
    }

    /// Replace the current page with the following one. Returns false at the end.
    async fn advance(&mut self) -> Result<bool> {
        let token = self.page.next_page_token().to_string();
        if token.is_empty() {
            self.state = State::Exhausted;
            return Ok(false);
        }
        if token == self.request.page_token() || !self.seen_tokens.insert(token.clone()) {
            self.state = State::Exhausted;
            return Err(ClientError::InvalidResponse(format!(
                "{} returned page token '{}' that was already consumed",
                self.method, token
            )));
        }

        self.request.set_page_token(token);
        debug!(method = self.method, page_token = %self.request.page_token(), "Fetching next page");
        match (self.fetch)(self.request.clone()).await {
            Ok(page) => {
                self.page = page;
                self.position = 0;
                self.page_taken = false;
                Ok(true)
            }
            Err(e) => {
                self.state = State::Exhausted;
                Err(e)
            }
        }
    }
}

impl<Req, Resp> std::fmt::Debug for Pager<Req, Resp>
where
    Req: PagedRequest + std::fmt::Debug,
    Resp: PagedResponse,
{
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Pager")
            .field("method", &self.method)
            .field("request", &self.request)
            .field("position", &self.position)
            .field("state", &self.state)
            .finish_non_exhaustive()
    }
}

impl PagedRequest for ListPoliciesRequest {
    fn page_token(&self) -> &str {
        &self.page_token
    }

    fn set_page_token(&mut self, token: String) {
        self.page_token = token;
    }
}

impl PagedResponse for ListPoliciesResponse {
    type Item = Policy;

    fn items(&self) -> &[Policy] {
        &self.policies
    }

    fn next_page_token(&self) -> &str {
        &self.next_page_token
    }

    fn tail(&self, skip: usize) -> Self {
        Self {
            policies: self.policies.iter().skip(skip).cloned().collect(),
            ..self.clone()
        }
    }
}

impl PagedRequest for ListApplicablePoliciesRequest {
    fn page_token(&self) -> &str {
        &self.page_token
    }

    fn set_page_token(&mut self, token: String) {
        self.page_token = token;
    }
}

impl PagedResponse for ListApplicablePoliciesResponse {
    type Item = Policy;

    fn items(&self) -> &[Policy] {
        &self.policies
    }

    fn next_page_token(&self) -> &str {
        &self.next_page_token
    }

    fn tail(&self, skip: usize) -> Self {
        Self {
            policies: self.policies.iter().skip(skip).cloned().collect(),
            ..self.clone()
        }
    }
}

/// Pager over `ListPolicies`.
pub type ListPoliciesPager = Pager<ListPoliciesRequest, ListPoliciesResponse>;

/// Pager over `ListApplicablePolicies`. The `inaccessible` resources of each
/// page are available through [`Pager::current_page`].
pub type ListApplicablePoliciesPager =
    Pager<ListApplicablePoliciesRequest, ListApplicablePoliciesResponse>;
