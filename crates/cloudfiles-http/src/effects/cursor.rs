use futures_util::Stream;
use futures_util::stream;
use serde::de::DeserializeOwned;

use crate::core::{clamp_batch_limit, listing_url, status};
use crate::data::{Authentication, ResourcePath};
use crate::effects::{HttpClient, Request};
use crate::error::{Error, Result};

/// Tracing target for pagination operations.
pub const TRACING_TARGET: &str = "cloudfiles_http::cursor";

/// One record of a JSON listing.
pub trait ListingEntry: DeserializeOwned + Send {
    /// The name used as the `marker` when this is the last entry of a page.
    fn name(&self) -> &str;
}

/// Forward-only iterator over a paged listing.
///
/// The cursor holds one page in memory. Advancing past its last entry
/// requests the next page with the last name as `marker`. A page shorter
/// than the batch limit is the last one, so a collection of `N` entries is
/// read in `ceil(N / limit)` requests, plus one empty request when `N` is a
/// non-zero multiple of the limit.
///
/// Unlike a cursor that requests again after every non-empty page, this one
/// trusts the page size. A store that caps pages below the requested
/// `limit` therefore ends the listing early.
///
/// Every page request is authenticated; a token that expires mid-listing
/// is refreshed by the request engine and the cursor carries on.
///
/// The order of entries is whatever the store returns. Entries added or
/// removed while iterating may be skipped or seen twice.
pub struct Cursor<C: HttpClient, E: ListingEntry> {
    client:         C,
    resource:       ResourcePath,
    authentication: Authentication,
    batch_limit:    u32,
    page:           Option<Vec<E>>,
    /// `-1` for an empty page, `page.len()` once past the last entry.
    position:       isize,
    fetches:        u32,
}

impl<C: HttpClient, E: ListingEntry> Cursor<C, E> {
    /// An unfetched cursor. `batch_limit` is clamped to `1..=10_000`.
    pub fn new(
        client: C,
        resource: ResourcePath,
        authentication: Authentication,
        batch_limit: Option<i64>,
    ) -> Self {
        Self {
            client,
            resource,
            authentication,
            batch_limit: clamp_batch_limit(batch_limit),
            page: None,
            position: -1,
            fetches: 0,
        }
    }

    /// Creates a cursor and fetches its first page.
    pub async fn open(
        client: C,
        resource: ResourcePath,
        authentication: Authentication,
        batch_limit: Option<i64>,
    ) -> Result<Self> {
        let mut cursor = Self::new(client, resource, authentication, batch_limit);
        cursor.fetch().await?;
        Ok(cursor)
    }

    /// (Re)starts the listing from the first page.
    pub async fn fetch(&mut self) -> Result<&mut Self> {
        let page = self.fetch_page(None).await?;
        self.replace_page(page);
        Ok(self)
    }

    /// The entry under the cursor, or `None` at either end.
    pub fn current(&self) -> Result<Option<&E>> {
        let page = self.page()?;
        Ok(usize::try_from(self.position).ok().and_then(|index| page.get(index)))
    }

    /// Moves to the next entry, fetching the next page when needed.
    ///
    /// Does nothing once the cursor is at the end.
    pub async fn advance(&mut self) -> Result<&mut Self> {
        let len = self.page()?.len() as isize;
        if self.position < 0 || self.position >= len {
            return Ok(self);
        }

        self.position += 1;
        if self.position == len && len as u64 >= u64::from(self.batch_limit) {
            let marker = self
                .page
                .as_ref()
                .and_then(|page| page.last())
                .map(|entry| entry.name().to_owned());
            let page = self.fetch_page(marker).await?;
            self.replace_page(page);
        }

        Ok(self)
    }

    pub fn is_at_end(&self) -> Result<bool> {
        let len = self.page()?.len() as isize;
        Ok(self.position < 0 || self.position >= len)
    }

    pub fn is_not_at_end(&self) -> Result<bool> { self.is_at_end().map(|at_end| !at_end) }

    pub fn batch_limit(&self) -> u32 { self.batch_limit }

    /// Listing requests issued so far.
    pub fn page_fetches(&self) -> u32 { self.fetches }

    pub fn resource(&self) -> &ResourcePath { &self.resource }

    /// Drains the cursor as a stream, fetching the first page if needed.
    pub fn into_stream(self) -> impl Stream<Item = Result<E>>
    where
        E: Clone,
    {
        stream::try_unfold(self, |mut cursor| async move {
            if cursor.page.is_none() {
                cursor.fetch().await?;
            }
            let Some(entry) = cursor.current()?.cloned() else {
                return Ok::<_, Error>(None);
            };
            cursor.advance().await?;
            Ok(Some((entry, cursor)))
        })
    }

    fn page(&self) -> Result<&[E]> { self.page.as_deref().ok_or(Error::UnfetchedCursor) }

    fn replace_page(&mut self, page: Vec<E>) {
        self.position = if page.is_empty() { -1 } else { 0 };
        self.page = Some(page);
    }

    async fn fetch_page(&mut self, marker: Option<String>) -> Result<Vec<E>> {
        let session = self.authentication.session().clone();
        let collection = self.resource.resolve(&session.storage_url()?)?;
        let url = listing_url(&collection, self.batch_limit, marker.as_deref());

        tracing::debug!(
            target: TRACING_TARGET,
            url = %url,
            marker = marker.as_deref().unwrap_or_default(),
            "fetching listing page"
        );

        self.fetches += 1;
        let response = Request::get(self.client.clone(), url)
            .headers(move |headers| session.apply_auth_token(headers))
            .authentication(self.authentication.clone())
            .send(None)
            .await?;

        if response.status() == status::NO_CONTENT || response.body().iter().all(u8::is_ascii_whitespace) {
            return Ok(Vec::new());
        }

        response
            .json::<Vec<E>>()
            .map_err(|e| Error::InvalidResponse(format!("listing is not a JSON array of entries: {e}")))
    }
}
