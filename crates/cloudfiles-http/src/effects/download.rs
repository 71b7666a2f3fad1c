use std::path::Path;

use cloudfiles_verify::{FileDigest, etag_matches};
use http::HeaderValue;
use tokio::io::{AsyncWrite, AsyncWriteExt};

use crate::core::{effective_chunk_size, headers, range_header, status};
use crate::data::{Authentication, DownloadOptions, DownloadPhase, DownloadSummary, Progress, ResourcePath};
use crate::effects::{HttpClient, Request};
use crate::error::{Error, Result};

/// Tracing target for range download operations.
pub const TRACING_TARGET: &str = "cloudfiles_http::download";

/// Fetches an object in bounded `Range` chunks and appends them to `sink`.
///
/// Chunks are requested strictly one after another. Each request is
/// authenticated, so a token that expires mid-download is refreshed and the
/// chunk replayed. The loop ends when the store answers `416`; the `ETag` of
/// that response is returned in the summary. Any other failure is returned
/// as is, and the sink is left as far as it got.
///
/// A `200` to the first request means the store ignored `Range` and sent the
/// whole object; the body is appended and the loop ends with that
/// response's `ETag`.
pub async fn download_range<C, W>(
    client: &C,
    resource: &ResourcePath,
    authentication: &Authentication,
    sink: &mut W,
    options: &DownloadOptions,
) -> Result<DownloadSummary>
where
    C: HttpClient,
    W: AsyncWrite + Unpin + Send,
{
    let chunk_size = effective_chunk_size(options.chunk_size);
    let session = authentication.session().clone();

    let mut offset = 0u64;
    let mut bytes = 0u64;
    let mut requests = 0u32;

    options.report(Progress {
        phase: DownloadPhase::Downloading,
        bytes_downloaded: 0,
        requests: 0,
    });

    loop {
        let url = resource.resolve(&session.storage_url()?)?;
        let range = range_header(offset, chunk_size);
        let setter_session = session.clone();
        let setter_range = range.clone();

        tracing::trace!(target: TRACING_TARGET, url = %url, range = %range, "requesting chunk");

        requests += 1;
        let result = Request::get(client.clone(), url)
            .headers(move |map| {
                setter_session.apply_auth_token(map);
                if let Ok(value) = HeaderValue::from_str(&setter_range) {
                    map.insert(headers::RANGE, value);
                }
            })
            .authentication(authentication.clone())
            .send(None)
            .await;

        let response = match result {
            Ok(response) => response,
            Err(Error::Request(err)) if err.status() == status::RANGE_NOT_SATISFIABLE => {
                let etag = err.response().header(&headers::ETAG).map(str::to_owned);
                tracing::debug!(
                    target: TRACING_TARGET,
                    bytes,
                    requests,
                    "range exhausted, download complete"
                );
                return Ok(DownloadSummary { bytes, requests, etag });
            }
            Err(err) => return Err(err),
        };

        match response.status() {
            status::PARTIAL_CONTENT => {
                let body = response.body();
                sink.write_all(body).await?;
                bytes += body.len() as u64;
                offset = offset.saturating_add(chunk_size);

                tracing::trace!(target: TRACING_TARGET, received = body.len(), bytes, "chunk appended");
                options.report(Progress {
                    phase: DownloadPhase::Downloading,
                    bytes_downloaded: bytes,
                    requests,
                });
            }
            status::OK if offset == 0 => {
                let body = response.body();
                sink.write_all(body).await?;
                bytes += body.len() as u64;

                tracing::debug!(target: TRACING_TARGET, bytes, "range ignored, whole object received");
                options.report(Progress {
                    phase: DownloadPhase::Downloading,
                    bytes_downloaded: bytes,
                    requests,
                });

                let etag = response.header(&headers::ETAG).map(str::to_owned);
                return Ok(DownloadSummary { bytes, requests, etag });
            }
            other => {
                return Err(Error::InvalidResponse(format!(
                    "expected 206 for range {range}, got {other}"
                )));
            }
        }
    }
}

/// Downloads an object into `destination`, then verifies it.
///
/// The file is flushed and closed before this returns, on success and on
/// failure alike. When `options.digest` is set, the closed file is hashed and
/// compared with the `ETag` of the terminating response; a mismatch, or a
/// missing `ETag`, fails with [`Error::Integrity`].
pub async fn download_to_file<C: HttpClient>(
    client: &C,
    resource: &ResourcePath,
    authentication: &Authentication,
    destination: &Path,
    options: &DownloadOptions,
) -> Result<DownloadSummary> {
    let mut file = tokio::fs::File::create(destination).await?;
    let downloaded = download_range(client, resource, authentication, &mut file, options).await;
    let closed = close(file).await;

    let summary = downloaded?;
    closed?;

    if let Some(ref digest) = options.digest {
        options.report(Progress {
            phase: DownloadPhase::Verifying,
            bytes_downloaded: summary.bytes,
            requests: summary.requests,
        });
        verify(destination, digest.as_ref(), summary.etag.as_deref())?;
    }

    options.report(Progress {
        phase: DownloadPhase::Completed,
        bytes_downloaded: summary.bytes,
        requests: summary.requests,
    });

    Ok(summary)
}

async fn close(mut file: tokio::fs::File) -> Result<()> {
    file.flush().await?;
    file.sync_all().await?;
    Ok(())
}

fn verify(destination: &Path, digest: &dyn FileDigest, etag: Option<&str>) -> Result<()> {
    let actual = digest.digest(destination)?;

    let expected = etag.unwrap_or_default();
    if etag_matches(expected, &actual) {
        tracing::debug!(target: TRACING_TARGET, path = %destination.display(), "digest verified");
        return Ok(());
    }

    tracing::warn!(
        target: TRACING_TARGET,
        path = %destination.display(),
        expected,
        actual = %actual,
        "downloaded file does not match its ETag"
    );
    Err(Error::Integrity {
        path: destination.to_path_buf(),
        expected: expected.to_owned(),
        actual,
    })
}
