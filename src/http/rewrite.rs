//! Back-channel URL repair.
//!
//! The Facebook OAuth client appends `?access_token=...` to Graph API URLs
//! that already carry a query string, producing `...?fields=id?access_token=...`.
//! The repair is a literal substring replacement on the serialized URL. OAuth
//! endpoint URLs (path containing `/oauth`) are already well-formed and are
//! never touched.

use std::borrow::Cow;

use hyper::http::uri::InvalidUri;
use hyper::{Request, Uri};
use thiserror::Error;

/// Paths containing this marker are OAuth endpoints and are left alone.
pub const OAUTH_PATH_MARKER: &str = "/oauth";

/// The malformed token delimiter emitted upstream.
pub const MALFORMED_TOKEN_PARAM: &str = "?access_token";

/// What [`MALFORMED_TOKEN_PARAM`] is replaced with.
pub const REPAIRED_TOKEN_PARAM: &str = "&access_token";

/// A URL that cannot be sent.
#[derive(Debug, Error)]
pub enum MalformedUrlError {
    /// The input itself is not a URI; no rewrite was attempted.
    #[error("URL `{url}` is not a valid URI")]
    Unparseable {
        url: String,
        #[source]
        source: InvalidUri,
    },

    /// The rewritten URL did not parse back into an absolute URI.
    #[error("rewritten URL `{url}` is not a valid absolute URI")]
    Rewritten {
        url: String,
        #[source]
        source: Option<InvalidUri>,
    },
}

impl MalformedUrlError {
    /// The offending URL text.
    pub fn url(&self) -> &str {
        match self {
            MalformedUrlError::Unparseable { url, .. }
            | MalformedUrlError::Rewritten { url, .. } => url,
        }
    }
}

/// Whether a URI with this path is exempt from rewriting.
pub fn is_oauth_path(path: &str) -> bool {
    path.contains(OAUTH_PATH_MARKER)
}

/// Replace every `?access_token` in `url` with `&access_token`.
///
/// Borrows when there is nothing to replace. Does not look at the path; see
/// [`normalize_uri`] for the full decision rule.
pub fn repair_token_delimiter(url: &str) -> Cow<'_, str> {
    if url.contains(MALFORMED_TOKEN_PARAM) {
        Cow::Owned(url.replace(MALFORMED_TOKEN_PARAM, REPAIRED_TOKEN_PARAM))
    } else {
        Cow::Borrowed(url)
    }
}

/// Parse a rewritten URL, requiring scheme and authority.
pub fn reparse_absolute(url: &str) -> Result<Uri, MalformedUrlError> {
    match Uri::try_from(url) {
        Ok(uri) if uri.scheme().is_some() && uri.authority().is_some() => Ok(uri),
        Ok(_) => Err(MalformedUrlError::Rewritten {
            url: url.to_string(),
            source: None,
        }),
        Err(e) => Err(MalformedUrlError::Rewritten {
            url: url.to_string(),
            source: Some(e),
        }),
    }
}

/// Result of applying the decision rule to one URI.
#[derive(Debug)]
pub enum Rewrite {
    /// Path contains `/oauth`.
    SkippedOauth,
    /// Nothing to replace.
    Unchanged,
    /// The repaired URI.
    Rewritten(Uri),
}

/// Apply the decision rule to `uri`.
pub fn normalize_uri(uri: &Uri) -> Result<Rewrite, MalformedUrlError> {
    if is_oauth_path(uri.path()) {
        return Ok(Rewrite::SkippedOauth);
    }

    let original = uri.to_string();
    match repair_token_delimiter(&original) {
        Cow::Borrowed(_) => Ok(Rewrite::Unchanged),
        Cow::Owned(repaired) => reparse_absolute(&repaired).map(Rewrite::Rewritten),
    }
}

/// String form of [`normalize_uri`] for callers holding a raw URL.
///
/// The input must parse as a URI. The replacement runs on the caller's text,
/// so parts `Uri` does not keep (the fragment) survive.
pub fn normalize_url(url: &str) -> Result<Cow<'_, str>, MalformedUrlError> {
    let uri = Uri::try_from(url).map_err(|e| MalformedUrlError::Unparseable {
        url: url.to_string(),
        source: e,
    })?;

    if is_oauth_path(uri.path()) {
        return Ok(Cow::Borrowed(url));
    }

    let repaired = repair_token_delimiter(url);
    if let Cow::Owned(text) = &repaired {
        reparse_absolute(text)?;
    }
    Ok(repaired)
}

/// Apply the decision rule to a request in place.
///
/// Only the URI is ever replaced. On error the request is left as it was.
pub fn normalize_request<B>(request: &mut Request<B>) -> Result<Rewrite, MalformedUrlError> {
    let rewrite = normalize_uri(request.uri())?;
    if let Rewrite::Rewritten(uri) = &rewrite {
        *request.uri_mut() = uri.clone();
    }
    Ok(rewrite)
}
