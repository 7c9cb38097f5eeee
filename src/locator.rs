//! Repository Locator
//!
//! Turns a PPA identifier (`ppa:owner/name`) into the URL of its Launchpad
//! archive and reads the archive's `Release` manifest to learn the `Origin`
//! label apt uses to match pinning preferences.
//!
//! # Flow
//!
//! ```text
//! ppa:foo/bar
//!     ↓ PpaCoordinates::parse       (MalformedIdentifier, no network)
//! http://ppa.launchpad.net/foo/bar/ubuntu
//!     ↓ + dists/<codename>/Release  (codename from ReleaseIdentifier)
//! MetadataFetcher::fetch_text       (Network)
//!     ↓ parse_origin                (MetadataParse)
//! "LP-PPA-foo-bar"
//! ```

use crate::error::{PkgCustomError, Result};
use crate::release::ReleaseIdentifier;
use std::time::Duration;
use tracing::{debug, info};

/// Base URL of the Launchpad PPA archive host.
pub const PPA_ARCHIVE_BASE: &str = "http://ppa.launchpad.net";

const ORIGIN_PREFIX: &str = "Origin:";

/// The parts of a `tag:owner/name` repository identifier.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PpaCoordinates {
    pub tag: String,
    pub owner: String,
    pub name: String,
}

impl PpaCoordinates {
    /// Split an identifier into tag, owner and name.
    ///
    /// The tag is everything before the first `:`; the remainder must contain
    /// a `/` with a non-empty owner before it and a non-empty name after it.
    pub fn parse(identifier: &str) -> Result<Self> {
        let (tag, remainder) = identifier.split_once(':').ok_or_else(|| {
            PkgCustomError::malformed_identifier(identifier, "missing ':' separator")
        })?;

        let (owner, name) = remainder.split_once('/').ok_or_else(|| {
            PkgCustomError::malformed_identifier(identifier, "name must contain a '/'")
        })?;

        if owner.is_empty() || name.is_empty() {
            return Err(PkgCustomError::malformed_identifier(
                identifier,
                "owner and name must both be non-empty",
            ));
        }

        Ok(Self {
            tag: tag.to_string(),
            owner: owner.to_string(),
            name: name.to_string(),
        })
    }

    /// Canonical archive base URL for this PPA.
    pub fn base_url(&self) -> String {
        format!("{}/{}/{}/ubuntu", PPA_ARCHIVE_BASE, self.owner, self.name)
    }

    /// URL of the `Release` manifest for a given release codename.
    pub fn release_url(&self, codename: &str) -> String {
        format!("{}/dists/{}/Release", self.base_url(), codename)
    }
}

/// Derive the archive base URL for a repository identifier.
pub fn build_url(identifier: &str) -> Result<String> {
    PpaCoordinates::parse(identifier).map(|coords| coords.base_url())
}

/// Extract the trimmed value of the first `Origin:` line of a Release manifest.
pub fn parse_origin(body: &str) -> Result<String> {
    let value = body
        .lines()
        .find_map(|line| line.strip_prefix(ORIGIN_PREFIX))
        .map(str::trim)
        .ok_or_else(|| PkgCustomError::metadata_parse("Release file has no Origin: line"))?;

    if !is_valid_origin_label(value) {
        return Err(PkgCustomError::metadata_parse(format!(
            "Origin '{}' cannot be used as a pin label",
            value
        )));
    }

    Ok(value.to_string())
}

/// Whether apt will read a preferences file named after `label`.
///
/// apt skips files in `preferences.d` whose names use anything but
/// `[A-Za-z0-9_.-]`, or that carry an extension other than `pref`.
pub fn is_valid_origin_label(label: &str) -> bool {
    let charset_ok = !label.is_empty()
        && label
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || matches!(c, '-' | '_' | '.'));

    let extension_ok = match label.rsplit_once('.') {
        Some((stem, ext)) => !stem.is_empty() && ext == "pref",
        None => true,
    };

    charset_ok && extension_ok
}

/// Blocking text fetch of a single URL.
pub trait MetadataFetcher {
    /// Fetch `url` and return the body. Non-success status is a `Network` error.
    fn fetch_text(&self, url: &str) -> Result<String>;
}

/// `MetadataFetcher` backed by a blocking reqwest client.
pub struct HttpMetadataFetcher {
    http: reqwest::blocking::Client,
}

impl HttpMetadataFetcher {
    /// Create a new fetcher
    pub fn new() -> Result<Self> {
        let http = reqwest::blocking::Client::builder()
            .user_agent(concat!("pkgcustom/", env!("CARGO_PKG_VERSION")))
            .connect_timeout(Duration::from_secs(30))
            .build()
            .map_err(|e| PkgCustomError::network(format!("Failed to create HTTP client: {}", e)))?;

        Ok(Self { http })
    }
}

impl MetadataFetcher for HttpMetadataFetcher {
    fn fetch_text(&self, url: &str) -> Result<String> {
        debug!("GET {}", url);

        let response = self
            .http
            .get(url)
            .send()
            .map_err(|e| PkgCustomError::network(format!("Failed to fetch {}: {}", url, e)))?;

        let status = response.status();
        if !status.is_success() {
            return Err(PkgCustomError::network(format!(
                "{} returned HTTP {}",
                url, status
            )));
        }

        response
            .text()
            .map_err(|e| PkgCustomError::network(format!("Failed to read body of {}: {}", url, e)))
    }
}

/// Resolves a repository identifier to its origin label.
///
/// This is the seam the repository reconciler depends on.
pub trait OriginResolver {
    fn resolve_origin_label(&self, identifier: &str) -> Result<String>;
}

/// Resolves origin labels by fetching the PPA's Release manifest.
pub struct RepositoryLocator<F> {
    fetcher: F,
    release: ReleaseIdentifier,
}

impl<F: MetadataFetcher> RepositoryLocator<F> {
    pub fn new(fetcher: F, release: ReleaseIdentifier) -> Self {
        Self { fetcher, release }
    }
}

impl<F: MetadataFetcher> OriginResolver for RepositoryLocator<F> {
    fn resolve_origin_label(&self, identifier: &str) -> Result<String> {
        // Syntax first: a malformed identifier never reaches the network.
        let coords = PpaCoordinates::parse(identifier)?;
        let codename = self.release.current_release_codename()?;
        let url = coords.release_url(&codename);

        let body = self.fetcher.fetch_text(&url)?;
        let origin = parse_origin(&body)?;

        info!("Resolved origin label for {}: {}", identifier, origin);
        Ok(origin)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::RefCell;
    use std::io::Write;

    struct StaticFetcher {
        body: Result<String>,
        requested: RefCell<Vec<String>>,
    }

    impl StaticFetcher {
        fn ok(body: &str) -> Self {
            Self {
                body: Ok(body.to_string()),
                requested: RefCell::new(Vec::new()),
            }
        }

        fn failing() -> Self {
            Self {
                body: Err(PkgCustomError::network("HTTP 404")),
                requested: RefCell::new(Vec::new()),
            }
        }
    }

    impl MetadataFetcher for StaticFetcher {
        fn fetch_text(&self, url: &str) -> Result<String> {
            self.requested.borrow_mut().push(url.to_string());
            match &self.body {
                Ok(body) => Ok(body.clone()),
                Err(e) => Err(PkgCustomError::network(e.to_string())),
            }
        }
    }

    fn os_release(codename: &str) -> tempfile::NamedTempFile {
        let mut file = tempfile::NamedTempFile::new().expect("tempfile");
        writeln!(file, "ID=ubuntu\nUBUNTU_CODENAME={}", codename).expect("write");
        file
    }

    #[test]
    fn test_parse_coordinates() {
        let coords = PpaCoordinates::parse("ppa:foo/bar").expect("parse");
        assert_eq!(coords.tag, "ppa");
        assert_eq!(coords.owner, "foo");
        assert_eq!(coords.name, "bar");
    }

    #[test]
    fn test_build_url() {
        assert_eq!(
            build_url("ppa:deadsnakes/ppa").expect("url"),
            "http://ppa.launchpad.net/deadsnakes/ppa/ubuntu"
        );
    }

    #[test]
    fn test_release_url() {
        let coords = PpaCoordinates::parse("ppa:foo/bar").expect("parse");
        assert_eq!(
            coords.release_url("jammy"),
            "http://ppa.launchpad.net/foo/bar/ubuntu/dists/jammy/Release"
        );
    }

    #[test]
    fn test_build_url_rejects_missing_colon() {
        let err = build_url("foo/bar").unwrap_err();
        assert!(matches!(err, PkgCustomError::MalformedIdentifier { .. }));
    }

    #[test]
    fn test_build_url_rejects_missing_slash() {
        let err = build_url("ppa:foobar").unwrap_err();
        assert!(matches!(err, PkgCustomError::MalformedIdentifier { .. }));
    }

    #[test]
    fn test_build_url_rejects_empty_parts() {
        assert!(build_url("ppa:/bar").is_err());
        assert!(build_url("ppa:foo/").is_err());
    }

    #[test]
    fn test_parse_origin() {
        let body = "Origin: LP-PPA-foo-bar\nLabel: Bar\nSuite: jammy\n";
        assert_eq!(parse_origin(body).expect("origin"), "LP-PPA-foo-bar");
    }

    #[test]
    fn test_parse_origin_first_match_trimmed() {
        let body = "Label: x\nOrigin:   FooBar  \nOrigin: Other\n";
        assert_eq!(parse_origin(body).expect("origin"), "FooBar");
    }

    #[test]
    fn test_parse_origin_missing() {
        let err = parse_origin("Label: Bar\nSuite: jammy\n").unwrap_err();
        assert!(matches!(err, PkgCustomError::MetadataParse(_)));
    }

    #[test]
    fn test_parse_origin_rejects_path_like_labels() {
        assert!(parse_origin("Origin:\n").is_err());
        assert!(parse_origin("Origin: ../etc\n").is_err());
        assert!(parse_origin("Origin: ..\n").is_err());
    }

    #[test]
    fn test_origin_labels_apt_would_ignore_are_rejected() {
        assert!(is_valid_origin_label("LP-PPA-foo-bar"));
        assert!(is_valid_origin_label("Foo_Bar"));
        assert!(is_valid_origin_label("foobar.pref"));

        assert!(!is_valid_origin_label("Foo Bar"));
        assert!(!is_valid_origin_label("foo.bar"));
        assert!(!is_valid_origin_label(".pref"));
        assert!(!is_valid_origin_label("caf\u{e9}"));

        let err = parse_origin("Origin: Ubuntu Toolchain\n").unwrap_err();
        assert!(matches!(err, PkgCustomError::MetadataParse(_)));
    }

    #[test]
    fn test_resolve_origin_label() {
        let release = os_release("jammy");
        let locator = RepositoryLocator::new(
            StaticFetcher::ok("Origin: FooBar\n"),
            ReleaseIdentifier::new(release.path()),
        );

        assert_eq!(locator.resolve_origin_label("ppa:foo/bar").expect("label"), "FooBar");
        assert_eq!(
            *locator.fetcher.requested.borrow(),
            vec!["http://ppa.launchpad.net/foo/bar/ubuntu/dists/jammy/Release".to_string()]
        );
    }

    #[test]
    fn test_resolve_malformed_identifier_skips_network() {
        let release = os_release("jammy");
        let locator = RepositoryLocator::new(
            StaticFetcher::ok("Origin: FooBar\n"),
            ReleaseIdentifier::new(release.path()),
        );

        let err = locator.resolve_origin_label("ppa:foobar").unwrap_err();
        assert!(matches!(err, PkgCustomError::MalformedIdentifier { .. }));
        assert!(locator.fetcher.requested.borrow().is_empty());
    }

    #[test]
    fn test_resolve_propagates_network_error() {
        let release = os_release("jammy");
        let locator = RepositoryLocator::new(
            StaticFetcher::failing(),
            ReleaseIdentifier::new(release.path()),
        );

        let err = locator.resolve_origin_label("ppa:foo/bar").unwrap_err();
        assert!(matches!(err, PkgCustomError::Network(_)));
    }
}
