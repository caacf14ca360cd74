// Copyright (c) The parse-test-reports Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

use super::QuarantineList;
use crate::{
    errors::{LoadError, LoadErrorKind},
    plural,
};
use camino::{Utf8Path, Utf8PathBuf};
use std::fmt;
use tracing::{debug, info};

/// Where a quarantine document is loaded from.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum QuarantineSource {
    /// An `http://` or `https://` URL.
    Url(String),
    /// A path on the local filesystem.
    Path(Utf8PathBuf),
}

impl QuarantineSource {
    /// Interprets a setting as either a URL or a local path.
    pub fn parse(input: &str) -> Self {
        let input = input.trim();
        if input.starts_with("http://") || input.starts_with("https://") {
            Self::Url(input.to_owned())
        } else {
            Self::Path(input.into())
        }
    }
}

impl fmt::Display for QuarantineSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Url(url) => f.write_str(url),
            Self::Path(path) => write!(f, "{path}"),
        }
    }
}

/// Loads and validates the quarantine document from `source`.
pub fn load_quarantine_list(source: &QuarantineSource) -> Result<QuarantineList, LoadError> {
    let location = source.to_string();
    debug!("loading quarantine list from `{location}`");

    let contents = match source {
        QuarantineSource::Url(url) => fetch_url(url),
        QuarantineSource::Path(path) => read_path(path),
    }
    .map_err(|kind| LoadError::new(location.clone(), kind))?;

    let list = QuarantineList::from_yaml_str(&contents)
        .map_err(|err| LoadError::new(location.clone(), LoadErrorKind::Yaml(err)))?;

    info!(
        "loaded {} quarantine {} from `{location}`",
        list.len(),
        plural::entries_str(list.len()),
    );
    Ok(list)
}

fn fetch_url(url: &str) -> Result<String, LoadErrorKind> {
    let mut response = ureq::get(url).call().map_err(LoadErrorKind::Fetch)?;
    response
        .body_mut()
        .read_to_string()
        .map_err(LoadErrorKind::Fetch)
}

fn read_path(path: &Utf8Path) -> Result<String, LoadErrorKind> {
    fs_err::read_to_string(path).map_err(LoadErrorKind::Read)
}
