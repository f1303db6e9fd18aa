//! Line-oriented manifest text format
//!
//! ```text
//! ##<type tag>##[digest=<algorithm>;]<free-form message>
//! <path>\t<kind>\t<digest>\t<size>
//! ```
//!
//! `kind` is `d` or `f`. Directory lines carry the `-` digest and size 0.
//! The `digest=` prefix is omitted for sha256 manifests, so plain headers
//! read as sha256.

use crate::error::ManifestError;
use crate::manifest::{
    validate_type_tag, EntryKind, Manifest, ManifestEntry, DIRECTORY_DIGEST,
};
use crate::tree::hasher::DigestAlgorithm;
use crate::tree::path;
use std::borrow::Cow;
use std::collections::HashSet;
use std::fmt::Write as _;
use std::io::{self, Write};

const HEADER_MARKER: &str = "##";
const FIELD_COUNT: usize = 4;
const DIGEST_PREFIX: &str = "digest=";
const DIGEST_TERMINATOR: char = ';';

/// Render a manifest to its text form
pub fn to_text(manifest: &Manifest) -> String {
    let mut out = String::with_capacity(64 + manifest.len() * 96);
    let _ = writeln!(
        out,
        "{marker}{}{marker}{}",
        manifest.type_tag(),
        header_message(manifest),
        marker = HEADER_MARKER
    );
    for entry in manifest.entries() {
        let _ = writeln!(
            out,
            "{}\t{}\t{}\t{}",
            entry.path,
            entry.kind.tag(),
            entry.digest,
            entry.size
        );
    }
    out
}

fn header_message(manifest: &Manifest) -> Cow<'_, str> {
    let message = manifest.message();
    // A sha256 message that already looks like a prefix must be escaped
    if manifest.digest() == DigestAlgorithm::Sha256 && !message.starts_with(DIGEST_PREFIX) {
        return Cow::Borrowed(message);
    }
    Cow::Owned(format!(
        "{}{}{}{}",
        DIGEST_PREFIX,
        manifest.digest(),
        DIGEST_TERMINATOR,
        message
    ))
}

/// Split an optional `digest=<algorithm>;` prefix off a header message
fn split_digest(message: &str) -> (DigestAlgorithm, &str) {
    message
        .strip_prefix(DIGEST_PREFIX)
        .and_then(|rest| rest.split_once(DIGEST_TERMINATOR))
        .and_then(|(name, rest)| {
            name.parse::<DigestAlgorithm>()
                .ok()
                .map(|algorithm| (algorithm, rest))
        })
        .unwrap_or((DigestAlgorithm::Sha256, message))
}

/// Write a manifest's text form to `writer`
pub fn write_to<W: Write>(manifest: &Manifest, mut writer: W) -> io::Result<()> {
    writer.write_all(to_text(manifest).as_bytes())?;
    writer.flush()
}

/// Parse a manifest from its text form
///
/// Fails on a missing or malformed header, a data line with the wrong field
/// count, an unknown kind, a size that is not a non-negative integer, an
/// unsafe path, or a repeated path.
pub fn parse(text: &str) -> Result<Manifest, ManifestError> {
    let mut lines = text.lines().enumerate();

    let (type_tag, digest, message) = match lines.next() {
        Some((_, header)) => parse_header(header)?,
        None => return Err(ManifestError::malformed(1, "missing header")),
    };

    let mut entries = Vec::new();
    let mut seen = HashSet::new();

    for (idx, line) in lines {
        let line_no = idx + 1;
        let line = line.strip_suffix('\r').unwrap_or(line);
        if line.is_empty() {
            continue;
        }

        let entry = parse_entry(line, line_no)?;
        if !seen.insert(entry.path.clone()) {
            return Err(ManifestError::malformed(
                line_no,
                format!("duplicate path {:?}", entry.path),
            ));
        }
        entries.push(entry);
    }

    Ok(Manifest::new(type_tag, message, entries)?.with_digest(digest))
}

fn parse_header(header: &str) -> Result<(String, DigestAlgorithm, String), ManifestError> {
    let header = header.strip_suffix('\r').unwrap_or(header);
    let rest = header.strip_prefix(HEADER_MARKER).ok_or_else(|| {
        ManifestError::malformed(1, "missing '##<type>##' header")
    })?;
    let (type_tag, message) = rest.split_once(HEADER_MARKER).ok_or_else(|| {
        ManifestError::malformed(1, "header type tag is not terminated by '##'")
    })?;

    validate_type_tag(type_tag)
        .map_err(|_| ManifestError::malformed(1, format!("invalid type tag {:?}", type_tag)))?;

    let (digest, message) = split_digest(message);
    Ok((type_tag.to_string(), digest, message.to_string()))
}

fn parse_entry(line: &str, line_no: usize) -> Result<ManifestEntry, ManifestError> {
    let fields: Vec<&str> = line.split('\t').collect();
    if fields.len() != FIELD_COUNT {
        return Err(ManifestError::malformed(
            line_no,
            format!("expected {} fields, found {}", FIELD_COUNT, fields.len()),
        ));
    }

    let entry_path = fields[0];
    path::validate(entry_path).map_err(|e| ManifestError::malformed(line_no, e.to_string()))?;

    let kind = EntryKind::from_tag(fields[1]).ok_or_else(|| {
        ManifestError::malformed(line_no, format!("unknown entry kind {:?}", fields[1]))
    })?;

    let digest = fields[2];
    let size = parse_size(fields[3])
        .ok_or_else(|| ManifestError::malformed(line_no, format!("invalid size {:?}", fields[3])))?;

    match kind {
        EntryKind::Directory => {
            if digest != DIRECTORY_DIGEST || size != 0 {
                return Err(ManifestError::malformed(
                    line_no,
                    "directory entries must carry the '-' digest and size 0",
                ));
            }
            Ok(ManifestEntry::directory(entry_path))
        }
        EntryKind::File => {
            if digest.is_empty() || digest == DIRECTORY_DIGEST {
                return Err(ManifestError::malformed(
                    line_no,
                    format!("file entry has no digest: {:?}", digest),
                ));
            }
            Ok(ManifestEntry::file(entry_path, digest, size))
        }
    }
}

/// Sizes are plain decimal digits; signs and whitespace are rejected
fn parse_size(field: &str) -> Option<u64> {
    if field.is_empty() || !field.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    field.parse().ok()
}
