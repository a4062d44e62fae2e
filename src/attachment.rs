// Copyright (c) 2018-2025  Brendan Molloy <brendan@bbqsrc.net>,
//                          Ilya Solovyiov <ilya.solovyiov@gmail.com>,
//                          Kai Ren <tyranron@gmail.com>
//
// Licensed under the Apache License, Version 2.0 <LICENSE-APACHE or
// http://www.apache.org/licenses/LICENSE-2.0> or the MIT license
// <LICENSE-MIT or http://opensource.org/licenses/MIT>, at your
// option. This file may not be copied, modified, or distributed
// except according to those terms.

//! MIME and display-name resolution for embedded attachments.

use std::str::FromStr as _;

use mime::Mime;

/// Resolves the MIME type of an attachment.
///
/// The declared type wins when it is syntactically valid; otherwise the
/// bytes are probed for well-known signatures, and the name's extension is
/// consulted as a last resort.
#[must_use]
pub fn resolve_media_type(
    declared: Option<&str>,
    data: &[u8],
    name: Option<&str>,
) -> Option<String> {
    declared
        .filter(|ty| is_valid_media_type(ty))
        .map(ToOwned::to_owned)
        .or_else(|| sniff_bytes(data).map(ToOwned::to_owned))
        .or_else(|| {
            name.and_then(|n| mime_guess::from_path(n).first())
                .map(|m| m.essence_str().to_owned())
        })
}

/// Whether the declared media type is syntactically valid.
#[must_use]
pub fn is_valid_media_type(declared: &str) -> bool {
    declared.contains('/') && Mime::from_str(declared).is_ok()
}

/// Resolves the display name of an attachment: the declared name if
/// non-empty, else the top-level category of its MIME type.
#[must_use]
pub fn display_name(declared: Option<&str>, media_type: Option<&str>) -> String {
    declared
        .filter(|n| !n.is_empty())
        .map(ToOwned::to_owned)
        .or_else(|| {
            media_type
                .and_then(|ty| ty.split('/').next())
                .map(ToOwned::to_owned)
        })
        .unwrap_or_default()
}

/// Probes attachment bytes for well-known file signatures.
fn sniff_bytes(data: &[u8]) -> Option<&'static str> {
    const SIGNATURES: &[(&[u8], &str)] = &[
        (b"\x89PNG\r\n\x1a\n", "image/png"),
        (b"\xff\xd8\xff", "image/jpeg"),
        (b"GIF8", "image/gif"),
        (b"%PDF", "application/pdf"),
        (b"PK\x03\x04", "application/zip"),
        (b"\x1f\x8b", "application/gzip"),
    ];

    SIGNATURES
        .iter()
        .find(|(magic, _)| data.starts_with(magic))
        .map(|&(_, ty)| ty)
        .or_else(|| {
            std::str::from_utf8(data).is_ok().then_some("text/plain")
        })
}

#[cfg(test)]
mod tests {
    use super::*;

    const PNG: &[u8] = b"\x89PNG\r\n\x1a\n rest of the image";

    #[test]
    fn valid_declared_type_wins_over_content() {
        let ty = resolve_media_type(Some("application/json"), PNG, None);
        assert_eq!(ty.as_deref(), Some("application/json"));
    }

    #[test]
    fn malformed_declared_type_falls_back_to_sniffing() {
        let ty = resolve_media_type(Some("not a mime"), PNG, None);
        assert_eq!(ty.as_deref(), Some("image/png"));
    }

    #[test]
    fn name_extension_is_the_last_resort() {
        let ty = resolve_media_type(None, &[0xff, 0xfe, 0x00], Some("x.css"));
        assert_eq!(ty.as_deref(), Some("text/css"));
    }

    #[test]
    fn plain_text_bytes_sniff_as_text() {
        let ty = resolve_media_type(None, b"hello world", None);
        assert_eq!(ty.as_deref(), Some("text/plain"));
    }

    #[test]
    fn display_name_prefers_the_declared_one() {
        assert_eq!(display_name(Some("shot"), Some("image/png")), "shot");
        assert_eq!(display_name(Some(""), Some("image/png")), "image");
        assert_eq!(display_name(None, Some("text/plain")), "text");
        assert_eq!(display_name(None, None), "");
    }
}
