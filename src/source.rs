// Copyright (c) 2018-2025  Brendan Molloy <brendan@bbqsrc.net>,
//                          Ilya Solovyiov <ilya.solovyiov@gmail.com>,
//                          Kai Ren <tyranron@gmail.com>
//
// Licensed under the Apache License, Version 2.0 <LICENSE-APACHE or
// http://www.apache.org/licenses/LICENSE-2.0> or the MIT license
// <LICENSE-MIT or http://opensource.org/licenses/MIT>, at your
// option. This file may not be copied, modified, or distributed
// except according to those terms.

//! Feature-file source retrieval.

use std::{fs, io};

/// Loader of feature-file sources, keyed by URI.
///
/// The reporter reads a feature source at most once per scenario start, to
/// extract `Examples`-row parameters. This is the only blocking operation an
/// event handler performs.
pub trait SourceLoader: Send + Sync {
    /// Loads the source text behind the given URI.
    fn load(&self, uri: &str) -> io::Result<String>;
}

/// [`SourceLoader`] reading from the local filesystem.
///
/// A `file://` scheme prefix is tolerated; anything else is treated as a
/// plain path.
#[derive(Clone, Copy, Debug, Default)]
pub struct FsLoader;

impl SourceLoader for FsLoader {
    fn load(&self, uri: &str) -> io::Result<String> {
        fs::read_to_string(uri.strip_prefix("file://").unwrap_or(uri))
    }
}
