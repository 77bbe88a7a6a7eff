use std::borrow::Cow;
use std::fs;
use std::io;
use std::path::Path;

use log::trace;
use rust_embed::RustEmbed;

#[derive(RustEmbed)]
#[folder = "resources/"]
pub struct Resources;

impl Resources {
    /// Returns an embedded text file.
    pub fn text(name: &str) -> anyhow::Result<Cow<'static, str>> {
        let file = Self::get(name)
            .ok_or_else(|| anyhow::anyhow!("`{}` should be embedded in the binary", name))?;

        Ok(match file.data {
            Cow::Borrowed(bytes) => Cow::Borrowed(std::str::from_utf8(bytes)?),
            Cow::Owned(bytes) => Cow::Owned(String::from_utf8(bytes)?),
        })
    }
}

pub fn read(path: impl AsRef<Path>) -> io::Result<Vec<u8>> {
    trace!("reading from: {}", path.as_ref().display());
    fs::read(path)
}

pub fn read_to_string(path: impl AsRef<Path>) -> io::Result<String> {
    trace!("reading from: {}", path.as_ref().display());
    fs::read_to_string(path)
}

pub fn write(path: impl AsRef<Path>, contents: impl AsRef<[u8]>) -> io::Result<()> {
    trace!("writing to: {}", path.as_ref().display());
    fs::write(path, contents)
}

pub fn create_dir_all(path: impl AsRef<Path>) -> io::Result<()> {
    trace!("creating directory: {}", path.as_ref().display());
    fs::create_dir_all(path)
}

pub trait PathExt {
    /// Whether the extension is one of `extensions`, ignoring case.
    #[must_use]
    fn has_any_extension(&self, extensions: &[&str]) -> bool;
}

impl PathExt for Path {
    fn has_any_extension(&self, extensions: &[&str]) -> bool {
        self.extension()
            .and_then(|ext| ext.to_str())
            .map_or(false, |ext| {
                extensions
                    .iter()
                    .any(|candidate| candidate.eq_ignore_ascii_case(ext))
            })
    }
}
