use std::io;
use std::path::{Path, PathBuf};
use std::process::Command;

use anyhow::Context;
use log::debug;
use tempfile::TempDir;
use thiserror::Error;

use crate::utils;

const INPUT_FILE: &str = "certificate.tex";
const OUTPUT_FILE: &str = "certificate.pdf";

#[derive(Debug, Error)]
pub enum RenderingError {
    #[error("failed to run `{}`", .path.display())]
    RunError {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("failed to read the compiled pdf")]
    ReadOutputFile(#[source] io::Error),
}

/// Compiles a single LaTeX document to pdf with `latexmk`.
pub struct TexRender {
    /// Path to latexmk.
    latex_mk_path: PathBuf,
    /// Temporary directory holding the document and its assets.
    working_dir: TempDir,
    /// Where the working directory is copied to if compiling fails.
    preserve_dir: Option<PathBuf>,
}

impl TexRender {
    pub fn from_bytes(source: impl AsRef<[u8]>) -> anyhow::Result<Self> {
        let working_dir = TempDir::new()?;
        utils::write(working_dir.path().join(INPUT_FILE), source.as_ref())?;

        Ok(Self {
            latex_mk_path: "latexmk".into(),
            working_dir,
            preserve_dir: None,
        })
    }

    /// Places a file next to the document, so it can be included by name.
    pub fn add_asset_from_bytes(&mut self, file_name: impl AsRef<Path>, bytes: &[u8]) -> io::Result<()> {
        utils::write(self.working_dir.path().join(file_name.as_ref()), bytes)
    }

    pub fn preserve_dir(&mut self, path: impl Into<PathBuf>) -> &mut Self {
        self.preserve_dir = Some(path.into());
        self
    }

    pub fn latex_mk_path(&mut self, latex_mk_path: impl Into<PathBuf>) -> &mut Self {
        self.latex_mk_path = latex_mk_path.into();
        self
    }

    fn preserve_working_dir(&self, path: &Path) -> anyhow::Result<()> {
        utils::create_dir_all(path)?;
        fs_extra::dir::copy(
            self.working_dir.path(),
            path,
            &fs_extra::dir::CopyOptions {
                overwrite: true,
                skip_exist: false,
                ..Default::default()
            },
        )
        .with_context(|| {
            format!(
                "failed to copy `{}` to `{}`",
                self.working_dir.path().display(),
                path.display()
            )
        })?;

        Ok(())
    }

    pub fn render(self) -> anyhow::Result<Vec<u8>> {
        let input_file = self.working_dir.path().join(INPUT_FILE);

        let mut cmd = Command::new(&self.latex_mk_path);
        cmd.args([
            "-interaction=nonstopmode",
            "-halt-on-error",
            "-file-line-error",
            "-pdf",
            "-xelatex",
            "-no-shell-escape",
            "-cd",
        ]);
        cmd.arg(&input_file);
        cmd.current_dir(self.working_dir.path());

        debug!("running {:?}", cmd);

        let output = cmd.output().map_err(|source| RenderingError::RunError {
            path: self.latex_mk_path.clone(),
            source,
        })?;

        if !output.status.success() {
            if let Some(path) = &self.preserve_dir {
                self.preserve_working_dir(path)?;
            }

            return Err(anyhow::anyhow!(
                "latexmk failed with status: {:?}, stdout: {}, stderr: {}",
                output.status.code(),
                String::from_utf8_lossy(&output.stdout),
                String::from_utf8_lossy(&output.stderr)
            ));
        }

        Ok(utils::read(self.working_dir.path().join(OUTPUT_FILE))
            .map_err(RenderingError::ReadOutputFile)?)
    }
}
