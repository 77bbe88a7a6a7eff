use std::path::{Path, PathBuf};

use anyhow::Context;
use log::{debug, warn};

use crate::input::{Attendee, Branding, Club, Event};
use crate::latex_string::LatexString;
use crate::tex_render::TexRender;
use crate::utils;

/// Landscape US letter.
pub const PAGE_WIDTH_MM: f32 = 279.4;
pub const PAGE_HEIGHT_MM: f32 = 215.9;

const NAME_UNDERLINE_MM: f32 = 107.0;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Style {
    Normal,
    Bold,
    Italic,
}

impl Style {
    fn command(self) -> &'static str {
        match self {
            Self::Normal => "",
            Self::Bold => "\\bfseries ",
            Self::Italic => "\\itshape ",
        }
    }
}

/// A line of text centered on the page.
struct CenteredLine<'a> {
    label: Option<&'a str>,
    y: f32,
    size: u32,
    style: Style,
    text: LatexString,
}

impl CenteredLine<'_> {
    fn write_to(&self, output: &mut String) {
        output.push_str(&format!(
            "\\node[anchor=north, inner sep=0pt]{label} at ([yshift=-{y}mm]current page.north) {{{font}{style}{text}}};\n",
            label = self.label.map(|label| format!(" ({})", label)).unwrap_or_default(),
            y = self.y,
            font = font_size(self.size),
            style = self.style.command(),
            text = self.text,
        ));
    }
}

fn font_size(points: u32) -> String {
    format!("\\fontsize{{{}pt}}{{{}pt}}\\selectfont ", points, points * 6 / 5)
}

/// One certificate of attendance, for one attendee of one event.
#[derive(Debug, Clone, Copy)]
pub struct Certificate<'a> {
    attendee: &'a Attendee,
    event: &'a Event,
    club: &'a Club,
    branding: &'a Branding,
}

impl<'a> Certificate<'a> {
    #[must_use]
    pub fn new(attendee: &'a Attendee, event: &'a Event, club: &'a Club, branding: &'a Branding) -> Self {
        Self {
            attendee,
            event,
            club,
            branding,
        }
    }

    #[must_use]
    pub fn attendee(&self) -> &'a Attendee {
        self.attendee
    }

    #[must_use]
    pub fn event(&self) -> &'a Event {
        self.event
    }

    #[must_use]
    pub fn club(&self) -> &'a Club {
        self.club
    }

    #[must_use]
    pub fn branding(&self) -> &'a Branding {
        self.branding
    }

    /// `COA_<name>_<date>.pdf`, with spaces in the name and slashes in the raw
    /// date replaced.
    #[must_use]
    pub fn file_name(&self) -> String {
        certificate_file_name(self.attendee.name(), self.event.date().raw())
    }

    /// Returns the LaTeX source of the page.
    ///
    /// `image_file` is the name of the branding image next to the document, the
    /// logo is left out if there is none.
    #[must_use]
    pub fn to_latex(&self, image_file: Option<&str>) -> String {
        let mut output = String::new();

        output.push_str("\\documentclass{article}\n");
        output.push_str(&format!(
            "\\usepackage[paperwidth={}mm, paperheight={}mm, margin=0mm]{{geometry}}\n",
            PAGE_WIDTH_MM, PAGE_HEIGHT_MM
        ));
        output.push_str("\\usepackage{fontspec}\n");
        output.push_str("\\usepackage{graphicx}\n");
        output.push_str("\\usepackage{tikz}\n");
        output.push_str(&format!("\\setmainfont{{{}}}\n", self.branding.font()));
        output.push_str("\\pagestyle{empty}\n");
        output.push_str("\\begin{document}\n");
        output.push_str("\\begin{tikzpicture}[remember picture, overlay]\n");

        if let Some(image_file) = image_file {
            let (x, y) = self.branding.image_position();
            output.push_str(&format!(
                "\\node[anchor=north west, inner sep=0pt] at ([xshift={x}mm, yshift=-{y}mm]current page.north west) {{\\includegraphics[width={width}mm]{{{file}}}}};\n",
                x = x,
                y = y,
                width = self.branding.image_width(),
                file = image_file,
            ));
        }

        let (x, y) = self.branding.heading_position();
        output.push_str(&format!(
            "\\node[anchor=north west, inner sep=0pt] at ([xshift={x}mm, yshift=-{y}mm]current page.north west) {{{font}\\bfseries {name}}};\n",
            x = x,
            y = y,
            font = font_size(24),
            name = LatexString::from(self.club.name()),
        ));

        for line in self.lines() {
            line.write_to(&mut output);
        }

        output.push_str(&format!(
            "\\coordinate (underline) at ([yshift=-{}mm]current page.north);\n",
            NAME_UNDERLINE_MM
        ));
        output.push_str("\\draw[line width=0.8pt] (underline -| name.west) -- (underline -| name.east);\n");

        output.push_str("\\end{tikzpicture}\n");
        output.push_str("\\mbox{}\n");
        output.push_str("\\end{document}\n");

        output
    }

    fn lines(&self) -> [CenteredLine<'static>; 8] {
        let line = |y, size, style, text: &str| CenteredLine {
            label: None,
            y,
            size,
            style,
            text: LatexString::from(text),
        };

        [
            line(55.0, 36, Style::Bold, "CERTIFICATE OF ATTENDANCE"),
            line(70.0, 18, Style::Normal, "This is to certify that"),
            CenteredLine {
                label: Some("name"),
                ..line(95.0, 24, Style::Bold, self.attendee.name())
            },
            line(
                120.0,
                16,
                Style::Normal,
                "Earned one (1) Professional Development Hour (PDH) by attending",
            ),
            line(135.0, 16, Style::Normal, "the presentation by:"),
            line(150.0, 18, Style::Italic, self.event.speaker()),
            line(165.0, 18, Style::Italic, self.event.topic()),
            line(
                185.0,
                16,
                Style::Normal,
                &format!(
                    "Conducted in {} on {}",
                    self.club.city(),
                    self.event.date().raw()
                ),
            ),
        ]
    }
}

#[must_use]
pub fn certificate_file_name(name: &str, date: &str) -> String {
    format!("COA_{}_{}.pdf", name.replace(' ', "_"), date.replace('/', "-"))
}

/// Turns a certificate into pdf bytes.
pub trait CertificateRenderer {
    fn render(&self, certificate: &Certificate<'_>) -> anyhow::Result<Vec<u8>>;
}

/// Renders certificates with `latexmk` and XeLaTeX.
#[derive(Debug, Clone, Default)]
pub struct LatexRenderer {
    image: Option<(String, Vec<u8>)>,
    latex_mk_path: Option<PathBuf>,
    preserve_dir: Option<PathBuf>,
}

impl LatexRenderer {
    /// Reads the branding image once. A missing image is not an error, the
    /// certificates are rendered without it.
    #[must_use]
    pub fn new(branding: &Branding) -> Self {
        let image = branding.image().and_then(|path| match utils::read(path) {
            Ok(bytes) => {
                let extension = path
                    .extension()
                    .and_then(|ext| ext.to_str())
                    .unwrap_or("png");
                Some((format!("branding.{}", extension), bytes))
            }
            Err(e) => {
                warn!(
                    "could not read branding image `{}`, rendering without it: {}",
                    path.display(),
                    e
                );
                None
            }
        });

        Self {
            image,
            latex_mk_path: None,
            preserve_dir: None,
        }
    }

    #[must_use]
    pub fn with_latex_mk_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.latex_mk_path = Some(path.into());
        self
    }

    #[must_use]
    pub fn with_preserve_dir(mut self, path: impl Into<PathBuf>) -> Self {
        self.preserve_dir = Some(path.into());
        self
    }

    #[must_use]
    pub fn has_image(&self) -> bool {
        self.image.is_some()
    }
}

impl CertificateRenderer for LatexRenderer {
    fn render(&self, certificate: &Certificate<'_>) -> anyhow::Result<Vec<u8>> {
        let image_file = self.image.as_ref().map(|(name, _)| name.as_str());
        let mut renderer = TexRender::from_bytes(certificate.to_latex(image_file))?;

        if let Some((name, bytes)) = &self.image {
            renderer.add_asset_from_bytes(name, bytes)?;
        }

        if let Some(path) = &self.latex_mk_path {
            renderer.latex_mk_path(path);
        }

        if let Some(path) = &self.preserve_dir {
            renderer.preserve_dir(path);
        }

        renderer.render()
    }
}

/// Renders the certificate and writes it into `output_dir`.
///
/// Returns where the pdf was written to and its contents.
pub fn write_certificate(
    renderer: &impl CertificateRenderer,
    certificate: &Certificate<'_>,
    output_dir: &Path,
) -> anyhow::Result<(PathBuf, Vec<u8>)> {
    let bytes = renderer.render(certificate)?;
    let path = output_dir.join(certificate.file_name());

    utils::write(&path, &bytes)
        .with_context(|| format!("failed to write `{}`", path.display()))?;
    debug!("wrote {}", path.display());

    Ok((path, bytes))
}
