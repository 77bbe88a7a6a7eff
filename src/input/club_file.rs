use std::path::{Path, PathBuf};

use serde::Deserialize;

use crate::utils::Resources;

/// The contents of the optional club configuration file. Every key has a
/// default, so an empty file is valid.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ClubFile {
    club: Club,
    branding: Branding,
    mail: MailSettings,
    paths: Paths,
}

impl ClubFile {
    /// The defaults that ship with the binary.
    pub fn embedded() -> anyhow::Result<Self> {
        Ok(toml::from_str(&Resources::text("club.toml")?)?)
    }

    #[must_use]
    pub fn club(&self) -> &Club {
        &self.club
    }

    #[must_use]
    pub fn branding(&self) -> &Branding {
        &self.branding
    }

    #[must_use]
    pub fn mail(&self) -> &MailSettings {
        &self.mail
    }

    #[must_use]
    pub fn paths(&self) -> &Paths {
        &self.paths
    }

    /// Makes every relative path in the file relative to `workspace`.
    pub(crate) fn resolve_paths(&mut self, workspace: &Path) {
        let resolve = |path: &mut PathBuf| {
            if path.is_relative() {
                *path = workspace.join(&*path);
            }
        };

        if let Some(image) = self.branding.image.as_mut() {
            resolve(image);
        }

        resolve(&mut self.mail.env_file);
        resolve(&mut self.paths.output_dir);

        for path in [
            self.paths.attendance.as_mut(),
            self.paths.roster.as_mut(),
            self.paths.calendar.as_mut(),
        ]
        .into_iter()
        .flatten()
        {
            resolve(path);
        }

        // a bare program name is looked up in `PATH`
        if let Some(path) = self.paths.latex_mk_path.as_mut() {
            if path.components().count() > 1 {
                resolve(path);
            }
        }
    }
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Club {
    name: String,
    short_name: String,
    city: String,
    season: String,
}

impl Default for Club {
    fn default() -> Self {
        Self {
            name: "Little Rock Engineers Club".to_string(),
            short_name: "LREC".to_string(),
            city: "Little Rock, Arkansas".to_string(),
            season: "2025-2026".to_string(),
        }
    }
}

impl Club {
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    #[must_use]
    pub fn short_name(&self) -> &str {
        &self.short_name
    }

    /// The place printed on certificates, for example `"Little Rock, Arkansas"`.
    #[must_use]
    pub fn city(&self) -> &str {
        &self.city
    }

    #[must_use]
    pub fn season(&self) -> &str {
        &self.season
    }
}

/// Where the club logo and heading are placed on a certificate.
///
/// All positions are in millimetres from the top left corner of the page.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Branding {
    image: Option<PathBuf>,
    font: String,
    image_x: f32,
    image_y: f32,
    image_width: f32,
    heading_x: f32,
    heading_y: f32,
}

impl Default for Branding {
    fn default() -> Self {
        Self {
            image: None,
            font: "TeX Gyre Termes".to_string(),
            image_x: 25.0,
            image_y: 15.0,
            image_width: 50.0,
            heading_x: 80.0,
            heading_y: 25.0,
        }
    }
}

impl Branding {
    #[must_use]
    pub fn with_image(mut self, image: impl Into<PathBuf>) -> Self {
        self.image = Some(image.into());
        self
    }

    #[must_use]
    pub fn image(&self) -> Option<&Path> {
        self.image.as_deref()
    }

    #[must_use]
    pub fn font(&self) -> &str {
        &self.font
    }

    #[must_use]
    pub fn image_position(&self) -> (f32, f32) {
        (self.image_x, self.image_y)
    }

    #[must_use]
    pub fn image_width(&self) -> f32 {
        self.image_width
    }

    #[must_use]
    pub fn heading_position(&self) -> (f32, f32) {
        (self.heading_x, self.heading_y)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct MailSettings {
    host: String,
    port: u16,
    starttls: bool,
    email_var: String,
    password_var: String,
    env_file: PathBuf,
}

impl Default for MailSettings {
    fn default() -> Self {
        Self {
            host: "smtp.gmail.com".to_string(),
            port: 587,
            starttls: true,
            email_var: "GMAIL_EMAIL".to_string(),
            password_var: "GMAIL_APP_PASSWORD".to_string(),
            env_file: PathBuf::from(".env"),
        }
    }
}

impl MailSettings {
    #[must_use]
    pub fn host(&self) -> &str {
        &self.host
    }

    #[must_use]
    pub fn port(&self) -> u16 {
        self.port
    }

    #[must_use]
    pub fn use_starttls(&self) -> bool {
        self.starttls
    }

    /// Name of the environment variable holding the sender address.
    #[must_use]
    pub fn email_var(&self) -> &str {
        &self.email_var
    }

    /// Name of the environment variable holding the app password.
    #[must_use]
    pub fn password_var(&self) -> &str {
        &self.password_var
    }

    #[must_use]
    pub fn env_file(&self) -> &Path {
        &self.env_file
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Paths {
    attendance: Option<PathBuf>,
    roster: Option<PathBuf>,
    calendar: Option<PathBuf>,
    output_dir: PathBuf,
    latex_mk_path: Option<PathBuf>,
}

impl Default for Paths {
    fn default() -> Self {
        Self {
            attendance: None,
            roster: None,
            calendar: None,
            output_dir: PathBuf::from("temp_certificates"),
            latex_mk_path: None,
        }
    }
}

impl Paths {
    #[must_use]
    pub fn attendance(&self) -> Option<&Path> {
        self.attendance.as_deref()
    }

    #[must_use]
    pub fn roster(&self) -> Option<&Path> {
        self.roster.as_deref()
    }

    #[must_use]
    pub fn calendar(&self) -> Option<&Path> {
        self.calendar.as_deref()
    }

    #[must_use]
    pub fn output_dir(&self) -> &Path {
        &self.output_dir
    }

    #[must_use]
    pub fn latex_mk_path(&self) -> Option<&Path> {
        self.latex_mk_path.as_deref()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use pretty_assertions::assert_eq;

    #[test]
    fn test_empty_file_uses_defaults() {
        let file: ClubFile = toml::from_str("").expect("toml should be valid");

        assert_eq!(file, ClubFile::default());
        assert_eq!(file.club().name(), "Little Rock Engineers Club");
        assert_eq!(file.mail().host(), "smtp.gmail.com");
        assert_eq!(file.mail().port(), 587);
        assert_eq!(file.paths().output_dir(), Path::new("temp_certificates"));
        assert_eq!(file.branding().image(), None);
    }

    #[test]
    fn test_embedded_file_matches_defaults() {
        assert_eq!(ClubFile::embedded().unwrap(), ClubFile::default());
    }

    #[test]
    fn test_partial_sections() {
        let file: ClubFile = toml::from_str(concat!(
            //
            "[club]\n",
            "name = \"Hot Springs Engineers Club\"\n",
            "short_name = \"HSEC\"\n",
            "\n",
            "[branding]\n",
            "image = \"assets/skyline.png\"\n",
            "image_width = 40.0\n",
            "\n",
            "[mail]\n",
            "port = 465\n",
            "starttls = false\n",
        ))
        .expect("toml should be valid");

        assert_eq!(file.club().name(), "Hot Springs Engineers Club");
        assert_eq!(file.club().city(), "Little Rock, Arkansas");
        assert_eq!(file.branding().image(), Some(Path::new("assets/skyline.png")));
        assert_eq!(file.branding().image_width(), 40.0);
        assert_eq!(file.branding().image_position(), (25.0, 15.0));
        assert_eq!(file.mail().port(), 465);
        assert!(!file.mail().use_starttls());
        assert_eq!(file.mail().email_var(), "GMAIL_EMAIL");
    }

    #[test]
    fn test_unknown_keys_are_rejected() {
        assert!(toml::from_str::<ClubFile>("[club]\nnmae = \"typo\"\n").is_err());
    }

    #[test]
    fn test_resolve_paths() {
        let mut file: ClubFile = toml::from_str(concat!(
            "[branding]\n",
            "image = \"skyline.png\"\n",
            "\n",
            "[paths]\n",
            "roster = \"PII/Roster.xlsx\"\n",
            "calendar = \"/srv/club/Calendar.xlsx\"\n",
            "latex_mk_path = \"latexmk\"\n",
        ))
        .expect("toml should be valid");

        file.resolve_paths(Path::new("/home/club"));

        assert_eq!(
            file.branding().image(),
            Some(Path::new("/home/club/skyline.png"))
        );
        assert_eq!(
            file.paths().roster(),
            Some(Path::new("/home/club/PII/Roster.xlsx"))
        );
        assert_eq!(
            file.paths().calendar(),
            Some(Path::new("/srv/club/Calendar.xlsx"))
        );
        assert_eq!(file.paths().latex_mk_path(), Some(Path::new("latexmk")));
        assert_eq!(
            file.paths().output_dir(),
            Path::new("/home/club/temp_certificates")
        );
        assert_eq!(file.mail().env_file(), Path::new("/home/club/.env"));
    }
}
