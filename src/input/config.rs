use std::path::{Path, PathBuf};

use anyhow::Context;

use crate::input::{Branding, Club, ClubFile, MailSettings};
use crate::utils;

pub struct Config {
    file: ClubFile,
    output_dir: PathBuf,
    preserve_dir: Option<PathBuf>,
    attendance: Option<PathBuf>,
    roster: Option<PathBuf>,
    calendar: Option<PathBuf>,
}

pub struct ConfigBuilder {
    file: ClubFile,
    output_dir: Option<PathBuf>,
    preserve_dir: Option<PathBuf>,
    attendance: Option<PathBuf>,
    roster: Option<PathBuf>,
    calendar: Option<PathBuf>,
}

impl ConfigBuilder {
    fn new(file: ClubFile) -> Self {
        Self {
            file,
            output_dir: None,
            preserve_dir: None,
            attendance: None,
            roster: None,
            calendar: None,
        }
    }

    pub fn output_dir(&mut self, output_dir: impl Into<PathBuf>) -> &mut Self {
        self.output_dir = Some(output_dir.into());
        self
    }

    pub fn preserve_dir(&mut self, preserve_dir: impl Into<PathBuf>) -> &mut Self {
        self.preserve_dir = Some(preserve_dir.into());
        self
    }

    pub fn attendance(&mut self, attendance: impl Into<PathBuf>) -> &mut Self {
        self.attendance = Some(attendance.into());
        self
    }

    pub fn roster(&mut self, roster: impl Into<PathBuf>) -> &mut Self {
        self.roster = Some(roster.into());
        self
    }

    pub fn calendar(&mut self, calendar: impl Into<PathBuf>) -> &mut Self {
        self.calendar = Some(calendar.into());
        self
    }

    /// Values set on the builder take precedence over the ones from the file.
    #[must_use]
    pub fn build(self) -> Config {
        let paths = self.file.paths();

        Config {
            output_dir: self
                .output_dir
                .unwrap_or_else(|| paths.output_dir().to_path_buf()),
            attendance: self
                .attendance
                .or_else(|| paths.attendance().map(Path::to_path_buf)),
            roster: self.roster.or_else(|| paths.roster().map(Path::to_path_buf)),
            calendar: self
                .calendar
                .or_else(|| paths.calendar().map(Path::to_path_buf)),
            preserve_dir: self.preserve_dir,
            file: self.file,
        }
    }
}

impl Config {
    #[must_use]
    pub fn from_club_file(file: ClubFile) -> ConfigBuilder {
        ConfigBuilder::new(file)
    }

    /// Starts from the defaults that ship with the binary.
    pub fn embedded() -> anyhow::Result<ConfigBuilder> {
        Ok(Self::from_club_file(ClubFile::embedded()?))
    }

    /// Reads the club file at `path`. Relative paths in the file are relative
    /// to the directory it is in.
    pub fn try_from_toml_file(path: impl AsRef<Path>) -> anyhow::Result<ConfigBuilder> {
        let path = path.as_ref();
        let mut file: ClubFile = toml::from_str(&utils::read_to_string(path)?)
            .with_context(|| format!("failed to parse `{}`", path.display()))?;

        let workspace = dunce::canonicalize(path)?
            .parent()
            .ok_or_else(|| anyhow::anyhow!("`{}` should have a parent directory", path.display()))?
            .to_path_buf();

        file.resolve_paths(&workspace);

        Ok(Self::from_club_file(file))
    }

    /// Reads `path` if one is given, otherwise uses the embedded defaults.
    pub fn load(path: Option<&Path>) -> anyhow::Result<ConfigBuilder> {
        match path {
            Some(path) => Self::try_from_toml_file(path),
            None => Self::embedded(),
        }
    }

    #[must_use]
    pub fn club(&self) -> &Club {
        self.file.club()
    }

    #[must_use]
    pub fn branding(&self) -> &Branding {
        self.file.branding()
    }

    #[must_use]
    pub fn mail(&self) -> &MailSettings {
        self.file.mail()
    }

    #[must_use]
    pub fn output_dir(&self) -> &Path {
        &self.output_dir
    }

    #[must_use]
    pub fn preserve_dir(&self) -> Option<&Path> {
        self.preserve_dir.as_deref()
    }

    #[must_use]
    pub fn latex_mk_path(&self) -> Option<&Path> {
        self.file.paths().latex_mk_path()
    }

    pub fn attendance(&self) -> anyhow::Result<&Path> {
        required_path(self.attendance.as_deref(), "attendance")
    }

    pub fn roster(&self) -> anyhow::Result<&Path> {
        required_path(self.roster.as_deref(), "roster")
    }

    pub fn calendar(&self) -> anyhow::Result<&Path> {
        required_path(self.calendar.as_deref(), "calendar")
    }
}

fn required_path<'a>(path: Option<&'a Path>, name: &str) -> anyhow::Result<&'a Path> {
    path.ok_or_else(|| {
        anyhow::anyhow!(
            "no {name} file given, pass `--{name}` or set `paths.{name}` in the config file",
            name = name
        )
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    use pretty_assertions::assert_eq;

    #[test]
    fn test_embedded_defaults() {
        let config = Config::embedded().unwrap().build();

        assert_eq!(config.club().short_name(), "LREC");
        assert_eq!(config.output_dir(), Path::new("temp_certificates"));
        assert_eq!(config.preserve_dir(), None);
        assert_eq!(config.latex_mk_path(), None);
        assert_eq!(
            config.roster().unwrap_err().to_string(),
            "no roster file given, pass `--roster` or set `paths.roster` in the config file"
        );
    }

    #[test]
    fn test_builder_overrides_file() {
        let file: ClubFile = toml::from_str(concat!(
            "[paths]\n",
            "attendance = \"/srv/club/Attendance.xlsx\"\n",
            "roster = \"/srv/club/Roster.xlsx\"\n",
            "output_dir = \"/srv/club/out\"\n",
        ))
        .unwrap();

        let mut builder = Config::from_club_file(file);
        builder
            .attendance("October.xlsx")
            .calendar("Calendar.csv")
            .preserve_dir("debug");
        let config = builder.build();

        assert_eq!(config.attendance().unwrap(), Path::new("October.xlsx"));
        assert_eq!(config.roster().unwrap(), Path::new("/srv/club/Roster.xlsx"));
        assert_eq!(config.calendar().unwrap(), Path::new("Calendar.csv"));
        assert_eq!(config.output_dir(), Path::new("/srv/club/out"));
        assert_eq!(config.preserve_dir(), Some(Path::new("debug")));
    }

    #[test]
    fn test_file_paths_are_relative_to_the_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("club.toml");
        std::fs::write(
            &path,
            concat!(
                "[club]\n",
                "season = \"2026-2027\"\n",
                "\n",
                "[paths]\n",
                "calendar = \"Calendar.xlsx\"\n",
            ),
        )
        .unwrap();

        let workspace = dunce::canonicalize(dir.path()).unwrap();
        let config = Config::load(Some(path.as_path())).unwrap().build();

        assert_eq!(config.club().season(), "2026-2027");
        assert_eq!(config.calendar().unwrap(), workspace.join("Calendar.xlsx"));
        assert_eq!(config.output_dir(), workspace.join("temp_certificates"));
    }

    #[test]
    fn test_invalid_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("club.toml");
        std::fs::write(&path, "[club]\nnmae = \"typo\"\n").unwrap();

        let error = Config::try_from_toml_file(&path).err().unwrap();

        assert!(error.to_string().starts_with("failed to parse"));
        assert!(Config::try_from_toml_file(dir.path().join("missing.toml")).is_err());
    }
}
