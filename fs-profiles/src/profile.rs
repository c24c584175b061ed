//! The user profile entity and its load/validate/save protocol.

use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;

use walkdir::WalkDir;

use data_document::{Document, Element};
use data_error::{Result, TeambuilderError};

use crate::registry;
use crate::{PROFILE_EXTENSION, SCHEMA_VERSION, WRITE_INDENT};

/// A named user preference bundle, persisted as an XML document with
/// root element `profile`.
///
/// An unset `color` is a distinct valid state: it is omitted from the
/// document entirely on save and loads back as `None`, never as some
/// default color value.
#[derive(Clone, Debug, PartialEq)]
pub struct Profile {
    pub name: String,
    pub color: Option<String>,
    pub avatar: i32,
    pub winning_message: String,
    pub losing_message: String,
    pub tie_message: String,
    pub info: String,
}

impl Default for Profile {
    fn default() -> Self {
        Self {
            name: String::new(),
            color: None,
            avatar: 1,
            winning_message: String::new(),
            losing_message: String::new(),
            tie_message: String::new(),
            info: String::new(),
        }
    }
}

impl Profile {
    /// Load the profile from `path`, replacing every field.
    ///
    /// Validation runs before any mutation: on open, parse, schema or
    /// version failure the profile keeps its previous state. A
    /// document declaring a version newer than [`SCHEMA_VERSION`] is
    /// rejected as [`TeambuilderError::Version`], which is a policy
    /// decision distinct from malformed input.
    pub fn load_from_file(&mut self, path: impl AsRef<Path>) -> Result<()> {
        let path = path.as_ref();
        let _guard = registry::acquire(path);
        let content = std::fs::read_to_string(path)?;
        let document = Document::parse(&content)?;
        let root = document
            .root()
            .filter(|root| root.name() == "profile")
            .ok_or_else(|| {
                TeambuilderError::Schema(
                    "missing root element `profile`".to_owned(),
                )
            })?;
        *self = Self::from_element(root)?;
        log::debug!(
            "profile `{}` loaded from {}",
            self.name,
            path.display()
        );
        Ok(())
    }

    fn from_element(root: &Element) -> Result<Self> {
        let version = root.int_attribute_or("version", 1)?;
        if version > SCHEMA_VERSION {
            return Err(TeambuilderError::Version {
                found: version,
                supported: SCHEMA_VERSION,
            });
        }
        let attr = |key: &str| {
            root.attribute(key).unwrap_or_default().to_owned()
        };
        Ok(Self {
            name: attr("name"),
            color: root.attribute("color").map(str::to_owned),
            avatar: root.int_attribute_or("avatar", 1)?,
            winning_message: attr("winningMessage"),
            losing_message: attr("losingMessage"),
            tie_message: attr("tieMessage"),
            info: attr("information"),
        })
    }

    /// Build the document representation. Always stamps the current
    /// schema version; the `color` attribute is written only when the
    /// color is set.
    pub fn to_document(&self) -> Document {
        let mut profile = Element::new("profile");
        profile.set_int_attribute("version", SCHEMA_VERSION);
        profile.set_attribute("name", &self.name);
        if let Some(color) = &self.color {
            profile.set_attribute("color", color);
        }
        profile.set_int_attribute("avatar", self.avatar);
        profile.set_attribute("information", &self.info);
        profile.set_attribute("winningMessage", &self.winning_message);
        profile.set_attribute("tieMessage", &self.tie_message);
        profile.set_attribute("losingMessage", &self.losing_message);

        let mut document = Document::new();
        document.append(profile);
        document
    }

    pub fn to_document_string(&self) -> String {
        self.to_document().to_string_indented(WRITE_INDENT)
    }

    /// Serialize and write the profile to `path`.
    pub fn save_to_file(&self, path: impl AsRef<Path>) -> Result<()> {
        let path = path.as_ref();
        let _guard = registry::acquire(path);
        let file = File::create(path)?;
        let mut writer = BufWriter::new(file);
        writer.write_all(self.to_document_string().as_bytes())?;
        writer.flush()?;
        log::info!("profile `{}` written to {}", self.name, path.display());
        Ok(())
    }

    /// Remove a persisted profile, refusing when the file is
    /// currently held open by this process.
    pub fn delete_profile(path: impl AsRef<Path>) -> Result<()> {
        let path = path.as_ref();
        if registry::is_open(path) {
            return Err(TeambuilderError::InUse(
                path.display().to_string(),
            ));
        }
        std::fs::remove_file(path)?;
        log::info!("profile file {} deleted", path.display());
        Ok(())
    }

    /// Identifiers of the profiles stored directly inside
    /// `directory`: the file stem of every `*.xml` entry, in
    /// enumeration order. No sort guarantee.
    pub fn list_profiles(
        directory: impl AsRef<Path>,
    ) -> Result<Vec<String>> {
        let mut profiles = Vec::new();
        for entry in WalkDir::new(directory.as_ref())
            .min_depth(1)
            .max_depth(1)
        {
            let entry = entry.map_err(std::io::Error::from)?;
            if !entry.file_type().is_file() {
                continue;
            }
            let path = entry.path();
            let is_profile = path
                .extension()
                .and_then(|ext| ext.to_str())
                .map(|ext| ext == PROFILE_EXTENSION)
                .unwrap_or(false);
            if !is_profile {
                continue;
            }
            if let Some(stem) = path.file_stem().and_then(|s| s.to_str()) {
                profiles.push(stem.to_owned());
            }
        }
        Ok(profiles)
    }
}

#[cfg(test)]
mod tests {
    use std::fs;

    use quickcheck_macros::quickcheck;
    use tempdir::TempDir;

    use data_error::TeambuilderError;

    use super::*;

    fn sample() -> Profile {
        Profile {
            name: "Ash".to_owned(),
            color: None,
            avatar: 3,
            winning_message: "GG".to_owned(),
            ..Default::default()
        }
    }

    #[test]
    fn save_then_load_reproduces_fields() {
        let dir = TempDir::new("fs-profiles").unwrap();
        let path = dir.path().join("ash.xml");
        sample().save_to_file(&path).unwrap();

        let mut loaded = Profile::default();
        loaded.load_from_file(&path).unwrap();
        assert_eq!(loaded.name, "Ash");
        assert_eq!(loaded.color, None);
        assert_eq!(loaded.avatar, 3);
        assert_eq!(loaded.winning_message, "GG");
        assert_eq!(loaded.losing_message, "");
        assert_eq!(loaded.tie_message, "");
        assert_eq!(loaded.info, "");
    }

    #[test]
    fn unset_color_is_omitted_from_the_document() {
        let serialized = sample().to_document_string();
        assert!(!serialized.contains("color"));

        let mut colored = sample();
        colored.color = Some("#ff0000".to_owned());
        assert!(colored
            .to_document_string()
            .contains("color=\"#ff0000\""));
    }

    #[test]
    fn write_order_is_fixed() {
        let mut profile = sample();
        profile.color = Some("blue".to_owned());
        assert_eq!(
            profile.to_document_string(),
            "<profile version=\"1\" name=\"Ash\" color=\"blue\" \
             avatar=\"3\" information=\"\" winningMessage=\"GG\" \
             tieMessage=\"\" losingMessage=\"\"/>\n"
        );
    }

    #[test]
    fn omitted_attributes_load_as_defaults() {
        let dir = TempDir::new("fs-profiles").unwrap();
        let path = dir.path().join("bare.xml");
        fs::write(&path, "<profile name=\"Misty\"/>\n").unwrap();

        let mut profile = Profile::default();
        profile.load_from_file(&path).unwrap();
        assert_eq!(profile.name, "Misty");
        assert_eq!(profile.avatar, 1);
        assert_eq!(profile.color, None);

        // re-saving must not invent a color attribute
        assert!(!profile.to_document_string().contains("color"));
    }

    #[test]
    fn newer_version_is_rejected() {
        let dir = TempDir::new("fs-profiles").unwrap();
        let path = dir.path().join("future.xml");
        fs::write(&path, "<profile version=\"2\" name=\"Ash\"/>\n").unwrap();

        let mut profile = Profile::default();
        match profile.load_from_file(&path) {
            Err(TeambuilderError::Version { found, supported }) => {
                assert_eq!(found, 2);
                assert_eq!(supported, SCHEMA_VERSION);
            }
            other => panic!("expected a version rejection, got {:?}", other),
        }
        // rejection leaves the profile untouched
        assert_eq!(profile, Profile::default());
    }

    #[test]
    fn version_one_and_absent_version_both_load() {
        let dir = TempDir::new("fs-profiles").unwrap();
        for content in [
            "<profile version=\"1\" name=\"Ash\"/>\n",
            "<profile name=\"Ash\"/>\n",
        ] {
            let path = dir.path().join("p.xml");
            fs::write(&path, content).unwrap();
            let mut profile = Profile::default();
            profile.load_from_file(&path).unwrap();
            assert_eq!(profile.name, "Ash");
        }
    }

    #[test]
    fn malformed_version_is_a_schema_error() {
        let dir = TempDir::new("fs-profiles").unwrap();
        let path = dir.path().join("bad.xml");
        fs::write(&path, "<profile version=\"latest\"/>\n").unwrap();

        let mut profile = Profile::default();
        assert!(matches!(
            profile.load_from_file(&path),
            Err(TeambuilderError::Schema(_))
        ));
    }

    #[test]
    fn wrong_root_element_is_a_schema_error() {
        let dir = TempDir::new("fs-profiles").unwrap();
        let path = dir.path().join("team.xml");
        fs::write(&path, "<team name=\"Kanto\"/>\n").unwrap();

        let mut profile = Profile::default();
        assert!(matches!(
            profile.load_from_file(&path),
            Err(TeambuilderError::Schema(_))
        ));
    }

    #[test]
    fn malformed_input_leaves_previous_state_unchanged() {
        let dir = TempDir::new("fs-profiles").unwrap();
        let path = dir.path().join("broken.xml");
        fs::write(&path, "<profile name=\"Ash\"\n").unwrap();

        let mut profile = sample();
        match profile.load_from_file(&path) {
            Err(TeambuilderError::Parse { line, col, .. }) => {
                assert!(line >= 1);
                assert!(col >= 1);
            }
            other => panic!("expected a parse error, got {:?}", other),
        }
        assert_eq!(profile, sample());
    }

    #[test]
    fn missing_file_is_an_io_error() {
        let dir = TempDir::new("fs-profiles").unwrap();
        let mut profile = Profile::default();
        assert!(matches!(
            profile.load_from_file(dir.path().join("absent.xml")),
            Err(TeambuilderError::Io(_))
        ));
    }

    #[test]
    fn delete_refuses_while_the_file_is_open() {
        let dir = TempDir::new("fs-profiles").unwrap();
        let path = dir.path().join("held.xml");
        sample().save_to_file(&path).unwrap();

        let guard = registry::acquire(&path);
        assert!(matches!(
            Profile::delete_profile(&path),
            Err(TeambuilderError::InUse(_))
        ));
        assert!(path.exists());

        drop(guard);
        Profile::delete_profile(&path).unwrap();
        assert!(!path.exists());
    }

    #[test]
    fn list_profiles_returns_xml_stems() {
        let dir = TempDir::new("fs-profiles").unwrap();
        sample().save_to_file(dir.path().join("ash.xml")).unwrap();
        sample()
            .save_to_file(dir.path().join("misty.xml"))
            .unwrap();
        fs::write(dir.path().join("notes.txt"), "not a profile").unwrap();
        fs::create_dir(dir.path().join("nested.xml")).unwrap();

        let mut profiles = Profile::list_profiles(dir.path()).unwrap();
        profiles.sort();
        assert_eq!(profiles, vec!["ash", "misty"]);
    }

    #[quickcheck]
    fn arbitrary_profiles_round_trip(
        name: String,
        color: Option<String>,
        avatar: i32,
        winning_message: String,
        losing_message: String,
        tie_message: String,
        info: String,
    ) -> bool {
        let dir = TempDir::new("fs-profiles").unwrap();
        let path = dir.path().join("roundtrip.xml");
        let original = Profile {
            name,
            color,
            avatar,
            winning_message,
            losing_message,
            tie_message,
            info,
        };
        original.save_to_file(&path).unwrap();

        let mut loaded = Profile::default();
        loaded.load_from_file(&path).unwrap();
        loaded == original
    }
}
