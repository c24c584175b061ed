//! Minimal roster entity, persisted through the same codec and
//! version gate as the profile. Roster internals beyond named members
//! live elsewhere in the client.

use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;

use data_document::{Document, Element};
use data_error::{Result, TeambuilderError};

use crate::registry;
use crate::{SCHEMA_VERSION, WRITE_INDENT};

/// A team: a name plus an ordered roster of member identifiers,
/// persisted as an XML document with root element `team`.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Team {
    pub name: String,
    pub members: Vec<String>,
}

impl Team {
    /// Load the team from `path`, replacing every field. Failed loads
    /// leave the previous state unchanged, mirroring
    /// [`crate::profile::Profile::load_from_file`].
    pub fn load_from_file(&mut self, path: impl AsRef<Path>) -> Result<()> {
        let path = path.as_ref();
        let _guard = registry::acquire(path);
        let content = std::fs::read_to_string(path)?;
        let document = Document::parse(&content)?;
        let root = document
            .root()
            .filter(|root| root.name() == "team")
            .ok_or_else(|| {
                TeambuilderError::Schema(
                    "missing root element `team`".to_owned(),
                )
            })?;
        *self = Self::from_element(root)?;
        log::debug!("team `{}` loaded from {}", self.name, path.display());
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
        let mut members = Vec::new();
        for child in root.children() {
            if child.name() != "member" {
                continue;
            }
            let name = child.attribute("name").ok_or_else(|| {
                TeambuilderError::Schema(
                    "member element without a `name` attribute".to_owned(),
                )
            })?;
            members.push(name.to_owned());
        }
        Ok(Self {
            name: root
                .attribute("name")
                .unwrap_or_default()
                .to_owned(),
            members,
        })
    }

    pub fn to_document(&self) -> Document {
        let mut team = Element::new("team");
        team.set_int_attribute("version", SCHEMA_VERSION);
        team.set_attribute("name", &self.name);
        for member in &self.members {
            let mut element = Element::new("member");
            element.set_attribute("name", member);
            team.push_child(element);
        }

        let mut document = Document::new();
        document.append(team);
        document
    }

    pub fn to_document_string(&self) -> String {
        self.to_document().to_string_indented(WRITE_INDENT)
    }

    /// Serialize and write the team to `path`.
    pub fn save_to_file(&self, path: impl AsRef<Path>) -> Result<()> {
        let path = path.as_ref();
        let _guard = registry::acquire(path);
        let file = File::create(path)?;
        let mut writer = BufWriter::new(file);
        writer.write_all(self.to_document_string().as_bytes())?;
        writer.flush()?;
        log::info!("team `{}` written to {}", self.name, path.display());
        Ok(())
    }
}
