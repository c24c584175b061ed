//! Owner of the in-memory team collection and coordinator of the
//! save/load round through an injected settings provider.

use std::path::PathBuf;

use data_error::{Result, TeambuilderError};

use crate::profile::Profile;
use crate::settings::{self, Settings};
use crate::team::Team;
use crate::PROFILE_EXTENSION;

/// Owns an ordered, never-empty sequence of teams plus a cursor into
/// it. The cursor is a valid index at all times; `save`/`load` mutate
/// the team at the cursor and a caller-held [`Profile`] in place and
/// never resize the sequence.
pub struct TeamHolder {
    teams: Vec<Team>,
    current: usize,
}

impl TeamHolder {
    /// One default team, cursor at 0.
    pub fn new() -> Self {
        Self {
            teams: vec![Team::default()],
            current: 0,
        }
    }

    /// The team at the cursor. Infallible by the holder's invariant.
    pub fn team(&self) -> &Team {
        &self.teams[self.current]
    }

    pub fn team_mut(&mut self) -> &mut Team {
        &mut self.teams[self.current]
    }

    /// Checked indexed accessor.
    pub fn team_at(&self, i: usize) -> Result<&Team> {
        self.teams.get(i).ok_or(TeambuilderError::Index(i))
    }

    pub fn team_at_mut(&mut self, i: usize) -> Result<&mut Team> {
        self.teams
            .get_mut(i)
            .ok_or(TeambuilderError::Index(i))
    }

    pub fn count(&self) -> usize {
        self.teams.len()
    }

    pub fn current_index(&self) -> usize {
        self.current
    }

    pub fn set_current_index(&mut self, i: usize) -> Result<()> {
        if i >= self.teams.len() {
            return Err(TeambuilderError::Index(i));
        }
        self.current = i;
        Ok(())
    }

    /// Persist the current team and the given profile. The team file
    /// path comes from the `team_location` setting; the profile is
    /// written to `<profiles_path>/<name>.xml`. Each sub-save
    /// propagates its own typed error.
    pub fn save(
        &self,
        settings: &impl Settings,
        profile: &Profile,
    ) -> Result<()> {
        let team_path =
            settings::required(settings, settings::TEAM_LOCATION)?;
        self.team().save_to_file(&team_path)?;

        let mut profile_path = PathBuf::from(settings::required(
            settings,
            settings::PROFILES_PATH,
        )?);
        profile_path
            .push(format!("{}.{}", profile.name, PROFILE_EXTENSION));
        profile.save_to_file(&profile_path)?;
        Ok(())
    }

    /// Mirror of [`TeamHolder::save`], reading `team_location` and
    /// `current_profile`.
    pub fn load(
        &mut self,
        settings: &impl Settings,
        profile: &mut Profile,
    ) -> Result<()> {
        let team_path =
            settings::required(settings, settings::TEAM_LOCATION)?;
        self.team_mut().load_from_file(&team_path)?;

        let profile_path =
            settings::required(settings, settings::CURRENT_PROFILE)?;
        profile.load_from_file(&profile_path)?;
        Ok(())
    }
}

impl Default for TeamHolder {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use std::collections::BTreeMap;

    use tempdir::TempDir;

    use data_error::TeambuilderError;

    use super::*;

    #[test]
    fn starts_with_one_default_team() {
        let holder = TeamHolder::new();
        assert_eq!(holder.count(), 1);
        assert_eq!(holder.current_index(), 0);
        assert_eq!(holder.team(), &Team::default());
    }

    #[test]
    fn indexed_access_is_checked() {
        let mut holder = TeamHolder::new();
        assert!(holder.team_at(0).is_ok());
        assert!(matches!(
            holder.team_at(1),
            Err(TeambuilderError::Index(1))
        ));
        assert!(matches!(
            holder.set_current_index(5),
            Err(TeambuilderError::Index(5))
        ));
        assert_eq!(holder.current_index(), 0);
    }

    #[test]
    fn save_and_load_round_trip_through_settings() {
        let dir = TempDir::new("fs-profiles").unwrap();
        let team_path = dir.path().join("team.xml");
        let profiles_path = dir.path().join("profiles");
        std::fs::create_dir(&profiles_path).unwrap();

        let mut settings = BTreeMap::new();
        settings.insert(
            settings::TEAM_LOCATION.to_owned(),
            team_path.display().to_string(),
        );
        settings.insert(
            settings::PROFILES_PATH.to_owned(),
            profiles_path.display().to_string(),
        );
        settings.insert(
            settings::CURRENT_PROFILE.to_owned(),
            profiles_path.join("Ash.xml").display().to_string(),
        );

        let mut holder = TeamHolder::new();
        holder.team_mut().name = "Kanto".to_owned();
        holder.team_mut().members = vec!["pikachu".to_owned()];
        let profile = Profile {
            name: "Ash".to_owned(),
            avatar: 3,
            winning_message: "GG".to_owned(),
            ..Default::default()
        };
        holder.save(&settings, &profile).unwrap();

        let mut reloaded_holder = TeamHolder::new();
        let mut reloaded_profile = Profile::default();
        reloaded_holder
            .load(&settings, &mut reloaded_profile)
            .unwrap();
        assert_eq!(reloaded_holder.count(), 1);
        assert_eq!(reloaded_holder.team().name, "Kanto");
        assert_eq!(
            reloaded_holder.team().members,
            vec!["pikachu".to_owned()]
        );
        assert_eq!(reloaded_profile, profile);
    }

    #[test]
    fn missing_setting_key_fails_before_any_io() {
        let settings = BTreeMap::new();
        let holder = TeamHolder::new();
        let profile = Profile::default();
        assert!(matches!(
            holder.save(&settings, &profile),
            Err(TeambuilderError::Settings(_))
        ));
    }
}
