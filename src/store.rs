// This file is part of knockout.
//
// knockout is free software: you can redistribute it and/or modify
// it under the terms of the GNU Affero General Public License as published by
// the Free Software Foundation, either version 3 of the License, or
// (at your option) any later version.
//
// knockout is distributed in the hope that it will be useful,
// but WITHOUT ANY WARRANTY; without even the implied warranty of
// MERCHANTABILITY or FITNESS FOR A PARTICULAR PURPOSE.  See the
// GNU Affero General Public License for more details.
//
// You should have received a copy of the GNU Affero General Public License
// along with this program.  If not, see <https://www.gnu.org/licenses/>.

use std::{
    fs,
    io::ErrorKind,
    path::{Path, PathBuf},
};

use log::debug;
use ron::ser::PrettyConfig;

use crate::tournament::Tournament;

/// Somewhere to keep every tournament.
pub trait TournamentStore {
    /// # Errors
    ///
    /// If the tournaments can't be read or decoded.
    fn load(&self) -> anyhow::Result<Vec<Tournament>>;

    /// Replaces everything that was stored before.
    ///
    /// # Errors
    ///
    /// If the tournaments can't be encoded or written.
    fn save(&mut self, tournaments: &[Tournament]) -> anyhow::Result<()>;
}

/// Every tournament in one RON file. A missing file holds no tournaments.
#[derive(Clone, Debug)]
pub struct RonFile {
    path: PathBuf,
}

impl RonFile {
    #[must_use]
    pub fn new(path: PathBuf) -> Self {
        Self { path }
    }

    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl TournamentStore for RonFile {
    fn load(&self) -> anyhow::Result<Vec<Tournament>> {
        match fs::read_to_string(&self.path) {
            Ok(string) => match ron::from_str(string.as_str()) {
                Ok(tournaments) => Ok(tournaments),
                Err(err) => Err(anyhow::Error::msg(format!(
                    "RON: {}: {err}",
                    self.path.display(),
                ))),
            },
            Err(err) => match err.kind() {
                ErrorKind::NotFound => Ok(Vec::new()),
                _ => Err(anyhow::Error::msg(format!(
                    "{}: {err}",
                    self.path.display()
                ))),
            },
        }
    }

    fn save(&mut self, tournaments: &[Tournament]) -> anyhow::Result<()> {
        let string = ron::ser::to_string_pretty(tournaments, PrettyConfig::default())?;

        // Write then rename so a crash never leaves half a file behind.
        let mut temporary = self.path.clone().into_os_string();
        temporary.push(".tmp");
        fs::write(&temporary, string)?;
        fs::rename(&temporary, &self.path)?;

        debug!(
            "saved {} tournaments to {}",
            tournaments.len(),
            self.path.display()
        );
        Ok(())
    }
}

#[derive(Clone, Debug, Default)]
pub struct Memory(pub Vec<Tournament>);

impl TournamentStore for Memory {
    fn load(&self) -> anyhow::Result<Vec<Tournament>> {
        Ok(self.0.clone())
    }

    fn save(&mut self, tournaments: &[Tournament]) -> anyhow::Result<()> {
        self.0 = tournaments.to_vec();
        Ok(())
    }
}
