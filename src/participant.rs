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

use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{Id, error::BracketError};

#[derive(Clone, Debug, Deserialize, Eq, PartialEq, Serialize)]
#[serde(deny_unknown_fields, rename_all = "camelCase")]
pub struct Participant {
    pub id: Id,
    pub name: String,
    /// A path or URL to an avatar.
    #[serde(default)]
    pub image: Option<String>,
    pub created_at: DateTime<Utc>,
}

impl Participant {
    /// # Errors
    ///
    /// If the name is empty once trimmed.
    pub fn new(name: &str, image: Option<String>) -> Result<Self, BracketError> {
        let name = name.trim();
        if name.is_empty() {
            return Err(BracketError::EmptyParticipantName);
        }

        Ok(Self {
            id: Uuid::new_v4(),
            name: name.to_string(),
            image,
            created_at: Utc::now(),
        })
    }

    /// Names are unique within a tournament ignoring case.
    #[must_use]
    pub fn same_name(&self, name: &str) -> bool {
        self.name.to_lowercase() == name.trim().to_lowercase()
    }
}

impl fmt::Display for Participant {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn names_are_trimmed() -> anyhow::Result<()> {
        let participant = Participant::new("  Player 1 ", None)?;
        assert_eq!(participant.name, "Player 1");
        assert!(participant.image.is_none());
        Ok(())
    }

    #[test]
    fn blank_names_fail() {
        assert_eq!(
            Participant::new("   ", None),
            Err(BracketError::EmptyParticipantName)
        );
    }

    #[test]
    fn same_name_ignores_case() -> anyhow::Result<()> {
        let participant = Participant::new("Ada", Some("ada.png".to_string()))?;
        assert!(participant.same_name("ADA"));
        assert!(participant.same_name(" ada "));
        assert!(!participant.same_name("Adam"));
        Ok(())
    }
}
