//! Single elimination tournament brackets.
//!
//! A [`tournament::Tournament`] owns its participants and matches. The bracket
//! is built by [`bracket::generate`] and results flow through it with
//! [`propagate::apply_result`], which also walks back any advancement that an
//! edited or reset result invalidates.
//!
//! ## Feature Flags
//!
//! * bench - enable the criterion benchmark
//!
//! ## Data Files
//!
//! The `knockout` binary keeps every tournament in a single RON file, see
//! [`store::RonFile`].

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

#![deny(clippy::expect_used)]
#![deny(clippy::panic)]
#![deny(clippy::unwrap_used)]

pub mod bracket;
pub mod error;
pub mod matches;
pub mod participant;
pub mod propagate;
pub mod round;
pub mod seeding;
pub mod status;
pub mod store;
pub mod tournament;
pub mod tournaments;
pub mod utils;

pub type Id = uuid::Uuid;
pub const HOME: &str = "knockout";
pub const TOURNAMENTS_FILE: &str = "tournaments.ron";

pub const COPYRIGHT: &str = r".SH COPYRIGHT
Copyright (C) 2025-2026 Developers of the knockout project

This program is free software: you can redistribute it and/or modify
it under the terms of the GNU Affero General Public License as published by
the Free Software Foundation, either version 3 of the License, or
(at your option) any later version.

This program is distributed in the hope that it will be useful,
but WITHOUT ANY WARRANTY; without even the implied warranty of
MERCHANTABILITY or FITNESS FOR A PARTICULAR PURPOSE.  See the
GNU Affero General Public License for more details.

You should have received a copy of the GNU Affero General Public License
along with this program.  If not, see <https://www.gnu.org/licenses/>.
";

pub const LONG_VERSION: &str = concat!(
    env!("CARGO_PKG_VERSION"),
    "
Copyright (c) 2025 Developers of the knockout project
Licensed under the AGPLv3"
);
