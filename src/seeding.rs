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

use rand::{Rng, rngs::ThreadRng, seq::SliceRandom};

use crate::Id;

/// Decides the order participants are seeded into the first round.
pub trait Seeding {
    fn seed(&mut self, participants: &mut [Id]);
}

/// A uniform shuffle.
#[derive(Clone, Debug)]
pub struct Shuffled<R>(pub R);

impl Default for Shuffled<ThreadRng> {
    fn default() -> Self {
        Self(rand::rng())
    }
}

impl<R: Rng> Seeding for Shuffled<R> {
    fn seed(&mut self, participants: &mut [Id]) {
        participants.shuffle(&mut self.0);
    }
}

/// Keeps the order participants registered in.
#[derive(Clone, Copy, Debug, Default)]
pub struct Registration;

impl Seeding for Registration {
    fn seed(&mut self, _participants: &mut [Id]) {}
}
