use crate::event::PokemonId;
use crate::pokemon::Pokemon;

/// An ordered roster. Members are ids into the world's creature arena.
#[derive(Debug, Clone)]
pub struct Party {
    pub members: Vec<PokemonId>,
    pub revive: bool,
    head: usize,
}

impl Party {
    pub fn new(members: Vec<PokemonId>, revive: bool) -> Self {
        Party {
            members,
            revive,
            head: 0,
        }
    }

    pub fn init(&mut self) {
        self.head = 0;
    }

    pub fn head(&self) -> PokemonId {
        self.members[self.head]
    }

    pub fn contains(&self, id: PokemonId) -> bool {
        self.members.contains(&id)
    }

    pub fn set_head(&mut self, id: PokemonId) -> bool {
        match self.members.iter().position(|&m| m == id) {
            Some(idx) => {
                self.head = idx;
                true
            }
            None => false,
        }
    }

    /// Moves the head to the next living member, wrapping around.
    pub fn set_head_to_next(&mut self, arena: &[Pokemon]) -> bool {
        let len = self.members.len();
        let next = (1..len)
            .map(|step| (self.head + step) % len)
            .find(|&idx| arena[self.members[idx]].is_alive());
        match next {
            Some(idx) => {
                self.head = idx;
                true
            }
            None => false,
        }
    }

    /// Fully heals every member and points the head back at the first one.
    pub fn heal(&mut self, arena: &mut [Pokemon]) {
        for &id in &self.members {
            arena[id].heal();
        }
        self.head = 0;
    }

    pub fn tdo(&self, arena: &[Pokemon]) -> i64 {
        self.members.iter().map(|&id| arena[id].tdo).sum()
    }

    pub fn deaths(&self, arena: &[Pokemon]) -> u32 {
        self.members.iter().map(|&id| arena[id].deaths).sum()
    }
}
