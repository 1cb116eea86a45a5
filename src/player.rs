use crate::error::ConfigError;
use crate::event::PokemonId;
use crate::party::Party;
use crate::pokemon::Pokemon;
use phf::phf_map;

static FRIENDSHIP: phf::Map<&'static str, f64> = phf_map! {
    "none" => 1.0,
    "good" => 1.03,
    "great" => 1.05,
    "ultra" => 1.07,
    "best" => 1.1,
};

/// Attack multiplier for a friendship level. Absent means no bonus.
pub fn friend_multiplier(friend: Option<&str>) -> Result<f64, ConfigError> {
    match friend.map(str::trim).filter(|f| !f.is_empty()) {
        None => Ok(1.0),
        Some(level) => FRIENDSHIP
            .get(level.to_ascii_lowercase().as_str())
            .copied()
            .ok_or_else(|| ConfigError::UnknownFriendship(level.to_string())),
    }
}

#[derive(Debug, Clone)]
pub struct Player {
    pub index: usize,
    pub team: String,
    pub parties: Vec<Party>,
    /// Indices of every player on another team.
    pub rivals: Vec<usize>,
    pub protect_shields_left: u32,
    pub switching_cooldown_expiration: i64,
    head_party: usize,
}

impl Player {
    pub fn new(index: usize, team: String, parties: Vec<Party>) -> Self {
        Player {
            index,
            team,
            parties,
            rivals: Vec::new(),
            protect_shields_left: 0,
            switching_cooldown_expiration: -1,
            head_party: 0,
        }
    }

    pub fn init(&mut self, protect_shields: u32) {
        for party in &mut self.parties {
            party.init();
        }
        self.head_party = 0;
        self.protect_shields_left = protect_shields;
        self.switching_cooldown_expiration = -1;
    }

    pub fn head_party_index(&self) -> usize {
        self.head_party
    }

    pub fn head_party(&self) -> &Party {
        &self.parties[self.head_party]
    }

    pub fn head_party_mut(&mut self) -> &mut Party {
        &mut self.parties[self.head_party]
    }

    pub fn head(&self) -> PokemonId {
        self.head_party().head()
    }

    /// Makes `id` the head of the current party. Fails if it is not a member.
    pub fn set_head(&mut self, id: PokemonId) -> bool {
        self.head_party_mut().set_head(id)
    }

    /// Advances to the next party. Parties are never revisited.
    pub fn set_head_party_to_next(&mut self) -> bool {
        if self.head_party + 1 < self.parties.len() {
            self.head_party += 1;
            true
        } else {
            false
        }
    }

    pub fn members(&self) -> impl Iterator<Item = PokemonId> + '_ {
        self.parties.iter().flat_map(|p| p.members.iter().copied())
    }

    pub fn tdo(&self, arena: &[Pokemon]) -> i64 {
        self.parties.iter().map(|p| p.tdo(arena)).sum()
    }

    pub fn deaths(&self, arena: &[Pokemon]) -> u32 {
        self.parties.iter().map(|p| p.deaths(arena)).sum()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn friendship_levels_resolve() {
        assert_eq!(friend_multiplier(None).unwrap(), 1.0);
        assert_eq!(friend_multiplier(Some("Best")).unwrap(), 1.1);
        assert_eq!(friend_multiplier(Some("ultra")).unwrap(), 1.07);
        assert!(matches!(
            friend_multiplier(Some("bestest")),
            Err(ConfigError::UnknownFriendship(_))
        ));
    }

    #[test]
    fn parties_advance_forward_only() {
        let parties = vec![Party::new(vec![0, 1], false), Party::new(vec![2], true)];
        let mut player = Player::new(0, "0".to_string(), parties);
        player.init(2);
        assert_eq!(player.head(), 0);
        assert!(player.set_head(1));
        assert!(!player.set_head(2));
        assert!(player.set_head_party_to_next());
        assert_eq!(player.head(), 2);
        assert!(!player.set_head_party_to_next());
        assert_eq!(player.head_party_index(), 1);
        assert_eq!(player.members().collect::<Vec<_>>(), vec![0, 1, 2]);
    }
}
