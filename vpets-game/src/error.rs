//! Error taxonomy for pet, player and session operations.
//!
//! Every failing operation leaves the state it was called on untouched.
use thiserror::Error;

/// Reasons a single pet refuses an action.
#[derive(Debug, Clone, Copy, Error, PartialEq, Eq)]
pub enum PetActionError {
    #[error("the pet is dead")]
    Dead,
    #[error("the pet is not dead")]
    NotDead,
    #[error("the pet has no action points left this turn")]
    InsufficientActionPoints,
    #[error("the pet is already behaving")]
    AlreadyBehaving,
}

/// Errors surfaced by players and game sessions.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum GameError {
    #[error("insufficient funds: needed {needed}, available {available}")]
    InsufficientFunds { needed: i64, available: i64 },
    #[error("pet '{pet}' cannot do that: {reason}")]
    Pet { pet: String, reason: PetActionError },
    #[error("{player} has no {item} left")]
    MissingItem { player: String, item: String },
    #[error("unknown food '{0}'")]
    UnknownFood(String),
    #[error("unknown toy '{0}'")]
    UnknownToy(String),
    #[error("no pet in slot {index} (player owns {owned})")]
    NoSuchPet { index: usize, owned: usize },
    #[error("the game is over")]
    GameOver,
}

impl GameError {
    pub(crate) fn pet(pet: &str, reason: PetActionError) -> Self {
        Self::Pet {
            pet: pet.to_string(),
            reason,
        }
    }

    /// The underlying pet refusal, when there is one.
    #[must_use]
    pub const fn pet_reason(&self) -> Option<PetActionError> {
        match self {
            Self::Pet { reason, .. } => Some(*reason),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn messages_name_the_subject() {
        let err = GameError::pet("Tom", PetActionError::InsufficientActionPoints);
        assert_eq!(
            err.to_string(),
            "pet 'Tom' cannot do that: the pet has no action points left this turn"
        );
        assert_eq!(
            err.pet_reason(),
            Some(PetActionError::InsufficientActionPoints)
        );

        let funds = GameError::InsufficientFunds {
            needed: 50,
            available: 20,
        };
        assert_eq!(funds.to_string(), "insufficient funds: needed 50, available 20");
        assert_eq!(funds.pet_reason(), None);
    }
}
