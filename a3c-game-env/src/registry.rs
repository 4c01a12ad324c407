//! Declarative mapping from game identifiers to action tables.
//!
//! Each game exposes a restricted subset of its native actions to the agent.
//! An agent picks an index into the [`ActionTable`] of the game, which is then mapped to
//! a [`NativeAction`].
use a3c_core::{A3cError, NativeAction};
use anyhow::Result;
use log::debug;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// The number of buttons of a Doom action vector.
pub const DOOM_BUTTONS: usize = 43;

/// Identifier of the bundled game.
pub const CATCH: &str = "Catch-v0";

/// The way a game family encodes actions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum GameFamily {
    /// A vector of [`DOOM_BUTTONS`] button states with one button pressed.
    Doom,

    /// A single action code.
    Atari,

    /// A single action code of a game bundled in this crate.
    Builtin,
}

// (game id, family, native action codes)
const BUILTIN_GAMES: &[(&str, GameFamily, &[usize])] = &[
    ("ppaquette/DoomBasic-v0", GameFamily::Doom, &[0, 10, 11]),
    ("ppaquette/DoomDefendCenter-v0", GameFamily::Doom, &[0, 14, 15]),
    ("ppaquette/DoomDefendLine-v0", GameFamily::Doom, &[0, 14, 15]),
    (
        "ppaquette/DoomDeathmatch-v0",
        GameFamily::Doom,
        &[0, 10, 11, 12, 13, 14, 15],
    ),
    ("ppaquette/DoomHealthGathering-v0", GameFamily::Doom, &[13, 14, 15]),
    ("Breakout-v0", GameFamily::Atari, &[1, 2, 3]),
    ("Pong-v0", GameFamily::Atari, &[1, 2, 3]),
    (CATCH, GameFamily::Builtin, &[0, 1, 2]),
];

/// Ordered native action codes of a game.
///
/// Deserialized tables are validated the same way as [`ActionTable::new`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "ActionTableRepr")]
pub struct ActionTable {
    family: GameFamily,
    codes: Vec<usize>,
}

#[derive(Deserialize)]
struct ActionTableRepr {
    family: GameFamily,
    codes: Vec<usize>,
}

impl TryFrom<ActionTableRepr> for ActionTable {
    type Error = anyhow::Error;

    fn try_from(repr: ActionTableRepr) -> Result<Self> {
        Self::new(repr.family, repr.codes)
    }
}

impl ActionTable {
    /// Constructs an action table, checking the codes fit the family.
    pub fn new(family: GameFamily, codes: Vec<usize>) -> Result<Self> {
        if codes.is_empty() {
            return Err(A3cError::Configuration("empty action table".to_string()).into());
        }
        if family == GameFamily::Doom {
            if let Some(c) = codes.iter().find(|&&c| c >= DOOM_BUTTONS) {
                return Err(A3cError::Configuration(format!(
                    "Doom button {} is out of range (< {})",
                    c, DOOM_BUTTONS
                ))
                .into());
            }
        }
        Ok(Self { family, codes })
    }

    /// The number of actions available to the agent.
    pub fn len(&self) -> usize {
        self.codes.len()
    }

    /// Always `false`, tables are validated to be non-empty.
    pub fn is_empty(&self) -> bool {
        self.codes.is_empty()
    }

    /// The game family.
    pub fn family(&self) -> GameFamily {
        self.family
    }

    /// Native action codes.
    pub fn codes(&self) -> &[usize] {
        &self.codes
    }

    /// Maps an action index to the native action.
    pub fn to_native(&self, index: usize) -> Result<NativeAction> {
        let code = *self.codes.get(index).ok_or(A3cError::InvalidAction {
            index,
            n_actions: self.codes.len(),
        })?;

        Ok(match self.family {
            GameFamily::Doom => {
                let mut buttons = vec![0u8; DOOM_BUTTONS];
                let button = buttons.get_mut(code).ok_or_else(|| {
                    A3cError::Configuration(format!("Doom button {} is out of range", code))
                })?;
                *button = 1;
                NativeAction::Buttons(buttons)
            }
            GameFamily::Atari | GameFamily::Builtin => NativeAction::Discrete(code as i64),
        })
    }
}

/// Registry of supported games.
#[derive(Debug, Clone, Default)]
pub struct GameRegistry {
    games: BTreeMap<String, ActionTable>,
}

impl GameRegistry {
    /// A registry without any game.
    pub fn empty() -> Self {
        Self::default()
    }

    /// A registry of the games known to this crate.
    pub fn builtin() -> Self {
        let mut registry = Self::empty();
        for (id, family, codes) in BUILTIN_GAMES {
            // Entries of the builtin table are valid by construction.
            let table = ActionTable {
                family: *family,
                codes: codes.to_vec(),
            };
            registry.games.insert(id.to_string(), table);
        }
        registry
    }

    /// Registers a game, replacing the existing entry of the same id.
    pub fn register(&mut self, id: impl Into<String>, table: ActionTable) {
        let id = id.into();
        debug!("Register game {} with actions {:?}", id, table.codes());
        self.games.insert(id, table);
    }

    /// Returns the action table of a game.
    pub fn action_table(&self, id: &str) -> Result<ActionTable> {
        self.games.get(id).cloned().ok_or_else(|| {
            A3cError::Configuration(format!(
                "unknown game {:?}, supported games are {:?}",
                id,
                self.games.keys().collect::<Vec<_>>()
            ))
            .into()
        })
    }

    /// Identifiers of the registered games.
    pub fn games(&self) -> impl Iterator<Item = &str> {
        self.games.keys().map(|k| k.as_str())
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn test_builtin_tables() {
        let registry = GameRegistry::builtin();
        let table = registry.action_table("ppaquette/DoomDeathmatch-v0").unwrap();
        assert_eq!(table.codes(), &[0, 10, 11, 12, 13, 14, 15]);
        let table = registry.action_table("ppaquette/DoomHealthGathering-v0").unwrap();
        assert_eq!(table.codes(), &[13, 14, 15]);
        let table = registry.action_table("Pong-v0").unwrap();
        assert_eq!(table.family(), GameFamily::Atari);
        assert_eq!(table.len(), 3);
    }

    #[test]
    fn test_builtin_tables_are_valid() {
        for (_, family, codes) in BUILTIN_GAMES {
            assert!(ActionTable::new(*family, codes.to_vec()).is_ok());
        }
    }

    #[test]
    fn test_unknown_game() {
        let err = GameRegistry::builtin()
            .action_table("SpaceInvaders-v0")
            .unwrap_err();
        assert!(matches!(
            err.downcast_ref::<A3cError>(),
            Some(A3cError::Configuration(_))
        ));
    }

    #[test]
    fn test_doom_encoding() {
        let table = GameRegistry::builtin()
            .action_table("ppaquette/DoomBasic-v0")
            .unwrap();
        match table.to_native(2).unwrap() {
            NativeAction::Buttons(b) => {
                assert_eq!(b.len(), DOOM_BUTTONS);
                assert_eq!(b.iter().map(|&v| v as usize).sum::<usize>(), 1);
                assert_eq!(b[11], 1);
            }
            a => panic!("unexpected action {:?}", a),
        }
    }

    #[test]
    fn test_atari_encoding() {
        let table = GameRegistry::builtin().action_table("Breakout-v0").unwrap();
        assert_eq!(table.to_native(0).unwrap(), NativeAction::Discrete(1));
        assert_eq!(table.to_native(2).unwrap(), NativeAction::Discrete(3));
    }

    #[test]
    fn test_out_of_range_index() {
        let table = GameRegistry::builtin().action_table("Pong-v0").unwrap();
        let err = table.to_native(3).unwrap_err();
        assert!(matches!(
            err.downcast_ref::<A3cError>(),
            Some(A3cError::InvalidAction {
                index: 3,
                n_actions: 3
            })
        ));
    }

    #[test]
    fn test_invalid_tables() {
        assert!(ActionTable::new(GameFamily::Atari, vec![]).is_err());
        assert!(ActionTable::new(GameFamily::Doom, vec![0, 43]).is_err());
        assert!(ActionTable::new(GameFamily::Atari, vec![0, 43]).is_ok());
    }

    #[test]
    fn test_deserialized_tables_are_validated() {
        let table: ActionTable =
            serde_yaml::from_str("family: Doom\ncodes: [0, 14, 15]\n").unwrap();
        assert_eq!(table, ActionTable::new(GameFamily::Doom, vec![0, 14, 15]).unwrap());

        assert!(serde_yaml::from_str::<ActionTable>("family: Doom\ncodes: [50]\n").is_err());
        assert!(serde_yaml::from_str::<ActionTable>("family: Atari\ncodes: []\n").is_err());
    }

    #[test]
    fn test_register_custom_game() {
        let mut registry = GameRegistry::empty();
        assert!(registry.action_table(CATCH).is_err());
        registry.register(
            "MsPacman-v0",
            ActionTable::new(GameFamily::Atari, vec![2, 3, 4, 5]).unwrap(),
        );
        assert_eq!(registry.action_table("MsPacman-v0").unwrap().len(), 4);
        assert_eq!(registry.games().collect::<Vec<_>>(), vec!["MsPacman-v0"]);
    }
}
