use std::fmt;

use packlink_frame::{Sentinels, END_SENTINELS, START_SENTINEL};
use serde::{Deserialize, Serialize};

/// A controller on the pack network.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Role {
    Pack,
    Wand,
    Attenuator,
}

impl Role {
    pub const ALL: [Role; 3] = [Role::Pack, Role::Wand, Role::Attenuator];

    /// Start/end markers on every command and data record this role sends.
    pub const fn sentinels(self) -> Sentinels {
        match self {
            Role::Pack => Sentinels::new(START_SENTINEL, 0x7F),
            Role::Wand => Sentinels::new(START_SENTINEL, 0x7E),
            Role::Attenuator => Sentinels::new(START_SENTINEL, 0x7D),
        }
    }

    /// Whether this end drives the heartbeat on its link to `peer`.
    ///
    /// The wand beats toward the pack; the pack beats toward the attenuator.
    pub fn initiates_heartbeat(self, peer: Role) -> bool {
        matches!(
            (self, peer),
            (Role::Wand, Role::Pack) | (Role::Pack, Role::Attenuator)
        )
    }

    pub fn name(self) -> &'static str {
        match self {
            Role::Pack => "pack",
            Role::Wand => "wand",
            Role::Attenuator => "attenuator",
        }
    }

    /// Parse a role name as used on the command line.
    pub fn from_name(name: &str) -> Option<Self> {
        Role::ALL
            .into_iter()
            .find(|role| role.name().eq_ignore_ascii_case(name))
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sentinels_are_distinct_per_role() {
        assert_eq!(Role::Pack.sentinels(), Sentinels::new(1, 0x7F));
        assert_ne!(Role::Wand.sentinels(), Role::Attenuator.sentinels());
        assert_ne!(Role::Pack.sentinels(), Role::Wand.sentinels());
        for role in Role::ALL {
            assert!(END_SENTINELS.contains(&role.sentinels().end), "{role}");
        }
    }

    #[test]
    fn heartbeat_initiators() {
        assert!(Role::Wand.initiates_heartbeat(Role::Pack));
        assert!(!Role::Pack.initiates_heartbeat(Role::Wand));
        assert!(Role::Pack.initiates_heartbeat(Role::Attenuator));
        assert!(!Role::Attenuator.initiates_heartbeat(Role::Pack));
    }

    #[test]
    fn names_parse_back() {
        for role in Role::ALL {
            assert_eq!(Role::from_name(role.name()), Some(role));
        }
        assert_eq!(Role::from_name("WAND"), Some(Role::Wand));
        assert_eq!(Role::from_name("trap"), None);
    }
}
