//! Which command vocabulary applies to a frame, by sender and receiver.

use std::fmt;

use packlink_peer::{
    AttenuatorToPack, CommandSet, PackToAttenuator, PackToWand, Role, WandToPack,
};

use crate::exit::{CliError, CliResult};

/// One direction of one physical link.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Route {
    pub from: Role,
    pub to: Role,
}

impl Route {
    /// Pair `from` with `to`, defaulting the receiver to the only peer a
    /// peripheral has, or to the wand for the pack.
    pub fn new(from: Role, to: Option<Role>) -> CliResult<Self> {
        let to = to.unwrap_or(match from {
            Role::Pack => Role::Wand,
            Role::Wand | Role::Attenuator => Role::Pack,
        });
        match (from, to) {
            (Role::Pack, Role::Wand | Role::Attenuator)
            | (Role::Wand | Role::Attenuator, Role::Pack) => Ok(Self { from, to }),
            _ => Err(CliError::usage(format!("there is no link from {from} to {to}"))),
        }
    }

    pub fn command_name(self, id: u8) -> Option<&'static str> {
        match (self.from, self.to) {
            (Role::Pack, Role::Wand) => name_of::<PackToWand>(id),
            (Role::Pack, _) => name_of::<PackToAttenuator>(id),
            (Role::Wand, _) => name_of::<WandToPack>(id),
            (Role::Attenuator, _) => name_of::<AttenuatorToPack>(id),
        }
    }

    /// Resolve a command given by wire name or numeric id.
    pub fn parse_command(self, text: &str) -> CliResult<u8> {
        let id = match (self.from, self.to) {
            (Role::Pack, Role::Wand) => id_of::<PackToWand>(text),
            (Role::Pack, _) => id_of::<PackToAttenuator>(text),
            (Role::Wand, _) => id_of::<WandToPack>(text),
            (Role::Attenuator, _) => id_of::<AttenuatorToPack>(text),
        };
        match id {
            Some(0) => Err(CliError::usage("command id 0 is reserved")),
            Some(id) => Ok(id),
            None => Err(CliError::usage(format!(
                "unknown command {text:?} on the {self} link"
            ))),
        }
    }
}

impl fmt::Display for Route {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}->{}", self.from, self.to)
    }
}

/// Clap value parser for role names.
pub fn parse_role(text: &str) -> Result<Role, String> {
    Role::from_name(text).ok_or_else(|| format!("expected pack, wand or attenuator, got {text:?}"))
}

fn name_of<C: CommandSet>(id: u8) -> Option<&'static str> {
    C::from_id(id).map(C::name)
}

fn id_of<C: CommandSet>(text: &str) -> Option<u8> {
    C::parse(text).map(C::id)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn peripherals_default_to_the_pack() {
        let route = Route::new(Role::Wand, None).expect("wand route should resolve");
        assert_eq!(route.to, Role::Pack);
        let route = Route::new(Role::Pack, None).expect("pack route should resolve");
        assert_eq!(route.to, Role::Wand);
    }

    #[test]
    fn peripherals_have_no_direct_link() {
        assert!(Route::new(Role::Wand, Some(Role::Attenuator)).is_err());
        assert!(Route::new(Role::Pack, Some(Role::Pack)).is_err());
    }

    #[test]
    fn names_follow_the_direction() {
        let to_wand = Route::new(Role::Pack, Some(Role::Wand)).expect("route");
        let to_attenuator = Route::new(Role::Pack, Some(Role::Attenuator)).expect("route");
        assert_eq!(to_wand.command_name(3), Some("P_SYNC_START"));
        assert_eq!(
            to_attenuator.command_name(PackToAttenuator::SyncStart.id()),
            Some("A_SYNC_START")
        );
    }

    #[test]
    fn commands_parse_by_name_or_id() {
        let route = Route::new(Role::Wand, None).expect("route");
        let by_name = route.parse_command("w_sync_now").expect("name should parse");
        assert_eq!(by_name, WandToPack::SyncNow.id());
        assert_eq!(
            route.parse_command(&by_name.to_string()).expect("id should parse"),
            by_name
        );
        assert!(route.parse_command("P_SYNC_START").is_err());
        assert!(route.parse_command("0").is_err());
    }
}
