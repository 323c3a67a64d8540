//! Chat/debug commands
//!
//! Viewers (or the developer console) can switch the pickaxe with short
//! `!`-prefixed commands such as `!diamond` or `!large`.

use crate::sim::{ToolSize, ToolTier};

/// A recognized command
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Command {
    /// Switch pickaxe tier (`!wood` .. `!netherite`)
    Tier(ToolTier),
    /// Switch pickaxe size (`!large`, `!small`)
    Size(ToolSize),
}

impl Command {
    /// Parse a chat line. Anything unrecognized yields `None`.
    pub fn parse(line: &str) -> Option<Self> {
        let word = line.trim().strip_prefix('!')?;
        if let Some(tier) = ToolTier::from_str(word) {
            return Some(Command::Tier(tier));
        }
        if let Some(size) = ToolSize::from_str(word) {
            return Some(Command::Size(size));
        }
        log::debug!("Ignoring unknown command {line:?}");
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_tier_commands() {
        assert_eq!(Command::parse("!wood"), Some(Command::Tier(ToolTier::Wood)));
        assert_eq!(Command::parse("  !Netherite "), Some(Command::Tier(ToolTier::Netherite)));
    }

    #[test]
    fn test_size_commands() {
        assert_eq!(Command::parse("!large"), Some(Command::Size(ToolSize::Large)));
        assert_eq!(Command::parse("!small"), Some(Command::Size(ToolSize::Compact)));
    }

    #[test]
    fn test_unknown_commands_ignored() {
        assert_eq!(Command::parse("diamond"), None);
        assert_eq!(Command::parse("!spawn diamond"), None);
        assert_eq!(Command::parse("!"), None);
        assert_eq!(Command::parse(""), None);
    }
}
