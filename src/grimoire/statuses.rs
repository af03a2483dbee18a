//! Status catalog and applied status instances.

use serde::{Deserialize, Serialize};

use super::types::Time;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StatusKind {
    /// Chosen by a werewolf tonight; resolved at dawn.
    Targeted,
    Protected,
    Poisoned,
    /// The Butler's master for tomorrow's vote.
    Patron,
    /// Registers as evil to the Seer.
    RedHerring,
    /// The Nain's grandchild.
    Grandchild,
    /// Set on the Puppet: intoxicated for the whole game.
    Marionette,
    /// The Goblin's public claim for today.
    Claimed,
}

#[derive(Debug, Clone, Copy)]
pub struct StatusTemplate {
    pub name: &'static str,
    pub description: &'static str,
    /// Removed when the clock moves into this time of day.
    pub expiration: Option<Time>,
    /// Whether holding the status intoxicates the holder.
    pub intoxicates: bool,
}

impl StatusKind {
    pub fn template(self) -> StatusTemplate {
        match self {
            StatusKind::Targeted => StatusTemplate {
                name: "Targeted",
                description: "Chosen by the werewolves tonight.",
                expiration: Some(Time::Day),
                intoxicates: false,
            },
            StatusKind::Protected => StatusTemplate {
                name: "Protected",
                description: "Safe from the werewolves tonight.",
                expiration: Some(Time::Day),
                intoxicates: false,
            },
            StatusKind::Poisoned => StatusTemplate {
                name: "Poisoned",
                description: "Their ability does not work tonight and tomorrow day.",
                expiration: Some(Time::Night),
                intoxicates: true,
            },
            StatusKind::Patron => StatusTemplate {
                name: "Patron",
                description: "The Butler may only vote if this player votes.",
                expiration: Some(Time::Night),
                intoxicates: false,
            },
            StatusKind::RedHerring => StatusTemplate {
                name: "Red Herring",
                description: "Registers as evil to the Seer.",
                expiration: None,
                intoxicates: false,
            },
            StatusKind::Grandchild => StatusTemplate {
                name: "Grandchild",
                description: "If the werewolves kill them, the Nain dies too.",
                expiration: None,
                intoxicates: false,
            },
            StatusKind::Marionette => StatusTemplate {
                name: "Marionette",
                description: "Thinks they are a Villager but is an evil Puppet.",
                expiration: None,
                intoxicates: true,
            },
            StatusKind::Claimed => StatusTemplate {
                name: "Claimed",
                description: "Publicly claimed to be the Goblin today.",
                expiration: Some(Time::Night),
                intoxicates: false,
            },
        }
    }
}

/// A status on a player. `intoxicated` marks a status applied by an
/// intoxicated actor: it is visible on the grimoire but has no effect.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Status {
    pub kind: StatusKind,
    #[serde(default)]
    pub applied_by: Option<String>,
    #[serde(default)]
    pub expiration: Option<Time>,
    #[serde(default)]
    pub intoxicated: bool,
    /// Substituted description shown to the moderator for intoxicated statuses.
    #[serde(default)]
    pub note: Option<String>,
}

impl Status {
    pub fn new(kind: StatusKind) -> Self {
        Self {
            kind,
            applied_by: None,
            expiration: kind.template().expiration,
            intoxicated: false,
            note: None,
        }
    }

    pub fn applied(kind: StatusKind, actor: &str, affliction: Option<&str>) -> Self {
        let template = kind.template();
        Self {
            applied_by: Some(actor.to_string()),
            intoxicated: affliction.is_some(),
            note: affliction.map(|a| {
                format!("{} (no effect: {actor} is {a})", template.name)
            }),
            ..Self::new(kind)
        }
    }

    /// An effective status: present and not applied while intoxicated.
    pub fn is_active(&self) -> bool {
        !self.intoxicated
    }

    pub fn description(&self) -> String {
        match &self.note {
            Some(note) => note.clone(),
            None => self.kind.template().description.to_string(),
        }
    }
}
