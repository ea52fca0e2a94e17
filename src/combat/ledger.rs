//! Round ledger
//!
//! Collects narration for one round, keyed by combatant and observer channel,
//! then renders a single block of text per fighting player in initiative
//! order. Sub-rounds (the mobile phase and the player phase) fill separate
//! ledgers which are merged before rendering.

use std::collections::HashMap;

/// Who a fragment of narration is meant for
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Channel {
    /// The combatant itself ("You hit the rat")
    Own,
    /// The combatant's fellow fighters ("Alice hits the rat")
    Group,
    /// Kills credited to the combatant ("The rat is DEAD!!!")
    KillingBlow,
    /// Bystanders in the room; not keyed by combatant
    Room,
}

/// Marker every killing-blow line ends with
pub const DEAD_SUFFIX: &str = "is DEAD!!!";

/// A player's place in the initiative order
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InitiativeSlot {
    pub key: String,
    /// Whether the player is still standing at render time
    pub alive: bool,
}

impl InitiativeSlot {
    pub fn new(key: &str, alive: bool) -> Self {
        Self {
            key: key.to_string(),
            alive,
        }
    }
}

/// Narration accumulated during a round
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RoundLedger {
    own: HashMap<String, String>,
    group: HashMap<String, String>,
    killing_blow: HashMap<String, String>,
    room: String,
}

impl RoundLedger {
    /// Create an empty ledger
    pub fn new() -> Self {
        Self::default()
    }

    /// Append `text` for `combatant` on `channel`.
    ///
    /// The room channel ignores `combatant`. Keyed channels without a
    /// combatant have nowhere to go and drop the text.
    pub fn add_text(&mut self, combatant: Option<&str>, text: &str, channel: Channel) {
        let map = match channel {
            Channel::Own => &mut self.own,
            Channel::Group => &mut self.group,
            Channel::KillingBlow => &mut self.killing_blow,
            Channel::Room => {
                self.room.push_str(text);
                return;
            }
        };

        if let Some(key) = combatant {
            map.entry(key.to_string()).or_default().push_str(text);
        }
    }

    /// Accumulated text for `combatant` on a keyed channel
    pub fn text(&self, combatant: &str, channel: Channel) -> Option<&str> {
        let map = match channel {
            Channel::Own => &self.own,
            Channel::Group => &self.group,
            Channel::KillingBlow => &self.killing_blow,
            Channel::Room => return None,
        };
        map.get(combatant).map(String::as_str)
    }

    /// Text for bystanders
    pub fn room_text(&self) -> &str {
        &self.room
    }

    /// True when nothing has been recorded
    pub fn is_empty(&self) -> bool {
        self.own.is_empty()
            && self.group.is_empty()
            && self.killing_blow.is_empty()
            && self.room.is_empty()
    }

    /// Append everything in `other` after what is already here
    pub fn merge(mut self, other: RoundLedger) -> RoundLedger {
        append_all(&mut self.own, other.own);
        append_all(&mut self.group, other.group);
        append_all(&mut self.killing_blow, other.killing_blow);
        self.room.push_str(&other.room);
        self
    }

    /// Render per-player text for the fighters in `order`.
    ///
    /// Each player sees their own actions before reading about the fighters
    /// after them. Every player in `order` gets an entry, possibly empty.
    pub fn render(&self, order: &[InitiativeSlot]) -> HashMap<String, String> {
        let mut result: HashMap<String, String> = order
            .iter()
            .map(|slot| (slot.key.clone(), String::new()))
            .collect();

        for slot in order {
            if let Some(own) = self.own.get(&slot.key) {
                push(&mut result, &slot.key, own);
            }

            let group = self.group.get(&slot.key);
            let kills = self.killing_blow.get(&slot.key);

            for other in order.iter().filter(|o| o.key != slot.key) {
                if let Some(group) = group {
                    push(&mut result, &other.key, group);
                }
                if let Some(kills) = kills {
                    push(&mut result, &other.key, kills);
                }
            }

            // a fallen killer already has their own death narration
            if let (Some(kills), true) = (kills, slot.alive) {
                push(&mut result, &slot.key, &first_person_kills(kills));
            }
        }

        result
    }
}

fn append_all(into: &mut HashMap<String, String>, from: HashMap<String, String>) {
    for (key, text) in from {
        into.entry(key).or_default().push_str(&text);
    }
}

fn push(result: &mut HashMap<String, String>, key: &str, text: &str) {
    if let Some(entry) = result.get_mut(key) {
        entry.push_str(text);
    }
}

/// "The rat is DEAD!!!" becomes "You killed The rat!!!", one line per kill
pub fn first_person_kills(kills: &str) -> String {
    kills
        .lines()
        .map(|line| line.replace(DEAD_SUFFIX, ""))
        .map(|victim| victim.trim().to_string())
        .filter(|victim| !victim.is_empty())
        .map(|victim| format!("You killed {}!!!\n", victim))
        .collect()
}
