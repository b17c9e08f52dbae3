use crate::message::{ConnectionId, UserDescription};
use rand::Rng;
use serde_json::Value;
use std::collections::BTreeMap;

pub const UNKNOWN_USER_NAME: &str = "Unknown";

#[derive(Debug, Clone, PartialEq)]
pub struct User {
    pub name: String,
    pub color: Value,
}

/// Connected users, keyed by connection.
#[derive(Debug)]
pub struct Presence {
    users: BTreeMap<ConnectionId, User>,
    name_counter: u64,
}

impl Presence {
    pub fn new() -> Self {
        Self {
            users: BTreeMap::new(),
            name_counter: 0,
        }
    }

    pub fn join<R: Rng>(&mut self, connection_id: ConnectionId, rng: &mut R) -> &User {
        self.name_counter += 1;
        let user = User {
            name: format!("User{}", self.name_counter),
            color: Value::String(random_color(rng)),
        };
        self.users.insert(connection_id, user);
        &self.users[&connection_id]
    }

    pub fn leave(&mut self, connection_id: &ConnectionId) -> Option<User> {
        self.users.remove(connection_id)
    }

    /// Stores whatever the client sent. Returns false when the connection
    /// has no user.
    pub fn set_color(&mut self, connection_id: &ConnectionId, color: Value) -> bool {
        match self.users.get_mut(connection_id) {
            Some(user) => {
                user.color = color;
                true
            }
            None => false,
        }
    }

    pub fn name_of(&self, connection_id: &ConnectionId) -> &str {
        self.users
            .get(connection_id)
            .map(|user| user.name.as_str())
            .unwrap_or(UNKNOWN_USER_NAME)
    }

    pub fn len(&self) -> usize {
        self.users.len()
    }

    pub fn is_empty(&self) -> bool {
        self.users.is_empty()
    }

    pub fn describe(&self) -> Vec<UserDescription> {
        self.users
            .iter()
            .map(|(id, user)| UserDescription {
                id: *id,
                color: user.color.clone(),
                name: user.name.clone(),
            })
            .collect()
    }
}

impl Default for Presence {
    fn default() -> Self {
        Self::new()
    }
}

/// `#RRGGBB`, uppercase.
pub fn random_color<R: Rng>(rng: &mut R) -> String {
    format!("#{:06X}", rng.gen_range(0..=0xFF_FFFFu32))
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;
    use serde_json::json;

    #[test]
    fn it_names_users_in_join_order() {
        let mut rng = StdRng::seed_from_u64(7);
        let mut presence = Presence::new();
        assert_eq!(presence.join(4, &mut rng).name, "User1");
        assert_eq!(presence.join(2, &mut rng).name, "User2");
        presence.leave(&4);
        assert_eq!(presence.join(4, &mut rng).name, "User3");

        let ids = presence.describe().iter().map(|u| u.id).collect::<Vec<_>>();
        assert_eq!(ids, [2, 4]);
    }

    #[test]
    fn it_generates_hex_colors() {
        let mut rng = StdRng::seed_from_u64(1);
        for _ in 0..100 {
            let color = random_color(&mut rng);
            assert_eq!(color.len(), 7);
            assert!(color.starts_with('#'));
            assert!(color[1..]
                .chars()
                .all(|c| c.is_ascii_digit() || ('A'..='F').contains(&c)));
        }
    }

    #[test]
    fn it_falls_back_to_unknown_name() {
        let presence = Presence::new();
        assert_eq!(presence.name_of(&9), UNKNOWN_USER_NAME);
    }

    #[test]
    fn it_ignores_color_change_of_unknown_connection() {
        let mut rng = StdRng::seed_from_u64(3);
        let mut presence = Presence::new();
        presence.join(1, &mut rng);

        assert!(!presence.set_color(&2, json!("#FFFFFF")));
        assert!(presence.set_color(&1, json!("#123456")));
        assert_eq!(presence.describe()[0].color, json!("#123456"));
    }

    #[test]
    fn it_keeps_colors_of_any_shape() {
        let mut rng = StdRng::seed_from_u64(5);
        let mut presence = Presence::new();
        assert!(presence.join(1, &mut rng).color.is_string());

        assert!(presence.set_color(&1, Value::Null));
        assert_eq!(presence.describe()[0].color, Value::Null);
    }
}
