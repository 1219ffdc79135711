use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

/// The three catalog collections an entry can belong to.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "lowercase")]
pub enum EntityKind {
    Character,
    Episode,
    Location,
}

impl EntityKind {
    pub const ALL: [EntityKind; 3] = [EntityKind::Character, EntityKind::Episode, EntityKind::Location];

    /// Plural label used for partition names and tabs
    pub fn plural(&self) -> &'static str {
        match self {
            EntityKind::Character => "characters",
            EntityKind::Episode => "episodes",
            EntityKind::Location => "locations",
        }
    }
}

impl fmt::Display for EntityKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            EntityKind::Character => write!(f, "character"),
            EntityKind::Episode => write!(f, "episode"),
            EntityKind::Location => write!(f, "location"),
        }
    }
}

/// Kind tag plus the display fields only that kind carries.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum FavoriteDetails {
    Character {
        #[serde(default, skip_serializing_if = "Option::is_none")]
        image: Option<String>,
    },
    Episode {
        #[serde(default, skip_serializing_if = "Option::is_none")]
        episode: Option<String>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        air_date: Option<String>,
    },
    Location {
        #[serde(default, skip_serializing_if = "Option::is_none")]
        dimension: Option<String>,
        #[serde(rename = "locationtype", default, skip_serializing_if = "Option::is_none")]
        location_type: Option<String>,
    },
}

impl FavoriteDetails {
    pub fn kind(&self) -> EntityKind {
        match self {
            FavoriteDetails::Character { .. } => EntityKind::Character,
            FavoriteDetails::Episode { .. } => EntityKind::Episode,
            FavoriteDetails::Location { .. } => EntityKind::Location,
        }
    }
}

/// A catalog entity that can be stored as a favorite.
pub trait Favoritable {
    fn favorite_id(&self) -> u32;
    fn favorite_name(&self) -> &str;
    fn favorite_details(&self) -> FavoriteDetails;

    fn favorite_kind(&self) -> EntityKind {
        self.favorite_details().kind()
    }
}

/// Denormalized snapshot of a catalog entity, enough to render it without
/// fetching it again.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct FavoriteEntry {
    pub id: u32,
    pub name: String,
    #[serde(flatten)]
    pub details: FavoriteDetails,
    #[serde(rename = "addedAt")]
    pub added_at: DateTime<Utc>,
}

impl FavoriteEntry {
    /// Snapshot an entity, stamping it with the current time
    pub fn from_entity<E: Favoritable + ?Sized>(entity: &E) -> Self {
        Self {
            id: entity.favorite_id(),
            name: entity.favorite_name().to_string(),
            details: entity.favorite_details(),
            added_at: Utc::now(),
        }
    }

    pub fn kind(&self) -> EntityKind {
        self.details.kind()
    }

    /// Secondary line shown under the name in lists
    pub fn subtitle(&self) -> String {
        match &self.details {
            FavoriteDetails::Character { .. } => String::new(),
            FavoriteDetails::Episode { episode, air_date } => [episode.as_deref(), air_date.as_deref()]
                .into_iter()
                .flatten()
                .collect::<Vec<_>>()
                .join(" · "),
            FavoriteDetails::Location { dimension, location_type } => {
                [location_type.as_deref(), dimension.as_deref()]
                    .into_iter()
                    .flatten()
                    .collect::<Vec<_>>()
                    .join(" · ")
            }
        }
    }
}

/// Re-toggling an entry from the favorites list removes it.
impl Favoritable for FavoriteEntry {
    fn favorite_id(&self) -> u32 {
        self.id
    }

    fn favorite_name(&self) -> &str {
        &self.name
    }

    fn favorite_details(&self) -> FavoriteDetails {
        self.details.clone()
    }
}

/// All favorites, one insertion-ordered sequence per kind.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct FavoritesCollection {
    #[serde(default)]
    pub characters: Vec<FavoriteEntry>,
    #[serde(default)]
    pub episodes: Vec<FavoriteEntry>,
    #[serde(default)]
    pub locations: Vec<FavoriteEntry>,
}

impl FavoritesCollection {
    pub fn partition(&self, kind: EntityKind) -> &[FavoriteEntry] {
        match kind {
            EntityKind::Character => &self.characters,
            EntityKind::Episode => &self.episodes,
            EntityKind::Location => &self.locations,
        }
    }

    pub(crate) fn partition_mut(&mut self, kind: EntityKind) -> &mut Vec<FavoriteEntry> {
        match kind {
            EntityKind::Character => &mut self.characters,
            EntityKind::Episode => &mut self.episodes,
            EntityKind::Location => &mut self.locations,
        }
    }

    pub fn contains(&self, kind: EntityKind, id: u32) -> bool {
        self.partition(kind).iter().any(|entry| entry.id == id)
    }

    pub fn total_count(&self) -> usize {
        self.characters.len() + self.episodes.len() + self.locations.len()
    }

    pub fn is_empty(&self) -> bool {
        self.total_count() == 0
    }

    /// Drop entries that break the partition invariants: zero ids, entries
    /// filed under the wrong kind, and duplicate ids (the last one wins, as
    /// an upsert would have left it). Returns how many entries were dropped.
    pub fn sanitize(&mut self) -> usize {
        let mut dropped = 0;
        for kind in EntityKind::ALL {
            let partition = self.partition_mut(kind);
            let before = partition.len();
            partition.retain(|entry| entry.id > 0 && entry.kind() == kind);
            let mut seen = std::collections::HashSet::new();
            let mut kept: Vec<FavoriteEntry> = Vec::with_capacity(partition.len());
            for entry in partition.drain(..).rev() {
                if seen.insert(entry.id) {
                    kept.push(entry);
                }
            }
            kept.reverse();
            *partition = kept;
            dropped += before - partition.len();
        }
        dropped
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn character_entry(id: u32, name: &str) -> FavoriteEntry {
        FavoriteEntry {
            id,
            name: name.to_string(),
            details: FavoriteDetails::Character { image: None },
            added_at: Utc::now(),
        }
    }

    #[test]
    fn test_entry_serializes_flat() {
        let entry = FavoriteEntry {
            id: 3,
            name: "Citadel of Ricks".to_string(),
            details: FavoriteDetails::Location {
                dimension: Some("unknown".to_string()),
                location_type: Some("Space station".to_string()),
            },
            added_at: DateTime::from_timestamp(1_700_000_000, 0).unwrap(),
        };
        let value = serde_json::to_value(&entry).unwrap();
        assert_eq!(value["type"], "location");
        assert_eq!(value["locationtype"], "Space station");
        assert_eq!(value["dimension"], "unknown");
        assert!(value.get("image").is_none());
        assert!(value.get("addedAt").is_some());

        let back: FavoriteEntry = serde_json::from_value(value).unwrap();
        assert_eq!(back, entry);
    }

    #[test]
    fn test_entry_missing_optional_fields() {
        let json = r#"{"id":1,"type":"episode","name":"Pilot","addedAt":"2024-05-01T10:00:00Z"}"#;
        let entry: FavoriteEntry = serde_json::from_str(json).unwrap();
        assert_eq!(entry.kind(), EntityKind::Episode);
        assert_eq!(
            entry.details,
            FavoriteDetails::Episode { episode: None, air_date: None }
        );
        assert_eq!(entry.subtitle(), "");
    }

    #[test]
    fn test_sanitize_drops_invalid_entries() {
        let mut favorites = FavoritesCollection::default();
        favorites.characters.push(character_entry(1, "Rick"));
        favorites.characters.push(character_entry(0, "Nobody"));
        favorites.characters.push(character_entry(2, "Morty"));
        favorites.characters.push(character_entry(1, "Rick (newer)"));
        favorites.episodes.push(character_entry(5, "Misfiled"));

        assert_eq!(favorites.sanitize(), 3);
        let names: Vec<&str> = favorites.characters.iter().map(|e| e.name.as_str()).collect();
        assert_eq!(names, vec!["Morty", "Rick (newer)"]);
        assert!(favorites.episodes.is_empty());
        assert_eq!(favorites.total_count(), 2);
    }

    #[test]
    fn test_contains_is_per_kind() {
        let mut favorites = FavoritesCollection::default();
        favorites.characters.push(character_entry(5, "Jerry"));
        assert!(favorites.contains(EntityKind::Character, 5));
        assert!(!favorites.contains(EntityKind::Episode, 5));
        assert!(!favorites.contains(EntityKind::Location, 5));
    }
}
