use std::sync::Mutex;

use async_trait::async_trait;
use time::OffsetDateTime;
use uuid::Uuid;

use crate::auth::repo::UserRepo;
use crate::auth::repo_types::User;
use crate::locations::repo::LocationRepo;
use crate::locations::repo_types::Location;
use crate::sets::repo::SetRepo;
use crate::sets::repo_types::{SetSummary, WeatherSet};

#[derive(Default)]
struct Inner {
    users: Vec<User>,
    locations: Vec<Location>,
    sets: Vec<WeatherSet>,
    // (set id, location id) in link order
    links: Vec<(Uuid, Uuid)>,
    search_log: Vec<(String, Vec<Uuid>)>,
}

/// In-process store with the same ordering rules as the SQL: rows come
/// back in insertion order.
#[derive(Default)]
pub struct MemoryStore {
    inner: Mutex<Inner>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn user_count(&self) -> usize {
        self.inner.lock().unwrap().users.len()
    }

    pub fn set_count(&self) -> usize {
        self.inner.lock().unwrap().sets.len()
    }

    pub fn logged_locations(&self, query: &str) -> Vec<Uuid> {
        let inner = self.inner.lock().unwrap();
        inner
            .search_log
            .iter()
            .find(|(q, _)| q == query)
            .map(|(_, ids)| ids.clone())
            .unwrap_or_default()
    }

    /// Inserts a set directly, bypassing the find-or-create lookup.
    pub fn insert_set_unchecked(&self, user_id: Uuid, name: &str, location_ids: &[Uuid]) -> WeatherSet {
        let mut inner = self.inner.lock().unwrap();
        let set = WeatherSet {
            id: Uuid::new_v4(),
            name: name.to_string(),
            user_id,
            created_at: OffsetDateTime::now_utc(),
        };
        inner.sets.push(set.clone());
        for id in location_ids {
            inner.links.push((set.id, *id));
        }
        set
    }
}

#[async_trait]
impl UserRepo for MemoryStore {
    async fn find_by_email(&self, email: &str) -> anyhow::Result<Option<User>> {
        let inner = self.inner.lock().unwrap();
        Ok(inner.users.iter().find(|u| u.email == email).cloned())
    }

    async fn find_by_username(&self, username: &str) -> anyhow::Result<Option<User>> {
        let inner = self.inner.lock().unwrap();
        Ok(inner.users.iter().find(|u| u.username == username).cloned())
    }

    async fn create_user(
        &self,
        username: &str,
        email: &str,
        password_hash: &str,
    ) -> anyhow::Result<Option<User>> {
        let mut inner = self.inner.lock().unwrap();
        if inner
            .users
            .iter()
            .any(|u| u.username == username || u.email == email)
        {
            return Ok(None);
        }
        let user = User {
            id: Uuid::new_v4(),
            username: username.to_string(),
            email: email.to_string(),
            password_hash: password_hash.to_string(),
            created_at: OffsetDateTime::now_utc(),
        };
        inner.users.push(user.clone());
        Ok(Some(user))
    }
}

#[async_trait]
impl LocationRepo for MemoryStore {
    async fn record_location(&self, user_id: Uuid, zip: &str, city: &str) -> anyhow::Result<Location> {
        let mut guard = self.inner.lock().unwrap();
        let inner = &mut *guard;
        let location = Location {
            id: Uuid::new_v4(),
            zip: zip.to_string(),
            city: city.to_string(),
            user_id: Some(user_id),
            created_at: OffsetDateTime::now_utc(),
        };
        inner.locations.push(location.clone());
        match inner.search_log.iter_mut().find(|(q, _)| q == zip) {
            Some((_, ids)) => ids.push(location.id),
            None => inner.search_log.push((zip.to_string(), vec![location.id])),
        }
        Ok(location)
    }

    async fn list_all_locations(&self) -> anyhow::Result<Vec<Location>> {
        Ok(self.inner.lock().unwrap().locations.clone())
    }

    async fn list_locations_by_user(&self, user_id: Uuid) -> anyhow::Result<Vec<Location>> {
        let inner = self.inner.lock().unwrap();
        Ok(inner
            .locations
            .iter()
            .filter(|l| l.user_id == Some(user_id))
            .cloned()
            .collect())
    }
}

#[async_trait]
impl SetRepo for MemoryStore {
    async fn find_set_by_name(&self, user_id: Uuid, name: &str) -> anyhow::Result<Option<WeatherSet>> {
        let inner = self.inner.lock().unwrap();
        Ok(inner
            .sets
            .iter()
            .find(|s| s.user_id == user_id && s.name == name)
            .cloned())
    }

    async fn find_set(&self, user_id: Uuid, set_id: Uuid) -> anyhow::Result<Option<WeatherSet>> {
        let inner = self.inner.lock().unwrap();
        Ok(inner
            .sets
            .iter()
            .find(|s| s.user_id == user_id && s.id == set_id)
            .cloned())
    }

    async fn create_set(&self, user_id: Uuid, name: &str, location_ids: &[Uuid]) -> anyhow::Result<WeatherSet> {
        Ok(self.insert_set_unchecked(user_id, name, location_ids))
    }

    async fn list_sets(&self, user_id: Uuid) -> anyhow::Result<Vec<SetSummary>> {
        let inner = self.inner.lock().unwrap();
        Ok(inner
            .sets
            .iter()
            .filter(|s| s.user_id == user_id)
            .map(|s| SetSummary {
                id: s.id,
                name: s.name.clone(),
                created_at: s.created_at,
                location_count: inner.links.iter().filter(|(set, _)| *set == s.id).count() as i64,
            })
            .collect())
    }

    async fn list_set_locations(&self, set_id: Uuid) -> anyhow::Result<Vec<Location>> {
        let inner = self.inner.lock().unwrap();
        Ok(inner
            .links
            .iter()
            .filter(|(set, _)| *set == set_id)
            .filter_map(|(_, loc)| inner.locations.iter().find(|l| l.id == *loc).cloned())
            .collect())
    }

    async fn rename_set(&self, set_id: Uuid, name: &str) -> anyhow::Result<()> {
        let mut inner = self.inner.lock().unwrap();
        if let Some(set) = inner.sets.iter_mut().find(|s| s.id == set_id) {
            set.name = name.to_string();
        }
        Ok(())
    }

    async fn delete_set(&self, set_id: Uuid) -> anyhow::Result<bool> {
        let mut inner = self.inner.lock().unwrap();
        let before = inner.sets.len();
        inner.sets.retain(|s| s.id != set_id);
        inner.links.retain(|(set, _)| *set != set_id);
        Ok(inner.sets.len() != before)
    }
}
