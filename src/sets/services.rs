use tracing::{debug, info};
use uuid::Uuid;

use super::dto::{LocationWeather, NewSetForm, NicknameForm, SetView};
use super::repo::SetRepo;
use super::repo_types::WeatherSet;
use crate::error::AppError;
use crate::forms::FieldErrors;
use crate::locations::repo::LocationRepo;
use crate::store::Store;
use crate::weather::{kelvin_to_fahrenheit, WeatherApi};

pub const NAME_IN_USE: &str = "You already have a set with that name";

/// Returns the owner's existing set called `name` untouched, or creates
/// one holding `location_ids`. The flag is true when a set was created.
///
/// Two concurrent calls with the same new name can both create.
pub async fn find_or_create_set(
    store: &dyn Store,
    user_id: Uuid,
    name: &str,
    location_ids: &[Uuid],
) -> Result<(WeatherSet, bool), AppError> {
    if let Some(existing) = store.find_set_by_name(user_id, name).await? {
        debug!(set_id = %existing.id, "set already exists");
        return Ok((existing, false));
    }
    let set = store.create_set(user_id, name, location_ids).await?;
    info!(%user_id, set_id = %set.id, locations = location_ids.len(), "set created");
    Ok((set, true))
}

/// Validates a new-set form against the owner's own locations, then
/// finds or creates the set.
pub async fn create_from_form(
    store: &dyn Store,
    user_id: Uuid,
    form: NewSetForm,
) -> Result<WeatherSet, AppError> {
    let mut errors = form.validate();

    let owned = store.list_locations_by_user(user_id).await?;
    let mut picks: Vec<Uuid> = Vec::with_capacity(form.loc_picks.len());
    for raw in &form.loc_picks {
        let pick = Uuid::parse_str(raw.trim())
            .ok()
            .filter(|id| owned.iter().any(|l| l.id == *id));
        match pick {
            Some(id) if !picks.contains(&id) => picks.push(id),
            Some(_) => {}
            None => errors.add("loc_picks", format!("'{}' is not a valid choice for this field.", raw)),
        }
    }
    errors.into_result()?;

    let (set, _) = find_or_create_set(store, user_id, form.name.trim(), &picks).await?;
    Ok(set)
}

/// Current conditions for each location in the set, one upstream call each.
pub async fn view_set(
    store: &dyn Store,
    weather: &dyn WeatherApi,
    user_id: Uuid,
    set_id: Uuid,
) -> Result<SetView, AppError> {
    let set = store
        .find_set(user_id, set_id)
        .await?
        .ok_or(AppError::NotFound("set"))?;
    let locations = store.list_set_locations(set.id).await?;

    let mut out = Vec::with_capacity(locations.len());
    for l in locations {
        // an upstream 404 for a stored zip is an outage, never a missing set
        let report = weather
            .lookup(&l.zip)
            .await
            .map_err(AppError::WeatherUnavailable)?;
        out.push(LocationWeather {
            id: l.id,
            zip: l.zip,
            city: l.city,
            temperature_f: kelvin_to_fahrenheit(report.temperature_kelvin),
            condition: report.condition,
        });
    }
    Ok(SetView {
        set,
        locations: out,
    })
}

async fn resolve_by_name(store: &dyn Store, user_id: Uuid, name: &str) -> Result<WeatherSet, AppError> {
    store
        .find_set_by_name(user_id, name)
        .await?
        .ok_or(AppError::NotFound("set"))
}

/// Renames the owner's earliest set called `name`. A nickname the owner
/// already uses on another set is rejected.
pub async fn rename_set(
    store: &dyn Store,
    user_id: Uuid,
    name: &str,
    form: NicknameForm,
) -> Result<WeatherSet, AppError> {
    let mut set = resolve_by_name(store, user_id, name).await?;
    form.validate().into_result()?;
    let nickname = form.nickname.trim();

    if nickname != set.name {
        if let Some(other) = store.find_set_by_name(user_id, nickname).await? {
            if other.id != set.id {
                return Err(FieldErrors::single("nickname", NAME_IN_USE).into());
            }
        }
        store.rename_set(set.id, nickname).await?;
        info!(%user_id, set_id = %set.id, from = %set.name, to = %nickname, "set renamed");
        set.name = nickname.to_string();
    }
    Ok(set)
}

/// Deletes the owner's earliest set called `name`. Its locations remain.
pub async fn delete_set(store: &dyn Store, user_id: Uuid, name: &str) -> Result<WeatherSet, AppError> {
    let set = resolve_by_name(store, user_id, name).await?;
    if !store.delete_set(set.id).await? {
        return Err(AppError::NotFound("set"));
    }
    info!(%user_id, set_id = %set.id, name = %set.name, "set deleted");
    Ok(set)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::memory::MemoryStore;
    use crate::weather::fake::FakeWeather;
    use crate::weather::WeatherError;

    async fn seeded() -> (MemoryStore, Uuid, Vec<Uuid>) {
        let store = MemoryStore::new();
        let user = Uuid::new_v4();
        let a = store.record_location(user, "48109", "Ann Arbor").await.unwrap();
        let b = store.record_location(user, "02134", "Allston").await.unwrap();
        let c = store.record_location(user, "48109", "Ann Arbor").await.unwrap();
        (store, user, vec![a.id, b.id, c.id])
    }

    fn picks(ids: &[Uuid]) -> Vec<String> {
        ids.iter().map(Uuid::to_string).collect()
    }

    #[tokio::test]
    async fn find_or_create_returns_existing_set_unchanged() {
        let (store, user, locs) = seeded().await;
        let (trips, created) = find_or_create_set(&store, user, "Trips", &locs[..1]).await.unwrap();
        assert!(created);

        let (again, created) = find_or_create_set(&store, user, "Trips", &locs[1..2]).await.unwrap();
        assert!(!created);
        assert_eq!(again.id, trips.id);
        let held: Vec<Uuid> = store
            .list_set_locations(trips.id)
            .await
            .unwrap()
            .into_iter()
            .map(|l| l.id)
            .collect();
        assert_eq!(held, vec![locs[0]]);
        assert_eq!(store.set_count(), 1);
    }

    #[tokio::test]
    async fn same_name_for_another_user_is_a_new_set() {
        let (store, user, locs) = seeded().await;
        let (mine, _) = find_or_create_set(&store, user, "Trips", &locs).await.unwrap();
        let (theirs, created) = find_or_create_set(&store, Uuid::new_v4(), "Trips", &[]).await.unwrap();
        assert!(created);
        assert_ne!(mine.id, theirs.id);
    }

    #[tokio::test]
    async fn form_rejects_foreign_locations_and_dedupes_picks() {
        let (store, user, locs) = seeded().await;
        let stranger = store.record_location(Uuid::new_v4(), "10001", "New York").await.unwrap();

        let err = create_from_form(
            &store,
            user,
            NewSetForm {
                name: "Mixed".into(),
                loc_picks: picks(&[locs[0], stranger.id]),
            },
        )
        .await
        .unwrap_err();
        let AppError::Validation(errors) = err else { panic!("expected validation error") };
        assert!(errors.has("loc_picks"));
        assert_eq!(store.set_count(), 0);

        let set = create_from_form(
            &store,
            user,
            NewSetForm {
                name: "  Home ".into(),
                loc_picks: picks(&[locs[1], locs[1], locs[0]]),
            },
        )
        .await
        .unwrap();
        assert_eq!(set.name, "Home");
        let held: Vec<Uuid> = store
            .list_set_locations(set.id)
            .await
            .unwrap()
            .into_iter()
            .map(|l| l.id)
            .collect();
        assert_eq!(held, vec![locs[1], locs[0]]);
    }

    #[tokio::test]
    async fn unparseable_pick_is_a_field_error() {
        let (store, user, locs) = seeded().await;
        let err = create_from_form(
            &store,
            user,
            NewSetForm {
                name: "Trips".into(),
                loc_picks: vec![locs[0].to_string(), "abc".into()],
            },
        )
        .await
        .unwrap_err();
        let AppError::Validation(errors) = err else { panic!("expected validation error") };
        assert_eq!(
            errors.get("loc_picks").unwrap(),
            ["'abc' is not a valid choice for this field."]
        );
        assert_eq!(store.set_count(), 0);
    }

    #[tokio::test]
    async fn viewing_a_set_issues_one_lookup_per_location() {
        let (store, user, locs) = seeded().await;
        let (set, _) = find_or_create_set(&store, user, "All", &locs).await.unwrap();
        let weather = FakeWeather::new()
            .with("48109", "Ann Arbor", 273.0, "Snow")
            .with("02134", "Allston", 300.0, "Clear");

        let view = view_set(&store, &weather, user, set.id).await.unwrap();
        assert_eq!(weather.calls(), 3);
        assert_eq!(view.locations.len(), 3);
        // duplicate zips stay separate entries
        assert_eq!(view.locations[0].zip, "48109");
        assert_eq!(view.locations[2].zip, "48109");
        assert_eq!(view.locations[0].temperature_f, 31.7);
        assert_eq!(view.locations[1].temperature_f, 80.3);
        assert_eq!(view.locations[1].condition, "Clear");
    }

    #[tokio::test]
    async fn viewing_is_owner_scoped_and_surfaces_upstream_failure() {
        let (store, user, locs) = seeded().await;
        let (set, _) = find_or_create_set(&store, user, "All", &locs).await.unwrap();

        let err = view_set(&store, &FakeWeather::new(), Uuid::new_v4(), set.id)
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::NotFound("set")));

        let down = FakeWeather::new().failing(|| WeatherError::Status(502));
        let err = view_set(&store, &down, user, set.id).await.unwrap_err();
        assert!(matches!(err, AppError::WeatherUnavailable(WeatherError::Status(502))));
    }

    #[tokio::test]
    async fn stored_zip_unknown_upstream_is_unavailable_not_missing() {
        let (store, user, locs) = seeded().await;
        let (set, _) = find_or_create_set(&store, user, "All", &locs).await.unwrap();

        let err = view_set(&store, &FakeWeather::new(), user, set.id).await.unwrap_err();
        assert!(matches!(err, AppError::WeatherUnavailable(WeatherError::NotFound)));
    }

    #[tokio::test]
    async fn delete_removes_first_match_only() {
        let (store, user, locs) = seeded().await;
        let other_user = Uuid::new_v4();
        let first = store.insert_set_unchecked(user, "Trips", &locs[..1]);
        let second = store.insert_set_unchecked(user, "Trips", &locs[1..2]);
        let theirs = store.insert_set_unchecked(other_user, "Trips", &[]);

        let deleted = delete_set(&store, user, "Trips").await.unwrap();
        assert_eq!(deleted.id, first.id);

        let remaining = store.list_sets(user).await.unwrap();
        assert_eq!(remaining.len(), 1);
        assert_eq!(remaining[0].id, second.id);
        assert_eq!(store.list_sets(other_user).await.unwrap()[0].id, theirs.id);
        // locations survive the set
        assert_eq!(store.list_locations_by_user(user).await.unwrap().len(), 3);
    }

    #[tokio::test]
    async fn delete_unknown_name_is_not_found() {
        let (store, user, _) = seeded().await;
        let err = delete_set(&store, user, "Nope").await.unwrap_err();
        assert!(matches!(err, AppError::NotFound("set")));
    }

    #[tokio::test]
    async fn rename_rejects_names_already_in_use() {
        let (store, user, _) = seeded().await;
        store.insert_set_unchecked(user, "Work", &[]);
        store.insert_set_unchecked(user, "Home", &[]);

        let err = rename_set(&store, user, "Work", NicknameForm { nickname: "Home".into() })
            .await
            .unwrap_err();
        let AppError::Validation(errors) = err else { panic!("expected validation error") };
        assert_eq!(errors.get("nickname").unwrap(), [NAME_IN_USE]);

        let renamed = rename_set(&store, user, "Work", NicknameForm { nickname: "Office".into() })
            .await
            .unwrap();
        assert_eq!(renamed.name, "Office");
        assert!(store.find_set_by_name(user, "Work").await.unwrap().is_none());
        assert!(store.find_set_by_name(user, "Office").await.unwrap().is_some());
    }

    #[tokio::test]
    async fn rename_requires_nickname() {
        let (store, user, _) = seeded().await;
        store.insert_set_unchecked(user, "Work", &[]);
        let err = rename_set(&store, user, "Work", NicknameForm::default())
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::Validation(ref e) if e.has("nickname")));
    }
}
