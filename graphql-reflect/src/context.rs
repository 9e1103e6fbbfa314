//! Request-scoped values handed to data fetchers.

use std::sync::Arc;

use dashmap::DashMap;
use dashmap::mapref::entry::Entry;
use serde::Serialize;
use serde::de::DeserializeOwned;
use serde_json_bytes::Value;

use crate::error::BoxError;

/// Values shared by every data fetcher of one request, such as the authenticated user.
///
/// Values are kept as JSON, so a fetcher reads them back as whichever type it binds the
/// parameter to. Clones share their values.
#[derive(Clone, Debug, Default)]
pub struct Context {
    values: Arc<DashMap<String, Value>>,
}

impl Context {
    pub fn new() -> Self {
        Self::default()
    }

    /// Reads the value stored under `key` as a `V`.
    pub fn get<V: DeserializeOwned>(&self, key: &str) -> Result<Option<V>, BoxError> {
        let Some(value) = self.values.get(key) else {
            return Ok(None);
        };
        Ok(Some(serde_json_bytes::from_value(value.clone())?))
    }

    /// Stores `value` under `key`, replacing what was there.
    pub fn insert<V: Serialize>(&self, key: impl Into<String>, value: V) -> Result<(), BoxError> {
        let value = serde_json_bytes::to_value(value)?;
        self.values.insert(key.into(), value);
        Ok(())
    }

    /// Replaces the value under `key` with `update(current)` and returns it.
    ///
    /// The entry stays locked during `update`, so concurrent fetchers updating the same key do not
    /// lose each other's changes.
    pub fn update<V, F>(&self, key: impl Into<String>, update: F) -> Result<V, BoxError>
    where
        V: DeserializeOwned + Serialize,
        F: FnOnce(Option<V>) -> V,
    {
        match self.values.entry(key.into()) {
            Entry::Occupied(mut entry) => {
                let current = serde_json_bytes::from_value(entry.get().clone())?;
                let updated = update(Some(current));
                entry.insert(serde_json_bytes::to_value(&updated)?);
                Ok(updated)
            }
            Entry::Vacant(entry) => {
                let updated = update(None);
                entry.insert(serde_json_bytes::to_value(&updated)?);
                Ok(updated)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;

    #[test]
    fn values_are_read_back_typed() {
        let context = Context::new();
        context.insert("user", "ada").unwrap();
        assert_eq!(context.get::<String>("user").unwrap(), Some("ada".to_string()));
        assert_eq!(context.get::<String>("tenant").unwrap(), None);
        assert!(context.get::<u64>("user").is_err());
    }

    #[test]
    fn clones_share_values() {
        let context = Context::new();
        context.clone().insert("loaded", 3).unwrap();
        assert_eq!(context.get::<i32>("loaded").unwrap(), Some(3));
    }

    #[tokio::test]
    async fn concurrent_updates_are_not_lost() {
        let context = Context::new();
        let tasks = (0..16).map(|_| {
            let context = context.clone();
            tokio::spawn(async move {
                context.update("calls", |calls: Option<u32>| calls.unwrap_or_default() + 1)
            })
        });
        for task in futures::future::join_all(tasks).await {
            task.unwrap().unwrap();
        }
        assert_eq!(context.get::<u32>("calls").unwrap(), Some(16));
    }

    #[test]
    fn updates_fail_on_values_of_another_type() {
        let context = Context::new();
        context.insert("calls", "many").unwrap();
        assert!(context
            .update("calls", |calls: Option<u32>| calls.unwrap_or_default() + 1)
            .is_err());
        assert_eq!(context.get::<String>("calls").unwrap(), Some("many".to_string()));
    }
}
