//! Access-layer operations over notification preferences.

use backoffice_core::error::CoreError;
use backoffice_core::guard::assert_ownership;
use backoffice_core::notification::validate_type_key;
use backoffice_core::preference::{preference_filters, resolve_enabled};
use backoffice_core::principal::{require, Principal};
use backoffice_db::models::notification::{NotificationPreference, UpdatePreference};

use crate::notifications::NotificationService;

fn check_type_key(notification_type: &str) -> Result<(), CoreError> {
    validate_type_key(notification_type).map_err(|e| CoreError::Validation(e.to_string()))
}

impl NotificationService {
    /// All stored preferences of `user_id`, ordered by type. Types without a
    /// row are absent here and resolve to the defaults.
    pub async fn get_notification_preferences(
        &self,
        identity: Option<&Principal>,
        user_id: &str,
    ) -> Result<Vec<NotificationPreference>, CoreError> {
        let principal = require(identity)?;
        assert_ownership(principal, user_id)?;

        Ok(self
            .store
            .list_preferences(&preference_filters(principal.user_id(), None))
            .await?)
    }

    /// Create or partially update the preference for one type.
    pub async fn update_notification_preference(
        &self,
        identity: Option<&Principal>,
        user_id: &str,
        notification_type: &str,
        input: &UpdatePreference,
    ) -> Result<NotificationPreference, CoreError> {
        let principal = require(identity)?;
        assert_ownership(principal, user_id)?;
        check_type_key(notification_type)?;

        let pref = self
            .store
            .upsert_preference(principal.user_id(), notification_type, input)
            .await?;
        tracing::info!(
            user_id = principal.user_id(),
            notification_type,
            enabled = pref.enabled,
            "Notification preference updated"
        );
        Ok(pref)
    }

    /// Whether `user_id` receives notifications of `notification_type`.
    /// Enabled unless a stored row says otherwise.
    pub async fn is_notification_enabled(
        &self,
        identity: Option<&Principal>,
        user_id: &str,
        notification_type: &str,
    ) -> Result<bool, CoreError> {
        let principal = require(identity)?;
        assert_ownership(principal, user_id)?;
        check_type_key(notification_type)?;

        let stored = self
            .store
            .find_preference(&preference_filters(
                principal.user_id(),
                Some(notification_type),
            ))
            .await?;
        Ok(resolve_enabled(stored.map(|p| p.enabled)))
    }
}
