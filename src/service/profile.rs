use std::sync::Arc;

use validator::Validate;

use crate::auth::auth::AuthUser;
use crate::error::AppError;
use crate::model::profile::{Profile, UpdateProfile};
use crate::store::Store;

pub struct ProfileService {
    store: Arc<dyn Store>,
}

impl ProfileService {
    pub fn new(store: Arc<dyn Store>) -> Self {
        Self { store }
    }

    pub async fn get(&self, user: &AuthUser) -> Result<Profile, AppError> {
        self.store
            .find_profile(user.user_id)
            .await?
            .ok_or_else(|| AppError::NotFound("Profile not found".to_string()))
    }

    pub async fn upsert(&self, user: &AuthUser, update: UpdateProfile) -> Result<Profile, AppError> {
        update.validate()?;
        self.store
            .upsert_profile(&update.into_profile(user.user_id))
            .await
    }
}
