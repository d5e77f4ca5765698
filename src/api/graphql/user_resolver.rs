//! User queries and maintenance mutations. All of these are protected.

use std::sync::Arc;

use async_graphql::{Context, Object, Result, ResultExt};

use crate::api::extractors::validate_input;
use crate::domain::{UpdateUserInput, UserResponse};
use crate::services::{Claims, UserService};

#[derive(Default)]
pub struct UserQuery;

#[Object(name = "Query")]
impl UserQuery {
    async fn all_users(&self, ctx: &Context<'_>) -> Result<Vec<UserResponse>> {
        let users = ctx.data::<Arc<dyn UserService>>()?;
        users
            .list_users()
            .await
            .map(|list| list.into_iter().map(UserResponse::from).collect())
            .extend()
    }

    async fn one_user(&self, ctx: &Context<'_>, id: String) -> Result<UserResponse> {
        let users = ctx.data::<Arc<dyn UserService>>()?;
        users.get_user(&id).await.map(UserResponse::from).extend()
    }
}

#[derive(Default)]
pub struct UserMutation;

#[Object]
impl UserMutation {
    async fn update_user(
        &self,
        ctx: &Context<'_>,
        #[graphql(name = "updateUserInput")] input: UpdateUserInput,
    ) -> Result<UserResponse> {
        validate_input(&input).extend()?;
        let users = ctx.data::<Arc<dyn UserService>>()?;
        users
            .update_email(&input.id, input.email)
            .await
            .map(UserResponse::from)
            .extend()
    }

    async fn remove_user(&self, ctx: &Context<'_>, id: String) -> Result<String> {
        if let Some(claims) = ctx.data_opt::<Claims>() {
            tracing::info!(requested_by = %claims.sub, target = %id, "Removing user");
        }
        let users = ctx.data::<Arc<dyn UserService>>()?;
        users.remove_user(&id).await.extend()
    }
}
