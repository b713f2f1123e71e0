use std::sync::Arc;

use axum::{RequestPartsExt, async_trait, extract::FromRequestParts, http::request::Parts};
use axum_extra::{
    TypedHeader,
    headers::{Authorization, authorization::Bearer},
};

use crate::application::identity;
use crate::domain::{User, UserId};
use crate::ports::token_store::AccessToken;

use super::error::ApiError;
use super::handlers::AppState;

/// 認証済みの利用者
///
/// `Authorization: Bearer <token>` ヘッダからトークンを取り出し、
/// 紐づく利用者を解決してハンドラに渡す。
pub struct CurrentUser {
    pub access_token: AccessToken,
    pub user: User,
}

impl CurrentUser {
    pub fn id(&self) -> UserId {
        self.user.id
    }
}

#[async_trait]
impl FromRequestParts<Arc<AppState>> for CurrentUser {
    type Rejection = ApiError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &Arc<AppState>,
    ) -> Result<Self, Self::Rejection> {
        // HTTPヘッダからアクセストークンを取り出す
        let TypedHeader(Authorization(bearer)) = parts
            .extract::<TypedHeader<Authorization<Bearer>>>()
            .await
            .map_err(|_| ApiError::Unauthorized)?;
        let access_token = AccessToken::new(bearer.token());

        // トークンに紐づく利用者を解決する
        let user = identity::authenticate(&state.service_deps, &access_token)
            .await?
            .ok_or(ApiError::Unauthorized)?;

        Ok(Self { access_token, user })
    }
}
