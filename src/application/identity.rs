use bcrypt::{DEFAULT_COST, hash, verify};

use crate::application::ServiceDependencies;
use crate::application::errors::{Result, ServiceError};
use crate::domain::commands::RegisterUser;
use crate::domain::User;
use crate::ports::{AccessToken, NewUser};

/// 利用者を登録してトークンを発行する
pub async fn register_user(
    deps: &ServiceDependencies,
    cmd: RegisterUser,
) -> Result<(User, AccessToken)> {
    // 1. パスワードをハッシュ化
    let password_hash = hash(&cmd.password, DEFAULT_COST).map_err(ServiceError::PasswordHash)?;

    // 2. 利用者を登録（メールアドレスの重複はここで検出される）
    let user = deps
        .user_repository
        .create(NewUser {
            name: cmd.name,
            email: cmd.email,
            password_hash,
        })
        .await
        .map_err(ServiceError::Repository)?
        .ok_or(ServiceError::EmailTaken)?;

    // 3. トークンを発行
    let token = deps
        .token_store
        .issue(user.id)
        .await
        .map_err(ServiceError::Repository)?;

    Ok((user, token))
}

/// メールアドレスとパスワードでログインする
///
/// 利用者が存在しない場合もパスワードが合わない場合も同じ
/// InvalidCredentials を返す（どちらで失敗したかは漏らさない）。
pub async fn login(
    deps: &ServiceDependencies,
    email: &str,
    password: &str,
) -> Result<(User, AccessToken)> {
    let user = deps
        .user_repository
        .find_by_email(email)
        .await
        .map_err(ServiceError::Repository)?
        .ok_or(ServiceError::InvalidCredentials)?;

    let verified = verify(password, &user.password_hash).map_err(ServiceError::PasswordHash)?;
    if !verified {
        return Err(ServiceError::InvalidCredentials);
    }

    let token = deps
        .token_store
        .issue(user.id)
        .await
        .map_err(ServiceError::Repository)?;

    Ok((user, token))
}

/// トークンを失効させる
pub async fn logout(deps: &ServiceDependencies, token: &AccessToken) -> Result<()> {
    deps.token_store
        .revoke(token)
        .await
        .map_err(ServiceError::Repository)
}

/// トークンから利用者を解決する
///
/// 失効済み・未発行のトークンは None。
pub async fn authenticate(
    deps: &ServiceDependencies,
    token: &AccessToken,
) -> Result<Option<User>> {
    let user_id = match deps
        .token_store
        .resolve(token)
        .await
        .map_err(ServiceError::Repository)?
    {
        Some(id) => id,
        None => return Ok(None),
    };

    deps.user_repository
        .find_by_id(user_id)
        .await
        .map_err(ServiceError::Repository)
}
