use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::ToSchema;

#[derive(Deserialize, ToSchema)]
pub struct CreateUserReq {
    #[schema(example = "jane.hr")]
    pub username: String,
    #[schema(example = "correct horse battery staple")]
    pub password: String,
    /// 1 = admin, 2 = HR manager, 3 = station manager
    #[schema(example = 3)]
    pub role_id: u8,
    /// Required for station managers
    #[schema(example = "dandora")]
    pub location: Option<String>,
}

#[derive(Deserialize, ToSchema)]
pub struct LoginReqDto {
    #[schema(example = "jane.hr")]
    pub username: String,
    #[schema(example = "correct horse battery staple")]
    pub password: String,
}

#[derive(FromRow)]
pub struct UserSql {
    pub id: u64, // BIGINT UNSIGNED
    pub username: String,
    pub password: String,
    pub role_id: u8,
    pub location: Option<String>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct Claims {
    pub user_id: u64,
    pub sub: String,
    pub role: u8, // role id
    pub exp: usize,
    pub jti: String,
    /// Station the user manages, if any
    pub location: Option<String>,
}
