use rocket::State;
use rocket::http::Status;
use rocket::response::status::Custom;
use rocket::serde::{Deserialize, Serialize, json::Json};
use sqlx::{Pool, Sqlite};
use tracing::info;
use validator::Validate;

use crate::auth::account::{self, SessionGrant};
use crate::auth::{BearerToken, Sessions, User};
use crate::category::{CLASSIFICATION_NOTE, classify};
use crate::db::{
    create_academy, create_medal, delete_academy, get_academy, list_academies, list_medals,
    medals_by_academy,
};
use crate::env::AppConfig;
use crate::models::{Academy, Medal, NewAcademy, NewMedal, RankingEntry};
use crate::ranking::rank;
use crate::validation::{ApiResult, AppErrorExt, JsonValidateExt, ValidationResponse};

#[derive(Deserialize, Validate, Clone)]
pub struct RegisterRequest {
    #[serde(rename = "nome", alias = "name")]
    #[validate(length(min = 1, message = "Name is required"))]
    name: String,
    #[validate(email(message = "Invalid email address"))]
    email: String,
    #[serde(rename = "senha", alias = "password")]
    #[validate(length(min = 1, message = "Password is required"))]
    password: String,
}

#[derive(Deserialize, Validate)]
pub struct LoginRequest {
    #[validate(email(message = "Invalid email address"))]
    email: String,
    #[serde(rename = "senha", alias = "password")]
    password: String,
}

#[derive(Serialize, Deserialize, Debug)]
pub struct AuthResponse {
    pub message: String,
    pub token: String,
    pub name: String,
}

impl AuthResponse {
    fn new(message: &str, grant: SessionGrant) -> Self {
        Self {
            message: message.to_string(),
            token: grant.token,
            name: grant.user.name,
        }
    }
}

#[post("/register", data = "<registration>")]
pub async fn api_register(
    registration: Json<RegisterRequest>,
    db: &State<Pool<Sqlite>>,
    sessions: &State<Sessions>,
    config: &State<AppConfig>,
) -> ApiResult<Json<AuthResponse>> {
    let validated = registration.validate_custom()?;

    let grant = account::register(
        db,
        sessions.inner().as_ref(),
        &validated.name,
        &validated.email,
        &validated.password,
        config.session_ttl,
    )
    .await
    .validate_custom()?;

    Ok(Json(AuthResponse::new("User registered", grant)))
}

#[post("/login", data = "<login>")]
pub async fn api_login(
    login: Json<LoginRequest>,
    db: &State<Pool<Sqlite>>,
    sessions: &State<Sessions>,
    config: &State<AppConfig>,
) -> ApiResult<Json<AuthResponse>> {
    let validated = login.validate_custom()?;

    let grant = account::login(
        db,
        sessions.inner().as_ref(),
        &validated.email,
        &validated.password,
        config.session_ttl,
    )
    .await
    .validate_custom()?;

    Ok(Json(AuthResponse::new("Logged in", grant)))
}

#[post("/logout")]
pub async fn api_logout(
    token: BearerToken,
    user: User,
    sessions: &State<Sessions>,
) -> ApiResult<Status> {
    account::logout(sessions.inner().as_ref(), &token.0)
        .await
        .validate_custom()?;

    info!(user_id = %user.id, "User logged out");
    Ok(Status::NoContent)
}

#[derive(Deserialize, Validate)]
pub struct CategoryRequest {
    #[serde(rename = "idade")]
    age: u32,
    #[serde(rename = "peso")]
    #[validate(range(exclusive_min = 0.0, message = "Weight must be positive"))]
    weight: f64,
    #[serde(rename = "sexo")]
    sex: String,
}

#[derive(Serialize, Deserialize, Debug)]
pub struct CategoryResponse {
    pub faixa_etaria: String,
    pub categoria_peso: String,
    pub observacao: Option<String>,
}

#[post("/categoria", data = "<request>")]
pub fn api_classify(request: Json<CategoryRequest>) -> ApiResult<Json<CategoryResponse>> {
    let validated = request.validate_custom()?;

    let classification = classify(validated.age, validated.weight, &validated.sex);

    Ok(Json(CategoryResponse {
        faixa_etaria: classification.age_bracket.to_string(),
        categoria_peso: classification.weight_category.to_string(),
        observacao: Some(CLASSIFICATION_NOTE.to_string()),
    }))
}

#[post("/academias", data = "<academy>")]
pub async fn api_create_academy(
    user: User,
    academy: Json<NewAcademy>,
    db: &State<Pool<Sqlite>>,
) -> ApiResult<Custom<Json<Academy>>> {
    let validated = academy.validate_custom()?;

    let created = create_academy(db, &validated).await.validate_custom()?;

    info!(user_id = %user.id, academy_id = %created.id, "Academy created");
    Ok(Custom(Status::Created, Json(created)))
}

#[get("/academias?<cidade>&<bairro>")]
pub async fn api_list_academies(
    cidade: Option<String>,
    bairro: Option<String>,
    db: &State<Pool<Sqlite>>,
) -> ApiResult<Json<Vec<Academy>>> {
    let city = cidade.as_deref().filter(|s| !s.is_empty());
    let neighborhood = bairro.as_deref().filter(|s| !s.is_empty());

    let academies = list_academies(db, city, neighborhood)
        .await
        .validate_custom()?;

    Ok(Json(academies))
}

#[get("/academias/<id>")]
pub async fn api_get_academy(id: i64, db: &State<Pool<Sqlite>>) -> ApiResult<Json<Academy>> {
    let academy = get_academy(db, id).await.validate_custom()?;

    Ok(Json(academy))
}

#[delete("/academias/<id>")]
pub async fn api_delete_academy(
    id: i64,
    user: User,
    db: &State<Pool<Sqlite>>,
) -> ApiResult<Status> {
    delete_academy(db, id).await.validate_custom()?;

    info!(user_id = %user.id, academy_id = %id, "Academy deleted");
    Ok(Status::NoContent)
}

#[post("/medalhas", data = "<medal>")]
pub async fn api_create_medal(
    user: User,
    medal: Json<NewMedal>,
    db: &State<Pool<Sqlite>>,
) -> ApiResult<Custom<Json<Medal>>> {
    let validated = medal.validate_custom()?;

    let created = create_medal(db, &validated).await.validate_custom()?;

    info!(
        user_id = %user.id,
        medal_id = %created.id,
        medal_type = %validated.medal_type,
        "Medal recorded"
    );
    Ok(Custom(Status::Created, Json(created)))
}

/// Empty and zero ids mean "no filter"; anything else must be an integer.
fn parse_academy_filter(raw: Option<&str>) -> ApiResult<Option<i64>> {
    let Some(value) = raw.map(str::trim).filter(|v| !v.is_empty()) else {
        return Ok(None);
    };

    match value.parse::<i64>() {
        Ok(0) => Ok(None),
        Ok(id) => Ok(Some(id)),
        Err(_) => Err(Custom(
            Status::UnprocessableEntity,
            Json(ValidationResponse::with_error(
                "academia_id",
                "academia_id must be an integer",
            )),
        )),
    }
}

#[get("/medalhas?<academia_id>")]
pub async fn api_list_medals(
    academia_id: Option<String>,
    db: &State<Pool<Sqlite>>,
) -> ApiResult<Json<Vec<Medal>>> {
    let academy_id = parse_academy_filter(academia_id.as_deref())?;

    let medals = list_medals(db, academy_id).await.validate_custom()?;

    Ok(Json(medals))
}

#[get("/ranking/academias")]
pub async fn api_academy_ranking(db: &State<Pool<Sqlite>>) -> ApiResult<Json<Vec<RankingEntry>>> {
    let academies = list_academies(db, None, None).await.validate_custom()?;
    let medals = medals_by_academy(db).await.validate_custom()?;

    Ok(Json(rank(&academies, &medals)))
}

#[get("/health")]
pub fn health() -> &'static str {
    "OK"
}
