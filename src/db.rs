use std::collections::HashMap;

use sqlx::{Pool, Sqlite};
use tracing::{info, instrument};

use crate::error::AppError;
use crate::models::{
    Academy, DEFAULT_VALIDATION_STATUS, DbAcademy, DbMedal, Medal, NewAcademy, NewMedal,
};

const ACADEMY_COLUMNS: &str =
    "id, name, head_instructor, city, neighborhood, phone, address, email";

const MEDAL_COLUMNS: &str = "id, academy_id, belt, sex, weight_category, medal_type, tournament, \
     event_city, event_date, evidence_description, validation_status";

#[instrument(skip(pool))]
pub async fn create_academy(pool: &Pool<Sqlite>, academy: &NewAcademy) -> Result<Academy, AppError> {
    info!("Creating academy");
    let res = sqlx::query(
        "INSERT INTO academies (name, head_instructor, city, neighborhood, phone, address, email)
         VALUES (?, ?, ?, ?, ?, ?, ?)",
    )
    .bind(&academy.name)
    .bind(&academy.head_instructor)
    .bind(&academy.city)
    .bind(&academy.neighborhood)
    .bind(&academy.phone)
    .bind(&academy.address)
    .bind(&academy.email)
    .execute(pool)
    .await?;

    Ok(Academy {
        id: res.last_insert_rowid(),
        name: academy.name.clone(),
        head_instructor: academy.head_instructor.clone(),
        city: academy.city.clone(),
        neighborhood: academy.neighborhood.clone(),
        phone: academy.phone.clone(),
        address: academy.address.clone(),
        email: academy.email.clone(),
    })
}

#[instrument(skip(pool))]
pub async fn get_academy(pool: &Pool<Sqlite>, id: i64) -> Result<Academy, AppError> {
    info!("Fetching academy by ID");
    let row = sqlx::query_as::<_, DbAcademy>(&format!(
        "SELECT {} FROM academies WHERE id = ?",
        ACADEMY_COLUMNS
    ))
    .bind(id)
    .fetch_optional(pool)
    .await?;

    match row {
        Some(academy) => Ok(Academy::from(academy)),
        _ => Err(AppError::NotFound(format!("Academy with id {} not found", id))),
    }
}

/// Academies ordered by id, optionally narrowed to an exact city and/or neighborhood.
#[instrument(skip(pool))]
pub async fn list_academies(
    pool: &Pool<Sqlite>,
    city: Option<&str>,
    neighborhood: Option<&str>,
) -> Result<Vec<Academy>, AppError> {
    info!("Listing academies");
    let rows = sqlx::query_as::<_, DbAcademy>(&format!(
        "SELECT {} FROM academies
         WHERE (?1 IS NULL OR city = ?1) AND (?2 IS NULL OR neighborhood = ?2)
         ORDER BY id",
        ACADEMY_COLUMNS
    ))
    .bind(city)
    .bind(neighborhood)
    .fetch_all(pool)
    .await?;

    Ok(rows.into_iter().map(Academy::from).collect())
}

/// Deletes the academy and, through the foreign key, all of its medals.
#[instrument(skip(pool))]
pub async fn delete_academy(pool: &Pool<Sqlite>, id: i64) -> Result<(), AppError> {
    info!("Deleting academy");
    let result = sqlx::query("DELETE FROM academies WHERE id = ?")
        .bind(id)
        .execute(pool)
        .await?;

    if result.rows_affected() == 0 {
        return Err(AppError::NotFound(format!("Academy with id {} not found", id)));
    }

    Ok(())
}

#[instrument(skip(pool), fields(academy_id = medal.academy_id))]
pub async fn create_medal(pool: &Pool<Sqlite>, medal: &NewMedal) -> Result<Medal, AppError> {
    info!("Creating medal");
    let mut tx = pool.begin().await?;

    let academy = sqlx::query_scalar::<_, i64>("SELECT id FROM academies WHERE id = ?")
        .bind(medal.academy_id)
        .fetch_optional(&mut *tx)
        .await?;

    if academy.is_none() {
        return Err(AppError::NotFound(format!(
            "Academy with id {} not found",
            medal.academy_id
        )));
    }

    let res = sqlx::query(
        "INSERT INTO medals
         (academy_id, belt, sex, weight_category, medal_type, tournament, event_city,
          event_date, evidence_description, validation_status)
         VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?)",
    )
    .bind(medal.academy_id)
    .bind(&medal.belt)
    .bind(&medal.sex)
    .bind(&medal.weight_category)
    .bind(medal.medal_type.as_str())
    .bind(&medal.tournament)
    .bind(&medal.event_city)
    .bind(medal.event_date)
    .bind(&medal.evidence_description)
    .bind(DEFAULT_VALIDATION_STATUS)
    .execute(&mut *tx)
    .await?;

    tx.commit().await?;

    Ok(Medal {
        id: res.last_insert_rowid(),
        academy_id: medal.academy_id,
        belt: medal.belt.clone(),
        sex: medal.sex.clone(),
        weight_category: medal.weight_category.clone(),
        medal_type: medal.medal_type.as_str().to_string(),
        tournament: medal.tournament.clone(),
        event_city: medal.event_city.clone(),
        event_date: medal.event_date,
        evidence_description: medal.evidence_description.clone(),
        validation_status: DEFAULT_VALIDATION_STATUS.to_string(),
    })
}

#[instrument(skip(pool))]
pub async fn list_medals(
    pool: &Pool<Sqlite>,
    academy_id: Option<i64>,
) -> Result<Vec<Medal>, AppError> {
    info!("Listing medals");
    let rows = sqlx::query_as::<_, DbMedal>(&format!(
        "SELECT {} FROM medals WHERE (?1 IS NULL OR academy_id = ?1) ORDER BY id",
        MEDAL_COLUMNS
    ))
    .bind(academy_id)
    .fetch_all(pool)
    .await?;

    Ok(rows.into_iter().map(Medal::from).collect())
}

#[instrument(skip(pool))]
pub async fn medals_by_academy(pool: &Pool<Sqlite>) -> Result<HashMap<i64, Vec<Medal>>, AppError> {
    info!("Grouping medals by academy");
    let mut grouped: HashMap<i64, Vec<Medal>> = HashMap::new();

    for medal in list_medals(pool, None).await? {
        grouped.entry(medal.academy_id).or_default().push(medal);
    }

    Ok(grouped)
}
