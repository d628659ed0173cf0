use chrono::NaiveDate;
use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::fmt;
use validator::Validate;

// e.g. "(31) 99999-8888" or "31999998888"
pub static PHONE_REGEX: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^\(?\d{2}\)?\s?\d{4,5}-?\d{4}$").expect("phone pattern is valid"));

pub const DEFAULT_VALIDATION_STATUS: &str = "approved";

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct Academy {
    pub id: i64,
    #[serde(rename = "nome")]
    pub name: String,
    #[serde(rename = "mestre")]
    pub head_instructor: String,
    #[serde(rename = "cidade")]
    pub city: String,
    #[serde(rename = "bairro")]
    pub neighborhood: String,
    #[serde(rename = "telefone")]
    pub phone: String,
    #[serde(rename = "endereco")]
    pub address: String,
    pub email: String,
}

#[derive(sqlx::FromRow, Clone)]
pub struct DbAcademy {
    pub id: Option<i64>,
    pub name: Option<String>,
    pub head_instructor: Option<String>,
    pub city: Option<String>,
    pub neighborhood: Option<String>,
    pub phone: Option<String>,
    pub address: Option<String>,
    pub email: Option<String>,
}

impl From<DbAcademy> for Academy {
    fn from(academy: DbAcademy) -> Self {
        Self {
            id: academy.id.unwrap_or_default(),
            name: academy.name.unwrap_or_default(),
            head_instructor: academy.head_instructor.unwrap_or_default(),
            city: academy.city.unwrap_or_default(),
            neighborhood: academy.neighborhood.unwrap_or_default(),
            phone: academy.phone.unwrap_or_default(),
            address: academy.address.unwrap_or_default(),
            email: academy.email.unwrap_or_default(),
        }
    }
}

#[derive(Debug, Deserialize, Validate, Clone)]
pub struct NewAcademy {
    #[serde(rename = "nome")]
    #[validate(length(min = 1, message = "Name is required"))]
    pub name: String,
    #[serde(rename = "mestre")]
    #[validate(length(min = 1, message = "Head instructor is required"))]
    pub head_instructor: String,
    #[serde(rename = "cidade")]
    pub city: String,
    #[serde(rename = "bairro")]
    pub neighborhood: String,
    #[serde(rename = "telefone")]
    #[validate(regex(path = *PHONE_REGEX, message = "Invalid phone. Ex: (31) 99999-8888"))]
    pub phone: String,
    #[serde(rename = "endereco")]
    pub address: String,
    #[validate(email(message = "Invalid email address"))]
    pub email: String,
}

#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq, Eq, Hash)]
#[serde(rename_all = "lowercase")]
pub enum MedalType {
    Gold,
    Silver,
    Bronze,
}

impl MedalType {
    pub fn as_str(&self) -> &'static str {
        match self {
            MedalType::Gold => "gold",
            MedalType::Silver => "silver",
            MedalType::Bronze => "bronze",
        }
    }

    /// Exact, case-sensitive match against the stored markers.
    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "gold" => Some(MedalType::Gold),
            "silver" => Some(MedalType::Silver),
            "bronze" => Some(MedalType::Bronze),
            _ => None,
        }
    }
}

impl fmt::Display for MedalType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct Medal {
    pub id: i64,
    #[serde(rename = "academia_id")]
    pub academy_id: i64,
    #[serde(rename = "faixa")]
    pub belt: String,
    #[serde(rename = "sexo")]
    pub sex: String,
    #[serde(rename = "categoria_peso")]
    pub weight_category: String,
    // Kept as stored; rows written before the type was constrained may hold other values.
    #[serde(rename = "tipo_medalha")]
    pub medal_type: String,
    #[serde(rename = "campeonato")]
    pub tournament: String,
    #[serde(rename = "cidade_evento")]
    pub event_city: String,
    #[serde(rename = "data_evento")]
    pub event_date: NaiveDate,
    #[serde(rename = "comprovante_descricao")]
    pub evidence_description: Option<String>,
    #[serde(rename = "status_validacao")]
    pub validation_status: String,
}

impl Medal {
    pub fn kind(&self) -> Option<MedalType> {
        MedalType::parse(&self.medal_type)
    }
}

#[derive(sqlx::FromRow, Clone)]
pub struct DbMedal {
    pub id: Option<i64>,
    pub academy_id: Option<i64>,
    pub belt: Option<String>,
    pub sex: Option<String>,
    pub weight_category: Option<String>,
    pub medal_type: Option<String>,
    pub tournament: Option<String>,
    pub event_city: Option<String>,
    pub event_date: Option<NaiveDate>,
    pub evidence_description: Option<String>,
    pub validation_status: Option<String>,
}

impl From<DbMedal> for Medal {
    fn from(medal: DbMedal) -> Self {
        Self {
            id: medal.id.unwrap_or_default(),
            academy_id: medal.academy_id.unwrap_or_default(),
            belt: medal.belt.unwrap_or_default(),
            sex: medal.sex.unwrap_or_default(),
            weight_category: medal.weight_category.unwrap_or_default(),
            medal_type: medal.medal_type.unwrap_or_default(),
            tournament: medal.tournament.unwrap_or_default(),
            event_city: medal.event_city.unwrap_or_default(),
            event_date: medal.event_date.unwrap_or_default(),
            evidence_description: medal.evidence_description,
            validation_status: medal
                .validation_status
                .unwrap_or_else(|| DEFAULT_VALIDATION_STATUS.to_string()),
        }
    }
}

#[derive(Debug, Deserialize, Validate, Clone)]
pub struct NewMedal {
    #[serde(rename = "academia_id")]
    pub academy_id: i64,
    #[serde(rename = "faixa")]
    #[validate(length(min = 1, message = "Belt is required"))]
    pub belt: String,
    #[serde(rename = "sexo")]
    pub sex: String,
    #[serde(rename = "categoria_peso")]
    pub weight_category: String,
    #[serde(rename = "tipo_medalha")]
    pub medal_type: MedalType,
    #[serde(rename = "campeonato")]
    #[validate(length(min = 1, message = "Tournament is required"))]
    pub tournament: String,
    #[serde(rename = "cidade_evento")]
    pub event_city: String,
    #[serde(rename = "data_evento")]
    pub event_date: NaiveDate,
    #[serde(rename = "comprovante_descricao", default)]
    pub evidence_description: Option<String>,
}

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Eq)]
pub struct RankingEntry {
    #[serde(rename = "academia_id")]
    pub academy_id: i64,
    #[serde(rename = "nome_academia")]
    pub academy_name: String,
    #[serde(rename = "ouro")]
    pub gold: u32,
    #[serde(rename = "prata")]
    pub silver: u32,
    pub bronze: u32,
    pub total: u32,
}
