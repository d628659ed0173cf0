#[cfg(test)]
pub mod test_utils {
    use crate::auth::account::register;
    use crate::auth::{MemorySessionStore, Sessions};
    use crate::db::{create_academy, create_medal};
    use crate::env::AppConfig;
    use crate::error::AppError;
    use crate::init_rocket;
    use crate::models::{MedalType, NewAcademy, NewMedal};
    use chrono::NaiveDate;
    use rocket::http::{ContentType, Header, Status};
    use rocket::local::asynchronous::Client;
    use serde_json::{Value, json};
    use sqlx::sqlite::SqlitePoolOptions;
    use sqlx::{Pool, Sqlite};
    use std::collections::HashMap;
    use std::sync::{Arc, Once};

    static INIT: Once = Once::new();
    pub static STANDARD_PASSWORD: &str = "password123";

    pub fn init_test_tracing() {
        INIT.call_once(|| {
            let _ = tracing_subscriber::fmt()
                .with_env_filter(tracing_subscriber::EnvFilter::new("debug"))
                .with_test_writer()
                .try_init();
        });
    }

    pub async fn test_pool() -> Pool<Sqlite> {
        init_test_tracing();

        let pool = SqlitePoolOptions::new()
            .max_connections(1)
            .connect("sqlite::memory:")
            .await
            .expect("Failed to create in-memory database");

        sqlx::migrate!("./migrations")
            .run(&pool)
            .await
            .expect("Failed to run migrations");

        pool
    }

    pub fn academy_fixture(name: &str, city: &str, neighborhood: &str) -> NewAcademy {
        NewAcademy {
            name: name.to_string(),
            head_instructor: format!("Head of {}", name),
            city: city.to_string(),
            neighborhood: neighborhood.to_string(),
            phone: "(31) 99999-8888".to_string(),
            address: "Rua das Flores, 100".to_string(),
            email: "contact@academy.com".to_string(),
        }
    }

    pub fn medal_fixture(academy_id: i64, medal_type: MedalType) -> NewMedal {
        NewMedal {
            academy_id,
            belt: "blue".to_string(),
            sex: "M".to_string(),
            weight_category: "Light".to_string(),
            medal_type,
            tournament: "State Open".to_string(),
            event_city: "Belo Horizonte".to_string(),
            event_date: NaiveDate::from_ymd_opt(2025, 3, 15).expect("valid date"),
            evidence_description: None,
        }
    }

    struct TestUser {
        name: String,
        email: String,
        password: String,
    }

    struct TestAcademy {
        name: String,
        city: String,
        neighborhood: String,
    }

    struct TestMedal {
        academy_name: String,
        medal_type: String,
    }

    #[derive(Default)]
    pub struct TestDbBuilder {
        users: Vec<TestUser>,
        academies: Vec<TestAcademy>,
        medals: Vec<TestMedal>,
    }

    impl TestDbBuilder {
        pub fn new() -> Self {
            Self::default()
        }

        pub fn user(mut self, name: &str, email: &str) -> Self {
            self.users.push(TestUser {
                name: name.to_string(),
                email: email.to_string(),
                password: STANDARD_PASSWORD.to_string(),
            });
            self
        }

        pub fn academy(mut self, name: &str, city: &str, neighborhood: &str) -> Self {
            self.academies.push(TestAcademy {
                name: name.to_string(),
                city: city.to_string(),
                neighborhood: neighborhood.to_string(),
            });
            self
        }

        pub fn medals(mut self, academy_name: &str, medal_type: MedalType, count: usize) -> Self {
            for _ in 0..count {
                self.medals.push(TestMedal {
                    academy_name: academy_name.to_string(),
                    medal_type: medal_type.as_str().to_string(),
                });
            }
            self
        }

        /// Inserts a medal row with an arbitrary type string, bypassing API validation.
        pub fn raw_medal(mut self, academy_name: &str, medal_type: &str) -> Self {
            self.medals.push(TestMedal {
                academy_name: academy_name.to_string(),
                medal_type: medal_type.to_string(),
            });
            self
        }

        pub async fn build(self) -> Result<TestDb, AppError> {
            let pool = test_pool().await;
            let sessions: Sessions = Arc::new(MemorySessionStore::default());
            let config = AppConfig::default();

            let mut user_id_map = HashMap::new();
            let mut token_map = HashMap::new();
            let mut academy_id_map = HashMap::new();

            for user in &self.users {
                let grant = register(
                    &pool,
                    sessions.as_ref(),
                    &user.name,
                    &user.email,
                    &user.password,
                    config.session_ttl,
                )
                .await?;

                user_id_map.insert(user.email.clone(), grant.user.id);
                token_map.insert(user.email.clone(), grant.token);
            }

            for academy in &self.academies {
                let created = create_academy(
                    &pool,
                    &academy_fixture(&academy.name, &academy.city, &academy.neighborhood),
                )
                .await?;

                academy_id_map.insert(academy.name.clone(), created.id);
            }

            for medal in &self.medals {
                let academy_id = academy_id_map
                    .get(&medal.academy_name)
                    .copied()
                    .ok_or_else(|| AppError::NotFound(medal.academy_name.clone()))?;

                match MedalType::parse(&medal.medal_type) {
                    Some(medal_type) => {
                        create_medal(&pool, &medal_fixture(academy_id, medal_type)).await?;
                    }
                    None => {
                        sqlx::query(
                            "INSERT INTO medals
                             (academy_id, belt, sex, weight_category, medal_type, tournament,
                              event_city, event_date)
                             VALUES (?, 'white', 'F', 'Light', ?, 'Legacy Cup', 'Contagem', '2020-01-01')",
                        )
                        .bind(academy_id)
                        .bind(&medal.medal_type)
                        .execute(&pool)
                        .await?;
                    }
                }
            }

            Ok(TestDb {
                pool,
                sessions,
                config,
                user_id_map,
                token_map,
                academy_id_map,
            })
        }
    }

    pub struct TestDb {
        pub pool: Pool<Sqlite>,
        pub sessions: Sessions,
        pub config: AppConfig,
        pub user_id_map: HashMap<String, i64>,
        pub token_map: HashMap<String, String>,
        pub academy_id_map: HashMap<String, i64>,
    }

    impl TestDb {
        pub fn user_id(&self, email: &str) -> Option<i64> {
            self.user_id_map.get(email).copied()
        }

        pub fn token(&self, email: &str) -> Option<String> {
            self.token_map.get(email).cloned()
        }

        pub fn academy_id(&self, name: &str) -> Option<i64> {
            self.academy_id_map.get(name).copied()
        }
    }

    pub async fn create_standard_test_db() -> TestDb {
        TestDbBuilder::new()
            .user("Coach User", "coach@example.com")
            .academy("Alliance", "Belo Horizonte", "Savassi")
            .academy("Gracie Barra", "Belo Horizonte", "Centro")
            .academy("Checkmat", "Contagem", "Centro")
            .medals("Alliance", MedalType::Gold, 2)
            .medals("Alliance", MedalType::Silver, 1)
            .medals("Checkmat", MedalType::Gold, 1)
            .build()
            .await
            .expect("Failed to build test database")
    }

    pub async fn setup_test_client(test_db: TestDb) -> (Client, TestDb) {
        let rocket = init_rocket(
            test_db.pool.clone(),
            test_db.sessions.clone(),
            test_db.config.clone(),
        )
        .await;

        let client = Client::tracked(rocket)
            .await
            .expect("Failed to build rocket client");

        (client, test_db)
    }

    pub fn bearer(token: &str) -> Header<'static> {
        Header::new("Authorization", format!("Bearer {}", token))
    }

    pub async fn login_test_user(client: &Client, email: &str, password: &str) -> String {
        let response = client
            .post("/login")
            .header(ContentType::JSON)
            .body(json!({ "email": email, "senha": password }).to_string())
            .dispatch()
            .await;

        assert_eq!(response.status(), Status::Ok, "Login failed for {}", email);

        let body: Value = response.into_json().await.expect("Login response was not JSON");
        body["token"]
            .as_str()
            .expect("Login response had no token")
            .to_string()
    }
}
