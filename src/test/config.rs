#[cfg(test)]
mod tests {
    use chrono::Duration;
    use serial_test::serial;

    use crate::auth::SessionBackend;
    use crate::env::AppConfig;

    const KEYS: [&str; 5] = [
        "DATABASE_URL",
        "SESSION_BACKEND",
        "SESSION_TTL_HOURS",
        "OTEL_EXPORTER_OTLP_ENDPOINT",
        "OTEL_API_KEY",
    ];

    fn env_with(
        overrides: &[(&'static str, &'static str)],
    ) -> Vec<(&'static str, Option<&'static str>)> {
        KEYS.iter()
            .map(|key| {
                let value = overrides
                    .iter()
                    .find(|(k, _)| k == key)
                    .map(|(_, v)| *v);
                (*key, value)
            })
            .collect()
    }

    #[test]
    #[serial]
    fn test_defaults_when_unset() {
        temp_env::with_vars(env_with(&[]), || {
            let config = AppConfig::from_env().expect("Defaults should load");

            assert_eq!(config.database_url, "sqlite://academies.db");
            assert_eq!(config.session_backend, SessionBackend::Sqlite);
            assert_eq!(config.session_ttl, Duration::hours(24));
            assert!(config.otlp_endpoint.is_none());
        });
    }

    #[test]
    #[serial]
    fn test_values_from_environment() {
        let vars = env_with(&[
            ("DATABASE_URL", "sqlite::memory:"),
            ("SESSION_BACKEND", "memory"),
            ("SESSION_TTL_HOURS", "2"),
            ("OTEL_EXPORTER_OTLP_ENDPOINT", "http://localhost:4317"),
        ]);

        temp_env::with_vars(vars, || {
            let config = AppConfig::from_env().expect("Config should load");

            assert_eq!(config.database_url, "sqlite::memory:");
            assert_eq!(config.session_backend, SessionBackend::Memory);
            assert_eq!(config.session_ttl, Duration::hours(2));
            assert_eq!(
                config.otlp_endpoint.as_deref(),
                Some("http://localhost:4317")
            );
        });
    }

    #[test]
    #[serial]
    fn test_invalid_values_are_rejected() {
        temp_env::with_vars(env_with(&[("SESSION_TTL_HOURS", "0")]), || {
            assert!(AppConfig::from_env().is_err());
        });

        temp_env::with_vars(env_with(&[("SESSION_TTL_HOURS", "soon")]), || {
            assert!(AppConfig::from_env().is_err());
        });

        temp_env::with_vars(env_with(&[("SESSION_BACKEND", "redis")]), || {
            assert!(AppConfig::from_env().is_err());
        });
    }
}
