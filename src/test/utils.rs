#[cfg(test)]
pub mod test_db {
    use crate::database::{apply_migrations, initialize_schema};
    use crate::db::{create_module, create_program, create_session};
    use crate::error::AppError;
    use chrono::NaiveDate;
    use sqlx::sqlite::SqlitePoolOptions;
    use sqlx::{Pool, Sqlite};
    use std::collections::HashMap;
    use std::sync::Once;

    static INIT: Once = Once::new();
    pub static STANDARD_PASSWORD: &str = "program-password-123";

    #[derive(Default)]
    pub struct TestDbBuilder {
        programs: Vec<TestProgram>,
        modules: Vec<TestModule>,
        sessions: Vec<TestSession>,
    }

    pub struct TestProgram {
        pub name: String,
        pub description: String,
        pub password: String,
    }

    pub struct TestModule {
        pub program_name: String,
        pub name: String,
        pub display_order: i64,
    }

    pub struct TestSession {
        pub module_name: String,
        pub name: String,
        pub video_url: String,
        pub session_number: Option<i64>,
        pub session_date: Option<NaiveDate>,
    }

    impl TestDbBuilder {
        pub fn new() -> Self {
            Self::default()
        }

        pub fn program(self, name: &str) -> Self {
            self.program_with_password(name, STANDARD_PASSWORD)
        }

        pub fn program_with_password(mut self, name: &str, password: &str) -> Self {
            self.programs.push(TestProgram {
                name: name.to_string(),
                description: format!("Description for {}", name),
                password: password.to_string(),
            });
            self
        }

        pub fn module(mut self, program_name: &str, name: &str, display_order: i64) -> Self {
            self.modules.push(TestModule {
                program_name: program_name.to_string(),
                name: name.to_string(),
                display_order,
            });
            self
        }

        pub fn session(
            mut self,
            module_name: &str,
            name: &str,
            session_number: Option<i64>,
            session_date: Option<&str>,
        ) -> Self {
            self.sessions.push(TestSession {
                module_name: module_name.to_string(),
                name: name.to_string(),
                video_url: "https://example.com/video".to_string(),
                session_number,
                session_date: session_date
                    .map(|d| NaiveDate::parse_from_str(d, "%Y-%m-%d").expect("Bad test date")),
            });
            self
        }

        pub async fn build(self) -> Result<TestDb, AppError> {
            INIT.call_once(|| {
                let _ = env_logger::builder().is_test(true).try_init();
            });

            // A single connection keeps every query on the same in-memory db.
            let pool = SqlitePoolOptions::new()
                .max_connections(1)
                .connect("sqlite::memory:")
                .await?;

            initialize_schema(&pool).await?;
            apply_migrations(&pool).await?;

            let mut program_id_map: HashMap<String, i64> = HashMap::new();
            let mut module_id_map: HashMap<String, i64> = HashMap::new();
            let mut session_id_map: HashMap<String, i64> = HashMap::new();

            for program in &self.programs {
                let id =
                    create_program(&pool, &program.name, &program.description, &program.password)
                        .await?;
                program_id_map.insert(program.name.clone(), id);
            }

            for module in &self.modules {
                let program_id = program_id_map
                    .get(&module.program_name)
                    .copied()
                    .expect("Module references unknown test program");

                let id = create_module(&pool, program_id, &module.name, "", module.display_order)
                    .await?;
                module_id_map.insert(module.name.clone(), id);
            }

            for session in &self.sessions {
                let module_id = module_id_map
                    .get(&session.module_name)
                    .copied()
                    .expect("Session references unknown test module");

                let id = create_session(
                    &pool,
                    module_id,
                    &session.name,
                    "",
                    &session.video_url,
                    session.session_number,
                    session.session_date,
                )
                .await?;
                session_id_map.insert(session.name.clone(), id);
            }

            Ok(TestDb {
                pool,
                program_id_map,
                module_id_map,
                session_id_map,
            })
        }
    }

    pub struct TestDb {
        pub pool: Pool<Sqlite>,
        pub program_id_map: HashMap<String, i64>,
        pub module_id_map: HashMap<String, i64>,
        pub session_id_map: HashMap<String, i64>,
    }

    impl TestDb {
        pub fn program_id(&self, name: &str) -> Option<i64> {
            self.program_id_map.get(name).copied()
        }

        pub fn module_id(&self, name: &str) -> Option<i64> {
            self.module_id_map.get(name).copied()
        }

        pub fn session_id(&self, name: &str) -> Option<i64> {
            self.session_id_map.get(name).copied()
        }
    }
}
