#[cfg(test)]
mod tests {
    use crate::init_rocket;
    use crate::test::utils::test_db::TestDbBuilder;
    use rocket::http::{ContentType, Status};
    use rocket::local::asynchronous::Client;
    use rocket::tokio;

    async fn client() -> (Client, crate::test::utils::test_db::TestDb) {
        let test_db = TestDbBuilder::new()
            .program("Data Engineering")
            .build()
            .await
            .expect("Failed to build test database");

        let client = Client::tracked(init_rocket(test_db.pool.clone()))
            .await
            .expect("Failed to build rocket instance");

        (client, test_db)
    }

    #[tokio::test]
    async fn test_me_without_session_is_unauthorized() {
        let (client, _db) = client().await;

        let response = client.get("/api/me").dispatch().await;
        assert_eq!(
            response.status(),
            Status::Unauthorized,
            "An anonymous request must fall through to the unauthorized response"
        );

        let body = response.into_string().await.unwrap_or_default();
        assert!(
            body.contains("Authentication required"),
            "Fallback response carries the JSON error payload: {}",
            body
        );
    }

    #[tokio::test]
    async fn test_guarded_route_without_session_is_unauthorized_not_missing() {
        let (client, _db) = client().await;

        let response = client.delete("/api/programs/1").dispatch().await;
        assert_eq!(
            response.status(),
            Status::Unauthorized,
            "A guarded route with no session must report 401, never 404"
        );
    }

    #[tokio::test]
    async fn test_login_then_me_round_trip() {
        let (client, _db) = client().await;

        crate::database::seed_default_admin(client.rocket().state().expect("pool in state"))
            .await
            .expect("Failed to seed admin");

        let response = client
            .post("/api/login")
            .header(ContentType::JSON)
            .body(r#"{"username": "admin", "password": "admin123"}"#)
            .dispatch()
            .await;
        assert_eq!(response.status(), Status::Ok);

        // The tracked client carries the session cookie forward.
        let response = client.get("/api/me").dispatch().await;
        assert_eq!(response.status(), Status::Ok);

        let body = response.into_string().await.unwrap_or_default();
        assert!(body.contains("admin"), "Profile names the account: {}", body);
    }

    #[tokio::test]
    async fn test_public_routes_need_no_session() {
        let (client, _db) = client().await;

        let response = client.get("/api/programs").dispatch().await;
        assert_eq!(response.status(), Status::Ok);

        let body = response.into_string().await.unwrap_or_default();
        assert!(body.contains("Data Engineering"));

        let response = client.get("/api/health").dispatch().await;
        assert_eq!(response.status(), Status::Ok);
    }
}
