#[cfg(test)]
mod tests {
    use crate::{
        db::{
            create_program, deactivate_program, delete_module, get_module, get_program,
            get_session, list_modules, list_programs, list_sessions, update_program,
            verify_program_password,
        },
        error::AppError,
        test::utils::test_db::{TestDbBuilder, STANDARD_PASSWORD},
    };
    use rocket::tokio;

    #[tokio::test]
    async fn test_duplicate_program_name_rejected() {
        let test_db = TestDbBuilder::new()
            .program("Data Engineering")
            .build()
            .await
            .expect("Failed to build test database");

        let result = create_program(&test_db.pool, "Data Engineering", "", "whatever").await;

        match result {
            Err(AppError::DuplicateName(msg)) => {
                assert!(msg.contains("Data Engineering"));
            }
            other => panic!("Expected DuplicateName error, got {:?}", other.map(|_| ())),
        }
    }

    #[tokio::test]
    async fn test_soft_deleted_program_name_still_reserved() {
        let test_db = TestDbBuilder::new()
            .program("Data Engineering")
            .build()
            .await
            .expect("Failed to build test database");

        let program_id = test_db.program_id("Data Engineering").unwrap();
        deactivate_program(&test_db.pool, program_id)
            .await
            .expect("Failed to deactivate program");

        let result = create_program(&test_db.pool, "Data Engineering", "", "whatever").await;

        assert!(
            matches!(result, Err(AppError::DuplicateName(_))),
            "A soft-deleted program's name must not be reusable"
        );
    }

    #[tokio::test]
    async fn test_soft_delete_hides_program_but_keeps_children() {
        let test_db = TestDbBuilder::new()
            .program("Data Engineering")
            .program("Machine Learning")
            .module("Data Engineering", "Pipelines", 1)
            .session("Pipelines", "Intro", Some(1), Some("2025-01-10"))
            .build()
            .await
            .expect("Failed to build test database");

        let program_id = test_db.program_id("Data Engineering").unwrap();
        let module_id = test_db.module_id("Pipelines").unwrap();
        let session_id = test_db.session_id("Intro").unwrap();

        deactivate_program(&test_db.pool, program_id)
            .await
            .expect("Failed to deactivate program");

        let listed = list_programs(&test_db.pool).await.expect("Failed to list");
        assert_eq!(listed.len(), 1);
        assert_eq!(listed[0].name, "Machine Learning");

        // The soft-deleted program and its tree stay reachable by id.
        let program = get_program(&test_db.pool, program_id)
            .await
            .expect("Soft-deleted program should still be retrievable by id");
        assert!(!program.active);

        get_module(&test_db.pool, module_id)
            .await
            .expect("Module of soft-deleted program should still exist");
        get_session(&test_db.pool, session_id)
            .await
            .expect("Session of soft-deleted program should still exist");
    }

    #[tokio::test]
    async fn test_delete_module_cascades_to_sessions() {
        let test_db = TestDbBuilder::new()
            .program("Data Engineering")
            .module("Data Engineering", "Pipelines", 1)
            .session("Pipelines", "Intro", Some(1), Some("2025-01-10"))
            .session("Pipelines", "Batching", Some(2), Some("2025-01-17"))
            .build()
            .await
            .expect("Failed to build test database");

        let module_id = test_db.module_id("Pipelines").unwrap();
        let session_id = test_db.session_id("Intro").unwrap();

        delete_module(&test_db.pool, module_id)
            .await
            .expect("Failed to delete module");

        let sessions = list_sessions(&test_db.pool, module_id)
            .await
            .expect("Listing sessions of a deleted module should not error");
        assert!(sessions.is_empty(), "Cascade should remove all sessions");

        let result = get_session(&test_db.pool, session_id).await;
        assert!(
            matches!(result, Err(AppError::NotFound(_))),
            "Cascaded session should be gone by direct lookup too"
        );
    }

    #[tokio::test]
    async fn test_program_listing_is_name_ascending() {
        let test_db = TestDbBuilder::new()
            .program("Zebra Studies")
            .program("Aquaculture")
            .program("Machine Learning")
            .build()
            .await
            .expect("Failed to build test database");

        let programs = list_programs(&test_db.pool).await.expect("Failed to list");
        let names: Vec<&str> = programs.iter().map(|p| p.name.as_str()).collect();

        assert_eq!(names, vec!["Aquaculture", "Machine Learning", "Zebra Studies"]);
    }

    #[tokio::test]
    async fn test_module_listing_order() {
        let test_db = TestDbBuilder::new()
            .program("Data Engineering")
            .module("Data Engineering", "Warehousing", 2)
            .module("Data Engineering", "Streaming", 1)
            .module("Data Engineering", "Pipelines", 1)
            .build()
            .await
            .expect("Failed to build test database");

        let program_id = test_db.program_id("Data Engineering").unwrap();
        let modules = list_modules(&test_db.pool, program_id)
            .await
            .expect("Failed to list modules");

        let names: Vec<&str> = modules.iter().map(|m| m.name.as_str()).collect();

        // display_order ascending, name ascending within the same order.
        assert_eq!(names, vec!["Pipelines", "Streaming", "Warehousing"]);
    }

    #[tokio::test]
    async fn test_update_program_without_password_keeps_old_one() {
        let test_db = TestDbBuilder::new()
            .program("Data Engineering")
            .build()
            .await
            .expect("Failed to build test database");

        let program_id = test_db.program_id("Data Engineering").unwrap();

        update_program(&test_db.pool, program_id, "Data Engineering 2.0", "New blurb", None)
            .await
            .expect("Failed to update program");

        assert!(
            verify_program_password(&test_db.pool, program_id, STANDARD_PASSWORD)
                .await
                .expect("Verification should not error"),
            "Old password must still authenticate after a password-less update"
        );

        // Empty string also means "keep".
        update_program(&test_db.pool, program_id, "Data Engineering 2.0", "", Some(""))
            .await
            .expect("Failed to update program");

        assert!(
            verify_program_password(&test_db.pool, program_id, STANDARD_PASSWORD)
                .await
                .expect("Verification should not error")
        );
    }

    #[tokio::test]
    async fn test_update_program_with_new_password_replaces_it() {
        let test_db = TestDbBuilder::new()
            .program("Data Engineering")
            .build()
            .await
            .expect("Failed to build test database");

        let program_id = test_db.program_id("Data Engineering").unwrap();

        update_program(
            &test_db.pool,
            program_id,
            "Data Engineering",
            "",
            Some("fresh-secret"),
        )
        .await
        .expect("Failed to update program");

        assert!(
            verify_program_password(&test_db.pool, program_id, "fresh-secret")
                .await
                .unwrap()
        );
        assert!(
            !verify_program_password(&test_db.pool, program_id, STANDARD_PASSWORD)
                .await
                .unwrap(),
            "Old password must stop working once replaced"
        );
    }

    #[tokio::test]
    async fn test_update_program_rename_collision_rejected() {
        let test_db = TestDbBuilder::new()
            .program("Data Engineering")
            .program("Machine Learning")
            .build()
            .await
            .expect("Failed to build test database");

        let program_id = test_db.program_id("Machine Learning").unwrap();

        let result =
            update_program(&test_db.pool, program_id, "Data Engineering", "", None).await;

        assert!(matches!(result, Err(AppError::DuplicateName(_))));
    }
}
