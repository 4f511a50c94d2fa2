#[cfg(test)]
mod tests {
    use crate::schemas::ApiDoc;
    use utoipa::OpenApi;
    use utoipa::openapi::{PathItemType, RefOr, schema::Schema};

    fn object_properties(name: &str) -> Vec<String> {
        let openapi = ApiDoc::openapi();
        let components = openapi.components.as_ref().unwrap();
        match components.schemas.get(name) {
            Some(RefOr::T(Schema::Object(obj))) => obj.properties.keys().cloned().collect(),
            _ => panic!("{} should be an object schema", name),
        }
    }

    #[test]
    fn test_openapi_schema_generation() {
        let openapi = ApiDoc::openapi();

        let components = openapi.components.as_ref().unwrap();
        assert!(components.schemas.contains_key("ErrorResponse"));
        assert!(components.schemas.contains_key("HealthResponse"));
        assert!(components.schemas.contains_key("UserResponse"));
        assert!(components.schemas.contains_key("CompanyResponse"));

        assert!(serde_json::to_string(&openapi).is_ok());
    }

    #[test]
    fn test_error_response_schema_structure() {
        let properties = object_properties("ErrorResponse");
        for key in ["error", "code", "success"] {
            assert!(properties.iter().any(|p| p == key), "missing {}", key);
        }
    }

    #[test]
    fn test_account_responses_do_not_expose_password() {
        for schema in ["UserResponse", "CompanyResponse"] {
            let properties = object_properties(schema);
            assert!(properties.iter().any(|p| p == "email"));
            assert!(!properties.iter().any(|p| p == "password"), "{} leaks password", schema);
        }
    }

    #[test]
    fn test_route_groups_are_documented() {
        let openapi = ApiDoc::openapi();
        let paths = &openapi.paths.paths;

        for path in [
            "/health",
            "/api/users",
            "/api/users/login",
            "/api/users/{user_id}",
            "/api/companies",
            "/api/companies/login",
            "/api/companies/{company_id}",
            "/api/companies/{company_id}/jobs",
            "/api/jobs",
            "/api/jobs/{job_id}",
            "/api/connections/requests",
            "/api/connections/requests/{request_id}",
            "/api/connections/{user_id}",
            "/api/connections/{user_id}/requests",
            "/api/applications",
            "/api/applications/{application_id}",
        ] {
            assert!(paths.contains_key(path), "missing path {}", path);
        }

        let jobs = paths.get("/api/jobs/{job_id}").unwrap();
        for method in [PathItemType::Get, PathItemType::Put, PathItemType::Delete] {
            assert!(jobs.operations.contains_key(&method));
        }
    }

    #[test]
    fn test_login_documents_unauthorized() {
        let openapi = ApiDoc::openapi();
        let login = openapi.paths.paths.get("/api/users/login").unwrap();
        let post = login.operations.get(&PathItemType::Post).unwrap();

        assert!(post.responses.responses.contains_key("200"));
        assert!(post.responses.responses.contains_key("401"));
    }

    #[test]
    fn test_all_error_responses_reference_correct_schema() {
        let openapi_json = serde_json::to_string(&ApiDoc::openapi()).unwrap();

        assert!(!openapi_json.contains("crate.schemas.ErrorResponse"));
        assert!(!openapi_json.contains("crate::schemas::ErrorResponse"));
        assert!(openapi_json.contains("#/components/schemas/ErrorResponse"));
    }
}
