mod common;

use std::sync::Arc;

use common::{args, minimal_args, Call, RecordingApi};
use n8n_mcp::tools::{AuditTools, TagTools, WorkflowTools};
use n8n_mcp::{ClientError, Domain, ToolError, ToolHandler};
use pretty_assertions::assert_eq;
use reqwest::Method;
use serde_json::json;

#[tokio::test]
async fn test_every_operation_routes_to_exactly_one_call() {
    let api = RecordingApi::new();
    let router = api.router();

    for operation in router.catalog() {
        let before = api.call_count();
        let result = router.route(operation.name, &minimal_args(operation)).await;
        assert!(result.is_ok(), "{} failed: {result:?}", operation.name);
        assert_eq!(api.call_count(), before + 1, "{}", operation.name);
    }
}

#[tokio::test]
async fn test_catalog_covers_every_domain() {
    let router = RecordingApi::new().router();
    let catalog = router.catalog();

    assert_eq!(catalog.len(), 36);
    let count = |domain: Domain| catalog.iter().filter(|op| op.domain == domain).count();
    assert_eq!(count(Domain::Workflow), 10);
    assert_eq!(count(Domain::Execution), 4);
    assert_eq!(count(Domain::Credential), 3);
    assert_eq!(count(Domain::User), 5);
    assert_eq!(count(Domain::Tag), 5);
    assert_eq!(count(Domain::Variable), 4);
    assert_eq!(count(Domain::Project), 4);
    assert_eq!(count(Domain::Audit), 1);
}

#[tokio::test]
async fn test_missing_required_fields_never_reach_the_network() {
    let api = RecordingApi::new();
    let router = api.router();

    for operation in router.catalog() {
        for field in operation.shape.fields().iter().filter(|f| f.required) {
            let mut bag = minimal_args(operation);
            bag.remove(field.name);

            let err = router.route(operation.name, &bag).await.unwrap_err();
            match err {
                ToolError::Validation(validation) => {
                    assert!(
                        validation.fields().any(|name| name == field.name),
                        "{}: {validation}",
                        operation.name
                    );
                }
                other => panic!("{}: expected validation error, got {other:?}", operation.name),
            }
        }
    }

    assert_eq!(api.call_count(), 0);
}

#[tokio::test]
async fn test_update_workflow_tags_sends_tag_references() {
    let api = RecordingApi::new();
    api.router()
        .route(
            "n8n_update_workflow_tags",
            &args(json!({"id": "wf1", "tagIds": ["a", "b"]})),
        )
        .await
        .unwrap();

    let request = api.only_request();
    assert_eq!(request.method, Method::PUT);
    assert_eq!(request.path, "/workflows/wf1/tags");
    assert_eq!(request.body, Some(json!([{"id": "a"}, {"id": "b"}])));
}

#[tokio::test]
async fn test_update_user_role_renames_field() {
    let api = RecordingApi::new();
    api.router()
        .route("n8n_update_user_role", &args(json!({"id": "u1", "role": "admin"})))
        .await
        .unwrap();

    let request = api.only_request();
    assert_eq!(request.method, Method::PATCH);
    assert_eq!(request.path, "/users/u1/role");
    let body = request.body.unwrap();
    assert_eq!(body, json!({"newRoleName": "admin"}));
    assert!(body.get("role").is_none());
}

#[tokio::test]
async fn test_generate_audit_without_categories_sends_no_body() {
    let api = RecordingApi::new();
    api.router()
        .route("n8n_generate_audit", &args(json!({})))
        .await
        .unwrap();

    let request = api.only_request();
    assert_eq!(request.method, Method::POST);
    assert_eq!(request.path, "/audit");
    assert_eq!(request.body, None);
}

#[tokio::test]
async fn test_generate_audit_with_categories() {
    let api = RecordingApi::new();
    api.router()
        .route("n8n_generate_audit", &args(json!({"categories": ["nodes"]})))
        .await
        .unwrap();

    assert_eq!(
        api.only_request().body,
        Some(json!({"additionalOptions": {"categories": ["nodes"]}}))
    );
}

#[tokio::test]
async fn test_delete_operations_synthesize_confirmation() {
    let deletes = [
        ("n8n_delete_workflow", "/workflows/d1"),
        ("n8n_delete_execution", "/executions/d1"),
        ("n8n_delete_credential", "/credentials/d1"),
        ("n8n_delete_user", "/users/d1"),
        ("n8n_delete_tag", "/tags/d1"),
        ("n8n_delete_variable", "/variables/d1"),
        ("n8n_delete_project", "/projects/d1"),
    ];

    for (name, path) in deletes {
        let api = RecordingApi::new();
        let result = api
            .router()
            .route(name, &args(json!({"id": "d1"})))
            .await
            .unwrap();

        assert_eq!(result["success"], json!(true), "{name}");
        let message = result["message"].as_str().unwrap();
        assert!(message.contains("d1"), "{name}: {message}");

        let request = api.only_request();
        assert_eq!(request.method, Method::DELETE, "{name}");
        assert_eq!(request.path, path, "{name}");
    }
}

#[tokio::test]
async fn test_update_workflow_keeps_id_out_of_body() {
    let api = RecordingApi::new();
    api.router()
        .route(
            "n8n_update_workflow",
            &args(json!({"id": "wf1", "name": "Renamed", "settings": {"timezone": "UTC"}})),
        )
        .await
        .unwrap();

    let request = api.only_request();
    assert_eq!(request.method, Method::PUT);
    assert_eq!(request.path, "/workflows/wf1");
    assert_eq!(
        request.body,
        Some(json!({"name": "Renamed", "settings": {"timezone": "UTC"}}))
    );
}

#[tokio::test]
async fn test_create_workflow_drops_unknown_fields() {
    let api = RecordingApi::new();
    api.router()
        .route(
            "n8n_create_workflow",
            &args(json!({"name": "Flow", "nodes": [], "pinned": true})),
        )
        .await
        .unwrap();

    assert_eq!(
        api.only_request().body,
        Some(json!({"name": "Flow", "nodes": []}))
    );
}

#[tokio::test]
async fn test_list_operations_without_filters_have_empty_query() {
    let lists = [
        "n8n_list_workflows",
        "n8n_list_executions",
        "n8n_list_credentials",
        "n8n_list_users",
        "n8n_list_tags",
        "n8n_list_variables",
        "n8n_list_projects",
    ];

    for name in lists {
        let api = RecordingApi::new();
        api.router().route(name, &args(json!({}))).await.unwrap();
        let request = api.only_request();
        assert_eq!(request.method, Method::GET, "{name}");
        assert!(request.query.is_empty(), "{name}: {:?}", request.query);
    }
}

#[tokio::test]
async fn test_list_filters_are_forwarded() {
    let api = RecordingApi::new();
    api.router()
        .route(
            "n8n_list_executions",
            &args(json!({"workflowId": "wf1", "status": "error", "limit": 5, "cursor": ""})),
        )
        .await
        .unwrap();

    let request = api.only_request();
    assert_eq!(request.path, "/executions");
    assert_eq!(
        request.query,
        vec![
            ("workflowId".to_string(), "wf1".to_string()),
            ("status".to_string(), "error".to_string()),
            ("limit".to_string(), "5".to_string()),
        ]
    );
}

#[tokio::test]
async fn test_get_execution_include_data() {
    let api = RecordingApi::new();
    api.router()
        .route("n8n_get_execution", &args(json!({"id": "e1", "includeData": true})))
        .await
        .unwrap();

    let request = api.only_request();
    assert_eq!(request.path, "/executions/e1");
    assert_eq!(
        request.query,
        vec![("includeData".to_string(), "true".to_string())]
    );
}

#[tokio::test]
async fn test_execute_workflow_uses_webhook() {
    let api = RecordingApi::new();
    api.respond_with(Ok(json!({"message": "Workflow was started"})));

    let result = api
        .router()
        .route(
            "n8n_execute_workflow",
            &args(json!({"id": "hook-1", "data": {"customer": 42}})),
        )
        .await
        .unwrap();

    assert_eq!(result, json!({"message": "Workflow was started"}));
    assert_eq!(
        api.calls(),
        vec![Call::Webhook {
            id: "hook-1".to_string(),
            payload: Some(json!({"customer": 42})),
        }]
    );
}

#[tokio::test]
async fn test_create_credential_renames_type() {
    let api = RecordingApi::new();
    api.router()
        .route(
            "n8n_create_credential",
            &args(json!({"name": "GitHub", "type": "githubApi", "data": {"accessToken": "t"}})),
        )
        .await
        .unwrap();

    let request = api.only_request();
    assert_eq!(request.path, "/credentials");
    assert_eq!(
        request.body,
        Some(json!({"name": "GitHub", "type": "githubApi", "data": {"accessToken": "t"}}))
    );
}

#[tokio::test]
async fn test_create_user_rejects_bad_email() {
    let api = RecordingApi::new();
    let err = api
        .router()
        .route("n8n_create_user", &args(json!({"email": "not-an-email"})))
        .await
        .unwrap_err();

    assert!(matches!(err, ToolError::Validation(_)));
    assert!(err.to_string().contains("email"));
    assert_eq!(api.call_count(), 0);
}

#[tokio::test]
async fn test_variable_update_body() {
    let api = RecordingApi::new();
    api.router()
        .route(
            "n8n_update_variable",
            &args(json!({"id": "v1", "key": "REGION", "value": "eu"})),
        )
        .await
        .unwrap();

    let request = api.only_request();
    assert_eq!(request.method, Method::PUT);
    assert_eq!(request.path, "/variables/v1");
    assert_eq!(request.body, Some(json!({"key": "REGION", "value": "eu"})));
}

#[tokio::test]
async fn test_path_ids_are_encoded() {
    let api = RecordingApi::new();
    api.router()
        .route("n8n_get_workflow", &args(json!({"id": "../users"})))
        .await
        .unwrap();

    assert_eq!(api.only_request().path, "/workflows/..%2Fusers");
}

#[tokio::test]
async fn test_remote_error_propagates_verbatim() {
    let api = RecordingApi::new();
    api.respond_with(Err(ClientError::Api {
        status: 404,
        status_text: "Not Found".to_string(),
        body: "not found".to_string(),
    }));

    let err = api
        .router()
        .route("n8n_get_tag", &args(json!({"id": "missing"})))
        .await
        .unwrap_err();

    let message = err.to_string();
    assert!(message.contains("404"));
    assert!(message.contains("not found"));
}

#[tokio::test]
async fn test_delete_failure_is_not_synthesized() {
    let api = RecordingApi::new();
    api.respond_with(Err(ClientError::Api {
        status: 404,
        status_text: "Not Found".to_string(),
        body: "not found".to_string(),
    }));

    let result = api
        .router()
        .route("n8n_delete_tag", &args(json!({"id": "missing"})))
        .await;

    assert!(matches!(result, Err(ToolError::Client(ClientError::Api { status: 404, .. }))));
}

#[tokio::test]
async fn test_unknown_tool_makes_no_call() {
    let api = RecordingApi::new();
    let err = api
        .router()
        .route("n8n_audit_user", &args(json!({})))
        .await
        .unwrap_err();

    assert!(matches!(err, ToolError::UnknownTool(_)));
    assert_eq!(api.call_count(), 0);
}

#[tokio::test]
async fn test_handler_rejects_names_it_does_not_own() {
    let api = RecordingApi::new();
    let workflows = WorkflowTools::new(Arc::new(api.clone())).unwrap();
    let tags = TagTools::new(Arc::new(api.clone())).unwrap();
    let audit = AuditTools::new(Arc::new(api.clone())).unwrap();

    let err = workflows.handle("n8n_list_tags", &args(json!({}))).await.unwrap_err();
    assert!(matches!(
        err,
        ToolError::UnknownOperation { domain: Domain::Workflow, ref name } if name == "n8n_list_tags"
    ));

    let err = tags.handle("n8n_list_workflows", &args(json!({}))).await.unwrap_err();
    assert!(matches!(
        err,
        ToolError::UnknownOperation { domain: Domain::Tag, ref name } if name == "n8n_list_workflows"
    ));
    assert_eq!(err.to_string(), "Unknown tag tool: n8n_list_workflows");

    // Exact match only: a near miss on its own name is still foreign.
    let err = audit.handle("n8n_generate_audit ", &args(json!({}))).await.unwrap_err();
    assert!(matches!(err, ToolError::UnknownOperation { domain: Domain::Audit, .. }));

    assert_eq!(api.call_count(), 0);
}

#[tokio::test]
async fn test_integral_float_limit_is_sent_as_integer() {
    let api = RecordingApi::new();
    api.router()
        .route("n8n_list_tags", &args(json!({"limit": 10.0})))
        .await
        .unwrap();

    assert_eq!(
        api.only_request().query,
        vec![("limit".to_string(), "10".to_string())]
    );
}

#[tokio::test]
async fn test_fractional_limit_is_forwarded_unchanged() {
    let api = RecordingApi::new();
    api.router()
        .route("n8n_list_variables", &args(json!({"limit": 2.5})))
        .await
        .unwrap();

    assert_eq!(
        api.only_request().query,
        vec![("limit".to_string(), "2.5".to_string())]
    );
}
