//! Resource lifecycles driven through the provider server against a mocked
//! Management API

#![allow(clippy::disallowed_methods)]

mod common;

use common::{
    configured_server, destroy, map, object, plan_and_apply, proposed, API_KEY, MANAGEMENT_TOKEN,
};
use mockito::{Matcher, Server};
use tfplug::resource::{ImportResourceStateRequest, ReadResourceRequest};
use tfplug::server::PlanResourceChangeRequest;
use tfplug::types::{AttributePath, ClientCapabilities, Dynamic, DynamicValue};

const FR_FR: &str = r#"{"locale":{"uid":"blt-fr","code":"fr-fr","name":"fr-fr","fallback_locale":"en-us",
    "created_by":"blt-user","created_at":"2024-03-01T10:00:00.000Z",
    "updated_by":"blt-user","updated_at":"2024-03-01T10:00:00.000Z","_version":1}}"#;

fn locale_config(name: Option<&str>) -> DynamicValue {
    object(&[
        ("uid", Dynamic::Null),
        ("code", Dynamic::from("fr-fr")),
        ("name", Dynamic::from(name)),
        ("fallback_code", Dynamic::Null),
        ("created_by", Dynamic::Null),
        ("created_at", Dynamic::Null),
        ("version", Dynamic::Null),
        ("updated_by", Dynamic::Null),
        ("updated_at", Dynamic::Null),
    ])
}

fn read_request(type_name: &str, state: DynamicValue) -> ReadResourceRequest {
    ReadResourceRequest {
        type_name: type_name.to_string(),
        current_state: state,
        client_capabilities: ClientCapabilities::default(),
    }
}

#[tokio::test]
async fn locale_create_read_update_delete() {
    let mut server = Server::new_async().await;
    let provider = configured_server(&server.url()).await;

    let create = server
        .mock("POST", "/v3/locales")
        .match_header("api_key", API_KEY)
        .match_header("authorization", MANAGEMENT_TOKEN)
        .match_body(Matcher::Json(serde_json::json!({
            "locale": {"code": "fr-fr", "name": "fr-fr", "fallback_locale": "en-us"}
        })))
        .with_status(201)
        .with_body(FR_FR)
        .create_async()
        .await;

    let (planned, created) =
        plan_and_apply(&provider, "contentstack_locale", &DynamicValue::null(), &locale_config(None))
            .await;
    assert_eq!(
        planned.get_string(&AttributePath::new("name")).unwrap(),
        "fr-fr"
    );
    assert_eq!(
        planned.get_string(&AttributePath::new("fallback_code")).unwrap(),
        "en-us"
    );
    assert!(created.diagnostics.is_empty(), "{:?}", created.diagnostics);
    let state = created.new_state;
    assert_eq!(state.get_string(&AttributePath::new("uid")).unwrap(), "blt-fr");
    assert_eq!(state.get_i64(&AttributePath::new("version")).unwrap(), 1);
    create.assert_async().await;

    let get = server
        .mock("GET", "/v3/locales/fr-fr")
        .with_body(FR_FR)
        .create_async()
        .await;
    let read = provider
        .read_resource(read_request("contentstack_locale", state.clone()))
        .await;
    assert!(read.diagnostics.is_empty());
    assert_eq!(read.new_state.as_ref(), Some(&state));
    get.assert_async().await;

    let update = server
        .mock("PUT", "/v3/locales/fr-fr")
        .match_body(Matcher::PartialJson(serde_json::json!({
            "locale": {"name": "Français"}
        })))
        .with_body(
            r#"{"notice":"Language updated successfully.","locale":{"uid":"blt-fr","code":"fr-fr",
                "name":"Français","fallback_locale":"en-us","created_by":"blt-user",
                "created_at":"2024-03-01T10:00:00.000Z","updated_by":"blt-user",
                "updated_at":"2024-03-02T10:00:00.000Z","_version":2}}"#,
        )
        .create_async()
        .await;
    let (planned, updated) = plan_and_apply(
        &provider,
        "contentstack_locale",
        &state,
        &locale_config(Some("Français")),
    )
    .await;
    assert_eq!(planned.get_string(&AttributePath::new("uid")).unwrap(), "blt-fr");
    assert!(planned.get_dynamic(&AttributePath::new("version")).is_unknown());
    assert!(updated.diagnostics.is_empty(), "{:?}", updated.diagnostics);
    assert_eq!(
        updated.new_state.get_string(&AttributePath::new("name")).unwrap(),
        "Français"
    );
    assert_eq!(updated.new_state.get_i64(&AttributePath::new("version")).unwrap(), 2);
    update.assert_async().await;

    let delete = server
        .mock("DELETE", "/v3/locales/fr-fr")
        .with_body(r#"{"notice":"Language removed successfully."}"#)
        .create_async()
        .await;
    let destroyed = destroy(&provider, "contentstack_locale", &updated.new_state).await;
    assert!(destroyed.diagnostics.is_empty());
    assert!(destroyed.new_state.is_null());
    delete.assert_async().await;
}

#[tokio::test]
async fn locale_create_failure_reports_client_error() {
    let mut server = Server::new_async().await;
    let provider = configured_server(&server.url()).await;

    let _create = server
        .mock("POST", "/v3/locales")
        .with_status(422)
        .with_body(
            r#"{"error_message":"Language was not created. Please try again.","error_code":247,
                "errors":{"code":["is not valid."]}}"#,
        )
        .create_async()
        .await;

    let (_, created) =
        plan_and_apply(&provider, "contentstack_locale", &DynamicValue::null(), &locale_config(None))
            .await;

    assert_eq!(created.diagnostics.len(), 1);
    assert_eq!(created.diagnostics[0].summary, "Client Error");
    assert!(created.diagnostics[0]
        .detail
        .contains("Unable to create Locale \"fr-fr\""));
    assert!(created.diagnostics[0]
        .detail
        .contains("Language was not created"));
    assert!(created.new_state.is_null());
}

#[tokio::test]
async fn locale_removed_remotely_drops_from_state() {
    let mut server = Server::new_async().await;
    let provider = configured_server(&server.url()).await;

    let _get = server
        .mock("GET", "/v3/locales/fr-fr")
        .with_status(404)
        .with_body(r#"{"error_message":"Language was not found.","error_code":141}"#)
        .create_async()
        .await;

    let state = object(&[("uid", Dynamic::from("blt-fr")), ("code", Dynamic::from("fr-fr"))]);
    let read = provider
        .read_resource(read_request("contentstack_locale", state))
        .await;

    assert!(read.diagnostics.is_empty());
    assert!(read.new_state.is_none());
}

#[tokio::test]
async fn locale_import_then_read() {
    let mut server = Server::new_async().await;
    let provider = configured_server(&server.url()).await;

    let imported = provider
        .import_resource_state(ImportResourceStateRequest {
            type_name: "contentstack_locale".to_string(),
            id: "fr-fr".to_string(),
            client_capabilities: ClientCapabilities::default(),
        })
        .await;
    assert!(imported.diagnostics.is_empty());
    assert_eq!(imported.imported_resources.len(), 1);

    let _get = server
        .mock("GET", "/v3/locales/fr-fr")
        .with_body(FR_FR)
        .create_async()
        .await;
    let read = provider
        .read_resource(read_request(
            "contentstack_locale",
            imported.imported_resources[0].state.clone(),
        ))
        .await;

    let state = read.new_state.unwrap();
    assert_eq!(state.get_string(&AttributePath::new("uid")).unwrap(), "blt-fr");
    assert_eq!(
        state.get_string(&AttributePath::new("fallback_code")).unwrap(),
        "en-us"
    );
}

#[tokio::test]
async fn default_locale_is_adopted_renamed_and_forgotten() {
    let mut server = Server::new_async().await;
    let provider = configured_server(&server.url()).await;

    let get = server
        .mock("GET", "/v3/locales/en-us")
        .with_body(
            r#"{"locale":{"uid":"blt-en","code":"en-us","name":"English - United States",
                "fallback_locale":null,"_version":1}}"#,
        )
        .create_async()
        .await;
    let rename = server
        .mock("PUT", "/v3/locales/en-us")
        .match_body(Matcher::Json(serde_json::json!({
            "locale": {"code": "en-us", "name": "English"}
        })))
        .with_body(r#"{"locale":{"uid":"blt-en","code":"en-us","name":"English","_version":2}}"#)
        .create_async()
        .await;
    let delete = server
        .mock("DELETE", Matcher::Any)
        .expect(0)
        .create_async()
        .await;

    let config = object(&[
        ("uid", Dynamic::Null),
        ("code", Dynamic::Null),
        ("name", Dynamic::from("English")),
        ("fallback_code", Dynamic::Null),
        ("created_by", Dynamic::Null),
        ("created_at", Dynamic::Null),
        ("version", Dynamic::Null),
        ("updated_by", Dynamic::Null),
        ("updated_at", Dynamic::Null),
    ]);
    let (planned, created) = plan_and_apply(
        &provider,
        "contentstack_default_locale",
        &DynamicValue::null(),
        &config,
    )
    .await;
    assert!(planned
        .get_dynamic(&AttributePath::new("fallback_code"))
        .is_null());
    assert!(created.diagnostics.is_empty(), "{:?}", created.diagnostics);

    let state = created.new_state;
    assert_eq!(state.get_string(&AttributePath::new("code")).unwrap(), "en-us");
    assert_eq!(state.get_string(&AttributePath::new("name")).unwrap(), "English");
    assert_eq!(state.get_i64(&AttributePath::new("version")).unwrap(), 2);
    get.assert_async().await;
    rename.assert_async().await;

    let destroyed = destroy(&provider, "contentstack_default_locale", &state).await;
    assert!(destroyed.diagnostics.is_empty());
    assert!(destroyed.new_state.is_null());
    delete.assert_async().await;
}

fn environment_config(urls: Option<Dynamic>) -> DynamicValue {
    object(&[
        ("id", Dynamic::Null),
        ("uid", Dynamic::Null),
        ("name", Dynamic::from("production")),
        ("created_at", Dynamic::Null),
        ("updated_at", Dynamic::Null),
        ("version", Dynamic::Null),
        ("deploy_content", Dynamic::Null),
        ("urls", urls.unwrap_or(Dynamic::Null)),
    ])
}

#[tokio::test]
async fn environment_create_update_delete() {
    let mut server = Server::new_async().await;
    let provider = configured_server(&server.url()).await;

    let create = server
        .mock("POST", "/v3/environments")
        .match_body(Matcher::Json(serde_json::json!({
            "environment": {
                "name": "production",
                "urls": [{"locale": "en-us", "url": "https://example.com"}],
                "deploy_content": false
            }
        })))
        .with_status(201)
        .with_body(
            r#"{"notice":"Environment created successfully.","environment":{"uid":"blt-env",
                "name":"production","deploy_content":false,
                "urls":[{"locale":"en-us","url":"https://example.com"}],
                "created_at":"2024-03-01T10:00:00.000Z","updated_at":"2024-03-01T10:00:00.000Z","_version":1}}"#,
        )
        .create_async()
        .await;

    let config = environment_config(Some(map(&[("en-us", Dynamic::from("https://example.com"))])));
    let (_, created) =
        plan_and_apply(&provider, "contentstack_environment", &DynamicValue::null(), &config).await;
    assert!(created.diagnostics.is_empty(), "{:?}", created.diagnostics);

    let state = created.new_state;
    assert_eq!(state.get_string(&AttributePath::new("id")).unwrap(), "blt-env");
    assert_eq!(state.get_string(&AttributePath::new("uid")).unwrap(), "blt-env");
    assert!(state
        .get_dynamic(&AttributePath::new("deploy_content"))
        .is_null());
    assert_eq!(
        state
            .get_string(&AttributePath::new("urls").key("en-us"))
            .unwrap(),
        "https://example.com"
    );
    create.assert_async().await;

    let update = server
        .mock("PUT", "/v3/environments/production")
        .match_body(Matcher::PartialJson(serde_json::json!({
            "environment": {"urls": [
                {"locale": "en-us", "url": "https://example.com"},
                {"locale": "fr-fr", "url": "https://example.fr"}
            ]}
        })))
        .with_body(
            r#"{"environment":{"uid":"blt-env","name":"production","deploy_content":false,
                "urls":[{"locale":"en-us","url":"https://example.com"},{"locale":"fr-fr","url":"https://example.fr"}],
                "created_at":"2024-03-01T10:00:00.000Z","updated_at":"2024-03-02T10:00:00.000Z","_version":2}}"#,
        )
        .create_async()
        .await;

    let config = environment_config(Some(map(&[
        ("en-us", Dynamic::from("https://example.com")),
        ("fr-fr", Dynamic::from("https://example.fr")),
    ])));
    let (_, updated) = plan_and_apply(&provider, "contentstack_environment", &state, &config).await;
    assert!(updated.diagnostics.is_empty(), "{:?}", updated.diagnostics);
    assert_eq!(
        updated
            .new_state
            .get_map(&AttributePath::new("urls"))
            .unwrap()
            .len(),
        2
    );
    assert_eq!(
        updated.new_state.get_string(&AttributePath::new("created_at")).unwrap(),
        "2024-03-01T10:00:00.000Z"
    );
    update.assert_async().await;

    let delete = server
        .mock("DELETE", "/v3/environments/production")
        .with_body(r#"{"notice":"Environment deleted successfully."}"#)
        .create_async()
        .await;
    let destroyed = destroy(&provider, "contentstack_environment", &updated.new_state).await;
    assert!(destroyed.diagnostics.is_empty());
    delete.assert_async().await;
}

fn field_config(uid: &str, data_type: &str) -> Dynamic {
    map(&[
        ("uid", Dynamic::from(uid)),
        ("data_type", Dynamic::from(data_type)),
        ("description", Dynamic::Null),
        ("default_bool", Dynamic::Null),
        ("default_text", Dynamic::Null),
        ("display_name", Dynamic::Null),
        ("format", Dynamic::Null),
        ("placeholder", Dynamic::Null),
        ("instruction", Dynamic::Null),
        ("mandatory", Dynamic::Null),
        ("multiple", Dynamic::Null),
        ("unique", Dynamic::Null),
    ])
}

fn field_with(uid: &str, data_type: &str, values: &[(&str, Dynamic)]) -> Dynamic {
    let mut field = field_config(uid, data_type);
    if let Dynamic::Map(entries) = &mut field {
        for (name, value) in values {
            entries.insert(name.to_string(), value.clone());
        }
    }
    field
}

fn seo_config(title: Option<&str>, fields: Vec<Dynamic>) -> DynamicValue {
    object(&[
        ("uid", Dynamic::from("seo")),
        ("title", Dynamic::from(title)),
        ("description", Dynamic::Null),
        ("id", Dynamic::Null),
        ("fields", Dynamic::List(fields)),
    ])
}

const SEO_CREATED: &str = r#"{"global_field":{"uid":"seo","title":"seo","description":"",
    "schema":[
        {"uid":"meta_title","data_type":"text","display_name":"meta_title",
            "mandatory":false,"multiple":false,"field_metadata":{"description":""}},
        {"uid":"no_index","data_type":"boolean","display_name":"No index",
            "mandatory":false,"multiple":false,
            "field_metadata":{"description":"Hide from search","default_value":true}}
    ],
    "created_at":"2024-03-01T10:00:00.000Z","updated_at":"2024-03-01T10:00:00.000Z","_version":1}}"#;

fn seo_fields() -> Vec<Dynamic> {
    vec![
        field_config("meta_title", "text"),
        field_with(
            "no_index",
            "boolean",
            &[
                ("display_name", Dynamic::from("No index")),
                ("description", Dynamic::from("Hide from search")),
                ("default_bool", Dynamic::from(true)),
            ],
        ),
    ]
}

#[tokio::test]
async fn global_field_replan_after_apply_is_empty() {
    let mut server = Server::new_async().await;
    let provider = configured_server(&server.url()).await;

    let _create = server
        .mock("POST", "/v3/global_fields")
        .with_status(201)
        .with_body(SEO_CREATED)
        .create_async()
        .await;

    let config = seo_config(None, seo_fields());
    let (_, created) =
        plan_and_apply(&provider, "contentstack_global_field", &DynamicValue::null(), &config).await;
    assert!(created.diagnostics.is_empty(), "{:?}", created.diagnostics);

    let state = created.new_state;
    let meta_title = AttributePath::new("fields").index(0);
    assert_eq!(
        state.get_string(&meta_title.clone().attribute("description")).unwrap(),
        ""
    );
    assert_eq!(
        state.get_string(&meta_title.attribute("display_name")).unwrap(),
        "meta_title"
    );
    assert_eq!(state.get_string(&AttributePath::new("title")).unwrap(), "seo");

    let plan = provider
        .plan_resource_change(PlanResourceChangeRequest {
            type_name: "contentstack_global_field".to_string(),
            prior_state: state.clone(),
            proposed_new_state: proposed(&state, &config),
            config: config.clone(),
        })
        .await;

    assert!(plan.diagnostics.is_empty(), "{:?}", plan.diagnostics);
    assert!(plan.requires_replace.is_empty());
    assert_eq!(plan.planned_state, state);
}

#[tokio::test]
async fn global_field_update_then_destroy() {
    let mut server = Server::new_async().await;
    let provider = configured_server(&server.url()).await;

    let _create = server
        .mock("POST", "/v3/global_fields")
        .with_status(201)
        .with_body(SEO_CREATED)
        .create_async()
        .await;
    let (_, created) = plan_and_apply(
        &provider,
        "contentstack_global_field",
        &DynamicValue::null(),
        &seo_config(None, seo_fields()),
    )
    .await;
    assert!(created.diagnostics.is_empty(), "{:?}", created.diagnostics);

    let update = server
        .mock("PUT", "/v3/global_fields/seo")
        .match_body(Matcher::PartialJson(serde_json::json!({
            "global_field": {
                "uid": "seo",
                "title": "Search metadata",
                "schema": [
                    {"uid": "meta_title", "display_name": "meta_title",
                        "field_metadata": {"instruction": "Keep it short"}},
                    {"uid": "no_index", "field_metadata": {"default_value": true}}
                ]
            }
        })))
        .with_body(
            r#"{"notice":"Global Field updated successfully.","global_field":{"uid":"seo",
            "title":"Search metadata","description":"",
            "schema":[
                {"uid":"meta_title","data_type":"text","display_name":"meta_title",
                    "mandatory":false,"multiple":false,
                    "field_metadata":{"description":"","instruction":"Keep it short"}},
                {"uid":"no_index","data_type":"boolean","display_name":"No index",
                    "mandatory":false,"multiple":false,
                    "field_metadata":{"description":"Hide from search","default_value":true}}
            ],
            "created_at":"2024-03-01T10:00:00.000Z","updated_at":"2024-03-05T10:00:00.000Z","_version":2}}"#,
        )
        .create_async()
        .await;

    let mut fields = seo_fields();
    fields[0] = field_with(
        "meta_title",
        "text",
        &[("instruction", Dynamic::from("Keep it short"))],
    );
    let (_, updated) = plan_and_apply(
        &provider,
        "contentstack_global_field",
        &created.new_state,
        &seo_config(Some("Search metadata"), fields),
    )
    .await;
    assert!(updated.diagnostics.is_empty(), "{:?}", updated.diagnostics);
    update.assert_async().await;

    let state = updated.new_state;
    assert_eq!(state.get_string(&AttributePath::new("id")).unwrap(), "seo");
    assert_eq!(
        state.get_string(&AttributePath::new("title")).unwrap(),
        "Search metadata"
    );
    assert_eq!(
        state
            .get_string(&AttributePath::new("fields").index(0).attribute("instruction"))
            .unwrap(),
        "Keep it short"
    );
    assert!(state
        .get_bool(&AttributePath::new("fields").index(1).attribute("default_bool"))
        .unwrap());

    let delete = server
        .mock("DELETE", "/v3/global_fields/seo")
        .with_body(r#"{"notice":"Global Field deleted successfully."}"#)
        .create_async()
        .await;
    let destroyed = destroy(&provider, "contentstack_global_field", &state).await;
    assert!(destroyed.diagnostics.is_empty(), "{:?}", destroyed.diagnostics);
    assert!(destroyed.new_state.is_null());
    delete.assert_async().await;
}

#[tokio::test]
async fn global_field_create_and_import() {
    let mut server = Server::new_async().await;
    let provider = configured_server(&server.url()).await;

    let body = r#"{"global_field":{"uid":"seo","title":"seo","description":"",
        "schema":[{"uid":"meta_title","data_type":"text","display_name":"meta_title",
            "mandatory":false,"multiple":false,"field_metadata":{"description":""}}],
        "created_at":"2024-03-01T10:00:00.000Z","updated_at":"2024-03-01T10:00:00.000Z","_version":1}}"#;

    let create = server
        .mock("POST", "/v3/global_fields")
        .match_body(Matcher::Json(serde_json::json!({
            "global_field": {
                "uid": "seo",
                "title": "seo",
                "description": "",
                "schema": [{
                    "uid": "meta_title",
                    "data_type": "text",
                    "display_name": "meta_title",
                    "mandatory": false,
                    "multiple": false,
                    "unique": false,
                    "field_metadata": {"description": "", "placeholder": "", "instruction": ""}
                }]
            }
        })))
        .with_status(201)
        .with_body(body)
        .create_async()
        .await;

    let config = object(&[
        ("uid", Dynamic::from("seo")),
        ("title", Dynamic::Null),
        ("description", Dynamic::Null),
        ("id", Dynamic::Null),
        ("fields", Dynamic::List(vec![field_config("meta_title", "text")])),
    ]);
    let (_, created) =
        plan_and_apply(&provider, "contentstack_global_field", &DynamicValue::null(), &config).await;
    assert!(created.diagnostics.is_empty(), "{:?}", created.diagnostics);
    create.assert_async().await;

    let field = AttributePath::new("fields").index(0);
    let state = created.new_state;
    assert_eq!(state.get_string(&AttributePath::new("id")).unwrap(), "seo");
    assert_eq!(
        state.get_string(&field.clone().attribute("display_name")).unwrap(),
        "meta_title"
    );
    assert_eq!(
        state.get_string(&field.clone().attribute("placeholder")).unwrap(),
        ""
    );
    assert!(!state.get_bool(&field.clone().attribute("unique")).unwrap());
    assert!(state.get_dynamic(&field.attribute("default_text")).is_null());

    let get = server
        .mock("GET", "/v3/global_fields/seo")
        .with_body(body)
        .create_async()
        .await;
    let imported = provider
        .import_resource_state(ImportResourceStateRequest {
            type_name: "contentstack_global_field".to_string(),
            id: "seo".to_string(),
            client_capabilities: ClientCapabilities::default(),
        })
        .await;
    let read = provider
        .read_resource(read_request(
            "contentstack_global_field",
            imported.imported_resources[0].state.clone(),
        ))
        .await;
    assert!(read.diagnostics.is_empty());
    let read_state = read.new_state.unwrap();
    assert_eq!(read_state.get_string(&AttributePath::new("uid")).unwrap(), "seo");
    assert_eq!(read_state.get_list(&AttributePath::new("fields")).unwrap().len(), 1);
    get.assert_async().await;
}

#[tokio::test]
async fn global_field_rejects_conflicting_defaults_and_unknown_types() {
    let server = Server::new_async().await;
    let provider = configured_server(&server.url()).await;

    let mut field = field_config("published", "bool");
    if let Dynamic::Map(entries) = &mut field {
        entries.insert("default_bool".to_string(), Dynamic::from(true));
        entries.insert("default_text".to_string(), Dynamic::from("yes"));
    }
    let config = object(&[
        ("uid", Dynamic::from("flags")),
        ("title", Dynamic::Null),
        ("description", Dynamic::Null),
        ("id", Dynamic::Null),
        ("fields", Dynamic::List(vec![field])),
    ]);

    let diagnostics = provider
        .validate_resource_config(tfplug::resource::ValidateResourceConfigRequest {
            type_name: "contentstack_global_field".to_string(),
            config,
            client_capabilities: ClientCapabilities::default(),
        })
        .await;

    let summaries: Vec<&str> = diagnostics.iter().map(|d| d.summary.as_str()).collect();
    assert!(summaries.contains(&"Invalid Attribute Combination"));
    assert!(diagnostics.iter().any(|d| d.attribute
        == Some(AttributePath::new("fields").index(0).attribute("data_type"))));
}
