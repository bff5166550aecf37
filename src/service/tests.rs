//! Tests for routing, binding and dispatch.

#[cfg(test)]
mod pattern_tests {
    use crate::service::{PathPattern, RegistrationError};

    #[test]
    fn test_literal_path_compiles_to_nothing() {
        assert!(PathPattern::compile("/users/list").unwrap().is_none());
    }

    #[test]
    fn test_captures_in_placeholder_order() {
        let pattern = PathPattern::compile("/a/{x}/b/{y}").unwrap().unwrap();
        assert_eq!(pattern.names(), ["x", "y"]);
        assert_eq!(
            pattern.captures("/a/1/b/2").unwrap(),
            vec![("x".to_string(), "1".to_string()), ("y".to_string(), "2".to_string())]
        );
        assert!(pattern.captures("/a/1/c/2").is_none());
    }

    #[test]
    fn test_pattern_is_anchored() {
        let pattern = PathPattern::compile("/greet/{name}").unwrap().unwrap();
        assert!(pattern.captures("/api/greet/Ann").is_none());
        assert_eq!(pattern.captures("/greet/Ann").unwrap()[0].1, "Ann");
    }

    #[test]
    fn test_literal_characters_are_escaped() {
        let pattern = PathPattern::compile("/files/{name}.json").unwrap().unwrap();
        assert_eq!(pattern.captures("/files/report.json").unwrap()[0].1, "report");
        assert!(pattern.captures("/files/reportXjson").is_none());

        let pattern = PathPattern::compile("/calc/{a}+{b}").unwrap().unwrap();
        let captures = pattern.captures("/calc/1+2").unwrap();
        assert_eq!(captures[0].1, "1");
        assert_eq!(captures[1].1, "2");
    }

    #[test]
    fn test_invalid_templates_are_rejected() {
        for template in ["/a/{", "/a/}", "/a/{}", "/a/{1x}", "/a/{x-y}", "/a/{x}/{x}"] {
            assert!(
                matches!(PathPattern::compile(template), Err(RegistrationError::InvalidTemplate { .. })),
                "{template} should be rejected"
            );
        }
    }
}

#[cfg(test)]
mod registry_tests {
    use serde::{Deserialize, Serialize};
    use serde_json::Value;

    use crate::http::Method;
    use crate::service::{
        Args, Body, Caller, DeclaredType, Headers, Inject, Logger, ParameterSlot, Registry, RegistrationError,
    };

    #[derive(Debug, Default, Serialize, Deserialize)]
    struct Input {
        id: u32,
    }

    #[derive(Debug, Default)]
    struct Database;

    fn marker(route: &str) -> String {
        route.to_string()
    }

    #[test]
    fn test_literal_route_resolves_without_captures() {
        let mut registry = Registry::new();
        registry.register(0, 0, "GET", "/users/me", || async { marker("literal") }).unwrap();
        registry.register(0, 9, "GET", "/users/{id}", || async { marker("pattern") }).unwrap();

        let resolved = registry.resolve(Method::GET, "/users/me").unwrap();
        assert!(!resolved.route.is_pattern());
        assert!(resolved.captures.is_empty());

        let resolved = registry.resolve(Method::GET, "/users/42").unwrap();
        assert!(resolved.route.is_pattern());
        assert_eq!(resolved.captures, vec![("id".to_string(), "42".to_string())]);
    }

    #[test]
    fn test_higher_priority_pattern_wins() {
        let mut registry = Registry::new();
        registry.register(0, 1, "", "/items/{a}", || async {}).unwrap();
        registry.register(0, 5, "", "/items/{b}", || async {}).unwrap();

        let resolved = registry.resolve(Method::GET, "/items/x").unwrap();
        assert_eq!(resolved.route.info().priority, 5);
        assert_eq!(resolved.route.path_arg_names(), ["b"]);
    }

    #[test]
    fn test_equal_priority_resolves_to_earliest() {
        let mut registry = Registry::new();
        registry.register(1, 3, "", "/items/{first}", || async {}).unwrap();
        registry.register(2, 3, "", "/items/{second}", || async {}).unwrap();
        registry.register(3, 0, "", "/items/{low}", || async {}).unwrap();

        let resolved = registry.resolve(Method::GET, "/items/x").unwrap();
        assert_eq!(resolved.route.info().auth_level, 1);
        assert_eq!(resolved.captures[0].0, "first");
    }

    #[test]
    fn test_empty_method_matches_any_method() {
        let mut registry = Registry::new();
        registry.register(0, 0, "", "/ping", || async {}).unwrap();
        registry.register(0, 0, "", "/echo/{v}", || async {}).unwrap();

        for method in [Method::GET, Method::POST, Method::DELETE] {
            assert!(registry.resolve(method, "/ping").is_some());
            assert!(registry.resolve(method, "/echo/1").is_some());
        }
    }

    #[test]
    fn test_method_specific_routes() {
        let mut registry = Registry::new();
        registry.register(0, 0, "post", "/orders", || async {}).unwrap();
        registry.register(7, 0, "", "/orders", || async {}).unwrap();
        registry.register(0, 0, "PUT", "/orders/{id}", || async {}).unwrap();

        assert_eq!(registry.resolve(Method::POST, "/orders").unwrap().route.info().auth_level, 0);
        assert_eq!(registry.resolve(Method::GET, "/orders").unwrap().route.info().auth_level, 7);
        assert!(registry.resolve(Method::PUT, "/orders/1").is_some());
        assert!(registry.resolve(Method::GET, "/orders/1").is_none());
    }

    #[test]
    fn test_last_literal_registration_wins() {
        let mut registry = Registry::new();
        registry.register(1, 0, "GET", "/dup", || async {}).unwrap();
        registry.register(2, 0, "GET", "/dup", || async {}).unwrap();

        assert_eq!(registry.len(), 1);
        assert_eq!(registry.resolve(Method::GET, "/dup").unwrap().route.info().auth_level, 2);
    }

    #[test]
    fn test_unknown_path_is_not_resolved() {
        let mut registry = Registry::new();
        registry.register(0, 0, "GET", "/a/{x}", || async {}).unwrap();
        assert!(registry.resolve(Method::GET, "/b/1").is_none());
        assert!(!registry.is_empty());
    }

    #[test]
    fn test_plan_follows_declared_order() {
        let mut registry = Registry::new();
        registry
            .register(
                0,
                0,
                "POST",
                "/full",
                |_log: Logger, _db: Inject<Database>, _in: Body<Input>, _h: Headers, _c: Caller| async {},
            )
            .unwrap();

        let route = registry.resolve(Method::POST, "/full").unwrap().route;
        assert_eq!(
            route.plan(),
            [
                ParameterSlot::Logger,
                ParameterSlot::Unbound(DeclaredType::of::<Database>()),
                ParameterSlot::Body(DeclaredType::of::<Input>()),
                ParameterSlot::Headers,
                ParameterSlot::CallerContext,
            ]
        );
    }

    #[test]
    fn test_second_body_parameter_is_rejected() {
        let mut registry = Registry::new();
        let result = registry.register(0, 0, "POST", "/twice", |_a: Body<Input>, _l: Logger, _b: Args| async {});
        assert!(matches!(result, Err(RegistrationError::DuplicateBody { first: 0, second: 2 })));
        assert!(registry.is_empty());
    }

    #[test]
    fn test_bad_registrations_are_not_stored() {
        let mut registry = Registry::new();
        assert!(matches!(
            registry.register(0, 0, "FETCH", "/x", || async {}),
            Err(RegistrationError::InvalidMethod(ref m)) if m == "FETCH"
        ));
        assert!(matches!(
            registry.register(0, 0, "GET", "/x/{", || async {}),
            Err(RegistrationError::InvalidTemplate { .. })
        ));
        assert!(registry.is_empty());
    }

    #[test]
    fn test_map_parameter_is_a_body_slot() {
        let mut registry = Registry::new();
        registry.register(0, 0, "", "/raw", |_args: Args| async {}).unwrap();
        let route = registry.resolve(Method::GET, "/raw").unwrap().route;
        assert_eq!(
            route.plan(),
            [ParameterSlot::Body(DeclaredType::of::<serde_json::Map<String, Value>>())]
        );
    }
}

#[cfg(test)]
mod dispatch_tests {
    use std::collections::HashMap;
    use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
    use std::sync::Arc;
    use std::time::Duration;

    use serde::{Deserialize, Serialize};
    use serde_json::{json, Value};

    use crate::codec::{Output, Shape};
    use crate::http::{HttpRequest, Method, ResponseWriter, StatusCode};
    use crate::service::{
        Args, Body, Caller, Error, Headers, Inject, Logger, RequestContext, ServiceBuilder, ServiceConfig, WebService,
    };

    fn init_logger() {
        let _ = env_logger::builder().is_test(true).try_init();
    }

    fn get(path: &str) -> HttpRequest {
        HttpRequest::new(Method::GET, path, HashMap::new())
    }

    fn post_json(path: &str, body: Value) -> HttpRequest {
        HttpRequest::with_body(Method::POST, path, HashMap::new(), body.to_string().into_bytes())
            .with_header("Content-Type", "application/json")
    }

    #[derive(Debug, Default, Serialize, Deserialize)]
    struct Greet {
        name: String,
    }

    #[derive(Debug, Default, Serialize, Deserialize)]
    struct NewUser {
        name: String,
        age: u32,
    }

    #[derive(Debug, Default)]
    struct Counter {
        start: usize,
    }

    #[derive(Debug, Default, PartialEq)]
    struct Tenant {
        name: String,
    }

    #[tokio::test]
    async fn test_greet_scenario() {
        init_logger();
        let mut builder = WebService::builder();
        builder
            .restful(0, "GET", "/greet/{name}", |Body(greet): Body<Greet>| async move {
                format!("hello {}", greet.name)
            })
            .unwrap();
        let service = builder.build();

        let response = service.handle(get("/greet/Ann")).await;
        assert_eq!(response.status, StatusCode::Ok);
        assert_eq!(response.body_text(), "hello Ann");
    }

    #[tokio::test]
    async fn test_nil_sequence_encodes_as_empty_array() {
        let mut builder = WebService::builder();
        builder
            .register(0, "/list", || async { None::<Vec<String>> })
            .unwrap();
        let service = builder.build();

        let response = service.handle(get("/list")).await;
        assert_eq!(response.body, b"[]");
        assert_eq!(response.headers.get("Content-Type").unwrap(), "application/json");
    }

    #[tokio::test]
    async fn test_not_found() {
        let service = WebService::builder().build();
        let mut ctx = service.context(get("/missing"));
        let result = service.dispatch(&mut ctx).await;
        assert!(matches!(result, Err(Error::NotFound { ref path, .. }) if path == "/missing"));

        let response = service.handle(get("/missing")).await;
        assert_eq!(response.status, StatusCode::NotFound);
    }

    #[tokio::test]
    async fn test_body_merges_query_body_and_path() {
        let mut builder = WebService::builder();
        builder
            .restful(0, "POST", "/users/{name}", |Body(user): Body<NewUser>| async move {
                format!("{}:{}", user.name, user.age)
            })
            .unwrap();
        let service = builder.build();

        let request = post_json("/users/path-name?age=5", json!({ "name": "body-name", "age": "31", "extra": 1 }));
        let response = service.handle(request).await;
        assert_eq!(response.body_text(), "path-name:31");
    }

    #[tokio::test]
    async fn test_undecodable_body_falls_back_to_default() {
        let mut builder = WebService::builder();
        builder
            .restful(0, "POST", "/users", |Body(user): Body<NewUser>| async move {
                format!("{}:{}", user.name, user.age)
            })
            .unwrap();
        let service = builder.build();

        let response = service.handle(post_json("/users", json!({ "name": "x", "age": "old" }))).await;
        assert_eq!(response.status, StatusCode::Ok);
        assert_eq!(response.body_text(), ":0");
    }

    #[tokio::test]
    async fn test_raw_args_are_bound_directly() {
        let mut builder = WebService::builder();
        builder
            .register(0, "/echo/{id}", |Args(args): Args| async move { Value::Object(args) })
            .unwrap();
        let service = builder.build();

        let response = service.handle(get("/echo/9?q=z")).await;
        let body: Value = serde_json::from_slice(&response.body).unwrap();
        assert_eq!(body, json!({ "id": "9", "q": "z" }));
    }

    #[tokio::test]
    async fn test_well_known_parameters_in_any_order() {
        let mut builder = WebService::builder();
        builder
            .register(
                0,
                "/inspect",
                |writer: ResponseWriter, headers: Headers, logger: Logger, request: Arc<HttpRequest>| async move {
                    logger.info("inspecting");
                    writer.set_status(StatusCode::Accepted);
                    writer.set_header("X-Seen", request.route_path().to_string());
                    headers.get("x-token").unwrap_or("none").to_string()
                },
            )
            .unwrap();
        let service = builder.build();

        let response = service.handle(get("/inspect").with_header("X-Token", "t1")).await;
        assert_eq!(response.status, StatusCode::Accepted);
        assert_eq!(response.headers.get("X-Seen").unwrap(), "/inspect");
        assert_eq!(response.body_text(), "t1");
    }

    #[tokio::test]
    async fn test_unregistered_injection_gets_default() {
        let mut builder = WebService::builder();
        builder
            .register(0, "/count", |counter: Inject<Counter>| async move { counter.start })
            .unwrap();
        let service = builder.build();

        let response = service.handle(get("/count")).await;
        assert_eq!(response.body, b"0");
    }

    #[tokio::test]
    async fn test_singleton_injection() {
        let mut builder = WebService::builder();
        builder.set_inject(Counter { start: 41 });
        builder
            .register(0, "/count", |counter: Inject<Counter>| async move { counter.start + 1 })
            .unwrap();
        let service = builder.build();

        assert_eq!(service.get_inject::<Counter>().unwrap().start, 41);
        let response = service.handle(get("/count")).await;
        assert_eq!(response.body, b"42");
    }

    #[tokio::test]
    async fn test_session_object_wins_over_singleton() {
        let mut builder = WebService::builder();
        builder.set_inject(Tenant { name: "global".into() });
        builder.set_in_filter(|ctx: &mut RequestContext| {
            if let Some(tenant) = ctx.request().get_header("X-Tenant").cloned() {
                ctx.set_session_inject(Tenant { name: tenant });
            }
            None
        });
        builder
            .register(0, "/tenant", |tenant: Inject<Tenant>| async move { tenant.name.clone() })
            .unwrap();
        let service = builder.build();

        let scoped = service.handle(get("/tenant").with_header("X-Tenant", "acme")).await;
        assert_eq!(scoped.body_text(), "acme");

        let global = service.handle(get("/tenant")).await;
        assert_eq!(global.body_text(), "global");
    }

    #[tokio::test]
    async fn test_session_objects_belong_to_their_context() {
        let service = WebService::builder().build();
        let mut first = service.context(get("/"));
        first.set_session_inject(Tenant { name: "one".into() });
        let second = service.context(get("/"));

        assert_eq!(first.get_session_inject::<Tenant>().unwrap().name, "one");
        assert!(second.get_session_inject::<Tenant>().is_none());
    }

    #[tokio::test]
    async fn test_in_filter_short_circuits_handler() {
        let called = Arc::new(AtomicBool::new(false));
        let second_filter = Arc::new(AtomicBool::new(false));

        let mut builder = WebService::builder();
        builder.set_in_filter(|_ctx: &mut RequestContext| Some(Output::text("blocked")));
        let flag = second_filter.clone();
        builder.set_in_filter(move |_ctx: &mut RequestContext| {
            flag.store(true, Ordering::SeqCst);
            None
        });
        let flag = called.clone();
        builder
            .register(0, "/guarded", move || {
                let flag = flag.clone();
                async move {
                    flag.store(true, Ordering::SeqCst);
                    "handled"
                }
            })
            .unwrap();
        let service = builder.build();

        let response = service.handle(get("/guarded")).await;
        assert_eq!(response.body_text(), "blocked");
        assert!(!called.load(Ordering::SeqCst));
        assert!(!second_filter.load(Ordering::SeqCst));
    }

    #[tokio::test]
    async fn test_in_filter_can_rewrite_args() {
        let mut builder = WebService::builder();
        builder.set_in_filter(|ctx: &mut RequestContext| {
            ctx.args.insert("name".into(), json!("filtered"));
            None
        });
        builder
            .register(0, "/greet/{name}", |Body(greet): Body<Greet>| async move { greet.name })
            .unwrap();
        let service = builder.build();

        let response = service.handle(get("/greet/raw")).await;
        assert_eq!(response.body_text(), "filtered");
    }

    #[tokio::test]
    async fn test_out_filter_final_stops_chain() {
        let mut builder = WebService::builder();
        builder.set_out_filter(|_ctx: &mut RequestContext, output: Output| {
            let text = output.value().and_then(Value::as_str).unwrap_or_default().to_uppercase();
            (Output::text(text), false)
        });
        builder.set_out_filter(|_ctx: &mut RequestContext, output: Output| {
            let text = output.value().and_then(Value::as_str).unwrap_or_default().to_string();
            (Output::text(format!("[{text}]")), true)
        });
        builder.set_out_filter(|_ctx: &mut RequestContext, _output: Output| (Output::text("overwritten"), true));
        builder.register(0, "/shout", || async { "hey" }).unwrap();
        let service = builder.build();

        let response = service.handle(get("/shout")).await;
        assert_eq!(response.body_text(), "[HEY]");
    }

    #[tokio::test]
    async fn test_out_filters_see_in_filter_results() {
        let mut builder = WebService::builder();
        builder.set_in_filter(|_ctx: &mut RequestContext| Some(Output::new(json!([1]))));
        builder.set_out_filter(|_ctx: &mut RequestContext, output: Output| {
            assert_eq!(output.shape(), Shape::Sequence);
            (Output::new(json!([1, 2])), true)
        });
        builder.register(0, "/n", || async { 0 }).unwrap();
        let service = builder.build();

        let response = service.handle(get("/n")).await;
        assert_eq!(response.body, b"[1,2]");
    }

    #[tokio::test]
    async fn test_authorization_hook() {
        let seen_level = Arc::new(AtomicUsize::new(0));
        let level = seen_level.clone();

        let mut builder = WebService::builder();
        builder.set_auth_checker(move |auth_level, path, _args, request| {
            level.store(auth_level as usize, Ordering::SeqCst);
            assert!(path.starts_with("/admin"));
            auth_level == 0 || request.has_header("Authorization")
        });
        builder.register(2, "/admin/{page}", || async { "secret" }).unwrap();
        let service = builder.build();

        let mut ctx = service.context(get("/admin/panel"));
        let denied = service.dispatch(&mut ctx).await;
        assert!(matches!(denied, Err(Error::AuthorizationDenied { auth_level: 2, .. })));
        assert_eq!(seen_level.load(Ordering::SeqCst), 2);

        let response = service.handle(get("/admin/panel")).await;
        assert_eq!(response.status, StatusCode::Forbidden);

        let allowed = service.handle(get("/admin/panel").with_header("Authorization", "Bearer x")).await;
        assert_eq!(allowed.status, StatusCode::Ok);
        assert_eq!(allowed.body_text(), "secret");
    }

    #[tokio::test]
    async fn test_handler_failure_without_error_hook() {
        let mut builder = WebService::builder();
        builder
            .register(0, "/fail", || async { Err::<String, _>("database unavailable") })
            .unwrap();
        let service = builder.build();

        let mut ctx = service.context(get("/fail"));
        let result = service.dispatch(&mut ctx).await;
        assert!(matches!(result, Err(Error::Handler(ref e)) if e.to_string() == "database unavailable"));

        let response = service.handle(get("/fail")).await;
        assert_eq!(response.status, StatusCode::InternalServerError);
        assert!(response.body_text().contains("database unavailable"));
    }

    #[tokio::test]
    async fn test_handler_failure_goes_to_error_hook() {
        let mut builder = WebService::builder();
        builder.set_error_handle(|error: &Error, request: &HttpRequest, response: &ResponseWriter| {
            response.set_status(StatusCode::BadGateway);
            Output::new(json!({ "error": error.to_string(), "path": request.route_path() }))
        });
        builder
            .register(0, "/fail", || async { Err::<String, _>("upstream") })
            .unwrap();
        let service = builder.build();

        let response = service.handle(get("/fail")).await;
        assert_eq!(response.status, StatusCode::BadGateway);
        let body: Value = serde_json::from_slice(&response.body).unwrap();
        assert_eq!(body["path"], "/fail");
        assert_eq!(body["error"], "Handler failed: upstream");
    }

    #[tokio::test]
    #[allow(unreachable_code)]
    async fn test_handler_panic_goes_to_error_hook() {
        let mut builder = WebService::builder();
        builder.set_error_handle(|error: &Error, _request: &HttpRequest, _response: &ResponseWriter| {
            Output::text(format!("handled: {error}"))
        });
        builder
            .restful(0, "GET", "/boom", || async {
                panic!("boom");
                ()
            })
            .unwrap();
        let service = Arc::new(builder.build());

        let task = tokio::spawn({
            let service = service.clone();
            async move { service.handle(get("/boom")).await }
        });
        let response = task.await.unwrap();
        assert_eq!(response.status, StatusCode::Ok);
        assert_eq!(response.body_text(), "handled: Handler failed: boom");
    }

    #[tokio::test]
    #[allow(unreachable_code)]
    async fn test_handler_panic_without_hook_is_500() {
        let mut builder = WebService::builder();
        builder
            .register(0, "/boom", || async {
                panic!("{}", String::from("exploded"));
                ()
            })
            .unwrap();
        let service = builder.build();

        let response = service.handle(get("/boom")).await;
        assert_eq!(response.status, StatusCode::InternalServerError);
        assert_eq!(response.body_text(), "Handler failed: exploded");
    }

    #[tokio::test]
    async fn test_session_id_is_created_and_echoed() {
        let mut builder = WebService::builder();
        builder.set_session_key("X-Session");
        builder.set_session_key("Ignored-Key");
        builder.set_session_creator(|| "sess-1".to_string());
        builder
            .register(0, "/whoami", |headers: Headers| async move {
                headers.get("X-Session").unwrap_or_default().to_string()
            })
            .unwrap();
        let service = builder.build();
        assert_eq!(service.session_key(), Some("X-Session"));

        let response = service.handle(get("/whoami")).await;
        assert_eq!(response.body_text(), "sess-1");
        assert_eq!(response.headers.get("X-Session").unwrap(), "sess-1");

        let response = service.handle(get("/whoami").with_header("X-Session", "")).await;
        assert_eq!(response.body_text(), "sess-1");
        assert_eq!(response.headers.get("X-Session").unwrap(), "sess-1");

        let ctx = service.context(get("/whoami").with_header("x-session", "existing"));
        assert_eq!(ctx.session_id(), Some("existing"));
        assert!(ctx.response().header("X-Session").is_none());
    }

    #[tokio::test]
    async fn test_caller_forwards_session_client_and_request_id() {
        let mut builder = ServiceBuilder::new(ServiceConfig::default());
        builder.set_session_key("X-Session");
        builder.set_client_key("X-Client");
        builder
            .register(0, "/call", |caller: Caller| async move {
                caller
                    .forward_headers()
                    .iter()
                    .map(|(k, v)| format!("{k}={v}"))
                    .collect::<Vec<_>>()
            })
            .unwrap();
        let service = builder.build();

        let request = get("/call")
            .with_header("X-Session", "s")
            .with_header("X-Client", "c")
            .with_header("X-Request-Id", "r");
        let response = service.handle(request).await;
        let body: Vec<String> = serde_json::from_slice(&response.body).unwrap();
        assert_eq!(body, vec!["X-Session=s", "X-Client=c", "X-Request-Id=r"]);
    }

    #[tokio::test]
    async fn test_request_timeout_cancels_handler() {
        let finished = Arc::new(AtomicBool::new(false));
        let flag = finished.clone();

        let config = ServiceConfig {
            request_timeout: Some(Duration::from_millis(20)),
            ..ServiceConfig::default()
        };
        let mut builder = ServiceBuilder::new(config);
        builder
            .register(0, "/slow", move || {
                let flag = flag.clone();
                async move {
                    tokio::time::sleep(Duration::from_secs(5)).await;
                    flag.store(true, Ordering::SeqCst);
                    "done"
                }
            })
            .unwrap();
        let service = builder.build();

        let response = service.handle(get("/slow")).await;
        assert_eq!(response.status, StatusCode::ServiceUnavailable);
        assert!(!finished.load(Ordering::SeqCst));
    }

    #[tokio::test]
    async fn test_transport_cancellation() {
        let mut builder = WebService::builder();
        builder
            .register(0, "/slow", || async {
                tokio::time::sleep(Duration::from_secs(5)).await;
                "done"
            })
            .unwrap();
        builder.register(0, "/fast", || async { "fast" }).unwrap();
        let service = builder.build();

        let cancelled = service
            .handle_with_cancel(get("/slow"), tokio::time::sleep(Duration::from_millis(10)))
            .await;
        assert_eq!(cancelled.status, StatusCode::ServiceUnavailable);

        let completed = service
            .handle_with_cancel(get("/fast"), std::future::pending::<()>())
            .await;
        assert_eq!(completed.body_text(), "fast");
    }

    #[tokio::test]
    async fn test_unit_result_is_empty_body() {
        let mut builder = WebService::builder();
        builder.register(0, "/noop", |_logger: Logger| async {}).unwrap();
        let service = builder.build();

        let response = service.handle(get("/noop")).await;
        assert_eq!(response.status, StatusCode::Ok);
        assert!(response.body.is_empty());
        assert!(response.headers.get("Content-Type").is_none());
    }

    #[tokio::test]
    async fn test_service_is_shared_across_tasks() {
        let mut builder = WebService::builder();
        builder
            .register(0, "/n/{value}", |Body(input): Body<HashMap<String, String>>| async move {
                input.get("value").cloned().unwrap_or_default()
            })
            .unwrap();
        let service = Arc::new(builder.build());

        let mut tasks = tokio::task::JoinSet::new();
        for i in 0..16 {
            let service = service.clone();
            tasks.spawn(async move {
                let response = service.handle(get(&format!("/n/{i}"))).await;
                (i, response.body_text())
            });
        }
        while let Some(joined) = tasks.join_next().await {
            let (i, body) = joined.unwrap();
            assert_eq!(body, i.to_string());
        }
    }
}
