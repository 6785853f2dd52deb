//! Pipeline tests for the auth crate
//! Drive the real routers with `oneshot`, an in-memory store and a manual clock.

#[cfg(test)]
mod support {
    use std::sync::Arc;
    use std::time::Duration;

    use axum::Router;
    use axum::body::Body;
    use axum::http::{Request, header};
    use axum::response::Response;
    use platform::client::TrustedProxies;
    use platform::rate_limit::{InMemoryRateLimitStore, RateLimitConfig};
    use tower::ServiceExt;

    use crate::application::clock::ManualClock;
    use crate::application::config::{AllowedOrigins, AuthConfig, SigningSecret};
    use crate::application::origin_policy::OriginPolicy;
    use crate::application::token_service::TokenService;
    use crate::domain::entity::identity::Identity;
    use crate::domain::value_object::{ClubId, UserId, UserRole};
    use crate::infra::memory::InMemoryCredentialStore;
    use crate::presentation::handlers::AuthAppState;
    use crate::presentation::middleware::RateLimiter;
    use crate::presentation::router::app_router;

    pub const SECRET: &str = "0123456789abcdef0123456789abcdef";
    pub const START: i64 = 1_700_000_000;
    pub const PASSWORD: &str = "Touchline-Tactics-42";
    pub const ALLOWED_ORIGIN: &str = "http://localhost:3000";

    pub struct Harness {
        pub app: Router,
        pub tokens: Arc<TokenService>,
        pub clock: Arc<ManualClock>,
        pub store: Arc<InMemoryCredentialStore>,
    }

    impl Harness {
        pub fn new() -> Self {
            Self::with_rate_limit(RateLimitConfig::default())
        }

        pub fn with_rate_limit(rate_limit: RateLimitConfig) -> Self {
            Self::with_limiter(rate_limit, TrustedProxies::none())
        }

        pub fn with_limiter(rate_limit: RateLimitConfig, trusted: TrustedProxies) -> Self {
            let clock = Arc::new(ManualClock::at_unix(START));
            let tokens = Arc::new(TokenService::new(
                Arc::new(SigningSecret::new(SECRET).unwrap()),
                clock.clone(),
                Duration::from_secs(30),
            ));
            let store = Arc::new(InMemoryCredentialStore::new());
            let config = Arc::new(AuthConfig {
                rate_limit: rate_limit.clone(),
                ..AuthConfig::default()
            });

            let state = AuthAppState {
                store: store.clone(),
                tokens: tokens.clone(),
                config,
            };
            let origins = OriginPolicy::new(AllowedOrigins::new([ALLOWED_ORIGIN]));
            let limiter = RateLimiter::new(Arc::new(InMemoryRateLimitStore::new()), rate_limit)
                .with_trusted_proxies(trusted);

            Self {
                app: app_router(state, origins, limiter),
                tokens,
                clock,
                store,
            }
        }

        pub fn token_for(&self, id: &str, role: UserRole) -> String {
            self.token_in_club(id, role, None)
        }

        pub fn token_in_club(&self, id: &str, role: UserRole, club: Option<&str>) -> String {
            self.tokens
                .issue(
                    &Identity::new(UserId::new(id), role, club.map(ClubId::new)),
                    Duration::from_secs(3600),
                )
                .unwrap()
                .token
                .into_inner()
        }

        pub async fn send(&self, req: Request<Body>) -> Response {
            self.app.clone().oneshot(req).await.unwrap()
        }
    }

    pub fn get(uri: &str, token: Option<&str>) -> Request<Body> {
        let mut builder = Request::builder().method("GET").uri(uri);
        if let Some(token) = token {
            builder = builder.header(header::AUTHORIZATION, format!("Bearer {token}"));
        }
        builder.body(Body::empty()).unwrap()
    }

    pub fn post_json(uri: &str, token: Option<&str>, body: serde_json::Value) -> Request<Body> {
        json_request("POST", uri, token, body)
    }

    pub fn json_request(
        method: &str,
        uri: &str,
        token: Option<&str>,
        body: serde_json::Value,
    ) -> Request<Body> {
        let mut builder = Request::builder()
            .method(method)
            .uri(uri)
            .header(header::CONTENT_TYPE, "application/json");
        if let Some(token) = token {
            builder = builder.header(header::AUTHORIZATION, format!("Bearer {token}"));
        }
        builder.body(Body::from(body.to_string())).unwrap()
    }

    pub fn delete(uri: &str, token: Option<&str>) -> Request<Body> {
        let mut builder = Request::builder().method("DELETE").uri(uri);
        if let Some(token) = token {
            builder = builder.header(header::AUTHORIZATION, format!("Bearer {token}"));
        }
        builder.body(Body::empty()).unwrap()
    }

    pub async fn body_bytes(response: Response) -> Vec<u8> {
        axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap()
            .to_vec()
    }

    pub async fn body_json(response: Response) -> serde_json::Value {
        serde_json::from_slice(&body_bytes(response).await).unwrap()
    }
}

#[cfg(test)]
mod gate_tests {
    use std::sync::Arc;
    use std::time::Duration;

    use axum::Router;
    use axum::http::{StatusCode, header};
    use axum::routing;
    use tower::ServiceExt;

    use super::support::*;
    use crate::application::token_service::TokenService;
    use crate::domain::entity::identity::Identity;
    use crate::domain::value_object::{RoleSet, UserRole};
    use crate::presentation::middleware::RouteGates;

    fn gated_router(tokens: Arc<TokenService>, allowed: RoleSet) -> Router {
        Router::new()
            .route(
                "/whoami",
                routing::get(|identity: Identity| async move { identity.user_id.to_string() }),
            )
            .authorize(allowed)
            .authenticate(tokens)
    }

    #[tokio::test]
    async fn test_coach_token_reaches_handler_with_identity() {
        let h = Harness::new();
        let token = h.token_for("u1", UserRole::Coach);
        let app = gated_router(
            h.tokens.clone(),
            RoleSet::from_slice(&[UserRole::Coach, UserRole::ClubAdmin]),
        );

        let response = app.oneshot(get("/whoami", Some(&token))).await.unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(body_bytes(response).await, b"u1");
    }

    #[tokio::test]
    async fn test_coach_token_on_super_admin_route_is_forbidden() {
        let h = Harness::new();
        let token = h.token_for("u1", UserRole::Coach);
        let app = gated_router(h.tokens.clone(), RoleSet::from_slice(&[UserRole::SuperAdmin]));

        let response = app.oneshot(get("/whoami", Some(&token))).await.unwrap();
        assert_eq!(response.status(), StatusCode::FORBIDDEN);
        assert_eq!(body_json(response).await["detail"], "Forbidden");
    }

    #[tokio::test]
    async fn test_club_admin_gate() {
        let h = Harness::new();
        let app = gated_router(h.tokens.clone(), RoleSet::from_slice(&[UserRole::ClubAdmin]));

        let coach = h.token_for("u1", UserRole::Coach);
        let response = app.clone().oneshot(get("/whoami", Some(&coach))).await.unwrap();
        assert_eq!(response.status(), StatusCode::FORBIDDEN);

        let admin = h.token_for("u2", UserRole::ClubAdmin);
        let response = app.oneshot(get("/whoami", Some(&admin))).await.unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(body_bytes(response).await, b"u2");
    }

    #[tokio::test]
    async fn test_super_admin_has_no_implicit_access() {
        let h = Harness::new();
        let app = gated_router(h.tokens.clone(), RoleSet::from_slice(&[UserRole::Coach]));
        let token = h.token_for("root", UserRole::SuperAdmin);

        let response = app.oneshot(get("/whoami", Some(&token))).await.unwrap();
        assert_eq!(response.status(), StatusCode::FORBIDDEN);
    }

    #[tokio::test]
    async fn test_token_failures_are_uniform_401() {
        let h = Harness::new();
        let app = gated_router(h.tokens.clone(), RoleSet::from_slice(&[UserRole::Coach]));

        let expiring = h
            .tokens
            .issue(
                &Identity::new(crate::domain::value_object::UserId::new("u1"), UserRole::Coach, None),
                Duration::from_secs(1),
            )
            .unwrap()
            .token
            .into_inner();
        h.clock.advance(Duration::from_secs(1));

        let valid = h.token_for("u1", UserRole::Coach);
        let (head, _) = valid.rsplit_once('.').unwrap();
        let forged = format!("{head}.AAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAA");

        let mut bodies = Vec::new();
        for token in [expiring.as_str(), forged.as_str(), "garbage"] {
            let response = app.clone().oneshot(get("/whoami", Some(token))).await.unwrap();
            assert_eq!(response.status(), StatusCode::UNAUTHORIZED, "{token}");
            assert_eq!(response.headers()[header::WWW_AUTHENTICATE], "Bearer");
            bodies.push(body_json(response).await);
        }
        let response = app.clone().oneshot(get("/whoami", None)).await.unwrap();
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
        bodies.push(body_json(response).await);

        assert!(bodies.iter().all(|body| *body == bodies[0]));
        assert_eq!(bodies[0]["detail"], "Unauthorized");
    }

    #[tokio::test]
    async fn test_authorization_header_without_token_is_401() {
        let h = Harness::new();
        let app = gated_router(h.tokens.clone(), RoleSet::from_slice(&[UserRole::Coach]));

        let req = axum::http::Request::builder()
            .uri("/whoami")
            .header(header::AUTHORIZATION, "Bearer")
            .body(axum::body::Body::empty())
            .unwrap();
        let response = app.oneshot(req).await.unwrap();
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    }

    #[tokio::test]
    async fn test_role_gate_without_auth_gate_is_403() {
        let h = Harness::new();
        let token = h.token_for("u1", UserRole::Coach);

        // Misordered: RoleGate added last, so it runs before AuthGate
        let app = Router::new()
            .route("/whoami", routing::get(|| async { "reached" }))
            .authenticate(h.tokens.clone())
            .authorize(RoleSet::from_slice(&[UserRole::Coach]));

        let response = app.oneshot(get("/whoami", Some(&token))).await.unwrap();
        assert_eq!(response.status(), StatusCode::FORBIDDEN);
        assert_eq!(body_json(response).await["detail"], "Forbidden");
    }
}

#[cfg(test)]
mod origin_tests {
    use axum::body::Body;
    use axum::http::{Method, Request, StatusCode, header};

    use super::support::*;

    fn health_from(origin: &str) -> Request<Body> {
        Request::builder()
            .uri("/health")
            .header(header::ORIGIN, origin)
            .body(Body::empty())
            .unwrap()
    }

    #[tokio::test]
    async fn test_allowed_origin_gets_cors_headers() {
        let h = Harness::new();
        let response = h.send(health_from(ALLOWED_ORIGIN)).await;

        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(
            response.headers()[header::ACCESS_CONTROL_ALLOW_ORIGIN],
            ALLOWED_ORIGIN
        );
    }

    #[tokio::test]
    async fn test_disallowed_origin_is_rejected_without_detail() {
        let h = Harness::new();
        let response = h.send(health_from("http://evil.example")).await;

        assert_eq!(response.status(), StatusCode::FORBIDDEN);
        assert!(response.headers().get(header::ACCESS_CONTROL_ALLOW_ORIGIN).is_none());
        assert!(body_bytes(response).await.is_empty());
    }

    #[tokio::test]
    async fn test_no_origin_is_allowed() {
        let h = Harness::new();
        let response = h.send(get("/health", None)).await;
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(body_json(response).await["status"], "ok");
    }

    #[tokio::test]
    async fn test_origin_check_runs_before_auth() {
        let h = Harness::new();
        let req = Request::builder()
            .uri("/api/auth/me")
            .header(header::ORIGIN, "http://evil.example")
            .body(Body::empty())
            .unwrap();
        assert_eq!(h.send(req).await.status(), StatusCode::FORBIDDEN);
    }

    #[tokio::test]
    async fn test_preflight_from_allowed_origin() {
        let h = Harness::new();
        let req = Request::builder()
            .method(Method::OPTIONS)
            .uri("/api/auth/login")
            .header(header::ORIGIN, ALLOWED_ORIGIN)
            .header(header::ACCESS_CONTROL_REQUEST_METHOD, "POST")
            .header(header::ACCESS_CONTROL_REQUEST_HEADERS, "content-type")
            .body(Body::empty())
            .unwrap();

        let response = h.send(req).await;
        assert!(response.status().is_success());
        assert_eq!(
            response.headers()[header::ACCESS_CONTROL_ALLOW_ORIGIN],
            ALLOWED_ORIGIN
        );
    }
}

#[cfg(test)]
mod rate_limit_tests {
    use std::net::SocketAddr;

    use axum::body::Body;
    use axum::extract::ConnectInfo;
    use axum::http::{Request, StatusCode, header};
    use platform::client::TrustedProxies;
    use platform::rate_limit::RateLimitConfig;

    use super::support::*;
    use crate::domain::value_object::UserRole;

    #[tokio::test]
    async fn test_limit_returns_429_with_retry_after() {
        let h = Harness::with_rate_limit(RateLimitConfig::new(2, 60));

        for _ in 0..2 {
            let response = h.send(get("/health", None)).await;
            assert_eq!(response.status(), StatusCode::OK);
        }

        let response = h.send(get("/health", None)).await;
        assert_eq!(response.status(), StatusCode::TOO_MANY_REQUESTS);
        let retry_after: u64 = response.headers()[header::RETRY_AFTER]
            .to_str()
            .unwrap()
            .parse()
            .unwrap();
        assert!((1..=60).contains(&retry_after));
    }

    #[tokio::test]
    async fn test_limit_applies_before_auth() {
        let h = Harness::with_rate_limit(RateLimitConfig::new(1, 60));

        let response = h.send(get("/api/auth/me", None)).await;
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);

        let token = h.token_for("u1", UserRole::Coach);
        let response = h.send(get("/api/auth/me", Some(&token))).await;
        assert_eq!(response.status(), StatusCode::TOO_MANY_REQUESTS);
    }

    fn health_via(peer: &str, forwarded_for: Option<&str>) -> Request<Body> {
        let mut builder = Request::builder().uri("/health");
        if let Some(value) = forwarded_for {
            builder = builder.header("x-forwarded-for", value);
        }
        let mut req = builder.body(Body::empty()).unwrap();
        let peer: SocketAddr = format!("{peer}:40000").parse().unwrap();
        req.extensions_mut().insert(ConnectInfo(peer));
        req
    }

    #[tokio::test]
    async fn test_spoofed_forwarded_for_is_still_limited() {
        let h = Harness::with_rate_limit(RateLimitConfig::new(1, 60));

        let first = h.send(health_via("203.0.113.5", Some("10.0.0.1"))).await;
        assert_eq!(first.status(), StatusCode::OK);

        for i in 2..50 {
            let spoofed = format!("10.0.0.{i}");
            let response = h.send(health_via("203.0.113.5", Some(&spoofed))).await;
            assert_eq!(response.status(), StatusCode::TOO_MANY_REQUESTS, "{spoofed}");
        }
    }

    #[tokio::test]
    async fn test_peers_are_limited_separately() {
        let h = Harness::with_rate_limit(RateLimitConfig::new(1, 60));

        assert_eq!(h.send(health_via("203.0.113.5", None)).await.status(), StatusCode::OK);
        assert_eq!(h.send(health_via("203.0.113.6", None)).await.status(), StatusCode::OK);
        assert_eq!(
            h.send(health_via("203.0.113.5", None)).await.status(),
            StatusCode::TOO_MANY_REQUESTS
        );
    }

    #[tokio::test]
    async fn test_clients_behind_trusted_proxy_are_limited_separately() {
        let proxy = "10.0.0.1";
        let h = Harness::with_limiter(
            RateLimitConfig::new(1, 60),
            TrustedProxies::new([proxy.parse().unwrap()]),
        );

        let via_proxy = |client: &'static str| health_via(proxy, Some(client));
        assert_eq!(h.send(via_proxy("198.51.100.1")).await.status(), StatusCode::OK);
        assert_eq!(h.send(via_proxy("198.51.100.2")).await.status(), StatusCode::OK);
        assert_eq!(
            h.send(via_proxy("198.51.100.1")).await.status(),
            StatusCode::TOO_MANY_REQUESTS
        );

        // A hop prepended by the client does not change the key
        let spoofed = health_via(proxy, Some("192.0.2.77, 198.51.100.2"));
        assert_eq!(h.send(spoofed).await.status(), StatusCode::TOO_MANY_REQUESTS);
    }
}

#[cfg(test)]
mod flow_tests {
    use axum::http::StatusCode;
    use serde_json::json;

    use super::support::*;
    use crate::domain::value_object::UserRole;

    async fn register(h: &Harness, user_name: &str, role: Option<&str>) -> serde_json::Value {
        let mut body = json!({ "userName": user_name, "password": PASSWORD });
        if let Some(role) = role {
            body["role"] = json!(role);
        }
        let response = h.send(post_json("/api/auth/register", None, body)).await;
        assert_eq!(response.status(), StatusCode::CREATED);
        body_json(response).await
    }

    async fn login(h: &Harness, identifier: &str, password: &str) -> axum::response::Response {
        h.send(post_json(
            "/api/auth/login",
            None,
            json!({ "identifier": identifier, "password": password }),
        ))
        .await
    }

    #[tokio::test]
    async fn test_register_login_me() {
        let h = Harness::new();

        let user = register(&h, "coach_ana", None).await;
        assert_eq!(user["role"], "coach");
        assert_eq!(user["email"], "coach_ana@footballcoaches.local");
        assert!(user.get("password").is_none());
        assert!(user.get("passwordHash").is_none());

        let response = login(&h, "coach_ana", PASSWORD).await;
        assert_eq!(response.status(), StatusCode::OK);
        let body = body_json(response).await;
        assert_eq!(body["tokenType"], "Bearer");
        assert_eq!(body["expiresAt"], START + 3600);
        assert_eq!(body["user"]["id"], user["id"]);

        let token = body["token"].as_str().unwrap().to_string();
        let response = h.send(get("/api/auth/me", Some(&token))).await;
        assert_eq!(response.status(), StatusCode::OK);
        let me = body_json(response).await;
        assert_eq!(me["id"], user["id"]);
        assert_eq!(me["role"], "coach");
    }

    #[tokio::test]
    async fn test_login_by_email() {
        let h = Harness::new();
        let response = h
            .send(post_json(
                "/api/auth/register",
                None,
                json!({
                    "username": "ref_bea",
                    "email": "Bea@Club.Example",
                    "password": PASSWORD,
                    "role": "Referee"
                }),
            ))
            .await;
        assert_eq!(response.status(), StatusCode::CREATED);

        let response = login(&h, "bea@club.example", PASSWORD).await;
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(body_json(response).await["user"]["role"], "referee");
    }

    #[tokio::test]
    async fn test_login_failures_are_indistinguishable() {
        let h = Harness::new();
        register(&h, "coach_ana", None).await;

        let wrong_password = login(&h, "coach_ana", "Wrong-Password-99").await;
        let unknown_user = login(&h, "nobody_here", PASSWORD).await;

        assert_eq!(wrong_password.status(), StatusCode::UNAUTHORIZED);
        assert_eq!(unknown_user.status(), StatusCode::UNAUTHORIZED);

        let a = body_json(wrong_password).await;
        let b = body_json(unknown_user).await;
        assert_eq!(a, b);
        assert_eq!(a["detail"], "Invalid credentials");
    }

    #[tokio::test]
    async fn test_register_conflicts_and_validation() {
        let h = Harness::new();
        register(&h, "coach_ana", None).await;

        let duplicate = h
            .send(post_json(
                "/api/auth/register",
                None,
                json!({ "userName": "COACH_ANA", "password": PASSWORD }),
            ))
            .await;
        assert_eq!(duplicate.status(), StatusCode::CONFLICT);

        let weak = h
            .send(post_json(
                "/api/auth/register",
                None,
                json!({ "userName": "coach_bo", "password": "password" }),
            ))
            .await;
        assert_eq!(weak.status(), StatusCode::BAD_REQUEST);

        let escalation = h
            .send(post_json(
                "/api/auth/register",
                None,
                json!({ "userName": "boss", "password": PASSWORD, "role": "super_admin" }),
            ))
            .await;
        assert_eq!(escalation.status(), StatusCode::FORBIDDEN);
        assert_eq!(h.store.len().await, 1);
    }

    #[tokio::test]
    async fn test_refresh_issues_new_expiry() {
        let h = Harness::new();
        let token = h.token_for("u1", UserRole::Fan);

        h.clock.advance(std::time::Duration::from_secs(600));
        let response = h
            .send(post_json("/api/auth/refresh", Some(&token), json!({})))
            .await;
        assert_eq!(response.status(), StatusCode::OK);
        let body = body_json(response).await;
        assert_eq!(body["expiresAt"], START + 600 + 3600);
        assert!(body.get("user").is_none());
        assert_ne!(body["token"], token.as_str());
    }

    #[tokio::test]
    async fn test_logout_is_stateless() {
        let h = Harness::new();
        let token = h.token_for("u1", UserRole::Player);

        let response = h
            .send(post_json("/api/auth/logout", Some(&token), json!({})))
            .await;
        assert_eq!(response.status(), StatusCode::NO_CONTENT);

        // No revocation: the token keeps working until it expires
        let response = h.send(get("/api/auth/me", Some(&token))).await;
        assert_eq!(response.status(), StatusCode::OK);

        let response = h.send(post_json("/api/auth/logout", None, json!({}))).await;
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    }

    #[tokio::test]
    async fn test_user_routes_role_sets() {
        let h = Harness::new();
        let user = register(&h, "player_cy", Some("player")).await;
        let path = format!("/api/users/{}", user["id"].as_str().unwrap());

        for role in [UserRole::Coach, UserRole::ClubAdmin, UserRole::SuperAdmin] {
            let token = h.token_for("reader", role);
            let response = h.send(get(&path, Some(&token))).await;
            assert_eq!(response.status(), StatusCode::OK, "{role}");
            assert_eq!(body_json(response).await["userName"], "player_cy");
        }

        for role in [UserRole::Player, UserRole::Referee, UserRole::Fan] {
            let token = h.token_for("reader", role);
            let response = h.send(get(&path, Some(&token))).await;
            assert_eq!(response.status(), StatusCode::FORBIDDEN, "{role}");
        }

        let response = h.send(get(&path, None)).await;
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);

        let token = h.token_for("reader", UserRole::Coach);
        let response = h.send(get("/api/users/does-not-exist", Some(&token))).await;
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn test_admin_user_creation() {
        let h = Harness::new();
        let admin = h.token_in_club("admin-1", UserRole::ClubAdmin, Some("club-7"));

        let response = h
            .send(post_json(
                "/api/users",
                Some(&admin),
                json!({ "userName": "coach_dee", "password": PASSWORD, "role": "coach" }),
            ))
            .await;
        assert_eq!(response.status(), StatusCode::CREATED);
        assert_eq!(body_json(response).await["clubId"], "club-7");

        let response = h
            .send(post_json(
                "/api/users",
                Some(&admin),
                json!({ "userName": "boss_2", "password": PASSWORD, "role": "super_admin" }),
            ))
            .await;
        assert_eq!(response.status(), StatusCode::FORBIDDEN);

        let coach = h.token_for("coach-1", UserRole::Coach);
        let response = h
            .send(post_json(
                "/api/users",
                Some(&coach),
                json!({ "userName": "coach_eve", "password": PASSWORD }),
            ))
            .await;
        assert_eq!(response.status(), StatusCode::FORBIDDEN);
    }

    /// Account created by a SuperAdmin, returned as the API renders it
    async fn seed(h: &Harness, user_name: &str, role: &str, club: Option<&str>) -> serde_json::Value {
        let root = h.token_for("root", UserRole::SuperAdmin);
        let response = h
            .send(post_json(
                "/api/users",
                Some(&root),
                json!({ "userName": user_name, "password": PASSWORD, "role": role, "clubId": club }),
            ))
            .await;
        assert_eq!(response.status(), StatusCode::CREATED);
        body_json(response).await
    }

    fn user_path(user: &serde_json::Value) -> String {
        format!("/api/users/{}", user["id"].as_str().unwrap())
    }

    #[tokio::test]
    async fn test_user_management_role_sets() {
        let h = Harness::new();
        let user = seed(&h, "player_cy", "player", Some("club-7")).await;
        let path = user_path(&user);

        for role in [UserRole::Coach, UserRole::Player, UserRole::Referee, UserRole::Fan] {
            let token = h.token_in_club("member", role, Some("club-7"));
            let response = h
                .send(json_request("PUT", &path, Some(&token), json!({ "role": "coach" })))
                .await;
            assert_eq!(response.status(), StatusCode::FORBIDDEN, "{role}");
            let response = h.send(delete(&path, Some(&token))).await;
            assert_eq!(response.status(), StatusCode::FORBIDDEN, "{role}");
        }

        let response = h.send(delete(&path, None)).await;
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);

        let club_admin = h.token_in_club("admin-1", UserRole::ClubAdmin, Some("club-7"));
        let response = h
            .send(json_request("PUT", &path, Some(&club_admin), json!({ "role": "referee" })))
            .await;
        assert_eq!(response.status(), StatusCode::OK);
        let body = body_json(response).await;
        assert_eq!(body["role"], "referee");
        assert_eq!(body["clubId"], "club-7");

        let root = h.token_for("root", UserRole::SuperAdmin);
        let response = h
            .send(json_request(
                "PUT",
                &path,
                Some(&root),
                json!({ "username": "player_cy2", "clubId": "club-9" }),
            ))
            .await;
        assert_eq!(response.status(), StatusCode::OK);
        let body = body_json(response).await;
        assert_eq!(body["userName"], "player_cy2");
        assert_eq!(body["clubId"], "club-9");

        // Reads keep their own, wider role set
        let coach = h.token_for("coach-1", UserRole::Coach);
        let response = h.send(get(&path, Some(&coach))).await;
        assert_eq!(response.status(), StatusCode::OK);

        let response = h.send(delete(&path, Some(&root))).await;
        assert_eq!(response.status(), StatusCode::NO_CONTENT);
        let response = h.send(get(&path, Some(&coach))).await;
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn test_club_admin_manages_only_own_club() {
        let h = Harness::new();
        let other = seed(&h, "ref_dan", "referee", Some("club-8")).await;
        let own = seed(&h, "fan_eli", "fan", Some("club-7")).await;
        let boss = seed(&h, "boss_1", "super_admin", Some("club-7")).await;
        let admin = h.token_in_club("admin-1", UserRole::ClubAdmin, Some("club-7"));

        for target in [&other, &boss] {
            let response = h
                .send(json_request("PUT", &user_path(target), Some(&admin), json!({})))
                .await;
            assert_eq!(response.status(), StatusCode::FORBIDDEN);
            let response = h.send(delete(&user_path(target), Some(&admin))).await;
            assert_eq!(response.status(), StatusCode::FORBIDDEN);
        }

        let response = h
            .send(json_request(
                "PUT",
                &user_path(&own),
                Some(&admin),
                json!({ "role": "super_admin" }),
            ))
            .await;
        assert_eq!(response.status(), StatusCode::FORBIDDEN);

        let response = h
            .send(json_request(
                "PUT",
                &user_path(&own),
                Some(&admin),
                json!({ "clubId": "club-8" }),
            ))
            .await;
        assert_eq!(response.status(), StatusCode::FORBIDDEN);

        let response = h.send(delete(&user_path(&own), Some(&admin))).await;
        assert_eq!(response.status(), StatusCode::NO_CONTENT);
        assert_eq!(h.store.len().await, 2);
    }

    #[tokio::test]
    async fn test_managing_missing_user_is_404() {
        let h = Harness::new();
        let root = h.token_for("root", UserRole::SuperAdmin);

        let response = h
            .send(json_request(
                "PUT",
                "/api/users/does-not-exist",
                Some(&root),
                json!({ "role": "fan" }),
            ))
            .await;
        assert_eq!(response.status(), StatusCode::NOT_FOUND);

        let response = h.send(delete("/api/users/does-not-exist", Some(&root))).await;
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn test_update_conflict_and_new_password() {
        let h = Harness::new();
        register(&h, "coach_ana", None).await;
        let fan = seed(&h, "fan_fay", "fan", None).await;
        let root = h.token_for("root", UserRole::SuperAdmin);

        let response = h
            .send(json_request(
                "PUT",
                &user_path(&fan),
                Some(&root),
                json!({ "userName": "Coach_Ana" }),
            ))
            .await;
        assert_eq!(response.status(), StatusCode::CONFLICT);

        let response = h
            .send(json_request(
                "PUT",
                &user_path(&fan),
                Some(&root),
                json!({ "password": "Offside-Rule-2024" }),
            ))
            .await;
        assert_eq!(response.status(), StatusCode::OK);

        let response = login(&h, "fan_fay", PASSWORD).await;
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
        let response = login(&h, "fan_fay", "Offside-Rule-2024").await;
        assert_eq!(response.status(), StatusCode::OK);
    }
}
