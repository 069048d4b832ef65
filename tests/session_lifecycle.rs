use chrono::Duration;
use std::sync::Arc;
use tessera::api;
use tessera::application_impl::*;
use tessera::application_port::*;
use tessera::domain_model::*;
use tessera::domain_port::*;
use tessera::infra_http::HttpRefreshClient;
use tessera::infra_kv::*;
use tessera::infra_memory::*;

const RESTRICT_MINUTES: u32 = 5;

struct Harness {
    clock: Arc<ManualClock>,
    sessions: Arc<dyn SessionStore>,
    restrictions: Arc<dyn RestrictionStore>,
    codec: Arc<JwtCodec>,
    refresh: Arc<RealRefreshService>,
    issuer: IssuanceHandler,
    revoker: RevocationHandler,
}

impl Harness {
    fn new(access_ttl_minutes: u32) -> Self {
        let clock = Arc::new(ManualClock::default());
        let dyn_clock: Arc<dyn Clock> = clock.clone();
        let sessions: Arc<dyn SessionStore> = Arc::new(KvSessionStore::new(Arc::new(
            MemoryKeyValueStore::new(dyn_clock.clone()),
        )));
        let restrictions: Arc<dyn RestrictionStore> = Arc::new(KvRestrictionStore::new(
            Arc::new(MemoryKeyValueStore::new(dyn_clock.clone())),
        ));
        let codec = Arc::new(
            JwtCodec::new(
                CodecConfig {
                    algorithm: SigningAlgorithm::HS256,
                    key: KeyMaterial::Secret(b"lifecycle-secret".to_vec()),
                    access_ttl_minutes,
                },
                dyn_clock,
            )
            .unwrap(),
        );
        let refresh = Arc::new(RealRefreshService::new(
            sessions.clone(),
            restrictions.clone(),
            codec.clone(),
            RESTRICT_MINUTES,
        ));
        let issuer = IssuanceHandler::new(
            sessions.clone(),
            restrictions.clone(),
            codec.clone(),
            RESTRICT_MINUTES,
        );
        let revoker = RevocationHandler::new(sessions.clone());
        Harness {
            clock,
            sessions,
            restrictions,
            codec,
            refresh,
            issuer,
            revoker,
        }
    }

    fn validator(&self) -> RealSessionValidator {
        RealSessionValidator::new(
            self.sessions.clone(),
            self.codec.clone(),
            Arc::new(LocalRefreshClient::new(self.refresh.clone())),
        )
    }

    async fn stored(&self, user_id: &UserId, short_id: &ShortId) -> Option<SignedToken> {
        self.sessions.get(user_id, short_id).await.unwrap()
    }
}

fn request(user_id: &UserId, short_id: &ShortId, scopes: &[&str]) -> AccessRequest {
    let mut request = AccessRequest::new(
        user_id.clone(),
        short_id.clone(),
        Scopes::new(scopes.iter().copied()),
    );
    request.refresh = false;
    request
}

#[tokio::test]
async fn read_scope_grants_read_but_not_write() {
    let h = Harness::new(30);
    let user_id = UserId::from("alice");
    let short_id = h
        .issuer
        .issue(&Principal::access(user_id.clone(), Scopes::new(["read"])))
        .await
        .unwrap();
    assert_eq!(short_id, ShortId::derive(&user_id));

    let validator = h.validator();
    let claims = validator
        .validate(&request(&user_id, &short_id, &["read"]))
        .await
        .unwrap();
    assert_eq!(claims.principal.user_id, user_id);

    match validator
        .validate(&request(&user_id, &short_id, &["write"]))
        .await
    {
        Err(AccessError::Forbidden { missing }) => assert_eq!(missing, vec!["write"]),
        other => panic!("expected Forbidden, got {:?}", other),
    }
}

#[tokio::test]
async fn session_lapses_with_its_token() {
    let h = Harness::new(1);
    let user_id = UserId::from("bob");
    let short_id = h
        .issuer
        .issue(&Principal::access(user_id.clone(), Scopes::default()))
        .await
        .unwrap();
    let validator = h.validator();

    h.clock.advance(Duration::seconds(59));
    assert!(validator.validate(&request(&user_id, &short_id, &[])).await.is_ok());

    h.clock.advance(Duration::seconds(2));
    assert!(matches!(
        validator.validate(&request(&user_id, &short_id, &[])).await,
        Err(AccessError::Unauthenticated(_))
    ));
}

#[tokio::test]
async fn expired_token_in_a_live_entry_is_rejected() {
    let h = Harness::new(1);
    let user_id = UserId::from("bob");
    let token = h
        .codec
        .encode(&Principal::access(user_id.clone(), Scopes::default()))
        .unwrap();
    let short_id = h.sessions.put(&user_id, &token, 10, None).await.unwrap();

    h.clock.advance(Duration::minutes(2));
    assert!(matches!(
        h.validator()
            .validate(&request(&user_id, &short_id, &[]))
            .await,
        Err(AccessError::Unauthenticated(UnauthenticatedReason::Token(
            CodecError::Expired
        )))
    ));
}

#[tokio::test]
async fn refresh_is_suppressed_right_after_issue() {
    let h = Harness::new(30);
    let user_id = UserId::from("carol");
    let short_id = h
        .issuer
        .issue(&Principal::access(user_id.clone(), Scopes::new(["read"])))
        .await
        .unwrap();
    let issued = h.stored(&user_id, &short_id).await.unwrap();

    h.clock.advance(Duration::seconds(10));
    h.refresh.refresh_token(&user_id, &short_id).await;
    assert_eq!(h.stored(&user_id, &short_id).await, Some(issued.clone()));

    h.clock.advance(Duration::minutes(RESTRICT_MINUTES as i64));
    h.refresh.refresh_token(&user_id, &short_id).await;
    let rotated = h.stored(&user_id, &short_id).await.unwrap();
    assert_ne!(rotated, issued);
    assert_eq!(
        h.codec.decode(&rotated).unwrap().principal,
        h.codec.decode(&issued).unwrap().principal
    );
    assert!(h.restrictions.is_marked(&user_id, &short_id).await.unwrap());
}

#[tokio::test]
async fn validation_triggers_background_rotation() {
    let h = Harness::new(30);
    let user_id = UserId::from("dave");
    let short_id = h
        .issuer
        .issue(&Principal::access(user_id.clone(), Scopes::new(["read"])))
        .await
        .unwrap();
    let issued = h.stored(&user_id, &short_id).await.unwrap();
    h.clock.advance(Duration::minutes(RESTRICT_MINUTES as i64 + 1));

    let mut req = request(&user_id, &short_id, &["read"]);
    req.refresh = true;
    h.validator().validate(&req).await.unwrap();

    let mut rotated = None;
    for _ in 0..100 {
        let current = h.stored(&user_id, &short_id).await.unwrap();
        if current != issued {
            rotated = Some(current);
            break;
        }
        tokio::time::sleep(std::time::Duration::from_millis(10)).await;
    }
    assert!(rotated.is_some(), "token was never rotated");
}

#[tokio::test]
async fn revoked_session_no_longer_validates() {
    let h = Harness::new(30);
    let user_id = UserId::from("erin");
    let short_id = h
        .issuer
        .issue(&Principal::access(user_id.clone(), Scopes::new(["read"])))
        .await
        .unwrap();

    h.revoker.revoke(&user_id, &short_id).await.unwrap();
    assert!(matches!(
        h.validator()
            .validate(&request(&user_id, &short_id, &["read"]))
            .await,
        Err(AccessError::Unauthenticated(UnauthenticatedReason::NoSession))
    ));

    // Revoking twice is fine, and a later refresh cannot bring it back.
    h.revoker.revoke(&user_id, &short_id).await.unwrap();
    h.clock.advance(Duration::minutes(RESTRICT_MINUTES as i64));
    h.refresh.refresh_token(&user_id, &short_id).await;
    assert_eq!(h.stored(&user_id, &short_id).await, None);
}

#[tokio::test]
async fn concurrent_refreshes_keep_a_single_valid_session() {
    let h = Harness::new(30);
    let user_id = UserId::from("frank");
    let short_id = h
        .issuer
        .issue(&Principal::access(user_id.clone(), Scopes::new(["read"])))
        .await
        .unwrap();
    h.clock.advance(Duration::minutes(RESTRICT_MINUTES as i64));

    let calls = (0..16).map(|_| {
        let refresh = h.refresh.clone();
        let user_id = user_id.clone();
        let short_id = short_id.clone();
        tokio::spawn(async move { refresh.refresh_token(&user_id, &short_id).await })
    });
    for result in futures_util::future::join_all(calls).await {
        result.unwrap();
    }

    let validator = h.validator();
    let claims = validator
        .validate(&request(&user_id, &short_id, &["read"]))
        .await
        .unwrap();
    assert_eq!(claims.principal.user_id, user_id);
}

#[tokio::test]
async fn refresh_round_trips_over_http() {
    let h = Harness::new(30);
    let user_id = UserId::from("grace");
    let short_id = h
        .issuer
        .issue(&Principal::access(user_id.clone(), Scopes::new(["read"])))
        .await
        .unwrap();
    let issued = h.stored(&user_id, &short_id).await.unwrap();
    h.clock.advance(Duration::minutes(RESTRICT_MINUTES as i64));

    let (addr, server) =
        warp::serve(api::rpc::routes(h.refresh.clone())).bind_ephemeral(([127, 0, 0, 1], 0));
    tokio::spawn(server);

    let client = HttpRefreshClient::new(
        &format!("http://{}", addr),
        std::time::Duration::from_secs(2),
    )
    .unwrap();
    client.request_refresh(&user_id, &short_id).await.unwrap();
    assert_ne!(h.stored(&user_id, &short_id).await.unwrap(), issued);

    // Unknown sessions are still acknowledged.
    client
        .request_refresh(&UserId::from("nobody"), &ShortId::from("nothing"))
        .await
        .unwrap();
}
