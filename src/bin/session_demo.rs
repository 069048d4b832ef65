/// Walks one session through its whole life against in-memory stores:
/// issue, validate, refresh (suppressed, then real), revoke.
///
/// $ cargo run --bin session_demo
use chrono::Duration;
use std::sync::Arc;
use tessera::application_impl::*;
use tessera::application_port::*;
use tessera::domain_model::*;
use tessera::domain_port::*;
use tessera::infra_kv::*;
use tessera::infra_memory::*;
use tessera::logger::*;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let logger = Logger::new_bootstrap();
    logger.reload_from_config(&LogConfig {
        filter: "tessera=debug,session_demo=debug".to_string(),
    })?;

    // region initialization

    let manual_clock = Arc::new(ManualClock::default());
    let clock: Arc<dyn Clock> = manual_clock.clone();

    let session_store: Arc<dyn SessionStore> = Arc::new(KvSessionStore::new(Arc::new(
        MemoryKeyValueStore::new(clock.clone()),
    )));
    let restriction_store: Arc<dyn RestrictionStore> = Arc::new(KvRestrictionStore::new(
        Arc::new(MemoryKeyValueStore::new(clock.clone())),
    ));
    let token_codec: Arc<dyn TokenCodec> = Arc::new(JwtCodec::new(
        CodecConfig {
            algorithm: SigningAlgorithm::HS256,
            key: KeyMaterial::Secret(b"my-dev-secret-key".to_vec()),
            access_ttl_minutes: 30,
        },
        clock,
    )?);

    let refresh_service = Arc::new(RealRefreshService::new(
        session_store.clone(),
        restriction_store.clone(),
        token_codec.clone(),
        5,
    ));
    let validator = RealSessionValidator::new(
        session_store.clone(),
        token_codec.clone(),
        Arc::new(LocalRefreshClient::new(refresh_service.clone())),
    );
    let issuer = IssuanceHandler::new(
        session_store.clone(),
        restriction_store,
        token_codec.clone(),
        5,
    );
    let revoker = RevocationHandler::new(session_store.clone());

    // endregion

    let user_id = UserId::from("demo-user");
    let principal = Principal::access(user_id.clone(), Scopes::new(["read", "write"]))
        .with_attribute("display_name", serde_json::json!("Demo User"));

    let short_id = issuer.issue(&principal).await?;
    println!("issued -> {}", short_id);

    let mut request = AccessRequest::new(user_id.clone(), short_id.clone(), Scopes::new(["read"]));
    request.refresh = false;
    let claims = validator.validate(&request).await?;
    println!("validated -> {:?} until {}", claims.principal.scopes, claims.expires_at);

    let admin = AccessRequest::new(user_id.clone(), short_id.clone(), Scopes::new(["admin"]));
    match validator.validate(&admin).await {
        Err(e) => println!("admin scope -> {}", e),
        Ok(_) => println!("admin scope -> unexpectedly granted"),
    }

    let outcome = refresh_service.rotate(&user_id, &short_id).await?;
    println!("refresh inside cooldown -> {:?}", outcome);

    manual_clock.advance(Duration::minutes(6));
    let outcome = refresh_service.rotate(&user_id, &short_id).await?;
    let rotated = session_store
        .get(&user_id, &short_id)
        .await?
        .map(|token| token_codec.decode(&token))
        .transpose()?;
    println!(
        "refresh after cooldown -> {:?}, new expiry {:?}",
        outcome,
        rotated.map(|c| c.expires_at)
    );

    revoker.revoke(&user_id, &short_id).await?;
    match validator.validate(&request).await {
        Err(e) => println!("after revoke -> {}", e),
        Ok(_) => println!("after revoke -> still valid"),
    }

    Ok(())
}
