/// Tests for the credential minter
/// Tokens must verify with the backend's secret and algorithm and expire one hour after issue
use chrono::{Duration, Utc};
use invoice_probe::auth::{extract_subject_from_jwt, Claims, CredentialError, TokenMinter, DEFAULT_SUBJECT, TOKEN_TTL_SECS};
use invoice_probe::config::ProbeConfig;

const SECRET: &str = "secreto_todavia_mas_seguro";

#[cfg(feature = "signing")]
mod signing {
    use super::*;
    use jsonwebtoken::{decode, decode_header, Algorithm, DecodingKey, Validation};

    fn verify(token: &str, secret: &str) -> Result<Claims, jsonwebtoken::errors::Error> {
        decode::<Claims>(token, &DecodingKey::from_secret(secret.as_bytes()), &Validation::new(Algorithm::HS256))
            .map(|data| data.claims)
    }

    #[test]
    fn test_minted_token_verifies_with_shared_secret() {
        let token = TokenMinter::new(SECRET).mint(DEFAULT_SUBJECT).expect("minting should succeed");

        let claims = verify(&token, SECRET).expect("token should verify");
        assert_eq!(claims.id, 1);
    }

    #[test]
    fn test_minted_token_uses_hs256() {
        let token = TokenMinter::new(SECRET).mint(5).unwrap();
        let header = decode_header(&token).expect("header should decode");
        assert_eq!(header.alg, Algorithm::HS256);
    }

    #[test]
    fn test_token_expires_one_hour_after_issue() {
        let before = Utc::now().timestamp();
        let token = TokenMinter::new(SECRET).mint(2).unwrap();
        let after = Utc::now().timestamp();

        let claims = verify(&token, SECRET).unwrap();
        assert_eq!(claims.id, 2);
        assert!(claims.exp >= before + TOKEN_TTL_SECS);
        assert!(claims.exp <= after + TOKEN_TTL_SECS);
    }

    #[test]
    fn test_wrong_secret_is_rejected() {
        let token = TokenMinter::new(SECRET).mint(1).unwrap();
        assert!(verify(&token, "some-other-secret").is_err());
    }

    #[test]
    fn test_minter_follows_config_secret() {
        let config = ProbeConfig::from_lookup(|key| match key {
            "JWT_SECRET" => Some("from-env".to_string()),
            _ => None,
        });
        let token = TokenMinter::from_config(&config).mint(1).unwrap();
        assert!(verify(&token, "from-env").is_ok());
        assert!(verify(&token, SECRET).is_err());
    }

    #[test]
    fn test_subject_readable_without_secret() {
        let token = TokenMinter::new(SECRET).mint(77).unwrap();
        assert_eq!(extract_subject_from_jwt(&token), Some(77));
    }

    #[test]
    fn test_signing_is_available() {
        assert!(TokenMinter::new(SECRET).is_available().unwrap());
    }
}

#[cfg(not(feature = "signing"))]
#[test]
fn test_minting_without_signing_is_unavailable() {
    let minter = TokenMinter::new(SECRET);
    assert!(matches!(minter.mint(1), Err(CredentialError::Unavailable(_))));
    assert!(!minter.is_available().unwrap());
}

#[test]
fn test_never_mints_expired_token() {
    // issued two hours ago, so it expired an hour ago
    let issued = Utc::now() - Duration::hours(2);
    let err = TokenMinter::new(SECRET).mint_at(1, issued).unwrap_err();
    assert!(matches!(err, CredentialError::Expired { subject: 1, .. }));
}

#[test]
fn test_claims_shape() {
    let claims = Claims::new(9, Utc::now());
    let json = serde_json::to_value(&claims).unwrap();
    assert_eq!(json["id"], 9);
    assert!(json["exp"].is_i64());
    assert_eq!(json.as_object().unwrap().len(), 2);
}
