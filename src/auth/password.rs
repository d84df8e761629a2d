//! Password hashing and verification using Argon2id

use crate::{config::SecurityConfig, error::AppError};
use argon2::{
    password_hash::{
        rand_core::OsRng, PasswordHash, PasswordHasher as _, PasswordVerifier, SaltString,
    },
    Algorithm, Argon2, Params, Version,
};

/// 密码哈希抽象
///
/// 凭据服务只依赖此 trait，测试可以替换实现来观察调用。
pub trait CredentialHasher: Send + Sync {
    fn hash(&self, password: &str) -> Result<String, AppError>;

    fn verify(&self, password: &str, hash: &str) -> bool;
}

/// Password hasher with configurable parameters
#[derive(Clone)]
pub struct PasswordHasher {
    argon2: Argon2<'static>,
}

impl PasswordHasher {
    /// 按配置的工作因子创建
    pub fn from_config(config: &SecurityConfig) -> Result<Self, AppError> {
        let params = Params::new(
            config.argon2_memory_kib,
            config.argon2_iterations,
            config.argon2_parallelism,
            None,
        )
        .map_err(|e| AppError::Config(format!("Invalid Argon2 params: {}", e)))?;

        Ok(Self::with_params(params))
    }

    fn with_params(params: Params) -> Self {
        Self {
            argon2: Argon2::new(Algorithm::Argon2id, Version::V0x13, params),
        }
    }

    /// Hash a password
    pub fn hash(&self, password: &str) -> Result<String, AppError> {
        let salt = SaltString::generate(&mut OsRng);

        let password_hash = self
            .argon2
            .hash_password(password.as_bytes(), &salt)
            .map_err(|e| {
                tracing::error!("Failed to hash password: {:?}", e);
                AppError::Internal(format!("Failed to hash password: {}", e))
            })?
            .to_string();

        Ok(password_hash)
    }

    /// Verify a password against a hash
    ///
    /// 存储的哈希格式错误时返回 false。参数取自哈希串本身，
    /// 所以调整工作因子后旧哈希仍可验证。
    pub fn verify(&self, password: &str, hash: &str) -> bool {
        let parsed_hash = match PasswordHash::new(hash) {
            Ok(h) => h,
            Err(e) => {
                tracing::debug!("Failed to parse password hash: {:?}", e);
                return false;
            }
        };

        self.argon2
            .verify_password(password.as_bytes(), &parsed_hash)
            .is_ok()
    }
}

impl CredentialHasher for PasswordHasher {
    fn hash(&self, password: &str) -> Result<String, AppError> {
        PasswordHasher::hash(self, password)
    }

    fn verify(&self, password: &str, hash: &str) -> bool {
        PasswordHasher::verify(self, password, hash)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn fast_hasher() -> PasswordHasher {
        PasswordHasher::with_params(Params::new(1024, 1, 1, None).unwrap())
    }

    #[test]
    fn test_hash_and_verify() {
        let hasher = fast_hasher();
        let password = "TestPassword123!";

        let hash = hasher.hash(password).unwrap();
        assert!(hash.starts_with("$argon2id$"));
        assert!(hasher.verify(password, &hash));
    }

    #[test]
    fn test_verify_fails_with_wrong_password() {
        let hasher = fast_hasher();
        let hash = hasher.hash("TestPassword123!").unwrap();
        assert!(!hasher.verify("WrongPassword", &hash));
    }

    #[test]
    fn test_hash_is_different_each_time() {
        let hasher = fast_hasher();
        let password = "TestPassword123!";

        let hash1 = hasher.hash(password).unwrap();
        let hash2 = hasher.hash(password).unwrap();

        // Hashes should be different due to salt
        assert_ne!(hash1, hash2);

        // But both should verify correctly
        assert!(hasher.verify(password, &hash1));
        assert!(hasher.verify(password, &hash2));
    }

    #[test]
    fn test_verify_malformed_hash_returns_false() {
        let hasher = fast_hasher();
        assert!(!hasher.verify("secret1", ""));
        assert!(!hasher.verify("secret1", "not-a-phc-string"));
        assert!(!hasher.verify("secret1", "secret1"));
    }

    #[test]
    fn test_verify_hash_from_other_work_factor() {
        let strong = PasswordHasher::with_params(Params::new(2048, 2, 1, None).unwrap());
        let hash = strong.hash("secret1").unwrap();

        assert!(fast_hasher().verify("secret1", &hash));
    }

    #[test]
    fn test_from_config_rejects_invalid_params() {
        let config = SecurityConfig {
            session_ttl_secs: 0,
            password_min_length: 6,
            argon2_memory_kib: 1,
            argon2_iterations: 0,
            argon2_parallelism: 1,
        };

        assert!(matches!(
            PasswordHasher::from_config(&config),
            Err(AppError::Config(_))
        ));
    }
}
