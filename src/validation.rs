//! 请求字段校验
//! 每个请求的校验规则是一张"字段名 → 规则列表"表，在进入认证核心前统一执行

use crate::error::AppError;
use validator::ValidateEmail;

/// 单条字段规则
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FieldRule {
    /// 字段必须存在且去除空白后非空
    Required,
    /// 字段必须是合法邮箱
    Email,
    /// 字段至少包含 n 个字符
    MinLength(usize),
    /// 字段最多包含 n 个字符
    MaxLength(usize),
    /// 字段必须与另一字段完全相同
    EqualsField(String),
}

/// 请求对象按字段名暴露取值
pub trait FieldSource {
    /// 字段不存在时返回 None
    fn field(&self, name: &str) -> Option<&str>;
}

/// 一组按声明顺序执行的字段规则
#[derive(Debug, Clone, Default)]
pub struct ValidationRules {
    fields: Vec<(String, Vec<FieldRule>)>,
}

impl ValidationRules {
    pub fn new() -> Self {
        Self::default()
    }

    /// 为字段追加规则
    pub fn field(mut self, name: &str, rules: impl IntoIterator<Item = FieldRule>) -> Self {
        self.fields.push((name.to_string(), rules.into_iter().collect()));
        self
    }

    /// 执行全部规则，汇总所有失败信息
    pub fn check<S: FieldSource + ?Sized>(&self, source: &S) -> Result<(), AppError> {
        let mut failures = Vec::new();

        for (name, rules) in &self.fields {
            let value = source.field(name).unwrap_or("");
            let required = rules.contains(&FieldRule::Required);

            // 非必填字段为空时跳过其余规则
            if value.trim().is_empty() {
                if required {
                    failures.push(format!("The {} field is required", name));
                }
                continue;
            }

            for rule in rules {
                if let Some(message) = Self::apply(rule, name, value, source) {
                    failures.push(message);
                }
            }
        }

        if failures.is_empty() {
            Ok(())
        } else {
            Err(AppError::InvalidInput(failures.join("; ")))
        }
    }

    fn apply<S: FieldSource + ?Sized>(
        rule: &FieldRule,
        name: &str,
        value: &str,
        source: &S,
    ) -> Option<String> {
        match rule {
            FieldRule::Required => None,
            FieldRule::Email => (!value.trim().validate_email())
                .then(|| format!("The {} must be a valid email address", name)),
            FieldRule::MinLength(min) => (value.chars().count() < *min)
                .then(|| format!("The {} must be at least {} characters", name, min)),
            FieldRule::MaxLength(max) => (value.chars().count() > *max)
                .then(|| format!("The {} may not be greater than {} characters", name, max)),
            FieldRule::EqualsField(other) => (source.field(other) != Some(value))
                .then(|| format!("The {} and {} must match", name, other)),
        }
    }
}

/// 与 users 表 VARCHAR(255) 列一致
pub const MAX_FIELD_LENGTH: usize = 255;

/// 认证接口使用的校验规则
#[derive(Debug, Clone)]
pub struct AuthRules {
    pub signup: ValidationRules,
    pub signin: ValidationRules,
    pub change_password: ValidationRules,
}

impl AuthRules {
    pub fn new(password_min_length: usize) -> Self {
        use FieldRule::*;

        Self {
            signup: ValidationRules::new()
                .field("first_name", [Required, MaxLength(MAX_FIELD_LENGTH)])
                .field("last_name", [Required, MaxLength(MAX_FIELD_LENGTH)])
                .field("email", [Required, Email, MaxLength(MAX_FIELD_LENGTH)])
                .field("password", [Required, MinLength(password_min_length)]),
            signin: ValidationRules::new()
                .field("email", [Required, Email])
                .field("password", [Required]),
            change_password: ValidationRules::new()
                .field("email", [Required, Email])
                .field("current_password", [Required])
                .field("new_password", [Required, MinLength(password_min_length)])
                .field(
                    "new_password_confirmation",
                    [EqualsField("new_password".to_string())],
                ),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    struct Fields(HashMap<&'static str, &'static str>);

    impl FieldSource for Fields {
        fn field(&self, name: &str) -> Option<&str> {
            self.0.get(name).copied()
        }
    }

    fn fields(pairs: &[(&'static str, &'static str)]) -> Fields {
        Fields(pairs.iter().copied().collect())
    }

    fn message(result: Result<(), AppError>) -> String {
        match result {
            Err(AppError::InvalidInput(msg)) => msg,
            other => panic!("expected InvalidInput, got {:?}", other),
        }
    }

    #[test]
    fn test_required_rejects_missing_and_blank() {
        let rules = ValidationRules::new().field("name", [FieldRule::Required]);

        assert!(rules.check(&fields(&[("name", "x")])).is_ok());
        assert!(message(rules.check(&fields(&[]))).contains("name field is required"));
        assert!(rules.check(&fields(&[("name", "   ")])).is_err());
    }

    #[test]
    fn test_email_rule() {
        let rules = ValidationRules::new().field("email", [FieldRule::Required, FieldRule::Email]);

        assert!(rules.check(&fields(&[("email", "a@x.com")])).is_ok());
        assert!(rules.check(&fields(&[("email", " A@X.com ")])).is_ok());
        assert!(rules.check(&fields(&[("email", "not-an-email")])).is_err());
    }

    #[test]
    fn test_min_length_counts_characters() {
        let rules = ValidationRules::new().field("password", [FieldRule::MinLength(6)]);

        assert!(rules.check(&fields(&[("password", "secret")])).is_ok());
        assert!(rules.check(&fields(&[("password", "密码密码密码")])).is_ok());
        assert!(message(rules.check(&fields(&[("password", "short")])))
            .contains("at least 6 characters"));
    }

    #[test]
    fn test_max_length_counts_characters() {
        let rules = ValidationRules::new().field("first_name", [FieldRule::MaxLength(3)]);

        assert!(rules.check(&fields(&[("first_name", "abc")])).is_ok());
        assert!(rules.check(&fields(&[("first_name", "张三丰")])).is_ok());
        assert!(message(rules.check(&fields(&[("first_name", "abcd")])))
            .contains("may not be greater than 3 characters"));
    }

    #[test]
    fn test_signup_rejects_names_longer_than_column() {
        let rules = AuthRules::new(6).signup;
        let long_name = "a".repeat(MAX_FIELD_LENGTH + 1);
        let source = SignupFields {
            first_name: long_name.clone(),
            last_name: "B".to_string(),
        };

        let msg = message(rules.check(&source));
        assert!(msg.contains("first_name may not be greater than 255"));
        assert!(!msg.contains("last_name"));
    }

    struct SignupFields {
        first_name: String,
        last_name: String,
    }

    impl FieldSource for SignupFields {
        fn field(&self, name: &str) -> Option<&str> {
            match name {
                "first_name" => Some(&self.first_name),
                "last_name" => Some(&self.last_name),
                "email" => Some("a@x.com"),
                "password" => Some("secret1"),
                _ => None,
            }
        }
    }

    #[test]
    fn test_optional_field_skips_rules_when_absent() {
        let rules = ValidationRules::new().field(
            "confirmation",
            [FieldRule::EqualsField("password".to_string())],
        );

        assert!(rules.check(&fields(&[("password", "secret1")])).is_ok());
        assert!(rules
            .check(&fields(&[("password", "secret1"), ("confirmation", "secret1")]))
            .is_ok());
        assert!(rules
            .check(&fields(&[("password", "secret1"), ("confirmation", "secret2")]))
            .is_err());
    }

    #[test]
    fn test_all_failures_reported() {
        let rules = AuthRules::new(6).signup;
        let msg = message(rules.check(&fields(&[("email", "bad"), ("password", "123")])));

        assert!(msg.contains("first_name"));
        assert!(msg.contains("last_name"));
        assert!(msg.contains("valid email"));
        assert!(msg.contains("password must be at least 6"));
    }
}
