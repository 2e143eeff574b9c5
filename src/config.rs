//! 动画管线配置
//!
//! 提供TOML/JSON配置文件、环境变量覆盖和校验。

use serde::{Deserialize, Serialize};
use std::env;
use std::fs;
use std::path::Path;
use thiserror::Error;

use crate::binding::OverflowPolicy;
use crate::pose::{DEFAULT_TICKS_PER_SECOND, MAX_BONES};

/// 配置错误
#[derive(Error, Debug)]
pub enum ConfigError {
    /// 文件读取错误
    #[error("Config file error: {0}")]
    FileError(#[from] std::io::Error),
    /// 解析错误
    #[error("Config parse error: {0}")]
    ParseError(String),
    /// 验证错误
    #[error("Config validation error: {0}")]
    ValidationError(String),
}

pub type ConfigResult<T> = Result<T, ConfigError>;

/// 动画管线配置
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AnimationConfig {
    /// 渲染端骨骼矩阵上限（不得超过 [`MAX_BONES`]）
    #[serde(default = "default_max_bones")]
    pub max_bones: usize,

    /// 顶点影响槽位溢出策略
    #[serde(default)]
    pub overflow_policy: OverflowPolicy,

    /// 资源未声明时的每秒刻度数
    #[serde(default = "default_ticks_per_second")]
    pub default_ticks_per_second: f32,
}

fn default_max_bones() -> usize {
    MAX_BONES
}

fn default_ticks_per_second() -> f32 {
    DEFAULT_TICKS_PER_SECOND
}

impl Default for AnimationConfig {
    fn default() -> Self {
        Self {
            max_bones: MAX_BONES,
            overflow_policy: OverflowPolicy::default(),
            default_ticks_per_second: DEFAULT_TICKS_PER_SECOND,
        }
    }
}

impl AnimationConfig {
    /// 创建默认配置
    pub fn new() -> Self {
        Self::default()
    }

    /// 从TOML文件加载配置
    pub fn from_toml_file<P: AsRef<Path>>(path: P) -> ConfigResult<Self> {
        let content = fs::read_to_string(path).map_err(ConfigError::FileError)?;
        Self::from_toml_str(&content)
    }

    /// 从TOML字符串解析配置
    pub fn from_toml_str(content: &str) -> ConfigResult<Self> {
        toml::from_str(content).map_err(|e| ConfigError::ParseError(e.to_string()))
    }

    /// 从JSON文件加载配置
    pub fn from_json_file<P: AsRef<Path>>(path: P) -> ConfigResult<Self> {
        let content = fs::read_to_string(path).map_err(ConfigError::FileError)?;
        Self::from_json_str(&content)
    }

    /// 从JSON字符串解析配置
    pub fn from_json_str(content: &str) -> ConfigResult<Self> {
        serde_json::from_str(content).map_err(|e| ConfigError::ParseError(e.to_string()))
    }

    /// 从环境变量覆盖配置
    pub fn apply_env_overrides(&mut self) {
        if let Ok(val) = env::var("ENGINE_ANIMATION_MAX_BONES") {
            if let Ok(max_bones) = val.parse() {
                self.max_bones = max_bones;
            }
        }

        if let Ok(val) = env::var("ENGINE_ANIMATION_OVERFLOW_POLICY") {
            match val.as_str() {
                "fail" => self.overflow_policy = OverflowPolicy::Fail,
                "keep_strongest" => self.overflow_policy = OverflowPolicy::KeepStrongest,
                other => log::warn!("unknown overflow policy '{}', keeping current", other),
            }
        }

        if let Ok(val) = env::var("ENGINE_ANIMATION_TICKS_PER_SECOND") {
            if let Ok(ticks) = val.parse() {
                self.default_ticks_per_second = ticks;
            }
        }
    }

    /// 校验配置
    pub fn validate(&self) -> ConfigResult<()> {
        if self.max_bones == 0 || self.max_bones > MAX_BONES {
            return Err(ConfigError::ValidationError(format!(
                "max_bones must be in 1..={}, got {}",
                MAX_BONES, self.max_bones
            )));
        }

        if self.default_ticks_per_second <= 0.0 {
            return Err(ConfigError::ValidationError(format!(
                "default_ticks_per_second must be positive, got {}",
                self.default_ticks_per_second
            )));
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_is_valid() {
        let config = AnimationConfig::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.max_bones, MAX_BONES);
        assert_eq!(config.overflow_policy, OverflowPolicy::Fail);
    }

    #[test]
    fn test_toml_round_trip() {
        let config = AnimationConfig {
            max_bones: 64,
            overflow_policy: OverflowPolicy::KeepStrongest,
            default_ticks_per_second: 30.0,
        };

        let content = toml::to_string(&config).unwrap();
        let parsed = AnimationConfig::from_toml_str(&content).unwrap();

        assert_eq!(parsed.max_bones, 64);
        assert_eq!(parsed.overflow_policy, OverflowPolicy::KeepStrongest);
        assert_eq!(parsed.default_ticks_per_second, 30.0);
    }

    #[test]
    fn test_partial_toml_uses_defaults() {
        let parsed = AnimationConfig::from_toml_str("max_bones = 32").unwrap();
        assert_eq!(parsed.max_bones, 32);
        assert_eq!(parsed.overflow_policy, OverflowPolicy::Fail);
        assert_eq!(parsed.default_ticks_per_second, DEFAULT_TICKS_PER_SECOND);
    }

    #[test]
    fn test_json_parse() {
        let parsed =
            AnimationConfig::from_json_str(r#"{"overflow_policy": "keep_strongest"}"#).unwrap();
        assert_eq!(parsed.overflow_policy, OverflowPolicy::KeepStrongest);
    }

    #[test]
    fn test_validation_rejects_zero_bones() {
        let mut config = AnimationConfig::default();
        config.max_bones = 0;
        assert!(config.validate().is_err());

        config.max_bones = MAX_BONES + 1;
        assert!(config.validate().is_err());
    }
}
