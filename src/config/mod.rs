use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

use crate::core::error::{DBError, DBResult};

/// 日志配置
#[derive(Debug, Deserialize, Serialize, Clone, PartialEq)]
#[serde(default)]
pub struct LogConfig {
    pub level: String,
    pub dir: String,
    pub file: String,
    pub max_file_size: u64,
    pub max_files: usize,
}

impl Default for LogConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            dir: "logs".to_string(),
            file: "graphdb-path".to_string(),
            max_file_size: 100 * 1024 * 1024, // 100MB
            max_files: 5,
        }
    }
}

/// 路径查询配置
#[derive(Debug, Deserialize, Serialize, Clone, PartialEq)]
#[serde(default)]
pub struct PathConfig {
    /// 查询未指定步数时使用
    pub default_max_steps: usize,
    /// 允许的最大步数
    pub max_steps_limit: usize,
    /// 同一轮的正反两个方向并发请求
    pub pipeline_directions: bool,
    /// 同时驱动的组合数，0 表示 CPU 核数
    pub pair_parallelism: usize,
    pub default_limit: Option<usize>,
}

impl Default for PathConfig {
    fn default() -> Self {
        Self {
            default_max_steps: 5,
            max_steps_limit: 64,
            pipeline_directions: false,
            pair_parallelism: 1,
            default_limit: None,
        }
    }
}

impl PathConfig {
    /// 实际使用的并发组合数
    pub fn resolved_parallelism(&self) -> usize {
        if self.pair_parallelism == 0 {
            num_cpus::get().max(1)
        } else {
            self.pair_parallelism
        }
    }
}

#[derive(Debug, Deserialize, Serialize, Clone, Default, PartialEq)]
#[serde(default)]
pub struct Config {
    pub log: LogConfig,
    pub path: PathConfig,
}

impl Config {
    pub fn load<P: AsRef<Path>>(path: P) -> DBResult<Self> {
        let content = fs::read_to_string(path)?;
        let config: Config = toml::from_str(&content)?;
        config.validate()?;
        Ok(config)
    }

    pub fn save<P: AsRef<Path>>(&self, path: P) -> DBResult<()> {
        let content = toml::to_string_pretty(self)
            .map_err(|e| DBError::Config(format!("无法序列化配置: {}", e)))?;
        fs::write(path, content)?;
        Ok(())
    }

    pub fn validate(&self) -> DBResult<()> {
        if self.path.default_max_steps == 0 {
            return Err(DBError::Config("path.default_max_steps 必须大于 0".to_string()));
        }
        if self.path.default_max_steps > self.path.max_steps_limit {
            return Err(DBError::Config(format!(
                "path.default_max_steps ({}) 超过 path.max_steps_limit ({})",
                self.path.default_max_steps, self.path.max_steps_limit
            )));
        }
        Ok(())
    }
}
