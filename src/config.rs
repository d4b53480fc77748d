use crate::error::{AppError, AppResult};
use crate::models::{Prize, Quantity, default_catalog, with_consolation_fill};
use serde::{Deserialize, Serialize};
use std::env;

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub simulation: SimulationConfig,
    #[serde(default)]
    pub admission: AdmissionConfig,
    #[serde(default)]
    pub prizes: Vec<PrizeConfig>,
    /// 兜底奖品 (概率自动补足为 1.0 - 其他奖品概率总和)
    #[serde(default)]
    pub consolation: Option<ConsolationConfig>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SimulationConfig {
    /// 抽奖总次数
    pub draws: u64,
    /// 工作线程数
    pub workers: usize,
    /// 每隔多少次抽奖插入一次重复请求 (0 = 不插入)
    pub duplicate_every: u64,
    pub duplicate_request_id: String,
    /// 随机种子 (None = 使用 thread_rng)
    pub seed: Option<u64>,
}

impl Default for SimulationConfig {
    fn default() -> Self {
        Self {
            draws: 100,
            workers: 10,
            duplicate_every: 20,
            duplicate_request_id: "REQ-DUPLICATE-123".to_string(),
            seed: None,
        }
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AdmissionConfig {
    /// 请求 ID 过期秒数 (None = 永不过期)
    #[serde(default)]
    pub ttl_seconds: Option<u64>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PrizeConfig {
    pub id: String,
    pub name: String,
    /// 库存上限 (不填 = 无限)
    #[serde(default)]
    pub quantity: Option<i64>,
    pub probability: f64,
    #[serde(default)]
    pub consolation: bool,
}

impl From<PrizeConfig> for Prize {
    fn from(c: PrizeConfig) -> Self {
        Prize {
            id: c.id,
            name: c.name,
            quantity: Quantity::from_limit(c.quantity),
            probability: c.probability,
            consolation: c.consolation,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ConsolationConfig {
    pub id: String,
    pub name: String,
}

impl Config {
    pub fn from_toml() -> AppResult<Self> {
        let config_path = env::var("CONFIG_PATH").unwrap_or_else(|_| "config.toml".to_string());
        use std::io::ErrorKind;

        // 尝试读取配置文件，如果不存在则完全依赖环境变量与默认值
        let mut config = match std::fs::read_to_string(&config_path) {
            Ok(config_str) => toml::from_str(&config_str)?,
            Err(e) if e.kind() == ErrorKind::NotFound => {
                log::warn!("Config file {config_path} not found, using defaults");
                Config::default()
            }
            Err(e) => {
                return Err(AppError::ConfigError(format!(
                    "Failed to read config file {config_path}: {e}"
                )));
            }
        };

        // 环境变量覆盖（即便文件存在时也覆盖）
        config.apply_overrides(|name| env::var(name).ok());
        config.validate()?;
        Ok(config)
    }

    pub fn from_toml_str(config_str: &str) -> AppResult<Self> {
        let config: Config = toml::from_str(config_str)?;
        config.validate()?;
        Ok(config)
    }

    /// 校验覆盖后的最终配置
    pub fn validate(&self) -> AppResult<()> {
        // ttl 为 0 时所有重复请求都会被重新准入
        if self.admission.ttl_seconds == Some(0) {
            return Err(AppError::ConfigError(
                "admission.ttl_seconds must be greater than zero".into(),
            ));
        }
        Ok(())
    }

    /// 用 lookup 提供的值覆盖配置 (生产中为环境变量)
    pub fn apply_overrides<F>(&mut self, lookup: F)
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(v) = lookup("DRAW_COUNT")
            && let Ok(n) = v.parse()
        {
            self.simulation.draws = n;
        }
        if let Some(v) = lookup("DRAW_WORKERS")
            && let Ok(n) = v.parse()
        {
            self.simulation.workers = n;
        }
        if let Some(v) = lookup("DRAW_DUPLICATE_EVERY")
            && let Ok(n) = v.parse()
        {
            self.simulation.duplicate_every = n;
        }
        if let Some(v) = lookup("DRAW_DUPLICATE_REQUEST_ID") {
            self.simulation.duplicate_request_id = v;
        }
        if let Some(v) = lookup("DRAW_SEED")
            && let Ok(n) = v.parse()
        {
            self.simulation.seed = Some(n);
        }
        if let Some(v) = lookup("ADMISSION_TTL_SECONDS")
            && let Ok(n) = v.parse()
        {
            self.admission.ttl_seconds = Some(n);
        }
    }

    /// 配置中的奖品列表; 未配置奖品时使用默认演示列表
    pub fn catalog(&self) -> Vec<Prize> {
        if self.prizes.is_empty() {
            return default_catalog();
        }
        let prizes: Vec<Prize> = self.prizes.iter().cloned().map(Prize::from).collect();
        match &self.consolation {
            Some(c) => with_consolation_fill(prizes, c.id.clone(), c.name.clone()),
            None => prizes,
        }
    }
}
