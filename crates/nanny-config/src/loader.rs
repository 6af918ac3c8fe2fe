use anyhow::{anyhow, Result};
use config::{Config, File, FileFormat};
use nanny_device::DeviceRegistry;
use std::num::NonZeroUsize;
use std::path::{Path, PathBuf};
use tracing::info;

use crate::{validate, GlobalConfig, LabConfig, LabsConfig};

/// 加载完成的仪表盘：全局配置 + 设备注册表
pub struct Dashboard {
    pub global: GlobalConfig,
    pub registry: DeviceRegistry,
}

/// 配置加载器
pub struct ConfigLoader {
    config_dir: PathBuf,
}

impl ConfigLoader {
    /// 创建配置加载器
    pub fn new<P: AsRef<Path>>(config_dir: P) -> Self {
        Self {
            config_dir: config_dir.as_ref().to_path_buf(),
        }
    }

    /// 加载全局配置
    pub fn load_global(&self) -> Result<GlobalConfig> {
        let config_path = self.config_dir.join("global.toml");

        if !config_path.exists() {
            // 如果配置文件不存在，返回默认配置
            return Ok(GlobalConfig::default());
        }

        let config = Config::builder()
            .add_source(File::new(
                config_path.to_str().ok_or_else(|| anyhow!("Invalid config path"))?,
                FileFormat::Toml,
            ))
            .build()?;

        Ok(config.try_deserialize()?)
    }

    /// 加载实验室配置
    pub fn load_labs(&self) -> Result<Vec<LabConfig>> {
        let config_path = self.config_dir.join("labs.toml");

        if !config_path.exists() {
            return Err(anyhow!("Labs config not found: {}", config_path.display()));
        }

        let config = Config::builder()
            .add_source(File::new(
                config_path.to_str().ok_or_else(|| anyhow!("Invalid config path"))?,
                FileFormat::Toml,
            ))
            .build()?;

        let labs: LabsConfig = config.try_deserialize()?;
        Ok(labs.labs)
    }

    /// 验证配置
    pub fn validate(&self) -> Result<()> {
        let global = self.load_global()?;
        let labs = self.load_labs()?;
        check(&global, &labs)
    }

    /// 加载、校验并构建设备注册表
    pub fn load_dashboard(&self) -> Result<Dashboard> {
        let global = self.load_global()?;
        let labs = self.load_labs()?;
        check(&global, &labs)?;

        let capacity = NonZeroUsize::new(global.dashboard.buffer_capacity)
            .ok_or_else(|| anyhow!("dashboard.buffer_capacity must be greater than 0"))?;

        let mut registry = DeviceRegistry::new();
        for lab in &labs {
            registry.register(lab.to_device(capacity))?;
        }

        info!(
            labs = registry.len(),
            buffer_capacity = capacity.get(),
            "Dashboard configuration loaded"
        );

        Ok(Dashboard { global, registry })
    }
}

fn check(global: &GlobalConfig, labs: &[LabConfig]) -> Result<()> {
    let errors = validate(global, labs);
    if !errors.is_empty() {
        let messages: Vec<String> = errors.iter().map(ToString::to_string).collect();
        return Err(anyhow!("Validation failed:\n{}", messages.join("\n")));
    }
    Ok(())
}
