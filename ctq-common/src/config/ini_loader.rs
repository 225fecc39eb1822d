use std::str::FromStr;

use anyhow::bail;
use configparser::ini::Ini;

use crate::error::Error;

pub struct IniLoader {
    pub ini: Ini,
}

impl IniLoader {
    pub fn new(ini_file: &str) -> anyhow::Result<Self> {
        let mut ini = Ini::new();
        if let Err(error) = ini.load(ini_file) {
            bail!(Error::ConfigError(format!(
                "failed to load [{}]: {}",
                ini_file, error
            )));
        }
        Ok(Self { ini })
    }

    pub fn read(content: &str) -> anyhow::Result<Self> {
        let mut ini = Ini::new();
        if let Err(error) = ini.read(content.to_string()) {
            bail!(Error::ConfigError(format!(
                "failed to parse ini content: {}",
                error
            )));
        }
        Ok(Self { ini })
    }

    pub fn get_required<T: FromStr>(&self, section: &str, key: &str) -> anyhow::Result<T> {
        match self.ini.get(section, key) {
            Some(value) => Self::parse_value(section, key, &value),
            None => bail!(Error::ConfigError(format!(
                "missing required config: [{}].{}",
                section, key
            ))),
        }
    }

    pub fn get_optional<T: Default + FromStr>(&self, section: &str, key: &str) -> T {
        self.ini
            .get(section, key)
            .and_then(|value| value.trim().parse().ok())
            .unwrap_or_default()
    }

    pub fn get_with_default<T: FromStr>(&self, section: &str, key: &str, default: T) -> T {
        self.ini
            .get(section, key)
            .and_then(|value| value.trim().parse().ok())
            .unwrap_or(default)
    }

    fn parse_value<T: FromStr>(section: &str, key: &str, value: &str) -> anyhow::Result<T> {
        match value.trim().parse::<T>() {
            Ok(parsed) => Ok(parsed),
            Err(_) => bail!(Error::ConfigError(format!(
                "invalid value for [{}].{}: {}",
                section, key, value
            ))),
        }
    }
}
