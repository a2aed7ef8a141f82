use std::collections::BTreeSet;
use std::fmt;
use std::str::FromStr;

use crate::error::{ConfigError, optional, parsed_or};

pub const DEFAULT_MAX_UPLOAD_BYTES: usize = 10 * 1024 * 1024;

/// Resource services that can be mounted by one process.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Service {
    Attendance,
    Courses,
    Directors,
    Grades,
    Students,
    Teachers,
}

impl Service {
    pub const ALL: [Service; 6] = [
        Service::Attendance,
        Service::Courses,
        Service::Directors,
        Service::Grades,
        Service::Students,
        Service::Teachers,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            Service::Attendance => "attendance",
            Service::Courses => "courses",
            Service::Directors => "directors",
            Service::Grades => "grades",
            Service::Students => "students",
            Service::Teachers => "teachers",
        }
    }
}

impl fmt::Display for Service {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Service {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Service::ALL
            .into_iter()
            .find(|svc| svc.as_str().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| ConfigError::Invalid {
                name: "ENABLED_SERVICES",
                value: s.to_string(),
            })
    }
}

#[derive(Clone, Debug)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    pub metrics_port: u16,
    /// Reported by the health endpoints and attached to traces.
    pub service_name: String,
    pub enabled_services: BTreeSet<Service>,
    pub max_upload_bytes: usize,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 5000,
            metrics_port: 9090,
            service_name: "aula-api".to_string(),
            enabled_services: Service::ALL.into_iter().collect(),
            max_upload_bytes: DEFAULT_MAX_UPLOAD_BYTES,
        }
    }
}

impl ServerConfig {
    /// Loads server settings. `ENABLED_SERVICES` is a comma separated list
    /// such as `students,teachers`; unset or `all` mounts every service.
    pub fn from_env() -> Result<Self, ConfigError> {
        let defaults = Self::default();
        let enabled_services = match optional("ENABLED_SERVICES") {
            Some(list) if !list.eq_ignore_ascii_case("all") => parse_services(&list)?,
            _ => defaults.enabled_services,
        };

        Ok(Self {
            host: optional("HOST").unwrap_or(defaults.host),
            port: parsed_or("PORT", defaults.port),
            metrics_port: parsed_or("METRICS_PORT", defaults.metrics_port),
            service_name: optional("SERVICE_NAME").unwrap_or(defaults.service_name),
            enabled_services,
            max_upload_bytes: parsed_or("MAX_UPLOAD_BYTES", defaults.max_upload_bytes),
        })
    }

    pub fn is_enabled(&self, service: Service) -> bool {
        self.enabled_services.contains(&service)
    }

    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

pub fn parse_services(list: &str) -> Result<BTreeSet<Service>, ConfigError> {
    list.split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(Service::from_str)
        .collect()
}
