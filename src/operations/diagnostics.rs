//! `test` operation: reports deployment identity and table configuration

use chrono::{SecondsFormat, Utc};
use serde::Serialize;
use std::collections::{BTreeMap, BTreeSet};

use crate::config::{AppConfig, TablesConfig};
use crate::router::{Data, HandlerResult};

pub const OPERATIONAL_MESSAGE: &str = "Centralized API is operational";

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum TableState {
    Configured,
    NotConfigured,
}

#[derive(Debug, Clone, Serialize)]
pub struct TableStatus {
    pub status: TableState,
    pub name: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct DiagnosticsReport {
    pub message: &'static str,
    pub timestamp: String,
    pub data_received: Data,
    pub function: String,
    pub region: String,
    pub environment: String,
    pub version: String,
    pub api_version: String,
    pub tables: BTreeMap<String, TableStatus>,
    pub warnings: Vec<String>,
    pub messages: Vec<String>,
}

/// Snapshot of the configuration the report is built from
#[derive(Debug, Clone)]
pub struct Diagnostics {
    app: AppConfig,
    tables: TablesConfig,
}

impl Diagnostics {
    pub fn new(app: &AppConfig, tables: &TablesConfig) -> Self {
        Self {
            app: app.clone(),
            tables: tables.clone(),
        }
    }

    pub fn report(&self, data: Data) -> DiagnosticsReport {
        let mut tables = BTreeMap::new();
        let mut warnings = Vec::new();
        let mut messages = Vec::new();

        let mut names: Vec<(&String, &String)> = self.tables.names.iter().collect();
        names.sort_unstable();

        for (key, name) in names {
            let key = key.to_ascii_lowercase();
            if name.trim().is_empty() {
                tables.insert(key, not_configured());
                continue;
            }
            messages.push(format!("Table {key} is configured"));
            tables.insert(
                key,
                TableStatus {
                    status: TableState::Configured,
                    name: Some(name.clone()),
                },
            );
        }

        let mut missing_required = BTreeSet::new();
        for required in &self.tables.required {
            let key = required.to_ascii_lowercase();
            let configured = tables
                .get(&key)
                .is_some_and(|t| t.status == TableState::Configured);
            if !configured {
                warnings.push(format!("Required table {key} is not configured"));
                tables.insert(key.clone(), not_configured());
                missing_required.insert(key);
            }
        }

        // Optional tables without a name are informational only
        for (key, table) in &tables {
            if table.status == TableState::NotConfigured && !missing_required.contains(key) {
                messages.push(format!("Table {key} is not configured"));
            }
        }

        DiagnosticsReport {
            message: OPERATIONAL_MESSAGE,
            timestamp: Utc::now().to_rfc3339_opts(SecondsFormat::Millis, true),
            data_received: data,
            function: self.app.name.clone(),
            region: self.app.region.clone(),
            environment: self.app.environment.clone(),
            version: self.app.version.clone(),
            api_version: self.app.api_version.clone(),
            tables,
            warnings,
            messages,
        }
    }

    pub fn report_value(&self, data: Data) -> HandlerResult {
        super::to_handler_value(&self.report(data))
    }
}

const fn not_configured() -> TableStatus {
    TableStatus {
        status: TableState::NotConfigured,
        name: None,
    }
}
