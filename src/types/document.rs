//! Document kinds that can be generated

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// A generated documentation artifact
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum DocumentKind {
    Architecture,
    Rules,
    Context,
    ApiDocs,
    Testing,
    Security,
    Onboarding,
    Database,
    Deployment,
    Dependencies,
    Performance,
}

impl DocumentKind {
    pub const ALL: [DocumentKind; 11] = [
        DocumentKind::Architecture,
        DocumentKind::Rules,
        DocumentKind::Context,
        DocumentKind::ApiDocs,
        DocumentKind::Testing,
        DocumentKind::Security,
        DocumentKind::Onboarding,
        DocumentKind::Database,
        DocumentKind::Deployment,
        DocumentKind::Dependencies,
        DocumentKind::Performance,
    ];

    /// Output file name
    pub fn file_name(&self) -> &'static str {
        match self {
            DocumentKind::Architecture => "AI_ARCHITECTURE.md",
            DocumentKind::Rules => "AI_RULES.md",
            DocumentKind::Context => "PROJECT_CONTEXT.md",
            DocumentKind::ApiDocs => "API_DOCUMENTATION.md",
            DocumentKind::Testing => "TESTING_GUIDE.md",
            DocumentKind::Security => "SECURITY_AUDIT.md",
            DocumentKind::Onboarding => "DEVELOPER_ONBOARDING.md",
            DocumentKind::Database => "DATABASE_SCHEMA.md",
            DocumentKind::Deployment => "DEPLOYMENT_GUIDE.md",
            DocumentKind::Dependencies => "DEPENDENCIES_ANALYSIS.md",
            DocumentKind::Performance => "PERFORMANCE_GUIDE.md",
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            DocumentKind::Architecture => "Architecture",
            DocumentKind::Rules => "Coding Rules",
            DocumentKind::Context => "Project Context",
            DocumentKind::ApiDocs => "API Documentation",
            DocumentKind::Testing => "Testing Guide",
            DocumentKind::Security => "Security Audit",
            DocumentKind::Onboarding => "Developer Onboarding",
            DocumentKind::Database => "Database Schema",
            DocumentKind::Deployment => "Deployment Guide",
            DocumentKind::Dependencies => "Dependency Analysis",
            DocumentKind::Performance => "Performance Guide",
        }
    }

    pub fn description(&self) -> &'static str {
        match self {
            DocumentKind::Architecture => {
                "Technology stack, directory layout, components, diagrams and dev setup"
            }
            DocumentKind::Rules => {
                "Naming conventions, mandatory patterns, file structure, do/don't lists"
            }
            DocumentKind::Context => {
                "Problem solved, target users, features, roadmap, glossary, integrations"
            }
            DocumentKind::ApiDocs => "Endpoints, parameters, request/response shapes, examples",
            DocumentKind::Testing => "Test strategy, environment setup, conventions, mocking, CI",
            DocumentKind::Security => "Authentication, secrets handling, OWASP Top 10, findings",
            DocumentKind::Onboarding => "Day-one setup, simplified architecture, workflow, FAQ",
            DocumentKind::Database => "ER schema, tables, relations, indexes, migrations",
            DocumentKind::Deployment => "Environments, configuration, CI/CD, rollback, monitoring",
            DocumentKind::Dependencies => "Libraries, versions, licenses, known vulnerabilities",
            DocumentKind::Performance => "Bottlenecks, optimizations, caching, profiling",
        }
    }

    /// Stable key used in custom prompt files
    pub fn key(&self) -> &'static str {
        match self {
            DocumentKind::Architecture => "ARCHITECTURE",
            DocumentKind::Rules => "RULES",
            DocumentKind::Context => "CONTEXT",
            DocumentKind::ApiDocs => "API_DOCS",
            DocumentKind::Testing => "TESTING",
            DocumentKind::Security => "SECURITY",
            DocumentKind::Onboarding => "ONBOARDING",
            DocumentKind::Database => "DATABASE",
            DocumentKind::Deployment => "DEPLOYMENT",
            DocumentKind::Dependencies => "DEPENDENCIES",
            DocumentKind::Performance => "PERFORMANCE",
        }
    }

    /// Kind whose output file is `file_name`, ignoring case
    pub fn from_file_name(file_name: &str) -> Option<Self> {
        Self::ALL
            .into_iter()
            .find(|k| k.file_name().eq_ignore_ascii_case(file_name))
    }
}

impl fmt::Display for DocumentKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl FromStr for DocumentKind {
    type Err = String;

    /// Accepts keys in any case, with `-` or `_` (`api-docs`, `API_DOCS`)
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let normalized = s.trim().replace('-', "_").to_ascii_uppercase();
        Self::ALL
            .into_iter()
            .find(|k| k.key() == normalized)
            .ok_or_else(|| {
                let valid: Vec<String> = Self::ALL
                    .iter()
                    .map(|k| k.key().to_lowercase().replace('_', "-"))
                    .collect();
                format!(
                    "Invalid document kind '{}'. Valid values: {}",
                    s,
                    valid.join(", ")
                )
            })
    }
}
