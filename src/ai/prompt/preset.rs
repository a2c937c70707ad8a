//! Smart presets: project profile injected into every prompt

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Default reader of generated documents
pub const DEFAULT_AUDIENCE: &str = "AI Agents (Claude, Copilot, Cursor, Jules)";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ProjectType {
    WebFrontend,
    WebBackend,
    Mobile,
    Desktop,
    DataScience,
    DevOps,
    Library,
    #[default]
    Generic,
}

impl ProjectType {
    pub const ALL: [ProjectType; 8] = [
        ProjectType::WebFrontend,
        ProjectType::WebBackend,
        ProjectType::Mobile,
        ProjectType::Desktop,
        ProjectType::DataScience,
        ProjectType::DevOps,
        ProjectType::Library,
        ProjectType::Generic,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            ProjectType::WebFrontend => "web-frontend",
            ProjectType::WebBackend => "web-backend",
            ProjectType::Mobile => "mobile",
            ProjectType::Desktop => "desktop",
            ProjectType::DataScience => "data-science",
            ProjectType::DevOps => "devops",
            ProjectType::Library => "library",
            ProjectType::Generic => "generic",
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            ProjectType::WebFrontend => "Web Frontend",
            ProjectType::WebBackend => "Web Backend",
            ProjectType::Mobile => "Mobile App",
            ProjectType::Desktop => "Desktop App",
            ProjectType::DataScience => "Data Science",
            ProjectType::DevOps => "DevOps/Infra",
            ProjectType::Library => "Library/SDK",
            ProjectType::Generic => "Generic",
        }
    }

    /// Example technologies
    pub fn description(&self) -> &'static str {
        match self {
            ProjectType::WebFrontend => "React, Vue, Angular, HTML/CSS/JS",
            ProjectType::WebBackend => "REST API, GraphQL, microservices",
            ProjectType::Mobile => "React Native, Flutter, iOS, Android",
            ProjectType::Desktop => "Electron, PyQt, WPF, Swing",
            ProjectType::DataScience => "ML, analytics, Jupyter, Pandas",
            ProjectType::DevOps => "Docker, K8s, CI/CD, Terraform",
            ProjectType::Library => "Package, plugin, reusable module",
            ProjectType::Generic => "Generic or mixed project",
        }
    }
}

impl fmt::Display for ProjectType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ProjectType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let normalized = s.trim().to_lowercase().replace('_', "-");
        Self::ALL
            .into_iter()
            .find(|t| t.as_str() == normalized)
            .ok_or_else(|| {
                let valid: Vec<&str> = Self::ALL.iter().map(|t| t.as_str()).collect();
                format!(
                    "Invalid project type '{}'. Valid values: {}",
                    s,
                    valid.join(", ")
                )
            })
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FocusArea {
    Security,
    Performance,
    Testing,
    Maintainability,
    Documentation,
    Accessibility,
}

impl FocusArea {
    pub const ALL: [FocusArea; 6] = [
        FocusArea::Security,
        FocusArea::Performance,
        FocusArea::Testing,
        FocusArea::Maintainability,
        FocusArea::Documentation,
        FocusArea::Accessibility,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            FocusArea::Security => "security",
            FocusArea::Performance => "performance",
            FocusArea::Testing => "testing",
            FocusArea::Maintainability => "maintainability",
            FocusArea::Documentation => "documentation",
            FocusArea::Accessibility => "accessibility",
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            FocusArea::Security => "Security",
            FocusArea::Performance => "Performance",
            FocusArea::Testing => "Testing",
            FocusArea::Maintainability => "Maintainability",
            FocusArea::Documentation => "Documentation",
            FocusArea::Accessibility => "Accessibility",
        }
    }
}

impl fmt::Display for FocusArea {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for FocusArea {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let normalized = s.trim().to_lowercase();
        Self::ALL
            .into_iter()
            .find(|a| a.as_str() == normalized)
            .ok_or_else(|| {
                let valid: Vec<&str> = Self::ALL.iter().map(|a| a.as_str()).collect();
                format!("Invalid focus area '{}'. Valid values: {}", s, valid.join(", "))
            })
    }
}

/// User-selected profile of the project being documented
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SmartPreset {
    pub project_type: ProjectType,
    pub focus_areas: Vec<FocusArea>,
    pub target_audience: String,
    pub notes: String,
}

impl Default for SmartPreset {
    fn default() -> Self {
        Self {
            project_type: ProjectType::Generic,
            focus_areas: Vec::new(),
            target_audience: DEFAULT_AUDIENCE.to_string(),
            notes: String::new(),
        }
    }
}

impl SmartPreset {
    pub fn new(project_type: ProjectType) -> Self {
        Self {
            project_type,
            ..Default::default()
        }
    }

    pub fn with_focus(mut self, area: FocusArea) -> Self {
        if !self.focus_areas.contains(&area) {
            self.focus_areas.push(area);
        }
        self
    }

    pub fn with_notes(mut self, notes: impl Into<String>) -> Self {
        self.notes = notes.into();
        self
    }

    /// Lines injected under the project context header
    pub fn to_prompt_context(&self) -> String {
        let mut lines = vec![
            format!(
                "PROJECT TYPE: {} ({})",
                self.project_type.label(),
                self.project_type.description()
            ),
            "DETAIL LEVEL: EXHAUSTIVE - complete, in-depth coverage with many practical examples"
                .to_string(),
        ];

        if !self.focus_areas.is_empty() {
            let focus: Vec<&str> = self.focus_areas.iter().map(|a| a.label()).collect();
            lines.push(format!("MAIN FOCUS: {}", focus.join(", ")));
        }

        lines.push(format!("TARGET AUDIENCE: {}", self.target_audience));

        if !self.notes.trim().is_empty() {
            lines.push(format!("SPECIFIC NOTES: {}", self.notes));
        }

        lines.join("\n")
    }
}
