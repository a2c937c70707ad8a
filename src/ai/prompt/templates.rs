//! Built-in prompt templates
//!
//! One instruction block per [`DocumentKind`], rendered from a title and an
//! ordered list of required sections.

use crate::types::DocumentKind;

/// Default system prompt shared by every document kind
pub const SYSTEM_PROMPT: &str = "\
You are a senior software architect specializing in context engineering for \
AI coding agents (Claude, GPT, Gemini, Copilot, Cursor, Jules, Windsurf).

Analyze the source code below and produce documentation that:
1. Lets other AI agents understand the project completely
2. Follows professional technical-writing standards
3. Is immediately usable without ambiguity
4. Is exhaustive and detailed

Ground rules:
- Write in clear professional English
- Use well-formed Markdown
- Include many practical code examples
- Be precise and specific, never generic
- Mark anything the code does not make clear as \"TO VERIFY\"
- Add Mermaid diagrams where they help
- Use tables to organize complex information";

struct Template {
    title: &'static str,
    sections: &'static [&'static str],
}

fn template(kind: DocumentKind) -> Template {
    match kind {
        DocumentKind::Architecture => Template {
            title: "EXHAUSTIVE ARCHITECTURE DOCUMENTATION",
            sections: &[
                "Executive Summary: project name, purpose, architecture style, strengths",
                "Technology Stack: table of category, technology, version, purpose, notes",
                "Directory Structure: every significant folder and its role",
                "Core Components: responsibilities, dependencies and patterns of each module",
                "Architecture Diagrams (Mermaid): component graph and key sequences",
                "Data Flow: every main flow end to end",
                "Configuration and Environment: variables, config files, secrets",
                "Development Setup: exact commands to clone, install, configure, run",
                "Build and Deploy: build process, environments, CI/CD",
                "Architecture Decisions: table of decision, rationale, alternatives",
            ],
        },
        DocumentKind::Rules => Template {
            title: "EXHAUSTIVE CODING RULES",
            sections: &[
                "Code Philosophy: principles visible in the codebase",
                "Naming Conventions: files, types, functions, variables, constants",
                "Standard File Structure: canonical layout with an example",
                "Mandatory Patterns: error handling, logging, configuration, async",
                "Forbidden Patterns: anti-patterns with corrected examples",
                "Imports and Dependencies: ordering and allowed libraries",
                "Testing Rules: placement, naming, fixtures",
                "Do / Don't Checklist for AI agents editing this code",
            ],
        },
        DocumentKind::Context => Template {
            title: "EXHAUSTIVE PROJECT CONTEXT",
            sections: &[
                "Executive Summary",
                "Problem and Solution",
                "Target Users (personas)",
                "Features: implemented, partial, planned",
                "Domain Glossary",
                "External Integrations",
                "Constraints and Assumptions",
                "Roadmap hints found in the code",
            ],
        },
        DocumentKind::ApiDocs => Template {
            title: "EXHAUSTIVE API DOCUMENTATION",
            sections: &[
                "API Overview: base URLs, versioning, authentication",
                "Endpoints: method, path, parameters, request and response bodies",
                "Data Models (schemas)",
                "Error Responses: codes and shapes",
                "Examples: curl and client snippets for each endpoint",
                "Rate Limits and Pagination",
            ],
        },
        DocumentKind::Testing => Template {
            title: "EXHAUSTIVE TESTING GUIDE",
            sections: &[
                "Test Strategy: levels and coverage goals",
                "Test Environment Setup",
                "Test Directory Structure",
                "Conventions: naming, fixtures, assertions",
                "Mocking and Test Doubles",
                "Running Tests: commands and filters",
                "CI Integration",
                "Gaps: untested areas worth covering",
            ],
        },
        DocumentKind::Security => Template {
            title: "EXHAUSTIVE SECURITY AUDIT",
            sections: &[
                "Executive Summary with overall risk level",
                "Authentication and Authorization",
                "Secrets Management",
                "Input Validation and Injection risks",
                "OWASP Top 10 review",
                "Dependency risks",
                "Findings: table of severity, location, description, remediation",
            ],
        },
        DocumentKind::Onboarding => Template {
            title: "EXHAUSTIVE DEVELOPER ONBOARDING GUIDE",
            sections: &[
                "Welcome and Project Overview",
                "Day-One Setup: prerequisites and exact commands",
                "Simplified Architecture",
                "Codebase Tour: where to find what",
                "Development Workflow: branches, reviews, releases",
                "First Tasks: good starter changes",
                "FAQ and Troubleshooting",
            ],
        },
        DocumentKind::Database => Template {
            title: "EXHAUSTIVE DATABASE DOCUMENTATION",
            sections: &[
                "Database Overview: engines and access layers",
                "ER Schema (Mermaid)",
                "Tables and Collections: columns, types, constraints",
                "Relations",
                "Indexes and Query Patterns",
                "Migrations and Seeding",
                "Backup and Data Retention",
            ],
        },
        DocumentKind::Deployment => Template {
            title: "EXHAUSTIVE DEPLOYMENT GUIDE",
            sections: &[
                "Environments",
                "Infrastructure Prerequisites",
                "Per-Environment Configuration",
                "Build and Release Steps",
                "CI/CD Pipeline",
                "Rollback Procedure",
                "Monitoring and Alerting",
            ],
        },
        DocumentKind::Dependencies => Template {
            title: "EXHAUSTIVE DEPENDENCY ANALYSIS",
            sections: &[
                "Dependency Overview",
                "Runtime Dependencies: table of name, version, purpose, license",
                "Development Dependencies",
                "Outdated or Deprecated Packages",
                "Known Vulnerabilities",
                "Upgrade Recommendations",
            ],
        },
        DocumentKind::Performance => Template {
            title: "EXHAUSTIVE PERFORMANCE GUIDE",
            sections: &[
                "Performance Overview",
                "Identified Bottlenecks",
                "Code Optimizations with before/after examples",
                "Caching Strategy",
                "Database and I/O Performance",
                "Profiling and Benchmarking",
                "Scalability Considerations",
            ],
        },
    }
}

/// Render the built-in instruction block for `kind`
pub fn default_instructions(kind: DocumentKind) -> String {
    let t = template(kind);
    let mut out = format!(
        "## GENERATE: {} - {}\n\nCreate complete, detailed documentation covering:\n",
        kind.file_name(),
        t.title
    );
    for (i, section) in t.sections.iter().enumerate() {
        out.push_str(&format!("\n### {}. {}", i + 1, section));
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_every_kind_has_instructions() {
        for kind in DocumentKind::ALL {
            let text = default_instructions(kind);
            assert!(text.starts_with(&format!("## GENERATE: {}", kind.file_name())));
            assert!(text.contains("### 1. "));
        }
    }

    #[test]
    fn test_sections_numbered_in_order() {
        let text = default_instructions(DocumentKind::Security);
        let first = text.find("### 1. Executive Summary").unwrap();
        let last = text.find("### 7. Findings").unwrap();
        assert!(first < last);
    }
}
