//! Global Constants
//!
//! Centralized constants for scanning, estimation, pricing and generation.
//! All magic numbers should be defined here with documentation.

/// Directory scanning constants
pub mod scan {
    /// Maximum directory depth below the scan root (root is depth 0)
    pub const MAX_DEPTH: usize = 20;

    /// Maximum size of a single included file (bytes)
    pub const MAX_FILE_SIZE: u64 = 1_000_000;

    /// Characters-per-token factor used for the scan-time token estimate
    pub const TOKEN_FACTOR: u64 = 4;

    /// Emit a read progress update every N files
    pub const READ_PROGRESS_EVERY: usize = 5;

    /// Dot-files that are still scanned
    pub const ALLOWED_DOTFILES: &[&str] = &[".env.example"];

    /// Directory names never descended into
    pub const IGNORED_DIRS: &[&str] = &[
        ".git",
        ".svn",
        ".hg",
        "node_modules",
        "bower_components",
        "__pycache__",
        ".pytest_cache",
        ".mypy_cache",
        "venv",
        ".venv",
        "env",
        ".env",
        ".idea",
        ".vscode",
        ".vs",
        "dist",
        "build",
        "out",
        "target",
        ".tox",
        ".nox",
        "htmlcov",
        ".coverage",
        "eggs",
        ".eggs",
        ".terraform",
        ".serverless",
        "vendor",
        "packages",
    ];

    /// Extensions (lowercase, with dot) eligible for the inventory
    pub const SUPPORTED_EXTENSIONS: &[&str] = &[
        ".py", ".js", ".ts", ".tsx", ".jsx", ".html", ".css", ".scss", ".sass", ".json", ".yaml",
        ".yml", ".toml", ".ini", ".cfg", ".java", ".kt", ".scala", ".cpp", ".c", ".h", ".hpp",
        ".go", ".rs", ".rb", ".php", ".swift", ".m", ".md", ".rst", ".txt", ".sql", ".graphql",
        ".proto", ".sh", ".bash", ".zsh", ".ps1", ".bat", ".cmd", ".xml", ".xsl", ".xslt", ".vue",
        ".svelte",
    ];
}

/// Existing documentation detection constants
pub mod artifacts {
    /// Content shorter than this (characters) is considered stale
    pub const STALE_MIN_CHARS: usize = 200;

    /// Subfolders searched in addition to the root
    pub const DOC_FOLDERS: &[&str] = &["docs", "doc", "documentation", "wiki"];

    /// Common project documents recognized in the root
    pub const COMMON_DOC_FILES: &[&str] = &[
        "README.md",
        "CHANGELOG.md",
        "CONTRIBUTING.md",
        "LICENSE.md",
        "ARCHITECTURE.md",
        "DOCS.md",
        "DOCUMENTATION.md",
        "API.md",
        "SECURITY.md",
        "TESTING.md",
        "DEPLOYMENT.md",
        "INSTALL.md",
    ];

    /// Lowercase markers that flag placeholder content
    pub const PLACEHOLDER_MARKERS: &[&str] = &[
        "todo:",
        "fixme:",
        "coming soon",
        "work in progress",
        "wip",
        "placeholder",
        "to be documented",
        "tbd",
        "[to complete]",
        "[inserisci",
        "[aggiungi",
        "[da completare",
    ];
}

/// Token estimation constants
pub mod estimation {
    /// Classification only looks at this many leading characters
    pub const CLASSIFY_PREFIX_CHARS: usize = 2000;

    /// Ratio used when a family has no dedicated entry
    pub const DEFAULT_RATIO: f64 = 4.0;

    /// Default expansion of generated output relative to input
    pub const DEFAULT_OUTPUT_MULTIPLIER: f64 = 1.5;

    /// Code-shape matches required to classify as code
    pub const CODE_MATCH_THRESHOLD: usize = 2;

    /// Markup matches required to classify as markdown
    pub const MARKDOWN_MATCH_THRESHOLD: usize = 2;

    /// Italian stop words required to classify as Italian prose
    pub const ITALIAN_MATCH_THRESHOLD: usize = 3;
}

/// Pricing constants
pub mod pricing {
    /// Registry entry used when a model id cannot be resolved
    pub const DEFAULT_MODEL: &str = "gemini-1.5-flash";

    /// Namespace prefix stripped from model ids
    pub const MODEL_PREFIX: &str = "models/";

    /// Tokens per pricing unit
    pub const TOKENS_PER_UNIT: f64 = 1_000_000.0;
}

/// Cost ledger constants
pub mod ledger {
    /// Maximum retained entries
    pub const MAX_ENTRIES: usize = 1000;

    /// Default number of entries shown by `history`
    pub const DEFAULT_RECENT: usize = 100;

    /// Default trailing window for spend totals (days)
    pub const DEFAULT_SPEND_DAYS: i64 = 30;
}

/// Generation orchestrator constants
pub mod generation {
    /// Maximum attempts per generation
    pub const MAX_ATTEMPTS: u32 = 3;

    /// Base delay for linear backoff (seconds)
    pub const BASE_DELAY_SECS: u64 = 2;

    /// Sampling temperature passed to the service
    pub const TEMPERATURE: f32 = 0.7;

    /// Output token cap passed to the service
    pub const MAX_OUTPUT_TOKENS: u32 = 8192;

    /// Maximum concurrent generations
    pub const MAX_WORKERS: usize = 2;

    /// Characters of an existing document quoted in the prompt
    pub const EXISTING_PREVIEW_CHARS: usize = 2000;
}

/// Model catalog cache constants
pub mod cache {
    /// Cache validity window (hours)
    pub const MODELS_CACHE_HOURS: i64 = 24;

    /// Sort priority for listed models (earlier prefix ranks first)
    pub const MODEL_PRIORITY: &[&str] =
        &["gemini-2.5", "gemini-2.0", "gemini-1.5-pro", "gemini-1.5-flash"];
}

/// HTTP/Network constants
pub mod network {
    /// Default request timeout (seconds)
    pub const DEFAULT_TIMEOUT_SECS: u64 = 300;

    /// Default Gemini REST endpoint
    pub const GEMINI_API_BASE: &str = "https://generativelanguage.googleapis.com/v1beta";
}
