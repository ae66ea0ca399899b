/// Patterns ignored by default (`ignore.useDefaultPatterns`). Mirrors the
/// industry-standard ignore list: VCS internals, dependency dirs, build
/// output, lock files, caches, and OS/editor cruft.
pub const DEFAULT_IGNORE_PATTERNS: &[&str] = &[
    // VCS
    ".git/**",
    ".hg/**",
    ".svn/**",
    ".gitignore",
    ".gitattributes",
    ".gitmodules",
    ".hgignore",
    // Dependencies
    "node_modules/**",
    "bower_components/**",
    "vendor/**",
    "jspm_packages/**",
    // Build output
    "target/**",
    "dist/**",
    "build/**",
    "out/**",
    ".next/**",
    ".nuxt/**",
    ".output/**",
    "__pycache__/**",
    "*.pyc",
    "*.pyo",
    ".gradle/**",
    "*.egg-info/**",
    ".eggs/**",
    // Caches and environments
    ".cache/**",
    ".sass-cache/**",
    ".pytest_cache/**",
    ".mypy_cache/**",
    ".ruff_cache/**",
    ".tox/**",
    ".venv/**",
    "venv/**",
    "coverage/**",
    ".nyc_output/**",
    // Lock files
    "package-lock.json",
    "yarn.lock",
    "pnpm-lock.yaml",
    "bun.lockb",
    "bun.lock",
    "Cargo.lock",
    "Gemfile.lock",
    "composer.lock",
    "poetry.lock",
    "uv.lock",
    "Pipfile.lock",
    "flake.lock",
    "go.sum",
    // Generated / minified
    "*.min.js",
    "*.min.css",
    "*.map",
    "*.bundle.js",
    // Logs and temp files
    "logs/**",
    "*.log",
    "tmp/**",
    "temp/**",
    "*.tmp",
    // OS / editor cruft
    ".DS_Store",
    "Thumbs.db",
    ".idea/**",
    ".vscode/**",
    "*.swp",
    "*.swo",
    "*~",
];

/// Extensions never read as text, checked before any bytes are touched.
pub const BINARY_EXTENSIONS: &[&str] = &[
    // Images
    "png", "jpg", "jpeg", "gif", "ico", "icns", "webp", "bmp", "tiff", "tif", "heic", "avif",
    "psd",
    // Audio / video
    "mp3", "mp4", "m4a", "wav", "flac", "ogg", "avi", "mov", "mkv", "webm", "wmv",
    // Fonts
    "woff", "woff2", "ttf", "otf", "eot",
    // Archives
    "zip", "tar", "gz", "tgz", "bz2", "xz", "zst", "7z", "rar",
    // Executables / objects
    "exe", "dll", "so", "dylib", "o", "a", "lib", "obj", "bin", "class", "jar", "war", "wasm",
    "pyc", "pyd",
    // Documents
    "pdf", "doc", "docx", "xls", "xlsx", "ppt", "pptx",
    // Data stores
    "sqlite", "sqlite3", "db", "mdb", "iso", "dmg", "pkg", "deb", "rpm",
];

/// Returns `true` when the file extension is on the binary list.
pub fn has_binary_extension(path: &str) -> bool {
    std::path::Path::new(path)
        .extension()
        .and_then(|e| e.to_str())
        .is_some_and(|ext| {
            let lower = ext.to_ascii_lowercase();
            BINARY_EXTENSIONS.contains(&lower.as_str())
        })
}
