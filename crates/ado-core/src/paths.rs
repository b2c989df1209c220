use std::path::{Path, PathBuf};

pub const REPORT_SUFFIX: &str = "-Repos.csv";

pub fn report_path(output_dir: &Path, project: &str) -> PathBuf {
    output_dir.join(format!("{}{REPORT_SUFFIX}", sanitize_file_stem(project)))
}

fn sanitize_file_stem(name: &str) -> String {
    let mut sanitized: String = name
        .chars()
        .map(|ch| match ch {
            '/' | '\\' | ':' | '*' | '?' | '"' | '<' | '>' | '|' => '_',
            ch if ch.is_control() => '_',
            _ => ch,
        })
        .collect();
    while sanitized.ends_with('.') || sanitized.ends_with(' ') {
        sanitized.pop();
    }
    if sanitized.is_empty() {
        "_".to_string()
    } else {
        sanitized
    }
}
