//! Greeting text rendered by `GET /`.

/// Name used when no record matches the requested id.
pub const DEFAULT_NAME: &str = "World";

/// How a stored record with a NULL name is rendered.
pub const NULL_NAME: &str = "null";

/// Render the greeting for a name.
///
/// The trailing newline is part of the response body.
pub fn render_greeting(name: &str) -> String {
    format!("Hello {name}!\n")
}

/// Display form of a nullable `name` column.
pub fn display_name(name: Option<&str>) -> &str {
    name.unwrap_or(NULL_NAME)
}
