use crate::endpoint::EndpointDoc;
use crate::error::Result;
use log::debug;
use std::fs;
use std::path::Path;

/// Renders the endpoint documents as a pretty-printed JSON array.
///
/// Serialization preserves document order and the per-document key order, so
/// the output is byte-stable across runs over the same sources.
pub fn emit_json(endpoints: &[EndpointDoc]) -> Result<String> {
    let json = serde_json::to_string_pretty(endpoints)?;
    Ok(json)
}

/// Renders the endpoint documents as a Markdown reference grouped by
/// controller.
///
/// Controllers appear in first-seen order; within a group, endpoints keep
/// their document order. Each endpoint becomes a `### VERB \`route\``
/// heading, a description line built from the summary (with the longer
/// description text, when declared, as a follow-up paragraph), and a
/// horizontal rule.
pub fn emit_markdown(endpoints: &[EndpointDoc]) -> String {
    let mut markdown = String::from("# API Documentation\n\n");

    let mut controllers: Vec<&str> = Vec::new();
    for endpoint in endpoints {
        if !controllers.contains(&endpoint.controller.as_str()) {
            controllers.push(&endpoint.controller);
        }
    }

    for controller in controllers {
        markdown.push_str(&format!("## {}\n\n", controller));

        for endpoint in endpoints.iter().filter(|e| e.controller == controller) {
            markdown.push_str(&format!(
                "### {} `{}`\n\n",
                endpoint.method.as_str(),
                endpoint.route
            ));
            if !endpoint.summary.is_empty() {
                markdown.push_str(&format!("**Description:** {}\n\n", endpoint.summary));
            }
            if let Some(description) = &endpoint.description {
                markdown.push_str(&format!("{}\n\n", description));
            }
            markdown.push_str("---\n\n");
        }
    }

    markdown
}

/// Writes rendered content to a file, creating parent directories as needed.
pub fn write_to_file(content: &str, path: &Path) -> Result<()> {
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            fs::create_dir_all(parent)?;
        }
    }

    fs::write(path, content)?;
    debug!("Wrote {} bytes to {}", content.len(), path.display());
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::decorator::HttpVerb;
    use crate::endpoint::ResponseDoc;
    use pretty_assertions::assert_eq;
    use tempfile::TempDir;

    fn endpoint(controller: &str, verb: HttpVerb, route: &str, summary: &str) -> EndpointDoc {
        EndpointDoc {
            method: verb,
            route: route.to_string(),
            summary: summary.to_string(),
            description: None,
            request_body: None,
            response: None,
            error_responses: Vec::new(),
            controller: controller.to_string(),
        }
    }

    #[test]
    fn test_json_shape() {
        let mut doc = endpoint("PostsController", HttpVerb::Post, "posts", "Create a post");
        doc.response = Some(ResponseDoc {
            status: 201,
            description: "Created.".to_string(),
            schema: None,
        });
        doc.error_responses.push(ResponseDoc {
            status: 400,
            description: "Bad Request.".to_string(),
            schema: None,
        });

        let json = emit_json(&[doc]).unwrap();
        let parsed: serde_json::Value = serde_json::from_str(&json).unwrap();

        assert_eq!(parsed[0]["method"], "POST");
        assert_eq!(parsed[0]["route"], "posts");
        assert_eq!(parsed[0]["response"]["status"], 201);
        assert_eq!(parsed[0]["errorResponses"][0]["status"], 400);
        // Absent optionals are omitted, not null
        assert!(parsed[0].get("requestBody").is_none());
        assert!(parsed[0].get("controller").is_none());
        // Pretty-printed with 2-space indentation
        assert!(json.contains("\n  {"));
    }

    #[test]
    fn test_json_empty_project() {
        assert_eq!(emit_json(&[]).unwrap(), "[]");
    }

    #[test]
    fn test_json_is_idempotent() {
        let docs = vec![
            endpoint("A", HttpVerb::Get, "a", "First"),
            endpoint("B", HttpVerb::Delete, "b/:id", ""),
        ];

        assert_eq!(emit_json(&docs).unwrap(), emit_json(&docs).unwrap());
    }

    #[test]
    fn test_markdown_groups_by_controller() {
        let docs = vec![
            endpoint("CategoriesController", HttpVerb::Get, "categories", "List them"),
            endpoint("PostsController", HttpVerb::Post, "posts", "Create a post"),
            endpoint(
                "CategoriesController",
                HttpVerb::Get,
                "categories/:id",
                "Get one",
            ),
        ];

        let markdown = emit_markdown(&docs);

        let expected = "\
# API Documentation

## CategoriesController

### GET `categories`

**Description:** List them

---

### GET `categories/:id`

**Description:** Get one

---

## PostsController

### POST `posts`

**Description:** Create a post

---

";
        assert_eq!(markdown, expected);
    }

    #[test]
    fn test_markdown_renders_long_description() {
        let mut doc = endpoint("PostsController", HttpVerb::Get, "posts", "List posts");
        doc.description = Some("Returns every post, newest first.".to_string());

        let markdown = emit_markdown(&[doc]);
        assert!(markdown.contains(
            "**Description:** List posts\n\nReturns every post, newest first.\n\n---\n\n"
        ));
    }

    #[test]
    fn test_markdown_omits_empty_description() {
        let markdown = emit_markdown(&[endpoint("AppController", HttpVerb::Get, "health", "")]);

        assert!(markdown.contains("### GET `health`\n\n---\n\n"));
        assert!(!markdown.contains("**Description:**"));
    }

    #[test]
    fn test_write_creates_parent_directories() {
        let temp_dir = TempDir::new().unwrap();
        let target = temp_dir.path().join("docs/api-docs.json");

        write_to_file("[]", &target).unwrap();

        assert_eq!(fs::read_to_string(&target).unwrap(), "[]");
    }
}
