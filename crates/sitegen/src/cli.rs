//! CLI command helpers
//!
//! Error type, output formatting (tables or JSON) and prompt parsing for the
//! non-interactive commands.

use comfy_table::{Cell, Color, ContentArrangement, Row, Table};
use serde_json::json;
use sitegen_core::{format_tokens, CoreError, Session, TokenPackage};
use sitegen_types::{GenerationPlan, WebsiteArtifact};

// ============================================================================
// Error Types
// ============================================================================

#[derive(Debug)]
pub enum CliError {
    Cancelled,
    NotSignedIn,
    Core(CoreError),
    Other(anyhow::Error),
}

impl CliError {
    /// Follow-up command to suggest after the error message
    pub fn suggestion(&self) -> Option<String> {
        match self {
            CliError::NotSignedIn => {
                Some("Run 'sitegen login --id-token <TOKEN>' first".to_string())
            }
            CliError::Core(e) => e.suggestion(),
            _ => None,
        }
    }
}

impl std::fmt::Display for CliError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            CliError::Cancelled => write!(f, "Cancelled"),
            CliError::NotSignedIn => write!(f, "Not signed in"),
            CliError::Core(e) => write!(f, "{}", e),
            CliError::Other(e) => write!(f, "{:#}", e),
        }
    }
}

impl std::error::Error for CliError {}

impl From<CoreError> for CliError {
    fn from(e: CoreError) -> Self {
        CliError::Core(e)
    }
}

impl From<anyhow::Error> for CliError {
    fn from(e: anyhow::Error) -> Self {
        CliError::Other(e)
    }
}

// ============================================================================
// Prompts
// ============================================================================

/// Interpret an answer to a `[Y/n]` question; empty means yes
pub fn parse_confirmation(answer: &str) -> bool {
    matches!(
        answer.trim().to_ascii_lowercase().as_str(),
        "" | "y" | "yes"
    )
}

// ============================================================================
// Formatting
// ============================================================================

fn header(table: &mut Table, labels: &[&str], no_color: bool) {
    if no_color {
        table.set_header(labels.to_vec());
    } else {
        table.set_header(
            labels
                .iter()
                .map(|l| Cell::new(l).fg(Color::Cyan))
                .collect::<Vec<_>>(),
        );
    }
}

/// Token packages (human table or JSON)
pub fn format_packages_table(packages: &[TokenPackage], json: bool, no_color: bool) -> String {
    if json {
        let items: Vec<_> = packages
            .iter()
            .map(|p| {
                json!({
                    "id": p.id,
                    "name": p.name,
                    "tokens": p.tokens,
                    "displayTokens": p.display_tokens(),
                    "features": p.features,
                    "popular": p.popular,
                })
            })
            .collect();
        return serde_json::to_string_pretty(&items).unwrap_or_else(|_| "[]".to_string());
    }

    let mut table = Table::new();
    table.set_content_arrangement(ContentArrangement::Dynamic);
    header(&mut table, &["ID", "Package", "Tokens", "Includes"], no_color);

    for package in packages {
        let name = if package.popular {
            format!("{} ★", package.name)
        } else {
            package.name.to_string()
        };
        let tokens = package.display_tokens();
        let features = package.features.join(", ");
        table.add_row(Row::from(vec![
            package.id,
            name.as_str(),
            tokens.as_str(),
            features.as_str(),
        ]));
    }

    table.to_string()
}

/// Design plan summary (human table or JSON)
pub fn format_plan(plan: &GenerationPlan, json: bool, no_color: bool) -> String {
    if json {
        return serde_json::to_string_pretty(plan).unwrap_or_else(|_| "{}".to_string());
    }

    let mut table = Table::new();
    table.set_content_arrangement(ContentArrangement::Dynamic);
    header(&mut table, &["Plan", ""], no_color);

    let colors = plan
        .colors()
        .map(|(name, code)| format!("{} {}", name, code))
        .collect::<Vec<_>>()
        .join("\n");
    let fonts = format!(
        "{} / {}",
        or_dash(plan.heading_font()),
        or_dash(plan.body_font())
    );
    let sections = plan
        .sections()
        .enumerate()
        .map(|(i, s)| format!("{}. {}", i + 1, s))
        .collect::<Vec<_>>()
        .join("\n");

    let rows = [
        ("Website type", or_dash(plan.website_type()).to_string()),
        ("Design style", or_dash(plan.design_style()).to_string()),
        ("Audience", or_dash(plan.target_audience()).to_string()),
        ("Colors", if colors.is_empty() { "-".to_string() } else { colors }),
        ("Fonts", fonts),
        (
            "Sections",
            if sections.is_empty() { "-".to_string() } else { sections },
        ),
    ];
    for (label, value) in rows {
        table.add_row(Row::from(vec![label.to_string(), value]));
    }

    table.to_string()
}

/// Signed-in account and balance (human or JSON)
pub fn format_account(session: &Session, balance: Option<u64>, json: bool) -> String {
    if json {
        let value = json!({
            "user": session.user,
            "tokenBalance": balance,
        });
        return serde_json::to_string_pretty(&value).unwrap_or_else(|_| "{}".to_string());
    }

    let mut lines = vec![];
    lines.push(format!("Name:     {}", session.user.display_name()));
    lines.push(format!("Email:    {}", or_dash(&session.user.email)));
    lines.push(format!("User ID:  {}", session.user.id));
    lines.push(format!(
        "Balance:  {}",
        balance
            .map(|b| format!("{} tokens", format_tokens(b)))
            .unwrap_or_else(|| "unknown".to_string())
    ));
    lines.join("\n")
}

/// Website summary for `show` (human or JSON)
pub fn format_website_info(artifact: &WebsiteArtifact, json: bool) -> String {
    if json {
        return serde_json::to_string_pretty(artifact).unwrap_or_else(|_| "{}".to_string());
    }

    let mut lines = vec![];
    lines.push(format!("Website ID:  {}", artifact.id));
    lines.push(format!("Preview:     /preview/{}", artifact.id));
    lines.push(format!(
        "Markup:      {} lines, {} bytes",
        artifact.line_count(),
        artifact.code_len()
    ));
    if let Some(plan) = &artifact.plan {
        lines.push(format!("Type:        {}", or_dash(plan.website_type())));
        lines.push(format!("Style:       {}", or_dash(plan.design_style())));
        lines.push(format!("Sections:    {}", plan.section_count()));
    }
    lines.join("\n")
}

fn or_dash(s: &str) -> &str {
    if s.trim().is_empty() {
        "-"
    } else {
        s
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use sitegen_core::TOKEN_PACKAGES;
    use sitegen_types::UserProfile;

    fn plan() -> GenerationPlan {
        GenerationPlan::from(json!({
            "websiteType": "Portfolio",
            "designStyle": "Minimal",
            "targetAudience": "Recruiters",
            "colorPalette": {"primary": "#1e40af"},
            "typography": {"headingFont": "Inter", "bodyFont": "Lora"},
            "sections": ["Hero", "Projects"],
            "layout": "grid",
        }))
    }

    fn session() -> Session {
        Session {
            token: "jwt".into(),
            user: UserProfile {
                id: "u1".into(),
                name: "Ada".into(),
                email: "ada@example.com".into(),
                picture: None,
            },
        }
    }

    #[test]
    fn test_parse_confirmation() {
        assert!(parse_confirmation(""));
        assert!(parse_confirmation("Y\n"));
        assert!(parse_confirmation(" yes "));
        assert!(!parse_confirmation("n"));
        assert!(!parse_confirmation("nope"));
    }

    #[test]
    fn test_packages_table_lists_every_package() {
        let out = format_packages_table(&TOKEN_PACKAGES, false, true);
        assert!(out.contains("starter"));
        assert!(out.contains("Professional ★"));
        assert!(out.contains("1000"));
        assert!(out.contains("Valid forever"));
    }

    #[test]
    fn test_packages_json() {
        let out = format_packages_table(&TOKEN_PACKAGES, true, false);
        let parsed: serde_json::Value = serde_json::from_str(&out).unwrap();
        let items = parsed.as_array().unwrap();
        assert_eq!(items.len(), 3);
        assert_eq!(items[1]["id"], "pro");
        assert_eq!(items[1]["tokens"], 500_000);
        assert_eq!(items[1]["popular"], true);
    }

    #[test]
    fn test_plan_table() {
        let out = format_plan(&plan(), false, true);
        assert!(out.contains("Portfolio"));
        assert!(out.contains("primary #1e40af"));
        assert!(out.contains("Inter / Lora"));
        assert!(out.contains("2. Projects"));
    }

    #[test]
    fn test_plan_table_blank_fields() {
        let out = format_plan(&GenerationPlan::default(), false, true);
        assert!(out.contains("- / -"));
    }

    #[test]
    fn test_plan_json_keeps_wire_names() {
        let out = format_plan(&plan(), true, false);
        assert!(out.contains("\"websiteType\": \"Portfolio\""));
        assert!(out.contains("\"layout\": \"grid\""));
    }

    #[test]
    fn test_account() {
        let out = format_account(&session(), Some(42_000), false);
        assert!(out.contains("Ada"));
        assert!(out.contains("42.0 tokens"));

        let out = format_account(&session(), None, false);
        assert!(out.contains("unknown"));

        let parsed: serde_json::Value =
            serde_json::from_str(&format_account(&session(), Some(42_000), true)).unwrap();
        assert_eq!(parsed["user"]["id"], "u1");
        assert_eq!(parsed["tokenBalance"], 42_000);
    }

    #[test]
    fn test_website_info() {
        let artifact = WebsiteArtifact::new("w1", "<html>\n<body></body>\n</html>", Some(plan()));
        let out = format_website_info(&artifact, false);
        assert!(out.contains("/preview/w1"));
        assert!(out.contains("3 lines"));
        assert!(out.contains("Sections:    2"));
    }

    #[test]
    fn test_cli_error_suggestions() {
        assert!(CliError::NotSignedIn.suggestion().is_some());
        assert!(CliError::Cancelled.suggestion().is_none());
        assert!(CliError::from(CoreError::AuthRequired).suggestion().is_some());
    }
}
