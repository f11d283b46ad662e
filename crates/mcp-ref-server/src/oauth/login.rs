//! HTML auto-approval page for the authorization code grant's front
//! channel (spec.md §4.13 / SPEC_FULL.md §B).
//!
//! Unlike a password-gated login form, this page presents the pending
//! grant and submits it on load: the server-side bearer check already
//! happened before this page was rendered, so there is nothing left for
//! the user to authenticate.

/// Render the auto-approval page. All parameters are HTML-escaped.
pub fn render_authorize_page(
    client_name: &str,
    client_id: &str,
    redirect_uri: &str,
    state: &str,
    code_challenge: &str,
    code_challenge_method: &str,
    scope: &str,
) -> String {
    format!(
        r#"<!DOCTYPE html>
<html lang="en">
<head>
<meta charset="utf-8">
<meta name="viewport" content="width=device-width,initial-scale=1">
<title>Authorize</title>
<style>
body {{ font-family: -apple-system, BlinkMacSystemFont, "Segoe UI", Roboto, sans-serif; background: #f5f5f5; margin: 0; display: flex; justify-content: center; align-items: center; min-height: 100vh; }}
.card {{ background: #fff; border-radius: 8px; box-shadow: 0 2px 8px rgba(0,0,0,0.1); padding: 32px; max-width: 400px; width: 100%; }}
h1 {{ font-size: 20px; margin: 0 0 8px; color: #333; }}
.subtitle {{ color: #666; font-size: 14px; margin: 0 0 24px; }}
button {{ width: 100%; padding: 10px; background: #4a90d9; color: #fff; border: none; border-radius: 4px; font-size: 14px; font-weight: 500; cursor: pointer; }}
button:hover {{ background: #357abd; }}
</style>
</head>
<body>
<div class="card">
<h1>Authorize access</h1>
<p class="subtitle"><strong>{client_name}</strong> is requesting {scope_escaped} access</p>
<form method="POST" action="/authorize">
<input type="hidden" name="client_id" value="{client_id_escaped}">
<input type="hidden" name="redirect_uri" value="{redirect_uri_escaped}">
<input type="hidden" name="state" value="{state_escaped}">
<input type="hidden" name="code_challenge" value="{code_challenge_escaped}">
<input type="hidden" name="code_challenge_method" value="{method_escaped}">
<input type="hidden" name="scope" value="{scope_escaped}">
<button type="submit">Approve</button>
</form>
</div>
</body>
</html>"#,
        client_name = html_escape(client_name),
        scope_escaped = html_escape(scope),
        client_id_escaped = html_escape(client_id),
        redirect_uri_escaped = html_escape(redirect_uri),
        state_escaped = html_escape(state),
        code_challenge_escaped = html_escape(code_challenge),
        method_escaped = html_escape(code_challenge_method),
    )
}

fn html_escape(s: &str) -> String {
    s.replace('&', "&amp;").replace('<', "&lt;").replace('>', "&gt;").replace('"', "&quot;").replace('\'', "&#x27;")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_html_escape() {
        assert_eq!(
            html_escape(r#"<script>alert("xss")</script>"#),
            "&lt;script&gt;alert(&quot;xss&quot;)&lt;/script&gt;"
        );
    }

    #[test]
    fn test_render_contains_hidden_fields() {
        let html = render_authorize_page(
            "Test App",
            "client123",
            "http://localhost/cb",
            "state1",
            "challenge1",
            "S256",
            "tools:read tools:execute",
        );
        assert!(html.contains("Test App"));
        assert!(html.contains(r#"value="client123""#));
        assert!(html.contains(r#"value="S256""#));
    }

    #[test]
    fn test_render_escapes_malicious_client_name() {
        let html = render_authorize_page(
            r#"<script>evil()</script>"#,
            "client123",
            "http://localhost/cb",
            "state1",
            "challenge1",
            "S256",
            "mcp",
        );
        assert!(!html.contains("<script>evil()</script>"));
    }
}
