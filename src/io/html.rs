//! Standalone HTML pages that render figures with Plotly from the CDN.
//!
//! Figure JSON is embedded directly in a `<script>` block. It stays valid
//! JavaScript while `<`, `>`, `&`, U+2028 and U+2029 are written as `\uXXXX`
//! escapes, so a label can never close the script element.

use std::path::{Path, PathBuf};

use tracing::info;

use crate::chart::Figure;
use crate::error::AppError;
use crate::io::write::{safe_write, sanitize_filename};

pub const PLOTLY_CDN: &str = "https://cdn.plot.ly/plotly-latest.min.js";

const CSP: &str = "default-src 'self' https://cdn.plot.ly; script-src 'self' 'unsafe-inline' https://cdn.plot.ly; style-src 'self' 'unsafe-inline'";

/// Serialize `figure` for embedding inside `<script>`.
pub fn script_safe_json(figure: &Figure) -> Result<String, AppError> {
    Ok(escape_script_json(&figure.to_json()?))
}

/// Escape characters that could end a script block or break JS parsing.
pub fn escape_script_json(json: &str) -> String {
    let mut out = String::with_capacity(json.len());
    for c in json.chars() {
        match c {
            '<' => out.push_str("\\u003c"),
            '>' => out.push_str("\\u003e"),
            '&' => out.push_str("\\u0026"),
            '\u{2028}' => out.push_str("\\u2028"),
            '\u{2029}' => out.push_str("\\u2029"),
            _ => out.push(c),
        }
    }
    out
}

/// `text` as a double-quoted JavaScript string literal, safe inside `<script>`.
pub fn js_string(text: &str) -> Result<String, AppError> {
    let quoted = serde_json::to_string(text)
        .map_err(|e| AppError::io(format!("Failed to encode script string: {e}")))?;
    Ok(escape_script_json(&quoted))
}

/// Minimal escaping for text placed in element content or attributes.
pub fn escape_html(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#x27;"),
            _ => out.push(c),
        }
    }
    out
}

fn head(title: &str, style: &str) -> String {
    format!(
        r#"<!DOCTYPE html>
<html>
<head>
    <meta charset="UTF-8">
    <meta http-equiv="Content-Security-Policy" content="{CSP}">
    <meta http-equiv="X-Content-Type-Options" content="nosniff">
    <meta http-equiv="X-Frame-Options" content="DENY">
    <title>{title}</title>
    <script src="{PLOTLY_CDN}"></script>
    <style>
{style}
    </style>
</head>
"#,
        title = escape_html(title),
    )
}

const DASHBOARD_STYLE: &str = r#"        body {
            font-family: Arial, sans-serif;
            margin: 20px;
            background-color: #f8f9fa;
        }
        .container {
            max-width: 1400px;
            margin: 0 auto;
            background: white;
            padding: 20px;
            border-radius: 10px;
            box-shadow: 0 4px 6px rgba(0, 0, 0, 0.1);
        }
        .header {
            text-align: center;
            margin-bottom: 30px;
            color: #2C3E50;
        }"#;

/// Single-figure dashboard page.
pub fn render_dashboard_page(name: &str, figure: &Figure) -> Result<String, AppError> {
    let payload = script_safe_json(figure)?;
    let mut html = head(&format!("Development Economics Analysis - {name}"), DASHBOARD_STYLE);
    html.push_str(&format!(
        r#"<body>
    <div class="container">
        <div class="header">
            <h1>Development Economics Policy Analysis</h1>
            <p><em>Evidence-based insights for poverty reduction</em></p>
        </div>
        <div id="plotly-div" style="width:100%;height:800px;"></div>
    </div>

    <script>
        var plotly_data = {payload};
        Plotly.newPlot('plotly-div', plotly_data.data, plotly_data.layout, {{responsive: true}});
    </script>
</body>
</html>
"#
    ));
    Ok(html)
}

/// One chart section of the multi-figure page.
pub struct Panel<'a> {
    /// Anchor id of the section, also used by the navigation links.
    pub anchor: &'a str,
    pub chart_id: &'a str,
    pub nav_label: &'a str,
    pub title: &'a str,
    pub height_px: u32,
    pub caption: &'a str,
    /// Extra Plotly config entries, as a JS object body.
    pub plot_config: &'a str,
    pub figure: &'a Figure,
}

const MULTI_STYLE: &str = r#"        body {
            font-family: 'Arial', sans-serif;
            margin: 0;
            padding: 20px;
            background: linear-gradient(135deg, #667eea 0%, #764ba2 100%);
            min-height: 100vh;
        }
        .container {
            max-width: 1400px;
            margin: 0 auto;
            background: white;
            border-radius: 15px;
            padding: 30px;
            box-shadow: 0 10px 30px rgba(0,0,0,0.2);
        }
        .header {
            text-align: center;
            margin-bottom: 40px;
            padding: 20px;
            background: linear-gradient(135deg, #2C3E50 0%, #34495E 100%);
            color: white;
            border-radius: 10px;
        }
        .dashboard-grid {
            display: grid;
            grid-template-columns: 1fr;
            gap: 30px;
            margin-top: 30px;
        }
        .chart-container {
            background: #f8f9fa;
            border-radius: 10px;
            padding: 20px;
            box-shadow: 0 4px 15px rgba(0,0,0,0.1);
        }
        .chart-title {
            font-size: 1.4em;
            font-weight: bold;
            margin-bottom: 15px;
            color: #2C3E50;
            text-align: center;
        }
        .insights-panel {
            background: linear-gradient(135deg, #e8f4fd 0%, #f0f8ff 100%);
            padding: 25px;
            border-radius: 10px;
            border-left: 5px solid #667eea;
            margin: 20px 0;
        }
        .navigation-controls {
            position: fixed;
            top: 20px;
            right: 20px;
            background: white;
            padding: 15px;
            border-radius: 10px;
            box-shadow: 0 4px 15px rgba(0,0,0,0.2);
            z-index: 1000;
        }
        .nav-button {
            display: block;
            margin: 5px 0;
            padding: 8px 16px;
            background: #667eea;
            color: white;
            text-decoration: none;
            border-radius: 5px;
            text-align: center;
            transition: background 0.3s;
        }
        .nav-button:hover {
            background: #5a67d8;
        }
        @media (max-width: 768px) {
            .container { padding: 15px; }
            .navigation-controls { position: static; margin-bottom: 20px; }
        }"#;

/// Multi-figure page with a floating section navigator.
pub fn render_multi_chart_page(title: &str, subtitle: &str, intro: &str, panels: &[Panel<'_>]) -> Result<String, AppError> {
    let mut nav = String::new();
    let mut sections = String::new();
    let mut scripts = String::new();
    let mut resize = String::new();

    for (i, p) in panels.iter().enumerate() {
        nav.push_str(&format!(
            "        <a href=\"#{}\" class=\"nav-button\">{}</a>\n",
            escape_html(p.anchor),
            escape_html(p.nav_label)
        ));
        sections.push_str(&format!(
            r#"            <div class="chart-container" id="{anchor}">
                <div class="chart-title">{title}</div>
                <div id="{chart}" style="width:100%;height:{h}px;"></div>
                <p><em>{caption}</em></p>
            </div>
"#,
            anchor = escape_html(p.anchor),
            title = escape_html(p.title),
            chart = escape_html(p.chart_id),
            h = p.height_px,
            caption = escape_html(p.caption),
        ));
        scripts.push_str(&format!(
            r#"        var figure{i} = {payload};
        Plotly.newPlot({chart}, figure{i}.data, figure{i}.layout, {{
            responsive: true,
            displayModeBar: true{extra}
        }}).then(function() {{
            if (figure{i}.frames) {{ Plotly.addFrames({chart}, figure{i}.frames); }}
        }});

"#,
            payload = script_safe_json(p.figure)?,
            chart = js_string(p.chart_id)?,
            extra = if p.plot_config.is_empty() {
                String::new()
            } else {
                format!(",\n            {}", p.plot_config)
            },
        ));
        resize.push_str(&format!(
            "            Plotly.Plots.resize({});\n",
            js_string(p.chart_id)?
        ));
    }

    let mut html = head(title, MULTI_STYLE);
    html.push_str(&format!(
        r#"<body>
    <div class="navigation-controls">
{nav}    </div>

    <div class="container">
        <div class="header">
            <h1>{title}</h1>
            <p><em>{subtitle}</em></p>
        </div>

        <div class="insights-panel">
            <p>{intro}</p>
        </div>

        <div class="dashboard-grid">
{sections}        </div>
    </div>

    <script>
{scripts}        document.querySelectorAll('.nav-button').forEach(function(button) {{
            button.addEventListener('click', function(e) {{
                e.preventDefault();
                var target = document.querySelector(this.getAttribute('href'));
                if (target) {{
                    target.scrollIntoView({{ behavior: 'smooth', block: 'start' }});
                }}
            }});
        }});

        window.addEventListener('resize', function() {{
{resize}        }});
    </script>
</body>
</html>
"#,
        title = escape_html(title),
        subtitle = escape_html(subtitle),
        intro = escape_html(intro),
    ));
    Ok(html)
}

/// Render `figure` as a dashboard page at `<web_dir>/<name>.html`.
pub fn export_figure(figure: &Figure, name: &str, web_dir: &Path) -> Result<PathBuf, AppError> {
    let stem = sanitize_filename(name);
    if stem.is_empty() {
        return Err(AppError::io(format!("Invalid output name '{name}'.")));
    }
    let html = render_dashboard_page(&stem, figure)?;
    let path = web_dir.join(format!("{stem}.html"));
    safe_write(&path, &html)?;
    info!(path = %path.display(), "exported dashboard");
    Ok(path)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::chart::Trace;

    fn figure_with_label(label: &str) -> Figure {
        let mut fig = Figure::new();
        fig.add_trace(Trace::bar(label, vec!["MA"], vec![1.0]));
        fig
    }

    #[test]
    fn script_json_cannot_close_the_script_tag() {
        let fig = figure_with_label("</script><script>alert(1)</script> & \u{2028}");
        let json = script_safe_json(&fig).unwrap();
        assert!(!json.contains('<'));
        assert!(!json.contains('>'));
        assert!(!json.contains('&'));
        assert!(!json.contains('\u{2028}'));
        assert!(json.contains("\\u003c/script\\u003e"));
    }

    #[test]
    fn escaped_json_still_parses_to_the_same_value() {
        let fig = figure_with_label("a<b>&c");
        let escaped = script_safe_json(&fig).unwrap();
        let back: serde_json::Value = serde_json::from_str(&escaped).unwrap();
        assert_eq!(back, fig.to_value().unwrap());
    }

    #[test]
    fn dashboard_page_has_security_headers() {
        let html = render_dashboard_page("demo", &figure_with_label("x")).unwrap();
        assert!(html.starts_with("<!DOCTYPE html>"));
        assert!(html.contains("Content-Security-Policy"));
        assert!(html.contains("X-Content-Type-Options"));
        assert!(html.contains("X-Frame-Options\" content=\"DENY\""));
        assert!(html.contains(PLOTLY_CDN));
        assert!(html.contains("Plotly.newPlot('plotly-div'"));
        assert!(html.contains("<title>Development Economics Analysis - demo</title>"));
    }

    #[test]
    fn multi_page_renders_each_panel() {
        let a = figure_with_label("a");
        let b = figure_with_label("b");
        let panels = [
            Panel {
                anchor: "one",
                chart_id: "one-chart",
                nav_label: "One",
                title: "First",
                height_px: 700,
                caption: "c1",
                plot_config: "modeBarButtonsToRemove: ['pan2d', 'lasso2d']",
                figure: &a,
            },
            Panel {
                anchor: "two",
                chart_id: "two-chart",
                nav_label: "Two",
                title: "Second",
                height_px: 600,
                caption: "c2",
                plot_config: "",
                figure: &b,
            },
        ];
        let html = render_multi_chart_page("T", "S", "I", &panels).unwrap();
        assert!(html.contains("id=\"one-chart\""));
        assert!(html.contains("Plotly.newPlot(\"two-chart\""));
        assert!(html.contains("href=\"#two\""));
        assert!(html.contains("modeBarButtonsToRemove"));
        assert!(html.contains("Plotly.Plots.resize(\"one-chart\");"));
    }

    #[test]
    fn chart_ids_are_quoted_string_literals() {
        assert_eq!(js_string("a'b\\c</script>").unwrap(), r#""a'b\\c\u003c/script\u003e""#);

        let fig = figure_with_label("q");
        let panels = [Panel {
            anchor: "q",
            chart_id: "it's-chart",
            nav_label: "Q",
            title: "Q",
            height_px: 400,
            caption: "",
            plot_config: "",
            figure: &fig,
        }];
        let html = render_multi_chart_page("T", "S", "I", &panels).unwrap();
        assert!(html.contains("Plotly.newPlot(\"it's-chart\""));
        assert!(html.contains("Plotly.addFrames(\"it's-chart\""));
        assert!(!html.contains("('it's-chart'"));
    }

    #[test]
    fn export_uses_sanitized_name() {
        let dir = tempfile::tempdir().unwrap();
        let path = export_figure(&figure_with_label("x"), "../evil name", dir.path()).unwrap();
        assert_eq!(path, dir.path().join("evilname.html"));
        assert!(path.exists());
    }
}
