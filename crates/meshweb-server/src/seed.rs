//! Default page seeding: if the pages directory is empty on first run,
//! write two starter pages so a fresh server has something to serve.

use std::path::Path;

use crate::error::ServerError;

const ABOUT_HTML: &str = r#"<html>
<head><title>About</title></head>
<body>
<h1>About this server</h1>
<p>Generated: {{timestamp}}</p>
<p>This server is currently sharing {{page_count}} files.</p>
</body>
</html>
"#;

const HELP_HTML: &str = r#"<html>
<head><title>Help</title></head>
<body>
<h1>How to use this server</h1>
<p>Send <code>list</code> to get the file index, or
<code>GET:&lt;filename&gt;</code> to fetch a specific page or file.</p>
<p>Generated: {{timestamp}}</p>
</body>
</html>
"#;

pub fn seed_default_pages_if_empty(pages_root: &Path) -> Result<(), ServerError> {
    std::fs::create_dir_all(pages_root)?;
    let is_empty = std::fs::read_dir(pages_root)?.next().is_none();
    if !is_empty {
        return Ok(());
    }
    std::fs::write(pages_root.join("about.html"), ABOUT_HTML)?;
    std::fs::write(pages_root.join("help.html"), HELP_HTML)?;
    tracing::info!(path = %pages_root.display(), "seeded default pages");
    Ok(())
}
